//! Asking a preset's prompts.

use super::definition::Prompts;
use crate::actions::condition::evaluate;
use crate::context::{Context, ValueMap};
use crate::error::{PresetError, Result};
use crate::ui::UserInterface;

/// Ask the preset's prompts and return a context carrying the answers.
///
/// Declared prompts are asked in order. Each prompt's `if` sees the answers
/// given so far, and a key that already has an answer is not asked again.
pub fn ask(prompts: &Prompts, context: &Context, ui: &mut dyn UserInterface) -> Result<Context> {
    match prompts {
        Prompts::None => Ok(context.clone()),
        Prompts::Callback(callback) => {
            let answers = callback(context, ui).map_err(PresetError::Other)?;
            Ok(context.with_prompt_answers(answers))
        }
        Prompts::Declared(specs) => {
            let mut context = context.clone();
            for spec in specs {
                if context.answer(&spec.key).is_some() {
                    tracing::debug!("Prompt '{}' already answered", spec.key);
                    continue;
                }
                if !evaluate(&spec.conditions, &context)? {
                    tracing::debug!("Prompt '{}' skipped by condition", spec.key);
                    continue;
                }

                let prompt = spec.to_prompt(&context)?;
                let answer = ui.prompt(&prompt)?;

                let mut answers = ValueMap::new();
                answers.insert(spec.key.clone(), answer.into_value());
                context = context.with_prompt_answers(answers);
            }
            Ok(context)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBuilder;
    use crate::preset::PromptSpec;
    use crate::ui::MockUI;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn specs(yaml: &str) -> Prompts {
        let specs: Vec<PromptSpec> = serde_yaml::from_str(yaml).unwrap();
        Prompts::Declared(specs)
    }

    fn context() -> Context {
        ContextBuilder::new(vec![])
            .build("demo", &BTreeMap::new())
            .unwrap()
    }

    #[test]
    fn answers_are_added_in_order() {
        let prompts = specs(
            r#"
- key: name
  question: Name?
- key: git
  question: Init git for ${prompts.name}?
  type: confirm
"#,
        );
        let mut ui = MockUI::new();
        ui.set_prompt_response("name", "acme");
        ui.set_prompt_response("git", "yes");

        let ctx = ask(&prompts, &context(), &mut ui).unwrap();

        assert_eq!(ctx.answer("name"), Some(&json!("acme")));
        assert_eq!(ctx.answer("git"), Some(&json!(true)));
        assert_eq!(ui.prompts_shown(), ["name", "git"]);
    }

    #[test]
    fn conditions_see_earlier_answers() {
        let prompts = specs(
            r#"
- key: db
  question: Use a database?
  type: confirm
- key: engine
  question: Engine?
  type: select
  choices: [postgres, sqlite]
  if: "${prompts.db}"
"#,
        );
        let mut ui = MockUI::new();
        ui.set_prompt_response("db", "no");

        let ctx = ask(&prompts, &context(), &mut ui).unwrap();

        assert_eq!(ctx.answer("db"), Some(&json!(false)));
        assert!(ctx.answer("engine").is_none());
        assert_eq!(ui.prompts_shown(), ["db"]);
    }

    #[test]
    fn seeded_answers_are_not_asked() {
        let prompts = specs("- key: name\n  question: Name?\n");
        let seeded = ContextBuilder::new(vec![])
            .prompt_answers([("name".to_string(), json!("preset"))].into_iter().collect())
            .build("demo", &BTreeMap::new())
            .unwrap();
        let mut ui = MockUI::new();

        let ctx = ask(&prompts, &seeded, &mut ui).unwrap();

        assert_eq!(ctx.answer("name"), Some(&json!("preset")));
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn callback_prompts_return_answers() {
        let prompts = Prompts::Callback(Arc::new(
            |_ctx: &Context, ui: &mut dyn UserInterface| -> anyhow::Result<ValueMap> {
                let answer = ui.prompt(&crate::ui::Prompt::confirm("ok", "Ok?"))?;
                Ok([("ok".to_string(), answer.into_value())].into_iter().collect())
            },
        ));
        let mut ui = MockUI::new();
        ui.set_prompt_response("ok", "y");

        let ctx = ask(&prompts, &context(), &mut ui).unwrap();
        assert_eq!(ctx.answer("ok"), Some(&json!(true)));
    }

    #[test]
    fn original_context_is_unchanged() {
        let prompts = specs("- key: name\n  question: Name?\n  default: x\n");
        let base = context();
        let mut ui = MockUI::new();

        let ctx = ask(&prompts, &base, &mut ui).unwrap();

        assert!(base.answer("name").is_none());
        assert_eq!(ctx.answer("name"), Some(&json!("x")));
    }
}
