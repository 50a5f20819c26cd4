//! Action model.
//!
//! An [`Action`] is one declarative operation a preset asks for. The
//! operation itself is the closed [`ActionKind`] union, discriminated in
//! preset files by the `type` field; the surrounding [`Action`] carries the
//! fields every variant shares (`title`, `before`, `after`, `if`).

use crate::actions::conflict::ConflictStrategy;
use crate::config::{resolve_string, resolve_value, Variables};
use crate::context::Context;
use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Discriminant of an [`ActionKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    Copy,
    Delete,
    EditJson,
    Hook,
    None,
}

impl ActionType {
    /// Every action type, in declaration order.
    pub const ALL: [ActionType; 5] = [
        ActionType::Copy,
        ActionType::Delete,
        ActionType::EditJson,
        ActionType::Hook,
        ActionType::None,
    ];

    /// The `type` value used in preset files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Copy => "copy",
            ActionType::Delete => "delete",
            ActionType::EditJson => "edit-json",
            ActionType::Hook => "hook",
            ActionType::None => "none",
        }
    }

    /// Parse a `type` value, including the `execute` alias for hooks.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "execute" => Some(ActionType::Hook),
            _ => Self::ALL.into_iter().find(|t| t.as_str() == name),
        }
    }

    /// Keys an action of this type accepts besides the shared ones.
    fn fields(&self) -> &'static [&'static str] {
        match self {
            ActionType::Copy => &["files", "target", "strategy", "interpolate", "optional"],
            ActionType::Delete => &["files"],
            ActionType::EditJson => &["file", "merge", "delete"],
            ActionType::Hook => &["run"],
            ActionType::None => &[],
        }
    }
}

/// Keys every action accepts.
const SHARED_FIELDS: [&str; 5] = ["type", "title", "before", "after", "if"];

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts either a single value or a list in preset files.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    OneOrMany::deserialize(deserializer).map(Vec::from)
}

fn all_files() -> Vec<String> {
    vec!["**/*".to_string()]
}

fn current_dir() -> String {
    ".".to_string()
}

/// Predicate evaluated against the run context.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Context) -> bool>);

impl Predicate {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Context) -> bool + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluate the predicate.
    pub fn test(&self, context: &Context) -> bool {
        (self.0)(context)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(<fn>)")
    }
}

/// One entry of an action's `if` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// `if: true` / `if: false`
    Literal(bool),
    /// `if: "${options.typescript}"`, `if: "${prompts.db} == postgres"`
    Expression(String),
    /// Closure supplied by a programmatic preset.
    #[serde(skip)]
    Predicate(Predicate),
}

/// Callback run by a hook action.
#[derive(Clone)]
pub struct HookFn(Arc<dyn Fn(&Context) -> anyhow::Result<()>>);

impl HookFn {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Context) -> anyhow::Result<()> + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, context: &Context) -> anyhow::Result<()> {
        (self.0)(context)
    }
}

impl fmt::Debug for HookFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HookFn(<fn>)")
    }
}

/// Copy files from the preset's template directory.
#[derive(Debug, Clone, Deserialize)]
pub struct CopyAction {
    /// Glob patterns relative to the template directory.
    #[serde(default = "all_files", deserialize_with = "one_or_many")]
    pub files: Vec<String>,

    /// Destination directory relative to the target directory.
    #[serde(default = "current_dir")]
    pub target: String,

    /// What to do when a destination exists; settings decide when absent.
    #[serde(default)]
    pub strategy: Option<ConflictStrategy>,

    /// Substitute `${...}` variables in copied file contents.
    #[serde(default)]
    pub interpolate: bool,

    /// Allow the patterns to match nothing.
    #[serde(default)]
    pub optional: bool,
}

impl Default for CopyAction {
    fn default() -> Self {
        Self {
            files: all_files(),
            target: current_dir(),
            strategy: None,
            interpolate: false,
            optional: false,
        }
    }
}

/// Delete files from the target directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteAction {
    /// Glob patterns relative to the target directory.
    #[serde(deserialize_with = "one_or_many")]
    pub files: Vec<String>,
}

/// Merge a patch into a JSON file in the target directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditJsonAction {
    /// File path relative to the target directory.
    pub file: String,

    /// Object deep-merged into the file's content.
    #[serde(default)]
    pub merge: Option<serde_json::Value>,

    /// Dot-separated key paths to remove after merging.
    #[serde(default, deserialize_with = "one_or_many")]
    pub delete: Vec<String>,
}

/// Run shell commands and/or callbacks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookAction {
    /// Shell commands, run in order in the target directory.
    #[serde(default, deserialize_with = "one_or_many")]
    pub run: Vec<String>,

    /// Callbacks, run after the commands.
    #[serde(skip)]
    pub callbacks: Vec<HookFn>,
}

impl HookAction {
    /// Hook that runs a single callback.
    pub fn callback(f: impl Fn(&Context) -> anyhow::Result<()> + 'static) -> Self {
        Self {
            run: Vec::new(),
            callbacks: vec![HookFn::new(f)],
        }
    }
}

/// The operation an action performs.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionKind {
    Copy(CopyAction),
    Delete(DeleteAction),
    EditJson(EditJsonAction),
    #[serde(alias = "execute")]
    Hook(HookAction),
    None,
}

impl ActionKind {
    /// The discriminant of this operation.
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionKind::Copy(_) => ActionType::Copy,
            ActionKind::Delete(_) => ActionType::Delete,
            ActionKind::EditJson(_) => ActionType::EditJson,
            ActionKind::Hook(_) => ActionType::Hook,
            ActionKind::None => ActionType::None,
        }
    }
}

/// A declared action: an operation plus shared metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    /// Short label used in output and error messages.
    #[serde(default)]
    pub title: Option<String>,

    /// Messages shown before the operation runs.
    #[serde(default, deserialize_with = "one_or_many")]
    pub before: Vec<String>,

    /// Messages shown after the operation succeeds.
    #[serde(default, deserialize_with = "one_or_many")]
    pub after: Vec<String>,

    /// Guards; all must hold for the action to run.
    #[serde(default, rename = "if", deserialize_with = "one_or_many")]
    pub conditions: Vec<Condition>,

    /// The operation.
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    /// Parse one action from a preset file.
    ///
    /// The operation is flattened into the action, which makes serde
    /// ignore keys it does not know. A misspelled `strategy` would then
    /// silently fall back to the default, so unknown keys are rejected here.
    pub fn from_yaml(value: serde_yaml::Value) -> anyhow::Result<Self> {
        if let serde_yaml::Value::Mapping(map) = &value {
            let kind = map
                .get("type")
                .and_then(serde_yaml::Value::as_str)
                .and_then(ActionType::from_name);
            if let Some(kind) = kind {
                for key in map.keys() {
                    let name = key.as_str().unwrap_or_default();
                    if !SHARED_FIELDS.contains(&name) && !kind.fields().contains(&name) {
                        let mut expected = SHARED_FIELDS.to_vec();
                        expected.extend_from_slice(kind.fields());
                        anyhow::bail!(
                            "unknown field `{}` in {} action, expected one of: {}",
                            name,
                            kind,
                            expected.join(", ")
                        );
                    }
                }
            }
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Wrap an operation with empty metadata.
    pub fn new(kind: ActionKind) -> Self {
        Self {
            title: None,
            before: Vec::new(),
            after: Vec::new(),
            conditions: Vec::new(),
            kind,
        }
    }

    /// Copy the given patterns into the target directory root.
    pub fn copy(files: impl Into<String>) -> Self {
        Self::new(ActionKind::Copy(CopyAction {
            files: vec![files.into()],
            ..Default::default()
        }))
    }

    /// Delete the given pattern from the target directory.
    pub fn delete(files: impl Into<String>) -> Self {
        Self::new(ActionKind::Delete(DeleteAction {
            files: vec![files.into()],
        }))
    }

    /// Merge `patch` into a JSON file.
    pub fn edit_json(file: impl Into<String>, patch: serde_json::Value) -> Self {
        Self::new(ActionKind::EditJson(EditJsonAction {
            file: file.into(),
            merge: Some(patch),
            delete: Vec::new(),
        }))
    }

    /// Run a shell command in the target directory.
    pub fn run(command: impl Into<String>) -> Self {
        Self::new(ActionKind::Hook(HookAction {
            run: vec![command.into()],
            callbacks: Vec::new(),
        }))
    }

    /// Run a callback with the context.
    pub fn hook(f: impl Fn(&Context) -> anyhow::Result<()> + 'static) -> Self {
        Self::new(ActionKind::Hook(HookAction::callback(f)))
    }

    /// A no-op action (still emits its messages).
    pub fn none() -> Self {
        Self::new(ActionKind::None)
    }

    /// Set the title.
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a message shown before the operation.
    pub fn before(mut self, message: impl Into<String>) -> Self {
        self.before.push(message.into());
        self
    }

    /// Add a message shown after the operation.
    pub fn after(mut self, message: impl Into<String>) -> Self {
        self.after.push(message.into());
        self
    }

    /// Add a literal guard.
    pub fn when(mut self, condition: bool) -> Self {
        self.conditions.push(Condition::Literal(condition));
        self
    }

    /// Add an expression guard.
    pub fn when_expr(mut self, expression: impl Into<String>) -> Self {
        self.conditions.push(Condition::Expression(expression.into()));
        self
    }

    /// Add a predicate guard.
    pub fn when_fn(mut self, f: impl Fn(&Context) -> bool + 'static) -> Self {
        self.conditions.push(Condition::Predicate(Predicate::new(f)));
        self
    }

    /// Set the destination directory of a copy action.
    pub fn to(mut self, target: impl Into<String>) -> Self {
        if let ActionKind::Copy(copy) = &mut self.kind {
            copy.target = target.into();
        }
        self
    }

    /// Set the conflict strategy of a copy action.
    pub fn strategy(mut self, strategy: ConflictStrategy) -> Self {
        if let ActionKind::Copy(copy) = &mut self.kind {
            copy.strategy = Some(strategy);
        }
        self
    }

    /// The discriminant of this action's operation.
    pub fn action_type(&self) -> ActionType {
        self.kind.action_type()
    }

    /// Interpolate every string field against `vars`.
    ///
    /// Guards are not touched; they are evaluated separately before rendering.
    pub fn render(&self, vars: &dyn Variables) -> Result<Action> {
        let strings = |items: &[String]| -> Result<Vec<String>> {
            items.iter().map(|s| resolve_string(s, vars)).collect()
        };

        let kind = match &self.kind {
            ActionKind::Copy(copy) => ActionKind::Copy(CopyAction {
                files: strings(&copy.files)?,
                target: resolve_string(&copy.target, vars)?,
                ..copy.clone()
            }),
            ActionKind::Delete(delete) => ActionKind::Delete(DeleteAction {
                files: strings(&delete.files)?,
            }),
            ActionKind::EditJson(edit) => ActionKind::EditJson(EditJsonAction {
                file: resolve_string(&edit.file, vars)?,
                merge: edit
                    .merge
                    .as_ref()
                    .map(|patch| resolve_value(patch, vars))
                    .transpose()?,
                delete: strings(&edit.delete)?,
            }),
            ActionKind::Hook(hook) => ActionKind::Hook(HookAction {
                run: strings(&hook.run)?,
                callbacks: hook.callbacks.clone(),
            }),
            ActionKind::None => ActionKind::None,
        };

        Ok(Action {
            title: self
                .title
                .as_deref()
                .map(|t| resolve_string(t, vars))
                .transpose()?,
            before: strings(&self.before)?,
            after: strings(&self.after)?,
            conditions: self.conditions.clone(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn parse(yaml: &str) -> Action {
        Action::from_yaml(serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    fn parse_err(yaml: &str) -> String {
        Action::from_yaml(serde_yaml::from_str(yaml).unwrap())
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn parses_copy_with_defaults() {
        let action = parse("type: copy\n");
        match action.kind {
            ActionKind::Copy(copy) => {
                assert_eq!(copy.files, vec!["**/*"]);
                assert_eq!(copy.target, ".");
                assert_eq!(copy.strategy, None);
                assert!(!copy.optional);
            }
            other => panic!("expected copy, got {other:?}"),
        }
    }

    #[test]
    fn parses_copy_with_all_fields() {
        let action = parse(
            r#"
type: copy
title: Base files
files: [src/**, README.md]
target: app
strategy: override
interpolate: true
before: Copying
after: [Copied, Done]
if: [true, "${options.ts}"]
"#,
        );

        assert_eq!(action.title.as_deref(), Some("Base files"));
        assert_eq!(action.before, vec!["Copying"]);
        assert_eq!(action.after, vec!["Copied", "Done"]);
        assert!(matches!(action.conditions[0], Condition::Literal(true)));
        assert!(matches!(&action.conditions[1], Condition::Expression(e) if e == "${options.ts}"));

        let ActionKind::Copy(copy) = action.kind else {
            panic!("expected copy");
        };
        assert_eq!(copy.files, vec!["src/**", "README.md"]);
        assert_eq!(copy.target, "app");
        assert_eq!(copy.strategy, Some(ConflictStrategy::Override));
        assert!(copy.interpolate);
    }

    #[test]
    fn parses_single_condition() {
        let action = parse("type: none\nif: false\n");
        assert!(matches!(action.conditions.as_slice(), [Condition::Literal(false)]));
    }

    #[test]
    fn parses_delete_single_pattern() {
        let action = parse("type: delete\nfiles: '*.log'\n");
        let ActionKind::Delete(delete) = action.kind else {
            panic!("expected delete");
        };
        assert_eq!(delete.files, vec!["*.log"]);
    }

    #[test]
    fn parses_edit_json() {
        let action = parse(
            r#"
type: edit-json
file: package.json
merge:
  scripts:
    lint: eslint .
delete: devDependencies.tslint
"#,
        );
        let ActionKind::EditJson(edit) = action.kind else {
            panic!("expected edit-json");
        };
        assert_eq!(edit.file, "package.json");
        assert_eq!(edit.merge, Some(json!({"scripts": {"lint": "eslint ."}})));
        assert_eq!(edit.delete, vec!["devDependencies.tslint"]);
    }

    #[test]
    fn parses_hook_and_execute_alias() {
        for yaml in ["type: hook\nrun: git init\n", "type: execute\nrun: [git init]\n"] {
            let action = parse(yaml);
            let ActionKind::Hook(hook) = action.kind else {
                panic!("expected hook");
            };
            assert_eq!(hook.run, vec!["git init"]);
            assert!(hook.callbacks.is_empty());
        }
    }

    #[test]
    fn parses_none() {
        assert_eq!(parse("type: none\n").action_type(), ActionType::None);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: std::result::Result<Action, _> = serde_yaml::from_str("type: teleport\n");
        assert!(result.is_err());
    }

    #[test]
    fn action_type_display_matches_file_format() {
        let names: Vec<String> = ActionType::ALL.iter().map(|t| t.to_string()).collect();
        assert_eq!(names, ["copy", "delete", "edit-json", "hook", "none"]);
    }

    #[test]
    fn builders_compose() {
        let action = Action::copy("hello.txt")
            .to("out")
            .strategy(ConflictStrategy::Skip)
            .titled("Hello")
            .before("about to copy")
            .when(true);

        assert_eq!(action.title.as_deref(), Some("Hello"));
        assert_eq!(action.before, vec!["about to copy"]);
        assert_eq!(action.conditions.len(), 1);
        let ActionKind::Copy(copy) = action.kind else {
            panic!("expected copy");
        };
        assert_eq!(copy.target, "out");
        assert_eq!(copy.strategy, Some(ConflictStrategy::Skip));
    }

    #[test]
    fn render_interpolates_strings() {
        let vars: HashMap<String, String> = [
            ("options.dir".to_string(), "web".to_string()),
            ("prompts.name".to_string(), "acme".to_string()),
        ]
        .into_iter()
        .collect();

        let action = Action::edit_json("${options.dir}/package.json", json!({"name": "${prompts.name}"}))
            .titled("Name ${prompts.name}")
            .after("Renamed to ${prompts.name}");

        let rendered = action.render(&vars).unwrap();

        assert_eq!(rendered.title.as_deref(), Some("Name acme"));
        assert_eq!(rendered.after, vec!["Renamed to acme"]);
        let ActionKind::EditJson(edit) = rendered.kind else {
            panic!("expected edit-json");
        };
        assert_eq!(edit.file, "web/package.json");
        assert_eq!(edit.merge, Some(json!({"name": "acme"})));
    }

    #[test]
    fn render_fails_on_unknown_variable() {
        let vars: HashMap<String, String> = HashMap::new();
        assert!(Action::delete("${nope}").render(&vars).is_err());
    }

    #[test]
    fn misspelled_field_is_rejected() {
        let message = parse_err("type: copy\nfiles: a.txt\nstratgy: override\n");
        assert!(message.contains("unknown field `stratgy` in copy action"), "{message}");
        assert!(message.contains("strategy"));

        let message = parse_err("type: execute\ncommand: make\n");
        assert!(message.contains("unknown field `command` in hook action"), "{message}");
    }

    #[test]
    fn fields_of_another_type_are_rejected() {
        let message = parse_err("type: delete\nfiles: a\nmerge: {}\n");
        assert!(message.contains("unknown field `merge` in delete action"), "{message}");
        assert!(parse_err("type: none\nfiles: a\n").contains("`files`"));
    }

    #[test]
    fn unknown_type_is_still_a_parse_error() {
        assert!(parse_err("type: rename\nfrom: a\n").contains("rename"));
    }
}
