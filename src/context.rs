//! Run context shared with every preset callback.
//!
//! A [`Context`] bundles positional arguments, CLI flags, resolved option
//! values and prompt answers. It is built once by [`ContextBuilder`], extended
//! with prompt answers (which produces a new value), and is read-only from
//! then on: the data lives behind an `Arc` and no accessor hands out mutable
//! references, so hooks and predicates cannot change what later actions see.

use crate::config::Variables;
use crate::error::{PresetError, Result};
use crate::preset::{OptionKind, OptionSpec};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Ordered key/value map used for flags, options and prompt answers.
pub type ValueMap = BTreeMap<String, Value>;

#[derive(Debug, Default)]
struct ContextData {
    args: Vec<String>,
    flags: ValueMap,
    options: ValueMap,
    prompt_answers: ValueMap,
    target_dir: PathBuf,
    preset_dir: PathBuf,
    preset_name: String,
}

/// Immutable bundle of run-time values.
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: Arc<ContextData>,
}

impl Context {
    /// Positional arguments passed after the preset identifier.
    pub fn args(&self) -> &[String] {
        &self.data.args
    }

    /// Raw flags as given on the command line.
    pub fn flags(&self) -> &ValueMap {
        &self.data.flags
    }

    /// Option values resolved against the preset's option schema.
    pub fn options(&self) -> &ValueMap {
        &self.data.options
    }

    /// Answers collected by the preset's prompts.
    pub fn prompt_answers(&self) -> &ValueMap {
        &self.data.prompt_answers
    }

    /// Get a single flag.
    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.data.flags.get(name)
    }

    /// Get a single option.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.data.options.get(name)
    }

    /// Get a single prompt answer.
    pub fn answer(&self, name: &str) -> Option<&Value> {
        self.data.prompt_answers.get(name)
    }

    /// Whether an option is set to a truthy value.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.option(name)
            .map(|v| is_truthy(&value_to_string(v)))
            .unwrap_or(false)
    }

    /// Directory the preset is applied to.
    pub fn target_dir(&self) -> &Path {
        &self.data.target_dir
    }

    /// Directory the preset was loaded from.
    pub fn preset_dir(&self) -> &Path {
        &self.data.preset_dir
    }

    /// Name of the preset being applied.
    pub fn preset_name(&self) -> &str {
        &self.data.preset_name
    }

    /// Produce a new context that also carries `answers`.
    ///
    /// Existing answers with the same key are replaced. `self` is unchanged.
    pub fn with_prompt_answers(&self, answers: ValueMap) -> Context {
        let mut prompt_answers = self.data.prompt_answers.clone();
        prompt_answers.extend(answers);

        Context {
            data: Arc::new(ContextData {
                args: self.data.args.clone(),
                flags: self.data.flags.clone(),
                options: self.data.options.clone(),
                prompt_answers,
                target_dir: self.data.target_dir.clone(),
                preset_dir: self.data.preset_dir.clone(),
                preset_name: self.data.preset_name.clone(),
            }),
        }
    }
}

impl Variables for Context {
    fn lookup(&self, name: &str) -> Option<String> {
        let data = &self.data;

        if let Some((scope, key)) = name.split_once('.') {
            let value = match scope {
                "args" => return key.parse::<usize>().ok().and_then(|i| data.args.get(i).cloned()),
                "env" => return std::env::var(key).ok(),
                "flags" => data.flags.get(key),
                "options" => data.options.get(key),
                "prompts" => data.prompt_answers.get(key),
                _ => None,
            };
            return value.map(value_to_string);
        }

        match name {
            "target_dir" => Some(data.target_dir.display().to_string()),
            "preset_dir" => Some(data.preset_dir.display().to_string()),
            "preset_name" => Some(data.preset_name.clone()),
            _ => data
                .prompt_answers
                .get(name)
                .or_else(|| data.options.get(name))
                .or_else(|| data.flags.get(name))
                .map(value_to_string),
        }
    }
}

/// Render a JSON value the way it appears in interpolated text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Truthiness of an interpolated string.
///
/// Empty strings and `false`, `0`, `no`, `off` (any case) are false.
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value.eq_ignore_ascii_case("false")
        || value == "0"
        || value.eq_ignore_ascii_case("no")
        || value.eq_ignore_ascii_case("off"))
}

/// Builds a [`Context`] from CLI input and a preset's option schema.
#[derive(Debug, Default)]
pub struct ContextBuilder {
    args: Vec<String>,
    flags: ValueMap,
    prompt_answers: ValueMap,
    target_dir: PathBuf,
    preset_dir: PathBuf,
}

impl ContextBuilder {
    /// Start a builder with positional arguments.
    pub fn new(args: Vec<String>) -> Self {
        Self {
            args,
            ..Default::default()
        }
    }

    /// Set all flags at once.
    pub fn flags(mut self, flags: ValueMap) -> Self {
        self.flags = flags;
        self
    }

    /// Add one flag.
    pub fn flag(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.flags.insert(name.to_string(), value.into());
        self
    }

    /// Seed prompt answers (answers collected later are added on top).
    pub fn prompt_answers(mut self, answers: ValueMap) -> Self {
        self.prompt_answers = answers;
        self
    }

    /// Set the target and preset directories.
    pub fn paths(mut self, target_dir: &Path, preset_dir: &Path) -> Self {
        self.target_dir = target_dir.to_path_buf();
        self.preset_dir = preset_dir.to_path_buf();
        self
    }

    /// Resolve options against `schema` and freeze the context.
    ///
    /// Each option takes the flag of the same name (coerced to the option's
    /// type), else its declared default, else the type's empty value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` when a flag cannot be coerced.
    pub fn build(self, preset_name: &str, schema: &BTreeMap<String, OptionSpec>) -> Result<Context> {
        let mut options = ValueMap::new();

        for (name, spec) in schema {
            let value = match self.flags.get(name) {
                Some(raw) => coerce(name, spec.kind, raw)?,
                None => spec.default.clone().unwrap_or_else(|| spec.kind.empty_value()),
            };
            options.insert(name.clone(), value);
        }

        tracing::debug!(
            "Built context: {} args, {} flags, {} options",
            self.args.len(),
            self.flags.len(),
            options.len()
        );

        Ok(Context {
            data: Arc::new(ContextData {
                args: self.args,
                flags: self.flags,
                options,
                prompt_answers: self.prompt_answers,
                target_dir: self.target_dir,
                preset_dir: self.preset_dir,
                preset_name: preset_name.to_string(),
            }),
        })
    }
}

fn coerce(name: &str, kind: OptionKind, raw: &Value) -> Result<Value> {
    let invalid = |message: String| PresetError::InvalidOption {
        name: name.to_string(),
        message,
    };

    match (kind, raw) {
        (OptionKind::String, Value::String(_)) => Ok(raw.clone()),
        (OptionKind::String, other) => Ok(Value::String(value_to_string(other))),
        (OptionKind::Boolean, Value::Bool(_)) => Ok(raw.clone()),
        (OptionKind::Boolean, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "" | "true" | "yes" | "y" | "1" | "on" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "0" | "off" => Ok(Value::Bool(false)),
            _ => Err(invalid(format!("expected a boolean, got '{}'", s))),
        },
        (OptionKind::Number, Value::Number(_)) => Ok(raw.clone()),
        (OptionKind::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|n| {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    Some(Value::from(n as i64))
                } else {
                    serde_json::Number::from_f64(n).map(Value::Number)
                }
            })
            .ok_or_else(|| invalid(format!("expected a number, got '{}'", s))),
        (kind, other) => Err(invalid(format!("expected a {}, got {}", kind, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> BTreeMap<String, OptionSpec> {
        let mut schema = BTreeMap::new();
        schema.insert(
            "typescript".to_string(),
            OptionSpec::new(OptionKind::Boolean).with_default(json!(false)),
        );
        schema.insert("port".to_string(), OptionSpec::new(OptionKind::Number));
        schema.insert(
            "name".to_string(),
            OptionSpec::new(OptionKind::String).with_default(json!("app")),
        );
        schema
    }

    #[test]
    fn options_take_defaults_without_flags() {
        let ctx = ContextBuilder::new(vec![]).build("demo", &schema()).unwrap();
        assert_eq!(ctx.option("typescript"), Some(&json!(false)));
        assert_eq!(ctx.option("name"), Some(&json!("app")));
        assert_eq!(ctx.option("port"), Some(&Value::Null));
        assert_eq!(ctx.preset_name(), "demo");
    }

    #[test]
    fn flags_are_coerced_to_option_types() {
        let ctx = ContextBuilder::new(vec![])
            .flag("typescript", "yes")
            .flag("port", "8080")
            .flag("name", json!(42))
            .build("demo", &schema())
            .unwrap();

        assert_eq!(ctx.option("typescript"), Some(&json!(true)));
        assert_eq!(ctx.option("port"), Some(&json!(8080)));
        assert_eq!(ctx.option("name"), Some(&json!("42")));
        assert!(ctx.is_enabled("typescript"));
    }

    #[test]
    fn empty_boolean_flag_means_true() {
        let ctx = ContextBuilder::new(vec![])
            .flag("typescript", "")
            .build("demo", &schema())
            .unwrap();
        assert!(ctx.is_enabled("typescript"));
    }

    #[test]
    fn invalid_flag_value_is_rejected() {
        let err = ContextBuilder::new(vec![])
            .flag("port", "eighty")
            .build("demo", &schema())
            .unwrap_err();
        assert!(matches!(err, PresetError::InvalidOption { ref name, .. } if name == "port"));
    }

    #[test]
    fn unknown_flags_stay_in_flags_only() {
        let ctx = ContextBuilder::new(vec![])
            .flag("verbose", true)
            .build("demo", &schema())
            .unwrap();
        assert_eq!(ctx.flag("verbose"), Some(&json!(true)));
        assert!(ctx.option("verbose").is_none());
    }

    #[test]
    fn with_prompt_answers_leaves_original_untouched() {
        let ctx = ContextBuilder::new(vec![]).build("demo", &schema()).unwrap();
        let mut answers = ValueMap::new();
        answers.insert("project".to_string(), json!("acme"));

        let extended = ctx.with_prompt_answers(answers);

        assert!(ctx.answer("project").is_none());
        assert_eq!(extended.answer("project"), Some(&json!("acme")));
        assert_eq!(extended.option("name"), Some(&json!("app")));
    }

    #[test]
    fn lookup_resolves_scoped_names() {
        let ctx = ContextBuilder::new(vec!["first".into(), "second".into()])
            .flag("force", true)
            .paths(Path::new("/work"), Path::new("/presets/demo"))
            .build("demo", &schema())
            .unwrap()
            .with_prompt_answers(
                [("features".to_string(), json!(["db", "cache"]))]
                    .into_iter()
                    .collect(),
            );

        assert_eq!(ctx.lookup("args.1").as_deref(), Some("second"));
        assert_eq!(ctx.lookup("args.9"), None);
        assert_eq!(ctx.lookup("flags.force").as_deref(), Some("true"));
        assert_eq!(ctx.lookup("options.name").as_deref(), Some("app"));
        assert_eq!(ctx.lookup("prompts.features").as_deref(), Some("db,cache"));
        assert_eq!(ctx.lookup("target_dir").as_deref(), Some("/work"));
        assert_eq!(ctx.lookup("preset_name").as_deref(), Some("demo"));
        assert_eq!(ctx.lookup("unknown.thing"), None);
    }

    #[test]
    fn unqualified_lookup_prefers_prompts_then_options_then_flags() {
        let mut schema = BTreeMap::new();
        schema.insert("name".to_string(), OptionSpec::new(OptionKind::String));

        let ctx = ContextBuilder::new(vec![])
            .flag("name", "from-flag")
            .flag("only_flag", "f")
            .build("demo", &schema)
            .unwrap();
        assert_eq!(ctx.lookup("name").as_deref(), Some("from-flag"));
        assert_eq!(ctx.lookup("only_flag").as_deref(), Some("f"));

        let ctx = ctx.with_prompt_answers(
            [("name".to_string(), json!("from-prompt"))]
                .into_iter()
                .collect(),
        );
        assert_eq!(ctx.lookup("name").as_deref(), Some("from-prompt"));
    }

    #[test]
    fn truthiness() {
        for falsy in ["", "false", "FALSE", "0", "no", "off", "  "] {
            assert!(!is_truthy(falsy), "{falsy:?} should be falsy");
        }
        for truthy in ["true", "1", "yes", "anything"] {
            assert!(is_truthy(truthy), "{truthy:?} should be truthy");
        }
    }
}
