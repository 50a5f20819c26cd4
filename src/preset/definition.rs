//! Preset definitions.
//!
//! A [`PresetDefinition`] is what the loader produces from a `preset.yml`
//! and what programmatic presets build directly in Rust. File-based presets
//! are data only; closures (`actions_fn`, `prompts_fn`, predicates, hook
//! callbacks) are available to programmatic presets.

use crate::actions::types::{one_or_many, Action, Condition, HookAction};
use crate::config::{resolve_string, Variables};
use crate::context::{value_to_string, Context, ValueMap};
use crate::error::Result;
use crate::ui::{Prompt, PromptOption, PromptType, UserInterface};
use anyhow::Context as _;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default template directory, relative to the preset root.
pub const DEFAULT_TEMPLATES: &str = "templates";

/// Type of a declared option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    #[default]
    String,
    #[serde(alias = "bool")]
    Boolean,
    Number,
}

impl OptionKind {
    /// Value an option takes when neither a flag nor a default supplies one.
    pub fn empty_value(&self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Boolean => Value::Bool(false),
            Self::Number => Value::Null,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
        })
    }
}

/// Schema entry for one option.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionSpec {
    #[serde(default, rename = "type")]
    pub kind: OptionKind,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub description: Option<String>,
}

impl OptionSpec {
    pub fn new(kind: OptionKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Kind of question a declared prompt asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    #[default]
    Input,
    Confirm,
    Select,
    #[serde(alias = "multi-select")]
    Multiselect,
}

/// One choice of a select prompt, either `value` or `{label, value}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PromptChoice {
    Plain(String),
    Labeled { label: String, value: String },
}

impl From<&PromptChoice> for PromptOption {
    fn from(choice: &PromptChoice) -> Self {
        match choice {
            PromptChoice::Plain(value) => PromptOption::plain(value.clone()),
            PromptChoice::Labeled { label, value } => PromptOption {
                label: label.clone(),
                value: value.clone(),
            },
        }
    }
}

/// A prompt declared in a preset file.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptSpec {
    /// Answer key, read back as `${prompts.<key>}`.
    pub key: String,

    #[serde(alias = "message")]
    pub question: String,

    #[serde(default, rename = "type")]
    pub kind: PromptKind,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub choices: Vec<PromptChoice>,

    /// Guards; the prompt is only asked when all hold.
    #[serde(default, rename = "if", deserialize_with = "one_or_many")]
    pub conditions: Vec<Condition>,
}

impl PromptSpec {
    /// Build the UI prompt, interpolating the question and default.
    pub fn to_prompt(&self, vars: &dyn Variables) -> Result<Prompt> {
        let options = || -> Vec<PromptOption> { self.choices.iter().map(PromptOption::from).collect() };
        let prompt_type = match self.kind {
            PromptKind::Input => PromptType::Input,
            PromptKind::Confirm => PromptType::Confirm,
            PromptKind::Select => PromptType::Select { options: options() },
            PromptKind::Multiselect => PromptType::MultiSelect { options: options() },
        };

        let default = self
            .default
            .as_ref()
            .map(|d| resolve_string(&value_to_string(d), vars))
            .transpose()?;

        Ok(Prompt {
            key: self.key.clone(),
            question: resolve_string(&self.question, vars)?,
            prompt_type,
            default,
        })
    }
}

/// Computes the action list from the context.
pub type ActionsFn = Arc<dyn Fn(&Context) -> anyhow::Result<Vec<Action>>>;

/// Asks questions and returns the answers.
pub type PromptsFn = Arc<dyn Fn(&Context, &mut dyn UserInterface) -> anyhow::Result<ValueMap>>;

/// Where a preset's actions come from.
#[derive(Clone, Default)]
pub enum Actions {
    #[default]
    None,
    Declared(Vec<Action>),
    Dynamic(ActionsFn),
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Declared(actions) => f.debug_tuple("Declared").field(actions).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

/// How a preset asks its questions.
#[derive(Clone, Default)]
pub enum Prompts {
    #[default]
    None,
    Declared(Vec<PromptSpec>),
    Callback(PromptsFn),
}

impl fmt::Debug for Prompts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Declared(prompts) => f.debug_tuple("Declared").field(prompts).finish(),
            Self::Callback(_) => f.write_str("Callback(<fn>)"),
        }
    }
}

/// A loaded preset.
#[derive(Debug, Clone)]
pub struct PresetDefinition {
    pub name: String,
    pub description: Option<String>,
    pub options: BTreeMap<String, OptionSpec>,
    pub prompts: Prompts,
    pub actions: Actions,
    /// Runs instead of the action list when set.
    pub handler: Option<HookAction>,
    /// Template directory, relative to `root`.
    pub templates: PathBuf,
    /// Directory the preset lives in.
    pub root: PathBuf,
}

impl PresetDefinition {
    /// An empty preset rooted at the current directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            options: BTreeMap::new(),
            prompts: Prompts::None,
            actions: Actions::None,
            handler: None,
            templates: PathBuf::from(DEFAULT_TEMPLATES),
            root: PathBuf::from("."),
        }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn templates(mut self, templates: impl Into<PathBuf>) -> Self {
        self.templates = templates.into();
        self
    }

    pub fn option(mut self, name: impl Into<String>, spec: OptionSpec) -> Self {
        self.options.insert(name.into(), spec);
        self
    }

    pub fn actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = Actions::Declared(actions);
        self
    }

    pub fn actions_fn(
        mut self,
        f: impl Fn(&Context) -> anyhow::Result<Vec<Action>> + 'static,
    ) -> Self {
        self.actions = Actions::Dynamic(Arc::new(f));
        self
    }

    pub fn prompts(mut self, prompts: Vec<PromptSpec>) -> Self {
        self.prompts = Prompts::Declared(prompts);
        self
    }

    pub fn prompts_fn(
        mut self,
        f: impl Fn(&Context, &mut dyn UserInterface) -> anyhow::Result<ValueMap> + 'static,
    ) -> Self {
        self.prompts = Prompts::Callback(Arc::new(f));
        self
    }

    pub fn handler(mut self, handler: HookAction) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Absolute (or root-relative) template directory.
    pub fn template_dir(&self) -> PathBuf {
        self.root.join(&self.templates)
    }

    /// Whether the preset does nothing when applied.
    pub fn is_noop(&self) -> bool {
        self.handler.is_none() && matches!(self.actions, Actions::None)
    }
}

/// On-disk shape of `preset.yml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PresetFile {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<String>,
    #[serde(default)]
    templates: Option<PathBuf>,
    #[serde(default)]
    options: BTreeMap<String, OptionSpec>,
    #[serde(default)]
    prompts: Vec<PromptSpec>,
    #[serde(default)]
    actions: Option<Vec<serde_yaml::Value>>,
    #[serde(default)]
    handler: Option<HookAction>,
}

impl PresetFile {
    /// Validate and turn into a definition rooted at `root`.
    pub(crate) fn into_definition(self, root: &Path) -> anyhow::Result<PresetDefinition> {
        if self.name.trim().is_empty() {
            anyhow::bail!("preset name must not be empty");
        }
        if self.actions.is_some() && self.handler.is_some() {
            anyhow::bail!("preset '{}' declares both `actions` and `handler`", self.name);
        }
        for (key, spec) in &self.options {
            if let Some(default) = &spec.default {
                let fits = matches!(
                    (spec.kind, default),
                    (OptionKind::String, Value::String(_))
                        | (OptionKind::Boolean, Value::Bool(_))
                        | (OptionKind::Number, Value::Number(_))
                        | (_, Value::Null)
                );
                if !fits {
                    anyhow::bail!(
                        "default for option '{}' is not a {}: {}",
                        key,
                        spec.kind,
                        default
                    );
                }
            }
        }

        let actions = self
            .actions
            .map(|actions| {
                actions
                    .into_iter()
                    .enumerate()
                    .map(|(index, value)| {
                        Action::from_yaml(value).with_context(|| format!("action #{index}"))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(PresetDefinition {
            name: self.name,
            description: self.description,
            options: self.options,
            prompts: if self.prompts.is_empty() {
                Prompts::None
            } else {
                Prompts::Declared(self.prompts)
            },
            actions: actions.map(Actions::Declared).unwrap_or_default(),
            handler: self.handler,
            templates: self
                .templates
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES)),
            root: root.to_path_buf(),
        })
    }
}
