//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{PresetError, Result};

use super::theme::PresetTheme;
use super::{parse_answer, OutputMode, Prompt, PromptResult, UserInterface};

/// Prefix of environment variables that answer prompts.
pub const PROMPT_ENV_PREFIX: &str = "PRESET_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `PRESET_PROMPT_<KEY>` environment variables,
/// then from the prompt's default; anything else is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: PresetTheme,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self::with_overrides(mode, env_overrides)
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            theme: PresetTheme::plain(),
            env_overrides: overrides,
        }
    }

    fn env_key(key: &str) -> String {
        let key: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}{}", PROMPT_ENV_PREFIX, key)
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        if let Some(value) = self.env_overrides.get(&Self::env_key(&prompt.key)) {
            tracing::debug!("Answering prompt '{}' from environment", prompt.key);
            return Ok(parse_answer(&prompt.prompt_type, value));
        }

        if let Some(default) = &prompt.default {
            return Ok(parse_answer(&prompt.prompt_type, default));
        }

        Err(PresetError::PromptUnavailable {
            key: prompt.key.clone(),
        })
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
