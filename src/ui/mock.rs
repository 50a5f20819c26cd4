//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined prompt responses.
//!
//! # Example
//!
//! ```
//! use preset::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("overwrite", "yes");
//!
//! let answer = ui.prompt(&Prompt::confirm("overwrite", "Overwrite?")).unwrap();
//! assert_eq!(answer.as_bool(), Some(true));
//! assert_eq!(ui.prompts_shown(), ["overwrite"]);
//! ```

use std::collections::{HashMap, VecDeque};

use crate::error::Result;

use super::{parse_answer, OutputMode, Prompt, PromptResult, PromptType, UserInterface};

/// Mock UI implementation for testing.
///
/// Supports both single responses (via `set_prompt_response`) and queued
/// responses (via `queue_prompt_responses`) for keys asked multiple times.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    prompt_responses: HashMap<String, String>,
    prompt_queues: HashMap<String, VecDeque<String>>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    /// Create an interactive MockUI with Normal output mode.
    pub fn new() -> Self {
        Self {
            mode: OutputMode::Normal,
            interactive: true,
            ..Default::default()
        }
    }

    /// Create a MockUI that reports itself as non-interactive.
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ..Self::new()
        }
    }

    /// Set a response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    /// Queue multiple responses for the same prompt key.
    ///
    /// Responses are returned in order. After the queue is exhausted,
    /// falls back to `set_prompt_response` or defaults.
    pub fn queue_prompt_responses(&mut self, key: &str, responses: Vec<&str>) {
        let queue = responses.into_iter().map(|s| s.to_string()).collect();
        self.prompt_queues.insert(key.to_string(), queue);
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Get all captured messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all prompts that were shown (by key).
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Check if a specific message was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        let queued = self
            .prompt_queues
            .get_mut(&prompt.key)
            .and_then(|queue| queue.pop_front());

        let scripted = queued
            .or_else(|| self.prompt_responses.get(&prompt.key).cloned())
            .or_else(|| prompt.default.clone());

        if let Some(response) = scripted {
            return Ok(parse_answer(&prompt.prompt_type, &response));
        }

        // Type-appropriate empty answer as a last resort
        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(false),
            PromptType::MultiSelect { .. } => PromptResult::Strings(Vec::new()),
            _ => PromptResult::String(String::new()),
        })
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptOption;

    #[test]
    fn captures_output() {
        let mut ui = MockUI::new();
        ui.message("hello");
        ui.success("done");
        ui.warning("careful");
        ui.error("broken");

        assert!(ui.has_message("hell"));
        assert_eq!(ui.successes(), ["done"]);
        assert_eq!(ui.warnings(), ["careful"]);
        assert_eq!(ui.errors(), ["broken"]);
    }

    #[test]
    fn queued_responses_come_first_in_order() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("name", "fallback");
        ui.queue_prompt_responses("name", vec!["one", "two"]);

        let prompt = Prompt {
            key: "name".to_string(),
            question: "Name?".to_string(),
            prompt_type: PromptType::Input,
            default: None,
        };

        assert_eq!(ui.prompt(&prompt).unwrap().as_string(), "one");
        assert_eq!(ui.prompt(&prompt).unwrap().as_string(), "two");
        assert_eq!(ui.prompt(&prompt).unwrap().as_string(), "fallback");
        assert_eq!(ui.prompts_shown().len(), 3);
    }

    #[test]
    fn falls_back_to_prompt_default() {
        let mut ui = MockUI::new();
        let prompt = Prompt {
            key: "features".to_string(),
            question: "Features?".to_string(),
            prompt_type: PromptType::MultiSelect {
                options: vec![PromptOption::plain("db"), PromptOption::plain("cache")],
            },
            default: Some("db,cache".to_string()),
        };

        assert_eq!(
            ui.prompt(&prompt).unwrap(),
            PromptResult::Strings(vec!["db".into(), "cache".into()])
        );
    }

    #[test]
    fn unscripted_confirm_is_false() {
        let mut ui = MockUI::new();
        let result = ui.prompt(&Prompt::confirm("x", "X?")).unwrap();
        assert_eq!(result, PromptResult::Bool(false));
    }

    #[test]
    fn interactivity_is_configurable() {
        assert!(MockUI::new().is_interactive());
        assert!(!MockUI::non_interactive().is_interactive());
    }
}
