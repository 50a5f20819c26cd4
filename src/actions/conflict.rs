//! Conflict resolution for copy destinations that already exist.

use crate::error::HandlerError;
use crate::ui::{Prompt, UserInterface};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Policy for a copy destination that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Ask the user; skip when nobody can answer.
    #[default]
    Ask,
    /// Always overwrite.
    #[serde(alias = "overwrite")]
    Override,
    /// Never overwrite.
    Skip,
}

impl FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ask" => Ok(Self::Ask),
            "override" | "overwrite" => Ok(Self::Override),
            "skip" => Ok(Self::Skip),
            _ => Err(format!(
                "unknown conflict strategy '{}' (expected ask, override or skip)",
                s
            )),
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ask => "ask",
            Self::Override => "override",
            Self::Skip => "skip",
        })
    }
}

/// Outcome for one conflicting destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Skip,
}

/// Decide whether `existing` may be overwritten.
///
/// `Ask` defers to the UI. A non-interactive UI, or a prompt with no
/// answer, results in [`Decision::Skip`].
pub fn resolve_conflict(
    strategy: ConflictStrategy,
    existing: &Path,
    ui: &mut dyn UserInterface,
) -> Result<Decision, HandlerError> {
    match strategy {
        ConflictStrategy::Override => Ok(Decision::Proceed),
        ConflictStrategy::Skip => Ok(Decision::Skip),
        ConflictStrategy::Ask if !ui.is_interactive() => {
            tracing::debug!("Non-interactive conflict on {}, skipping", existing.display());
            Ok(Decision::Skip)
        }
        ConflictStrategy::Ask => {
            let prompt = Prompt::confirm(
                format!("overwrite:{}", existing.display()),
                format!("{} already exists. Overwrite?", existing.display()),
            )
            .with_default("false");

            let answer = ui.prompt(&prompt).map_err(|e| HandlerError::Prompt {
                message: e.to_string(),
            })?;

            Ok(if answer.as_bool().unwrap_or(false) {
                Decision::Proceed
            } else {
                Decision::Skip
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn parses_strategies() {
        assert_eq!("ask".parse::<ConflictStrategy>(), Ok(ConflictStrategy::Ask));
        assert_eq!("Override".parse::<ConflictStrategy>(), Ok(ConflictStrategy::Override));
        assert_eq!("overwrite".parse::<ConflictStrategy>(), Ok(ConflictStrategy::Override));
        assert_eq!("skip".parse::<ConflictStrategy>(), Ok(ConflictStrategy::Skip));
        assert!("merge".parse::<ConflictStrategy>().is_err());
    }

    #[test]
    fn deserializes_lowercase_and_alias() {
        let s: ConflictStrategy = serde_yaml::from_str("overwrite").unwrap();
        assert_eq!(s, ConflictStrategy::Override);
        let s: ConflictStrategy = serde_yaml::from_str("skip").unwrap();
        assert_eq!(s, ConflictStrategy::Skip);
    }

    #[test]
    fn override_and_skip_never_prompt() {
        let mut ui = MockUI::new();
        let path = Path::new("a.txt");

        assert_eq!(
            resolve_conflict(ConflictStrategy::Override, path, &mut ui).unwrap(),
            Decision::Proceed
        );
        assert_eq!(
            resolve_conflict(ConflictStrategy::Skip, path, &mut ui).unwrap(),
            Decision::Skip
        );
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn ask_uses_the_answer() {
        let mut ui = MockUI::new();
        ui.queue_prompt_responses("overwrite:a.txt", vec!["yes", "no"]);
        let path = Path::new("a.txt");

        assert_eq!(
            resolve_conflict(ConflictStrategy::Ask, path, &mut ui).unwrap(),
            Decision::Proceed
        );
        assert_eq!(
            resolve_conflict(ConflictStrategy::Ask, path, &mut ui).unwrap(),
            Decision::Skip
        );
    }

    #[test]
    fn ask_defaults_to_skip_without_an_answer() {
        let mut ui = MockUI::new();
        let decision = resolve_conflict(ConflictStrategy::Ask, Path::new("a.txt"), &mut ui).unwrap();
        assert_eq!(decision, Decision::Skip);
    }

    #[test]
    fn ask_skips_when_non_interactive() {
        let mut ui = MockUI::non_interactive();
        ui.set_prompt_response("overwrite:a.txt", "yes");

        let decision = resolve_conflict(ConflictStrategy::Ask, Path::new("a.txt"), &mut ui).unwrap();

        assert_eq!(decision, Decision::Skip);
        assert!(ui.prompts_shown().is_empty());
    }
}
