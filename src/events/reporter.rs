//! Console rendering of lifecycle events.

use super::{Event, EventBus, MessagePhase, Subscription};
use crate::ui::{OutputMode, PresetTheme};
use console::Term;
use std::io::Write;

/// Prints events to the terminal according to the output mode.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    mode: OutputMode,
    theme: PresetTheme,
}

impl ConsoleReporter {
    /// Create a reporter using the terminal's color support.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: PresetTheme::detect(),
        }
    }

    /// Create a reporter without colors.
    pub fn plain(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: PresetTheme::plain(),
        }
    }

    /// Subscribe the reporter to every event on `bus`.
    pub fn attach(self, bus: &EventBus) -> Subscription {
        let stdout = Term::stdout();
        let stderr = Term::stderr();
        bus.subscribe_all(move |event| {
            if let Some(line) = self.render(event) {
                let mut term = if matches!(event, Event::ActionFailed { .. } | Event::RunFailed { .. })
                {
                    &stderr
                } else {
                    &stdout
                };
                writeln!(term, "{}", line)?;
            }
            Ok(())
        })
    }

    /// Text for one event, or `None` when the mode hides it.
    pub fn render(&self, event: &Event) -> Option<String> {
        let progress = self.mode.shows_progress();
        let verbose = self.mode.shows_command_output();
        let theme = &self.theme;

        match event {
            Event::ResolveStarted { identifier } if verbose => {
                Some(theme.dim.apply_to(format!("Resolving {}", identifier)).to_string())
            }
            Event::ResolveCompleted { path, temporary } if verbose => Some(
                theme
                    .dim
                    .apply_to(format!(
                        "Resolved to {}{}",
                        path.display(),
                        if *temporary { " (temporary)" } else { "" }
                    ))
                    .to_string(),
            ),
            Event::PresetLoaded { name } if progress => {
                Some(format!("Applying {}", theme.highlight.apply_to(name)))
            }
            Event::PlanCompleted { actions, skipped } if verbose => Some(
                theme
                    .dim
                    .apply_to(format!("{} action(s) planned, {} skipped", actions, skipped))
                    .to_string(),
            ),
            Event::ActionStarted { kind, title, .. } if progress => {
                let label = match title {
                    Some(title) => title.clone(),
                    None => kind.to_string(),
                };
                Some(theme.format_action(&label))
            }
            Event::ActionMessage { phase, text, .. } if progress => Some(match phase {
                MessagePhase::Before => format!("  {}", text),
                MessagePhase::After => format!("  {}", theme.success.apply_to(text)),
            }),
            Event::FileWritten { path } if progress => Some(format!(
                "  {} {}",
                theme.success.apply_to("+"),
                theme.path.apply_to(path.display())
            )),
            Event::FileDeleted { path } if progress => Some(format!(
                "  {} {}",
                theme.warning.apply_to("-"),
                theme.path.apply_to(path.display())
            )),
            Event::FileSkipped { path } if progress => Some(format!(
                "  {}",
                theme.format_skipped(&format!("{} (exists)", path.display()))
            )),
            Event::HookOutput { line, .. } if verbose => {
                Some(format!("  {} {}", theme.dim.apply_to("│"), line))
            }
            Event::Cleanup { path } if verbose => Some(
                theme
                    .dim
                    .apply_to(format!("Removed {}", path.display()))
                    .to_string(),
            ),
            Event::ActionFailed { error, .. } if self.mode.shows_status() => {
                Some(format!("  {}", theme.format_error(error)))
            }
            Event::RunCompleted { preset, actions } if self.mode.shows_status() => {
                Some(theme.format_success(&format!(
                    "Applied {} ({} action{})",
                    preset,
                    actions,
                    if *actions == 1 { "" } else { "s" }
                )))
            }
            _ => None,
        }
    }
}
