//! Lifecycle events published during a run.

use crate::actions::ActionType;
use std::fmt;
use std::path::PathBuf;

/// Which side of an action a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePhase {
    Before,
    After,
}

/// A lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ResolveStarted {
        identifier: String,
    },
    ResolveCompleted {
        path: PathBuf,
        temporary: bool,
    },
    PresetLocated {
        path: PathBuf,
    },
    PresetLoaded {
        name: String,
    },
    ContextBuilt,
    PlanCompleted {
        actions: usize,
        skipped: usize,
    },
    ActionStarted {
        index: usize,
        kind: ActionType,
        title: Option<String>,
    },
    ActionMessage {
        index: usize,
        phase: MessagePhase,
        text: String,
    },
    ActionCompleted {
        index: usize,
        kind: ActionType,
    },
    ActionFailed {
        index: usize,
        kind: ActionType,
        error: String,
    },
    FileWritten {
        path: PathBuf,
    },
    FileSkipped {
        path: PathBuf,
    },
    FileDeleted {
        path: PathBuf,
    },
    HookOutput {
        line: String,
        stderr: bool,
    },
    Cleanup {
        path: PathBuf,
    },
    RunCompleted {
        preset: String,
        actions: usize,
    },
    RunFailed {
        error: String,
    },
}

/// Discriminant of an [`Event`], used to subscribe to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ResolveStarted,
    ResolveCompleted,
    PresetLocated,
    PresetLoaded,
    ContextBuilt,
    PlanCompleted,
    ActionStarted,
    ActionMessage,
    ActionCompleted,
    ActionFailed,
    FileWritten,
    FileSkipped,
    FileDeleted,
    HookOutput,
    Cleanup,
    RunCompleted,
    RunFailed,
}

impl EventKind {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResolveStarted => "resolveStarted",
            Self::ResolveCompleted => "resolveCompleted",
            Self::PresetLocated => "presetLocated",
            Self::PresetLoaded => "presetLoaded",
            Self::ContextBuilt => "contextBuilt",
            Self::PlanCompleted => "planCompleted",
            Self::ActionStarted => "actionStarted",
            Self::ActionMessage => "actionMessage",
            Self::ActionCompleted => "actionCompleted",
            Self::ActionFailed => "actionFailed",
            Self::FileWritten => "fileWritten",
            Self::FileSkipped => "fileSkipped",
            Self::FileDeleted => "fileDeleted",
            Self::HookOutput => "hookOutput",
            Self::Cleanup => "cleanup",
            Self::RunCompleted => "runCompleted",
            Self::RunFailed => "runFailed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Event {
    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ResolveStarted { .. } => EventKind::ResolveStarted,
            Self::ResolveCompleted { .. } => EventKind::ResolveCompleted,
            Self::PresetLocated { .. } => EventKind::PresetLocated,
            Self::PresetLoaded { .. } => EventKind::PresetLoaded,
            Self::ContextBuilt => EventKind::ContextBuilt,
            Self::PlanCompleted { .. } => EventKind::PlanCompleted,
            Self::ActionStarted { .. } => EventKind::ActionStarted,
            Self::ActionMessage { .. } => EventKind::ActionMessage,
            Self::ActionCompleted { .. } => EventKind::ActionCompleted,
            Self::ActionFailed { .. } => EventKind::ActionFailed,
            Self::FileWritten { .. } => EventKind::FileWritten,
            Self::FileSkipped { .. } => EventKind::FileSkipped,
            Self::FileDeleted { .. } => EventKind::FileDeleted,
            Self::HookOutput { .. } => EventKind::HookOutput,
            Self::Cleanup { .. } => EventKind::Cleanup,
            Self::RunCompleted { .. } => EventKind::RunCompleted,
            Self::RunFailed { .. } => EventKind::RunFailed,
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_camel_case() {
        assert_eq!(EventKind::ActionCompleted.name(), "actionCompleted");
        assert_eq!(EventKind::Cleanup.to_string(), "cleanup");
        assert_eq!(
            Event::ResolveStarted {
                identifier: "x".into()
            }
            .name(),
            "resolveStarted"
        );
    }

    #[test]
    fn kind_matches_variant() {
        let event = Event::ActionFailed {
            index: 0,
            kind: ActionType::Copy,
            error: "boom".into(),
        };
        assert_eq!(event.kind(), EventKind::ActionFailed);
        assert_eq!(Event::ContextBuilt.kind(), EventKind::ContextBuilt);
    }
}
