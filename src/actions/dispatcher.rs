//! Routing planned actions to their handlers.

use super::conflict::ConflictStrategy;
use super::handlers::{CopyHandler, DeleteHandler, EditJsonHandler, HookHandler, NoneHandler};
use super::planner::PlannedAction;
use super::types::{ActionKind, ActionType};
use crate::config::Settings;
use crate::context::Context;
use crate::error::{error_summary, HandlerError, PresetError, Result};
use crate::events::{Event, EventBus, MessagePhase};
use crate::ui::UserInterface;
use std::collections::HashMap;
use std::path::PathBuf;

/// Where handlers read from and write to.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Directory the preset is applied to.
    pub target_dir: PathBuf,
    /// Directory copy actions read from.
    pub template_dir: PathBuf,
    /// Strategy for copy actions that do not declare one.
    pub default_strategy: ConflictStrategy,
}

/// Everything a handler may use while applying one action.
pub struct HandlerEnv<'a> {
    pub context: &'a Context,
    pub options: &'a ExecutionOptions,
    pub events: &'a EventBus,
    pub ui: &'a mut dyn UserInterface,
}

/// Applies one type of action.
pub trait Handler {
    /// The action type this handler applies.
    fn action_type(&self) -> ActionType;

    /// Apply `action` to the target directory.
    fn handle(&self, action: &ActionKind, env: &mut HandlerEnv<'_>) -> std::result::Result<(), HandlerError>;
}

/// Table of handlers, keyed by action type. Built once per process.
pub struct HandlerRegistry {
    handlers: HashMap<ActionType, Box<dyn Handler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("HandlerRegistry").field("types", &types).finish()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl HandlerRegistry {
    /// A registry with no handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with the built-in handler for every action type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(CopyHandler);
        registry.register(DeleteHandler);
        registry.register(EditJsonHandler);
        registry.register(HookHandler);
        registry.register(NoneHandler);
        registry
    }

    /// The built-in handlers, without hooks when settings disable them.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut registry = Self::with_defaults();
        if !settings.hooks {
            tracing::debug!("Hooks disabled by settings");
            registry.unregister(ActionType::Hook);
        }
        registry
    }

    /// Add a handler, replacing any handler for the same type.
    pub fn register(&mut self, handler: impl Handler + 'static) -> &mut Self {
        self.handlers.insert(handler.action_type(), Box::new(handler));
        self
    }

    /// Remove the handler for `kind`.
    pub fn unregister(&mut self, kind: ActionType) -> &mut Self {
        self.handlers.remove(&kind);
        self
    }

    /// Look up the handler for `kind`.
    pub fn get(&self, kind: ActionType) -> Option<&dyn Handler> {
        self.handlers.get(&kind).map(|h| h.as_ref())
    }

    /// Apply one planned action.
    ///
    /// Publishes `actionStarted`, the `before` messages, then either the
    /// `after` messages and `actionCompleted`, or `actionFailed`.
    ///
    /// # Errors
    ///
    /// `ActionDispatch` when no handler is registered for the action's type
    /// (nothing is published), `Handler` when the handler fails.
    pub fn dispatch(&self, planned: &PlannedAction, env: &mut HandlerEnv<'_>) -> Result<()> {
        let PlannedAction { index, action } = planned;
        let index = *index;
        let kind = action.action_type();

        let handler = self
            .get(kind)
            .ok_or(PresetError::ActionDispatch { index, kind })?;

        env.events.publish(Event::ActionStarted {
            index,
            kind,
            title: action.title.clone(),
        });
        publish_messages(env.events, index, MessagePhase::Before, &action.before);

        match handler.handle(&action.kind, env) {
            Ok(()) => {
                publish_messages(env.events, index, MessagePhase::After, &action.after);
                env.events.publish(Event::ActionCompleted { index, kind });
                Ok(())
            }
            Err(source) => {
                tracing::debug!("Action #{} ({}) failed: {}", index, kind, source);
                env.events.publish(Event::ActionFailed {
                    index,
                    kind,
                    error: error_summary(&source),
                });
                Err(PresetError::Handler {
                    index,
                    kind,
                    title: action.title.clone(),
                    source,
                })
            }
        }
    }
}

fn publish_messages(events: &EventBus, index: usize, phase: MessagePhase, messages: &[String]) {
    for text in messages {
        events.publish(Event::ActionMessage {
            index,
            phase,
            text: text.clone(),
        });
    }
}
