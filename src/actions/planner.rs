//! Turning a preset definition into the list of actions to run.

use super::condition::evaluate;
use super::types::{Action, HookAction};
use crate::config::resolve_string;
use crate::context::Context;
use crate::error::{PresetError, Result};
use crate::preset::{Actions, PresetDefinition};

/// An action that passed its guards, with its strings interpolated.
#[derive(Debug, Clone)]
pub struct PlannedAction {
    /// Position in the preset's declared list.
    pub index: usize,
    pub action: Action,
}

/// What a run will execute.
#[derive(Debug, Clone)]
pub enum Plan {
    /// Actions in execution order.
    Actions {
        actions: Vec<PlannedAction>,
        skipped: usize,
    },
    /// A single handler that replaces the action list.
    ///
    /// It is dispatched as hook action #0 through the same
    /// [`HandlerRegistry`] as declared actions. With hooks disabled it fails
    /// like any other hook, and a run publishes the usual `actionStarted`
    /// and `actionCompleted` or `actionFailed` events for it.
    ///
    /// [`HandlerRegistry`]: crate::actions::HandlerRegistry
    Handler(HookAction),
    /// Nothing to do.
    Empty,
}

impl Plan {
    /// Number of actions that will run.
    pub fn len(&self) -> usize {
        match self {
            Plan::Actions { actions, .. } => actions.len(),
            Plan::Handler(_) => 1,
            Plan::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of actions dropped by their guards.
    pub fn skipped(&self) -> usize {
        match self {
            Plan::Actions { skipped, .. } => *skipped,
            _ => 0,
        }
    }
}

/// Compute the plan for `definition` under `context`.
///
/// Guards are evaluated in declaration order, before any interpolation of the
/// action itself, so an excluded action may reference variables that do not
/// exist.
pub fn plan(definition: &PresetDefinition, context: &Context) -> Result<Plan> {
    if let Some(handler) = &definition.handler {
        if !matches!(definition.actions, Actions::None) {
            tracing::warn!(
                "Preset '{}' has both a handler and actions; the handler wins",
                definition.name
            );
        }
        let run = handler
            .run
            .iter()
            .map(|command| resolve_string(command, context))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Plan::Handler(HookAction {
            run,
            callbacks: handler.callbacks.clone(),
        }));
    }

    let candidates = match &definition.actions {
        Actions::None => return Ok(Plan::Empty),
        Actions::Declared(actions) => actions.clone(),
        Actions::Dynamic(compute) => compute(context).map_err(|source| PresetError::Plan {
            preset: definition.name.clone(),
            source,
        })?,
    };

    let mut actions = Vec::with_capacity(candidates.len());
    let mut skipped = 0;

    for (index, action) in candidates.into_iter().enumerate() {
        if !evaluate(&action.conditions, context)? {
            tracing::debug!("Action #{} ({}) skipped by condition", index, action.action_type());
            skipped += 1;
            continue;
        }
        actions.push(PlannedAction {
            index,
            action: action.render(context)?,
        });
    }

    tracing::debug!("Planned {} action(s), {} skipped", actions.len(), skipped);
    Ok(Plan::Actions { actions, skipped })
}
