//! The resolve, load, plan and execute pipeline.

use super::cleanup::ScratchGuard;
use super::report::{ReportCounter, RunReport};
use crate::actions::{
    plan, Action, ActionKind, ConflictStrategy, ExecutionOptions, HandlerEnv, HandlerRegistry,
    Plan, PlannedAction,
};
use crate::config::Settings;
use crate::context::{ContextBuilder, ValueMap};
use crate::error::{error_summary, ResolutionError, Result};
use crate::events::{Event, EventBus};
use crate::preset::{self, PresetDefinition};
use crate::resolver::ResolverChain;
use crate::ui::UserInterface;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Input for one run.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    /// Preset identifier (path, git reference or package name).
    pub identifier: String,
    /// Directory the preset is applied to. Created when missing.
    pub target_dir: PathBuf,
    /// Positional arguments for the preset.
    pub args: Vec<String>,
    /// Flags; option values are taken from flags of the same name.
    pub flags: ValueMap,
    /// Overrides the configured conflict strategy.
    pub strategy: Option<ConflictStrategy>,
    /// Answers that skip the corresponding prompts.
    pub prompt_answers: ValueMap,
}

impl ApplyRequest {
    pub fn new(identifier: impl Into<String>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            target_dir: target_dir.into(),
            args: Vec::new(),
            flags: ValueMap::new(),
            strategy: None,
            prompt_answers: ValueMap::new(),
        }
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn flag(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.flags.insert(name.into(), value.into());
        self
    }

    pub fn strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn answer(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.prompt_answers.insert(key.into(), value.into());
        self
    }
}

/// Applies presets. Built once; each call to [`Pipeline::run`] is one run.
#[derive(Debug)]
pub struct Pipeline {
    settings: Settings,
    resolvers: ResolverChain,
    handlers: HandlerRegistry,
}

impl Pipeline {
    /// Default resolvers and handlers for `settings`. Relative preset paths
    /// are resolved against `cwd`.
    pub fn new(settings: Settings, cwd: &Path) -> Self {
        let resolvers = ResolverChain::from_settings(&settings, cwd);
        let handlers = HandlerRegistry::from_settings(&settings);
        Self::with_parts(settings, resolvers, handlers)
    }

    /// Assemble a pipeline from explicit parts.
    pub fn with_parts(settings: Settings, resolvers: ResolverChain, handlers: HandlerRegistry) -> Self {
        Self {
            settings,
            resolvers,
            handlers,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve, load and apply the preset named by `request.identifier`.
    ///
    /// Scratch directories created by remote resolvers are removed before
    /// this returns, on success and on failure. Files changed by actions that
    /// completed before a failure stay changed.
    ///
    /// # Errors
    ///
    /// Resolution and load errors (nothing has been touched yet), or the
    /// first failing action.
    pub fn run(
        &self,
        request: &ApplyRequest,
        ui: &mut dyn UserInterface,
        bus: &EventBus,
    ) -> Result<RunReport> {
        let counter = ReportCounter::attach(bus);
        let mut scratch = ScratchGuard::new(bus.clone());

        let outcome = self
            .load(request, bus, &mut scratch)
            .and_then(|definition| {
                let skipped = self.apply(&definition, request, ui, bus)?;
                Ok((definition.name, skipped))
            });
        scratch.cleanup();

        finish(outcome, counter, bus)
    }

    /// Apply an already constructed preset, skipping resolution.
    pub fn run_definition(
        &self,
        definition: &PresetDefinition,
        request: &ApplyRequest,
        ui: &mut dyn UserInterface,
        bus: &EventBus,
    ) -> Result<RunReport> {
        let counter = ReportCounter::attach(bus);
        bus.publish(Event::PresetLoaded {
            name: definition.name.clone(),
        });
        let outcome = self
            .apply(definition, request, ui, bus)
            .map(|skipped| (definition.name.clone(), skipped));

        finish(outcome, counter, bus)
    }

    fn load(
        &self,
        request: &ApplyRequest,
        bus: &EventBus,
        scratch: &mut ScratchGuard,
    ) -> Result<PresetDefinition> {
        bus.publish(Event::ResolveStarted {
            identifier: request.identifier.clone(),
        });

        let resolved = self.resolvers.resolve(&request.identifier)?;
        if let Some(root) = resolved.cleanup_root() {
            scratch.track(root);
        }
        let Some(path) = resolved.path else {
            return Err(ResolutionError::NoStrategyMatched {
                identifier: request.identifier.clone(),
            }
            .into());
        };
        bus.publish(Event::ResolveCompleted {
            path: path.clone(),
            temporary: resolved.temporary,
        });

        let located = preset::locate(&path)?;
        bus.publish(Event::PresetLocated {
            path: located.path().to_path_buf(),
        });

        let definition = preset::load(&located)?;
        tracing::debug!("Loaded preset '{}' from {}", definition.name, located.path().display());
        bus.publish(Event::PresetLoaded {
            name: definition.name.clone(),
        });
        Ok(definition)
    }

    /// Build the context, ask prompts, plan and execute. Returns the number
    /// of actions dropped by their guards.
    fn apply(
        &self,
        definition: &PresetDefinition,
        request: &ApplyRequest,
        ui: &mut dyn UserInterface,
        bus: &EventBus,
    ) -> Result<usize> {
        let target_dir = &request.target_dir;
        fs::create_dir_all(target_dir)?;

        let context = ContextBuilder::new(request.args.clone())
            .flags(request.flags.clone())
            .prompt_answers(request.prompt_answers.clone())
            .paths(target_dir, &definition.root)
            .build(&definition.name, &definition.options)?;
        bus.publish(Event::ContextBuilt);

        let context = preset::prompts::ask(&definition.prompts, &context, ui)?;

        let plan = plan(definition, &context)?;
        let skipped = plan.skipped();
        bus.publish(Event::PlanCompleted {
            actions: plan.len(),
            skipped,
        });

        let options = ExecutionOptions {
            target_dir: target_dir.clone(),
            template_dir: definition.template_dir(),
            default_strategy: request.strategy.unwrap_or(self.settings.strategy),
        };
        let mut env = HandlerEnv {
            context: &context,
            options: &options,
            events: bus,
            ui,
        };

        match plan {
            Plan::Empty => {
                tracing::debug!("Preset '{}' has nothing to do", definition.name);
            }
            Plan::Handler(hook) => {
                let planned = PlannedAction {
                    index: 0,
                    action: Action::new(ActionKind::Hook(hook)),
                };
                self.handlers.dispatch(&planned, &mut env)?;
            }
            Plan::Actions { actions, .. } => {
                for planned in &actions {
                    self.handlers.dispatch(planned, &mut env)?;
                }
            }
        }

        Ok(skipped)
    }
}

fn finish(
    outcome: Result<(String, usize)>,
    counter: ReportCounter,
    bus: &EventBus,
) -> Result<RunReport> {
    match outcome {
        Ok((preset, skipped)) => {
            let report = counter.finish(preset, skipped);
            bus.publish(Event::RunCompleted {
                preset: report.preset.clone(),
                actions: report.actions_run,
            });
            Ok(report)
        }
        Err(error) => {
            counter.detach();
            bus.publish(Event::RunFailed {
                error: error_summary(&error),
            });
            Err(error)
        }
    }
}
