//! `hook`: run shell commands and callbacks in the target directory.

use super::unexpected;
use crate::actions::dispatcher::{Handler, HandlerEnv};
use crate::actions::types::{ActionKind, ActionType, HookAction};
use crate::context::{value_to_string, Context};
use crate::error::HandlerError;
use crate::events::Event;
use crate::shell::{execute_streaming, CommandOptions};
use std::collections::HashMap;

/// Prefix of the environment variables passed to hook commands.
pub const HOOK_ENV_PREFIX: &str = "PRESET_";

/// Runs hook commands in order, then the hook's callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookHandler;

impl Handler for HookHandler {
    fn action_type(&self) -> ActionType {
        ActionType::Hook
    }

    fn handle(&self, action: &ActionKind, env: &mut HandlerEnv<'_>) -> Result<(), HandlerError> {
        let ActionKind::Hook(hook) = action else {
            return Err(unexpected(ActionType::Hook, action));
        };
        run_hook(hook, env)
    }
}

fn run_hook(hook: &HookAction, env: &mut HandlerEnv<'_>) -> Result<(), HandlerError> {
    let options = CommandOptions {
        cwd: Some(env.options.target_dir.clone()),
        env: hook_env(env.context),
    };

    for command in &hook.run {
        tracing::debug!("Running hook: {}", command);
        let events = env.events;
        let result = execute_streaming(command, &options, &mut |line| {
            events.publish(Event::HookOutput {
                stderr: line.is_stderr(),
                line: line.text().to_string(),
            });
        })
        .map_err(|e| HandlerError::io(&env.options.target_dir, e))?;

        if !result.success {
            return Err(HandlerError::HookFailed {
                command: command.clone(),
                code: result.exit_code,
            });
        }
    }

    for callback in &hook.callbacks {
        callback.call(env.context).map_err(HandlerError::Callback)?;
    }

    Ok(())
}

/// Environment exposing the run context to hook commands.
fn hook_env(context: &Context) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    let mut set = |key: &str, value: String| {
        vars.insert(format!("{HOOK_ENV_PREFIX}{key}"), value);
    };

    set("TARGET_DIR", context.target_dir().display().to_string());
    set("PRESET_DIR", context.preset_dir().display().to_string());
    set("PRESET_NAME", context.preset_name().to_string());
    set("ARGS", context.args().join(" "));
    for (name, value) in context.options() {
        set(&format!("OPTION_{}", env_key(name)), value_to_string(value));
    }
    vars
}

fn env_key(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
