//! Actions: what a preset does to the target directory.
//!
//! A preset declares an ordered list of [`Action`]s. The [`planner`] filters
//! them by their `if` guards and interpolates their strings; the
//! [`HandlerRegistry`] then routes each planned action to the handler for its
//! type.
//!
//! | Type        | Effect                                              |
//! |-------------|-----------------------------------------------------|
//! | `copy`      | Copy template files, resolving conflicts per file   |
//! | `delete`    | Remove files or directories from the target         |
//! | `edit-json` | Deep-merge a patch into a JSON file, drop key paths |
//! | `hook`      | Run shell commands and callbacks                    |
//! | `none`      | Show the action's messages only                     |

pub mod condition;
pub mod conflict;
pub mod dispatcher;
pub mod handlers;
pub mod planner;
pub mod types;

pub use condition::{evaluate, evaluate_expression};
pub use conflict::{resolve_conflict, ConflictStrategy, Decision};
pub use dispatcher::{ExecutionOptions, Handler, HandlerEnv, HandlerRegistry};
pub use handlers::{CopyHandler, DeleteHandler, EditJsonHandler, HookHandler};
pub use planner::{plan, Plan, PlannedAction};
pub use types::{
    Action, ActionKind, ActionType, Condition, CopyAction, DeleteAction, EditJsonAction,
    HookAction, HookFn, Predicate,
};
