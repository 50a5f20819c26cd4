//! Running presets end to end.
//!
//! [`Pipeline::run`] drives one invocation:
//!
//! ```text
//! resolve -> locate -> load -> build context -> prompts -> plan -> dispatch
//! ```
//!
//! Every transition is published on the run's event bus. Scratch
//! directories from remote resolution are owned by a [`ScratchGuard`] and
//! removed when the run ends, however it ends.

pub mod cleanup;
pub mod pipeline;
pub mod report;

pub use cleanup::ScratchGuard;
pub use pipeline::{ApplyRequest, Pipeline};
pub use report::{format_duration, RunReport};
