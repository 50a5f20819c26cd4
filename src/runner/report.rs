//! Summary of one run.

use crate::events::{Event, EventBus, Subscription};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub preset: String,
    pub actions_run: usize,
    pub actions_skipped: usize,
    pub files_written: usize,
    pub files_skipped: usize,
    pub files_deleted: usize,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl RunReport {
    /// One-line summary for the CLI.
    pub fn summary(&self) -> String {
        let mut parts = vec![plural(self.files_written, "file", "written")];
        if self.files_skipped > 0 {
            parts.push(plural(self.files_skipped, "file", "skipped"));
        }
        if self.files_deleted > 0 {
            parts.push(plural(self.files_deleted, "file", "deleted"));
        }
        if self.actions_skipped > 0 {
            parts.push(plural(self.actions_skipped, "action", "not applicable"));
        }
        format!("{} in {}", parts.join(", "), format_duration(self.duration))
    }
}

fn plural(count: usize, noun: &str, what: &str) -> String {
    let s = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{s} {what}")
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    actions_run: usize,
    files_written: usize,
    files_skipped: usize,
    files_deleted: usize,
}

/// Counts file and action events while a run is in progress.
pub(crate) struct ReportCounter {
    counts: Rc<RefCell<Counts>>,
    subscription: Subscription,
    started_at: DateTime<Utc>,
}

impl ReportCounter {
    pub(crate) fn attach(bus: &EventBus) -> Self {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let sink = Rc::clone(&counts);
        let subscription = bus.subscribe_all(move |event| {
            let mut counts = sink.borrow_mut();
            match event {
                Event::ActionCompleted { .. } => counts.actions_run += 1,
                Event::FileWritten { .. } => counts.files_written += 1,
                Event::FileSkipped { .. } => counts.files_skipped += 1,
                Event::FileDeleted { .. } => counts.files_deleted += 1,
                _ => {}
            }
            Ok(())
        });

        Self {
            counts,
            subscription,
            started_at: Utc::now(),
        }
    }

    /// Stop counting without a report.
    pub(crate) fn detach(self) {
        self.subscription.unsubscribe();
    }

    /// Stop counting and build the report.
    pub(crate) fn finish(self, preset: String, actions_skipped: usize) -> RunReport {
        self.subscription.unsubscribe();
        let counts = *self.counts.borrow();
        let duration = (Utc::now() - self.started_at).to_std().unwrap_or_default();

        RunReport {
            preset,
            actions_run: counts.actions_run,
            actions_skipped,
            files_written: counts.files_written,
            files_skipped: counts.files_skipped,
            files_deleted: counts.files_deleted,
            started_at: self.started_at,
            duration,
        }
    }
}
