//! Removal of scratch directories created during resolution.

use crate::events::{Event, EventBus};
use std::fs;
use std::path::PathBuf;

/// Owns the scratch directories of one run and removes them when dropped,
/// whether the run succeeded, failed or panicked.
pub struct ScratchGuard {
    paths: Vec<PathBuf>,
    events: EventBus,
}

impl ScratchGuard {
    pub fn new(events: EventBus) -> Self {
        Self {
            paths: Vec::new(),
            events,
        }
    }

    /// Take ownership of `path`.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Directories still waiting for removal.
    pub fn tracked(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remove every tracked directory now.
    pub fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    tracing::debug!("Removed scratch directory {}", path.display());
                    self.events.publish(Event::Cleanup { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}
