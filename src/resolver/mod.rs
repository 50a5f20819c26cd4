//! Turning a preset identifier into a local directory.
//!
//! A [`ResolverChain`] tries its strategies in order and stops at the first
//! one that claims the identifier:
//!
//! 1. [`LocalStrategy`]: an existing directory, or a path-like identifier
//! 2. [`GitStrategy`]: `https://…`, `git@host:org/repo`, `gh:org/repo`, `org/repo`
//! 3. [`RegistryStrategy`]: `npm:name`, `@scope/name`, `name`
//!
//! A strategy either succeeds, declines (the chain moves on), or fails hard
//! (the chain stops). Remote strategies download into a fresh scratch
//! directory and mark the result temporary; removing it is the caller's job.

pub mod git;
pub mod local;
pub mod registry;

pub use git::{GitReference, GitStrategy};
pub use local::LocalStrategy;
pub use registry::{PackageSpec, RegistryStrategy};

use crate::config::Settings;
use crate::error::ResolutionError;
use std::path::{Path, PathBuf};

/// Outcome of one resolution attempt.
///
/// `path` is present exactly when `success` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverResult {
    pub success: bool,
    pub path: Option<PathBuf>,
    /// The path lives in a scratch directory that must be removed after the run.
    pub temporary: bool,
    scratch: Option<PathBuf>,
}

impl ResolverResult {
    /// A directory that already existed on disk.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            success: true,
            path: Some(path.into()),
            temporary: false,
            scratch: None,
        }
    }

    /// A path inside the scratch directory `scratch`, which owns it.
    pub fn temporary(path: impl Into<PathBuf>, scratch: impl Into<PathBuf>) -> Self {
        Self {
            success: true,
            path: Some(path.into()),
            temporary: true,
            scratch: Some(scratch.into()),
        }
    }

    /// The strategy does not handle this identifier.
    pub fn not_applicable() -> Self {
        Self {
            success: false,
            path: None,
            temporary: false,
            scratch: None,
        }
    }

    /// Directory to delete once the run is over, if any.
    pub fn cleanup_root(&self) -> Option<&Path> {
        if !self.temporary {
            return None;
        }
        self.scratch.as_deref().or(self.path.as_deref())
    }
}

/// One way of resolving preset identifiers.
pub trait ResolveStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolve `identifier`, or return [`ResolverResult::not_applicable`].
    ///
    /// # Errors
    ///
    /// A hard failure that must stop the chain (malformed remote, failed
    /// download, missing explicit path).
    fn resolve(&self, identifier: &str) -> Result<ResolverResult, ResolutionError>;
}

/// Ordered list of strategies.
pub struct ResolverChain {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("ResolverChain").field("strategies", &names).finish()
    }
}

impl ResolverChain {
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Local, git and registry strategies configured from `settings`.
    ///
    /// Relative identifiers are resolved against `cwd`.
    pub fn from_settings(settings: &Settings, cwd: &Path) -> Self {
        Self::new(vec![
            Box::new(LocalStrategy::new(cwd)),
            Box::new(GitStrategy::new(&settings.git_host).scratch_in(settings.temp_dir.clone())),
            Box::new(
                RegistryStrategy::new(settings.registry_url()).scratch_in(settings.temp_dir.clone()),
            ),
        ])
    }

    /// Names of the strategies, in order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve `identifier` with the first strategy that accepts it.
    ///
    /// # Errors
    ///
    /// The first hard failure, or `NoStrategyMatched` when every strategy
    /// declines.
    pub fn resolve(&self, identifier: &str) -> Result<ResolverResult, ResolutionError> {
        for strategy in &self.strategies {
            let result = strategy.resolve(identifier)?;
            if result.success {
                tracing::debug!(
                    "Resolved '{}' with {} strategy: {:?}",
                    identifier,
                    strategy.name(),
                    result.path
                );
                return Ok(result);
            }
            tracing::trace!("{} strategy declined '{}'", strategy.name(), identifier);
        }

        Err(ResolutionError::NoStrategyMatched {
            identifier: identifier.to_string(),
        })
    }
}

/// Create a fresh scratch directory for a download.
///
/// The directory is removed when the returned guard drops unless it is kept.
pub(crate) fn scratch_dir(prefix: &str, parent: Option<&Path>) -> std::io::Result<tempfile::TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix);
    match parent {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            builder.tempdir_in(parent)
        }
        None => builder.tempdir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Fixed {
        name: &'static str,
        result: fn() -> Result<ResolverResult, ResolutionError>,
        calls: Rc<Cell<usize>>,
    }

    impl ResolveStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn resolve(&self, _: &str) -> Result<ResolverResult, ResolutionError> {
            self.calls.set(self.calls.get() + 1);
            (self.result)()
        }
    }

    fn fixed(
        name: &'static str,
        result: fn() -> Result<ResolverResult, ResolutionError>,
    ) -> (Box<dyn ResolveStrategy>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let strategy = Fixed {
            name,
            result,
            calls: Rc::clone(&calls),
        };
        (Box::new(strategy), calls)
    }

    #[test]
    fn first_success_wins() {
        let (a, a_calls) = fixed("a", || Ok(ResolverResult::not_applicable()));
        let (b, _) = fixed("b", || Ok(ResolverResult::local("/b")));
        let (c, c_calls) = fixed("c", || Ok(ResolverResult::local("/c")));

        let result = ResolverChain::new(vec![a, b, c]).resolve("x").unwrap();

        assert_eq!(result.path.as_deref(), Some(Path::new("/b")));
        assert_eq!(a_calls.get(), 1);
        assert_eq!(c_calls.get(), 0);
    }

    #[test]
    fn hard_failure_stops_the_chain() {
        let (a, _) = fixed("a", || {
            Err(ResolutionError::MalformedRemote {
                identifier: "x".into(),
                message: "bad".into(),
            })
        });
        let (b, b_calls) = fixed("b", || Ok(ResolverResult::local("/b")));

        let err = ResolverChain::new(vec![a, b]).resolve("x").unwrap_err();

        assert!(matches!(err, ResolutionError::MalformedRemote { .. }));
        assert_eq!(b_calls.get(), 0);
    }

    #[test]
    fn all_declining_is_no_strategy_matched() {
        let (a, _) = fixed("a", || Ok(ResolverResult::not_applicable()));
        let err = ResolverChain::new(vec![a]).resolve("thing").unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::NoStrategyMatched { ref identifier } if identifier == "thing"
        ));
    }

    #[test]
    fn cleanup_root_prefers_scratch() {
        assert_eq!(ResolverResult::local("/a").cleanup_root(), None);
        assert_eq!(
            ResolverResult::temporary("/tmp/x/sub", "/tmp/x").cleanup_root(),
            Some(Path::new("/tmp/x"))
        );
        let result = ResolverResult::not_applicable();
        assert!(!result.success && result.path.is_none());
    }

    #[test]
    fn default_chain_order() {
        let chain = ResolverChain::from_settings(&Settings::default(), Path::new("."));
        assert_eq!(chain.strategy_names(), ["local", "git", "registry"]);
    }
}
