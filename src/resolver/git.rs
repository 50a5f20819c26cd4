//! Presets in git repositories.
//!
//! Accepted forms, each with optional `@ref` and `#subdirectory`:
//!
//! - `https://host/org/repo(.git)` (also `http`, `ssh`, `git`, `file`)
//! - `git@host:org/repo(.git)`
//! - `gh:org/repo`
//! - `org/repo`, expanded against the configured git host

use super::{scratch_dir, ResolveStrategy, ResolverResult};
use crate::error::ResolutionError;
use anyhow::{anyhow, Context as _};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

static URL_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<url>(?:https?|ssh|git|file)://.+?)(?:@(?P<ref>[^/@]+))?$").unwrap()
});

static SCP_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<url>git@[^:/\s]+:[\w.-]+/[\w.-]+?)(?:@(?P<ref>[^/@]+))?$").unwrap()
});

static GH_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^gh:(?P<org>[\w.-]+)/(?P<repo>[\w.-]+?)(?:@(?P<ref>[^/@]+))?$").unwrap()
});

static SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<org>[A-Za-z0-9][\w.-]*)/(?P<repo>[\w.-]+?)(?:@(?P<ref>[^/@]+))?$").unwrap()
});

/// A parsed git preset identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitReference {
    /// URL handed to `git clone`.
    pub url: String,
    /// Branch or tag to check out.
    pub git_ref: Option<String>,
    /// Directory inside the repository that holds the preset.
    pub subdir: Option<String>,
}

impl GitReference {
    /// Parse `identifier`, expanding short forms against `host`.
    ///
    /// Returns `Ok(None)` when the identifier is not a git reference at all.
    ///
    /// # Errors
    ///
    /// `MalformedRemote` when the identifier starts like a remote but does
    /// not parse, or when the subdirectory escapes the repository.
    pub fn parse(identifier: &str, host: &str) -> Result<Option<Self>, ResolutionError> {
        let malformed = |message: &str| ResolutionError::MalformedRemote {
            identifier: identifier.to_string(),
            message: message.to_string(),
        };

        let (spec, subdir) = match identifier.rsplit_once('#') {
            Some((spec, subdir)) => (spec, Some(subdir)),
            None => (identifier, None),
        };
        let subdir = subdir.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty());
        if let Some(subdir) = subdir {
            if Path::new(subdir)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
            {
                return Err(malformed("subdirectory must stay inside the repository"));
            }
        }

        let host = host.trim_end_matches('/');
        let parsed = if let Some(caps) = URL_FORM.captures(spec) {
            Some((caps["url"].to_string(), caps.name("ref")))
        } else if let Some(caps) = SCP_FORM.captures(spec) {
            Some((caps["url"].to_string(), caps.name("ref")))
        } else if let Some(caps) = GH_FORM.captures(spec) {
            Some((
                format!("{}/{}/{}", host, &caps["org"], &caps["repo"]),
                caps.name("ref"),
            ))
        } else if let Some(caps) = SHORTHAND.captures(spec) {
            Some((
                format!("{}/{}/{}", host, &caps["org"], &caps["repo"]),
                caps.name("ref"),
            ))
        } else {
            None
        };

        match parsed {
            Some((url, git_ref)) => Ok(Some(Self {
                url,
                git_ref: git_ref.map(|m| m.as_str().to_string()),
                subdir: subdir.map(str::to_string),
            })),
            None if spec.starts_with("git@") => Err(malformed("expected git@host:org/repo")),
            None if spec.starts_with("gh:") => Err(malformed("expected gh:org/repo")),
            None if spec.contains("://") => Err(malformed("unsupported URL scheme")),
            None => Ok(None),
        }
    }
}

/// Shallow-clones git presets into a scratch directory.
#[derive(Debug, Clone)]
pub struct GitStrategy {
    host: String,
    scratch_parent: Option<PathBuf>,
}

impl GitStrategy {
    /// Expand `gh:` and `org/repo` forms against `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            scratch_parent: None,
        }
    }

    /// Create scratch directories under `parent` instead of the system temp dir.
    pub fn scratch_in(mut self, parent: Option<PathBuf>) -> Self {
        self.scratch_parent = parent;
        self
    }

    fn clone_into(&self, reference: &GitReference, dest: &Path) -> anyhow::Result<()> {
        let mut cmd = Command::new("git");
        cmd.args(["clone", "--quiet", "--depth", "1"]);
        if let Some(git_ref) = &reference.git_ref {
            cmd.args(["--branch", git_ref]);
        }
        cmd.arg(&reference.url)
            .arg(dest)
            .env("GIT_TERMINAL_PROMPT", "0");

        let output = cmd.output().context("Failed to run git")?;
        if !output.status.success() {
            return Err(anyhow!(
                "git clone failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(())
    }
}

impl ResolveStrategy for GitStrategy {
    fn name(&self) -> &'static str {
        "git"
    }

    fn resolve(&self, identifier: &str) -> Result<ResolverResult, ResolutionError> {
        let Some(reference) = GitReference::parse(identifier, &self.host)? else {
            return Ok(ResolverResult::not_applicable());
        };
        let fetch_error = |source: anyhow::Error| ResolutionError::RemoteFetch {
            identifier: identifier.to_string(),
            source,
        };

        let scratch = scratch_dir("preset-git-", self.scratch_parent.as_deref())
            .context("Failed to create scratch directory")
            .map_err(fetch_error)?;

        tracing::info!("Cloning {}", reference.url);
        self.clone_into(&reference, scratch.path())
            .map_err(fetch_error)?;

        let root = scratch.keep();
        let path = match &reference.subdir {
            Some(subdir) => root.join(subdir),
            None => root.clone(),
        };
        Ok(ResolverResult::temporary(path, root))
    }
}
