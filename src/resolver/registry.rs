//! Presets published to an npm-compatible package registry.

use super::{scratch_dir, ResolveStrategy, ResolverResult};
use crate::error::ResolutionError;
use anyhow::{anyhow, bail, Context as _};
use flate2::read::GzDecoder;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tar::{Archive, EntryType};

static PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>(?:@[a-z0-9][\w.~-]*/)?[a-z0-9][\w.~-]*)(?:@(?P<version>[^@/\s]+))?$")
        .unwrap()
});

/// A package name with an optional version or dist-tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    /// Parse `npm:name@version`, `@scope/name@version` or `name@version`.
    ///
    /// Returns `Ok(None)` for identifiers that are not package names.
    ///
    /// # Errors
    ///
    /// `MalformedRemote` when an `npm:` identifier is not a valid name.
    pub fn parse(identifier: &str) -> Result<Option<Self>, ResolutionError> {
        let (explicit, spec) = match identifier.strip_prefix("npm:") {
            Some(rest) => (true, rest),
            None => (false, identifier),
        };

        match PACKAGE.captures(spec) {
            Some(caps) => Ok(Some(Self {
                name: caps["name"].to_string(),
                version: caps.name("version").map(|m| m.as_str().to_string()),
            })),
            None if explicit => Err(ResolutionError::MalformedRemote {
                identifier: identifier.to_string(),
                message: "expected npm:name[@version]".to_string(),
            }),
            None => Ok(None),
        }
    }

    /// Name as it appears in a registry URL (`@scope%2fname`).
    pub fn url_name(&self) -> String {
        self.name.replace('/', "%2f")
    }
}

#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, VersionManifest>,
}

#[derive(Debug, Deserialize)]
struct VersionManifest {
    dist: Dist,
}

#[derive(Debug, Deserialize)]
struct Dist {
    tarball: String,
}

impl Packument {
    /// Tarball URL for `requested` (a version or dist-tag), default `latest`.
    fn tarball(&self, requested: Option<&str>) -> anyhow::Result<(&str, &str)> {
        let requested = requested.unwrap_or("latest");
        let version = self
            .dist_tags
            .get(requested)
            .map(String::as_str)
            .unwrap_or(requested);

        match self.versions.get_key_value(version) {
            Some((version, manifest)) => Ok((version.as_str(), manifest.dist.tarball.as_str())),
            None => bail!("version '{}' not found", requested),
        }
    }
}

/// Downloads package tarballs from the registry and unpacks them.
#[derive(Debug, Clone)]
pub struct RegistryStrategy {
    registry: String,
    scratch_parent: Option<PathBuf>,
    timeout: Duration,
}

impl RegistryStrategy {
    /// Use the registry at `registry` (base URL).
    pub fn new(registry: impl Into<String>) -> Self {
        Self {
            registry: registry.into().trim_end_matches('/').to_string(),
            scratch_parent: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create scratch directories under `parent` instead of the system temp dir.
    pub fn scratch_in(mut self, parent: Option<PathBuf>) -> Self {
        self.scratch_parent = parent;
        self
    }

    fn client(&self) -> anyhow::Result<Client> {
        Client::builder()
            .user_agent("preset")
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")
    }

    fn download(&self, package: &PackageSpec, dest: &Path) -> anyhow::Result<()> {
        let client = self.client()?;
        let url = format!("{}/{}", self.registry, package.url_name());

        let response = client.get(&url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            bail!("package '{}' not found in {}", package.name, self.registry);
        }
        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }
        let packument: Packument = response.json().context("Invalid package metadata")?;

        let (version, tarball) = packument.tarball(package.version.as_deref())?;
        tracing::info!("Downloading {}@{}", package.name, version);

        let response = client.get(tarball).send()?;
        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), tarball);
        }
        let bytes = response.bytes()?;
        unpack_tarball(&bytes, dest)
    }
}

impl ResolveStrategy for RegistryStrategy {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn resolve(&self, identifier: &str) -> Result<ResolverResult, ResolutionError> {
        let Some(package) = PackageSpec::parse(identifier)? else {
            return Ok(ResolverResult::not_applicable());
        };
        let fetch_error = |source: anyhow::Error| ResolutionError::RemoteFetch {
            identifier: identifier.to_string(),
            source,
        };

        let scratch = scratch_dir("preset-npm-", self.scratch_parent.as_deref())
            .context("Failed to create scratch directory")
            .map_err(fetch_error)?;
        self.download(&package, scratch.path()).map_err(fetch_error)?;

        let root = scratch.keep();
        Ok(ResolverResult::temporary(root.clone(), root))
    }
}

/// Unpack a gzipped package tarball into `dest`, dropping the top-level
/// directory (`package/` for npm).
///
/// Only regular files and directories are extracted. Links are rejected so
/// that no later entry can be written through one.
fn unpack_tarball(data: &[u8], dest: &Path) -> anyhow::Result<()> {
    let mut archive = Archive::new(GzDecoder::new(data));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        match entry.header().entry_type() {
            EntryType::Regular | EntryType::Continuous | EntryType::Directory => {}
            EntryType::Symlink | EntryType::Link => {
                bail!("archive entry is a link: {}", path.display());
            }
            other => {
                tracing::debug!("Skipping {:?} entry {}", other, path.display());
                continue;
            }
        }

        let mut components = path.components();
        components.next();
        let relative = components.as_path();
        if relative.as_os_str().is_empty() {
            continue;
        }
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(anyhow!("archive entry escapes package: {}", path.display()));
        }

        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        entry
            .unpack(&target)
            .with_context(|| format!("Failed to unpack {}", relative.display()))?;
    }

    Ok(())
}
