//! Resolution of local, registry and git presets.

use flate2::write::GzEncoder;
use flate2::Compression;
use httpmock::prelude::*;
use preset::error::ResolutionError;
use preset::resolver::{GitStrategy, LocalStrategy, RegistryStrategy, ResolveStrategy, ResolverChain};
use preset::events::EventBus;
use preset::runner::ScratchGuard;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A gzipped npm-style tarball with every file under `package/`.
fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("package/{name}"), content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A tarball whose `package/evil` entry links to `target`, followed by a
/// file written through that link.
fn tarball_through_link(target: &Path) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut link = tar::Header::new_gnu();
    link.set_entry_type(tar::EntryType::Symlink);
    link.set_size(0);
    link.set_mode(0o777);
    builder.append_link(&mut link, "package/evil", target).unwrap();

    let content = b"pwned";
    let mut file = tar::Header::new_gnu();
    file.set_size(content.len() as u64);
    file.set_mode(0o644);
    builder
        .append_data(&mut file, "package/evil/pwned.txt", &content[..])
        .unwrap();

    builder.into_inner().unwrap().finish().unwrap()
}

fn chain(cwd: &Path, server: &MockServer) -> ResolverChain {
    ResolverChain::new(vec![
        Box::new(LocalStrategy::new(cwd)),
        Box::new(RegistryStrategy::new(server.base_url())),
    ])
}

#[test]
fn registry_package_is_downloaded_and_unpacked() {
    let server = MockServer::start();
    let packument = server.mock(|when, then| {
        when.method(GET).path("/@acme%2fweb");
        then.status(200).json_body(json!({
            "dist-tags": { "latest": "1.2.0" },
            "versions": {
                "1.2.0": { "dist": { "tarball": server.url("/web-1.2.0.tgz") } }
            }
        }));
    });
    let download = server.mock(|when, then| {
        when.method(GET).path("/web-1.2.0.tgz");
        then.status(200).body(tarball(&[
            ("preset.yml", "name: web\n"),
            ("templates/index.html", "<html></html>"),
        ]));
    });
    let cwd = TempDir::new().unwrap();

    let result = chain(cwd.path(), &server).resolve("@acme/web").unwrap();

    packument.assert_calls(1);
    download.assert_calls(1);
    assert!(result.success);
    assert!(result.temporary);
    let path = result.path.clone().unwrap();
    assert_eq!(fs::read_to_string(path.join("preset.yml")).unwrap(), "name: web\n");
    assert!(path.join("templates/index.html").is_file());

    let mut guard = ScratchGuard::new(EventBus::new());
    guard.track(result.cleanup_root().unwrap());
    guard.cleanup();
    assert!(!path.exists());
}

#[test]
fn registry_tags_select_versions() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tool");
        then.status(200).json_body(json!({
            "dist-tags": { "latest": "1.0.0", "next": "2.0.0-beta" },
            "versions": {
                "1.0.0": { "dist": { "tarball": server.url("/tool-1.tgz") } },
                "2.0.0-beta": { "dist": { "tarball": server.url("/tool-2.tgz") } }
            }
        }));
    });
    let beta = server.mock(|when, then| {
        when.method(GET).path("/tool-2.tgz");
        then.status(200).body(tarball(&[("preset.yml", "name: beta\n")]));
    });

    let result = RegistryStrategy::new(server.base_url())
        .resolve("npm:tool@next")
        .unwrap();

    beta.assert_calls(1);
    let path = result.path.unwrap();
    assert_eq!(fs::read_to_string(path.join("preset.yml")).unwrap(), "name: beta\n");
    fs::remove_dir_all(path).unwrap();
}

#[test]
fn registry_tarball_links_are_rejected() {
    let outside = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/evil");
        then.status(200).json_body(json!({
            "dist-tags": { "latest": "1.0.0" },
            "versions": {
                "1.0.0": { "dist": { "tarball": server.url("/evil-1.0.0.tgz") } }
            }
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/evil-1.0.0.tgz");
        then.status(200).body(tarball_through_link(outside.path()));
    });

    let err = RegistryStrategy::new(server.base_url())
        .resolve("evil")
        .unwrap_err();

    assert!(matches!(err, ResolutionError::RemoteFetch { .. }));
    assert!(!outside.path().join("pwned.txt").exists());
}

#[test]
fn missing_package_is_a_fetch_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nothing-here");
        then.status(404);
    });
    let cwd = TempDir::new().unwrap();

    let err = chain(cwd.path(), &server).resolve("nothing-here").unwrap_err();

    match err {
        ResolutionError::RemoteFetch { identifier, source } => {
            assert_eq!(identifier, "nothing-here");
            assert!(source.to_string().contains("not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn local_directory_wins_over_registry() {
    let server = MockServer::start();
    let registry = server.mock(|when, then| {
        when.method(GET).path("/my-preset");
        then.status(500);
    });
    let cwd = TempDir::new().unwrap();
    fs::create_dir_all(cwd.path().join("my-preset")).unwrap();

    let result = chain(cwd.path(), &server).resolve("my-preset").unwrap();

    registry.assert_calls(0);
    assert!(!result.temporary);
    assert_eq!(result.path.clone().unwrap(), cwd.path().join("my-preset"));
    assert!(result.cleanup_root().is_none());
}

#[test]
fn missing_explicit_path_stops_the_chain() {
    let server = MockServer::start();
    let registry = server.mock(|when, then| {
        when.method(GET).path("/absent");
        then.status(500);
    });
    let cwd = TempDir::new().unwrap();

    let err = chain(cwd.path(), &server).resolve("./absent").unwrap_err();

    registry.assert_calls(0);
    assert!(matches!(err, ResolutionError::PathNotFound { .. }));
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn git_shorthand_clones_from_configured_host() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }
    let work = TempDir::new().unwrap();
    fs::create_dir_all(work.path().join("web/templates")).unwrap();
    fs::write(work.path().join("web/preset.yml"), "name: web\n").unwrap();
    fs::write(work.path().join("web/templates/a.txt"), "A").unwrap();
    git(work.path(), &["init", "--quiet"]);
    git(work.path(), &["add", "."]);
    git(work.path(), &["commit", "--quiet", "-m", "init"]);

    let hosts = TempDir::new().unwrap();
    let bare = hosts.path().join("acme/presets");
    let source = work.path().to_string_lossy().to_string();
    let dest = bare.to_string_lossy().to_string();
    git(hosts.path(), &["clone", "--quiet", "--bare", &source, &dest]);

    let strategy = GitStrategy::new(format!("file://{}", hosts.path().display()));
    let result = strategy.resolve("acme/presets#web").unwrap();

    assert!(result.temporary);
    let path = result.path.clone().unwrap();
    assert!(path.ends_with("web"));
    assert_eq!(fs::read_to_string(path.join("preset.yml")).unwrap(), "name: web\n");

    let root = result.cleanup_root().unwrap().to_path_buf();
    assert!(path.starts_with(&root));
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn failed_clone_is_a_fetch_error() {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return;
    }
    let hosts = TempDir::new().unwrap();
    let strategy = GitStrategy::new(format!("file://{}", hosts.path().display()));

    let err = strategy.resolve("acme/missing").unwrap_err();

    assert!(matches!(err, ResolutionError::RemoteFetch { .. }));
}
