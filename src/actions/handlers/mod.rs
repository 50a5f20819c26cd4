//! Built-in action handlers.

mod copy;
mod delete;
mod edit_json;
mod hook;

pub use copy::CopyHandler;
pub use delete::DeleteHandler;
pub use edit_json::EditJsonHandler;
pub use hook::HookHandler;

use super::dispatcher::{Handler, HandlerEnv};
use super::types::{ActionKind, ActionType};
use crate::error::HandlerError;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Handler for `none` actions: only the surrounding messages are shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneHandler;

impl Handler for NoneHandler {
    fn action_type(&self) -> ActionType {
        ActionType::None
    }

    fn handle(&self, action: &ActionKind, _env: &mut HandlerEnv<'_>) -> Result<(), HandlerError> {
        match action {
            ActionKind::None => Ok(()),
            other => Err(unexpected(ActionType::None, other)),
        }
    }
}

fn unexpected(expected: ActionType, found: &ActionKind) -> HandlerError {
    HandlerError::UnexpectedAction {
        expected,
        found: found.action_type(),
    }
}

/// Join `relative` onto `root`, refusing paths that could leave it.
///
/// `.` components are allowed; `..`, roots and prefixes are not.
pub(crate) fn inside(root: &Path, relative: &str) -> Result<PathBuf, HandlerError> {
    let path = Path::new(relative.trim());
    let escapes = path.as_os_str().is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(HandlerError::OutsideTarget {
            path: relative.to_string(),
        });
    }
    Ok(root.join(path))
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Entries under `root` matching `pattern`, relative to `root`, sorted.
///
/// Matches may be files or directories. A pattern without glob characters
/// is checked directly instead of walking the tree.
pub(crate) fn matching_entries(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, HandlerError> {
    let invalid = |message: &str| HandlerError::InvalidPattern {
        pattern: pattern.to_string(),
        message: message.to_string(),
    };

    let trimmed = pattern.trim().trim_start_matches("./");
    if trimmed.is_empty() {
        return Err(invalid("pattern is empty"));
    }

    let relative = Path::new(trimmed);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(invalid("must be a relative path inside the directory"));
    }

    if !is_glob(trimmed) {
        let exists = root.join(relative).symlink_metadata().is_ok();
        return Ok(if exists { vec![relative.to_path_buf()] } else { Vec::new() });
    }

    let compiled = Pattern::new(trimmed).map_err(|e| invalid(e.msg))?;
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| HandlerError::io(root, e.into()))?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if compiled.matches_path_with(relative, MATCH_OPTIONS) {
            matches.push(relative.to_path_buf());
        }
    }
    Ok(matches)
}

/// Files under `root` selected by `patterns`, relative to `root`.
///
/// A matched directory contributes every file beneath it. The result keeps
/// the order of first match and holds no duplicates.
pub(crate) fn expand_files(
    root: &Path,
    patterns: &[String],
    optional: bool,
) -> Result<Vec<PathBuf>, HandlerError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let mut matched = 0;
        for entry in matching_entries(root, pattern)? {
            let full = root.join(&entry);
            let found: Vec<PathBuf> = if full.is_dir() {
                files_below(root, &full)?
            } else {
                vec![entry]
            };
            for file in found {
                matched += 1;
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        }

        if matched == 0 && !optional {
            return Err(HandlerError::NoMatches {
                pattern: pattern.clone(),
                dir: root.to_path_buf(),
            });
        }
    }

    Ok(files)
}

fn files_below(root: &Path, dir: &Path) -> Result<Vec<PathBuf>, HandlerError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| HandlerError::io(dir, e.into()))?;
        if entry.file_type().is_file() {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, file).unwrap();
        }
        temp
    }

    fn strings(paths: Vec<PathBuf>) -> Vec<String> {
        paths
            .into_iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn star_star_matches_all_files() {
        let temp = tree(&["a.txt", "src/b.rs", "src/nested/c.rs"]);
        let files = expand_files(temp.path(), &["**/*".to_string()], false).unwrap();
        assert_eq!(strings(files), ["a.txt", "src/b.rs", "src/nested/c.rs"]);
    }

    #[test]
    fn star_does_not_cross_directories() {
        let temp = tree(&["a.txt", "src/b.txt"]);
        let files = expand_files(temp.path(), &["*.txt".to_string()], false).unwrap();
        assert_eq!(strings(files), ["a.txt"]);
    }

    #[test]
    fn literal_directory_expands_to_files() {
        let temp = tree(&["src/b.rs", "src/nested/c.rs", "other.txt"]);
        let files = expand_files(temp.path(), &["src".to_string()], false).unwrap();
        assert_eq!(strings(files), ["src/b.rs", "src/nested/c.rs"]);
    }

    #[test]
    fn duplicates_are_dropped() {
        let temp = tree(&["a.txt", "b.txt"]);
        let files = expand_files(
            temp.path(),
            &["a.txt".to_string(), "*.txt".to_string()],
            false,
        )
        .unwrap();
        assert_eq!(strings(files), ["a.txt", "b.txt"]);
    }

    #[test]
    fn no_matches_is_an_error_unless_optional() {
        let temp = tree(&["a.txt"]);
        let patterns = ["*.md".to_string()];

        let err = expand_files(temp.path(), &patterns, false).unwrap_err();
        assert!(matches!(err, HandlerError::NoMatches { .. }));

        assert!(expand_files(temp.path(), &patterns, true).unwrap().is_empty());
    }

    #[test]
    fn escaping_patterns_are_rejected() {
        let temp = tree(&["a.txt"]);
        for pattern in ["../a.txt", "/etc/passwd", "", "src/../../x"] {
            let err = matching_entries(temp.path(), pattern).unwrap_err();
            assert!(
                matches!(err, HandlerError::InvalidPattern { .. }),
                "{pattern:?} should be rejected"
            );
        }
    }

    #[test]
    fn inside_keeps_paths_under_root() {
        let root = Path::new("/work");
        assert_eq!(inside(root, ".").unwrap(), root.join("."));
        assert_eq!(inside(root, "./src/app").unwrap(), root.join("./src/app"));
        for escaping in ["../x", "a/../../x", "/etc", "", "  "] {
            let err = inside(root, escaping).unwrap_err();
            assert!(
                matches!(err, HandlerError::OutsideTarget { .. }),
                "{escaping:?} should be rejected"
            );
        }
    }

    #[test]
    fn dot_slash_prefix_is_ignored() {
        let temp = tree(&["a.txt"]);
        let entries = matching_entries(temp.path(), "./a.txt").unwrap();
        assert_eq!(strings(entries), ["a.txt"]);
    }

    #[test]
    fn invalid_glob_is_reported() {
        let temp = tree(&["a.txt"]);
        let err = matching_entries(temp.path(), "[a-").unwrap_err();
        assert!(matches!(err, HandlerError::InvalidPattern { .. }));
    }

    #[test]
    fn missing_root_matches_nothing() {
        let temp = TempDir::new().unwrap();
        let entries = matching_entries(&temp.path().join("absent"), "**/*").unwrap();
        assert!(entries.is_empty());
    }
}
