//! Codebase discovery
//!
//! Walks the configured root and returns the source files to process,
//! honoring the skip-directory list and user-configured exclusion globs.
//! Results are sorted so runs are deterministic.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::WalkDir;

use cdg_domain::constants::SKIP_DIRS;
use cdg_domain::error::{Error, Result};

/// Build a glob set from user-configured exclusion patterns
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::config(format!("invalid exclude pattern {pattern:?}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::config(format!("failed to build exclude set: {e}")))
}

/// Discover all files under `root` with the given extension, skipping
/// well-known junk directories and anything matching `exclude`
pub fn discover_files(root: &Path, extension: &str, exclude: &GlobSet) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    for entry in walker.filter_entry(|e| !is_skipped_dir(e.path())) {
        let entry = match entry {
            Ok(entry) => entry,
            // An unreadable subtree must not abort the whole run
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry during discovery");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !matches_ext {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude.is_match(relative) || exclude.is_match(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn is_skipped_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| SKIP_DIRS.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovers_only_matching_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("b.txt"), "not code\n").unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg/c.py"), "y = 2\n").unwrap();

        let exclude = build_exclude_set(&[]).unwrap();
        let files = discover_files(dir.path(), "py", &exclude).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("a.py"), PathBuf::from("pkg/c.py")]);
    }

    #[test]
    fn test_skip_dirs_and_exclude_globs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("__pycache__")).unwrap();
        fs::write(dir.path().join("__pycache__/cached.py"), "").unwrap();
        fs::create_dir(dir.path().join("generated")).unwrap();
        fs::write(dir.path().join("generated/gen.py"), "").unwrap();
        fs::write(dir.path().join("keep.py"), "").unwrap();

        let exclude = build_exclude_set(&["generated/**".to_string()]).unwrap();
        let files = discover_files(dir.path(), "py", &exclude).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.py"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = build_exclude_set(&["[".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_does_not_abort_discovery() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.py"), "x = 1\n").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.py"), "y = 2\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let exclude = build_exclude_set(&[]).unwrap();
        let files = discover_files(dir.path(), "py", &exclude).unwrap();
        assert!(files.iter().any(|p| p.ends_with("keep.py")));

        // Restore so the tempdir can be cleaned up
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
