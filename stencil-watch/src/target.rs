//! What to watch, and which event paths count as edits.

use std::path::{Path, PathBuf};

use notify::RecursiveMode;

/// A single watch registration plus its event-path filter.
#[derive(Debug, Clone)]
pub enum WatchTarget {
    /// A single template file. Only events for exactly this path qualify.
    /// The parent directory is registered with the OS watcher, since editors
    /// commonly replace files rather than writing them in place.
    File(PathBuf),
    /// A directory of reusable fragments. Only files carrying `extension`
    /// qualify, anywhere under `dir`.
    Fragments { dir: PathBuf, extension: String },
}

impl WatchTarget {
    /// Resolve symlinks best-effort so event paths (which arrive as real
    /// paths, e.g. `/private/var/...` on macOS) compare correctly.
    pub fn canonicalized(self) -> Self {
        match self {
            WatchTarget::File(path) => {
                WatchTarget::File(std::fs::canonicalize(&path).unwrap_or(path))
            }
            WatchTarget::Fragments { dir, extension } => WatchTarget::Fragments {
                dir: std::fs::canonicalize(&dir).unwrap_or(dir),
                extension,
            },
        }
    }

    /// The path and mode handed to the OS watcher.
    pub fn registration(&self) -> (PathBuf, RecursiveMode) {
        match self {
            WatchTarget::File(path) => {
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                (dir, RecursiveMode::NonRecursive)
            }
            WatchTarget::Fragments { dir, .. } => (dir.clone(), RecursiveMode::Recursive),
        }
    }

    /// Whether an event for `path` counts as an edit of this target.
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            WatchTarget::File(file) => path == file,
            WatchTarget::Fragments { dir, extension } => {
                path.starts_with(dir)
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(|e| e.eq_ignore_ascii_case(extension))
                        .unwrap_or(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_target_matches_only_the_exact_path() {
        let target = WatchTarget::File(PathBuf::from("/work/page.tera"));
        assert!(target.matches(Path::new("/work/page.tera")));
        assert!(!target.matches(Path::new("/work/other.tera")));
        assert!(!target.matches(Path::new("/work/sub/page.tera")));
    }

    #[test]
    fn file_target_registers_its_parent_non_recursively() {
        let target = WatchTarget::File(PathBuf::from("/work/page.tera"));
        let (path, mode) = target.registration();
        assert_eq!(path, PathBuf::from("/work"));
        assert_eq!(mode, RecursiveMode::NonRecursive);
    }

    #[test]
    fn bare_file_name_registers_the_current_directory() {
        let target = WatchTarget::File(PathBuf::from("page.tera"));
        let (path, _) = target.registration();
        assert_eq!(path, PathBuf::from("."));
    }

    #[test]
    fn fragments_target_filters_by_extension() {
        let target = WatchTarget::Fragments {
            dir: PathBuf::from("/work/partials"),
            extension: "tera".to_string(),
        };
        assert!(target.matches(Path::new("/work/partials/header.tera")));
        assert!(target.matches(Path::new("/work/partials/nav/deep.TERA")));
        assert!(!target.matches(Path::new("/work/partials/readme.md")));
        assert!(!target.matches(Path::new("/elsewhere/header.tera")));
    }

    #[test]
    fn fragments_target_registers_recursively() {
        let target = WatchTarget::Fragments {
            dir: PathBuf::from("/work/partials"),
            extension: "tera".to_string(),
        };
        let (path, mode) = target.registration();
        assert_eq!(path, PathBuf::from("/work/partials"));
        assert_eq!(mode, RecursiveMode::Recursive);
    }
}
