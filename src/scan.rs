//! Ignore-aware enumeration of folders and image files.
//!
//! The library tree is assumed to be live: folders can be created, renamed
//! or deleted while a request walks it. Listing the folder a caller asked
//! for is allowed to fail (that is a real "not found"), but anything that
//! disappears *during* a recursive walk is skipped and the walk carries on.
//!
//! ## Ordering
//!
//! All listings are case-insensitive by name. Recursive walks are
//! depth-first and yield a folder's own images before descending into its
//! subfolders, so the order is fully determined by the names on disk:
//!
//! ```text
//! root/
//! ├── b.jpg          1
//! ├── A/
//! │   ├── x.jpg      2
//! │   └── sub/
//! │       └── y.jpg  3
//! └── b2/
//!     └── z.jpg      4
//! ```
//!
//! ## Ignored folders
//!
//! Folders whose name starts with `.` or appears in the configured
//! ignore set (trash folders, NAS index folders) are never listed and never
//! descended into. Files are filtered by extension only.

use crate::config::LibraryConfig;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory and image enumeration rules for one library.
#[derive(Debug, Clone)]
pub struct Scanner {
    ignored: HashSet<String>,
    extensions: HashSet<String>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(&LibraryConfig::default())
    }
}

impl Scanner {
    pub fn new(config: &LibraryConfig) -> Self {
        Self {
            ignored: config.ignored_directories.iter().cloned().collect(),
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Whether a directory with this name is skipped entirely.
    pub fn is_ignored_name(&self, name: &str) -> bool {
        name.starts_with('.') || self.ignored.contains(name)
    }

    /// Whether `path` has one of the supported image extensions.
    pub fn is_image_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_lowercase()))
    }

    /// Immediate, non-ignored subdirectories of `path` in case-insensitive order.
    pub fn list_child_directories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter(|e| !self.is_ignored_name(&e.file_name().to_string_lossy()))
            .map(|e| e.path())
            .collect();
        dirs.sort_by(|a, b| compare_names(file_name(a), file_name(b)));
        Ok(dirs)
    }

    /// Immediate image files of `path` in case-insensitive order.
    pub fn list_child_images(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut images: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && self.is_image_path(p))
            .collect();
        images.sort_by(|a, b| compare_names(file_name(a), file_name(b)));
        Ok(images)
    }

    /// Lazily walk every image beneath `path` in deterministic order.
    ///
    /// Entries that cannot be read (permission errors, folders deleted
    /// mid-walk) are skipped. Combine with `.take(n)` for an early stop.
    pub fn walk_images<'a>(&'a self, path: &Path) -> impl Iterator<Item = PathBuf> + use<'a> {
        WalkDir::new(path)
            .sort_by(compare_entries)
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || !self.is_ignored_dir(e))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry during walk");
                    None
                }
            })
            .filter(|e| !e.file_type().is_dir() && self.is_image_path(e.path()))
            .map(DirEntry::into_path)
    }

    /// Visit every non-ignored directory beneath `path` (excluding `path`).
    ///
    /// All subfolders of a folder are visited before descending into the
    /// first of them. A folder that cannot be listed is skipped. Returning
    /// `ControlFlow::Break` from `visit` stops the walk.
    pub fn visit_directories<F>(&self, path: &Path, visit: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&Path) -> ControlFlow<()>,
    {
        let children = match self.list_child_directories(path) {
            Ok(children) => children,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable directory");
                return ControlFlow::Continue(());
            }
        };
        for child in &children {
            visit(child)?;
        }
        for child in &children {
            self.visit_directories(child, visit)?;
        }
        ControlFlow::Continue(())
    }

    /// First image beneath `path` in walk order, if any.
    pub fn first_image(&self, path: &Path) -> Option<PathBuf> {
        self.walk_images(path).next()
    }

    /// Whether at least one image exists anywhere beneath `path`.
    pub fn has_images(&self, path: &Path) -> bool {
        self.first_image(path).is_some()
    }

    fn is_ignored_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir() && self.is_ignored_name(&entry.file_name().to_string_lossy())
    }
}

/// `/`-separated path of `path` relative to `root`; empty for the root itself.
pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Case-insensitive name order with the raw name as tiebreaker.
fn compare_names(a: String, b: String) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(&b))
}

/// Files before directories, then by name. With walkdir's depth-first
/// traversal this yields a folder's own images before its subfolders.
fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| {
            compare_names(
                a.file_name().to_string_lossy().to_string(),
                b.file_name().to_string_lossy().to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{fixture_tree, rel_paths};

    #[test]
    fn child_directories_sorted_case_insensitively() {
        let tmp = fixture_tree(&["b/x.jpg", "A/x.jpg", "c/x.jpg"]);
        let scanner = Scanner::default();
        let dirs = scanner.list_child_directories(tmp.path()).unwrap();
        assert_eq!(rel_paths(tmp.path(), &dirs), vec!["A", "b", "c"]);
    }

    #[test]
    fn child_directories_skip_hidden_and_ignored() {
        let tmp = fixture_tree(&[".hidden/x.jpg", ".Trash-1000/x.jpg", "keep/x.jpg"]);
        let scanner = Scanner::default();
        let dirs = scanner.list_child_directories(tmp.path()).unwrap();
        assert_eq!(rel_paths(tmp.path(), &dirs), vec!["keep"]);
    }

    #[test]
    fn custom_ignore_set() {
        let tmp = fixture_tree(&["@eaDir/x.jpg", "keep/x.jpg"]);
        let scanner = Scanner::new(&LibraryConfig {
            ignored_directories: vec!["@eaDir".into()],
            ..LibraryConfig::default()
        });
        let all: Vec<PathBuf> = scanner.walk_images(tmp.path()).collect();
        assert_eq!(rel_paths(tmp.path(), &all), vec!["keep/x.jpg"]);
    }

    #[test]
    fn child_images_filter_by_extension() {
        let tmp = fixture_tree(&["b.JPG", "a.png", "notes.txt", "c.webp", "sub/d.jpg"]);
        let scanner = Scanner::default();
        let images = scanner.list_child_images(tmp.path()).unwrap();
        assert_eq!(rel_paths(tmp.path(), &images), vec!["a.png", "b.JPG", "c.webp"]);
    }

    #[test]
    fn listing_missing_directory_is_error() {
        let tmp = fixture_tree(&[]);
        let scanner = Scanner::default();
        assert!(scanner.list_child_images(&tmp.path().join("gone")).is_err());
        assert!(scanner.list_child_directories(&tmp.path().join("gone")).is_err());
    }

    #[test]
    fn walk_yields_own_images_before_subfolders() {
        let tmp = fixture_tree(&["b2/z.jpg", "A/sub/y.jpg", "A/x.jpg", "b.jpg"]);
        let scanner = Scanner::default();
        let all: Vec<PathBuf> = scanner.walk_images(tmp.path()).collect();
        assert_eq!(
            rel_paths(tmp.path(), &all),
            vec!["b.jpg", "A/x.jpg", "A/sub/y.jpg", "b2/z.jpg"]
        );
    }

    #[test]
    fn walk_never_enters_ignored_directories() {
        let tmp = fixture_tree(&[".cache/deep/a.jpg", "x/.Trash-1000/b.jpg", "x/c.jpg"]);
        let scanner = Scanner::default();
        let all: Vec<PathBuf> = scanner.walk_images(tmp.path()).collect();
        assert_eq!(rel_paths(tmp.path(), &all), vec!["x/c.jpg"]);
    }

    #[test]
    fn walk_includes_hidden_files() {
        // Only directories are ignore-filtered
        let tmp = fixture_tree(&[".a.jpg"]);
        let scanner = Scanner::default();
        assert_eq!(scanner.walk_images(tmp.path()).count(), 1);
    }

    #[test]
    fn walk_early_stop() {
        let tmp = fixture_tree(&["a/1.jpg", "a/2.jpg", "b/3.jpg"]);
        let scanner = Scanner::default();
        let first: Vec<PathBuf> = scanner.walk_images(tmp.path()).take(1).collect();
        assert_eq!(rel_paths(tmp.path(), &first), vec!["a/1.jpg"]);
        assert!(scanner.has_images(&tmp.path().join("b")));
    }

    #[test]
    fn walk_missing_root_is_empty() {
        let tmp = fixture_tree(&[]);
        let scanner = Scanner::default();
        assert_eq!(scanner.walk_images(&tmp.path().join("vanished")).count(), 0);
    }

    #[test]
    fn walk_survives_folder_removed_mid_walk() {
        let tmp = fixture_tree(&["a/x.jpg", "b/y.jpg", "c/z.jpg"]);
        let scanner = Scanner::default();
        let mut walk = scanner.walk_images(tmp.path());

        let first = walk.next().unwrap();
        std::fs::remove_dir_all(tmp.path().join("b")).unwrap();
        let mut seen = vec![first];
        seen.extend(walk);

        assert_eq!(rel_paths(tmp.path(), &seen), vec!["a/x.jpg", "c/z.jpg"]);
    }

    #[test]
    fn has_images_false_for_empty_tree() {
        let tmp = fixture_tree(&["empty/notes.txt"]);
        let scanner = Scanner::default();
        assert!(!scanner.has_images(&tmp.path().join("empty")));
    }

    fn visited(scanner: &Scanner, root: &Path, stop_after: usize) -> Vec<String> {
        let mut seen = Vec::new();
        let _ = scanner.visit_directories(root, &mut |dir| {
            seen.push(relative_path(root, dir));
            if seen.len() >= stop_after {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        seen
    }

    #[test]
    fn visit_directories_lists_siblings_before_descending() {
        let tmp = fixture_tree(&["a/b/x.jpg", "a/c/", "d/", ".git/objects/y", "e/notes.txt"]);
        let scanner = Scanner::default();
        assert_eq!(
            visited(&scanner, tmp.path(), usize::MAX),
            vec!["a", "d", "e", "a/b", "a/c"]
        );
    }

    #[test]
    fn visit_directories_stops_on_break() {
        let tmp = fixture_tree(&["a/b/", "c/"]);
        let scanner = Scanner::default();
        assert_eq!(visited(&scanner, tmp.path(), 2), vec!["a", "c"]);
    }

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = Path::new("/lib");
        assert_eq!(relative_path(root, &root.join("a").join("b.jpg")), "a/b.jpg");
        assert_eq!(relative_path(root, root), "");
    }
}
