//! Folder listing and folder search.
//!
//! Both operate directly on the live tree rather than on the cached index:
//! a listing must reflect what is on disk right now, and search stops as
//! soon as it has enough results.

use crate::dates::infer_path_date_hint;
use crate::scan::{Scanner, relative_path};
use crate::types::{Breadcrumb, DirectoryEntry, ImageRef, SearchResult};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

/// Contents of one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    /// Relative path of the listed folder, empty for the root.
    pub path: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub directories: Vec<DirectoryEntry>,
    pub images: Vec<ImageRef>,
    pub total_images: usize,
    /// First image of the next folder after this one, for "continue" links.
    pub next_folder_image: Option<String>,
}

/// List `target`, which must be `root` or a directory beneath it.
pub fn list_directory(scanner: &Scanner, root: &Path, target: &Path) -> io::Result<DirectoryListing> {
    let child_dirs = scanner.list_child_directories(target)?;
    let child_images = scanner.list_child_images(target)?;

    // Probing is a bounded walk per folder; run them side by side.
    let directories: Vec<DirectoryEntry> = child_dirs
        .par_iter()
        .map(|dir| DirectoryEntry {
            name: file_name(dir),
            path: relative_path(root, dir),
            has_images: scanner.has_images(dir),
        })
        .collect();

    let images: Vec<ImageRef> = child_images
        .iter()
        .map(|image| {
            let path = relative_path(root, image);
            ImageRef {
                name: file_name(image),
                date_hint: infer_path_date_hint(&path),
                size: fs::metadata(image).map(|m| m.len()).unwrap_or(0),
                path,
            }
        })
        .collect();

    let next_folder_image = next_folder_image(scanner, root, target).map(|p| relative_path(root, &p));

    Ok(DirectoryListing {
        path: relative_path(root, target),
        breadcrumbs: breadcrumbs(root, target),
        directories,
        total_images: images.len(),
        images,
        next_folder_image,
    })
}

/// Ancestor chain from the root (`Home`) down to `target`.
pub fn breadcrumbs(root: &Path, target: &Path) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        name: "Home".to_string(),
        path: String::new(),
    }];
    let relative = relative_path(root, target);
    let mut accumulated = String::new();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        if !accumulated.is_empty() {
            accumulated.push('/');
        }
        accumulated.push_str(segment);
        crumbs.push(Breadcrumb {
            name: segment.to_string(),
            path: accumulated.clone(),
        });
    }
    crumbs
}

/// First image found after `target` in folder order.
///
/// For the root itself this is the first image under any of its
/// subfolders. Otherwise the later siblings of `target` are searched, then
/// the later siblings of each ancestor in turn, stopping at the root.
pub fn next_folder_image(scanner: &Scanner, root: &Path, target: &Path) -> Option<PathBuf> {
    if target == root {
        return scanner
            .list_child_directories(root)
            .ok()?
            .iter()
            .find_map(|dir| scanner.first_image(dir));
    }

    let mut current = target;
    while let Some(parent) = current.parent()
        && parent.starts_with(root)
    {
        let siblings = scanner.list_child_directories(parent).unwrap_or_default();
        let after = siblings
            .iter()
            .position(|d| d == current)
            .map_or(0, |idx| idx + 1);
        if let Some(found) = siblings[after..].iter().find_map(|d| scanner.first_image(d)) {
            return Some(found);
        }
        if parent == root {
            break;
        }
        current = parent;
    }
    None
}

/// Fold case and treat `-` and `_` alike.
fn search_key(text: &str) -> String {
    text.to_lowercase().replace('-', "_")
}

/// Folders whose path matches `query`, then parents of matching images.
///
/// Matching is a case-insensitive substring test on the relative path with
/// hyphens and underscores treated as equal. Results are unique by path and
/// capped at `limit`.
pub fn search(scanner: &Scanner, root: &Path, query: &str, limit: usize) -> Vec<SearchResult> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }
    let needle = search_key(query);
    let mut results: Vec<SearchResult> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let mut push = |results: &mut Vec<SearchResult>, name: String, path: String| {
        if seen.insert(path.clone()) {
            results.push(SearchResult { name, path });
        }
        if results.len() >= limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    };

    let folders = scanner.visit_directories(root, &mut |dir| {
        let relative = relative_path(root, dir);
        if search_key(&relative).contains(&needle) {
            return push(&mut results, file_name(dir), relative);
        }
        ControlFlow::Continue(())
    });
    if folders.is_break() {
        return results;
    }

    for image in scanner.walk_images(root) {
        if !search_key(&relative_path(root, &image)).contains(&needle) {
            continue;
        }
        let parent = image.parent().unwrap_or(root);
        if push(&mut results, file_name(parent), relative_path(root, parent)).is_break() {
            break;
        }
    }
    results
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
