//! Scanned indexes of a library root, memoized with a short TTL.
//!
//! Two views are built from one recursive walk each:
//!
//! - [`SortedPaths`]: every image's relative path in chronological order.
//! - [`Hierarchy`]: images grouped by their first path segment (top group)
//!   and first two path segments (subgroup), with per-group counts and the
//!   newest date found among the members.
//!
//! ## Ordering
//!
//! Dates come from [`extract_date_value`]. The canonical ascending order puts
//! every dated image first, ordered by `(date value, path)`, followed by every
//! undated image ordered by path. Descending order reverses only the dated
//! block; undated images keep their ascending order and always come last:
//!
//! ```text
//! asc:  2022-05-01/a.jpg  2022-05-02/b.jpg  misc/c.jpg
//! desc: 2022-05-02/b.jpg  2022-05-01/a.jpg  misc/c.jpg
//! ```
//!
//! ## Caching
//!
//! [`IndexCache`] keeps one slot per view. A slot holds the root it was built
//! for, when it was built and an `Arc` of the payload. The slot's lock is held
//! while checking the age and rebuilding, so concurrent misses trigger a
//! single rebuild and every caller sees a complete snapshot. Asking for a
//! different root replaces the slot.

use crate::dates::{extract_date_value, format_date_value, format_display_date, infer_path_date_hint};
use crate::scan::{Scanner, relative_path};
use crate::types::SortOrder;
use parking_lot::Mutex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

// =============================================================================
// Sort keys
// =============================================================================

/// Date-aware ordering key for one relative image path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub has_date: bool,
    /// Packed `YYYYMMDD`, or 0 when undated.
    pub date_value: u32,
    pub path: String,
    folded: String,
}

impl SortKey {
    pub fn for_path(path: &str) -> Self {
        let date = extract_date_value(path);
        Self {
            has_date: date.is_some(),
            date_value: date.unwrap_or(0),
            path: path.to_string(),
            folded: path.to_lowercase(),
        }
    }

    /// Storage order for group members: dated before undated, newest first,
    /// then path ascending.
    pub fn newest_first(&self, other: &Self) -> Ordering {
        other
            .has_date
            .cmp(&self.has_date)
            .then_with(|| other.date_value.cmp(&self.date_value))
            .then_with(|| self.cmp_path(other))
    }

    fn cmp_path(&self, other: &Self) -> Ordering {
        self.folded
            .cmp(&other.folded)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl Ord for SortKey {
    /// Canonical ascending order: dated by `(date, path)`, then undated by path.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .has_date
            .cmp(&self.has_date)
            .then_with(|| self.date_value.cmp(&other.date_value))
            .then_with(|| self.cmp_path(other))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// =============================================================================
// Flat sorted index
// =============================================================================

/// Every image under a root in canonical ascending order.
#[derive(Debug, Clone, Default)]
pub struct SortedPaths {
    ascending: Vec<String>,
    /// Length of the dated prefix of `ascending`.
    dated_len: usize,
}

impl SortedPaths {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys: Vec<SortKey> = paths
            .into_iter()
            .map(|p| SortKey::for_path(p.as_ref()))
            .collect();
        keys.sort();
        let dated_len = keys.iter().take_while(|k| k.has_date).count();
        Self {
            ascending: keys.into_iter().map(|k| k.path).collect(),
            dated_len,
        }
    }

    pub fn len(&self) -> usize {
        self.ascending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ascending.is_empty()
    }

    /// Relative paths in the requested order. Undated paths always trail.
    pub fn ordered(&self, order: SortOrder) -> Vec<&str> {
        let (dated, undated) = self.ascending.split_at(self.dated_len);
        let undated = undated.iter().map(String::as_str);
        match order {
            SortOrder::Asc => dated.iter().map(String::as_str).chain(undated).collect(),
            SortOrder::Desc => dated.iter().rev().map(String::as_str).chain(undated).collect(),
        }
    }
}

/// Walk `root` once and sort every image path found.
pub fn sorted_image_paths(scanner: &Scanner, root: &Path) -> SortedPaths {
    SortedPaths::from_paths(scanner.walk_images(root).map(|p| relative_path(root, &p)))
}

// =============================================================================
// Hierarchy
// =============================================================================

/// A top group or subgroup of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub key: String,
    /// Raw folder (or file) name the group is named after.
    pub label: String,
    pub formatted_label: String,
    /// Number of images whose path starts with this group's key segments.
    pub count: usize,
    /// Newest date value among dated members, 0 if none are dated.
    #[serde(rename = "dateValue")]
    pub max_date_value: u32,
    /// Child subgroups; always empty on a subgroup.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subgroups: Vec<GroupNode>,
}

impl GroupNode {
    fn new(key: String, label: String) -> Self {
        Self {
            key,
            label,
            formatted_label: String::new(),
            count: 0,
            max_date_value: 0,
            subgroups: Vec::new(),
        }
    }

    fn record(&mut self, key: &SortKey) {
        self.count += 1;
        if key.has_date {
            self.max_date_value = self.max_date_value.max(key.date_value);
        }
    }

    fn finish_label(&mut self) {
        self.formatted_label = format_date_value(self.max_date_value)
            .or_else(|| format_display_date(&self.label))
            .unwrap_or_else(|| self.label.clone());
    }

    fn cmp_date_key(&self, other: &Self) -> Ordering {
        self.max_date_value
            .cmp(&other.max_date_value)
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// One member image of a subgroup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupImage {
    pub name: String,
    pub path: String,
    /// Path date hint, else the subgroup label.
    pub date_hint: String,
    pub date_value: u32,
    #[serde(skip)]
    pub has_date: bool,
}

/// Two-level grouping of a root, frozen after construction.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    /// Newest first by `(date value, key)`; subgroups likewise.
    top_groups: Vec<GroupNode>,
    /// Subgroup key to members, newest first.
    images_by_group: HashMap<String, Vec<GroupImage>>,
}

/// Ordered, serializable view of a [`Hierarchy`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyView<'a> {
    pub groups: Vec<GroupNode>,
    pub images_by_group: BTreeMap<&'a str, Vec<&'a GroupImage>>,
    pub order: SortOrder,
}

struct TopAccumulator {
    node: GroupNode,
    subgroups: BTreeMap<String, GroupNode>,
}

impl Hierarchy {
    /// Group relative image paths. Paths are taken in the order given.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tops: BTreeMap<String, TopAccumulator> = BTreeMap::new();
        let mut members: HashMap<String, Vec<(SortKey, GroupImage)>> = HashMap::new();

        for path in paths {
            let path = path.as_ref();
            let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let Some(&top_key) = parts.first() else {
                continue;
            };
            let (sub_key, sub_label) = match parts.get(1) {
                Some(&second) => (format!("{top_key}/{second}"), second),
                None => (top_key.to_string(), top_key),
            };

            let key = SortKey::for_path(path);
            let image = GroupImage {
                name: parts.last().copied().unwrap_or(top_key).to_string(),
                path: path.to_string(),
                date_hint: infer_path_date_hint(path).unwrap_or_else(|| sub_label.to_string()),
                date_value: key.date_value,
                has_date: key.has_date,
            };

            let top = tops
                .entry(top_key.to_string())
                .or_insert_with(|| TopAccumulator {
                    node: GroupNode::new(top_key.to_string(), top_key.to_string()),
                    subgroups: BTreeMap::new(),
                });
            top.node.record(&key);
            top.subgroups
                .entry(sub_key.clone())
                .or_insert_with(|| GroupNode::new(sub_key.clone(), sub_label.to_string()))
                .record(&key);

            members.entry(sub_key).or_default().push((key, image));
        }

        let mut top_groups: Vec<GroupNode> = tops
            .into_values()
            .map(|acc| {
                let mut node = acc.node;
                node.subgroups = acc
                    .subgroups
                    .into_values()
                    .map(|mut sub| {
                        sub.finish_label();
                        sub
                    })
                    .collect();
                node.subgroups.sort_by(|a, b| b.cmp_date_key(a));
                node.finish_label();
                node
            })
            .collect();
        top_groups.sort_by(|a, b| b.cmp_date_key(a));

        let images_by_group = members
            .into_iter()
            .map(|(group, mut list)| {
                list.sort_by(|(a, _), (b, _)| a.newest_first(b));
                (group, list.into_iter().map(|(_, image)| image).collect())
            })
            .collect();

        Self {
            top_groups,
            images_by_group,
        }
    }

    /// Top groups in storage (newest first) order.
    pub fn top_groups(&self) -> &[GroupNode] {
        &self.top_groups
    }

    /// Total number of indexed images.
    pub fn image_count(&self) -> usize {
        self.top_groups.iter().map(|g| g.count).sum()
    }

    /// Members of one subgroup in the requested order, `None` for an unknown key.
    pub fn group_images(&self, key: &str, order: SortOrder) -> Option<Vec<&GroupImage>> {
        let list = self.images_by_group.get(key)?;
        Some(match order {
            SortOrder::Desc => list.iter().collect(),
            SortOrder::Asc => list.iter().rev().collect(),
        })
    }

    /// Formatted label of a group, looked up among subgroups then top groups.
    pub fn group_label(&self, key: &str) -> Option<&str> {
        self.top_groups
            .iter()
            .flat_map(|top| top.subgroups.iter())
            .chain(self.top_groups.iter())
            .find(|g| g.key == key)
            .map(|g| g.formatted_label.as_str())
    }

    /// Groups and members reordered for display.
    pub fn view(&self, order: SortOrder) -> HierarchyView<'_> {
        let arrange = |nodes: &mut Vec<GroupNode>| match order {
            SortOrder::Asc => nodes.sort_by(|a, b| a.cmp_date_key(b)),
            SortOrder::Desc => nodes.sort_by(|a, b| b.cmp_date_key(a)),
        };

        let mut groups = self.top_groups.clone();
        arrange(&mut groups);
        for group in &mut groups {
            arrange(&mut group.subgroups);
        }

        let images_by_group = self
            .images_by_group
            .keys()
            .filter_map(|key| Some((key.as_str(), self.group_images(key, order)?)))
            .collect();

        HierarchyView {
            groups,
            images_by_group,
            order,
        }
    }
}

/// Walk `root` once and group every image found.
pub fn build_hierarchy(scanner: &Scanner, root: &Path) -> Hierarchy {
    Hierarchy::from_paths(scanner.walk_images(root).map(|p| relative_path(root, &p)))
}

// =============================================================================
// TTL cache
// =============================================================================

struct CacheSlot<T> {
    root: PathBuf,
    generated_at: Instant,
    payload: Arc<T>,
}

/// Single-root, time-bounded memo of [`SortedPaths`] and [`Hierarchy`].
pub struct IndexCache {
    ttl: Duration,
    paths: Mutex<Option<CacheSlot<SortedPaths>>>,
    hierarchy: Mutex<Option<CacheSlot<Hierarchy>>>,
}

impl IndexCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            paths: Mutex::new(None),
            hierarchy: Mutex::new(None),
        }
    }

    /// Sorted image paths for `root`, rebuilt when stale or for a new root.
    pub fn sorted_paths(&self, scanner: &Scanner, root: &Path) -> Arc<SortedPaths> {
        get_or_build(&self.paths, root, self.ttl, "sorted paths", || {
            let built = sorted_image_paths(scanner, root);
            let count = built.len();
            (built, count)
        })
    }

    /// Hierarchy for `root`, rebuilt when stale or for a new root.
    pub fn hierarchy(&self, scanner: &Scanner, root: &Path) -> Arc<Hierarchy> {
        get_or_build(&self.hierarchy, root, self.ttl, "hierarchy", || {
            let built = build_hierarchy(scanner, root);
            let count = built.image_count();
            (built, count)
        })
    }
}

fn get_or_build<T>(
    slot: &Mutex<Option<CacheSlot<T>>>,
    root: &Path,
    ttl: Duration,
    what: &str,
    build: impl FnOnce() -> (T, usize),
) -> Arc<T> {
    let mut guard = slot.lock();
    if let Some(cached) = guard.as_ref()
        && cached.root == root
        && cached.generated_at.elapsed() < ttl
    {
        debug!(root = %root.display(), "{what} cache hit");
        return Arc::clone(&cached.payload);
    }

    let started = Instant::now();
    let (payload, images) = build();
    let payload = Arc::new(payload);
    info!(
        root = %root.display(),
        images,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rebuilt {what} index"
    );
    *guard = Some(CacheSlot {
        root: root.to_path_buf(),
        generated_at: Instant::now(),
        payload: Arc::clone(&payload),
    });
    payload
}
