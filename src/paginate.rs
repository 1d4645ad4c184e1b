//! Cursor pagination over ordered snapshots.
//!
//! A cursor is the identifier (relative path) of the last item of the
//! previous page. The next page starts right after wherever that item sits in
//! the current sequence. A cursor that is no longer present, because the item
//! was deleted or the snapshot was rebuilt, silently restarts at the first
//! page. Nothing is stored server-side between calls.
//!
//! Pages are consistent with each other only while the underlying snapshot
//! stays the same; across an index rebuild a client can see an item twice or
//! miss one.

use crate::dates::infer_path_date_hint;
use crate::index::GroupImage;
use serde::Serialize;

/// One page borrowed out of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Identifier of the last item, present only when more items follow.
    pub next_cursor: Option<&'a str>,
}

/// Slice `items` into the page following `cursor`.
///
/// `id` yields each item's identifier. A `limit` of zero always yields an
/// empty page without a cursor.
pub fn paginate<'a, T>(
    items: &'a [T],
    cursor: Option<&str>,
    limit: usize,
    id: impl Fn(&'a T) -> &'a str,
) -> Page<'a, T> {
    let start = cursor
        .filter(|c| !c.is_empty())
        .map(|c| c.replace('\\', "/"))
        .and_then(|c| items.iter().position(|item| id(item) == c))
        .map_or(0, |idx| idx + 1);

    let end = start.saturating_add(limit).min(items.len());
    let page = &items[start.min(end)..end];
    let next_cursor = match page.last() {
        Some(last) if end < items.len() => Some(id(last)),
        _ => None,
    };
    Page {
        items: page,
        next_cursor,
    }
}

// =============================================================================
// Timeline
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub name: String,
    pub path: String,
    /// Path date hint, else the section label.
    pub date_hint: String,
}

/// A contiguous run of page items sharing one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSection {
    pub label: String,
    pub items: Vec<TimelineItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePage {
    pub sections: Vec<TimelineSection>,
    pub next_cursor: Option<String>,
}

/// Section label for one relative path: its date hint, else the parent
/// folder name, else `"Unknown"`.
pub fn section_label(path: &str) -> (String, Option<String>) {
    let hint = infer_path_date_hint(path);
    let label = hint.clone().unwrap_or_else(|| {
        let mut parts = path.rsplit('/');
        parts.next();
        parts
            .next()
            .filter(|p| !p.is_empty())
            .unwrap_or("Unknown")
            .to_string()
    });
    (label, hint)
}

/// Paginate ordered relative paths and group the page into sections.
///
/// A new section starts whenever the label changes, so a label that recurs
/// later in the page opens a second section.
pub fn timeline_page(paths: &[&str], cursor: Option<&str>, limit: usize) -> TimelinePage {
    let page = paginate(paths, cursor, limit, |p| *p);

    let mut sections: Vec<TimelineSection> = Vec::new();
    for &path in page.items {
        let (label, hint) = section_label(path);
        let item = TimelineItem {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            date_hint: hint.unwrap_or_else(|| label.clone()),
        };
        match sections.last_mut() {
            Some(section) if section.label == label => section.items.push(item),
            _ => sections.push(TimelineSection {
                label,
                items: vec![item],
            }),
        }
    }

    TimelinePage {
        sections,
        next_cursor: page.next_cursor.map(str::to_string),
    }
}

// =============================================================================
// Group images
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPageImage {
    pub name: String,
    pub path: String,
    pub date_hint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPage {
    pub images: Vec<GroupPageImage>,
    pub next_cursor: Option<String>,
}

/// Paginate one subgroup's members, already in display order.
pub fn group_page(images: &[&GroupImage], cursor: Option<&str>, limit: usize) -> GroupPage {
    let page = paginate(images, cursor, limit, |img| img.path.as_str());
    GroupPage {
        images: page
            .items
            .iter()
            .map(|img| GroupPageImage {
                name: img.name.clone(),
                path: img.path.clone(),
                date_hint: img.date_hint.clone(),
            })
            .collect(),
        next_cursor: page.next_cursor.map(str::to_string),
    }
}
