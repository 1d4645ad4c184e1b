//! CLI output formatting for every viewer command.
//!
//! Output follows the same two-level pattern everywhere:
//!
//! 1. **Header line**: positional index + display name (+ optional count)
//! 2. **Context lines**: indented `Source:`, `Key:`, `Date:` lines
//!
//! Relative paths are always secondary context, so the output reads as a
//! browsing session rather than a file listing.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Home › 2022 › Summer
//! Folders
//! 001 Beach
//!     Source: 2022/Summer/Beach
//! 002 Empty (no images)
//!     Source: 2022/Summer/Empty
//! Images (2)
//! 001 IMG_2022-07-01.jpg (2.4 MB)
//!     Date: 2022-07-01
//! 002 notes.png (12.0 KB)
//! Next folder: 2022/Winter/a.jpg
//! ```
//!
//! ## Hierarchy
//!
//! ```text
//! 001 May 3, 2022 (5 photos)
//!     Key: Trip
//!     001 May 1, 2022 (3 photos)
//!         Key: Trip/2022-05-01
//! ```
//!
//! ## Timeline
//!
//! ```text
//! 2022-05-01
//!     001 a.jpg
//!         Source: 2022-05-01/a.jpg
//! Next: 2022-05-01/a.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.

use crate::cache::CacheStats;
use crate::index::Hierarchy;
use crate::listing::DirectoryListing;
use crate::paginate::{GroupPage, TimelinePage};
use crate::types::{SearchResult, SortOrder};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Positional index + name, with an optional photo count.
///
/// ```text
/// 001 2022 (5 photos)
/// 001 Beach
/// ```
fn entity_header(index: usize, name: &str, count: Option<usize>) -> String {
    match count {
        Some(1) => format!("{} {} (1 photo)", format_index(index), name),
        Some(n) => format!("{} {} ({} photos)", format_index(index), name, n),
        None => format!("{} {}", format_index(index), name),
    }
}

/// Byte count in the largest unit that keeps the value at or above 1.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn next_cursor_line(label: &str, cursor: Option<&str>) -> Option<String> {
    cursor.map(|c| format!("{}: {}", label, c))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

pub fn format_listing(listing: &DirectoryListing) -> Vec<String> {
    let mut lines = Vec::new();
    let trail: Vec<&str> = listing.breadcrumbs.iter().map(|b| b.name.as_str()).collect();
    lines.push(trail.join(" \u{203a} "));

    if !listing.directories.is_empty() {
        lines.push("Folders".to_string());
        for (i, dir) in listing.directories.iter().enumerate() {
            if dir.has_images {
                lines.push(entity_header(i + 1, &dir.name, None));
            } else {
                lines.push(format!("{} (no images)", entity_header(i + 1, &dir.name, None)));
            }
            lines.push(format!("{}Source: {}", indent(1), dir.path));
        }
    }

    lines.push(format!("Images ({})", listing.total_images));
    for (i, image) in listing.images.iter().enumerate() {
        lines.push(format!(
            "{} ({})",
            entity_header(i + 1, &image.name, None),
            format_size(image.size)
        ));
        if let Some(hint) = &image.date_hint {
            lines.push(format!("{}Date: {}", indent(1), hint));
        }
    }

    if let Some(next) = &listing.next_folder_image {
        lines.push(format!("Next folder: {}", next));
    }
    lines
}

pub fn print_listing(listing: &DirectoryListing) {
    print_lines(format_listing(listing));
}

// ============================================================================
// Search
// ============================================================================

pub fn format_search(query: &str, results: &[SearchResult]) -> Vec<String> {
    if results.is_empty() {
        return vec![format!("No folders match \"{}\"", query.trim())];
    }
    let mut lines = Vec::new();
    for (i, result) in results.iter().enumerate() {
        lines.push(entity_header(i + 1, &result.name, None));
        lines.push(format!("{}Source: {}", indent(1), result.path));
    }
    lines
}

pub fn print_search(query: &str, results: &[SearchResult]) {
    print_lines(format_search(query, results));
}

// ============================================================================
// Timeline
// ============================================================================

pub fn format_timeline(page: &TimelinePage) -> Vec<String> {
    let mut lines = Vec::new();
    let mut position = 0;
    for section in &page.sections {
        lines.push(section.label.clone());
        for item in &section.items {
            position += 1;
            lines.push(format!("{}{}", indent(1), entity_header(position, &item.name, None)));
            lines.push(format!("{}Source: {}", indent(2), item.path));
        }
    }
    lines.extend(next_cursor_line("Next", page.next_cursor.as_deref()));
    lines
}

pub fn print_timeline(page: &TimelinePage) {
    print_lines(format_timeline(page));
}

// ============================================================================
// Hierarchy
// ============================================================================

/// Render the group tree. Counts are in photos, labels are formatted dates
/// where the group has any.
pub fn format_hierarchy(hierarchy: &Hierarchy, order: SortOrder) -> Vec<String> {
    let view = hierarchy.view(order);
    let mut lines = Vec::new();
    for (i, group) in view.groups.iter().enumerate() {
        lines.push(entity_header(i + 1, &group.formatted_label, Some(group.count)));
        lines.push(format!("{}Key: {}", indent(1), group.key));
        for (j, sub) in group.subgroups.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(j + 1, &sub.formatted_label, Some(sub.count))
            ));
            lines.push(format!("{}Key: {}", indent(2), sub.key));
        }
    }
    lines.push(format!(
        "{} groups, {} photos",
        view.groups.len(),
        hierarchy.image_count()
    ));
    lines
}

pub fn print_hierarchy(hierarchy: &Hierarchy, order: SortOrder) {
    print_lines(format_hierarchy(hierarchy, order));
}

// ============================================================================
// Group page
// ============================================================================

pub fn format_group_page(key: &str, page: &GroupPage) -> Vec<String> {
    let mut lines = vec![key.to_string()];
    for (i, image) in page.images.iter().enumerate() {
        lines.push(format!("{}{}", indent(1), entity_header(i + 1, &image.name, None)));
        lines.push(format!("{}Source: {}", indent(2), image.path));
        lines.push(format!("{}Date: {}", indent(2), image.date_hint));
    }
    lines.extend(next_cursor_line("Next", page.next_cursor.as_deref()));
    lines
}

pub fn print_group_page(key: &str, page: &GroupPage) {
    print_lines(format_group_page(key, page));
}

// ============================================================================
// Thumbnails
// ============================================================================

/// One-line summary of a warm or thumbnail run.
pub fn format_thumbnail_stats(stats: &CacheStats) -> String {
    format!("Thumbnails: {}", stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginate::{GroupPageImage, TimelineItem, TimelineSection};
    use crate::types::{Breadcrumb, DirectoryEntry, ImageRef};

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn entity_header_counts() {
        assert_eq!(entity_header(1, "2022", Some(5)), "001 2022 (5 photos)");
        assert_eq!(entity_header(2, "2022", Some(1)), "002 2022 (1 photo)");
        assert_eq!(entity_header(12, "Beach", None), "012 Beach");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(12 * 1024), "12.0 KB");
        assert_eq!(format_size(2_516_582), "2.4 MB");
    }

    // =========================================================================
    // Command output
    // =========================================================================

    fn listing() -> DirectoryListing {
        DirectoryListing {
            path: "2022".to_string(),
            breadcrumbs: vec![
                Breadcrumb { name: "Home".to_string(), path: String::new() },
                Breadcrumb { name: "2022".to_string(), path: "2022".to_string() },
            ],
            directories: vec![
                DirectoryEntry {
                    name: "Beach".to_string(),
                    path: "2022/Beach".to_string(),
                    has_images: true,
                },
                DirectoryEntry {
                    name: "Empty".to_string(),
                    path: "2022/Empty".to_string(),
                    has_images: false,
                },
            ],
            images: vec![ImageRef {
                name: "IMG_2022-07-01.jpg".to_string(),
                path: "2022/IMG_2022-07-01.jpg".to_string(),
                date_hint: Some("2022-07-01".to_string()),
                size: 2048,
            }],
            total_images: 1,
            next_folder_image: Some("2023/a.jpg".to_string()),
        }
    }

    #[test]
    fn listing_output() {
        assert_eq!(
            format_listing(&listing()),
            vec![
                "Home \u{203a} 2022",
                "Folders",
                "001 Beach",
                "    Source: 2022/Beach",
                "002 Empty (no images)",
                "    Source: 2022/Empty",
                "Images (1)",
                "001 IMG_2022-07-01.jpg (2.0 KB)",
                "    Date: 2022-07-01",
                "Next folder: 2023/a.jpg",
            ]
        );
    }

    #[test]
    fn empty_search_output() {
        assert_eq!(format_search("  beach ", &[]), vec!["No folders match \"beach\""]);
    }

    #[test]
    fn search_output() {
        let results = vec![SearchResult {
            name: "Beach".to_string(),
            path: "2022/Beach".to_string(),
        }];
        assert_eq!(format_search("beach", &results), vec!["001 Beach", "    Source: 2022/Beach"]);
    }

    #[test]
    fn timeline_positions_continue_across_sections() {
        let item = |name: &str, path: &str| TimelineItem {
            name: name.to_string(),
            path: path.to_string(),
            date_hint: String::new(),
        };
        let page = TimelinePage {
            sections: vec![
                TimelineSection {
                    label: "2022-05-02".to_string(),
                    items: vec![item("b.jpg", "2022-05-02/b.jpg")],
                },
                TimelineSection {
                    label: "2022-05-01".to_string(),
                    items: vec![item("a.jpg", "2022-05-01/a.jpg")],
                },
            ],
            next_cursor: Some("2022-05-01/a.jpg".to_string()),
        };
        assert_eq!(
            format_timeline(&page),
            vec![
                "2022-05-02",
                "    001 b.jpg",
                "        Source: 2022-05-02/b.jpg",
                "2022-05-01",
                "    002 a.jpg",
                "        Source: 2022-05-01/a.jpg",
                "Next: 2022-05-01/a.jpg",
            ]
        );
    }

    #[test]
    fn hierarchy_output() {
        let hierarchy = Hierarchy::from_paths(["Trip/2022-05-01/a.jpg", "Trip/2022-05-01/b.jpg"]);
        let lines = format_hierarchy(&hierarchy, SortOrder::Desc);
        assert_eq!(lines[0], "001 May 1, 2022 (2 photos)");
        assert_eq!(lines[1], "    Key: Trip");
        assert_eq!(lines[2], "    001 May 1, 2022 (2 photos)");
        assert_eq!(lines[3], "        Key: Trip/2022-05-01");
        assert_eq!(lines.last().unwrap(), "1 groups, 2 photos");
    }

    #[test]
    fn group_page_without_cursor() {
        let page = GroupPage {
            images: vec![GroupPageImage {
                name: "a.jpg".to_string(),
                path: "2022/x/a.jpg".to_string(),
                date_hint: "x".to_string(),
            }],
            next_cursor: None,
        };
        assert_eq!(
            format_group_page("2022/x", &page),
            vec!["2022/x", "    001 a.jpg", "        Source: 2022/x/a.jpg", "        Date: x"]
        );
    }

    #[test]
    fn thumbnail_stats_line() {
        let stats = CacheStats {
            embedded: 1,
            hits: 2,
            rendered: 1,
            failed: 0,
        };
        assert_eq!(
            format_thumbnail_stats(&stats),
            "Thumbnails: 1 embedded, 2 cached, 1 rendered (4 total)"
        );
    }
}
