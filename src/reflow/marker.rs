//! Break markers and the per-pass break list

use crate::reflow::engine::ReflowOutcome;
use serde::Serialize;

/// Absolute position of a block in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct DocPosition(pub usize);

/// A position where the visual flow jumps to the next page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakMarker {
    /// Position of the first block on the new page
    pub position: DocPosition,
    /// Rest of the current page, its bottom margin and the page gap
    pub filler_height: f32,
    /// Top margin (or header reservation) of the new page
    pub spacer_height: f32,
}

/// Blocks owned by one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageExtent {
    pub page_index: usize,
    pub first: Option<DocPosition>,
    pub last: Option<DocPosition>,
    /// Sum of block heights placed on the page
    pub used_height: f32,
    pub block_count: usize,
}

impl PageExtent {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            first: None,
            last: None,
            used_height: 0.0,
            block_count: 0,
        }
    }

    /// Check if this page owns a position
    pub fn contains(&self, position: DocPosition) -> bool {
        match (self.first, self.last) {
            (Some(first), Some(last)) => position >= first && position <= last,
            _ => false,
        }
    }
}

/// The committed break list.
///
/// Replaced wholesale on every reflow, never patched, because a height
/// change upstream can move every break after it.
#[derive(Debug, Clone, Default)]
pub struct BreakList {
    markers: Vec<BreakMarker>,
    pages: Vec<PageExtent>,
    total_pages: usize,
    version: u64,
}

impl BreakList {
    pub fn new() -> Self {
        Self {
            total_pages: 1,
            ..Self::default()
        }
    }

    /// Commit a new pass. Returns true when the markers differ from the
    /// previous list.
    pub fn replace(&mut self, outcome: ReflowOutcome) -> bool {
        let changed = outcome.markers != self.markers || outcome.total_pages != self.total_pages;
        self.markers = outcome.markers;
        self.pages = outcome.pages;
        self.total_pages = outcome.total_pages;
        self.version += 1;
        changed
    }

    pub fn markers(&self) -> &[BreakMarker] {
        &self.markers
    }

    pub fn pages(&self) -> &[PageExtent] {
        &self.pages
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Number of committed passes
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Index of the page owning a position
    pub fn page_of(&self, position: DocPosition) -> usize {
        self.markers.partition_point(|m| m.position <= position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(pos: usize) -> BreakMarker {
        BreakMarker {
            position: DocPosition(pos),
            filler_height: 10.0,
            spacer_height: 96.0,
        }
    }

    #[test]
    fn test_page_of() {
        let mut list = BreakList::new();
        list.replace(ReflowOutcome {
            markers: vec![marker(10), marker(25)],
            pages: Vec::new(),
            total_pages: 3,
            skipped: 0,
        });

        assert_eq!(list.page_of(DocPosition(0)), 0);
        assert_eq!(list.page_of(DocPosition(9)), 0);
        assert_eq!(list.page_of(DocPosition(10)), 1);
        assert_eq!(list.page_of(DocPosition(24)), 1);
        assert_eq!(list.page_of(DocPosition(25)), 2);
        assert_eq!(list.page_of(DocPosition(1000)), 2);
    }

    #[test]
    fn test_replace_reports_change() {
        let mut list = BreakList::new();
        let outcome = ReflowOutcome {
            markers: vec![marker(4)],
            pages: Vec::new(),
            total_pages: 2,
            skipped: 0,
        };
        assert!(list.replace(outcome.clone()));
        assert!(!list.replace(outcome));
        assert_eq!(list.version(), 2);
    }

    #[test]
    fn test_page_extent_contains() {
        let extent = PageExtent {
            page_index: 0,
            first: Some(DocPosition(0)),
            last: Some(DocPosition(20)),
            used_height: 100.0,
            block_count: 3,
        };
        assert!(extent.contains(DocPosition(20)));
        assert!(!extent.contains(DocPosition(21)));
        assert!(!PageExtent::new(1).contains(DocPosition(0)));
    }
}
