//! Shared header/footer editing across page instances
//!
//! Every page shows its own editor for the header and footer, but they all
//! edit the same shared string. An edit on one instance is written to the
//! store and fanned out to the other instances; the instance the user is
//! typing into is never refreshed, so it keeps focus and caret.

use crate::geometry::{PageGeometryStore, RegionKind};

/// Which instance of a region an action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionInstance {
    pub kind: RegionKind,
    pub page_index: usize,
}

/// Instances that must re-read the shared content after an edit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionSync {
    pub kind: Option<RegionKind>,
    pub refresh_pages: Vec<usize>,
}

impl RegionSync {
    pub fn is_empty(&self) -> bool {
        self.refresh_pages.is_empty()
    }
}

/// Tracks focus among region editor instances
#[derive(Debug, Default)]
pub struct RegionEditors {
    focused: Option<RegionInstance>,
}

impl RegionEditors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&mut self, kind: RegionKind, page_index: usize) {
        self.focused = Some(RegionInstance { kind, page_index });
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn focused(&self) -> Option<RegionInstance> {
        self.focused
    }

    /// Apply an edit made in the instance on `page_index`.
    ///
    /// Returns the pages whose instance of `kind` should refresh: every page
    /// except the editing one and the focused one.
    pub fn apply_edit(
        &mut self,
        store: &mut PageGeometryStore,
        kind: RegionKind,
        page_index: usize,
        content: &str,
    ) -> RegionSync {
        if !store.set_region_content(kind, content) {
            return RegionSync::default();
        }

        let total_pages = store.page_count();
        let focused_page = self
            .focused
            .filter(|f| f.kind == kind)
            .map(|f| f.page_index);

        let refresh_pages = (0..total_pages)
            .filter(|&p| p != page_index && Some(p) != focused_page)
            .collect();

        RegionSync {
            kind: Some(kind),
            refresh_pages,
        }
    }
}
