//! Backdrop diff protocol for incremental page updates

use crate::render::backdrop::{Backdrop, PageBackdrop};

/// A single patch operation for the host renderer
#[derive(Debug, Clone, PartialEq)]
pub enum BackdropPatch {
    /// Append a page background
    InsertPage { page: PageBackdrop },
    /// Remove a page background
    RemovePage { page_index: usize },
    /// Replace a page whose geometry, bands or label changed
    UpdatePage { page: PageBackdrop },
    /// Header or footer shared content changed on every page
    UpdateSharedContent,
    /// Zoom factor changed
    Rescale { zoom: f32 },
}

/// Complete diff to send to the host
#[derive(Debug, Clone, Default)]
pub struct BackdropDiff {
    pub version: u64,
    pub patches: Vec<BackdropPatch>,
}

impl BackdropDiff {
    pub fn new(version: u64) -> Self {
        Self {
            version,
            patches: Vec::new(),
        }
    }

    pub fn add_patch(&mut self, patch: BackdropPatch) {
        self.patches.push(patch);
    }

    pub fn has_patches(&self) -> bool {
        !self.patches.is_empty()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }
}

/// Computes diffs between successive backdrops
#[derive(Debug, Default)]
pub struct DiffEngine {
    version: u64,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute_diff(&mut self, previous: &Backdrop, current: &Backdrop) -> BackdropDiff {
        self.version += 1;
        let mut diff = BackdropDiff::new(self.version);

        let prev_count = previous.pages.len();
        let curr_count = current.pages.len();

        // Remove from the end so indices stay valid while applying
        for page_index in (curr_count..prev_count).rev() {
            diff.add_patch(BackdropPatch::RemovePage { page_index });
        }

        for (index, page) in current.pages.iter().enumerate() {
            match previous.pages.get(index) {
                None => diff.add_patch(BackdropPatch::InsertPage { page: page.clone() }),
                Some(prev) if prev != page => {
                    diff.add_patch(BackdropPatch::UpdatePage { page: page.clone() })
                }
                Some(_) => {}
            }
        }

        if previous.header_content != current.header_content
            || previous.footer_content != current.footer_content
            || previous.border != current.border
        {
            diff.add_patch(BackdropPatch::UpdateSharedContent);
        }

        if previous.zoom != current.zoom {
            diff.add_patch(BackdropPatch::Rescale { zoom: current.zoom });
        }

        diff
    }
}
