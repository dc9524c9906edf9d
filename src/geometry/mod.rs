//! Page geometry store
//!
//! One mutable record per editing session holding page size, margins,
//! per-page overrides, header/footer and page-number settings, zoom and the
//! last computed page count. Every setter sanitizes its input and records
//! the [`RecomputeCause`] it implies; the owner drains those causes into the
//! scheduler. Reads for a reflow pass go through [`PageGeometryStore::snapshot`].

mod margins;
mod page;
mod setup;

pub use margins::{
    BorderLine, BorderStyle, GlobalMargins, HeaderFooterConfig, MarginOverride, RegionKind,
};
pub use page::{
    inches_to_px, px_to_inches, sanitize, Orientation, PageGeometry, PaperSize, DEFAULT_PAGE_GAP,
    DPI,
};
pub use setup::PageSetup;

use crate::error::SetupError;
use crate::overlay::PageNumberConfig;
use crate::reflow::{CauseSet, RecomputeCause};

/// Smallest zoom factor accepted
pub const MIN_ZOOM: f32 = 0.1;

/// Observable page geometry state
#[derive(Debug, Clone)]
pub struct PageGeometryStore {
    setup: PageSetup,
    page_count: usize,
    revision: u64,
    pending: CauseSet,
}

impl Default for PageGeometryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageGeometryStore {
    pub fn new() -> Self {
        Self {
            setup: PageSetup::default(),
            page_count: 1,
            revision: 0,
            pending: CauseSet::new(),
        }
    }

    /// Store seeded with `setup`; lengths are clamped before use
    pub fn with_setup(setup: PageSetup) -> Self {
        Self {
            setup: setup.sanitized(),
            ..Self::new()
        }
    }

    /// Immutable copy of the current configuration
    pub fn snapshot(&self) -> PageSetup {
        self.setup.clone()
    }

    /// Borrow the current configuration
    pub fn setup(&self) -> &PageSetup {
        &self.setup
    }

    /// Incremented on every committed change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Take the causes recorded since the last drain
    pub fn drain_changes(&mut self) -> CauseSet {
        self.pending.take()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    fn commit(&mut self, cause: RecomputeCause) {
        self.revision += 1;
        self.pending.insert(cause);
    }

    /// Restore defaults, e.g. when a new document is created or opened
    pub fn reset(&mut self) {
        self.setup = PageSetup::default();
        self.page_count = 1;
        self.commit_everything();
    }

    /// Replace the whole configuration from persisted JSON
    pub fn load_setup_json(&mut self, json: &str) -> Result<(), SetupError> {
        self.setup = PageSetup::from_json(json)?;
        self.commit_everything();
        Ok(())
    }

    fn commit_everything(&mut self) {
        self.commit(RecomputeCause::PageSizeChanged);
        self.commit(RecomputeCause::MarginChanged);
        self.commit(RecomputeCause::HeaderFooterChanged);
        self.commit(RecomputeCause::PageNumbersChanged);
        self.commit(RecomputeCause::ZoomChanged);
    }

    // Page geometry

    pub fn page(&self) -> PageGeometry {
        self.setup.page
    }

    pub fn set_page_size(&mut self, width: f32, height: f32) {
        let current = self.setup.page;
        let width = sanitize(width, current.width);
        let height = sanitize(height, current.height);
        self.setup.page = PageGeometry::new(width, height);
        self.commit(RecomputeCause::PageSizeChanged);
    }

    pub fn set_paper(&mut self, paper: PaperSize) {
        self.setup.page = PageGeometry::from_paper(paper, self.setup.page.orientation);
        self.commit(RecomputeCause::PageSizeChanged);
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.setup.page.orientation == orientation {
            return;
        }
        self.setup.page = self.setup.page.with_orientation(orientation);
        self.commit(RecomputeCause::PageSizeChanged);
    }

    // Margins

    pub fn margins(&self) -> GlobalMargins {
        self.setup.margins
    }

    pub fn set_margins(&mut self, margins: GlobalMargins) {
        let current = self.setup.margins;
        self.setup.margins = GlobalMargins {
            left: sanitize(margins.left, current.left),
            right: sanitize(margins.right, current.right),
            top: sanitize(margins.top, current.top),
            bottom: sanitize(margins.bottom, current.bottom),
            first_line_indent: sanitize(margins.first_line_indent, current.first_line_indent),
            left_indent: sanitize(margins.left_indent, current.left_indent),
            right_indent: sanitize(margins.right_indent, current.right_indent),
        };
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn set_margin_left(&mut self, value: f32) {
        self.setup.margins.left = sanitize(value, self.setup.margins.left);
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn set_margin_right(&mut self, value: f32) {
        self.setup.margins.right = sanitize(value, self.setup.margins.right);
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn set_margin_top(&mut self, value: f32) {
        self.setup.margins.top = sanitize(value, self.setup.margins.top);
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn set_margin_bottom(&mut self, value: f32) {
        self.setup.margins.bottom = sanitize(value, self.setup.margins.bottom);
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn set_first_line_indent(&mut self, value: f32) {
        self.setup.margins.first_line_indent = sanitize(value, self.setup.margins.first_line_indent);
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn set_left_indent(&mut self, value: f32) {
        self.setup.margins.left_indent = sanitize(value, self.setup.margins.left_indent);
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn set_right_indent(&mut self, value: f32) {
        self.setup.margins.right_indent = sanitize(value, self.setup.margins.right_indent);
        self.commit(RecomputeCause::MarginChanged);
    }

    // Per-page overrides. Entries are created lazily and never removed
    // except by reset or a setup load.

    pub fn page_override(&self, page: usize) -> Option<MarginOverride> {
        self.setup.overrides.get(&page).copied()
    }

    pub fn set_page_margin_top(&mut self, page: usize, value: f32) {
        let fallback = self.setup.margin_top(page);
        let entry = self.setup.overrides.entry(page).or_default();
        entry.top = Some(sanitize(value, fallback));
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn set_page_margin_bottom(&mut self, page: usize, value: f32) {
        let fallback = self.setup.margin_bottom(page);
        let entry = self.setup.overrides.entry(page).or_default();
        entry.bottom = Some(sanitize(value, fallback));
        self.commit(RecomputeCause::MarginChanged);
    }

    pub fn margin_top(&self, page: usize) -> f32 {
        self.setup.margin_top(page)
    }

    pub fn margin_bottom(&self, page: usize) -> f32 {
        self.setup.margin_bottom(page)
    }

    pub fn effective_top(&self, page: usize) -> f32 {
        self.setup.effective_top(page)
    }

    pub fn effective_bottom(&self, page: usize) -> f32 {
        self.setup.effective_bottom(page)
    }

    pub fn usable_height(&self, page: usize) -> f32 {
        self.setup.usable_height(page)
    }

    // Header and footer

    pub fn header_footer(&self) -> &HeaderFooterConfig {
        &self.setup.header_footer
    }

    pub fn set_header_footer(&mut self, mut config: HeaderFooterConfig) {
        let current = &self.setup.header_footer;
        config.header_margin = sanitize(config.header_margin, current.header_margin);
        config.footer_margin = sanitize(config.footer_margin, current.footer_margin);
        self.setup.header_footer = config;
        self.commit(RecomputeCause::HeaderFooterChanged);
    }

    pub fn show_header(&mut self, show: bool) {
        self.setup.header_footer.show_header = show;
        self.commit(RecomputeCause::HeaderFooterChanged);
    }

    pub fn show_footer(&mut self, show: bool) {
        self.setup.header_footer.show_footer = show;
        self.commit(RecomputeCause::HeaderFooterChanged);
    }

    pub fn set_header_margin(&mut self, inches: f32) {
        let hf = &mut self.setup.header_footer;
        hf.header_margin = sanitize(inches, hf.header_margin);
        self.commit(RecomputeCause::HeaderFooterChanged);
    }

    pub fn set_footer_margin(&mut self, inches: f32) {
        let hf = &mut self.setup.header_footer;
        hf.footer_margin = sanitize(inches, hf.footer_margin);
        self.commit(RecomputeCause::HeaderFooterChanged);
    }

    /// Replace the shared header or footer content.
    ///
    /// Reserved space is fixed by the margin offset, so content edits do not
    /// request a reflow. Returns false when the content is unchanged.
    pub fn set_region_content(&mut self, kind: RegionKind, content: &str) -> bool {
        let hf = &mut self.setup.header_footer;
        let slot = match kind {
            RegionKind::Header => &mut hf.header_content,
            RegionKind::Footer => &mut hf.footer_content,
        };
        if slot == content {
            return false;
        }
        *slot = content.to_string();
        self.revision += 1;
        true
    }

    // Page numbers

    pub fn page_numbers(&self) -> PageNumberConfig {
        self.setup.page_numbers
    }

    pub fn set_page_numbers(&mut self, config: PageNumberConfig) {
        self.setup.page_numbers = config;
        self.commit(RecomputeCause::PageNumbersChanged);
    }

    // Zoom

    pub fn zoom(&self) -> f32 {
        self.setup.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.setup.zoom = sanitize(zoom, self.setup.zoom).max(MIN_ZOOM);
        self.commit(RecomputeCause::ZoomChanged);
    }

    pub fn page_gap(&self) -> f32 {
        self.setup.page_gap
    }

    // Derived page count, written back after each reflow

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn set_page_count(&mut self, count: usize) {
        self.page_count = count.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = PageGeometryStore::new();
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.zoom(), 1.0);
        assert_eq!(store.usable_height(0), 864.0);
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_setters_record_causes() {
        let mut store = PageGeometryStore::new();
        store.set_margin_top(120.0);
        store.set_zoom(1.25);
        store.set_zoom(1.5);

        let changes = store.drain_changes();
        assert_eq!(changes.len(), 2);
        assert!(changes.contains(RecomputeCause::MarginChanged));
        assert!(changes.contains(RecomputeCause::ZoomChanged));
        assert!(store.drain_changes().is_empty());
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn test_invalid_values_clamped() {
        let mut store = PageGeometryStore::new();
        store.set_margin_left(-30.0);
        assert_eq!(store.margins().left, 0.0);

        store.set_margin_top(f32::NAN);
        assert_eq!(store.margins().top, 96.0);

        store.set_page_size(f32::INFINITY, 900.0);
        assert_eq!(store.page().width, 816.0);
        assert_eq!(store.page().height, 900.0);

        store.set_zoom(f32::NAN);
        assert_eq!(store.zoom(), 1.0);
        store.set_zoom(0.0);
        assert_eq!(store.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_override_created_lazily() {
        let mut store = PageGeometryStore::new();
        assert!(store.page_override(1).is_none());

        store.set_page_margin_top(1, 200.0);
        let entry = store.page_override(1).unwrap();
        assert_eq!(entry.top, Some(200.0));
        assert_eq!(entry.bottom, None);
        assert_eq!(store.effective_top(1), 200.0);
        assert_eq!(store.effective_top(0), 96.0);
    }

    #[test]
    fn test_header_content_does_not_request_reflow() {
        let mut store = PageGeometryStore::new();
        assert!(store.set_region_content(RegionKind::Header, "Report"));
        assert!(!store.set_region_content(RegionKind::Header, "Report"));
        assert!(!store.has_pending_changes());
        assert_eq!(store.header_footer().header_content, "Report");
    }

    #[test]
    fn test_orientation_change() {
        let mut store = PageGeometryStore::new();
        store.set_orientation(Orientation::Landscape);
        assert_eq!(store.page().width, 1056.0);
        assert!(store.drain_changes().contains(RecomputeCause::PageSizeChanged));

        store.set_orientation(Orientation::Landscape);
        assert!(store.drain_changes().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut store = PageGeometryStore::new();
        store.set_page_margin_bottom(4, 10.0);
        store.set_page_count(7);
        store.reset();
        assert!(store.page_override(4).is_none());
        assert_eq!(store.page_count(), 1);
        assert!(store.drain_changes().affects_breaks());
    }

    #[test]
    fn test_load_setup_json() {
        let mut store = PageGeometryStore::new();
        store
            .load_setup_json(r#"{"margins": {"left": 50, "right": 50, "top": 72, "bottom": 72, "firstLineIndent": 0, "leftIndent": 0, "rightIndent": 0}}"#)
            .unwrap();
        assert_eq!(store.margins().top, 72.0);
        assert!(store.load_setup_json("[]").is_err());
        // Failed load leaves state untouched
        assert_eq!(store.margins().top, 72.0);
    }

    #[test]
    fn test_loaded_lengths_clamped() {
        let mut store = PageGeometryStore::new();
        store
            .load_setup_json(r#"{"margins": {"left": -200, "right": -50, "top": 72, "bottom": 72, "firstLineIndent": 0, "leftIndent": -8, "rightIndent": 0}}"#)
            .unwrap();
        assert_eq!(store.margins().left, 0.0);
        assert_eq!(store.margins().left_indent, 0.0);
        assert_eq!(store.setup().content_width(), 816.0);

        let mut setup = PageSetup::default();
        setup.margins.top = -30.0;
        setup.header_footer.footer_margin = f32::NAN;
        let store = PageGeometryStore::with_setup(setup);
        assert_eq!(store.margins().top, 0.0);
        assert_eq!(store.header_footer().footer_margin, 0.5);
        assert_eq!(store.page_count(), 1);
    }

    #[test]
    fn test_default_matches_new() {
        let store = PageGeometryStore::default();
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.setup(), PageGeometryStore::new().setup());
    }

    #[test]
    fn test_page_count_at_least_one() {
        let mut store = PageGeometryStore::new();
        store.set_page_count(0);
        assert_eq!(store.page_count(), 1);
    }
}
