//! Page-Reflow: pagination core for a continuous rich-text editing surface
//!
//! The document is one editable flow; this crate decides where that flow
//! visually jumps to the next page and keeps the decision current as
//! content, margins, zoom or header/footer settings change:
//! - Block-granular greedy break decisions over measured heights
//! - Frame-coalesced recompute scheduling with a polling backstop
//! - Filler/spacer decorations and page backdrops for the view layer
//! - Margin rulers that write straight into the geometry store

pub mod error;
pub mod geometry;
pub mod overlay;
pub mod reflow;
pub mod render;
pub mod ruler;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use error::SetupError;
pub use geometry::{
    GlobalMargins, HeaderFooterConfig, MarginOverride, Orientation, PageGeometry,
    PageGeometryStore, PageSetup, PaperSize, RegionKind,
};
pub use overlay::{label, NumberFormat, PageNumberConfig};
pub use reflow::{
    BlockMetrics, BlockNode, BlockSource, BreakList, BreakMarker, CauseSet, DocPosition, FrameId,
    HeightResolver, MeasuredBlocks, RecomputeCause, ReflowEngine, ReflowOutcome,
};
pub use render::{Backdrop, BackdropDiff, BackdropPatch, Decoration, DecorationSet, Media, RegionSync};
pub use ruler::{DragKind, MarginRuler, RulerAxis, MIN_CONTENT};

use reflow::{FrameScheduler, PollTimer};
use render::{BreakRenderer, DiffEngine, PageBackdropRenderer, RegionEditors};

/// Point in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Rectangle in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// What one committed frame produced
#[derive(Debug, Clone)]
pub struct ReflowReport {
    pub causes: CauseSet,
    pub total_pages: usize,
    /// Whether the break markers differ from the previous pass
    pub breaks_changed: bool,
    /// Blocks skipped because their height did not resolve
    pub skipped: usize,
    pub backdrop: BackdropDiff,
}

/// The pagination state of one editing session
pub struct Paginator {
    store: PageGeometryStore,
    engine: ReflowEngine,
    scheduler: FrameScheduler,
    poll: PollTimer,
    breaks: BreakList,
    break_renderer: BreakRenderer,
    decorations: DecorationSet,
    backdrop_renderer: PageBackdropRenderer,
    backdrop: Backdrop,
    diff_engine: DiffEngine,
    regions: RegionEditors,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new()
    }
}

impl Paginator {
    /// Create a paginator with default page setup
    pub fn new() -> Self {
        Self::with_store(PageGeometryStore::new())
    }

    pub fn with_store(store: PageGeometryStore) -> Self {
        Self {
            store,
            engine: ReflowEngine::new(),
            scheduler: FrameScheduler::new(),
            poll: PollTimer::default(),
            breaks: BreakList::new(),
            break_renderer: BreakRenderer::new(),
            decorations: DecorationSet::new(),
            backdrop_renderer: PageBackdropRenderer::new(),
            backdrop: Backdrop::default(),
            diff_engine: DiffEngine::new(),
            regions: RegionEditors::new(),
        }
    }

    pub fn store(&self) -> &PageGeometryStore {
        &self.store
    }

    /// Apply a batch of store writes and schedule the recompute they imply.
    ///
    /// Returns the frame to fire, or `None` when nothing layout-relevant
    /// changed or the paginator is destroyed.
    pub fn update<F>(&mut self, f: F) -> Option<FrameId>
    where
        F: FnOnce(&mut PageGeometryStore),
    {
        f(&mut self.store);
        self.sync_store()
    }

    /// Replace the setup from persisted JSON and schedule a full recompute.
    /// A failed load leaves the store untouched.
    pub fn load_setup_json(&mut self, json: &str) -> Result<Option<FrameId>, SetupError> {
        self.store.load_setup_json(json)?;
        Ok(self.sync_store())
    }

    /// Feed a pointer move to an active ruler drag. Returns the committed
    /// value; the write is scheduled like any other store update.
    pub fn drag_ruler(&mut self, ruler: &mut MarginRuler, pointer: f32) -> Option<f32> {
        let value = ruler.pointer_move(&mut self.store, pointer)?;
        self.sync_store();
        Some(value)
    }

    /// Request a recompute for `cause`, folding in pending store changes
    pub fn request(&mut self, cause: RecomputeCause) -> Option<FrameId> {
        let mut causes = self.store.drain_changes();
        causes.insert(cause);
        self.scheduler.request_all(causes)
    }

    /// Document content changed
    pub fn content_changed(&mut self) -> Option<FrameId> {
        self.request(RecomputeCause::ContentChanged)
    }

    /// Turn store changes into a scheduled recompute, if there are any
    pub fn sync_store(&mut self) -> Option<FrameId> {
        let causes = self.store.drain_changes();
        if causes.is_empty() {
            return None;
        }
        self.scheduler.request_all(causes)
    }

    /// Polling backstop, called from a periodic host timer
    pub fn poll(&mut self, now_ms: u64) -> Option<FrameId> {
        if self.poll.due(now_ms) {
            self.request(RecomputeCause::PollingCheck)
        } else {
            None
        }
    }

    /// Frame callback for `id`. Stale frames and frames firing after
    /// [`destroy`](Self::destroy) do nothing.
    pub fn run_frame<S, R>(&mut self, id: FrameId, source: &S, resolver: &R) -> Option<ReflowReport>
    where
        S: BlockSource + ?Sized,
        R: HeightResolver + ?Sized,
    {
        let mut causes = self.scheduler.fire(id)?;
        causes.extend(self.store.drain_changes());
        Some(self.commit(causes, source, resolver))
    }

    /// Run the pending frame immediately
    pub fn flush<S, R>(&mut self, source: &S, resolver: &R) -> Option<ReflowReport>
    where
        S: BlockSource + ?Sized,
        R: HeightResolver + ?Sized,
    {
        let id = self.scheduler.pending_id()?;
        self.run_frame(id, source, resolver)
    }

    fn commit<S, R>(&mut self, causes: CauseSet, source: &S, resolver: &R) -> ReflowReport
    where
        S: BlockSource + ?Sized,
        R: HeightResolver + ?Sized,
    {
        let snapshot = self.store.snapshot();

        let mut breaks_changed = false;
        let mut skipped = 0;
        if causes.affects_breaks() || self.breaks.version() == 0 {
            let outcome = self.engine.reflow(source, resolver, &snapshot);
            skipped = outcome.skipped;
            breaks_changed = self.breaks.replace(outcome);
            self.store.set_page_count(self.breaks.total_pages());
            self.decorations
                .replace(self.break_renderer.render(self.breaks.markers()));
        }

        let backdrop = self
            .backdrop_renderer
            .render(self.breaks.total_pages(), &snapshot);
        let diff = self.diff_engine.compute_diff(&self.backdrop, &backdrop);
        self.backdrop = backdrop;

        ReflowReport {
            causes,
            total_pages: self.breaks.total_pages(),
            breaks_changed,
            skipped,
            backdrop: diff,
        }
    }

    /// Edit the shared header or footer from the instance on `page_index`
    pub fn edit_region(&mut self, kind: RegionKind, page_index: usize, content: &str) -> RegionSync {
        let sync = self
            .regions
            .apply_edit(&mut self.store, kind, page_index, content);
        if sync.kind.is_some() {
            self.backdrop.header_content = self.store.header_footer().header_content.clone();
            self.backdrop.footer_content = self.store.header_footer().footer_content.clone();
        }
        sync
    }

    pub fn focus_region(&mut self, kind: RegionKind, page_index: usize) {
        self.regions.focus(kind, page_index);
    }

    pub fn blur_region(&mut self) {
        self.regions.blur();
    }

    /// The host view is gone; pending and future frames are dropped
    pub fn destroy(&mut self) {
        self.scheduler.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.scheduler.is_destroyed()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.scheduler.pending_id()
    }

    pub fn breaks(&self) -> &BreakList {
        &self.breaks
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    /// Get total page count
    pub fn page_count(&self) -> usize {
        self.store.page_count()
    }

    /// Page owning a document position
    pub fn page_of(&self, position: DocPosition) -> usize {
        self.breaks.page_of(position)
    }

    /// "Page X of Y" for the page holding `position`
    pub fn page_indicator(&self, position: DocPosition) -> String {
        overlay::page_indicator(self.page_of(position), self.page_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_store() -> PageGeometryStore {
        let mut store = PageGeometryStore::new();
        store.set_margins(GlobalMargins::uniform(96.0));
        store.drain_changes();
        store
    }

    #[test]
    fn test_end_to_end_two_pages() {
        let mut paginator = Paginator::with_store(uniform_store());
        let blocks = MeasuredBlocks::from_heights(&[400.0, 400.0, 400.0]);

        let id = paginator.content_changed().unwrap();
        let report = paginator.run_frame(id, &blocks, &blocks).unwrap();

        assert_eq!(report.total_pages, 2);
        assert!(report.breaks_changed);
        assert_eq!(paginator.page_count(), 2);

        let markers = paginator.breaks().markers();
        assert_eq!(markers.len(), 1);
        let gap = paginator.store().page_gap();
        assert_eq!(markers[0].filler_height, (864.0 - 800.0) + 96.0 + gap);
        assert_eq!(markers[0].spacer_height, 96.0);

        assert_eq!(paginator.decorations().len(), 2);
        assert_eq!(paginator.backdrop().page_count(), 2);
        let inserted = report
            .backdrop
            .patches
            .iter()
            .filter(|p| matches!(p, BackdropPatch::InsertPage { .. }))
            .count();
        assert_eq!(inserted, 2);
        assert_eq!(paginator.page_indicator(DocPosition(2)), "Page 2 of 2");
    }

    #[test]
    fn test_store_write_schedules_frame() {
        let mut paginator = Paginator::new();
        let id = paginator.update(|store| store.set_margin_top(300.0)).unwrap();
        assert_eq!(paginator.pending_frame(), Some(id));

        // A second write replaces the pending frame and keeps both causes
        let next = paginator.update(|store| store.set_zoom(1.5)).unwrap();
        assert_ne!(next, id);
        let blocks = MeasuredBlocks::from_heights(&[100.0]);
        assert!(paginator.run_frame(id, &blocks, &blocks).is_none());
        let report = paginator.run_frame(next, &blocks, &blocks).unwrap();
        assert!(report.causes.contains(RecomputeCause::MarginChanged));
        assert!(report.causes.contains(RecomputeCause::ZoomChanged));

        // A write that changes nothing layout-relevant schedules nothing
        assert!(paginator.update(|store| store.set_orientation(Orientation::Portrait)).is_none());
    }

    #[test]
    fn test_load_setup_schedules_frame() {
        let mut paginator = Paginator::new();
        assert!(paginator.load_setup_json("[]").is_err());
        assert!(paginator.pending_frame().is_none());

        let id = paginator.load_setup_json(r#"{"zoom": 2.0}"#).unwrap().unwrap();
        assert_eq!(paginator.pending_frame(), Some(id));
        assert_eq!(paginator.store().zoom(), 2.0);
    }

    #[test]
    fn test_burst_of_changes_runs_once() {
        let mut paginator = Paginator::new();
        let blocks = MeasuredBlocks::from_heights(&[100.0; 20]);

        let first = paginator.content_changed().unwrap();
        let _ = paginator.content_changed();
        let last = paginator.content_changed().unwrap();

        assert!(paginator.run_frame(first, &blocks, &blocks).is_none());
        assert!(paginator.run_frame(last, &blocks, &blocks).is_some());
        assert!(paginator.flush(&blocks, &blocks).is_none());
    }

    #[test]
    fn test_idempotent_reflow() {
        let mut paginator = Paginator::new();
        let blocks = MeasuredBlocks::from_heights(&[300.0, 500.0, 200.0, 700.0, 120.0]);

        paginator.content_changed();
        paginator.flush(&blocks, &blocks).unwrap();
        let before = paginator.breaks().markers().to_vec();

        paginator.request(RecomputeCause::PollingCheck);
        let report = paginator.flush(&blocks, &blocks).unwrap();
        assert!(!report.breaks_changed);
        assert!(!report.backdrop.has_patches());
        assert_eq!(paginator.breaks().markers(), before.as_slice());
    }

    #[test]
    fn test_margin_change_triggers_reflow() {
        let mut paginator = Paginator::with_store(uniform_store());
        let blocks = MeasuredBlocks::from_heights(&[400.0, 400.0]);
        paginator.content_changed();
        paginator.flush(&blocks, &blocks);
        assert_eq!(paginator.page_count(), 1);

        let id = paginator.update(|store| store.set_margin_top(200.0)).unwrap();
        assert_eq!(paginator.pending_frame(), Some(id));
        let report = paginator.run_frame(id, &blocks, &blocks).unwrap();
        assert!(report.causes.contains(RecomputeCause::MarginChanged));
        assert_eq!(report.total_pages, 2);
        assert!(paginator.sync_store().is_none());
    }

    #[test]
    fn test_ruler_drag_feeds_reflow() {
        use std::rc::Rc;

        let mut paginator = Paginator::with_store(uniform_store());
        let blocks = MeasuredBlocks::from_heights(&[400.0, 400.0, 400.0]);
        paginator.content_changed();
        paginator.flush(&blocks, &blocks);
        assert_eq!(paginator.page_count(), 2);

        // Drag page 1's top margin down so only one block fits there
        let mut ruler = MarginRuler::vertical(Rc::new(ruler::NoopSurface));
        let stride = paginator.store().setup().page_stride();
        ruler.press(DragKind::TopMargin, 1, stride + 96.0);
        assert_eq!(paginator.drag_ruler(&mut ruler, stride + 600.0), Some(600.0));
        assert!(paginator.pending_frame().is_some());
        ruler.release();

        let report = paginator.flush(&blocks, &blocks).unwrap();
        assert!(report.causes.contains(RecomputeCause::MarginChanged));
        assert_eq!(report.total_pages, 2);
        assert_eq!(paginator.breaks().markers()[0].spacer_height, 600.0);
    }

    #[test]
    fn test_page_number_change_keeps_breaks() {
        let mut paginator = Paginator::new();
        let blocks = MeasuredBlocks::from_heights(&[500.0, 500.0]);
        paginator.content_changed();
        paginator.flush(&blocks, &blocks);
        let passes = paginator.breaks().version();

        paginator.update(|store| {
            store.set_page_numbers(PageNumberConfig {
                enabled: true,
                ..Default::default()
            })
        });
        let report = paginator.flush(&blocks, &blocks).unwrap();
        assert_eq!(paginator.breaks().version(), passes);
        assert_eq!(report.backdrop.patch_count(), 2);
        assert_eq!(
            paginator.backdrop().pages[1].label.as_ref().map(|l| l.text.as_str()),
            Some("2")
        );
    }

    #[test]
    fn test_destroyed_frame_is_noop() {
        let mut paginator = Paginator::new();
        let blocks = MeasuredBlocks::from_heights(&[100.0]);
        let id = paginator.content_changed().unwrap();
        paginator.destroy();
        assert!(paginator.run_frame(id, &blocks, &blocks).is_none());
        assert!(paginator.content_changed().is_none());
        assert_eq!(paginator.breaks().version(), 0);
    }

    #[test]
    fn test_poll_requests_frame() {
        let mut paginator = Paginator::new();
        assert!(paginator.poll(0).is_none());
        assert!(paginator.poll(500).is_none());
        let id = paginator.poll(1000).unwrap();
        assert_eq!(paginator.pending_frame(), Some(id));
    }

    #[test]
    fn test_region_edit_fans_out() {
        let mut paginator = Paginator::new();
        let blocks = MeasuredBlocks::from_heights(&[900.0, 900.0, 900.0]);
        paginator.update(|store| store.show_header(true));
        paginator.content_changed();
        paginator.flush(&blocks, &blocks);
        assert_eq!(paginator.page_count(), 3);

        paginator.focus_region(RegionKind::Header, 1);
        let sync = paginator.edit_region(RegionKind::Header, 1, "Minutes");
        assert_eq!(sync.refresh_pages, vec![0, 2]);
        assert_eq!(paginator.backdrop().header_content, "Minutes");
    }

    #[test]
    fn test_rect() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(Point { x: 5.0, y: 5.0 }));
        assert!(rect.intersects(&Rect::new(9.0, 9.0, 5.0, 5.0)));
        assert!(!rect.intersects(&Rect::new(11.0, 0.0, 5.0, 5.0)));
    }
}
