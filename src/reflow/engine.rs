//! Block-granular pagination pass

use crate::geometry::PageSetup;
use crate::reflow::marker::{BreakMarker, DocPosition, PageExtent};
use rustc_hash::FxHashMap;

/// A block-level node in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockNode {
    pub position: DocPosition,
    /// True when the block has no content (e.g. an empty paragraph)
    pub is_empty: bool,
}

impl BlockNode {
    pub fn new(position: DocPosition, is_empty: bool) -> Self {
        Self { position, is_empty }
    }
}

/// Rendered box of a block, measured before zoom is applied
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockMetrics {
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl BlockMetrics {
    pub fn new(height: f32, margin_top: f32, margin_bottom: f32) -> Self {
        Self {
            height,
            margin_top,
            margin_bottom,
        }
    }

    /// Block with no vertical margins
    pub fn height(height: f32) -> Self {
        Self::new(height, 0.0, 0.0)
    }

    /// Height including vertical margins. `None` when any part is not
    /// finite; negative parts count as zero.
    pub fn outer_height(&self) -> Option<f32> {
        let parts = [self.height, self.margin_top, self.margin_bottom];
        if parts.iter().any(|p| !p.is_finite()) {
            return None;
        }
        Some(parts.iter().map(|p| p.max(0.0)).sum())
    }
}

/// Ordered traversal of the document's block nodes
pub trait BlockSource {
    fn blocks(&self) -> impl Iterator<Item = BlockNode> + '_;
}

/// Resolves the rendered height of the element backing a position.
///
/// Returns `None` when the element cannot be found, e.g. while the view is
/// mid-mutation.
pub trait HeightResolver {
    fn resolve(&self, position: DocPosition) -> Option<BlockMetrics>;
}

/// Result of one reflow pass
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowOutcome {
    pub markers: Vec<BreakMarker>,
    pub pages: Vec<PageExtent>,
    pub total_pages: usize,
    /// Blocks whose height could not be resolved
    pub skipped: usize,
}

/// Decides page breaks from measured block heights
#[derive(Debug, Default)]
pub struct ReflowEngine {
    passes: u64,
}

impl ReflowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Run a full pass over the document.
    ///
    /// Greedy: blocks accumulate on a page until the next one would exceed
    /// the page's usable height, at which point a break is emitted before
    /// it. A block taller than a whole page stays on the page it starts on.
    pub fn reflow<S, R>(&mut self, source: &S, resolver: &R, setup: &PageSetup) -> ReflowOutcome
    where
        S: BlockSource + ?Sized,
        R: HeightResolver + ?Sized,
    {
        self.passes += 1;

        let page_gap = setup.page_gap.max(0.0);
        let mut page_index = 0;
        let mut cursor_y: f32 = 0.0;
        let mut usable = setup.usable_height(page_index);
        let mut markers = Vec::new();
        let mut pages = vec![PageExtent::new(0)];
        let mut visited = 0usize;
        let mut skipped = 0usize;

        for node in source.blocks() {
            visited += 1;

            let Some(height) = resolver.resolve(node.position).and_then(|m| m.outer_height())
            else {
                skipped += 1;
                continue;
            };

            if height <= 0.0 && node.is_empty {
                continue;
            }

            let placed_on_page = pages.last().map(|p| p.block_count).unwrap_or(0);
            if placed_on_page > 0 && cursor_y + height > usable {
                let remaining = (usable - cursor_y).max(0.0);
                let filler_height = remaining + setup.effective_bottom(page_index) + page_gap;

                page_index += 1;
                let spacer_height = setup.effective_top(page_index);

                markers.push(BreakMarker {
                    position: node.position,
                    filler_height,
                    spacer_height,
                });
                pages.push(PageExtent::new(page_index));

                cursor_y = 0.0;
                usable = setup.usable_height(page_index);
            }

            cursor_y += height;
            if let Some(page) = pages.last_mut() {
                if page.first.is_none() {
                    page.first = Some(node.position);
                }
                page.last = Some(node.position);
                page.used_height += height;
                page.block_count += 1;
            }
        }

        let total_pages = page_index + 1;
        log::debug!(
            "reflow pass {}: {} blocks, {} unresolved, {} breaks, {} pages",
            self.passes,
            visited,
            skipped,
            markers.len(),
            total_pages
        );

        ReflowOutcome {
            markers,
            pages,
            total_pages,
            skipped,
        }
    }
}

/// A block with its measurement, `None` when unresolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredBlock {
    pub node: BlockNode,
    pub metrics: Option<BlockMetrics>,
}

/// In-memory block list that is both traversal and resolver.
///
/// Used by the JS bridge, which ships measurements in one batch, and by
/// tests.
#[derive(Debug, Clone, Default)]
pub struct MeasuredBlocks {
    blocks: Vec<MeasuredBlock>,
    by_position: FxHashMap<DocPosition, BlockMetrics>,
}

impl MeasuredBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consecutive non-empty blocks at positions 0, 1, 2, ...
    pub fn from_heights(heights: &[f32]) -> Self {
        let mut blocks = Self::new();
        for (i, &h) in heights.iter().enumerate() {
            blocks.push(BlockNode::new(DocPosition(i), false), Some(BlockMetrics::height(h)));
        }
        blocks
    }

    pub fn push(&mut self, node: BlockNode, metrics: Option<BlockMetrics>) {
        if let Some(m) = metrics {
            self.by_position.insert(node.position, m);
        } else {
            self.by_position.remove(&node.position);
        }
        self.blocks.push(MeasuredBlock { node, metrics });
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.by_position.clear();
    }
}

impl BlockSource for MeasuredBlocks {
    fn blocks(&self) -> impl Iterator<Item = BlockNode> + '_ {
        self.blocks.iter().map(|b| b.node)
    }
}

impl HeightResolver for MeasuredBlocks {
    fn resolve(&self, position: DocPosition) -> Option<BlockMetrics> {
        self.by_position.get(&position).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GlobalMargins, MarginOverride};

    fn setup_with_gap(gap: f32) -> PageSetup {
        PageSetup {
            page_gap: gap,
            margins: GlobalMargins::uniform(96.0),
            ..PageSetup::default()
        }
    }

    /// Break indices from plain greedy accumulation
    fn greedy_breaks(heights: &[f32], usable: f32) -> Vec<usize> {
        let mut breaks = Vec::new();
        let mut y = 0.0;
        let mut count = 0;
        for (i, &h) in heights.iter().enumerate() {
            if count > 0 && y + h > usable {
                breaks.push(i);
                y = 0.0;
                count = 0;
            }
            y += h;
            count += 1;
        }
        breaks
    }

    #[test]
    fn test_three_blocks_two_pages() {
        let setup = setup_with_gap(20.0);
        let blocks = MeasuredBlocks::from_heights(&[400.0, 400.0, 400.0]);
        let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &setup);

        assert_eq!(outcome.total_pages, 2);
        assert_eq!(outcome.markers.len(), 1);
        let marker = outcome.markers[0];
        assert_eq!(marker.position, DocPosition(2));
        assert_eq!(marker.filler_height, (864.0 - 800.0) + 96.0 + 20.0);
        assert_eq!(marker.spacer_height, 96.0);
    }

    #[test]
    fn test_matches_greedy_reference() {
        let setup = setup_with_gap(20.0);
        let sequences: [&[f32]; 4] = [
            &[100.0; 30],
            &[864.0, 1.0, 863.0, 2.0],
            &[500.0, 364.0, 365.0, 20.0, 480.0, 400.0, 10.0],
            &[33.5, 120.25, 700.0, 64.0, 64.0, 900.0, 12.0, 851.0],
        ];

        for heights in sequences {
            let blocks = MeasuredBlocks::from_heights(heights);
            let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &setup);
            let positions: Vec<usize> = outcome.markers.iter().map(|m| m.position.0).collect();
            assert_eq!(positions, greedy_breaks(heights, 864.0));
            assert_eq!(outcome.total_pages, positions.len() + 1);
        }
    }

    #[test]
    fn test_idempotent() {
        let setup = setup_with_gap(20.0);
        let blocks = MeasuredBlocks::from_heights(&[300.0, 700.0, 200.0, 50.0, 900.0]);
        let mut engine = ReflowEngine::new();
        let first = engine.reflow(&blocks, &blocks, &setup);
        let second = engine.reflow(&blocks, &blocks, &setup);
        assert_eq!(first, second);
        assert_eq!(engine.passes(), 2);
    }

    #[test]
    fn test_oversized_block_stays_on_its_page() {
        let setup = setup_with_gap(20.0);
        let blocks = MeasuredBlocks::from_heights(&[2000.0, 100.0]);
        let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &setup);

        // No break before the first block, one before the second
        assert_eq!(outcome.markers.len(), 1);
        assert_eq!(outcome.markers[0].position, DocPosition(1));
        assert_eq!(outcome.markers[0].filler_height, 96.0 + 20.0);
        assert_eq!(outcome.total_pages, 2);
    }

    #[test]
    fn test_zero_height_empty_block_skipped() {
        let setup = setup_with_gap(20.0);
        let mut blocks = MeasuredBlocks::new();
        blocks.push(BlockNode::new(DocPosition(0), false), Some(BlockMetrics::height(864.0)));
        blocks.push(BlockNode::new(DocPosition(1), true), Some(BlockMetrics::height(0.0)));
        blocks.push(BlockNode::new(DocPosition(2), false), Some(BlockMetrics::height(10.0)));

        let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &setup);
        assert_eq!(outcome.markers.len(), 1);
        assert_eq!(outcome.markers[0].position, DocPosition(2));
        assert!(outcome.markers.iter().all(|m| m.position != DocPosition(1)));
    }

    #[test]
    fn test_unresolved_block_skipped() {
        let setup = setup_with_gap(20.0);
        let mut blocks = MeasuredBlocks::new();
        blocks.push(BlockNode::new(DocPosition(0), false), Some(BlockMetrics::height(800.0)));
        blocks.push(BlockNode::new(DocPosition(1), false), None);
        blocks.push(
            BlockNode::new(DocPosition(2), false),
            Some(BlockMetrics::height(f32::NAN)),
        );
        blocks.push(BlockNode::new(DocPosition(3), false), Some(BlockMetrics::height(50.0)));

        let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &setup);
        assert_eq!(outcome.skipped, 2);
        assert!(outcome.markers.is_empty());
        assert_eq!(outcome.total_pages, 1);
        assert_eq!(outcome.pages[0].block_count, 2);
    }

    #[test]
    fn test_block_margins_count_toward_height() {
        let setup = setup_with_gap(20.0);
        let mut blocks = MeasuredBlocks::new();
        blocks.push(
            BlockNode::new(DocPosition(0), false),
            Some(BlockMetrics::new(400.0, 16.0, 16.0)),
        );
        blocks.push(
            BlockNode::new(DocPosition(1), false),
            Some(BlockMetrics::new(400.0, 16.0, 16.0)),
        );

        // 432 + 432 = 864 fits exactly
        let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &setup);
        assert!(outcome.markers.is_empty());
        assert_eq!(outcome.pages[0].used_height, 864.0);
    }

    #[test]
    fn test_override_on_later_page_does_not_touch_earlier_pages() {
        let base = setup_with_gap(20.0);
        let heights = [400.0; 12];
        let blocks = MeasuredBlocks::from_heights(&heights);
        let before = ReflowEngine::new().reflow(&blocks, &blocks, &base);

        let mut changed = base.clone();
        changed.overrides.insert(
            3,
            MarginOverride {
                top: Some(400.0),
                bottom: None,
            },
        );
        let after = ReflowEngine::new().reflow(&blocks, &blocks, &changed);

        for page in 0..3 {
            assert_eq!(base.usable_height(page), changed.usable_height(page));
            assert_eq!(base.effective_top(page), changed.effective_top(page));
        }
        // Markers that open pages 1..=2 are decided on pages 0..=1 and are
        // unchanged; the marker opening page 3 carries the new spacer.
        assert_eq!(before.markers[..2], after.markers[..2]);
        assert_eq!(after.markers[2].spacer_height, 400.0);
        assert_eq!(before.markers[2].position, after.markers[2].position);
    }

    #[test]
    fn test_header_reservation_shrinks_pages() {
        let mut setup = setup_with_gap(20.0);
        setup.header_footer.show_header = true;
        setup.header_footer.header_margin = 2.0; // 192px

        let blocks = MeasuredBlocks::from_heights(&[400.0, 400.0]);
        let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &setup);
        // Usable = 1056 - 192 - 96 = 768 < 800
        assert_eq!(outcome.total_pages, 2);
        assert_eq!(outcome.markers[0].spacer_height, 192.0);
    }

    #[test]
    fn test_page_extents() {
        let setup = setup_with_gap(20.0);
        let blocks = MeasuredBlocks::from_heights(&[500.0, 300.0, 500.0, 100.0]);
        let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &setup);

        assert_eq!(outcome.pages.len(), 2);
        assert_eq!(outcome.pages[0].first, Some(DocPosition(0)));
        assert_eq!(outcome.pages[0].last, Some(DocPosition(1)));
        assert_eq!(outcome.pages[1].first, Some(DocPosition(2)));
        assert_eq!(outcome.pages[1].block_count, 2);
        assert_eq!(outcome.pages[1].used_height, 600.0);
    }

    #[test]
    fn test_empty_document_is_one_page() {
        let blocks = MeasuredBlocks::new();
        let outcome = ReflowEngine::new().reflow(&blocks, &blocks, &PageSetup::default());
        assert_eq!(outcome.total_pages, 1);
        assert!(outcome.markers.is_empty());
    }

    #[test]
    fn test_negative_metrics_clamped() {
        let metrics = BlockMetrics::new(100.0, -20.0, 5.0);
        assert_eq!(metrics.outer_height(), Some(105.0));
        assert_eq!(BlockMetrics::new(f32::INFINITY, 0.0, 0.0).outer_height(), None);
    }
}
