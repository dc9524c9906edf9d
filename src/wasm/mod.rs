//! WASM bindings for the paginator

pub mod flat_buffer;

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::geometry::{GlobalMargins, Orientation, PaperSize, RegionKind};
use crate::overlay::{HorizontalPosition, LabelPosition, NumberFormat, PageNumberConfig, VerticalPosition};
use crate::reflow::{BlockMetrics, BlockNode, DocPosition, FrameId, MeasuredBlocks};
use crate::ruler::{MarginRuler, NoopSurface};
use crate::Paginator;
use flat_buffer::FrameBuffer;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed paginator wrapper
#[wasm_bindgen]
pub struct WasmPaginator {
    paginator: Paginator,
    horizontal: MarginRuler,
    vertical: MarginRuler,
    buffer: FrameBuffer,
    blocks: MeasuredBlocks,
}

#[wasm_bindgen]
impl WasmPaginator {
    /// Create a paginator with default page setup (US Letter, 1" margins)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        // The host routes pointer events itself
        let surface = Rc::new(NoopSurface);
        Self {
            paginator: Paginator::new(),
            horizontal: MarginRuler::horizontal(surface.clone()),
            vertical: MarginRuler::vertical(surface),
            buffer: FrameBuffer::new(),
            blocks: MeasuredBlocks::new(),
        }
    }

    // Scheduling

    /// Document content changed; returns the frame id to fire
    #[wasm_bindgen(js_name = contentChanged)]
    pub fn content_changed(&mut self) -> Option<f64> {
        self.paginator.content_changed().map(frame_to_js)
    }

    /// Pick up setup changes; returns a frame id if any were made
    #[wasm_bindgen(js_name = syncStore)]
    pub fn sync_store(&mut self) -> Option<f64> {
        self.paginator.sync_store().map(frame_to_js)
    }

    /// Polling backstop tick
    pub fn poll(&mut self, now_ms: f64) -> Option<f64> {
        self.paginator.poll(now_ms.max(0.0) as u64).map(frame_to_js)
    }

    /// Run a frame with freshly measured blocks.
    ///
    /// `heights` holds outer heights; NaN marks a block whose height could
    /// not be resolved. `empty` flags are 0 or 1. Returns false for stale
    /// frames, otherwise the frame buffer is rewritten.
    #[wasm_bindgen(js_name = runFrame)]
    pub fn run_frame(&mut self, frame_id: f64, positions: &[u32], heights: &[f32], empty: &[u8]) -> bool {
        let id = FrameId(frame_id.max(0.0) as u64);
        if self.paginator.is_destroyed() || self.paginator.pending_frame() != Some(id) {
            return false;
        }
        fill_blocks(&mut self.blocks, positions, heights, empty);
        match self.paginator.run_frame(id, &self.blocks, &self.blocks) {
            Some(report) => {
                if report.skipped > 0 {
                    log::debug!("{} blocks left unmeasured this frame", report.skipped);
                }
                self.encode();
                true
            }
            None => false,
        }
    }

    /// Frame id waiting to fire, if any
    #[wasm_bindgen(js_name = pendingFrame)]
    pub fn pending_frame(&self) -> Option<f64> {
        self.paginator.pending_frame().map(frame_to_js)
    }

    /// The host view is being torn down
    pub fn destroy(&mut self) {
        self.paginator.destroy();
        self.horizontal.release();
        self.vertical.release();
    }

    // Page setup

    #[wasm_bindgen(js_name = setPageSize)]
    pub fn set_page_size(&mut self, width: f32, height: f32) -> Option<f64> {
        self.paginator
            .update(|store| store.set_page_size(width, height))
            .map(frame_to_js)
    }

    /// Paper preset: "letter", "legal", "a4" or "a5". Unknown names are
    /// ignored and schedule nothing.
    #[wasm_bindgen(js_name = setPaper)]
    pub fn set_paper(&mut self, name: &str) -> Option<f64> {
        let paper = match name.to_ascii_lowercase().as_str() {
            "letter" => PaperSize::Letter,
            "legal" => PaperSize::Legal,
            "a4" => PaperSize::A4,
            "a5" => PaperSize::A5,
            other => {
                log::warn!("unknown paper size {:?}", other);
                return None;
            }
        };
        self.paginator
            .update(|store| store.set_paper(paper))
            .map(frame_to_js)
    }

    #[wasm_bindgen(js_name = setLandscape)]
    pub fn set_landscape(&mut self, landscape: bool) -> Option<f64> {
        let orientation = if landscape {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        self.paginator
            .update(|store| store.set_orientation(orientation))
            .map(frame_to_js)
    }

    #[wasm_bindgen(js_name = setMargins)]
    pub fn set_margins(&mut self, left: f32, right: f32, top: f32, bottom: f32) -> Option<f64> {
        let current = self.paginator.store().margins();
        self.paginator
            .update(|store| {
                store.set_margins(GlobalMargins {
                    left,
                    right,
                    top,
                    bottom,
                    ..current
                })
            })
            .map(frame_to_js)
    }

    #[wasm_bindgen(js_name = setPageMarginTop)]
    pub fn set_page_margin_top(&mut self, page: usize, value: f32) -> Option<f64> {
        self.paginator
            .update(|store| store.set_page_margin_top(page, value))
            .map(frame_to_js)
    }

    #[wasm_bindgen(js_name = setPageMarginBottom)]
    pub fn set_page_margin_bottom(&mut self, page: usize, value: f32) -> Option<f64> {
        self.paginator
            .update(|store| store.set_page_margin_bottom(page, value))
            .map(frame_to_js)
    }

    #[wasm_bindgen(js_name = showHeader)]
    pub fn show_header(&mut self, show: bool) -> Option<f64> {
        self.paginator
            .update(|store| store.show_header(show))
            .map(frame_to_js)
    }

    #[wasm_bindgen(js_name = showFooter)]
    pub fn show_footer(&mut self, show: bool) -> Option<f64> {
        self.paginator
            .update(|store| store.show_footer(show))
            .map(frame_to_js)
    }

    /// Header offset from the page top, in inches
    #[wasm_bindgen(js_name = setHeaderMargin)]
    pub fn set_header_margin(&mut self, inches: f32) -> Option<f64> {
        self.paginator
            .update(|store| store.set_header_margin(inches))
            .map(frame_to_js)
    }

    /// Footer offset from the page bottom, in inches
    #[wasm_bindgen(js_name = setFooterMargin)]
    pub fn set_footer_margin(&mut self, inches: f32) -> Option<f64> {
        self.paginator
            .update(|store| store.set_footer_margin(inches))
            .map(frame_to_js)
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f32) -> Option<f64> {
        self.paginator
            .update(|store| store.set_zoom(zoom))
            .map(frame_to_js)
    }

    /// Page numbers. `format` is "arabic", "roman" or "alpha"; `position`
    /// is e.g. "bottom-center".
    #[wasm_bindgen(js_name = setPageNumbers)]
    pub fn set_page_numbers(
        &mut self,
        enabled: bool,
        format: &str,
        position: &str,
        show_on_first_page: bool,
    ) -> Option<f64> {
        let format = match format {
            "roman" => NumberFormat::LowerRoman,
            "alpha" => NumberFormat::LowerAlpha,
            _ => NumberFormat::Arabic,
        };
        let (vertical, horizontal) = position.split_once('-').unwrap_or(("bottom", "center"));
        let position = LabelPosition {
            vertical: match vertical {
                "top" => VerticalPosition::Top,
                _ => VerticalPosition::Bottom,
            },
            horizontal: match horizontal {
                "left" => HorizontalPosition::Left,
                "right" => HorizontalPosition::Right,
                _ => HorizontalPosition::Center,
            },
        };
        let config = PageNumberConfig {
            enabled,
            position,
            format,
            show_on_first_page,
        };
        self.paginator
            .update(|store| store.set_page_numbers(config))
            .map(frame_to_js)
    }

    /// Replace the whole setup from persisted JSON; returns the frame id to fire
    #[wasm_bindgen(js_name = loadSetup)]
    pub fn load_setup(&mut self, json: &str) -> Result<Option<f64>, JsValue> {
        self.paginator
            .load_setup_json(json)
            .map(|id| id.map(frame_to_js))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = getSetup)]
    pub fn get_setup(&self) -> Result<String, JsValue> {
        self.paginator
            .store()
            .setup()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    // Header / footer editing

    #[wasm_bindgen(js_name = focusRegion)]
    pub fn focus_region(&mut self, footer: bool, page: usize) {
        self.paginator.focus_region(region_kind(footer), page);
    }

    #[wasm_bindgen(js_name = blurRegion)]
    pub fn blur_region(&mut self) {
        self.paginator.blur_region();
    }

    /// Returns the pages whose instance must re-read the shared content
    #[wasm_bindgen(js_name = editRegion)]
    pub fn edit_region(&mut self, footer: bool, page: usize, content: &str) -> Vec<u32> {
        self.paginator
            .edit_region(region_kind(footer), page, content)
            .refresh_pages
            .into_iter()
            .map(|p| p as u32)
            .collect()
    }

    // Rulers

    /// Hit-test and start a ruler drag. `pointer` is along the ruler axis in
    /// screen units.
    #[wasm_bindgen(js_name = pressRuler)]
    pub fn press_ruler(&mut self, vertical: bool, pointer: f32, page: usize) -> bool {
        let setup = self.paginator.store().setup();
        let ruler = if vertical { &mut self.vertical } else { &mut self.horizontal };
        let hit = ruler
            .hit_test(setup, pointer, page)
            .or_else(|| ruler.hit_test_indent(setup, pointer));
        match hit {
            Some(kind) => ruler.press(kind, page, pointer),
            None => false,
        }
    }

    /// Returns the committed value, or undefined when no drag is active.
    /// A committed value schedules a frame; read it with `pendingFrame`.
    #[wasm_bindgen(js_name = moveRuler)]
    pub fn move_ruler(&mut self, pointer: f32) -> Option<f32> {
        let ruler = if self.vertical.is_dragging() {
            &mut self.vertical
        } else {
            &mut self.horizontal
        };
        self.paginator.drag_ruler(ruler, pointer)
    }

    #[wasm_bindgen(js_name = releaseRuler)]
    pub fn release_ruler(&mut self) -> bool {
        let released = self.vertical.release().is_some();
        self.horizontal.release().is_some() || released
    }

    // Queries

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.paginator.page_count()
    }

    #[wasm_bindgen(js_name = pageOf)]
    pub fn page_of(&self, position: u32) -> usize {
        self.paginator.page_of(DocPosition(position as usize))
    }

    #[wasm_bindgen(js_name = pageIndicator)]
    pub fn page_indicator(&self, position: u32) -> String {
        self.paginator.page_indicator(DocPosition(position as usize))
    }

    #[wasm_bindgen(js_name = pageLabel)]
    pub fn page_label(&self, page: usize) -> Option<String> {
        self.paginator.store().page_numbers().label_for(page)
    }

    #[wasm_bindgen(js_name = getScaledHeight)]
    pub fn get_scaled_height(&self) -> f32 {
        self.paginator.backdrop().scaled_height()
    }

    // Frame buffer access

    #[wasm_bindgen(js_name = getU32Ptr)]
    pub fn get_u32_ptr(&self) -> *const u32 {
        self.buffer.u32_data.as_ptr()
    }

    #[wasm_bindgen(js_name = getU32Len)]
    pub fn get_u32_len(&self) -> usize {
        self.buffer.u32_data.len()
    }

    #[wasm_bindgen(js_name = getF32Ptr)]
    pub fn get_f32_ptr(&self) -> *const f32 {
        self.buffer.f32_data.as_ptr()
    }

    #[wasm_bindgen(js_name = getF32Len)]
    pub fn get_f32_len(&self) -> usize {
        self.buffer.f32_data.len()
    }

    #[wasm_bindgen(js_name = getTextPtr)]
    pub fn get_text_ptr(&self) -> *const u8 {
        self.buffer.text_data.as_ptr()
    }

    #[wasm_bindgen(js_name = getTextLen)]
    pub fn get_text_len(&self) -> usize {
        self.buffer.text_data.len()
    }
}

impl WasmPaginator {
    fn encode(&mut self) {
        let breaks = self.paginator.breaks();
        self.buffer
            .encode(breaks.version(), breaks.markers(), self.paginator.backdrop());
    }
}

impl Default for WasmPaginator {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_to_js(id: FrameId) -> f64 {
    id.0 as f64
}

fn region_kind(footer: bool) -> RegionKind {
    if footer {
        RegionKind::Footer
    } else {
        RegionKind::Header
    }
}

/// Rebuild the measured block list from parallel host arrays. Missing
/// heights count as unresolved.
fn fill_blocks(blocks: &mut MeasuredBlocks, positions: &[u32], heights: &[f32], empty: &[u8]) {
    blocks.clear();
    for (i, &position) in positions.iter().enumerate() {
        let node = BlockNode::new(
            DocPosition(position as usize),
            empty.get(i).copied().unwrap_or(0) != 0,
        );
        let metrics = heights
            .get(i)
            .copied()
            .filter(|h| !h.is_nan())
            .map(BlockMetrics::height);
        blocks.push(node, metrics);
    }
}
