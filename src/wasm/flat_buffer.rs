//! Flat buffer protocol for zero-copy WASM bridge
//!
//! Binary format for one committed frame:
//!
//! ## u32 Buffer Layout:
//! ```text
//! Header (offset table for random access):
//! [0]     MAGIC (0x50475246 = "PGRF" for validation)
//! [1]     SCHEMA_VERSION (protocol version, currently 1)
//! [2]     version_lo (break list version)
//! [3]     version_hi (break list version)
//! [4]     page_count
//! [5]     marker_count
//! [6]     text_buffer_len
//! [7]     u32_page_offset (index in u32_data where page records start)
//! [8]     f32_page_offset (index in f32_data where page geometry starts)
//! [9..]   marker data...
//!
//! Per-marker: [position]
//!
//! At u32_page_offset, per-page:
//!   [page_index, flags, label_offset, label_len, label_utf16_offset, label_utf16_len, anchor]
//!     flags: bit0=has_header, bit1=has_footer, bit2=has_label
//!     label: only read if bit2 is set, otherwise offsets are ignored
//! ```
//!
//! ## f32 Buffer Layout:
//! ```text
//! Per-marker: [filler_height, spacer_height]
//! At f32_page_offset, per-page:
//!   [y, width, height, effective_top, effective_bottom, label_x, label_y]
//! ```

use crate::overlay::Anchor;
use crate::reflow::BreakMarker;
use crate::render::{Backdrop, PageBackdrop};

/// Magic number for format validation: "PGRF" (PaGe ReFlow)
pub const MAGIC: u32 = 0x50475246;

/// Schema version for protocol compatibility checking
pub const SCHEMA_VERSION: u32 = 1;

/// Header size in u32 elements
pub const HEADER_SIZE: usize = 9;

/// Number of u32 values per break marker
pub const U32_PER_MARKER: usize = 1;

/// Number of f32 values per break marker
pub const F32_PER_MARKER: usize = 2;

/// Number of u32 values per page
pub const U32_PER_PAGE: usize = 7;

/// Number of f32 values per page
pub const F32_PER_PAGE: usize = 7;

/// Flags bitmask
pub const FLAG_HAS_HEADER: u32 = 0b001;
pub const FLAG_HAS_FOOTER: u32 = 0b010;
pub const FLAG_HAS_LABEL: u32 = 0b100;

/// Anchor opcodes
pub fn anchor_code(anchor: Anchor) -> u32 {
    match anchor {
        Anchor::TopLeft => 0,
        Anchor::TopCenter => 1,
        Anchor::TopRight => 2,
        Anchor::BottomLeft => 3,
        Anchor::BottomCenter => 4,
        Anchor::BottomRight => 5,
    }
}

/// Frame buffer for zero-copy WASM transfer
pub struct FrameBuffer {
    /// Integer data (header, positions, flags, text offsets)
    pub u32_data: Vec<u32>,
    /// Float data (heights, page geometry)
    pub f32_data: Vec<f32>,
    /// UTF-8 label text
    pub text_data: Vec<u8>,

    // Track cumulative UTF-16 offset for efficient JS decoding
    utf16_text_offset: usize,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            u32_data: Vec::with_capacity(256),
            f32_data: Vec::with_capacity(256),
            text_data: Vec::with_capacity(256),
            utf16_text_offset: 0,
        }
    }

    pub fn clear(&mut self) {
        self.u32_data.clear();
        self.f32_data.clear();
        self.text_data.clear();
        self.utf16_text_offset = 0;
    }

    /// Pre-allocate buffers to avoid reallocation during encoding.
    /// JS holds pointers to these buffers, so a realloc would invalidate them.
    pub fn prepare(&mut self, markers: usize, pages: usize, text_needed: usize) {
        let u32_target = HEADER_SIZE + markers * U32_PER_MARKER + pages * U32_PER_PAGE + 32;
        let f32_target = markers * F32_PER_MARKER + pages * F32_PER_PAGE + 32;
        let text_target = text_needed + 64;

        // Reuse buffers when capacity is sufficient
        if self.u32_data.capacity() < u32_target {
            self.u32_data = Vec::with_capacity(u32_target);
        } else {
            self.u32_data.clear();
        }

        if self.f32_data.capacity() < f32_target {
            self.f32_data = Vec::with_capacity(f32_target);
        } else {
            self.f32_data.clear();
        }

        if self.text_data.capacity() < text_target {
            self.text_data = Vec::with_capacity(text_target);
        } else {
            self.text_data.clear();
        }

        self.utf16_text_offset = 0;
    }

    /// Write header with offset table placeholders
    pub fn write_header(&mut self, version: u64, page_count: u32, marker_count: u32) {
        self.u32_data.push(MAGIC);                         // [0] magic number
        self.u32_data.push(SCHEMA_VERSION);                // [1] schema version
        self.u32_data.push((version & 0xFFFFFFFF) as u32); // [2] version_lo
        self.u32_data.push((version >> 32) as u32);        // [3] version_hi
        self.u32_data.push(page_count);                    // [4] page_count
        self.u32_data.push(marker_count);                  // [5] marker_count
        self.u32_data.push(0);                             // [6] text_buffer_len (placeholder)
        self.u32_data.push(0);                             // [7] u32_page_offset (placeholder)
        self.u32_data.push(0);                             // [8] f32_page_offset (placeholder)
    }

    pub fn write_marker(&mut self, marker: &BreakMarker) {
        self.u32_data.push(marker.position.0 as u32);
        self.f32_data.push(marker.filler_height);
        self.f32_data.push(marker.spacer_height);
    }

    /// Record where page records start. Call once, after the last marker.
    pub fn begin_pages(&mut self) {
        if self.u32_data.len() < HEADER_SIZE {
            return;
        }
        self.u32_data[7] = self.u32_data.len() as u32;
        self.u32_data[8] = self.f32_data.len() as u32;
    }

    pub fn write_page(&mut self, page: &PageBackdrop) {
        let mut flags = 0;
        if page.header.is_some() {
            flags |= FLAG_HAS_HEADER;
        }
        if page.footer.is_some() {
            flags |= FLAG_HAS_FOOTER;
        }

        let (label_offset, label_len, label_utf16_offset, label_utf16_len, anchor, x, y) =
            match &page.label {
                Some(label) => {
                    flags |= FLAG_HAS_LABEL;
                    let offset = self.text_data.len() as u32;
                    self.text_data.extend_from_slice(label.text.as_bytes());
                    let utf16_offset = self.utf16_text_offset as u32;
                    let utf16_len = label.text.chars().map(|c| c.len_utf16()).sum::<usize>();
                    self.utf16_text_offset += utf16_len;
                    (
                        offset,
                        label.text.len() as u32,
                        utf16_offset,
                        utf16_len as u32,
                        anchor_code(label.anchor),
                        label.point.x,
                        label.point.y,
                    )
                }
                None => (0, 0, 0, 0, 0, 0.0, 0.0),
            };

        // u32: page_index, flags, label_offset, label_len,
        //      label_utf16_offset, label_utf16_len, anchor
        self.u32_data.push(page.page_index as u32);
        self.u32_data.push(flags);
        self.u32_data.push(label_offset);
        self.u32_data.push(label_len);
        self.u32_data.push(label_utf16_offset);
        self.u32_data.push(label_utf16_len);
        self.u32_data.push(anchor);

        // f32: y, width, height, effective_top, effective_bottom, label_x, label_y
        self.f32_data.push(page.bounds.y);
        self.f32_data.push(page.bounds.width);
        self.f32_data.push(page.bounds.height);
        self.f32_data.push(page.effective_top);
        self.f32_data.push(page.effective_bottom);
        self.f32_data.push(x);
        self.f32_data.push(y);
    }

    /// Synchronize the header with the written data
    pub fn finalize(&mut self) {
        if self.u32_data.len() < HEADER_SIZE {
            return;
        }
        self.u32_data[6] = self.text_data.len() as u32;

        #[cfg(debug_assertions)]
        self.validate_label_offsets();
    }

    /// Validate that all label offsets are within bounds (debug builds only)
    #[cfg(debug_assertions)]
    fn validate_label_offsets(&self) {
        let page_count = self.u32_data[4] as usize;
        let text_len = self.text_data.len();
        let mut idx = self.u32_data[7] as usize;
        if idx < HEADER_SIZE {
            return;
        }

        for page_idx in 0..page_count {
            if idx + U32_PER_PAGE > self.u32_data.len() {
                break;
            }
            let flags = self.u32_data[idx + 1];
            if flags & FLAG_HAS_LABEL != 0 {
                let offset = self.u32_data[idx + 2] as usize;
                let len = self.u32_data[idx + 3] as usize;
                debug_assert!(
                    offset + len <= text_len,
                    "Invalid label range for page {}: offset {} + length {} > text buffer size {}",
                    page_idx, offset, len, text_len
                );
            }
            idx += U32_PER_PAGE;
        }
    }

    /// Encode a full frame: markers, then every page of the backdrop
    pub fn encode(&mut self, version: u64, markers: &[BreakMarker], backdrop: &Backdrop) {
        let text_needed = backdrop
            .pages
            .iter()
            .filter_map(|p| p.label.as_ref())
            .map(|l| l.text.len())
            .sum();
        self.prepare(markers.len(), backdrop.pages.len(), text_needed);

        self.write_header(version, backdrop.pages.len() as u32, markers.len() as u32);
        for marker in markers {
            self.write_marker(marker);
        }
        self.begin_pages();
        for page in &backdrop.pages {
            self.write_page(page);
        }
        self.finalize();
    }
}
