//! Page size and orientation

use serde::{Deserialize, Serialize};

/// Pixels per inch used for all unit conversions
pub const DPI: f32 = 96.0;

/// Default visual gap between consecutive pages
pub const DEFAULT_PAGE_GAP: f32 = 20.0;

/// Convert inches to pixels
pub fn inches_to_px(inches: f32) -> f32 {
    inches * DPI
}

/// Convert pixels to inches
pub fn px_to_inches(px: f32) -> f32 {
    px / DPI
}

/// Replace a non-finite value with `fallback`, then clamp to non-negative.
pub fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        log::warn!("non-finite geometry value replaced by {}", fallback);
        fallback.max(0.0)
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    Letter,
    Legal,
    A4,
    A5,
}

impl PaperSize {
    /// Portrait dimensions in pixels
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PaperSize::Letter => (816.0, 1056.0),
            PaperSize::Legal => (816.0, 1344.0),
            // 210mm x 297mm
            PaperSize::A4 => (793.7, 1122.5),
            // 148mm x 210mm
            PaperSize::A5 => (559.4, 793.7),
        }
    }
}

/// Physical page dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub orientation: Orientation,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::from_paper(PaperSize::Letter, Orientation::Portrait)
    }
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        let orientation = if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        };
        Self {
            width,
            height,
            orientation,
        }
    }

    /// Build geometry from a paper preset
    pub fn from_paper(paper: PaperSize, orientation: Orientation) -> Self {
        let (w, h) = paper.dimensions();
        match orientation {
            Orientation::Portrait => Self {
                width: w,
                height: h,
                orientation,
            },
            Orientation::Landscape => Self {
                width: h,
                height: w,
                orientation,
            },
        }
    }

    /// Switch orientation, swapping width and height when it changes
    pub fn with_orientation(self, orientation: Orientation) -> Self {
        if orientation == self.orientation {
            return self;
        }
        Self {
            width: self.height,
            height: self.width,
            orientation,
        }
    }

    /// True when both dimensions are finite and positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}
