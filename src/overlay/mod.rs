//! Overlays drawn on top of page backdrops

mod page_number;

pub use page_number::{
    label, page_indicator, to_lower_alpha, to_lower_roman, Anchor, HorizontalPosition,
    LabelPosition, NumberFormat, PageNumberConfig, VerticalPosition,
};
