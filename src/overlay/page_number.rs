//! Page number labels

use serde::{Deserialize, Serialize};

/// Vertical placement of the page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerticalPosition {
    Top,
    #[default]
    Bottom,
}

/// Horizontal placement of the page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HorizontalPosition {
    Left,
    #[default]
    Center,
    Right,
}

/// Numbering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberFormat {
    #[default]
    Arabic,
    LowerRoman,
    LowerAlpha,
}

/// Where a label sits on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPosition {
    pub vertical: VerticalPosition,
    pub horizontal: HorizontalPosition,
}

/// Corner (or edge midpoint) the label is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl LabelPosition {
    pub fn anchor(&self) -> Anchor {
        match (self.vertical, self.horizontal) {
            (VerticalPosition::Top, HorizontalPosition::Left) => Anchor::TopLeft,
            (VerticalPosition::Top, HorizontalPosition::Center) => Anchor::TopCenter,
            (VerticalPosition::Top, HorizontalPosition::Right) => Anchor::TopRight,
            (VerticalPosition::Bottom, HorizontalPosition::Left) => Anchor::BottomLeft,
            (VerticalPosition::Bottom, HorizontalPosition::Center) => Anchor::BottomCenter,
            (VerticalPosition::Bottom, HorizontalPosition::Right) => Anchor::BottomRight,
        }
    }
}

/// Page number settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNumberConfig {
    pub enabled: bool,
    pub position: LabelPosition,
    pub format: NumberFormat,
    pub show_on_first_page: bool,
}

impl Default for PageNumberConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            position: LabelPosition::default(),
            format: NumberFormat::Arabic,
            show_on_first_page: true,
        }
    }
}

impl PageNumberConfig {
    /// Label for a page, honoring the enabled flag
    pub fn label_for(&self, page_index: usize) -> Option<String> {
        if !self.enabled {
            return None;
        }
        label(page_index, self.format, self.position, self.show_on_first_page)
    }
}

/// Text of the page number for a 0-based page index.
///
/// Returns `None` for the first page when `show_on_first_page` is false.
/// `position` does not affect the text; it is accepted so callers can pass
/// the whole configuration through one call.
pub fn label(
    page_index: usize,
    format: NumberFormat,
    _position: LabelPosition,
    show_on_first_page: bool,
) -> Option<String> {
    if page_index == 0 && !show_on_first_page {
        return None;
    }
    let number = page_index + 1;
    Some(match format {
        NumberFormat::Arabic => number.to_string(),
        NumberFormat::LowerRoman => to_lower_roman(number),
        NumberFormat::LowerAlpha => to_lower_alpha(number),
    })
}

const ROMAN_PAIRS: [(usize, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Subtractive roman numeral, lower case
pub fn to_lower_roman(mut n: usize) -> String {
    let mut out = String::new();
    for &(value, numeral) in ROMAN_PAIRS.iter() {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// Bijective base-26: 1 -> "a", 26 -> "z", 27 -> "aa", 703 -> "aaa"
pub fn to_lower_alpha(mut n: usize) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Status text for a page count indicator
pub fn page_indicator(current_page: usize, total_pages: usize) -> String {
    let total = total_pages.max(1);
    format!("Page {} of {}", (current_page + 1).min(total), total)
}
