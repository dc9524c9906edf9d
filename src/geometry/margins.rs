//! Margins, per-page overrides and header/footer configuration

use crate::geometry::page::{inches_to_px, DPI};
use serde::{Deserialize, Serialize};

/// Document-wide margins and paragraph indents, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalMargins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// Extra indent of a paragraph's first line, relative to `left_indent`
    pub first_line_indent: f32,
    /// Indent of paragraph body from the left margin
    pub left_indent: f32,
    /// Indent of paragraph body from the right margin
    pub right_indent: f32,
}

impl Default for GlobalMargins {
    fn default() -> Self {
        Self {
            left: DPI,
            right: DPI,
            top: DPI,
            bottom: DPI,
            first_line_indent: 0.0,
            left_indent: 0.0,
            right_indent: 0.0,
        }
    }
}

impl GlobalMargins {
    /// Same margin on all four sides, no indents
    pub fn uniform(margin: f32) -> Self {
        Self {
            left: margin,
            right: margin,
            top: margin,
            bottom: margin,
            ..Self::default()
        }
    }
}

/// Partial top/bottom override for a single page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginOverride {
    pub top: Option<f32>,
    pub bottom: Option<f32>,
}

/// Line style of the header/footer border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderLine {
    None,
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Border drawn between a header/footer band and the content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderStyle {
    pub line: BorderLine,
    pub color: String,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            line: BorderLine::Solid,
            color: "#cccccc".to_string(),
        }
    }
}

/// Header or footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Header,
    Footer,
}

/// Header/footer settings shared by every page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFooterConfig {
    pub show_header: bool,
    pub show_footer: bool,
    /// Space reserved for the header, in inches
    pub header_margin: f32,
    /// Space reserved for the footer, in inches
    pub footer_margin: f32,
    pub header_content: String,
    pub footer_content: String,
    pub border: BorderStyle,
}

impl Default for HeaderFooterConfig {
    fn default() -> Self {
        Self {
            show_header: false,
            show_footer: false,
            header_margin: 0.5,
            footer_margin: 0.5,
            header_content: String::new(),
            footer_content: String::new(),
            border: BorderStyle::default(),
        }
    }
}

impl HeaderFooterConfig {
    /// Pixels reserved at the top of each page, zero when the header is hidden
    pub fn header_reserved(&self) -> f32 {
        if self.show_header {
            inches_to_px(self.header_margin).max(0.0)
        } else {
            0.0
        }
    }

    /// Pixels reserved at the bottom of each page, zero when the footer is hidden
    pub fn footer_reserved(&self) -> f32 {
        if self.show_footer {
            inches_to_px(self.footer_margin).max(0.0)
        } else {
            0.0
        }
    }

    pub fn is_shown(&self, kind: RegionKind) -> bool {
        match kind {
            RegionKind::Header => self.show_header,
            RegionKind::Footer => self.show_footer,
        }
    }

    pub fn content(&self, kind: RegionKind) -> &str {
        match kind {
            RegionKind::Header => &self.header_content,
            RegionKind::Footer => &self.footer_content,
        }
    }
}
