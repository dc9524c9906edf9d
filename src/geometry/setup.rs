//! Persisted page setup and effective-margin arithmetic

use crate::error::SetupError;
use crate::geometry::margins::{GlobalMargins, HeaderFooterConfig, MarginOverride};
use crate::geometry::page::{sanitize, PageGeometry, DEFAULT_PAGE_GAP};
use crate::geometry::MIN_ZOOM;
use crate::overlay::PageNumberConfig;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every configurable input of pagination.
///
/// This is both the persisted configuration and the immutable snapshot a
/// reflow pass reads, so one pass never observes a half-applied edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSetup {
    pub page: PageGeometry,
    pub margins: GlobalMargins,
    pub overrides: FxHashMap<usize, MarginOverride>,
    pub header_footer: HeaderFooterConfig,
    pub page_numbers: PageNumberConfig,
    pub zoom: f32,
    pub page_gap: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            margins: GlobalMargins::default(),
            overrides: FxHashMap::default(),
            header_footer: HeaderFooterConfig::default(),
            page_numbers: PageNumberConfig::default(),
            zoom: 1.0,
            page_gap: DEFAULT_PAGE_GAP,
        }
    }
}

impl PageSetup {
    /// Parse and validate a setup from JSON.
    ///
    /// The top level must be an object; missing fields take their defaults
    /// and every length is clamped with [`PageSetup::sanitized`].
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        let value: Value = serde_json::from_str(json)?;
        let kind = match &value {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("a boolean"),
            Value::Number(_) => Some("a number"),
            Value::String(_) => Some("a string"),
            Value::Array(_) => Some("an array"),
        };
        if let Some(kind) = kind {
            return Err(SetupError::NotAnObject(kind));
        }

        let setup: PageSetup = serde_json::from_value(value)?;
        if !setup.page.is_valid() {
            return Err(SetupError::InvalidPageSize {
                width: setup.page.width,
                height: setup.page.height,
            });
        }
        Ok(setup.sanitized())
    }

    /// Clamp every length to a finite, non-negative value. Zoom is kept at
    /// or above [`MIN_ZOOM`].
    pub fn sanitized(mut self) -> Self {
        let defaults = GlobalMargins::default();
        let m = &mut self.margins;
        m.left = sanitize(m.left, defaults.left);
        m.right = sanitize(m.right, defaults.right);
        m.top = sanitize(m.top, defaults.top);
        m.bottom = sanitize(m.bottom, defaults.bottom);
        m.first_line_indent = sanitize(m.first_line_indent, 0.0);
        m.left_indent = sanitize(m.left_indent, 0.0);
        m.right_indent = sanitize(m.right_indent, 0.0);

        let (top, bottom) = (m.top, m.bottom);
        for entry in self.overrides.values_mut() {
            entry.top = entry.top.map(|v| sanitize(v, top));
            entry.bottom = entry.bottom.map(|v| sanitize(v, bottom));
        }

        let hf_defaults = HeaderFooterConfig::default();
        let hf = &mut self.header_footer;
        hf.header_margin = sanitize(hf.header_margin, hf_defaults.header_margin);
        hf.footer_margin = sanitize(hf.footer_margin, hf_defaults.footer_margin);

        self.zoom = sanitize(self.zoom, 1.0).max(MIN_ZOOM);
        self.page_gap = sanitize(self.page_gap, DEFAULT_PAGE_GAP);
        self
    }

    pub fn to_json(&self) -> Result<String, SetupError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Configured top margin of a page, before header reservation
    pub fn margin_top(&self, page: usize) -> f32 {
        self.overrides
            .get(&page)
            .and_then(|o| o.top)
            .unwrap_or(self.margins.top)
            .max(0.0)
    }

    /// Configured bottom margin of a page, before footer reservation
    pub fn margin_bottom(&self, page: usize) -> f32 {
        self.overrides
            .get(&page)
            .and_then(|o| o.bottom)
            .unwrap_or(self.margins.bottom)
            .max(0.0)
    }

    /// Top margin after reserving header space
    pub fn effective_top(&self, page: usize) -> f32 {
        self.margin_top(page)
            .max(self.header_footer.header_reserved())
    }

    /// Bottom margin after reserving footer space
    pub fn effective_bottom(&self, page: usize) -> f32 {
        self.margin_bottom(page)
            .max(self.header_footer.footer_reserved())
    }

    /// Height available to content on a page, never negative
    pub fn usable_height(&self, page: usize) -> f32 {
        (self.page.height - self.effective_top(page) - self.effective_bottom(page)).max(0.0)
    }

    /// Width between the left and right margins, never negative
    pub fn content_width(&self) -> f32 {
        (self.page.width - self.margins.left - self.margins.right).max(0.0)
    }

    /// Distance from one page's top edge to the next page's top edge
    pub fn page_stride(&self) -> f32 {
        self.page.height + self.page_gap
    }
}
