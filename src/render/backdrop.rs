//! Page backdrops drawn behind the continuous content flow

use crate::geometry::{BorderStyle, PageSetup, RegionKind};
use crate::overlay::{Anchor, HorizontalPosition, VerticalPosition};
use crate::{Point, Rect};

/// Header or footer band of one page
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBand {
    pub kind: RegionKind,
    pub bounds: Rect,
    /// Y of the border line, on the edge facing the content
    pub border_y: f32,
}

/// Page number placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PageLabel {
    pub text: String,
    pub anchor: Anchor,
    pub point: Point,
}

/// One page-shaped background
#[derive(Debug, Clone, PartialEq)]
pub struct PageBackdrop {
    pub page_index: usize,
    pub bounds: Rect,
    pub effective_top: f32,
    pub effective_bottom: f32,
    pub header: Option<RegionBand>,
    pub footer: Option<RegionBand>,
    pub label: Option<PageLabel>,
}

impl PageBackdrop {
    /// Area between the effective margins and the side margins
    pub fn content_rect(&self, margin_left: f32, margin_right: f32) -> Rect {
        Rect::new(
            self.bounds.x + margin_left,
            self.bounds.y + self.effective_top,
            (self.bounds.width - margin_left - margin_right).max(0.0),
            (self.bounds.height - self.effective_top - self.effective_bottom).max(0.0),
        )
    }
}

/// The full stack of page backgrounds, in document (unzoomed) units
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Backdrop {
    pub pages: Vec<PageBackdrop>,
    pub zoom: f32,
    pub page_gap: f32,
    /// Outer padding above the content flow: first page's effective top
    pub content_padding_top: f32,
    /// Outer padding below the content flow: last page's effective bottom
    pub content_padding_bottom: f32,
    pub total_height: f32,
    /// Shared by every page's header band
    pub header_content: String,
    /// Shared by every page's footer band
    pub footer_content: String,
    pub border: BorderStyle,
}

impl Backdrop {
    /// Total height on screen after zoom
    pub fn scaled_height(&self) -> f32 {
        self.total_height * self.zoom
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page whose background (or the gap above it) covers document y
    pub fn page_at_y(&self, y: f32) -> Option<usize> {
        let first = self.pages.first()?;
        let stride = first.bounds.height + self.page_gap;
        if y < 0.0 || stride <= 0.0 {
            return None;
        }
        let index = (y / stride).floor() as usize;
        Some(index.min(self.pages.len() - 1))
    }

    /// Pages intersecting a viewport given in document units
    pub fn visible_pages(&self, viewport: Rect) -> impl Iterator<Item = &PageBackdrop> + '_ {
        self.pages
            .iter()
            .filter(move |page| page.bounds.intersects(&viewport))
    }

    /// Page whose paper contains the point; gaps belong to no page
    pub fn page_at_point(&self, point: Point) -> Option<usize> {
        self.pages
            .iter()
            .find(|page| page.bounds.contains_point(point))
            .map(|page| page.page_index)
    }
}

/// Builds the page stack from a page count and the current setup
#[derive(Debug, Default)]
pub struct PageBackdropRenderer;

impl PageBackdropRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, total_pages: usize, setup: &PageSetup) -> Backdrop {
        let total_pages = total_pages.max(1);
        let page = setup.page;
        let stride = setup.page_stride();
        let hf = &setup.header_footer;

        let pages = (0..total_pages)
            .map(|index| {
                let top = index as f32 * stride;
                let bounds = Rect::new(0.0, top, page.width, page.height);
                let effective_top = setup.effective_top(index);
                let effective_bottom = setup.effective_bottom(index);
                let band_x = setup.margins.left;
                let band_width = setup.content_width();

                let header = hf.show_header.then(|| RegionBand {
                    kind: RegionKind::Header,
                    bounds: Rect::new(band_x, top, band_width, effective_top),
                    border_y: top + effective_top,
                });
                let footer = hf.show_footer.then(|| RegionBand {
                    kind: RegionKind::Footer,
                    bounds: Rect::new(
                        band_x,
                        top + page.height - effective_bottom,
                        band_width,
                        effective_bottom,
                    ),
                    border_y: top + page.height - effective_bottom,
                });

                let label = setup.page_numbers.label_for(index).map(|text| {
                    let position = setup.page_numbers.position;
                    let x = match position.horizontal {
                        HorizontalPosition::Left => setup.margins.left,
                        HorizontalPosition::Center => page.width / 2.0,
                        HorizontalPosition::Right => page.width - setup.margins.right,
                    };
                    let y = match position.vertical {
                        VerticalPosition::Top => top + effective_top / 2.0,
                        VerticalPosition::Bottom => top + page.height - effective_bottom / 2.0,
                    };
                    PageLabel {
                        text,
                        anchor: position.anchor(),
                        point: Point { x, y },
                    }
                });

                PageBackdrop {
                    page_index: index,
                    bounds,
                    effective_top,
                    effective_bottom,
                    header,
                    footer,
                    label,
                }
            })
            .collect();

        let total_height = total_pages as f32 * page.height + (total_pages - 1) as f32 * setup.page_gap;

        Backdrop {
            pages,
            zoom: setup.zoom,
            page_gap: setup.page_gap,
            content_padding_top: setup.effective_top(0),
            content_padding_bottom: setup.effective_bottom(total_pages - 1),
            total_height,
            header_content: hf.header_content.clone(),
            footer_content: hf.footer_content.clone(),
            border: hf.border.clone(),
        }
    }
}
