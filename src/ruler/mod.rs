//! Margin rulers
//!
//! Horizontal and vertical drag surfaces that write margins and indents
//! straight into the [`PageGeometryStore`]. A gesture goes
//! `Idle -> Dragging -> Idle`; every pointer move commits a clamped value,
//! so release has nothing left to apply.

mod capture;

pub use capture::{GestureId, InputSurface, ListenerGuard, NoopSurface};

use crate::geometry::{PageGeometryStore, PageSetup};
use std::rc::Rc;

/// Smallest content width or height a drag may leave
pub const MIN_CONTENT: f32 = 100.0;

/// Distance in screen pixels within which a handle is hit
pub const HANDLE_TOLERANCE: f32 = 6.0;

/// Ruler orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulerAxis {
    Horizontal,
    Vertical,
}

/// Handle being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    TopMargin,
    BottomMargin,
    LeftMargin,
    RightMargin,
    FirstLineIndent,
    LeftIndent,
    RightIndent,
}

impl DragKind {
    pub fn axis(&self) -> RulerAxis {
        match self {
            DragKind::TopMargin | DragKind::BottomMargin => RulerAxis::Vertical,
            _ => RulerAxis::Horizontal,
        }
    }
}

/// An active drag gesture
#[derive(Debug)]
pub struct DragSession {
    pub kind: DragKind,
    /// Page whose override a vertical handle edits
    pub page_index: Option<usize>,
    /// Pointer coordinate at press, screen pixels
    pub start: f32,
    /// Last committed value
    pub value: Option<f32>,
    _listeners: ListenerGuard,
}

#[derive(Debug)]
pub enum RulerState {
    Idle,
    Dragging(DragSession),
}

/// One ruler instance.
///
/// Pointer coordinates are screen pixels along the ruler axis, measured from
/// the left edge of the page (horizontal) or from the top of the first page
/// (vertical). They are divided by the current zoom before use.
pub struct MarginRuler {
    axis: RulerAxis,
    state: RulerState,
    surface: Rc<dyn InputSurface>,
    next_gesture: u64,
}

impl MarginRuler {
    pub fn new(axis: RulerAxis, surface: Rc<dyn InputSurface>) -> Self {
        Self {
            axis,
            state: RulerState::Idle,
            surface,
            next_gesture: 0,
        }
    }

    pub fn horizontal(surface: Rc<dyn InputSurface>) -> Self {
        Self::new(RulerAxis::Horizontal, surface)
    }

    pub fn vertical(surface: Rc<dyn InputSurface>) -> Self {
        Self::new(RulerAxis::Vertical, surface)
    }

    pub fn axis(&self) -> RulerAxis {
        self.axis
    }

    pub fn state(&self) -> &RulerState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, RulerState::Dragging(_))
    }

    /// Margin handle under the pointer, if any
    pub fn hit_test(&self, setup: &PageSetup, pointer: f32, page_index: usize) -> Option<DragKind> {
        let zoom = setup.zoom;
        let candidates: [(DragKind, f32); 2] = match self.axis {
            RulerAxis::Horizontal => [
                (DragKind::LeftMargin, setup.margins.left),
                (DragKind::RightMargin, setup.page.width - setup.margins.right),
            ],
            RulerAxis::Vertical => {
                let top = page_index as f32 * setup.page_stride();
                [
                    (DragKind::TopMargin, top + setup.margin_top(page_index)),
                    (
                        DragKind::BottomMargin,
                        top + setup.page.height - setup.margin_bottom(page_index),
                    ),
                ]
            }
        };
        nearest_handle(&candidates, pointer, zoom)
    }

    /// Indent handle under the pointer, horizontal rulers only
    pub fn hit_test_indent(&self, setup: &PageSetup, pointer: f32) -> Option<DragKind> {
        if self.axis != RulerAxis::Horizontal {
            return None;
        }
        let m = &setup.margins;
        let candidates = [
            (DragKind::FirstLineIndent, m.left + m.left_indent + m.first_line_indent),
            (DragKind::LeftIndent, m.left + m.left_indent),
            (DragKind::RightIndent, setup.page.width - m.right - m.right_indent),
        ];
        nearest_handle(&candidates, pointer, setup.zoom)
    }

    /// Start a gesture. Returns false if `kind` does not belong to this
    /// ruler. Pressing during a drag ends the previous gesture first.
    pub fn press(&mut self, kind: DragKind, page_index: usize, pointer: f32) -> bool {
        if kind.axis() != self.axis || !pointer.is_finite() {
            return false;
        }
        self.release();

        self.next_gesture += 1;
        let listeners = ListenerGuard::acquire(self.surface.clone(), GestureId(self.next_gesture));
        let page_index = (self.axis == RulerAxis::Vertical).then_some(page_index);

        self.state = RulerState::Dragging(DragSession {
            kind,
            page_index,
            start: pointer,
            value: None,
            _listeners: listeners,
        });
        true
    }

    /// Pointer moved during a gesture: clamp and commit the new value.
    ///
    /// Returns the committed value, or `None` when idle or the pointer
    /// coordinate is not finite.
    pub fn pointer_move(&mut self, store: &mut PageGeometryStore, pointer: f32) -> Option<f32> {
        let RulerState::Dragging(session) = &mut self.state else {
            return None;
        };
        if !pointer.is_finite() {
            return None;
        }

        let setup = store.setup();
        let zoom = setup.zoom.max(f32::EPSILON);
        let page = session.page_index.unwrap_or(0);
        let width = setup.page.width;
        let height = setup.page.height;
        let m = setup.margins;
        let content_width = setup.content_width();

        let mut offset = pointer / zoom;
        if self.axis == RulerAxis::Vertical {
            offset -= page as f32 * setup.page_stride();
        }

        let (raw, max) = match session.kind {
            DragKind::TopMargin => (offset, height - setup.margin_bottom(page) - MIN_CONTENT),
            DragKind::BottomMargin => (height - offset, height - setup.margin_top(page) - MIN_CONTENT),
            DragKind::LeftMargin => (offset, width - m.right - MIN_CONTENT),
            DragKind::RightMargin => (width - offset, width - m.left - MIN_CONTENT),
            DragKind::FirstLineIndent => (
                offset - m.left - m.left_indent,
                content_width - m.left_indent - m.right_indent - MIN_CONTENT,
            ),
            DragKind::LeftIndent => (offset - m.left, content_width - m.right_indent - MIN_CONTENT),
            DragKind::RightIndent => (
                width - m.right - offset,
                content_width - m.left_indent - MIN_CONTENT,
            ),
        };
        let value = raw.clamp(0.0, max.max(0.0));

        match session.kind {
            DragKind::TopMargin => store.set_page_margin_top(page, value),
            DragKind::BottomMargin => store.set_page_margin_bottom(page, value),
            DragKind::LeftMargin => store.set_margin_left(value),
            DragKind::RightMargin => store.set_margin_right(value),
            DragKind::FirstLineIndent => store.set_first_line_indent(value),
            DragKind::LeftIndent => store.set_left_indent(value),
            DragKind::RightIndent => store.set_right_indent(value),
        }
        session.value = Some(value);
        Some(value)
    }

    /// End the gesture and release its listeners. Returns the handle that
    /// was being dragged.
    pub fn release(&mut self) -> Option<DragKind> {
        match std::mem::replace(&mut self.state, RulerState::Idle) {
            RulerState::Dragging(session) => Some(session.kind),
            RulerState::Idle => None,
        }
    }
}

impl std::fmt::Debug for MarginRuler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarginRuler")
            .field("axis", &self.axis)
            .field("state", &self.state)
            .finish()
    }
}

fn nearest_handle(candidates: &[(DragKind, f32)], pointer: f32, zoom: f32) -> Option<DragKind> {
    candidates
        .iter()
        .map(|&(kind, at)| (kind, (at * zoom - pointer).abs()))
        .filter(|&(_, distance)| distance <= HANDLE_TOLERANCE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(kind, _)| kind)
}
