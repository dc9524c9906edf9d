//! Break decorations: filler and spacer inserts

use crate::reflow::{BreakMarker, DocPosition};
use serde::Serialize;

/// Output medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Media {
    Screen,
    Print,
}

/// Kind of synthetic insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DecorationKind {
    /// Closes out the current page. Hidden in print, where the medium
    /// paginates on its own.
    Filler,
    /// Opens the next page with its top margin. Kept in print.
    Spacer,
}

/// A non-editable widget inserted into the view at a document position.
///
/// Decorations are presentation only: they are never part of the document
/// model and never take the caret or a selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decoration {
    pub position: DocPosition,
    pub kind: DecorationKind,
    pub height: f32,
    /// Page the decoration belongs to: the page being closed for a filler,
    /// the page being opened for a spacer
    pub page_index: usize,
}

impl Decoration {
    pub fn is_visible_in(&self, media: Media) -> bool {
        match (self.kind, media) {
            (DecorationKind::Filler, Media::Print) => false,
            _ => true,
        }
    }

    /// Decorations never accept text input
    pub fn is_editable(&self) -> bool {
        false
    }

    /// Decorations never take the caret or a selection
    pub fn is_selectable(&self) -> bool {
        false
    }

    /// Stable key so a host can reuse widget elements across passes
    pub fn key(&self) -> String {
        let kind = match self.kind {
            DecorationKind::Filler => "filler",
            DecorationKind::Spacer => "spacer",
        };
        format!("page-break-{}-{}", kind, self.page_index)
    }
}

/// Maps break markers to decorations
#[derive(Debug, Default)]
pub struct BreakRenderer;

impl BreakRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Build the full decoration set for a break list. Each marker yields a
    /// filler followed by a spacer at the same position.
    pub fn render(&self, markers: &[BreakMarker]) -> Vec<Decoration> {
        let mut decorations = Vec::with_capacity(markers.len() * 2);
        for (i, marker) in markers.iter().enumerate() {
            decorations.push(Decoration {
                position: marker.position,
                kind: DecorationKind::Filler,
                height: marker.filler_height.max(0.0),
                page_index: i,
            });
            decorations.push(Decoration {
                position: marker.position,
                kind: DecorationKind::Spacer,
                height: marker.spacer_height.max(0.0),
                page_index: i + 1,
            });
        }
        decorations
    }
}

/// The committed decoration set, replaced on every pass
#[derive(Debug, Clone, Default)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything; returns true when the set changed
    pub fn replace(&mut self, decorations: Vec<Decoration>) -> bool {
        let changed = decorations != self.decorations;
        self.decorations = decorations;
        changed
    }

    pub fn all(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn visible(&self, media: Media) -> impl Iterator<Item = &Decoration> + '_ {
        self.decorations.iter().filter(move |d| d.is_visible_in(media))
    }

    /// Decorations anchored at a position
    pub fn at(&self, position: DocPosition) -> impl Iterator<Item = &Decoration> + '_ {
        self.decorations.iter().filter(move |d| d.position == position)
    }

    /// Total synthetic height for a medium
    pub fn total_height(&self, media: Media) -> f32 {
        self.visible(media).map(|d| d.height).sum()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<BreakMarker> {
        vec![
            BreakMarker {
                position: DocPosition(7),
                filler_height: 180.0,
                spacer_height: 96.0,
            },
            BreakMarker {
                position: DocPosition(19),
                filler_height: 140.0,
                spacer_height: 120.0,
            },
        ]
    }

    #[test]
    fn test_pair_per_marker() {
        let decorations = BreakRenderer::new().render(&markers());
        assert_eq!(decorations.len(), 4);
        assert_eq!(decorations[0].kind, DecorationKind::Filler);
        assert_eq!(decorations[1].kind, DecorationKind::Spacer);
        assert_eq!(decorations[1].position, DocPosition(7));
        assert_eq!(decorations[3].height, 120.0);
        assert_eq!(decorations[3].page_index, 2);
        assert!(decorations.iter().all(|d| !d.is_editable() && !d.is_selectable()));
    }

    #[test]
    fn test_print_hides_filler() {
        let mut set = DecorationSet::new();
        set.replace(BreakRenderer::new().render(&markers()));

        assert_eq!(set.total_height(Media::Screen), 180.0 + 96.0 + 140.0 + 120.0);
        assert_eq!(set.total_height(Media::Print), 96.0 + 120.0);
        assert_eq!(set.visible(Media::Print).count(), 2);
    }

    #[test]
    fn test_replace_is_total() {
        let mut set = DecorationSet::new();
        let renderer = BreakRenderer::new();
        assert!(set.replace(renderer.render(&markers())));
        assert!(!set.replace(renderer.render(&markers())));

        assert!(set.replace(renderer.render(&[])));
        assert!(set.is_empty());
    }

    #[test]
    fn test_keys() {
        let decorations = BreakRenderer::new().render(&markers());
        assert_eq!(decorations[0].key(), "page-break-filler-0");
        assert_eq!(decorations[1].key(), "page-break-spacer-1");
    }

    #[test]
    fn test_at_position() {
        let mut set = DecorationSet::new();
        set.replace(BreakRenderer::new().render(&markers()));
        assert_eq!(set.at(DocPosition(19)).count(), 2);
        assert_eq!(set.at(DocPosition(8)).count(), 0);
    }
}
