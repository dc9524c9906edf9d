//! Render output: break decorations, page backdrops and diffs

mod backdrop;
mod breaks;
mod diff;
mod regions;

pub use backdrop::{Backdrop, PageBackdrop, PageBackdropRenderer, PageLabel, RegionBand};
pub use breaks::{BreakRenderer, Decoration, DecorationKind, DecorationSet, Media};
pub use diff::{BackdropDiff, BackdropPatch, DiffEngine};
pub use regions::{RegionEditors, RegionInstance, RegionSync};
