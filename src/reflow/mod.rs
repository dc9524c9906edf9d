//! Reflow: break decisions and recompute scheduling

mod engine;
mod marker;
mod schedule;

pub use engine::{
    BlockMetrics, BlockNode, BlockSource, HeightResolver, MeasuredBlock, MeasuredBlocks,
    ReflowEngine, ReflowOutcome,
};
pub use marker::{BreakList, BreakMarker, DocPosition, PageExtent};
pub use schedule::{
    now_ms, CauseSet, FrameId, FrameScheduler, PollTimer, RecomputeCause, POLL_INTERVAL_MS,
};
