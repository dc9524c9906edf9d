//! Frame-coalesced recompute scheduling
//!
//! A recompute request never runs inline. It reserves the next frame and
//! returns a [`FrameId`]; a request that arrives before that frame fires
//! invalidates the earlier id, so a burst of changes costs one measurement
//! pass. The host fires frames by id and only the latest id is honored.

use smallvec::SmallVec;

/// Interval of the polling backstop, in milliseconds
pub const POLL_INTERVAL_MS: u64 = 1000;

/// Why a recompute was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecomputeCause {
    ContentChanged,
    MarginChanged,
    HeaderFooterChanged,
    PageSizeChanged,
    ZoomChanged,
    PageNumbersChanged,
    /// Periodic re-check for height changes nobody reported
    PollingCheck,
}

/// Deduplicated set of causes accumulated between frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CauseSet {
    causes: SmallVec<[RecomputeCause; 4]>,
}

impl CauseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cause: RecomputeCause) {
        if !self.causes.contains(&cause) {
            self.causes.push(cause);
        }
    }

    pub fn extend(&mut self, other: CauseSet) {
        for cause in other.causes {
            self.insert(cause);
        }
    }

    pub fn contains(&self, cause: RecomputeCause) -> bool {
        self.causes.contains(&cause)
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.causes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = RecomputeCause> + '_ {
        self.causes.iter().copied()
    }

    /// Move all causes out, leaving the set empty
    pub fn take(&mut self) -> CauseSet {
        std::mem::take(self)
    }

    /// Whether any cause can move a page break. Page-number changes only
    /// affect labels, not vertical layout.
    pub fn affects_breaks(&self) -> bool {
        self.causes
            .iter()
            .any(|c| !matches!(c, RecomputeCause::PageNumbersChanged))
    }
}

impl FromIterator<RecomputeCause> for CauseSet {
    fn from_iter<T: IntoIterator<Item = RecomputeCause>>(iter: T) -> Self {
        let mut set = CauseSet::new();
        for cause in iter {
            set.insert(cause);
        }
        set
    }
}

/// Handle of a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

#[derive(Debug)]
struct PendingFrame {
    id: FrameId,
    causes: CauseSet,
}

/// Debounced scheduler: schedule, cancel, fire, flush
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<PendingFrame>,
    destroyed: bool,
    coalesced: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a recompute on the next frame.
    ///
    /// Any frame still pending is cancelled and its causes carried over to
    /// the new one. Returns `None` once the scheduler is destroyed.
    pub fn request(&mut self, cause: RecomputeCause) -> Option<FrameId> {
        self.request_all(std::iter::once(cause).collect())
    }

    /// Request a recompute for several causes at once
    pub fn request_all(&mut self, causes: CauseSet) -> Option<FrameId> {
        if self.destroyed || causes.is_empty() {
            return None;
        }

        let mut merged = causes;
        if let Some(previous) = self.pending.take() {
            log::trace!("cancelling frame {:?} in favor of a newer request", previous.id);
            merged.extend(previous.causes);
            self.coalesced += 1;
        }

        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.pending = Some(PendingFrame { id, causes: merged });
        Some(id)
    }

    /// Cancel a frame. Returns false if `id` is not the pending frame.
    pub fn cancel(&mut self, id: FrameId) -> bool {
        match &self.pending {
            Some(frame) if frame.id == id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Called when the host's frame callback for `id` fires.
    ///
    /// Stale ids and frames firing after [`destroy`](Self::destroy) yield
    /// `None` and leave the scheduler untouched.
    pub fn fire(&mut self, id: FrameId) -> Option<CauseSet> {
        if self.destroyed {
            log::trace!("frame {:?} fired after teardown, ignored", id);
            return None;
        }
        match &self.pending {
            Some(frame) if frame.id == id => self.pending.take().map(|f| f.causes),
            _ => {
                log::trace!("stale frame {:?} ignored", id);
                None
            }
        }
    }

    /// Fire whatever is pending right now
    pub fn flush(&mut self) -> Option<CauseSet> {
        let id = self.pending_id()?;
        self.fire(id)
    }

    pub fn pending_id(&self) -> Option<FrameId> {
        self.pending.as_ref().map(|f| f.id)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of requests that replaced a still-pending frame
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }

    /// Mark the host view as gone. Pending work is dropped and later
    /// requests are refused.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.pending = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Periodic backstop for height changes that are never reported
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl Default for PollTimer {
    fn default() -> Self {
        Self::new(POLL_INTERVAL_MS)
    }
}

impl PollTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// True when at least one interval has elapsed since the last tick.
    /// The first call only arms the timer.
    pub fn due(&mut self, now_ms: u64) -> bool {
        match self.last_ms {
            None => {
                self.last_ms = Some(now_ms);
                false
            }
            Some(last) if now_ms.saturating_sub(last) >= self.interval_ms => {
                self.last_ms = Some(now_ms);
                true
            }
            Some(_) => false,
        }
    }
}

/// Current wall-clock time in milliseconds
pub fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
