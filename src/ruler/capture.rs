//! Scoped pointer listeners for drag gestures

use std::rc::Rc;

/// Identifies one drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureId(pub u64);

/// The global input surface a gesture listens on while it is active.
///
/// `attach` installs pointer-move and pointer-up listeners for the gesture,
/// `detach` removes them.
pub trait InputSurface {
    fn attach(&self, gesture: GestureId);
    fn detach(&self, gesture: GestureId);
}

/// Listeners held for the lifetime of a gesture; detached on drop
pub struct ListenerGuard {
    surface: Rc<dyn InputSurface>,
    gesture: GestureId,
}

impl ListenerGuard {
    pub fn acquire(surface: Rc<dyn InputSurface>, gesture: GestureId) -> Self {
        surface.attach(gesture);
        Self { surface, gesture }
    }

    pub fn gesture(&self) -> GestureId {
        self.gesture
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.surface.detach(self.gesture);
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("gesture", &self.gesture)
            .finish()
    }
}

/// Surface for hosts that route pointer events themselves
#[derive(Debug, Default)]
pub struct NoopSurface;

impl InputSurface for NoopSurface {
    fn attach(&self, _gesture: GestureId) {}
    fn detach(&self, _gesture: GestureId) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Records which gestures currently hold listeners
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub active: RefCell<Vec<GestureId>>,
        pub attached_total: RefCell<usize>,
    }

    impl InputSurface for RecordingSurface {
        fn attach(&self, gesture: GestureId) {
            self.active.borrow_mut().push(gesture);
            *self.attached_total.borrow_mut() += 1;
        }

        fn detach(&self, gesture: GestureId) {
            self.active.borrow_mut().retain(|g| *g != gesture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSurface;
    use super::*;

    #[test]
    fn test_guard_detaches_on_drop() {
        let surface = Rc::new(RecordingSurface::default());
        {
            let guard = ListenerGuard::acquire(surface.clone(), GestureId(1));
            assert_eq!(guard.gesture(), GestureId(1));
            assert_eq!(surface.active.borrow().as_slice(), &[GestureId(1)]);
        }
        assert!(surface.active.borrow().is_empty());
        assert_eq!(*surface.attached_total.borrow(), 1);
    }
}
