//! Viewport dimensions and change tracking.

use std::cell::Cell;
use std::rc::Rc;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::signal::{ListenerId, Signal};

/// Pixel dimensions of the rendering surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero. Nothing is drawn into such a viewport.
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width and height as a real-valued vector, the wrap bounds of particles.
    pub fn extent(self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }
}

/// Holds the latest viewport reading and notifies listeners when it changes.
///
/// Readings equal to the current one are swallowed. Cloning yields another
/// handle to the same tracker.
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    current: Rc<Cell<Viewport>>,
    changes: Signal<Viewport>,
}

impl ViewportTracker {
    pub fn new(initial: Viewport) -> Self {
        Self {
            current: Rc::new(Cell::new(initial)),
            changes: Signal::new(),
        }
    }

    pub fn current(&self) -> Viewport {
        self.current.get()
    }

    /// Feeds a new reading from the host's resize signal.
    ///
    /// Returns true and notifies listeners if the reading differs from the
    /// previous one.
    pub fn observe(&self, reading: Viewport) -> bool {
        let previous = self.current.replace(reading);
        if previous == reading {
            return false;
        }
        debug!(
            from_w = previous.width,
            from_h = previous.height,
            to_w = reading.width,
            to_h = reading.height,
            "viewport changed"
        );
        self.changes.emit(&reading);
        true
    }

    /// Registers a listener for viewport changes.
    pub fn on_change(&self, listener: impl Fn(&Viewport) + 'static) -> ListenerId {
        self.changes.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.changes.remove_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.changes.listener_count()
    }
}
