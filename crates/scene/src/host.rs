//! The host window: source of viewport and scroll signals.
//!
//! In a browser this mirrors `window` (`innerWidth`/`innerHeight`, `scrollY`
//! and the `resize`/`scroll` events). Headless runs and tests drive it by
//! hand.

use std::cell::Cell;
use std::rc::Rc;

use backdrop_core::{ListenerId, Signal, Viewport};

/// One scroll notification: the page offset and when it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub offset: f64,
    pub timestamp_ms: f64,
}

/// Cloning yields another handle to the same window.
#[derive(Debug, Clone)]
pub struct HostWindow {
    size: Rc<Cell<Viewport>>,
    scroll_offset: Rc<Cell<f64>>,
    resized: Signal<Viewport>,
    scrolled: Signal<ScrollEvent>,
}

impl HostWindow {
    pub fn new(size: Viewport) -> Self {
        Self {
            size: Rc::new(Cell::new(size)),
            scroll_offset: Rc::new(Cell::new(0.0)),
            resized: Signal::new(),
            scrolled: Signal::new(),
        }
    }

    pub fn size(&self) -> Viewport {
        self.size.get()
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset.get()
    }

    /// Records a new window size and fires the resize signal.
    ///
    /// Like the browser event, this fires even when the size is unchanged.
    pub fn resize_to(&self, size: Viewport) {
        self.size.set(size);
        self.resized.emit(&size);
    }

    /// Records a new scroll offset and fires the scroll signal.
    pub fn scroll_to(&self, offset: f64, timestamp_ms: f64) {
        self.scroll_offset.set(offset);
        self.scrolled.emit(&ScrollEvent {
            offset,
            timestamp_ms,
        });
    }

    pub fn on_resize(&self, listener: impl Fn(&Viewport) + 'static) -> ListenerId {
        self.resized.add_listener(listener)
    }

    pub fn on_scroll(&self, listener: impl Fn(&ScrollEvent) + 'static) -> ListenerId {
        self.scrolled.add_listener(listener)
    }

    pub fn remove_resize_listener(&self, id: ListenerId) -> bool {
        self.resized.remove_listener(id)
    }

    pub fn remove_scroll_listener(&self, id: ListenerId) -> bool {
        self.scrolled.remove_listener(id)
    }

    pub fn resize_listener_count(&self) -> usize {
        self.resized.listener_count()
    }

    pub fn scroll_listener_count(&self) -> usize {
        self.scrolled.listener_count()
    }
}
