//! Host event sources with explicit listener registration.
//!
//! A [`Signal`] models an externally owned event stream such as the host
//! window's `resize` or `scroll` events. Listeners are registered with
//! [`Signal::add_listener`] and must be removed with
//! [`Signal::remove_listener`] when their owner is torn down; nothing is
//! removed implicitly.
//!
//! Cloning a `Signal` yields another handle to the same listener list.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Listener<T> = Rc<dyn Fn(&T)>;

/// Identifies one registered listener. Not `Clone`: a registration is removed
/// exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct ListenerId(u64);

struct SignalInner<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

pub struct Signal<T> {
    inner: Rc<RefCell<SignalInner<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Registers `listener`; it runs on every subsequent [`emit`](Signal::emit)
    /// until removed.
    pub fn add_listener(&self, listener: impl Fn(&T) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        ListenerId(id)
    }

    /// Deregisters a listener. Returns false if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id.0);
        inner.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Delivers `value` to every listener in registration order.
    ///
    /// Listeners may add or remove listeners while running. A listener
    /// removed during this emit is not called afterwards; one added during
    /// this emit first runs on the next emit.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<(u64, Listener<T>)> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(id, l)| (*id, Rc::clone(l)))
            .collect();
        for (id, listener) in snapshot {
            let live = self
                .inner
                .borrow()
                .listeners
                .iter()
                .any(|(lid, _)| *lid == id);
            if live {
                listener(value);
            }
        }
    }
}
