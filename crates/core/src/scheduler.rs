//! Cancellable per-frame callback driver.
//!
//! The host owns the display clock and calls [`AnimationScheduler::tick`]
//! once per refresh (from `requestAnimationFrame` in a browser, from a plain
//! loop in headless runs, from a test directly). Each tick invokes every live
//! task once, in start order.
//!
//! # Cancellation contract
//!
//! Once [`AnimationScheduler::cancel`] returns, the cancelled step is never
//! invoked again. This holds even when the cancel happens inside another
//! task's step during the same tick: the task is removed from the table, and
//! a step is only ever called after being looked up there.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

type StepFn = Box<dyn FnMut(FrameTime)>;

/// Timing information handed to every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// 1-based index of the tick that produced this call.
    pub frame: u64,
    /// Host timestamp in milliseconds.
    pub timestamp_ms: f64,
}

/// Opaque handle returned by [`AnimationScheduler::start`].
///
/// Not `Clone`: a task is cancelled exactly once. Dropping the token does
/// **not** cancel the task.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a task can only be stopped through its CancelToken"]
pub struct CancelToken {
    id: u64,
}

struct Task {
    id: u64,
    /// `None` while the step is running.
    step: Option<StepFn>,
}

struct SchedulerInner {
    next_id: u64,
    frame: u64,
    tasks: Vec<Task>,
}

impl SchedulerInner {
    fn task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

/// Cloning yields another handle to the same task table.
#[derive(Clone)]
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AnimationScheduler")
            .field("frame", &inner.frame)
            .field("active", &inner.tasks.len())
            .finish()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                next_id: 0,
                frame: 0,
                tasks: Vec::new(),
            })),
        }
    }

    /// Schedules `step` to run once per tick, starting with the next tick.
    pub fn start(&self, step: impl FnMut(FrameTime) + 'static) -> CancelToken {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.tasks.push(Task {
            id,
            step: Some(Box::new(step)),
        });
        debug!(task = id, active = inner.tasks.len(), "animation task started");
        CancelToken { id }
    }

    /// Stops a task. Returns false if it had already been removed.
    pub fn cancel(&self, token: CancelToken) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != token.id);
        let removed = inner.tasks.len() != before;
        debug!(task = token.id, removed, "animation task cancelled");
        removed
    }

    pub fn is_active(&self, token: &CancelToken) -> bool {
        self.inner.borrow().tasks.iter().any(|t| t.id == token.id)
    }

    pub fn active_count(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Number of ticks delivered so far.
    pub fn frame(&self) -> u64 {
        self.inner.borrow().frame
    }

    /// Delivers one display refresh. Returns how many steps ran.
    ///
    /// Tasks started during this tick first run on the next one. A step that
    /// ticks the scheduler re-entrantly does not run itself recursively.
    pub fn tick(&self, timestamp_ms: f64) -> usize {
        let (frame, ids) = {
            let mut inner = self.inner.borrow_mut();
            inner.frame += 1;
            let ids: Vec<u64> = inner.tasks.iter().map(|t| t.id).collect();
            (inner.frame, ids)
        };
        let time = FrameTime {
            frame,
            timestamp_ms,
        };

        let mut ran = 0;
        for id in ids {
            let step = self
                .inner
                .borrow_mut()
                .task_mut(id)
                .and_then(|t| t.step.take());
            let Some(mut step) = step else {
                continue;
            };
            step(time);
            ran += 1;
            // A task cancelled while running is gone from the table; its
            // closure is dropped here.
            if let Some(task) = self.inner.borrow_mut().task_mut(id) {
                task.step = Some(step);
            }
        }
        trace!(frame, ran, "tick");
        ran
    }
}
