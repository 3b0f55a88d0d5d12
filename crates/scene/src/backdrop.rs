//! Mount/unmount lifecycle of the full backdrop.
//!
//! Mounting wires three things and unmounting undoes exactly those three:
//!
//! 1. a resize listener on the host, feeding a [`ViewportTracker`] whose
//!    changes resize the particle field;
//! 2. a scroll listener on the host, feeding the blob transformer;
//! 3. a scheduler task that steps the field and samples the blobs.
//!
//! All state is per instance. Two backdrops mounted on the same host and
//! scheduler are fully independent, and unmounting one leaves the other
//! running.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use backdrop_blobs::{BlobTransform, ScrollBlobTransformer};
use backdrop_core::{
    AnimationScheduler, CancelToken, ListenerId, Surface, Viewport, ViewportTracker, Xorshift64,
};
use backdrop_particles::ParticleField;
use tracing::{debug, warn};

use crate::config::BackdropConfig;
use crate::host::HostWindow;

/// A mounted backdrop.
///
/// Dropping it detaches it exactly like [`unmount`](Backdrop::unmount) does,
/// except that the surface is dropped too.
#[must_use = "a backdrop dropped right away is unmounted immediately"]
pub struct Backdrop<S: Surface + 'static> {
    host: HostWindow,
    scheduler: AnimationScheduler,
    tracker: ViewportTracker,
    field: Rc<RefCell<ParticleField<S>>>,
    blobs: Rc<RefCell<ScrollBlobTransformer>>,
    transforms: Rc<RefCell<Vec<BlobTransform>>>,
    task: Option<CancelToken>,
    resize_listener: Option<ListenerId>,
    scroll_listener: Option<ListenerId>,
    viewport_listener: Option<ListenerId>,
}

impl<S: Surface + 'static> Backdrop<S> {
    /// Builds the field and the blobs for the host's current size and starts
    /// animating on the next scheduler tick.
    ///
    /// A `None` surface yields an inert field: blobs still follow the scroll
    /// offset, but nothing is drawn.
    pub fn mount(
        host: &HostWindow,
        scheduler: &AnimationScheduler,
        surface: Option<S>,
        config: BackdropConfig,
        seed: u64,
    ) -> Self {
        let viewport = host.size();
        let tracker = ViewportTracker::new(viewport);
        let field = Rc::new(RefCell::new(ParticleField::new(
            viewport,
            surface,
            config.particles,
            config.palette,
            Xorshift64::new(seed),
        )));

        let mut transformer = ScrollBlobTransformer::new(config.blobs);
        let offset = host.scroll_offset();
        if offset != 0.0 {
            // Mounted on an already scrolled page: start at rest there.
            transformer = transformer.settled_at(offset);
        }
        let transforms = Rc::new(RefCell::new(transformer.sample(0.0)));
        let blobs = Rc::new(RefCell::new(transformer));

        let viewport_listener = {
            let field = Rc::clone(&field);
            tracker.on_change(move |v: &Viewport| field.borrow_mut().resize(*v))
        };
        let resize_listener = {
            let tracker = tracker.clone();
            host.on_resize(move |v| {
                tracker.observe(*v);
            })
        };
        let scroll_listener = {
            let blobs = Rc::clone(&blobs);
            host.on_scroll(move |e| blobs.borrow_mut().on_scroll(e.offset, e.timestamp_ms))
        };
        let task = {
            let (field, blobs, transforms) =
                (Rc::clone(&field), Rc::clone(&blobs), Rc::clone(&transforms));
            scheduler.start(move |time| {
                field.borrow_mut().step();
                *transforms.borrow_mut() = blobs.borrow().sample(time.timestamp_ms);
            })
        };

        debug!(
            width = viewport.width,
            height = viewport.height,
            seed,
            "backdrop mounted"
        );
        Self {
            host: host.clone(),
            scheduler: scheduler.clone(),
            tracker,
            field,
            blobs,
            transforms,
            task: Some(task),
            resize_listener: Some(resize_listener),
            scroll_listener: Some(scroll_listener),
            viewport_listener: Some(viewport_listener),
        }
    }

    /// Cancels the task and removes every listener this instance registered.
    /// Idempotent.
    fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            self.scheduler.cancel(task);
        }
        if let Some(id) = self.resize_listener.take() {
            self.host.remove_resize_listener(id);
        }
        if let Some(id) = self.scroll_listener.take() {
            self.host.remove_scroll_listener(id);
        }
        if let Some(id) = self.viewport_listener.take() {
            self.tracker.remove_listener(id);
        }
    }

    /// Stops the animation, detaches both host listeners and hands back the
    /// surface.
    ///
    /// Must not be called from inside a scheduler step; the field is
    /// borrowed for the duration of a step.
    pub fn unmount(mut self) -> Option<S> {
        self.detach();
        let field = Rc::clone(&self.field);
        drop(self);

        match Rc::try_unwrap(field) {
            Ok(field) => {
                let surface = field.into_inner().teardown();
                debug!("backdrop unmounted");
                surface
            }
            Err(_) => {
                warn!("particle field still shared at unmount; surface not returned");
                None
            }
        }
    }

    /// Blob translations as of the last completed step.
    pub fn blob_transforms(&self) -> Vec<BlobTransform> {
        self.transforms.borrow().clone()
    }

    pub fn field(&self) -> Ref<'_, ParticleField<S>> {
        self.field.borrow()
    }

    pub fn blobs(&self) -> Ref<'_, ScrollBlobTransformer> {
        self.blobs.borrow()
    }

    pub fn viewport(&self) -> Viewport {
        self.tracker.current()
    }

    /// True until unmounted.
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| self.scheduler.is_active(task))
    }
}

impl<S: Surface + 'static> Drop for Backdrop<S> {
    fn drop(&mut self) {
        if self.task.is_some() {
            debug!("backdrop dropped while mounted; detaching");
        }
        self.detach();
    }
}
