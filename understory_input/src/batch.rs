// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event batching: a FIFO of captured raw events, drained by `flush`.
//!
//! ## Reentrancy
//!
//! Callbacks run by [`EventBatcher::flush`] may enqueue more events (or call
//! `flush` again). The queue length is re-read on every iteration, and nested
//! flushes return immediately, so everything appended during a flush runs
//! before the outermost call returns.
//!
//! ```
//! use std::rc::Rc;
//! use understory_input::{BatchKind, EventBatcher, EventContext};
//!
//! let batcher: Rc<EventBatcher<Vec<u32>>> = Rc::new(EventBatcher::new(true));
//! let inner = Rc::clone(&batcher);
//! let mut log = Vec::new();
//! batcher.push(EventContext::new(0), BatchKind::Pointer, move |log: &mut Vec<u32>, _| {
//!     log.push(1);
//!     inner.push(EventContext::new(1), BatchKind::Pointer, |log: &mut Vec<u32>, _| {
//!         log.push(2)
//!     });
//! });
//! batcher.flush(&mut log);
//! assert_eq!(log, [1, 2]);
//! assert!(batcher.is_empty());
//! ```

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::event::EventContext;

/// Category of a batched raw event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BatchKind {
    /// Unified pointer events.
    Pointer,
    /// Legacy mouse events.
    Mouse,
    /// Legacy touch events.
    Touch,
    /// Wheel events.
    Wheel,
    /// Keyboard events and focus loss.
    Keyboard,
    /// Events from the accessibility mirror.
    Alt,
}

/// Deferred handler for one batched event.
pub type BatchCallback<T> = Box<dyn FnOnce(&mut T, &mut EventContext)>;

/// One captured raw event awaiting processing.
pub struct BatchedEvent<T> {
    /// Raw event data handed to the callback.
    pub context: EventContext,
    /// Category of the event.
    pub kind: BatchKind,
    callback: BatchCallback<T>,
}

impl<T> fmt::Debug for BatchedEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchedEvent")
            .field("context", &self.context)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Clears the flushing flag on every exit path, unwinding included.
struct FlushGuard<'a>(&'a Cell<bool>);

impl<'a> FlushGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// FIFO of batched events for a handler target `T`.
///
/// Methods take `&self` so the batcher can be shared (typically through an
/// `Rc`) with the callbacks it runs.
pub struct EventBatcher<T> {
    queue: RefCell<VecDeque<BatchedEvent<T>>>,
    flushing: Cell<bool>,
    batching: Cell<bool>,
}

impl<T> fmt::Debug for EventBatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBatcher")
            .field("queued", &self.len())
            .field("flushing", &self.flushing.get())
            .field("batching", &self.batching.get())
            .finish()
    }
}

impl<T> EventBatcher<T> {
    /// Create a batcher. With `batching` false every enqueue flushes at once.
    pub fn new(batching: bool) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            flushing: Cell::new(false),
            batching: Cell::new(batching),
        }
    }

    /// Append an event without flushing.
    pub fn push<F>(&self, context: EventContext, kind: BatchKind, callback: F)
    where
        F: FnOnce(&mut T, &mut EventContext) + 'static,
    {
        self.queue.borrow_mut().push_back(BatchedEvent {
            context,
            kind,
            callback: Box::new(callback),
        });
    }

    /// Append an event, flushing into `target` right away if
    /// `trigger_immediate` is set or batching is disabled.
    pub fn enqueue<F>(
        &self,
        target: &mut T,
        context: EventContext,
        kind: BatchKind,
        callback: F,
        trigger_immediate: bool,
    ) where
        F: FnOnce(&mut T, &mut EventContext) + 'static,
    {
        self.push(context, kind, callback);
        if trigger_immediate || !self.batching.get() {
            self.flush(target);
        }
    }

    /// Run queued events in order until the queue is empty.
    ///
    /// A nested call while already flushing is a no-op. If a callback panics the
    /// remaining events stay queued.
    pub fn flush(&self, target: &mut T) {
        let Some(_guard) = FlushGuard::acquire(&self.flushing) else {
            return;
        };
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            log::trace!("running batched {:?} event", event.kind);
            let BatchedEvent {
                mut context,
                callback,
                ..
            } = event;
            callback(target, &mut context);
        }
    }

    /// Discard queued events without running them. Returns how many were dropped.
    ///
    /// Listeners that count pointers over them can desynchronize unless pointers
    /// were cancelled first; [`Input::clear_batched_events`](crate::Input::clear_batched_events)
    /// does that.
    pub fn clear(&self) -> usize {
        let mut queue = self.queue.borrow_mut();
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Returns true while a flush is running.
    pub fn is_flushing(&self) -> bool {
        self.flushing.get()
    }

    /// Returns true if events wait for an explicit flush.
    pub fn is_batching(&self) -> bool {
        self.batching.get()
    }

    /// Enable or disable batching.
    pub fn set_batching(&self, batching: bool) {
        self.batching.set(batching);
    }
}
