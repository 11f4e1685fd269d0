// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener capability trait and shared handles.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::event::{EventKind, SceneEvent};
use crate::pointer::PointerKind;

/// Receives events during dispatch.
///
/// Every method has a no-op default; implement the ones you care about.
/// For each dispatch level the engine first calls
/// [`on_pointer_event`](Self::on_pointer_event), which carries the pointer
/// kind so a listener can react to e.g. touch-only downs, and then
/// [`on_event`](Self::on_event). Either call is skipped once the event has
/// been aborted.
pub trait InputListener<K> {
    /// Pointer-kind-qualified delivery, called before [`on_event`](Self::on_event).
    fn on_pointer_event(
        &mut self,
        pointer: PointerKind,
        kind: EventKind,
        event: &mut SceneEvent<'_, K>,
    ) {
        let _ = (pointer, kind, event);
    }

    /// Generic delivery.
    fn on_event(&mut self, kind: EventKind, event: &mut SceneEvent<'_, K>) {
        let _ = (kind, event);
    }

    /// The pointer this listener is on was interrupted; drop any in-progress gesture.
    fn interrupt(&mut self) {}
}

/// Shared handle to a listener.
pub type ListenerRef<K> = Rc<RefCell<dyn InputListener<K>>>;

/// Listeners registered outside any scene, shared with whoever else registers them.
///
/// Snapshotted before every dispatch so registration changes made by a listener
/// take effect on the next event.
pub type GlobalListeners<K> = Rc<RefCell<Vec<ListenerRef<K>>>>;

/// Adapter that turns a closure into an [`InputListener`].
pub struct FnListener<F>(F);

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}

impl<K, F> InputListener<K> for FnListener<F>
where
    F: FnMut(EventKind, &mut SceneEvent<'_, K>),
{
    fn on_event(&mut self, kind: EventKind, event: &mut SceneEvent<'_, K>) {
        (self.0)(kind, event);
    }
}

/// Wrap a closure as a shared listener receiving every generic delivery.
pub fn listener_fn<K, F>(f: F) -> ListenerRef<K>
where
    K: 'static,
    F: FnMut(EventKind, &mut SceneEvent<'_, K>) + 'static,
{
    Rc::new(RefCell::new(FnListener(f)))
}
