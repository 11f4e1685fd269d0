// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch: deliver one event along a path.
//!
//! ## Order
//!
//! 1. Pointer-scoped listeners, in insertion order.
//! 2. Scene targets: leaf→root when bubbling, otherwise the leaf only.
//!    Disposed nodes are skipped, and so are nodes past the input-enabled
//!    boundary unless `fire_on_disabled` is set.
//! 3. Display listeners.
//! 4. Global listeners, from a snapshot taken at this point.
//!
//! Each stage only runs if no earlier listener marked the event handled or
//! aborted. Inside a stage, handled lets the remaining listeners of the same
//! level run; aborted skips them.

use alloc::vec::Vec;
use core::fmt;

use crate::diff::{BranchDiff, Transition};
use crate::event::{EventContext, EventKind, SceneEvent};
use crate::listener::{GlobalListeners, ListenerRef};
use crate::path::Path;
use crate::pointer::Pointer;
use crate::scene::{PathResolver, Scene};

/// Propagation state at the end of a dispatch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// A listener marked the event handled.
    pub handled: bool,
    /// A listener aborted the event.
    pub aborted: bool,
}

/// Walks paths and notifies listeners.
pub struct DispatchEngine<'a, K, S: ?Sized> {
    scene: &'a S,
    display: &'a [ListenerRef<K>],
    global: Option<&'a GlobalListeners<K>>,
}

impl<K, S: ?Sized> fmt::Debug for DispatchEngine<'_, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("display", &self.display.len())
            .field("global", &self.global.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, K: Copy + Eq, S: Scene<K> + ?Sized> DispatchEngine<'a, K, S> {
    /// Dispatch into `scene`, with display-level and optional global listeners.
    pub fn new(
        scene: &'a S,
        display: &'a [ListenerRef<K>],
        global: Option<&'a GlobalListeners<K>>,
    ) -> Self {
        Self {
            scene,
            display,
            global,
        }
    }

    /// Deliver `kind` along `path` on behalf of `pointer`.
    pub fn dispatch(
        &self,
        path: &Path<K>,
        kind: EventKind,
        pointer: &Pointer<K>,
        context: &mut EventContext,
        bubbles: bool,
        fire_on_disabled: bool,
    ) -> DispatchOutcome {
        log::trace!(
            "dispatch {} ({}) len={} bubbles={}",
            kind,
            pointer.kind().as_str(),
            path.len(),
            bubbles
        );
        let mut event = SceneEvent::new(kind, path, pointer, context);

        notify(pointer.listeners(), pointer, kind, &mut event);
        self.notify_targets(path, pointer, kind, &mut event, bubbles, fire_on_disabled);
        event.current_target = None;
        notify(self.display, pointer, kind, &mut event);
        if let Some(global) = self.global {
            let snapshot: Vec<ListenerRef<K>> = global.borrow().clone();
            notify(&snapshot, pointer, kind, &mut event);
        }

        DispatchOutcome {
            handled: event.handled,
            aborted: event.aborted,
        }
    }

    fn notify_targets(
        &self,
        path: &Path<K>,
        pointer: &Pointer<K>,
        kind: EventKind,
        event: &mut SceneEvent<'_, K>,
        bubbles: bool,
        fire_on_disabled: bool,
    ) {
        if event.aborted || event.handled {
            return;
        }
        let enabled_len = PathResolver::new(self.scene).input_enabled_len(path);
        let nodes = path.nodes();
        let first = if bubbles { 0 } else { nodes.len().saturating_sub(1) };
        for index in (first..nodes.len()).rev() {
            let node = nodes[index];
            if self.scene.is_disposed(node) || (!fire_on_disabled && index >= enabled_len) {
                continue;
            }
            event.current_target = Some(node);
            notify(self.scene.listeners(node), pointer, kind, event);
            if event.aborted || event.handled {
                return;
            }
        }
    }

    /// `Out` on the old path followed by the exits, each on `old.prefix(i + 1)`.
    pub fn exit_events(
        &self,
        pointer: &Pointer<K>,
        old: &Path<K>,
        diff: &BranchDiff,
        context: &mut EventContext,
    ) {
        for transition in diff.exit_transitions() {
            self.transition(pointer, old, transition, context);
        }
    }

    /// The enters, each on `new.prefix(i + 1)`, followed by `Over` on the new path.
    pub fn enter_events(
        &self,
        pointer: &Pointer<K>,
        new: &Path<K>,
        diff: &BranchDiff,
        context: &mut EventContext,
    ) {
        for transition in diff.enter_transitions() {
            self.transition(pointer, new, transition, context);
        }
    }

    fn transition(
        &self,
        pointer: &Pointer<K>,
        path: &Path<K>,
        transition: Transition,
        context: &mut EventContext,
    ) {
        match transition {
            // Out and Exit walk the old input-enabled path, so every node on it
            // was entered; they reach nodes that have since lost input too.
            Transition::Out => {
                self.dispatch(path, EventKind::Out, pointer, context, true, true);
            }
            Transition::Exit(index) => {
                self.dispatch(&path.prefix(index + 1), EventKind::Exit, pointer, context, false, true);
            }
            Transition::Enter(index) => {
                self.dispatch(&path.prefix(index + 1), EventKind::Enter, pointer, context, false, false);
            }
            Transition::Over => {
                self.dispatch(path, EventKind::Over, pointer, context, true, false);
            }
        }
    }
}

/// Run one level of listeners: specific then generic for each, stopping on abort.
fn notify<K: Copy + Eq>(
    listeners: &[ListenerRef<K>],
    pointer: &Pointer<K>,
    kind: EventKind,
    event: &mut SceneEvent<'_, K>,
) {
    if event.handled {
        return;
    }
    for listener in listeners {
        if event.aborted {
            return;
        }
        let mut listener = listener.borrow_mut();
        listener.on_pointer_event(pointer.kind(), kind, event);
        if event.aborted {
            return;
        }
        listener.on_event(kind, event);
    }
}
