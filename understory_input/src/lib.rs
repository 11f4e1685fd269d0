// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_input --heading-base-level=0

//! Understory Input: deterministic, `no_std` pointer and keyboard dispatch over a retained scene.
//!
//! ## Overview
//!
//! The host feeds raw platform events into an [`Input`] engine. For each event the engine
//! finds (or creates) the [`Pointer`] it belongs to, resolves the scene [`Path`] under it with
//! a [`PathResolver`], and delivers logical events to listeners with a [`DispatchEngine`].
//!
//! When the path under a pointer changes, [`BranchDiff`] computes the minimal transition from
//! the old path to the new one: `Out` on the old path, `Exit` for every dropped node from the
//! leaf upwards, `Enter` for every new node from the branch point downwards, and `Over` on the
//! new path. Transitions follow the input-enabled prefix of each path, so a node that has input
//! disabled never sees `Enter`, and neither do its descendants.
//!
//! ## Dispatch order
//!
//! Every logical event reaches, in order:
//!
//! 1) the listeners on the pointer itself,
//! 2) the scene nodes on the path, leaf to root when the event bubbles,
//! 3) display-level listeners,
//! 4) global listeners, snapshotted at dispatch time.
//!
//! A listener can [`handle`](SceneEvent::handle) an event, which lets the current level finish
//! and stops the rest, or [`abort`](SceneEvent::abort) it, which stops delivery at once.
//!
//! ## Batching
//!
//! Raw events can be queued through [`Input::batch_action`] and run later in arrival order
//! by [`Input::flush`]. User-gesture events (presses, releases, clicks, keys) flush the queue
//! immediately. Listeners may queue further events while a flush is running; they run in the
//! same flush.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::{Point, Rect};
//! use understory_input::{EventContext, EventKind, Input, NodeId, SceneEvent, SceneTree, listener_fn};
//!
//! let mut scene = SceneTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
//! let button = scene.insert(scene.root(), Rect::new(10.0, 10.0, 40.0, 30.0)).unwrap();
//!
//! let hovered = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&hovered);
//! scene.add_listener(
//!     button,
//!     listener_fn(move |kind, event: &mut SceneEvent<'_, NodeId>| {
//!         if matches!(kind, EventKind::Enter | EventKind::Exit) {
//!             sink.borrow_mut().push((kind, event.target()));
//!         }
//!     }),
//! );
//!
//! let mut input = Input::new(scene);
//! input.mouse_move(Point::new(20.0, 20.0), &mut EventContext::new(0));
//! input.mouse_move(Point::new(80.0, 80.0), &mut EventContext::new(16));
//!
//! assert_eq!(
//!     *hovered.borrow(),
//!     [(EventKind::Enter, Some(button)), (EventKind::Exit, Some(button))]
//! );
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod action;
mod batch;
mod diff;
mod dispatch;
mod error;
mod event;
mod input;
mod listener;
mod path;
mod pointer;
mod registry;
mod scene;
mod tree;

pub use action::{ActionRecorder, InputAction};
pub use batch::{BatchCallback, BatchKind, BatchedEvent, EventBatcher};
pub use diff::{BranchDiff, Transition};
pub use dispatch::{DispatchEngine, DispatchOutcome};
pub use error::InputError;
pub use event::{ElementId, EventContext, EventKind, SceneEvent};
pub use input::{Input, InputConfig};
pub use listener::{FnListener, GlobalListeners, InputListener, ListenerRef, listener_fn};
pub use path::Path;
pub use pointer::{Buttons, MouseButton, Pointer, PointerId, PointerKind, PointerType};
pub use registry::{PointerHandle, PointerRegistry};
pub use scene::{AccessibilityTree, PathResolver, Scene};
pub use tree::{NodeFlags, NodeId, SceneTree};

pub use understory_keyboard::{KeyStateConfig, KeyStateTracker, KeyboardEvent, Modifiers};
