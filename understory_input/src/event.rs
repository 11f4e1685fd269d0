// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event kinds, raw-event context, and the per-dispatch event object.

use core::fmt;

use kurbo::Point;
use understory_keyboard::{KeyboardEvent, Modifiers};

use crate::listener::ListenerRef;
use crate::path::Path;
use crate::pointer::Pointer;

/// Logical event kinds delivered to listeners.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Contact pressed.
    Down,
    /// Contact released.
    Up,
    /// Contact cancelled by the platform.
    Cancel,
    /// Contact moved.
    Move,
    /// A node is now on the pointer's path. Delivered to that node only.
    Enter,
    /// A node is no longer on the pointer's path. Delivered to that node only.
    Exit,
    /// The deepest node under the pointer changed; bubbles over the new path.
    Over,
    /// The deepest node under the pointer changed; bubbles over the old path.
    Out,
    /// Wheel scrolled.
    Wheel,
    /// The platform granted pointer capture.
    GotPointerCapture,
    /// The platform revoked pointer capture.
    LostPointerCapture,
    /// Accessibility focus arrived.
    FocusIn,
    /// Accessibility focus left.
    FocusOut,
    /// Accessibility activation.
    Click,
    /// Key pressed while an accessible element had focus.
    KeyDown,
    /// Key released while an accessible element had focus.
    KeyUp,
    /// Text input on an accessible element.
    Input,
    /// Committed value change on an accessible element.
    Change,
}

impl EventKind {
    /// Lowercase platform-style name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Cancel => "cancel",
            Self::Move => "move",
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Over => "over",
            Self::Out => "out",
            Self::Wheel => "wheel",
            Self::GotPointerCapture => "gotpointercapture",
            Self::LostPointerCapture => "lostpointercapture",
            Self::FocusIn => "focusin",
            Self::FocusOut => "focusout",
            Self::Click => "click",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::Input => "input",
            Self::Change => "change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque handle to a platform element (the raw event target).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Raw platform event data carried alongside a logical event.
///
/// Contexts built with [`EventContext::synthetic`] stand in when no raw event
/// exists, e.g. during pointer cleanup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventContext {
    /// Platform timestamp, in milliseconds.
    pub time_stamp: u64,
    /// Modifier flags reported with the raw event.
    pub modifiers: Modifiers,
    /// Raw target element, if the platform reported one.
    pub target: Option<ElementId>,
    /// Keyboard payload for key events.
    pub keyboard: Option<KeyboardEvent>,
    synthetic: bool,
    default_prevented: bool,
}

impl EventContext {
    /// Context for a raw event observed at `time_stamp`.
    pub fn new(time_stamp: u64) -> Self {
        Self {
            time_stamp,
            ..Self::default()
        }
    }

    /// Empty context for events the engine synthesizes itself.
    pub fn synthetic() -> Self {
        Self {
            synthetic: true,
            ..Self::default()
        }
    }

    /// Set the modifier flags.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the raw target element.
    #[must_use]
    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    /// Returns true if no raw platform event backs this context.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Ask the platform not to run its default action.
    ///
    /// Independent of handled/aborted propagation state.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Returns true if [`prevent_default`](Self::prevent_default) was called.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// The event object handed to listeners during one dispatch.
///
/// Propagation flags live here, not on the pointer: a listener marks the event
/// [handled](Self::handle) to stop after the current level, or
/// [aborted](Self::abort) to stop immediately.
pub struct SceneEvent<'a, K> {
    kind: EventKind,
    path: &'a Path<K>,
    pointer: &'a Pointer<K>,
    context: &'a mut EventContext,
    pub(crate) current_target: Option<K>,
    pub(crate) handled: bool,
    pub(crate) aborted: bool,
}

impl<K: fmt::Debug> fmt::Debug for SceneEvent<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneEvent")
            .field("kind", &self.kind)
            .field("path", self.path)
            .field("current_target", &self.current_target)
            .field("handled", &self.handled)
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}

impl<'a, K: Copy + Eq> SceneEvent<'a, K> {
    pub(crate) fn new(
        kind: EventKind,
        path: &'a Path<K>,
        pointer: &'a Pointer<K>,
        context: &'a mut EventContext,
    ) -> Self {
        Self {
            kind,
            path,
            pointer,
            context,
            current_target: None,
            handled: false,
            aborted: false,
        }
    }

    /// The event kind.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The full path being dispatched.
    pub fn path(&self) -> &Path<K> {
        self.path
    }

    /// The deepest node of the path, if any.
    pub fn target(&self) -> Option<K> {
        self.path.last_node()
    }

    /// The node whose listeners are running, or `None` outside the target walk.
    pub fn current_target(&self) -> Option<K> {
        self.current_target
    }

    /// The pointer that produced the event.
    pub fn pointer(&self) -> &Pointer<K> {
        self.pointer
    }

    /// The pointer's location at dispatch time.
    pub fn point(&self) -> Option<Point> {
        self.pointer.point()
    }

    /// Raw event context.
    pub fn context(&self) -> &EventContext {
        self.context
    }

    /// Mutable raw event context.
    pub fn context_mut(&mut self) -> &mut EventContext {
        self.context
    }

    /// Add `listener` to the pointer behind this event once the dispatch returns.
    ///
    /// With `attach` it becomes the pointer's attached listener, e.g. a drag
    /// grabbing its contact on `Down`. It receives the pointer's next event,
    /// not this one.
    pub fn add_pointer_listener(&self, listener: ListenerRef<K>, attach: bool) {
        self.pointer.request_listener(listener, attach);
    }

    /// Let the current level finish, then stop propagation.
    pub fn handle(&mut self) {
        self.handled = true;
    }

    /// Stop propagation immediately, skipping remaining listeners at this level.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    /// Returns true if a listener called [`handle`](Self::handle).
    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Returns true if a listener called [`abort`](Self::abort).
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Forward to [`EventContext::prevent_default`].
    pub fn prevent_default(&mut self) {
        self.context.prevent_default();
    }
}
