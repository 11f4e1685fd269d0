// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointers: one record per tracked input contact.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::{Point, Vec2};

use crate::diff::BranchDiff;
use crate::event::EventContext;
use crate::listener::ListenerRef;
use crate::path::Path;

/// Platform-assigned identifier for a contact.
pub type PointerId = u64;

/// Resolved kind of a pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// The session-long mouse pointer.
    Mouse,
    /// A finger contact, alive from start to end/cancel.
    Touch,
    /// A stylus contact, alive from start to end/cancel.
    Pen,
    /// Synthetic pointer for events arriving through the accessibility mirror.
    Accessibility,
}

impl PointerKind {
    /// Returns true for pointers that outlive a single press.
    ///
    /// Only the mouse is persistent; everything else is removed by
    /// [`Input::remove_temporary_pointers`](crate::Input::remove_temporary_pointers).
    #[inline]
    pub fn is_persistent(self) -> bool {
        matches!(self, Self::Mouse)
    }

    /// Lowercase name, as platforms spell it.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Touch => "touch",
            Self::Pen => "pen",
            Self::Accessibility => "accessibility",
        }
    }
}

/// Pointer type as reported by a raw pointer event, before resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerType {
    /// `"mouse"`.
    Mouse,
    /// `"touch"`.
    Touch,
    /// `"pen"`.
    Pen,
    /// The platform left the field blank.
    Unspecified,
    /// Anything else.
    Other(String),
}

impl PointerType {
    /// Parse a raw platform string.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "mouse" => Self::Mouse,
            "touch" => Self::Touch,
            "pen" => Self::Pen,
            "" => Self::Unspecified,
            other => Self::Other(String::from(other)),
        }
    }
}

/// A mouse button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// Usually the wheel button.
    Auxiliary,
}

bitflags::bitflags! {
    /// Set of held buttons.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        /// Primary button.
        const PRIMARY   = 0b0000_0001;
        /// Secondary button.
        const SECONDARY = 0b0000_0010;
        /// Auxiliary button.
        const AUXILIARY = 0b0000_0100;
    }
}

impl From<MouseButton> for Buttons {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Primary => Self::PRIMARY,
            MouseButton::Secondary => Self::SECONDARY,
            MouseButton::Auxiliary => Self::AUXILIARY,
        }
    }
}

/// One tracked input contact.
///
/// Pointers are owned by the [`PointerRegistry`](crate::PointerRegistry).
/// Their path fields only change when a branch change has fully dispatched,
/// so listeners never observe a half-updated pointer.
pub struct Pointer<K> {
    id: Option<PointerId>,
    kind: PointerKind,
    point: Option<Point>,
    path: Path<K>,
    input_enabled_path: Path<K>,
    last_path_diff: Option<BranchDiff>,
    buttons: Buttons,
    is_down: bool,
    wheel_delta: Vec2,
    listeners: Vec<ListenerRef<K>>,
    attached: Option<ListenerRef<K>>,
    // Listener additions made from inside a dispatch, applied once it returns.
    requested: RefCell<Vec<(ListenerRef<K>, bool)>>,
    last_context: Option<EventContext>,
}

impl<K: fmt::Debug> fmt::Debug for Pointer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("point", &self.point)
            .field("path", &self.path)
            .field("is_down", &self.is_down)
            .field("listeners", &self.listeners.len())
            .field("attached", &self.attached.is_some())
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq> Pointer<K> {
    /// Create a pointer that starts over `root` only.
    pub fn new(kind: PointerKind, id: Option<PointerId>, point: Option<Point>, root: K) -> Self {
        Self {
            id,
            kind,
            point,
            path: Path::anchored(root),
            input_enabled_path: Path::anchored(root),
            last_path_diff: None,
            buttons: Buttons::empty(),
            is_down: false,
            wheel_delta: Vec2::ZERO,
            listeners: Vec::new(),
            attached: None,
            requested: RefCell::new(Vec::new()),
            last_context: None,
        }
    }

    /// Platform id, if the platform supplied one.
    pub fn id(&self) -> Option<PointerId> {
        self.id
    }

    /// Resolved kind.
    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    /// Last known location, or `None` before the first positioned event.
    pub fn point(&self) -> Option<Point> {
        self.point
    }

    /// Full hit path as of the last committed branch change.
    pub fn path(&self) -> &Path<K> {
        &self.path
    }

    /// Prefix of [`path`](Self::path) before the first input-disabled node.
    pub fn input_enabled_path(&self) -> &Path<K> {
        &self.input_enabled_path
    }

    /// Diff of the full path from the most recent commit.
    pub fn last_path_diff(&self) -> Option<&BranchDiff> {
        self.last_path_diff.as_ref()
    }

    /// Held buttons.
    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// Whether the contact is pressed.
    pub fn is_down(&self) -> bool {
        self.is_down
    }

    /// Delta of the most recent wheel event.
    pub fn wheel_delta(&self) -> Vec2 {
        self.wheel_delta
    }

    /// Context of the most recent raw event for this pointer.
    pub fn last_context(&self) -> Option<&EventContext> {
        self.last_context.as_ref()
    }

    /// Pointer-scoped listeners, in insertion order.
    pub fn listeners(&self) -> &[ListenerRef<K>] {
        &self.listeners
    }

    /// The exclusive listener, if one is attached.
    pub fn attached_listener(&self) -> Option<&ListenerRef<K>> {
        self.attached.as_ref()
    }

    /// Returns true if an exclusive listener is attached.
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Add a listener. With `attach`, it also becomes the exclusive listener.
    ///
    /// Attaching while another listener is attached is a contract violation.
    pub fn add_listener(&mut self, listener: ListenerRef<K>, attach: bool) {
        debug_assert!(
            !self.listeners.iter().any(|l| Rc::ptr_eq(l, &listener)),
            "listener is already on this pointer"
        );
        if attach {
            debug_assert!(
                self.attached.is_none(),
                "pointer already has an attached listener"
            );
            self.attached = Some(Rc::clone(&listener));
        }
        self.listeners.push(listener);
    }

    /// Remove a listener; detaches it if it was the attached one.
    ///
    /// Returns false if the listener was not present.
    pub fn remove_listener(&mut self, listener: &ListenerRef<K>) -> bool {
        let Some(index) = self.listeners.iter().position(|l| Rc::ptr_eq(l, listener)) else {
            return false;
        };
        self.listeners.remove(index);
        if self
            .attached
            .as_ref()
            .is_some_and(|a| Rc::ptr_eq(a, listener))
        {
            self.attached = None;
        }
        true
    }

    /// Queue a listener addition while this pointer is borrowed by a dispatch.
    pub(crate) fn request_listener(&self, listener: ListenerRef<K>, attach: bool) {
        self.requested.borrow_mut().push((listener, attach));
    }

    /// Apply queued listener additions in request order.
    pub(crate) fn apply_requested_listeners(&mut self) {
        let requested = core::mem::take(self.requested.get_mut());
        for (listener, attach) in requested {
            self.add_listener(listener, attach);
        }
    }

    /// Interrupt the attached listener, if any.
    pub fn interrupt_attached(&self) {
        if let Some(attached) = self.attached.clone() {
            attached.borrow_mut().interrupt();
        }
    }

    /// Interrupt every listener on this pointer.
    pub fn interrupt_all(&self) {
        let snapshot = self.listeners.clone();
        for listener in snapshot {
            listener.borrow_mut().interrupt();
        }
    }

    /// Record a new location. Returns true if it differs from the previous one.
    pub(crate) fn update_point(&mut self, point: Point) -> bool {
        let changed = self.point != Some(point);
        self.point = Some(point);
        changed
    }

    pub(crate) fn set_id(&mut self, id: Option<PointerId>) {
        self.id = id;
    }

    pub(crate) fn press(&mut self, button: Option<MouseButton>) {
        if let Some(button) = button {
            self.buttons |= Buttons::from(button);
        }
        self.is_down = true;
    }

    pub(crate) fn release(&mut self, button: Option<MouseButton>) {
        match button {
            Some(button) => {
                self.buttons -= Buttons::from(button);
                self.is_down = !self.buttons.is_empty();
            }
            None => {
                self.buttons = Buttons::empty();
                self.is_down = false;
            }
        }
    }

    pub(crate) fn set_wheel_delta(&mut self, delta: Vec2) {
        self.wheel_delta = delta;
    }

    pub(crate) fn remember_context(&mut self, context: &EventContext) {
        self.last_context = Some(context.clone());
    }

    /// Commit both paths together once all transitions have dispatched.
    pub(crate) fn commit_paths(&mut self, path: Path<K>, input_enabled: Path<K>) {
        self.last_path_diff = Some(BranchDiff::compute(&self.path, &path));
        self.path = path;
        self.input_enabled_path = input_enabled;
    }

    /// Release per-pointer resources. Called once, on removal.
    pub(crate) fn dispose(&mut self) {
        self.listeners.clear();
        self.attached = None;
        self.requested.get_mut().clear();
        self.last_context = None;
    }
}
