// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The input engine: raw entry points, pointer bookkeeping, and dispatch.
//!
//! Every entry point follows the same shape: find or create the pointer,
//! update its raw state, run the branch change (optional `Move`, then
//! out/exit/enter/over), dispatch the event itself, and finally commit the new
//! paths onto the pointer.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Vec2};
use understory_keyboard::{KeyStateConfig, KeyStateTracker, KeyboardEvent};

use crate::action::{ActionRecorder, InputAction};
use crate::batch::EventBatcher;
use crate::diff::BranchDiff;
use crate::dispatch::DispatchEngine;
use crate::error::{InputError, unknown_pointer_type};
use crate::event::{EventContext, EventKind};
use crate::listener::{GlobalListeners, ListenerRef};
use crate::path::Path;
use crate::pointer::{MouseButton, Pointer, PointerId, PointerKind, PointerType};
use crate::registry::{PointerHandle, PointerRegistry};
use crate::scene::{AccessibilityTree, PathResolver, Scene};

/// Engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputConfig {
    /// Queue raw events until an explicit flush (or a user-gesture trigger).
    pub batch_events: bool,
    /// Never call `prevent_default` on down events.
    pub passive_events: bool,
    /// Key tracker behaviour.
    pub key_state: KeyStateConfig,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            batch_events: true,
            passive_events: false,
            key_state: KeyStateConfig::default(),
        }
    }
}

/// How a raw pointer type resolved.
enum Contact {
    Mouse,
    Transient(PointerKind),
}

/// Input engine over a scene `S` with node ids `K`.
pub struct Input<K, S> {
    scene: S,
    accessibility: Option<Box<dyn AccessibilityTree<K>>>,
    pointers: PointerRegistry<K>,
    display_listeners: Vec<ListenerRef<K>>,
    global_listeners: Option<GlobalListeners<K>>,
    batcher: Rc<EventBatcher<Input<K, S>>>,
    key_state: KeyStateTracker,
    config: InputConfig,
    connected: bool,
    recorder: Option<Box<dyn ActionRecorder>>,
}

impl<K, S: fmt::Debug> fmt::Debug for Input<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("scene", &self.scene)
            .field("pointers", &self.pointers)
            .field("display_listeners", &self.display_listeners.len())
            .field("batcher", &self.batcher)
            .field("key_state", &self.key_state)
            .field("config", &self.config)
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}

impl<K, S> Input<K, S>
where
    K: Copy + Eq + 'static,
    S: Scene<K> + 'static,
{
    /// Create an engine with the default configuration.
    pub fn new(scene: S) -> Self {
        Self::with_config(scene, InputConfig::default())
    }

    /// Create an engine.
    pub fn with_config(scene: S, config: InputConfig) -> Self {
        Self {
            scene,
            accessibility: None,
            pointers: PointerRegistry::new(),
            display_listeners: Vec::new(),
            global_listeners: None,
            batcher: Rc::new(EventBatcher::new(config.batch_events)),
            key_state: KeyStateTracker::with_config(config.key_state),
            config,
            connected: false,
            recorder: None,
        }
    }

    /// The scene.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable scene access. Call [`validate_pointers`](Self::validate_pointers)
    /// after changing its shape.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Configuration in use.
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// The pointer registry.
    pub fn pointers(&self) -> &PointerRegistry<K> {
        &self.pointers
    }

    /// Mutable registry access, for subscriptions and pointer listeners.
    pub fn pointers_mut(&mut self) -> &mut PointerRegistry<K> {
        &mut self.pointers
    }

    /// The mouse pointer, once a mouse event has arrived.
    pub fn mouse(&self) -> Option<PointerHandle> {
        self.pointers.mouse()
    }

    /// Held-key tracker fed by key events.
    pub fn key_state(&self) -> &KeyStateTracker {
        &self.key_state
    }

    /// Mutable key tracker access.
    pub fn key_state_mut(&mut self) -> &mut KeyStateTracker {
        &mut self.key_state
    }

    /// Shared batcher; listeners may enqueue into it while it flushes.
    pub fn batcher(&self) -> Rc<EventBatcher<Self>> {
        Rc::clone(&self.batcher)
    }

    /// Install the accessibility mirror.
    pub fn set_accessibility_tree(&mut self, tree: impl AccessibilityTree<K> + 'static) {
        self.accessibility = Some(Box::new(tree));
    }

    /// Register a display-level listener, notified after the scene targets.
    pub fn add_display_listener(&mut self, listener: ListenerRef<K>) {
        self.display_listeners.push(listener);
    }

    /// Remove a display-level listener. Returns false if it was not registered.
    pub fn remove_display_listener(&mut self, listener: &ListenerRef<K>) -> bool {
        let before = self.display_listeners.len();
        self.display_listeners.retain(|l| !Rc::ptr_eq(l, listener));
        self.display_listeners.len() != before
    }

    /// Share a global listener list, notified last.
    pub fn set_global_listeners(&mut self, listeners: Option<GlobalListeners<K>>) {
        self.global_listeners = listeners;
    }

    /// Install or clear the action recorder used by [`apply`](Self::apply).
    pub fn set_recorder(&mut self, recorder: Option<Box<dyn ActionRecorder>>) {
        self.recorder = recorder;
    }

    /// Start accepting batched raw events.
    pub fn connect_listeners(&mut self) {
        debug_assert!(!self.connected, "input listeners are already connected");
        self.connected = true;
        if !self.key_state.is_attached() {
            self.key_state.attach();
        }
        log::debug!("input listeners connected");
    }

    /// Stop accepting batched raw events.
    pub fn disconnect_listeners(&mut self) {
        debug_assert!(self.connected, "input listeners are not connected");
        self.connected = false;
        if self.key_state.is_attached() {
            self.key_state.detach();
        }
        log::debug!("input listeners disconnected");
    }

    /// Returns true between [`connect_listeners`](Self::connect_listeners) and
    /// [`disconnect_listeners`](Self::disconnect_listeners).
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Queue `action` as a captured raw event.
    ///
    /// Gesture actions flush at once; everything else waits for
    /// [`flush`](Self::flush) unless batching is off. Actions are dropped while
    /// disconnected.
    pub fn batch_action(
        &mut self,
        action: InputAction,
        context: EventContext,
    ) -> Result<(), InputError> {
        if !self.connected {
            log::debug!("dropping {} while disconnected", action.name());
            return Ok(());
        }
        if let Some(PointerType::Other(raw)) = action.pointer_type() {
            return unknown_pointer_type(raw);
        }
        let kind = action.batch_kind();
        let immediate = action.triggers_immediate();
        let batcher = Rc::clone(&self.batcher);
        batcher.enqueue(
            self,
            context,
            kind,
            move |input: &mut Self, context: &mut EventContext| {
                if let Err(err) = input.apply(&action, context) {
                    log::warn!("batched {} failed: {err}", action.name());
                }
            },
            immediate,
        );
        Ok(())
    }

    /// Run every queued raw event.
    pub fn flush(&mut self) {
        let batcher = Rc::clone(&self.batcher);
        batcher.flush(self);
    }

    /// Record `action` (if a recorder is installed) and run its entry point.
    pub fn apply(
        &mut self,
        action: &InputAction,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(action, context);
        }
        match action {
            InputAction::MouseDown { id, point, button } => {
                self.mouse_down(*id, *point, *button, context);
            }
            InputAction::MouseUp { point, button } => self.mouse_up(*point, *button, context),
            InputAction::MouseMove { point } => self.mouse_move(*point, context),
            InputAction::MouseOver { point } => self.mouse_over(*point, context),
            InputAction::MouseOut { point } => self.mouse_out(*point, context),
            InputAction::Wheel { point, delta } => self.wheel(*point, *delta, context),
            InputAction::TouchStart { id, point } => self.touch_start(*id, *point, context),
            InputAction::TouchEnd { id, point } => self.touch_end(*id, *point, context),
            InputAction::TouchMove { id, point } => self.touch_move(*id, *point, context),
            InputAction::TouchCancel { id, point } => self.touch_cancel(*id, *point, context),
            InputAction::PenStart { id, point } => self.pen_start(*id, *point, context),
            InputAction::PenEnd { id, point } => self.pen_end(*id, *point, context),
            InputAction::PenMove { id, point } => self.pen_move(*id, *point, context),
            InputAction::PenCancel { id, point } => self.pen_cancel(*id, *point, context),
            InputAction::PointerDown {
                id,
                pointer_type,
                point,
                button,
            } => self.pointer_down(*id, pointer_type, *point, *button, context)?,
            InputAction::PointerUp {
                id,
                pointer_type,
                point,
                button,
            } => self.pointer_up(*id, pointer_type, *point, *button, context)?,
            InputAction::PointerCancel {
                id,
                pointer_type,
                point,
            } => self.pointer_cancel(*id, pointer_type, *point, context)?,
            InputAction::PointerMove {
                id,
                pointer_type,
                point,
            } => self.pointer_move(*id, pointer_type, *point, context)?,
            InputAction::PointerOver {
                id,
                pointer_type,
                point,
            } => self.pointer_over(*id, pointer_type, *point, context)?,
            InputAction::PointerOut {
                id,
                pointer_type,
                point,
            } => self.pointer_out(*id, pointer_type, *point, context)?,
            InputAction::GotPointerCapture { id, pointer_type } => {
                self.got_pointer_capture(*id, pointer_type, context)?;
            }
            InputAction::LostPointerCapture { id, pointer_type } => {
                self.lost_pointer_capture(*id, pointer_type, context)?;
            }
            InputAction::FocusIn { unique_id } => self.focus_in(unique_id, context),
            InputAction::FocusOut { unique_id } => self.focus_out(unique_id, context),
            InputAction::Click { unique_id } => self.click(unique_id, context),
            InputAction::TextInput { unique_id } => self.text_input(unique_id, context),
            InputAction::Change { unique_id } => self.change(unique_id, context),
            InputAction::KeyDown { unique_id, event } => {
                self.key_down(unique_id.as_deref(), event, context);
            }
            InputAction::KeyUp { unique_id, event } => {
                self.key_up(unique_id.as_deref(), event, context);
            }
            InputAction::WindowBlur => self.window_blur(context),
        }
        Ok(())
    }

    // Mouse

    /// Mouse button pressed.
    pub fn mouse_down(
        &mut self,
        id: Option<PointerId>,
        point: Point,
        button: MouseButton,
        context: &mut EventContext,
    ) {
        let handle = self.ensure_mouse(point);
        let Some(mouse) = self.pointers.get_mut(handle) else {
            return;
        };
        mouse.set_id(id);
        let point_changed = mouse.update_point(point);
        mouse.press(Some(button));
        self.down_event(handle, context, point_changed);
    }

    /// Mouse button released.
    pub fn mouse_up(&mut self, point: Point, button: MouseButton, context: &mut EventContext) {
        let handle = self.ensure_mouse(point);
        let Some(mouse) = self.pointers.get_mut(handle) else {
            return;
        };
        let point_changed = mouse.update_point(point);
        mouse.release(Some(button));
        self.up_event(handle, context, point_changed);
    }

    /// Mouse moved.
    pub fn mouse_move(&mut self, point: Point, context: &mut EventContext) {
        let handle = self.ensure_mouse(point);
        if let Some(mouse) = self.pointers.get_mut(handle) {
            mouse.update_point(point);
        }
        self.branch_change_events(handle, context, true);
    }

    /// Mouse entered the display.
    pub fn mouse_over(&mut self, point: Point, context: &mut EventContext) {
        self.mouse_relocated(point, context);
    }

    /// Mouse left the display.
    pub fn mouse_out(&mut self, point: Point, context: &mut EventContext) {
        self.mouse_relocated(point, context);
    }

    fn mouse_relocated(&mut self, point: Point, context: &mut EventContext) {
        let handle = self.ensure_mouse(point);
        if let Some(mouse) = self.pointers.get_mut(handle) {
            mouse.update_point(point);
        }
        self.branch_change_events(handle, context, false);
    }

    /// Wheel scrolled at `point`. Dispatched on the hit path without a branch change.
    pub fn wheel(&mut self, point: Point, delta: Vec2, context: &mut EventContext) {
        let handle = self.ensure_mouse(point);
        let Some(mouse) = self.pointers.get_mut(handle) else {
            return;
        };
        mouse.update_point(point);
        mouse.set_wheel_delta(delta);
        mouse.remember_context(context);
        let Some(mouse) = self.pointers.get(handle) else {
            return;
        };
        let path = PathResolver::new(&self.scene).resolve(mouse);
        self.engine()
            .dispatch(&path, EventKind::Wheel, mouse, context, true, false);
        self.apply_listener_requests(handle);
    }

    // Touch and pen

    /// Finger contact started.
    pub fn touch_start(&mut self, id: PointerId, point: Point, context: &mut EventContext) {
        self.transient_start(PointerKind::Touch, id, point, context);
    }

    /// Finger contact ended. Unknown ids are ignored.
    pub fn touch_end(&mut self, id: PointerId, point: Point, context: &mut EventContext) {
        self.transient_end(PointerKind::Touch, id, point, context);
    }

    /// Finger contact moved.
    pub fn touch_move(&mut self, id: PointerId, point: Point, context: &mut EventContext) {
        self.transient_move(PointerKind::Touch, id, point, context);
    }

    /// Finger contact cancelled. Unknown ids are ignored.
    pub fn touch_cancel(&mut self, id: PointerId, point: Point, context: &mut EventContext) {
        self.transient_cancel(PointerKind::Touch, id, point, context);
    }

    /// Stylus contact started.
    pub fn pen_start(&mut self, id: PointerId, point: Point, context: &mut EventContext) {
        self.transient_start(PointerKind::Pen, id, point, context);
    }

    /// Stylus contact ended. Unknown ids are ignored.
    pub fn pen_end(&mut self, id: PointerId, point: Point, context: &mut EventContext) {
        self.transient_end(PointerKind::Pen, id, point, context);
    }

    /// Stylus contact moved.
    pub fn pen_move(&mut self, id: PointerId, point: Point, context: &mut EventContext) {
        self.transient_move(PointerKind::Pen, id, point, context);
    }

    /// Stylus contact cancelled. Unknown ids are ignored.
    pub fn pen_cancel(&mut self, id: PointerId, point: Point, context: &mut EventContext) {
        self.transient_cancel(PointerKind::Pen, id, point, context);
    }

    fn transient_start(
        &mut self,
        kind: PointerKind,
        id: PointerId,
        point: Point,
        context: &mut EventContext,
    ) {
        if let Some(stale) = self.find_transient(kind, id) {
            // The platform never ended the previous contact with this id.
            log::debug!("{} id {id} restarted; cancelling the stale pointer", kind.as_str());
            let mut synthetic = EventContext::synthetic();
            self.cancel_event(stale, &mut synthetic, false);
            self.pointers.remove_pointer(stale);
        }
        let mut pointer = Pointer::new(kind, Some(id), Some(point), self.scene.root());
        pointer.press(None);
        let handle = self.pointers.add_pointer(pointer);
        self.down_event(handle, context, false);
    }

    fn transient_end(
        &mut self,
        kind: PointerKind,
        id: PointerId,
        point: Point,
        context: &mut EventContext,
    ) {
        let Some(handle) = self.find_transient(kind, id) else {
            return;
        };
        let Some(pointer) = self.pointers.get_mut(handle) else {
            return;
        };
        let point_changed = pointer.update_point(point);
        pointer.release(None);
        self.up_event(handle, context, point_changed);
        self.pointers.remove_pointer(handle);
    }

    fn transient_move(
        &mut self,
        kind: PointerKind,
        id: PointerId,
        point: Point,
        context: &mut EventContext,
    ) {
        let Some(handle) = self.find_transient(kind, id) else {
            return;
        };
        if let Some(pointer) = self.pointers.get_mut(handle) {
            pointer.update_point(point);
        }
        self.branch_change_events(handle, context, true);
    }

    fn transient_cancel(
        &mut self,
        kind: PointerKind,
        id: PointerId,
        point: Point,
        context: &mut EventContext,
    ) {
        let Some(handle) = self.find_transient(kind, id) else {
            return;
        };
        let Some(pointer) = self.pointers.get_mut(handle) else {
            return;
        };
        let point_changed = pointer.update_point(point);
        pointer.release(None);
        self.cancel_event(handle, context, point_changed);
        self.pointers.remove_pointer(handle);
    }

    fn find_transient(&self, kind: PointerKind, id: PointerId) -> Option<PointerHandle> {
        self.pointers
            .find_by_id(id)
            .filter(|h| self.pointers.get(*h).is_some_and(|p| p.kind() == kind))
    }

    // Unified pointer events

    /// Pointer pressed.
    pub fn pointer_down(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        point: Point,
        button: MouseButton,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        match self.resolve_contact(id, pointer_type)? {
            Some(Contact::Mouse) => self.mouse_down(Some(id), point, button, context),
            Some(Contact::Transient(kind)) => self.transient_start(kind, id, point, context),
            None => {}
        }
        Ok(())
    }

    /// Pointer released.
    pub fn pointer_up(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        point: Point,
        button: MouseButton,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        match self.resolve_contact(id, pointer_type)? {
            Some(Contact::Mouse) => self.mouse_up(point, button, context),
            Some(Contact::Transient(kind)) => self.transient_end(kind, id, point, context),
            None => {}
        }
        Ok(())
    }

    /// Pointer cancelled. Cancels for the mouse are logged and ignored.
    pub fn pointer_cancel(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        point: Point,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        match self.resolve_contact(id, pointer_type)? {
            Some(Contact::Mouse) => log::warn!("ignoring pointer cancel for the mouse"),
            Some(Contact::Transient(kind)) => self.transient_cancel(kind, id, point, context),
            None => {}
        }
        Ok(())
    }

    /// Pointer moved.
    pub fn pointer_move(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        point: Point,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        match self.resolve_contact(id, pointer_type)? {
            Some(Contact::Mouse) => self.mouse_move(point, context),
            Some(Contact::Transient(kind)) => self.transient_move(kind, id, point, context),
            None => {}
        }
        Ok(())
    }

    /// Pointer entered the display. Transient contacts enter on start instead.
    pub fn pointer_over(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        point: Point,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        if let Some(Contact::Mouse) = self.resolve_contact(id, pointer_type)? {
            self.mouse_over(point, context);
        }
        Ok(())
    }

    /// Pointer left the display. Transient contacts exit on end instead.
    pub fn pointer_out(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        point: Point,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        if let Some(Contact::Mouse) = self.resolve_contact(id, pointer_type)? {
            self.mouse_out(point, context);
        }
        Ok(())
    }

    /// The platform granted capture to a pointer.
    pub fn got_pointer_capture(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        self.capture_event(id, pointer_type, EventKind::GotPointerCapture, context)
    }

    /// The platform revoked capture from a pointer.
    pub fn lost_pointer_capture(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        self.capture_event(id, pointer_type, EventKind::LostPointerCapture, context)
    }

    fn capture_event(
        &mut self,
        id: PointerId,
        pointer_type: &PointerType,
        kind: EventKind,
        context: &mut EventContext,
    ) -> Result<(), InputError> {
        let handle = match self.resolve_contact(id, pointer_type)? {
            Some(Contact::Mouse) => self.pointers.mouse(),
            Some(Contact::Transient(pointer_kind)) => self.find_transient(pointer_kind, id),
            None => None,
        };
        let Some(handle) = handle else {
            return Ok(());
        };
        if let Some(pointer) = self.pointers.get(handle) {
            self.engine()
                .dispatch(pointer.path(), kind, pointer, context, true, false);
        }
        self.apply_listener_requests(handle);
        Ok(())
    }

    /// Resolve a raw pointer type; `Ok(None)` means the event is dropped.
    fn resolve_contact(
        &self,
        id: PointerId,
        pointer_type: &PointerType,
    ) -> Result<Option<Contact>, InputError> {
        let contact = match pointer_type {
            PointerType::Mouse => Contact::Mouse,
            PointerType::Touch => Contact::Transient(PointerKind::Touch),
            PointerType::Pen => Contact::Transient(PointerKind::Pen),
            PointerType::Unspecified => {
                let is_mouse = self
                    .pointers
                    .mouse()
                    .and_then(|h| self.pointers.get(h))
                    .is_some_and(|m| m.id() == Some(id));
                if is_mouse {
                    Contact::Mouse
                } else {
                    Contact::Transient(PointerKind::Touch)
                }
            }
            PointerType::Other(raw) => return unknown_pointer_type(raw).map(|()| None),
        };
        Ok(Some(contact))
    }

    // Accessibility mirror

    /// Focus moved onto a mirrored element.
    pub fn focus_in(&mut self, unique_id: &str, context: &mut EventContext) {
        self.accessibility_event(unique_id, EventKind::FocusIn, context);
    }

    /// Focus left a mirrored element.
    pub fn focus_out(&mut self, unique_id: &str, context: &mut EventContext) {
        self.accessibility_event(unique_id, EventKind::FocusOut, context);
    }

    /// A mirrored element was activated.
    pub fn click(&mut self, unique_id: &str, context: &mut EventContext) {
        self.accessibility_event(unique_id, EventKind::Click, context);
    }

    /// Text was entered into a mirrored element.
    pub fn text_input(&mut self, unique_id: &str, context: &mut EventContext) {
        self.accessibility_event(unique_id, EventKind::Input, context);
    }

    /// A mirrored element committed a value change.
    pub fn change(&mut self, unique_id: &str, context: &mut EventContext) {
        self.accessibility_event(unique_id, EventKind::Change, context);
    }

    /// Key pressed. Always feeds the key tracker; dispatches when a mirrored
    /// element has focus.
    pub fn key_down(
        &mut self,
        unique_id: Option<&str>,
        event: &KeyboardEvent,
        context: &mut EventContext,
    ) {
        self.key_state.keydown_update(event);
        context.keyboard = Some(event.clone());
        if let Some(unique_id) = unique_id {
            self.accessibility_event(unique_id, EventKind::KeyDown, context);
        }
    }

    /// Key released. Always feeds the key tracker; dispatches when a mirrored
    /// element has focus.
    pub fn key_up(
        &mut self,
        unique_id: Option<&str>,
        event: &KeyboardEvent,
        context: &mut EventContext,
    ) {
        self.key_state.keyup_update(event);
        context.keyboard = Some(event.clone());
        if let Some(unique_id) = unique_id {
            self.accessibility_event(unique_id, EventKind::KeyUp, context);
        }
    }

    /// The window lost focus; no key-up events will follow for held keys.
    pub fn window_blur(&mut self, context: &mut EventContext) {
        log::debug!("window blur at {}; clearing key state", context.time_stamp);
        self.key_state.clear_state(false);
    }

    fn accessibility_event(&mut self, unique_id: &str, kind: EventKind, context: &mut EventContext) {
        let Some(path) = self
            .accessibility
            .as_ref()
            .and_then(|tree| tree.trail_from_unique_id(unique_id))
        else {
            log::debug!("no scene path for accessible element {unique_id}");
            return;
        };
        let handle = self.ensure_accessibility_pointer();
        let resolver = PathResolver::new(&self.scene);
        let enabled = resolver.input_enabled_path(&path);
        let pickable = resolver.is_pickable(&path);
        let Some(pointer) = self.pointers.get_mut(handle) else {
            return;
        };
        pointer.commit_paths(path.clone(), enabled);
        pointer.remember_context(context);
        let targets = if pickable { path } else { Path::empty() };
        self.dispatch_along(handle, &targets, kind, context);
    }

    // Host-driven maintenance

    /// Re-resolve every positioned pointer after the scene changed shape.
    ///
    /// Runs branch changes (without `Move`) using each pointer's last context.
    pub fn validate_pointers(&mut self) {
        let handles: Vec<PointerHandle> = self.pointers.handles().to_vec();
        for handle in handles.into_iter().rev() {
            let Some(pointer) = self.pointers.get(handle) else {
                continue;
            };
            if pointer.point().is_none() || pointer.kind() == PointerKind::Accessibility {
                continue;
            }
            let mut context = pointer
                .last_context()
                .cloned()
                .unwrap_or_else(EventContext::synthetic);
            self.branch_change_events(handle, &mut context, false);
        }
    }

    /// Remove every pointer except the mouse, dispatching exits for each first.
    pub fn remove_temporary_pointers(&mut self) {
        let handles: Vec<PointerHandle> = self.pointers.handles().to_vec();
        for handle in handles.into_iter().rev() {
            let Some(pointer) = self.pointers.get(handle) else {
                continue;
            };
            if pointer.kind().is_persistent() {
                continue;
            }
            log::debug!("removing temporary {} pointer", pointer.kind().as_str());
            let mut context = EventContext::synthetic();
            let entered = pointer.input_enabled_path();
            let diff = BranchDiff::exit_all(entered.len());
            self.engine()
                .exit_events(pointer, entered, &diff, &mut context);
            self.pointers.remove_pointer(handle);
        }
    }

    /// Interrupt every listener on every pointer.
    pub fn interrupt_pointers(&mut self) {
        for (_, pointer) in self.pointers.iter() {
            pointer.interrupt_all();
        }
    }

    /// Interrupt and remove temporary pointers, then discard queued raw events.
    pub fn clear_batched_events(&mut self) {
        self.interrupt_pointers();
        self.remove_temporary_pointers();
        let dropped = self.batcher.clear();
        log::debug!("discarded {dropped} batched events");
    }

    // Shared event plumbing

    fn engine(&self) -> DispatchEngine<'_, K, S> {
        DispatchEngine::new(
            &self.scene,
            &self.display_listeners,
            self.global_listeners.as_ref(),
        )
    }

    fn dispatch_along(
        &mut self,
        handle: PointerHandle,
        path: &Path<K>,
        kind: EventKind,
        context: &mut EventContext,
    ) {
        if let Some(pointer) = self.pointers.get(handle) {
            self.engine().dispatch(path, kind, pointer, context, true, false);
        }
        self.apply_listener_requests(handle);
    }

    /// Add the pointer listeners that listeners asked for during a dispatch.
    fn apply_listener_requests(&mut self, handle: PointerHandle) {
        if let Some(pointer) = self.pointers.get_mut(handle) {
            pointer.apply_requested_listeners();
        }
    }

    fn ensure_mouse(&mut self, point: Point) -> PointerHandle {
        if let Some(handle) = self.pointers.mouse() {
            return handle;
        }
        let mouse = Pointer::new(PointerKind::Mouse, None, Some(point), self.scene.root());
        self.pointers.add_pointer(mouse)
    }

    fn ensure_accessibility_pointer(&mut self) -> PointerHandle {
        if let Some(handle) = self.pointers.accessibility() {
            return handle;
        }
        let pointer = Pointer::new(PointerKind::Accessibility, None, None, self.scene.root());
        self.pointers.add_pointer(pointer)
    }

    /// Resolve the pointer's new path and fire the transitions from the old one.
    ///
    /// Transitions follow the input-enabled paths; both paths are committed
    /// together afterwards. Returns the new full path.
    fn branch_change_events(
        &mut self,
        handle: PointerHandle,
        context: &mut EventContext,
        send_move: bool,
    ) -> Option<Path<K>> {
        let (path, enabled) = {
            let pointer = self.pointers.get(handle)?;
            let resolver = PathResolver::new(&self.scene);
            let path = resolver.resolve(pointer);
            let enabled = resolver.input_enabled_path(&path);
            let old_enabled = pointer.input_enabled_path();
            let diff = BranchDiff::compute(old_enabled, &enabled);

            let engine = self.engine();
            if send_move {
                engine.dispatch(&path, EventKind::Move, pointer, context, true, false);
            }
            engine.exit_events(pointer, old_enabled, &diff, context);
            engine.enter_events(pointer, &enabled, &diff, context);
            (path, enabled)
        };
        let pointer = self.pointers.get_mut(handle)?;
        pointer.commit_paths(path.clone(), enabled);
        pointer.remember_context(context);
        pointer.apply_requested_listeners();
        Some(path)
    }

    fn down_event(&mut self, handle: PointerHandle, context: &mut EventContext, point_changed: bool) {
        let Some(path) = self.branch_change_events(handle, context, point_changed) else {
            return;
        };
        self.dispatch_along(handle, &path, EventKind::Down, context);
        if !self.config.passive_events && !self.target_is_under_mirror(context) {
            context.prevent_default();
        }
    }

    fn up_event(&mut self, handle: PointerHandle, context: &mut EventContext, point_changed: bool) {
        let Some(path) = self.branch_change_events(handle, context, point_changed) else {
            return;
        };
        self.dispatch_along(handle, &path, EventKind::Up, context);
        self.transient_exit(handle, context);
    }

    fn cancel_event(
        &mut self,
        handle: PointerHandle,
        context: &mut EventContext,
        point_changed: bool,
    ) {
        let Some(path) = self.branch_change_events(handle, context, point_changed) else {
            return;
        };
        self.dispatch_along(handle, &path, EventKind::Cancel, context);
        self.transient_exit(handle, context);
    }

    /// Touch and pen contacts leave every node they entered once lifted.
    fn transient_exit(&self, handle: PointerHandle, context: &mut EventContext) {
        let Some(pointer) = self.pointers.get(handle) else {
            return;
        };
        if matches!(pointer.kind(), PointerKind::Touch | PointerKind::Pen) {
            let entered = pointer.input_enabled_path();
            let diff = BranchDiff::exit_all(entered.len());
            self.engine().exit_events(pointer, entered, &diff, context);
        }
    }

    fn target_is_under_mirror(&self, context: &EventContext) -> bool {
        match (context.target, self.accessibility.as_ref()) {
            (Some(element), Some(tree)) => tree.is_element_under_mirror(element),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchKind;
    use crate::event::{ElementId, SceneEvent};
    use crate::listener::{InputListener, listener_fn};
    use crate::tree::{NodeId, SceneTree};
    use alloc::string::{String, ToString};
    use alloc::vec;
    use core::cell::{Cell, RefCell};
    use kurbo::Rect;
    use understory_keyboard::Modifiers;

    type Log = Rc<RefCell<Vec<(EventKind, Vec<NodeId>)>>>;

    struct Fixture {
        input: Input<NodeId, SceneTree>,
        log: Log,
        a: NodeId,
        b: NodeId,
        c: NodeId,
        x: NodeId,
        y: NodeId,
    }

    // A ⊃ B ⊃ {C (left half), X (right half) ⊃ Y (top right quarter)}
    fn fixture(config: InputConfig) -> Fixture {
        let mut tree = SceneTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let a = tree.root();
        let b = tree.insert(a, Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let c = tree.insert(b, Rect::new(0.0, 0.0, 50.0, 100.0)).unwrap();
        let x = tree.insert(b, Rect::new(50.0, 0.0, 100.0, 100.0)).unwrap();
        let y = tree.insert(x, Rect::new(50.0, 0.0, 100.0, 50.0)).unwrap();
        let mut input = Input::with_config(tree, config);
        let log: Log = Rc::default();
        let sink = Rc::clone(&log);
        input.add_display_listener(listener_fn(
            move |kind, event: &mut SceneEvent<'_, NodeId>| {
                sink.borrow_mut().push((kind, event.path().nodes().to_vec()));
            },
        ));
        Fixture {
            input,
            log,
            a,
            b,
            c,
            x,
            y,
        }
    }

    fn take(log: &Log) -> Vec<(EventKind, Vec<NodeId>)> {
        core::mem::take(&mut *log.borrow_mut())
    }

    fn kinds(log: &Log) -> Vec<EventKind> {
        take(log).into_iter().map(|(k, _)| k).collect()
    }

    fn ctx() -> EventContext {
        EventContext::new(0)
    }

    const LEFT: Point = Point::new(25.0, 25.0);
    const RIGHT: Point = Point::new(75.0, 25.0);

    struct Mirror {
        trails: Vec<(String, Path<NodeId>)>,
        element: ElementId,
    }

    impl AccessibilityTree<NodeId> for Mirror {
        fn trail_from_unique_id(&self, unique_id: &str) -> Option<Path<NodeId>> {
            self.trails
                .iter()
                .find(|(id, _)| id == unique_id)
                .map(|(_, path)| path.clone())
        }

        fn is_element_under_mirror(&self, element: ElementId) -> bool {
            element == self.element
        }
    }

    #[test]
    fn moving_between_siblings_fires_branch_transitions() {
        let Fixture {
            mut input,
            log,
            a,
            b,
            c,
            x,
            y,
        } = fixture(InputConfig::default());
        input.mouse_move(LEFT, &mut ctx());
        assert_eq!(
            take(&log),
            vec![
                (EventKind::Move, vec![a, b, c]),
                (EventKind::Out, vec![a]),
                (EventKind::Enter, vec![a, b]),
                (EventKind::Enter, vec![a, b, c]),
                (EventKind::Over, vec![a, b, c]),
            ]
        );

        input.mouse_move(RIGHT, &mut ctx());
        assert_eq!(
            take(&log),
            vec![
                (EventKind::Move, vec![a, b, x, y]),
                (EventKind::Out, vec![a, b, c]),
                (EventKind::Exit, vec![a, b, c]),
                (EventKind::Enter, vec![a, b, x]),
                (EventKind::Enter, vec![a, b, x, y]),
                (EventKind::Over, vec![a, b, x, y]),
            ]
        );

        let mouse = input.pointers().get(input.mouse().unwrap()).unwrap();
        assert_eq!(mouse.path().nodes(), &[a, b, x, y]);
        assert_eq!(mouse.input_enabled_path().nodes(), &[a, b, x, y]);
        assert_eq!(mouse.last_path_diff().unwrap().branch_index(), 2);
    }

    #[test]
    fn moving_within_the_same_node_only_moves() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.mouse_move(LEFT, &mut ctx());
        take(&f.log);
        input.mouse_move(Point::new(30.0, 30.0), &mut ctx());
        assert_eq!(kinds(&f.log), vec![EventKind::Move]);
    }

    #[test]
    fn down_on_disabled_leaf_reaches_enabled_ancestor() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.scene_mut().set_input_enabled(f.y, false);
        let hits: Rc<RefCell<Vec<NodeId>>> = Rc::default();
        for node in [f.x, f.y] {
            let hits = Rc::clone(&hits);
            input.scene_mut().add_listener(
                node,
                listener_fn(move |kind, event: &mut SceneEvent<'_, NodeId>| {
                    if kind == EventKind::Down {
                        hits.borrow_mut().push(event.current_target().unwrap());
                    }
                }),
            );
        }

        let mut context = ctx();
        input.mouse_down(Some(1), RIGHT, MouseButton::Primary, &mut context);
        assert_eq!(*hits.borrow(), vec![f.x]);
        assert!(context.is_default_prevented());

        let mouse = input.pointers().get(input.mouse().unwrap()).unwrap();
        assert_eq!(mouse.path().nodes(), &[f.a, f.b, f.x, f.y]);
        assert_eq!(mouse.input_enabled_path().nodes(), &[f.a, f.b, f.x]);
        assert!(mouse.is_down());
        assert_eq!(mouse.id(), Some(1));
    }

    #[test]
    fn passive_and_mirrored_downs_keep_default() {
        let mut passive = fixture(InputConfig {
            passive_events: true,
            ..InputConfig::default()
        })
        .input;
        let mut context = ctx();
        passive.mouse_down(None, LEFT, MouseButton::Primary, &mut context);
        assert!(!context.is_default_prevented());

        let mut mirrored = fixture(InputConfig::default()).input;
        mirrored.set_accessibility_tree(Mirror {
            trails: Vec::new(),
            element: ElementId(9),
        });
        let mut context = ctx().with_target(ElementId(9));
        mirrored.mouse_down(None, LEFT, MouseButton::Primary, &mut context);
        assert!(!context.is_default_prevented());

        let mut context = ctx().with_target(ElementId(3));
        mirrored.mouse_up(LEFT, MouseButton::Primary, &mut context);
        mirrored.mouse_down(None, LEFT, MouseButton::Primary, &mut context);
        assert!(context.is_default_prevented());
    }

    #[test]
    fn touch_lifecycle_enters_and_exits_everything() {
        let Fixture {
            mut input,
            log,
            a,
            b,
            c,
            ..
        } = fixture(InputConfig::default());
        input.touch_start(7, LEFT, &mut ctx());
        assert_eq!(input.pointers().len(), 1);
        assert!(input.mouse().is_none());
        assert_eq!(
            take(&log),
            vec![
                (EventKind::Out, vec![a]),
                (EventKind::Enter, vec![a, b]),
                (EventKind::Enter, vec![a, b, c]),
                (EventKind::Over, vec![a, b, c]),
                (EventKind::Down, vec![a, b, c]),
            ]
        );

        input.touch_end(7, LEFT, &mut ctx());
        assert_eq!(
            take(&log),
            vec![
                (EventKind::Up, vec![a, b, c]),
                (EventKind::Out, vec![a, b, c]),
                (EventKind::Exit, vec![a, b, c]),
                (EventKind::Exit, vec![a, b]),
                (EventKind::Exit, vec![a]),
            ]
        );
        assert!(input.pointers().is_empty());

        input.touch_end(7, LEFT, &mut ctx());
        assert!(take(&log).is_empty());
    }

    #[test]
    fn restarted_touch_id_cancels_the_stale_pointer() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        let removed = Rc::new(Cell::new(0));
        let counter = Rc::clone(&removed);
        input
            .pointers_mut()
            .on_pointer_removed(move |_, _| counter.set(counter.get() + 1));

        input.touch_start(7, LEFT, &mut ctx());
        take(&f.log);
        input.touch_start(7, RIGHT, &mut ctx());

        let seen = take(&f.log);
        assert_eq!(seen[0], (EventKind::Cancel, vec![f.a, f.b, f.c]));
        assert!(seen.contains(&(EventKind::Down, vec![f.a, f.b, f.x, f.y])));
        assert_eq!(removed.get(), 1);
        assert_eq!(input.pointers().len(), 1);
        let handle = input.pointers().find_by_id(7).unwrap();
        assert_eq!(input.pointers().get(handle).unwrap().point(), Some(RIGHT));
    }

    #[test]
    fn pen_contacts_are_tracked_apart_from_touches() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.pen_start(4, LEFT, &mut ctx());
        input.touch_end(4, LEFT, &mut ctx());
        assert_eq!(input.pointers().len(), 1);
        input.pen_cancel(4, LEFT, &mut ctx());
        assert!(input.pointers().is_empty());
        assert!(kinds(&f.log).contains(&EventKind::Cancel));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn unknown_pointer_type_is_an_error_in_debug() {
        let mut input = fixture(InputConfig::default()).input;
        let err = input
            .pointer_down(
                1,
                &PointerType::Other("laser".to_string()),
                LEFT,
                MouseButton::Primary,
                &mut ctx(),
            )
            .unwrap_err();
        assert_eq!(err, InputError::UnknownPointerType("laser".to_string()));
        assert!(input.pointers().is_empty());
    }

    #[test]
    fn unspecified_type_follows_the_mouse_id() {
        let mut input = fixture(InputConfig::default()).input;
        input.mouse_down(Some(3), LEFT, MouseButton::Primary, &mut ctx());
        input
            .pointer_move(3, &PointerType::Unspecified, RIGHT, &mut ctx())
            .unwrap();
        let mouse = input.pointers().get(input.mouse().unwrap()).unwrap();
        assert_eq!(mouse.point(), Some(RIGHT));

        input
            .pointer_down(9, &PointerType::Unspecified, LEFT, MouseButton::Primary, &mut ctx())
            .unwrap();
        let touch = input.pointers().find_by_id(9).unwrap();
        assert_eq!(input.pointers().get(touch).unwrap().kind(), PointerKind::Touch);
    }

    #[test]
    fn mouse_cancel_is_ignored() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.mouse_down(Some(1), LEFT, MouseButton::Primary, &mut ctx());
        take(&f.log);
        input
            .pointer_cancel(1, &PointerType::Mouse, LEFT, &mut ctx())
            .unwrap();
        assert!(take(&f.log).is_empty());
        assert!(input.pointers().get(input.mouse().unwrap()).unwrap().is_down());
    }

    #[test]
    fn wheel_dispatches_without_transitions() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.wheel(RIGHT, Vec2::new(0.0, 3.0), &mut ctx());
        assert_eq!(take(&f.log), vec![(EventKind::Wheel, vec![f.a, f.b, f.x, f.y])]);
        let mouse = input.pointers().get(input.mouse().unwrap()).unwrap();
        assert_eq!(mouse.wheel_delta(), Vec2::new(0.0, 3.0));
    }

    #[test]
    fn capture_events_use_the_current_path() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.mouse_move(LEFT, &mut ctx());
        take(&f.log);
        input
            .got_pointer_capture(0, &PointerType::Mouse, &mut ctx())
            .unwrap();
        assert_eq!(
            take(&f.log),
            vec![(EventKind::GotPointerCapture, vec![f.a, f.b, f.c])]
        );
    }

    #[test]
    fn accessibility_events_follow_the_mirror() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.scene_mut().set_pickable(f.x, false);
        input.set_accessibility_tree(Mirror {
            trails: vec![
                ("ok".to_string(), Path::from_nodes([f.a, f.b, f.c])),
                ("hidden".to_string(), Path::from_nodes([f.a, f.b, f.x])),
            ],
            element: ElementId(1),
        });

        input.click("ok", &mut ctx());
        assert_eq!(take(&f.log), vec![(EventKind::Click, vec![f.a, f.b, f.c])]);
        let pointer = input.pointers().accessibility().unwrap();
        assert_eq!(
            input.pointers().get(pointer).unwrap().path().nodes(),
            &[f.a, f.b, f.c]
        );

        input.focus_in("hidden", &mut ctx());
        assert_eq!(take(&f.log), vec![(EventKind::FocusIn, Vec::new())]);

        input.change("missing", &mut ctx());
        assert!(take(&f.log).is_empty());
    }

    #[test]
    fn key_events_feed_the_tracker_and_blur_clears_it() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.set_accessibility_tree(Mirror {
            trails: vec![("field".to_string(), Path::from_nodes([f.a, f.b]))],
            element: ElementId(1),
        });
        let key = KeyboardEvent::new("KeyA", Modifiers::empty());

        input.key_down(None, &key, &mut ctx());
        assert!(input.key_state().is_key_down("KeyA"));
        assert!(take(&f.log).is_empty());

        let mut context = ctx();
        input.key_up(Some("field"), &key, &mut context);
        assert_eq!(context.keyboard.as_ref(), Some(&key));
        assert_eq!(take(&f.log), vec![(EventKind::KeyUp, vec![f.a, f.b])]);

        input.key_down(None, &key, &mut ctx());
        input.window_blur(&mut ctx());
        assert!(!input.key_state().keys_are_down());
    }

    #[test]
    fn batched_actions_wait_for_a_gesture_or_flush() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;

        input
            .batch_action(InputAction::MouseMove { point: LEFT }, ctx())
            .unwrap();
        assert!(input.batcher().is_empty());

        input.connect_listeners();
        assert!(input.key_state().is_attached());
        input
            .batch_action(InputAction::MouseMove { point: LEFT }, ctx())
            .unwrap();
        assert_eq!(input.batcher().len(), 1);
        assert!(take(&f.log).is_empty());

        input
            .batch_action(
                InputAction::MouseDown {
                    id: None,
                    point: LEFT,
                    button: MouseButton::Primary,
                },
                ctx(),
            )
            .unwrap();
        assert!(input.batcher().is_empty());
        let seen = kinds(&f.log);
        assert_eq!(seen.first(), Some(&EventKind::Move));
        assert_eq!(seen.last(), Some(&EventKind::Down));

        input
            .batch_action(InputAction::MouseMove { point: RIGHT }, ctx())
            .unwrap();
        input.flush();
        assert!(input.batcher().is_empty());
        assert!(kinds(&f.log).contains(&EventKind::Move));

        input.disconnect_listeners();
        assert!(!input.key_state().is_attached());
    }

    #[test]
    fn listeners_can_queue_events_during_a_flush() {
        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.connect_listeners();
        let batcher = input.batcher();
        let queued = Rc::new(Cell::new(false));
        let once = Rc::clone(&queued);
        input.add_display_listener(listener_fn(
            move |kind, _event: &mut SceneEvent<'_, NodeId>| {
                if kind == EventKind::Down && !once.replace(true) {
                    batcher.push(
                        EventContext::synthetic(),
                        BatchKind::Mouse,
                        |input: &mut Input<NodeId, SceneTree>, context| {
                            input.mouse_move(RIGHT, context);
                        },
                    );
                }
            },
        ));

        input
            .batch_action(
                InputAction::MouseDown {
                    id: None,
                    point: LEFT,
                    button: MouseButton::Primary,
                },
                ctx(),
            )
            .unwrap();
        assert!(queued.get());
        assert!(input.batcher().is_empty());
        let mouse = input.pointers().get(input.mouse().unwrap()).unwrap();
        assert_eq!(mouse.point(), Some(RIGHT));
    }

    #[test]
    fn recorded_actions_replay_identically() {
        let session = [
            InputAction::MouseMove { point: LEFT },
            InputAction::MouseDown {
                id: Some(1),
                point: LEFT,
                button: MouseButton::Primary,
            },
            InputAction::MouseMove { point: RIGHT },
            InputAction::MouseUp {
                point: RIGHT,
                button: MouseButton::Primary,
            },
            InputAction::TouchStart { id: 5, point: LEFT },
            InputAction::TouchEnd { id: 5, point: RIGHT },
            InputAction::WindowBlur,
        ];

        let original = fixture(InputConfig::default());
        let mut input = original.input;
        let recorded: Rc<RefCell<Vec<InputAction>>> = Rc::default();
        let sink = Rc::clone(&recorded);
        input.set_recorder(Some(Box::new(
            move |action: &InputAction, _context: &EventContext| {
                sink.borrow_mut().push(action.clone());
            },
        )));
        for action in &session {
            input.apply(action, &mut ctx()).unwrap();
        }
        assert_eq!(recorded.borrow().as_slice(), &session);

        let replay = fixture(InputConfig::default());
        let mut copy = replay.input;
        for action in recorded.borrow().iter() {
            copy.apply(action, &mut ctx()).unwrap();
        }
        assert_eq!(take(&original.log), take(&replay.log));
    }

    #[test]
    fn validation_exits_removed_nodes() {
        let Fixture {
            mut input,
            log,
            a,
            b,
            c,
            ..
        } = fixture(InputConfig::default());
        input.mouse_move(LEFT, &mut ctx());
        take(&log);

        input.scene_mut().remove(c);
        input.validate_pointers();
        assert_eq!(
            take(&log),
            vec![
                (EventKind::Out, vec![a, b, c]),
                (EventKind::Exit, vec![a, b, c]),
                (EventKind::Over, vec![a, b]),
            ]
        );
        let mouse = input.pointers().get(input.mouse().unwrap()).unwrap();
        assert_eq!(mouse.path().nodes(), &[a, b]);
    }

    #[test]
    fn temporary_pointers_exit_before_removal() {
        let Fixture {
            mut input,
            log,
            a,
            b,
            c,
            ..
        } = fixture(InputConfig::default());
        input.touch_start(1, LEFT, &mut ctx());
        input.mouse_move(RIGHT, &mut ctx());
        take(&log);

        input.remove_temporary_pointers();
        assert_eq!(
            take(&log),
            vec![
                (EventKind::Out, vec![a, b, c]),
                (EventKind::Exit, vec![a, b, c]),
                (EventKind::Exit, vec![a, b]),
                (EventKind::Exit, vec![a]),
            ]
        );
        assert_eq!(input.pointers().len(), 1);
        assert!(input.mouse().is_some());
    }

    #[test]
    fn clearing_batched_events_interrupts_and_drops() {
        struct Drag(Rc<Cell<u32>>);
        impl InputListener<NodeId> for Drag {
            fn interrupt(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let f = fixture(InputConfig::default());
        let mut input = f.input;
        input.connect_listeners();
        input.touch_start(2, LEFT, &mut ctx());
        let interrupts = Rc::new(Cell::new(0));
        let handle = input.pointers().find_by_id(2).unwrap();
        let drag: ListenerRef<NodeId> = Rc::new(RefCell::new(Drag(Rc::clone(&interrupts))));
        input
            .pointers_mut()
            .get_mut(handle)
            .unwrap()
            .add_listener(drag, true);

        input
            .batch_action(InputAction::TouchMove { id: 2, point: RIGHT }, ctx())
            .unwrap();
        assert_eq!(input.batcher().len(), 1);

        input.clear_batched_events();
        assert_eq!(interrupts.get(), 1);
        assert!(input.batcher().is_empty());
        assert!(input.pointers().is_empty());
    }

    fn watch(input: &mut Input<NodeId, SceneTree>, node: NodeId) -> Rc<RefCell<Vec<EventKind>>> {
        let seen: Rc<RefCell<Vec<EventKind>>> = Rc::default();
        let sink = Rc::clone(&seen);
        input.scene_mut().add_listener(
            node,
            listener_fn(move |kind, _: &mut SceneEvent<'_, NodeId>| sink.borrow_mut().push(kind)),
        );
        seen
    }

    fn count(seen: &Rc<RefCell<Vec<EventKind>>>, kind: EventKind) -> usize {
        seen.borrow().iter().filter(|k| **k == kind).count()
    }

    #[test]
    fn hovered_node_that_loses_input_still_exits() {
        let Fixture { mut input, c, .. } = fixture(InputConfig::default());
        let seen = watch(&mut input, c);
        input.mouse_move(LEFT, &mut ctx());
        input.scene_mut().set_input_enabled(c, false);

        input.mouse_move(Point::new(30.0, 30.0), &mut ctx());
        input.mouse_move(RIGHT, &mut ctx());
        assert_eq!(
            *seen.borrow(),
            [
                EventKind::Move,
                EventKind::Enter,
                EventKind::Over,
                EventKind::Out,
                EventKind::Exit,
            ]
        );
        assert_eq!(count(&seen, EventKind::Enter), count(&seen, EventKind::Exit));
    }

    #[test]
    fn disabling_an_ancestor_exits_the_hovered_branch() {
        let Fixture {
            mut input,
            log,
            a,
            b,
            c,
            ..
        } = fixture(InputConfig::default());
        let seen_b = watch(&mut input, b);
        let seen_c = watch(&mut input, c);
        input.mouse_move(LEFT, &mut ctx());
        take(&log);

        input.scene_mut().set_input_enabled(b, false);
        input.mouse_move(Point::new(30.0, 30.0), &mut ctx());
        assert_eq!(
            take(&log),
            vec![
                (EventKind::Move, vec![a, b, c]),
                (EventKind::Out, vec![a, b, c]),
                (EventKind::Exit, vec![a, b, c]),
                (EventKind::Exit, vec![a, b]),
                (EventKind::Over, vec![a]),
            ]
        );
        for seen in [&seen_b, &seen_c] {
            assert_eq!(count(seen, EventKind::Enter), 1);
            assert_eq!(count(seen, EventKind::Exit), 1);
        }
    }

    #[test]
    fn lifted_touch_exits_a_disabled_node_once() {
        let Fixture { mut input, c, .. } = fixture(InputConfig::default());
        let seen = watch(&mut input, c);
        input.touch_start(1, LEFT, &mut ctx());
        input.scene_mut().set_input_enabled(c, false);
        input.touch_end(1, LEFT, &mut ctx());

        assert_eq!(count(&seen, EventKind::Enter), 1);
        assert_eq!(count(&seen, EventKind::Exit), 1);
        assert_eq!(count(&seen, EventKind::Up), 0);
        assert!(input.pointers().is_empty());
    }

    #[test]
    fn node_removed_under_the_mouse_exits_on_the_next_move() {
        let Fixture {
            mut input,
            log,
            a,
            b,
            c,
            x,
            y,
        } = fixture(InputConfig::default());
        input.mouse_move(LEFT, &mut ctx());
        take(&log);

        input.scene_mut().remove(c);
        input.mouse_move(RIGHT, &mut ctx());
        assert_eq!(
            take(&log),
            vec![
                (EventKind::Move, vec![a, b, x, y]),
                (EventKind::Out, vec![a, b, c]),
                (EventKind::Exit, vec![a, b, c]),
                (EventKind::Enter, vec![a, b, x]),
                (EventKind::Enter, vec![a, b, x, y]),
                (EventKind::Over, vec![a, b, x, y]),
            ]
        );
        let mouse = input.pointers().get(input.mouse().unwrap()).unwrap();
        assert_eq!(mouse.input_enabled_path().nodes(), &[a, b, x, y]);
    }

    #[test]
    fn node_listener_attaches_to_the_pointer_on_down() {
        struct Drag(Rc<RefCell<Vec<EventKind>>>);

        impl InputListener<NodeId> for Drag {
            fn on_pointer_event(
                &mut self,
                _: PointerKind,
                kind: EventKind,
                _: &mut SceneEvent<'_, NodeId>,
            ) {
                self.0.borrow_mut().push(kind);
            }
        }

        let Fixture { mut input, c, .. } = fixture(InputConfig::default());
        let dragged: Rc<RefCell<Vec<EventKind>>> = Rc::default();
        let sink = Rc::clone(&dragged);
        input.scene_mut().add_listener(
            c,
            listener_fn(move |kind, event: &mut SceneEvent<'_, NodeId>| {
                if kind == EventKind::Down {
                    event.add_pointer_listener(Rc::new(RefCell::new(Drag(Rc::clone(&sink)))), true);
                }
            }),
        );

        input.mouse_move(LEFT, &mut ctx());
        input.mouse_down(None, LEFT, MouseButton::Primary, &mut ctx());
        let mouse = input.pointers().get(input.mouse().unwrap()).unwrap();
        assert!(mouse.is_attached());
        assert_eq!(mouse.listeners().len(), 1);
        assert!(dragged.borrow().is_empty(), "the down that attached it is not replayed");

        input.mouse_move(Point::new(30.0, 30.0), &mut ctx());
        assert_eq!(*dragged.borrow(), [EventKind::Move]);
    }
}
