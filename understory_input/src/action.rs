// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recordable input actions.
//!
//! Every entry point of [`Input`](crate::Input) has an [`InputAction`]
//! counterpart. [`Input::apply`](crate::Input::apply) hands the action to an
//! optional [`ActionRecorder`] and then runs the plain entry point, so a
//! recorded session can be replayed into a fresh engine.

use alloc::string::String;

use kurbo::{Point, Vec2};
use understory_keyboard::KeyboardEvent;

use crate::batch::BatchKind;
use crate::event::EventContext;
use crate::pointer::{MouseButton, PointerId, PointerType};

/// One entry-point invocation and its arguments.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs, reason = "fields mirror the entry point arguments")]
pub enum InputAction {
    MouseDown { id: Option<PointerId>, point: Point, button: MouseButton },
    MouseUp { point: Point, button: MouseButton },
    MouseMove { point: Point },
    MouseOver { point: Point },
    MouseOut { point: Point },
    Wheel { point: Point, delta: Vec2 },
    TouchStart { id: PointerId, point: Point },
    TouchEnd { id: PointerId, point: Point },
    TouchMove { id: PointerId, point: Point },
    TouchCancel { id: PointerId, point: Point },
    PenStart { id: PointerId, point: Point },
    PenEnd { id: PointerId, point: Point },
    PenMove { id: PointerId, point: Point },
    PenCancel { id: PointerId, point: Point },
    PointerDown { id: PointerId, pointer_type: PointerType, point: Point, button: MouseButton },
    PointerUp { id: PointerId, pointer_type: PointerType, point: Point, button: MouseButton },
    PointerCancel { id: PointerId, pointer_type: PointerType, point: Point },
    PointerMove { id: PointerId, pointer_type: PointerType, point: Point },
    PointerOver { id: PointerId, pointer_type: PointerType, point: Point },
    PointerOut { id: PointerId, pointer_type: PointerType, point: Point },
    GotPointerCapture { id: PointerId, pointer_type: PointerType },
    LostPointerCapture { id: PointerId, pointer_type: PointerType },
    FocusIn { unique_id: String },
    FocusOut { unique_id: String },
    Click { unique_id: String },
    TextInput { unique_id: String },
    Change { unique_id: String },
    KeyDown { unique_id: Option<String>, event: KeyboardEvent },
    KeyUp { unique_id: Option<String>, event: KeyboardEvent },
    WindowBlur,
}

impl InputAction {
    /// Entry point name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MouseDown { .. } => "mouse_down",
            Self::MouseUp { .. } => "mouse_up",
            Self::MouseMove { .. } => "mouse_move",
            Self::MouseOver { .. } => "mouse_over",
            Self::MouseOut { .. } => "mouse_out",
            Self::Wheel { .. } => "wheel",
            Self::TouchStart { .. } => "touch_start",
            Self::TouchEnd { .. } => "touch_end",
            Self::TouchMove { .. } => "touch_move",
            Self::TouchCancel { .. } => "touch_cancel",
            Self::PenStart { .. } => "pen_start",
            Self::PenEnd { .. } => "pen_end",
            Self::PenMove { .. } => "pen_move",
            Self::PenCancel { .. } => "pen_cancel",
            Self::PointerDown { .. } => "pointer_down",
            Self::PointerUp { .. } => "pointer_up",
            Self::PointerCancel { .. } => "pointer_cancel",
            Self::PointerMove { .. } => "pointer_move",
            Self::PointerOver { .. } => "pointer_over",
            Self::PointerOut { .. } => "pointer_out",
            Self::GotPointerCapture { .. } => "got_pointer_capture",
            Self::LostPointerCapture { .. } => "lost_pointer_capture",
            Self::FocusIn { .. } => "focus_in",
            Self::FocusOut { .. } => "focus_out",
            Self::Click { .. } => "click",
            Self::TextInput { .. } => "text_input",
            Self::Change { .. } => "change",
            Self::KeyDown { .. } => "key_down",
            Self::KeyUp { .. } => "key_up",
            Self::WindowBlur => "window_blur",
        }
    }

    /// Category used when the action is batched.
    pub fn batch_kind(&self) -> BatchKind {
        match self {
            Self::MouseDown { .. }
            | Self::MouseUp { .. }
            | Self::MouseMove { .. }
            | Self::MouseOver { .. }
            | Self::MouseOut { .. } => BatchKind::Mouse,
            Self::Wheel { .. } => BatchKind::Wheel,
            Self::TouchStart { .. }
            | Self::TouchEnd { .. }
            | Self::TouchMove { .. }
            | Self::TouchCancel { .. } => BatchKind::Touch,
            Self::PenStart { .. }
            | Self::PenEnd { .. }
            | Self::PenMove { .. }
            | Self::PenCancel { .. }
            | Self::PointerDown { .. }
            | Self::PointerUp { .. }
            | Self::PointerCancel { .. }
            | Self::PointerMove { .. }
            | Self::PointerOver { .. }
            | Self::PointerOut { .. }
            | Self::GotPointerCapture { .. }
            | Self::LostPointerCapture { .. } => BatchKind::Pointer,
            Self::FocusIn { .. }
            | Self::FocusOut { .. }
            | Self::Click { .. }
            | Self::TextInput { .. }
            | Self::Change { .. }
            | Self::KeyDown { .. }
            | Self::KeyUp { .. } => BatchKind::Alt,
            Self::WindowBlur => BatchKind::Keyboard,
        }
    }

    /// Whether batching this action flushes the queue at once.
    ///
    /// True for user-gesture actions, whose platform side effects (focus,
    /// clipboard, fullscreen) are only honoured synchronously.
    pub fn triggers_immediate(&self) -> bool {
        matches!(
            self,
            Self::MouseDown { .. }
                | Self::MouseUp { .. }
                | Self::TouchStart { .. }
                | Self::TouchEnd { .. }
                | Self::PenStart { .. }
                | Self::PenEnd { .. }
                | Self::PointerDown { .. }
                | Self::PointerUp { .. }
                | Self::Click { .. }
                | Self::KeyDown { .. }
                | Self::KeyUp { .. }
        )
    }

    /// The raw pointer type, for unified pointer actions.
    pub fn pointer_type(&self) -> Option<&PointerType> {
        match self {
            Self::PointerDown { pointer_type, .. }
            | Self::PointerUp { pointer_type, .. }
            | Self::PointerCancel { pointer_type, .. }
            | Self::PointerMove { pointer_type, .. }
            | Self::PointerOver { pointer_type, .. }
            | Self::PointerOut { pointer_type, .. }
            | Self::GotPointerCapture { pointer_type, .. }
            | Self::LostPointerCapture { pointer_type, .. } => Some(pointer_type),
            _ => None,
        }
    }
}

/// Receives every action applied through [`Input::apply`](crate::Input::apply).
///
/// The context is captured before the action runs.
pub trait ActionRecorder {
    /// Record one action.
    fn record(&mut self, action: &InputAction, context: &EventContext);
}

impl<F: FnMut(&InputAction, &EventContext)> ActionRecorder for F {
    fn record(&mut self, action: &InputAction, context: &EventContext) {
        self(action, context);
    }
}
