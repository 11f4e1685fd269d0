// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Physical key codes used by the tracker.
//!
//! Codes follow the `KeyboardEvent.code` naming from W3C UI Events
//! (`"ShiftLeft"`, `"KeyW"`, `"ArrowUp"`, ...). Only the codes the tracker has
//! to reason about are named here; any other code string is tracked verbatim.

/// Left shift key.
pub const SHIFT_LEFT: &str = "ShiftLeft";
/// Right shift key.
pub const SHIFT_RIGHT: &str = "ShiftRight";
/// Left alt (option) key.
pub const ALT_LEFT: &str = "AltLeft";
/// Right alt (option) key.
pub const ALT_RIGHT: &str = "AltRight";
/// Left control key.
pub const CONTROL_LEFT: &str = "ControlLeft";
/// Right control key.
pub const CONTROL_RIGHT: &str = "ControlRight";
/// Left meta (command / windows) key.
pub const META_LEFT: &str = "MetaLeft";
/// Right meta (command / windows) key.
pub const META_RIGHT: &str = "MetaRight";

/// Arrow up.
pub const ARROW_UP: &str = "ArrowUp";
/// Arrow down.
pub const ARROW_DOWN: &str = "ArrowDown";
/// Arrow left.
pub const ARROW_LEFT: &str = "ArrowLeft";
/// Arrow right.
pub const ARROW_RIGHT: &str = "ArrowRight";
/// The `W` key.
pub const KEY_W: &str = "KeyW";
/// The `A` key.
pub const KEY_A: &str = "KeyA";
/// The `S` key.
pub const KEY_S: &str = "KeyS";
/// The `D` key.
pub const KEY_D: &str = "KeyD";
/// The tab key.
pub const TAB: &str = "Tab";
/// The escape key.
pub const ESCAPE: &str = "Escape";

/// Both shift variants, left first.
pub const SHIFT_KEYS: [&str; 2] = [SHIFT_LEFT, SHIFT_RIGHT];
/// Both alt variants, left first.
pub const ALT_KEYS: [&str; 2] = [ALT_LEFT, ALT_RIGHT];
/// Both control variants, left first.
pub const CONTROL_KEYS: [&str; 2] = [CONTROL_LEFT, CONTROL_RIGHT];
/// Both meta variants, left first.
pub const META_KEYS: [&str; 2] = [META_LEFT, META_RIGHT];

/// Arrow keys.
pub const ARROW_KEYS: [&str; 4] = [ARROW_UP, ARROW_DOWN, ARROW_LEFT, ARROW_RIGHT];
/// WASD keys.
pub const WASD_KEYS: [&str; 4] = [KEY_W, KEY_A, KEY_S, KEY_D];
/// Keys commonly used to move things around: arrows and WASD.
pub const MOVEMENT_KEYS: [&str; 8] = [
    ARROW_UP,
    ARROW_DOWN,
    ARROW_LEFT,
    ARROW_RIGHT,
    KEY_W,
    KEY_A,
    KEY_S,
    KEY_D,
];

/// Returns true if `code` is either shift key.
pub fn is_shift_key(code: &str) -> bool {
    SHIFT_KEYS.contains(&code)
}

/// Returns true if `code` is either alt key.
pub fn is_alt_key(code: &str) -> bool {
    ALT_KEYS.contains(&code)
}

/// Returns true if `code` is either control key.
pub fn is_control_key(code: &str) -> bool {
    CONTROL_KEYS.contains(&code)
}

/// Returns true if `code` is either meta key.
pub fn is_meta_key(code: &str) -> bool {
    META_KEYS.contains(&code)
}

/// Returns true if `code` is any of the modifier keys.
pub fn is_modifier_key(code: &str) -> bool {
    is_shift_key(code) || is_alt_key(code) || is_control_key(code) || is_meta_key(code)
}
