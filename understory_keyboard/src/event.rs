// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard event payloads consumed by the tracker.

use alloc::string::String;

bitflags::bitflags! {
    /// Modifier state reported alongside a keyboard (or pointer) event.
    ///
    /// These are the flags the platform claims are held, which is not always
    /// consistent with the discrete key events that were delivered.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Either shift key is held.
        const SHIFT   = 0b0000_0001;
        /// Either alt (option) key is held.
        const ALT     = 0b0000_0010;
        /// Either control key is held.
        const CONTROL = 0b0000_0100;
        /// Either meta (command / windows) key is held.
        const META    = 0b0000_1000;
    }
}

/// A physical key press or release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// Physical key code, e.g. `"KeyA"` or `"ShiftLeft"`.
    pub code: String,
    /// Modifier flags reported with the event.
    pub modifiers: Modifiers,
    /// True if this is an auto-repeat of a held key.
    pub repeat: bool,
}

impl KeyboardEvent {
    /// Create an event for `code` with the given modifier flags.
    pub fn new(code: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            code: code.into(),
            modifiers,
            repeat: false,
        }
    }

    /// Returns true if the event claims shift is held.
    #[inline]
    pub fn shift_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Returns true if the event claims alt is held.
    #[inline]
    pub fn alt_key(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Returns true if the event claims control is held.
    #[inline]
    pub fn ctrl_key(&self) -> bool {
        self.modifiers.contains(Modifiers::CONTROL)
    }

    /// Returns true if the event claims meta is held.
    #[inline]
    pub fn meta_key(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }
}
