// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The key state tracker: which physical keys are down, and for how long.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::codes;
use crate::event::KeyboardEvent;

/// Bookkeeping for one key that is currently down.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyState {
    /// The physical key code.
    pub code: String,
    /// Milliseconds this key has been held, accumulated by [`KeyStateTracker::step`].
    pub time_down_ms: f64,
}

/// Tracker configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyStateConfig {
    /// Clear all state on any key release while a meta modifier is held.
    ///
    /// macOS suppresses key-up events for keys released while command is held,
    /// so incremental removal would leave those keys stuck down.
    pub clear_on_meta_keyup: bool,
}

impl Default for KeyStateConfig {
    fn default() -> Self {
        Self {
            clear_on_meta_keyup: cfg!(target_os = "macos"),
        }
    }
}

/// Handle returned by the `on_*` subscription methods, used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type KeyCallback = Box<dyn FnMut(&KeyboardEvent)>;
type StateCallback = Box<dyn FnMut(Option<&KeyboardEvent>)>;

/// Tracks which keyboard codes are down and reconciles modifier state.
///
/// ## State
///
/// A code is present in the tracker if and only if that key is currently
/// considered down. Entries are created on key-down, accumulate time in
/// [`step`](Self::step), and are removed on key-up or [`clear_state`](Self::clear_state).
///
/// ## Modifier correction
///
/// Platforms do not reliably deliver discrete down/up events for shift, alt,
/// control and meta when they are combined with other keys. Every update
/// therefore cross-checks the modifier flags on the event against the tracked
/// codes:
///
/// - A flag that is set with no tracked code for that modifier injects the
///   left-hand code with zero down time.
/// - A flag that is clear while the modifier is still tracked removes both the
///   left and right codes.
///
/// Any correction emits a state-changed notification.
pub struct KeyStateTracker {
    keys: BTreeMap<String, KeyState>,
    enabled: bool,
    attached: bool,
    config: KeyStateConfig,
    next_subscription: u64,
    keydown: Vec<(SubscriptionId, KeyCallback)>,
    keyup: Vec<(SubscriptionId, KeyCallback)>,
    state_changed: Vec<(SubscriptionId, StateCallback)>,
}

impl core::fmt::Debug for KeyStateTracker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyStateTracker")
            .field("keys", &self.keys)
            .field("enabled", &self.enabled)
            .field("attached", &self.attached)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for KeyStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStateTracker {
    /// Create an enabled tracker with the default configuration.
    pub fn new() -> Self {
        Self::with_config(KeyStateConfig::default())
    }

    /// Create an enabled tracker with an explicit configuration.
    pub fn with_config(config: KeyStateConfig) -> Self {
        Self {
            keys: BTreeMap::new(),
            enabled: true,
            attached: false,
            config,
            next_subscription: 0,
            keydown: Vec::new(),
            keyup: Vec::new(),
            state_changed: Vec::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> KeyStateConfig {
        self.config
    }

    /// Record a key press.
    ///
    /// A key that is already down keeps its accumulated time. No-op while disabled.
    pub fn keydown_update(&mut self, event: &KeyboardEvent) {
        if !self.enabled {
            return;
        }
        debug_assert!(!event.code.is_empty(), "keyboard event without a code");

        self.correct_modifier_keys(event);

        if !self.is_key_down(&event.code) {
            self.keys.insert(
                event.code.clone(),
                KeyState {
                    code: event.code.clone(),
                    time_down_ms: 0.0,
                },
            );
        }

        for (_, cb) in &mut self.keydown {
            cb(event);
        }
        self.emit_state_changed(Some(event));
    }

    /// Record a key release.
    ///
    /// A release for a key that was never seen going down is tolerated; that
    /// happens routinely when focus arrives with a key already held.
    /// No-op while disabled.
    pub fn keyup_update(&mut self, event: &KeyboardEvent) {
        if !self.enabled {
            return;
        }
        debug_assert!(!event.code.is_empty(), "keyboard event without a code");

        let meta_held = self.meta_down();
        self.correct_modifier_keys(event);
        self.keys.remove(event.code.as_str());

        // No further key-up is guaranteed for keys pressed while meta was
        // held on this platform, including the release of meta itself.
        if self.config.clear_on_meta_keyup && meta_held {
            self.clear_state(true);
        }

        for (_, cb) in &mut self.keyup {
            cb(event);
        }
        self.emit_state_changed(Some(event));
    }

    /// Reconcile tracked modifier codes with the flags carried on `event`.
    ///
    /// Returns true if anything changed.
    fn correct_modifier_keys(&mut self, event: &KeyboardEvent) -> bool {
        let code = event.code.as_str();
        let mut changed = false;

        let corrections: [(bool, fn(&str) -> bool, [&str; 2]); 4] = [
            (event.shift_key(), codes::is_shift_key, codes::SHIFT_KEYS),
            (event.alt_key(), codes::is_alt_key, codes::ALT_KEYS),
            (event.ctrl_key(), codes::is_control_key, codes::CONTROL_KEYS),
            (event.meta_key(), codes::is_meta_key, codes::META_KEYS),
        ];

        for (held, is_this_modifier, [left, right]) in corrections {
            let tracked = self.is_any_key_in_list_down(&[left, right]);
            if held && !is_this_modifier(code) && !tracked {
                self.keys.insert(
                    String::from(left),
                    KeyState {
                        code: String::from(left),
                        time_down_ms: 0.0,
                    },
                );
                changed = true;
            }
            if !held && tracked {
                self.keys.remove(left);
                self.keys.remove(right);
                changed = true;
            }
        }

        if changed {
            log::trace!("corrected modifier state from `{code}` flags");
            self.emit_state_changed(Some(event));
        }
        changed
    }

    /// Advance down-time for every held key by `dt_ms` milliseconds.
    ///
    /// Driven by an external timer. No-op when no keys are down.
    pub fn step(&mut self, dt_ms: f64) {
        if !self.keys_are_down() {
            return;
        }
        for state in self.keys.values_mut() {
            state.time_down_ms += dt_ms;
        }
    }

    /// Forget every key.
    ///
    /// Emits one state-changed notification with no event unless `skip_notify` is set.
    pub fn clear_state(&mut self, skip_notify: bool) {
        self.keys.clear();
        if !skip_notify {
            self.emit_state_changed(None);
        }
    }

    /// Enable or disable tracking. Disabling clears all state immediately.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            if !enabled {
                self.clear_state(false);
            }
        }
    }

    /// Whether updates are being recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mark the tracker as attached to window-level key events.
    ///
    /// Attaching twice is a contract violation.
    pub fn attach(&mut self) {
        debug_assert!(!self.attached, "KeyStateTracker is already attached");
        self.attached = true;
    }

    /// Mark the tracker as detached from window-level key events.
    ///
    /// Detaching without a prior attach is a contract violation.
    pub fn detach(&mut self) {
        debug_assert!(self.attached, "KeyStateTracker is not attached");
        self.attached = false;
    }

    /// Whether [`attach`](Self::attach) is in effect.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns true if `code` is currently down.
    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys.contains_key(code)
    }

    /// Returns true if any key in `codes` is down.
    pub fn is_any_key_in_list_down(&self, codes: &[&str]) -> bool {
        codes.iter().any(|code| self.is_key_down(code))
    }

    /// Returns true if every key in `codes` is down.
    pub fn are_keys_down(&self, codes: &[&str]) -> bool {
        for code in codes {
            if !self.is_key_down(code) {
                return false;
            }
        }
        true
    }

    /// Returns true if exactly the keys in `codes` are down, and nothing else.
    pub fn are_keys_exclusively_down(&self, codes: &[&str]) -> bool {
        self.keys.len() == codes.len() && self.are_keys_down(codes)
    }

    /// Returns true if any key is down.
    pub fn keys_are_down(&self) -> bool {
        !self.keys.is_empty()
    }

    /// The codes currently down, in code order.
    pub fn keys_down(&self) -> Vec<&str> {
        self.keys.keys().map(String::as_str).collect()
    }

    /// Milliseconds `code` has been held.
    ///
    /// The key must be down; check [`is_key_down`](Self::is_key_down) first.
    pub fn time_down_for_key(&self, code: &str) -> f64 {
        debug_assert!(
            self.is_key_down(code),
            "cannot get time down for a key that is not down"
        );
        self.keys.get(code).map_or(0.0, |state| state.time_down_ms)
    }

    /// Either shift key is down.
    pub fn shift_down(&self) -> bool {
        self.is_any_key_in_list_down(&codes::SHIFT_KEYS)
    }

    /// Either alt key is down.
    pub fn alt_down(&self) -> bool {
        self.is_any_key_in_list_down(&codes::ALT_KEYS)
    }

    /// Either control key is down.
    pub fn ctrl_down(&self) -> bool {
        self.is_any_key_in_list_down(&codes::CONTROL_KEYS)
    }

    /// Either meta key is down.
    pub fn meta_down(&self) -> bool {
        self.is_any_key_in_list_down(&codes::META_KEYS)
    }

    /// An arrow or WASD key is down.
    pub fn movement_keys_down(&self) -> bool {
        self.is_any_key_in_list_down(&codes::MOVEMENT_KEYS)
    }

    /// Subscribe to key presses (after the state has been updated).
    pub fn on_keydown(&mut self, cb: impl FnMut(&KeyboardEvent) + 'static) -> SubscriptionId {
        let id = self.next_id();
        self.keydown.push((id, Box::new(cb)));
        id
    }

    /// Subscribe to key releases (after the state has been updated).
    pub fn on_keyup(&mut self, cb: impl FnMut(&KeyboardEvent) + 'static) -> SubscriptionId {
        let id = self.next_id();
        self.keyup.push((id, Box::new(cb)));
        id
    }

    /// Subscribe to any change of the down set.
    ///
    /// The payload is the event that caused the change, or `None` for
    /// [`clear_state`](Self::clear_state).
    pub fn on_state_changed(
        &mut self,
        cb: impl FnMut(Option<&KeyboardEvent>) + 'static,
    ) -> SubscriptionId {
        let id = self.next_id();
        self.state_changed.push((id, Box::new(cb)));
        id
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.keydown.retain(|(sid, _)| *sid != id);
        self.keyup.retain(|(sid, _)| *sid != id);
        self.state_changed.retain(|(sid, _)| *sid != id);
    }

    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        id
    }

    fn emit_state_changed(&mut self, event: Option<&KeyboardEvent>) {
        for (_, cb) in &mut self.state_changed {
            cb(event);
        }
    }
}
