// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Keyboard: a `no_std` tracker for which keys are currently held.
//!
//! ## Overview
//!
//! [`KeyStateTracker`] turns a stream of key-down / key-up events into a set of
//! held physical key codes, each with an accumulated down time.
//! It is deliberately forgiving: releases without a matching press are ignored,
//! and modifier keys are reconciled against the modifier flags carried on every
//! event, because platforms routinely drop discrete modifier events when they are
//! chorded with other keys.
//!
//! Time only advances when the host calls [`KeyStateTracker::step`]; the tracker
//! owns no timers.
//!
//! ## Example
//!
//! ```
//! use understory_keyboard::{KeyStateTracker, KeyboardEvent, Modifiers, codes};
//!
//! let mut keys = KeyStateTracker::new();
//!
//! // The platform never told us shift went down, but the flag says it is held.
//! keys.keydown_update(&KeyboardEvent::new("KeyA", Modifiers::SHIFT));
//! assert!(keys.is_key_down("KeyA"));
//! assert!(keys.is_key_down(codes::SHIFT_LEFT));
//!
//! keys.step(16.0);
//! assert_eq!(keys.time_down_for_key("KeyA"), 16.0);
//!
//! // Shift released without a key-up of its own: both shift codes are dropped.
//! keys.keyup_update(&KeyboardEvent::new("KeyA", Modifiers::empty()));
//! assert!(!keys.shift_down());
//! assert!(!keys.keys_are_down());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod codes;
mod event;
mod tracker;

pub use event::{KeyboardEvent, Modifiers};
pub use tracker::{KeyState, KeyStateConfig, KeyStateTracker, SubscriptionId};
