// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer registry: owns every live pointer behind generational handles.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::pointer::{Pointer, PointerId, PointerKind};

/// Handle to a pointer in a [`PointerRegistry`].
///
/// A slot index plus a generation, in the same scheme as scene node ids:
/// once the pointer is removed the handle goes stale and every registry
/// operation on it is a no-op, even if the slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PointerHandle(u32, u32);

impl PointerHandle {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

type PointerCallback<K> = Box<dyn FnMut(PointerHandle, &Pointer<K>)>;

/// Owns the live pointers in insertion order.
pub struct PointerRegistry<K> {
    slots: Vec<Option<Pointer<K>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    order: Vec<PointerHandle>,
    mouse: Option<PointerHandle>,
    accessibility: Option<PointerHandle>,
    added: Vec<PointerCallback<K>>,
    removed: Vec<PointerCallback<K>>,
}

impl<K> fmt::Debug for PointerRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerRegistry")
            .field("live", &self.order.len())
            .field("free_list", &self.free_list.len())
            .field("mouse", &self.mouse)
            .field("accessibility", &self.accessibility)
            .finish_non_exhaustive()
    }
}

impl<K> Default for PointerRegistry<K> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            mouse: None,
            accessibility: None,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> PointerRegistry<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `pointer`, append it, and notify `added` subscribers.
    pub fn add_pointer(&mut self, pointer: Pointer<K>) -> PointerHandle {
        let kind = pointer.kind();
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(pointer);
            (idx, generation)
        } else {
            self.slots.push(Some(pointer));
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "PointerHandle uses 32-bit indices by design."
        )]
        let handle = PointerHandle(idx as u32, generation);
        self.order.push(handle);
        match kind {
            PointerKind::Mouse => self.mouse = Some(handle),
            PointerKind::Accessibility => self.accessibility = Some(handle),
            PointerKind::Touch | PointerKind::Pen => {}
        }
        log::debug!("pointer added: {} {:?}", kind.as_str(), handle);
        if let Some(pointer) = self.slots[idx].as_ref() {
            for callback in &mut self.added {
                callback(handle, pointer);
            }
        }
        handle
    }

    /// Remove and dispose the pointer behind `handle`.
    ///
    /// Returns false, doing nothing, if the handle is already stale, so
    /// redundant removals are harmless and `removed` fires once per pointer.
    pub fn remove_pointer(&mut self, handle: PointerHandle) -> bool {
        if !self.is_alive(handle) {
            return false;
        }
        let Some(mut pointer) = self.slots[handle.idx()].take() else {
            return false;
        };
        self.order.retain(|h| *h != handle);
        self.free_list.push(handle.idx());
        if self.mouse == Some(handle) {
            self.mouse = None;
        }
        if self.accessibility == Some(handle) {
            self.accessibility = None;
        }
        pointer.dispose();
        log::debug!("pointer removed: {} {:?}", pointer.kind().as_str(), handle);
        for callback in &mut self.removed {
            callback(handle, &pointer);
        }
        true
    }

    /// Returns true if `handle` refers to a live pointer.
    pub fn is_alive(&self, handle: PointerHandle) -> bool {
        self.slots
            .get(handle.idx())
            .and_then(|slot| slot.as_ref())
            .is_some()
            && self.generations[handle.idx()] == handle.1
    }

    /// The pointer behind `handle`, if live.
    pub fn get(&self, handle: PointerHandle) -> Option<&Pointer<K>> {
        if !self.is_alive(handle) {
            return None;
        }
        self.slots[handle.idx()].as_ref()
    }

    /// Mutable access to the pointer behind `handle`, if live.
    pub fn get_mut(&mut self, handle: PointerHandle) -> Option<&mut Pointer<K>> {
        if !self.is_alive(handle) {
            return None;
        }
        self.slots[handle.idx()].as_mut()
    }

    /// Most recently added live pointer with the platform id `id`.
    ///
    /// Scans from the end; recent pointers are the likely match.
    pub fn find_by_id(&self, id: PointerId) -> Option<PointerHandle> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|h| self.get(*h).is_some_and(|p| p.id() == Some(id)))
    }

    /// Live handles in insertion order.
    pub fn handles(&self) -> &[PointerHandle] {
        &self.order
    }

    /// Live pointers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PointerHandle, &Pointer<K>)> + '_ {
        self.order
            .iter()
            .filter_map(|h| self.get(*h).map(|p| (*h, p)))
    }

    /// The mouse pointer, once created.
    pub fn mouse(&self) -> Option<PointerHandle> {
        self.mouse
    }

    /// The accessibility pointer, once created.
    pub fn accessibility(&self) -> Option<PointerHandle> {
        self.accessibility
    }

    /// Number of live pointers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no pointer is live.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Call `f` after every pointer is added.
    pub fn on_pointer_added(&mut self, f: impl FnMut(PointerHandle, &Pointer<K>) + 'static) {
        self.added.push(Box::new(f));
    }

    /// Call `f` after every pointer is removed, with the disposed pointer.
    pub fn on_pointer_removed(&mut self, f: impl FnMut(PointerHandle, &Pointer<K>) + 'static) {
        self.removed.push(Box::new(f));
    }
}
