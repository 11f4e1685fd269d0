// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small retained scene for hosts without their own scene graph.
//!
//! Nodes carry world-space bounds, a z-index, flags and listeners. Hit testing
//! is a flat scan: among live nodes containing the point whose whole ancestor
//! chain is visible and pickable, the highest z-index wins, and ties go to the
//! newer [`NodeId`].

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect};

use crate::listener::ListenerRef;
use crate::path::Path;
use crate::pointer::PointerKind;
use crate::scene::Scene;

/// Identifier for a node in a [`SceneTree`].
///
/// A slot index plus a generation. Removing a node makes its id stale, and a
/// stale id never aliases a node inserted later into the same slot. The
/// engine reports stale ids as disposed.
///
/// An id is newer than another when its generation is higher, or, for equal
/// generations, when its slot index is higher.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
    const fn idx(self) -> usize {
        self.0 as usize
    }

    fn is_newer_than(self, other: Self) -> bool {
        (self.1 > other.1) || (self.1 == other.1 && self.0 > other.0)
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility, picking and input.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible.
        const VISIBLE       = 0b0000_0001;
        /// Node can be hit.
        const PICKABLE      = 0b0000_0010;
        /// Node and its subtree receive input.
        const INPUT_ENABLED = 0b0000_0100;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE | Self::INPUT_ENABLED
    }
}

struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bounds: Rect,
    z_index: i32,
    flags: NodeFlags,
    listeners: Vec<ListenerRef<NodeId>>,
}

impl Node {
    fn new(generation: u32, parent: Option<NodeId>, bounds: Rect) -> Self {
        Self {
            generation,
            parent,
            children: Vec::new(),
            bounds,
            z_index: 0,
            flags: NodeFlags::default(),
            listeners: Vec::new(),
        }
    }
}

/// Retained tree with a single root.
pub struct SceneTree {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
}

impl fmt::Debug for SceneTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let live = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("SceneTree")
            .field("root", &self.root)
            .field("live", &live)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl SceneTree {
    /// Create a tree whose root covers `bounds`.
    pub fn new(bounds: Rect) -> Self {
        Self {
            nodes: alloc::vec![Some(Node::new(1, None, bounds))],
            generations: alloc::vec![1],
            free_list: Vec::new(),
            root: NodeId(0, 1),
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Insert a child of `parent` covering `bounds` in world space.
    ///
    /// Returns `None` if `parent` is stale.
    pub fn insert(&mut self, parent: NodeId, bounds: Rect) -> Option<NodeId> {
        if !self.is_alive(parent) {
            return None;
        }
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, Some(parent), bounds));
            (idx, generation)
        } else {
            self.nodes.push(Some(Node::new(1, Some(parent), bounds)));
            self.generations.push(1);
            (self.nodes.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId(idx as u32, generation);
        self.node_mut(parent)?.children.push(id);
        Some(id)
    }

    /// Remove a node and its subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        self.remove_subtree(id);
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let children = self.node(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.remove_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Returns true if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Parent of a live node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a live node, in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// Flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node(id).map(|n| n.flags)
    }

    /// Replace a node's flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_mut(id) {
            n.flags = flags;
        }
    }

    /// Turn input on or off for a node and its subtree.
    pub fn set_input_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(n) = self.node_mut(id) {
            n.flags.set(NodeFlags::INPUT_ENABLED, enabled);
        }
    }

    /// Turn picking on or off for a node and its subtree.
    pub fn set_pickable(&mut self, id: NodeId, pickable: bool) {
        if let Some(n) = self.node_mut(id) {
            n.flags.set(NodeFlags::PICKABLE, pickable);
        }
    }

    /// World bounds of a live node.
    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|n| n.bounds)
    }

    /// Update world bounds.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.node_mut(id) {
            n.bounds = bounds;
        }
    }

    /// Z-index of a live node.
    pub fn z_index(&self, id: NodeId) -> Option<i32> {
        self.node(id).map(|n| n.z_index)
    }

    /// Update z-index. Higher is on top.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        if let Some(n) = self.node_mut(id) {
            n.z_index = z;
        }
    }

    /// Register a listener on a node.
    pub fn add_listener(&mut self, id: NodeId, listener: ListenerRef<NodeId>) {
        if let Some(n) = self.node_mut(id) {
            n.listeners.push(listener);
        }
    }

    /// Remove a listener from a node. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: NodeId, listener: &ListenerRef<NodeId>) -> bool {
        let Some(n) = self.node_mut(id) else {
            return false;
        };
        let before = n.listeners.len();
        n.listeners.retain(|l| !alloc::rc::Rc::ptr_eq(l, listener));
        n.listeners.len() != before
    }

    /// Root→node path of a live node.
    pub fn path_to_root(&self, id: NodeId) -> Option<Path<NodeId>> {
        let mut out = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.node(current)?.parent;
        }
        out.reverse();
        Some(Path::from_nodes(out))
    }

    /// Topmost node at `point`, with its path.
    pub fn hit_test_point(&self, point: Point) -> Option<Path<NodeId>> {
        let mut best: Option<(NodeId, i32)> = None;
        for (idx, slot) in self.nodes.iter().enumerate() {
            let Some(node) = slot else {
                continue;
            };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            let id = NodeId(idx as u32, node.generation);
            if !node.bounds.contains(point) || !self.chain_is_hittable(id) {
                continue;
            }
            match best {
                Some((best_id, z_best))
                    if node.z_index < z_best
                        || (node.z_index == z_best && !id.is_newer_than(best_id)) => {}
                _ => best = Some((id, node.z_index)),
            }
        }
        best.and_then(|(id, _)| self.path_to_root(id))
    }

    fn chain_is_hittable(&self, id: NodeId) -> bool {
        let hittable = NodeFlags::VISIBLE | NodeFlags::PICKABLE;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                return false;
            };
            if !node.flags.contains(hittable) {
                return false;
            }
            cursor = node.parent;
        }
        true
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }
}

impl Scene<NodeId> for SceneTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn hit_test(&self, point: Point, _pointer: PointerKind) -> Option<Path<NodeId>> {
        self.hit_test_point(point)
    }

    fn is_pickable(&self, node: NodeId) -> bool {
        self.flags(node)
            .is_some_and(|f| f.contains(NodeFlags::VISIBLE | NodeFlags::PICKABLE))
    }

    fn is_input_enabled(&self, node: NodeId) -> bool {
        self.flags(node)
            .is_some_and(|f| f.contains(NodeFlags::INPUT_ENABLED))
    }

    fn is_disposed(&self, node: NodeId) -> bool {
        !self.is_alive(node)
    }

    fn listeners(&self, node: NodeId) -> &[ListenerRef<NodeId>] {
        match self.node(node) {
            Some(n) => &n.listeners,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (SceneTree, NodeId, NodeId) {
        let mut t = SceneTree::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let root = t.root();
        let a = t.insert(root, Rect::new(0.0, 0.0, 60.0, 60.0)).unwrap();
        let b = t.insert(root, Rect::new(40.0, 40.0, 100.0, 100.0)).unwrap();
        (t, a, b)
    }

    #[test]
    fn newer_sibling_wins_on_overlap() {
        let (t, _a, b) = tree();
        let path = t.hit_test_point(Point::new(50.0, 50.0)).unwrap();
        assert_eq!(path.nodes(), &[t.root(), b]);
    }

    #[test]
    fn z_index_beats_age() {
        let (mut t, a, _b) = tree();
        t.set_z_index(a, 5);
        let path = t.hit_test_point(Point::new(50.0, 50.0)).unwrap();
        assert_eq!(path.last_node(), Some(a));
    }

    #[test]
    fn unpickable_ancestor_prunes_subtree() {
        let (mut t, a, _b) = tree();
        let child = t.insert(a, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(
            t.hit_test_point(Point::new(5.0, 5.0)).unwrap().last_node(),
            Some(child)
        );
        t.set_pickable(a, false);
        assert_eq!(
            t.hit_test_point(Point::new(5.0, 5.0)).unwrap().last_node(),
            Some(t.root())
        );
    }

    #[test]
    fn miss_returns_none() {
        let (t, _, _) = tree();
        assert!(t.hit_test_point(Point::new(500.0, 5.0)).is_none());
    }

    #[test]
    fn removed_ids_are_stale_and_disposed() {
        let (mut t, a, _b) = tree();
        let child = t.insert(a, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        t.remove(a);
        assert!(!t.is_alive(a));
        assert!(t.is_disposed(child));
        let reused = t.insert(t.root(), Rect::ZERO).unwrap();
        assert_ne!(reused, a);
        assert_ne!(reused, child);
        assert!(t.insert(a, Rect::ZERO).is_none());
        assert!(t.listeners(a).is_empty());
    }

    #[test]
    fn input_enabled_flag() {
        let (mut t, a, _b) = tree();
        assert!(t.is_input_enabled(a));
        t.set_input_enabled(a, false);
        assert!(!t.is_input_enabled(a));
        assert!(t.is_pickable(a), "input and picking are independent");
    }
}
