// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene collaborator traits and path resolution.

use kurbo::Point;

use crate::event::ElementId;
use crate::listener::ListenerRef;
use crate::path::Path;
use crate::pointer::{Pointer, PointerKind};

/// The scene graph the engine dispatches into.
///
/// Node ids are small `Copy` handles; the scene stays the owner of the nodes.
pub trait Scene<K> {
    /// The root node every path starts from.
    fn root(&self) -> K;

    /// The root→leaf path to the deepest pickable node painted at `point`.
    ///
    /// Returns `None` when nothing is hit.
    fn hit_test(&self, point: Point, pointer: PointerKind) -> Option<Path<K>>;

    /// Whether the node may be the target of a hit.
    fn is_pickable(&self, node: K) -> bool {
        let _ = node;
        true
    }

    /// Whether the node, and therefore its subtree, takes input.
    fn is_input_enabled(&self, node: K) -> bool {
        let _ = node;
        true
    }

    /// Whether the node has been torn down since the path was built.
    fn is_disposed(&self, node: K) -> bool {
        let _ = node;
        false
    }

    /// Listeners registered on the node, in insertion order.
    fn listeners(&self, node: K) -> &[ListenerRef<K>];
}

/// The accessibility mirror: a parallel element tree addressed by unique id.
pub trait AccessibilityTree<K> {
    /// Path to the scene node the mirrored element with `unique_id` stands for.
    fn trail_from_unique_id(&self, unique_id: &str) -> Option<Path<K>>;

    /// Whether the raw platform element belongs to the mirror.
    fn is_element_under_mirror(&self, element: ElementId) -> bool;
}

/// Resolves pointer locations into paths.
#[derive(Debug)]
pub struct PathResolver<'a, S: ?Sized> {
    scene: &'a S,
}

impl<'a, S: ?Sized> PathResolver<'a, S> {
    /// Resolve against `scene`.
    pub fn new(scene: &'a S) -> Self {
        Self { scene }
    }

    /// Path currently under `pointer`.
    ///
    /// Falls back to the root-anchored path when the pointer has no location
    /// or nothing is hit; never returns an empty path.
    pub fn resolve<K: Copy + Eq>(&self, pointer: &Pointer<K>) -> Path<K>
    where
        S: Scene<K>,
    {
        let root = self.scene.root();
        let hit = pointer
            .point()
            .and_then(|point| self.scene.hit_test(point, pointer.kind()));
        match hit {
            Some(path) if !path.is_empty() => {
                debug_assert!(path.root() == Some(root), "hit path must start at the root");
                path
            }
            _ => Path::anchored(root),
        }
    }

    /// Number of leading nodes before the first input-disabled one.
    pub fn input_enabled_len<K: Copy + Eq>(&self, path: &Path<K>) -> usize
    where
        S: Scene<K>,
    {
        path.leading_len(|node| self.scene.is_input_enabled(node))
    }

    /// `path` truncated before its first input-disabled node.
    pub fn input_enabled_path<K: Copy + Eq>(&self, path: &Path<K>) -> Path<K>
    where
        S: Scene<K>,
    {
        path.prefix(self.input_enabled_len(path))
    }

    /// Whether every node on `path` is pickable.
    pub fn is_pickable<K: Copy + Eq>(&self, path: &Path<K>) -> bool
    where
        S: Scene<K>,
    {
        path.iter().all(|node| self.scene.is_pickable(node))
    }
}
