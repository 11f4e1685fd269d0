// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Root→leaf node paths.

use smallvec::SmallVec;

/// An ordered, root-first sequence of scene nodes ending at a target leaf.
///
/// A `Path` is immutable once built: when hit testing changes, a new path is
/// constructed rather than edited in place.
///
/// ## Conventions
///
/// - "Nothing under the pointer" is the [anchored](Path::anchored) path `[root]`.
/// - The [empty](Path::empty) path has no node targets at all; dispatching on it
///   only notifies pointer, display and global listeners.
/// - No node appears twice (checked in debug builds).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path<K> {
    nodes: SmallVec<[K; 8]>,
}

impl<K: Copy + Eq> Path<K> {
    /// A path with no nodes.
    pub fn empty() -> Self {
        Self {
            nodes: SmallVec::new(),
        }
    }

    /// The path containing only `root`: over the scene, but over nothing in it.
    pub fn anchored(root: K) -> Self {
        let mut nodes = SmallVec::new();
        nodes.push(root);
        Self { nodes }
    }

    /// Build a path from root-first nodes.
    pub fn from_nodes(nodes: impl IntoIterator<Item = K>) -> Self {
        let nodes: SmallVec<[K; 8]> = nodes.into_iter().collect();
        debug_assert!(
            nodes
                .iter()
                .enumerate()
                .all(|(i, n)| !nodes[i + 1..].contains(n)),
            "a node appears twice in a path"
        );
        Self { nodes }
    }

    /// The nodes, root first.
    #[inline]
    pub fn nodes(&self) -> &[K] {
        &self.nodes
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the path has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The first node, if any.
    pub fn root(&self) -> Option<K> {
        self.nodes.first().copied()
    }

    /// The deepest node, if any.
    pub fn last_node(&self) -> Option<K> {
        self.nodes.last().copied()
    }

    /// The node at `index`, counted from the root.
    pub fn get(&self, index: usize) -> Option<K> {
        self.nodes.get(index).copied()
    }

    /// Returns true if `node` is on this path.
    pub fn contains(&self, node: K) -> bool {
        self.nodes.contains(&node)
    }

    /// A new path made of the first `len` nodes (clamped to this path's length).
    pub fn prefix(&self, len: usize) -> Self {
        let len = len.min(self.nodes.len());
        Self {
            nodes: self.nodes[..len].iter().copied().collect(),
        }
    }

    /// The first index at which `self` and `other` differ.
    ///
    /// If one path is a prefix of the other, this is the length of the shorter.
    /// Identical paths return their length.
    pub fn branch_index(&self, other: &Self) -> usize {
        self.nodes
            .iter()
            .zip(other.nodes.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// Number of leading nodes for which `keep` holds.
    ///
    /// Scanning stops at the first node that fails, so the result always
    /// describes a prefix.
    pub fn leading_len(&self, mut keep: impl FnMut(K) -> bool) -> usize {
        self.nodes.iter().take_while(|n| keep(**n)).count()
    }

    /// Iterate nodes from root to leaf.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = K> + ExactSizeIterator + '_ {
        self.nodes.iter().copied()
    }
}

impl<K: Copy + Eq> FromIterator<K> for Path<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::from_nodes(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_and_empty() {
        let p: Path<u32> = Path::anchored(1);
        assert_eq!(p.nodes(), &[1]);
        assert_eq!(p.root(), Some(1));
        assert_eq!(p.last_node(), Some(1));
        let e: Path<u32> = Path::empty();
        assert!(e.is_empty());
        assert_eq!(e.last_node(), None);
    }

    #[test]
    fn branch_index_is_common_prefix_length() {
        let a = Path::from_nodes([1_u32, 2, 3]);
        let b = Path::from_nodes([1_u32, 2, 9, 10]);
        assert_eq!(a.branch_index(&b), 2);
        assert_eq!(b.branch_index(&a), 2);

        let shorter = Path::from_nodes([1_u32, 2]);
        assert_eq!(a.branch_index(&shorter), 2);

        assert_eq!(a.branch_index(&a.clone()), 3);
        assert_eq!(a.branch_index(&Path::from_nodes([7_u32, 2, 3])), 0);
        assert_eq!(Path::<u32>::empty().branch_index(&a), 0);
    }

    #[test]
    fn prefix_is_clamped() {
        let a = Path::from_nodes([1_u32, 2, 3]);
        assert_eq!(a.prefix(2).nodes(), &[1, 2]);
        assert_eq!(a.prefix(10), a);
        assert!(a.prefix(0).is_empty());
    }

    #[test]
    fn leading_len_stops_at_first_failure() {
        let a = Path::from_nodes([1_u32, 2, 3, 4]);
        // 3 fails; 4 would pass but is past the boundary.
        assert_eq!(a.leading_len(|n| n != 3), 2);
        assert_eq!(a.leading_len(|_| true), 4);
        assert_eq!(a.leading_len(|n| n != 1), 0);
    }

    #[test]
    #[should_panic(expected = "appears twice")]
    fn duplicate_nodes_are_rejected() {
        let _ = Path::from_nodes([1_u32, 2, 1]);
    }
}
