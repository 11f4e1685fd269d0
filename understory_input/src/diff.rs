// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Branch diff: the enter/exit/over/out transitions between two paths.
//!
//! ## Ordering
//!
//! Given the old and new path for one pointer, with `b` the
//! [branch index](crate::Path::branch_index):
//!
//! 1. `Out` once on the full old path (bubbling), if the deepest node changed.
//! 2. `Exit` for old nodes from the leaf back to `b`, each delivered only to that node.
//! 3. `Enter` for new nodes from `b` down to the leaf, each delivered only to that node.
//! 4. `Over` once on the full new path (bubbling), if the deepest node changed.
//!
//! Exits run leaf→branch and enters run branch→leaf; the asymmetry is intended.
//!
//! ```
//! use understory_input::{BranchDiff, Path, Transition};
//!
//! let old = Path::from_nodes([1_u32, 2, 3]);
//! let new = Path::from_nodes([1_u32, 2, 4, 5]);
//! let diff = BranchDiff::compute(&old, &new);
//! assert_eq!(diff.branch_index(), 2);
//! let steps: Vec<_> = diff.transitions().collect();
//! assert_eq!(
//!     steps,
//!     vec![
//!         Transition::Out,
//!         Transition::Exit(2),
//!         Transition::Enter(2),
//!         Transition::Enter(3),
//!         Transition::Over,
//!     ]
//! );
//! ```

use core::ops::Range;

use crate::path::Path;

/// One step of a branch change, indexing into the old (`Exit`) or new (`Enter`) path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// The deepest node is no longer under the pointer; bubbles over the old path.
    Out,
    /// The old node at this index is no longer under the pointer.
    Exit(usize),
    /// The new node at this index is now under the pointer.
    Enter(usize),
    /// A new deepest node is under the pointer; bubbles over the new path.
    Over,
}

/// The minimal transition set between an old and a new path.
///
/// Computed once per change; the branch index drives all four transition kinds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BranchDiff {
    branch_index: usize,
    old_len: usize,
    new_len: usize,
    deepest_changed: bool,
}

impl BranchDiff {
    /// Diff `old` against `new`.
    pub fn compute<K: Copy + Eq>(old: &Path<K>, new: &Path<K>) -> Self {
        Self {
            branch_index: old.branch_index(new),
            old_len: old.len(),
            new_len: new.len(),
            deepest_changed: old.last_node() != new.last_node(),
        }
    }

    /// Diff that leaves every node of a path of length `old_len`.
    ///
    /// Used when a pointer goes away and there is no new path to move to.
    pub fn exit_all(old_len: usize) -> Self {
        Self {
            branch_index: 0,
            old_len,
            new_len: 0,
            deepest_changed: old_len > 0,
        }
    }

    /// First index at which the paths diverge.
    pub fn branch_index(&self) -> usize {
        self.branch_index
    }

    /// True if the deepest node differs, which gates `Out` and `Over`.
    pub fn deepest_changed(&self) -> bool {
        self.deepest_changed
    }

    /// True if no transition fires.
    pub fn is_unchanged(&self) -> bool {
        !self.deepest_changed && self.exits().len() == 0 && self.enters().len() == 0
    }

    /// Old-path indices to exit, leaf first.
    pub fn exits(&self) -> core::iter::Rev<Range<usize>> {
        (self.branch_index..self.old_len).rev()
    }

    /// New-path indices to enter, branch first.
    pub fn enters(&self) -> Range<usize> {
        self.branch_index..self.new_len
    }

    /// `Out` (if the deepest node changed) followed by the exits.
    ///
    /// An empty old path has nothing to leave, so it never gets `Out`.
    pub fn exit_transitions(&self) -> impl Iterator<Item = Transition> {
        (self.deepest_changed && self.old_len > 0)
            .then_some(Transition::Out)
            .into_iter()
            .chain(self.exits().map(Transition::Exit))
    }

    /// The enters followed by `Over` (if the deepest node changed).
    ///
    /// An empty new path has nothing to be over, so it never gets `Over`.
    pub fn enter_transitions(&self) -> impl Iterator<Item = Transition> {
        self.enters()
            .map(Transition::Enter)
            .chain((self.deepest_changed && self.new_len > 0).then_some(Transition::Over))
    }

    /// Every transition in firing order.
    pub fn transitions(&self) -> impl Iterator<Item = Transition> {
        self.exit_transitions().chain(self.enter_transitions())
    }
}
