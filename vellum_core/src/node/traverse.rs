// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::graph::SceneGraph;
use super::id::{INVALID, NodeId};

/// An iterator over the direct children of a node, back to front.
///
/// Created by [`SceneGraph::children`].
#[derive(Debug)]
pub struct Children<'a> {
    graph: &'a SceneGraph,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(graph: &'a SceneGraph, first: u32) -> Self {
        Self {
            graph,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.graph.next_sibling[idx as usize];
        Some(self.graph.id_at(idx))
    }
}

impl SceneGraph {
    /// Collects the raw indices of every strict descendant of `idx` in
    /// depth-first pre-order.
    pub(crate) fn descendants_of(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            stack.push(child);
            child = self.next_sibling[child as usize];
        }
        stack.reverse();
        while let Some(top) = stack.pop() {
            out.push(top);
            let first = stack.len();
            let mut child = self.first_child[top as usize];
            while child != INVALID {
                stack.push(child);
                child = self.next_sibling[child as usize];
            }
            stack[first..].reverse();
        }
        out
    }

    /// Returns the raw index of the root of the tree containing `idx`.
    pub(crate) fn root_of(&self, mut idx: u32) -> u32 {
        while self.parent[idx as usize] != INVALID {
            idx = self.parent[idx as usize];
        }
        idx
    }

    /// Returns the last child of `idx`, or [`INVALID`].
    pub(crate) fn last_child_of(&self, idx: u32) -> u32 {
        let mut last = self.first_child[idx as usize];
        if last == INVALID {
            return INVALID;
        }
        while self.next_sibling[last as usize] != INVALID {
            last = self.next_sibling[last as usize];
        }
        last
    }

    /// Returns every node in the subtree rooted at `id` (including `id`) in
    /// draw order: depth-first, parents before children, back to front.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        self.validate(id);
        let mut out = Vec::with_capacity(1);
        out.push(id);
        out.extend(self.descendants_of(id.idx).into_iter().map(|i| self.id_at(i)));
        out
    }
}
