// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point hit testing.

use kurbo::Point;

use super::graph::SceneGraph;
use super::id::{INVALID, NodeId};

impl SceneGraph {
    /// Returns `false` if the node's clip rectangle masks out `point`, given
    /// in world space. Unclipped nodes mask nothing.
    pub fn hit_test_mask(&mut self, id: NodeId, point: Point) -> bool {
        self.validate(id);
        self.mask_at(id.idx, point)
    }

    /// Returns the front-most visible node under `point` (in world space)
    /// within the subtree rooted at `root`.
    ///
    /// Children are tested front to back before their parent. A node is hit
    /// when the point lies inside its own local bounds, and no ancestor's
    /// clip masks it out. Nodes with empty own bounds (plain containers) are
    /// never hit themselves.
    pub fn hit_test(&mut self, root: NodeId, point: Point) -> Option<NodeId> {
        self.validate(root);
        self.hit_at(root.idx, point).map(|idx| self.id_at(idx))
    }

    fn mask_at(&mut self, idx: u32, point: Point) -> bool {
        let i = idx as usize;
        let Some(clip) = self.display[i].clip else {
            return true;
        };
        let local = self.world_inverse_at(idx) * point;
        let pivot = self.params[i].pivot();
        clip.contains_xy(local.x - pivot.x, local.y - pivot.y)
    }

    fn hit_at(&mut self, idx: u32, point: Point) -> Option<u32> {
        let i = idx as usize;
        if !self.display[i].visible || !self.mask_at(idx, point) {
            return None;
        }

        let mut child = self.last_child_of(idx);
        while child != INVALID {
            if let Some(hit) = self.hit_at(child, point) {
                return Some(hit);
            }
            child = self.prev_sibling[child as usize];
        }

        let own = self.own_bounds_at(idx);
        if own.width <= 0.0 || own.height <= 0.0 {
            return None;
        }
        let local = self.world_inverse_at(idx) * point;
        own.contains_xy(local.x, local.y).then_some(idx)
    }
}
