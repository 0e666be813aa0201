// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounds queries.
//!
//! A node's bounds are its own content bounds (or its clip rectangle, offset
//! by the pivot) transformed into a reference space, optionally grown by the
//! bounds of every descendant in that same space. A clipped node ignores its
//! children: the clip is its visible extent.
//!
//! Only parent-space results that include children are cached. Other spaces
//! are recomputed on every query.

use kurbo::Affine;

use crate::dirty::DirtyFlags;
use crate::error::{SceneError, SceneResult};
use crate::geom::Rectangle;

use super::graph::SceneGraph;
use super::id::{INVALID, NodeId};

/// The coordinate space a bounds query is answered in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Space {
    /// The node's own local space.
    Local,
    /// The parent's local space. For a root this is the world space.
    #[default]
    Parent,
    /// World space, the space the roots are placed in.
    World,
    /// The local space of another node in the same tree.
    Node(NodeId),
}

/// A reference space by raw index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    /// Local space of the node at this index.
    Of(u32),
    World,
}

impl SceneGraph {
    /// Returns the bounds of `id` expressed in `space`.
    ///
    /// With `include_children`, the result also encloses every descendant,
    /// unless the node has a clip rectangle.
    ///
    /// # Errors
    ///
    /// [`SceneError::Detached`] if `space` names a node in a different tree.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale.
    pub fn bounds(&mut self, id: NodeId, space: Space, include_children: bool) -> SceneResult<Rectangle> {
        self.validate(id);
        let idx = id.idx;
        let target = match space {
            Space::Local => Target::Of(idx),
            Space::Parent => match self.parent[idx as usize] {
                INVALID => Target::World,
                p => Target::Of(p),
            },
            Space::World => Target::World,
            Space::Node(reference) => {
                self.validate(reference);
                if self.root_of(idx) != self.root_of(reference.idx) {
                    return Err(SceneError::Detached {
                        node: id,
                        reference,
                    });
                }
                Target::Of(reference.idx)
            }
        };
        Ok(self.bounds_at(idx, target, include_children))
    }

    /// Returns the node's own bounds in its local space, without children.
    #[must_use]
    pub fn local_bounds(&self, id: NodeId) -> Rectangle {
        self.validate(id);
        self.own_bounds_at(id.idx)
    }

    pub(crate) fn own_bounds_at(&self, idx: u32) -> Rectangle {
        let i = idx as usize;
        match self.display[i].clip {
            Some(clip) => clip.translated(self.params[i].pivot().to_vec2()),
            None => self.content[i].local_bounds(),
        }
    }

    pub(crate) fn bounds_at(&mut self, idx: u32, target: Target, include_children: bool) -> Rectangle {
        let i = idx as usize;
        let clipped = self.display[i].clip.is_some();
        let p = self.parent[i];
        let parent_space = match target {
            Target::Of(t) => p != INVALID && t == p,
            Target::World => p == INVALID,
        };

        let mut out = self.own_bounds_at(idx);
        if target == Target::Of(idx) {
            // Already local.
        } else if parent_space {
            if include_children && !clipped && !self.dirty[i].contains(DirtyFlags::BOUNDS) {
                return self.bounds_cache[i];
            }
            out = out.transform(&self.local_at(idx));
        } else {
            let to_target = self.target_inverse(target) * self.world_at(idx);
            out = out.transform(&to_target);
        }

        if clipped || !include_children {
            return out;
        }

        let mut child = self.first_child[i];
        while child != INVALID {
            let b = self.bounds_at(child, target, true);
            out.expand(&b);
            child = self.next_sibling[child as usize];
        }

        if parent_space && self.dirty[i].contains(DirtyFlags::BOUNDS) {
            self.bounds_cache[i] = out;
            self.dirty[i].remove(DirtyFlags::BOUNDS);
        }
        out
    }

    fn target_inverse(&mut self, target: Target) -> Affine {
        match target {
            Target::Of(t) => self.world_inverse_at(t),
            Target::World => Affine::IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::node::{TextureId, TextureRef};
    use crate::path::LineStyle;

    fn sprite(graph: &mut SceneGraph, w: f64, h: f64) -> NodeId {
        graph.create_sprite(Some(TextureRef::new(TextureId(0), w, h)))
    }

    fn near(a: Rectangle, b: Rectangle) {
        assert!(a.equals(&b, 1e-9), "{a} != {b}");
    }

    #[test]
    fn container_without_children_is_empty() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        assert_eq!(graph.bounds(root, Space::Parent, true), Ok(Rectangle::ZERO));
    }

    #[test]
    fn local_space_ignores_own_transform() {
        let mut graph = SceneGraph::new();
        let s = sprite(&mut graph, 10.0, 20.0);
        graph.set_position(s, 100.0, 100.0);
        graph.set_scale(s, 2.0);
        assert_eq!(
            graph.bounds(s, Space::Local, true),
            Ok(Rectangle::new(0.0, 0.0, 10.0, 20.0))
        );
        assert_eq!(
            graph.bounds(s, Space::Parent, true),
            Ok(Rectangle::new(100.0, 100.0, 20.0, 40.0))
        );
    }

    #[test]
    fn children_are_folded_in_query_space() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let a = sprite(&mut graph, 10.0, 10.0);
        let b = sprite(&mut graph, 10.0, 10.0);
        graph.add_child(root, a);
        graph.add_child(root, b);
        graph.set_position(root, 5.0, 5.0);
        graph.set_position(a, -20.0, 0.0);
        graph.set_position(b, 30.0, 40.0);

        near(
            graph.bounds(root, Space::Local, true).unwrap(),
            Rectangle::new(-20.0, 0.0, 60.0, 50.0),
        );
        near(
            graph.bounds(root, Space::World, true).unwrap(),
            Rectangle::new(-15.0, 5.0, 60.0, 50.0),
        );
        near(
            graph.bounds(root, Space::Local, false).unwrap(),
            Rectangle::ZERO,
        );
    }

    #[test]
    fn union_is_order_independent() {
        // `None` is an empty container.
        let children = [
            (3.0, -7.0, Some((4.0, 6.0))),
            (500.0, 500.0, None),
            (-12.0, 4.0, Some((4.0, 6.0))),
            (25.0, 25.0, Some((4.0, 6.0))),
            (0.5, 0.5, Some((4.0, 6.0))),
        ];
        let mut results = Vec::new();
        for rotation in 0..children.len() {
            let mut graph = SceneGraph::new();
            let root = graph.create_container();
            for k in 0..children.len() {
                let (x, y, size) = children[(k + rotation) % children.len()];
                let child = match size {
                    Some((w, h)) => sprite(&mut graph, w, h),
                    None => graph.create_container(),
                };
                graph.set_position(child, x, y);
                graph.add_child(root, child);
            }
            results.push(graph.bounds(root, Space::Local, true).unwrap());
        }
        near(results[0], Rectangle::new(-12.0, -7.0, 41.0, 38.0));
        for r in &results[1..] {
            near(*r, results[0]);
        }
    }

    #[test]
    fn empty_child_does_not_stretch_bounds() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let s = sprite(&mut graph, 10.0, 10.0);
        let empty = graph.create_container();
        graph.add_child(root, s);
        graph.add_child(root, empty);
        graph.set_position(empty, 500.0, 500.0);
        assert_eq!(
            graph.bounds(root, Space::Local, true),
            Ok(Rectangle::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn clip_overrides_children() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let far1 = sprite(&mut graph, 10.0, 10.0);
        let far2 = sprite(&mut graph, 10.0, 10.0);
        graph.add_child(root, far1);
        graph.add_child(root, far2);
        graph.set_position(far1, 500.0, 500.0);
        graph.set_position(far2, -900.0, 40.0);
        graph.set_pivot(root, 5.0, 5.0);
        graph.set_clip(root, Some(Rectangle::new(0.0, 0.0, 50.0, 50.0)));

        assert_eq!(
            graph.bounds(root, Space::Local, true),
            Ok(Rectangle::new(5.0, 5.0, 50.0, 50.0))
        );
        // Pivot lands on the origin, so parent space shifts back by it.
        assert_eq!(
            graph.bounds(root, Space::Parent, true),
            Ok(Rectangle::new(0.0, 0.0, 50.0, 50.0))
        );
    }

    #[test]
    fn parent_space_is_cached_until_dirty() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let child = sprite(&mut graph, 10.0, 10.0);
        graph.add_child(root, child);

        let first = graph.bounds(root, Space::Parent, true).unwrap();
        assert!(!graph.dirty(root).contains(DirtyFlags::BOUNDS));
        assert_eq!(graph.bounds(root, Space::Parent, true), Ok(first));

        // Moving a child stales the ancestor cache.
        graph.set_x(child, 10.0);
        assert!(graph.dirty(root).contains(DirtyFlags::BOUNDS));
        assert_eq!(
            graph.bounds(root, Space::Parent, true),
            Ok(Rectangle::new(10.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn other_spaces_leave_cache_bit_alone() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let child = sprite(&mut graph, 10.0, 10.0);
        graph.add_child(root, child);

        let _ = graph.bounds(child, Space::World, true);
        let _ = graph.bounds(child, Space::Local, true);
        assert!(graph.dirty(child).contains(DirtyFlags::BOUNDS));
        let _ = graph.bounds(child, Space::Parent, true);
        assert!(!graph.dirty(child).contains(DirtyFlags::BOUNDS));
    }

    #[test]
    fn content_change_invalidates_cache() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let path = graph.create_path();
        graph.add_child(root, path);
        assert_eq!(graph.bounds(root, Space::Parent, true), Ok(Rectangle::ZERO));

        graph.edit_path(path, |p| {
            p.line_style(LineStyle::new(2.0));
            p.move_to(0.0, 0.0);
            p.line_to(10.0, 10.0);
            p.stroke();
        });
        near(
            graph.bounds(root, Space::Parent, true).unwrap(),
            Rectangle::new(-1.0, -1.0, 12.0, 12.0),
        );
    }

    #[test]
    fn cross_space_query() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let left = graph.create_container();
        let right = sprite(&mut graph, 10.0, 10.0);
        graph.add_child(root, left);
        graph.add_child(root, right);
        graph.set_position(left, 100.0, 0.0);
        graph.set_scale(left, 0.5);
        graph.set_position(right, 120.0, 20.0);

        near(
            graph.bounds(right, Space::Node(left), true).unwrap(),
            Rectangle::new(40.0, 40.0, 20.0, 20.0),
        );
        // The parent named explicitly takes the parent-space path.
        near(
            graph.bounds(right, Space::Node(root), true).unwrap(),
            Rectangle::new(120.0, 20.0, 10.0, 10.0),
        );
    }

    #[test]
    fn detached_reference_is_an_error() {
        let mut graph = SceneGraph::new();
        let a = graph.create_container();
        let b = graph.create_container();
        assert_eq!(
            graph.bounds(a, Space::Node(b), true),
            Err(SceneError::Detached {
                node: a,
                reference: b,
            })
        );
    }
}
