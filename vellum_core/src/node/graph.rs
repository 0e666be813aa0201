// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage: allocation, topology, properties and the
//! lazily recomputed transform caches.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Affine;

use crate::dirty::DirtyFlags;
use crate::driver::FrameConfig;
use crate::geom::{Rectangle, affine_is_finite};
use crate::path::PathCommands;
use crate::renderer::{BlendMode, RendererState};
use crate::transform::TransformParams;

use super::content::{EmitterContent, NodeContent, NodeKind, Particle, TextLayout, TextureRef};
use super::id::{INVALID, NodeId};
use super::traverse::Children;

/// Per-node display properties that feed the renderer snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DisplayProps {
    pub(crate) alpha: f64,
    pub(crate) blend_mode: BlendMode,
    pub(crate) visible: bool,
    pub(crate) clip: Option<Rectangle>,
    pub(crate) cache_as_bitmap: bool,
    pub(crate) snap_to_pixels: bool,
}

impl DisplayProps {
    const DEFAULT: Self = Self {
        alpha: 1.0,
        blend_mode: BlendMode::Auto,
        visible: true,
        clip: None,
        cache_as_bitmap: false,
        snap_to_pixels: false,
    };
}

/// A baked bitmap standing in for a whole subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BitmapCache {
    /// Texture the driver produced.
    pub texture: TextureRef,
    /// Local-space rectangle the texture covers.
    pub bounds: Rectangle,
}

/// Struct-of-arrays storage for every node of a scene.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays; destroyed nodes are recycled through a free list and
/// generation counters make stale handles fail loudly.
///
/// Derived values (local and world matrices, the inverse world matrix,
/// parent-space bounds, renderer snapshots) are cached per slot and guarded by
/// the slot's [`DirtyFlags`]. Mutators only set bits; readers recompute and
/// clear them. Readers therefore take `&mut self`.
#[derive(Debug)]
pub struct SceneGraph {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) params: Vec<TransformParams>,
    pub(crate) display: Vec<DisplayProps>,
    pub(crate) content: Vec<NodeContent>,

    // -- Derived caches --
    pub(crate) local_transform: Vec<Affine>,
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) world_inverse: Vec<Affine>,
    pub(crate) bounds_cache: Vec<Rectangle>,
    pub(crate) dirty: Vec<DirtyFlags>,

    // -- Renderer hand-off --
    pub(crate) renderer: Vec<Option<RendererState>>,
    pub(crate) bitmap_cache: Vec<Option<BitmapCache>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Frame bookkeeping --
    pub(crate) frame_index: u64,
    pub(crate) last_frame: Option<(NodeId, FrameConfig)>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates an empty scene graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            params: Vec::new(),
            display: Vec::new(),
            content: Vec::new(),
            local_transform: Vec::new(),
            world_transform: Vec::new(),
            world_inverse: Vec::new(),
            bounds_cache: Vec::new(),
            dirty: Vec::new(),
            renderer: Vec::new(),
            bitmap_cache: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            frame_index: 0,
            last_frame: None,
        }
    }

    // -- Allocation API --

    /// Creates a detached node of the given kind and returns its handle.
    ///
    /// The node starts with identity transform parameters, full alpha,
    /// `Auto` blending, no clip, empty content and every dirty bit set.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.params[i] = TransformParams::IDENTITY;
            self.display[i] = DisplayProps::DEFAULT;
            self.content[i] = NodeContent::new(kind);
            self.local_transform[i] = Affine::IDENTITY;
            self.world_transform[i] = Affine::IDENTITY;
            self.world_inverse[i] = Affine::IDENTITY;
            self.bounds_cache[i] = Rectangle::ZERO;
            self.dirty[i] = DirtyFlags::all();
            self.renderer[i] = None;
            self.bitmap_cache[i] = None;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.params.push(TransformParams::IDENTITY);
            self.display.push(DisplayProps::DEFAULT);
            self.content.push(NodeContent::new(kind));
            self.local_transform.push(Affine::IDENTITY);
            self.world_transform.push(Affine::IDENTITY);
            self.world_inverse.push(Affine::IDENTITY);
            self.bounds_cache.push(Rectangle::ZERO);
            self.dirty.push(DirtyFlags::all());
            self.renderer.push(None);
            self.bitmap_cache.push(None);
            self.generation.push(0);
            idx
        };

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a plain container node.
    pub fn create_container(&mut self) -> NodeId {
        self.create_node(NodeKind::Container)
    }

    /// Creates a vector path node with an empty command queue.
    pub fn create_path(&mut self) -> NodeId {
        self.create_node(NodeKind::Path)
    }

    /// Creates a sprite node showing `texture`.
    pub fn create_sprite(&mut self, texture: Option<TextureRef>) -> NodeId {
        let id = self.create_node(NodeKind::Sprite);
        self.content[id.idx as usize] = NodeContent::Sprite(texture);
        id
    }

    /// Creates a text node with the given layout.
    pub fn create_text(&mut self, layout: TextLayout) -> NodeId {
        let id = self.create_node(NodeKind::Text);
        self.content[id.idx as usize] = NodeContent::Text(layout);
        id
    }

    /// Creates a particle emitter node drawing particles with `texture`.
    pub fn create_emitter(&mut self, texture: Option<TextureRef>) -> NodeId {
        let id = self.create_node(NodeKind::Emitter);
        self.content[id.idx as usize] = NodeContent::Emitter(EmitterContent {
            texture,
            particles: Vec::new(),
        });
        id
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// The node's renderer snapshot is dropped with it.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        let p = self.parent[idx as usize];
        if p != INVALID {
            self.unlink_from_parent(idx);
            self.mark_chain(p);
        }

        self.renderer[idx as usize] = None;
        self.bitmap_cache[idx as usize] = None;
        self.content[idx as usize] = NodeContent::Container;

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        // Destroying bumps the generation, so a freed slot never matches.
        id.idx < self.len && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.content[id.idx as usize].kind()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Index of the last frame rendered by
    /// [`render_frame`](Self::render_frame), zero before the first frame.
    #[must_use]
    pub const fn frame_index(&self) -> u64 {
        self.frame_index
    }

    // -- Topology API --

    /// Adds `child` as the last (front-most) child of `parent`.
    ///
    /// The child's subtree has its world transform, bounds and snapshot marked
    /// stale; `parent` and its ancestors have their bounds marked stale.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if `parent` lies inside `child`'s subtree.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        self.assert_no_cycle(p, c);
        self.link_last(p, c);
        self.mark_attached(c);
    }

    /// Inserts `child` before `sibling` in the sibling list, behind it in
    /// draw order.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, `sibling`
    /// has no parent, or the insertion would create a cycle.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        self.assert_no_cycle(p, c);

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            // `sibling` was the first child.
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;

        self.mark_attached(c);
    }

    /// Detaches `child` from its parent. The child keeps its own subtree.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        assert!(p != INVALID, "node has no parent");

        self.unlink_from_parent(c);
        self.mark_chain(p);
        self.mark_subtree(c, DirtyFlags::INHERITED_TRANSFORM);
    }

    /// Moves `child` to the end of `new_parent`'s child list, detaching it
    /// from its current parent first.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or `new_parent` lies inside `child`'s
    /// subtree.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.validate(child);
        self.validate(new_parent);
        let c = child.idx;
        let p = new_parent.idx;
        self.assert_no_cycle(p, c);

        let old_p = self.parent[c as usize];
        if old_p != INVALID {
            self.unlink_from_parent(c);
            self.mark_chain(old_p);
        }
        self.link_last(p, c);
        self.mark_attached(c);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(self.id_at(p))
        }
    }

    /// Returns an iterator over the direct children of a node, back to front.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns every live node without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        let mut free = vec![false; self.len as usize];
        for &idx in &self.free_list {
            free[idx as usize] = true;
        }
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !free[idx as usize])
            .map(|idx| self.id_at(idx))
            .collect()
    }

    // -- Transform parameters --

    /// Returns the transform parameters of a node.
    #[must_use]
    pub fn params(&self, id: NodeId) -> TransformParams {
        self.validate(id);
        self.params[id.idx as usize]
    }

    /// Replaces all transform parameters at once.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or any parameter is not finite.
    pub fn set_params(&mut self, id: NodeId, params: TransformParams) {
        self.validate(id);
        let TransformParams {
            x,
            y,
            scale_x,
            scale_y,
            rotation,
            skew_x,
            skew_y,
            pivot_x,
            pivot_y,
        } = params;
        assert!(
            [x, y, scale_x, scale_y, rotation, skew_x, skew_y, pivot_x, pivot_y]
                .iter()
                .all(|v| v.is_finite()),
            "transform parameters must be finite: {params:?}"
        );
        if self.params[id.idx as usize] == params {
            return;
        }
        self.params[id.idx as usize] = params;
        self.mark_transform_dirty_at(id.idx);
    }

    /// Sets the horizontal position.
    pub fn set_x(&mut self, id: NodeId, value: f64) {
        self.set_param(id, "x", value, |p| &mut p.x);
    }

    /// Sets the vertical position.
    pub fn set_y(&mut self, id: NodeId, value: f64) {
        self.set_param(id, "y", value, |p| &mut p.y);
    }

    /// Sets both position components.
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) {
        self.set_x(id, x);
        self.set_y(id, y);
    }

    /// Sets the horizontal scale factor.
    pub fn set_scale_x(&mut self, id: NodeId, value: f64) {
        self.set_param(id, "scale_x", value, |p| &mut p.scale_x);
    }

    /// Sets the vertical scale factor.
    pub fn set_scale_y(&mut self, id: NodeId, value: f64) {
        self.set_param(id, "scale_y", value, |p| &mut p.scale_y);
    }

    /// Sets a uniform scale factor.
    pub fn set_scale(&mut self, id: NodeId, value: f64) {
        self.set_scale_x(id, value);
        self.set_scale_y(id, value);
    }

    /// Sets the rotation in radians.
    pub fn set_rotation(&mut self, id: NodeId, value: f64) {
        self.set_param(id, "rotation", value, |p| &mut p.rotation);
    }

    /// Sets the horizontal skew in radians.
    pub fn set_skew_x(&mut self, id: NodeId, value: f64) {
        self.set_param(id, "skew_x", value, |p| &mut p.skew_x);
    }

    /// Sets the vertical skew in radians.
    pub fn set_skew_y(&mut self, id: NodeId, value: f64) {
        self.set_param(id, "skew_y", value, |p| &mut p.skew_y);
    }

    /// Sets the pivot, in local space.
    pub fn set_pivot(&mut self, id: NodeId, x: f64, y: f64) {
        self.set_param(id, "pivot_x", x, |p| &mut p.pivot_x);
        self.set_param(id, "pivot_y", y, |p| &mut p.pivot_y);
    }

    // -- Transform caches --

    /// Returns the local matrix, recomputing it if stale.
    pub fn local_transform(&mut self, id: NodeId) -> Affine {
        self.validate(id);
        self.local_at(id.idx)
    }

    /// Returns the world matrix (local composed through every ancestor),
    /// recomputing stale links of the parent chain.
    pub fn world_transform(&mut self, id: NodeId) -> Affine {
        self.validate(id);
        self.world_at(id.idx)
    }

    /// Returns the inverse of the world matrix.
    ///
    /// A node with a degenerate world matrix (zero scale) yields a non-finite
    /// inverse.
    pub fn world_inverse(&mut self, id: NodeId) -> Affine {
        self.validate(id);
        self.world_inverse_at(id.idx)
    }

    /// Marks the node's local matrix, and every world matrix below it, stale.
    ///
    /// Setters call this automatically; it is exposed for callers that want
    /// to force a rebuild.
    pub fn mark_transform_dirty(&mut self, id: NodeId) {
        self.validate(id);
        self.mark_transform_dirty_at(id.idx);
    }

    /// Marks the node's renderer snapshot stale without touching its
    /// descendants.
    pub fn mark_render_dirty(&mut self, id: NodeId) {
        self.validate(id);
        self.mark_render_dirty_at(id.idx);
    }

    /// Returns the current dirty bits of a node.
    #[must_use]
    pub fn dirty(&self, id: NodeId) -> DirtyFlags {
        self.validate(id);
        self.dirty[id.idx as usize]
    }

    // -- Display properties --

    /// Returns the node's own alpha.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.display[id.idx as usize].alpha
    }

    /// Sets the node's alpha, clamped to `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is NaN or the handle is stale.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f64) {
        self.validate(id);
        assert!(!alpha.is_nan(), "alpha must not be NaN");
        let alpha = alpha.clamp(0.0, 1.0);
        let props = &mut self.display[id.idx as usize];
        if props.alpha == alpha {
            return;
        }
        props.alpha = alpha;
        self.mark_render_dirty_at(id.idx);
    }

    /// Returns the node's own (possibly `Auto`) blend mode.
    #[must_use]
    pub fn blend_mode(&self, id: NodeId) -> BlendMode {
        self.validate(id);
        self.display[id.idx as usize].blend_mode
    }

    /// Sets the node's blend mode.
    pub fn set_blend_mode(&mut self, id: NodeId, mode: BlendMode) {
        self.validate(id);
        let props = &mut self.display[id.idx as usize];
        if props.blend_mode == mode {
            return;
        }
        props.blend_mode = mode;
        self.mark_render_dirty_at(id.idx);
    }

    /// Returns whether the node is visible.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        self.display[id.idx as usize].visible
    }

    /// Shows or hides the node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        let props = &mut self.display[id.idx as usize];
        if props.visible == visible {
            return;
        }
        props.visible = visible;
        self.mark_render_dirty_at(id.idx);
    }

    /// Returns the clip rectangle, in local space before the pivot offset.
    #[must_use]
    pub fn clip(&self, id: NodeId) -> Option<Rectangle> {
        self.validate(id);
        self.display[id.idx as usize].clip
    }

    /// Sets or removes the clip rectangle.
    ///
    /// A clipped node's bounds are its clip rectangle, whatever its content
    /// and children.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle has non-finite components.
    pub fn set_clip(&mut self, id: NodeId, clip: Option<Rectangle>) {
        self.validate(id);
        if let Some(r) = clip {
            assert!(
                [r.x, r.y, r.width, r.height].iter().all(|v| v.is_finite()),
                "clip rectangle must be finite: {r}"
            );
        }
        let idx = id.idx;
        if self.display[idx as usize].clip == clip {
            return;
        }
        self.display[idx as usize].clip = clip;
        self.mark_render_dirty_at(idx);
        self.mark_bounds_dirty_at(idx);
    }

    /// Returns whether the subtree is drawn from a baked bitmap.
    #[must_use]
    pub fn cache_as_bitmap(&self, id: NodeId) -> bool {
        self.validate(id);
        self.display[id.idx as usize].cache_as_bitmap
    }

    /// Enables or disables bitmap caching of the subtree.
    ///
    /// Enabling bakes on the next frame. Disabling drops the baked bitmap and
    /// re-snapshots the whole subtree.
    pub fn set_cache_as_bitmap(&mut self, id: NodeId, enabled: bool) {
        self.validate(id);
        let idx = id.idx;
        if self.display[idx as usize].cache_as_bitmap == enabled {
            return;
        }
        self.display[idx as usize].cache_as_bitmap = enabled;
        if enabled {
            self.mark_render_dirty_at(idx);
        } else {
            self.bitmap_cache[idx as usize] = None;
            self.mark_transform_dirty_at(idx);
        }
    }

    /// Returns the baked bitmap of a cached subtree, if one exists.
    #[must_use]
    pub fn bitmap_cache(&self, id: NodeId) -> Option<BitmapCache> {
        self.validate(id);
        self.bitmap_cache[id.idx as usize]
    }

    /// Returns whether the snapshot asks drivers to round positions to
    /// whole pixels.
    #[must_use]
    pub fn snap_to_pixels(&self, id: NodeId) -> bool {
        self.validate(id);
        self.display[id.idx as usize].snap_to_pixels
    }

    /// Sets pixel snapping for the node's snapshot.
    pub fn set_snap_to_pixels(&mut self, id: NodeId, snap: bool) {
        self.validate(id);
        let props = &mut self.display[id.idx as usize];
        if props.snap_to_pixels == snap {
            return;
        }
        props.snap_to_pixels = snap;
        self.mark_render_dirty_at(id.idx);
    }

    // -- Content --

    /// Returns the command queue of a path node.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a path.
    #[must_use]
    pub fn path(&self, id: NodeId) -> &PathCommands {
        self.validate(id);
        match &self.content[id.idx as usize] {
            NodeContent::Path(path) => path,
            other => panic!("node {id} is a {:?}, not a path", other.kind()),
        }
    }

    /// Edits the command queue of a path node.
    ///
    /// The node's bounds and snapshot are marked stale afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a path.
    pub fn edit_path<R>(&mut self, id: NodeId, f: impl FnOnce(&mut PathCommands) -> R) -> R {
        self.validate(id);
        let out = match &mut self.content[id.idx as usize] {
            NodeContent::Path(path) => f(path),
            other => panic!("node {id} is a {:?}, not a path", other.kind()),
        };
        self.mark_content_dirty_at(id.idx);
        out
    }

    /// Returns the texture of a sprite or emitter node.
    ///
    /// # Panics
    ///
    /// Panics for other node kinds.
    #[must_use]
    pub fn texture(&self, id: NodeId) -> Option<TextureRef> {
        self.validate(id);
        match &self.content[id.idx as usize] {
            NodeContent::Sprite(texture) => *texture,
            NodeContent::Emitter(emitter) => emitter.texture,
            other => panic!("node {id} is a {:?}, which has no texture", other.kind()),
        }
    }

    /// Sets the texture of a sprite or emitter node.
    ///
    /// # Panics
    ///
    /// Panics for other node kinds.
    pub fn set_texture(&mut self, id: NodeId, texture: Option<TextureRef>) {
        self.validate(id);
        let slot = match &mut self.content[id.idx as usize] {
            NodeContent::Sprite(slot) => slot,
            NodeContent::Emitter(emitter) => &mut emitter.texture,
            other => panic!("node {id} is a {:?}, which has no texture", other.kind()),
        };
        if *slot == texture {
            return;
        }
        *slot = texture;
        self.mark_content_dirty_at(id.idx);
    }

    /// Returns the layout of a text node.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> &TextLayout {
        self.validate(id);
        match &self.content[id.idx as usize] {
            NodeContent::Text(layout) => layout,
            other => panic!("node {id} is a {:?}, not text", other.kind()),
        }
    }

    /// Replaces the layout of a text node.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a text node.
    pub fn set_text(&mut self, id: NodeId, layout: TextLayout) {
        self.validate(id);
        match &mut self.content[id.idx as usize] {
            NodeContent::Text(current) => {
                if *current == layout {
                    return;
                }
                *current = layout;
            }
            other => panic!("node {id} is a {:?}, not text", other.kind()),
        }
        self.mark_content_dirty_at(id.idx);
    }

    /// Returns the content of an emitter node.
    ///
    /// # Panics
    ///
    /// Panics if the node is not an emitter.
    #[must_use]
    pub fn emitter(&self, id: NodeId) -> &EmitterContent {
        self.validate(id);
        match &self.content[id.idx as usize] {
            NodeContent::Emitter(emitter) => emitter,
            other => panic!("node {id} is a {:?}, not an emitter", other.kind()),
        }
    }

    /// Replaces the particle snapshot of an emitter node.
    ///
    /// # Panics
    ///
    /// Panics if the node is not an emitter.
    pub fn set_particles(&mut self, id: NodeId, particles: &[Particle]) {
        self.validate(id);
        match &mut self.content[id.idx as usize] {
            NodeContent::Emitter(emitter) => {
                if emitter.particles == particles {
                    return;
                }
                emitter.particles.clear();
                emitter.particles.extend_from_slice(particles);
            }
            other => panic!("node {id} is a {:?}, not an emitter", other.kind()),
        }
        self.mark_content_dirty_at(id.idx);
    }

    /// Returns the renderer snapshot last built for a node, if any.
    #[must_use]
    pub fn renderer_state(&self, id: NodeId) -> Option<&RendererState> {
        self.validate(id);
        self.renderer[id.idx as usize].as_ref()
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Builds the current handle for a live slot.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn local_at(&mut self, idx: u32) -> Affine {
        let i = idx as usize;
        if self.dirty[i].contains(DirtyFlags::TRANSFORM) {
            self.local_transform[i] = self.params[i].to_affine();
            self.dirty[i].remove(DirtyFlags::TRANSFORM);
        }
        self.local_transform[i]
    }

    pub(crate) fn world_at(&mut self, idx: u32) -> Affine {
        let i = idx as usize;
        if self.dirty[i].contains(DirtyFlags::WORLD) {
            let local = self.local_at(idx);
            let p = self.parent[i];
            self.world_transform[i] = if p == INVALID {
                local
            } else {
                self.world_at(p) * local
            };
            self.dirty[i].remove(DirtyFlags::WORLD);
        }
        self.world_transform[i]
    }

    pub(crate) fn world_inverse_at(&mut self, idx: u32) -> Affine {
        let i = idx as usize;
        if self.dirty[i].contains(DirtyFlags::WORLD_INV) {
            let world = self.world_at(idx);
            self.world_inverse[i] = world.inverse();
            debug_assert!(
                affine_is_finite(&self.world_inverse[i]) || world.determinant() == 0.0,
                "finite world matrix produced a non-finite inverse"
            );
            self.dirty[i].remove(DirtyFlags::WORLD_INV);
        }
        self.world_inverse[i]
    }

    fn set_param(
        &mut self,
        id: NodeId,
        name: &str,
        value: f64,
        field: impl FnOnce(&mut TransformParams) -> &mut f64,
    ) {
        self.validate(id);
        assert!(value.is_finite(), "{name} must be finite, got {value}");
        let slot = field(&mut self.params[id.idx as usize]);
        if *slot == value {
            return;
        }
        *slot = value;
        self.mark_transform_dirty_at(id.idx);
    }

    pub(crate) fn mark_transform_dirty_at(&mut self, idx: u32) {
        self.dirty[idx as usize] |= DirtyFlags::SELF_TRANSFORM;
        for d in self.descendants_of(idx) {
            self.dirty[d as usize] |= DirtyFlags::INHERITED_TRANSFORM;
        }
        self.mark_ancestors(idx);
    }

    pub(crate) fn mark_render_dirty_at(&mut self, idx: u32) {
        self.dirty[idx as usize] |= DirtyFlags::RENDER | DirtyFlags::RENDER_CACHE;
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            self.dirty[p as usize] |= DirtyFlags::RENDER_CACHE;
            p = self.parent[p as usize];
        }
    }

    fn mark_bounds_dirty_at(&mut self, idx: u32) {
        self.dirty[idx as usize] |= DirtyFlags::BOUNDS;
        self.mark_ancestors(idx);
    }

    fn mark_content_dirty_at(&mut self, idx: u32) {
        self.mark_render_dirty_at(idx);
        self.mark_bounds_dirty_at(idx);
    }

    /// Sets [`DirtyFlags::ANCESTOR`] on every strict ancestor of `idx`.
    fn mark_ancestors(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p != INVALID {
            self.mark_chain(p);
        }
    }

    /// Sets [`DirtyFlags::ANCESTOR`] on `idx` and every ancestor of it.
    fn mark_chain(&mut self, mut idx: u32) {
        loop {
            self.dirty[idx as usize] |= DirtyFlags::ANCESTOR;
            idx = self.parent[idx as usize];
            if idx == INVALID {
                break;
            }
        }
    }

    fn mark_subtree(&mut self, idx: u32, flags: DirtyFlags) {
        self.dirty[idx as usize] |= flags;
        for d in self.descendants_of(idx) {
            self.dirty[d as usize] |= flags;
        }
    }

    /// Dirties a freshly attached subtree and its new ancestry.
    fn mark_attached(&mut self, idx: u32) {
        self.mark_subtree(idx, DirtyFlags::INHERITED_TRANSFORM);
        self.mark_ancestors(idx);
    }

    fn assert_no_cycle(&self, parent: u32, child: u32) {
        let mut cur = parent;
        while cur != INVALID {
            assert!(cur != child, "cannot attach a node inside its own subtree");
            cur = self.parent[cur as usize];
        }
    }

    /// Appends `c` to `p`'s child list. `c` must be detached.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        let last = self.last_child_of(p);
        if last == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}
