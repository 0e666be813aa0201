// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: the registered snapshots of one frame, flattened for drawing.

use alloc::vec::Vec;
use core::ops::Range;

use vellum_core::geom::Rectangle;
use vellum_core::node::{NodeId, TextureId, TextureRef};
use vellum_core::renderer::{BlendMode, Payload, RendererKind, RendererState};

/// The surface an item is drawn onto.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Surface {
    /// The frame itself.
    #[default]
    Frame,
    /// The offscreen bitmap of the baked subtree rooted at this node.
    Bake(NodeId),
}

/// A single draw command in the render plan.
///
/// Items are produced in back-to-front order, matching the scene graph's
/// traversal order.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    /// The node this item originates from.
    pub node: NodeId,
    /// Snapshot kind.
    pub kind: RendererKind,
    /// Where the item is drawn.
    pub surface: Surface,
    /// Nesting depth below the first item of its surface.
    pub depth: u32,
    /// Transform onto the surface as `[a, b, c, d, tx, ty]`.
    pub transform: [f64; 6],
    /// Resolved alpha.
    pub alpha: f64,
    /// Resolved blend mode.
    pub blend_mode: BlendMode,
    /// Invisible items are recorded but neither they nor their children draw.
    pub visible: bool,
    /// Clip rectangle in the node's local space, pivot applied.
    pub clip: Option<Rectangle>,
    /// Round the translation to whole pixels.
    pub snap_to_pixels: bool,
    /// Texture to draw: the baked bitmap, or the sprite's own texture.
    pub texture: Option<TextureRef>,
    /// Set when the item stands in for a baked subtree.
    pub cached: bool,
    /// Kind-specific data, as registered.
    pub payload: Payload,
}

impl RenderItem {
    /// Flattens a snapshot. Returns `None` for snapshots not bound to a node.
    #[must_use]
    pub fn from_state(state: &RendererState, surface: Surface, depth: u32) -> Option<Self> {
        let node = state.node?;
        let own_texture = match &state.payload {
            Payload::Textured { texture } | Payload::Emitter { texture, .. } => *texture,
            _ => None,
        };
        Some(Self {
            node,
            kind: state.kind(),
            surface,
            depth,
            transform: state.transform_coeffs(),
            alpha: state.alpha,
            blend_mode: state.blend_mode,
            visible: state.visible,
            clip: state
                .clip_rect
                .map(|clip| clip.translated(state.pivot.to_vec2())),
            snap_to_pixels: state.snap_to_pixels,
            texture: state.bitmap.or(own_texture),
            cached: state.bitmap.is_some(),
            payload: state.payload.clone(),
        })
    }

    /// Whether drawing this item would put anything on its surface.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        if !self.visible || self.alpha <= 0.0 {
            return false;
        }
        if self.cached {
            return true;
        }
        match &self.payload {
            Payload::Container => false,
            Payload::Path { commands, .. } => commands.iter().any(|c| c.is_drawable()),
            Payload::Textured { texture } => texture.is_some(),
            Payload::Text { layout } => !layout.text.is_empty(),
            Payload::Emitter { texture, particles } => texture.is_some() && !particles.is_empty(),
        }
    }
}

/// A subtree rendered into an offscreen bitmap during a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct BakeRecord {
    /// Root of the baked subtree.
    pub node: NodeId,
    /// Local-space area the bitmap covers.
    pub bounds: Rectangle,
    /// Texture handed back to the scene graph.
    pub texture: TextureId,
    /// Indices into [`RenderPlan::items`] drawn onto the bitmap.
    pub items: Range<usize>,
}

/// The draw commands of a single frame.
///
/// Bake items are interleaved with frame items in the order they were
/// registered; [`frame_items`](Self::frame_items) and
/// [`bake_items`](Self::bake_items) separate them.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Frame counter the plan was recorded for.
    pub frame_index: u64,
    /// Draw items in registration order.
    pub items: Vec<RenderItem>,
    /// Bakes performed during the frame.
    pub bakes: Vec<BakeRecord>,
}

impl RenderPlan {
    /// Creates an empty render plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.frame_index = 0;
        self.items.clear();
        self.bakes.clear();
    }

    /// Items drawn onto the frame, back to front.
    pub fn frame_items(&self) -> impl Iterator<Item = &RenderItem> + '_ {
        self.items.iter().filter(|i| i.surface == Surface::Frame)
    }

    /// Items drawn onto the bitmap of `node`, if it was baked this frame.
    #[must_use]
    pub fn bake_items(&self, node: NodeId) -> &[RenderItem] {
        match self.bakes.iter().find(|b| b.node == node) {
            Some(bake) => &self.items[bake.items.clone()],
            None => &[],
        }
    }

    /// The frame item recorded for `node`.
    #[must_use]
    pub fn find(&self, node: NodeId) -> Option<&RenderItem> {
        self.frame_items().find(|i| i.node == node)
    }

    /// Nodes of the frame items, in draw order.
    #[must_use]
    pub fn frame_nodes(&self) -> Vec<NodeId> {
        self.frame_items().map(|i| i.node).collect()
    }
}

#[cfg(test)]
mod tests {
    use vellum_core::kurbo::Point;
    use vellum_core::node::SceneGraph;
    use vellum_core::path::PathCommands;

    use super::*;

    fn bound(kind: RendererKind) -> RendererState {
        let mut graph = SceneGraph::new();
        let mut state = RendererState::new(kind);
        state.node = Some(graph.create_container());
        state
    }

    #[test]
    fn unbound_snapshot_is_skipped() {
        let state = RendererState::new(RendererKind::Container);
        assert!(RenderItem::from_state(&state, Surface::Frame, 0).is_none());
    }

    #[test]
    fn clip_is_offset_by_pivot() {
        let mut state = bound(RendererKind::Container);
        state.clip_rect = Some(Rectangle::new(0.0, 0.0, 10.0, 10.0));
        state.pivot = Point::new(3.0, 4.0);
        let item = RenderItem::from_state(&state, Surface::Frame, 0).unwrap();
        assert_eq!(item.clip, Some(Rectangle::new(3.0, 4.0, 10.0, 10.0)));
    }

    #[test]
    fn bitmap_takes_precedence_over_payload_texture() {
        let mut state = bound(RendererKind::Textured);
        let own = TextureRef::new(TextureId(1), 4.0, 4.0);
        let baked = TextureRef::new(TextureId(9), 8.0, 8.0);
        state.payload = Payload::Textured { texture: Some(own) };
        let item = RenderItem::from_state(&state, Surface::Frame, 0).unwrap();
        assert_eq!(item.texture, Some(own));
        assert!(!item.cached);

        state.bitmap = Some(baked);
        let item = RenderItem::from_state(&state, Surface::Frame, 0).unwrap();
        assert_eq!(item.texture, Some(baked));
        assert!(item.cached);
    }

    #[test]
    fn drawable_depends_on_content() {
        let mut state = bound(RendererKind::Path);
        let item = RenderItem::from_state(&state, Surface::Frame, 0).unwrap();
        assert!(!item.is_drawable());

        let mut path = PathCommands::new();
        path.rect(0.0, 0.0, 1.0, 1.0);
        path.fill();
        state.payload = Payload::Path {
            commands: path.commands().to_vec(),
            bounds: path.bounds(),
        };
        let item = RenderItem::from_state(&state, Surface::Frame, 0).unwrap();
        assert!(item.is_drawable());

        state.alpha = 0.0;
        let item = RenderItem::from_state(&state, Surface::Frame, 0).unwrap();
        assert!(!item.is_drawable());
    }
}
