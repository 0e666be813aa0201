// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A driver that records a [`RenderPlan`] instead of drawing.

use alloc::vec::Vec;
use core::mem;

use vellum_core::driver::{BakeRequest, Driver};
use vellum_core::error::DriverError;
use vellum_core::node::TextureId;
use vellum_core::renderer::{RendererKind, RendererRegistry, RendererState};

use crate::plan::{BakeRecord, RenderItem, RenderPlan, Surface};

/// Configuration for a [`RecordingDriver`].
#[derive(Clone, Copy, Debug)]
pub struct RecordingDriverConfig {
    /// Constructors for the kinds the driver accepts.
    pub renderers: RendererRegistry,
    /// Whether subtrees can be baked into bitmaps.
    pub bake: bool,
    /// Rejects registrations once a frame holds this many items.
    pub max_items: Option<usize>,
    /// Texture id handed out for the first bake; later bakes count up.
    pub first_bake_texture: u32,
}

impl RecordingDriverConfig {
    /// Every kind, baking on, no item limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderers: RendererRegistry::with_defaults(),
            bake: true,
            max_items: None,
            first_bake_texture: 1,
        }
    }

    /// Returns a copy that reports `kind` as unsupported.
    #[must_use]
    pub fn without_kind(mut self, kind: RendererKind) -> Self {
        self.renderers.unregister(kind);
        self
    }

    /// Returns a copy that refuses to bake.
    #[must_use]
    pub const fn without_bake(mut self) -> Self {
        self.bake = false;
        self
    }

    /// Returns a copy that rejects registrations past `limit` items.
    #[must_use]
    pub const fn with_max_items(mut self, limit: usize) -> Self {
        self.max_items = Some(limit);
        self
    }
}

impl Default for RecordingDriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// An open bake: where its items start and the depth to restore after it.
#[derive(Clone, Copy, Debug)]
struct OpenBake {
    record: usize,
    first_item: usize,
    outer_depth: u32,
}

/// Headless [`Driver`] that turns registrations into a [`RenderPlan`].
///
/// The plan is reset by [`Driver::begin_frame`] and holds the last frame's
/// items until the next one starts.
#[derive(Debug)]
pub struct RecordingDriver {
    config: RecordingDriverConfig,
    plan: RenderPlan,
    depth: u32,
    bakes: Vec<OpenBake>,
    next_texture: u32,
    frames: u64,
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new(RecordingDriverConfig::new())
    }
}

impl RecordingDriver {
    /// Creates a driver with the given configuration.
    #[must_use]
    pub fn new(config: RecordingDriverConfig) -> Self {
        Self {
            config,
            plan: RenderPlan::new(),
            depth: 0,
            bakes: Vec::new(),
            next_texture: config.first_bake_texture,
            frames: 0,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RecordingDriverConfig {
        &self.config
    }

    /// Returns the plan of the last frame.
    #[must_use]
    pub const fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    /// Takes the plan of the last frame, leaving an empty one.
    pub fn take_plan(&mut self) -> RenderPlan {
        mem::take(&mut self.plan)
    }

    /// Number of frames begun so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    fn surface(&self) -> Surface {
        self.bakes
            .last()
            .map_or(Surface::Frame, |open| Surface::Bake(self.plan.bakes[open.record].node))
    }
}

impl Driver for RecordingDriver {
    fn begin_frame(&mut self, frame_index: u64) {
        self.plan.clear();
        self.plan.frame_index = frame_index;
        self.depth = 0;
        self.bakes.clear();
        self.frames += 1;
    }

    fn renderer(&self, kind: RendererKind) -> Result<RendererState, DriverError> {
        self.config.renderers.create(kind)
    }

    fn register(&mut self, state: &RendererState) -> Result<(), DriverError> {
        if self
            .config
            .max_items
            .is_some_and(|limit| self.plan.items.len() >= limit)
        {
            return Err(DriverError::Rejected {
                kind: state.kind(),
                reason: "plan item limit reached",
            });
        }
        let item = RenderItem::from_state(state, self.surface(), self.depth).ok_or(
            DriverError::Rejected {
                kind: state.kind(),
                reason: "snapshot is not bound to a node",
            },
        )?;
        self.plan.items.push(item);
        self.depth += 1;
        Ok(())
    }

    fn children_rendered(&mut self, _state: &RendererState) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn begin_bake(&mut self, request: &BakeRequest) -> Result<(), DriverError> {
        if !self.config.bake {
            return Err(DriverError::BakeUnsupported);
        }
        let texture = TextureId(self.next_texture);
        self.next_texture += 1;
        log::trace!("bake into {texture:?} for {}", request.node);

        let first_item = self.plan.items.len();
        self.bakes.push(OpenBake {
            record: self.plan.bakes.len(),
            first_item,
            outer_depth: self.depth,
        });
        self.plan.bakes.push(BakeRecord {
            node: request.node,
            bounds: request.bounds,
            texture,
            items: first_item..first_item,
        });
        self.depth = 0;
        Ok(())
    }

    fn end_bake(&mut self) -> Result<TextureId, DriverError> {
        let Some(open) = self.bakes.pop() else {
            return Err(DriverError::BakeUnsupported);
        };
        self.depth = open.outer_depth;
        let record = &mut self.plan.bakes[open.record];
        record.items = open.first_item..self.plan.items.len();
        Ok(record.texture)
    }

    fn end_frame(&mut self) {
        log::debug!(
            "recorded frame {}: {} items, {} bakes",
            self.plan.frame_index,
            self.plan.items.len(),
            self.plan.bakes.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use vellum_core::geom::Rectangle;
    use vellum_core::node::SceneGraph;

    use super::*;

    fn bound(graph: &mut SceneGraph) -> RendererState {
        let mut state = RendererState::new(RendererKind::Container);
        state.node = Some(graph.create_container());
        state
    }

    #[test]
    fn depth_follows_children_rendered() {
        let mut graph = SceneGraph::new();
        let mut driver = RecordingDriver::default();
        let (a, b, c) = (bound(&mut graph), bound(&mut graph), bound(&mut graph));

        driver.begin_frame(1);
        driver.register(&a).unwrap();
        driver.register(&b).unwrap();
        driver.children_rendered(&b);
        driver.register(&c).unwrap();
        driver.children_rendered(&c);
        driver.children_rendered(&a);

        let depths: Vec<u32> = driver.plan().items.iter().map(|i| i.depth).collect();
        assert_eq!(depths, [0, 1, 1]);
        assert_eq!(driver.plan().frame_index, 1);
    }

    #[test]
    fn begin_frame_resets_plan() {
        let mut graph = SceneGraph::new();
        let mut driver = RecordingDriver::default();
        let a = bound(&mut graph);
        driver.begin_frame(1);
        driver.register(&a).unwrap();
        driver.begin_frame(2);
        assert!(driver.plan().items.is_empty());
        assert_eq!(driver.frames(), 2);
    }

    #[test]
    fn unbound_snapshot_is_rejected() {
        let mut driver = RecordingDriver::default();
        driver.begin_frame(1);
        let err = driver
            .register(&RendererState::new(RendererKind::Text))
            .unwrap_err();
        assert!(matches!(
            err,
            DriverError::Rejected {
                kind: RendererKind::Text,
                ..
            }
        ));
    }

    #[test]
    fn item_limit_rejects() {
        let mut graph = SceneGraph::new();
        let mut driver = RecordingDriver::new(RecordingDriverConfig::new().with_max_items(1));
        let (a, b) = (bound(&mut graph), bound(&mut graph));
        driver.begin_frame(1);
        driver.register(&a).unwrap();
        assert_eq!(
            driver.register(&b),
            Err(DriverError::Rejected {
                kind: RendererKind::Container,
                reason: "plan item limit reached",
            })
        );
    }

    #[test]
    fn unsupported_kind() {
        let driver =
            RecordingDriver::new(RecordingDriverConfig::new().without_kind(RendererKind::Emitter));
        assert_eq!(
            driver.renderer(RendererKind::Emitter),
            Err(DriverError::UnsupportedKind(RendererKind::Emitter))
        );
        assert!(driver.renderer(RendererKind::Path).is_ok());
    }

    #[test]
    fn bake_items_land_on_bake_surface() {
        let mut graph = SceneGraph::new();
        let mut driver = RecordingDriver::default();
        let (outer, baked, inner) = (bound(&mut graph), bound(&mut graph), bound(&mut graph));
        let baked_id = baked.node.unwrap();

        driver.begin_frame(1);
        driver.register(&outer).unwrap();
        driver
            .begin_bake(&BakeRequest {
                node: baked_id,
                bounds: Rectangle::new(0.0, 0.0, 4.0, 4.0),
            })
            .unwrap();
        driver.register(&baked).unwrap();
        driver.register(&inner).unwrap();
        driver.children_rendered(&inner);
        driver.children_rendered(&baked);
        assert_eq!(driver.end_bake(), Ok(TextureId(1)));
        driver.register(&baked).unwrap();

        let plan = driver.plan();
        assert_eq!(plan.bake_items(baked_id).len(), 2);
        assert_eq!(plan.bake_items(baked_id)[1].depth, 1);
        assert_eq!(plan.frame_nodes(), [outer.node.unwrap(), baked_id]);
        assert_eq!(plan.find(baked_id).unwrap().depth, 1);
    }

    #[test]
    fn bake_can_be_disabled() {
        let mut graph = SceneGraph::new();
        let mut driver = RecordingDriver::new(RecordingDriverConfig::new().without_bake());
        let node = graph.create_container();
        assert_eq!(
            driver.begin_bake(&BakeRequest {
                node,
                bounds: Rectangle::ZERO,
            }),
            Err(DriverError::BakeUnsupported)
        );
        assert_eq!(driver.end_bake(), Err(DriverError::BakeUnsupported));
    }
}
