// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame walk that refreshes renderer snapshots and registers them
//! with a driver.
//!
//! Nodes are visited depth-first, parents before children, siblings back to
//! front. A node's snapshot is rebuilt when the node is render-dirty or its
//! parent's snapshot was rebuilt earlier in the same walk, since resolved
//! alpha and blend mode flow down the tree. Every visited node is registered,
//! rebuilt or not. Invisible nodes are registered but their children are not
//! visited.
//!
//! A node with bitmap caching enabled is baked the first time it is walked
//! and whenever its `RENDER_CACHE` bit is set: the walk recurses into it once
//! more with a pre-transform that maps its local bounds onto the bake
//! surface. Afterwards the node is registered as a single textured snapshot
//! with `skip_children` set.

use kurbo::Affine;

use crate::dirty::DirtyFlags;
use crate::driver::{BakeRequest, Driver, FrameConfig, FrameStats};
use crate::error::{DriverError, SceneResult};
use crate::geom::affine_is_finite;
use crate::renderer::{BlendMode, Payload, RendererState};
use crate::trace::{BakeEvent, FrameBeginEvent, FrameSummary, NodeRefreshEvent, Tracer};

use super::bounds::Target;
use super::content::{NodeContent, TextureRef};
use super::graph::{BitmapCache, SceneGraph};
use super::id::{INVALID, NodeId};

/// What a node inherits from its parent's snapshot.
#[derive(Clone, Copy, Debug)]
struct Inherited {
    alpha: f64,
    blend_mode: BlendMode,
    refreshed: bool,
}

/// Settings shared by every node of one walk.
#[derive(Clone, Copy, Debug)]
struct Pass {
    frame_index: u64,
    pre: Affine,
    baking: bool,
}

struct Walk<'t, 'a, D: ?Sized> {
    driver: &'t mut D,
    tracer: &'t mut Tracer<'a>,
    stats: FrameStats,
}

impl SceneGraph {
    /// Renders the subtree rooted at `root` into `driver`.
    ///
    /// # Errors
    ///
    /// Returns the first driver error. The walk stops there and
    /// [`Driver::end_frame`] is still called. The next frame then refreshes
    /// every snapshot it registers.
    ///
    /// # Panics
    ///
    /// Panics if `root` is stale or the config holds non-finite values.
    pub fn render_frame<D: Driver + ?Sized>(
        &mut self,
        root: NodeId,
        driver: &mut D,
        config: &FrameConfig,
    ) -> SceneResult<FrameStats> {
        self.render_frame_traced(root, driver, config, &mut Tracer::none())
    }

    /// [`render_frame`](Self::render_frame) with trace events.
    ///
    /// # Errors
    ///
    /// See [`render_frame`](Self::render_frame).
    pub fn render_frame_traced<D: Driver + ?Sized>(
        &mut self,
        root: NodeId,
        driver: &mut D,
        config: &FrameConfig,
        tracer: &mut Tracer<'_>,
    ) -> SceneResult<FrameStats> {
        self.validate(root);
        assert!(
            affine_is_finite(&config.root_transform) && !config.stage_alpha.is_nan(),
            "frame config must be finite: {config:?}"
        );

        self.frame_index += 1;
        let frame_index = self.frame_index;
        // A different root or stage changes what every snapshot inherits.
        let restage = self.last_frame != Some((root, *config));
        self.last_frame = Some((root, *config));

        tracer.frame_begin(&FrameBeginEvent { frame_index, root });
        driver.begin_frame(frame_index);

        let stage = Inherited {
            alpha: config.stage_alpha.clamp(0.0, 1.0),
            blend_mode: config.stage_blend_mode.resolve(BlendMode::Normal),
            refreshed: restage,
        };
        let pass = Pass {
            frame_index,
            pre: config.root_transform,
            baking: false,
        };
        let mut walk = Walk {
            driver,
            tracer,
            stats: FrameStats::default(),
        };
        let result = self.render_node(root.idx, stage, &pass, &mut walk);
        walk.driver.end_frame();

        let stats = walk.stats;
        if let Err(e) = result {
            // Nodes after the failure were skipped and may have missed a
            // parent refresh, so the next frame rebuilds every snapshot.
            self.last_frame = None;
            log::warn!("frame {frame_index} aborted at {root}: {e}");
            return Err(e);
        }

        log::trace!(
            "frame {frame_index}: {} registered, {} refreshed, {} baked",
            stats.registered,
            stats.refreshed,
            stats.baked
        );
        walk.tracer.frame_summary(&FrameSummary { frame_index, stats });
        Ok(stats)
    }

    fn render_node<D: Driver + ?Sized>(
        &mut self,
        idx: u32,
        parent: Inherited,
        pass: &Pass,
        walk: &mut Walk<'_, '_, D>,
    ) -> SceneResult<()> {
        let i = idx as usize;
        let props = self.display[i];
        let cached = !pass.baking && props.cache_as_bitmap && props.visible;

        if cached
            && (self.bitmap_cache[i].is_none() || self.dirty[i].contains(DirtyFlags::RENDER_CACHE))
        {
            self.bake(idx, pass, walk)?;
        }

        let mut state = self.take_renderer(idx, walk)?;
        let refreshed = pass.baking || parent.refreshed || self.dirty[i].contains(DirtyFlags::RENDER);
        let bitmap = if cached { self.bitmap_cache[i] } else { None };

        if refreshed {
            let dirty = self.dirty[i];
            match bitmap {
                Some(cache) => self.write_cached_snapshot(idx, &mut state, cache, parent, pass),
                None => self.write_snapshot(idx, &mut state, parent, pass),
            }
            self.dirty[i].remove(DirtyFlags::RENDER);
            walk.stats.refreshed += 1;
            log::trace!("refreshed {} ({})", self.id_at(idx), state.kind());
            walk.tracer.node_refresh(&NodeRefreshEvent {
                frame_index: pass.frame_index,
                node: self.id_at(idx),
                kind: state.kind(),
                dirty,
            });
        }
        if bitmap.is_none() {
            // A baked ancestor, if any, was re-baked before this walk reached
            // here.
            self.dirty[i].remove(DirtyFlags::RENDER_CACHE);
        }

        let result = self.register_and_descend(idx, &state, refreshed, pass, walk);
        self.renderer[i] = Some(state);
        result
    }

    fn register_and_descend<D: Driver + ?Sized>(
        &mut self,
        idx: u32,
        state: &RendererState,
        refreshed: bool,
        pass: &Pass,
        walk: &mut Walk<'_, '_, D>,
    ) -> SceneResult<()> {
        walk.driver.register(state)?;
        walk.stats.registered += 1;

        if state.visible && !state.skip_children {
            let inherited = Inherited {
                alpha: state.alpha,
                blend_mode: state.blend_mode,
                refreshed,
            };
            let mut child = self.first_child[idx as usize];
            while child != INVALID {
                self.render_node(child, inherited, pass, walk)?;
                child = self.next_sibling[child as usize];
            }
        }

        walk.driver.children_rendered(state);
        Ok(())
    }

    /// Takes the node's snapshot out of its slot, creating it through the
    /// driver on first use.
    fn take_renderer<D: Driver + ?Sized>(
        &mut self,
        idx: u32,
        walk: &mut Walk<'_, '_, D>,
    ) -> SceneResult<RendererState> {
        let i = idx as usize;
        if let Some(state) = self.renderer[i].take() {
            return Ok(state);
        }

        let kind = self.content[i].kind().renderer_kind();
        let mut state = walk.driver.renderer(kind)?;
        if state.kind() != kind {
            return Err(DriverError::PayloadMismatch {
                expected: kind,
                found: state.kind(),
            }
            .into());
        }
        state.node = Some(self.id_at(idx));
        self.dirty[i] |= DirtyFlags::RENDER;
        walk.stats.created += 1;
        Ok(state)
    }

    fn write_snapshot(&mut self, idx: u32, state: &mut RendererState, parent: Inherited, pass: &Pass) {
        let i = idx as usize;
        let world = self.world_at(idx);
        let props = self.display[i];

        state.transform = pass.pre * world;
        state.alpha = props.alpha * parent.alpha;
        state.blend_mode = props.blend_mode.resolve(parent.blend_mode);
        state.visible = props.visible;
        state.clip_rect = props.clip;
        state.dirty = self.dirty[i];
        state.snap_to_pixels = props.snap_to_pixels;
        state.skip_children = false;
        state.pivot = self.params[i].pivot();
        state.bitmap = None;
        write_payload(&mut state.payload, &self.content[i]);
    }

    /// Fills the snapshot that stands in for a baked subtree. The node's own
    /// alpha is already in the bitmap.
    fn write_cached_snapshot(
        &mut self,
        idx: u32,
        state: &mut RendererState,
        cache: BitmapCache,
        parent: Inherited,
        pass: &Pass,
    ) {
        let i = idx as usize;
        let world = self.world_at(idx);

        state.transform = pass.pre * world * Affine::translate((cache.bounds.x, cache.bounds.y));
        state.alpha = parent.alpha;
        state.blend_mode = self.display[i].blend_mode.resolve(parent.blend_mode);
        state.visible = true;
        state.clip_rect = None;
        state.dirty = self.dirty[i];
        state.snap_to_pixels = self.display[i].snap_to_pixels;
        state.skip_children = true;
        state.pivot = self.params[i].pivot();
        state.bitmap = Some(cache.texture);
    }

    fn bake<D: Driver + ?Sized>(
        &mut self,
        idx: u32,
        pass: &Pass,
        walk: &mut Walk<'_, '_, D>,
    ) -> SceneResult<()> {
        let i = idx as usize;
        let id = self.id_at(idx);
        let bounds = self.bounds_at(idx, Target::Of(idx), true);
        log::debug!("baking {id} over {bounds}");

        walk.driver.begin_bake(&BakeRequest { node: id, bounds })?;
        let bake_pass = Pass {
            frame_index: pass.frame_index,
            pre: Affine::translate((-bounds.x, -bounds.y)) * self.world_inverse_at(idx),
            baking: true,
        };
        let surface = Inherited {
            alpha: 1.0,
            blend_mode: BlendMode::Normal,
            refreshed: true,
        };
        self.render_node(idx, surface, &bake_pass, walk)?;
        let texture = walk.driver.end_bake()?;

        self.bitmap_cache[i] = Some(BitmapCache {
            texture: TextureRef::new(texture, bounds.width, bounds.height),
            bounds,
        });
        self.dirty[i].remove(DirtyFlags::RENDER_CACHE);
        // The bake overwrote the node's own snapshot.
        self.dirty[i] |= DirtyFlags::RENDER;
        walk.stats.baked += 1;
        walk.tracer.bake(&BakeEvent {
            frame_index: pass.frame_index,
            node: id,
            bounds,
        });
        Ok(())
    }
}

fn write_payload(payload: &mut Payload, content: &NodeContent) {
    match (payload, content) {
        (Payload::Container, NodeContent::Container) => {}
        (Payload::Path { commands, bounds }, NodeContent::Path(path)) => {
            commands.clear();
            commands.extend_from_slice(path.commands());
            *bounds = path.bounds();
        }
        (Payload::Textured { texture }, NodeContent::Sprite(sprite)) => *texture = *sprite,
        (Payload::Text { layout }, NodeContent::Text(text)) => layout.clone_from(text),
        (Payload::Emitter { texture, particles }, NodeContent::Emitter(emitter)) => {
            *texture = emitter.texture;
            particles.clone_from(&emitter.particles);
        }
        (payload, content) => unreachable!(
            "{:?} snapshot bound to a {:?} node; kinds are checked on creation",
            payload.kind(),
            content.kind()
        ),
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Point;

    use super::*;
    use crate::error::SceneError;
    use crate::geom::Rectangle;
    use crate::node::{NodeKind, TextureId};
    use crate::renderer::{RendererKind, RendererRegistry};

    /// Records registrations as `(node, alpha, blend)` plus bake brackets.
    #[derive(Default)]
    struct Log {
        registry: Option<RendererRegistry>,
        registered: Vec<(NodeId, f64, BlendMode, bool)>,
        bakes: Vec<BakeRequest>,
        children_done: u32,
        bake_support: bool,
    }

    impl Log {
        fn new() -> Self {
            Self {
                registry: Some(RendererRegistry::with_defaults()),
                bake_support: true,
                ..Self::default()
            }
        }

        fn states(&self) -> Vec<NodeId> {
            self.registered.iter().map(|r| r.0).collect()
        }
    }

    impl Driver for Log {
        fn renderer(&self, kind: RendererKind) -> Result<RendererState, DriverError> {
            self.registry
                .as_ref()
                .map_or(Err(DriverError::UnsupportedKind(kind)), |r| r.create(kind))
        }

        fn register(&mut self, state: &RendererState) -> Result<(), DriverError> {
            let node = state.node.expect("bound snapshot");
            self.registered
                .push((node, state.alpha, state.blend_mode, state.skip_children));
            Ok(())
        }

        fn children_rendered(&mut self, _state: &RendererState) {
            self.children_done += 1;
        }

        fn begin_bake(&mut self, request: &BakeRequest) -> Result<(), DriverError> {
            if !self.bake_support {
                return Err(DriverError::BakeUnsupported);
            }
            self.bakes.push(*request);
            Ok(())
        }

        fn end_bake(&mut self) -> Result<TextureId, DriverError> {
            Ok(TextureId(self.bakes.len() as u32))
        }
    }

    fn tree(graph: &mut SceneGraph) -> (NodeId, NodeId, NodeId) {
        let root = graph.create_container();
        let a = graph.create_sprite(Some(TextureRef::new(TextureId(1), 10.0, 10.0)));
        let b = graph.create_path();
        graph.add_child(root, a);
        graph.add_child(root, b);
        (root, a, b)
    }

    #[test]
    fn registers_in_draw_order() {
        let mut graph = SceneGraph::new();
        let (root, a, b) = tree(&mut graph);
        let mut driver = Log::new();
        let stats = graph
            .render_frame(root, &mut driver, &FrameConfig::DEFAULT)
            .unwrap();
        assert_eq!(driver.states(), [root, a, b]);
        assert_eq!(driver.children_done, 3);
        assert_eq!(stats.registered, 3);
        assert_eq!(stats.created, 3);
        assert_eq!(stats.refreshed, 3);
        assert_eq!(graph.frame_index(), 1);
    }

    #[test]
    fn clean_frame_registers_without_refresh() {
        let mut graph = SceneGraph::new();
        let (root, _a, _b) = tree(&mut graph);
        let mut driver = Log::new();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();
        let stats = graph
            .render_frame(root, &mut driver, &FrameConfig::DEFAULT)
            .unwrap();
        assert_eq!(stats.registered, 3);
        assert_eq!(stats.refreshed, 0);
        assert_eq!(stats.created, 0);
    }

    #[test]
    fn only_dirty_nodes_refresh() {
        let mut graph = SceneGraph::new();
        let (root, a, b) = tree(&mut graph);
        let mut driver = Log::new();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();

        graph.set_x(b, 4.0);
        let stats = graph
            .render_frame(root, &mut driver, &FrameConfig::DEFAULT)
            .unwrap();
        assert_eq!(stats.refreshed, 1);
        assert_eq!(
            graph.renderer_state(b).unwrap().transform,
            Affine::translate((4.0, 0.0))
        );
        assert!(!graph.dirty(a).contains(DirtyFlags::RENDER));
    }

    #[test]
    fn alpha_and_blend_resolve_through_parent() {
        let mut graph = SceneGraph::new();
        let (root, a, b) = tree(&mut graph);
        graph.set_alpha(root, 0.5);
        graph.set_alpha(a, 0.5);
        graph.set_blend_mode(root, BlendMode::Add);
        graph.set_blend_mode(b, BlendMode::Multiply);
        let mut driver = Log::new();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();

        let a_state = graph.renderer_state(a).unwrap();
        assert_eq!(a_state.alpha, 0.25);
        assert_eq!(a_state.blend_mode, BlendMode::Add);
        assert_eq!(graph.renderer_state(b).unwrap().blend_mode, BlendMode::Multiply);
        assert_eq!(graph.renderer_state(root).unwrap().blend_mode, BlendMode::Add);

        // Changing only the parent still refreshes the children.
        graph.set_alpha(root, 1.0);
        let stats = graph
            .render_frame(root, &mut driver, &FrameConfig::DEFAULT)
            .unwrap();
        assert_eq!(stats.refreshed, 3);
        assert_eq!(graph.renderer_state(a).unwrap().alpha, 0.5);
    }

    #[test]
    fn auto_root_takes_stage_mode() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let mut driver = Log::new();
        let config = FrameConfig {
            stage_blend_mode: BlendMode::Screen,
            stage_alpha: 0.5,
            ..FrameConfig::DEFAULT
        };
        graph.render_frame(root, &mut driver, &config).unwrap();
        let state = graph.renderer_state(root).unwrap();
        assert_eq!(state.blend_mode, BlendMode::Screen);
        assert_eq!(state.alpha, 0.5);
    }

    #[test]
    fn root_transform_change_refreshes_everything() {
        let mut graph = SceneGraph::new();
        let (root, a, _b) = tree(&mut graph);
        let mut driver = Log::new();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();

        let scaled = FrameConfig::DEFAULT.with_root_transform(Affine::scale(2.0));
        let stats = graph.render_frame(root, &mut driver, &scaled).unwrap();
        assert_eq!(stats.refreshed, 3);
        assert_eq!(graph.renderer_state(a).unwrap().transform, Affine::scale(2.0));
    }

    #[test]
    fn invisible_node_registered_but_children_skipped() {
        let mut graph = SceneGraph::new();
        let (root, a, b) = tree(&mut graph);
        graph.set_visible(root, false);
        let mut driver = Log::new();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();
        assert_eq!(driver.states(), [root]);
        assert!(!graph.renderer_state(root).unwrap().visible);
        assert!(graph.renderer_state(a).is_none());

        graph.set_visible(root, true);
        driver.registered.clear();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();
        assert_eq!(driver.states(), [root, a, b]);
    }

    #[test]
    fn unsupported_kind_is_surfaced() {
        let mut graph = SceneGraph::new();
        let (root, _a, _b) = tree(&mut graph);
        let mut driver = Log::new();
        let mut registry = RendererRegistry::with_defaults();
        registry.unregister(RendererKind::Path);
        driver.registry = Some(registry);
        assert_eq!(
            graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT),
            Err(SceneError::Driver(DriverError::UnsupportedKind(
                RendererKind::Path
            )))
        );
    }

    #[test]
    fn path_payload_carries_commands() {
        let mut graph = SceneGraph::new();
        let (root, _a, b) = tree(&mut graph);
        graph.edit_path(b, |p| {
            p.rect(0.0, 0.0, 8.0, 4.0);
            p.fill();
        });
        let mut driver = Log::new();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();
        match &graph.renderer_state(b).unwrap().payload {
            Payload::Path { commands, bounds } => {
                assert_eq!(commands.as_slice(), graph.path(b).commands());
                assert_eq!(*bounds, Rectangle::new(0.0, 0.0, 8.0, 4.0));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn cached_subtree_bakes_once() {
        let mut graph = SceneGraph::new();
        let (root, a, b) = tree(&mut graph);
        graph.set_position(root, 50.0, 50.0);
        graph.set_position(a, -5.0, -5.0);
        graph.set_cache_as_bitmap(root, true);
        let mut driver = Log::new();

        let stats = graph
            .render_frame(root, &mut driver, &FrameConfig::DEFAULT)
            .unwrap();
        assert_eq!(stats.baked, 1);
        assert_eq!(driver.bakes[0].bounds, Rectangle::new(-5.0, -5.0, 10.0, 10.0));
        // The bake walk, then the cached stand-in.
        assert_eq!(driver.states(), [root, a, b, root]);
        assert!(driver.registered[3].3);

        let cached = graph.renderer_state(root).unwrap();
        assert_eq!(cached.bitmap.map(|t| t.id), Some(TextureId(1)));
        assert_eq!(cached.transform, Affine::translate((45.0, 45.0)));
        // Inside the bake the sprite sits at the surface origin.
        assert_eq!(graph.renderer_state(a).unwrap().transform, Affine::IDENTITY);

        driver.registered.clear();
        let stats = graph
            .render_frame(root, &mut driver, &FrameConfig::DEFAULT)
            .unwrap();
        assert_eq!(stats.baked, 0);
        assert_eq!(driver.states(), [root]);

        // Moving the cached node does not re-bake; changing a child does.
        graph.set_x(root, 0.0);
        let stats = graph
            .render_frame(root, &mut driver, &FrameConfig::DEFAULT)
            .unwrap();
        assert_eq!(stats.baked, 0);
        graph.set_alpha(a, 0.5);
        let stats = graph
            .render_frame(root, &mut driver, &FrameConfig::DEFAULT)
            .unwrap();
        assert_eq!(stats.baked, 1);
    }

    #[test]
    fn disabling_cache_restores_children() {
        let mut graph = SceneGraph::new();
        let (root, a, b) = tree(&mut graph);
        graph.set_cache_as_bitmap(root, true);
        let mut driver = Log::new();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();

        graph.set_cache_as_bitmap(root, false);
        driver.registered.clear();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();
        assert_eq!(driver.states(), [root, a, b]);
        let state = graph.renderer_state(root).unwrap();
        assert!(state.bitmap.is_none());
        assert!(!state.skip_children);
    }

    #[test]
    fn bake_without_support_fails() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node(NodeKind::Container);
        graph.set_cache_as_bitmap(root, true);
        let mut driver = Log::new();
        driver.bake_support = false;
        assert_eq!(
            graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT),
            Err(SceneError::Driver(DriverError::BakeUnsupported))
        );
        assert_eq!(graph.bitmap_cache(root), None);
    }

    #[test]
    fn snapshot_echoes_pivot_and_clip() {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        graph.set_pivot(root, 2.0, 3.0);
        graph.set_clip(root, Some(Rectangle::new(0.0, 0.0, 4.0, 4.0)));
        graph.set_snap_to_pixels(root, true);
        let mut driver = Log::new();
        graph.render_frame(root, &mut driver, &FrameConfig::DEFAULT).unwrap();
        let state = graph.renderer_state(root).unwrap();
        assert_eq!(state.pivot, Point::new(2.0, 3.0));
        assert_eq!(state.clip_rect, Some(Rectangle::new(0.0, 0.0, 4.0, 4.0)));
        assert!(state.snap_to_pixels);
        assert!(state.dirty.contains(DirtyFlags::RENDER));
        assert_eq!(state.transform, Affine::translate((-2.0, -3.0)));
    }
}
