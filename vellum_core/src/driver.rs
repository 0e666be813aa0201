// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract between the scene graph and a drawing backend.
//!
//! A [`Driver`] supplies renderer-state snapshots for each node kind and
//! receives them back, in draw order, once per frame. The scene graph never
//! draws; everything pixel-related happens behind this trait.
//!
//! A frame, as seen by a driver:
//!
//! ```text
//! begin_frame
//!   register(root)
//!     register(child) ... children_rendered(child)
//!   children_rendered(root)
//! end_frame
//! ```
//!
//! Bitmap-cached subtrees nest a second walk between [`Driver::begin_bake`]
//! and [`Driver::end_bake`]; its registrations target the bake surface.

use kurbo::Affine;

use crate::error::DriverError;
use crate::geom::Rectangle;
use crate::node::{NodeId, TextureId};
use crate::renderer::{BlendMode, RendererKind, RendererState};

/// What a driver needs to set up an offscreen surface for a bake.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BakeRequest {
    /// Root of the subtree being baked.
    pub node: NodeId,
    /// Local-space area the bitmap covers. The bake walk maps its top-left
    /// corner to the surface origin.
    pub bounds: Rectangle,
}

/// A drawing backend.
///
/// Only [`renderer`](Self::renderer) and [`register`](Self::register) are
/// required. The frame hooks default to no-ops and baking defaults to
/// [`DriverError::BakeUnsupported`].
pub trait Driver {
    /// Called once before the first registration of a frame.
    fn begin_frame(&mut self, frame_index: u64) {
        _ = frame_index;
    }

    /// Returns a fresh snapshot for nodes of `kind`.
    ///
    /// Called once per node, the first time it is rendered.
    ///
    /// # Errors
    ///
    /// [`DriverError::UnsupportedKind`] if the driver cannot draw `kind`.
    /// Drivers must not substitute another kind.
    fn renderer(&self, kind: RendererKind) -> Result<RendererState, DriverError>;

    /// Receives a node's snapshot for drawing in this frame.
    ///
    /// # Errors
    ///
    /// Any error aborts the frame and is returned to the caller.
    fn register(&mut self, state: &RendererState) -> Result<(), DriverError>;

    /// Called after every child of a registered node has been registered.
    fn children_rendered(&mut self, state: &RendererState) {
        _ = state;
    }

    /// Redirects the following registrations to an offscreen surface.
    ///
    /// # Errors
    ///
    /// [`DriverError::BakeUnsupported`] unless overridden.
    fn begin_bake(&mut self, request: &BakeRequest) -> Result<(), DriverError> {
        _ = request;
        Err(DriverError::BakeUnsupported)
    }

    /// Finishes the surface opened by [`begin_bake`](Self::begin_bake) and
    /// returns its texture.
    ///
    /// # Errors
    ///
    /// [`DriverError::BakeUnsupported`] unless overridden.
    fn end_bake(&mut self) -> Result<TextureId, DriverError> {
        Err(DriverError::BakeUnsupported)
    }

    /// Called once after the last registration of a frame.
    fn end_frame(&mut self) {}
}

/// Per-frame settings for [`SceneGraph::render_frame`].
///
/// The stage values play the role of the root's parent: the root's alpha is
/// multiplied by `stage_alpha` and an `Auto` blend mode on the root resolves
/// to `stage_blend_mode`.
///
/// [`SceneGraph::render_frame`]: crate::node::SceneGraph::render_frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameConfig {
    /// Alpha the root inherits.
    pub stage_alpha: f64,
    /// Blend mode an `Auto` root resolves to.
    pub stage_blend_mode: BlendMode,
    /// Applied before every world transform, e.g. a device scale.
    pub root_transform: Affine,
}

impl FrameConfig {
    /// Opaque stage, normal blending, identity root transform.
    pub const DEFAULT: Self = Self {
        stage_alpha: 1.0,
        stage_blend_mode: BlendMode::Normal,
        root_transform: Affine::IDENTITY,
    };

    /// Returns a copy with the given root transform.
    #[must_use]
    pub const fn with_root_transform(mut self, transform: Affine) -> Self {
        self.root_transform = transform;
        self
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Counters from one call to [`SceneGraph::render_frame`].
///
/// [`SceneGraph::render_frame`]: crate::node::SceneGraph::render_frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Nodes whose snapshot was handed to the driver.
    pub registered: u32,
    /// Snapshots rebuilt this frame.
    pub refreshed: u32,
    /// Snapshots created through the driver factory this frame.
    pub created: u32,
    /// Subtrees baked into bitmaps this frame.
    pub baked: u32,
}
