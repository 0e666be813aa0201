// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene-graph data model.
//!
//! A *node* is an element of the scene tree. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: parent, first-child and sibling links forming an ordered tree.
//!   Sibling order is draw order, back to front.
//! - **Transform parameters** (position, scale, rotation, skew, pivot) from
//!   which the local matrix is derived.
//! - **Display properties**: alpha, blend mode, visibility, clip rectangle,
//!   bitmap caching and pixel snapping.
//! - **Content** determined by its [`NodeKind`]: nothing, a path command
//!   queue, a texture, a text layout or a particle set.
//!
//! Derived values are cached per node and recomputed lazily:
//!
//! - [`local_transform`](SceneGraph::local_transform),
//!   [`world_transform`](SceneGraph::world_transform) and
//!   [`world_inverse`](SceneGraph::world_inverse) on read;
//! - [`bounds`](SceneGraph::bounds) on query, with a parent-space cache;
//! - the renderer snapshot during [`render_frame`](SceneGraph::render_frame).
//!
//! # Dirty tracking
//!
//! Mutators set bits in the node's [`DirtyFlags`](crate::dirty::DirtyFlags)
//! and those of the nodes whose caches depend on it; see [`crate::dirty`] for
//! which mutation stales what. Setting a property to its current value leaves
//! every bit untouched.

mod bounds;
mod content;
mod frame;
mod graph;
mod hit;
mod id;
mod traverse;

pub use bounds::Space;
pub use content::{
    EmitterContent, NodeKind, Particle, TextAlign, TextLayout, TextStyle, TextureRef,
};
pub use graph::{BitmapCache, SceneGraph};
pub use id::{INVALID, NodeId, TextureId};
pub use traverse::Children;
