// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode 2D scene graph with lazy, dirty-flag-driven re-validation.
//!
//! `vellum_core` owns a hierarchy of positioned, transformable nodes and hands
//! them, frame by frame, to a pluggable drawing backend. It never rasterizes:
//! each node keeps a backend-agnostic [`RendererState`](renderer::RendererState)
//! snapshot that is refreshed only when the node is dirty and then registered
//! with a [`Driver`](driver::Driver).
//!
//! Nodes live in a struct-of-arrays arena ([`SceneGraph`](node::SceneGraph))
//! addressed by generational [`NodeId`](node::NodeId) handles.
//!
//! # Architecture
//!
//! ```text
//!   mutators (set_x, set_alpha, edit_path, ...)
//!       │  mark DirtyFlags
//!       ▼
//!   SceneGraph ──► local / world transform (lazy, on read)
//!       │      └─► bounds(space, include_children) (lazy, parent-space cache)
//!       ▼
//!   render_frame(root, driver)
//!       │  per node: refresh RendererState iff RENDER, then register
//!       ▼
//!   Driver::register(&RendererState) ──► backend draw calls
//! ```
//!
//! **[`geom`]**: [`Rectangle`](geom::Rectangle) plus affine helpers on top of
//! `kurbo`.
//!
//! **[`dirty`]**: the per-node [`DirtyFlags`](dirty::DirtyFlags) bitmask and
//! its cross-invalidation masks.
//!
//! **[`transform`]**: local transform parameters and their fixed composition
//! order.
//!
//! **[`node`]**: the arena, tree editing, bounds queries, hit testing and the
//! per-frame walk.
//!
//! **[`path`]**: the append-only vector command queue and its bounds
//! derivation.
//!
//! **[`renderer`]**: renderer-state snapshots, payloads, blend modes and the
//! kind-keyed registry drivers build them from.
//!
//! **[`driver`]**: the [`Driver`](driver::Driver) contract and frame
//! configuration.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and frame events, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (enabled by default): Enables `std` support in dependencies. Without
//!   it the crate is `no_std` + `alloc` and uses `libm` float functions.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod driver;
pub mod error;
pub mod geom;
pub mod node;
pub mod path;
pub mod renderer;
pub mod trace;
pub mod transform;

pub use kurbo;
