// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node dirty flags.
//!
//! Every node carries a [`DirtyFlags`] bitmask. Each bit guards one cached,
//! derived value; a set bit means the cache is stale and must be recomputed
//! before its next use. Readers clear the bit they recompute.
//!
//! # Cross-invalidation
//!
//! One mutation usually stales several caches, but never more than it has to:
//!
//! - A change to a node's own transform parameters sets [`SELF_TRANSFORM`] on
//!   the node and [`INHERITED_TRANSFORM`] on every descendant. Descendants
//!   keep their local matrix; only their world matrix moves.
//! - Alpha, visibility and blend-mode changes set [`RENDER`] on the node alone.
//! - Clip and content changes (path commands, texture, text) also set
//!   [`BOUNDS`] on the node.
//! - Anything that can move or reshape a node sets [`BOUNDS`] on every
//!   ancestor, since an ancestor's cached bounds include its descendants, and
//!   [`RENDER_CACHE`] on every ancestor so a baked bitmap is re-rendered.
//!
//! [`SELF_TRANSFORM`]: DirtyFlags::SELF_TRANSFORM
//! [`INHERITED_TRANSFORM`]: DirtyFlags::INHERITED_TRANSFORM
//! [`RENDER`]: DirtyFlags::RENDER
//! [`BOUNDS`]: DirtyFlags::BOUNDS
//! [`RENDER_CACHE`]: DirtyFlags::RENDER_CACHE

use bitflags::bitflags;

bitflags! {
    /// Stale-cache bits for a single node.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        /// Local matrix is stale.
        const TRANSFORM = 1 << 0;
        /// World matrix is stale.
        const WORLD = 1 << 1;
        /// Inverse world matrix is stale.
        const WORLD_INV = 1 << 2;
        /// Cached parent-space bounds are stale.
        const BOUNDS = 1 << 3;
        /// Renderer-state snapshot is stale.
        const RENDER = 1 << 4;
        /// Baked bitmap of the subtree is stale.
        const RENDER_CACHE = 1 << 5;
    }
}

impl DirtyFlags {
    /// Bits set on a node whose own transform parameters changed.
    ///
    /// `RENDER` is included because the snapshot carries the world transform.
    pub const SELF_TRANSFORM: Self = Self::TRANSFORM
        .union(Self::WORLD)
        .union(Self::WORLD_INV)
        .union(Self::BOUNDS)
        .union(Self::RENDER);

    /// Bits set on every descendant of a node whose transform changed.
    pub const INHERITED_TRANSFORM: Self = Self::WORLD
        .union(Self::WORLD_INV)
        .union(Self::BOUNDS)
        .union(Self::RENDER);

    /// Bits set on every ancestor of a node that moved or changed shape.
    pub const ANCESTOR: Self = Self::BOUNDS.union(Self::RENDER_CACHE);
}
