// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable error types.
//!
//! Caller bugs (stale handles, non-finite numbers, cycles) panic instead;
//! these types cover failures a correct caller can still run into.

use crate::node::NodeId;
use crate::renderer::RendererKind;

/// Convenience result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Failures reported by a [`Driver`](crate::driver::Driver).
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// The driver has no renderer for this kind.
    #[error("driver has no renderer for {0} nodes")]
    UnsupportedKind(RendererKind),

    /// The driver's factory built a snapshot of the wrong kind.
    #[error("renderer factory for {expected} nodes built a {found} state")]
    PayloadMismatch {
        /// Kind that was requested.
        expected: RendererKind,
        /// Kind that was returned.
        found: RendererKind,
    },

    /// The driver cannot render subtrees into bitmaps.
    #[error("driver does not support bitmap caching")]
    BakeUnsupported,

    /// The driver refused a registration.
    #[error("driver rejected {kind} renderer: {reason}")]
    Rejected {
        /// Kind of the rejected snapshot.
        kind: RendererKind,
        /// Short explanation from the driver.
        reason: &'static str,
    },
}

/// Failures of scene-graph queries and frame walks.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// A cross-space query named two nodes with no common root.
    #[error("{node} and {reference} are not in the same tree")]
    Detached {
        /// Node being measured.
        node: NodeId,
        /// Node whose space was requested.
        reference: NodeId,
    },

    /// The driver failed while rendering a frame.
    #[error(transparent)]
    Driver(#[from] DriverError),
}
