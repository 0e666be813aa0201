// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured instrumentation for the frame walk.
//!
//! [`TraceSink`] has one method per event, each defaulting to a no-op, so a
//! sink only implements what it cares about.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. With the `trace` feature
//! **off**, every `Tracer` method compiles to nothing. With it **on**, each
//! method costs one `Option` branch before dispatching.
//!
//! The `log` facade is used alongside this for human-oriented messages; the
//! events here are for tools that want the data.

use crate::dirty::DirtyFlags;
use crate::driver::FrameStats;
use crate::geom::Rectangle;
use crate::node::NodeId;
use crate::renderer::RendererKind;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted before the first registration of a frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Root of the walk.
    pub root: NodeId,
}

/// Emitted when a node's snapshot is rebuilt.
#[derive(Clone, Copy, Debug)]
pub struct NodeRefreshEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Refreshed node.
    pub node: NodeId,
    /// Snapshot kind.
    pub kind: RendererKind,
    /// Dirty bits at refresh time.
    pub dirty: DirtyFlags,
}

/// Emitted after a subtree was baked into a bitmap.
#[derive(Clone, Copy, Debug)]
pub struct BakeEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Root of the baked subtree.
    pub node: NodeId,
    /// Local-space area of the bitmap.
    pub bounds: Rectangle,
}

/// Emitted once a frame walk completed.
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Counters for the frame.
    pub stats: FrameStats,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame walk.
pub trait TraceSink {
    /// Called at the start of a frame.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called for every snapshot rebuild.
    fn on_node_refresh(&mut self, e: &NodeRefreshEvent) {
        _ = e;
    }

    /// Called after a bake.
    fn on_bake(&mut self, e: &BakeEvent) {
        _ = e;
    }

    /// Called with the per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeRefreshEvent`].
    #[inline]
    pub fn node_refresh(&mut self, e: &NodeRefreshEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_refresh(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`BakeEvent`].
    #[inline]
    pub fn bake(&mut self, e: &BakeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_bake(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}
