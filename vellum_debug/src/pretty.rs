// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use vellum_core::dirty::DirtyFlags;
use vellum_core::trace::{BakeEvent, FrameBeginEvent, FrameSummary, NodeRefreshEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    refreshes: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("refreshes", &self.refreshes)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            refreshes: true,
        }
    }

    /// Turns per-node refresh lines on or off. Frame and bake lines are
    /// always written.
    #[must_use]
    pub fn with_refreshes(mut self, enabled: bool) -> Self {
        self.refreshes = enabled;
        self
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Short names of the set bits, `-` when none are set.
fn dirty_names(flags: DirtyFlags) -> String {
    if flags.is_empty() {
        return "-".into();
    }
    flags
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("|")
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] frame={} root={}",
            e.frame_index, e.root,
        );
    }

    fn on_node_refresh(&mut self, e: &NodeRefreshEvent) {
        if !self.refreshes {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[refresh] frame={} node={} kind={} dirty={}",
            e.frame_index,
            e.node,
            e.kind,
            dirty_names(e.dirty),
        );
    }

    fn on_bake(&mut self, e: &BakeEvent) {
        let _ = writeln!(
            self.writer,
            "[bake] frame={} node={} bounds={:.1}",
            e.frame_index, e.node, e.bounds,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} registered={} refreshed={} created={} baked={}",
            s.frame_index,
            s.stats.registered,
            s.stats.refreshed,
            s.stats.created,
            s.stats.baked,
        );
    }
}

#[cfg(test)]
mod tests {
    use vellum_core::driver::FrameConfig;
    use vellum_core::node::{SceneGraph, TextureId, TextureRef};
    use vellum_core::trace::Tracer;
    use vellum_render::RecordingDriver;

    use super::*;

    fn traced_frame(sink: &mut PrettyPrintSink<Vec<u8>>) {
        let mut graph = SceneGraph::new();
        let root = graph.create_container();
        let sprite = graph.create_sprite(Some(TextureRef::new(TextureId(1), 8.0, 8.0)));
        graph.add_child(root, sprite);
        graph.set_cache_as_bitmap(root, true);

        let mut driver = RecordingDriver::default();
        let mut tracer = Tracer::new(sink);
        graph
            .render_frame_traced(root, &mut driver, &FrameConfig::DEFAULT, &mut tracer)
            .unwrap();
    }

    #[test]
    fn frame_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        traced_frame(&mut sink);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("[frame] frame=1 root=#0"), "got: {output}");
        assert!(output.contains("[bake] frame=1 node=#0"), "got: {output}");
        assert!(output.contains("kind=textured"), "got: {output}");
        assert!(
            lines.last().unwrap().contains("registered=3"),
            "got: {output}"
        );
    }

    #[test]
    fn refresh_lines_can_be_muted() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_refreshes(false);
        traced_frame(&mut sink);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!output.contains("[refresh]"), "got: {output}");
        assert!(output.contains("[summary]"), "got: {output}");
    }

    #[test]
    fn dirty_names_are_joined() {
        assert_eq!(dirty_names(DirtyFlags::empty()), "-");
        assert_eq!(
            dirty_names(DirtyFlags::RENDER | DirtyFlags::BOUNDS),
            "bounds|render"
        );
    }
}
