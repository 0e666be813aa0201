// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON export for vellum diagnostics.
//!
//! - [`pretty::PrettyPrintSink`]: a
//!   [`TraceSink`](vellum_core::trace::TraceSink) writing one human-readable
//!   line per frame event.
//! - [`json::plan_to_json`]: renders a recorded
//!   [`RenderPlan`](vellum_render::RenderPlan) as JSON for inspection or
//!   snapshot comparison.

pub mod json;
pub mod pretty;
