// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plans and a headless recording driver for vellum.
//!
//! This crate sits between [`vellum_core`]'s frame walk and a real drawing
//! backend. It defines:
//!
//! - [`RenderItem`]: one registered snapshot, flattened for drawing
//! - [`RenderPlan`]: the items of one frame in back-to-front order, plus
//!   the subtrees baked into bitmaps along the way
//! - [`RecordingDriver`]: a [`Driver`](vellum_core::driver::Driver) that
//!   builds a [`RenderPlan`] instead of drawing, configured through
//!   [`RecordingDriverConfig`]
//!
//! The recording driver is what tests and headless tools render into. Its
//! config can withhold kinds or baking so every driver error path can be
//! reached.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod plan;
mod recording;

pub use plan::{BakeRecord, RenderItem, RenderPlan, Surface};
pub use recording::{RecordingDriver, RecordingDriverConfig};
