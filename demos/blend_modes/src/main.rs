// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless blend-mode demo.
//!
//! Builds a small scene where groups set blend modes and alpha that their
//! `Auto` children inherit, animates it for a few frames through a
//! [`RecordingDriver`], and prints what each frame would draw. Trace events go
//! to stderr; set `RUST_LOG=debug` for the driver's log lines.
//!
//! Pass `--json` to dump the last plan as JSON instead of the summary table.

use std::f64::consts::TAU;
use std::io;

use vellum_core::driver::FrameConfig;
use vellum_core::kurbo::Affine;
use vellum_core::node::{NodeId, SceneGraph, TextLayout, TextureId, TextureRef};
use vellum_core::path::LineStyle;
use vellum_core::renderer::BlendMode;
use vellum_core::trace::Tracer;
use vellum_debug::json::write_plan;
use vellum_debug::pretty::PrettyPrintSink;
use vellum_render::{RecordingDriver, RenderPlan};

const FRAMES: u64 = 4;

struct Demo {
    graph: SceneGraph,
    root: NodeId,
    spinner: NodeId,
}

fn build() -> Demo {
    let mut graph = SceneGraph::new();
    let root = graph.create_container();

    let modes = [
        BlendMode::Normal,
        BlendMode::Add,
        BlendMode::Multiply,
        BlendMode::Screen,
    ];
    let mut spinner = root;
    for (column, mode) in modes.into_iter().enumerate() {
        let group = graph.create_container();
        graph.add_child(root, group);
        graph.set_position(group, 120.0 * column as f64, 0.0);
        graph.set_blend_mode(group, mode);
        graph.set_alpha(group, 1.0 - 0.2 * column as f64);

        let swatch = graph.create_sprite(Some(TextureRef::new(TextureId(1), 100.0, 100.0)));
        graph.add_child(group, swatch);

        let ring = graph.create_path();
        graph.add_child(group, ring);
        graph.set_position(ring, 50.0, 50.0);
        graph.edit_path(ring, |p| {
            p.line_style(LineStyle::new(6.0).with_color(0xff_ff_ff, 1.0));
            p.circle(0.0, 0.0, 30.0);
            p.stroke();
        });
        if column == 1 {
            spinner = ring;
        }

        let label = graph.create_text(TextLayout::new(format!("{mode:?}")).with_size(100.0, 18.0));
        graph.add_child(group, label);
        graph.set_position(label, 0.0, 110.0);
        // Opt out of the group's mode.
        graph.set_blend_mode(label, BlendMode::Normal);
    }

    Demo {
        graph,
        root,
        spinner,
    }
}

fn print_plan(plan: &RenderPlan) {
    println!("frame {}", plan.frame_index);
    for item in plan.frame_items() {
        let [.., tx, ty] = item.transform;
        println!(
            "  {:indent$}{:<9} {:<4} alpha={:.2} blend={:<8} at=({tx:.1}, {ty:.1}){}",
            "",
            item.kind.name(),
            item.node.to_string(),
            item.alpha,
            format!("{:?}", item.blend_mode),
            if item.is_drawable() { "" } else { " (empty)" },
            indent = 2 * item.depth as usize,
        );
    }
}

fn main() {
    let _ = env_logger::try_init();
    let json = std::env::args().any(|a| a == "--json");

    let Demo {
        mut graph,
        root,
        spinner,
    } = build();
    let mut driver = RecordingDriver::default();
    let mut sink = PrettyPrintSink::stderr().with_refreshes(false);
    // A retina-style device scale.
    let config = FrameConfig::DEFAULT.with_root_transform(Affine::scale(2.0));

    for frame in 0..FRAMES {
        graph.set_rotation(spinner, TAU * frame as f64 / FRAMES as f64);
        let mut tracer = Tracer::new(&mut sink);
        match graph.render_frame_traced(root, &mut driver, &config, &mut tracer) {
            Ok(stats) => log::info!(
                "frame {}: {} of {} snapshots refreshed",
                driver.plan().frame_index,
                stats.refreshed,
                stats.registered
            ),
            Err(e) => {
                log::error!("frame failed: {e}");
                return;
            }
        }
        if !json {
            print_plan(driver.plan());
        }
    }

    if json {
        if let Err(e) = write_plan(driver.plan(), &mut io::stdout()) {
            log::error!("writing plan failed: {e}");
        }
        println!();
    }
}
