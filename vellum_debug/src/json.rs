// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded render plans.
//!
//! [`plan_to_json`] turns a [`RenderPlan`] into a [`Value`] with one object
//! per item and per bake; [`write_plan`] writes it pretty-printed. Useful
//! for diffing frames and for feeding external viewers.

use std::io::{self, Write};

use serde_json::{Value, json};

use vellum_core::geom::Rectangle;
use vellum_core::renderer::Payload;
use vellum_render::{RenderItem, RenderPlan, Surface};

/// Converts a plan to JSON.
#[must_use]
pub fn plan_to_json(plan: &RenderPlan) -> Value {
    let items: Vec<Value> = plan.items.iter().map(item_to_json).collect();
    let bakes: Vec<Value> = plan
        .bakes
        .iter()
        .map(|b| {
            json!({
                "node": b.node.index(),
                "bounds": rect_to_json(&b.bounds),
                "texture": b.texture.0,
                "items": [b.items.start, b.items.end],
            })
        })
        .collect();
    json!({
        "frame_index": plan.frame_index,
        "items": items,
        "bakes": bakes,
    })
}

/// Writes [`plan_to_json`] pretty-printed to `writer`.
pub fn write_plan(plan: &RenderPlan, writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &plan_to_json(plan))?;
    Ok(())
}

fn item_to_json(item: &RenderItem) -> Value {
    let surface = match item.surface {
        Surface::Frame => Value::from("frame"),
        Surface::Bake(node) => json!({ "bake": node.index() }),
    };
    json!({
        "node": item.node.index(),
        "kind": item.kind.name(),
        "surface": surface,
        "depth": item.depth,
        "transform": item.transform,
        "alpha": item.alpha,
        "blend_mode": format!("{:?}", item.blend_mode),
        "visible": item.visible,
        "clip": item.clip.as_ref().map(rect_to_json),
        "texture": item.texture.map(|t| t.id.0),
        "cached": item.cached,
        "payload": payload_to_json(&item.payload),
    })
}

fn payload_to_json(payload: &Payload) -> Value {
    match payload {
        Payload::Container => Value::Null,
        Payload::Path { commands, bounds } => json!({
            "commands": commands.len(),
            "bounds": rect_to_json(bounds),
        }),
        Payload::Textured { .. } => Value::Null,
        Payload::Text { layout } => json!({
            "text": layout.text,
            "size": [layout.size.width, layout.size.height],
        }),
        Payload::Emitter { particles, .. } => json!({
            "particles": particles.len(),
        }),
    }
}

fn rect_to_json(r: &Rectangle) -> Value {
    json!([r.x, r.y, r.width, r.height])
}
