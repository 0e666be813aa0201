// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounds derivation by replaying a command queue.
//!
//! Each sub-path (the commands between two `BeginPath` records) keeps an
//! accumulator: the extent of the `Bounds` points seen so far, the widest
//! stroke width and the joint multiplier. `Fill` folds the raw extent into the
//! sub-path bounds; `Stroke` folds it in inflated by the stroke reach. The
//! union over all sub-paths is the result.
//!
//! Nothing here allocates, so the pass can run on every bounds query.

use core::f64::consts::{FRAC_PI_2, TAU};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use crate::geom::Rectangle;

use super::command::{JointStyle, PathCommand};

#[derive(Clone, Copy, Debug)]
struct SubPath {
    bounds: Option<Rectangle>,
    min: Point,
    max: Point,
    points: usize,
    max_line_width: f64,
    last_line_width: f64,
    joint_multiplier: f64,
}

impl SubPath {
    const EMPTY: Self = Self {
        bounds: None,
        min: Point::new(f64::MAX, f64::MAX),
        max: Point::new(f64::MIN, f64::MIN),
        points: 0,
        max_line_width: 0.0,
        last_line_width: 0.0,
        joint_multiplier: JointStyle::Round.multiplier(),
    };

    fn push(&mut self, p: Point) {
        self.min = Point::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Point::new(self.max.x.max(p.x), self.max.y.max(p.y));
        self.points += 1;
    }

    fn extent(&self) -> Option<Rectangle> {
        (self.points > 0).then(|| {
            Rectangle::new(
                self.min.x,
                self.min.y,
                self.max.x - self.min.x,
                self.max.y - self.min.y,
            )
        })
    }

    fn fold(&mut self, r: Rectangle) {
        match &mut self.bounds {
            Some(b) => {
                b.union(&r);
            }
            None => self.bounds = Some(r),
        }
    }

    fn fill(&mut self) {
        if let Some(extent) = self.extent() {
            self.fold(extent);
        }
    }

    fn stroke(&mut self) {
        self.max_line_width = self.max_line_width.max(self.last_line_width);
        let width = if self.max_line_width == 0.0 {
            1.0
        } else {
            self.max_line_width
        };
        let reach = width * self.joint_multiplier;
        if let Some(mut extent) = self.extent() {
            // A lone point has no direction to stroke along.
            if self.points > 1 {
                extent.inflate(reach, reach);
            }
            self.fold(extent);
        }
    }
}

fn fold_into(total: &mut Option<Rectangle>, r: Option<Rectangle>) {
    match (total.as_mut(), r) {
        (Some(t), Some(r)) => {
            t.union(&r);
        }
        (None, Some(r)) => *total = Some(r),
        (_, None) => {}
    }
}

/// Derives the local bounds of a command queue, or `None` if nothing in it
/// was filled or stroked.
#[must_use]
pub fn derive_bounds(commands: &[PathCommand]) -> Option<Rectangle> {
    let mut total = None;
    let mut path = SubPath::EMPTY;

    for cmd in commands {
        match cmd {
            PathCommand::BeginPath => {
                fold_into(&mut total, path.bounds);
                path = SubPath::EMPTY;
            }
            PathCommand::Bounds([a, b]) => {
                path.push(*a);
                path.push(*b);
            }
            PathCommand::LineStyle(style) => {
                path.last_line_width = style.width;
                path.joint_multiplier = path.joint_multiplier.max(style.joints.multiplier());
            }
            PathCommand::Fill => path.fill(),
            PathCommand::Stroke => path.stroke(),
            _ => {}
        }
    }

    fold_into(&mut total, path.bounds);
    total
}

/// Computes the axis-aligned extent of a circular arc as min and max
/// corners.
///
/// Extremes of a circle lie on the axis-aligned angles, so the extent is
/// spanned by the two endpoints plus every multiple of π/2 the sweep
/// crosses. A sweep of 2π or more covers the full circle.
#[must_use]
pub fn arc_extent(
    center: Point,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    anticlockwise: bool,
) -> [Point; 2] {
    if (start_angle - end_angle).abs() >= TAU {
        return [
            Point::new(center.x - radius, center.y - radius),
            Point::new(center.x + radius, center.y + radius),
        ];
    }

    // Normalize to a clockwise sweep from `s` to `e`, with `s` within one
    // turn of zero.
    let (from, to) = if anticlockwise {
        (end_angle, start_angle)
    } else {
        (start_angle, end_angle)
    };
    let mut sweep = to - from;
    if sweep < 0.0 {
        sweep += TAU;
    }
    let s = from % TAU;
    let e = s + sweep;

    let on_circle = |angle: f64| {
        Point::new(
            center.x + angle.cos() * radius,
            center.y + angle.sin() * radius,
        )
    };

    let first = on_circle(s);
    let mut min = first;
    let mut max = first;
    let mut include = |p: Point| {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    };
    include(on_circle(e));

    // A sweep under one turn crosses at most four axis angles.
    let mut angle = ((s / FRAC_PI_2).floor() + 1.0) * FRAC_PI_2;
    for _ in 0..4 {
        if angle >= e {
            break;
        }
        include(on_circle(angle));
        angle += FRAC_PI_2;
    }

    [min, max]
}
