// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vector path command queues.
//!
//! A [`PathCommands`] queue is the only record of a path node's geometry.
//! Drivers replay it to draw; [`PathCommands::bounds`] replays it to derive
//! the node's local bounds without rasterizing anything. Every geometric
//! command is followed by a [`PathCommand::Bounds`] record with its extent,
//! computed analytically when the command is recorded.
//!
//! ```
//! use vellum_core::path::{LineStyle, PathCommands};
//! use vellum_core::geom::Rectangle;
//!
//! let mut path = PathCommands::new();
//! path.line_style(LineStyle::new(4.0));
//! path.line_to(10.0, 0.0);
//! path.stroke();
//! assert!(path.bounds().equals(&Rectangle::new(-2.0, -2.0, 14.0, 4.0), 1e-9));
//! ```

mod bounds;
mod command;

use alloc::vec::Vec;

use kurbo::Point;

use crate::geom::Rectangle;

pub use bounds::{arc_extent, derive_bounds};
pub use command::{CapsStyle, JointStyle, LineStyle, PathCommand, PathCommandKind};

/// An append-only queue of path commands plus the current pen position.
#[derive(Clone, Debug, PartialEq)]
pub struct PathCommands {
    commands: Vec<PathCommand>,
    pen: Point,
}

impl Default for PathCommands {
    fn default() -> Self {
        Self::new()
    }
}

impl PathCommands {
    /// Creates a queue holding a single implicit `BeginPath`.
    #[must_use]
    pub fn new() -> Self {
        let mut commands = Vec::with_capacity(8);
        commands.push(PathCommand::BeginPath);
        Self {
            commands,
            pen: Point::ZERO,
        }
    }

    /// The recorded commands, in order.
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Number of recorded commands, including `Bounds` records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing beyond the implicit `BeginPath` was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.len() <= 1
    }

    /// The current pen position.
    #[must_use]
    pub const fn pen(&self) -> Point {
        self.pen
    }

    /// Drops every command and resets the pen to the origin.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(PathCommand::BeginPath);
        self.pen = Point::ZERO;
    }

    /// Starts a new sub-path.
    pub fn begin_path(&mut self) {
        self.commands.push(PathCommand::BeginPath);
    }

    /// Closes the current sub-path.
    pub fn close_path(&mut self) {
        self.commands.push(PathCommand::ClosePath);
    }

    /// Moves the pen to `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if a coordinate is not finite.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let to = finite_point(x, y);
        self.pen = to;
        self.commands.push(PathCommand::MoveTo(to));
    }

    /// Draws a line from the pen to `(x, y)` and moves the pen there.
    ///
    /// # Panics
    ///
    /// Panics if a coordinate is not finite.
    pub fn line_to(&mut self, x: f64, y: f64) {
        let to = finite_point(x, y);
        let from = self.pen;
        self.pen = to;
        self.commands.push(PathCommand::LineTo(to));
        self.commands.push(PathCommand::Bounds([from, to]));
    }

    /// Adds a circular arc around `(x, y)`.
    ///
    /// A sweep of 2π or more is a full circle.
    ///
    /// # Panics
    ///
    /// Panics if an argument is not finite or the radius is negative.
    pub fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        let center = finite_point(x, y);
        assert!(
            radius.is_finite() && radius >= 0.0,
            "arc radius must be finite and non-negative, got {radius}"
        );
        assert!(
            start_angle.is_finite() && end_angle.is_finite(),
            "arc angles must be finite"
        );
        let extent = arc_extent(center, radius, start_angle, end_angle, anticlockwise);
        self.commands.push(PathCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
        self.commands.push(PathCommand::Bounds(extent));
    }

    /// Adds a full circle around `(x, y)`.
    pub fn circle(&mut self, x: f64, y: f64, radius: f64) {
        self.arc(x, y, radius, 0.0, core::f64::consts::TAU, false);
    }

    /// Adds a closed rectangle.
    ///
    /// # Panics
    ///
    /// Panics if a component is not finite.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let origin = finite_point(x, y);
        let corner = finite_point(x + width, y + height);
        let r = Rectangle::new(x, y, width, height);
        self.commands.push(PathCommand::Rect(r));
        self.commands.push(PathCommand::Bounds([
            Point::new(origin.x.min(corner.x), origin.y.min(corner.y)),
            Point::new(origin.x.max(corner.x), origin.y.max(corner.y)),
        ]));
    }

    /// Sets the stroke style. Styles with a width of zero or less are
    /// ignored.
    ///
    /// # Panics
    ///
    /// Panics if the width, alpha or miter limit is NaN.
    pub fn line_style(&mut self, style: LineStyle) {
        assert!(
            !style.width.is_nan() && !style.alpha.is_nan() && !style.miter_limit.is_nan(),
            "line style must not contain NaN: {style:?}"
        );
        if style.width <= 0.0 {
            return;
        }
        self.commands.push(PathCommand::LineStyle(style));
    }

    /// Sets the fill color and opacity.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is NaN.
    pub fn fill_style(&mut self, color: u32, alpha: f64) {
        assert!(!alpha.is_nan(), "fill alpha must not be NaN");
        self.commands.push(PathCommand::FillStyle { color, alpha });
    }

    /// Fills the current path.
    pub fn fill(&mut self) {
        self.commands.push(PathCommand::Fill);
    }

    /// Strokes the current path.
    pub fn stroke(&mut self) {
        self.commands.push(PathCommand::Stroke);
    }

    /// Derives local bounds by replaying the queue. An unpainted queue has
    /// zero bounds.
    #[must_use]
    pub fn bounds(&self) -> Rectangle {
        derive_bounds(&self.commands).unwrap_or(Rectangle::ZERO)
    }
}

fn finite_point(x: f64, y: f64) -> Point {
    assert!(
        x.is_finite() && y.is_finite(),
        "path coordinates must be finite, got ({x}, {y})"
    );
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use core::f64::consts::PI;

    use super::*;

    #[test]
    fn starts_with_begin_path() {
        let path = PathCommands::new();
        assert_eq!(path.commands(), &[PathCommand::BeginPath]);
        assert!(path.is_empty());
    }

    #[test]
    fn clear_resets_queue_and_pen() {
        let mut path = PathCommands::new();
        path.move_to(4.0, 4.0);
        path.line_to(8.0, 8.0);
        path.fill();
        path.clear();
        assert_eq!(path.commands(), &[PathCommand::BeginPath]);
        assert_eq!(path.pen(), Point::ZERO);
        assert_eq!(path.bounds(), Rectangle::ZERO);
    }

    #[test]
    fn line_to_records_segment_extent() {
        let mut path = PathCommands::new();
        path.move_to(5.0, 5.0);
        path.line_to(-5.0, 10.0);
        assert_eq!(
            path.commands()[3],
            PathCommand::Bounds([Point::new(5.0, 5.0), Point::new(-5.0, 10.0)])
        );
        assert_eq!(path.pen(), Point::new(-5.0, 10.0));
    }

    #[test]
    fn stroked_line_with_round_joints() {
        let mut path = PathCommands::new();
        path.line_style(LineStyle::new(4.0));
        path.line_to(10.0, 0.0);
        path.stroke();
        let b = path.bounds();
        assert!(b.equals(&Rectangle::new(-2.0, -2.0, 14.0, 4.0), 1e-9), "{b}");
    }

    #[test]
    fn half_arc_bounds() {
        let mut path = PathCommands::new();
        path.arc(0.0, 0.0, 10.0, 0.0, PI, false);
        path.fill();
        let b = path.bounds();
        assert!(b.equals(&Rectangle::new(-10.0, 0.0, 20.0, 10.0), 1e-9), "{b}");
        assert!(b.contains_xy(10.0, 0.0));
        assert!(b.contains_xy(0.0, 10.0));
    }

    #[test]
    fn circle_and_rect() {
        let mut path = PathCommands::new();
        path.circle(0.0, 0.0, 5.0);
        path.fill();
        path.begin_path();
        path.rect(20.0, 20.0, -10.0, 10.0);
        path.fill();
        assert_eq!(path.bounds(), Rectangle::new(-5.0, -5.0, 25.0, 35.0));
    }

    #[test]
    fn non_positive_line_width_is_ignored() {
        let mut path = PathCommands::new();
        path.line_style(LineStyle::new(0.0));
        path.line_style(LineStyle::new(-3.0));
        assert!(path.is_empty());
    }

    #[test]
    #[should_panic(expected = "path coordinates must be finite")]
    fn infinite_coordinate_panics() {
        let mut path = PathCommands::new();
        path.line_to(f64::INFINITY, 0.0);
    }
}
