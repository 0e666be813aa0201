// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path command records and stroke styles.

use kurbo::Point;

use crate::geom::Rectangle;

/// Shape of open stroke ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CapsStyle {
    /// Flat end at the endpoint.
    Butt,
    /// Semicircular end.
    #[default]
    Round,
    /// Flat end extended by half the stroke width.
    Square,
}

/// Shape of stroke corners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JointStyle {
    /// Sharp corner, extended up to the miter limit.
    Miter,
    /// Rounded corner.
    #[default]
    Round,
    /// Cut-off corner.
    Bevel,
}

impl JointStyle {
    /// How far past half the stroke width a corner of this style may reach,
    /// as a multiple of the stroke width.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Miter => 1.0,
            Self::Round | Self::Bevel => 0.5,
        }
    }
}

/// Stroke settings recorded by [`PathCommands::line_style`].
///
/// [`PathCommands::line_style`]: super::PathCommands::line_style
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    /// Stroke width in local units.
    pub width: f64,
    /// Stroke color as `0xRRGGBB`.
    pub color: u32,
    /// Stroke opacity.
    pub alpha: f64,
    /// End caps.
    pub caps: CapsStyle,
    /// Corner joints.
    pub joints: JointStyle,
    /// Miter limit, used with [`JointStyle::Miter`].
    pub miter_limit: f64,
}

impl LineStyle {
    /// A black, opaque, round-capped, round-jointed stroke of `width`.
    #[must_use]
    pub const fn new(width: f64) -> Self {
        Self {
            width,
            color: 0,
            alpha: 1.0,
            caps: CapsStyle::Round,
            joints: JointStyle::Round,
            miter_limit: 3.0,
        }
    }

    /// Sets the color and opacity.
    #[must_use]
    pub const fn with_color(mut self, color: u32, alpha: f64) -> Self {
        self.color = color;
        self.alpha = alpha;
        self
    }

    /// Sets the caps style.
    #[must_use]
    pub const fn with_caps(mut self, caps: CapsStyle) -> Self {
        self.caps = caps;
        self
    }

    /// Sets the joints style and miter limit.
    #[must_use]
    pub const fn with_joints(mut self, joints: JointStyle, miter_limit: f64) -> Self {
        self.joints = joints;
        self.miter_limit = miter_limit;
        self
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// One record of a path command queue.
///
/// Geometric commands are followed by a [`Bounds`](Self::Bounds) record
/// holding their axis-aligned extent, so bounds can be derived by replaying
/// the queue without evaluating any curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    /// Starts a new sub-path and resets the stroke accumulator.
    BeginPath,
    /// Moves the pen without drawing.
    MoveTo(Point),
    /// Draws a straight segment from the pen to the point.
    LineTo(Point),
    /// Adds a circular arc. Angles are in radians, measured clockwise from
    /// the positive x axis in y-down space.
    Arc {
        /// Arc center.
        center: Point,
        /// Arc radius.
        radius: f64,
        /// Start angle.
        start_angle: f64,
        /// End angle.
        end_angle: f64,
        /// Sweep direction.
        anticlockwise: bool,
    },
    /// Adds a closed axis-aligned rectangle.
    Rect(Rectangle),
    /// Sets the stroke style.
    LineStyle(LineStyle),
    /// Sets the fill color and opacity.
    FillStyle {
        /// Fill color as `0xRRGGBB`.
        color: u32,
        /// Fill opacity.
        alpha: f64,
    },
    /// Extent of the preceding geometric command: the min and max corners.
    Bounds([Point; 2]),
    /// Fills the current path.
    Fill,
    /// Strokes the current path.
    Stroke,
    /// Closes the current sub-path.
    ClosePath,
}

/// Discriminant of a [`PathCommand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "variant names mirror PathCommand")]
pub enum PathCommandKind {
    BeginPath,
    MoveTo,
    LineTo,
    Arc,
    Rect,
    LineStyle,
    FillStyle,
    Bounds,
    Fill,
    Stroke,
    ClosePath,
}

impl PathCommand {
    /// Returns the command's kind tag.
    #[must_use]
    pub const fn kind(&self) -> PathCommandKind {
        match self {
            Self::BeginPath => PathCommandKind::BeginPath,
            Self::MoveTo(_) => PathCommandKind::MoveTo,
            Self::LineTo(_) => PathCommandKind::LineTo,
            Self::Arc { .. } => PathCommandKind::Arc,
            Self::Rect(_) => PathCommandKind::Rect,
            Self::LineStyle(_) => PathCommandKind::LineStyle,
            Self::FillStyle { .. } => PathCommandKind::FillStyle,
            Self::Bounds(_) => PathCommandKind::Bounds,
            Self::Fill => PathCommandKind::Fill,
            Self::Stroke => PathCommandKind::Stroke,
            Self::ClosePath => PathCommandKind::ClosePath,
        }
    }

    /// Whether drivers draw anything for this command. `Bounds` records
    /// exist only for bounds derivation.
    #[must_use]
    pub const fn is_drawable(&self) -> bool {
        !matches!(self, Self::Bounds(_))
    }
}
