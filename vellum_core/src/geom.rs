// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry value types.
//!
//! Points, vectors and the 2×3 affine matrix come straight from [`kurbo`]
//! ([`Point`], [`Vec2`], [`Affine`]). All of them are `Copy` values, so
//! temporaries used mid-computation live on the stack and there is nothing to
//! borrow from or return to a pool.
//!
//! This module adds [`Rectangle`], an origin-plus-size rectangle carrying the
//! edge and corner vocabulary the bounds code is written in, and converts it
//! to and from [`kurbo::Rect`].

use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point, Rect, Size, Vec2};

/// An axis-aligned rectangle stored as origin and size.
///
/// Width and height are expected to be non-negative. Constructors that take
/// arbitrary corners ([`from_points`](Self::from_points) and the
/// `From<kurbo::Rect>` conversion) normalize them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rectangle {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rectangle {
    /// The rectangle with every component set to zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a rectangle from origin and size.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the tightest rectangle enclosing every point in `points`.
    ///
    /// An empty slice yields [`Rectangle::ZERO`].
    #[must_use]
    pub fn from_points(points: &[Point]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::ZERO;
        };
        let (mut min, mut max) = (*first, *first);
        for p in rest {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Overwrites every component.
    pub fn set(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        *self = Self::new(x, y, width, height);
        self
    }

    /// Copies every component from `other`.
    pub fn copy_from(&mut self, other: &Self) -> &mut Self {
        *self = *other;
        self
    }

    /// Resets every component to zero.
    pub fn zero(&mut self) -> &mut Self {
        *self = Self::ZERO;
        self
    }

    /// Left edge (same as `x`).
    #[inline]
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Moves the left edge; the width is kept.
    pub fn set_left(&mut self, value: f64) {
        self.x = value;
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Moves the right edge by resizing the width.
    pub fn set_right(&mut self, value: f64) {
        self.width = value - self.x;
    }

    /// Top edge (same as `y`).
    #[inline]
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Moves the top edge; the height is kept.
    pub fn set_top(&mut self, value: f64) {
        self.y = value;
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Moves the bottom edge by resizing the height.
    pub fn set_bottom(&mut self, value: f64) {
        self.height = value - self.y;
    }

    /// Top-left corner.
    #[must_use]
    pub const fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Sets the top-left corner by moving the origin.
    pub fn set_top_left(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Top-right corner.
    #[must_use]
    pub fn top_right(&self) -> Point {
        Point::new(self.right(), self.y)
    }

    /// Sets the top-right corner.
    pub fn set_top_right(&mut self, p: Point) {
        self.width = p.x - self.x;
        self.y = p.y;
    }

    /// Bottom-left corner.
    #[must_use]
    pub fn bottom_left(&self) -> Point {
        Point::new(self.x, self.bottom())
    }

    /// Sets the bottom-left corner.
    pub fn set_bottom_left(&mut self, p: Point) {
        self.x = p.x;
        self.height = p.y - self.y;
    }

    /// Bottom-right corner.
    #[must_use]
    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Sets the bottom-right corner by resizing.
    pub fn set_bottom_right(&mut self, p: Point) {
        self.width = p.x - self.x;
        self.height = p.y - self.y;
    }

    /// Width and height as a [`Size`].
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Area.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.width * self.height
    }

    /// Sum of the four side lengths.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        2.0 * self.width + 2.0 * self.height
    }

    /// Returns `true` if every component is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.width == 0.0 && self.height == 0.0
    }

    /// Returns `true` if the point lies inside or on the edge.
    #[must_use]
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Returns `true` if `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns `true` if the interiors overlap. Touching edges do not count.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        other.right() > self.x
            && other.bottom() > self.y
            && self.right() > other.x
            && self.bottom() > other.y
    }

    /// Grows this rectangle to the smallest one containing both.
    pub fn union(&mut self, other: &Self) -> &mut Self {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        self.set(x0, y0, x1 - x0, y1 - y0)
    }

    /// Unions with `other`, treating a zero-sized rectangle as empty.
    ///
    /// A zero-sized `other` leaves this rectangle unchanged and a zero-sized
    /// `self` is replaced by `other`, so neither stretches the result to
    /// reach a stray point. This is how child bounds are folded into a
    /// parent.
    pub fn expand(&mut self, other: &Self) -> &mut Self {
        if other.is_degenerate() {
            self
        } else if self.is_degenerate() {
            *self = *other;
            self
        } else {
            self.union(other)
        }
    }

    fn is_degenerate(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Moves every edge outward by `dx` horizontally and `dy` vertically.
    pub fn inflate(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.x -= dx;
        self.y -= dy;
        self.width += 2.0 * dx;
        self.height += 2.0 * dy;
        self
    }

    /// Scales origin and size component-wise.
    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.x *= sx;
        self.y *= sy;
        self.width *= sx;
        self.height *= sy;
        self
    }

    /// Returns a copy translated by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Component-wise comparison within `epsilon`.
    #[must_use]
    pub fn equals(&self, other: &Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.width - other.width).abs() < epsilon
            && (self.height - other.height).abs() < epsilon
    }

    /// Component-wise comparison within [`f64::EPSILON`].
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.equals(other, f64::EPSILON)
    }

    /// Returns the axis-aligned bounding box of this rectangle mapped through
    /// `matrix`.
    #[must_use]
    pub fn transform(&self, matrix: &Affine) -> Self {
        let corners = [
            *matrix * self.top_left(),
            *matrix * self.top_right(),
            *matrix * self.bottom_left(),
            *matrix * self.bottom_right(),
        ];
        Self::from_points(&corners)
    }
}

impl From<Rect> for Rectangle {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

impl From<Rectangle> for Rect {
    fn from(rect: Rectangle) -> Self {
        Self::new(rect.x, rect.y, rect.right(), rect.bottom())
    }
}

impl fmt::Display for Rectangle {
    /// Formats with two decimals unless a precision is given (`{:.4}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(2);
        write!(
            f,
            "Rectangle {{ x: {:.p$}, y: {:.p$}, width: {:.p$}, height: {:.p$} }}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Builds an affine matrix from the six row-major coefficients
/// `[a, b, c, d, tx, ty]` handed to drivers.
#[inline]
#[must_use]
pub const fn affine_from_row_major(m: [f64; 6]) -> Affine {
    Affine::new(m)
}

/// Returns `true` if every coefficient of `matrix` is finite.
#[must_use]
pub fn affine_is_finite(matrix: &Affine) -> bool {
    matrix.as_coeffs().iter().all(|c| c.is_finite())
}
