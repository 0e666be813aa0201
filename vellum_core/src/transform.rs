// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local transform parameters and their composition into a 2×3 matrix.
//!
//! The upper 2×2 block is built as `rotation · skew · scale` (scale applied
//! first, then skew, then rotation), and the translation is applied last,
//! compensated for the pivot so that the pivot point lands on `(x, y)`.
//! Changing this order changes the result whenever skew and rotation are both
//! non-zero.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point};

/// The caller-set parameters a node's local matrix is derived from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformParams {
    /// Horizontal position in the parent's space.
    pub x: f64,
    /// Vertical position in the parent's space.
    pub y: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Rotation in radians.
    pub rotation: f64,
    /// Horizontal skew angle in radians.
    pub skew_x: f64,
    /// Vertical skew angle in radians.
    pub skew_y: f64,
    /// Horizontal pivot in local space.
    pub pivot_x: f64,
    /// Vertical pivot in local space.
    pub pivot_y: f64,
}

impl TransformParams {
    /// Parameters that compose to the identity matrix.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 0.0,
        skew_x: 0.0,
        skew_y: 0.0,
        pivot_x: 0.0,
        pivot_y: 0.0,
    };

    /// The pivot as a point.
    #[must_use]
    pub const fn pivot(&self) -> Point {
        Point::new(self.pivot_x, self.pivot_y)
    }

    /// Composes the local matrix.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let (a, b, c, d) = if self.skew_x == 0.0 && self.skew_y == 0.0 {
            if self.rotation == 0.0 {
                (self.scale_x, 0.0, 0.0, self.scale_y)
            } else {
                let (sin, cos) = (self.rotation.sin(), self.rotation.cos());
                (
                    self.scale_x * cos,
                    self.scale_x * sin,
                    -self.scale_y * sin,
                    self.scale_y * cos,
                )
            }
        } else {
            // skew · scale
            let tan_x = self.skew_x.sin() / self.skew_x.cos();
            let tan_y = self.skew_y.sin() / self.skew_y.cos();
            let (ka, kb, kc, kd) = (
                self.scale_x,
                self.scale_x * tan_y,
                self.scale_y * tan_x,
                self.scale_y,
            );
            // rotation · (skew · scale)
            let (sin, cos) = (self.rotation.sin(), self.rotation.cos());
            (
                cos * ka - sin * kb,
                sin * ka + cos * kb,
                cos * kc - sin * kd,
                sin * kc + cos * kd,
            )
        };

        let tx = self.x - (a * self.pivot_x + c * self.pivot_y);
        let ty = self.y - (b * self.pivot_x + d * self.pivot_y);
        Affine::new([a, b, c, d, tx, ty])
    }
}

impl Default for TransformParams {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}
