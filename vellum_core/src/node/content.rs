// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kinds and their kind-specific content.
//!
//! Every node shares the same transform, display and dirty-flag core. What
//! differs per kind is a small content record: nothing for containers, a
//! command queue for paths, a texture for sprites, a text layout for text and
//! particle snapshots for emitters.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Size};

use crate::geom::Rectangle;
use crate::path::PathCommands;
use crate::renderer::RendererKind;

use super::id::TextureId;

/// The closed set of node kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A plain container with no drawable content of its own.
    Container,
    /// A vector path node.
    Path,
    /// A textured quad.
    Sprite,
    /// A block of styled text.
    Text,
    /// A particle emitter.
    Emitter,
}

impl NodeKind {
    /// The renderer-state variant a driver must provide for this kind.
    #[must_use]
    pub const fn renderer_kind(self) -> RendererKind {
        match self {
            Self::Container => RendererKind::Container,
            Self::Path => RendererKind::Path,
            Self::Sprite => RendererKind::Textured,
            Self::Text => RendererKind::Text,
            Self::Emitter => RendererKind::Emitter,
        }
    }
}

/// A texture together with the size it is drawn at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureRef {
    /// Backend handle.
    pub id: TextureId,
    /// Display width in local units.
    pub width: f64,
    /// Display height in local units.
    pub height: f64,
}

impl TextureRef {
    /// Creates a texture reference.
    #[must_use]
    pub const fn new(id: TextureId, width: f64, height: f64) -> Self {
        Self { id, width, height }
    }

    /// The rectangle the texture covers in local space.
    #[must_use]
    pub const fn bounds(&self) -> Rectangle {
        Rectangle::new(0.0, 0.0, self.width, self.height)
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Font and paint settings for a text node.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font family name.
    pub family: String,
    /// Font size in local units.
    pub size: f64,
    /// Fill color as `0xRRGGBB`.
    pub color: u32,
    /// Font weight (CSS scale, 400 is regular).
    pub weight: u16,
    /// Italic face.
    pub italic: bool,
    /// Line alignment.
    pub align: TextAlign,
    /// Outline thickness, zero for none.
    pub stroke_thickness: f64,
    /// Outline color as `0xRRGGBB`.
    pub stroke_color: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: String::from("sans-serif"),
            size: 14.0,
            color: 0x00_0000,
            weight: 400,
            italic: false,
            align: TextAlign::Left,
            stroke_thickness: 0.0,
            stroke_color: 0xff_ffff,
        }
    }
}

/// Text content plus the layout a driver needs to draw it.
///
/// Shaping and measuring happen outside the scene graph; callers supply the
/// measured `size`, which is also the node's local bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    /// The raw text. Lines are separated by `\n`.
    pub text: String,
    /// Font and paint settings.
    pub style: TextStyle,
    /// Measured (or fixed) size of the text field.
    pub size: Size,
    /// Whether `size` follows the text or clips it.
    pub auto_size: bool,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    /// Extra spacing between glyphs.
    pub letter_spacing: f64,
}

impl TextLayout {
    /// Creates a layout with the default style and an unmeasured size.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            auto_size: true,
            line_height: 1.2,
            ..Self::default()
        }
    }

    /// Sets the style.
    #[must_use]
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the measured size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Iterates over the lines of text.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.split('\n')
    }

    /// The rectangle the text field covers in local space.
    #[must_use]
    pub const fn bounds(&self) -> Rectangle {
        Rectangle::new(0.0, 0.0, self.size.width, self.size.height)
    }
}

/// One particle as last reported by an external simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position in the emitter's local space.
    pub position: Point,
    /// Uniform scale.
    pub scale: f64,
    /// Rotation in radians.
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
}

impl Particle {
    /// Creates an unscaled, unrotated, opaque particle at `position`.
    #[must_use]
    pub const fn at(position: Point) -> Self {
        Self {
            position,
            scale: 1.0,
            rotation: 0.0,
            alpha: 1.0,
        }
    }
}

/// Emitter content: the particle texture and the current particle set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmitterContent {
    /// Texture drawn for every particle.
    pub texture: Option<TextureRef>,
    /// Particles in back-to-front order.
    pub particles: Vec<Particle>,
}

impl EmitterContent {
    /// The rectangle enclosing every particle's textured quad.
    ///
    /// A negative scale mirrors the quad back across the particle position.
    #[must_use]
    pub fn bounds(&self) -> Rectangle {
        let (w, h) = self
            .texture
            .map_or((0.0, 0.0), |t| (t.width, t.height));
        let mut out: Option<Rectangle> = None;
        for p in &self.particles {
            let far = Point::new(p.position.x + w * p.scale, p.position.y + h * p.scale);
            let quad = Rectangle::from_points(&[p.position, far]);
            match &mut out {
                Some(r) => {
                    r.union(&quad);
                }
                None => out = Some(quad),
            }
        }
        out.unwrap_or(Rectangle::ZERO)
    }
}

/// Kind-specific node content.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum NodeContent {
    Container,
    Path(PathCommands),
    Sprite(Option<TextureRef>),
    Text(TextLayout),
    Emitter(EmitterContent),
}

impl NodeContent {
    pub(crate) fn new(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Container => Self::Container,
            NodeKind::Path => Self::Path(PathCommands::new()),
            NodeKind::Sprite => Self::Sprite(None),
            NodeKind::Text => Self::Text(TextLayout::new("")),
            NodeKind::Emitter => Self::Emitter(EmitterContent::default()),
        }
    }

    pub(crate) const fn kind(&self) -> NodeKind {
        match self {
            Self::Container => NodeKind::Container,
            Self::Path(_) => NodeKind::Path,
            Self::Sprite(_) => NodeKind::Sprite,
            Self::Text(_) => NodeKind::Text,
            Self::Emitter(_) => NodeKind::Emitter,
        }
    }

    /// Own local bounds, ignoring clip and children.
    pub(crate) fn local_bounds(&self) -> Rectangle {
        match self {
            Self::Container => Rectangle::ZERO,
            Self::Path(path) => path.bounds(),
            Self::Sprite(texture) => texture.map_or(Rectangle::ZERO, |t| t.bounds()),
            Self::Text(layout) => layout.bounds(),
            Self::Emitter(emitter) => emitter.bounds(),
        }
    }
}
