// Copyright 2026 the Vellum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer-state snapshots handed to drivers.
//!
//! Every node owns one [`RendererState`], created once through the driver's
//! factory and overwritten in place whenever the node is render-dirty. Drivers
//! read it during [`Driver::register`](crate::driver::Driver::register) and
//! must not hold on to it past that call.

use alloc::vec::Vec;

use kurbo::{Affine, Point};

use crate::dirty::DirtyFlags;
use crate::error::DriverError;
use crate::geom::Rectangle;
use crate::node::{NodeId, Particle, TextLayout, TextureRef};
use crate::path::PathCommand;

/// Renderer-state variants, one per node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// Plain container; carries only transform and display state.
    Container,
    /// Vector path.
    Path,
    /// Textured quad.
    Textured,
    /// Styled text.
    Text,
    /// Particle emitter.
    Emitter,
}

impl RendererKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Container,
        Self::Path,
        Self::Textured,
        Self::Text,
        Self::Emitter,
    ];

    /// Short lowercase name, used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Path => "path",
            Self::Textured => "textured",
            Self::Text => "text",
            Self::Emitter => "emitter",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Container => 0,
            Self::Path => 1,
            Self::Textured => 2,
            Self::Text => 3,
            Self::Emitter => 4,
        }
    }
}

impl core::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a node's pixels combine with what is already drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Inherit the parent's resolved mode. Never appears in a snapshot.
    #[default]
    Auto,
    /// Source over.
    Normal,
    /// Additive.
    Add,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
}

impl BlendMode {
    /// Resolves `Auto` against the parent's resolved mode, falling back to
    /// `Normal` when the parent is unresolved too.
    #[must_use]
    pub const fn resolve(self, parent: Self) -> Self {
        match self {
            Self::Auto => match parent {
                Self::Auto => Self::Normal,
                concrete => concrete,
            },
            concrete => concrete,
        }
    }
}

/// Kind-specific part of a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Containers draw nothing themselves.
    Container,
    /// Path commands to replay, and their derived local bounds.
    Path {
        /// Commands in recording order.
        commands: Vec<PathCommand>,
        /// Local bounds of the commands.
        bounds: Rectangle,
    },
    /// Texture of a sprite, or of a baked subtree.
    Textured {
        /// Texture to draw at the local origin.
        texture: Option<TextureRef>,
    },
    /// Text layout.
    Text {
        /// Text, style and measured size.
        layout: TextLayout,
    },
    /// Particle texture and positions.
    Emitter {
        /// Texture drawn for every particle.
        texture: Option<TextureRef>,
        /// Particles in back-to-front order.
        particles: Vec<Particle>,
    },
}

impl Payload {
    /// An empty payload of the given kind.
    #[must_use]
    pub fn empty(kind: RendererKind) -> Self {
        match kind {
            RendererKind::Container => Self::Container,
            RendererKind::Path => Self::Path {
                commands: Vec::new(),
                bounds: Rectangle::ZERO,
            },
            RendererKind::Textured => Self::Textured { texture: None },
            RendererKind::Text => Self::Text {
                layout: TextLayout::default(),
            },
            RendererKind::Emitter => Self::Emitter {
                texture: None,
                particles: Vec::new(),
            },
        }
    }

    /// The renderer kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> RendererKind {
        match self {
            Self::Container => RendererKind::Container,
            Self::Path { .. } => RendererKind::Path,
            Self::Textured { .. } => RendererKind::Textured,
            Self::Text { .. } => RendererKind::Text,
            Self::Emitter { .. } => RendererKind::Emitter,
        }
    }
}

/// Backend-agnostic snapshot of one node's drawable state.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererState {
    /// The node this snapshot belongs to, once bound.
    pub node: Option<NodeId>,
    /// World transform, including any frame pre-transform.
    pub transform: Affine,
    /// Resolved alpha: own alpha times every ancestor's.
    pub alpha: f64,
    /// Resolved blend mode, never `Auto` once refreshed.
    pub blend_mode: BlendMode,
    /// Whether the node is drawn. Invisible nodes are registered but their
    /// children are not.
    pub visible: bool,
    /// Local clip rectangle, before the pivot offset.
    pub clip_rect: Option<Rectangle>,
    /// Dirty bits the node had when this snapshot was taken.
    pub dirty: DirtyFlags,
    /// Round the translation to whole pixels when drawing.
    pub snap_to_pixels: bool,
    /// Set when a baked bitmap replaces the subtree; children are not
    /// registered.
    pub skip_children: bool,
    /// Pivot, for drivers that position clip regions.
    pub pivot: Point,
    /// Baked bitmap to draw instead of the payload.
    pub bitmap: Option<TextureRef>,
    /// Kind-specific data.
    pub payload: Payload,
}

impl RendererState {
    /// A blank snapshot of the given kind.
    #[must_use]
    pub fn new(kind: RendererKind) -> Self {
        Self {
            node: None,
            transform: Affine::IDENTITY,
            alpha: 1.0,
            blend_mode: BlendMode::Normal,
            visible: true,
            clip_rect: None,
            dirty: DirtyFlags::empty(),
            snap_to_pixels: false,
            skip_children: false,
            pivot: Point::ZERO,
            bitmap: None,
            payload: Payload::empty(kind),
        }
    }

    /// The kind of this snapshot, as given by its payload.
    #[must_use]
    pub const fn kind(&self) -> RendererKind {
        self.payload.kind()
    }

    /// The transform as six coefficients `[a, b, c, d, tx, ty]`.
    #[must_use]
    pub fn transform_coeffs(&self) -> [f64; 6] {
        self.transform.as_coeffs()
    }
}

/// Constructor for a renderer-state variant.
pub type RendererCtor = fn() -> RendererState;

/// Maps each renderer kind to the constructor a driver uses for it.
///
/// Drivers that cannot draw a kind leave it unregistered, and
/// [`create`](Self::create) then reports
/// [`DriverError::UnsupportedKind`] instead of falling back to another kind.
#[derive(Clone, Copy, Debug)]
pub struct RendererRegistry {
    ctors: [Option<RendererCtor>; 5],
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RendererRegistry {
    /// A registry supporting no kinds.
    #[must_use]
    pub const fn empty() -> Self {
        Self { ctors: [None; 5] }
    }

    /// A registry mapping every kind to a blank [`RendererState::new`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(RendererKind::Container, || {
            RendererState::new(RendererKind::Container)
        });
        registry.register(RendererKind::Path, || RendererState::new(RendererKind::Path));
        registry.register(RendererKind::Textured, || {
            RendererState::new(RendererKind::Textured)
        });
        registry.register(RendererKind::Text, || RendererState::new(RendererKind::Text));
        registry.register(RendererKind::Emitter, || {
            RendererState::new(RendererKind::Emitter)
        });
        registry
    }

    /// Registers (or replaces) the constructor for `kind`.
    pub fn register(&mut self, kind: RendererKind, ctor: RendererCtor) {
        self.ctors[kind.index()] = Some(ctor);
    }

    /// Removes support for `kind`.
    pub fn unregister(&mut self, kind: RendererKind) {
        self.ctors[kind.index()] = None;
    }

    /// Whether `kind` has a constructor.
    #[must_use]
    pub const fn supports(&self, kind: RendererKind) -> bool {
        self.ctors[kind.index()].is_some()
    }

    /// Builds a snapshot for `kind`.
    ///
    /// # Errors
    ///
    /// [`DriverError::UnsupportedKind`] if no constructor is registered, and
    /// [`DriverError::PayloadMismatch`] if the constructor built a different
    /// kind.
    pub fn create(&self, kind: RendererKind) -> Result<RendererState, DriverError> {
        let ctor = self.ctors[kind.index()].ok_or(DriverError::UnsupportedKind(kind))?;
        let state = ctor();
        if state.kind() != kind {
            return Err(DriverError::PayloadMismatch {
                expected: kind,
                found: state.kind(),
            });
        }
        Ok(state)
    }
}
