//! Retained Graphics2D-style drawing state on an immediate-mode engine.
//!
//! A [`Graphics2d`] keeps the source-API state (user-space transform, a
//! replaceable clip region, paint, stroke, composite, font, rendering hints)
//! and applies each call right away to a [`TargetCanvas`] whose own clip can
//! only be narrowed inside save/restore pairs. It uses:
//! - `tiny-skia` as the target engine
//! - `kurbo` for user-space geometry
//! - `fontdb` and `ttf-parser` for typefaces, `cosmic-text` for styled text
//!
//! # Example
//!
//! ```rust,ignore
//! use graphics2d_skia::{Color, FontConfig, Graphics2d, Shape, TypefaceCache};
//! use std::sync::Arc;
//!
//! let typefaces = Arc::new(TypefaceCache::new(&FontConfig::default()));
//! let mut g = Graphics2d::new(400, 300, typefaces)?;
//! g.rotate_about(0.3, 200.0, 150.0);
//! g.clip(&Shape::ellipse(50.0, 50.0, 300.0, 200.0));
//! g.set_color(Some(Color::RED));
//! g.fill(&Shape::rect(0.0, 0.0, 400.0, 300.0));
//! let canvas = g.canvas();
//! let pixels = canvas.borrow().pixmap().map(|p| p.data().to_vec());
//! ```

mod area;
pub mod canvas;
mod clip;
mod color;
mod composite;
mod drawing_state;
mod error;
mod font;
mod font_config;
mod geometry;
mod gradient;
mod graphics;
mod hints;
mod image;
mod layout;
mod mapper;
mod path_convert;
mod stroke;
mod style;
mod text;
mod typeface;

pub use area::{intersect, intersection_bounds, intersects};
pub use canvas::skia::{SkiaCanvas, MAX_DIMENSION};
pub use canvas::{CanvasHandle, EnginePaint, PaintStyle, TargetCanvas, TextBlob};
pub use clip::{ClipStack, ClipState};
pub use color::Color;
pub use composite::{AlphaComposite, AlphaRule, Composite};
pub use drawing_state::GraphicsState;
pub use error::{Graphics2dError, Graphics2dResult};
pub use font::{Font, FontMetrics, FontRenderContext, FontStyle, Glyph, GlyphVector};
pub use font_config::{FontConfig, GenericFamilyMap};
pub use geometry::{ArcClosure, ArcShape, IntRect, PathShape, RoundRectShape, Shape, WindingRule};
pub use gradient::{CycleMethod, GradientPaint, GradientStop, LinearGradientPaint, RadialGradientPaint};
pub use graphics::{DeviceConfiguration, Graphics2d};
pub use hints::{HintKey, HintValue, RenderingHints};
pub use image::{to_engine_pixmap, ImageData, ImageSource, PixelLayout};
pub use layout::{LaidOutText, PositionedGlyph, TextLayout};
pub use mapper::{engine_stroke, shader_for, PaintMapper, MIN_STROKE_WIDTH};
pub use path_convert::{
    engine_bounds, from_engine_path, from_engine_transform, shape_to_engine_path, to_engine_path,
    to_engine_transform,
};
pub use stroke::BasicStroke;
pub use style::{LineCap, LineJoin, Paint};
pub use text::{AttributeRun, AttributedString, TextAttributes};
pub use typeface::{logical_family, FontNameMapper, Typeface, TypefaceCache, TypefaceKey};

// Geometry types appear throughout the public API.
pub use kurbo;
pub use tiny_skia;
