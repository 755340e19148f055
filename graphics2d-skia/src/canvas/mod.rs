//! The immediate-mode target engine.
//!
//! [`TargetCanvas`] is the narrow surface the bridge drives: a matrix, a
//! save/restore stack that also scopes clipping, and a handful of draw
//! primitives that take a fully configured [`EnginePaint`].
//! [`SkiaCanvas`](skia::SkiaCanvas) implements it over a tiny-skia pixmap.

pub mod skia;

use std::cell::RefCell;
use std::rc::Rc;
use tiny_skia::{BlendMode, FillRule, FilterQuality, Path, Pixmap, Point, Rect, Shader, Transform};

/// Whether a primitive is filled or stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

/// Everything the engine needs to rasterize one primitive.
#[derive(Debug, Clone)]
pub struct EnginePaint {
    pub shader: Shader<'static>,
    /// Extra alpha multiplied into the shader at draw time.
    pub alpha: f32,
    pub blend_mode: BlendMode,
    pub anti_alias: bool,
    pub style: PaintStyle,
    pub stroke: tiny_skia::Stroke,
    pub filter_quality: FilterQuality,
}

impl Default for EnginePaint {
    fn default() -> Self {
        Self {
            shader: Shader::SolidColor(tiny_skia::Color::BLACK),
            alpha: 1.0,
            blend_mode: BlendMode::SourceOver,
            anti_alias: true,
            style: PaintStyle::Fill,
            stroke: tiny_skia::Stroke::default(),
            filter_quality: FilterQuality::Bilinear,
        }
    }
}

impl EnginePaint {
    /// Copy with a different style.
    pub fn with_style(&self, style: PaintStyle) -> Self {
        Self {
            style,
            ..self.clone()
        }
    }

    /// The tiny-skia paint with `alpha` folded into the shader.
    pub fn to_skia_paint(&self) -> tiny_skia::Paint<'static> {
        let mut shader = self.shader.clone();
        if self.alpha < 1.0 {
            shader.apply_opacity(self.alpha);
        }
        tiny_skia::Paint {
            shader,
            blend_mode: self.blend_mode,
            anti_alias: self.anti_alias,
            ..tiny_skia::Paint::default()
        }
    }

    /// Paint that samples `image` through `transform`, which maps image
    /// pixels to user space. Image edges are never anti-aliased.
    pub fn to_image_paint<'a>(
        &self,
        image: tiny_skia::PixmapRef<'a>,
        transform: tiny_skia::Transform,
    ) -> tiny_skia::Paint<'a> {
        tiny_skia::Paint {
            shader: tiny_skia::Pattern::new(
                image,
                tiny_skia::SpreadMode::Pad,
                self.filter_quality,
                self.alpha,
                transform,
            ),
            blend_mode: self.blend_mode,
            anti_alias: false,
            ..tiny_skia::Paint::default()
        }
    }
}

/// Glyph outlines positioned relative to a text origin on the baseline.
#[derive(Debug, Clone)]
pub struct TextBlob {
    pub glyph_ids: Vec<u16>,
    pub positions: Vec<Point>,
    /// Union of all glyph outlines, `None` for whitespace-only text.
    pub outline: Option<Path>,
}

impl TextBlob {
    pub fn len(&self) -> usize {
        self.glyph_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyph_ids.is_empty()
    }
}

/// An immediate-mode canvas with a save/restore stack.
///
/// The clip can only shrink between a `save` and the matching restore; the
/// only way to widen it is to restore past the save that preceded it.
pub trait TargetCanvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Push matrix and clip. Returns the save count before the push, which
    /// restores to the current state when passed to `restore_to_count`.
    fn save(&mut self) -> usize;
    fn restore(&mut self);
    /// Pop until the save count equals `count`. The base level is never
    /// popped.
    fn restore_to_count(&mut self, count: usize);
    fn save_count(&self) -> usize;

    fn set_matrix(&mut self, matrix: Transform);
    /// Pre-multiply the current matrix: `current = current * matrix`.
    fn concat(&mut self, matrix: Transform);
    fn total_matrix(&self) -> Transform;

    fn translate(&mut self, dx: f32, dy: f32) {
        self.concat(Transform::from_translate(dx, dy));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.concat(Transform::from_scale(sx, sy));
    }

    /// Intersect the clip with `path` under the current matrix.
    fn clip_path(&mut self, path: &Path, rule: FillRule, anti_alias: bool);
    /// Make the clip empty.
    fn clip_empty(&mut self);

    fn draw_rect(&mut self, rect: Rect, paint: &EnginePaint);
    fn draw_oval(&mut self, rect: Rect, paint: &EnginePaint);
    /// Lines are always stroked, whatever the paint style.
    fn draw_line(&mut self, p0: Point, p1: Point, paint: &EnginePaint);
    fn draw_path(&mut self, path: &Path, rule: FillRule, paint: &EnginePaint);
    /// Draw the `src` region of `image` scaled into `dst`.
    fn draw_image_rect(&mut self, image: &Pixmap, src: Rect, dst: Rect, paint: &EnginePaint);
    /// Fill the blob's glyphs with the text origin at `(x, y)`.
    fn draw_text_blob(&mut self, blob: &TextBlob, x: f32, y: f32, paint: &EnginePaint);

    /// Backing pixels, for canvases that have them.
    fn pixmap(&self) -> Option<&Pixmap> {
        None
    }
}

/// Shared handle to the canvas a bridge and its children draw on.
pub type CanvasHandle = Rc<RefCell<dyn TargetCanvas>>;
