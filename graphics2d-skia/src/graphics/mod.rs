//! The graphics context: retained drawing state applied to a target canvas.
//!
//! `Graphics2d` keeps transform, clip, paint, stroke, composite, font and
//! hints in user-space terms and pushes each change into the shared
//! [`TargetCanvas`] immediately. Operations are split across submodules the
//! same way the state splits:
//! - `transform`: matrix composition and replacement
//! - `clipping`: clip replacement, intersection and queries
//! - `drawing`: shape draw/fill dispatch and convenience forms
//! - `image_ops`: raster image drawing
//! - `text_rendering`: strings, attributed strings and glyph vectors

mod clipping;
mod drawing;
mod image_ops;
mod text_rendering;
mod transform;

use crate::canvas::skia::SkiaCanvas;
use crate::canvas::{CanvasHandle, TargetCanvas};
use crate::clip::ClipStack;
use crate::color::Color;
use crate::composite::{AlphaComposite, Composite};
use crate::drawing_state::GraphicsState;
use crate::error::{Graphics2dError, Graphics2dResult};
use crate::font::{Font, FontRenderContext};
use crate::geometry::IntRect;
use crate::hints::{HintKey, HintValue, RenderingHints};
use crate::layout::TextLayout;
use crate::stroke::BasicStroke;
use crate::style::Paint;
use crate::typeface::TypefaceCache;
use kurbo::{Affine, BezPath};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Geometry of the device a context draws on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceConfiguration {
    pub bounds: IntRect,
    pub default_transform: Affine,
}

/// A retained-state 2D graphics context over an immediate-mode canvas.
///
/// Not `Send`: a context and the children created from it share one canvas
/// and must be used from one thread, one at a time.
pub struct Graphics2d {
    canvas: CanvasHandle,
    typefaces: Arc<TypefaceCache>,
    state: GraphicsState,
    clip: ClipStack,
    /// Built on first use of attributed text.
    layout: Option<TextLayout>,
    /// Reused path buffer for polygon and polyline calls.
    scratch: BezPath,
    font_render_context: FontRenderContext,
    disposed: bool,
}

impl Graphics2d {
    /// Create a context drawing on a new transparent tiny-skia canvas.
    pub fn new(width: u32, height: u32, typefaces: Arc<TypefaceCache>) -> Graphics2dResult<Self> {
        let canvas: CanvasHandle = Rc::new(RefCell::new(SkiaCanvas::new(width, height)?));
        Ok(Self::from_canvas(canvas, typefaces))
    }

    /// Create a context drawing on an existing canvas.
    pub fn from_canvas(canvas: CanvasHandle, typefaces: Arc<TypefaceCache>) -> Self {
        let clip = ClipStack::new(&mut *canvas.borrow_mut());
        let state = GraphicsState::default();
        let font_render_context = FontRenderContext {
            transform: Affine::IDENTITY,
            antialiased: state.hints.text_antialiasing(),
            fractional_metrics: state.hints.fractional_metrics(),
        };
        let mut g = Self {
            canvas,
            typefaces,
            state,
            clip,
            layout: None,
            scratch: BezPath::new(),
            font_render_context,
            disposed: false,
        };
        g.sync_hints();
        g.resolve_typeface();
        log::debug!(
            target: "graphics2d",
            "new context {}x{} at save mark {}",
            g.canvas.borrow().width(),
            g.canvas.borrow().height(),
            g.clip.mark()
        );
        g
    }

    /// A child context with a copy of every attribute, drawing on the same
    /// canvas under its own save mark.
    pub fn create(&self) -> Graphics2d {
        let clip = {
            let mut canvas = self.canvas.borrow_mut();
            let clip = ClipStack::inherit(&mut *canvas, self.clip.state().clone());
            canvas.set_matrix(crate::path_convert::to_engine_transform(self.state.transform));
            clip
        };
        log::debug!(target: "graphics2d", "create child at save mark {}", clip.mark());
        Graphics2d {
            canvas: self.canvas.clone(),
            typefaces: self.typefaces.clone(),
            state: self.state.clone(),
            clip,
            layout: None,
            scratch: BezPath::new(),
            font_render_context: self.font_render_context,
            disposed: false,
        }
    }

    /// Give back the canvas save levels this context holds. The context
    /// should not draw afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        log::debug!(target: "graphics2d", "dispose at save mark {}", self.clip.mark());
        self.clip.release(&mut *self.canvas.borrow_mut());
        self.disposed = true;
    }

    /// The shared canvas handle, for pixel retrieval.
    pub fn canvas(&self) -> CanvasHandle {
        self.canvas.clone()
    }

    pub fn typefaces(&self) -> &Arc<TypefaceCache> {
        &self.typefaces
    }

    pub fn device_configuration(&self) -> DeviceConfiguration {
        let canvas = self.canvas.borrow();
        DeviceConfiguration {
            bounds: IntRect::new(0, 0, canvas.width() as i32, canvas.height() as i32),
            default_transform: Affine::IDENTITY,
        }
    }

    /// Text rendering parameters fixed when the context was created.
    pub fn font_render_context(&self) -> FontRenderContext {
        self.font_render_context
    }

    // --- Paint, stroke and composite ---

    /// Install a paint. `None` is ignored.
    pub fn set_paint(&mut self, paint: Option<&Paint>) {
        let Some(paint) = paint else {
            return;
        };
        log::debug!(target: "graphics2d", "setPaint {:?}", paint);
        if let Paint::Color(c) = paint {
            self.state.color = *c;
        }
        self.state.mapper.apply_paint(paint);
    }

    pub fn get_paint(&self) -> &Paint {
        self.state.mapper.paint()
    }

    /// Install a solid color paint. `None` is ignored.
    pub fn set_color(&mut self, color: Option<Color>) {
        let Some(color) = color else {
            return;
        };
        log::debug!(target: "graphics2d", "setColor {:?}", color);
        self.state.color = color;
        self.state.mapper.apply_paint(&Paint::Color(color));
    }

    pub fn get_color(&self) -> Color {
        self.state.color
    }

    pub fn set_stroke(&mut self, stroke: Option<&BasicStroke>) -> Graphics2dResult<()> {
        let stroke = stroke.ok_or(Graphics2dError::NullArgument("stroke"))?;
        log::debug!(target: "graphics2d", "setStroke {:?}", stroke);
        self.state.mapper.apply_stroke(stroke);
        Ok(())
    }

    pub fn get_stroke(&self) -> &BasicStroke {
        self.state.mapper.stroke()
    }

    pub fn set_composite(&mut self, composite: Option<&Composite>) -> Graphics2dResult<()> {
        let composite = composite.ok_or(Graphics2dError::NullArgument("composite"))?;
        log::debug!(target: "graphics2d", "setComposite {:?}", composite);
        self.state.mapper.apply_composite(composite);
        Ok(())
    }

    pub fn get_composite(&self) -> &Composite {
        self.state.mapper.composite()
    }

    /// Back to plain source-over painting.
    pub fn set_paint_mode(&mut self) {
        self.state
            .mapper
            .apply_composite(&Composite::Alpha(AlphaComposite::SRC_OVER));
    }

    /// XOR painting has no engine equivalent; the call has no effect.
    pub fn set_xor_mode(&mut self, color: Color) {
        log::debug!(target: "graphics2d", "setXORMode {:?} ignored", color);
    }

    pub fn set_background(&mut self, color: Color) {
        self.state.background = color;
    }

    pub fn get_background(&self) -> Color {
        self.state.background
    }

    // --- Font ---

    /// Set the font and resolve its typeface. `None` is ignored.
    pub fn set_font(&mut self, font: Option<&Font>) {
        let Some(font) = font else {
            return;
        };
        if *font == self.state.font {
            return;
        }
        log::debug!(target: "graphics2d", "setFont {:?}", font);
        self.state.font = font.clone();
        self.resolve_typeface();
    }

    pub fn get_font(&self) -> &Font {
        &self.state.font
    }

    fn resolve_typeface(&mut self) {
        self.state.typeface = self.typefaces.resolve(
            &self.state.font.family,
            self.state.font.style,
            self.state.hints.font_mapper(),
        );
    }

    // --- Rendering hints ---

    pub fn set_rendering_hint(&mut self, key: HintKey, value: HintValue) -> Graphics2dResult<()> {
        log::debug!(target: "graphics2d", "setRenderingHint {:?} {:?}", key, value);
        self.state.hints.insert(key, value)?;
        self.hints_changed(key == HintKey::FontMapping);
        Ok(())
    }

    pub fn get_rendering_hint(&self, key: HintKey) -> Option<&HintValue> {
        self.state.hints.get(key)
    }

    /// Merge `hints` into the current set.
    pub fn add_rendering_hints(&mut self, hints: &RenderingHints) {
        let mapping = hints.get(HintKey::FontMapping).is_some();
        self.state.hints.extend(hints);
        self.hints_changed(mapping);
    }

    /// Replace the current set with `hints`.
    pub fn set_rendering_hints(&mut self, hints: RenderingHints) {
        let mapping = self.state.hints.font_mapper().is_some() || hints.font_mapper().is_some();
        self.state.hints = hints;
        self.hints_changed(mapping);
    }

    pub fn get_rendering_hints(&self) -> &RenderingHints {
        &self.state.hints
    }

    fn hints_changed(&mut self, font_mapping: bool) {
        self.sync_hints();
        if font_mapping {
            self.resolve_typeface();
        }
    }

    fn sync_hints(&mut self) {
        self.state
            .mapper
            .set_anti_alias(self.state.hints.antialiasing());
        self.state
            .mapper
            .set_filter_quality(self.state.hints.filter_quality());
    }
}

impl Drop for Graphics2d {
    fn drop(&mut self) {
        // The canvas may be mid-borrow during unwinding.
        if let Ok(mut canvas) = self.canvas.try_borrow_mut() {
            if !self.disposed {
                self.clip.release(&mut *canvas);
                self.disposed = true;
            }
        }
    }
}
