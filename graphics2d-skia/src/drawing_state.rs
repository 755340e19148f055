//! Attribute state of one graphics context.

use crate::color::Color;
use crate::font::Font;
use crate::hints::RenderingHints;
use crate::mapper::PaintMapper;
use crate::typeface::Typeface;
use kurbo::Affine;
use std::sync::Arc;

/// Everything `create()` copies into a child context. The clip region lives
/// in the context's `ClipStack` because its save mark is not shareable.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// User space to device space.
    pub transform: Affine,
    /// Last color set; the paint may have moved on to a gradient since.
    pub color: Color,
    /// Installed paint, stroke and composite with their engine form.
    pub mapper: PaintMapper,
    pub font: Font,
    /// Resolved typeface for `font`, `None` when no face matched.
    pub typeface: Option<Arc<Typeface>>,
    pub background: Color,
    pub hints: RenderingHints,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            color: Color::BLACK,
            mapper: PaintMapper::new(),
            font: Font::default(),
            typeface: None,
            background: Color::WHITE,
            hints: RenderingHints::default(),
        }
    }
}
