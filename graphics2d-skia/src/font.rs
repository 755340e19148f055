//! Logical fonts, glyph vectors and font metrics.

use crate::geometry::{path_bounds, Shape, WindingRule};
use crate::typeface::Typeface;
use kurbo::{Affine, BezPath, Rect};
use std::sync::Arc;

/// Style bits of a logical font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FontStyle(u8);

impl FontStyle {
    pub const PLAIN: FontStyle = FontStyle(0);
    pub const BOLD: FontStyle = FontStyle(1);
    pub const ITALIC: FontStyle = FontStyle(2);
    pub const BOLD_ITALIC: FontStyle = FontStyle(3);

    /// Build from the integer bitmask of the emulated API. Unknown bits are
    /// dropped.
    pub fn from_bits(bits: i32) -> Self {
        FontStyle((bits & 3) as u8)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_bold(self) -> bool {
        self.0 & 1 != 0
    }

    pub fn is_italic(self) -> bool {
        self.0 & 2 != 0
    }

    pub fn with_bold(self, bold: bool) -> Self {
        if bold {
            FontStyle(self.0 | 1)
        } else {
            FontStyle(self.0 & !1)
        }
    }

    pub fn with_italic(self, italic: bool) -> Self {
        if italic {
            FontStyle(self.0 | 2)
        } else {
            FontStyle(self.0 & !2)
        }
    }
}

/// A logical font: family name, style and point size.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub style: FontStyle,
    pub size: f32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "SansSerif".to_string(),
            style: FontStyle::PLAIN,
            size: 12.0,
        }
    }
}

impl Font {
    pub fn new(family: impl Into<String>, style: FontStyle, size: f32) -> Self {
        Self {
            family: family.into(),
            style,
            size,
        }
    }

    pub fn with_size(&self, size: f32) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    pub fn with_style(&self, style: FontStyle) -> Self {
        Self {
            style,
            ..self.clone()
        }
    }
}

/// Rendering parameters text measurement depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRenderContext {
    pub transform: Affine,
    pub antialiased: bool,
    pub fractional_metrics: bool,
}

impl Default for FontRenderContext {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            antialiased: true,
            fractional_metrics: false,
        }
    }
}

/// One glyph of a [`GlyphVector`]. The outline is relative to the glyph
/// origin on the baseline, y down.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub id: u16,
    /// Pen position of the glyph origin relative to the start of the run.
    pub x: f64,
    pub advance: f64,
    pub outline: BezPath,
}

/// Glyph outlines of a laid out string in a single font.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphVector {
    pub font: Font,
    pub glyphs: Vec<Glyph>,
}

impl GlyphVector {
    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Total advance of the run.
    pub fn advance(&self) -> f64 {
        self.glyphs.last().map(|g| g.x + g.advance).unwrap_or(0.0)
    }

    /// The outline of every glyph with the run origin at `(x, y)`.
    pub fn outline(&self, x: f64, y: f64) -> Shape {
        let mut path = BezPath::new();
        for glyph in &self.glyphs {
            let offset = Affine::translate((x + glyph.x, y));
            for el in glyph.outline.elements() {
                path.push(offset * *el);
            }
        }
        Shape::path(path, WindingRule::NonZero)
    }

    /// Bounds of the inked outline at the origin.
    pub fn visual_bounds(&self) -> Rect {
        path_bounds(&self.outline(0.0, 0.0).to_bez_path())
    }
}

/// Line metrics of a font at its point size.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub font: Font,
    pub ascent: f32,
    pub descent: f32,
    pub leading: f32,
    typeface: Option<Arc<Typeface>>,
}

impl FontMetrics {
    /// Metrics from a resolved typeface, or proportional estimates when the
    /// font could not be resolved.
    pub fn new(font: &Font, typeface: Option<Arc<Typeface>>) -> Self {
        let (ascent, descent, leading) = match &typeface {
            Some(tf) => tf.line_metrics(font.size),
            None => (font.size * 0.8, font.size * 0.2, 0.0),
        };
        Self {
            font: font.clone(),
            ascent,
            descent,
            leading,
            typeface,
        }
    }

    pub fn height(&self) -> f32 {
        self.ascent + self.descent + self.leading
    }

    /// Advance width of `text`.
    pub fn string_width(&self, text: &str) -> f32 {
        match &self.typeface {
            Some(tf) => tf.advance(text, self.font.size),
            None => text.chars().count() as f32 * self.font.size * 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_bits() {
        assert!(FontStyle::BOLD_ITALIC.is_bold());
        assert!(FontStyle::BOLD_ITALIC.is_italic());
        assert!(!FontStyle::PLAIN.is_bold());
        assert_eq!(FontStyle::from_bits(7), FontStyle::BOLD_ITALIC);
        assert_eq!(FontStyle::PLAIN.with_bold(true), FontStyle::BOLD);
        assert_eq!(FontStyle::BOLD_ITALIC.with_italic(false), FontStyle::BOLD);
    }

    #[test]
    fn test_default_font() {
        let f = Font::default();
        assert_eq!(f.family, "SansSerif");
        assert_eq!(f.style, FontStyle::PLAIN);
        assert_eq!(f.size, 12.0);
        assert_eq!(f.with_size(20.0).size, 20.0);
    }

    #[test]
    fn test_glyph_vector_outline_is_offset() {
        let mut square = BezPath::new();
        square.move_to((0.0, -5.0));
        square.line_to((5.0, -5.0));
        square.line_to((5.0, 0.0));
        square.close_path();
        let gv = GlyphVector {
            font: Font::default(),
            glyphs: vec![
                Glyph {
                    id: 1,
                    x: 0.0,
                    advance: 6.0,
                    outline: square.clone(),
                },
                Glyph {
                    id: 1,
                    x: 6.0,
                    advance: 6.0,
                    outline: square,
                },
            ],
        };
        assert_eq!(gv.num_glyphs(), 2);
        assert_eq!(gv.advance(), 12.0);
        assert_eq!(
            gv.outline(10.0, 20.0).bounds(),
            Rect::new(10.0, 15.0, 21.0, 20.0)
        );
    }

    #[test]
    fn test_metrics_without_typeface() {
        let m = FontMetrics::new(&Font::default(), None);
        assert!((m.ascent - 9.6).abs() < 1e-4);
        assert!((m.height() - 12.0).abs() < 1e-4);
        assert_eq!(m.string_width("ab"), 12.0);
    }
}
