//! Text drawing operations for Graphics2d.

use super::Graphics2d;
use crate::canvas::{PaintStyle, TextBlob};
use crate::font::{Font, FontMetrics, GlyphVector};
use crate::geometry::{Shape, WindingRule};
use crate::layout::TextLayout;
use crate::path_convert::to_engine_path;
use crate::text::AttributedString;
use crate::typeface::Typeface;
use kurbo::{Affine, BezPath};

/// Glyph outlines of `text` merged into one engine path.
fn text_blob(typeface: &Typeface, text: &str, size: f32) -> TextBlob {
    let glyphs = typeface.glyphs(text, size);
    let mut outline = BezPath::new();
    for glyph in &glyphs {
        let offset = Affine::translate((glyph.x, 0.0));
        for el in glyph.outline.elements() {
            outline.push(offset * *el);
        }
    }
    TextBlob {
        glyph_ids: glyphs.iter().map(|g| g.id).collect(),
        positions: glyphs
            .iter()
            .map(|g| tiny_skia::Point::from_xy(g.x as f32, 0.0))
            .collect(),
        outline: to_engine_path(&outline),
    }
}

impl Graphics2d {
    /// Draw `text` with the current font, the baseline of the first
    /// character at `(x, y)`.
    pub fn draw_string(&mut self, text: &str, x: f64, y: f64) {
        log::debug!(target: "graphics2d", "drawString \"{}\" {} {}", text, x, y);
        let Some(typeface) = self.state.typeface.clone() else {
            log::warn!(
                target: "graphics2d",
                "no typeface for {:?}, text not drawn",
                self.state.font
            );
            return;
        };
        let blob = text_blob(&typeface, text, self.state.font.size);
        if blob.is_empty() {
            return;
        }
        let mut paint = self.state.mapper.engine_paint().with_style(PaintStyle::Fill);
        paint.anti_alias = self.state.hints.text_antialiasing();
        self.canvas
            .borrow_mut()
            .draw_text_blob(&blob, x as f32, y as f32, &paint);
    }

    /// Draw styled text. Strings without attributes take the
    /// [`draw_string`](Self::draw_string) path; otherwise each run is shaped
    /// with its own font and painted with its own foreground.
    pub fn draw_attributed_string(&mut self, text: &AttributedString, x: f64, y: f64) {
        if !text.has_attributes() {
            self.draw_string(text.text(), x, y);
            return;
        }
        log::debug!(
            target: "graphics2d",
            "drawString (attributed, {} runs) {} {}",
            text.runs().len(),
            x,
            y
        );
        let typefaces = &self.typefaces;
        let laid_out = self
            .layout
            .get_or_insert_with(|| TextLayout::from_typefaces(typefaces))
            .layout(text, &self.state.font);

        let saved = self.state.mapper.paint().clone();
        for glyph in &laid_out.glyphs {
            let foreground = laid_out
                .segments
                .get(glyph.segment)
                .and_then(|(_, attrs)| attrs.foreground.as_ref())
                .unwrap_or(&saved);
            self.state.mapper.apply_paint(foreground);
            let mut outline = glyph.outline.clone();
            outline.apply_affine(Affine::translate((
                x + glyph.x as f64,
                y + glyph.y as f64,
            )));
            self.fill(&Shape::path(outline, WindingRule::NonZero));
        }
        self.state.mapper.apply_paint(&saved);
    }

    /// Fill the outlines of `glyphs` with the run origin at `(x, y)`.
    pub fn draw_glyph_vector(&mut self, glyphs: &GlyphVector, x: f64, y: f64) {
        log::debug!(
            target: "graphics2d",
            "drawGlyphVector {} glyphs {} {}",
            glyphs.num_glyphs(),
            x,
            y
        );
        self.fill(&glyphs.outline(x, y));
    }

    /// Glyph outlines for `text` in the current font. Empty when the font
    /// has no typeface.
    pub fn create_glyph_vector(&self, text: &str) -> GlyphVector {
        let glyphs = self
            .state
            .typeface
            .as_ref()
            .map(|tf| tf.glyphs(text, self.state.font.size))
            .unwrap_or_default();
        GlyphVector {
            font: self.state.font.clone(),
            glyphs,
        }
    }

    /// Metrics of the current font.
    pub fn get_font_metrics(&self) -> FontMetrics {
        FontMetrics::new(&self.state.font, self.state.typeface.clone())
    }

    /// Metrics of any font, resolved through the shared typeface cache.
    pub fn get_font_metrics_for(&self, font: &Font) -> FontMetrics {
        let typeface =
            self.typefaces
                .resolve(&font.family, font.style, self.state.hints.font_mapper());
        FontMetrics::new(font, typeface)
    }
}
