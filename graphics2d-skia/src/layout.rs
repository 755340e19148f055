//! Attributed text layout on cosmic-text.
//!
//! Each attribute segment becomes one rich-text span whose metadata is the
//! segment index, so glyphs can be traced back to their run attributes.

use crate::font::Font;
use crate::text::{AttributedString, TextAttributes};
use crate::typeface::{logical_family, TypefaceCache};
use cosmic_text::{
    Attrs, Buffer, CacheKeyFlags, Command, FontSystem, Metrics, Shaping, Style, SwashCache, Weight,
};
use kurbo::BezPath;
use std::ops::Range;

/// A glyph outline placed relative to the layout origin on the first
/// baseline.
#[derive(Debug, Clone)]
pub struct PositionedGlyph {
    pub x: f32,
    pub y: f32,
    /// Index into the segments the layout was built from.
    pub segment: usize,
    pub outline: BezPath,
}

/// Result of laying out an attributed string.
#[derive(Debug, Clone, Default)]
pub struct LaidOutText {
    pub segments: Vec<(Range<usize>, TextAttributes)>,
    pub glyphs: Vec<PositionedGlyph>,
}

/// Shaping engine plus glyph outline cache.
pub struct TextLayout {
    font_system: FontSystem,
    swash_cache: SwashCache,
    hinting_enabled: bool,
}

impl TextLayout {
    pub fn new(db: fontdb::Database, hinting_enabled: bool) -> Self {
        Self {
            font_system: FontSystem::new_with_locale_and_db("en".to_string(), db),
            swash_cache: SwashCache::new(),
            hinting_enabled,
        }
    }

    /// Share the fonts known to a typeface cache.
    pub fn from_typefaces(typefaces: &TypefaceCache) -> Self {
        Self::new(
            typefaces.database().as_ref().clone(),
            typefaces.hinting_enabled(),
        )
    }

    /// Shape `text` with `base` as the font of unattributed characters.
    pub fn layout(&mut self, text: &AttributedString, base: &Font) -> LaidOutText {
        let segments = text.segments();
        let fonts: Vec<Font> = segments.iter().map(|(_, a)| a.font(base)).collect();
        let tallest = fonts.iter().map(|f| f.size).fold(base.size, f32::max);
        let flags = if self.hinting_enabled {
            CacheKeyFlags::empty()
        } else {
            CacheKeyFlags::DISABLE_HINTING
        };

        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics::new(base.size, tallest * 1.2),
        );
        let spans = segments
            .iter()
            .zip(&fonts)
            .enumerate()
            .map(|(i, ((range, _), font))| {
                let attrs = attrs_for(font, flags)
                    .metadata(i)
                    .metrics(Metrics::new(font.size, tallest * 1.2));
                (&text.text()[range.clone()], attrs)
            });
        let default_attrs = attrs_for(base, flags);
        buffer.set_rich_text(
            &mut self.font_system,
            spans,
            &default_attrs,
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut first_baseline = None;
        for run in buffer.layout_runs() {
            let origin_y = *first_baseline.get_or_insert(run.line_y);
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((0.0, 0.0), 1.0);
                let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical.cache_key)
                else {
                    continue;
                };
                glyphs.push(PositionedGlyph {
                    x: glyph.x + glyph.font_size * glyph.x_offset,
                    y: run.line_y - origin_y + glyph.y - glyph.font_size * glyph.y_offset,
                    segment: glyph.metadata,
                    outline: commands_to_path(commands),
                });
            }
        }
        log::debug!(
            target: "graphics2d",
            "laid out {} segments into {} glyphs",
            segments.len(),
            glyphs.len()
        );
        LaidOutText { segments, glyphs }
    }
}

fn attrs_for(font: &Font, flags: CacheKeyFlags) -> Attrs<'_> {
    Attrs::new()
        .family(logical_family(&font.family))
        .weight(if font.style.is_bold() {
            Weight::BOLD
        } else {
            Weight::NORMAL
        })
        .style(if font.style.is_italic() {
            Style::Italic
        } else {
            Style::Normal
        })
        .cache_key_flags(flags)
}

/// Outline commands are y-up; the result is y-down.
fn commands_to_path(commands: &[Command]) -> BezPath {
    let mut path = BezPath::new();
    for cmd in commands {
        match cmd {
            Command::MoveTo(p) => path.move_to((p.x as f64, -p.y as f64)),
            Command::LineTo(p) => path.line_to((p.x as f64, -p.y as f64)),
            Command::QuadTo(c, p) => {
                path.quad_to((c.x as f64, -c.y as f64), (p.x as f64, -p.y as f64))
            }
            Command::CurveTo(c1, c2, p) => path.curve_to(
                (c1.x as f64, -c1.y as f64),
                (c2.x as f64, -c2.y as f64),
                (p.x as f64, -p.y as f64),
            ),
            Command::Close => path.close_path(),
        }
    }
    path
}
