//! Physical typeface resolution with a process-wide memo.
//!
//! Logical family names (`Serif`, `SansSerif`, `Monospaced`, `Dialog`,
//! `DialogInput` and the CSS generics) resolve to the generic families of the
//! font database; any other name is looked up as a concrete family. Results,
//! including misses, are cached per (name, style) and never evicted.

use crate::error::{Graphics2dError, Graphics2dResult};
use crate::font::{FontStyle, Glyph};
use crate::font_config::FontConfig;
use dashmap::DashMap;
use kurbo::BezPath;
use std::sync::Arc;

/// Client hook that rewrites a requested family name before lookup.
pub type FontNameMapper = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Cache key: the family name as requested plus the style bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypefaceKey {
    pub family: String,
    pub style: FontStyle,
}

/// A loaded font face.
pub struct Typeface {
    family: String,
    style: FontStyle,
    data: Arc<Vec<u8>>,
    index: u32,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    line_gap: i16,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("family", &self.family)
            .field("style", &self.style)
            .field("index", &self.index)
            .finish()
    }
}

impl Typeface {
    /// Wrap raw face data. Fails when the bytes are not a parseable face.
    pub fn from_data(
        data: Arc<Vec<u8>>,
        index: u32,
        family: impl Into<String>,
        style: FontStyle,
    ) -> Graphics2dResult<Self> {
        let face = ttf_parser::Face::parse(&data, index)
            .map_err(|e| Graphics2dError::FontError(e.to_string()))?;
        let (units_per_em, ascender, descender, line_gap) = (
            face.units_per_em(),
            face.ascender(),
            face.descender(),
            face.line_gap(),
        );
        Ok(Self {
            family: family.into(),
            style,
            data,
            index,
            units_per_em,
            ascender,
            descender,
            line_gap,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }

    /// Raw face bytes and collection index.
    pub fn data(&self) -> (&[u8], u32) {
        (&self.data, self.index)
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }

    fn scale(&self, size: f32) -> f64 {
        size as f64 / self.units_per_em.max(1) as f64
    }

    /// Ascent, descent and leading at `size`, all non-negative.
    pub fn line_metrics(&self, size: f32) -> (f32, f32, f32) {
        let scale = self.scale(size) as f32;
        (
            self.ascender as f32 * scale,
            -(self.descender as f32) * scale,
            self.line_gap.max(0) as f32 * scale,
        )
    }

    /// Map each character to a glyph and place the glyphs along the
    /// baseline. Characters without a glyph use glyph 0.
    pub fn glyphs(&self, text: &str, size: f32) -> Vec<Glyph> {
        let Some(face) = self.face() else {
            return Vec::new();
        };
        let scale = self.scale(size);
        let mut pen = 0.0;
        let mut glyphs = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let id = face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
            let advance = face.glyph_hor_advance(id).unwrap_or(0) as f64 * scale;
            let mut sink = OutlineSink::new(scale);
            face.outline_glyph(id, &mut sink);
            glyphs.push(Glyph {
                id: id.0,
                x: pen,
                advance,
                outline: sink.path,
            });
            pen += advance;
        }
        glyphs
    }

    /// Total advance of `text` at `size`.
    pub fn advance(&self, text: &str, size: f32) -> f32 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let scale = self.scale(size);
        text.chars()
            .map(|ch| {
                let id = face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
                face.glyph_hor_advance(id).unwrap_or(0) as f64 * scale
            })
            .sum::<f64>() as f32
    }
}

/// Collects a glyph outline in font units into a y-down path at point size.
struct OutlineSink {
    path: BezPath,
    scale: f64,
}

impl OutlineSink {
    fn new(scale: f64) -> Self {
        Self {
            path: BezPath::new(),
            scale,
        }
    }

    fn pt(&self, x: f32, y: f32) -> (f64, f64) {
        (x as f64 * self.scale, -(y as f64) * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.pt(x1, y1), self.pt(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.pt(x1, y1), self.pt(x2, y2), self.pt(x, y));
        self.path.curve_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

/// Map a logical family name to a font database family.
pub fn logical_family(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sansserif" | "sans-serif" | "dialog" => fontdb::Family::SansSerif,
        "monospaced" | "monospace" | "dialoginput" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::Name(name),
    }
}

/// Shared resolver from (family, style) to loaded typefaces.
pub struct TypefaceCache {
    db: Arc<fontdb::Database>,
    hinting_enabled: bool,
    entries: DashMap<TypefaceKey, Option<Arc<Typeface>>>,
}

impl TypefaceCache {
    /// Build the font database described by `config`.
    pub fn new(config: &FontConfig) -> Self {
        Self {
            db: Arc::new(config.to_database()),
            hinting_enabled: config.hinting_enabled,
            entries: DashMap::new(),
        }
    }

    /// Use an already populated database.
    pub fn with_database(db: Arc<fontdb::Database>) -> Self {
        Self {
            db,
            hinting_enabled: false,
            entries: DashMap::new(),
        }
    }

    pub fn database(&self) -> &Arc<fontdb::Database> {
        &self.db
    }

    pub fn hinting_enabled(&self) -> bool {
        self.hinting_enabled
    }

    /// Number of memoized lookups, hits and misses alike.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `family` in `style`.
    ///
    /// The cache is consulted with the name as requested; `mapper` only runs
    /// on a miss. A failed lookup is remembered as `None`.
    pub fn resolve(
        &self,
        family: &str,
        style: FontStyle,
        mapper: Option<&FontNameMapper>,
    ) -> Option<Arc<Typeface>> {
        let key = TypefaceKey {
            family: family.to_string(),
            style,
        };
        if let Some(entry) = self.entries.get(&key) {
            return entry.value().clone();
        }

        let mapped = mapper.and_then(|m| m(family));
        let name = mapped.as_deref().unwrap_or(family);
        let resolved = self.lookup(name, style).map(Arc::new);
        match &resolved {
            Some(tf) => log::debug!(
                target: "graphics2d",
                "resolved typeface {} {:?} -> {}",
                family,
                style,
                tf.family()
            ),
            None => log::warn!(
                target: "graphics2d",
                "no typeface for {} {:?}",
                name,
                style
            ),
        }
        self.entries.entry(key).or_insert(resolved).value().clone()
    }

    fn lookup(&self, name: &str, style: FontStyle) -> Option<Typeface> {
        let families = [logical_family(name)];
        let query = fontdb::Query {
            families: &families,
            weight: if style.is_bold() {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            stretch: fontdb::Stretch::Normal,
            style: if style.is_italic() {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };
        let id = self.db.query(&query)?;
        let family = self
            .db
            .face(id)
            .and_then(|info| info.families.first().map(|(f, _)| f.clone()))
            .unwrap_or_else(|| name.to_string());
        self.db
            .with_face_data(id, |data, index| {
                Typeface::from_data(Arc::new(data.to_vec()), index, family, style)
            })?
            .map_err(|e| log::warn!(target: "graphics2d", "unusable face for {}: {}", name, e))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_parser::OutlineBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn empty_cache() -> TypefaceCache {
        TypefaceCache::new(&FontConfig::from_fonts(Vec::new()))
    }

    #[test]
    fn test_logical_families() {
        assert_eq!(logical_family("Serif"), fontdb::Family::Serif);
        assert_eq!(logical_family("SansSerif"), fontdb::Family::SansSerif);
        assert_eq!(logical_family("Dialog"), fontdb::Family::SansSerif);
        assert_eq!(logical_family("Monospaced"), fontdb::Family::Monospace);
        assert_eq!(logical_family("DialogInput"), fontdb::Family::Monospace);
        assert_eq!(logical_family("Inter"), fontdb::Family::Name("Inter"));
    }

    #[test]
    fn test_miss_is_memoized() {
        let cache = empty_cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mapper: FontNameMapper = Arc::new(move |name: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(format!("{} Pro", name))
        });

        assert!(cache.resolve("Nope", FontStyle::BOLD, Some(&mapper)).is_none());
        assert!(cache.resolve("Nope", FontStyle::BOLD, Some(&mapper)).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        // Different style is a different key.
        assert!(cache.resolve("Nope", FontStyle::PLAIN, Some(&mapper)).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalid_face_data_is_rejected() {
        let err = Typeface::from_data(Arc::new(vec![1, 2, 3]), 0, "x", FontStyle::PLAIN);
        assert!(matches!(err, Err(Graphics2dError::FontError(_))));
    }

    #[test]
    fn test_outline_sink_flips_and_scales() {
        let mut sink = OutlineSink::new(0.5);
        sink.move_to(0.0, 0.0);
        sink.line_to(100.0, 200.0);
        sink.close();
        let b = crate::geometry::path_bounds(&sink.path);
        assert_eq!(b, kurbo::Rect::new(0.0, -100.0, 50.0, 0.0));
    }
}
