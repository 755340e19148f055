//! Font database configuration.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Where typefaces come from and how generic families are bound.
///
/// Resolved once into a [`fontdb::Database`] by [`FontConfig::to_database`];
/// the typeface cache and the text layout collaborator share the result.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Raw font files (TTF/OTF) registered in addition to system fonts.
    pub custom_fonts: Vec<Arc<Vec<u8>>>,
    /// Preference lists for the generic families logical names map to.
    pub generic_families: GenericFamilyMap,
    /// Whether to scan the system font directories (default: true).
    pub load_system_fonts: bool,
    /// Additional directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Whether glyph outlines from the layout collaborator are hinted
    /// (default: false).
    pub hinting_enabled: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
            hinting_enabled: false,
        }
    }
}

/// Concrete family names for each generic family, in priority order.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub serif: Vec<String>,
    pub sans_serif: Vec<String>,
    pub monospace: Vec<String>,
}

impl GenericFamilyMap {
    /// Families commonly installed on desktop systems.
    pub fn defaults() -> Self {
        Self {
            serif: vec![
                "Times New Roman".into(),
                "Liberation Serif".into(),
                "DejaVu Serif".into(),
            ],
            sans_serif: vec![
                "Arial".into(),
                "Helvetica".into(),
                "Liberation Sans".into(),
                "DejaVu Sans".into(),
            ],
            monospace: vec![
                "Courier New".into(),
                "Liberation Mono".into(),
                "DejaVu Sans Mono".into(),
            ],
        }
    }
}

impl FontConfig {
    /// A configuration that only knows the given font files.
    pub fn from_fonts(fonts: Vec<Arc<Vec<u8>>>) -> Self {
        Self {
            custom_fonts: fonts,
            load_system_fonts: false,
            ..Self::default()
        }
    }

    /// Build the font database. Scanning system fonts is expensive, so
    /// callers build one database and share it.
    pub fn to_database(&self) -> fontdb::Database {
        let mut db = fontdb::Database::new();
        if self.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &self.font_dirs {
            db.load_fonts_dir(dir);
        }
        for data in &self.custom_fonts {
            db.load_font_data(data.as_ref().clone());
        }
        bind_generic_families(&mut db, &self.generic_families);
        log::debug!(
            target: "graphics2d",
            "font database ready with {} faces",
            db.len()
        );
        db
    }
}

/// Point each generic family at the first available preference.
fn bind_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
        .collect();
    let first = |list: &[String]| list.iter().find(|f| available.contains(*f)).cloned();

    if let Some(name) = first(&families.serif) {
        db.set_serif_family(name);
    }
    if let Some(name) = first(&families.sans_serif) {
        db.set_sans_serif_family(name);
    }
    if let Some(name) = first(&families.monospace) {
        db.set_monospace_family(name);
    }
}
