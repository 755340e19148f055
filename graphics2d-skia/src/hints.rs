//! Rendering hints: keyed quality/behaviour switches.

use crate::error::{Graphics2dError, Graphics2dResult};
use crate::typeface::FontNameMapper;
use std::collections::HashMap;
use std::fmt;

/// Hint categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintKey {
    Antialiasing,
    TextAntialiasing,
    Rendering,
    Interpolation,
    StrokeControl,
    FractionalMetrics,
    /// Family name rewriting applied before typeface lookup.
    FontMapping,
}

/// Values a hint can take. Which values are valid depends on the key.
#[derive(Clone)]
pub enum HintValue {
    Default,
    On,
    Off,
    Speed,
    Quality,
    NearestNeighbor,
    Bilinear,
    Bicubic,
    Normalize,
    Pure,
    FontMapper(FontNameMapper),
}

impl fmt::Debug for HintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HintValue::Default => f.write_str("Default"),
            HintValue::On => f.write_str("On"),
            HintValue::Off => f.write_str("Off"),
            HintValue::Speed => f.write_str("Speed"),
            HintValue::Quality => f.write_str("Quality"),
            HintValue::NearestNeighbor => f.write_str("NearestNeighbor"),
            HintValue::Bilinear => f.write_str("Bilinear"),
            HintValue::Bicubic => f.write_str("Bicubic"),
            HintValue::Normalize => f.write_str("Normalize"),
            HintValue::Pure => f.write_str("Pure"),
            HintValue::FontMapper(_) => f.write_str("FontMapper(..)"),
        }
    }
}

impl PartialEq for HintValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // Mappers compare by identity.
            (HintValue::FontMapper(a), HintValue::FontMapper(b)) => std::sync::Arc::ptr_eq(a, b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl HintKey {
    /// Whether `value` is meaningful for this key.
    pub fn accepts(self, value: &HintValue) -> bool {
        use HintValue::*;
        match self {
            HintKey::Antialiasing | HintKey::TextAntialiasing | HintKey::FractionalMetrics => {
                matches!(value, Default | On | Off)
            }
            HintKey::Rendering => matches!(value, Default | Speed | Quality),
            HintKey::Interpolation => matches!(value, NearestNeighbor | Bilinear | Bicubic),
            HintKey::StrokeControl => matches!(value, Default | Normalize | Pure),
            HintKey::FontMapping => matches!(value, FontMapper(_)),
        }
    }
}

/// Map from hint keys to values.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderingHints {
    values: HashMap<HintKey, HintValue>,
}

impl Default for RenderingHints {
    fn default() -> Self {
        let mut values = HashMap::new();
        values.insert(HintKey::Antialiasing, HintValue::On);
        Self { values }
    }
}

impl RenderingHints {
    /// A hint set with no entries.
    pub fn empty() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn get(&self, key: HintKey) -> Option<&HintValue> {
        self.values.get(&key)
    }

    /// Store a hint, rejecting values the key does not accept.
    pub fn insert(&mut self, key: HintKey, value: HintValue) -> Graphics2dResult<()> {
        if !key.accepts(&value) {
            return Err(Graphics2dError::InvalidArgument(format!(
                "{:?} is not a valid value for {:?}",
                value, key
            )));
        }
        self.values.insert(key, value);
        Ok(())
    }

    pub fn remove(&mut self, key: HintKey) -> Option<HintValue> {
        self.values.remove(&key)
    }

    /// Copy every entry of `other` over this set.
    pub fn extend(&mut self, other: &RenderingHints) {
        for (k, v) in &other.values {
            self.values.insert(*k, v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HintKey, &HintValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Antialiasing is on unless explicitly switched off.
    pub fn antialiasing(&self) -> bool {
        !matches!(self.get(HintKey::Antialiasing), Some(HintValue::Off))
    }

    /// Text follows the antialiasing hint unless set on its own.
    pub fn text_antialiasing(&self) -> bool {
        match self.get(HintKey::TextAntialiasing) {
            Some(HintValue::On) => true,
            Some(HintValue::Off) => false,
            _ => self.antialiasing(),
        }
    }

    pub fn fractional_metrics(&self) -> bool {
        matches!(self.get(HintKey::FractionalMetrics), Some(HintValue::On))
    }

    /// Engine filter quality for image sampling.
    pub fn filter_quality(&self) -> tiny_skia::FilterQuality {
        match self.get(HintKey::Interpolation) {
            Some(HintValue::NearestNeighbor) => tiny_skia::FilterQuality::Nearest,
            Some(HintValue::Bicubic) => tiny_skia::FilterQuality::Bicubic,
            Some(HintValue::Bilinear) => tiny_skia::FilterQuality::Bilinear,
            _ => match self.get(HintKey::Rendering) {
                Some(HintValue::Speed) => tiny_skia::FilterQuality::Nearest,
                Some(HintValue::Quality) => tiny_skia::FilterQuality::Bicubic,
                _ => tiny_skia::FilterQuality::Bilinear,
            },
        }
    }

    pub fn font_mapper(&self) -> Option<&FontNameMapper> {
        match self.get(HintKey::FontMapping) {
            Some(HintValue::FontMapper(m)) => Some(m),
            _ => None,
        }
    }
}
