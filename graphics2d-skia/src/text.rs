//! Attributed strings: text plus styled character ranges.

use crate::error::{Graphics2dError, Graphics2dResult};
use crate::font::Font;
use crate::style::Paint;
use std::ops::Range;

/// Style overrides carried by a run. Unset fields inherit the current font
/// and paint of the graphics context.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextAttributes {
    pub family: Option<String>,
    pub size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub foreground: Option<Paint>,
}

impl TextAttributes {
    pub fn is_empty(&self) -> bool {
        *self == TextAttributes::default()
    }

    /// Apply the overrides to `base`.
    pub fn font(&self, base: &Font) -> Font {
        let mut style = base.style;
        if let Some(bold) = self.bold {
            style = style.with_bold(bold);
        }
        if let Some(italic) = self.italic {
            style = style.with_italic(italic);
        }
        Font {
            family: self.family.clone().unwrap_or_else(|| base.family.clone()),
            style,
            size: self.size.unwrap_or(base.size),
        }
    }

    /// Later values win.
    fn merge(&mut self, other: &TextAttributes) {
        if other.family.is_some() {
            self.family.clone_from(&other.family);
        }
        if other.size.is_some() {
            self.size = other.size;
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.foreground.is_some() {
            self.foreground.clone_from(&other.foreground);
        }
    }
}

/// A byte range of the text with its attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRun {
    pub range: Range<usize>,
    pub attrs: TextAttributes,
}

/// Text with possibly overlapping attribute runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributedString {
    text: String,
    runs: Vec<AttributeRun>,
}

impl AttributedString {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    /// Attach `attrs` to the byte `range`, which must lie on character
    /// boundaries.
    pub fn add_attributes(
        &mut self,
        range: Range<usize>,
        attrs: TextAttributes,
    ) -> Graphics2dResult<()> {
        if range.start > range.end
            || range.end > self.text.len()
            || !self.text.is_char_boundary(range.start)
            || !self.text.is_char_boundary(range.end)
        {
            return Err(Graphics2dError::InvalidArgument(format!(
                "attribute range {:?} outside text of length {}",
                range,
                self.text.len()
            )));
        }
        if !range.is_empty() {
            self.runs.push(AttributeRun { range, attrs });
        }
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn runs(&self) -> &[AttributeRun] {
        &self.runs
    }

    /// True when at least one run carries a non-empty attribute set.
    pub fn has_attributes(&self) -> bool {
        self.runs.iter().any(|r| !r.attrs.is_empty())
    }

    /// Split the text into consecutive segments with resolved attributes.
    /// The segments cover the whole text in order.
    pub fn segments(&self) -> Vec<(Range<usize>, TextAttributes)> {
        let mut cuts: Vec<usize> = vec![0, self.text.len()];
        for run in &self.runs {
            cuts.push(run.range.start);
            cuts.push(run.range.end);
        }
        cuts.sort_unstable();
        cuts.dedup();

        cuts.windows(2)
            .filter(|w| w[0] < w[1])
            .map(|w| {
                let mut attrs = TextAttributes::default();
                for run in &self.runs {
                    if run.range.start <= w[0] && w[1] <= run.range.end {
                        attrs.merge(&run.attrs);
                    }
                }
                (w[0]..w[1], attrs)
            })
            .collect()
    }
}

impl From<&str> for AttributedString {
    fn from(text: &str) -> Self {
        AttributedString::new(text)
    }
}
