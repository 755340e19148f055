//! Stroke descriptor.

use crate::error::{Graphics2dError, Graphics2dResult};
use crate::style::{LineCap, LineJoin};

/// Width, caps, joins and dashing of stroked outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicStroke {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
    /// Alternating on/off lengths, `None` for a solid stroke.
    pub dash: Option<Vec<f32>>,
    pub dash_phase: f32,
}

impl Default for BasicStroke {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Square,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: None,
            dash_phase: 0.0,
        }
    }
}

impl BasicStroke {
    /// A solid stroke of the given width with default caps and joins.
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Fully specified stroke.
    ///
    /// Negative widths and miter limits below one are rejected the same way
    /// the emulated API rejects them at construction time. Dash values are
    /// validated by the engine when the stroke is installed.
    pub fn with_style(
        width: f32,
        cap: LineCap,
        join: LineJoin,
        miter_limit: f32,
        dash: Option<Vec<f32>>,
        dash_phase: f32,
    ) -> Graphics2dResult<Self> {
        if !(width >= 0.0) {
            return Err(Graphics2dError::InvalidArgument(format!(
                "negative stroke width {}",
                width
            )));
        }
        if join == LineJoin::Miter && !(miter_limit >= 1.0) {
            return Err(Graphics2dError::InvalidArgument(format!(
                "miter limit {} < 1",
                miter_limit
            )));
        }
        Ok(Self {
            width,
            cap,
            join,
            miter_limit,
            dash,
            dash_phase,
        })
    }

    /// Outline stroker settings for hit testing in user space.
    pub(crate) fn to_kurbo(&self) -> kurbo::Stroke {
        let stroke = kurbo::Stroke::new(self.width as f64)
            .with_caps(self.cap.into())
            .with_join(self.join.into())
            .with_miter_limit(self.miter_limit as f64);
        match &self.dash {
            Some(dash) if !dash.is_empty() => stroke.with_dashes(
                self.dash_phase as f64,
                dash.iter().map(|d| *d as f64),
            ),
            _ => stroke,
        }
    }
}
