//! Paint and stroke style enums.

use crate::color::Color;
use crate::error::{Graphics2dError, Graphics2dResult};
use crate::gradient::{GradientPaint, LinearGradientPaint, RadialGradientPaint};

/// The current paint: a flat color or one of the gradient kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Solid color fill.
    Color(Color),
    /// Two-color linear gradient.
    Gradient(GradientPaint),
    /// Multi-stop linear gradient.
    LinearGradient(LinearGradientPaint),
    /// Multi-stop radial gradient.
    RadialGradient(RadialGradientPaint),
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Color(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Color(color)
    }
}

/// Line cap style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat edge at the endpoint.
    Butt,
    /// Rounded edge extending past the endpoint.
    Round,
    /// Square edge extending past the endpoint.
    #[default]
    Square,
}

impl LineCap {
    /// Decode the integer constants of the emulated API
    /// (0 = butt, 1 = round, 2 = square).
    pub fn from_code(code: i32) -> Graphics2dResult<Self> {
        match code {
            0 => Ok(LineCap::Butt),
            1 => Ok(LineCap::Round),
            2 => Ok(LineCap::Square),
            _ => Err(Graphics2dError::InvalidStrokeAttribute { kind: "cap", code }),
        }
    }
}

impl From<LineCap> for tiny_skia::LineCap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        }
    }
}

impl From<LineCap> for kurbo::Cap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => kurbo::Cap::Butt,
            LineCap::Round => kurbo::Cap::Round,
            LineCap::Square => kurbo::Cap::Square,
        }
    }
}

/// Line join style for stroke operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

impl LineJoin {
    /// Decode the integer constants of the emulated API
    /// (0 = miter, 1 = round, 2 = bevel).
    pub fn from_code(code: i32) -> Graphics2dResult<Self> {
        match code {
            0 => Ok(LineJoin::Miter),
            1 => Ok(LineJoin::Round),
            2 => Ok(LineJoin::Bevel),
            _ => Err(Graphics2dError::InvalidStrokeAttribute {
                kind: "join",
                code,
            }),
        }
    }
}

impl From<LineJoin> for tiny_skia::LineJoin {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

impl From<LineJoin> for kurbo::Join {
    fn from(join: LineJoin) -> Self {
        match join {
            LineJoin::Miter => kurbo::Join::Miter,
            LineJoin::Round => kurbo::Join::Round,
            LineJoin::Bevel => kurbo::Join::Bevel,
        }
    }
}
