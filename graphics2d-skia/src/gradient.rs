//! Gradient paint descriptors.
//!
//! All descriptors derive structural equality (control points, stops, colors
//! and cycle method) so the paint mapper can skip rebuilding an equal shader.

use crate::color::Color;
use crate::error::{Graphics2dError, Graphics2dResult};
use kurbo::Point;

/// How a gradient continues outside its defined range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleMethod {
    /// Clamp to the end colors.
    #[default]
    NoCycle,
    /// Restart the gradient.
    Repeat,
    /// Mirror the gradient back and forth.
    Reflect,
}

impl From<CycleMethod> for tiny_skia::SpreadMode {
    fn from(cycle: CycleMethod) -> Self {
        match cycle {
            CycleMethod::NoCycle => tiny_skia::SpreadMode::Pad,
            CycleMethod::Repeat => tiny_skia::SpreadMode::Repeat,
            CycleMethod::Reflect => tiny_skia::SpreadMode::Reflect,
        }
    }
}

/// A color stop in a multi-stop gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0).
    pub fraction: f32,
    /// Color at this stop.
    pub color: Color,
}

impl GradientStop {
    pub fn new(fraction: f32, color: Color) -> Self {
        Self { fraction, color }
    }
}

/// Check that stops are in [0, 1], strictly increasing, and at least two.
fn validate_stops(stops: &[GradientStop]) -> Graphics2dResult<()> {
    if stops.len() < 2 {
        return Err(Graphics2dError::InvalidArgument(format!(
            "gradient needs at least two stops, got {}",
            stops.len()
        )));
    }
    let mut previous = -1.0f32;
    for stop in stops {
        if !(0.0..=1.0).contains(&stop.fraction) || stop.fraction <= previous {
            return Err(Graphics2dError::InvalidGradientStop(stop.fraction));
        }
        previous = stop.fraction;
    }
    Ok(())
}

/// Two-color linear gradient between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientPaint {
    pub p1: Point,
    pub color1: Color,
    pub p2: Point,
    pub color2: Color,
    /// Mirror the gradient outside the segment instead of clamping.
    pub cyclic: bool,
}

impl GradientPaint {
    pub fn new(p1: Point, color1: Color, p2: Point, color2: Color, cyclic: bool) -> Self {
        Self {
            p1,
            color1,
            p2,
            color2,
            cyclic,
        }
    }
}

/// Multi-stop linear gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradientPaint {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
    pub cycle: CycleMethod,
}

impl LinearGradientPaint {
    pub fn new(
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
        cycle: CycleMethod,
    ) -> Graphics2dResult<Self> {
        validate_stops(&stops)?;
        Ok(Self {
            start,
            end,
            stops,
            cycle,
        })
    }
}

/// Multi-stop radial gradient with an optional focus point.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradientPaint {
    pub center: Point,
    pub radius: f32,
    /// Point that maps to the first stop. Equal to `center` for a plain
    /// radial gradient.
    pub focus: Point,
    pub stops: Vec<GradientStop>,
    pub cycle: CycleMethod,
}

impl RadialGradientPaint {
    pub fn new(
        center: Point,
        radius: f32,
        focus: Point,
        stops: Vec<GradientStop>,
        cycle: CycleMethod,
    ) -> Graphics2dResult<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Graphics2dError::InvalidArgument(format!(
                "radial gradient radius must be positive, got {}",
                radius
            )));
        }
        validate_stops(&stops)?;
        Ok(Self {
            center,
            radius,
            focus,
            stops,
            cycle,
        })
    }

    /// Whether the focus coincides with the center.
    pub fn is_centered(&self) -> bool {
        self.focus == self.center
    }
}
