//! Translation of paint, stroke and composite attributes into engine paint
//! state.
//!
//! The mapper owns the single engine paint of a bridge. Every `apply_*` call
//! compares the incoming attribute with the installed one and only rebuilds
//! the engine configuration when they differ.

use crate::canvas::{EnginePaint, PaintStyle};
use crate::color::Color;
use crate::composite::Composite;
use crate::gradient::{CycleMethod, GradientStop};
use crate::stroke::BasicStroke;
use crate::style::Paint;
use tiny_skia::{Shader, SpreadMode, StrokeDash, Transform};

/// Thinnest stroke handed to the engine.
pub const MIN_STROKE_WIDTH: f32 = 0.1;

fn point(p: kurbo::Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x as f32, p.y as f32)
}

fn engine_stops(stops: &[GradientStop]) -> Vec<tiny_skia::GradientStop> {
    stops
        .iter()
        .map(|s| tiny_skia::GradientStop::new(s.fraction, s.color.into()))
        .collect()
}

/// Build the shader for a paint. Gradient geometry the engine rejects
/// degrades to the first stop color.
pub fn shader_for(paint: &Paint) -> Shader<'static> {
    let (shader, fallback) = match paint {
        Paint::Color(c) => return Shader::SolidColor((*c).into()),
        Paint::Gradient(g) => (
            tiny_skia::LinearGradient::new(
                point(g.p1),
                point(g.p2),
                vec![
                    tiny_skia::GradientStop::new(0.0, g.color1.into()),
                    tiny_skia::GradientStop::new(1.0, g.color2.into()),
                ],
                if g.cyclic {
                    SpreadMode::Reflect
                } else {
                    SpreadMode::Pad
                },
                Transform::identity(),
            ),
            g.color1,
        ),
        Paint::LinearGradient(g) => (
            tiny_skia::LinearGradient::new(
                point(g.start),
                point(g.end),
                engine_stops(&g.stops),
                g.cycle.into(),
                Transform::identity(),
            ),
            first_color(&g.stops),
        ),
        Paint::RadialGradient(g) => {
            // A focus away from the center becomes a two-point conical
            // gradient from the focus to the outer circle.
            let start = if g.is_centered() { g.center } else { g.focus };
            (
                tiny_skia::RadialGradient::new(
                    point(start),
                    point(g.center),
                    g.radius,
                    engine_stops(&g.stops),
                    g.cycle.into(),
                    Transform::identity(),
                ),
                first_color(&g.stops),
            )
        }
    };
    shader.unwrap_or_else(|| {
        log::warn!(
            target: "graphics2d",
            "degenerate gradient, painting with first stop color"
        );
        Shader::SolidColor(fallback.into())
    })
}

fn first_color(stops: &[GradientStop]) -> Color {
    stops.first().map(|s| s.color).unwrap_or_default()
}

/// Engine stroke for a stroke descriptor.
pub fn engine_stroke(stroke: &BasicStroke) -> tiny_skia::Stroke {
    let dash = match &stroke.dash {
        Some(intervals) if !intervals.is_empty() => {
            let mut intervals = intervals.clone();
            if intervals.len() % 2 == 1 {
                intervals.extend_from_within(..);
            }
            let dash = StrokeDash::new(intervals, stroke.dash_phase);
            if dash.is_none() {
                log::warn!(
                    target: "graphics2d",
                    "invalid dash pattern {:?}, stroking solid",
                    stroke.dash
                );
            }
            dash
        }
        _ => None,
    };
    tiny_skia::Stroke {
        width: stroke.width.max(MIN_STROKE_WIDTH),
        miter_limit: stroke.miter_limit,
        line_cap: stroke.cap.into(),
        line_join: stroke.join.into(),
        dash,
    }
}

/// The installed attributes and the engine paint derived from them.
#[derive(Debug, Clone)]
pub struct PaintMapper {
    engine: EnginePaint,
    paint: Paint,
    stroke: BasicStroke,
    composite: Composite,
}

impl Default for PaintMapper {
    fn default() -> Self {
        let stroke = BasicStroke::default();
        Self {
            engine: EnginePaint {
                stroke: engine_stroke(&stroke),
                ..EnginePaint::default()
            },
            paint: Paint::default(),
            stroke,
            composite: Composite::default(),
        }
    }
}

impl PaintMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    pub fn stroke(&self) -> &BasicStroke {
        &self.stroke
    }

    pub fn composite(&self) -> &Composite {
        &self.composite
    }

    pub fn engine_paint(&self) -> &EnginePaint {
        &self.engine
    }

    /// Engine paint configured for filling.
    pub fn fill_paint(&self) -> EnginePaint {
        self.engine.with_style(PaintStyle::Fill)
    }

    /// Engine paint configured for stroking.
    pub fn stroke_paint(&self) -> EnginePaint {
        self.engine.with_style(PaintStyle::Stroke)
    }

    /// Install `paint`. Returns whether the engine paint changed.
    pub fn apply_paint(&mut self, paint: &Paint) -> bool {
        if *paint == self.paint {
            return false;
        }
        self.engine.shader = shader_for(paint);
        self.paint = paint.clone();
        true
    }

    /// Install `stroke`. Returns whether the engine stroke changed.
    pub fn apply_stroke(&mut self, stroke: &BasicStroke) -> bool {
        if *stroke == self.stroke {
            return false;
        }
        self.engine.stroke = engine_stroke(stroke);
        self.stroke = stroke.clone();
        true
    }

    /// Install `composite`. Returns whether the engine paint changed.
    ///
    /// Alpha rules without an engine blend mode keep the previous blend mode
    /// but still update the extra alpha. Custom composites are only stored.
    pub fn apply_composite(&mut self, composite: &Composite) -> bool {
        if *composite == self.composite {
            return false;
        }
        match composite {
            Composite::Alpha(ac) => {
                match ac.rule.blend_mode() {
                    Some(mode) => self.engine.blend_mode = mode,
                    None => log::debug!(
                        target: "graphics2d",
                        "composite rule {:?} has no engine blend mode, keeping {:?}",
                        ac.rule,
                        self.engine.blend_mode
                    ),
                }
                self.engine.alpha = ac.alpha;
            }
            Composite::Custom(name) => log::debug!(
                target: "graphics2d",
                "custom composite {:?} is not rendered, keeping {:?} at alpha {}",
                name,
                self.engine.blend_mode,
                self.engine.alpha
            ),
        }
        self.composite = composite.clone();
        true
    }

    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.engine.anti_alias = anti_alias;
    }

    pub fn set_filter_quality(&mut self, quality: tiny_skia::FilterQuality) {
        self.engine.filter_quality = quality;
    }
}
