//! Shape drawing and filling for Graphics2d.

use super::Graphics2d;
use crate::canvas::PaintStyle;
use crate::composite::{AlphaComposite, AlphaRule, Composite};
use crate::geometry::{ArcClosure, Shape, WindingRule};
use crate::path_convert::{shape_to_engine_path, to_engine_path, to_engine_rect};
use crate::style::Paint;
use kurbo::Point;

fn kind(shape: &Shape) -> &'static str {
    match shape {
        Shape::Line(_) => "line",
        Shape::Rect(_) => "rect",
        Shape::Ellipse(_) => "ellipse",
        Shape::RoundRect(_) => "round rect",
        Shape::Arc(_) => "arc",
        Shape::Path(_) => "path",
    }
}

fn engine_point(p: Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x as f32, p.y as f32)
}

impl Graphics2d {
    /// Stroke the outline of `shape` with the current stroke and paint.
    pub fn draw(&mut self, shape: &Shape) {
        log::debug!(target: "graphics2d", "draw {} {:?}", kind(shape), shape.bounds());
        self.dispatch(shape, PaintStyle::Stroke);
    }

    /// Fill the interior of `shape` with the current paint.
    pub fn fill(&mut self, shape: &Shape) {
        log::debug!(target: "graphics2d", "fill {} {:?}", kind(shape), shape.bounds());
        self.dispatch(shape, PaintStyle::Fill);
    }

    fn dispatch(&mut self, shape: &Shape, style: PaintStyle) {
        let paint = self.state.mapper.engine_paint().with_style(style);
        let mut canvas = self.canvas.borrow_mut();
        match shape {
            Shape::Line(line) => {
                // A line has no interior.
                if style == PaintStyle::Stroke {
                    canvas.draw_line(engine_point(line.p0), engine_point(line.p1), &paint);
                }
                return;
            }
            Shape::Rect(r) | Shape::Ellipse(r) => {
                let empty = match style {
                    PaintStyle::Fill => r.width() <= 0.0 || r.height() <= 0.0,
                    PaintStyle::Stroke => r.width() < 0.0 || r.height() < 0.0,
                };
                if empty {
                    return;
                }
                if let Some(rect) = to_engine_rect(*r) {
                    if matches!(shape, Shape::Rect(_)) {
                        canvas.draw_rect(rect, &paint);
                    } else {
                        canvas.draw_oval(rect, &paint);
                    }
                    return;
                }
            }
            _ => {}
        }
        if let Some(path) = shape_to_engine_path(shape) {
            let rule = shape.winding_rule().unwrap_or_default();
            canvas.draw_path(&path, rule.into(), &paint);
        }
    }

    /// Convert and draw a path built in the scratch buffer.
    fn dispatch_scratch(&mut self, rule: WindingRule, style: PaintStyle) {
        let paint = self.state.mapper.engine_paint().with_style(style);
        if let Some(path) = to_engine_path(&self.scratch) {
            self.canvas
                .borrow_mut()
                .draw_path(&path, rule.into(), &paint);
        }
    }

    /// Fill the scratch buffer with the polyline through `points`.
    fn build_scratch(&mut self, points: &[(f64, f64)], close: bool) -> bool {
        let mut path = std::mem::take(&mut self.scratch);
        path.truncate(0);
        for (i, &p) in points.iter().enumerate() {
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        if close && !points.is_empty() {
            path.close_path();
        }
        self.scratch = path;
        !points.is_empty()
    }

    pub fn draw_line_xy(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.draw(&Shape::line(x1, y1, x2, y2));
    }

    pub fn draw_rect_xywh(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.draw(&Shape::rect(x, y, width, height));
    }

    pub fn fill_rect_xywh(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.fill(&Shape::rect(x, y, width, height));
    }

    /// Paint the rectangle with the background color, replacing what is
    /// there.
    pub fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        log::debug!(target: "graphics2d", "clearRect {} {} {} {}", x, y, width, height);
        let paint = self.state.mapper.paint().clone();
        let composite = self.state.mapper.composite().clone();
        let background = Paint::Color(self.state.background);
        self.state.mapper.apply_paint(&background);
        self.state
            .mapper
            .apply_composite(&Composite::Alpha(AlphaComposite::of(AlphaRule::Src)));
        self.fill(&Shape::rect(x, y, width, height));
        self.state.mapper.apply_paint(&paint);
        self.state.mapper.apply_composite(&composite);
    }

    pub fn draw_oval(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.draw(&Shape::ellipse(x, y, width, height));
    }

    pub fn fill_oval(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.fill(&Shape::ellipse(x, y, width, height));
    }

    pub fn draw_round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    ) {
        self.draw(&Shape::round_rect(x, y, width, height, arc_width, arc_height));
    }

    pub fn fill_round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    ) {
        self.fill(&Shape::round_rect(x, y, width, height, arc_width, arc_height));
    }

    /// Stroke an open arc; angles in degrees.
    pub fn draw_arc(&mut self, x: f64, y: f64, width: f64, height: f64, start: f64, extent: f64) {
        self.draw(&Shape::arc(x, y, width, height, start, extent, ArcClosure::Open));
    }

    /// Fill a pie slice; angles in degrees.
    pub fn fill_arc(&mut self, x: f64, y: f64, width: f64, height: f64, start: f64, extent: f64) {
        self.fill(&Shape::arc(x, y, width, height, start, extent, ArcClosure::Pie));
    }

    pub fn draw_polyline(&mut self, points: &[(f64, f64)]) {
        log::debug!(target: "graphics2d", "drawPolyline {} points", points.len());
        if self.build_scratch(points, false) {
            self.dispatch_scratch(WindingRule::NonZero, PaintStyle::Stroke);
        }
    }

    pub fn draw_polygon(&mut self, points: &[(f64, f64)]) {
        log::debug!(target: "graphics2d", "drawPolygon {} points", points.len());
        if self.build_scratch(points, true) {
            self.dispatch_scratch(WindingRule::EvenOdd, PaintStyle::Stroke);
        }
    }

    pub fn fill_polygon(&mut self, points: &[(f64, f64)]) {
        log::debug!(target: "graphics2d", "fillPolygon {} points", points.len());
        if self.build_scratch(points, true) {
            self.dispatch_scratch(WindingRule::EvenOdd, PaintStyle::Fill);
        }
    }

    /// Pixel copying between canvas regions is not supported; the call has
    /// no effect.
    pub fn copy_area(&mut self, x: i32, y: i32, width: i32, height: i32, dx: i32, dy: i32) {
        log::debug!(
            target: "graphics2d",
            "copyArea {} {} {} {} by {} {} ignored",
            x,
            y,
            width,
            height,
            dx,
            dy
        );
    }
}
