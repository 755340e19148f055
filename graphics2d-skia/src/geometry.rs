//! User-space shapes accepted by the drawing and clipping operations.
//!
//! Shapes are plain values in `f64` user-space coordinates backed by `kurbo`.
//! Rectangles keep their signed extent (`x1 < x0` means negative width) so that
//! degenerate arguments can be detected the same way the emulated API does.

use kurbo::{Affine, BezPath, Line, PathEl, Point, Rect, Shape as _, Vec2};

/// Tolerance used when curves have to be approximated by kurbo.
pub(crate) const PATH_TOLERANCE: f64 = 0.1;

/// Bezier approximation constant for quarter ellipses.
const KAPPA: f64 = 0.552_284_749_8;

/// Fill rule of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindingRule {
    /// Non-zero winding rule (default).
    #[default]
    NonZero,
    /// Even-odd rule.
    EvenOdd,
}

impl From<WindingRule> for tiny_skia::FillRule {
    fn from(rule: WindingRule) -> Self {
        match rule {
            WindingRule::NonZero => tiny_skia::FillRule::Winding,
            WindingRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

/// How an arc is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArcClosure {
    /// No closing segment.
    #[default]
    Open,
    /// Straight segment from the end point back to the start point.
    Chord,
    /// Segments to and from the center of the ellipse.
    Pie,
}

/// An elliptical arc inscribed in `frame`.
///
/// Angles are in degrees, zero at three o'clock, positive values run
/// counter-clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcShape {
    pub frame: Rect,
    pub start: f64,
    pub extent: f64,
    pub closure: ArcClosure,
}

/// An arbitrary path with its fill rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathShape {
    pub path: BezPath,
    pub winding_rule: WindingRule,
}

/// A rectangle with rounded corners. `arc_width` and `arc_height` are the
/// diameters of the corner ellipses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRectShape {
    pub frame: Rect,
    pub arc_width: f64,
    pub arc_height: f64,
}

/// The closed set of shape kinds the bridge understands.
///
/// `Line`, `Rect` and `Ellipse` have direct engine primitives; every other
/// variant is drawn through path conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line(Line),
    Rect(Rect),
    /// Ellipse inscribed in the frame rectangle.
    Ellipse(Rect),
    RoundRect(RoundRectShape),
    Arc(ArcShape),
    Path(PathShape),
}

/// Signed rectangle from origin and size.
pub(crate) fn xywh(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::new(x, y, x + width, y + height)
}

impl Shape {
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Shape::Line(Line::new((x1, y1), (x2, y2)))
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Shape::Rect(xywh(x, y, width, height))
    }

    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Shape::Ellipse(xywh(x, y, width, height))
    }

    pub fn round_rect(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    ) -> Self {
        Shape::RoundRect(RoundRectShape {
            frame: xywh(x, y, width, height),
            arc_width,
            arc_height,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        start: f64,
        extent: f64,
        closure: ArcClosure,
    ) -> Self {
        Shape::Arc(ArcShape {
            frame: xywh(x, y, width, height),
            start,
            extent,
            closure,
        })
    }

    /// A closed polygon filled with the even-odd rule.
    pub fn polygon(points: &[(f64, f64)]) -> Self {
        let mut path = BezPath::new();
        for (i, &p) in points.iter().enumerate() {
            if i == 0 {
                path.move_to(p);
            } else {
                path.line_to(p);
            }
        }
        if !points.is_empty() {
            path.close_path();
        }
        Shape::Path(PathShape {
            path,
            winding_rule: WindingRule::EvenOdd,
        })
    }

    pub fn path(path: BezPath, winding_rule: WindingRule) -> Self {
        Shape::Path(PathShape { path, winding_rule })
    }

    /// The winding rule carried by the shape, if it has one.
    pub fn winding_rule(&self) -> Option<WindingRule> {
        match self {
            Shape::Path(p) => Some(p.winding_rule),
            _ => None,
        }
    }

    /// Bounding box in the shape's own coordinates.
    ///
    /// Rectangular shapes report their frame as given, so a negative extent
    /// stays negative. Empty paths report `Rect::ZERO`.
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Line(l) => Rect::from_points(l.p0, l.p1),
            Shape::Rect(r) | Shape::Ellipse(r) => *r,
            Shape::RoundRect(rr) => rr.frame,
            Shape::Arc(_) => path_bounds(&self.to_bez_path()),
            Shape::Path(p) => path_bounds(&p.path),
        }
    }

    /// True for shapes whose bounds have no area (line segments, zero or
    /// negative width/height).
    pub fn is_degenerate(&self) -> bool {
        let b = self.bounds();
        !(b.width() > 0.0 && b.height() > 0.0)
    }

    /// Build the outline of the shape.
    ///
    /// Frames with a negative width or height enclose nothing and yield an
    /// empty path, whatever transform is applied later.
    pub fn to_bez_path(&self) -> BezPath {
        match self {
            Shape::Rect(r) | Shape::Ellipse(r) if is_negative(*r) => BezPath::new(),
            Shape::RoundRect(RoundRectShape { frame, .. }) | Shape::Arc(ArcShape { frame, .. })
                if is_negative(*frame) =>
            {
                BezPath::new()
            }
            Shape::Line(l) => {
                let mut path = BezPath::new();
                path.move_to(l.p0);
                path.line_to(l.p1);
                path
            }
            Shape::Rect(r) => {
                let mut path = BezPath::new();
                path.move_to((r.x0, r.y0));
                path.line_to((r.x1, r.y0));
                path.line_to((r.x1, r.y1));
                path.line_to((r.x0, r.y1));
                path.close_path();
                path
            }
            Shape::Ellipse(frame) => ellipse_path(*frame),
            Shape::RoundRect(rr) => round_rect_path(rr),
            Shape::Arc(arc) => arc_path(arc),
            Shape::Path(p) => p.path.clone(),
        }
    }

    /// Map the shape through `affine`.
    ///
    /// Rectangles and ellipses stay in their variant under axis-aligned
    /// transforms; everything else becomes a path.
    pub fn transformed(&self, affine: Affine) -> Shape {
        let [_, b, c, _, _, _] = affine.as_coeffs();
        let axis_aligned = b == 0.0 && c == 0.0;
        match self {
            Shape::Line(l) => Shape::Line(Line::new(affine * l.p0, affine * l.p1)),
            Shape::Rect(r) if axis_aligned => Shape::Rect(map_frame(affine, *r)),
            Shape::Ellipse(r) if axis_aligned => Shape::Ellipse(map_frame(affine, *r)),
            Shape::RoundRect(rr) if axis_aligned => {
                let [a, _, _, d, _, _] = affine.as_coeffs();
                Shape::RoundRect(RoundRectShape {
                    frame: map_frame(affine, rr.frame),
                    arc_width: rr.arc_width * a.abs(),
                    arc_height: rr.arc_height * d.abs(),
                })
            }
            Shape::Path(p) => {
                let mut path = p.path.clone();
                path.apply_affine(affine);
                Shape::Path(PathShape {
                    path,
                    winding_rule: p.winding_rule,
                })
            }
            other => {
                let mut path = other.to_bez_path();
                path.apply_affine(affine);
                Shape::Path(PathShape {
                    path,
                    winding_rule: WindingRule::NonZero,
                })
            }
        }
    }
}

fn is_negative(r: Rect) -> bool {
    r.width() < 0.0 || r.height() < 0.0
}

fn map_frame(affine: Affine, r: Rect) -> Rect {
    if is_negative(r) {
        // Keep the emptiness of negative frames.
        let origin = affine * Point::new(r.x0, r.y0);
        return Rect::from_origin_size(origin, (0.0, 0.0));
    }
    Rect::from_points(affine * Point::new(r.x0, r.y0), affine * Point::new(r.x1, r.y1))
}

pub(crate) fn path_bounds(path: &BezPath) -> Rect {
    if path.elements().is_empty() {
        Rect::ZERO
    } else {
        path.bounding_box()
    }
}

fn ellipse_path(frame: Rect) -> BezPath {
    let (cx, cy) = (frame.center().x, frame.center().y);
    let (rx, ry) = (frame.width() / 2.0, frame.height() / 2.0);
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let mut path = BezPath::new();
    path.move_to((cx + rx, cy));
    path.curve_to((cx + rx, cy + ky), (cx + kx, cy + ry), (cx, cy + ry));
    path.curve_to((cx - kx, cy + ry), (cx - rx, cy + ky), (cx - rx, cy));
    path.curve_to((cx - rx, cy - ky), (cx - kx, cy - ry), (cx, cy - ry));
    path.curve_to((cx + kx, cy - ry), (cx + rx, cy - ky), (cx + rx, cy));
    path.close_path();
    path
}

fn round_rect_path(rr: &RoundRectShape) -> BezPath {
    let f = rr.frame;
    let rx = (rr.arc_width.abs() / 2.0).min(f.width() / 2.0);
    let ry = (rr.arc_height.abs() / 2.0).min(f.height() / 2.0);
    if rx <= 0.0 || ry <= 0.0 {
        return Shape::Rect(f).to_bez_path();
    }
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let mut path = BezPath::new();
    path.move_to((f.x0 + rx, f.y0));
    path.line_to((f.x1 - rx, f.y0));
    path.curve_to((f.x1 - rx + kx, f.y0), (f.x1, f.y0 + ry - ky), (f.x1, f.y0 + ry));
    path.line_to((f.x1, f.y1 - ry));
    path.curve_to((f.x1, f.y1 - ry + ky), (f.x1 - rx + kx, f.y1), (f.x1 - rx, f.y1));
    path.line_to((f.x0 + rx, f.y1));
    path.curve_to((f.x0 + rx - kx, f.y1), (f.x0, f.y1 - ry + ky), (f.x0, f.y1 - ry));
    path.line_to((f.x0, f.y0 + ry));
    path.curve_to((f.x0, f.y0 + ry - ky), (f.x0 + rx - kx, f.y0), (f.x0 + rx, f.y0));
    path.close_path();
    path
}

fn arc_path(arc: &ArcShape) -> BezPath {
    let frame = arc.frame;
    let center = frame.center();
    let radii = Vec2::new(frame.width() / 2.0, frame.height() / 2.0);
    // Screen angles grow counter-clockwise while y points down.
    let start_angle = -arc.start.to_radians();
    let sweep_angle = -arc.extent.to_radians();
    let start = Point::new(
        center.x + radii.x * start_angle.cos(),
        center.y + radii.y * start_angle.sin(),
    );

    let mut path = BezPath::new();
    if arc.closure == ArcClosure::Pie {
        path.move_to(center);
        path.line_to(start);
    } else {
        path.move_to(start);
    }
    let k_arc = kurbo::Arc {
        center,
        radii,
        start_angle,
        sweep_angle,
        x_rotation: 0.0,
    };
    for el in k_arc.append_iter(PATH_TOLERANCE) {
        path.push(el);
    }
    if arc.closure != ArcClosure::Open {
        path.close_path();
    }
    path
}

/// Integer rectangle reported by clip bounds and used for hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl IntRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest integer rectangle enclosing `r`.
    pub fn enclosing(r: Rect) -> Self {
        if r.width() <= 0.0 || r.height() <= 0.0 {
            return IntRect::new(r.x0.floor() as i32, r.y0.floor() as i32, 0, 0);
        }
        let x0 = r.x0.floor();
        let y0 = r.y0.floor();
        let x1 = r.x1.ceil();
        let y1 = r.y1.ceil();
        IntRect::new(x0 as i32, y0 as i32, (x1 - x0) as i32, (y1 - y0) as i32)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn to_rect(self) -> Rect {
        xywh(
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
        )
    }
}

/// Strict overlap test: both rectangles must have positive area and share
/// a region of positive area.
pub(crate) fn bounds_overlap(a: Rect, b: Rect) -> bool {
    a.width() > 0.0
        && a.height() > 0.0
        && b.width() > 0.0
        && b.height() > 0.0
        && a.x0 < b.x1
        && b.x0 < a.x1
        && a.y0 < b.y1
        && b.y0 < a.y1
}

/// Iterate the elements of a path as owned values.
pub(crate) fn elements(path: &BezPath) -> impl Iterator<Item = PathEl> + '_ {
    path.elements().iter().copied()
}
