//! Conversion between user-space `kurbo` geometry and engine geometry.
//!
//! Engine paths are transient: they are built for a single fill, stroke or
//! clip call and dropped afterwards.

use crate::geometry::{elements, Shape};
use kurbo::{Affine, BezPath, PathEl, Rect};
use tiny_skia::{PathBuilder, PathSegment};

/// Convert a kurbo path to an engine path.
///
/// Returns `None` for paths the engine considers empty (no segments, or only
/// move commands).
pub fn to_engine_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in elements(path) {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Build the engine path for any shape.
pub fn shape_to_engine_path(shape: &Shape) -> Option<tiny_skia::Path> {
    match shape {
        Shape::Path(p) => to_engine_path(&p.path),
        other => to_engine_path(&other.to_bez_path()),
    }
}

/// Convert an engine path back to a kurbo path.
pub fn from_engine_path(path: &tiny_skia::Path) -> BezPath {
    let mut out = BezPath::new();
    for segment in path.segments() {
        match segment {
            PathSegment::MoveTo(p) => out.move_to((p.x as f64, p.y as f64)),
            PathSegment::LineTo(p) => out.line_to((p.x as f64, p.y as f64)),
            PathSegment::QuadTo(c, p) => {
                out.quad_to((c.x as f64, c.y as f64), (p.x as f64, p.y as f64))
            }
            PathSegment::CubicTo(c1, c2, p) => out.curve_to(
                (c1.x as f64, c1.y as f64),
                (c2.x as f64, c2.y as f64),
                (p.x as f64, p.y as f64),
            ),
            PathSegment::Close => out.close_path(),
        }
    }
    out
}

/// Bounds of an engine path in `f64`.
pub fn engine_bounds(path: &tiny_skia::Path) -> Rect {
    let b = path.bounds();
    Rect::new(
        b.left() as f64,
        b.top() as f64,
        b.right() as f64,
        b.bottom() as f64,
    )
}

/// Convert a rectangle with non-negative extent to an engine rectangle.
pub fn to_engine_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(
        rect.x0 as f32,
        rect.y0 as f32,
        rect.x1 as f32,
        rect.y1 as f32,
    )
}

/// Convert a user-space affine transform to the engine matrix.
///
/// kurbo stores `[a b c d e f]` with `x' = a*x + c*y + e` and
/// `y' = b*x + d*y + f`, which is the engine's `from_row` order.
pub fn to_engine_transform(affine: Affine) -> tiny_skia::Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    tiny_skia::Transform::from_row(
        a as f32, b as f32, c as f32, d as f32, e as f32, f as f32,
    )
}

/// Convert an engine matrix to a user-space affine transform.
pub fn from_engine_transform(t: tiny_skia::Transform) -> Affine {
    Affine::new([
        t.sx as f64,
        t.ky as f64,
        t.kx as f64,
        t.sy as f64,
        t.tx as f64,
        t.ty as f64,
    ])
}
