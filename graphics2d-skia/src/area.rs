//! Geometric intersection of filled shapes.
//!
//! Used by the clip bridge to compute the user-space intersection of the
//! current clip with a new clip shape. Rectangles intersect exactly; any other
//! combination is flattened to polygons and decomposed into horizontal slabs.
//! Inside a slab no two edges cross, so the covered intervals can be read off
//! by sweeping the edges left to right while tracking the winding number of
//! each operand under its own fill rule. The result is a set of trapezoids
//! with a consistent orientation.

use crate::geometry::{path_bounds, PathShape, Shape, WindingRule};
use kurbo::{BezPath, PathEl, Point, Rect};

const EPSILON: f64 = 1e-9;

/// Intersect two filled shapes.
///
/// The result of a non-rectangular intersection is a path using the
/// non-zero rule. Disjoint inputs give an empty path.
pub fn intersect(a: &Shape, b: &Shape) -> Shape {
    if let (Shape::Rect(ra), Shape::Rect(rb)) = (a, b) {
        return Shape::Rect(ra.abs().intersect(rb.abs()));
    }

    if let Some(inner) = contained_in_rect(a, b).or_else(|| contained_in_rect(b, a)) {
        return inner.clone();
    }

    let mut edges = Vec::new();
    collect_edges(&a.to_bez_path(), flatten_tolerance(a), Operand::A, &mut edges);
    collect_edges(&b.to_bez_path(), flatten_tolerance(b), Operand::B, &mut edges);

    let rules = [
        a.winding_rule().unwrap_or_default(),
        b.winding_rule().unwrap_or_default(),
    ];
    Shape::Path(PathShape {
        path: sweep(&edges, rules),
        winding_rule: WindingRule::NonZero,
    })
}

/// `inner` when `outer` is a rectangle covering all of it.
fn contained_in_rect<'a>(outer: &Shape, inner: &'a Shape) -> Option<&'a Shape> {
    let Shape::Rect(r) = outer else {
        return None;
    };
    let inner_bounds = inner.bounds();
    let covers = r.width() >= 0.0
        && r.height() >= 0.0
        && inner_bounds.width() >= 0.0
        && inner_bounds.height() >= 0.0
        && r.contains_rect(inner_bounds);
    covers.then_some(inner)
}

/// Flattening tolerance scaled to the shape's own size, never coarser than
/// a hundredth of a unit.
fn flatten_tolerance(shape: &Shape) -> f64 {
    let b = shape.bounds().abs();
    (b.width().max(b.height()) * 1e-4).clamp(1e-6, 0.01)
}

/// True when the intersection of the two shapes has positive area.
pub fn intersects(a: &Shape, b: &Shape) -> bool {
    let r = path_bounds(&intersect(a, b).to_bez_path());
    r.width() > 0.0 && r.height() > 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    A = 0,
    B = 1,
}

/// A non-horizontal polygon edge, oriented top to bottom.
#[derive(Debug, Clone, Copy)]
struct Edge {
    top: Point,
    bottom: Point,
    /// +1 when the original edge pointed down, -1 when it pointed up.
    dir: i32,
    operand: Operand,
}

impl Edge {
    fn x_at(&self, y: f64) -> f64 {
        let t = (y - self.top.y) / (self.bottom.y - self.top.y);
        self.top.x + t * (self.bottom.x - self.top.x)
    }
}

fn push_edge(p0: Point, p1: Point, operand: Operand, edges: &mut Vec<Edge>) {
    if (p0.y - p1.y).abs() <= EPSILON {
        return;
    }
    let (top, bottom, dir) = if p0.y < p1.y {
        (p0, p1, 1)
    } else {
        (p1, p0, -1)
    };
    edges.push(Edge {
        top,
        bottom,
        dir,
        operand,
    });
}

/// Flatten a path into closed polygon edges. Open subpaths are closed
/// implicitly, as filling does.
fn collect_edges(path: &BezPath, tolerance: f64, operand: Operand, edges: &mut Vec<Edge>) {
    let mut start: Option<Point> = None;
    let mut last = Point::ZERO;
    kurbo::flatten(path.iter(), tolerance, |el| match el {
        PathEl::MoveTo(p) => {
            if let Some(s) = start {
                push_edge(last, s, operand, edges);
            }
            start = Some(p);
            last = p;
        }
        PathEl::LineTo(p) => {
            push_edge(last, p, operand, edges);
            last = p;
        }
        PathEl::ClosePath => {
            if let Some(s) = start {
                push_edge(last, s, operand, edges);
                last = s;
            }
            start = None;
        }
        // flatten only emits lines.
        PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
            push_edge(last, p, operand, edges);
            last = p;
        }
    });
    if let Some(s) = start {
        push_edge(last, s, operand, edges);
    }
}

fn crossing_y(e1: &Edge, e2: &Edge) -> Option<f64> {
    let r = e1.bottom - e1.top;
    let s = e2.bottom - e2.top;
    let denom = r.cross(s);
    if denom.abs() < EPSILON {
        return None;
    }
    let qp = e2.top - e1.top;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0 {
        Some(e1.top.y + t * r.y)
    } else {
        None
    }
}

fn is_inside(winding: i32, rule: WindingRule) -> bool {
    match rule {
        WindingRule::NonZero => winding != 0,
        WindingRule::EvenOdd => winding % 2 != 0,
    }
}

fn sweep(edges: &[Edge], rules: [WindingRule; 2]) -> BezPath {
    let mut ys: Vec<f64> = edges.iter().flat_map(|e| [e.top.y, e.bottom.y]).collect();
    for (i, e1) in edges.iter().enumerate() {
        for e2 in &edges[i + 1..] {
            if e1.bottom.y <= e2.top.y || e2.bottom.y <= e1.top.y {
                continue;
            }
            if let Some(y) = crossing_y(e1, e2) {
                ys.push(y);
            }
        }
    }
    ys.sort_by(|a, b| a.total_cmp(b));
    ys.dedup_by(|a, b| (*a - *b).abs() <= EPSILON);

    let mut out = BezPath::new();
    let mut active: Vec<(f64, f64, f64, &Edge)> = Vec::new();
    for pair in ys.windows(2) {
        let (y0, y1) = (pair[0], pair[1]);
        if y1 - y0 <= EPSILON {
            continue;
        }
        let ym = (y0 + y1) / 2.0;
        active.clear();
        active.extend(
            edges
                .iter()
                .filter(|e| e.top.y < ym && e.bottom.y > ym)
                .map(|e| (e.x_at(ym), e.x_at(y0), e.x_at(y1), e)),
        );
        active.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = [0i32; 2];
        let mut was_inside = false;
        let mut left = (0.0, 0.0);
        for &(_, x0, x1, edge) in &active {
            winding[edge.operand as usize] += edge.dir;
            let inside = is_inside(winding[0], rules[0]) && is_inside(winding[1], rules[1]);
            if inside && !was_inside {
                left = (x0, x1);
            } else if !inside && was_inside {
                emit_trapezoid(&mut out, y0, y1, left, (x0, x1));
            }
            was_inside = inside;
        }
    }
    out
}

fn emit_trapezoid(out: &mut BezPath, y0: f64, y1: f64, left: (f64, f64), right: (f64, f64)) {
    if right.0 - left.0 <= EPSILON && right.1 - left.1 <= EPSILON {
        return;
    }
    out.move_to((left.0, y0));
    out.line_to((right.0, y0));
    out.line_to((right.1, y1));
    out.line_to((left.1, y1));
    out.close_path();
}

/// Bounds of an intersection result, `Rect::ZERO` when empty.
pub fn intersection_bounds(a: &Shape, b: &Shape) -> Rect {
    intersect(a, b).bounds()
}
