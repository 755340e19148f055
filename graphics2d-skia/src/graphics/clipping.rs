//! Clip operations for Graphics2d.

use super::Graphics2d;
use crate::area;
use crate::geometry::{bounds_overlap, IntRect, Shape, WindingRule, PATH_TOLERANCE};
use kurbo::{Affine, StrokeOpts};

/// Inverse of `t`, `None` when the determinant is zero or not finite.
fn invert(t: Affine) -> Option<Affine> {
    let det = t.determinant();
    if det == 0.0 || !det.is_finite() {
        None
    } else {
        Some(t.inverse())
    }
}

fn empty_rect() -> Shape {
    Shape::rect(0.0, 0.0, 0.0, 0.0)
}

impl Graphics2d {
    /// Replace the clip with `shape` in user space; `None` removes it.
    pub fn set_clip(&mut self, shape: Option<&Shape>) {
        log::debug!(
            target: "graphics2d",
            "setClip {:?}",
            shape.map(|s| s.bounds())
        );
        let anti_alias = self.state.hints.antialiasing();
        self.clip.install(
            &mut *self.canvas.borrow_mut(),
            self.state.transform,
            shape,
            anti_alias,
        );
    }

    pub fn set_clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.set_clip(Some(&Shape::rect(x, y, width, height)));
    }

    /// Intersect the clip with `shape`.
    ///
    /// Zero-area arguments such as lines are replaced by their bounding
    /// rectangle first, so they clip everything away.
    pub fn clip(&mut self, shape: &Shape) {
        log::debug!(target: "graphics2d", "clip {:?}", shape.bounds());
        let degenerate;
        let shape = if shape.is_degenerate() {
            degenerate = Shape::Rect(shape.bounds());
            &degenerate
        } else {
            shape
        };

        let Some(current) = self.get_clip() else {
            self.set_clip(Some(shape));
            return;
        };
        if !bounds_overlap(current.bounds(), shape.bounds()) {
            self.set_clip(Some(&empty_rect()));
            return;
        }
        let intersection = area::intersect(&current, shape);
        self.set_clip(Some(&intersection));
    }

    pub fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.clip(&Shape::rect(x, y, width, height));
    }

    /// The clip in current user space, `None` when unclipped. A transform
    /// that cannot be inverted reports an empty rectangle.
    pub fn get_clip(&self) -> Option<Shape> {
        let device = self.clip.device_clip()?;
        Some(match invert(self.state.transform) {
            Some(inverse) => device.transformed(inverse),
            None => empty_rect(),
        })
    }

    /// Integer bounds of [`get_clip`](Self::get_clip).
    pub fn get_clip_bounds(&self) -> Option<IntRect> {
        self.get_clip().map(|s| IntRect::enclosing(s.bounds()))
    }

    /// Whether `shape`, filled or stroked with the current stroke, touches
    /// the device-space `rect` inside the current clip.
    pub fn hit(&self, rect: IntRect, shape: &Shape, on_stroke: bool) -> bool {
        let user = if on_stroke {
            let outline = kurbo::stroke(
                shape.to_bez_path(),
                &self.get_stroke().to_kurbo(),
                &StrokeOpts::default(),
                PATH_TOLERANCE,
            );
            Shape::path(outline, WindingRule::NonZero)
        } else {
            shape.clone()
        };
        let device = user.transformed(self.state.transform);
        let target = match self.clip.device_clip() {
            Some(clip) => area::intersect(&Shape::Rect(rect.to_rect()), clip),
            None => Shape::Rect(rect.to_rect()),
        };
        area::intersects(&device, &target)
    }
}
