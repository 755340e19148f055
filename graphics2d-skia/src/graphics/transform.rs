//! Transform operations for Graphics2d.

use super::Graphics2d;
use crate::path_convert::to_engine_transform;
use kurbo::{Affine, Vec2};

impl Graphics2d {
    /// Compose `op` after the current transform and push it to the canvas.
    fn concat(&mut self, op: Affine) {
        self.state.transform = self.state.transform * op;
        self.canvas.borrow_mut().concat(to_engine_transform(op));
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        log::debug!(target: "graphics2d", "translate {} {}", tx, ty);
        self.state.transform = self.state.transform * Affine::translate(Vec2::new(tx, ty));
        self.canvas.borrow_mut().translate(tx as f32, ty as f32);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        log::debug!(target: "graphics2d", "scale {} {}", sx, sy);
        self.state.transform = self.state.transform * Affine::scale_non_uniform(sx, sy);
        self.canvas.borrow_mut().scale(sx as f32, sy as f32);
    }

    /// Rotate by `theta` radians; positive angles turn the x axis toward
    /// the y axis.
    pub fn rotate(&mut self, theta: f64) {
        log::debug!(target: "graphics2d", "rotate {}", theta);
        self.concat(Affine::rotate(theta));
    }

    /// Rotate by `theta` radians around `(x, y)`.
    pub fn rotate_about(&mut self, theta: f64, x: f64, y: f64) {
        log::debug!(target: "graphics2d", "rotate {} about {} {}", theta, x, y);
        self.translate(x, y);
        self.rotate(theta);
        self.translate(-x, -y);
    }

    /// `x' = x + shx * y`, `y' = shy * x + y`.
    pub fn shear(&mut self, shx: f64, shy: f64) {
        log::debug!(target: "graphics2d", "shear {} {}", shx, shy);
        self.concat(Affine::skew(shx, shy));
    }

    /// Compose an arbitrary transform after the current one.
    pub fn transform(&mut self, op: &Affine) {
        log::debug!(target: "graphics2d", "transform {:?}", op);
        self.concat(*op);
    }

    /// Replace the transform; `None` resets to identity.
    pub fn set_transform(&mut self, transform: Option<&Affine>) {
        let transform = transform.copied().unwrap_or(Affine::IDENTITY);
        log::debug!(target: "graphics2d", "setTransform {:?}", transform);
        self.state.transform = transform;
        self.canvas
            .borrow_mut()
            .set_matrix(to_engine_transform(transform));
    }

    /// A copy of the current transform.
    pub fn get_transform(&self) -> Affine {
        self.state.transform
    }
}
