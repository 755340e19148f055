//! Image drawing operations for Graphics2d.

use super::Graphics2d;
use crate::color::Color;
use crate::geometry::{xywh, Shape};
use crate::image::{to_engine_pixmap, ImageSource};
use crate::path_convert::{to_engine_rect, to_engine_transform};
use crate::style::Paint;
use kurbo::{Affine, Rect};
use tiny_skia::Transform;

impl Graphics2d {
    /// Draw `image` with its top-left corner at `(x, y)`. Transparent
    /// pixels show `bg` when given.
    pub fn draw_image(&mut self, image: &dyn ImageSource, x: f64, y: f64, bg: Option<Color>) -> bool {
        let (w, h) = (image.width() as f64, image.height() as f64);
        self.draw_image_region(image, xywh(x, y, w, h), xywh(0.0, 0.0, w, h), bg)
    }

    /// Draw `image` scaled into the given rectangle.
    pub fn draw_image_scaled(
        &mut self,
        image: &dyn ImageSource,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        bg: Option<Color>,
    ) -> bool {
        let src = xywh(0.0, 0.0, image.width() as f64, image.height() as f64);
        self.draw_image_region(image, xywh(x, y, width, height), src, bg)
    }

    /// Draw the `src` region of `image` into `dst`. Corners given in
    /// reverse order on one side and not the other mirror the image.
    pub fn draw_image_region(
        &mut self,
        image: &dyn ImageSource,
        dst: Rect,
        src: Rect,
        bg: Option<Color>,
    ) -> bool {
        log::debug!(
            target: "graphics2d",
            "drawImage {}x{} {:?} -> {:?}",
            image.width(),
            image.height(),
            src,
            dst
        );
        let flip_x = (dst.x1 < dst.x0) != (src.x1 < src.x0);
        let flip_y = (dst.y1 < dst.y0) != (src.y1 < src.y0);
        let (dst, src) = (dst.abs(), src.abs());
        if dst.width() <= 0.0 || dst.height() <= 0.0 {
            return true;
        }
        // Clamp the source to the image and shrink the destination with it,
        // so the pixels that remain keep their place.
        let clamped = src.intersect(Rect::new(
            0.0,
            0.0,
            image.width() as f64,
            image.height() as f64,
        ));
        if clamped.width() <= 0.0 || clamped.height() <= 0.0 {
            return true;
        }
        let center = dst.center();
        let (sx, sy) = (dst.width() / src.width(), dst.height() / src.height());
        let dst = Rect::new(
            dst.x0 + (clamped.x0 - src.x0) * sx,
            dst.y0 + (clamped.y0 - src.y0) * sy,
            dst.x0 + (clamped.x1 - src.x0) * sx,
            dst.y0 + (clamped.y1 - src.y0) * sy,
        );
        let src = clamped;
        let Some(pixmap) = to_engine_pixmap(image) else {
            log::warn!(target: "graphics2d", "image data does not match its size");
            return false;
        };

        if let Some(bg) = bg {
            let mirrored = Rect::new(
                if flip_x { 2.0 * center.x - dst.x1 } else { dst.x0 },
                if flip_y { 2.0 * center.y - dst.y1 } else { dst.y0 },
                if flip_x { 2.0 * center.x - dst.x0 } else { dst.x1 },
                if flip_y { 2.0 * center.y - dst.y0 } else { dst.y1 },
            );
            self.fill_with(Paint::Color(bg), &Shape::Rect(mirrored));
        }

        let (Some(src_rect), Some(dst_rect)) = (to_engine_rect(src), to_engine_rect(dst)) else {
            return false;
        };
        let paint = self.state.mapper.engine_paint().clone();
        let mut canvas = self.canvas.borrow_mut();
        let count = canvas.save();
        if flip_x || flip_y {
            canvas.concat(
                Transform::from_translate(center.x as f32, center.y as f32)
                    .pre_scale(
                        if flip_x { -1.0 } else { 1.0 },
                        if flip_y { -1.0 } else { 1.0 },
                    )
                    .pre_translate(-center.x as f32, -center.y as f32),
            );
        }
        canvas.draw_image_rect(&pixmap, src_rect, dst_rect, &paint);
        canvas.restore_to_count(count);
        true
    }

    /// Draw `image` through `transform` applied after the current
    /// transform.
    pub fn draw_image_transformed(&mut self, image: &dyn ImageSource, transform: &Affine) -> bool {
        log::debug!(target: "graphics2d", "drawImage with {:?}", transform);
        let Some(pixmap) = to_engine_pixmap(image) else {
            log::warn!(target: "graphics2d", "image data does not match its size");
            return false;
        };
        let Some(full) = tiny_skia::Rect::from_xywh(
            0.0,
            0.0,
            image.width() as f32,
            image.height() as f32,
        ) else {
            return false;
        };
        let paint = self.state.mapper.engine_paint().clone();
        let mut canvas = self.canvas.borrow_mut();
        let count = canvas.save();
        canvas.concat(to_engine_transform(*transform));
        canvas.draw_image_rect(&pixmap, full, full, &paint);
        canvas.restore_to_count(count);
        true
    }

    /// Fill `shape` with `paint`, leaving the installed paint in place
    /// afterwards.
    pub(crate) fn fill_with(&mut self, paint: Paint, shape: &Shape) {
        let saved = self.state.mapper.paint().clone();
        self.state.mapper.apply_paint(&paint);
        self.fill(shape);
        self.state.mapper.apply_paint(&saved);
    }
}
