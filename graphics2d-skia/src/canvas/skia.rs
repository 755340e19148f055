//! tiny-skia implementation of the target engine.

use super::{EnginePaint, PaintStyle, TargetCanvas, TextBlob};
use crate::error::{Graphics2dError, Graphics2dResult};
use tiny_skia::{FillRule, Mask, Path, PathBuilder, Pixmap, Point, Rect, Transform};

/// Maximum canvas dimension.
pub const MAX_DIMENSION: u32 = 32767;

/// Matrix and clip of one save level.
#[derive(Clone)]
struct Layer {
    matrix: Transform,
    /// Coverage mask in device space; `None` means unclipped.
    clip: Option<Mask>,
}

/// A pixmap with a save/restore stack of matrix and clip mask.
pub struct SkiaCanvas {
    pixmap: Pixmap,
    current: Layer,
    stack: Vec<Layer>,
}

impl SkiaCanvas {
    /// Allocate a transparent canvas.
    pub fn new(width: u32, height: u32) -> Graphics2dResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Graphics2dError::InvalidDimensions { width, height });
        }
        let pixmap =
            Pixmap::new(width, height).ok_or(Graphics2dError::InvalidDimensions { width, height })?;
        Ok(Self::from_pixmap(pixmap))
    }

    /// Draw into an existing pixmap.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self {
            pixmap,
            current: Layer {
                matrix: Transform::identity(),
                clip: None,
            },
            stack: Vec::new(),
        }
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Premultiplied RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap
            .pixel(x, y)
            .map(|c| [c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// The whole canvas as straight-alpha RGBA rows.
    pub fn image_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        data
    }

    /// Encode the canvas as PNG. `ppi` sets the pixel density metadata and
    /// defaults to 72.
    pub fn to_png(&self, ppi: Option<f32>) -> Graphics2dResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(72.0);
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.pixmap.width(), self.pixmap.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.image_data())?;
        }
        log::debug!(target: "graphics2d", "encoded {} byte PNG", buf.len());
        Ok(buf)
    }

    fn fill_or_stroke(&mut self, path: &Path, rule: FillRule, paint: &EnginePaint) {
        let skia_paint = paint.to_skia_paint();
        let mask = self.current.clip.as_ref();
        match paint.style {
            PaintStyle::Fill => {
                self.pixmap
                    .fill_path(path, &skia_paint, rule, self.current.matrix, mask)
            }
            PaintStyle::Stroke => self.pixmap.stroke_path(
                path,
                &skia_paint,
                &paint.stroke,
                self.current.matrix,
                mask,
            ),
        }
    }
}

/// Multiply `mask` into `into`, pixel by pixel.
fn intersect_masks(into: &mut Mask, mask: &Mask) {
    for (d, s) in into.data_mut().iter_mut().zip(mask.data()) {
        *d = ((*d as u16 * *s as u16 + 127) / 255) as u8;
    }
}

impl TargetCanvas for SkiaCanvas {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn save(&mut self) -> usize {
        let count = self.save_count();
        self.stack.push(self.current.clone());
        count
    }

    fn restore(&mut self) {
        if let Some(layer) = self.stack.pop() {
            self.current = layer;
        }
    }

    fn restore_to_count(&mut self, count: usize) {
        while self.save_count() > count.max(1) {
            self.restore();
        }
    }

    fn save_count(&self) -> usize {
        self.stack.len() + 1
    }

    fn set_matrix(&mut self, matrix: Transform) {
        self.current.matrix = matrix;
    }

    fn concat(&mut self, matrix: Transform) {
        self.current.matrix = self.current.matrix.pre_concat(matrix);
    }

    fn total_matrix(&self) -> Transform {
        self.current.matrix
    }

    fn clip_path(&mut self, path: &Path, rule: FillRule, anti_alias: bool) {
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        mask.fill_path(path, rule, anti_alias, self.current.matrix);
        if let Some(existing) = &self.current.clip {
            intersect_masks(&mut mask, existing);
        }
        self.current.clip = Some(mask);
    }

    fn clip_empty(&mut self) {
        self.current.clip = Mask::new(self.pixmap.width(), self.pixmap.height());
    }

    fn draw_rect(&mut self, rect: Rect, paint: &EnginePaint) {
        match paint.style {
            PaintStyle::Fill => {
                let skia_paint = paint.to_skia_paint();
                self.pixmap.fill_rect(
                    rect,
                    &skia_paint,
                    self.current.matrix,
                    self.current.clip.as_ref(),
                );
            }
            PaintStyle::Stroke => {
                let path = PathBuilder::from_rect(rect);
                self.fill_or_stroke(&path, FillRule::Winding, paint);
            }
        }
    }

    fn draw_oval(&mut self, rect: Rect, paint: &EnginePaint) {
        if let Some(path) = PathBuilder::from_oval(rect) {
            self.fill_or_stroke(&path, FillRule::Winding, paint);
        }
    }

    fn draw_line(&mut self, p0: Point, p1: Point, paint: &EnginePaint) {
        let mut pb = PathBuilder::new();
        pb.move_to(p0.x, p0.y);
        pb.line_to(p1.x, p1.y);
        if let Some(path) = pb.finish() {
            self.fill_or_stroke(&path, FillRule::Winding, &paint.with_style(PaintStyle::Stroke));
        }
    }

    fn draw_path(&mut self, path: &Path, rule: FillRule, paint: &EnginePaint) {
        self.fill_or_stroke(path, rule, paint);
    }

    fn draw_image_rect(&mut self, image: &Pixmap, src: Rect, dst: Rect, paint: &EnginePaint) {
        let full = src.x() <= 0.0
            && src.y() <= 0.0
            && src.width() >= image.width() as f32
            && src.height() >= image.height() as f32;

        // Extract the whole pixels under the source region into their own
        // pixmap so sampling cannot bleed in from outside it.
        let cropped;
        let (source, origin) = if full {
            (image.as_ref(), (0.0, 0.0))
        } else {
            let (x0, y0) = (src.x().floor(), src.y().floor());
            let w = (src.right().ceil() - x0) as u32;
            let h = (src.bottom().ceil() - y0) as u32;
            let Some(mut sub) = Pixmap::new(w, h) else {
                return;
            };
            sub.draw_pixmap(
                0,
                0,
                image.as_ref(),
                &tiny_skia::PixmapPaint::default(),
                Transform::from_translate(-x0, -y0),
                None,
            );
            cropped = sub;
            (cropped.as_ref(), (x0, y0))
        };

        // Source pixel space to user space; the fractional part of the
        // source origin stays inside the crop.
        let pattern_transform = Transform::from_translate(dst.x(), dst.y())
            .pre_scale(dst.width() / src.width(), dst.height() / src.height())
            .pre_translate(origin.0 - src.x(), origin.1 - src.y());
        let image_paint = paint.to_image_paint(source, pattern_transform);
        self.pixmap.fill_rect(
            dst,
            &image_paint,
            self.current.matrix,
            self.current.clip.as_ref(),
        );
    }

    fn draw_text_blob(&mut self, blob: &TextBlob, x: f32, y: f32, paint: &EnginePaint) {
        let Some(outline) = &blob.outline else {
            return;
        };
        let skia_paint = paint.to_skia_paint();
        self.pixmap.fill_path(
            outline,
            &skia_paint,
            FillRule::Winding,
            self.current.matrix.pre_translate(x, y),
            self.current.clip.as_ref(),
        );
    }

    fn pixmap(&self) -> Option<&Pixmap> {
        Some(&self.pixmap)
    }
}
