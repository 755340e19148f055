//! Client pixel buffers and their conversion to engine pixmaps.

use crate::error::{Graphics2dError, Graphics2dResult};

/// Byte order of a 4-byte pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelLayout {
    #[default]
    Rgba8,
    Bgra8,
    Argb8,
}

impl PixelLayout {
    /// Offsets of the red, green, blue and alpha bytes within a pixel.
    fn offsets(self) -> [usize; 4] {
        match self {
            PixelLayout::Rgba8 => [0, 1, 2, 3],
            PixelLayout::Bgra8 => [2, 1, 0, 3],
            PixelLayout::Argb8 => [1, 2, 3, 0],
        }
    }
}

/// A raster image the bridge can draw.
pub trait ImageSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn layout(&self) -> PixelLayout;
    /// Whether color channels are already multiplied by alpha.
    fn is_premultiplied(&self) -> bool;
    /// Tightly packed rows of 4-byte pixels.
    fn data(&self) -> &[u8];
}

/// An owned image buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    width: u32,
    height: u32,
    layout: PixelLayout,
    premultiplied: bool,
    data: Vec<u8>,
}

impl ImageData {
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        premultiplied: bool,
        data: Vec<u8>,
    ) -> Graphics2dResult<Self> {
        if width == 0 || height == 0 {
            return Err(Graphics2dError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Graphics2dError::InvalidArgument(format!(
                "image data has {} bytes, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            premultiplied,
            data,
        })
    }

    /// An image filled with one non-premultiplied RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Graphics2dResult<Self> {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, PixelLayout::Rgba8, false, data)
    }
}

impl ImageSource for ImageData {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn layout(&self) -> PixelLayout {
        self.layout
    }

    fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u16 * a as u16 + 127) / 255) as u8
}

/// Copy an image into a premultiplied RGBA pixmap.
///
/// Returns `None` for empty images or buffers shorter than their
/// dimensions imply.
pub fn to_engine_pixmap(image: &dyn ImageSource) -> Option<tiny_skia::Pixmap> {
    let (w, h) = (image.width(), image.height());
    let src = image.data();
    if src.len() < w as usize * h as usize * 4 {
        return None;
    }
    let mut pixmap = tiny_skia::Pixmap::new(w, h)?;
    let [r, g, b, a] = image.layout().offsets();
    let premultiplied = image.is_premultiplied();
    for (dst, px) in pixmap.data_mut().chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let alpha = px[a];
        if premultiplied {
            // Clamp so malformed input cannot exceed alpha.
            dst[0] = px[r].min(alpha);
            dst[1] = px[g].min(alpha);
            dst[2] = px[b].min(alpha);
        } else {
            dst[0] = premultiply(px[r], alpha);
            dst[1] = premultiply(px[g], alpha);
            dst[2] = premultiply(px[b], alpha);
        }
        dst[3] = alpha;
    }
    Some(pixmap)
}
