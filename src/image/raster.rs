//! SVG rasterization into a square RGBA sample grid.
//!
//! The [`Rasterizer`] trait is the seam to the vector renderer; the
//! default [`ResvgRasterizer`] parses with usvg and paints into a
//! tiny-skia pixmap. Samples are read back as straight (non-premultiplied)
//! RGBA so alpha and color channels can be inspected independently.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia;
use thiserror::Error;

/// Markup could not be turned into pixels.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse SVG: {0}")]
    Parse(#[source] usvg::Error),

    #[error("cannot allocate a {0}x{0} render surface")]
    Surface(u32),
}

/// N×N RGBA samples, row-major, origin top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Wrap a square image. Returns `None` for non-square or empty input.
    pub fn new(image: RgbaImage) -> Option<Self> {
        let (width, height) = image.dimensions();
        (width == height && width > 0).then_some(Self { image })
    }

    /// Build from raw `[r, g, b, a, ...]` bytes of a `size`×`size` grid.
    pub fn from_raw(size: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(size, size, data).and_then(Self::new)
    }

    /// Grid edge length in cells.
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let Rgba(px) = *self.image.get_pixel(x, y);
        px
    }
}

/// Vector-to-pixel capability.
pub trait Rasterizer {
    /// Render `markup` stretched onto a `size`×`size` surface.
    fn rasterize(&self, markup: &str, size: u32) -> Result<PixelBuffer, RenderError>;
}

/// resvg-backed renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResvgRasterizer;

impl Rasterizer for ResvgRasterizer {
    #[allow(clippy::cast_precision_loss)]
    fn rasterize(&self, markup: &str, size: u32) -> Result<PixelBuffer, RenderError> {
        let tree = usvg::Tree::from_data(markup.as_bytes(), &usvg::Options::default())
            .map_err(RenderError::Parse)?;

        // Pixmap::new rejects a zero-sized surface.
        let mut pixmap = tiny_skia::Pixmap::new(size, size).ok_or(RenderError::Surface(size))?;

        // Map the intrinsic size onto the whole grid (icons are square).
        let svg_size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            size as f32 / svg_size.width(),
            size as f32 / svg_size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let mut data = Vec::with_capacity(size as usize * size as usize * 4);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        PixelBuffer::from_raw(size, data).ok_or(RenderError::Surface(size))
    }
}
