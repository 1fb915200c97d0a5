//! Voxel synthesis: pixel grid in, blocky SVG out.
//!
//! # Pipeline
//!
//! ```text
//! PixelBuffer (N×N RGBA)
//!         │  row-major, y outer / x inner
//!         ▼
//!    occupancy ──► alpha > threshold·255 (xor invert)
//!         │
//!         ▼
//!    geometry ──► center, pitch = 24 / N, size jitter
//!         │
//!         ▼
//!    palette ──► solid color or (x + y) diagonal gradient
//!         │
//!         ▼
//!    shape ──► <rect> | <circle> | <line>
//! ```
//!
//! Output always uses a `0 0 24 24` viewBox regardless of the grid size.

mod random;
mod shape;

pub use random::{RandomSource, random_source};

use shape::{Cell, write_shape};

#[cfg(test)]
pub use random::FixedRandom;

use std::borrow::Cow;

use crate::config::VoxelConfig;
use crate::debug;
use crate::image::color::Rgb;
use crate::image::raster::PixelBuffer;

/// Logical edge length of the output viewport.
pub const VIEWPORT_SIZE: f64 = 24.0;

const SVG_OPEN: &str = r#"<svg viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg">"#;
const SVG_CLOSE: &str = "</svg>";

/// Used when `blockColor` does not parse; validated configs never hit it.
const DEFAULT_BLOCK_COLOR: Rgb = Rgb::new(0x11, 0x18, 0x27);

/// Whether a sample counts as filled: strictly above `threshold * 255`.
#[inline]
pub fn is_filled(alpha: u8, threshold: f64) -> bool {
    f64::from(alpha) > threshold * 255.0
}

/// Fill color source, resolved once per synthesis.
#[derive(Debug, Clone, PartialEq)]
pub enum Palette {
    /// Normalized `#rrggbb`.
    Solid(String),
    Gradient { start: Rgb, end: Rgb },
}

impl Palette {
    /// Gradient when enabled and both endpoints parse, otherwise solid.
    pub fn resolve(config: &VoxelConfig) -> Self {
        let block = config.block_color.parse::<Rgb>().unwrap_or_else(|e| {
            debug!("voxel"; "{e}, using {DEFAULT_BLOCK_COLOR}");
            DEFAULT_BLOCK_COLOR
        });
        let solid = Self::Solid(block.to_string());
        if !config.use_gradient {
            return solid;
        }

        match (
            config.gradient_start.parse::<Rgb>(),
            config.gradient_end.parse::<Rgb>(),
        ) {
            (Ok(start), Ok(end)) => Self::Gradient { start, end },
            (Err(e), _) | (_, Err(e)) => {
                debug!("voxel"; "{e}, falling back to block color");
                solid
            }
        }
    }

    /// Color for cell `(x, y)` of an `n`×`n` grid.
    pub fn color_at(&self, x: u32, y: u32, n: u32) -> Cow<'_, str> {
        match self {
            Self::Solid(color) => Cow::Borrowed(color),
            Self::Gradient { start, end } => {
                Cow::Owned(start.lerp(*end, gradient_factor(x, y, n)).to_string())
            }
        }
    }
}

/// Diagonal position `(x + y) / (2n - 2)`, 0 at top-left, 1 at bottom-right.
pub fn gradient_factor(x: u32, y: u32, n: u32) -> f64 {
    let span = 2 * n.saturating_sub(1);
    if span == 0 {
        0.0
    } else {
        f64::from(x + y) / f64::from(span)
    }
}

/// Build the voxel SVG for `buffer`.
///
/// The grid size is taken from the buffer, which callers rasterize at
/// `config.grid_resolution`. With `size_variation == 0` the output is a
/// pure function of its inputs and `rng` is never consulted.
pub fn synthesize(buffer: &PixelBuffer, config: &VoxelConfig, rng: &mut dyn RandomSource) -> String {
    let n = buffer.size();
    debug_assert_eq!(n, config.grid_resolution, "buffer rasterized at another grid size");

    let pitch = VIEWPORT_SIZE / f64::from(n);
    let palette = Palette::resolve(config);
    let mut out = String::from(SVG_OPEN);

    for y in 0..n {
        for x in 0..n {
            let [_, _, _, alpha] = buffer.rgba(x, y);
            if is_filled(alpha, config.threshold) == config.invert_output {
                continue;
            }

            let jitter = if config.size_variation > 0.0 {
                rng.uniform() * config.size_variation
            } else {
                0.0
            };
            let cell = Cell {
                cx: (f64::from(x) + 0.5) * pitch,
                cy: (f64::from(y) + 0.5) * pitch,
                size: pitch * (1.0 - jitter),
                pitch,
            };
            let color = palette.color_at(x, y, n);
            write_shape(&mut out, config.block_type, &cell, &color, config.block_rotation);
        }
    }

    out.push_str(SVG_CLOSE);
    out
}

/// Count of shape elements in synthesized markup.
pub fn shape_count(svg: &str) -> usize {
    ["<rect ", "<circle ", "<line "]
        .iter()
        .map(|tag| svg.matches(tag).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::config::BlockType;

    fn buffer(n: u32, fill: [u8; 4]) -> PixelBuffer {
        PixelBuffer::new(RgbaImage::from_pixel(n, n, Rgba(fill))).unwrap()
    }

    fn config(n: u32) -> VoxelConfig {
        VoxelConfig {
            grid_resolution: n,
            ..VoxelConfig::default()
        }
    }

    fn run(buffer: &PixelBuffer, config: &VoxelConfig) -> String {
        synthesize(buffer, config, &mut FixedRandom::new(&[0.5]))
    }

    #[test]
    fn test_empty_buffer_draws_nothing() {
        for n in [4, 9, 16, 64] {
            let svg = run(&buffer(n, [0, 0, 0, 0]), &config(n));
            assert_eq!(svg, format!("{SVG_OPEN}{SVG_CLOSE}"));
            assert_eq!(shape_count(&svg), 0);
        }
    }

    #[test]
    fn test_empty_buffer_inverted_draws_every_cell() {
        for n in [4, 9, 16, 64] {
            let config = VoxelConfig {
                invert_output: true,
                ..config(n)
            };
            let svg = run(&buffer(n, [0, 0, 0, 0]), &config);
            assert_eq!(shape_count(&svg), (n * n) as usize);
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = VoxelConfig {
            threshold: 0.2, // 51
            ..config(4)
        };
        assert_eq!(shape_count(&run(&buffer(4, [0, 0, 0, 51]), &config)), 0);
        assert_eq!(shape_count(&run(&buffer(4, [0, 0, 0, 52]), &config)), 16);

        assert!(!is_filled(0, 0.0));
        assert!(is_filled(1, 0.0));
        assert!(!is_filled(255, 1.0));
    }

    #[test]
    fn test_brightness_does_not_affect_occupancy() {
        // Opaque white cells are drawn: only alpha decides.
        let svg = run(&buffer(4, [255, 255, 255, 255]), &config(4));
        assert_eq!(shape_count(&svg), 16);
    }

    #[test]
    fn test_traversal_is_row_major() {
        let mut img = RgbaImage::new(4, 4);
        img.put_pixel(3, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 0, 255]));
        let svg = run(&PixelBuffer::new(img).unwrap(), &config(4));

        // pitch 6: (3, 0) -> x 18, y 0; (0, 1) -> x 0, y 6
        let first = svg.find(r#"<rect x="18" y="0""#).unwrap();
        let second = svg.find(r#"<rect x="0" y="6""#).unwrap();
        assert!(first < second);
        assert_eq!(shape_count(&svg), 2);
    }

    #[test]
    fn test_deterministic_without_jitter() {
        let mut img = RgbaImage::new(8, 8);
        for i in 0..8 {
            img.put_pixel(i, i, Rgba([10, 20, 30, 200]));
            img.put_pixel(7 - i, i, Rgba([10, 20, 30, 90]));
        }
        let buffer = PixelBuffer::new(img).unwrap();
        let config = VoxelConfig {
            use_gradient: true,
            block_rotation: 15,
            ..config(8)
        };

        let mut a = random::ThreadRandom::default();
        let mut b = random::ThreadRandom::default();
        assert_eq!(
            synthesize(&buffer, &config, &mut a),
            synthesize(&buffer, &config, &mut b)
        );
    }

    #[test]
    fn test_no_samples_drawn_without_jitter() {
        let mut rng = FixedRandom::new(&[0.3]);
        synthesize(&buffer(4, [0, 0, 0, 255]), &config(4), &mut rng);
        assert_eq!(rng.drawn(), 0);
    }

    #[test]
    fn test_jitter_one_sample_per_drawn_cell() {
        let config = VoxelConfig {
            size_variation: 0.5,
            ..config(4)
        };
        let mut rng = FixedRandom::new(&[1.0, 0.0]);
        let svg = synthesize(&buffer(4, [0, 0, 0, 255]), &config, &mut rng);
        assert_eq!(rng.drawn(), 16);

        // pitch 6: factor 0.5 -> size 3, factor 1 -> size 6
        assert!(svg.starts_with(&format!(
            r#"{SVG_OPEN}<rect x="1.5" y="1.5" width="3" height="3""#
        )));
        assert!(svg.contains(r#"<rect x="6" y="0" width="6" height="6""#));
    }

    #[test]
    fn test_circle_never_rotated() {
        for rotation in [0, 1, 45, 90] {
            let config = VoxelConfig {
                block_type: BlockType::Circle,
                block_rotation: rotation,
                ..config(4)
            };
            let svg = run(&buffer(4, [0, 0, 0, 255]), &config);
            assert!(!svg.contains("transform"));
            assert_eq!(svg.matches("<circle ").count(), 16);
        }
    }

    #[test]
    fn test_rotation_applies_to_square_and_line() {
        for block_type in [BlockType::Square, BlockType::Line] {
            let config = VoxelConfig {
                block_type,
                block_rotation: 30,
                ..config(4)
            };
            let svg = run(&buffer(4, [0, 0, 0, 255]), &config);
            assert_eq!(svg.matches("transform=\"rotate(30 ").count(), 16);
        }
    }

    #[test]
    fn test_gradient_endpoints_exact() {
        let config = VoxelConfig {
            use_gradient: true,
            gradient_start: "#102030".into(),
            gradient_end: "#f0e0d0".into(),
            ..config(5)
        };
        let palette = Palette::resolve(&config);
        assert_eq!(palette.color_at(0, 0, 5), "#102030");
        assert_eq!(palette.color_at(4, 4, 5), "#f0e0d0");

        let svg = run(&buffer(5, [0, 0, 0, 255]), &config);
        assert!(svg.starts_with(&format!(r##"{SVG_OPEN}<rect x="0" y="0" width="4.8" height="4.8" fill="#102030"/>"##)));
        assert!(svg.ends_with(r##"fill="#f0e0d0"/></svg>"##));
    }

    #[test]
    fn test_gradient_invalid_endpoint_falls_back() {
        let config = VoxelConfig {
            use_gradient: true,
            block_color: "#abcdef".into(),
            gradient_start: "#102030".into(),
            gradient_end: "not-a-color".into(),
            ..config(4)
        };
        assert_eq!(Palette::resolve(&config), Palette::Solid("#abcdef".into()));
        let svg = run(&buffer(4, [0, 0, 0, 255]), &config);
        assert_eq!(svg.matches(r##"fill="#abcdef""##).count(), 16);
    }

    #[test]
    fn test_gradient_disabled_uses_block_color() {
        let config = VoxelConfig {
            use_gradient: false,
            block_color: "#ff0000".into(),
            ..config(4)
        };
        assert_eq!(Palette::resolve(&config), Palette::Solid("#ff0000".into()));
    }

    #[test]
    fn test_block_color_is_normalized() {
        let config = VoxelConfig {
            block_color: " FF0000 ".into(),
            ..config(4)
        };
        let svg = run(&buffer(4, [0, 0, 0, 255]), &config);
        assert_eq!(svg.matches(r##"fill="#ff0000""##).count(), 16);
        assert!(!svg.contains(r#"fill="ff0000""#));

        let config = VoxelConfig {
            block_color: "#abc".into(),
            ..config
        };
        assert_eq!(Palette::resolve(&config), Palette::Solid("#aabbcc".into()));
    }

    #[test]
    fn test_unparsable_block_color_never_reaches_markup() {
        let config = VoxelConfig {
            block_type: BlockType::Line,
            block_color: "#+f+f+f".into(),
            ..config(4)
        };
        assert!(config.validate().is_err());

        let svg = run(&buffer(4, [0, 0, 0, 255]), &config);
        assert!(!svg.contains('+'));
        assert_eq!(svg.matches(r##"stroke="#111827""##).count(), 16);
    }

    #[test]
    fn test_gradient_factor() {
        assert_eq!(gradient_factor(0, 0, 4), 0.0);
        assert_eq!(gradient_factor(3, 3, 4), 1.0);
        assert_eq!(gradient_factor(3, 0, 4), 0.5);
        // single cell grid has no span
        assert_eq!(gradient_factor(0, 0, 1), 0.0);
    }

    #[test]
    fn test_line_shapes() {
        let config = VoxelConfig {
            block_type: BlockType::Line,
            ..config(4)
        };
        let svg = run(&buffer(4, [0, 0, 0, 255]), &config);
        assert_eq!(svg.matches("<line ").count(), 16);
        assert!(svg.contains(
            r##"<line x1="0" y1="0" x2="6" y2="6" stroke="#111827" stroke-width="1.2"/>"##
        ));
    }
}
