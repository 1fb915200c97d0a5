//! Markup for a single voxel shape.

use std::fmt::Write;

use quick_xml::escape::escape;

use crate::config::BlockType;

/// Geometry of one drawn cell, in viewport units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Jittered edge length (diameter for circles, span for lines).
    pub size: f64,
    /// Unjittered grid pitch.
    pub pitch: f64,
}

/// Stroke width of `line` blocks relative to the grid pitch.
const LINE_STROKE_RATIO: f64 = 0.2;

/// Append the element for `cell` to `out`.
///
/// `rotation` is in degrees around the cell center; zero emits no
/// transform, and circles never carry one.
pub fn write_shape(out: &mut String, kind: BlockType, cell: &Cell, color: &str, rotation: u32) {
    let Cell { cx, cy, size, pitch } = *cell;
    let half = size / 2.0;
    let color = escape(color);

    // Writing into a String cannot fail.
    let _ = match kind {
        BlockType::Square => write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{color}"{}/>"#,
            fmt_num(cx - half),
            fmt_num(cy - half),
            fmt_num(size),
            fmt_num(size),
            rotate_attr(rotation, cx, cy),
        ),
        BlockType::Circle => write!(
            out,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{color}"/>"#,
            fmt_num(cx),
            fmt_num(cy),
            fmt_num(half),
        ),
        BlockType::Line => write!(
            out,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="{}"{}/>"#,
            fmt_num(cx - half),
            fmt_num(cy - half),
            fmt_num(cx + half),
            fmt_num(cy + half),
            fmt_num(pitch * LINE_STROKE_RATIO),
            rotate_attr(rotation, cx, cy),
        ),
    };
}

fn rotate_attr(rotation: u32, cx: f64, cy: f64) -> String {
    if rotation == 0 {
        String::new()
    } else {
        format!(
            r#" transform="rotate({rotation} {} {})""#,
            fmt_num(cx),
            fmt_num(cy)
        )
    }
}

/// Format with at most 3 decimals, trailing zeros trimmed.
pub fn fmt_num(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
