//! # Sparkline Path Module
//!
//! Turns an ordered series of bucket values into SVG path data for the
//! dashboard's trend chart: a smooth line through the points and a closed
//! area under it for the fill.
//!
//! ## Pipeline
//! 1. Coalesce missing values to zero, flatten degenerate series to ones
//! 2. Scale into an inverted-y canvas (`0 → height`, max → top)
//! 3. Derive one cubic Bézier per segment from a Catmull-Rom neighborhood
//!
//! The output uses the `M`, `C`, `V`, `H` and `Z` commands only, so any
//! template can drop it straight into `<path d="...">`.

use crate::config::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH};
use crate::error::PathError;
use serde::Serialize;
use std::fmt::Write;

// Keeps the maximum a hair below the top edge
const TOP_EPSILON: f64 = 0.000001;

/// A bucket value mapped into canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    fn offset(self, from: Point, to: Point, sign: f64) -> Point {
        Point {
            x: self.x + sign * (to.x - from.x) / 6.0,
            y: self.y + sign * (to.y - from.y) / 6.0,
        }
    }
}

/// Area and line path data for one sparkline
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PathPair {
    pub area: String,
    pub line: String,
}

/// Null-coalesce and normalize a series before scaling.
///
/// Missing and NaN entries become 0. A series summing to 0 (or whose
/// maximum is not positive) becomes all ones so it renders as a flat line.
pub fn normalize_values<I, V>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = V>,
    V: Into<Option<f64>>,
{
    let mut values: Vec<f64> = values
        .into_iter()
        .map(|v| v.into().filter(|v| !v.is_nan()).unwrap_or(0.0))
        .collect();

    let sum: f64 = values.iter().sum();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if sum == 0.0 || max <= 0.0 {
        values.iter_mut().for_each(|v| *v = 1.0);
    }
    values
}

/// Map normalized values onto the canvas
pub fn scale_points(values: &[f64], width: f64, height: f64) -> Result<Vec<Point>, PathError> {
    let n = values.len();
    if n < 2 {
        return Err(PathError::InvalidInput { len: n });
    }

    let max_val = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = width / (n - 1) as f64;

    Ok(values
        .iter()
        .enumerate()
        .map(|(i, v)| Point {
            x: i as f64 * step,
            y: height - (v / max_val * height + TOP_EPSILON),
        })
        .collect())
}

/// Control points of the Bézier segment from `p1` to `p2`
fn catmull_rom_to_bezier(p0: Point, p1: Point, p2: Point, p3: Point) -> (Point, Point) {
    let c1 = p1.offset(p0, p2, 1.0);
    let c2 = p2.offset(p1, p3, -1.0);
    (c1, c2)
}

/// Smooth line path through `points`; needs at least two
fn line_path(points: &[Point]) -> String {
    let n = points.len();
    let mut d = format!("M{},{}", points[0].x, points[0].y);

    for i in 0..n - 1 {
        let p0 = if i > 0 { points[i - 1] } else { points[i] };
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = if i + 2 < n { points[i + 2] } else { points[i + 1] };

        let (c1, c2) = catmull_rom_to_bezier(p0, p1, p2, p3);
        // Writing into a String cannot fail
        let _ = write!(
            d,
            " C{},{} {},{} {},{}",
            c1.x, c1.y, c2.x, c2.y, p2.x, p2.y
        );
    }

    d
}

/// Build the sparkline paths for `values` on a `width` x `height` canvas.
///
/// ## Errors
/// `PathError::InvalidInput` when fewer than two values are supplied.
pub fn generate_smooth_path<I, V>(values: I, width: f64, height: f64) -> Result<PathPair, PathError>
where
    I: IntoIterator<Item = V>,
    V: Into<Option<f64>>,
{
    let values = normalize_values(values);
    let points = scale_points(&values, width, height)?;

    let line = line_path(&points);
    let area = format!("{} V{} H0 Z", line, height);

    Ok(PathPair { area, line })
}

/// `generate_smooth_path` on the default 472 x 150 canvas
pub fn generate_default_path<I, V>(values: I) -> Result<PathPair, PathError>
where
    I: IntoIterator<Item = V>,
    V: Into<Option<f64>>,
{
    generate_smooth_path(values, DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT)
}

/// Standalone `<svg>` element embedding both paths
pub fn render_svg(paths: &PathPair, width: f64, height: f64) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
            r#"<path d="{area}" fill="currentColor" fill-opacity="0.15" stroke="none"/>"#,
            r#"<path d="{line}" fill="none" stroke="currentColor" stroke-width="2"/>"#,
            "</svg>"
        ),
        w = width,
        h = height,
        area = paths.area,
        line = paths.line,
    )
}
