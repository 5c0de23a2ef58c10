//! Filled contour bands over a smoothed grid.
//!
//! Each grid cell whose four corners are defined either lies wholly in one
//! band, in which case it joins a horizontal run of same-band cells, or
//! straddles band boundaries. Straddling cells are split into two
//! triangles and each triangle is clipped against every band interval it
//! touches, treating the value as linear across the triangle. Cells with
//! an undefined corner contribute nothing.

use crate::heatmap::colormap::StepColormap;
use crate::heatmap::grid::Grid;

/// A closed ring of `[lon, lat]` positions; the first position is repeated
/// at the end.
pub type Ring = Vec<[f64; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub struct ContourBand {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    pub color: String,
    pub polygons: Vec<Ring>,
}

impl ContourBand {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    x: f64,
    y: f64,
    v: f64,
}

/// Bands of `colormap` traced over `grid`, one entry per band in order.
pub fn contour_bands(grid: &Grid, colormap: &StepColormap) -> Vec<ContourBand> {
    let mut bands: Vec<ContourBand> = (0..colormap.band_count())
        .map(|index| {
            let (lower, upper) = colormap.band_bounds(index);
            ContourBand {
                index,
                lower,
                upper,
                color: colormap.colors()[index].clone(),
                polygons: Vec::new(),
            }
        })
        .collect();

    let (width, height) = (grid.width(), grid.height());
    if width < 2 || height < 2 {
        return bands;
    }
    let xs = grid.xs();
    let ys = grid.ys();

    for row in 0..height - 1 {
        // Open run of whole cells: (band, first column)
        let mut run: Option<(usize, usize)> = None;

        for col in 0..width - 1 {
            let corners = [
                Vertex { x: xs[col], y: ys[row], v: grid.get(col, row) },
                Vertex { x: xs[col + 1], y: ys[row], v: grid.get(col + 1, row) },
                Vertex { x: xs[col + 1], y: ys[row + 1], v: grid.get(col + 1, row + 1) },
                Vertex { x: xs[col], y: ys[row + 1], v: grid.get(col, row + 1) },
            ];

            let indices: Option<Vec<usize>> =
                corners.iter().map(|c| colormap.band_index(c.v)).collect();
            let whole_band = match &indices {
                Some(idx) if idx.iter().all(|&b| b == idx[0]) => Some(idx[0]),
                _ => None,
            };

            if let Some((band, start)) = run {
                if whole_band != Some(band) {
                    bands[band].polygons.push(rectangle(xs[start], xs[col], ys[row], ys[row + 1]));
                    run = None;
                }
            }

            match (whole_band, indices) {
                (Some(band), _) => {
                    if run.is_none() {
                        run = Some((band, col));
                    }
                }
                (None, Some(idx)) => {
                    let lo = idx.iter().copied().min().unwrap_or(0);
                    let hi = idx.iter().copied().max().unwrap_or(0);
                    let triangles = [
                        [corners[0], corners[1], corners[2]],
                        [corners[0], corners[2], corners[3]],
                    ];
                    for triangle in &triangles {
                        for band in &mut bands[lo..=hi] {
                            if let Some(ring) = clip_to_band(triangle, band.lower, band.upper) {
                                band.polygons.push(ring);
                            }
                        }
                    }
                }
                (None, None) => {}
            }
        }

        if let Some((band, start)) = run {
            bands[band]
                .polygons
                .push(rectangle(xs[start], xs[width - 1], ys[row], ys[row + 1]));
        }
    }

    bands
}

fn rectangle(x0: f64, x1: f64, y0: f64, y1: f64) -> Ring {
    vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]
}

fn clip_to_band(triangle: &[Vertex; 3], lower: f64, upper: f64) -> Option<Ring> {
    let mut polygon: Vec<Vertex> = triangle.to_vec();
    if lower.is_finite() {
        polygon = clip(&polygon, lower, true);
    }
    if upper.is_finite() {
        polygon = clip(&polygon, upper, false);
    }
    if polygon.len() < 3 || signed_area(&polygon).abs() < f64::EPSILON * 1e-6 {
        return None;
    }

    let mut ring: Ring = polygon.iter().map(|p| [p.x, p.y]).collect();
    if signed_area(&polygon) < 0.0 {
        ring.reverse();
    }
    ring.push(ring[0]);
    Some(ring)
}

/// Sutherland-Hodgman against the half-space `v >= level` (`keep_above`)
/// or `v <= level`.
fn clip(polygon: &[Vertex], level: f64, keep_above: bool) -> Vec<Vertex> {
    let inside = |p: &Vertex| if keep_above { p.v >= level } else { p.v <= level };
    let mut out = Vec::with_capacity(polygon.len() + 2);

    for i in 0..polygon.len() {
        let current = polygon[i];
        let next = polygon[(i + 1) % polygon.len()];
        match (inside(&current), inside(&next)) {
            (true, true) => out.push(next),
            (true, false) => out.push(crossing(current, next, level)),
            (false, true) => {
                out.push(crossing(current, next, level));
                out.push(next);
            }
            (false, false) => {}
        }
    }
    out
}

fn crossing(a: Vertex, b: Vertex, level: f64) -> Vertex {
    let t = if (b.v - a.v).abs() < f64::EPSILON {
        0.5
    } else {
        ((level - a.v) / (b.v - a.v)).clamp(0.0, 1.0)
    };
    Vertex {
        x: a.x + t * (b.x - a.x),
        y: a.y + t * (b.y - a.y),
        v: level,
    }
}

fn signed_area(polygon: &[Vertex]) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}
