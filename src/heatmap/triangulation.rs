//! Delaunay triangulation of scattered points (Bowyer-Watson).
//!
//! Points are rescaled into the unit square before insertion so that the
//! circumcircle tests behave the same for a city block and a continent.
//! Each insertion scans every live triangle, which is quadratic overall
//! and plenty for station-sized inputs.
//!
//! There is no super triangle. Every hull edge instead carries a ghost
//! triangle whose third vertex sits at infinity; a point beyond the edge
//! destroys it like it would a real triangle whose circumcircle it falls
//! in. The triangles therefore always tile the whole convex hull.

use crate::error::{ProcessingError, Result};
use std::collections::{HashMap, HashSet};

const AREA_EPSILON: f64 = 1e-12;

/// Vertex at infinity shared by all ghost triangles.
const GHOST: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Circle {
    x: f64,
    y: f64,
    r2: f64,
}

/// Counter-clockwise triangle. A ghost triangle `[x, y, GHOST]` stands
/// for the outside of hull edge `x -> y` and has no circumcircle.
#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [usize; 3],
    circle: Option<Circle>,
}

impl Triangle {
    fn new(points: &[[f64; 2]], vertices: [usize; 3]) -> Self {
        // Keep the ghost vertex last
        let vertices = match vertices {
            [GHOST, y, z] => [y, z, GHOST],
            [x, GHOST, z] => [z, x, GHOST],
            other => other,
        };
        let circle = (vertices[2] != GHOST).then(|| {
            let [a, b, c] = vertices;
            circumcircle(points[a], points[b], points[c])
        });
        Self { vertices, circle }
    }

    /// True when inserting `p` must remove this triangle.
    fn conflicts_with(&self, points: &[[f64; 2]], p: [f64; 2]) -> bool {
        match self.circle {
            Some(circle) => (p[0] - circle.x).powi(2) + (p[1] - circle.y).powi(2) < circle.r2,
            None => {
                let (x, y) = (points[self.vertices[0]], points[self.vertices[1]]);
                let side = cross(x, y, p);
                side > 0.0 || (side == 0.0 && within_segment(x, y, p))
            }
        }
    }
}

/// A triangulation over a deduplicated point set.
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// Indices into the caller's point slice of the points actually used.
    pub vertices: Vec<usize>,
    /// Triangles as indices into the caller's point slice.
    pub triangles: Vec<[usize; 3]>,
}

/// Triangulate `points` given as `[x, y]`.
///
/// Coincident points are collapsed onto their first occurrence. Fewer than
/// three distinct points, or all points on one line, is an error.
pub fn triangulate(points: &[[f64; 2]]) -> Result<Triangulation> {
    let mut seen = HashSet::with_capacity(points.len());
    let vertices: Vec<usize> = (0..points.len())
        .filter(|&i| seen.insert((points[i][0].to_bits(), points[i][1].to_bits())))
        .collect();

    if vertices.len() < 3 {
        return Err(ProcessingError::DegenerateGeometry(format!(
            "need at least 3 distinct points to interpolate, got {}",
            vertices.len()
        )));
    }

    let normalized = normalize(points, &vertices)?;
    if all_collinear(&normalized) {
        return Err(ProcessingError::DegenerateGeometry(
            "all points lie on a single line".to_string(),
        ));
    }

    let local = bowyer_watson(&normalized);
    if local.is_empty() {
        return Err(ProcessingError::DegenerateGeometry(
            "triangulation produced no triangles".to_string(),
        ));
    }

    let triangles = local
        .into_iter()
        .map(|t| [vertices[t[0]], vertices[t[1]], vertices[t[2]]])
        .collect();

    Ok(Triangulation {
        vertices,
        triangles,
    })
}

fn normalize(points: &[[f64; 2]], vertices: &[usize]) -> Result<Vec<[f64; 2]>> {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &i in vertices {
        let [x, y] = points[i];
        if !x.is_finite() || !y.is_finite() {
            return Err(ProcessingError::InvalidFormat(format!(
                "point {} has non-finite coordinates ({}, {})",
                i, x, y
            )));
        }
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let scale = (max_x - min_x).max(max_y - min_y);
    if scale <= 0.0 {
        return Err(ProcessingError::DegenerateGeometry(
            "all points share the same coordinates".to_string(),
        ));
    }

    Ok(vertices
        .iter()
        .map(|&i| {
            let [x, y] = points[i];
            [(x - min_x) / scale, (y - min_y) / scale]
        })
        .collect())
}

fn cross(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn all_collinear(points: &[[f64; 2]]) -> bool {
    // Anchor on the two points furthest apart along the dominant axis
    let first = points[0];
    let far = points
        .iter()
        .copied()
        .max_by(|a, b| {
            let da = (a[0] - first[0]).powi(2) + (a[1] - first[1]).powi(2);
            let db = (b[0] - first[0]).powi(2) + (b[1] - first[1]).powi(2);
            da.total_cmp(&db)
        })
        .unwrap_or(first);
    points
        .iter()
        .all(|&p| cross(first, far, p).abs() < AREA_EPSILON)
}

fn circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Circle {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < AREA_EPSILON {
        // Flat triangle: everything is inside, so the next insertion
        // replaces it.
        return Circle {
            x: (a[0] + b[0] + c[0]) / 3.0,
            y: (a[1] + b[1] + c[1]) / 3.0,
            r2: f64::INFINITY,
        };
    }

    let a2 = a[0] * a[0] + a[1] * a[1];
    let b2 = b[0] * b[0] + b[1] * b[1];
    let c2 = c[0] * c[0] + c[1] * c[1];
    let x = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let y = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    let r2 = (a[0] - x).powi(2) + (a[1] - y).powi(2);
    Circle { x, y, r2 }
}

fn within_segment(x: [f64; 2], y: [f64; 2], p: [f64; 2]) -> bool {
    let dot = (p[0] - x[0]) * (y[0] - x[0]) + (p[1] - x[1]) * (y[1] - x[1]);
    let len2 = (y[0] - x[0]).powi(2) + (y[1] - x[1]).powi(2);
    dot > 0.0 && dot < len2
}

/// Indices of a non-degenerate starting triangle, counter-clockwise.
fn seed_triangle(points: &[[f64; 2]]) -> [usize; 3] {
    let a = 0;
    let dist2 = |i: usize| {
        (points[i][0] - points[a][0]).powi(2) + (points[i][1] - points[a][1]).powi(2)
    };
    let b = (1..points.len())
        .max_by(|&i, &j| dist2(i).total_cmp(&dist2(j)))
        .unwrap_or(1);
    let c = (1..points.len())
        .max_by(|&i, &j| {
            let area = |k: usize| cross(points[a], points[b], points[k]).abs();
            area(i).total_cmp(&area(j))
        })
        .unwrap_or(2);

    if cross(points[a], points[b], points[c]) < 0.0 {
        [a, c, b]
    } else {
        [a, b, c]
    }
}

fn bowyer_watson(points: &[[f64; 2]]) -> Vec<[usize; 3]> {
    let seed = seed_triangle(points);
    let [a, b, c] = seed;
    let mut triangles = vec![
        Triangle::new(points, seed),
        Triangle::new(points, [b, a, GHOST]),
        Triangle::new(points, [c, b, GHOST]),
        Triangle::new(points, [a, c, GHOST]),
    ];

    for i in (0..points.len()).filter(|i| !seed.contains(i)) {
        let p = points[i];

        let mut bad = Vec::new();
        let mut good = Vec::with_capacity(triangles.len() + 2);
        for t in triangles.drain(..) {
            if t.conflicts_with(points, p) {
                bad.push(t);
            } else {
                good.push(t);
            }
        }

        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges = Vec::with_capacity(bad.len() * 3);
        for t in &bad {
            let [a, b, c] = t.vertices;
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let key = (u.min(v), u.max(v));
                *edge_count.entry(key).or_insert(0) += 1;
                edges.push((u, v));
            }
        }

        triangles = good;
        for (u, v) in edges {
            if edge_count[&(u.min(v), u.max(v))] == 1 {
                triangles.push(Triangle::new(points, [u, v, i]));
            }
        }
    }

    triangles
        .into_iter()
        .map(|t| t.vertices)
        .filter(|&[a, b, c]| {
            c != GHOST && cross(points[a], points[b], points[c]).abs() > AREA_EPSILON
        })
        .collect()
}
