use crate::error::Result;
use crate::heatmap::grid::Grid;
use crate::heatmap::triangulation::triangulate;
use crate::models::GridSample;

const BARYCENTRIC_TOLERANCE: f64 = 1e-9;

/// Piecewise-linear interpolation of `samples` onto every node of `grid`.
///
/// Samples are triangulated and each node takes the barycentric blend of
/// the triangle containing it. Nodes outside the convex hull of the
/// samples stay NaN.
pub fn interpolate_linear(samples: &[GridSample], grid: &mut Grid) -> Result<()> {
    let points: Vec<[f64; 2]> = samples.iter().map(|s| [s.longitude, s.latitude]).collect();
    let triangulation = triangulate(&points)?;

    let xs = grid.xs().to_vec();
    let ys = grid.ys().to_vec();
    let to_grid = |p: [f64; 2]| [fractional_index(&xs, p[0]), fractional_index(&ys, p[1])];

    for &[a, b, c] in &triangulation.triangles {
        let pa = to_grid(points[a]);
        let pb = to_grid(points[b]);
        let pc = to_grid(points[c]);
        let (va, vb, vc) = (samples[a].value, samples[b].value, samples[c].value);

        let det = (pb[1] - pc[1]) * (pa[0] - pc[0]) + (pc[0] - pb[0]) * (pa[1] - pc[1]);
        if det.abs() < f64::EPSILON {
            continue;
        }

        let min_col = pa[0].min(pb[0]).min(pc[0]).floor().max(0.0) as usize;
        let max_col = (pa[0].max(pb[0]).max(pc[0]).ceil() as usize).min(xs.len() - 1);
        let min_row = pa[1].min(pb[1]).min(pc[1]).floor().max(0.0) as usize;
        let max_row = (pa[1].max(pb[1]).max(pc[1]).ceil() as usize).min(ys.len() - 1);

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                if !grid.get(col, row).is_nan() {
                    continue;
                }
                let (x, y) = (col as f64, row as f64);
                let l1 = ((pb[1] - pc[1]) * (x - pc[0]) + (pc[0] - pb[0]) * (y - pc[1])) / det;
                let l2 = ((pc[1] - pa[1]) * (x - pc[0]) + (pa[0] - pc[0]) * (y - pc[1])) / det;
                let l3 = 1.0 - l1 - l2;
                if l1 >= -BARYCENTRIC_TOLERANCE
                    && l2 >= -BARYCENTRIC_TOLERANCE
                    && l3 >= -BARYCENTRIC_TOLERANCE
                {
                    grid.set(col, row, l1 * va + l2 * vb + l3 * vc);
                }
            }
        }
    }

    tracing::debug!(
        "Interpolated {} of {} grid nodes from {} triangles",
        grid.defined_count(),
        grid.values().len(),
        triangulation.triangles.len()
    );
    Ok(())
}

/// Position of `value` along an evenly spaced axis, in index units.
fn fractional_index(axis: &[f64], value: f64) -> f64 {
    match axis {
        [] => 0.0,
        [only] => value - only,
        [first, .., last] => (value - first) / (last - first) * (axis.len() - 1) as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;

    fn plane(x: f64, y: f64) -> f64 {
        2.0 * x - 3.0 * y + 1.0
    }

    #[test]
    fn test_reproduces_linear_field() -> Result<()> {
        let coords = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (1.5, 2.5)];
        let samples: Vec<GridSample> = coords
            .iter()
            .map(|&(x, y)| GridSample::new(x, y, plane(x, y)))
            .collect();

        let mut grid = Grid::spanning(&samples, 9)?;
        interpolate_linear(&samples, &mut grid)?;

        assert_eq!(grid.defined_count(), 81);
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let expected = plane(grid.xs()[col], grid.ys()[row]);
                assert!((grid.get(col, row) - expected).abs() < 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_outside_hull_is_nan() -> Result<()> {
        // Lower-left triangle of the bounding box only
        let samples = vec![
            GridSample::new(0.0, 0.0, 1.0),
            GridSample::new(2.0, 0.0, 1.0),
            GridSample::new(0.0, 2.0, 1.0),
        ];
        let mut grid = Grid::spanning(&samples, 5)?;
        interpolate_linear(&samples, &mut grid)?;

        assert_eq!(grid.get(0, 0), 1.0);
        assert_eq!(grid.get(2, 2), 1.0); // on the hypotenuse
        assert!(grid.get(4, 4).is_nan());
        assert!(grid.get(3, 4).is_nan());
        Ok(())
    }

    #[test]
    fn test_degenerate_input() -> Result<()> {
        let samples = vec![
            GridSample::new(0.0, 0.0, 1.0),
            GridSample::new(1.0, 1.0, 1.0),
        ];
        let mut grid = Grid::new(vec![0.0, 1.0], vec![0.0, 1.0]);
        assert!(matches!(
            interpolate_linear(&samples, &mut grid),
            Err(ProcessingError::DegenerateGeometry(_))
        ));
        Ok(())
    }
}
