use crate::error::{ProcessingError, Result};
use crate::heatmap::colormap::StepColormap;
use crate::heatmap::contour::contour_bands;
use crate::heatmap::grid::Grid;
use crate::heatmap::interpolation::interpolate_linear;
use crate::heatmap::map_document::{escape_html, Legend, MapDocument, Marker, TileLayer};
use crate::heatmap::overlay::{bands_to_geojson, OverlayStyle};
use crate::heatmap::smoothing::gaussian_smooth;
use crate::models::GridSample;
use crate::utils::constants::{
    CONTOUR_COLORS, CONTOUR_ZOOM, MAP_TILES, MARKER_RADIUS, OUTLIER_QUANTILE, OVERLAY_OPACITY,
    PM25_COLUMN, POINTS_COLORS, POINTS_TILES, POINTS_ZOOM,
};
use crate::utils::{ProgressReporter, Settings};
use crate::writers::write_atomic;
use clap::ValueEnum;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Which flavour of map to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeatmapVariant {
    /// Fixed statistical colour scale with a fullscreen control.
    Contour,
    /// Data-range colour scale with outlier clipping and station markers.
    Points,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub variant: HeatmapVariant,
    pub resolution: usize,
    pub sigma: f64,
    pub colors: Vec<String>,
    /// Centre and spread of the contour colour scale, which covers
    /// `mean +/- 2 std`. Ignored by the points variant.
    pub scale_mean: f64,
    pub scale_std: f64,
    pub caption: String,
    pub title: String,
    pub tiles: String,
    pub zoom: u8,
    pub marker_radius: f64,
    pub overlay: OverlayStyle,
}

impl RenderOptions {
    pub fn contour(settings: &Settings) -> Self {
        Self {
            variant: HeatmapVariant::Contour,
            resolution: settings.grid_resolution,
            sigma: settings.contour_sigma,
            colors: CONTOUR_COLORS.iter().map(|c| c.to_string()).collect(),
            scale_mean: settings.scale_mean,
            scale_std: settings.scale_std,
            caption: PM25_COLUMN.to_string(),
            title: format!("{} heatmap", PM25_COLUMN),
            tiles: MAP_TILES.to_string(),
            zoom: CONTOUR_ZOOM,
            marker_radius: MARKER_RADIUS,
            overlay: OverlayStyle::default(),
        }
    }

    pub fn points(settings: &Settings) -> Self {
        Self {
            variant: HeatmapVariant::Points,
            sigma: settings.points_sigma,
            colors: POINTS_COLORS.iter().map(|c| c.to_string()).collect(),
            tiles: POINTS_TILES.to_string(),
            zoom: POINTS_ZOOM,
            ..Self::contour(settings)
        }
    }

    pub fn for_variant(variant: HeatmapVariant, settings: &Settings) -> Self {
        match variant {
            HeatmapVariant::Contour => Self::contour(settings),
            HeatmapVariant::Points => Self::points(settings),
        }
    }

    pub fn with_caption(mut self, caption: &str) -> Self {
        self.caption = caption.to_string();
        self
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }
}

/// The finished page and a few facts about how it was produced.
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub html: String,
    pub samples: usize,
    pub bands: usize,
    pub center: [f64; 2],
    pub scale: (f64, f64),
}

impl RenderedMap {
    pub fn summary(&self) -> String {
        format!(
            "{} samples, {} bands, scale {:.2}..{:.2}, centre ({:.5}, {:.5})",
            self.samples, self.bands, self.scale.0, self.scale.1, self.center[0], self.center[1]
        )
    }
}

pub struct HeatmapRenderer {
    options: RenderOptions,
}

impl HeatmapRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Drop samples with a missing coordinate or value. The points variant
    /// then keeps only values strictly below the outlier quantile.
    pub fn prepare_samples(&self, samples: Vec<GridSample>) -> Result<Vec<GridSample>> {
        if samples.is_empty() {
            return Err(ProcessingError::EmptyInput(
                "no samples to render".to_string(),
            ));
        }

        let total = samples.len();
        let mut kept: Vec<GridSample> = samples.into_iter().filter(|s| s.is_complete()).collect();
        if kept.len() < total {
            let dropped = total - kept.len();
            match self.options.variant {
                HeatmapVariant::Contour => {
                    warn!("Dropped {} of {} samples with missing values", dropped, total)
                }
                HeatmapVariant::Points => {
                    debug!("Dropped {} of {} samples with missing values", dropped, total)
                }
            }
        }

        if self.options.variant == HeatmapVariant::Points && !kept.is_empty() {
            let values: Vec<f64> = kept.iter().map(|s| s.value).collect();
            let cutoff = quantile(&values, OUTLIER_QUANTILE);
            kept.retain(|s| s.value < cutoff);
            debug!("Outlier cutoff {:.3}, {} samples kept", cutoff, kept.len());
        }

        if kept.is_empty() {
            return Err(ProcessingError::EmptyInput(format!(
                "none of the {} samples has usable coordinates and value",
                total
            )));
        }
        Ok(kept)
    }

    /// Interpolate `samples` onto a regular grid and smooth it.
    pub fn build_surface(&self, samples: &[GridSample]) -> Result<Grid> {
        let mut grid = Grid::spanning(samples, self.options.resolution)?;
        interpolate_linear(samples, &mut grid)?;
        gaussian_smooth(&mut grid, self.options.sigma);
        debug!(
            "Surface {}x{} with {} defined nodes",
            grid.width(),
            grid.height(),
            grid.defined_count()
        );
        Ok(grid)
    }

    pub fn colormap(&self, samples: &[GridSample]) -> Result<StepColormap> {
        let (vmin, vmax) = match self.options.variant {
            HeatmapVariant::Contour => (
                self.options.scale_mean - 2.0 * self.options.scale_std,
                self.options.scale_mean + 2.0 * self.options.scale_std,
            ),
            HeatmapVariant::Points => samples
                .iter()
                .map(|s| s.value)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                }),
        };
        let colors: Vec<&str> = self.options.colors.iter().map(String::as_str).collect();
        Ok(StepColormap::new(&colors, vmin, vmax)?.with_caption(&self.options.caption))
    }

    pub fn render(
        &self,
        samples: Vec<GridSample>,
        progress: Option<&ProgressReporter>,
    ) -> Result<RenderedMap> {
        let report = |message: &str| {
            if let Some(p) = progress {
                p.set_message(message);
            }
        };

        report("Preparing samples");
        let samples = self.prepare_samples(samples)?;

        report("Interpolating surface");
        let grid = self.build_surface(&samples)?;

        report("Tracing contour bands");
        let colormap = self.colormap(&samples)?;
        let bands = contour_bands(&grid, &colormap);
        let overlay = bands_to_geojson(&bands, &self.options.overlay);
        let band_count = overlay.features.len();

        report("Writing map document");
        let center = self.center(&samples);
        let markers = match self.options.variant {
            HeatmapVariant::Contour => Vec::new(),
            HeatmapVariant::Points => self.markers(&samples, &colormap),
        };
        let scale = {
            let t = colormap.thresholds();
            (t[0], t[t.len() - 1])
        };

        let document = MapDocument {
            title: self.options.title.clone(),
            center,
            zoom: self.options.zoom,
            tiles: TileLayer::named(&self.options.tiles),
            overlay,
            overlay_name: self.options.caption.clone(),
            overlay_opacity: OVERLAY_OPACITY,
            legend: Legend::from(&colormap),
            markers,
            fullscreen: self.options.variant == HeatmapVariant::Contour,
            layer_control: self.options.variant == HeatmapVariant::Points,
        };
        let html = document.to_html()?;

        if let Some(p) = progress {
            p.finish_with_message("Map rendered");
        }

        Ok(RenderedMap {
            html,
            samples: samples.len(),
            bands: band_count,
            center,
            scale,
        })
    }

    pub fn render_to_file(
        &self,
        samples: Vec<GridSample>,
        output: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<RenderedMap> {
        let rendered = self.render(samples, progress)?;
        write_atomic(output, |w| {
            w.write_all(rendered.html.as_bytes())?;
            Ok(())
        })?;
        info!("Wrote {} ({})", output.display(), rendered.summary());
        Ok(rendered)
    }

    /// `[lat, lon]` map centre.
    fn center(&self, samples: &[GridSample]) -> [f64; 2] {
        match self.options.variant {
            HeatmapVariant::Contour => {
                let n = samples.len() as f64;
                let lat = samples.iter().map(|s| s.latitude).sum::<f64>() / n;
                let lon = samples.iter().map(|s| s.longitude).sum::<f64>() / n;
                [lat, lon]
            }
            HeatmapVariant::Points => {
                let (min_lat, max_lat, min_lon, max_lon) = samples.iter().fold(
                    (
                        f64::INFINITY,
                        f64::NEG_INFINITY,
                        f64::INFINITY,
                        f64::NEG_INFINITY,
                    ),
                    |(a, b, c, d), s| {
                        (
                            a.min(s.latitude),
                            b.max(s.latitude),
                            c.min(s.longitude),
                            d.max(s.longitude),
                        )
                    },
                );
                [(min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0]
            }
        }
    }

    fn markers(&self, samples: &[GridSample], colormap: &StepColormap) -> Vec<Marker> {
        samples
            .iter()
            .map(|s| {
                let mut popup = format!(
                    "<b>{}</b>: {}",
                    escape_html(&self.options.caption),
                    s.value
                );
                for (name, value) in &s.attributes {
                    popup.push_str(&format!(
                        "<br>{}: {}",
                        escape_html(name),
                        escape_html(value)
                    ));
                }
                Marker {
                    lat: s.latitude,
                    lon: s.longitude,
                    radius: self.options.marker_radius,
                    color: colormap.color_for(s.value).unwrap_or_default().to_string(),
                    popup,
                }
            })
            .collect()
    }
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<GridSample> {
        vec![
            GridSample::new(-71.30, 46.70, 8.0),
            GridSample::new(-71.10, 46.72, 10.0),
            GridSample::new(-71.12, 46.90, 16.0),
            GridSample::new(-71.28, 46.88, 14.0),
            GridSample::new(-71.20, 46.80, 12.0),
            GridSample::new(-71.22, 46.76, 11.0).with_attribute("name", "Limoilou <3"),
        ]
    }

    fn options(variant: HeatmapVariant) -> RenderOptions {
        RenderOptions::for_variant(variant, &Settings::default())
            .with_resolution(40)
            .with_sigma(1.0)
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&values, 0.5), 3.0);
        assert!((quantile(&values, 0.99) - 4.96).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.99), 7.0);
    }

    #[test]
    fn test_points_variant_clips_outliers_and_nulls() -> Result<()> {
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Points));
        let mut input = samples();
        input.push(GridSample::new(-71.2, 46.8, 1000.0));
        input.push(GridSample::new(-71.2, 46.8, f64::NAN));

        let kept = renderer.prepare_samples(input)?;
        assert_eq!(kept.len(), 6);
        assert!(kept.iter().all(|s| s.value < 1000.0));
        Ok(())
    }

    #[test]
    fn test_contour_variant_keeps_all_complete_samples() -> Result<()> {
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Contour));
        let kept = renderer.prepare_samples(samples())?;
        assert_eq!(kept.len(), 6);
        Ok(())
    }

    #[test]
    fn test_all_null_values_are_empty_input() {
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Points));
        let input = vec![
            GridSample::new(-71.3, 46.7, f64::NAN),
            GridSample::new(-71.1, 46.7, f64::NAN),
        ];
        assert!(matches!(
            renderer.prepare_samples(input),
            Err(ProcessingError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_no_samples_is_empty_input() {
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Contour));
        assert!(matches!(
            renderer.render(Vec::new(), None),
            Err(ProcessingError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_collinear_samples_are_degenerate() {
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Contour));
        let input = vec![
            GridSample::new(-71.3, 46.7, 8.0),
            GridSample::new(-71.2, 46.8, 9.0),
            GridSample::new(-71.1, 46.9, 10.0),
        ];
        assert!(matches!(
            renderer.render(input, None),
            Err(ProcessingError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_contour_render() -> Result<()> {
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Contour));
        let rendered = renderer.render(samples(), None)?;

        assert_eq!(rendered.samples, 6);
        assert!(rendered.bands > 0);
        assert_eq!(rendered.scale, (8.0, 16.0));
        assert!((rendered.center[0] - 280.76 / 6.0).abs() < 1e-9);
        assert!(rendered.html.contains("FeatureCollection"));
        assert!(rendered.html.contains("\"fullscreen\":true"));
        assert!(rendered.html.contains("\"markers\":[]"));
        Ok(())
    }

    #[test]
    fn test_points_render_has_escaped_markers() -> Result<()> {
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Points));
        let rendered = renderer.render(samples(), None)?;

        // The 0.99 quantile falls between the two largest values, so the
        // maximum is clipped.
        assert_eq!(rendered.samples, 5);
        assert_eq!(rendered.scale, (8.0, 14.0));
        assert!((rendered.center[0] - 46.79).abs() < 1e-9);
        assert!(rendered.html.contains("\"layer_control\":true"));
        assert!(rendered.html.contains("Limoilou &lt;3"));
        Ok(())
    }

    #[test]
    fn test_contour_vertices_stay_within_sample_hull() -> Result<()> {
        // Triangular hull, so its bounding box has corners the surface
        // must never reach
        let hull = [[-71.30, 46.70], [-71.10, 46.72], [-71.18, 46.90]];
        let input = vec![
            GridSample::new(hull[0][0], hull[0][1], 8.0),
            GridSample::new(hull[1][0], hull[1][1], 16.0),
            GridSample::new(hull[2][0], hull[2][1], 12.0),
            GridSample::new(-71.19, 46.77, 14.0),
            GridSample::new(-71.22, 46.74, 10.0),
            GridSample::new(-71.17, 46.82, 9.0),
        ];
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Contour));
        let grid = renderer.build_surface(&input)?;
        let colormap = renderer.colormap(&input)?;

        let side = |a: [f64; 2], b: [f64; 2], p: [f64; 2]| {
            (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
        };
        let mut vertices = 0;
        for band in contour_bands(&grid, &colormap) {
            for ring in &band.polygons {
                for &p in ring {
                    for i in 0..hull.len() {
                        let (a, b) = (hull[i], hull[(i + 1) % hull.len()]);
                        assert!(side(a, b, p) >= -1e-9, "{:?} lies outside the sample hull", p);
                    }
                    vertices += 1;
                }
            }
        }
        assert!(vertices > 0);
        Ok(())
    }

    #[test]
    fn test_variant_tiles() -> Result<()> {
        let settings = Settings::default();
        assert_eq!(RenderOptions::contour(&settings).tiles, "cartodbpositron");
        assert_eq!(RenderOptions::points(&settings).tiles, "openstreetmap");

        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Points));
        let rendered = renderer.render(samples(), None)?;
        assert!(rendered.html.contains("tile.openstreetmap.org"));
        assert!(!rendered.html.contains("basemaps.cartocdn.com"));
        Ok(())
    }

    #[test]
    fn test_render_to_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let output = dir.path().join("map.html");
        let renderer = HeatmapRenderer::new(options(HeatmapVariant::Contour));
        renderer.render_to_file(samples(), &output, None)?;

        let html = std::fs::read_to_string(&output)?;
        assert!(html.contains("L.geoJSON"));
        Ok(())
    }
}
