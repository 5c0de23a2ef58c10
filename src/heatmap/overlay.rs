use crate::heatmap::contour::ContourBand;
use crate::utils::constants::{COORDINATE_DIGITS, FILL_OPACITY, STROKE_WIDTH};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

/// Styling written into each band feature's properties.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub stroke_width: f64,
    pub fill_opacity: f64,
    pub digits: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_width: STROKE_WIDTH,
            fill_opacity: FILL_OPACITY,
            digits: COORDINATE_DIGITS,
        }
    }
}

/// One MultiPolygon feature per non-empty band.
pub fn bands_to_geojson(bands: &[ContourBand], style: &OverlayStyle) -> FeatureCollection {
    let features = bands
        .iter()
        .filter(|band| !band.is_empty())
        .map(|band| band_feature(band, style))
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn band_feature(band: &ContourBand, style: &OverlayStyle) -> Feature {
    let polygons = band
        .polygons
        .iter()
        .map(|ring| {
            vec![ring
                .iter()
                .map(|p| vec![round(p[0], style.digits), round(p[1], style.digits)])
                .collect::<Vec<_>>()]
        })
        .collect();

    let mut properties = JsonObject::new();
    properties.insert("stroke".to_string(), json!(band.color));
    properties.insert("stroke-width".to_string(), json!(style.stroke_width));
    properties.insert("stroke-opacity".to_string(), json!(1.0));
    properties.insert("fill".to_string(), json!(band.color));
    properties.insert("fill-opacity".to_string(), json!(style.fill_opacity));
    properties.insert("title".to_string(), json!(band_title(band)));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::MultiPolygon(polygons))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn band_title(band: &ContourBand) -> String {
    match (band.lower.is_finite(), band.upper.is_finite()) {
        (true, true) => format!("{:.2}-{:.2}", band.lower, band.upper),
        (false, true) => format!("< {:.2}", band.upper),
        (true, false) => format!(">= {:.2}", band.lower),
        (false, false) => "all values".to_string(),
    }
}

fn round(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
