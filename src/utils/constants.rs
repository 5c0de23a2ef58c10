/// Archive layout
pub const ARCHIVE_FILE: &str = "archive-stations-limoilair.zip";
pub const ARCHIVE_DIR: &str = "archive-stations-limoilair";
pub const INDEX_FILE: &str = "index.csv";

/// Data files start with the year of their date
pub const DATA_FILE_PREFIX: &str = "20";

/// Output names
pub const DAILY_OUTPUT_DIR: &str = "par_date";
pub const FULL_OUTPUT_FILE: &str = "all.csv";
pub const DEFAULT_MAP_FILE: &str = "contour_map.html";

/// Column names
pub const SLUG_COLUMN: &str = "Slug";
pub const DATE_COLUMN: &str = "Date";
pub const TIMESTAMP_COLUMN: &str = "Date (UTC)";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";
pub const PM25_COLUMN: &str = "PM2.5";
pub const HUMIDITY_COLUMN: &str = "Humidity";
pub const CORRECTED_COLUMN: &str = "PM2.5 corrected";

/// Merge date range, end exclusive
pub const DEFAULT_START_DATE: &str = "2022-05-01";
pub const DEFAULT_END_DATE: &str = "2022-09-05";

/// PM2.5 humidity correction coefficients
pub const PM25_COEFFICIENT: f64 = 0.524;
pub const HUMIDITY_COEFFICIENT: f64 = 0.0862;
pub const CORRECTION_INTERCEPT: f64 = 5.75;

/// Heatmap grid and smoothing
pub const DEFAULT_GRID_RESOLUTION: usize = 500;
pub const CONTOUR_SIGMA: f64 = 5.0;
pub const POINTS_SIGMA: f64 = 4.0;
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Colour scale normalisation for the contour variant
pub const SCALE_MEAN: f64 = 12.0;
pub const SCALE_STD: f64 = 2.0;

/// Outlier clip for the points variant
pub const OUTLIER_QUANTILE: f64 = 0.99;

/// Colour ramps
pub const CONTOUR_COLORS: [&str; 5] = ["#d7191c", "#fdae61", "#ffffbf", "#abdda4", "#2b83ba"];
pub const POINTS_COLORS: [&str; 5] = ["#147d05", "#1ead0a", "#ffff17", "#f28e2c", "#b30003"];

/// GeoJSON overlay styling
pub const COORDINATE_DIGITS: i32 = 5;
pub const STROKE_WIDTH: f64 = 1.0;
pub const FILL_OPACITY: f64 = 0.5;
pub const OVERLAY_OPACITY: f64 = 0.6;

/// Map presentation
pub const MAP_TILES: &str = "cartodbpositron";
pub const POINTS_TILES: &str = "openstreetmap";
pub const CONTOUR_ZOOM: u8 = 10;
pub const POINTS_ZOOM: u8 = 14;
pub const MARKER_RADIUS: f64 = 5.0;
