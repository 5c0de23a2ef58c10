//! Contour heatmap rendering: scattered samples are interpolated onto a
//! regular grid, smoothed, cut into colour bands and written out as a
//! Leaflet page with a GeoJSON overlay.

pub mod colormap;
pub mod contour;
pub mod grid;
pub mod interpolation;
pub mod map_document;
pub mod overlay;
pub mod renderer;
pub mod smoothing;
pub mod triangulation;

pub use colormap::StepColormap;
pub use contour::{contour_bands, ContourBand, Ring};
pub use grid::{linspace, Grid};
pub use interpolation::interpolate_linear;
pub use map_document::{escape_html, Legend, MapDocument, Marker, TileLayer};
pub use overlay::{bands_to_geojson, OverlayStyle};
pub use renderer::{quantile, HeatmapRenderer, HeatmapVariant, RenderOptions, RenderedMap};
pub use smoothing::{gaussian_kernel, gaussian_smooth};
pub use triangulation::{triangulate, Triangulation};
