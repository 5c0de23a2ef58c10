use crate::error::Result;
use crate::heatmap::colormap::StepColormap;
use geojson::FeatureCollection;
use serde::Serialize;

const LEAFLET_CSS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.4/dist/leaflet.js";
const FULLSCREEN_CSS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.css";
const FULLSCREEN_JS: &str =
    "https://cdn.jsdelivr.net/npm/leaflet.fullscreen@3.0.0/Control.FullScreen.min.js";

/// A base tile layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub url: String,
    pub attribution: String,
}

impl TileLayer {
    /// Known tile sets by their short name; anything else is used as a URL
    /// template.
    pub fn named(name: &str) -> Self {
        match name {
            "cartodbpositron" => Self {
                name: name.to_string(),
                url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>".to_string(),
            },
            "openstreetmap" => Self {
                name: name.to_string(),
                url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
            },
            other => Self {
                name: "tiles".to_string(),
                url: other.to_string(),
                attribution: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub caption: String,
    pub colors: Vec<String>,
    pub thresholds: Vec<f64>,
}

impl From<&StepColormap> for Legend {
    fn from(colormap: &StepColormap) -> Self {
        Self {
            caption: colormap.caption().to_string(),
            colors: colormap.colors().to_vec(),
            thresholds: colormap.thresholds(),
        }
    }
}

/// A circle marker with an HTML popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub color: String,
    pub popup: String,
}

/// Everything the generated page needs, embedded as one JSON object.
#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    pub title: String,
    pub center: [f64; 2],
    pub zoom: u8,
    pub tiles: TileLayer,
    pub overlay: FeatureCollection,
    pub overlay_name: String,
    pub overlay_opacity: f64,
    pub legend: Legend,
    pub markers: Vec<Marker>,
    pub fullscreen: bool,
    pub layer_control: bool,
}

impl MapDocument {
    /// Render a standalone HTML page. Leaflet and the fullscreen plugin are
    /// loaded from a CDN; all data is inline.
    pub fn to_html(&self) -> Result<String> {
        // "</" inside the JSON would close the script element early
        let config = serde_json::to_string(self)?.replace("</", "<\\/");

        let mut head_assets = format!(
            "<link rel=\"stylesheet\" href=\"{}\"/>\n<script src=\"{}\"></script>\n",
            LEAFLET_CSS, LEAFLET_JS
        );
        if self.fullscreen {
            head_assets.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}\"/>\n<script src=\"{}\"></script>\n",
                FULLSCREEN_CSS, FULLSCREEN_JS
            ));
        }

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<title>{title}</title>
{head_assets}<style>
html, body, #map {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
.legend {{ background: rgba(255, 255, 255, 0.85); padding: 6px 8px; font: 12px/1.4 sans-serif; border-radius: 4px; }}
.legend .caption {{ font-weight: bold; margin-bottom: 4px; }}
.legend .swatch {{ display: inline-block; width: 28px; height: 10px; }}
.legend .labels {{ display: flex; justify-content: space-between; }}
</style>
</head>
<body>
<div id="map"></div>
<script>
const config = {config};

const map = L.map("map", {{ center: config.center, zoom: config.zoom }});
const base = L.tileLayer(config.tiles.url, {{ attribution: config.tiles.attribution, maxZoom: 19 }}).addTo(map);

const contours = L.geoJSON(config.overlay, {{
  style: function (feature) {{
    return {{
      color: feature.properties["stroke"],
      weight: feature.properties["stroke-width"],
      fillColor: feature.properties["fill"],
      fillOpacity: feature.properties["fill-opacity"],
      opacity: config.overlay_opacity
    }};
  }}
}}).addTo(map);

const overlays = {{}};
overlays[config.overlay_name] = contours;

if (config.markers.length > 0) {{
  const points = L.featureGroup();
  config.markers.forEach(function (m) {{
    L.circle([m.lat, m.lon], {{ radius: m.radius, color: m.color, fill: true }})
      .bindPopup(m.popup)
      .addTo(points);
  }});
  points.addTo(map);
  overlays["points"] = points;
}}

const legend = L.control({{ position: "topright" }});
legend.onAdd = function () {{
  const div = L.DomUtil.create("div", "legend");
  const caption = document.createElement("div");
  caption.className = "caption";
  caption.textContent = config.legend.caption;
  div.appendChild(caption);
  const swatches = document.createElement("div");
  config.legend.colors.forEach(function (c) {{
    const s = document.createElement("span");
    s.className = "swatch";
    s.style.background = c;
    swatches.appendChild(s);
  }});
  div.appendChild(swatches);
  const labels = document.createElement("div");
  labels.className = "labels";
  config.legend.thresholds.forEach(function (t) {{
    const l = document.createElement("span");
    l.textContent = t.toFixed(1);
    labels.appendChild(l);
  }});
  div.appendChild(labels);
  return div;
}};
legend.addTo(map);

if (config.fullscreen) {{
  L.control.fullscreen({{ position: "topright", forceSeparateButton: true }}).addTo(map);
}}

if (config.layer_control) {{
  const bases = {{}};
  bases[config.tiles.name] = base;
  L.control.layers(bases, overlays).addTo(map);
}}
</script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            head_assets = head_assets,
            config = config,
        ))
    }
}

/// Escape text for inclusion in HTML markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
