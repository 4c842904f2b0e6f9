use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Circle marker styling, field names as the map widget expects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerStyle {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    /// Pixels.
    pub radius: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: "#2986ff".to_string(),
            fill_color: "#2986ff".to_string(),
            fill_opacity: 0.8,
            radius: 9.0,
        }
    }
}

impl MarkerStyle {
    /// Option object for `L.circleMarker(latlng, options)`.
    pub fn leaflet_options(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
