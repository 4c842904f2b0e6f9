use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Shape tools offered by the drawing control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawToolOptions {
    pub polygon: bool,
    pub marker: bool,
    pub polyline: bool,
    pub rectangle: bool,
    pub circle: bool,
    pub circlemarker: bool,
}

impl Default for DrawToolOptions {
    fn default() -> Self {
        Self::polygon_only()
    }
}

impl DrawToolOptions {
    pub const fn polygon_only() -> Self {
        Self {
            polygon: true,
            marker: false,
            polyline: false,
            rectangle: false,
            circle: false,
            circlemarker: false,
        }
    }

    /// Whether a created layer of `layer_type` (as named by the drawing
    /// control's "created" event) is one this tool set produces.
    pub fn allows(&self, layer_type: &str) -> bool {
        match layer_type {
            "polygon" => self.polygon,
            "marker" => self.marker,
            "polyline" => self.polyline,
            "rectangle" => self.rectangle,
            "circle" => self.circle,
            "circlemarker" => self.circlemarker,
            _ => false,
        }
    }

    /// The `draw` section of the drawing control's options.
    pub fn leaflet_options(&self) -> Value {
        json!({
            "polygon": self.polygon,
            "marker": self.marker,
            "polyline": self.polyline,
            "rectangle": self.rectangle,
            "circle": self.circle,
            "circlemarker": self.circlemarker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DrawToolOptions;

    #[test]
    fn only_polygons_are_allowed_by_default() {
        let opts = DrawToolOptions::default();
        assert!(opts.allows("polygon"));
        for other in ["marker", "polyline", "rectangle", "circle", "circlemarker", "blob"] {
            assert!(!opts.allows(other), "{other} should be disabled");
        }
        assert_eq!(opts.leaflet_options()["polygon"], true);
        assert_eq!(opts.leaflet_options()["circle"], false);
    }
}
