use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::layer::{Layer, LayerId};

pub const ESRI_IMAGERY_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
pub const ESRI_LABELS_URL: &str = "https://services.arcgisonline.com/arcgis/rest/services/Reference/World_Boundaries_and_Places/MapServer/tile/{z}/{y}/{x}";

/// An XYZ tile endpoint consumed by the map widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub id: LayerId,
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl TileLayer {
    pub fn new(id: u64, url_template: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            id: LayerId(id),
            url_template: url_template.into(),
            attribution: attribution.into(),
            max_zoom: 20,
        }
    }

    pub fn esri_imagery() -> Self {
        Self::new(1, ESRI_IMAGERY_URL, "Imagery: Tiles © Esri")
    }

    /// Reference labels drawn over the imagery.
    pub fn esri_labels() -> Self {
        Self::new(2, ESRI_LABELS_URL, "Labels: Esri")
    }

    /// Option object for `L.tileLayer(url, options)`.
    pub fn leaflet_options(&self) -> Value {
        json!({
            "attribution": self.attribution,
            "maxZoom": self.max_zoom,
        })
    }
}

impl Layer for TileLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::TileLayer;
    use crate::layer::Layer;
    use serde_json::json;

    #[test]
    fn presets_keep_distinct_ids_and_zoom_cap() {
        let imagery = TileLayer::esri_imagery();
        let labels = TileLayer::esri_labels();
        assert_ne!(imagery.id(), labels.id());
        assert_eq!(imagery.max_zoom, 20);
        assert!(imagery.url_template.ends_with("/tile/{z}/{y}/{x}"));
    }

    #[test]
    fn leaflet_options_carry_attribution_and_zoom() {
        let layer = TileLayer::esri_labels();
        assert_eq!(
            layer.leaflet_options(),
            json!({"attribution": "Labels: Esri", "maxZoom": 20})
        );
    }
}
