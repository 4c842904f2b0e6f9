use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::draw::DrawToolOptions;
use crate::raster::TileLayer;
use crate::symbology::MarkerStyle;

pub const DEFAULT_CENTER_LAT_LNG: [f64; 2] = [52.37947358742472, -113.83430777461079];
pub const DEFAULT_ZOOM: f64 = 16.0;

/// Initial map setup: where it looks, what it draws under the boundary, and
/// which shapes the user may draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    /// `[lat, lng]`.
    pub center: [f64; 2],
    pub zoom: f64,
    /// Bottom-most first.
    pub tiles: Vec<TileLayer>,
    pub draw: DrawToolOptions,
    pub marker: MarkerStyle,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER_LAT_LNG,
            zoom: DEFAULT_ZOOM,
            tiles: vec![TileLayer::esri_imagery(), TileLayer::esri_labels()],
            draw: DrawToolOptions::polygon_only(),
            marker: MarkerStyle::default(),
        }
    }
}

impl MapView {
    pub fn center_point(&self) -> GeoPoint {
        GeoPoint::from_lat_lng(self.center[0], self.center[1])
    }
}

#[cfg(test)]
mod tests {
    use super::MapView;
    use serde_json::json;

    #[test]
    fn default_view_has_imagery_then_labels() {
        let view = MapView::default();
        assert_eq!(view.zoom, 16.0);
        assert_eq!(view.tiles.len(), 2);
        assert!(view.tiles[0].url_template.contains("World_Imagery"));
        assert!(view.tiles[1].url_template.contains("World_Boundaries_and_Places"));
        assert!((view.center_point().lon_deg + 113.834).abs() < 1e-3);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let view: MapView = serde_json::from_value(json!({"zoom": 12, "center": [0.0, 1.0]})).unwrap();
        assert_eq!(view.zoom, 12.0);
        assert_eq!(view.center_point().lon_deg, 1.0);
        assert_eq!(view.tiles.len(), 2);
        assert!(view.draw.polygon);
    }
}
