use std::collections::HashMap;

use formats::Boundary;
use foundation::math::GeoPoint;
use js_sys::{Array, Function, JSON, Object, Reflect};
use layers::objects::{MarkerId, UserMarker};
use layers::{MapSurface, MapView};
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

const DRAW_CREATED: &str = "draw:created";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = L, js_name = Map)]
    pub type LeafletMap;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    fn leaflet_map(id: &str) -> LeafletMap;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64) -> LeafletMap;

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &LeafletMap, layer: &Layer) -> LeafletMap;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &LeafletMap, layer: &Layer) -> LeafletMap;

    #[wasm_bindgen(method, js_name = addControl)]
    fn add_control(this: &LeafletMap, control: &DrawControl) -> LeafletMap;

    #[wasm_bindgen(method)]
    fn on(this: &LeafletMap, event: &str, handler: &Function) -> LeafletMap;

    #[wasm_bindgen(js_namespace = L)]
    pub type Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Layer, map: &LeafletMap) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url_template: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = circleMarker)]
    fn circle_marker(lat_lng: &JsValue, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L)]
    fn polygon(lat_lngs: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, extends = Layer)]
    pub type FeatureGroup;

    #[wasm_bindgen(constructor, js_namespace = L)]
    fn new() -> FeatureGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    fn clear_layers(this: &FeatureGroup);

    #[wasm_bindgen(method, js_name = addLayer)]
    fn add_layer(this: &FeatureGroup, layer: &Layer) -> FeatureGroup;

    #[wasm_bindgen(js_namespace = ["L", "Control"], js_name = Draw)]
    pub type DrawControl;

    #[wasm_bindgen(constructor, js_namespace = ["L", "Control"], js_class = "Draw")]
    fn new(options: &JsValue) -> DrawControl;
}

/// Reads a drawn layer back as a GeoJSON string.
pub(crate) fn layer_geojson(layer: &JsValue) -> Result<String, JsValue> {
    let to_geojson: Function = Reflect::get(layer, &"toGeoJSON".into())?.dyn_into()?;
    let feature = to_geojson.call0(layer)?;
    JSON::stringify(&feature)?
        .as_string()
        .ok_or_else(|| JsValue::from_str("layer GeoJSON is not a string"))
}

fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    JSON::parse(&value.to_string())
}

fn lat_lng(p: GeoPoint) -> JsValue {
    let [lat, lng] = p.lat_lng();
    Array::of2(&lat.into(), &lng.into()).into()
}

/// The Leaflet map in the page, with the drawing control and one feature
/// group holding the drawn boundary.
pub(crate) struct LeafletSurface {
    map: LeafletMap,
    drawn: FeatureGroup,
    markers: HashMap<MarkerId, Layer>,
}

impl LeafletSurface {
    pub(crate) fn mount(element_id: &str, view: &MapView) -> Result<Self, JsValue> {
        let map = leaflet_map(element_id);
        map.set_view(&lat_lng(view.center_point()), view.zoom);

        for tile in &view.tiles {
            tile_layer(&tile.url_template, &to_js(&tile.leaflet_options())?).add_to(&map);
        }

        let drawn = FeatureGroup::new();
        map.add_layer(&drawn);

        let options = to_js(&json!({ "draw": view.draw.leaflet_options() }))?;
        let edit = Object::new();
        Reflect::set(&edit, &"featureGroup".into(), &drawn)?;
        Reflect::set(&options, &"edit".into(), &edit)?;
        map.add_control(&DrawControl::new(&options));

        Ok(Self {
            map,
            drawn,
            markers: HashMap::new(),
        })
    }

    pub(crate) fn on_draw_created(&self, handler: &Function) {
        self.map.on(DRAW_CREATED, handler);
    }
}

impl MapSurface for LeafletSurface {
    fn clear_boundary(&mut self) {
        self.drawn.clear_layers();
    }

    fn show_boundary(&mut self, boundary: &Boundary) {
        let rings: Array = boundary
            .rings()
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|p| lat_lng(*p))
                    .collect::<Array>()
            })
            .collect();
        self.drawn.add_layer(&polygon(&rings));
    }

    fn add_marker(&mut self, marker: &UserMarker) {
        let options = match marker
            .style
            .leaflet_options()
            .map_err(|e| JsValue::from_str(&e.to_string()))
            .and_then(|value| to_js(&value))
        {
            Ok(options) => options,
            Err(err) => {
                web_sys::console::warn_1(&err);
                Object::new().into()
            }
        };
        let layer = circle_marker(&lat_lng(marker.position), &options).add_to(&self.map);
        self.markers.insert(marker.id, layer);
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if let Some(layer) = self.markers.remove(&id) {
            self.map.remove_layer(&layer);
        }
    }
}
