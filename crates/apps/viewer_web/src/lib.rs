use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use session::{Session, SessionConfig, Status};

mod geolocation;
mod leaflet;

use geolocation::GeoHost;
use leaflet::LeafletSurface;

const MAP_ELEMENT_ID: &str = "map";
const STATUS_ELEMENT_ID: &str = "status";

pub(crate) struct App {
    session: Session,
    surface: LeafletSurface,
    host: GeoHost,
}

pub(crate) type AppHandle = Rc<RefCell<App>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Mounts the map and starts location tracking.
///
/// `config_json` is an optional session config; missing fields take their
/// defaults.
#[wasm_bindgen]
pub fn start_tracker(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(text) => SessionConfig::from_json_str(&text).map_err(|e| js_err(&e))?,
        None => SessionConfig::default(),
    };

    let surface = LeafletSurface::mount(MAP_ELEMENT_ID, &config.map)?;
    let app: AppHandle = Rc::new(RefCell::new(App {
        session: Session::new(config),
        surface,
        host: GeoHost::default(),
    }));

    install_draw_handler(&app);
    render_status(app.borrow().session.status());
    geolocation::start(&app)
}

fn install_draw_handler(app: &AppHandle) {
    let weak = Rc::downgrade(app);
    let handler = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
        let Some(app) = weak.upgrade() else {
            return;
        };
        if let Err(err) = polygon_created(&app, &event) {
            web_sys::console::warn_1(&err);
        }
    });
    app.borrow()
        .surface
        .on_draw_created(handler.as_ref().unchecked_ref());
    // Lives as long as the page.
    handler.forget();
}

fn polygon_created(app: &AppHandle, event: &JsValue) -> Result<(), JsValue> {
    let layer_type = js_sys::Reflect::get(event, &"layerType".into())?
        .as_string()
        .unwrap_or_default();
    let mut guard = app.borrow_mut();
    let App {
        session, surface, ..
    } = &mut *guard;
    if !session.config().map.draw.allows(&layer_type) {
        return Ok(());
    }

    let layer = js_sys::Reflect::get(event, &"layer".into())?;
    let geojson = leaflet::layer_geojson(&layer)?;
    session
        .polygon_created_geojson(&geojson, surface)
        .map_err(|e| js_err(&e))?;
    render_status(session.status());
    Ok(())
}

/// Writes the status line into the page.
pub(crate) fn render_status(status: &Status) {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(STATUS_ELEMENT_ID))
    else {
        web_sys::console::warn_1(&JsValue::from_str("missing #status element"));
        return;
    };
    element.set_inner_html(&status.to_html());
}

pub(crate) fn js_err(err: &impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
