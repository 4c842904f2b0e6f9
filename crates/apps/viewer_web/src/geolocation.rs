use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use foundation::sample::PositionSample;
use foundation::time::Time;
use js_sys::{JSON, Object, Reflect};
use runtime::{Capabilities, PermissionState, PollerAction};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{PermissionStatus, Window};

use crate::{App, AppHandle, render_status};

/// Browser resources created on the poller's behalf. Each closure is
/// unregistered before it is dropped.
#[derive(Default)]
pub(crate) struct GeoHost {
    interval: Option<(i32, Closure<dyn FnMut()>)>,
    permission: Option<(PermissionStatus, Closure<dyn FnMut()>)>,
}

pub(crate) fn capabilities() -> Capabilities {
    let Some(window) = web_sys::window() else {
        return Capabilities {
            geolocation: false,
            permissions_query: false,
        };
    };
    let navigator = window.navigator();
    let has = |name: &str| Reflect::has(&navigator, &JsValue::from_str(name)).unwrap_or(false);
    Capabilities {
        geolocation: has("geolocation"),
        permissions_query: has("permissions"),
    }
}

pub(crate) fn start(app: &AppHandle) -> Result<(), JsValue> {
    let actions = app.borrow_mut().session.start_tracking(capabilities());
    execute(app, actions)
}

/// Carries out poller actions, feeding failures back to the session, then
/// re-renders the status line.
pub(crate) fn execute(app: &AppHandle, actions: Vec<PollerAction>) -> Result<(), JsValue> {
    let mut queue: VecDeque<PollerAction> = actions.into();
    while let Some(action) = queue.pop_front() {
        match action {
            PollerAction::QueryPermission => query_permission(app),
            PollerAction::RequestPosition => {
                if let Err(err) = request_position(app) {
                    let message = err
                        .as_string()
                        .unwrap_or_else(|| "position request failed".to_string());
                    queue.extend(app.borrow_mut().session.position_failed(message));
                }
            }
            PollerAction::StartInterval(period) => start_interval(app, period)?,
            PollerAction::CancelInterval => cancel_interval(app),
        }
    }
    render_status(app.borrow().session.status());
    Ok(())
}

fn report(result: Result<(), JsValue>) {
    if let Err(err) = result {
        web_sys::console::warn_1(&err);
    }
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn query_permission(app: &AppHandle) {
    let app = Rc::clone(app);
    spawn_local(async move {
        let actions = match query_geolocation_permission().await {
            Ok((status, state)) => {
                watch_permission(&app, status);
                match state {
                    Some(permission) => app.borrow_mut().session.permission_resolved(permission),
                    None => {
                        web_sys::console::warn_1(&JsValue::from_str(
                            "unrecognized geolocation permission state",
                        ));
                        Vec::new()
                    }
                }
            }
            Err(err) => {
                web_sys::console::warn_1(&err);
                app.borrow_mut().session.permission_query_failed()
            }
        };
        report(execute(&app, actions));
    });
}

async fn query_geolocation_permission()
-> Result<(PermissionStatus, Option<PermissionState>), JsValue> {
    let permissions = window()?.navigator().permissions()?;
    let descriptor: Object = JSON::parse(r#"{"name":"geolocation"}"#)?.dyn_into()?;
    let status: PermissionStatus = JsFuture::from(permissions.query(&descriptor)?)
        .await?
        .dyn_into()?;
    let state = Reflect::get(&status, &"state".into())?
        .as_string()
        .and_then(|s| PermissionState::parse(&s));
    Ok((status, state))
}

/// Re-runs the permission query whenever the permission changes.
fn watch_permission(app: &AppHandle, status: PermissionStatus) {
    let weak = Rc::downgrade(app);
    let on_change = Closure::<dyn FnMut()>::new(move || {
        let Some(app) = weak.upgrade() else {
            return;
        };
        let actions = app.borrow_mut().session.permission_changed();
        report(execute(&app, actions));
    });

    let previous = app.borrow_mut().host.permission.take();
    if let Some((old, _handler)) = previous {
        if !Object::is(&old, &status) {
            old.set_onchange(None);
        }
    }
    status.set_onchange(Some(on_change.as_ref().unchecked_ref()));
    app.borrow_mut().host.permission = Some((status, on_change));
}

fn request_position(app: &AppHandle) -> Result<(), JsValue> {
    let geolocation = window()?.navigator().geolocation()?;

    let weak = Rc::downgrade(app);
    let on_fix = Closure::once_into_js(move |position: JsValue| {
        let Some(app) = weak.upgrade() else {
            return;
        };
        position_fixed(&app, &position);
    });

    let weak = Rc::downgrade(app);
    let on_error = Closure::once_into_js(move |error: JsValue| {
        let Some(app) = weak.upgrade() else {
            return;
        };
        let message = Reflect::get(&error, &"message".into())
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_default();
        let actions = app.borrow_mut().session.position_failed(message);
        report(execute(&app, actions));
    });

    geolocation
        .get_current_position_with_error_callback(on_fix.unchecked_ref(), Some(on_error.unchecked_ref()))
}

fn position_fixed(app: &AppHandle, position: &JsValue) {
    let Some(sample) = read_sample(position) else {
        web_sys::console::warn_1(&JsValue::from_str("ignoring fix with invalid coordinates"));
        app.borrow_mut().session.position_discarded();
        return;
    };

    let mut guard = app.borrow_mut();
    let App {
        session, surface, ..
    } = &mut *guard;
    session.position_fixed(sample, surface);
    render_status(session.status());
}

fn read_sample(position: &JsValue) -> Option<PositionSample> {
    let number = |obj: &JsValue, key: &str| {
        Reflect::get(obj, &JsValue::from_str(key))
            .ok()
            .and_then(|v| v.as_f64())
    };
    let coords = Reflect::get(position, &"coords".into()).ok()?;
    let lat = number(&coords, "latitude")?;
    let lng = number(&coords, "longitude")?;
    let captured_at = number(position, "timestamp")
        .map(Time::from_millis)
        .unwrap_or(Time::ZERO);
    let sample = PositionSample::new(lat, lng, captured_at);
    sample.position.is_valid().then_some(sample)
}

fn start_interval(app: &AppHandle, period: Duration) -> Result<(), JsValue> {
    let window = window()?;
    let weak = Rc::downgrade(app);
    let tick = Closure::<dyn FnMut()>::new(move || {
        let Some(app) = weak.upgrade() else {
            return;
        };
        let actions = app.borrow_mut().session.tick();
        report(execute(&app, actions));
    });

    let millis = i32::try_from(period.as_millis()).unwrap_or(i32::MAX);
    let id = window.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        millis,
    )?;
    let previous = app.borrow_mut().host.interval.replace((id, tick));
    if let Some((old, _tick)) = previous {
        window.clear_interval_with_handle(old);
    }
    Ok(())
}

fn cancel_interval(app: &AppHandle) {
    let Some((id, _tick)) = app.borrow_mut().host.interval.take() else {
        return;
    };
    if let Some(window) = web_sys::window() {
        window.clear_interval_with_handle(id);
    }
}
