use formats::Boundary;
use foundation::sample::PositionSample;
use foundation::time::Time;
use layers::HeadlessSurface;
use serde_json::{Value, json};
use session::{Session, SessionConfig};

/// Evaluates a single point against `boundary` with a fresh session.
pub fn check_point(
    config: SessionConfig,
    boundary: Boundary,
    lat: f64,
    lng: f64,
) -> Result<Session, String> {
    let sample = PositionSample::new(lat, lng, Time::ZERO);
    if !sample.position.is_valid() {
        return Err(format!("not a valid position: {lat}, {lng}"));
    }

    let mut surface = HeadlessSurface::default();
    let mut session = Session::new(config);
    session.polygon_created(boundary, &mut surface);
    session.check_location(sample, &mut surface);
    Ok(session)
}

/// Machine-readable form of a checked point.
pub fn check_report(session: &Session, lat: f64, lng: f64) -> Value {
    let status = session.status();
    json!({
        "lat": lat,
        "lng": lng,
        "classification": status.classification().css_class(),
        "distance_m": session.last_evaluation().map(|e| e.reported_distance_m()),
        "status": status.to_string(),
    })
}
