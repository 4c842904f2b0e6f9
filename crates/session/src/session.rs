use compute::{Evaluation, GeofenceEvaluator};
use formats::{Boundary, GeoJsonError};
use foundation::sample::PositionSample;
use layers::{Layer, MapSurface};
use layers::objects::{MarkerLayer, UserMarker};
use layers::vector::BoundaryLayer;
use runtime::{Capabilities, LocationPoller, PermissionState, PollerAction, PollerOutput};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::TrackingError;
use crate::status::Status;

const BOUNDARY_LAYER_ID: u64 = 100;
const MARKER_LAYER_ID: u64 = 101;

/// The tracker's whole mutable state: the current boundary, the user marker,
/// the status line and the location poller.
///
/// Hosts own one `Session` and hand it the display surface on every call.
/// Methods that drive the poller return the [`PollerAction`]s the host must
/// execute; the status is updated in place and read back with
/// [`Session::status`].
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    boundaries: BoundaryLayer,
    evaluator: Option<GeofenceEvaluator>,
    markers: MarkerLayer,
    poller: LocationPoller,
    status: Status,
    last_evaluation: Option<Evaluation>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let markers = MarkerLayer::new(MARKER_LAYER_ID, config.map.marker.clone());
        let poller = LocationPoller::new(config.poll_interval());
        Self {
            config,
            boundaries: BoundaryLayer::new(BOUNDARY_LAYER_ID),
            evaluator: None,
            markers,
            poller,
            status: Status::Idle,
            last_evaluation: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn boundary(&self) -> Option<&Boundary> {
        self.boundaries.current()
    }

    pub fn marker(&self) -> Option<&UserMarker> {
        self.markers.current()
    }

    pub fn poller(&self) -> &LocationPoller {
        &self.poller
    }

    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last_evaluation.as_ref()
    }

    /// A polygon was drawn: it replaces any previous boundary.
    pub fn polygon_created(&mut self, boundary: Boundary, surface: &mut impl MapSurface) {
        surface.clear_boundary();
        let evaluator = GeofenceEvaluator::new(&boundary);
        surface.show_boundary(&boundary);
        let replaced = self.boundaries.replace(boundary).is_some();
        self.evaluator = Some(evaluator);
        self.last_evaluation = None;
        info!(replaced, layer = self.boundaries.id().0, "boundary set");
        self.status = Status::BoundaryDrawn;
    }

    /// Same as [`Session::polygon_created`], from the drawn layer's GeoJSON.
    pub fn polygon_created_geojson(
        &mut self,
        payload: &str,
        surface: &mut impl MapSurface,
    ) -> Result<(), GeoJsonError> {
        let boundary = Boundary::from_geojson_str(payload)?;
        self.polygon_created(boundary, surface);
        Ok(())
    }

    /// Moves the marker to `sample`, then evaluates it against the boundary.
    pub fn check_location(
        &mut self,
        sample: PositionSample,
        surface: &mut impl MapSurface,
    ) -> &Status {
        let (previous, marker) = self.markers.replace(sample.position);
        debug!(layer = self.markers.id().0, marker = marker.id.0, "marker replaced");
        if let Some(previous) = previous {
            surface.remove_marker(previous.id);
        }
        surface.add_marker(&marker);

        let Some(evaluator) = &self.evaluator else {
            self.last_evaluation = None;
            self.status = TrackingError::NoBoundary.into();
            return &self.status;
        };

        let eval = evaluator.evaluate(sample.position);
        debug!(
            position = %sample.position,
            side = ?eval.side,
            distance_m = eval.distance_m,
            "evaluated sample"
        );
        self.status = Status::from_evaluation(&eval);
        self.last_evaluation = Some(eval);
        &self.status
    }

    pub fn start_tracking(&mut self, caps: Capabilities) -> Vec<PollerAction> {
        let out = self.poller.start(caps);
        self.apply(out)
    }

    pub fn permission_resolved(&mut self, permission: PermissionState) -> Vec<PollerAction> {
        let out = self.poller.permission_resolved(permission);
        self.apply(out)
    }

    pub fn permission_changed(&mut self) -> Vec<PollerAction> {
        let out = self.poller.permission_changed();
        self.apply(out)
    }

    pub fn permission_query_failed(&mut self) -> Vec<PollerAction> {
        let out = self.poller.permission_query_failed();
        self.apply(out)
    }

    pub fn tick(&mut self) -> Vec<PollerAction> {
        let out = self.poller.tick();
        self.apply(out)
    }

    /// A requested position arrived. Returns `false` (and ignores the sample)
    /// if no request was outstanding.
    pub fn position_fixed(
        &mut self,
        sample: PositionSample,
        surface: &mut impl MapSurface,
    ) -> bool {
        if !self.poller.position_fixed() {
            debug!("ignoring unsolicited position");
            return false;
        }
        self.check_location(sample, surface);
        true
    }

    /// A requested position arrived but was unusable. The sample is dropped,
    /// the status is left as it was and polling continues.
    pub fn position_discarded(&mut self) -> bool {
        self.poller.position_discarded()
    }

    pub fn position_failed(&mut self, message: impl Into<String>) -> Vec<PollerAction> {
        let out = self.poller.position_failed(message);
        self.apply(out)
    }

    fn apply(&mut self, out: PollerOutput) -> Vec<PollerAction> {
        if let Some(notice) = out.notice {
            self.status = TrackingError::from(notice).into();
        }
        out.actions
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::config::SessionConfig;
    use crate::error::TrackingError;
    use crate::status::{Classification, Status};
    use formats::Boundary;
    use foundation::math::GeoPoint;
    use foundation::sample::PositionSample;
    use foundation::time::Time;
    use layers::{HeadlessSurface, SurfaceOp};
    use pretty_assertions::assert_eq;
    use runtime::{Capabilities, PermissionState, PollerAction, PollerState};

    fn square(offset: f64) -> Boundary {
        Boundary::from_exterior(vec![
            GeoPoint::new(offset, 0.0),
            GeoPoint::new(offset, 10.0),
            GeoPoint::new(offset + 10.0, 10.0),
            GeoPoint::new(offset + 10.0, 0.0),
        ])
        .unwrap()
    }

    fn sample(lat: f64, lng: f64) -> PositionSample {
        PositionSample::new(lat, lng, Time::ZERO)
    }

    fn setup() -> (Session, HeadlessSurface) {
        let config = SessionConfig::default();
        let surface = HeadlessSurface::default();
        (Session::new(config), surface)
    }

    #[test]
    fn no_boundary_always_asks_for_one() {
        let (mut session, mut surface) = setup();
        for (lat, lng) in [(5.0, 5.0), (-45.0, 170.0), (0.0, 0.0)] {
            let status = session.check_location(sample(lat, lng), &mut surface);
            assert_eq!(status, &Status::Error(TrackingError::NoBoundary));
            assert_eq!(status.to_string(), "Draw a boundary first!");
        }
        // The marker still follows the samples.
        assert_eq!(surface.markers().len(), 1);
        assert_eq!(surface.markers()[0].position, GeoPoint::new(0.0, 0.0));
    }

    #[test]
    fn drawing_prompts_for_location() {
        let (mut session, mut surface) = setup();
        session.polygon_created(square(0.0), &mut surface);
        assert_eq!(session.status(), &Status::BoundaryDrawn);
        assert_eq!(
            surface.ops(),
            &[SurfaceOp::ClearBoundary, SurfaceOp::ShowBoundary { vertices: 4 }]
        );
    }

    #[test]
    fn square_example() {
        let (mut session, mut surface) = setup();
        session.polygon_created(square(0.0), &mut surface);

        let status = session.check_location(sample(5.0, 5.0), &mut surface).clone();
        assert_eq!(status.classification(), Classification::Inside);
        let Status::Inside { distance_m } = status else {
            panic!("expected inside, got {status:?}");
        };
        assert!(distance_m > 0.0);

        let status = session.check_location(sample(20.0, 20.0), &mut surface).clone();
        assert_eq!(status.classification(), Classification::Outside);
        let Status::Outside { distance_m } = status else {
            panic!("expected outside, got {status:?}");
        };
        assert!(distance_m > 0.0);
    }

    #[test]
    fn second_polygon_replaces_first() {
        let (mut session, mut surface) = setup();
        session.polygon_created(square(0.0), &mut surface);
        session.polygon_created(square(50.0), &mut surface);

        assert_eq!(session.boundary(), Some(&square(50.0)));
        assert_eq!(surface.boundary(), Some(&square(50.0)));

        // Inside the first square only: now outside.
        let status = session.check_location(sample(5.0, 5.0), &mut surface);
        assert_eq!(status.classification(), Classification::Outside);
        let status = session.check_location(sample(5.0, 55.0), &mut surface);
        assert_eq!(status.classification(), Classification::Inside);
    }

    #[test]
    fn geojson_polygon_is_accepted() {
        let (mut session, mut surface) = setup();
        session
            .polygon_created_geojson(&square(0.0).to_geojson_string().unwrap(), &mut surface)
            .unwrap();
        assert_eq!(session.boundary(), Some(&square(0.0)));
        assert!(
            session
                .polygon_created_geojson("{\"type\":\"Point\"}", &mut surface)
                .is_err()
        );
        assert_eq!(session.boundary(), Some(&square(0.0)));
    }

    #[test]
    fn polygon_drawn_on_another_world_copy_is_used() {
        let (mut session, mut surface) = setup();
        // Drawn one world to the east of the default view.
        let payload = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [246.16, 52.378], [246.17, 52.378], [246.17, 52.381],
                    [246.16, 52.381], [246.16, 52.378]
                ]]
            }
        }"#;
        session.polygon_created_geojson(payload, &mut surface).unwrap();
        assert_eq!(session.status(), &Status::BoundaryDrawn);
        let stored = session.boundary().unwrap();
        assert!(stored.exterior()[0].approx_eq(&GeoPoint::new(-113.84, 52.378), 1e-9));
        assert_eq!(surface.boundary(), Some(stored));

        let status = session.check_location(sample(52.3795, -113.835), &mut surface);
        assert_eq!(status.classification(), Classification::Inside);
    }

    #[test]
    fn unusable_fix_is_dropped_without_halting() {
        let (mut session, mut surface) = setup();
        session.polygon_created(square(0.0), &mut surface);
        session.start_tracking(Capabilities {
            geolocation: true,
            permissions_query: false,
        });

        assert!(session.position_discarded());
        assert_eq!(session.status(), &Status::BoundaryDrawn);
        assert!(surface.markers().is_empty());
        assert_eq!(session.poller().state(), PollerState::Polling);
        assert_eq!(session.tick(), vec![PollerAction::RequestPosition]);
    }

    #[test]
    fn marker_never_accumulates() {
        let (mut session, mut surface) = setup();
        session.polygon_created(square(0.0), &mut surface);
        for i in 0..10 {
            session.check_location(sample(i as f64, 1.0), &mut surface);
            assert_eq!(surface.markers().len(), 1);
        }
        assert_eq!(session.marker().map(|m| m.position.lat_deg), Some(9.0));
    }

    #[test]
    fn permission_flow_reaches_polling() {
        let (mut session, mut surface) = setup();
        session.polygon_created(square(0.0), &mut surface);

        assert_eq!(
            session.start_tracking(Capabilities::full()),
            vec![PollerAction::QueryPermission]
        );
        let actions = session.permission_resolved(PermissionState::Granted);
        assert_eq!(actions[0], PollerAction::RequestPosition);
        assert!(session.position_fixed(sample(5.0, 5.0), &mut surface));
        assert_eq!(session.status().classification(), Classification::Inside);
        assert_eq!(session.poller().state(), PollerState::Polling);
    }

    #[test]
    fn unsupported_and_denied_statuses() {
        let (mut session, _) = setup();
        session.start_tracking(Capabilities {
            geolocation: false,
            permissions_query: false,
        });
        assert_eq!(session.status().to_string(), "Geolocation not supported!");

        let (mut session, _) = setup();
        session.start_tracking(Capabilities::full());
        session.permission_resolved(PermissionState::Denied);
        assert_eq!(
            session.status().to_string(),
            "Location access denied. Enable it in browser settings."
        );

        let (mut session, _) = setup();
        session.start_tracking(Capabilities::full());
        session.permission_query_failed();
        assert_eq!(
            session.status().to_string(),
            "Error checking geolocation permission."
        );
    }

    #[test]
    fn failed_fetch_stops_timer_updates() {
        let (mut session, mut surface) = setup();
        session.polygon_created(square(0.0), &mut surface);
        session.start_tracking(Capabilities {
            geolocation: true,
            permissions_query: false,
        });

        let actions = session.position_failed("Position unavailable");
        assert_eq!(actions, vec![PollerAction::CancelInterval]);
        let failed = Status::Error(TrackingError::PositionFetchFailed(
            "Position unavailable".to_string(),
        ));
        assert_eq!(session.status(), &failed);

        for _ in 0..3 {
            assert!(session.tick().is_empty());
        }
        // A stray fix without an outstanding request changes nothing.
        assert!(!session.position_fixed(sample(5.0, 5.0), &mut surface));
        assert_eq!(session.status(), &failed);
    }
}
