use std::collections::VecDeque;
use std::time::Duration;

use clap::ValueEnum;
use formats::{Boundary, Track, TrackEntry};
use foundation::sample::PositionSample;
use foundation::time::Time;
use layers::HeadlessSurface;
use runtime::{Capabilities, PermissionState, PollerAction};
use session::{Session, SessionConfig, Status};
use tracing::{debug, info};

/// How the simulated platform answers the permission query.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum HostPermission {
    Granted,
    Prompt,
    Denied,
    /// The query itself errors out.
    QueryFails,
    /// No permissions API at all; polling starts unconditionally.
    Unavailable,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReplayHost {
    pub geolocation: bool,
    pub permission: HostPermission,
}

impl Default for ReplayHost {
    fn default() -> Self {
        Self {
            geolocation: true,
            permission: HostPermission::Granted,
        }
    }
}

impl ReplayHost {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            geolocation: self.geolocation,
            permissions_query: self.permission != HostPermission::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub at: Time,
    pub status: Status,
}

/// Drives a [`Session`] against a recorded track instead of a device.
///
/// Position requests are answered from the track in order. The simulated
/// clock advances by one poll period per interval tick, so a replay is
/// deterministic whether or not it is paced in real time.
#[derive(Debug)]
pub struct Replay {
    session: Session,
    surface: HeadlessSurface,
    host: ReplayHost,
    track: VecDeque<TrackEntry>,
    clock: Time,
    interval: Option<Duration>,
    exhausted: bool,
    log: Vec<StatusLine>,
    last_status: Option<Status>,
}

impl Replay {
    pub fn new(config: SessionConfig, track: Track, host: ReplayHost) -> Self {
        Self {
            session: Session::new(config),
            surface: HeadlessSurface::default(),
            host,
            track: track.entries.into(),
            clock: Time::ZERO,
            interval: None,
            exhausted: false,
            log: Vec::new(),
            last_status: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn surface(&self) -> &HeadlessSurface {
        &self.surface
    }

    pub fn clock(&self) -> Time {
        self.clock
    }

    /// The running interval's period, if any.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn log(&self) -> &[StatusLine] {
        &self.log
    }

    pub fn drain_log(&mut self) -> Vec<StatusLine> {
        std::mem::take(&mut self.log)
    }

    pub fn draw_boundary(&mut self, boundary: Boundary) {
        self.session.polygon_created(boundary, &mut self.surface);
        self.record();
    }

    pub fn start(&mut self) {
        let actions = self.session.start_tracking(self.host.capabilities());
        self.record();
        self.execute(actions);
    }

    /// Fires one interval tick. Returns `false` once nothing more can happen:
    /// the interval was cancelled or the track ran out.
    pub fn step(&mut self) -> bool {
        let Some(period) = self.interval else {
            return false;
        };
        if self.exhausted {
            return false;
        }
        self.clock = Time(self.clock.0 + period.as_secs_f64());
        let actions = self.session.tick();
        self.record();
        self.execute(actions);
        self.interval.is_some() && !self.exhausted
    }

    pub fn run_to_end(&mut self) {
        self.start();
        while self.step() {}
    }

    fn execute(&mut self, actions: Vec<PollerAction>) {
        let mut queue: VecDeque<PollerAction> = actions.into();
        while let Some(action) = queue.pop_front() {
            debug!(?action, at = self.clock.0, "host action");
            let more = match action {
                PollerAction::QueryPermission => self.answer_permission(),
                PollerAction::RequestPosition => self.answer_position(),
                PollerAction::StartInterval(period) => {
                    self.interval = Some(period);
                    Vec::new()
                }
                PollerAction::CancelInterval => {
                    self.interval = None;
                    Vec::new()
                }
            };
            self.record();
            queue.extend(more);
        }
    }

    fn answer_permission(&mut self) -> Vec<PollerAction> {
        match self.host.permission {
            HostPermission::Granted => self.session.permission_resolved(PermissionState::Granted),
            HostPermission::Prompt => self.session.permission_resolved(PermissionState::Prompt),
            HostPermission::Denied => self.session.permission_resolved(PermissionState::Denied),
            HostPermission::QueryFails | HostPermission::Unavailable => {
                self.session.permission_query_failed()
            }
        }
    }

    fn answer_position(&mut self) -> Vec<PollerAction> {
        match self.track.pop_front() {
            Some(TrackEntry::Fix { lat, lng }) => {
                let sample = PositionSample::new(lat, lng, self.clock);
                self.session.position_fixed(sample, &mut self.surface);
                Vec::new()
            }
            Some(TrackEntry::Failure { error }) => self.session.position_failed(error),
            None => {
                info!("track exhausted");
                self.exhausted = true;
                Vec::new()
            }
        }
    }

    fn record(&mut self) {
        let status = self.session.status();
        if self.last_status.as_ref() == Some(status) {
            return;
        }
        self.last_status = Some(status.clone());
        self.log.push(StatusLine {
            at: self.clock,
            status: status.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{HostPermission, Replay, ReplayHost};
    use formats::{Boundary, Track};
    use foundation::math::GeoPoint;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use session::{Classification, SessionConfig, Status, TrackingError};
    use std::time::Duration;

    fn square() -> Boundary {
        Boundary::from_exterior(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ])
        .unwrap()
    }

    fn track(json: &str) -> Track {
        Track::from_json_str(json).unwrap()
    }

    fn classes(replay: &Replay) -> Vec<Classification> {
        replay
            .log()
            .iter()
            .map(|line| line.status.classification())
            .collect()
    }

    #[test]
    fn walks_in_and_out_of_the_square() {
        let mut replay = Replay::new(
            SessionConfig::default(),
            track(r#"[{"lat": 20, "lng": 20}, {"lat": 5, "lng": 5}, {"lat": 5, "lng": 6}, {"lat": 30, "lng": 1}]"#),
            ReplayHost::default(),
        );
        replay.draw_boundary(square());
        replay.run_to_end();

        assert_eq!(replay.log()[0].status, Status::BoundaryDrawn);
        assert_eq!(
            classes(&replay)[1..].to_vec(),
            vec![
                Classification::Outside,
                Classification::Inside,
                Classification::Inside,
                Classification::Outside,
            ]
        );
        // Four answers: one immediate, three on ticks 3 s apart.
        assert_eq!(replay.session().poller().requests_issued(), 5);
        assert_eq!(replay.clock(), Time(12.0));
        assert_eq!(replay.surface().markers().len(), 1);
    }

    #[test]
    fn failure_halts_the_replay() {
        let mut replay = Replay::new(
            SessionConfig::default(),
            track(r#"[{"lat": 5, "lng": 5}, {"error": "Timeout expired"}, {"lat": 5, "lng": 5}]"#),
            ReplayHost::default(),
        );
        replay.draw_boundary(square());
        replay.run_to_end();

        let last = &replay.log().last().unwrap().status;
        assert_eq!(
            last,
            &Status::Error(TrackingError::PositionFetchFailed("Timeout expired".to_string()))
        );
        assert_eq!(replay.interval(), None);
        assert_eq!(replay.session().poller().requests_issued(), 2);
    }

    #[test]
    fn denied_permission_never_polls() {
        let mut replay = Replay::new(
            SessionConfig::default(),
            track(r#"[{"lat": 5, "lng": 5}]"#),
            ReplayHost {
                geolocation: true,
                permission: HostPermission::Denied,
            },
        );
        replay.run_to_end();
        assert_eq!(
            replay.session().status(),
            &Status::Error(TrackingError::PermissionDenied)
        );
        assert_eq!(replay.session().poller().requests_issued(), 0);
        assert!(replay.surface().markers().is_empty());
    }

    #[test]
    fn no_boundary_reports_draw_first() {
        let mut replay = Replay::new(
            SessionConfig::default(),
            track(r#"[{"lat": 5, "lng": 5}]"#),
            ReplayHost {
                geolocation: true,
                permission: HostPermission::Unavailable,
            },
        );
        replay.run_to_end();
        assert_eq!(
            replay.session().status().to_string(),
            "Draw a boundary first!"
        );
    }

    #[test]
    fn uses_configured_period() {
        let config = SessionConfig {
            poll_interval_ms: 500,
            ..SessionConfig::default()
        };
        let mut replay = Replay::new(
            config,
            track(r#"[{"lat": 5, "lng": 5}, {"lat": 5, "lng": 5}]"#),
            ReplayHost::default(),
        );
        replay.start();
        assert_eq!(replay.interval(), Some(Duration::from_millis(500)));
        assert!(replay.step());
        assert_eq!(replay.clock(), Time(0.5));
    }

    #[test]
    fn unsupported_platform() {
        let mut replay = Replay::new(
            SessionConfig::default(),
            Track::default(),
            ReplayHost {
                geolocation: false,
                permission: HostPermission::Granted,
            },
        );
        replay.run_to_end();
        assert_eq!(
            replay.session().status().to_string(),
            "Geolocation not supported!"
        );
    }
}
