use std::time::Duration;

use tracing::{debug, info, warn};

use crate::permission::{Capabilities, PermissionState};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PollerState {
    Unchecked,
    /// Waiting on the host's permission query.
    Querying,
    Polling,
    Denied,
    Unsupported,
    QueryFailed,
    /// A position request failed; no further automatic requests.
    Halted,
}

/// Work the host must perform on the poller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerAction {
    QueryPermission,
    RequestPosition,
    StartInterval(Duration),
    CancelInterval,
}

/// User-visible outcome of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerNotice {
    Unsupported,
    PermissionDenied,
    PermissionQueryFailed,
    FetchFailed(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollerOutput {
    pub actions: Vec<PollerAction>,
    pub notice: Option<PollerNotice>,
}

impl PollerOutput {
    fn none() -> Self {
        Self::default()
    }

    fn notice(notice: PollerNotice) -> Self {
        Self {
            actions: Vec::new(),
            notice: Some(notice),
        }
    }
}

/// Location polling as an explicit state machine.
///
/// The poller never touches timers or devices itself: every transition
/// returns the [`PollerAction`]s the host has to carry out, and the host
/// reports results back through the `permission_*`, `tick` and `position_*`
/// methods. At most one interval runs and at most one position request is in
/// flight at any time.
#[derive(Debug, Clone)]
pub struct LocationPoller {
    period: Duration,
    state: PollerState,
    interval_running: bool,
    in_flight: bool,
    requests_issued: u64,
    skipped_ticks: u64,
}

impl Default for LocationPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl LocationPoller {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: PollerState::Unchecked,
            interval_running: false,
            in_flight: false,
            requests_issued: 0,
            skipped_ticks: 0,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn interval_running(&self) -> bool {
        self.interval_running
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn requests_issued(&self) -> u64 {
        self.requests_issued
    }

    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks
    }

    /// Startup procedure: capability check, then permission query or
    /// unconditional polling.
    pub fn start(&mut self, caps: Capabilities) -> PollerOutput {
        if !caps.geolocation {
            info!("geolocation unavailable");
            let mut out = PollerOutput::notice(PollerNotice::Unsupported);
            self.stop_interval(&mut out.actions);
            self.transition(PollerState::Unsupported);
            return out;
        }

        if caps.permissions_query {
            self.transition(PollerState::Querying);
            return PollerOutput {
                actions: vec![PollerAction::QueryPermission],
                notice: None,
            };
        }

        self.begin_polling()
    }

    /// The permission state changed under us: re-run startup from the query.
    pub fn permission_changed(&mut self) -> PollerOutput {
        if self.state == PollerState::Unsupported {
            return PollerOutput::none();
        }
        self.transition(PollerState::Querying);
        PollerOutput {
            actions: vec![PollerAction::QueryPermission],
            notice: None,
        }
    }

    /// Applies every answer in arrival order, so the newest answer wins.
    pub fn permission_resolved(&mut self, permission: PermissionState) -> PollerOutput {
        debug!(?permission, "permission resolved");
        if self.state == PollerState::Unsupported {
            return PollerOutput::none();
        }

        if permission.allows_request() {
            return self.begin_polling();
        }

        let mut out = PollerOutput::notice(PollerNotice::PermissionDenied);
        self.stop_interval(&mut out.actions);
        self.transition(PollerState::Denied);
        out
    }

    /// An interval that was already running keeps running.
    pub fn permission_query_failed(&mut self) -> PollerOutput {
        warn!("permission query failed");
        self.transition(PollerState::QueryFailed);
        PollerOutput::notice(PollerNotice::PermissionQueryFailed)
    }

    /// The host's interval fired.
    pub fn tick(&mut self) -> PollerOutput {
        if !self.interval_running {
            return PollerOutput::none();
        }
        if self.in_flight {
            self.skipped_ticks += 1;
            debug!(skipped = self.skipped_ticks, "position request still in flight, skipping tick");
            return PollerOutput::none();
        }
        PollerOutput {
            actions: vec![self.request_position()],
            notice: None,
        }
    }

    /// A position request succeeded. Returns whether the sample answers a
    /// request this poller issued.
    pub fn position_fixed(&mut self) -> bool {
        std::mem::replace(&mut self.in_flight, false)
    }

    /// The host got an answer it cannot use. The request is settled without a
    /// sample and polling carries on. Returns whether a request was
    /// outstanding.
    pub fn position_discarded(&mut self) -> bool {
        let was_in_flight = std::mem::replace(&mut self.in_flight, false);
        if was_in_flight {
            warn!("discarding unusable position");
        }
        was_in_flight
    }

    /// A position request failed: stop polling for good.
    pub fn position_failed(&mut self, message: impl Into<String>) -> PollerOutput {
        let message = message.into();
        warn!(%message, "position request failed, halting");
        self.in_flight = false;
        let mut out = PollerOutput::notice(PollerNotice::FetchFailed(message));
        self.stop_interval(&mut out.actions);
        self.transition(PollerState::Halted);
        out
    }

    fn begin_polling(&mut self) -> PollerOutput {
        let mut out = PollerOutput::none();
        if self.interval_running {
            debug!("interval already running");
        } else {
            if !self.in_flight {
                out.actions.push(self.request_position());
            }
            self.interval_running = true;
            out.actions.push(PollerAction::StartInterval(self.period));
        }
        self.transition(PollerState::Polling);
        out
    }

    fn request_position(&mut self) -> PollerAction {
        self.in_flight = true;
        self.requests_issued += 1;
        PollerAction::RequestPosition
    }

    fn stop_interval(&mut self, actions: &mut Vec<PollerAction>) {
        if self.interval_running {
            self.interval_running = false;
            actions.push(PollerAction::CancelInterval);
        }
    }

    fn transition(&mut self, next: PollerState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "poller transition");
            self.state = next;
        }
    }
}
