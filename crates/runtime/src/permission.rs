/// Geolocation permission as reported by the host's permission query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

impl PermissionState {
    /// `granted` and `prompt` both allow a position request to be attempted.
    pub fn allows_request(self) -> bool {
        matches!(self, PermissionState::Granted | PermissionState::Prompt)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "granted" => Some(PermissionState::Granted),
            "prompt" => Some(PermissionState::Prompt),
            "denied" => Some(PermissionState::Denied),
            _ => None,
        }
    }
}

/// What the host platform offers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub geolocation: bool,
    pub permissions_query: bool,
}

impl Capabilities {
    pub const fn full() -> Self {
        Self {
            geolocation: true,
            permissions_query: true,
        }
    }
}
