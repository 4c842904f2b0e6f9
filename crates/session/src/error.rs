use runtime::PollerNotice;

/// Everything that can stop the tracker from reporting a position.
///
/// None of these are fatal; each replaces the status text, and its `Display`
/// is exactly that text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    GeolocationUnsupported,
    PermissionDenied,
    PermissionQueryFailed,
    PositionFetchFailed(String),
    NoBoundary,
}

impl std::fmt::Display for TrackingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingError::GeolocationUnsupported => write!(f, "Geolocation not supported!"),
            TrackingError::PermissionDenied => {
                write!(f, "Location access denied. Enable it in browser settings.")
            }
            TrackingError::PermissionQueryFailed => {
                write!(f, "Error checking geolocation permission.")
            }
            TrackingError::PositionFetchFailed(msg) => write!(f, "GPS Error: {msg}"),
            TrackingError::NoBoundary => write!(f, "Draw a boundary first!"),
        }
    }
}

impl std::error::Error for TrackingError {}

impl From<PollerNotice> for TrackingError {
    fn from(notice: PollerNotice) -> Self {
        match notice {
            PollerNotice::Unsupported => TrackingError::GeolocationUnsupported,
            PollerNotice::PermissionDenied => TrackingError::PermissionDenied,
            PollerNotice::PermissionQueryFailed => TrackingError::PermissionQueryFailed,
            PollerNotice::FetchFailed(msg) => TrackingError::PositionFetchFailed(msg),
        }
    }
}
