use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

/// One recorded answer from a position request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackEntry {
    Fix { lat: f64, lng: f64 },
    Failure { error: String },
}

impl TrackEntry {
    pub fn position(&self) -> Option<GeoPoint> {
        match self {
            TrackEntry::Fix { lat, lng } => Some(GeoPoint::from_lat_lng(*lat, *lng)),
            TrackEntry::Failure { .. } => None,
        }
    }
}

/// A recorded sequence of position-request outcomes, replayed in order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    pub entries: Vec<TrackEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    Json(String),
    InvalidFix { index: usize },
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackError::Json(msg) => write!(f, "track JSON error: {msg}"),
            TrackError::InvalidFix { index } => {
                write!(f, "track entry {index} is not a valid lat/lng")
            }
        }
    }
}

impl std::error::Error for TrackError {}

impl Track {
    pub fn from_json_str(payload: &str) -> Result<Self, TrackError> {
        let track: Track =
            serde_json::from_str(payload).map_err(|e| TrackError::Json(e.to_string()))?;
        for (index, entry) in track.entries.iter().enumerate() {
            if let Some(p) = entry.position() {
                if !p.is_valid() {
                    return Err(TrackError::InvalidFix { index });
                }
            }
        }
        Ok(track)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
