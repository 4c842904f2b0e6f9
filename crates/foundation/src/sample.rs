use crate::math::GeoPoint;
use crate::time::Time;

/// One reading from the device location capability.
///
/// Samples are transient: they are evaluated once and then dropped.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionSample {
    pub position: GeoPoint,
    pub captured_at: Time,
}

impl PositionSample {
    pub fn new(lat_deg: f64, lng_deg: f64, captured_at: Time) -> Self {
        Self {
            position: GeoPoint::from_lat_lng(lat_deg, lng_deg),
            captured_at,
        }
    }
}
