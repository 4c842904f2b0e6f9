use std::fmt;

/// Mean Earth radius (meters), IUGG.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS84 position in degrees.
///
/// Field order follows the GeoJSON convention (longitude first); use
/// [`GeoPoint::from_lat_lng`] when the source speaks latitude first, as
/// device location APIs do.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn from_lat_lng(lat_deg: f64, lng_deg: f64) -> Self {
        Self::new(lng_deg, lat_deg)
    }

    /// `[lat, lng]`, the order map widgets expect.
    pub fn lat_lng(&self) -> [f64; 2] {
        [self.lat_deg, self.lon_deg]
    }

    /// `[lon, lat]`, the order GeoJSON expects.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon_deg, self.lat_deg]
    }

    pub fn is_valid(&self) -> bool {
        self.has_valid_latitude() && (-180.0..=180.0).contains(&self.lon_deg)
    }

    /// Finite coordinates with latitude in range. Longitude may lie on another
    /// world copy, as map widgets report after panning across the antimeridian.
    pub fn has_valid_latitude(&self) -> bool {
        self.lat_deg.is_finite()
            && self.lon_deg.is_finite()
            && (-90.0..=90.0).contains(&self.lat_deg)
    }

    /// Shifts longitude by whole turns.
    pub fn shifted_turns(&self, turns: f64) -> Self {
        Self::new(self.lon_deg + 360.0 * turns, self.lat_deg)
    }

    pub fn approx_eq(&self, other: &GeoPoint, eps_deg: f64) -> bool {
        (self.lon_deg - other.lon_deg).abs() <= eps_deg
            && (self.lat_deg - other.lat_deg).abs() <= eps_deg
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat_deg, self.lon_deg)
    }
}

/// Great-circle distance in meters on a spherical Earth.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon * 0.5).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
