use foundation::math::GeoPoint;
use serde_json::{Map, Value};

/// The single polygon defining a geofence.
///
/// Rings are stored closed (first vertex repeated at the end). The first ring
/// is the exterior; any further rings are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    rings: Vec<Vec<GeoPoint>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryError {
    NoRings,
    TooFewVertices { ring: usize, count: usize },
    InvalidCoordinate { ring: usize, index: usize },
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryError::NoRings => write!(f, "polygon has no rings"),
            BoundaryError::TooFewVertices { ring, count } => {
                write!(f, "ring {ring} has {count} distinct vertices, need at least 3")
            }
            BoundaryError::InvalidCoordinate { ring, index } => {
                write!(f, "ring {ring} vertex {index} is not a valid lon/lat")
            }
        }
    }
}

impl std::error::Error for BoundaryError {}

#[derive(Debug, Clone, PartialEq)]
pub enum GeoJsonError {
    Json(String),
    UnexpectedType(String),
    NoPolygon,
    InvalidGeometry(String),
    Boundary(BoundaryError),
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Json(msg) => write!(f, "JSON parse error: {msg}"),
            GeoJsonError::UnexpectedType(ty) => {
                write!(f, "expected a Polygon, Feature or FeatureCollection, got {ty}")
            }
            GeoJsonError::NoPolygon => write!(f, "no Polygon feature found"),
            GeoJsonError::InvalidGeometry(reason) => write!(f, "invalid geometry: {reason}"),
            GeoJsonError::Boundary(err) => write!(f, "invalid boundary: {err}"),
        }
    }
}

impl std::error::Error for GeoJsonError {}

impl From<BoundaryError> for GeoJsonError {
    fn from(err: BoundaryError) -> Self {
        GeoJsonError::Boundary(err)
    }
}

impl Boundary {
    /// Builds a boundary from rings, closing any open ring.
    ///
    /// Self-intersecting rings are accepted as-is. A polygon drawn on another
    /// world copy is shifted by whole turns of longitude until its exterior is
    /// centered within [-180, 180].
    pub fn new(rings: Vec<Vec<GeoPoint>>) -> Result<Self, BoundaryError> {
        if rings.is_empty() {
            return Err(BoundaryError::NoRings);
        }
        for (ring_i, ring) in rings.iter().enumerate() {
            if let Some(index) = ring.iter().position(|p| !p.has_valid_latitude()) {
                return Err(BoundaryError::InvalidCoordinate {
                    ring: ring_i,
                    index,
                });
            }
        }

        let turns = world_copy_turns(&rings[0]);
        let mut out = Vec::with_capacity(rings.len());
        for (ring_i, ring) in rings.into_iter().enumerate() {
            let mut ring: Vec<GeoPoint> = if turns == 0.0 {
                ring
            } else {
                ring.iter().map(|p| p.shifted_turns(turns)).collect()
            };
            close_ring(&mut ring);
            let distinct = ring.len().saturating_sub(1);
            if distinct < 3 {
                return Err(BoundaryError::TooFewVertices {
                    ring: ring_i,
                    count: distinct,
                });
            }
            out.push(ring);
        }

        Ok(Self { rings: out })
    }

    pub fn from_exterior(vertices: Vec<GeoPoint>) -> Result<Self, BoundaryError> {
        Self::new(vec![vertices])
    }

    pub fn exterior(&self) -> &[GeoPoint] {
        &self.rings[0]
    }

    pub fn rings(&self) -> &[Vec<GeoPoint>] {
        &self.rings
    }

    /// Distinct vertices of the exterior ring.
    pub fn vertex_count(&self) -> usize {
        self.exterior().len() - 1
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| GeoJsonError::Json(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    /// Accepts a `Feature`, a bare `Polygon` geometry, or a
    /// `FeatureCollection` (the first polygon feature is used).
    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value
            .as_object()
            .ok_or_else(|| GeoJsonError::UnexpectedType("non-object".to_string()))?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GeoJsonError::UnexpectedType("untyped object".to_string()))?;

        match ty {
            "Polygon" => Ok(Self::new(parse_polygon_geometry(obj)?)?),
            "Feature" => {
                let geometry = obj
                    .get("geometry")
                    .and_then(|v| v.as_object())
                    .ok_or_else(|| {
                        GeoJsonError::InvalidGeometry("feature missing geometry".to_string())
                    })?;
                Ok(Self::new(parse_polygon_geometry(geometry)?)?)
            }
            "FeatureCollection" => {
                let features = obj
                    .get("features")
                    .and_then(|v| v.as_array())
                    .ok_or_else(|| {
                        GeoJsonError::InvalidGeometry("collection missing features".to_string())
                    })?;
                let geometry = features
                    .iter()
                    .filter_map(|f| f.get("geometry").and_then(|g| g.as_object()))
                    .find(|g| g.get("type").and_then(|t| t.as_str()) == Some("Polygon"))
                    .ok_or(GeoJsonError::NoPolygon)?;
                Ok(Self::new(parse_polygon_geometry(geometry)?)?)
            }
            other => Err(GeoJsonError::UnexpectedType(other.to_string())),
        }
    }

    /// Emits a GeoJSON `Feature` with a `Polygon` geometry and empty properties.
    pub fn to_geojson_value(&self) -> Value {
        let mut geometry = Map::new();
        geometry.insert("type".to_string(), Value::String("Polygon".to_string()));
        let coords = self
            .rings
            .iter()
            .map(|ring| Value::Array(ring.iter().map(point_coords).collect()))
            .collect();
        geometry.insert("coordinates".to_string(), Value::Array(coords));

        let mut feature = Map::new();
        feature.insert("type".to_string(), Value::String("Feature".to_string()));
        feature.insert("properties".to_string(), Value::Object(Map::new()));
        feature.insert("geometry".to_string(), Value::Object(geometry));
        Value::Object(feature)
    }

    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_geojson_value())
    }
}

/// Whole turns that bring the exterior's longitude span back onto the main
/// world copy. Zero when every vertex already lies there.
fn world_copy_turns(exterior: &[GeoPoint]) -> f64 {
    if exterior.iter().all(|p| p.is_valid()) {
        return 0.0;
    }
    let (min, max) = exterior
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.lon_deg), hi.max(p.lon_deg))
        });
    -((min + max) * 0.5 / 360.0).round()
}

fn close_ring(ring: &mut Vec<GeoPoint>) {
    let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) else {
        return;
    };
    if ring.len() > 1 && !first.approx_eq(&last, 1e-12) {
        ring.push(first);
    }
}

fn point_coords(p: &GeoPoint) -> Value {
    Value::Array(p.lon_lat().into_iter().map(Value::from).collect())
}

fn parse_polygon_geometry(obj: &Map<String, Value>) -> Result<Vec<Vec<GeoPoint>>, GeoJsonError> {
    let ty = obj.get("type").and_then(|v| v.as_str()).unwrap_or("untyped");
    if ty != "Polygon" {
        return Err(GeoJsonError::UnexpectedType(ty.to_string()));
    }
    let coords = obj
        .get("coordinates")
        .ok_or_else(|| GeoJsonError::InvalidGeometry("geometry missing coordinates".to_string()))?;
    parse_rings(coords).map_err(GeoJsonError::InvalidGeometry)
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_point(item)?);
    }
    Ok(out)
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<GeoPoint>>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_points(ring)?);
    }
    Ok(out)
}
