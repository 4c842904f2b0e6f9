use formats::Boundary;
use foundation::math::{GeoPoint, haversine_m};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Closest, Coord, HaversineClosestPoint, HaversineDistance, LineString, Point, Polygon};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Containment {
    Inside,
    OnEdge,
    Outside,
}

impl Containment {
    /// Edge points count as inside.
    pub fn is_inside(self) -> bool {
        matches!(self, Containment::Inside | Containment::OnEdge)
    }
}

pub struct SpatialAnalysis;

impl SpatialAnalysis {
    pub fn polygon(boundary: &Boundary) -> Polygon<f64> {
        let mut rings = boundary.rings().iter().map(|r| line_string(r));
        let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
        Polygon::new(exterior, rings.collect())
    }

    /// Every ring of the polygon as a line string: exterior first, then holes.
    pub fn outline(polygon: &Polygon<f64>) -> Vec<LineString<f64>> {
        let mut out = Vec::with_capacity(1 + polygon.interiors().len());
        out.push(polygon.exterior().clone());
        out.extend(polygon.interiors().iter().cloned());
        out
    }

    pub fn containment(polygon: &Polygon<f64>, p: GeoPoint) -> Containment {
        match polygon.coordinate_position(&coord(p)) {
            CoordPos::Inside => Containment::Inside,
            CoordPos::OnBoundary => Containment::OnEdge,
            CoordPos::Outside => Containment::Outside,
        }
    }

    /// Great-circle distance (meters) from `p` to the nearest point on any ring.
    pub fn distance_to_outline_m(outline: &[LineString<f64>], p: GeoPoint) -> f64 {
        let from = Point::from(coord(p));
        outline
            .iter()
            .map(|ring| match ring.haversine_closest_point(&from) {
                Closest::Intersection(_) => 0.0,
                Closest::SinglePoint(closest) => from.haversine_distance(&closest),
                Closest::Indeterminate => nearest_vertex_m(ring, p),
            })
            .fold(f64::INFINITY, f64::min)
    }
}

fn coord(p: GeoPoint) -> Coord<f64> {
    Coord {
        x: p.lon_deg,
        y: p.lat_deg,
    }
}

fn line_string(ring: &[GeoPoint]) -> LineString<f64> {
    LineString::new(ring.iter().copied().map(coord).collect())
}

fn nearest_vertex_m(ring: &LineString<f64>, p: GeoPoint) -> f64 {
    ring.coords()
        .map(|c| haversine_m(p, GeoPoint::new(c.x, c.y)))
        .fold(f64::INFINITY, f64::min)
}
