use formats::Boundary;
use foundation::math::GeoPoint;
use geo::{LineString, Polygon};

use crate::analysis::{Containment, SpatialAnalysis};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Inside,
    Outside,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Evaluation {
    pub side: Side,
    pub containment: Containment,
    /// Distance to the outline as computed, in meters.
    pub distance_m: f64,
}

impl Evaluation {
    /// Distance shown to the user: absolute when inside, raw when outside.
    pub fn reported_distance_m(&self) -> f64 {
        match self.side {
            Side::Inside => self.distance_m.abs(),
            Side::Outside => self.distance_m,
        }
    }
}

/// Containment and distance-to-edge for one boundary.
///
/// The geometry is converted once when the boundary is set; each sample then
/// costs one point-in-polygon test and one closest-point search per ring.
#[derive(Debug, Clone)]
pub struct GeofenceEvaluator {
    polygon: Polygon<f64>,
    outline: Vec<LineString<f64>>,
}

impl GeofenceEvaluator {
    pub fn new(boundary: &Boundary) -> Self {
        let polygon = SpatialAnalysis::polygon(boundary);
        let outline = SpatialAnalysis::outline(&polygon);
        Self { polygon, outline }
    }

    pub fn evaluate(&self, point: GeoPoint) -> Evaluation {
        let containment = SpatialAnalysis::containment(&self.polygon, point);
        let distance_m = SpatialAnalysis::distance_to_outline_m(&self.outline, point);
        let side = if containment.is_inside() {
            Side::Inside
        } else {
            Side::Outside
        };
        Evaluation {
            side,
            containment,
            distance_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GeofenceEvaluator, Side};
    use crate::analysis::Containment;
    use formats::Boundary;
    use foundation::math::GeoPoint;

    fn square_evaluator() -> GeofenceEvaluator {
        let boundary = Boundary::from_exterior(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ])
        .unwrap();
        GeofenceEvaluator::new(&boundary)
    }

    #[test]
    fn center_of_square_is_inside() {
        let eval = square_evaluator().evaluate(GeoPoint::new(5.0, 5.0));
        assert_eq!(eval.side, Side::Inside);
        assert!(eval.reported_distance_m() > 0.0);
    }

    #[test]
    fn far_point_is_outside() {
        let eval = square_evaluator().evaluate(GeoPoint::new(20.0, 20.0));
        assert_eq!(eval.side, Side::Outside);
        assert!(eval.reported_distance_m() > 0.0);
    }

    #[test]
    fn point_on_edge_is_inside_at_zero_distance() {
        let eval = square_evaluator().evaluate(GeoPoint::new(5.0, 0.0));
        assert_eq!(eval.containment, Containment::OnEdge);
        assert_eq!(eval.side, Side::Inside);
        assert!(eval.reported_distance_m() < 1.0, "distance {}", eval.distance_m);
    }

    #[test]
    fn small_field_distances_are_in_meters() {
        // Roughly 270 m x 330 m field near the default map center.
        let boundary = Boundary::from_exterior(vec![
            GeoPoint::new(-113.836, 52.378),
            GeoPoint::new(-113.832, 52.378),
            GeoPoint::new(-113.832, 52.381),
            GeoPoint::new(-113.836, 52.381),
        ])
        .unwrap();
        let evaluator = GeofenceEvaluator::new(&boundary);

        // 0.0005 deg of latitude north of the north edge is about 55.6 m.
        let eval = evaluator.evaluate(GeoPoint::new(-113.834, 52.3815));
        assert_eq!(eval.side, Side::Outside);
        assert!((eval.distance_m - 55.6).abs() < 1.0, "distance {}", eval.distance_m);
    }
}
