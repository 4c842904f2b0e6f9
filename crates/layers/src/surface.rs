use formats::Boundary;
use foundation::math::GeoPoint;

use crate::objects::{MarkerId, UserMarker};

/// The display side of the map: whatever actually draws the boundary and the
/// position marker.
pub trait MapSurface {
    fn clear_boundary(&mut self);
    fn show_boundary(&mut self, boundary: &Boundary);
    fn add_marker(&mut self, marker: &UserMarker);
    fn remove_marker(&mut self, id: MarkerId);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    ClearBoundary,
    ShowBoundary { vertices: usize },
    AddMarker { id: MarkerId, position: GeoPoint },
    RemoveMarker(MarkerId),
}

/// A [`MapSurface`] with no display. Tracks what would be on screen and logs
/// every operation in order.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    boundary: Option<Boundary>,
    markers: Vec<UserMarker>,
    ops: Vec<SurfaceOp>,
}

impl HeadlessSurface {
    pub fn boundary(&self) -> Option<&Boundary> {
        self.boundary.as_ref()
    }

    /// Every marker currently displayed.
    pub fn markers(&self) -> &[UserMarker] {
        &self.markers
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }
}

impl MapSurface for HeadlessSurface {
    fn clear_boundary(&mut self) {
        self.boundary = None;
        self.ops.push(SurfaceOp::ClearBoundary);
    }

    fn show_boundary(&mut self, boundary: &Boundary) {
        self.boundary = Some(boundary.clone());
        self.ops.push(SurfaceOp::ShowBoundary {
            vertices: boundary.vertex_count(),
        });
    }

    fn add_marker(&mut self, marker: &UserMarker) {
        self.markers.push(marker.clone());
        self.ops.push(SurfaceOp::AddMarker {
            id: marker.id,
            position: marker.position,
        });
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.retain(|m| m.id != id);
        self.ops.push(SurfaceOp::RemoveMarker(id));
    }
}
