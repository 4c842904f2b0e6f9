use foundation::math::GeoPoint;

use crate::layer::{Layer, LayerId};
use crate::symbology::MarkerStyle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MarkerId(pub u64);

/// The on-map dot at the latest position sample.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMarker {
    pub id: MarkerId,
    pub position: GeoPoint,
    pub style: MarkerStyle,
}

/// Holds at most one user marker; every update replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLayer {
    id: LayerId,
    style: MarkerStyle,
    current: Option<UserMarker>,
    next_marker: u64,
}

impl MarkerLayer {
    pub fn new(id: u64, style: MarkerStyle) -> Self {
        Self {
            id: LayerId(id),
            style,
            current: None,
            next_marker: 0,
        }
    }

    pub fn current(&self) -> Option<&UserMarker> {
        self.current.as_ref()
    }

    /// Swaps in a marker at `position`, returning the one it displaced.
    pub fn replace(&mut self, position: GeoPoint) -> (Option<UserMarker>, UserMarker) {
        let marker = UserMarker {
            id: MarkerId(self.next_marker),
            position,
            style: self.style.clone(),
        };
        self.next_marker += 1;
        let previous = self.current.replace(marker.clone());
        (previous, marker)
    }
}

impl Layer for MarkerLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}
