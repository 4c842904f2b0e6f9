use formats::Boundary;

use crate::layer::{Layer, LayerId};

/// The drawn-items group. Holds at most one boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayer {
    id: LayerId,
    current: Option<Boundary>,
}

impl BoundaryLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Boundary> {
        self.current.as_ref()
    }

    /// Atomically swaps in `boundary`, returning the one it replaced.
    pub fn replace(&mut self, boundary: Boundary) -> Option<Boundary> {
        self.current.replace(boundary)
    }
}

impl Layer for BoundaryLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}
