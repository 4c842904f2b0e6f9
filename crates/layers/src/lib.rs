pub mod draw;
pub mod layer;
pub mod objects;
pub mod raster;
pub mod surface;
pub mod symbology;
pub mod vector;
pub mod view;

pub use layer::*;
pub use surface::*;
pub use view::*;
