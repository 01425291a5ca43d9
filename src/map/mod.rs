pub mod canvas;
pub mod geometry;
pub mod layer;
pub mod picker;
pub mod projection;
mod raster;
pub mod simplify;

pub use canvas::PixelCanvas;
pub use layer::{Layer, LayerContent, LayerId, LayerOptions, LayerStack, VectorData};
pub use picker::{active_grid, pick, resolve_cell};
pub use projection::{Equirectangular, Orthographic, Projection, ViewState};
pub use raster::Rasterizer;
