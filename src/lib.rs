//! Global equirectangular grid rendering: decode packed cell data, reproject
//! it through d3-style projections, composite layered maps, and resolve
//! pointer positions back to cells.

pub mod codec;
pub mod color;
pub mod data;
pub mod geo;
pub mod grid;
pub mod map;
pub mod scheduler;

pub use codec::{
    decode_packed_words, decode_sparse_rgba, packed_to_features, packed_to_grid, PackedRecord,
    sparse_rgba_to_features, sparse_rgba_to_grid,
};
pub use color::{ColorScale, QuantizedScale};
pub use grid::{raster_len, Grid, MAX_CELLS};
pub use map::{
    active_grid, pick, resolve_cell, Equirectangular, Layer, LayerContent, LayerId, LayerOptions,
    LayerStack, Orthographic, PixelCanvas, Projection, Rasterizer, VectorData, ViewState,
};
pub use scheduler::{Clock, RedrawScheduler, RenderPass, SystemClock};
