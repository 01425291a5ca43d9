use crate::grid::Grid;
use crate::map::layer::{LayerContent, LayerStack};
use crate::map::projection::{Projection, ViewState};
use crate::map::raster::resolve_pixel;

/// The grid that pointer events resolve against: the first grid layer in
/// stacking order. With several grid layers loaded, lower-z grids shadow the
/// ones above for picking even though all of them render; hosts that need
/// per-layer picking should call [`resolve_cell`] with the grid themselves.
pub fn active_grid(stack: &LayerStack) -> Option<&Grid> {
    stack.iter().find_map(|layer| match &layer.content {
        LayerContent::Grid(grid) => Some(grid),
        _ => None,
    })
}

/// Map a screen position to the 1-based cell id of `grid` under it. Returns
/// `None` off the globe, outside the clip extent, or when the inverse
/// projection produces non-finite coordinates.
pub fn resolve_cell(
    x: f64,
    y: f64,
    proj: &dyn Projection,
    view: &ViewState,
    grid: &Grid,
) -> Option<u32> {
    resolve_pixel(proj, view.clip_extent, x, y, grid.rows(), grid.cols())
}

/// Resolve a screen position against the stack's active grid in one step.
pub fn pick(
    stack: &LayerStack,
    x: f64,
    y: f64,
    proj: &dyn Projection,
    view: &ViewState,
) -> Option<u32> {
    let grid = active_grid(stack)?;
    resolve_cell(x, y, proj, view, grid)
}
