use rayon::prelude::*;

use crate::grid::Grid;
use crate::map::projection::{Projection, ViewState};

/// Resolve one screen pixel to the 1-based cell id under it, or `None` when
/// the pixel is clipped, off the globe, outside the geographic range, or the
/// computed id is out of bounds. NaN from the projection counts as "invert
/// failed".
#[inline(always)]
pub(crate) fn resolve_pixel(
    proj: &dyn Projection,
    clip: Option<[[f64; 2]; 2]>,
    x: f64,
    y: f64,
    rows: u32,
    cols: u32,
) -> Option<u32> {
    if let Some([[x0, y0], [x1, y1]]) = clip {
        if x < x0 || x >= x1 || y < y0 || y >= y1 {
            return None;
        }
    }
    let (lon, lat) = proj.invert(x, y)?;
    if !lon.is_finite() || !lat.is_finite() {
        return None;
    }
    if !((-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat)) {
        return None;
    }

    let row = ((90.0 - lat) / 180.0 * rows as f64).floor() as i64;
    let col = ((180.0 + lon) / 360.0 * cols as f64).floor() as i64;
    let q = row * cols as i64 + col + 1;
    if q < 1 || q > rows as i64 * cols as i64 {
        return None;
    }
    Some(q as u32)
}

#[derive(Clone, PartialEq)]
struct IndexStamp {
    view: ViewState,
    width: usize,
    height: usize,
    rows: u32,
    cols: u32,
}

/// Nearest-neighbor reprojection of a grid raster into an output image.
///
/// The per-pixel `invert` pass dominates frame cost, so its result is kept in
/// an `index_map` (one cell id per pixel, 0 = no cell) stamped with the view
/// state, output size and grid resolution that produced it. A render whose
/// stamp matches skips reprojection entirely and only redoes the color copy;
/// any change of projection parameters or dimensions rebuilds the map.
#[derive(Default)]
pub struct Rasterizer {
    index_map: Vec<u32>,
    stamp: Option<IndexStamp>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached index map. Rendering after this always reprojects.
    pub fn invalidate(&mut self) {
        self.stamp = None;
    }

    /// Whether the cache currently matches the given view and output size.
    pub fn is_warm(&self, grid: &Grid, view: &ViewState, width: usize, height: usize) -> bool {
        self.stamp.as_ref().is_some_and(|s| {
            s.view == *view
                && s.width == width
                && s.height == height
                && s.rows == grid.rows()
                && s.cols == grid.cols()
        })
    }

    /// Composite `grid` into `out` (RGBA, `width * height * 4` bytes).
    /// Pixels with no contribution are left untouched.
    pub fn render_into(
        &mut self,
        grid: &Grid,
        proj: &dyn Projection,
        view: &ViewState,
        width: usize,
        height: usize,
        out: &mut [u8],
    ) {
        assert_eq!(out.len(), width * height * 4, "output buffer size mismatch");
        if width == 0 || height == 0 {
            return;
        }

        if !self.is_warm(grid, view, width, height) {
            self.rebuild_index_map(grid, proj, view, width, height);
        }

        let data = grid.data();
        out.par_chunks_mut(width * 4)
            .zip(self.index_map.par_chunks(width))
            .for_each(|(out_row, idx_row)| {
                for (x, &q) in idx_row.iter().enumerate() {
                    if q == 0 {
                        continue;
                    }
                    let off = q as usize * 4;
                    if data[off + 3] == 0 {
                        continue;
                    }
                    out_row[x * 4..x * 4 + 4].copy_from_slice(&data[off..off + 4]);
                }
            });
    }

    /// Convenience wrapper that composites onto a fresh transparent buffer.
    pub fn render(
        &mut self,
        grid: &Grid,
        proj: &dyn Projection,
        view: &ViewState,
        width: usize,
        height: usize,
    ) -> Vec<u8> {
        let mut out = vec![0u8; width * height * 4];
        self.render_into(grid, proj, view, width, height, &mut out);
        out
    }

    fn rebuild_index_map(
        &mut self,
        grid: &Grid,
        proj: &dyn Projection,
        view: &ViewState,
        width: usize,
        height: usize,
    ) {
        let rows = grid.rows();
        let cols = grid.cols();
        let clip = view.clip_extent;

        self.index_map.clear();
        self.index_map.resize(width * height, 0);
        self.index_map
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, idx_row)| {
                for (x, slot) in idx_row.iter_mut().enumerate() {
                    *slot = resolve_pixel(proj, clip, x as f64, y as f64, rows, cols).unwrap_or(0);
                }
            });

        self.stamp = Some(IndexStamp {
            view: view.clone(),
            width,
            height,
            rows,
            cols,
        });
    }
}
