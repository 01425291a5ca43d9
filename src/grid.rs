use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{ensure, Result};

use crate::geo::{self, CellRing};

/// Hard ceiling on addressable cells: the packed wire format carries cell ids
/// in 20 bits.
pub const MAX_CELLS: u32 = 0xFFFFF;

/// An immutable gridded data set: a dense RGBA raster with one quadruplet per
/// cell, and optionally a sparse map from cell id to the raw measured value.
///
/// When both are present the sparse map is authoritative for value lookups and
/// the raster drives color compositing. The only mutation after construction
/// is the lazily filled cell-ring cache, which is write-once per cell id.
pub struct Grid {
    rows: u32,
    cols: u32,
    data: Vec<u8>,
    values: Option<HashMap<u32, f64>>,
    ring_cache: RefCell<HashMap<u32, CellRing>>,
}

impl Grid {
    /// Build a grid from a raster buffer of exactly `(rows*cols + 1) * 4`
    /// bytes. Cell ids are 1-based and the raster is addressed at offset
    /// `cell_id * 4`, so slot 0 is unused padding; [`raster_len`] gives the
    /// expected size.
    pub fn new(
        rows: u32,
        cols: u32,
        data: Vec<u8>,
        values: Option<HashMap<u32, f64>>,
    ) -> Result<Self> {
        ensure!(rows > 0 && cols > 0, "grid dimensions must be positive");
        ensure!(
            rows as u64 * cols as u64 <= MAX_CELLS as u64,
            "{rows}x{cols} exceeds the {MAX_CELLS}-cell addressing ceiling"
        );
        ensure!(
            data.len() == raster_len(rows, cols),
            "raster buffer is {} bytes, expected {}",
            data.len(),
            raster_len(rows, cols)
        );
        Ok(Self {
            rows,
            cols,
            data,
            values,
            ring_cache: RefCell::new(HashMap::new()),
        })
    }

    #[inline(always)]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Total cell count `N`; valid cell ids are `1..=N`.
    #[inline(always)]
    pub fn cell_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// The dense RGBA raster, `(cell_count() + 1) * 4` bytes, addressed at
    /// offset `cell_id * 4`.
    #[inline(always)]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The raw value for a cell, when this grid carries measurements.
    pub fn get_cell(&self, cell_id: u32) -> Option<f64> {
        self.values.as_ref()?.get(&cell_id).copied()
    }

    /// The RGBA quadruplet for a cell, bounds-checked.
    pub fn rgba(&self, cell_id: u32) -> Option<[u8; 4]> {
        if cell_id == 0 || cell_id > self.cell_count() {
            return None;
        }
        let off = cell_id as usize * 4;
        self.data
            .get(off..off + 4)
            .map(|b| [b[0], b[1], b[2], b[3]])
    }

    pub fn cell_id_to_lon_lat(&self, cell_id: u32) -> (f64, f64) {
        geo::cell_id_to_lon_lat(cell_id, self.rows, self.cols)
    }

    /// The closed corner ring for a cell, memoized per cell id.
    pub fn cell_id_to_ring(&self, cell_id: u32) -> CellRing {
        if let Some(ring) = self.ring_cache.borrow().get(&cell_id) {
            return *ring;
        }
        let ring = geo::cell_id_to_ring(cell_id, self.rows, self.cols);
        self.ring_cache.borrow_mut().insert(cell_id, ring);
        ring
    }

    pub fn lon_lat_to_cell_id(&self, lon: f64, lat: f64) -> u32 {
        geo::lon_lat_to_cell_id(lon, lat, self.rows, self.cols)
    }
}

/// Byte length of a grid raster buffer: one RGBA quadruplet per cell plus the
/// unused 1-based padding slot.
#[inline(always)]
pub fn raster_len(rows: u32, cols: u32) -> usize {
    (rows as usize * cols as usize + 1) * 4
}
