/// Closed 5-vertex cell outline: `[NW, NE, SE, SW, NW]` in [lon, lat] pairs.
pub type CellRing = [[f64; 2]; 5];

/// Convert a 1-based, row-major cell id to the [lon, lat] of the cell's
/// north-west corner. Row 0 touches +90° latitude, column 0 touches −180°
/// longitude; each cell spans `360/cols` by `180/rows` degrees.
#[inline(always)]
pub fn cell_id_to_lon_lat(cell_id: u32, rows: u32, cols: u32) -> (f64, f64) {
    let id0 = cell_id.saturating_sub(1);
    let lon = -180.0 + (id0 % cols) as f64 * (360.0 / cols as f64);
    let lat = 90.0 - (id0 / cols) as f64 * (180.0 / rows as f64);
    (lon, lat)
}

/// Build the closed corner ring for a cell.
pub fn cell_id_to_ring(cell_id: u32, rows: u32, cols: u32) -> CellRing {
    let x_size = 360.0 / cols as f64;
    let y_size = 180.0 / rows as f64;
    let (lon, lat) = cell_id_to_lon_lat(cell_id, rows, cols);
    [
        [lon, lat],
        [lon + x_size, lat],
        [lon + x_size, lat - y_size],
        [lon, lat - y_size],
        [lon, lat],
    ]
}

/// Convert geographic coordinates to a 1-based cell id.
///
/// Exact inverse of [`cell_id_to_lon_lat`] for interior cells. Points on the
/// antimeridian or at the poles may land in an adjacent band and can produce
/// an id outside `[1, rows*cols]`; callers bounds-check before indexing
/// storage. Defined for `lon ∈ [-180, 180]`, `lat ∈ [-90, 90]`.
#[inline(always)]
pub fn lon_lat_to_cell_id(lon: f64, lat: f64, rows: u32, cols: u32) -> u32 {
    let row = (rows as f64 - (lat + 90.0) / 180.0 * rows as f64).floor() as i64;
    let col = ((lon + 180.0) / 360.0 * cols as f64).floor() as i64;
    (row * cols as i64 + col + 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cell_is_northwest_corner() {
        assert_eq!(cell_id_to_lon_lat(1, 360, 720), (-180.0, 90.0));
    }

    #[test]
    fn last_cell_half_degree_grid() {
        let (lon, lat) = cell_id_to_lon_lat(360 * 720, 360, 720);
        assert!((lon - 179.5).abs() < 1e-9);
        assert!((lat - -89.5).abs() < 1e-9);
    }

    #[test]
    fn roundtrip_interior_cells() {
        for (rows, cols) in [(180u32, 360u32), (360, 720), (7, 13)] {
            let n = rows * cols;
            for cell_id in (1..=n).step_by(17) {
                let (lon, lat) = cell_id_to_lon_lat(cell_id, rows, cols);
                // Probe the cell center rather than the corner itself so the
                // inverse is unambiguous even at the antimeridian/pole seams.
                let cx = lon + 180.0 / cols as f64;
                let cy = lat - 90.0 / rows as f64;
                assert_eq!(lon_lat_to_cell_id(cx, cy, rows, cols), cell_id);
            }
        }
    }

    #[test]
    fn corner_roundtrip_tolerance() {
        // NW corners roundtrip exactly for interior cells; the documented
        // tolerance at band edges is one cell (one column or one row over).
        let (rows, cols) = (360, 720);
        for cell_id in [1u32, 2, 721, 12345, 100_000] {
            let (lon, lat) = cell_id_to_lon_lat(cell_id, rows, cols);
            let got = lon_lat_to_cell_id(lon, lat, rows, cols);
            let diff = (got as i64 - cell_id as i64).abs();
            assert!(diff == 0 || diff == 1 || diff == cols as i64);
        }
    }

    #[test]
    fn ring_is_closed_and_spans_one_cell() {
        let ring = cell_id_to_ring(1, 360, 720);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[0], [-180.0, 90.0]);
        assert_eq!(ring[1], [-179.5, 90.0]);
        assert_eq!(ring[2], [-179.5, 89.5]);
        assert_eq!(ring[3], [-180.0, 89.5]);
    }
}
