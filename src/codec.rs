use std::collections::HashMap;

use anyhow::{ensure, Result};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::json;

use crate::color::ColorScale;
use crate::geo;
use crate::grid::{raster_len, Grid, MAX_CELLS};

/// One decoded record of the packed wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedRecord {
    pub cell_id: u32,
    pub value: u8,
}

/// Decode a packed payload: a stream of little-endian 32-bit words, low 20
/// bits the cell id, high byte the value. Bits 20–23 are reserved and
/// ignored. A trailing partial word is silently dropped.
pub fn decode_packed_words(buf: &[u8]) -> impl Iterator<Item = PackedRecord> + '_ {
    buf.chunks_exact(4).map(|w| {
        let word = u32::from_le_bytes([w[0], w[1], w[2], w[3]]);
        PackedRecord {
            cell_id: word & 0xFFFFF,
            value: (word >> 24) as u8,
        }
    })
}

/// Decode a dense RGBA payload laid out as one quadruplet per cell for cell
/// ids `1..`, row-major. All-zero quadruplets mean "no data" and are omitted;
/// that is the sparsity convention of the format, not a color.
pub fn decode_sparse_rgba(buf: &[u8]) -> impl Iterator<Item = (u32, [u8; 4])> + '_ {
    buf.chunks_exact(4).enumerate().filter_map(|(i, q)| {
        let rgba = [q[0], q[1], q[2], q[3]];
        if rgba == [0; 4] {
            None
        } else {
            Some((i as u32 + 1, rgba))
        }
    })
}

/// Validate grid dimensions and return the cell count. Runs before any
/// arithmetic on `rows * cols` or raster allocation, so oversized dimensions
/// fail cleanly instead of overflowing in u32.
fn checked_cell_count(rows: u32, cols: u32) -> Result<u32> {
    ensure!(rows > 0 && cols > 0, "grid dimensions must be positive");
    ensure!(
        rows as u64 * cols as u64 <= MAX_CELLS as u64,
        "{rows}x{cols} exceeds the {MAX_CELLS}-cell addressing ceiling"
    );
    Ok(rows * cols)
}

/// Build a dense grid from a packed payload, mapping each value through the
/// color scale (alpha forced to 255) and recording the raw value per cell.
/// Records whose cell id falls outside `[1, rows*cols]` are dropped.
pub fn packed_to_grid(
    buf: &[u8],
    rows: u32,
    cols: u32,
    scale: &dyn ColorScale,
) -> Result<Grid> {
    let n = checked_cell_count(rows, cols)?;
    let mut data = vec![0u8; raster_len(rows, cols)];
    let mut values = HashMap::new();

    for rec in decode_packed_words(buf) {
        if rec.cell_id == 0 || rec.cell_id > n {
            continue;
        }
        let off = rec.cell_id as usize * 4;
        let [r, g, b] = scale.color(rec.value);
        data[off] = r;
        data[off + 1] = g;
        data[off + 2] = b;
        data[off + 3] = 255;
        values.insert(rec.cell_id, rec.value as f64);
    }

    Grid::new(rows, cols, data, Some(values))
}

/// Build a feature collection from a packed payload: one cell polygon per
/// record with `{cellId, value}` properties.
pub fn packed_to_features(buf: &[u8], rows: u32, cols: u32) -> Result<FeatureCollection> {
    let n = checked_cell_count(rows, cols)?;
    let features = decode_packed_words(buf)
        .filter(|rec| rec.cell_id >= 1 && rec.cell_id <= n)
        .enumerate()
        .map(|(i, rec)| {
            let mut props = serde_json::Map::new();
            props.insert("cellId".into(), json!(rec.cell_id));
            props.insert("value".into(), json!(rec.value));
            Feature {
                bbox: None,
                geometry: Some(cell_polygon(rec.cell_id, rows, cols)),
                id: Some(Id::Number(i.into())),
                properties: Some(props),
                foreign_members: None,
            }
        })
        .collect();

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Build a dense grid from an RGBA payload. A payload shorter than the grid
/// leaves the remaining cells transparent; excess quadruplets are dropped.
pub fn sparse_rgba_to_grid(buf: &[u8], rows: u32, cols: u32) -> Result<Grid> {
    let n = checked_cell_count(rows, cols)?;
    let mut data = vec![0u8; raster_len(rows, cols)];
    for (cell_id, rgba) in decode_sparse_rgba(buf) {
        if cell_id > n {
            break;
        }
        let off = cell_id as usize * 4;
        data[off..off + 4].copy_from_slice(&rgba);
    }
    Grid::new(rows, cols, data, None)
}

/// Build a feature collection from an RGBA payload: one cell polygon per
/// non-empty quadruplet with `{cellId, rgba}` properties.
pub fn sparse_rgba_to_features(buf: &[u8], rows: u32, cols: u32) -> Result<FeatureCollection> {
    let n = checked_cell_count(rows, cols)?;
    let features = decode_sparse_rgba(buf)
        .take_while(|(cell_id, _)| *cell_id <= n)
        .enumerate()
        .map(|(i, (cell_id, rgba))| {
            let mut props = serde_json::Map::new();
            props.insert("cellId".into(), json!(cell_id));
            props.insert("rgba".into(), json!(rgba.to_vec()));
            Feature {
                bbox: None,
                geometry: Some(cell_polygon(cell_id, rows, cols)),
                id: Some(Id::Number(i.into())),
                properties: Some(props),
                foreign_members: None,
            }
        })
        .collect();

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn cell_polygon(cell_id: u32, rows: u32, cols: u32) -> Geometry {
    let ring: Vec<Vec<f64>> = geo::cell_id_to_ring(cell_id, rows, cols)
        .iter()
        .map(|p| p.to_vec())
        .collect();
    Geometry::new(Value::Polygon(vec![ring]))
}
