use anyhow::{Context, Result};
use geojson::GeoJson;
use std::fs;
use std::path::Path;

use crate::map::VectorData;

/// Load vector geometry from a GeoJSON file: line strings and polygon
/// exterior rings become layer paths.
pub fn load_geojson_paths(path: &Path) -> Result<VectorData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("parsing {}", path.display()))?;
    let fc = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(f) => geojson::FeatureCollection {
            bbox: None,
            features: vec![f],
            foreign_members: None,
        },
        GeoJson::Geometry(g) => geojson::FeatureCollection {
            bbox: None,
            features: vec![geojson::Feature {
                bbox: None,
                geometry: Some(g),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        },
    };
    Ok(VectorData::from_feature_collection(&fc))
}

/// Read a packed grid payload from disk.
pub fn load_packed(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Coarse continent outlines for when no GeoJSON file is available.
pub fn simple_world() -> VectorData {
    let outlines: Vec<Vec<[f64; 2]>> = vec![
        // North America
        vec![
            [-168.0, 65.0], [-166.0, 60.0], [-141.0, 60.0], [-130.0, 55.0],
            [-125.0, 48.0], [-124.0, 40.0], [-117.0, 32.0], [-110.0, 25.0],
            [-97.0, 25.0], [-97.0, 28.0], [-82.0, 24.0], [-80.0, 25.0],
            [-81.0, 31.0], [-75.0, 35.0], [-70.0, 41.0], [-67.0, 45.0],
            [-65.0, 47.0], [-55.0, 47.0], [-52.0, 47.0], [-55.0, 52.0],
            [-58.0, 55.0], [-64.0, 60.0], [-73.0, 62.0], [-80.0, 63.0],
            [-95.0, 62.0], [-110.0, 68.0], [-130.0, 70.0], [-145.0, 70.0],
            [-168.0, 65.0],
        ],
        // South America
        vec![
            [-80.0, 10.0], [-75.0, 5.0], [-70.0, 5.0], [-60.0, 5.0],
            [-50.0, 0.0], [-35.0, -5.0], [-35.0, -10.0], [-38.0, -15.0],
            [-40.0, -22.0], [-48.0, -25.0], [-55.0, -34.0], [-58.0, -38.0],
            [-65.0, -42.0], [-68.0, -50.0], [-75.0, -52.0], [-75.0, -45.0],
            [-72.0, -40.0], [-72.0, -30.0], [-70.0, -20.0], [-70.0, -15.0],
            [-80.0, -5.0], [-80.0, 0.0], [-80.0, 10.0],
        ],
        // Europe
        vec![
            [-10.0, 36.0], [-5.0, 36.0], [0.0, 38.0], [5.0, 43.0],
            [10.0, 44.0], [15.0, 45.0], [20.0, 40.0], [25.0, 37.0],
            [30.0, 40.0], [35.0, 42.0], [40.0, 43.0], [40.0, 55.0],
            [30.0, 60.0], [25.0, 65.0], [20.0, 70.0], [10.0, 71.0],
            [5.0, 62.0], [5.0, 58.0], [-5.0, 58.0], [-10.0, 52.0],
            [-5.0, 48.0], [-5.0, 43.0], [-10.0, 36.0],
        ],
        // Africa
        vec![
            [-17.0, 15.0], [-15.0, 10.0], [-10.0, 5.0], [0.0, 5.0],
            [10.0, 5.0], [15.0, 0.0], [20.0, -5.0], [25.0, -10.0],
            [35.0, -20.0], [35.0, -25.0], [30.0, -30.0], [20.0, -35.0],
            [18.0, -35.0], [15.0, -30.0], [10.0, -15.0], [10.0, 0.0],
            [5.0, 5.0], [-5.0, 5.0], [-10.0, 10.0], [-17.0, 15.0],
        ],
        vec![
            [-17.0, 15.0], [-17.0, 20.0], [-15.0, 28.0], [-5.0, 35.0],
            [10.0, 37.0], [20.0, 33.0], [25.0, 32.0], [35.0, 30.0],
            [35.0, 20.0], [42.0, 12.0], [50.0, 12.0], [45.0, 5.0],
            [35.0, -5.0], [35.0, -20.0],
        ],
        // Asia
        vec![
            [35.0, 42.0], [40.0, 43.0], [50.0, 40.0], [55.0, 37.0],
            [60.0, 25.0], [65.0, 25.0], [70.0, 20.0], [75.0, 15.0],
            [80.0, 8.0], [80.0, 15.0], [88.0, 22.0], [92.0, 22.0],
            [95.0, 16.0], [100.0, 14.0], [105.0, 10.0], [110.0, 20.0],
            [115.0, 22.0], [120.0, 22.0], [122.0, 25.0], [125.0, 30.0],
            [130.0, 35.0], [135.0, 35.0], [140.0, 40.0], [145.0, 45.0],
            [145.0, 50.0], [140.0, 55.0], [135.0, 55.0], [130.0, 52.0],
            [130.0, 43.0], [120.0, 40.0], [110.0, 45.0], [90.0, 50.0],
            [70.0, 55.0], [60.0, 55.0], [50.0, 50.0], [40.0, 43.0],
        ],
        // Australia
        vec![
            [115.0, -20.0], [120.0, -18.0], [130.0, -12.0], [140.0, -12.0],
            [145.0, -15.0], [150.0, -25.0], [153.0, -30.0], [150.0, -35.0],
            [145.0, -38.0], [140.0, -38.0], [135.0, -35.0], [130.0, -32.0],
            [125.0, -32.0], [115.0, -35.0], [115.0, -25.0], [115.0, -20.0],
        ],
    ];
    VectorData::presimplified(outlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_world_has_closed_continents() {
        let world = simple_world();
        assert_eq!(world.paths().len(), 7);
        // The first outline is a closed ring.
        let na = &world.paths()[0];
        assert_eq!(na.first(), na.last());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_geojson_paths(Path::new("/nonexistent/world.json")).is_err());
    }
}
