use std::borrow::Cow;

use geojson::{FeatureCollection, Geometry, Value};

use crate::grid::Grid;
use crate::map::canvas::PixelCanvas;
use crate::map::geometry::{draw_polyline, fill_polygon};
use crate::map::projection::{Projection, ViewState};
use crate::map::raster::Rasterizer;
use crate::map::simplify::{effective_areas, filter_path};

/// Scale-dependent simplification: a simplified layer drops vertices whose
/// effective area is below `SIMPLIFY_K / scale²`.
const SIMPLIFY_K: f64 = 20000.0;

/// Vector geometry for a layer: geographic paths, with optional per-vertex
/// effective areas precomputed for simplified rendering.
pub struct VectorData {
    paths: Vec<Vec<[f64; 2]>>,
    areas: Option<Vec<Vec<f64>>>,
}

impl VectorData {
    pub fn new(paths: Vec<Vec<[f64; 2]>>) -> Self {
        Self { paths, areas: None }
    }

    /// Precompute per-vertex effective areas so the layer can be rendered
    /// with `simplified: true`.
    pub fn presimplified(paths: Vec<Vec<[f64; 2]>>) -> Self {
        let areas = paths.iter().map(|p| effective_areas(p)).collect();
        Self {
            paths,
            areas: Some(areas),
        }
    }

    /// Extract paths from a feature collection: line strings as-is, polygon
    /// exterior rings as closed paths.
    pub fn from_feature_collection(fc: &FeatureCollection) -> Self {
        let mut paths = Vec::new();
        for feature in &fc.features {
            if let Some(geometry) = &feature.geometry {
                collect_paths(geometry, &mut paths);
            }
        }
        Self::new(paths)
    }

    pub fn paths(&self) -> &[Vec<[f64; 2]>] {
        &self.paths
    }

    /// Paths with the simplification filter applied. Borrows the originals
    /// when no areas exist; only filtered output is allocated.
    fn simplified_paths(&self, threshold: f64) -> Cow<'_, [Vec<[f64; 2]>]> {
        match &self.areas {
            Some(areas) => Cow::Owned(
                self.paths
                    .iter()
                    .zip(areas)
                    .map(|(p, a)| filter_path(p, a, threshold))
                    .collect(),
            ),
            None => Cow::Borrowed(&self.paths),
        }
    }
}

fn collect_paths(geometry: &Geometry, out: &mut Vec<Vec<[f64; 2]>>) {
    let to_path = |coords: &[Vec<f64>]| coords.iter().map(|c| [c[0], c[1]]).collect::<Vec<_>>();
    match &geometry.value {
        Value::LineString(coords) => out.push(to_path(coords)),
        Value::MultiLineString(lines) => out.extend(lines.iter().map(|l| to_path(l))),
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                out.push(to_path(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|r| r.first()).map(|r| to_path(r)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_paths(g, out);
            }
        }
        _ => {}
    }
}

/// What a layer renders: a gridded raster or vector geometry.
pub enum LayerContent {
    Grid(Grid),
    Vector(VectorData),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerOptions {
    /// Stacking order; layers render in ascending z, ties in insertion order.
    pub z_index: i32,
    pub visible: bool,
    /// Render during interactive animation passes; expensive layers opt out
    /// and reappear on the settled redraw.
    pub render_on_animate: bool,
    /// Apply scale-dependent vertex filtering (vector layers with
    /// presimplified data only).
    pub simplified: bool,
    pub stroke_color: [u8; 4],
    pub fill_color: [u8; 4],
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            z_index: 1,
            visible: true,
            render_on_animate: true,
            simplified: false,
            stroke_color: [100, 100, 100, 204],
            fill_color: [237, 178, 48, 255],
        }
    }
}

/// Opaque handle identifying a layer for removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

pub struct Layer {
    pub content: LayerContent,
    pub options: LayerOptions,
    id: LayerId,
}

impl Layer {
    pub fn id(&self) -> LayerId {
        self.id
    }
}

/// Ordered, z-indexed collection of render layers and the composite pass over
/// them. The stack is the sole owner and mutator of layer order.
pub struct LayerStack {
    layers: Vec<Layer>,
    next_id: u64,
    pub sea_color: [u8; 4],
    pub graticule_color: [u8; 4],
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStack {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            next_id: 0,
            sea_color: [21, 98, 180, 204],
            graticule_color: [255, 255, 255, 77],
        }
    }

    /// Wrap content in a layer and insert it in stacking position.
    /// The caller is responsible for scheduling a redraw.
    pub fn add_layer(&mut self, content: LayerContent, options: LayerOptions) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push(Layer {
            content,
            options,
            id,
        });
        // Stable sort: equal z-indexes keep insertion order.
        self.layers.sort_by_key(|l| l.options.z_index);
        id
    }

    /// Remove by handle; no-op when the layer is gone already.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        match self.layers.iter().position(|l| l.id == id) {
            Some(idx) => {
                self.layers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove by position in stacking order; no-op when out of range.
    pub fn remove_layer_at(&mut self, index: usize) -> bool {
        if index < self.layers.len() {
            self.layers.remove(index);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in stacking order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Render every eligible layer into the canvas: sea fill, layers in
    /// stacking order, then the graticule overlay. During animation passes
    /// layers with `render_on_animate: false` are skipped.
    pub fn composite(
        &self,
        canvas: &mut PixelCanvas,
        rasterizer: &mut Rasterizer,
        proj: &dyn Projection,
        view: &ViewState,
        animating: bool,
    ) {
        canvas.clear([0, 0, 0, 0]);
        let sphere = proj.sphere();
        fill_polygon(canvas, &sphere, self.sea_color);

        let threshold = SIMPLIFY_K / (view.scale * view.scale);

        for layer in &self.layers {
            if !layer.options.visible || (animating && !layer.options.render_on_animate) {
                continue;
            }
            match &layer.content {
                LayerContent::Grid(grid) => {
                    let (w, h) = (canvas.width(), canvas.height());
                    rasterizer.render_into(grid, proj, view, w, h, canvas.data_mut());
                }
                LayerContent::Vector(data) => {
                    let paths = if layer.options.simplified {
                        data.simplified_paths(threshold)
                    } else {
                        Cow::Borrowed(data.paths())
                    };
                    for path in paths.iter() {
                        draw_geographic_path(canvas, proj, path, &layer.options);
                    }
                }
            }
        }

        for line in graticule() {
            stroke_geographic_line(canvas, proj, &line, self.graticule_color);
        }
    }
}

/// Project a geographic path and draw it, splitting wherever the projection
/// rejects a vertex (back hemisphere) so segments never bridge the gap.
fn draw_geographic_path(
    canvas: &mut PixelCanvas,
    proj: &dyn Projection,
    path: &[[f64; 2]],
    options: &LayerOptions,
) {
    let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for &[lon, lat] in path {
        match proj.forward(lon, lat) {
            Some(p) => current.push(p),
            None => {
                if current.len() > 1 {
                    segments.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() > 1 {
        segments.push(current);
    }

    // Fill only when the whole outline projected as one piece; a path split
    // by the horizon has no well-defined screen polygon.
    if options.fill_color[3] > 0 && segments.len() == 1 && segments[0].len() == path.len() {
        fill_polygon(canvas, &segments[0], options.fill_color);
    }
    for seg in &segments {
        draw_polyline(canvas, seg, options.stroke_color);
    }
}

fn stroke_geographic_line(
    canvas: &mut PixelCanvas,
    proj: &dyn Projection,
    line: &[[f64; 2]],
    color: [u8; 4],
) {
    let opts = LayerOptions {
        stroke_color: color,
        fill_color: [0, 0, 0, 0],
        ..LayerOptions::default()
    };
    draw_geographic_path(canvas, proj, line, &opts);
}

/// The longitude/latitude reference grid: meridians every 10° sampled every
/// 2.5° of latitude, parallels every 10° (poles excluded) sampled every 2.5°
/// of longitude.
pub fn graticule() -> Vec<Vec<[f64; 2]>> {
    let mut lines = Vec::new();
    let mut lon = -180.0;
    while lon <= 180.0 {
        let mut line = Vec::with_capacity(73);
        let mut lat = -90.0;
        while lat <= 90.0 {
            line.push([lon, lat]);
            lat += 2.5;
        }
        lines.push(line);
        lon += 10.0;
    }
    let mut lat = -80.0;
    while lat <= 80.0 {
        let mut line = Vec::with_capacity(145);
        let mut lon = -180.0;
        while lon <= 180.0 {
            line.push([lon, lat]);
            lon += 2.5;
        }
        lines.push(line);
        lat += 10.0;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::packed_to_grid;
    use crate::color::QuantizedScale;
    use crate::map::projection::Equirectangular;

    fn grid_layer() -> LayerContent {
        let buf = 0x7F000001u32.to_le_bytes();
        LayerContent::Grid(packed_to_grid(&buf, 4, 8, &QuantizedScale::default()).unwrap())
    }

    fn vector_layer() -> LayerContent {
        LayerContent::Vector(VectorData::new(vec![vec![[0.0, 0.0], [10.0, 10.0]]]))
    }

    #[test]
    fn layers_sort_by_z_then_insertion() {
        let mut stack = LayerStack::new();
        let ids: Vec<LayerId> = [3, 1, 1, 2]
            .into_iter()
            .map(|z| {
                stack.add_layer(
                    vector_layer(),
                    LayerOptions {
                        z_index: z,
                        ..LayerOptions::default()
                    },
                )
            })
            .collect();

        let order: Vec<LayerId> = stack.iter().map(|l| l.id()).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[3], ids[0]]);
    }

    #[test]
    fn remove_by_id_and_index() {
        let mut stack = LayerStack::new();
        let a = stack.add_layer(vector_layer(), LayerOptions::default());
        let _b = stack.add_layer(vector_layer(), LayerOptions::default());

        assert!(stack.remove_layer(a));
        assert!(!stack.remove_layer(a), "second removal must be a no-op");
        assert_eq!(stack.len(), 1);

        assert!(!stack.remove_layer_at(7));
        assert!(stack.remove_layer_at(0));
        assert!(stack.is_empty());
    }

    #[test]
    fn composite_paints_sea_and_grid() {
        let mut stack = LayerStack::new();
        stack.add_layer(grid_layer(), LayerOptions::default());
        stack.graticule_color = [0, 0, 0, 0];

        let mut view = ViewState::new(32, 16);
        view.scale = 32.0 / (2.0 * std::f64::consts::PI);
        let proj = Equirectangular::new(&view);
        let mut canvas = PixelCanvas::new(32, 16);
        let mut raster = Rasterizer::new();
        stack.composite(&mut canvas, &mut raster, &proj, &view, false);

        // Cell 1 covers the north-west corner of the map; the packed record
        // colored it opaquely.
        assert_eq!(canvas.get_pixel(1, 1).unwrap()[3], 255);
        // Away from the data, the sea fill shows through.
        assert_eq!(canvas.get_pixel(20, 8), Some([21, 98, 180, 204]));
    }

    #[test]
    fn animation_pass_skips_opted_out_layers() {
        let mut stack = LayerStack::new();
        stack.add_layer(
            grid_layer(),
            LayerOptions {
                render_on_animate: false,
                ..LayerOptions::default()
            },
        );
        stack.graticule_color = [0, 0, 0, 0];
        stack.sea_color = [0, 0, 0, 0];

        let mut view = ViewState::new(32, 16);
        view.scale = 32.0 / (2.0 * std::f64::consts::PI);
        let proj = Equirectangular::new(&view);
        let mut canvas = PixelCanvas::new(32, 16);
        let mut raster = Rasterizer::new();

        stack.composite(&mut canvas, &mut raster, &proj, &view, true);
        assert!(canvas.data().iter().all(|&b| b == 0), "grid rendered while animating");

        stack.composite(&mut canvas, &mut raster, &proj, &view, false);
        assert!(canvas.data().iter().any(|&b| b != 0));
    }

    #[test]
    fn invisible_layers_never_render() {
        let mut stack = LayerStack::new();
        stack.add_layer(
            grid_layer(),
            LayerOptions {
                visible: false,
                ..LayerOptions::default()
            },
        );
        stack.graticule_color = [0, 0, 0, 0];
        stack.sea_color = [0, 0, 0, 0];

        let mut view = ViewState::new(32, 16);
        view.scale = 32.0 / (2.0 * std::f64::consts::PI);
        let proj = Equirectangular::new(&view);
        let mut canvas = PixelCanvas::new(32, 16);
        stack.composite(&mut canvas, &mut Rasterizer::new(), &proj, &view, false);
        assert!(canvas.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn unsimplified_vector_layer_strokes_without_copying_paths() {
        let data = VectorData::new(vec![vec![[-90.0, 0.0], [90.0, 0.0]]]);
        // No areas computed, so rendering borrows the stored paths directly.
        assert!(matches!(data.simplified_paths(1.0), Cow::Borrowed(_)));

        let mut stack = LayerStack::new();
        stack.add_layer(
            LayerContent::Vector(data),
            LayerOptions {
                stroke_color: [255, 0, 0, 255],
                fill_color: [0, 0, 0, 0],
                ..LayerOptions::default()
            },
        );
        stack.graticule_color = [0, 0, 0, 0];
        stack.sea_color = [0, 0, 0, 0];

        let mut view = ViewState::new(32, 16);
        view.scale = 32.0 / (2.0 * std::f64::consts::PI);
        let proj = Equirectangular::new(&view);
        let mut canvas = PixelCanvas::new(32, 16);
        stack.composite(&mut canvas, &mut Rasterizer::new(), &proj, &view, false);

        // The equator line passes through the view center.
        assert_eq!(canvas.get_pixel(16, 8), Some([255, 0, 0, 255]));
    }

    #[test]
    fn simplified_layer_drops_fine_vertices_when_zoomed_out() {
        let jagged: Vec<[f64; 2]> = (0..40)
            .map(|i| [i as f64, if i % 2 == 0 { 0.0 } else { 0.01 }])
            .collect();
        let data = VectorData::presimplified(vec![jagged]);

        // Zoomed out: huge threshold, the wiggles vanish.
        let coarse = data.simplified_paths(1.0);
        assert!(coarse[0].len() < 40);
        // Zoomed in: tiny threshold keeps everything.
        let fine = data.simplified_paths(1e-9);
        assert_eq!(fine[0].len(), 40);
    }

    #[test]
    fn feature_collection_paths_extracted() {
        let fc_json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,0]]]}}
            ]
        }"#;
        let fc: FeatureCollection = fc_json.parse().unwrap();
        let data = VectorData::from_feature_collection(&fc);
        assert_eq!(data.paths().len(), 2);
        assert_eq!(data.paths()[0], vec![[0.0, 0.0], [1.0, 1.0]]);
        assert_eq!(data.paths()[1].len(), 4);
    }

    #[test]
    fn graticule_covers_the_world() {
        let lines = graticule();
        // 37 meridians + 17 parallels.
        assert_eq!(lines.len(), 54);
        assert!(lines.iter().all(|l| l.len() >= 2));
    }
}
