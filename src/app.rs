use std::path::Path;
use std::time::Duration;

use grid_map::codec::packed_to_grid;
use grid_map::color::QuantizedScale;
use grid_map::data;
use grid_map::map::{
    pick, Equirectangular, LayerContent, LayerOptions, LayerStack, Orthographic, PixelCanvas,
    Projection, Rasterizer, ViewState,
};
use grid_map::scheduler::{RedrawScheduler, RenderPass};

/// Scale ladder for zoom stepping.
const ZOOM_LEVELS: [f64; 4] = [150.0, 300.0, 600.0, 1200.0];

/// Longitude degrees of rotation per pixel of drag, divided by scale.
const DRAG_SENSITIVITY: f64 = 100.0;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Equirectangular,
    Orthographic,
}

/// Application state: the view, the layer stack, and the render machinery.
pub struct App {
    pub view: ViewState,
    pub layers: LayerStack,
    pub rasterizer: Rasterizer,
    pub canvas: PixelCanvas,
    pub scheduler: RedrawScheduler,
    pub projection: ProjectionKind,
    pub should_quit: bool,
    /// Last mouse position while dragging, in pixel coordinates.
    pub last_mouse: Option<(f64, f64)>,
    /// Cell under the cursor, refreshed on mouse movement.
    pub hovered_cell: Option<u32>,
    pub hovered_value: Option<f64>,
    pub frames_rendered: u64,
}

impl App {
    pub fn new(width: usize, height: usize) -> Self {
        let mut app = Self {
            view: ViewState::new(width, height),
            layers: LayerStack::new(),
            rasterizer: Rasterizer::new(),
            canvas: PixelCanvas::new(width, height),
            scheduler: RedrawScheduler::new(),
            projection: ProjectionKind::Orthographic,
            should_quit: false,
            last_mouse: None,
            hovered_cell: None,
            hovered_value: None,
            frames_rendered: 0,
        };
        app.scheduler.set_quiescence(Duration::from_millis(500));
        app.scheduler.request_redraw();
        app
    }

    /// Build the projection snapshot for the current view.
    pub fn projection(&self) -> Box<dyn Projection> {
        match self.projection {
            ProjectionKind::Equirectangular => Box::new(Equirectangular::new(&self.view)),
            ProjectionKind::Orthographic => Box::new(Orthographic::new(&self.view)),
        }
    }

    pub fn toggle_projection(&mut self) {
        self.projection = match self.projection {
            ProjectionKind::Equirectangular => ProjectionKind::Orthographic,
            ProjectionKind::Orthographic => ProjectionKind::Equirectangular,
        };
        self.rasterizer.invalidate();
        self.scheduler.request_redraw();
    }

    /// Load a demo grid: from a packed payload on disk when present,
    /// otherwise a synthetic one. Coastlines come from GeoJSON or the
    /// built-in outlines.
    pub fn load_layers(&mut self, data_dir: &Path) -> anyhow::Result<()> {
        let rows = 180;
        let cols = 360;
        let packed = match data::load_packed(&data_dir.join("grid.bin")) {
            Ok(bytes) => bytes,
            Err(_) => synthetic_packed(rows, cols),
        };
        let grid = packed_to_grid(&packed, rows, cols, &QuantizedScale::default())?;
        self.layers.add_layer(
            LayerContent::Grid(grid),
            LayerOptions {
                z_index: 1,
                render_on_animate: false,
                ..LayerOptions::default()
            },
        );

        let world = match data::load_geojson_paths(&data_dir.join("coastlines.json")) {
            Ok(paths) => paths,
            Err(_) => data::simple_world(),
        };
        self.layers.add_layer(
            LayerContent::Vector(world),
            LayerOptions {
                z_index: 2,
                simplified: true,
                fill_color: [0, 0, 0, 0],
                stroke_color: [100, 100, 100, 204],
                ..LayerOptions::default()
            },
        );

        self.scheduler.request_redraw();
        Ok(())
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.view.resize(width, height);
        self.canvas.resize(width, height);
        self.rasterizer.invalidate();
        self.scheduler.request_redraw();
    }

    /// Step up the zoom ladder.
    pub fn zoom_in(&mut self) {
        if let Some(&next) = ZOOM_LEVELS.iter().find(|&&s| s > self.view.scale) {
            self.view.scale = next;
            self.on_view_changed();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(&next) = ZOOM_LEVELS.iter().rev().find(|&&s| s < self.view.scale) {
            self.view.scale = next;
            self.on_view_changed();
        }
    }

    pub fn rotate_by(&mut self, dlon: f64, dlat: f64) {
        self.view.rotate[0] += dlon;
        self.view.rotate[1] = (self.view.rotate[1] + dlat).clamp(-90.0, 90.0);
        self.on_view_changed();
    }

    /// Mouse drag rotates the globe, scaled so a full-width drag roughly
    /// crosses a hemisphere at base zoom.
    pub fn handle_drag(&mut self, x: f64, y: f64) {
        if let Some((lx, ly)) = self.last_mouse {
            let dlon = DRAG_SENSITIVITY * (x - lx) / self.view.scale;
            let dlat = DRAG_SENSITIVITY * (y - ly) / self.view.scale;
            self.rotate_by(dlon, -dlat);
        }
        self.last_mouse = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Refresh the hover readout for a mouse position.
    pub fn update_hover(&mut self, x: f64, y: f64) {
        let proj = self.projection();
        self.hovered_cell = pick(&self.layers, x, y, proj.as_ref(), &self.view);
        self.hovered_value = self
            .hovered_cell
            .and_then(|id| grid_map::map::active_grid(&self.layers).and_then(|g| g.get_cell(id)));
    }

    fn on_view_changed(&mut self) {
        // Interactive passes render immediately at reduced fidelity; the full
        // redraw fires once input settles.
        self.scheduler.request_animation_frame();
        self.scheduler.request_redraw();
    }

    /// Run any render pass the scheduler says is due.
    pub fn tick(&mut self) {
        if let Some(pass) = self.scheduler.poll() {
            let proj = self.projection();
            let animating = pass == RenderPass::Animation;
            let view = self.view.clone();
            self.layers.composite(
                &mut self.canvas,
                &mut self.rasterizer,
                proj.as_ref(),
                &view,
                animating,
            );
            self.frames_rendered += 1;
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn status_line(&self) -> String {
        let proj = match self.projection {
            ProjectionKind::Equirectangular => "equirect",
            ProjectionKind::Orthographic => "globe",
        };
        let hover = match (self.hovered_cell, self.hovered_value) {
            (Some(id), Some(v)) => format!("cell {id} = {v:.0}"),
            (Some(id), None) => format!("cell {id}"),
            _ => "-".to_string(),
        };
        format!(
            "{proj} | scale {:.0} | center {:.1}°, {:.1}° | {hover}",
            self.view.scale, -self.view.rotate[0], -self.view.rotate[1]
        )
    }
}

/// A deterministic latitude-banded payload so the demo shows data without any
/// files on disk.
pub fn synthetic_packed(rows: u32, cols: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity((rows * cols) as usize * 4);
    for row in 0..rows {
        let value = (row * 256 / rows) as u32;
        for col in 0..cols {
            // Leave a sparse checkerboard of gaps so transparency shows.
            if (row / 8 + col / 8) % 7 == 0 {
                continue;
            }
            let id = row * cols + col + 1;
            let word = (value << 24) | id;
            buf.extend_from_slice(&word.to_le_bytes());
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_ladder_clamps_at_the_ends() {
        let mut app = App::new(80, 40);
        app.view.scale = 150.0;
        app.zoom_out();
        assert_eq!(app.view.scale, 150.0);
        for _ in 0..10 {
            app.zoom_in();
        }
        assert_eq!(app.view.scale, 1200.0);
    }

    #[test]
    fn drag_rotates_proportionally_to_scale() {
        let mut app = App::new(80, 40);
        app.view.scale = 200.0;
        app.last_mouse = Some((10.0, 10.0));
        app.handle_drag(14.0, 10.0);
        assert!((app.view.rotate[0] - 2.0).abs() < 1e-9);
        assert_eq!(app.view.rotate[1], 0.0);
    }

    #[test]
    fn latitude_rotation_clamped_to_poles() {
        let mut app = App::new(80, 40);
        app.rotate_by(0.0, 500.0);
        assert_eq!(app.view.rotate[1], 90.0);
    }

    #[test]
    fn synthetic_payload_decodes() {
        let buf = synthetic_packed(18, 36);
        let grid = packed_to_grid(&buf, 18, 36, &QuantizedScale::default()).unwrap();
        assert_eq!(grid.cell_count(), 18 * 36);
    }

    #[test]
    fn tick_renders_once_per_due_pass() {
        let mut app = App::new(32, 16);
        app.load_layers(Path::new("/nonexistent")).unwrap();
        app.scheduler.fire_now();
        app.tick();
        assert_eq!(app.frames_rendered, 1);
        app.tick();
        assert_eq!(app.frames_rendered, 1);
    }
}
