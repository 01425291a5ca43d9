use crate::map::canvas::PixelCanvas;

/// Draw a line using Bresenham's algorithm.
pub fn draw_line(canvas: &mut PixelCanvas, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 4]) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Stroke a screen-space path segment by segment.
pub fn draw_polyline(canvas: &mut PixelCanvas, points: &[(f64, f64)], color: [u8; 4]) {
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        draw_line(canvas, x0 as i32, y0 as i32, x1 as i32, y1 as i32, color);
    }
}

/// Fill a screen-space polygon with an even-odd scanline pass. The outline is
/// treated as closed whether or not the last point repeats the first.
pub fn fill_polygon(canvas: &mut PixelCanvas, points: &[(f64, f64)], color: [u8; 4]) {
    if points.len() < 3 {
        return;
    }

    let min_y = points.iter().map(|p| p.1).fold(f64::MAX, f64::min).max(0.0) as i32;
    let max_y = points
        .iter()
        .map(|p| p.1)
        .fold(f64::MIN, f64::max)
        .min(canvas.height() as f64 - 1.0) as i32;

    let mut crossings: Vec<f64> = Vec::new();
    for y in min_y..=max_y {
        let yc = y as f64 + 0.5;
        crossings.clear();

        for i in 0..points.len() {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % points.len()];
            if (y0 <= yc && y1 > yc) || (y1 <= yc && y0 > yc) {
                let t = (yc - y0) / (y1 - y0);
                crossings.push(x0 + t * (x1 - x0));
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let xs = span[0].max(0.0) as i32;
            let xe = span[1].min(canvas.width() as f64) as i32;
            for x in xs..xe {
                canvas.set_pixel_signed(x, y, color);
            }
        }
    }
}
