use std::f64::consts::PI;

use glam::DVec3;

/// Mutable view parameters owned by the host and passed explicitly into every
/// render and pick call. Nothing in the crate reads view state from globals.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Projection scale in pixels per radian (orthographic: sphere radius).
    pub scale: f64,
    /// Rotation [λ, φ] in degrees; `[-lon, -lat]` centers the view on a point.
    pub rotate: [f64; 2],
    /// Screen position of the projection origin, usually the canvas center.
    pub translate: [f64; 2],
    /// Optional screen-space clip rectangle `[[x0, y0], [x1, y1]]`.
    pub clip_extent: Option<[[f64; 2]; 2]>,
}

impl ViewState {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            scale: 150.0,
            rotate: [0.0, 0.0],
            translate: [width as f64 / 2.0, height as f64 / 2.0],
            clip_extent: Some([[0.0, 0.0], [width as f64, height as f64]]),
        }
    }

    /// Re-center on a viewport of the given size, keeping scale and rotation.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.translate = [width as f64 / 2.0, height as f64 / 2.0];
        self.clip_extent = Some([[0.0, 0.0], [width as f64, height as f64]]);
    }
}

/// A projection snapshot built from a [`ViewState`]. Construction is cheap
/// and happens once per frame; `invert` runs once per output pixel and is the
/// hot path of the whole crate.
pub trait Projection: Sync {
    /// Geographic → screen. `None` when the point is not representable
    /// (e.g. on the back hemisphere of a globe).
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Screen → geographic. `None` when the pixel is off the projected globe.
    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)>;

    /// Screen-space outline of the full globe, used for the sea fill.
    fn sphere(&self) -> Vec<(f64, f64)>;
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

#[inline(always)]
fn vec3_to_lonlat(p: DVec3) -> (f64, f64) {
    let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = p.y.atan2(p.x).to_degrees();
    (lon, lat)
}

#[inline(always)]
fn wrap_lon(lon: f64) -> f64 {
    let w = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if w == -180.0 && lon > 0.0 {
        180.0
    } else {
        w
    }
}

/// Plate carrée with full spherical rotation: rotate the globe by [λ, φ],
/// then map rotated longitude/latitude linearly to screen.
pub struct Equirectangular {
    scale: f64,
    translate: [f64; 2],
    rotate_lon: f64,
    sin_phi: f64,
    cos_phi: f64,
}

impl Equirectangular {
    pub fn new(view: &ViewState) -> Self {
        let phi = view.rotate[1].to_radians();
        Self {
            scale: view.scale,
            translate: view.translate,
            rotate_lon: view.rotate[0],
            sin_phi: phi.sin(),
            cos_phi: phi.cos(),
        }
    }

    /// Apply the λ shift then tilt around the y axis by φ.
    #[inline(always)]
    fn rotate_forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let p = lonlat_to_vec3(wrap_lon(lon + self.rotate_lon), lat);
        let q = DVec3::new(
            p.x * self.cos_phi - p.z * self.sin_phi,
            p.y,
            p.x * self.sin_phi + p.z * self.cos_phi,
        );
        vec3_to_lonlat(q)
    }

    #[inline(always)]
    fn rotate_inverse(&self, lon: f64, lat: f64) -> (f64, f64) {
        let q = lonlat_to_vec3(lon, lat);
        let p = DVec3::new(
            q.x * self.cos_phi + q.z * self.sin_phi,
            q.y,
            -q.x * self.sin_phi + q.z * self.cos_phi,
        );
        let (lon, lat) = vec3_to_lonlat(p);
        (wrap_lon(lon - self.rotate_lon), lat)
    }
}

impl Projection for Equirectangular {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let (rlon, rlat) = self.rotate_forward(lon, lat);
        Some((
            self.translate[0] + self.scale * rlon.to_radians(),
            self.translate[1] - self.scale * rlat.to_radians(),
        ))
    }

    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let rlon = (x - self.translate[0]) / self.scale;
        let rlat = (self.translate[1] - y) / self.scale;
        if rlon.abs() > PI || rlat.abs() > PI / 2.0 {
            return None;
        }
        Some(self.rotate_inverse(rlon.to_degrees(), rlat.to_degrees()))
    }

    fn sphere(&self) -> Vec<(f64, f64)> {
        let w = self.scale * PI;
        let h = self.scale * PI / 2.0;
        let [tx, ty] = self.translate;
        vec![
            (tx - w, ty - h),
            (tx + w, ty - h),
            (tx + w, ty + h),
            (tx - w, ty + h),
        ]
    }
}

/// Orthographic globe: the visible hemisphere of a rotating sphere.
/// Orientation is an orthonormal basis (forward points at the camera), so
/// projecting a point is three dot products.
pub struct Orthographic {
    forward: DVec3,
    right: DVec3,
    up: DVec3,
    radius: f64,
    translate: [f64; 2],
}

impl Orthographic {
    pub fn new(view: &ViewState) -> Self {
        // rotate = [-lon, -lat] of the point facing the camera.
        let lon_rad = (-view.rotate[0]).to_radians();
        let lat_rad = (-view.rotate[1]).to_radians();

        let forward = DVec3::new(
            lat_rad.cos() * lon_rad.cos(),
            lat_rad.cos() * lon_rad.sin(),
            lat_rad.sin(),
        );
        // Derivative of forward w.r.t. latitude points north on the sphere.
        let raw_up = DVec3::new(
            -lat_rad.sin() * lon_rad.cos(),
            -lat_rad.sin() * lon_rad.sin(),
            lat_rad.cos(),
        );
        let right = raw_up.cross(forward).normalize();
        let up = forward.cross(right).normalize();

        Self {
            forward,
            right,
            up,
            radius: view.scale,
            translate: view.translate,
        }
    }
}

impl Projection for Orthographic {
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let p = lonlat_to_vec3(lon, lat);
        if p.dot(self.forward) < 0.0 {
            return None;
        }
        let sx = p.dot(self.right);
        let sy = p.dot(self.up);
        Some((
            self.translate[0] + sx * self.radius,
            self.translate[1] - sy * self.radius,
        ))
    }

    fn invert(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let sx = (x - self.translate[0]) / self.radius;
        let sy = -(y - self.translate[1]) / self.radius;
        let r2 = sx * sx + sy * sy;
        if r2 > 1.0 {
            return None;
        }
        let sz = (1.0 - r2).sqrt();
        let p = self.right * sx + self.up * sy + self.forward * sz;
        Some(vec3_to_lonlat(p))
    }

    fn sphere(&self) -> Vec<(f64, f64)> {
        let [tx, ty] = self.translate;
        (0..64)
            .map(|i| {
                let a = i as f64 / 64.0 * 2.0 * PI;
                (tx + a.cos() * self.radius, ty + a.sin() * self.radius)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        ViewState::new(400, 200)
    }

    #[test]
    fn equirect_center_maps_to_translate() {
        let proj = Equirectangular::new(&view());
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert!((x - 200.0).abs() < 1e-9);
        assert!((y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn equirect_roundtrip_with_rotation() {
        let mut v = view();
        v.rotate = [47.0, -12.5];
        let proj = Equirectangular::new(&v);
        for (lon, lat) in [(0.0, 0.0), (-120.0, 55.0), (13.0, -88.0), (179.0, 2.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.invert(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-6, "{lon} vs {lon2}");
            assert!((lat - lat2).abs() < 1e-6, "{lat} vs {lat2}");
        }
    }

    #[test]
    fn rotation_centers_negated_point() {
        // rotate = [-lon, -lat] brings (lon, lat) to the projection origin.
        let mut v = view();
        v.rotate = [-30.0, -40.0];
        for proj in [
            Box::new(Equirectangular::new(&v)) as Box<dyn Projection>,
            Box::new(Orthographic::new(&v)),
        ] {
            let (x, y) = proj.forward(30.0, 40.0).unwrap();
            assert!((x - 200.0).abs() < 1e-6);
            assert!((y - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn orthographic_orientation_matches_screen_axes() {
        // East of center lands right of the origin, north lands above it.
        let proj = Orthographic::new(&view());
        let (xe, _) = proj.forward(10.0, 0.0).unwrap();
        assert!(xe > 200.0);
        let (_, yn) = proj.forward(0.0, 10.0).unwrap();
        assert!(yn < 100.0);
    }

    #[test]
    fn orthographic_hides_back_hemisphere() {
        let proj = Orthographic::new(&view());
        assert!(proj.forward(0.0, 0.0).is_some());
        assert!(proj.forward(180.0, 0.0).is_none());
    }

    #[test]
    fn orthographic_invert_off_disk_is_none() {
        let v = view();
        let proj = Orthographic::new(&v);
        // Disk radius is scale=150 around (200, 100).
        assert!(proj.invert(200.0, 100.0).is_some());
        assert!(proj.invert(360.0, 100.0).is_none());
    }

    #[test]
    fn orthographic_roundtrip() {
        let mut v = view();
        v.rotate = [100.0, 20.0];
        let proj = Orthographic::new(&v);
        let (lon, lat) = (-100.0, -20.0);
        let (x, y) = proj.forward(lon, lat).unwrap();
        let (lon2, lat2) = proj.invert(x, y).unwrap();
        assert!((lon - lon2).abs() < 1e-6);
        assert!((lat - lat2).abs() < 1e-6);
    }

    #[test]
    fn nan_input_is_rejected() {
        let proj = Orthographic::new(&view());
        assert!(proj.invert(f64::NAN, 10.0).is_none());
        assert!(proj.forward(f64::NAN, 10.0).is_none());
        let eq = Equirectangular::new(&view());
        assert!(eq.invert(10.0, f64::NAN).is_none());
    }
}
