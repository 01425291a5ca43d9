/// RGBA pixel surface the layer stack composites into. This is the crate's
/// realization of the "2D drawing surface" collaborator; hosts blit its
/// buffer to whatever display they drive.
pub struct PixelCanvas {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 4],
        }
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The backing RGBA buffer, `width * height * 4` bytes, row-major.
    #[inline(always)]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Fill the whole surface with one color.
    pub fn clear(&mut self, color: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Resize the surface, discarding the current contents.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height * 4, 0);
    }

    /// Write one pixel. Fully transparent colors are a no-op so "no
    /// contribution" stays cheap for callers.
    #[inline(always)]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: [u8; 4]) {
        if x >= self.width || y >= self.height || color[3] == 0 {
            return;
        }
        let off = (y * self.width + x) * 4;
        self.data[off..off + 4].copy_from_slice(&color);
    }

    /// Write one pixel using signed coordinates (ignores negatives).
    #[inline(always)]
    pub fn set_pixel_signed(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    /// The pixel at (x, y), for tests and hit highlighting.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y * self.width + x) * 4;
        Some([
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ])
    }
}
