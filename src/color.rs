/// Maps a decoded cell value in `[0, 255]` to an RGB color. The alpha channel
/// is not the scale's business: the grid builder forces it to 255.
pub trait ColorScale {
    fn color(&self, value: u8) -> [u8; 3];
}

/// Quantized scale over evenly sized value bands, matching the widget's
/// historical default palette (red through green, 10 stops).
pub struct QuantizedScale {
    stops: Vec<[u8; 3]>,
}

impl QuantizedScale {
    pub fn new(stops: Vec<[u8; 3]>) -> Self {
        assert!(!stops.is_empty(), "a scale needs at least one stop");
        Self { stops }
    }

    /// Parse stops from `#rrggbb` strings. Malformed entries are rejected.
    pub fn from_hex(hex: &[&str]) -> anyhow::Result<Self> {
        let mut stops = Vec::with_capacity(hex.len());
        for h in hex {
            let h = h.trim_start_matches('#');
            anyhow::ensure!(h.len() == 6, "expected #rrggbb, got {h:?}");
            let r = u8::from_str_radix(&h[0..2], 16)?;
            let g = u8::from_str_radix(&h[2..4], 16)?;
            let b = u8::from_str_radix(&h[4..6], 16)?;
            stops.push([r, g, b]);
        }
        Ok(Self::new(stops))
    }
}

impl Default for QuantizedScale {
    fn default() -> Self {
        Self::from_hex(&[
            "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee08b", "#d9ef8b", "#a6d96a",
            "#66bd63", "#1a9850", "#006837",
        ])
        .unwrap()
    }
}

impl ColorScale for QuantizedScale {
    fn color(&self, value: u8) -> [u8; 3] {
        let band = (value as usize * self.stops.len()) / 256;
        self.stops[band.min(self.stops.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_endpoints() {
        let scale = QuantizedScale::default();
        assert_eq!(scale.color(0), [0xa5, 0x00, 0x26]);
        assert_eq!(scale.color(255), [0x00, 0x68, 0x37]);
    }

    #[test]
    fn bands_are_even() {
        let scale = QuantizedScale::default();
        // 256 values over 10 stops: band boundaries every 25.6 values.
        assert_eq!(scale.color(25), scale.color(0));
        assert_ne!(scale.color(26), scale.color(25));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(QuantizedScale::from_hex(&["#12345"]).is_err());
        assert!(QuantizedScale::from_hex(&["#gggggg"]).is_err());
    }
}
