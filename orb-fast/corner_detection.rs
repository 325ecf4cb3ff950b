use orb_core::Image;
use crate::types::{CornerType, ScaleLevel};
use crate::utils::has_contiguous_arc;
use rayon::prelude::*;

/// Minimum arc of the FAST-9 segment test
const FAST_ARC: usize = 9;

/// Half side of the Harris accumulation window (7x7)
pub(crate) const HARRIS_HALF_BLOCK: usize = 3;

const HARRIS_K: f32 = 0.04;

/// Corner detection algorithms (FAST and Harris)
pub struct CornerDetector;

impl CornerDetector {
    /// FAST circle offsets for corner detection, in circular order
    pub const FAST_OFFSETS: [(i32, i32); 16] = [
        (0, -3), (1, -3), (2, -2), (3, -1),
        (3, 0), (3, 1), (2, 2), (1, 3),
        (0, 3), (-1, 3), (-2, 2), (-3, 1),
        (-3, 0), (-3, -1), (-2, -2), (-1, -3),
    ];

    /// Run the segment test on every pixel at least `border` away from the
    /// level edges. Returns corner positions in raster order.
    pub fn detect_corners(img: &Image, scale_level: &ScaleLevel, threshold: u8, border: usize) -> Vec<(usize, usize)> {
        let width = scale_level.width;
        let height = scale_level.height;
        let border = border.max(3);
        if width <= 2 * border || height <= 2 * border {
            return Vec::new();
        }

        (border..height - border)
            .into_par_iter()
            .flat_map_iter(|y| {
                (border..width - border)
                    .filter(move |&x| Self::classify(img, width, x, y, threshold) != CornerType::None)
                    .map(move |x| (x, y))
            })
            .collect()
    }

    /// Segment test: nine contiguous circle pixels all brighter than
    /// `centre + threshold` or all darker than `centre - threshold`.
    /// The caller guarantees a 3-pixel margin around `(x, y)`.
    pub(crate) fn classify(img: &Image, width: usize, x: usize, y: usize, threshold: u8) -> CornerType {
        let centre = img[y * width + x] as i16;
        let t = threshold as i16;

        let mut bright: u16 = 0;
        let mut dark: u16 = 0;
        for (i, &(dx, dy)) in Self::FAST_OFFSETS.iter().enumerate() {
            let px = (x as i32 + dx) as usize;
            let py = (y as i32 + dy) as usize;
            let pixel = img[py * width + px] as i16;

            if pixel > centre + t {
                bright |= 1 << i;
            } else if pixel < centre - t {
                dark |= 1 << i;
            }
        }

        if has_contiguous_arc(bright, FAST_ARC) {
            CornerType::Bright
        } else if has_contiguous_arc(dark, FAST_ARC) {
            CornerType::Dark
        } else {
            CornerType::None
        }
    }

    /// Harris corner response over a 7x7 window of Sobel gradients.
    /// The caller guarantees a 4-pixel margin around `(x, y)`.
    pub fn harris_response(img: &Image, width: usize, x: usize, y: usize) -> f32 {
        let half = HARRIS_HALF_BLOCK as i32;
        let mut ixx = 0.0f32;
        let mut ixy = 0.0f32;
        let mut iyy = 0.0f32;

        for dy in -half..=half {
            for dx in -half..=half {
                let nx = (x as i32 + dx) as usize;
                let ny = (y as i32 + dy) as usize;
                let (gx, gy) = Self::sobel(img, width, nx, ny);

                ixx += gx * gx;
                ixy += gx * gy;
                iyy += gy * gy;
            }
        }

        // Harris corner response: det(M) - k * trace(M)^2
        let det = ixx * iyy - ixy * ixy;
        let trace = ixx + iyy;
        det - HARRIS_K * trace * trace
    }

    /// Image gradients using the Sobel operator, scaled to intensity units
    fn sobel(img: &Image, width: usize, x: usize, y: usize) -> (f32, f32) {
        let at = |xx: usize, yy: usize| img[yy * width + xx] as f32;

        // Sobel X kernel: [-1, 0, 1; -2, 0, 2; -1, 0, 1]
        let gx = at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
            - at(x - 1, y - 1) - 2.0 * at(x - 1, y) - at(x - 1, y + 1);

        // Sobel Y kernel: [-1, -2, -1; 0, 0, 0; 1, 2, 1]
        let gy = at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
            - at(x - 1, y - 1) - 2.0 * at(x, y - 1) - at(x + 1, y - 1);

        (gx / 8.0, gy / 8.0)
    }
}
