use orb_core::{Descriptor, Image, Keypoint};
use rayon::prelude::*;

mod pattern;

pub use pattern::PATTERN_31;

const DESCRIPTOR_SIZE: usize = 32;

/// Patch size the sampling pattern was laid out for
const PATTERN_PATCH_SIZE: f32 = 31.0;

const SMOOTHING_RADIUS: usize = 3;
const SMOOTHING_SIGMA: f32 = 2.0;

/// Steered BRIEF descriptors on one (pyramid level) image
pub struct BriefGenerator {
    w: usize,
    h: usize,
    pattern_scale: f32,
}

impl BriefGenerator {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0);
        Self {
            w: width,
            h: height,
            pattern_scale: 1.0,
        }
    }

    /// Stretch the sampling pattern to cover a `patch_size` patch
    pub fn with_patch_size(mut self, patch_size: usize) -> Self {
        self.pattern_scale = patch_size as f32 / PATTERN_PATCH_SIZE;
        self
    }

    /// One descriptor per keypoint, in keypoint order. Keypoint coordinates
    /// are in this image's pixel grid; `img` should already be smoothed.
    pub fn generate_descriptors(&self, img: &Image, kps: &[Keypoint]) -> Vec<Descriptor> {
        kps.par_iter()
            .map(|kp| {
                let (s, c) = kp.angle.sin_cos();
                let (s, c) = (s * self.pattern_scale, c * self.pattern_scale);
                let (cx, cy) = (kp.x, kp.y);
                let mut d = [0u8; DESCRIPTOR_SIZE];

                for (i, &(dx1, dy1, dx2, dy2)) in PATTERN_31.iter().enumerate() {
                    let (dx1, dy1, dx2, dy2) = (dx1 as f32, dy1 as f32, dx2 as f32, dy2 as f32);
                    // Rotate the pair by the keypoint angle around the keypoint
                    let (rx1, ry1) = (cx + c * dx1 - s * dy1, cy + s * dx1 + c * dy1);
                    let (rx2, ry2) = (cx + c * dx2 - s * dy2, cy + s * dx2 + c * dy2);

                    let val1 = self.bilinear_sample(img, rx1, ry1);
                    let val2 = self.bilinear_sample(img, rx2, ry2);

                    let bit = (val1 < val2) as u8;
                    d[i / 8] |= bit << (i % 8);
                }
                d
            })
            .collect()
    }

    /// Bilinear interpolation, clamped to the image bounds
    fn bilinear_sample(&self, img: &Image, x: f32, y: f32) -> f32 {
        let x = x.clamp(0.0, (self.w - 1) as f32);
        let y = y.clamp(0.0, (self.h - 1) as f32);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.w - 1);
        let y1 = (y0 + 1).min(self.h - 1);

        let dx = x - x0 as f32;
        let dy = y - y0 as f32;

        let p00 = img[y0 * self.w + x0] as f32;
        let p10 = img[y0 * self.w + x1] as f32;
        let p01 = img[y1 * self.w + x0] as f32;
        let p11 = img[y1 * self.w + x1] as f32;

        let top = p00 * (1.0 - dx) + p10 * dx;
        let bottom = p01 * (1.0 - dx) + p11 * dx;

        top * (1.0 - dy) + bottom * dy
    }
}

/// 7x7 Gaussian smoothing (sigma 2) applied before the binary tests, with
/// edge pixels replicated at the borders.
pub fn smooth(img: &Image, width: usize, height: usize) -> Image {
    let kernel = gaussian_kernel(SMOOTHING_RADIUS, SMOOTHING_SIGMA);
    let r = SMOOTHING_RADIUS as i32;

    let mut horizontal = vec![0f32; width * height];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = (-r..=r)
                    .map(|k| {
                        let xx = (x as i32 + k).clamp(0, width as i32 - 1) as usize;
                        img[y * width + xx] as f32 * kernel[(k + r) as usize]
                    })
                    .sum();
            }
        });

    let mut out = vec![0u8; width * height];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let v: f32 = (-r..=r)
                    .map(|k| {
                        let yy = (y as i32 + k).clamp(0, height as i32 - 1) as usize;
                        horizontal[yy * width + x] * kernel[(k + r) as usize]
                    })
                    .sum();
                *px = v.round().clamp(0.0, 255.0) as u8;
            }
        });

    out
}

fn gaussian_kernel(radius: usize, sigma: f32) -> Vec<f32> {
    let r = radius as i32;
    let weights: Vec<f32> = (-r..=r)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
