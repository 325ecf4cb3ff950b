use orb_core::{Image, OrbConfig};
use crate::types::ScaleLevel;

/// Image pyramid operations for multi-scale feature detection
pub struct ImagePyramid;

impl ImagePyramid {
    /// Generate scale levels for the image pyramid.
    ///
    /// Level `i` is `scale_factor^i` times smaller than the base image. Levels
    /// that would leave no pixel inside `border` are dropped, and so is every
    /// level after them.
    pub fn generate_scale_levels(width: usize, height: usize, cfg: &OrbConfig, border: usize) -> Vec<ScaleLevel> {
        let quotas = Self::features_per_level(cfg.max_features, cfg.scale_factor, cfg.n_levels);
        let mut levels = Vec::with_capacity(cfg.n_levels);
        let mut current_scale = 1.0f32;

        for (level, n_features) in quotas.into_iter().enumerate() {
            let scaled_width = ((width as f32) / current_scale).round() as usize;
            let scaled_height = ((height as f32) / current_scale).round() as usize;

            // Stop when no pixel is left for the segment test
            if scaled_width <= 2 * border || scaled_height <= 2 * border {
                break;
            }

            levels.push(ScaleLevel {
                level,
                scale: current_scale,
                width: scaled_width,
                height: scaled_height,
                n_features,
            });

            current_scale *= cfg.scale_factor;
        }

        levels
    }

    /// Split the feature budget geometrically across levels, finer levels first.
    /// The last level takes whatever rounding left over, so the quotas never
    /// sum past `max_features`.
    pub fn features_per_level(max_features: usize, scale_factor: f32, n_levels: usize) -> Vec<usize> {
        if n_levels == 0 {
            return Vec::new();
        }

        let factor = 1.0 / scale_factor;
        let mut desired = max_features as f32 * (1.0 - factor) / (1.0 - factor.powi(n_levels as i32));
        let mut quotas = Vec::with_capacity(n_levels);
        let mut assigned = 0usize;

        for _ in 0..n_levels - 1 {
            let quota = (desired.round().max(0.0) as usize).min(max_features - assigned);
            quotas.push(quota);
            assigned += quota;
            desired *= factor;
        }
        quotas.push(max_features - assigned);

        quotas
    }

    /// Build the pyramid; each level is resampled from the one above it.
    pub fn build_image_pyramid(img: &Image, width: usize, height: usize, scale_levels: &[ScaleLevel]) -> Vec<Image> {
        let mut pyramid: Vec<Image> = Vec::with_capacity(scale_levels.len());
        let (mut prev_w, mut prev_h) = (width, height);

        for scale_level in scale_levels {
            let next = match pyramid.last() {
                None => img.clone(),
                Some(prev) => Self::downsample_image(prev, prev_w, prev_h, scale_level.width, scale_level.height),
            };
            prev_w = scale_level.width;
            prev_h = scale_level.height;
            pyramid.push(next);
        }

        pyramid
    }

    /// Downsample image using bilinear interpolation at pixel centres
    fn downsample_image(img: &Image, src_width: usize, src_height: usize, target_width: usize, target_height: usize) -> Image {
        let mut downsampled = vec![0u8; target_width * target_height];

        let x_ratio = src_width as f32 / target_width as f32;
        let y_ratio = src_height as f32 / target_height as f32;

        for y in 0..target_height {
            let src_y = ((y as f32 + 0.5) * y_ratio - 0.5).max(0.0);
            for x in 0..target_width {
                let src_x = ((x as f32 + 0.5) * x_ratio - 0.5).max(0.0);
                let value = Self::bilinear_sample(img, src_width, src_height, src_x, src_y);
                downsampled[y * target_width + x] = value.round().clamp(0.0, 255.0) as u8;
            }
        }

        downsampled
    }

    /// Sample image at fractional coordinates using bilinear interpolation
    fn bilinear_sample(img: &Image, width: usize, height: usize, x: f32, y: f32) -> f32 {
        let x1 = (x.floor() as usize).min(width - 1);
        let y1 = (y.floor() as usize).min(height - 1);
        let x2 = (x1 + 1).min(width - 1);
        let y2 = (y1 + 1).min(height - 1);

        let fx = x - x1 as f32;
        let fy = y - y1 as f32;

        let p11 = img[y1 * width + x1] as f32;
        let p12 = img[y1 * width + x2] as f32;
        let p21 = img[y2 * width + x1] as f32;
        let p22 = img[y2 * width + x2] as f32;

        let interpolated_top = p11 * (1.0 - fx) + p12 * fx;
        let interpolated_bottom = p21 * (1.0 - fx) + p22 * fx;

        interpolated_top * (1.0 - fy) + interpolated_bottom * fy
    }
}
