use orb_core::{Image, Keypoint, OrbConfig};
use crate::corner_detection::{CornerDetector, HARRIS_HALF_BLOCK};
use crate::error::{FastError, FastResult};
use crate::pyramid::ImagePyramid;
use crate::refinement::KeypointRefinement;
use crate::types::{LevelDetection, ScaleLevel};
use log::debug;
use rayon::prelude::*;

/// Upper bound on pyramid depth accepted by the detector
const MAX_LEVELS: usize = 32;

/// Check detector tuning without building a detector.
pub fn validate_config(cfg: &OrbConfig) -> FastResult<()> {
    // 0 would accept every pixel, >127 overflows the signed comparison range
    if cfg.fast_threshold == 0 || cfg.fast_threshold > 127 {
        return Err(FastError::InvalidThreshold(cfg.fast_threshold));
    }
    if cfg.patch_size % 2 == 0 || cfg.patch_size < 7 {
        return Err(FastError::InvalidPatchSize(cfg.patch_size));
    }
    if !cfg.scale_factor.is_finite() || cfg.scale_factor <= 1.0 {
        return Err(FastError::InvalidScaleFactor(cfg.scale_factor));
    }
    if cfg.n_levels == 0 || cfg.n_levels > MAX_LEVELS {
        return Err(FastError::InvalidLevelCount(cfg.n_levels));
    }
    if cfg.max_features == 0 {
        return Err(FastError::InvalidFeatureBudget);
    }
    Ok(())
}

/// Multi-scale FAST detector with Harris ranking and intensity-centroid
/// orientation, sized for one image resolution.
#[derive(Debug, Clone)]
pub struct FastDetector {
    cfg: OrbConfig,
    w: usize,
    h: usize,
    border: usize,
    scale_levels: Vec<ScaleLevel>,
    patch_extents: Vec<i32>,
}

impl FastDetector {
    /// Creates a new FAST detector with validation
    pub fn new(cfg: OrbConfig, width: usize, height: usize) -> FastResult<Self> {
        if width == 0 || height == 0 {
            return Err(FastError::InvalidImageSize { width, height });
        }
        validate_config(&cfg)?;

        // Harris needs its window plus one pixel for the Sobel taps
        let border = cfg.edge_threshold.max(HARRIS_HALF_BLOCK + 1);
        let scale_levels = ImagePyramid::generate_scale_levels(width, height, &cfg, border);
        let patch_extents = KeypointRefinement::circular_extents(cfg.patch_size / 2);

        Ok(Self {
            cfg,
            w: width,
            h: height,
            border,
            scale_levels,
            patch_extents,
        })
    }

    /// Validates image data before processing
    fn validate_image(&self, img: &Image) -> FastResult<()> {
        let expected_len = self.w * self.h;
        if img.len() != expected_len {
            return Err(FastError::InvalidImageData {
                expected_len,
                actual_len: img.len(),
            });
        }
        Ok(())
    }

    /// Detect keypoints on every pyramid level. Keypoints stay in their level's
    /// coordinates so descriptors can be computed on the level image.
    pub fn detect_levels(&self, img: &Image) -> FastResult<Vec<LevelDetection>> {
        self.validate_image(img)?;

        let pyramid = ImagePyramid::build_image_pyramid(img, self.w, self.h, &self.scale_levels);

        // Order-preserving collect keeps the output independent of scheduling
        let detections: Vec<LevelDetection> = self
            .scale_levels
            .par_iter()
            .zip(pyramid.into_par_iter())
            .map(|(scale_level, level_img)| {
                let keypoints = self.detect_keypoints_at_scale(&level_img, scale_level);
                LevelDetection {
                    level: *scale_level,
                    image: level_img,
                    keypoints,
                }
            })
            .collect();

        debug!(
            "detected {} keypoints over {} levels ({}x{})",
            detections.iter().map(|d| d.keypoints.len()).sum::<usize>(),
            detections.len(),
            self.w,
            self.h
        );

        Ok(detections)
    }

    /// Detect keypoints and return them in base-level coordinates
    pub fn detect_keypoints(&self, img: &Image) -> FastResult<Vec<Keypoint>> {
        let levels = self.detect_levels(img)?;
        Ok(levels.iter().flat_map(|d| d.base_keypoints()).collect())
    }

    /// Detect, suppress, rank and orient keypoints on a single level
    pub fn detect_keypoints_at_scale(&self, img: &Image, scale_level: &ScaleLevel) -> Vec<Keypoint> {
        if scale_level.n_features == 0 {
            return Vec::new();
        }
        let (width, height) = (scale_level.width, scale_level.height);

        let corners = CornerDetector::detect_corners(img, scale_level, self.cfg.fast_threshold, self.border);
        let size = self.cfg.patch_size as f32 * scale_level.scale;
        let scored: Vec<Keypoint> = corners
            .into_iter()
            .map(|(x, y)| Keypoint {
                x: x as f32,
                y: y as f32,
                angle: 0.0,
                size,
                response: CornerDetector::harris_response(img, width, x, y),
                octave: scale_level.level,
            })
            .collect();

        let suppressed = KeypointRefinement::non_maximum_suppression(&scored, width, height);
        let mut best = KeypointRefinement::retain_best(suppressed, scale_level.n_features);

        for kp in best.iter_mut() {
            kp.angle = KeypointRefinement::compute_orientation(img, width, height, kp.x, kp.y, &self.patch_extents);
        }

        best
    }

    /// Get scale levels for this detector
    pub fn scale_levels(&self) -> &[ScaleLevel] {
        &self.scale_levels
    }

    /// Get detector configuration
    pub fn config(&self) -> &OrbConfig {
        &self.cfg
    }

    /// Get image dimensions
    pub fn dimensions(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    /// Pixels excluded from detection along each level edge
    pub fn border(&self) -> usize {
        self.border
    }
}
