use orb_core::OrbConfig;
use crate::detector::FastDetector;
use crate::error::FastResult;

/// Fluent builder for a [`FastDetector`]
#[derive(Debug, Clone)]
pub struct DetectorBuilder {
    config: OrbConfig,
    width: usize,
    height: usize,
}

impl DetectorBuilder {
    /// Create a new builder with default settings
    pub fn new(width: usize, height: usize) -> Self {
        Self::from_config(OrbConfig::default(), width, height)
    }

    /// Start from an existing configuration
    pub fn from_config(config: OrbConfig, width: usize, height: usize) -> Self {
        Self { config, width, height }
    }

    /// Upper bound on keypoints over all pyramid levels
    pub fn max_features(mut self, max_features: usize) -> Self {
        self.config.max_features = max_features;
        self
    }

    /// Ratio between consecutive pyramid levels
    pub fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.config.scale_factor = scale_factor;
        self
    }

    /// Number of pyramid levels
    pub fn levels(mut self, n_levels: usize) -> Self {
        self.config.n_levels = n_levels;
        self
    }

    /// Pixels excluded from detection along the image edges
    pub fn edge_threshold(mut self, edge_threshold: usize) -> Self {
        self.config.edge_threshold = edge_threshold;
        self
    }

    /// Set the patch size for orientation and descriptors
    pub fn patch_size(mut self, patch_size: usize) -> Self {
        self.config.patch_size = patch_size;
        self
    }

    /// Set the FAST threshold (1-127)
    pub fn threshold(mut self, threshold: u8) -> Self {
        self.config.fast_threshold = threshold;
        self
    }

    /// Set the number of threads for parallel processing
    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.n_threads = n_threads;
        self
    }

    /// Build the detector
    pub fn build(self) -> FastResult<FastDetector> {
        FastDetector::new(self.config, self.width, self.height)
    }

    /// Generate a summary of the builder's configuration
    pub fn summary(&self) -> String {
        format!(
            "DetectorBuilder: {}x{}, features={}, scale={:.2}, levels={}, edge={}, patch={}, threshold={}, threads={}",
            self.width, self.height, self.config.max_features, self.config.scale_factor,
            self.config.n_levels, self.config.edge_threshold, self.config.patch_size,
            self.config.fast_threshold, self.config.n_threads
        )
    }

    pub fn config(&self) -> &OrbConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}
