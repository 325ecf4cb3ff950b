use orb_core::OrbConfig;
use orb_homography::{GeometricVerifier, RansacOptions};
use orb_match::Matcher;
use crate::error::{CompareError, CompareResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::path::Path;

/// Every tunable of one comparison run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompareConfig {
    /// Lowe ratio: keep a match only when `d1 < ratio * d2`
    pub ratio_threshold: f32,
    /// Candidates (and later inliers) needed before a result counts as verified
    pub min_matches_for_fit: usize,
    /// Inlier tolerance in pixels
    pub reprojection_threshold: f64,
    /// Best candidates passed to the homography fit
    pub max_matches_for_fit: usize,
    /// Inlier lines drawn on the verified visualizations
    pub max_lines_drawn: usize,
    pub ransac_max_iters: usize,
    pub ransac_confidence: f64,
    pub seed: u64,
    pub detector: OrbConfig,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: orb_match::DEFAULT_RATIO_THRESHOLD,
            min_matches_for_fit: orb_homography::DEFAULT_MIN_MATCHES,
            reprojection_threshold: 3.0,
            max_matches_for_fit: orb_match::DEFAULT_MAX_MATCHES,
            max_lines_drawn: 80,
            ransac_max_iters: 2000,
            ransac_confidence: 0.995,
            seed: 0,
            detector: OrbConfig::default(),
            name: None,
            description: None,
        }
    }
}

impl CompareConfig {
    /// Fewer features and hypotheses for quick previews
    pub fn fast_preset() -> Self {
        Self {
            ransac_max_iters: 500,
            detector: OrbConfig {
                max_features: 1000,
                n_levels: 4,
                ..OrbConfig::default()
            },
            name: Some("Fast".to_string()),
            description: Some("Smaller feature budget and RANSAC cap for quick previews".to_string()),
            ..Self::default()
        }
    }

    /// Add metadata to configuration
    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    /// Reject settings that cannot produce a meaningful run
    pub fn validate(&self) -> CompareResult<()> {
        if !(self.ratio_threshold > 0.0 && self.ratio_threshold <= 1.0) {
            return Err(CompareError::InvalidConfig(format!(
                "ratio_threshold {} must be in (0, 1]",
                self.ratio_threshold
            )));
        }
        if self.min_matches_for_fit < 4 {
            return Err(CompareError::InvalidConfig(format!(
                "min_matches_for_fit {} must be at least 4",
                self.min_matches_for_fit
            )));
        }
        if self.max_matches_for_fit < self.min_matches_for_fit {
            return Err(CompareError::InvalidConfig(format!(
                "max_matches_for_fit {} is below min_matches_for_fit {}",
                self.max_matches_for_fit, self.min_matches_for_fit
            )));
        }
        if !(self.reprojection_threshold.is_finite() && self.reprojection_threshold > 0.0) {
            return Err(CompareError::InvalidConfig(format!(
                "reprojection_threshold {} must be positive",
                self.reprojection_threshold
            )));
        }
        if self.ransac_max_iters == 0 {
            return Err(CompareError::InvalidConfig("ransac_max_iters must be at least 1".to_string()));
        }
        if !(self.ransac_confidence > 0.0 && self.ransac_confidence < 1.0) {
            return Err(CompareError::InvalidConfig(format!(
                "ransac_confidence {} must be in (0, 1)",
                self.ransac_confidence
            )));
        }
        orb_fast::validate_config(&self.detector)?;
        Ok(())
    }

    pub fn matcher(&self) -> Matcher {
        Matcher::new(self.ratio_threshold, self.max_matches_for_fit)
    }

    pub fn verifier(&self) -> GeometricVerifier {
        GeometricVerifier::new(
            self.min_matches_for_fit,
            RansacOptions {
                reprojection_threshold: self.reprojection_threshold,
                max_iters: self.ransac_max_iters,
                confidence: self.ransac_confidence,
                seed: self.seed,
                ..RansacOptions::default()
            },
        )
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "CompareConfig{}: ratio={:.2}, min_matches={}, max_matches={}, max_lines={}, reproj={:.1}px, ransac=[iters:{}, conf:{}, seed:{}], detector=[features:{}, scale:{:.2}, levels:{}, edge:{}, patch:{}, fast:{}]",
            self.name.as_deref().map(|n| format!(" ({})", n)).unwrap_or_default(),
            self.ratio_threshold,
            self.min_matches_for_fit,
            self.max_matches_for_fit,
            self.max_lines_drawn,
            self.reprojection_threshold,
            self.ransac_max_iters,
            self.ransac_confidence,
            self.seed,
            self.detector.max_features,
            self.detector.scale_factor,
            self.detector.n_levels,
            self.detector.edge_threshold,
            self.detector.patch_size,
            self.detector.fast_threshold,
        )
    }

    /// Load a `.toml` or `.json` file, chosen by extension
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<Path>>(path: P) -> CompareResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::load_toml(path),
            Some("json") => Self::load_json(path),
            _ => Err(CompareError::InvalidConfig(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> CompareResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<Path>>(path: P) -> CompareResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> CompareResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<Path>>(path: P) -> CompareResult<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> CompareResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CompareError::InvalidConfig(e.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> CompareResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| CompareError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> CompareResult<String> {
        toml::to_string_pretty(self).map_err(|e| CompareError::InvalidConfig(e.to_string()))
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> CompareResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| CompareError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
