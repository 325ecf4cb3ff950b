use image::GrayImage;
use log::debug;
use orb_brief::{smooth, BriefGenerator};
use orb_core::{Descriptor, Keypoint, OrbConfig};
use orb_fast::DetectorBuilder;
use crate::error::CompareResult;

/// Keypoints in base-image coordinates with one descriptor each
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl Features {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// ORB feature extractor combining the FAST detector with steered BRIEF
#[derive(Debug, Clone)]
pub struct OrbExtractor {
    cfg: OrbConfig,
}

impl OrbExtractor {
    pub fn new(cfg: OrbConfig) -> CompareResult<Self> {
        orb_fast::validate_config(&cfg)?;
        Ok(Self { cfg })
    }

    /// Detect keypoints and describe each on the level it was found on.
    pub fn detect_and_describe(&self, img: &GrayImage) -> CompareResult<Features> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        if w == 0 || h == 0 {
            return Ok(Features::default());
        }

        let detector = DetectorBuilder::from_config(self.cfg.clone(), w, h).build()?;
        let levels = detector.detect_levels(img.as_raw())?;

        let mut features = Features::default();
        for det in levels.iter().filter(|d| !d.keypoints.is_empty()) {
            let (lw, lh) = (det.level.width, det.level.height);
            let smoothed = smooth(&det.image, lw, lh);
            let brief = BriefGenerator::new(lw, lh).with_patch_size(self.cfg.patch_size);
            features.descriptors.extend(brief.generate_descriptors(&smoothed, &det.keypoints));
            features.keypoints.extend(det.base_keypoints());
        }

        debug!("extracted {} features from {}x{}", features.len(), w, h);
        Ok(features)
    }

    /// Describe both views concurrently
    pub fn describe_pair(&self, a: &GrayImage, b: &GrayImage) -> CompareResult<(Features, Features)> {
        let (fa, fb) = rayon::join(|| self.detect_and_describe(a), || self.detect_and_describe(b));
        Ok((fa?, fb?))
    }

    pub fn config(&self) -> &OrbConfig {
        &self.cfg
    }
}
