use orb_core::{Image, Keypoint};

/// Scale information for pyramid levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLevel {
    pub level: usize,
    pub scale: f32,
    pub width: usize,
    pub height: usize,
    /// Number of keypoints this level may contribute
    pub n_features: usize,
}

/// Keypoints found on one pyramid level, in that level's pixel coordinates,
/// together with the level image they were found on.
#[derive(Debug, Clone)]
pub struct LevelDetection {
    pub level: ScaleLevel,
    pub image: Image,
    pub keypoints: Vec<Keypoint>,
}

impl LevelDetection {
    /// Keypoints mapped back to base-level coordinates.
    pub fn base_keypoints(&self) -> impl Iterator<Item = Keypoint> + '_ {
        let scale = self.level.scale;
        self.keypoints.iter().map(move |kp| kp.to_base_level(scale))
    }
}

/// Segment-test classification of a candidate pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CornerType {
    Bright,
    Dark,
    None,
}
