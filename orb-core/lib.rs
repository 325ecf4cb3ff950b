#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major 8-bit grayscale image
pub type Image = Vec<u8>;

/// Key-point ≙ FAST corner + orientation (radians) + pyramid scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,        // Base-level x coordinate
    pub y: f32,        // Base-level y coordinate
    pub angle: f32,
    pub size: f32,     // Diameter of the described patch, in base-level pixels
    pub response: f32, // Harris corner response used for ranking
    pub octave: usize,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            angle: 0.0,
            size: 0.0,
            response: 0.0,
            octave: 0,
        }
    }

    /// Map a keypoint found on a pyramid level back to base-level coordinates.
    pub fn to_base_level(&self, scale: f32) -> Self {
        Self {
            x: self.x * scale,
            y: self.y * scale,
            ..*self
        }
    }
}

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; 32];

/// Number of differing bits between two descriptors.
#[inline]
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

/// A provisional correspondence between keypoint `query_idx` of image A and
/// keypoint `train_idx` of image B.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: u32,
}

/// Detector tuning shared by the FAST and BRIEF stages
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrbConfig {
    pub max_features: usize,
    pub scale_factor: f32,
    pub n_levels: usize,
    pub edge_threshold: usize,
    pub patch_size: usize,
    pub fast_threshold: u8,
    pub n_threads: usize,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            max_features: 5000,
            scale_factor: 1.2,
            n_levels: 8,
            edge_threshold: 15,
            patch_size: 31,
            fast_threshold: 20,
            n_threads: num_cpus::get().max(1),
        }
    }
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
