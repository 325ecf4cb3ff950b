//! Multi-scale FAST keypoint detection.

pub mod builder;
pub mod corner_detection;
pub mod detector;
pub mod error;
pub mod pyramid;
pub mod refinement;
pub mod types;
pub mod utils;

pub use builder::DetectorBuilder;
pub use corner_detection::CornerDetector;
pub use detector::{validate_config, FastDetector};
pub use error::{FastError, FastResult};
pub use pyramid::ImagePyramid;
pub use refinement::KeypointRefinement;
pub use types::{LevelDetection, ScaleLevel};
