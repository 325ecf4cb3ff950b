pub mod config;
pub mod draw;
pub mod error;
pub mod extractor;
pub mod normalize;
pub mod pipeline;

pub use config::CompareConfig;
pub use draw::RenderMode;
pub use error::{CompareError, CompareResult};
pub use extractor::{Features, OrbExtractor};
pub use normalize::{load_pair, normalize_pair, resize_to_height, NormalizedPair};
pub use pipeline::{compare, compare_images, Artifact, ArtifactKind, Comparison, Status};

pub use orb_core::{self, CandidateMatch, Descriptor, Keypoint, OrbConfig};
