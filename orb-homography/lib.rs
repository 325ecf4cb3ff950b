pub mod dlt;
pub mod error;
pub mod ransac;
pub mod verify;

pub use dlt::{project, reprojection_error, HomographySolver};
pub use error::{HomographyError, HomographyResult};
pub use nalgebra::{Matrix3, Point2};
pub use ransac::{find_homography, HomographyFit, RansacOptions};
pub use verify::{GeometricVerifier, Verification, DEFAULT_MIN_MATCHES};
