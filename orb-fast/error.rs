use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FastError {
    #[error("Invalid image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize { width: usize, height: usize },
    #[error("Image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },
    #[error("Invalid threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),
    #[error("Invalid patch size {0} (must be odd and at least 7)")]
    InvalidPatchSize(usize),
    #[error("Invalid pyramid scale factor {0} (must be finite and > 1)")]
    InvalidScaleFactor(f32),
    #[error("Invalid pyramid level count {0} (must be 1-32)")]
    InvalidLevelCount(usize),
    #[error("Feature budget must be at least 1")]
    InvalidFeatureBudget,
}

pub type FastResult<T> = Result<T, FastError>;
