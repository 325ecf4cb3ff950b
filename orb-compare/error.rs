use std::path::PathBuf;
use orb_fast::FastError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Failed to load image {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Detector error: {0}")]
    Detector(#[from] FastError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
}

pub type CompareResult<T> = Result<T, CompareError>;
