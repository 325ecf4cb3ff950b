use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HomographyError {
    #[error("Need at least 4 point correspondences, got {got}")]
    TooFewPoints { got: usize },
    #[error("Point sets differ in length: {src} source vs {dst} destination")]
    LengthMismatch { src: usize, dst: usize },
    #[error("Degenerate point configuration")]
    DegenerateConfiguration,
    #[error("Singular value decomposition failed")]
    SvdFailed,
}

pub type HomographyResult<T> = Result<T, HomographyError>;
