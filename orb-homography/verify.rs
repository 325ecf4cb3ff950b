use log::debug;
use nalgebra::{Matrix3, Point2};
use orb_core::{CandidateMatch, Keypoint};
use crate::ransac::{find_homography, RansacOptions};

pub const DEFAULT_MIN_MATCHES: usize = 25;

/// Result of checking the candidate set against a single planar mapping
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// Not enough candidates to attempt a fit
    TooFewMatches { candidates: usize, required: usize },
    /// The robust search found no acceptable mapping
    NoHomography,
    /// `inlier_mask[i]` labels `candidates[i]`
    Fitted { homography: Matrix3<f64>, inlier_mask: Vec<bool> },
}

impl Verification {
    pub fn homography(&self) -> Option<&Matrix3<f64>> {
        match self {
            Verification::Fitted { homography, .. } => Some(homography),
            _ => None,
        }
    }

    pub fn inlier_count(&self) -> usize {
        match self {
            Verification::Fitted { inlier_mask, .. } => inlier_mask.iter().filter(|&&b| b).count(),
            _ => 0,
        }
    }

    /// The candidates labelled as inliers, in candidate order. Empty unless a
    /// mapping was fitted.
    pub fn inliers(&self, candidates: &[CandidateMatch]) -> Vec<CandidateMatch> {
        match self {
            Verification::Fitted { inlier_mask, .. } => candidates
                .iter()
                .zip(inlier_mask.iter())
                .filter(|(_, inlier)| **inlier)
                .map(|(m, _)| *m)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Robust planar consistency check over candidate matches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricVerifier {
    pub min_matches: usize,
    pub ransac: RansacOptions,
}

impl Default for GeometricVerifier {
    fn default() -> Self {
        Self {
            min_matches: DEFAULT_MIN_MATCHES,
            ransac: RansacOptions::default(),
        }
    }
}

impl GeometricVerifier {
    pub fn new(min_matches: usize, ransac: RansacOptions) -> Self {
        Self { min_matches, ransac }
    }

    /// Fit `B ~ H * A` over the candidate pairs. Candidate indices must be
    /// valid for `kps_a` / `kps_b`.
    pub fn verify(&self, kps_a: &[Keypoint], kps_b: &[Keypoint], candidates: &[CandidateMatch]) -> Verification {
        if candidates.len() < self.min_matches {
            debug!("{} candidates, {} needed for a fit", candidates.len(), self.min_matches);
            return Verification::TooFewMatches {
                candidates: candidates.len(),
                required: self.min_matches,
            };
        }

        let src: Vec<Point2<f64>> = candidates.iter().map(|m| to_point(&kps_a[m.query_idx])).collect();
        let dst: Vec<Point2<f64>> = candidates.iter().map(|m| to_point(&kps_b[m.train_idx])).collect();

        match find_homography(&src, &dst, &self.ransac) {
            Some(fit) => Verification::Fitted {
                homography: fit.homography,
                inlier_mask: fit.inlier_mask,
            },
            None => Verification::NoHomography,
        }
    }
}

fn to_point(kp: &Keypoint) -> Point2<f64> {
    Point2::new(kp.x as f64, kp.y as f64)
}
