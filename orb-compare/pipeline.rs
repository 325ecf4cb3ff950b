use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use image::{DynamicImage, RgbImage};
use log::{debug, info, warn};
use nalgebra::Matrix3;
use orb_core::CandidateMatch;
use orb_homography::Verification;
use crate::config::CompareConfig;
use crate::draw::{self, RenderMode, KEYPOINT_COLOR};
use crate::error::{CompareError, CompareResult};
use crate::extractor::{Features, OrbExtractor};
use crate::normalize::{load_pair, normalize_pair, NormalizedPair};

/// How far a comparison got before it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Fewer than two keypoints on at least one image
    Degenerate,
    /// Too few ratio-test survivors to attempt a fit
    WeakMatches,
    /// No homography with enough support was found
    NoHomography,
    /// A homography was fitted but too few candidates agree with it
    LowConfidence,
    Verified,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Degenerate => "DEGENERATE",
            Status::WeakMatches => "WEAK_MATCHES",
            Status::NoHomography => "NO_HOMOGRAPHY",
            Status::LowConfidence => "LOW_CONFIDENCE",
            Status::Verified => "VERIFIED",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Status::Degenerate => "Not enough keypoints to compare; showing the keypoints of each image only",
            Status::WeakMatches => "Too few good matches for a homography; showing unverified matches",
            Status::NoHomography => "Could not estimate a homography; showing unverified matches",
            Status::LowConfidence => "Few inliers after verification; showing unverified matches",
            Status::Verified => "Correspondences verified by a homography",
        }
    }

    pub fn is_verified(&self) -> bool {
        *self == Status::Verified
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    KeypointsA,
    KeypointsB,
    LinesWithKeypoints,
    LinesOnly,
    PointsOnly,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::KeypointsA,
        ArtifactKind::KeypointsB,
        ArtifactKind::LinesWithKeypoints,
        ArtifactKind::LinesOnly,
        ArtifactKind::PointsOnly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::KeypointsA => "keypointsA",
            ArtifactKind::KeypointsB => "keypointsB",
            ArtifactKind::LinesWithKeypoints => "linesWithPoints",
            ArtifactKind::LinesOnly => "linesOnly",
            ArtifactKind::PointsOnly => "pointsOnlyCanvas",
        }
    }

    /// File name (without extension) the shell persists this artifact under
    pub fn file_stem(&self) -> &'static str {
        match self {
            ArtifactKind::KeypointsA => "img1_keypoints",
            ArtifactKind::KeypointsB => "img2_keypoints",
            ArtifactKind::LinesWithKeypoints => "resultado_inliers_linhas",
            ArtifactKind::LinesOnly => "resultado_linhas_sem_pontos_extras",
            ArtifactKind::PointsOnly => "resultado_apenas_pontos",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub image: RgbImage,
}

/// Outcome of one comparison run
#[derive(Debug, Clone)]
pub struct Comparison {
    pub status: Status,
    pub keypoints_a: usize,
    pub keypoints_b: usize,
    /// Ratio-test survivors passed to verification
    pub candidates: usize,
    /// Present whenever a fit was accepted by RANSAC, even at low confidence
    pub homography: Option<Matrix3<f64>>,
    pub inliers: usize,
    /// Inlier lines drawn; zero unless verified
    pub drawn: usize,
    /// In `ArtifactKind::ALL` order, limited to what the status produces
    pub artifacts: Vec<Artifact>,
}

impl Comparison {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&RgbImage> {
        self.artifacts.iter().find(|a| a.kind == kind).map(|a| &a.image)
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} / {} keypoints, {} candidates, {} inliers, {} lines drawn",
            self.status, self.keypoints_a, self.keypoints_b, self.candidates, self.inliers, self.drawn
        )
    }

    /// Write every artifact as `<file_stem>.png` under `dir`. Files left in
    /// `dir` by an earlier run for kinds this run did not produce are removed,
    /// so the directory only ever holds one run's output.
    pub fn save(&self, dir: &Path) -> CompareResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        for kind in ArtifactKind::ALL {
            if self.artifact(kind).is_some() {
                continue;
            }
            let stale = dir.join(format!("{}.png", kind.file_stem()));
            match std::fs::remove_file(&stale) {
                Ok(()) => debug!("Removed stale {}", stale.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(CompareError::Io(e)),
            }
        }

        let mut written = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = dir.join(format!("{}.png", artifact.kind.file_stem()));
            artifact
                .image
                .save(&path)
                .map_err(|source| CompareError::Save { path: path.clone(), source })?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Load two image files and compare them
pub fn compare(path_a: &Path, path_b: &Path, cfg: &CompareConfig) -> CompareResult<Comparison> {
    cfg.validate()?;
    let pair = load_pair(path_a, path_b)?;
    run(&pair, cfg)
}

/// Compare two decoded images
pub fn compare_images(a: &DynamicImage, b: &DynamicImage, cfg: &CompareConfig) -> CompareResult<Comparison> {
    cfg.validate()?;
    run(&normalize_pair(a, b), cfg)
}

fn run(pair: &NormalizedPair, cfg: &CompareConfig) -> CompareResult<Comparison> {
    let extractor = OrbExtractor::new(cfg.detector.clone())?;
    let (fa, fb) = extractor.describe_pair(&pair.gray_a, &pair.gray_b)?;
    debug!("keypoints: {} in A, {} in B", fa.len(), fb.len());
    Ok(assess(pair, &fa, &fb, cfg))
}

/// Match, verify and render already extracted features
fn assess(pair: &NormalizedPair, fa: &Features, fb: &Features, cfg: &CompareConfig) -> Comparison {

    let overlays = vec![
        Artifact {
            kind: ArtifactKind::KeypointsA,
            image: draw::draw_rich_keypoints(&pair.color_a, &fa.keypoints, KEYPOINT_COLOR),
        },
        Artifact {
            kind: ArtifactKind::KeypointsB,
            image: draw::draw_rich_keypoints(&pair.color_b, &fb.keypoints, KEYPOINT_COLOR),
        },
    ];

    let mut comparison = Comparison {
        status: Status::Degenerate,
        keypoints_a: fa.len(),
        keypoints_b: fb.len(),
        candidates: 0,
        homography: None,
        inliers: 0,
        drawn: 0,
        artifacts: overlays,
    };

    if fa.len() < 2 || fb.len() < 2 {
        warn!("{}", Status::Degenerate.description());
        return comparison;
    }

    let candidates = cfg.matcher().match_descriptors(&fa.descriptors, &fb.descriptors);
    comparison.candidates = candidates.len();

    let verification = cfg.verifier().verify(&fa.keypoints, &fb.keypoints, &candidates);
    let inliers = verification.inliers(&candidates);
    comparison.homography = verification.homography().copied();
    comparison.inliers = inliers.len();

    comparison.status = match verification {
        Verification::TooFewMatches { .. } => Status::WeakMatches,
        Verification::NoHomography => Status::NoHomography,
        Verification::Fitted { .. } if inliers.len() < cfg.min_matches_for_fit => Status::LowConfidence,
        Verification::Fitted { .. } => Status::Verified,
    };

    if comparison.status.is_verified() {
        let lines = draw::select_lines(&inliers, cfg.max_lines_drawn);
        comparison.drawn = lines.len();
        render_correspondences(&mut comparison.artifacts, pair, fa, fb, &lines, &inliers, RenderMode::LinesWithKeypoints);
        info!("{}", comparison.summary());
    } else {
        render_correspondences(&mut comparison.artifacts, pair, fa, fb, &candidates, &candidates, RenderMode::LinesOnly);
        warn!("{} ({})", comparison.status.description(), comparison.summary());
    }

    comparison
}

/// Append the two match images and the points canvas
fn render_correspondences(
    artifacts: &mut Vec<Artifact>,
    pair: &NormalizedPair,
    fa: &Features,
    fb: &Features,
    lines: &[CandidateMatch],
    points: &[CandidateMatch],
    first_mode: RenderMode,
) {
    let (a, b) = (&pair.color_a, &pair.color_b);
    let (ka, kb) = (&fa.keypoints, &fb.keypoints);
    artifacts.push(Artifact {
        kind: ArtifactKind::LinesWithKeypoints,
        image: draw::draw_matches(a, ka, b, kb, lines, first_mode),
    });
    artifacts.push(Artifact {
        kind: ArtifactKind::LinesOnly,
        image: draw::draw_matches(a, ka, b, kb, lines, RenderMode::LinesOnly),
    });
    artifacts.push(Artifact {
        kind: ArtifactKind::PointsOnly,
        image: draw::points_canvas(a, ka, b, kb, points),
    });
}
