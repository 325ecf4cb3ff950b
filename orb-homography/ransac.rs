use log::debug;
use nalgebra::{Matrix3, Point2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use crate::dlt::{reprojection_error, HomographySolver};

const SAMPLE_SIZE: usize = 4;

/// Twice the triangle area below which three sample points count as collinear
const COLLINEAR_EPS: f64 = 1e-6;

/// Tuning for the robust homography search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RansacOptions {
    /// Maximum reprojection error in pixels for a correspondence to be an inlier
    pub reprojection_threshold: f64,
    /// Hard cap on sampled hypotheses
    pub max_iters: usize,
    /// Desired probability of drawing at least one outlier-free sample
    pub confidence: f64,
    /// Smallest consensus set accepted as a fit
    pub min_inliers: usize,
    pub seed: u64,
    /// Re-estimate on the consensus set after sampling
    pub refine: bool,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            reprojection_threshold: 3.0,
            max_iters: 2000,
            confidence: 0.995,
            min_inliers: SAMPLE_SIZE,
            seed: 0,
            refine: true,
        }
    }
}

/// A homography together with the inlier label of every input pair
#[derive(Debug, Clone, PartialEq)]
pub struct HomographyFit {
    pub homography: Matrix3<f64>,
    pub inlier_mask: Vec<bool>,
}

impl HomographyFit {
    pub fn inlier_count(&self) -> usize {
        self.inlier_mask.iter().filter(|&&b| b).count()
    }
}

/// Robustly fit `dst ~ H * src`.
///
/// Returns `None` when fewer than four pairs are given, when every sampled
/// hypothesis is degenerate, or when the best consensus set is smaller than
/// `opts.min_inliers`. The same inputs and seed always give the same fit.
pub fn find_homography(src: &[Point2<f64>], dst: &[Point2<f64>], opts: &RansacOptions) -> Option<HomographyFit> {
    let n = src.len();
    if n != dst.len() || n < SAMPLE_SIZE {
        return None;
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(opts.seed);
    let mut best: Option<(Matrix3<f64>, Vec<bool>, usize)> = None;
    let mut required = opts.max_iters;
    let mut iterations = 0;

    while iterations < required.min(opts.max_iters) {
        iterations += 1;

        let sample = rand::seq::index::sample(&mut rng, n, SAMPLE_SIZE).into_vec();
        let sample_src: Vec<Point2<f64>> = sample.iter().map(|&i| src[i]).collect();
        let sample_dst: Vec<Point2<f64>> = sample.iter().map(|&i| dst[i]).collect();
        if has_collinear_triple(&sample_src) || has_collinear_triple(&sample_dst) {
            continue;
        }

        let Ok(h) = HomographySolver::dlt(&sample_src, &sample_dst) else {
            continue;
        };
        let (mask, count) = consensus(&h, src, dst, opts.reprojection_threshold);

        if best.as_ref().map_or(true, |(_, _, best_count)| count > *best_count) {
            required = adaptive_iterations(count, n, opts.confidence);
            best = Some((h, mask, count));
        }
    }

    let (mut homography, mut inlier_mask, mut count) = best?;

    if opts.refine && count >= SAMPLE_SIZE {
        let (in_src, in_dst): (Vec<Point2<f64>>, Vec<Point2<f64>>) = src
            .iter()
            .zip(dst.iter())
            .zip(inlier_mask.iter())
            .filter(|(_, inlier)| **inlier)
            .map(|((s, d), _)| (*s, *d))
            .unzip();

        if let Ok(refined) = HomographySolver::dlt(&in_src, &in_dst) {
            let (refined_mask, refined_count) = consensus(&refined, src, dst, opts.reprojection_threshold);
            if refined_count >= count {
                homography = refined;
                inlier_mask = refined_mask;
                count = refined_count;
            }
        }
    }

    debug!("ransac: {} of {} pairs agree after {} hypotheses", count, n, iterations);

    if count < opts.min_inliers.max(SAMPLE_SIZE) {
        return None;
    }

    Some(HomographyFit { homography, inlier_mask })
}

/// Label every pair and count the inliers
fn consensus(h: &Matrix3<f64>, src: &[Point2<f64>], dst: &[Point2<f64>], threshold: f64) -> (Vec<bool>, usize) {
    let mask: Vec<bool> = src
        .iter()
        .zip(dst.iter())
        .map(|(s, d)| reprojection_error(h, s, d) <= threshold)
        .collect();
    let count = mask.iter().filter(|&&b| b).count();
    (mask, count)
}

/// Trials needed to draw one all-inlier sample with the given confidence,
/// assuming the current inlier ratio.
fn adaptive_iterations(inliers: usize, total: usize, confidence: f64) -> usize {
    let ratio = inliers as f64 / total as f64;
    let p_good_sample = ratio.powi(SAMPLE_SIZE as i32);
    if p_good_sample >= 1.0 {
        return 1;
    }
    if p_good_sample <= f64::EPSILON {
        return usize::MAX;
    }
    let k = (1.0 - confidence).ln() / (1.0 - p_good_sample).ln();
    if k.is_finite() && k > 0.0 {
        k.ceil() as usize
    } else {
        usize::MAX
    }
}

fn has_collinear_triple(points: &[Point2<f64>]) -> bool {
    let triples = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    triples.iter().any(|&(i, j, k)| {
        let (a, b, c) = (points[i], points[j], points[k]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        cross.abs() < COLLINEAR_EPS
    })
}
