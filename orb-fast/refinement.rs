use orb_core::{Image, Keypoint};
use std::cmp::Ordering;

/// Suppression, ranking and orientation of detected corners
pub struct KeypointRefinement;

impl KeypointRefinement {
    /// 3x3 non-maximum suppression over the corner response map.
    ///
    /// A keypoint survives when no 8-neighbour has a higher response. Among
    /// equal responses the one earlier in raster order wins, so the result
    /// does not depend on input order.
    pub fn non_maximum_suppression(keypoints: &[Keypoint], width: usize, height: usize) -> Vec<Keypoint> {
        if keypoints.is_empty() {
            return Vec::new();
        }

        let mut scores = vec![f32::NEG_INFINITY; width * height];
        for kp in keypoints {
            scores[kp.y as usize * width + kp.x as usize] = kp.response;
        }

        keypoints
            .iter()
            .filter(|kp| {
                let (x, y) = (kp.x as usize, kp.y as usize);
                let own = y * width + x;
                for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                        let idx = ny * width + nx;
                        if idx == own {
                            continue;
                        }
                        let other = scores[idx];
                        if other > kp.response || (other == kp.response && idx < own) {
                            return false;
                        }
                    }
                }
                true
            })
            .copied()
            .collect()
    }

    /// Order keypoints strongest first, breaking ties in raster order, and keep
    /// at most `limit`.
    pub fn retain_best(mut keypoints: Vec<Keypoint>, limit: usize) -> Vec<Keypoint> {
        keypoints.sort_by(Self::rank_order);
        keypoints.truncate(limit);
        keypoints
    }

    fn rank_order(a: &Keypoint, b: &Keypoint) -> Ordering {
        b.response
            .total_cmp(&a.response)
            .then_with(|| a.y.total_cmp(&b.y))
            .then_with(|| a.x.total_cmp(&b.x))
    }

    /// Half-widths of the circular patch, one entry per row offset `0..=radius`.
    pub fn circular_extents(radius: usize) -> Vec<i32> {
        let r = radius as f32;
        (0..=radius)
            .map(|dy| (r * r - (dy * dy) as f32).max(0.0).sqrt().round() as i32)
            .collect()
    }

    /// Orientation from the intensity centroid of a circular patch.
    /// Samples outside the image are clamped to the nearest edge pixel.
    pub fn compute_orientation(img: &Image, width: usize, height: usize, x: f32, y: f32, extents: &[i32]) -> f32 {
        let half = extents.len() as i32 - 1;
        let (cx, cy) = (x.round() as i32, y.round() as i32);
        let mut m10 = 0i64;
        let mut m01 = 0i64;

        for dy in -half..=half {
            let yy = (cy + dy).clamp(0, height as i32 - 1) as usize;
            let reach = extents[dy.unsigned_abs() as usize];
            for dx in -reach..=reach {
                let xx = (cx + dx).clamp(0, width as i32 - 1) as usize;
                let val = img[yy * width + xx] as i64;
                m10 += dx as i64 * val;
                m01 += dy as i64 * val;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }
}
