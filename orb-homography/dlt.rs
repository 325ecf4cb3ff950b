use nalgebra::{DMatrix, Matrix3, Point2, Vector3};
use crate::error::{HomographyError, HomographyResult};

/// Direct Linear Transform solver for plane-to-plane homographies.
#[derive(Debug, Clone, Copy)]
pub struct HomographySolver;

impl HomographySolver {
    /// Estimate `H` with `dst ~ H * src` from at least four correspondences.
    ///
    /// Both point sets are Hartley-normalised (zero mean, mean distance
    /// sqrt(2)) before solving `A h = 0` by SVD; the result is de-normalised
    /// and scaled so that `H[(2, 2)] == 1`.
    pub fn dlt(src: &[Point2<f64>], dst: &[Point2<f64>]) -> HomographyResult<Matrix3<f64>> {
        let n = src.len();
        if dst.len() != n {
            return Err(HomographyError::LengthMismatch { src: n, dst: dst.len() });
        }
        if n < 4 {
            return Err(HomographyError::TooFewPoints { got: n });
        }

        let (src_n, t_src) = normalize_points(src).ok_or(HomographyError::DegenerateConfiguration)?;
        let (dst_n, t_dst) = normalize_points(dst).ok_or(HomographyError::DegenerateConfiguration)?;

        let mut a = DMatrix::<f64>::zeros(2 * n, 9);
        for (i, (p, q)) in src_n.iter().zip(dst_n.iter()).enumerate() {
            let (x, y, u, v) = (p.x, p.y, q.x, q.y);
            let r0 = 2 * i;
            let r1 = r0 + 1;

            a[(r0, 0)] = -x;
            a[(r0, 1)] = -y;
            a[(r0, 2)] = -1.0;
            a[(r0, 6)] = u * x;
            a[(r0, 7)] = u * y;
            a[(r0, 8)] = u;

            a[(r1, 3)] = -x;
            a[(r1, 4)] = -y;
            a[(r1, 5)] = -1.0;
            a[(r1, 6)] = v * x;
            a[(r1, 7)] = v * y;
            a[(r1, 8)] = v;
        }

        // Four points give 8 rows; pad to square so V is complete
        if a.nrows() < a.ncols() {
            let (rows, cols) = a.shape();
            let mut padded = DMatrix::<f64>::zeros(cols, cols);
            padded.view_mut((0, 0), (rows, cols)).copy_from(&a);
            a = padded;
        }

        let svd = a.svd(false, true);
        let v_t = svd.v_t.ok_or(HomographyError::SvdFailed)?;
        let h = v_t.row(svd.singular_values.imin());

        let h_n = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);
        let t_dst_inv = t_dst.try_inverse().ok_or(HomographyError::DegenerateConfiguration)?;
        let mut h_mat = t_dst_inv * h_n * t_src;

        let scale = h_mat[(2, 2)];
        if scale.abs() <= f64::EPSILON || !scale.is_finite() {
            return Err(HomographyError::DegenerateConfiguration);
        }
        h_mat /= scale;

        if h_mat.iter().all(|v| v.is_finite()) {
            Ok(h_mat)
        } else {
            Err(HomographyError::DegenerateConfiguration)
        }
    }
}

/// Map `p` through `h`. `None` when the point lands on the line at infinity.
pub fn project(h: &Matrix3<f64>, p: &Point2<f64>) -> Option<Point2<f64>> {
    let q = h * Vector3::new(p.x, p.y, 1.0);
    if q.z.abs() <= f64::EPSILON {
        return None;
    }
    Some(Point2::new(q.x / q.z, q.y / q.z))
}

/// Euclidean distance between `H * src` and `dst`, infinite when the
/// projection is undefined.
pub fn reprojection_error(h: &Matrix3<f64>, src: &Point2<f64>, dst: &Point2<f64>) -> f64 {
    match project(h, src) {
        Some(p) => (p - *dst).norm(),
        None => f64::INFINITY,
    }
}

/// Hartley normalisation: translate to the centroid and scale the mean
/// distance to sqrt(2). `None` if all points coincide.
fn normalize_points(points: &[Point2<f64>]) -> Option<(Vec<Point2<f64>>, Matrix3<f64>)> {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    let mean_dist = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist <= f64::EPSILON {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = points
        .iter()
        .map(|p| Point2::new(s * (p.x - cx), s * (p.y - cy)))
        .collect();
    Some((normalized, t))
}
