//! Rendering of keypoints and correspondences.
//!
//! Pairs are laid out side by side at their common height; keypoints of the
//! right image are shifted by the left image's width.

use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_antialiased_line_segment_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use imageproc::pixelops::interpolate;
use orb_core::{CandidateMatch, Keypoint};

pub const KEYPOINT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const INLIER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const SINGLE_POINT_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
pub const MATCH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Radius of the plain keypoint and line-endpoint markers
const POINT_RADIUS: i32 = 3;

/// How a match image treats keypoints that are not line endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Every keypoint of both images is marked, then the lines are drawn
    LinesWithKeypoints,
    /// Only the lines and their endpoints
    LinesOnly,
}

/// Copy of `img` with a scale circle and orientation tick per keypoint
pub fn draw_rich_keypoints(img: &RgbImage, keypoints: &[Keypoint], color: Rgb<u8>) -> RgbImage {
    let mut out = img.clone();
    for kp in keypoints {
        draw_rich_keypoint_mut(&mut out, kp, 0, color);
    }
    out
}

fn draw_rich_keypoint_mut(canvas: &mut RgbImage, kp: &Keypoint, offset_x: u32, color: Rgb<u8>) {
    let (cx, cy) = (kp.x + offset_x as f32, kp.y);
    let radius = (kp.size / 2.0).round().max(1.0);
    draw_hollow_circle_mut(canvas, (cx.round() as i32, cy.round() as i32), radius as i32, color);

    let (sin, cos) = kp.angle.sin_cos();
    draw_line_segment_mut(canvas, (cx, cy), (cx + radius * cos, cy + radius * sin), color);
}

/// Both images on one canvas, `b` to the right of `a`
pub fn side_by_side(a: &RgbImage, b: &RgbImage) -> RgbImage {
    let mut canvas = RgbImage::new(a.width() + b.width(), a.height().max(b.height()));
    imageops::replace(&mut canvas, a, 0, 0);
    imageops::replace(&mut canvas, b, a.width() as i64, 0);
    canvas
}

/// Correspondence lines from `a` to `b`. Each match must index into
/// `kps_a` (query) and `kps_b` (train).
pub fn draw_matches(
    a: &RgbImage,
    kps_a: &[Keypoint],
    b: &RgbImage,
    kps_b: &[Keypoint],
    matches: &[CandidateMatch],
    mode: RenderMode,
) -> RgbImage {
    let mut canvas = side_by_side(a, b);
    let offset = a.width();

    if mode == RenderMode::LinesWithKeypoints {
        for kp in kps_a {
            draw_point(&mut canvas, kp, 0, SINGLE_POINT_COLOR);
        }
        for kp in kps_b {
            draw_point(&mut canvas, kp, offset, SINGLE_POINT_COLOR);
        }
    }

    for m in matches {
        let (pa, pb) = (&kps_a[m.query_idx], &kps_b[m.train_idx]);
        draw_point(&mut canvas, pa, 0, MATCH_COLOR);
        draw_point(&mut canvas, pb, offset, MATCH_COLOR);
        draw_antialiased_line_segment_mut(
            &mut canvas,
            (pa.x.round() as i32, pa.y.round() as i32),
            ((pb.x + offset as f32).round() as i32, pb.y.round() as i32),
            MATCH_COLOR,
            interpolate,
        );
    }

    canvas
}

/// Side-by-side canvas with only the matched keypoints, drawn as rich
/// glyphs in the inlier colour.
pub fn points_canvas(
    a: &RgbImage,
    kps_a: &[Keypoint],
    b: &RgbImage,
    kps_b: &[Keypoint],
    matches: &[CandidateMatch],
) -> RgbImage {
    let mut canvas = side_by_side(a, b);
    let offset = a.width();
    for m in matches {
        draw_rich_keypoint_mut(&mut canvas, &kps_a[m.query_idx], 0, INLIER_COLOR);
        draw_rich_keypoint_mut(&mut canvas, &kps_b[m.train_idx], offset, INLIER_COLOR);
    }
    canvas
}

/// Best `max_lines` matches by distance; ties keep their input order
pub fn select_lines(inliers: &[CandidateMatch], max_lines: usize) -> Vec<CandidateMatch> {
    let mut lines = inliers.to_vec();
    lines.sort_by_key(|m| m.distance);
    lines.truncate(max_lines);
    lines
}

fn draw_point(canvas: &mut RgbImage, kp: &Keypoint, offset_x: u32, color: Rgb<u8>) {
    let center = ((kp.x + offset_x as f32).round() as i32, kp.y.round() as i32);
    draw_hollow_circle_mut(canvas, center, POINT_RADIUS, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypoint(x: f32, y: f32) -> Keypoint {
        Keypoint { size: 10.0, ..Keypoint::new(x, y) }
    }

    fn candidate(query_idx: usize, train_idx: usize, distance: u32) -> CandidateMatch {
        CandidateMatch { query_idx, train_idx, distance }
    }

    fn count_color(img: &RgbImage, color: Rgb<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn canvas_places_b_right_of_a() {
        let a = RgbImage::from_pixel(30, 20, Rgb([10, 10, 10]));
        let b = RgbImage::from_pixel(15, 20, Rgb([200, 200, 200]));
        let canvas = side_by_side(&a, &b);
        assert_eq!(canvas.dimensions(), (45, 20));
        assert_eq!(*canvas.get_pixel(29, 5), Rgb([10, 10, 10]));
        assert_eq!(*canvas.get_pixel(30, 5), Rgb([200, 200, 200]));
    }

    #[test]
    fn rich_keypoints_leave_the_source_untouched() {
        let img = RgbImage::new(50, 50);
        let out = draw_rich_keypoints(&img, &[keypoint(25.0, 25.0)], KEYPOINT_COLOR);
        assert_eq!(count_color(&img, KEYPOINT_COLOR), 0);
        assert!(count_color(&out, KEYPOINT_COLOR) > 0);
        // Orientation tick runs from the centre along angle 0
        assert_eq!(*out.get_pixel(25, 25), KEYPOINT_COLOR);
        assert_eq!(*out.get_pixel(28, 25), KEYPOINT_COLOR);
    }

    #[test]
    fn lines_cross_into_the_right_image() {
        let img = RgbImage::new(40, 30);
        let kps = vec![keypoint(10.0, 15.0)];
        let out = draw_matches(&img, &kps, &img, &kps, &[candidate(0, 0, 3)], RenderMode::LinesOnly);
        assert_eq!(out.dimensions(), (80, 30));
        // Horizontal line from x=10 to x=50 at y=15
        assert_eq!(*out.get_pixel(30, 15), MATCH_COLOR);
        assert_eq!(*out.get_pixel(45, 15), MATCH_COLOR);
    }

    #[test]
    fn single_points_only_in_lines_with_keypoints_mode() {
        let img = RgbImage::new(60, 40);
        let kps_a = vec![keypoint(10.0, 10.0), keypoint(40.0, 30.0)];
        let kps_b = vec![keypoint(15.0, 12.0), keypoint(45.0, 20.0)];
        let matches = [candidate(0, 0, 1)];

        let with_points = draw_matches(&img, &kps_a, &img, &kps_b, &matches, RenderMode::LinesWithKeypoints);
        let lines_only = draw_matches(&img, &kps_a, &img, &kps_b, &matches, RenderMode::LinesOnly);
        assert!(count_color(&with_points, SINGLE_POINT_COLOR) > 0);
        assert_eq!(count_color(&lines_only, SINGLE_POINT_COLOR), 0);
    }

    #[test]
    fn points_canvas_marks_both_sides() {
        let img = RgbImage::new(50, 40);
        let kps = vec![keypoint(20.0, 20.0)];
        let out = points_canvas(&img, &kps, &img, &kps, &[candidate(0, 0, 0)]);
        assert_eq!(*out.get_pixel(20, 20), INLIER_COLOR);
        assert_eq!(*out.get_pixel(70, 20), INLIER_COLOR);
        assert_eq!(count_color(&out, MATCH_COLOR), 0);
    }

    #[test]
    fn line_selection_is_sorted_and_capped() {
        let inliers: Vec<CandidateMatch> = (0..100).map(|i| candidate(i, i, (97 * i as u32) % 64)).collect();
        let lines = select_lines(&inliers, 80);
        assert_eq!(lines.len(), 80);
        assert!(lines.windows(2).all(|w| w[0].distance <= w[1].distance));
        let worst_drawn = lines.last().unwrap().distance;
        let drawn_below = inliers.iter().filter(|m| m.distance < worst_drawn).count();
        assert!(drawn_below <= 80);

        assert_eq!(select_lines(&inliers[..10], 80).len(), 10);
        assert!(select_lines(&inliers, 0).is_empty());
    }
}
