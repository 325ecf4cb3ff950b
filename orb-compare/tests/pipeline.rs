mod common;

use common::synthetic::{blank, crop, dynamic, noise, textured_scene};
use orb_compare::{compare, compare_images, draw, ArtifactKind, CompareConfig, CompareError, Status};

fn test_config() -> CompareConfig {
    let mut cfg = CompareConfig::default();
    cfg.detector.max_features = 500;
    cfg
}

fn assert_count_invariants(c: &orb_compare::Comparison, cfg: &CompareConfig) {
    assert!(c.drawn <= c.inliers);
    assert!(c.inliers <= c.candidates);
    assert!(c.candidates <= cfg.max_matches_for_fit);
    assert!(c.candidates <= c.keypoints_a);
    assert!(c.drawn <= cfg.max_lines_drawn);
}

#[test]
fn identical_images_are_verified_with_identity_homography() {
    let cfg = test_config();
    let img = dynamic(textured_scene(320, 240, 1));
    let c = compare_images(&img, &img, &cfg).unwrap();

    assert_eq!(c.status, Status::Verified, "{}", c.summary());
    assert_count_invariants(&c, &cfg);
    assert!(c.inliers >= cfg.min_matches_for_fit);
    assert!(c.inliers * 10 >= c.candidates * 9, "{}", c.summary());

    let h = c.homography.unwrap();
    let identity = nalgebra::Matrix3::<f64>::identity();
    for r in 0..3 {
        for col in 0..3 {
            let tol = if col == 2 && r < 2 { 0.5 } else { 1e-3 };
            assert!((h[(r, col)] - identity[(r, col)]).abs() < tol, "H = {}", h);
        }
    }

    assert_eq!(c.artifacts.len(), 5);
    let kinds: Vec<ArtifactKind> = c.artifacts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, ArtifactKind::ALL.to_vec());
    assert_eq!(c.artifact(ArtifactKind::LinesOnly).unwrap().dimensions(), (640, 240));
    assert_eq!(c.artifact(ArtifactKind::KeypointsA).unwrap().dimensions(), (320, 240));
}

#[test]
fn shifted_view_recovers_the_translation() {
    let cfg = test_config();
    let scene = textured_scene(360, 280, 5);
    let a = dynamic(crop(&scene, 0, 0, 320, 240));
    let b = dynamic(crop(&scene, 24, 16, 320, 240));
    let c = compare_images(&a, &b, &cfg).unwrap();

    assert_eq!(c.status, Status::Verified, "{}", c.summary());
    assert_count_invariants(&c, &cfg);
    let h = c.homography.unwrap();
    let p = orb_homography::project(&h, &nalgebra::Point2::new(160.0, 120.0)).unwrap();
    assert!((p.x - 136.0).abs() < 2.0 && (p.y - 104.0).abs() < 2.0, "H = {}", h);
}

#[test]
fn blank_image_is_degenerate() {
    let cfg = test_config();
    let c = compare_images(&dynamic(blank(320, 240)), &dynamic(textured_scene(320, 240, 2)), &cfg).unwrap();

    assert_eq!(c.status, Status::Degenerate);
    assert_eq!(c.keypoints_a, 0);
    assert!(c.keypoints_b > 0);
    assert_eq!((c.candidates, c.inliers, c.drawn), (0, 0, 0));
    assert!(c.homography.is_none());
    assert_eq!(c.artifacts.len(), 2);
    assert!(c.artifact(ArtifactKind::KeypointsA).is_some());
    assert!(c.artifact(ArtifactKind::KeypointsB).is_some());
    assert!(c.artifact(ArtifactKind::PointsOnly).is_none());
}

#[test]
fn unrelated_images_draw_no_inlier_lines() {
    let cfg = test_config();
    let c = compare_images(&dynamic(noise(320, 240, 3)), &dynamic(textured_scene(320, 240, 4)), &cfg).unwrap();

    assert!(matches!(c.status, Status::WeakMatches | Status::NoHomography), "{}", c.summary());
    assert!(c.homography.is_none());
    assert_eq!(c.drawn, 0);
    assert_count_invariants(&c, &cfg);
    assert_eq!(c.artifacts.len(), 5);
}

#[test]
fn drawn_lines_are_capped_but_points_are_not() {
    let cfg = CompareConfig { max_lines_drawn: 10, ..test_config() };
    let img = dynamic(textured_scene(320, 240, 6));
    let c = compare_images(&img, &img, &cfg).unwrap();

    assert_eq!(c.status, Status::Verified, "{}", c.summary());
    assert_eq!(c.drawn, 10);
    assert!(c.inliers > 10);

    let uncapped = compare_images(&img, &img, &CompareConfig { max_lines_drawn: usize::MAX, ..cfg.clone() }).unwrap();
    assert_eq!(uncapped.drawn, uncapped.inliers);
    assert_eq!(uncapped.inliers, c.inliers);
    assert_ne!(c.artifact(ArtifactKind::LinesOnly), uncapped.artifact(ArtifactKind::LinesOnly));

    // Every inlier is marked on the points canvas regardless of the line cap
    let points = c.artifact(ArtifactKind::PointsOnly).unwrap();
    assert_eq!(Some(points), uncapped.artifact(ArtifactKind::PointsOnly));
    let red = points.pixels().filter(|p| **p == draw::INLIER_COLOR).count();
    assert!(red > 10 * c.inliers, "{} red pixels for {} inliers", red, c.inliers);
}

#[test]
fn different_heights_are_equalized() {
    let cfg = test_config();
    let small = textured_scene(320, 240, 7);
    let large = image::imageops::resize(&small, 480, 360, image::imageops::FilterType::Triangle);
    let c = compare_images(&dynamic(large), &dynamic(small), &cfg).unwrap();

    let ka = c.artifact(ArtifactKind::KeypointsA).unwrap();
    let kb = c.artifact(ArtifactKind::KeypointsB).unwrap();
    assert_eq!(ka.height(), 240);
    assert_eq!(kb.height(), 240);
    assert_eq!(ka.width(), 320);
    assert_count_invariants(&c, &cfg);
}

#[test]
fn runs_are_reproducible() {
    let cfg = test_config();
    let scene = textured_scene(300, 220, 8);
    let a = dynamic(crop(&scene, 0, 0, 260, 200));
    let b = dynamic(crop(&scene, 30, 12, 260, 200));

    let first = compare_images(&a, &b, &cfg).unwrap();
    let second = compare_images(&a, &b, &cfg).unwrap();
    assert_eq!(first.summary(), second.summary());
    assert_eq!(first.homography, second.homography);
    for (x, y) in first.artifacts.iter().zip(second.artifacts.iter()) {
        assert_eq!(x.image, y.image);
    }
}

#[test]
fn files_are_loaded_from_disk() {
    let dir = std::env::temp_dir().join(format!("orb-compare-pipeline-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("scene.png");
    textured_scene(320, 240, 9).save(&path).unwrap();

    let cfg = test_config();
    let c = compare(&path, &path, &cfg).unwrap();
    assert_eq!(c.status, Status::Verified, "{}", c.summary());

    let missing = dir.join("missing.png");
    match compare(&path, &missing, &cfg) {
        Err(CompareError::Load { path: p, .. }) => assert_eq!(p, missing),
        other => panic!("expected a load error, got {:?}", other.map(|c| c.status)),
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn saving_a_degenerate_run_clears_earlier_match_images() {
    let dir = std::env::temp_dir().join(format!("orb-compare-save-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let cfg = test_config();
    let scene = dynamic(textured_scene(320, 240, 10));
    let stem_path = |kind: ArtifactKind| dir.join(format!("{}.png", kind.file_stem()));

    let verified = compare_images(&scene, &scene, &cfg).unwrap();
    assert_eq!(verified.status, Status::Verified, "{}", verified.summary());
    assert_eq!(verified.save(&dir).unwrap().len(), 5);
    assert!(ArtifactKind::ALL.iter().all(|&k| stem_path(k).exists()));

    let degenerate = compare_images(&dynamic(blank(320, 240)), &scene, &cfg).unwrap();
    assert_eq!(degenerate.status, Status::Degenerate);
    let written = degenerate.save(&dir).unwrap();
    assert_eq!(written, vec![stem_path(ArtifactKind::KeypointsA), stem_path(ArtifactKind::KeypointsB)]);

    for kind in ArtifactKind::ALL {
        let expected = matches!(kind, ArtifactKind::KeypointsA | ArtifactKind::KeypointsB);
        assert_eq!(stem_path(kind).exists(), expected, "{}", kind.file_stem());
    }
    let reloaded = image::open(stem_path(ArtifactKind::KeypointsA)).unwrap().to_rgb8();
    assert_eq!(Some(&reloaded), degenerate.artifact(ArtifactKind::KeypointsA));

    // A second save into an already clean directory is fine too
    assert_eq!(degenerate.save(&dir).unwrap().len(), 2);

    std::fs::remove_dir_all(&dir).unwrap();
}
