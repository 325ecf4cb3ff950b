use std::path::Path;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbImage};
use log::debug;
use crate::error::{CompareError, CompareResult};

/// Both views at a common height, in color for drawing and grayscale for
/// detection.
#[derive(Debug, Clone)]
pub struct NormalizedPair {
    pub color_a: RgbImage,
    pub color_b: RgbImage,
    pub gray_a: GrayImage,
    pub gray_b: GrayImage,
}

impl NormalizedPair {
    pub fn height(&self) -> u32 {
        self.color_a.height()
    }
}

/// Decode one image file. Failures name the offending path.
pub fn load_image(path: &Path) -> CompareResult<DynamicImage> {
    image::open(path).map_err(|source| CompareError::Load {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_pair(path_a: &Path, path_b: &Path) -> CompareResult<NormalizedPair> {
    let a = load_image(path_a)?;
    let b = load_image(path_b)?;
    Ok(normalize_pair(&a, &b))
}

/// Scale both images to the smaller of the two heights, keeping aspect ratio.
pub fn normalize_pair(a: &DynamicImage, b: &DynamicImage) -> NormalizedPair {
    let target = a.height().min(b.height()).max(1);
    let color_a = resize_to_height(&a.to_rgb8(), target);
    let color_b = resize_to_height(&b.to_rgb8(), target);

    debug!(
        "normalized {}x{} and {}x{} to height {}",
        a.width(),
        a.height(),
        b.width(),
        b.height(),
        target
    );

    NormalizedPair {
        gray_a: imageops::grayscale(&color_a),
        gray_b: imageops::grayscale(&color_b),
        color_a,
        color_b,
    }
}

/// Resize to `target` rows with width `round(w * target / h)`. Area
/// averaging when shrinking, Catmull-Rom when enlarging.
pub fn resize_to_height(img: &RgbImage, target: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return RgbImage::new(w.max(1), target);
    }
    if h == target {
        return img.clone();
    }

    let new_width = ((w as f64 * target as f64 / h as f64).round() as u32).max(1);
    if target < h {
        imageops::thumbnail(img, new_width, target)
    } else {
        imageops::resize(img, new_width, target, FilterType::CatmullRom)
    }
}
