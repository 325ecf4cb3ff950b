use image::{imageops, DynamicImage, Rgb, RgbImage};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Overlapping random rectangles on a grey background. Plenty of corners with
/// distinct surroundings.
pub fn textured_scene(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut img = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
    let count = (width * height / 500).max(20);

    for _ in 0..count {
        let w = rng.gen_range(6..40u32).min(width);
        let h = rng.gen_range(6..40u32).min(height);
        let x0 = rng.gen_range(0..=width - w);
        let y0 = rng.gen_range(0..=height - h);
        let color = Rgb([rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>()]);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, color);
            }
        }
    }
    img
}

/// Independent uniform noise per pixel
pub fn noise(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>()]))
}

pub fn blank(width: u32, height: u32) -> RgbImage {
    RgbImage::new(width, height)
}

pub fn crop(img: &RgbImage, x: u32, y: u32, width: u32, height: u32) -> RgbImage {
    imageops::crop_imm(img, x, y, width, height).to_image()
}

pub fn dynamic(img: RgbImage) -> DynamicImage {
    DynamicImage::ImageRgb8(img)
}
