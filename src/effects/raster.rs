//! Pixel-level helpers shared by the effects.
//!
//! Out-of-bounds reads produce black, matching how the effects treat the area
//! outside the source image.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// High quality resample; returns a copy when the size is unchanged
pub fn resize_lanczos(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width.max(1), height.max(1), FilterType::Lanczos3)
}

/// Scale both dimensions by `factor`, truncating, never below one pixel
pub fn scaled_size(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let w = (width as f64 * factor) as u32;
    let h = (height as f64 * factor) as u32;
    (w.max(1), h.max(1))
}

/// Cut a `width x height` window whose top-left corner is at (`left`, `top`).
///
/// Parts of the window outside `img` are black.
pub fn crop_or_black(img: &RgbImage, left: i64, top: i64, width: u32, height: u32) -> RgbImage {
    let inside = left >= 0
        && top >= 0
        && left + width as i64 <= img.width() as i64
        && top + height as i64 <= img.height() as i64;

    if inside {
        return imageops::crop_imm(img, left as u32, top as u32, width, height).to_image();
    }

    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, img, -left, -top);
    canvas
}

/// Copy `top` onto `canvas` at (`x`, `y`), clipping whatever falls outside
pub fn paste(canvas: &mut RgbImage, top: &RgbImage, x: i64, y: i64) {
    imageops::replace(canvas, top, x, y);
}

fn round15(v: f64) -> f64 {
    (v * 1e15).round() / 1e15
}

/// Rotate counter-clockwise by `degrees`, growing the canvas to fit the
/// rotated corners. Nearest-neighbour sampling, black fill.
pub fn rotate_expand(img: &RgbImage, degrees: f64) -> RgbImage {
    let (w, h) = img.dimensions();
    if degrees % 360.0 == 0.0 {
        return img.clone();
    }

    // Output-to-input mapping: rotation by -degrees about the centre.
    let theta = -degrees.to_radians();
    let (a, b) = (round15(theta.cos()), round15(theta.sin()));
    let map = |x: f64, y: f64| (a * x + b * y, -b * x + a * y);

    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let corners = [(0.0, 0.0), (w as f64, 0.0), (w as f64, h as f64), (0.0, h as f64)];
    let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
    let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
    for (x, y) in corners {
        let (rx, ry) = map(x - cx, y - cy);
        min_x = min_x.min(rx + cx);
        max_x = max_x.max(rx + cx);
        min_y = min_y.min(ry + cy);
        max_y = max_y.max(ry + cy);
    }

    let new_w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let new_h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let (ncx, ncy) = (new_w as f64 / 2.0, new_h as f64 / 2.0);

    RgbImage::from_fn(new_w, new_h, |x, y| {
        let (dx, dy) = map(x as f64 + 0.5 - ncx, y as f64 + 0.5 - ncy);
        let (sx, sy) = (dx + cx, dy + cy);
        if sx < 0.0 || sy < 0.0 {
            return Rgb([0, 0, 0]);
        }
        let (sx, sy) = (sx as u32, sy as u32);
        if sx < w && sy < h {
            *img.get_pixel(sx, sy)
        } else {
            Rgb([0, 0, 0])
        }
    })
}

/// Bilinear sample at (`x`, `y`); coordinates are clamped to the image
pub fn sample_bilinear(img: &RgbImage, x: f64, y: f64) -> [u8; 3] {
    let max_x = (img.width() - 1) as f64;
    let max_y = (img.height() - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(img.width() - 1);
    let y1 = (y0 + 1).min(img.height() - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = img.get_pixel(x0, y0).0;
    let p10 = img.get_pixel(x1, y0).0;
    let p01 = img.get_pixel(x0, y1).0;
    let p11 = img.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 7]))
    }

    #[test]
    fn test_crop_inside_matches_source() {
        let img = gradient(8, 6);
        let crop = crop_or_black(&img, 2, 1, 4, 3);
        assert_eq!(crop.dimensions(), (4, 3));
        assert_eq!(crop.get_pixel(0, 0), img.get_pixel(2, 1));
        assert_eq!(crop.get_pixel(3, 2), img.get_pixel(5, 3));
    }

    #[test]
    fn test_crop_outside_is_black() {
        let img = gradient(8, 6);
        let crop = crop_or_black(&img, -2, 0, 4, 3);
        assert_eq!(crop.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(crop.get_pixel(1, 2), &Rgb([0, 0, 0]));
        assert_eq!(crop.get_pixel(2, 0), img.get_pixel(0, 0));
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let img = gradient(5, 3);
        assert_eq!(rotate_expand(&img, 0.0), img);
        assert_eq!(rotate_expand(&img, 360.0), img);
    }

    #[test]
    fn test_rotate_quarter_turn_swaps_dimensions() {
        let img = gradient(6, 4);
        let rotated = rotate_expand(&img, 90.0);
        assert_eq!(rotated.dimensions(), (4, 6));
        // Counter-clockwise: the top-right corner moves to the top-left.
        assert_eq!(rotated.get_pixel(0, 0), img.get_pixel(5, 0));
        assert_eq!(rotated.get_pixel(3, 5), img.get_pixel(0, 3));
    }

    #[test]
    fn test_rotate_expands_canvas() {
        let img = gradient(10, 10);
        let rotated = rotate_expand(&img, 45.0);
        assert!(rotated.width() > 10 && rotated.height() > 10);
        // Corners of the expanded canvas are outside the rotated square.
        assert_eq!(rotated.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_bilinear_exact_and_clamped() {
        let img = gradient(4, 4);
        assert_eq!(sample_bilinear(&img, 2.0, 1.0), img.get_pixel(2, 1).0);
        assert_eq!(sample_bilinear(&img, -5.0, 99.0), img.get_pixel(0, 3).0);
        assert_eq!(sample_bilinear(&img, 0.5, 0.0), [5, 0, 7]);
    }

    #[test]
    fn test_scaled_size_truncates() {
        assert_eq!(scaled_size(100, 50, 1.5), (150, 75));
        assert_eq!(scaled_size(3, 3, 1.9), (5, 5));
        assert_eq!(scaled_size(1, 1, 0.1), (1, 1));
    }
}
