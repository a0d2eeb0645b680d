//! Resampling and alpha compositing of overlay assets.

use image::{Rgb, RgbImage, RgbaImage};

use crate::placement::Placement;
use crate::types::Point;

/// Samples whose coverage is below this (out of 255) leave the frame pixel
/// exactly as it was.
const MIN_ALPHA: f32 = 0.5;

/// A premultiplied RGBA sample: color channels already scaled by alpha/255.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    color: [f32; 3],
    alpha: f32,
}

/// Draw `asset` onto `frame` through `placement`, clipped to the frame.
///
/// Each covered frame pixel is inverse-mapped into the asset and sampled
/// bilinearly, so scaling and rotation happen in the same pass as blending.
/// Returns whether any frame pixel was touched.
pub fn overlay(frame: &mut RgbImage, asset: &RgbaImage, placement: &Placement) -> bool {
    let (frame_w, frame_h) = frame.dimensions();
    let bounds = placement.bounds();

    let x0 = bounds.x.floor().max(0.0);
    let y0 = bounds.y.floor().max(0.0);
    let x1 = bounds.right().ceil().min(frame_w as f32);
    let y1 = bounds.bottom().ceil().min(frame_h as f32);
    if !(x0 < x1 && y0 < y1) {
        return false;
    }

    let mut drawn = false;
    for y in y0 as u32..y1 as u32 {
        for x in x0 as u32..x1 as u32 {
            // Pixel centers on both sides
            let src = placement.to_asset(Point::new(x as f32 + 0.5, y as f32 + 0.5));
            let Some(sample) = sample_bilinear(asset, src.x - 0.5, src.y - 0.5) else {
                continue;
            };
            blend(frame.get_pixel_mut(x, y), sample);
            drawn = true;
        }
    }
    drawn
}

#[inline]
fn texel(image: &RgbaImage, x: i32, y: i32) -> Sample {
    if x < 0 || y < 0 || x >= image.width() as i32 || y >= image.height() as i32 {
        return Sample {
            color: [0.0; 3],
            alpha: 0.0,
        };
    }
    let p = image.get_pixel(x as u32, y as u32).0;
    let a = p[3] as f32;
    let k = a / 255.0;
    Sample {
        color: [p[0] as f32 * k, p[1] as f32 * k, p[2] as f32 * k],
        alpha: a,
    }
}

/// Bilinear sample in premultiplied space. Outside the asset counts as fully
/// transparent, which also feathers the asset's edges.
#[inline]
fn sample_bilinear(image: &RgbaImage, x: f32, y: f32) -> Option<Sample> {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let weights = [
        ((x0, y0), (1.0 - fx) * (1.0 - fy)),
        ((x0 + 1, y0), fx * (1.0 - fy)),
        ((x0, y0 + 1), (1.0 - fx) * fy),
        ((x0 + 1, y0 + 1), fx * fy),
    ];

    let mut out = Sample {
        color: [0.0; 3],
        alpha: 0.0,
    };
    for ((px, py), w) in weights {
        if w == 0.0 {
            continue;
        }
        let t = texel(image, px, py);
        for c in 0..3 {
            out.color[c] += t.color[c] * w;
        }
        out.alpha += t.alpha * w;
    }

    (out.alpha >= MIN_ALPHA).then_some(out)
}

/// Premultiplied "over": out = src + dst * (1 - src_alpha).
#[inline]
fn blend(dst: &mut Rgb<u8>, src: Sample) {
    let keep = 1.0 - (src.alpha / 255.0).min(1.0);
    for c in 0..3 {
        let v = src.color[c] + dst.0[c] as f32 * keep;
        dst.0[c] = v.round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn placement(origin: Point, scale: f32, angle: f32, w: u32, h: u32) -> Placement {
        Placement {
            scale,
            angle,
            origin,
            pivot: Point::new(w as f32 / 2.0, h as f32 / 2.0),
            asset_width: w,
            asset_height: h,
        }
    }

    #[test]
    fn opaque_asset_replaces_pixels_inside_only() {
        let asset = RgbaImage::from_pixel(10, 10, Rgba([200, 100, 50, 255]));
        let mut frame = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));

        let p = placement(Point::new(20.0, 20.0), 1.0, 0.0, 10, 10);
        assert!(overlay(&mut frame, &asset, &p));

        assert_eq!(*frame.get_pixel(20, 20), Rgb([200, 100, 50]));
        assert_eq!(*frame.get_pixel(16, 16), Rgb([200, 100, 50]));
        assert_eq!(*frame.get_pixel(5, 5), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(30, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn transparent_asset_leaves_frame_identical() {
        let asset = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 0]));
        let mut frame = RgbImage::from_fn(40, 40, |x, y| Rgb([x as u8, y as u8, 7]));
        let before = frame.clone();

        let p = placement(Point::new(20.0, 20.0), 1.7, 0.3, 10, 10);
        assert!(!overlay(&mut frame, &asset, &p));
        assert_eq!(frame, before);
    }

    #[test]
    fn half_alpha_mixes_colors() {
        let asset = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 128]));
        let mut frame = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));

        let p = placement(Point::new(20.0, 20.0), 1.0, 0.0, 10, 10);
        overlay(&mut frame, &asset, &p);
        assert_eq!(*frame.get_pixel(20, 20), Rgb([128, 128, 128]));
    }

    #[test]
    fn partially_off_frame_is_clipped() {
        let asset = RgbaImage::from_pixel(20, 20, Rgba([9, 9, 9, 255]));
        let mut frame = RgbImage::from_pixel(30, 30, Rgb([0, 0, 0]));

        // Centered on the top-left corner: only a quarter lands in frame
        let p = placement(Point::new(0.0, 0.0), 1.0, 0.7, 20, 20);
        assert!(overlay(&mut frame, &asset, &p));
        assert_eq!(*frame.get_pixel(0, 0), Rgb([9, 9, 9]));
        assert_eq!(*frame.get_pixel(29, 29), Rgb([0, 0, 0]));
    }

    #[test]
    fn fully_off_frame_draws_nothing() {
        let asset = RgbaImage::from_pixel(20, 20, Rgba([9, 9, 9, 255]));
        let mut frame = RgbImage::from_pixel(30, 30, Rgb([1, 2, 3]));
        let before = frame.clone();

        for origin in [
            Point::new(-100.0, 15.0),
            Point::new(15.0, 500.0),
            Point::new(130.0, -40.0),
        ] {
            let p = placement(origin, 2.0, 0.4, 20, 20);
            assert!(!overlay(&mut frame, &asset, &p));
        }
        assert_eq!(frame, before);
    }

    #[test]
    fn rotation_by_quarter_turn_swaps_extent() {
        let asset = RgbaImage::from_pixel(20, 4, Rgba([255, 0, 0, 255]));
        let mut frame = RgbImage::from_pixel(40, 40, Rgb([0, 0, 0]));

        let p = placement(Point::new(20.0, 20.0), 1.0, std::f32::consts::FRAC_PI_2, 20, 4);
        overlay(&mut frame, &asset, &p);

        // Now a vertical bar through the center
        assert_eq!(*frame.get_pixel(20, 12), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(20, 27), Rgb([255, 0, 0]));
        assert_eq!(*frame.get_pixel(12, 20), Rgb([0, 0, 0]));
        assert_eq!(*frame.get_pixel(27, 20), Rgb([0, 0, 0]));
    }
}
