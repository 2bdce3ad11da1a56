//! Conversions between `image` buffers and `tiny_skia` pixmaps, plus
//! straight-alpha compositing.
//!
//! `image` buffers hold straight alpha; `tiny_skia` works premultiplied.
//! Everything crossing the boundary goes through this module.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{ColorU8, Pixmap};

/// Converts an RGBA image into a premultiplied pixmap.
///
/// Returns `None` for zero-sized images.
pub fn rgba_image_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Converts a premultiplied pixmap back into a straight-alpha RGBA image.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let pixels = pixmap.pixels().iter().flat_map(|px| {
        let color = px.demultiply();
        [color.red(), color.green(), color.blue(), color.alpha()]
    });
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, value) in img.iter_mut().zip(pixels) {
        *dst = value;
    }
    img
}

// ============================================================================
// Compositing
// ============================================================================

/// Draws `src` over `dest` with its top-left corner at `(x, y)`.
///
/// Only the overlapping region is touched; the rest of `src` is clipped.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let (x, y) = (i64::from(x), i64::from(y));
    let left = x.max(0);
    let top = y.max(0);
    let right = (x + i64::from(src.width())).min(i64::from(dest.width()));
    let bottom = (y + i64::from(src.height())).min(i64::from(dest.height()));

    for dy in top..bottom {
        for dx in left..right {
            let over = *src.get_pixel((dx - x) as u32, (dy - y) as u32);
            let under = dest.get_pixel_mut(dx as u32, dy as u32);
            *under = source_over(over, *under);
        }
    }
}

/// Porter-Duff source-over on straight-alpha pixels.
fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let [sr, sg, sb, sa] = src.0;
    if sa == u8::MAX || dst.0[3] == 0 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    let src_alpha = f32::from(sa) / 255.0;
    let dst_alpha = f32::from(dst.0[3]) / 255.0 * (1.0 - src_alpha);
    let alpha = src_alpha + dst_alpha;

    let channel = |s: u8, d: u8| {
        ((f32::from(s) * src_alpha + f32::from(d) * dst_alpha) / alpha).round() as u8
    };
    Rgba([
        channel(sr, dst.0[0]),
        channel(sg, dst.0[1]),
        channel(sb, dst.0[2]),
        (alpha * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn opaque_pixels_survive_pixmap_round_trip() {
        let img = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 60, y as u8 * 80, 7, 255]));
        let pixmap = rgba_image_to_pixmap(&img).unwrap();
        assert_eq!(pixmap_to_rgba_image(&pixmap), img);
    }

    #[test]
    fn zero_sized_image_has_no_pixmap() {
        assert!(rgba_image_to_pixmap(&RgbaImage::new(0, 4)).is_none());
    }

    #[test]
    fn transparent_pixels_clear_color() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([200, 10, 10, 0]));
        let pixmap = rgba_image_to_pixmap(&img).unwrap();
        assert_eq!(pixmap_to_rgba_image(&pixmap).get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn opaque_source_replaces_destination() {
        let mut dest = RgbaImage::from_pixel(8, 8, RED);
        composite_over(&mut dest, &RgbaImage::from_pixel(3, 3, BLUE), 4, 4);

        assert_eq!(*dest.get_pixel(5, 5), BLUE);
        assert_eq!(*dest.get_pixel(3, 3), RED);
    }

    #[test]
    fn source_is_clipped_to_destination() {
        let mut dest = RgbaImage::new(4, 4);
        composite_over(&mut dest, &RgbaImage::from_pixel(3, 3, BLUE), -2, 3);

        assert_eq!(*dest.get_pixel(0, 3), BLUE);
        assert_eq!(dest.get_pixel(1, 3).0[3], 0);
        assert_eq!(dest.get_pixel(0, 2).0[3], 0);

        // Entirely outside: nothing happens.
        composite_over(&mut dest, &RgbaImage::from_pixel(2, 2, RED), 10, 10);
        assert_eq!(dest.pixels().filter(|p| p.0[3] > 0).count(), 1);
    }

    #[test]
    fn translucent_source_mixes_colors() {
        let mut dest = RgbaImage::from_pixel(2, 2, RED);
        composite_over(&mut dest, &RgbaImage::from_pixel(1, 1, Rgba([0, 0, 255, 128])), 0, 0);

        let [r, _, b, a] = dest.get_pixel(0, 0).0;
        assert!(r > 100 && b > 100, "got {:?}", dest.get_pixel(0, 0));
        assert_eq!(a, 255);
        assert_eq!(*dest.get_pixel(1, 1), RED);
    }

    #[test]
    fn transparent_source_keeps_destination() {
        let mut dest = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 90]));
        composite_over(&mut dest, &RgbaImage::new(1, 1), 0, 0);
        assert_eq!(dest.get_pixel(0, 0).0, [10, 20, 30, 90]);
    }
}
