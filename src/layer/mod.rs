//! Layer scaling.
//!
//! A single zoom factor `z` decides how a raw layer is fitted to a target
//! side `T`:
//!
//! | zoom                 | result                                                          |
//! |----------------------|-----------------------------------------------------------------|
//! | `z <= 1`             | centered `(2 - z)·T` crop of the layer, scaled to `T × T`       |
//! | `z > 1`              | `(2 - z)·T` crop centered on a `(T + (z - 1)·T)` canvas         |
//! | degenerate layer     | whole layer resized to `T × T`                                  |
//!
//! Crops are taken in source pixels and clamped to the layer, so a layer
//! smaller than the crop is used whole.
//!
//! The oversized canvas of the zoom-in case keeps every layer centered on the
//! same point, so the compositor can counter-scale around the middle without
//! the layers drifting apart.

mod source;

pub use source::{LayerSource, render_svg};

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::error::{IconError, IconResult};
use crate::icon::IconLayer;
use crate::raster::composite_over;

/// Resampling filter for every layer resize.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Scales `layer` for a `target × target` render at the given zoom.
///
/// Fails with [`IconError::InvalidLayer`] when the layer has no pixels.
pub fn scale_layer(layer: &IconLayer, target: u32, zoom: f32) -> IconResult<RgbaImage> {
    check_scalable(layer, target)?;
    let size = layer.dimensions();

    if zoom <= 1.0 {
        let field = field_side(target, zoom);
        return Ok(crop_field(&layer.data, field, target));
    }

    if size.width > 1 && size.height > 1 {
        let margin = whole_pixels((f64::from(zoom) - 1.0) * f64::from(target));
        let inner = field_side(target, zoom);
        if margin > 0 && inner > 0 {
            let side = target + margin;
            let thumbnail = crop_field(&layer.data, inner, inner);
            let offset = ((side - inner) / 2) as i32;

            let mut canvas = RgbaImage::new(side, side);
            composite_over(&mut canvas, &thumbnail, offset, offset);
            return Ok(canvas);
        }
    }

    Ok(fit_square(layer.data.clone(), target))
}

/// Center-crops `layer` to a square and resizes it to `target × target`,
/// ignoring zoom. Used for a foreground with no background to align to.
pub fn fit_layer(layer: &IconLayer, target: u32) -> IconResult<RgbaImage> {
    check_scalable(layer, target)?;
    Ok(extract_thumbnail(&layer.data, target, target))
}

fn check_scalable(layer: &IconLayer, target: u32) -> IconResult<()> {
    let size = layer.dimensions();
    if size.is_empty() {
        return Err(IconError::InvalidLayer {
            role: layer.role,
            width: size.width,
            height: size.height,
        });
    }
    if target == 0 {
        return Err(IconError::invalid_config("target size must be positive"));
    }
    Ok(())
}

/// Slack absorbed before truncating, so decimal zooms that `f32` stores just
/// below their value (1.3 as 1.29999995) still land on the exact pixel.
const PIXEL_EPSILON: f64 = 1e-3;

fn whole_pixels(len: f64) -> u32 {
    (len + PIXEL_EPSILON).max(0.0) as u32
}

/// Side of the `(2 - z)·T` field, truncated to whole pixels.
fn field_side(target: u32, zoom: f32) -> u32 {
    whole_pixels((2.0 - f64::from(zoom)) * f64::from(target))
}

/// Crops a centered `field × field` square out of `src`, clamped to its
/// bounds, and scales it to `side × side`.
fn crop_field(src: &RgbaImage, field: u32, side: u32) -> RgbaImage {
    let crop = field.min(src.width()).min(src.height()).max(1);
    let x = (src.width() - crop) / 2;
    let y = (src.height() - crop) / 2;
    let cropped = imageops::crop_imm(src, x, y, crop, crop).to_image();
    fit_square(cropped, side)
}

fn fit_square(img: RgbaImage, side: u32) -> RgbaImage {
    if img.dimensions() == (side, side) {
        img
    } else {
        imageops::resize(&img, side, side, RESIZE_FILTER)
    }
}

/// Center-crops `src` to the aspect ratio of `width × height` and resizes
/// the crop to exactly that size.
///
/// Zero target dimensions are treated as one pixel.
pub fn extract_thumbnail(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (width, height) = (width.max(1), height.max(1));
    let (sw, sh) = (u64::from(src.width()), u64::from(src.height()));
    let (tw, th) = (u64::from(width), u64::from(height));

    let (crop_w, crop_h) = if sw * th > sh * tw {
        ((sh * tw / th).max(1), sh)
    } else {
        (sw, (sw * th / tw).max(1))
    };
    let x = (sw - crop_w) / 2;
    let y = (sh - crop_h) / 2;

    let cropped =
        imageops::crop_imm(src, x as u32, y as u32, crop_w as u32, crop_h as u32).to_image();
    if cropped.dimensions() == (width, height) {
        cropped
    } else {
        imageops::resize(&cropped, width, height, RESIZE_FILTER)
    }
}
