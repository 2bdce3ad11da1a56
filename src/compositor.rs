//! Two-layer compositing and mask clipping.
//!
//! Rendering happens in two steps:
//!
//! 1. [`prepare`] validates the config, resolves and rescales the mask, and
//!    scales both layers to the output size.
//! 2. [`composite`] draws the prepared layers with their parallax offsets and
//!    the foreground zoom, then fills the mask with the result.
//!
//! [`render`] runs both. [`Compositor`] keeps the prepared state between
//! renders and drops it whenever the config or icon changes.

use image::RgbaImage;
use resvg::tiny_skia::{
    self, FillRule, FilterQuality, Paint, Pattern, Pixmap, PixmapPaint, SpreadMode, Transform,
};
use tracing::{debug, trace, warn};

use crate::config::RenderConfig;
use crate::error::{IconError, IconResult};
use crate::icon::{AdaptiveIcon, LayerRole, SizePx};
use crate::layer::{fit_layer, scale_layer};
use crate::profile::RenderProfile;
use crate::raster::{pixmap_to_rgba_image, rgba_image_to_pixmap};
use crate::shape::ResolvedMask;

/// Background parallax travel, as a fraction of the output size.
pub const BACKGROUND_PARALLAX: f32 = 0.066;

/// Foreground parallax travel, as a fraction of the output size.
pub const FOREGROUND_PARALLAX: f32 = 0.188;

// ============================================================================
// Prepared state
// ============================================================================

/// A layer that was dropped during preparation because it had no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedLayer {
    pub role: LayerRole,
    pub width: u32,
    pub height: u32,
}

impl SkippedLayer {
    /// The error that caused the layer to be skipped.
    pub fn error(&self) -> IconError {
        IconError::InvalidLayer {
            role: self.role,
            width: self.width,
            height: self.height,
        }
    }
}

/// Mask and layers scaled for one particular config.
#[derive(Debug, Clone)]
pub struct PreparedIcon {
    mask: ResolvedMask,
    clip: tiny_skia::Path,
    background: Option<RgbaImage>,
    foreground: Option<RgbaImage>,
    skipped: Vec<SkippedLayer>,
}

impl PreparedIcon {
    /// The mask, rescaled to the output size.
    pub fn mask(&self) -> &ResolvedMask {
        &self.mask
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    pub fn foreground(&self) -> Option<&RgbaImage> {
        self.foreground.as_ref()
    }

    pub fn skipped(&self) -> &[SkippedLayer] {
        &self.skipped
    }
}

/// The final clipped image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedIcon {
    /// `output_size × output_size` pixels, transparent outside the mask.
    pub data: RgbaImage,

    /// Layers left out of the composite.
    pub skipped: Vec<SkippedLayer>,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Validates `config`, resolves the mask, and scales both layers.
///
/// A layer without pixels is skipped and recorded rather than failing the
/// render. An invalid config or mask is fatal.
#[tracing::instrument(skip_all, fields(size = config.output_size, mask = config.mask.name()))]
pub fn prepare(config: &RenderConfig, icon: &AdaptiveIcon) -> IconResult<PreparedIcon> {
    config.validate()?;
    let size = config.output_size;

    let mask = config.mask.resolve()?.scaled_to(size);
    let clip = mask.path.to_skia_path().ok_or(IconError::DegenerateMask)?;

    let mut skipped = Vec::new();
    let background = match &icon.background {
        Some(layer) => keep_layer(scale_layer(layer, size, config.background_zoom), &mut skipped)?,
        None => None,
    };
    // The foreground shares the background's geometry so both stay aligned;
    // alone it simply fills the frame.
    let foreground = match &icon.foreground {
        Some(layer) if icon.background.is_some() => {
            keep_layer(scale_layer(layer, size, config.background_zoom), &mut skipped)?
        }
        Some(layer) => keep_layer(fit_layer(layer, size), &mut skipped)?,
        None => None,
    };

    debug!(
        background = ?background.as_ref().map(RgbaImage::dimensions),
        foreground = ?foreground.as_ref().map(RgbaImage::dimensions),
        background_zoom = config.background_zoom,
        foreground_zoom = config.foreground_zoom,
        "prepared adaptive icon"
    );

    Ok(PreparedIcon {
        mask,
        clip,
        background,
        foreground,
        skipped,
    })
}

fn keep_layer(
    scaled: IconResult<RgbaImage>,
    skipped: &mut Vec<SkippedLayer>,
) -> IconResult<Option<RgbaImage>> {
    match scaled {
        Ok(img) => Ok(Some(img)),
        Err(IconError::InvalidLayer {
            role,
            width,
            height,
        }) => {
            warn!(%role, width, height, "skipping layer without pixels");
            skipped.push(SkippedLayer {
                role,
                width,
                height,
            });
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Parallax shift of the background.
///
/// Only an oversized (zoomed-in) background has room to move; anything else
/// stays put.
pub fn background_translation(config: &RenderConfig, scaled: SizePx) -> (f32, f32) {
    if !scaled.exceeds(config.output_size) {
        return (0.0, 0.0);
    }
    let size = config.output_size as f32;
    (
        size * config.offset_x * BACKGROUND_PARALLAX,
        size * config.offset_y * BACKGROUND_PARALLAX,
    )
}

/// Parallax shift of the foreground.
pub fn foreground_translation(config: &RenderConfig) -> (f32, f32) {
    let size = config.output_size as f32;
    (
        size * config.offset_x * FOREGROUND_PARALLAX,
        size * config.offset_y * FOREGROUND_PARALLAX,
    )
}

/// Places the foreground at `(x, y)` and scales it by `2 - foreground_zoom`
/// about the center of the output.
fn foreground_transform(config: &RenderConfig, x: f32, y: f32) -> Transform {
    let scale = 2.0 - config.foreground_zoom;
    let center = (config.output_size / 2) as f32;
    let pivot = center * (1.0 - scale);
    Transform::from_row(scale, 0.0, 0.0, scale, scale * x + pivot, scale * y + pivot)
}

/// Offset that centers a `len` pixel edge in `size`, truncated like integer
/// division.
fn centered(size: u32, len: u32) -> f32 {
    ((i64::from(size) - i64::from(len)) / 2) as f32
}

/// Draws the prepared layers and clips them to the mask.
pub fn composite(config: &RenderConfig, prepared: &PreparedIcon) -> IconResult<RenderedIcon> {
    let size = config.output_size;
    let blank =
        || Pixmap::new(size, size).ok_or_else(|| IconError::invalid_config("output size must be positive"));

    let mut canvas = blank()?;
    let layer_paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };

    if let Some(pixmap) = prepared.background.as_ref().and_then(rgba_image_to_pixmap) {
        let scaled = SizePx::new(pixmap.width(), pixmap.height());
        let (dx, dy) = background_translation(config, scaled);
        let x = dx + centered(size, scaled.width);
        let y = dy + centered(size, scaled.height);
        canvas.draw_pixmap(0, 0, pixmap.as_ref(), &layer_paint, Transform::from_translate(x, y), None);
    }

    if let Some(pixmap) = prepared.foreground.as_ref().and_then(rgba_image_to_pixmap) {
        let (dx, dy) = foreground_translation(config);
        let x = dx + centered(size, pixmap.width());
        let y = dy + centered(size, pixmap.height());
        canvas.draw_pixmap(
            0,
            0,
            pixmap.as_ref(),
            &layer_paint,
            foreground_transform(config, x, y),
            None,
        );
    }

    let mut output = blank()?;
    let mask_paint = Paint {
        shader: Pattern::new(
            canvas.as_ref(),
            SpreadMode::Repeat,
            FilterQuality::Nearest,
            1.0,
            Transform::identity(),
        ),
        anti_alias: true,
        ..Paint::default()
    };
    output.fill_path(
        &prepared.clip,
        &mask_paint,
        FillRule::Winding,
        Transform::identity(),
        None,
    );

    Ok(RenderedIcon {
        data: pixmap_to_rgba_image(&output),
        skipped: prepared.skipped.clone(),
    })
}

/// Prepares and composites in one go, with no state kept between calls.
///
/// # Example
///
/// ```
/// use adaptive_icon::{AdaptiveIcon, MaskShape, RenderConfig, render};
/// use image::{Rgba, RgbaImage};
///
/// let icon = AdaptiveIcon::new()
///     .with_background(RgbaImage::from_pixel(108, 108, Rgba([30, 90, 200, 255])));
/// let config = RenderConfig::new(MaskShape::Squircle).with_output_size(64);
///
/// let rendered = render(&config, &icon).unwrap();
/// assert_eq!(rendered.data.dimensions(), (64, 64));
/// ```
pub fn render(config: &RenderConfig, icon: &AdaptiveIcon) -> IconResult<RenderedIcon> {
    let prepared = prepare(config, icon)?;
    composite(config, &prepared)
}

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from a [`RenderProfile`].
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    fn apply_profile(&mut self, profile: &RenderProfile);

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> RenderProfile;
}

// ============================================================================
// Compositor
// ============================================================================

enum Stage {
    Unprepared,
    Prepared(PreparedIcon),
}

/// Renders one icon repeatedly, reusing the prepared mask and layers until
/// the config or icon changes.
///
/// # Example
///
/// ```
/// use adaptive_icon::{AdaptiveIcon, Compositor, MaskShape, RenderConfig};
/// use image::RgbaImage;
///
/// let icon = AdaptiveIcon::new().with_foreground(RgbaImage::new(48, 48));
/// let mut compositor = Compositor::new(RenderConfig::new(MaskShape::Teardrop), icon);
///
/// let first = compositor.render().unwrap();
/// assert!(compositor.is_prepared());
///
/// // A changed config drops the prepared state.
/// compositor.set_config(RenderConfig::new(MaskShape::Teardrop).with_output_size(48));
/// assert!(!compositor.is_prepared());
/// assert_eq!(compositor.render().unwrap().data.width(), 48);
/// # let _ = first;
/// ```
pub struct Compositor {
    config: RenderConfig,
    icon: AdaptiveIcon,
    stage: Stage,
    version: u64,
}

impl Compositor {
    pub fn new(config: RenderConfig, icon: AdaptiveIcon) -> Self {
        Self {
            config,
            icon,
            stage: Stage::Unprepared,
            version: 0,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn icon(&self) -> &AdaptiveIcon {
        &self.icon
    }

    /// Increments every time the prepared state is dropped.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replaces the config. Returns true if it changed.
    ///
    /// Drops the prepared state and increments version if the config differs.
    pub fn set_config(&mut self, config: RenderConfig) -> bool {
        if self.config.differs_from(&config) {
            self.config = config;
            self.invalidate();
            true
        } else {
            false
        }
    }

    /// Replaces the layers and drops the prepared state.
    pub fn set_icon(&mut self, icon: AdaptiveIcon) {
        self.icon = icon;
        self.invalidate();
    }

    /// Drops the prepared state.
    pub fn invalidate(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.stage = Stage::Unprepared;
    }

    pub fn is_prepared(&self) -> bool {
        matches!(self.stage, Stage::Prepared(_))
    }

    pub fn prepared(&self) -> Option<&PreparedIcon> {
        match &self.stage {
            Stage::Prepared(prepared) => Some(prepared),
            Stage::Unprepared => None,
        }
    }

    /// Prepares the mask and layers unless already prepared.
    ///
    /// On failure the compositor stays unprepared.
    pub fn prepare(&mut self) -> IconResult<&PreparedIcon> {
        if self.is_prepared() {
            trace!(version = self.version, "reusing prepared icon");
        } else {
            let prepared = prepare(&self.config, &self.icon)?;
            self.stage = Stage::Prepared(prepared);
        }
        self.prepared().ok_or(IconError::NotReady)
    }

    /// Composites the prepared state.
    ///
    /// Fails with [`IconError::NotReady`] if nothing has been prepared.
    pub fn composite(&self) -> IconResult<RenderedIcon> {
        let prepared = self.prepared().ok_or(IconError::NotReady)?;
        composite(&self.config, prepared)
    }

    /// Prepares if needed, then composites.
    pub fn render(&mut self) -> IconResult<RenderedIcon> {
        self.prepare()?;
        self.composite()
    }
}

impl Configurable for Compositor {
    /// Replaces the config with the profile's settings.
    ///
    /// Values are validated when the next render prepares.
    fn apply_profile(&mut self, profile: &RenderProfile) {
        self.set_config(profile.to_config());
    }

    fn export_profile(&self) -> RenderProfile {
        RenderProfile::from(&self.config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::MaskShape;
    use image::Rgba;

    const OPAQUE_BLUE: Rgba<u8> = Rgba([20, 60, 220, 255]);
    const OPAQUE_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn gradient(side: u32) -> RgbaImage {
        RgbaImage::from_fn(side, side, |x, y| {
            Rgba([(x * 255 / side) as u8, (y * 255 / side) as u8, 128, 255])
        })
    }

    fn assert_pixel_close(actual: &Rgba<u8>, expected: &Rgba<u8>) {
        for (a, e) in actual.0.iter().zip(expected.0.iter()) {
            assert!(a.abs_diff(*e) <= 1, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn background_only_is_clipped_to_the_circle() {
        let size = 64;
        let config = RenderConfig::default().with_output_size(size);
        let icon = AdaptiveIcon::new().with_background(gradient(100));

        let prepared = prepare(&config, &icon).unwrap();
        let background = prepared.background().unwrap();
        assert_eq!(background.dimensions(), (size, size));

        let rendered = composite(&config, &prepared).unwrap();
        let center = size as f32 / 2.0;
        for (x, y, pixel) in rendered.data.enumerate_pixels() {
            let dist = ((x as f32 + 0.5 - center).powi(2) + (y as f32 + 0.5 - center).powi(2)).sqrt();
            if dist < center - 2.0 {
                assert_pixel_close(pixel, background.get_pixel(x, y));
            } else if dist > center + 1.0 {
                assert_eq!(pixel.0[3], 0, "({x}, {y}) should be outside the mask");
            }
        }
    }

    #[test]
    fn square_mask_keeps_the_whole_frame() {
        let config = RenderConfig::new(MaskShape::Square).with_output_size(32);
        let icon = AdaptiveIcon::new().with_background(RgbaImage::from_pixel(40, 40, OPAQUE_BLUE));

        let rendered = render(&config, &icon).unwrap();
        for pixel in rendered.data.pixels() {
            assert_pixel_close(pixel, &OPAQUE_BLUE);
        }
    }

    #[test]
    fn independent_renders_are_identical() {
        let config = RenderConfig::new(MaskShape::Squircle)
            .with_output_size(48)
            .with_background_zoom(1.3)
            .with_foreground_zoom(1.2)
            .with_offset(0.4, -0.7);
        let icon = AdaptiveIcon::new()
            .with_background(gradient(90))
            .with_foreground(RgbaImage::from_pixel(60, 60, OPAQUE_WHITE));

        assert_eq!(render(&config, &icon).unwrap(), render(&config, &icon).unwrap());
    }

    #[test]
    fn background_parallax_only_moves_zoomed_in_layers() {
        let config = RenderConfig::default()
            .with_output_size(100)
            .with_background_zoom(1.5)
            .with_offset(1.0, 0.0);
        let icon = AdaptiveIcon::new().with_background(gradient(50));
        let prepared = prepare(&config, &icon).unwrap();
        let (w, h) = prepared.background().unwrap().dimensions();

        let (dx, dy) = background_translation(&config, SizePx::new(w, h));
        assert!((dx - 6.6).abs() < 1e-4);
        assert_eq!(dy, 0.0);

        for zoom in [0.6, 1.0, 1.5] {
            let still = config.clone().with_background_zoom(zoom).with_offset(0.0, 0.0);
            let scaled = prepare(&still, &icon).unwrap();
            let (w, h) = scaled.background().unwrap().dimensions();
            assert_eq!(background_translation(&still, SizePx::new(w, h)), (0.0, 0.0));
        }

        // Not oversized: no room to move.
        assert_eq!(background_translation(&config, SizePx::new(100, 100)), (0.0, 0.0));
    }

    #[test]
    fn background_offset_moves_pixels() {
        let icon = AdaptiveIcon::new().with_background(RgbaImage::from_pixel(50, 50, OPAQUE_WHITE));
        let centered = RenderConfig::new(MaskShape::Square)
            .with_output_size(100)
            .with_background_zoom(1.5);
        let shifted = centered.clone().with_offset(1.0, 0.0);

        // A 50px layer on a 150px canvas, centered: x in 25..75.
        let still = render(&centered, &icon).unwrap().data;
        assert_eq!(still.get_pixel(28, 50).0[3], 255);
        assert_eq!(still.get_pixel(78, 50).0[3], 0);

        // Shifted right by 6.6px: x in 31.6..81.6.
        let moved = render(&shifted, &icon).unwrap().data;
        assert_eq!(moved.get_pixel(28, 50).0[3], 0);
        assert_eq!(moved.get_pixel(78, 50).0[3], 255);
        // No vertical shift.
        assert_eq!(moved.get_pixel(50, 27).0[3], 255);
        assert_eq!(moved.get_pixel(50, 76).0[3], 0);
    }

    #[test]
    fn foreground_parallax_scales_with_output() {
        let config = RenderConfig::default().with_output_size(200).with_offset(-0.5, 1.0);
        let (dx, dy) = foreground_translation(&config);
        assert!((dx + 18.8).abs() < 1e-4);
        assert!((dy - 37.6).abs() < 1e-4);
    }

    #[test]
    fn foreground_zoom_shrinks_about_the_center() {
        let size = 40;
        let icon = AdaptiveIcon::new().with_foreground(RgbaImage::from_pixel(20, 20, OPAQUE_WHITE));

        let full = render(&RenderConfig::new(MaskShape::Square).with_output_size(size), &icon).unwrap();
        assert_eq!(full.data.get_pixel(2, 2).0[3], 255);

        let zoomed = RenderConfig::new(MaskShape::Square)
            .with_output_size(size)
            .with_foreground_zoom(1.5);
        let shrunk = render(&zoomed, &icon).unwrap();
        assert_eq!(shrunk.data.get_pixel(2, 2).0[3], 0);
        assert_pixel_close(shrunk.data.get_pixel(20, 20), &OPAQUE_WHITE);
    }

    #[test]
    fn prepared_mask_spans_the_output() {
        let config = RenderConfig::new(MaskShape::Teardrop).with_output_size(128);
        let prepared = prepare(&config, &AdaptiveIcon::new()).unwrap();
        let bounds = prepared.mask().path.bounds();
        assert!(bounds.x0.abs() < 0.5 && (bounds.x1 - 128.0).abs() < 0.5);
        assert!(bounds.y0.abs() < 0.5 && (bounds.y1 - 128.0).abs() < 0.5);
    }

    #[test]
    fn no_layers_renders_transparent() {
        let rendered = render(&RenderConfig::default().with_output_size(16), &AdaptiveIcon::new()).unwrap();
        assert!(rendered.data.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn empty_layer_is_skipped_not_fatal() {
        let icon = AdaptiveIcon::new()
            .with_background(RgbaImage::new(0, 0))
            .with_foreground(RgbaImage::from_pixel(8, 8, OPAQUE_WHITE));
        let rendered = render(&RenderConfig::new(MaskShape::Square).with_output_size(16), &icon).unwrap();

        assert_eq!(
            rendered.skipped,
            vec![SkippedLayer {
                role: LayerRole::Background,
                width: 0,
                height: 0
            }]
        );
        assert!(matches!(
            rendered.skipped[0].error(),
            IconError::InvalidLayer { role: LayerRole::Background, .. }
        ));
        // The foreground still made it in.
        assert!(rendered.data.get_pixel(8, 8).0[3] > 0);
    }

    #[test]
    fn invalid_mask_is_fatal() {
        let config = RenderConfig::new(MaskShape::custom("M 0 0 L 10"));
        let err = render(&config, &AdaptiveIcon::new()).unwrap_err();
        assert!(matches!(err, IconError::Parse(_)));
    }

    #[test]
    fn invalid_config_is_fatal() {
        let config = RenderConfig::default().with_background_zoom(2.5);
        assert!(matches!(
            render(&config, &AdaptiveIcon::new()),
            Err(IconError::InvalidConfig(_))
        ));

        let oversized = RenderConfig::default().with_output_size(u32::MAX);
        let icon = AdaptiveIcon::new().with_background(RgbaImage::new(4, 4));
        assert!(matches!(render(&oversized, &icon), Err(IconError::InvalidConfig(_))));
    }

    #[test]
    fn composite_before_prepare_is_not_ready() {
        let mut compositor = Compositor::new(
            RenderConfig::new(MaskShape::custom("Q")),
            AdaptiveIcon::new(),
        );
        assert!(matches!(compositor.composite(), Err(IconError::NotReady)));

        assert!(compositor.render().is_err());
        assert!(!compositor.is_prepared());
        assert!(matches!(compositor.composite(), Err(IconError::NotReady)));
    }

    #[test]
    fn compositor_reuses_and_invalidates() {
        let icon = AdaptiveIcon::new().with_background(gradient(64));
        let mut compositor = Compositor::new(RenderConfig::default().with_output_size(64), icon);

        let first = compositor.render().unwrap();
        assert!(compositor.is_prepared());
        assert_eq!(compositor.render().unwrap(), first);
        assert_eq!(compositor.version(), 0);

        assert!(!compositor.set_config(RenderConfig::default().with_output_size(64)));
        assert!(compositor.is_prepared());

        assert!(compositor.set_config(RenderConfig::default().with_output_size(32)));
        assert!(!compositor.is_prepared());
        assert_eq!(compositor.version(), 1);
        assert_eq!(compositor.render().unwrap().data.dimensions(), (32, 32));

        compositor.set_icon(AdaptiveIcon::new());
        assert!(!compositor.is_prepared());
        assert!(compositor.prepare().unwrap().background().is_none());
    }

    #[test]
    fn profile_round_trip_through_compositor() {
        let config = RenderConfig::new(MaskShape::RoundedSquare)
            .with_output_size(96)
            .with_offset(0.25, 0.0);
        let mut compositor = Compositor::new(RenderConfig::default(), AdaptiveIcon::new());

        compositor.apply_profile(&RenderProfile::from(&config));
        assert!(!compositor.config().differs_from(&config));
        assert_eq!(compositor.export_profile().output_size, 96);
    }
}
