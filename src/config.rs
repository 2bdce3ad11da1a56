//! Render configuration.

use crate::error::{IconError, IconResult};
use crate::shape::MaskShape;

/// Default output side in pixels.
pub const DEFAULT_OUTPUT_SIZE: u32 = 256;
/// Default background zoom: a wide field scaled down to the frame.
pub const DEFAULT_BACKGROUND_ZOOM: f32 = 0.6;
pub const DEFAULT_FOREGROUND_ZOOM: f32 = 1.0;

/// Largest accepted output side. Zoomed-in layers are scaled onto canvases
/// up to twice this size.
pub const MAX_OUTPUT_SIZE: u32 = 8192;

const EPSILON: f32 = 0.0001;

/// Every parameter of a single render.
///
/// A config is a plain value: build it once with the `with_*` methods and
/// hand it to [`crate::render`] or a [`crate::Compositor`].
///
/// # Example
///
/// ```
/// use adaptive_icon::{MaskShape, RenderConfig};
///
/// let config = RenderConfig::new(MaskShape::Squircle)
///     .with_output_size(192)
///     .with_offset(0.5, 0.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Side of the square output, in pixels.
    pub output_size: u32,

    /// Zoom applied when scaling the layers. Values below 1 shrink a wider
    /// field into the frame, values above 1 pad the layer with margin.
    pub background_zoom: f32,

    /// Extra zoom for the foreground alone, applied about the center.
    pub foreground_zoom: f32,

    /// Horizontal parallax offset in `[-1, 1]`.
    pub offset_x: f32,

    /// Vertical parallax offset in `[-1, 1]`.
    pub offset_y: f32,

    pub mask: MaskShape,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            background_zoom: DEFAULT_BACKGROUND_ZOOM,
            foreground_zoom: DEFAULT_FOREGROUND_ZOOM,
            offset_x: 0.0,
            offset_y: 0.0,
            mask: MaskShape::default(),
        }
    }
}

impl RenderConfig {
    /// Creates a default config clipped to `mask`.
    pub fn new(mask: MaskShape) -> Self {
        Self {
            mask,
            ..Self::default()
        }
    }

    pub fn with_output_size(mut self, size: u32) -> Self {
        self.output_size = size;
        self
    }

    pub fn with_background_zoom(mut self, zoom: f32) -> Self {
        self.background_zoom = zoom;
        self
    }

    pub fn with_foreground_zoom(mut self, zoom: f32) -> Self {
        self.foreground_zoom = zoom;
        self
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    pub fn with_mask(mut self, mask: MaskShape) -> Self {
        self.mask = mask;
        self
    }

    /// Checks that every parameter is usable.
    ///
    /// The output size must lie in `1..=MAX_OUTPUT_SIZE`.
    /// Zooms must lie in `(0, 2)`: both zoom formulas scale by `2 - zoom`,
    /// which must stay positive.
    pub fn validate(&self) -> IconResult<()> {
        if self.output_size == 0 {
            return Err(IconError::invalid_config("output size must be positive"));
        }
        if self.output_size > MAX_OUTPUT_SIZE {
            return Err(IconError::invalid_config(format!(
                "output size must be at most {MAX_OUTPUT_SIZE}, got {}",
                self.output_size
            )));
        }
        check_zoom("background zoom", self.background_zoom)?;
        check_zoom("foreground zoom", self.foreground_zoom)?;
        check_offset("offset x", self.offset_x)?;
        check_offset("offset y", self.offset_y)?;
        Ok(())
    }

    /// Returns true if this config would render differently from `other`.
    pub fn differs_from(&self, other: &Self) -> bool {
        self.output_size != other.output_size
            || (self.background_zoom - other.background_zoom).abs() > EPSILON
            || (self.foreground_zoom - other.foreground_zoom).abs() > EPSILON
            || (self.offset_x - other.offset_x).abs() > EPSILON
            || (self.offset_y - other.offset_y).abs() > EPSILON
            || self.mask != other.mask
    }
}

fn check_zoom(name: &str, zoom: f32) -> IconResult<()> {
    if zoom.is_finite() && zoom > 0.0 && zoom < 2.0 {
        Ok(())
    } else {
        Err(IconError::invalid_config(format!(
            "{name} must be in (0, 2), got {zoom}"
        )))
    }
}

fn check_offset(name: &str, offset: f32) -> IconResult<()> {
    if offset.is_finite() && (-1.0..=1.0).contains(&offset) {
        Ok(())
    } else {
        Err(IconError::invalid_config(format!(
            "{name} must be in [-1, 1], got {offset}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.output_size, 256);
        assert_eq!(config.background_zoom, 0.6);
        assert_eq!(config.foreground_zoom, 1.0);
        assert_eq!((config.offset_x, config.offset_y), (0.0, 0.0));
        assert_eq!(config.mask, MaskShape::Circle);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let base = RenderConfig::default();
        assert!(base.clone().with_output_size(0).validate().is_err());
        assert!(base.clone().with_background_zoom(0.0).validate().is_err());
        assert!(base.clone().with_background_zoom(2.0).validate().is_err());
        assert!(base.clone().with_foreground_zoom(f32::NAN).validate().is_err());
        assert!(base.clone().with_offset(1.5, 0.0).validate().is_err());
        assert!(base.with_offset(0.0, -1.0).validate().is_ok());
    }

    #[test]
    fn output_size_is_capped() {
        let base = RenderConfig::default();
        assert!(base.clone().with_output_size(MAX_OUTPUT_SIZE).validate().is_ok());

        let err = base.with_output_size(u32::MAX).validate().unwrap_err();
        assert!(matches!(err, IconError::InvalidConfig(_)));
        assert!(err.to_string().contains("at most 8192"));
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = RenderConfig::default()
            .with_foreground_zoom(3.0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("foreground zoom"));
    }

    #[test]
    fn differs_from_ignores_float_noise() {
        let a = RenderConfig::default();
        let b = a.clone().with_background_zoom(0.600_001);
        assert!(!a.differs_from(&b));
        assert!(a.differs_from(&b.clone().with_output_size(128)));
        assert!(a.differs_from(&a.clone().with_mask(MaskShape::Teardrop)));
    }
}
