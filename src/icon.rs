//! Icon types for two-layer adaptive icons.
//!
//! An adaptive icon is a background and a foreground raster that are scaled,
//! offset and clipped together. Either layer may be absent.

use std::fmt;

use image::RgbaImage;

use crate::error::IconResult;
use crate::layer::LayerSource;

/// Which slot of the adaptive icon a layer occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    Background,
    Foreground,
}

impl LayerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Foreground => "foreground",
        }
    }
}

impl fmt::Display for LayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns true if the size exceeds `side` in both dimensions.
    pub fn exceeds(&self, side: u32) -> bool {
        self.width > side && self.height > side
    }
}

/// A single raster layer together with its role.
///
/// The pixel data is never modified by the renderer; scaling always produces
/// new buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct IconLayer {
    /// Which slot this layer fills.
    pub role: LayerRole,

    /// The image data in (straight alpha) RGBA format.
    pub data: RgbaImage,
}

impl IconLayer {
    pub fn new(role: LayerRole, data: RgbaImage) -> Self {
        Self { role, data }
    }

    /// Returns the pixel dimensions of the layer.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }
}

/// The pair of layers making up an adaptive icon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdaptiveIcon {
    pub background: Option<IconLayer>,
    pub foreground: Option<IconLayer>,
}

impl AdaptiveIcon {
    /// Creates an icon with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the background layer.
    pub fn with_background(mut self, data: RgbaImage) -> Self {
        self.background = Some(IconLayer::new(LayerRole::Background, data));
        self
    }

    /// Sets the foreground layer.
    pub fn with_foreground(mut self, data: RgbaImage) -> Self {
        self.foreground = Some(IconLayer::new(LayerRole::Foreground, data));
        self
    }

    /// Rasterizes each supplied source at `size` pixels and assembles the icon.
    ///
    /// `size` only matters for vector sources; encoded and in-memory images
    /// keep their own dimensions.
    pub fn from_sources(
        background: Option<&LayerSource>,
        foreground: Option<&LayerSource>,
        size: u32,
    ) -> IconResult<Self> {
        let mut icon = Self::new();
        if let Some(source) = background {
            icon = icon.with_background(source.rasterize(size)?);
        }
        if let Some(source) = foreground {
            icon = icon.with_foreground(source.rasterize(size)?);
        }
        Ok(icon)
    }

    /// Returns the layer occupying `role`, if any.
    pub fn layer(&self, role: LayerRole) -> Option<&IconLayer> {
        match role {
            LayerRole::Background => self.background.as_ref(),
            LayerRole::Foreground => self.foreground.as_ref(),
        }
    }

    /// Returns true if neither layer is present.
    pub fn is_empty(&self) -> bool {
        self.background.is_none() && self.foreground.is_none()
    }
}
