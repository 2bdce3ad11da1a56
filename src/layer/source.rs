//! Turning layer inputs into raster buffers.
//!
//! Layers may arrive already decoded, as encoded image bytes (PNG, WebP, ...),
//! or as SVG markup, which is rendered with resvg.

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::{IconError, IconResult};
use crate::raster::pixmap_to_rgba_image;

// ============================================================================
// LayerSource
// ============================================================================

/// Where a layer's pixels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
    /// An already decoded image.
    Image(RgbaImage),

    /// Encoded image bytes in any format the `image` crate can sniff.
    Encoded(Vec<u8>),

    /// SVG markup, rendered on demand.
    Svg(String),
}

impl LayerSource {
    /// Creates a source from SVG markup.
    pub fn from_svg(svg: impl Into<String>) -> Self {
        Self::Svg(svg.into())
    }

    /// Produces the layer's pixels.
    ///
    /// SVG sources are rendered to fit a `size × size` box; the other
    /// variants keep their native dimensions.
    pub fn rasterize(&self, size: u32) -> IconResult<RgbaImage> {
        match self {
            Self::Image(img) => Ok(img.clone()),
            Self::Encoded(bytes) => Ok(image::load_from_memory(bytes)?.to_rgba8()),
            Self::Svg(svg) => render_svg(svg, size),
        }
    }

    /// Returns `true` if this is a vector source.
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Svg(_))
    }
}

impl From<RgbaImage> for LayerSource {
    fn from(img: RgbaImage) -> Self {
        Self::Image(img)
    }
}

// ============================================================================
// SVG Rendering
// ============================================================================

/// Renders an SVG string to an RGBA image at the specified size.
///
/// The SVG is scaled to fit within `size x size` pixels while preserving
/// aspect ratio (the larger dimension will be `size`).
pub fn render_svg(svg_data: &str, size: u32) -> IconResult<RgbaImage> {
    let opts = Options::default();
    let tree = Tree::from_str(svg_data, &opts).map_err(|e| IconError::svg(e.to_string()))?;

    let svg_size = tree.size();
    let scale = (size as f32) / svg_size.width().max(svg_size.height());
    let width = (svg_size.width() * scale).ceil() as u32;
    let height = (svg_size.height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| IconError::svg(format!("cannot allocate a {width}x{height} pixmap")))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}
