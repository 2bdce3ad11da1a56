use std::fs;
use std::path::{Path, PathBuf};

use adaptive_icon::{
    AdaptiveIcon, LayerSource, MaskShape, RenderConfig, RenderProfile, RenderedIcon, render,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Render a two-layer adaptive icon clipped to a mask shape
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Foreground layer (any raster format, or .svg)
    #[arg(long)]
    foreground: Option<PathBuf>,

    /// Background layer (any raster format, or .svg)
    #[arg(long)]
    background: Option<PathBuf>,

    /// Built-in mask: circle, squircle, rounded-square, square, teardrop
    #[arg(long, conflicts_with = "path_data")]
    mask: Option<MaskShape>,

    /// Custom mask as path data in a 100x100 box
    #[arg(long)]
    path_data: Option<String>,

    /// Output side in pixels
    #[arg(short, long)]
    size: Option<u32>,

    #[arg(long)]
    background_zoom: Option<f32>,

    #[arg(long)]
    foreground_zoom: Option<f32>,

    /// Horizontal parallax offset in [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f32>,

    /// Vertical parallax offset in [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f32>,

    /// JSON profile with base settings; flags override it
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Output PNG file
    #[arg(short, long, default_value = "icon.png", conflicts_with = "all_masks")]
    out: PathBuf,

    /// Render every built-in mask into this directory instead
    #[arg(long)]
    all_masks: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Result<RenderConfig> {
        let mut config = match &self.profile {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading profile {}", path.display()))?;
                RenderProfile::from_json(&json)
                    .with_context(|| format!("parsing profile {}", path.display()))?
                    .to_config()
            }
            None => RenderConfig::default(),
        };

        if let Some(mask) = &self.mask {
            config.mask = mask.clone();
        }
        if let Some(data) = &self.path_data {
            config.mask = MaskShape::custom(data.clone());
        }
        if let Some(size) = self.size {
            config.output_size = size;
        }
        if let Some(zoom) = self.background_zoom {
            config.background_zoom = zoom;
        }
        if let Some(zoom) = self.foreground_zoom {
            config.foreground_zoom = zoom;
        }
        if let Some(x) = self.offset_x {
            config.offset_x = x;
        }
        if let Some(y) = self.offset_y {
            config.offset_y = y;
        }

        config.validate()?;
        Ok(config)
    }
}

fn load_source(path: &Path) -> Result<LayerSource> {
    let is_svg = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg {
        let svg = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Ok(LayerSource::from_svg(svg))
    } else {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        Ok(LayerSource::Encoded(bytes))
    }
}

fn save(rendered: &RenderedIcon, out: &Path) -> Result<()> {
    for layer in &rendered.skipped {
        warn!("{}", layer.error());
    }
    rendered
        .data
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    info!(path = %out.display(), "wrote icon");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.config()?;

    let background = args.background.as_deref().map(load_source).transpose()?;
    let foreground = args.foreground.as_deref().map(load_source).transpose()?;
    if background.is_none() && foreground.is_none() {
        bail!("nothing to render: pass --foreground and/or --background");
    }
    let icon = AdaptiveIcon::from_sources(background.as_ref(), foreground.as_ref(), config.output_size)
        .context("loading layers")?;

    match &args.all_masks {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            for mask in MaskShape::BUILT_IN {
                let out = dir.join(format!("{}.png", mask.name()));
                let rendered = render(&config.clone().with_mask(mask), &icon)?;
                save(&rendered, &out)?;
            }
        }
        None => save(&render(&config, &icon)?, &args.out)?,
    }

    Ok(())
}
