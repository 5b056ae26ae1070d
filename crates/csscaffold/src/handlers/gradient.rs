//! `background-gradient`: gradient images generated on demand.
//!
//! ```css
//! #header { background-gradient: vertical, 100px, from(#fff), to(#000), color-stop(0.5, #888); }
//! ```
//!
//! The value names a direction, the gradient length, the start and end
//! colors and any number of intermediate stops. The handler renders a PNG of
//! that gradient into the asset cache (once per distinct gradient) and emits
//! the declarations that tile it behind the element.
//!
//! Malformed values fail with [`Error::MalformedGradient`]; the rewriter then
//! leaves the declaration as written.

use std::fmt;
use std::path::PathBuf;

use csscaffold_render::{GradientAxis, LinearGradient, MAX_GRADIENT_DIMENSION};
use sha2::{Digest, Sha256};

use crate::logging::targets;
use crate::parser::{split_arguments, unwrap_function};
use crate::registry::HandlerContext;
use crate::types::{ColorTriple, hex_to_rgb};
use crate::{Error, Result};

/// Thickness of the generated image across the gradient axis.
pub const GRADIENT_THICKNESS: u32 = 50;

/// Direction in which the gradient colors change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientDirection {
    /// Left to right; the image is tiled vertically.
    Horizontal,
    /// Top to bottom; the image is tiled horizontally.
    Vertical,
}

impl GradientDirection {
    /// Parse `horizontal` or `vertical`, ignoring case.
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            _ => None,
        }
    }

    /// The CSS keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }

    /// The `background-repeat` axis that tiles the image.
    pub fn repeat_axis(&self) -> &'static str {
        match self {
            Self::Horizontal => "y",
            Self::Vertical => "x",
        }
    }

    /// Image `(width, height)` for a gradient of `size` pixels.
    pub fn dimensions(&self, size: u32) -> (u32, u32) {
        match self {
            Self::Horizontal => (size, GRADIENT_THICKNESS),
            Self::Vertical => (GRADIENT_THICKNESS, size),
        }
    }

    fn axis(&self) -> GradientAxis {
        match self {
            Self::Horizontal => GradientAxis::Horizontal,
            Self::Vertical => GradientAxis::Vertical,
        }
    }
}

impl fmt::Display for GradientDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intermediate `color-stop(position, color)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GradientStop {
    /// Position as written: a fraction (`0.5`) or a percentage (`50%`).
    pub position: String,
    /// Color as written.
    pub color: String,
}

impl GradientStop {
    /// Position as a fraction of the gradient length. `None` unless finite.
    pub fn offset(&self) -> Option<f32> {
        let position = self.position.trim();
        let offset = match position.strip_suffix('%') {
            Some(percent) => percent.trim().parse::<f32>().ok().map(|p| p / 100.0),
            None => position.parse::<f32>().ok(),
        };
        offset.filter(|offset| offset.is_finite())
    }
}

/// A parsed `background-gradient` value.
///
/// Equal values always map to the same [`GradientSpec::file_name`] and so
/// share one cached image.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientSpec {
    /// Direction of the color change.
    pub direction: GradientDirection,
    /// Gradient length in pixels.
    pub size: u32,
    /// Start color as written.
    pub from: String,
    /// End color as written.
    pub to: String,
    /// Parsed start color.
    pub start_color: ColorTriple,
    /// Parsed end color.
    pub end_color: ColorTriple,
    /// Intermediate stops in encounter order.
    pub stops: Vec<GradientStop>,
}

impl GradientSpec {
    /// Cache file name: `{direction}_{size}_{from}_{to}.png`, colors lowercased
    /// and without `#`.
    ///
    /// Gradients with intermediate stops append a digest of the stops so that
    /// gradients differing only in their stops get separate images.
    pub fn file_name(&self) -> String {
        let mut name = format!(
            "{}_{}_{}_{}",
            self.direction,
            self.size,
            file_color(&self.from),
            file_color(&self.to)
        );
        if !self.stops.is_empty() {
            name.push('_');
            name.push_str(&self.stops_digest());
        }
        name.push_str(".png");
        name
    }

    /// Image `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.direction.dimensions(self.size)
    }

    /// Describe the image to render.
    pub fn to_linear_gradient(&self) -> LinearGradient {
        let (width, height) = self.dimensions();
        let gradient = LinearGradient::new(
            width,
            height,
            self.direction.axis(),
            self.start_color.rgb(),
            self.end_color.rgb(),
        );

        self.stops.iter().fold(gradient, |gradient, stop| {
            match (stop.offset(), hex_to_rgb(&stop.color)) {
                (Some(offset), Ok(color)) => gradient.with_stop(offset, color.rgb()),
                _ => gradient,
            }
        })
    }

    fn stops_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for stop in &self.stops {
            hasher.update(stop.position.as_bytes());
            hasher.update(b":");
            hasher.update(stop.color.to_ascii_lowercase().as_bytes());
            hasher.update(b";");
        }
        hasher.finalize()[..4].iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn file_color(color: &str) -> String {
    color.trim_start_matches('#').to_ascii_lowercase()
}

/// A gradient requested during a rewrite pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedGradient {
    /// The parsed gradient.
    pub spec: GradientSpec,
    /// Location of the cached image.
    pub path: PathBuf,
    /// Whether the image was rendered by this request rather than reused.
    pub generated: bool,
}

/// Parse a `background-gradient` value.
///
/// The first four arguments are positional: direction, size (a trailing
/// unit is ignored, at most [`MAX_GRADIENT_DIMENSION`] pixels), `from(<hex>)`
/// and `to(<hex>)`. The remaining arguments
/// must be `color-stop(<position>, <hex>)`.
pub fn parse_gradient(value: &str) -> Result<GradientSpec> {
    let args = split_arguments(value);
    let [direction, size, from, to, stops @ ..] = args.as_slice() else {
        return Err(Error::malformed_gradient(
            value,
            "expected direction, size, from() and to()",
        ));
    };

    let direction = GradientDirection::from_css(direction).ok_or_else(|| {
        Error::malformed_gradient(value, format!("unknown direction '{direction}'"))
    })?;

    let size = size
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|&size| size > 0)
        .ok_or_else(|| Error::malformed_gradient(value, format!("invalid size '{size}'")))?;
    if size > MAX_GRADIENT_DIMENSION {
        return Err(Error::malformed_gradient(
            value,
            format!("size {size} exceeds the {MAX_GRADIENT_DIMENSION}px limit"),
        ));
    }

    let from = unwrap_function(from, "from")
        .ok_or_else(|| Error::malformed_gradient(value, "missing from() color"))?;
    let to = unwrap_function(to, "to")
        .ok_or_else(|| Error::malformed_gradient(value, "missing to() color"))?;
    let start_color = gradient_color(value, from)?;
    let end_color = gradient_color(value, to)?;

    let stops = stops
        .iter()
        .map(|stop| parse_stop(value, stop))
        .collect::<Result<Vec<_>>>()?;

    Ok(GradientSpec {
        direction,
        size,
        from: from.to_string(),
        to: to.to_string(),
        start_color,
        end_color,
        stops,
    })
}

fn gradient_color(value: &str, color: &str) -> Result<ColorTriple> {
    hex_to_rgb(color)
        .map_err(|_| Error::malformed_gradient(value, format!("invalid color '{color}'")))
}

fn parse_stop(value: &str, stop: &str) -> Result<GradientStop> {
    let inner = unwrap_function(stop, "color-stop")
        .ok_or_else(|| Error::malformed_gradient(value, format!("expected color-stop, got '{stop}'")))?;

    let parts = split_arguments(inner);
    let [position, color] = parts.as_slice() else {
        return Err(Error::malformed_gradient(
            value,
            format!("color-stop needs a position and a color: '{stop}'"),
        ));
    };

    let stop = GradientStop {
        position: position.to_string(),
        color: color.to_string(),
    };
    if stop.offset().is_none() {
        return Err(Error::malformed_gradient(value, format!("invalid stop position '{position}'")));
    }
    gradient_color(value, color)?;

    Ok(stop)
}

/// Handler for `background-gradient`.
pub fn background_gradient(value: &str, ctx: &mut HandlerContext<'_>) -> Result<String> {
    let spec = parse_gradient(value)?;
    let file_name = spec.file_name();
    let gradient = spec.to_linear_gradient();
    let renderer = ctx.renderer;

    let cached = ctx
        .assets
        .get_or_create(&ctx.config.gradient_namespace, &file_name, |path| {
            renderer.render(&gradient, path)
        })?;

    tracing::debug!(
        target: targets::GRADIENT,
        selector = ctx.selector,
        file = %file_name,
        generated = cached.generated,
        "resolved gradient"
    );

    let url = ctx.config.public_path(&cached.entry.asset_path);
    let repeat = spec.direction.repeat_axis();

    ctx.session.gradients.push(GeneratedGradient {
        spec,
        path: cached.entry.asset_path,
        generated: cached.generated,
    });

    Ok(format!(
        "background-position: top left;\
         background-repeat: repeat-{repeat};\
         background-image: url('{url}');"
    ))
}
