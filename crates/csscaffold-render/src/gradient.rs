//! Linear gradient rasterization.
//!
//! A [`LinearGradient`] describes a two-or-more color gradient along a single
//! axis. [`ImageGradientRenderer`] turns it into a PNG file that a stylesheet
//! can tile with `background-repeat`.
//!
//! # Example
//!
//! ```no_run
//! use csscaffold_render::{GradientAxis, GradientRenderer, ImageGradientRenderer, LinearGradient};
//! use std::path::Path;
//!
//! # fn example() -> csscaffold_render::RenderResult<()> {
//! let gradient = LinearGradient::new(50, 100, GradientAxis::Vertical, [255, 255, 255], [0, 0, 0])
//!     .with_stop(0.5, [136, 136, 136]);
//!
//! ImageGradientRenderer::new().render(&gradient, Path::new("/tmp/vertical_100_fff_000.png"))?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Largest width or height, in pixels, a gradient image may have.
pub const MAX_GRADIENT_DIMENSION: u32 = 8192;

/// The axis along which the gradient colors change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradientAxis {
    /// Colors change from left to right.
    Horizontal,
    /// Colors change from top to bottom.
    Vertical,
}

/// A color at a fractional position along the gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position in `[0, 1]`.
    pub offset: f32,
    /// RGB channels.
    pub rgb: [u8; 3],
}

impl ColorStop {
    /// Create a color stop. The offset is clamped to `[0, 1]`.
    pub fn new(offset: f32, rgb: [u8; 3]) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            rgb,
        }
    }
}

/// A linear gradient ready to be rasterized.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Direction of the color change.
    pub axis: GradientAxis,
    /// Color stops; not required to be sorted.
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    /// Create a two-color gradient from `start` at offset 0 to `end` at offset 1.
    pub fn new(width: u32, height: u32, axis: GradientAxis, start: [u8; 3], end: [u8; 3]) -> Self {
        Self {
            width,
            height,
            axis,
            stops: vec![ColorStop::new(0.0, start), ColorStop::new(1.0, end)],
        }
    }

    /// Add an intermediate color stop.
    pub fn with_stop(mut self, offset: f32, rgb: [u8; 3]) -> Self {
        self.stops.push(ColorStop::new(offset, rgb));
        self
    }

    /// Number of pixels along the gradient axis.
    pub fn length(&self) -> u32 {
        match self.axis {
            GradientAxis::Horizontal => self.width,
            GradientAxis::Vertical => self.height,
        }
    }

    /// Sample the gradient color at position `t` in `[0, 1]`.
    ///
    /// Returns black for a gradient without stops.
    pub fn sample(&self, t: f32) -> [u8; 3] {
        let stops = self.sorted_stops();
        sample_sorted(&stops, t)
    }

    /// Rasterize the gradient into an RGB image.
    pub fn to_image(&self) -> RenderResult<RgbImage> {
        let valid = 1..=MAX_GRADIENT_DIMENSION;
        if !valid.contains(&self.width) || !valid.contains(&self.height) {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.stops.is_empty() {
            return Err(RenderError::EmptyStops);
        }

        let stops = self.sorted_stops();
        let length = self.length();
        let colors: Vec<[u8; 3]> = (0..length)
            .map(|i| {
                let t = if length > 1 {
                    i as f32 / (length - 1) as f32
                } else {
                    0.0
                };
                sample_sorted(&stops, t)
            })
            .collect();

        let axis = self.axis;
        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            let index = match axis {
                GradientAxis::Horizontal => x,
                GradientAxis::Vertical => y,
            };
            Rgb(colors[index as usize])
        }))
    }

    fn sorted_stops(&self) -> Vec<ColorStop> {
        let mut stops = self.stops.clone();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        stops
    }
}

fn sample_sorted(stops: &[ColorStop], t: f32) -> [u8; 3] {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return [0, 0, 0];
    };
    let t = t.clamp(0.0, 1.0);

    if t <= first.offset {
        return first.rgb;
    }
    if t >= last.offset {
        return last.rgb;
    }

    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.offset && t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.rgb;
            }
            let f = (t - a.offset) / span;
            return [
                lerp_channel(a.rgb[0], b.rgb[0], f),
                lerp_channel(a.rgb[1], b.rgb[1], f),
                lerp_channel(a.rgb[2], b.rgb[2], f),
            ];
        }
    }

    last.rgb
}

fn lerp_channel(a: u8, b: u8, f: f32) -> u8 {
    let value = a as f32 + (b as f32 - a as f32) * f;
    value.round().clamp(0.0, 255.0) as u8
}

/// Capability of drawing a linear gradient into an image file.
pub trait GradientRenderer: Send + Sync {
    /// Render `gradient` and write the encoded image to `path`.
    fn render(&self, gradient: &LinearGradient, path: &Path) -> RenderResult<()>;
}

/// Renders gradients to PNG files with the `image` crate.
///
/// The image is encoded into a temporary file next to the target and then
/// renamed into place, so a reader never observes a partially written file
/// and two writers racing on the same path both leave a complete image.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageGradientRenderer;

impl ImageGradientRenderer {
    /// Create a new PNG renderer.
    pub fn new() -> Self {
        Self
    }
}

impl GradientRenderer for ImageGradientRenderer {
    fn render(&self, gradient: &LinearGradient, path: &Path) -> RenderResult<()> {
        let image = gradient.to_image()?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut temp = tempfile::Builder::new()
            .prefix(".gradient")
            .suffix(".tmp")
            .tempfile_in(dir)?;

        image.write_to(&mut temp, ImageFormat::Png)?;
        temp.persist(path).map_err(|e| RenderError::Io(e.error))?;

        debug!(
            path = %path.display(),
            width = gradient.width,
            height = gradient.height,
            "rendered gradient image"
        );
        Ok(())
    }
}
