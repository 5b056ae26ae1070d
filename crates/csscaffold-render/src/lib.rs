//! Gradient image generation for CSScaffold.
//!
//! This crate rasterizes the linear gradients requested by
//! `background-gradient` declarations. The core crate only depends on the
//! [`GradientRenderer`] trait; [`ImageGradientRenderer`] is the PNG
//! implementation used by default.

mod error;
pub mod gradient;

pub use error::{RenderError, RenderResult};
pub use gradient::{
    ColorStop, GradientAxis, GradientRenderer, ImageGradientRenderer, LinearGradient,
    MAX_GRADIENT_DIMENSION,
};
