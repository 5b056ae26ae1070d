//! Built-in property handlers.
//!
//! | Property              | Expansion                                           |
//! |-----------------------|-----------------------------------------------------|
//! | `background-color`    | hex fallback and IE gradient filter for `rgba()`    |
//! | `background-gradient` | generated PNG tiled as the background image         |
//! | `border-radius`       | vendor prefixes and corner behavior                 |
//! | `box-shadow`          | vendor prefixes and shadow behavior                 |
//! | `opacity`             | IE alpha filter                                     |
//! | `text-shadow`         | text-shadow behavior                                |
//! | `transition`          | vendor prefixes                                     |

mod background;
mod css3;
mod gradient;

pub use background::background_color;
pub use css3::{border_radius, box_shadow, opacity, text_shadow, transition};
pub use gradient::{
    GRADIENT_THICKNESS, GeneratedGradient, GradientDirection, GradientSpec, GradientStop,
    background_gradient, parse_gradient,
};

use crate::registry::PropertyRegistry;

/// Register every built-in handler on `registry`.
pub fn register_defaults(registry: &mut PropertyRegistry) {
    registry.register_fn("background-color", background_color);
    registry.register_fn("background-gradient", background_gradient);
    registry.register_fn("border-radius", border_radius);
    registry.register_fn("box-shadow", box_shadow);
    registry.register_fn("opacity", opacity);
    registry.register_fn("text-shadow", text_shadow);
    registry.register_fn("transition", transition);
}
