//! `background-color` with alpha for browsers without `rgba()` support.

use crate::Result;
use crate::registry::HandlerContext;
use crate::types::parse_rgba;

/// Expand an `rgba()` background into a hex fallback, the original color and
/// a gradient filter carrying the alpha as `#aarrggbb`.
///
/// The fallback and filter use clamped channels; the `rgba()` declaration
/// keeps the channels as written.
///
/// Values without `rgba()` are emitted unchanged.
pub fn background_color(value: &str, _ctx: &mut HandlerContext<'_>) -> Result<String> {
    let Some(rgba) = parse_rgba(value) else {
        return Ok(format!("background-color: {value};"));
    };

    let hex = rgba.color.to_hex();
    let ms_color = rgba.color.to_argb_hex();
    let [r, g, b] = rgba.channel_text;
    let a = rgba.alpha_text;

    Ok(format!(
        "background-color: {hex};\
         background-color: rgba({r}, {g}, {b}, {a});\
         filter: progid:DXImageTransform.Microsoft.gradient(\
         startColorStr='{ms_color}',EndColorStr='{ms_color}');"
    ))
}
