//! Vendor-prefix and legacy-filter expansion for CSS3 properties.
//!
//! The emitted text is consumed by existing stylesheets and browser shims,
//! so every template here is reproduced exactly, spacing included.

use std::sync::LazyLock;

use regex::Regex;

use crate::Result;
use crate::logging::targets;
use crate::registry::HandlerContext;
use crate::types::offset_to_polar;

static BOX_SHADOW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+)px\s+(-?\d+)px\s+(\d+)px\s+(#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3}))$")
        .expect("box-shadow pattern is valid")
});

static OPACITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d?\.\d+").expect("opacity pattern is valid"));

/// `border-radius`: `-moz-`, `-webkit-` and `-khtml-` variants plus the
/// curved-corner behavior for old Internet Explorer.
pub fn border_radius(value: &str, ctx: &mut HandlerContext<'_>) -> Result<String> {
    let behavior = ctx.config.behavior_url("border-radius.htc");
    // Stylesheets in the wild match on the misspelled -khtml- property; keep it.
    Ok(format!(
        "-moz-border-radius:{value};\
         -webkit-border-radius:{value};\
         -khtml-border-raius:{value};\
         border-radius:{value};\
         behavior:url('{behavior}');"
    ))
}

/// `box-shadow`: vendor variants plus the box-shadow behavior.
///
/// Only `<x>px <y>px <blur>px <hex color>` values are expanded. Anything
/// else is emitted unchanged as a plain `box-shadow` declaration.
pub fn box_shadow(value: &str, ctx: &mut HandlerContext<'_>) -> Result<String> {
    let Some(caps) = BOX_SHADOW_PATTERN.captures(value.trim()) else {
        tracing::debug!(
            target: targets::REWRITE,
            selector = ctx.selector,
            "box-shadow '{}' not expandable, emitting unchanged",
            value
        );
        return Ok(format!("box-shadow:{value};"));
    };

    let x: f64 = caps[1].parse().unwrap_or_default();
    let y: f64 = caps[2].parse().unwrap_or_default();
    let polar = offset_to_polar(x, y);
    tracing::trace!(
        target: targets::REWRITE,
        color = &caps[4],
        direction = polar.rotation_degrees,
        strength = polar.magnitude,
        "box-shadow filter parameters"
    );

    let behavior = ctx.config.behavior_url("box-shadow.htc");
    Ok(format!(
        "-moz-box-shadow:{value};\
         -webkit-box-shadow:{value};\
         box-shadow:{value};\
         behavior:url('{behavior}');"
    ))
}

/// `opacity`: the standard property plus an `Alpha` filter in percent.
pub fn opacity(value: &str, _ctx: &mut HandlerContext<'_>) -> Result<String> {
    let Some(found) = OPACITY_PATTERN.find(value) else {
        return Ok(format!("opacity: {value};"));
    };

    let fraction = found.as_str();
    let percent = fraction
        .parse::<f64>()
        .map(|f| (f * 100.0).round() as i64)
        .unwrap_or(100);

    Ok(format!(
        "opacity: {fraction};filter: progid:DXImageTransform.Microsoft.Alpha(opacity={percent});"
    ))
}

/// `text-shadow`: unchanged value plus the text-shadow behavior.
pub fn text_shadow(value: &str, ctx: &mut HandlerContext<'_>) -> Result<String> {
    let behavior = ctx.config.behavior_url("text-shadow.htc");
    Ok(format!("text-shadow:{value};behavior:url('{behavior}');"))
}

/// `transition`: `-moz-`, `-webkit-` and `-o-` variants plus the standard property.
pub fn transition(value: &str, _ctx: &mut HandlerContext<'_>) -> Result<String> {
    Ok(format!(
        "-moz-transition:{value};\
         -webkit-transition:{value};\
         -o-transition:{value};\
         transition:{value};"
    ))
}
