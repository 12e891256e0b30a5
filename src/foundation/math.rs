/// Blend one 8-bit channel: `alpha * src + (1 - alpha) * dst`, rounded to u8.
///
/// `alpha` is the effective alpha in `[0, 1]`.
#[inline]
pub(crate) fn blend_channel(src: u8, dst: u8, alpha: f32) -> u8 {
    let v = alpha * f32::from(src) + (1.0 - alpha) * f32::from(dst);
    round_to_u8(v)
}

#[inline]
pub(crate) fn round_to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert an 8-bit alpha to `[0, 1]` and scale by `opacity`.
#[inline]
pub(crate) fn effective_alpha(alpha: u8, opacity: f32) -> f32 {
    (f32::from(alpha) / 255.0) * opacity
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
