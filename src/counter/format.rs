/// Round `value` half away from zero to `precision` decimals.
///
/// `f64::round` already rounds half away from zero; scaling first keeps that
/// behaviour for decimals. Values too large to scale are returned unchanged
/// and left to the formatter.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let scaled = value * scale;
    let rounded = if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    };
    // Never print "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Render `prefix + round(value, precision) + suffix`.
pub fn format_value(value: f64, precision: u32, prefix: &str, suffix: &str) -> String {
    let rounded = round_to(value, precision);
    format!("{prefix}{rounded:.prec$}{suffix}", prec = precision as usize)
}
