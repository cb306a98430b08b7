//! Float helpers for single-record percentages and display values.
//!
//! Accumulations never go through here; see [`shibplay_types::Fixed`].

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format with at most `decimals` places, trailing zeros stripped.
pub fn format_float(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let text = format!("{:.*}", decimals as usize, round_to(value, decimals));
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}
