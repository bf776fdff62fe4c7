/// Format a price as dollars with two decimals ("$155.50", "-$3.10")
pub fn format_usd(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        format!("${:.2}", value.abs())
    }
}

/// Format a change with an explicit sign ("+5.25", "-3.10", "+0.00")
pub fn format_signed(value: f64) -> String {
    // -0.0 would otherwise print as "-0.00"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:+.2}", value)
}

/// Format a percentage with two decimals, or "N/A" when undefined
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", if v == 0.0 { 0.0 } else { v }),
        _ => "N/A".to_string(),
    }
}
