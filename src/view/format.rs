use std::time::Duration;

/// Format a tool duration as human-readable string.
/// - < 1s: "Xms"
/// - < 60s: "X.Ys" (up to 4 decimals, trailing zeros trimmed)
/// - < 3600s: "Xm Ys"
/// - >= 3600s: "Xh Ym"
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        return format!("{}ms", millis);
    }

    let secs = duration.as_secs();
    if secs < 60 {
        let fractional = format!("{:.4}", millis as f64 / 1000.0);
        let trimmed = fractional.trim_end_matches('0').trim_end_matches('.');
        return format!("{}s", trimmed);
    }

    let mins = secs / 60;
    let hours = mins / 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins % 60)
    } else {
        format!("{}m {}s", mins, secs % 60)
    }
}
