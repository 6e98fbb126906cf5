const KB: f64 = 1024.0;
const MB: f64 = 1024.0 * KB;
const GB: f64 = 1024.0 * MB;

/// Binary megabytes (bytes / 1024²).
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / MB
}

/// Binary gigabytes (bytes / 1024³).
pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / GB
}

/// Round to two decimal places, the precision of every numeric leaf in a snapshot.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid serializing "-0.0".
    if rounded == 0.0 { 0.0 } else { rounded }
}
