//! Human-readable byte counts for limits and file listings.

const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

/// Render a byte count with IEC units, dropping a zero fraction.
pub fn format_bytes(bytes: u64) -> String {
    let mut unit = 0;
    let mut scaled = bytes;
    let mut remainder = 0;
    while scaled >= 1024 && unit < UNITS.len() - 1 {
        remainder = scaled % 1024;
        scaled /= 1024;
        unit += 1;
    }

    let tenths = remainder * 10 / 1024;
    if unit == 0 || tenths == 0 {
        format!("{scaled} {}", UNITS[unit])
    } else {
        format!("{scaled}.{tenths} {}", UNITS[unit])
    }
}
