/// Units used by [`format_file_size`], each 1024 times the previous one
const SIZE_UNITS: [&str; 3] = ["Bytes", "KB", "MB"];

/// Human-readable size, e.g. `1536` → `"1.5 KB"`
///
/// Picks the largest unit in which the value is at least 1, rounds to two
/// decimals and drops trailing zeros. Sizes of 1 GiB and above stay in MB.
/// `0` means the size is unknown.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "Unknown size".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}
