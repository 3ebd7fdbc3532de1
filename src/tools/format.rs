//! 顯示用的格式化工具

const BINARY_UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// 以二進位單位（1024 進位）格式化檔案大小，最多保留兩位小數
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BINARY_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let mut rounded = (value * 100.0).round() / 100.0;
    // 1023.999 KiB 四捨五入後會變成 1024 KiB
    if rounded >= 1024.0 && unit < BINARY_UNITS.len() - 1 {
        rounded /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(rounded), BINARY_UNITS[unit])
}

fn trim_decimals(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 將秒數格式化為時間碼
///
/// 不足一小時為 `mm:ss`，否則為 `h:mm:ss`
#[must_use]
pub fn timecode_from_seconds(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.abs().floor() as u64
    } else {
        0
    };

    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size_bytes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
    }

    #[test]
    fn test_format_file_size_binary_units() {
        assert_eq!(format_file_size(1024), "1 KiB");
        assert_eq!(format_file_size(1536), "1.5 KiB");
        assert_eq!(format_file_size(1024 * 1024 * 5 / 4), "1.25 MiB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GiB");
    }

    #[test]
    fn test_format_file_size_rounds_up_to_next_unit() {
        assert_eq!(format_file_size(1024 * 1024 - 1), "1 MiB");
    }

    #[test]
    fn test_timecode_under_one_hour() {
        assert_eq!(timecode_from_seconds(0.0), "00:00");
        assert_eq!(timecode_from_seconds(65.0), "01:05");
        assert_eq!(timecode_from_seconds(119.9), "01:59");
    }

    #[test]
    fn test_timecode_with_hours() {
        assert_eq!(timecode_from_seconds(3723.5), "1:02:03");
        assert_eq!(timecode_from_seconds(36_000.0), "10:00:00");
    }

    #[test]
    fn test_timecode_invalid_input() {
        assert_eq!(timecode_from_seconds(f64::NAN), "00:00");
    }
}
