//! 时间戳解析 - `HH:MM:SS` / `MM:SS` 字符串转秒数
//!
//! 纯函数，无任何 I/O。秒允许小数，时/分必须是整数。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp must be in HH:MM:SS or MM:SS format: {0}")]
    InvalidFormat(String),
}

fn invalid(reason: &str) -> TimestampError {
    TimestampError::InvalidFormat(reason.to_string())
}

/// 把 `HH:MM:SS` 或 `MM:SS` 解析为总秒数
///
/// 两段形式按 `MM:SS` 处理（小时为 0），三段形式按 `HH:MM:SS` 处理。
pub fn parse_timestamp(text: &str) -> Result<f64, TimestampError> {
    let trimmed = text.trim();

    if !trimmed.contains(':') {
        return Err(invalid("missing ':' separator"));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours_str, minutes_str, seconds_str) = match parts.as_slice() {
        [minutes, seconds] => ("0", *minutes, *seconds),
        [hours, minutes, seconds] => (*hours, *minutes, *seconds),
        _ => return Err(invalid("expected 2 or 3 colon-separated fields")),
    };

    let hours: i64 = hours_str
        .parse()
        .map_err(|_| invalid("hours must be a whole number"))?;
    let minutes: i64 = minutes_str
        .parse()
        .map_err(|_| invalid("minutes must be a whole number"))?;
    let seconds: f64 = seconds_str
        .parse()
        .map_err(|_| invalid("seconds must be a number"))?;

    if minutes >= 60 || seconds >= 60.0 {
        return Err(invalid("minutes and seconds must be less than 60"));
    }
    if hours < 0 || minutes < 0 || seconds < 0.0 {
        return Err(invalid("time values cannot be negative"));
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// 秒数格式化为 `HH:MM:SS`（向下取整到秒）
pub fn format_seconds(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mm_ss() {
        assert_eq!(parse_timestamp("00:05").unwrap(), 5.0);
        assert_eq!(parse_timestamp("12:34").unwrap(), 754.0);
    }

    #[test]
    fn test_parse_hh_mm_ss() {
        assert_eq!(parse_timestamp("01:02:03").unwrap(), 3723.0);
        assert_eq!(parse_timestamp("00:00:00").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_fractional_seconds() {
        assert_eq!(parse_timestamp("00:05.5").unwrap(), 5.5);
        assert_eq!(parse_timestamp("1:00:30.25").unwrap(), 3630.25);
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        assert_eq!(parse_timestamp("  02:10  ").unwrap(), 130.0);
    }

    #[test]
    fn test_parse_exact_arithmetic_sum() {
        // 对合法输入严格等于 hours*3600 + minutes*60 + seconds
        for (h, m, s) in [(0u32, 0u32, 1u32), (0, 59, 59), (5, 30, 15), (23, 1, 2)] {
            let text = format!("{:02}:{:02}:{:02}", h, m, s);
            let expected = h as f64 * 3600.0 + m as f64 * 60.0 + s as f64;
            assert_eq!(parse_timestamp(&text).unwrap(), expected);
        }
    }

    #[test]
    fn test_distinct_inputs_give_distinct_seconds() {
        let inputs = ["00:01", "00:10", "01:00", "00:01:00", "01:00:00", "10:00"];
        let mut seen = Vec::new();
        for input in inputs {
            let value = parse_timestamp(input).unwrap();
            assert!(!seen.contains(&value.to_bits()), "collision at {}", input);
            seen.push(value.to_bits());
        }
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(parse_timestamp("12").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!(parse_timestamp("1:2:3:4").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_components() {
        assert!(parse_timestamp("90:00").is_err());
        assert!(parse_timestamp("00:60").is_err());
        assert!(parse_timestamp("01:60:00").is_err());
    }

    #[test]
    fn test_parse_rejects_negative_components() {
        assert!(parse_timestamp("-1:00").is_err());
        assert!(parse_timestamp("01:-5").is_err());
        assert!(parse_timestamp("-1:00:00").is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric_fields() {
        assert!(parse_timestamp("aa:bb").is_err());
        assert!(parse_timestamp("1.5:00").is_err());
        assert!(parse_timestamp(":30").is_err());
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00");
        assert_eq!(format_seconds(10.0), "00:00:10");
        assert_eq!(format_seconds(3723.9), "01:02:03");
        assert_eq!(format_seconds(-5.0), "00:00:00");
    }
}
