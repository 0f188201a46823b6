use chrono::{DateTime, Duration, Utc};

/// 过期时间解析
#[derive(Debug, Clone)]
pub struct TimeParser;

impl TimeParser {
    /// 解析过期时间，支持：
    /// - RFC3339：2023-10-01T12:00:00Z
    /// - 相对时间：1d, 2w, 1h30m, 1d2h（相对 `now`）
    pub fn parse_expire_time_at(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
        let input = input.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(dt.with_timezone(&Utc));
        }

        let duration = Self::parse_duration(input)?;
        now.checked_add_signed(duration)
            .ok_or_else(|| format!("expire time out of range: '{}'", input))
    }

    pub fn parse_expire_time(input: &str) -> Result<DateTime<Utc>, String> {
        Self::parse_expire_time_at(input, Utc::now())
    }

    /// 解析 "1d2h30m" 形式的时间间隔
    pub fn parse_duration(input: &str) -> Result<Duration, String> {
        let mut total = Duration::zero();
        let mut rest = input;

        if rest.is_empty() {
            return Err("empty duration".to_string());
        }

        while !rest.is_empty() {
            let digits = rest.chars().take_while(char::is_ascii_digit).count();
            if digits == 0 {
                return Err(format!("invalid time format: '{}'", input));
            }
            let num: i64 = rest[..digits]
                .parse()
                .map_err(|_| format!("invalid number in '{}'", input))?;
            rest = &rest[digits..];

            let unit_len = rest
                .chars()
                .take_while(|c| c.is_ascii_alphabetic())
                .count();
            if unit_len == 0 {
                return Err(format!("missing time unit after '{}'", num));
            }
            let unit = &rest[..unit_len];
            rest = &rest[unit_len..];

            // "M" 为月，"m" 为分钟
            let step = match unit {
                "M" | "month" | "months" => Duration::try_days(num.saturating_mul(30)),
                _ => match unit.to_lowercase().as_str() {
                    "s" | "sec" | "second" | "seconds" => Duration::try_seconds(num),
                    "m" | "min" | "minute" | "minutes" => Duration::try_minutes(num),
                    "h" | "hour" | "hours" => Duration::try_hours(num),
                    "d" | "day" | "days" => Duration::try_days(num),
                    "w" | "week" | "weeks" => Duration::try_weeks(num),
                    "y" | "year" | "years" => Duration::try_days(num.saturating_mul(365)),
                    _ => return Err(format!("unsupported time unit: '{}'", unit)),
                },
            }
            .ok_or_else(|| format!("duration out of range: '{}'", input))?;

            total = total
                .checked_add(&step)
                .ok_or_else(|| format!("duration out of range: '{}'", input))?;
        }

        if total.is_zero() {
            return Err("duration must not be zero".to_string());
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_units() {
        let now = Utc::now();
        let result = TimeParser::parse_expire_time_at("1d", now).unwrap();
        assert_eq!(result - now, Duration::days(1));

        let result = TimeParser::parse_expire_time_at("2w", now).unwrap();
        assert_eq!(result - now, Duration::days(14));

        let result = TimeParser::parse_expire_time_at("1d2h30m", now).unwrap();
        assert_eq!(result - now, Duration::minutes(24 * 60 + 150));

        let result = TimeParser::parse_expire_time_at("1M", now).unwrap();
        assert_eq!(result - now, Duration::days(30));
    }

    #[test]
    fn test_rfc3339() {
        let result = TimeParser::parse_expire_time("2023-10-01T12:00:00Z").unwrap();
        assert_eq!(result.to_rfc3339(), "2023-10-01T12:00:00+00:00");
    }

    #[test]
    fn test_invalid() {
        assert!(TimeParser::parse_expire_time("invalid").is_err());
        assert!(TimeParser::parse_expire_time("1x").is_err());
        assert!(TimeParser::parse_expire_time("10").is_err());
        assert!(TimeParser::parse_expire_time("0d").is_err());
        assert!(TimeParser::parse_expire_time("").is_err());
    }
}
