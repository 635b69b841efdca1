//! 时间工具函数 — 业务时区转换
//!
//! 持久化层只存 `i64` Unix millis；"今天"、星期几等判断一律在业务时区下计算。

use chrono::{DateTime, NaiveDate, Weekday};
use chrono_tz::Tz;

/// Unix millis → 业务时区日期
pub fn business_date(now_millis: i64, tz: Tz) -> NaiveDate {
    DateTime::from_timestamp_millis(now_millis)
        .unwrap_or_default()
        .with_timezone(&tz)
        .date_naive()
}

/// 解析时区名称，失败返回 None
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse().ok()
}

/// 解析星期 ("Fri", "friday", "5" 皆可)
///
/// 数字按 ISO: 1 = Monday ... 7 = Sunday
pub fn parse_weekday(value: &str) -> Option<Weekday> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u8>() {
        return match n {
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            7 => Some(Weekday::Sun),
            _ => None,
        };
    }
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_date_crosses_midnight() {
        let tz: Tz = "Asia/Hebron".parse().unwrap();
        // 2030-03-14T22:30:00Z is already the 15th in Hebron (UTC+2)
        let millis = NaiveDate::from_ymd_opt(2030, 3, 14)
            .unwrap()
            .and_hms_opt(22, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(
            business_date(millis, tz),
            NaiveDate::from_ymd_opt(2030, 3, 15).unwrap()
        );
        assert_eq!(
            business_date(millis, chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2030, 3, 14).unwrap()
        );
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("Fri"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("friday"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("5"), Some(Weekday::Fri));
        assert_eq!(parse_weekday("9"), None);
        assert_eq!(parse_weekday("someday"), None);
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Asia/Hebron").is_some());
        assert!(parse_timezone("Mars/Olympus").is_none());
    }
}
