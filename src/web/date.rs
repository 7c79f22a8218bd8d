//! 浏览器时钟封装模块
//!
//! "今天是几号、现在几点" 取自用户本地时区（js Date），
//! 原生测试环境退回 chrono 的系统时钟。日期运算统一用 chrono 类型。

use chrono::NaiveDate;

/// 用户本地时区的今天
pub fn today() -> NaiveDate {
    #[cfg(target_arch = "wasm32")]
    {
        let now = js_sys::Date::new_0();
        let year = now.get_full_year() as i32;
        // js Date 给出的年月日必然构成合法日期
        NaiveDate::from_ymd_opt(year, now.get_month() + 1, now.get_date())
            .unwrap_or(NaiveDate::MIN)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::Local::now().date_naive()
    }
}

/// 用户本地时区的当前小时 (0-23)
pub fn current_hour() -> u32 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::new_0().get_hours()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use chrono::Timelike;
        chrono::Local::now().hour()
    }
}

/// 解析 `<input type="date">` 的值 ("YYYY-MM-DD")
pub fn parse_input_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_date() {
        assert_eq!(
            parse_input_date("2026-01-05"),
            NaiveDate::from_ymd_opt(2026, 1, 5)
        );
        assert_eq!(parse_input_date("05/01/2026"), None);
        assert_eq!(parse_input_date(""), None);
    }

    #[test]
    fn test_today_is_valid() {
        // 原生路径走系统时钟，结果必须能来回格式化
        let day = today();
        assert_eq!(
            parse_input_date(&day.to_string()),
            Some(day)
        );
    }
}
