//! 列表本地过滤模块
//!
//! 管理端/业主端的列表都是同一个套路：拉全量集合，本地做搜索、
//! 状态、日期过滤。全部是 `(数据, 条件) -> 视图` 的纯函数，
//! 不存任何派生状态，条件一变重算一遍。
//!
//! 本地算出来的汇总（营收卡片）只是当前过滤子集的速览，
//! 权威口径永远以后端报表接口为准。

use chrono::NaiveDate;

use crate::models::{Booking, Field, FieldKind, PaymentStatus, Venue};

/// 大小写不敏感的子串匹配，空关键字恒为真
pub fn text_match(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// =========================================================
// 订单过滤
// =========================================================

/// 订单列表的过滤条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    /// 匹配订单号或下单用户名
    pub search: String,
    pub status: Option<PaymentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(status) = self.status {
            if booking.payment_status != status {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            // 有日期条件时，没有下单时间的订单视为不匹配
            let Some(created) = booking.created_date() else {
                return false;
            };
            if self.date_from.is_some_and(|from| created < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| created > to) {
                return false;
            }
        }

        if !self.search.trim().is_empty() {
            let user_hit = booking
                .user
                .as_ref()
                .is_some_and(|u| text_match(&u.name, &self.search));
            if !text_match(&booking.booking_code, &self.search) && !user_hit {
                return false;
            }
        }

        true
    }

    /// 过滤并按下单时间从新到旧排列，没有时间的排最后
    pub fn apply<'a>(&self, bookings: &'a [Booking]) -> Vec<&'a Booking> {
        let mut filtered: Vec<&Booking> = bookings.iter().filter(|b| self.matches(b)).collect();
        filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        filtered
    }
}

/// 营收速览：只累加子集中"已支付"的订单
pub fn revenue_of_paid(bookings: &[&Booking]) -> i64 {
    bookings
        .iter()
        .filter(|b| b.payment_status == PaymentStatus::Paid)
        .map(|b| b.total_amount)
        .sum()
}

// =========================================================
// 场馆 / 场地过滤
// =========================================================

/// 按名称或地址搜索场馆
pub fn filter_venues<'a>(venues: &'a [Venue], keyword: &str) -> Vec<&'a Venue> {
    venues
        .iter()
        .filter(|v| text_match(&v.name, keyword) || text_match(&v.address, keyword))
        .collect()
}

/// 按类型和名称过滤场地
pub fn filter_fields<'a>(
    fields: &'a [Field],
    kind: Option<FieldKind>,
    keyword: &str,
) -> Vec<&'a Field> {
    fields
        .iter()
        .filter(|f| kind.is_none_or(|k| f.kind == k))
        .filter(|f| text_match(&f.name, keyword))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn booking(code: &str, status: PaymentStatus, created: Option<&str>, total: i64) -> Booking {
        Booking {
            id: 0,
            booking_code: code.to_string(),
            user: Some(User {
                id: 1,
                name: "Budi Santoso".to_string(),
                email: "budi@mail.com".to_string(),
                role: Default::default(),
            }),
            items: vec![],
            total_amount: total,
            payment_status: status,
            payment_proof: None,
            expired_at: None,
            created_at: created.map(String::from),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_status_and_date_filters_combined() {
        let bookings = vec![
            booking("BK-A", PaymentStatus::Pending, Some("2026-01-01 09:00:00"), 200_000),
            booking("BK-B", PaymentStatus::Paid, Some("2026-01-01 11:00:00"), 300_000),
            booking("BK-C", PaymentStatus::Pending, Some("2026-01-02 09:00:00"), 150_000),
        ];

        let filter = BookingFilter {
            status: Some(PaymentStatus::Pending),
            date_from: Some(d(2026, 1, 1)),
            date_to: Some(d(2026, 1, 1)),
            ..Default::default()
        };
        let shown = filter.apply(&bookings);
        let codes: Vec<&str> = shown.iter().map(|b| b.booking_code.as_str()).collect();
        assert_eq!(codes, vec!["BK-A"]);

        // 过滤后的子集里没有已支付订单，营收卡片显示 0
        assert_eq!(revenue_of_paid(&shown), 0);

        // 只按日期过滤时，营收只算子集中已支付的那笔
        let by_date = BookingFilter {
            date_from: Some(d(2026, 1, 1)),
            date_to: Some(d(2026, 1, 1)),
            ..Default::default()
        };
        let shown = by_date.apply(&bookings);
        assert_eq!(shown.len(), 2);
        assert_eq!(revenue_of_paid(&shown), 300_000);
    }

    #[test]
    fn test_search_matches_code_and_user_name() {
        let bookings = vec![
            booking("BK-123", PaymentStatus::Unpaid, None, 100_000),
            booking("XY-777", PaymentStatus::Unpaid, None, 100_000),
        ];

        let by_code = BookingFilter {
            search: "bk-12".to_string(),
            ..Default::default()
        };
        assert_eq!(by_code.apply(&bookings).len(), 1);

        // 用户名也能搜到，大小写不敏感
        let by_name = BookingFilter {
            search: "SANTOSO".to_string(),
            ..Default::default()
        };
        assert_eq!(by_name.apply(&bookings).len(), 2);

        let miss = BookingFilter {
            search: "tidak-ada".to_string(),
            ..Default::default()
        };
        assert!(miss.apply(&bookings).is_empty());
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let bookings = vec![
            booking("BK-1", PaymentStatus::Paid, Some("2026-01-01 08:00:00"), 1),
            booking("BK-2", PaymentStatus::Paid, Some("2026-01-05 08:00:00"), 1),
            booking("BK-3", PaymentStatus::Paid, None, 1),
        ];

        let from_only = BookingFilter {
            date_from: Some(d(2026, 1, 2)),
            ..Default::default()
        };
        let codes: Vec<&str> = from_only
            .apply(&bookings)
            .iter()
            .map(|b| b.booking_code.as_str())
            .collect();
        // 没有下单时间的 BK-3 在日期过滤下不出现
        assert_eq!(codes, vec!["BK-2"]);

        let to_only = BookingFilter {
            date_to: Some(d(2026, 1, 1)),
            ..Default::default()
        };
        assert_eq!(to_only.apply(&bookings).len(), 1);

        // 无日期条件时三笔都在
        assert_eq!(BookingFilter::default().apply(&bookings).len(), 3);
    }

    #[test]
    fn test_apply_sorts_newest_first() {
        let bookings = vec![
            booking("BK-OLD", PaymentStatus::Paid, Some("2026-01-01 08:00:00"), 1),
            booking("BK-NEW", PaymentStatus::Paid, Some("2026-01-03 08:00:00"), 1),
            booking("BK-NODATE", PaymentStatus::Paid, None, 1),
        ];
        let shown = BookingFilter::default().apply(&bookings);
        let codes: Vec<&str> = shown.iter().map(|b| b.booking_code.as_str()).collect();
        assert_eq!(codes, vec!["BK-NEW", "BK-OLD", "BK-NODATE"]);
    }

    #[test]
    fn test_revenue_sums_only_paid() {
        let bookings = vec![
            booking("BK-1", PaymentStatus::Paid, None, 200_000),
            booking("BK-2", PaymentStatus::Paid, None, 300_000),
            booking("BK-3", PaymentStatus::Pending, None, 999_999),
        ];
        let all: Vec<&Booking> = bookings.iter().collect();
        assert_eq!(revenue_of_paid(&all), 500_000);
    }

    #[test]
    fn test_filter_venues_by_keyword() {
        let venues = vec![
            Venue {
                id: 1,
                name: "GOR Candra".to_string(),
                address: "Jl. Melati 1".to_string(),
                description: String::new(),
                open_time: "08:00".to_string(),
                close_time: "22:00".to_string(),
                image: None,
                fields: vec![],
            },
            Venue {
                id: 2,
                name: "Arena Sakti".to_string(),
                address: "Jl. Kenanga 9".to_string(),
                description: String::new(),
                open_time: "08:00".to_string(),
                close_time: "22:00".to_string(),
                image: None,
                fields: vec![],
            },
        ];

        assert_eq!(filter_venues(&venues, "gor").len(), 1);
        // 地址也参与匹配
        assert_eq!(filter_venues(&venues, "kenanga").len(), 1);
        assert_eq!(filter_venues(&venues, "").len(), 2);
    }

    #[test]
    fn test_filter_fields_by_kind_and_keyword() {
        let fields = vec![
            Field {
                id: 1,
                venue_id: 1,
                name: "Lapangan A".to_string(),
                kind: FieldKind::Futsal,
                price_per_hour: 100_000,
                is_active: true,
            },
            Field {
                id: 2,
                venue_id: 1,
                name: "Lapangan B".to_string(),
                kind: FieldKind::Badminton,
                price_per_hour: 50_000,
                is_active: true,
            },
        ];

        assert_eq!(filter_fields(&fields, Some(FieldKind::Futsal), "").len(), 1);
        assert_eq!(filter_fields(&fields, None, "lapangan").len(), 2);
        assert_eq!(
            filter_fields(&fields, Some(FieldKind::Badminton), "B")
                .first()
                .map(|f| f.id),
            Some(2)
        );
    }
}
