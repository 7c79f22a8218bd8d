use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// =========================================================
// 用户与角色
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Owner,
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "管理员",
            Role::Owner => "场馆主",
            Role::User => "用户",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// 登录/注册成功后后端返回的凭证载荷
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
}

// =========================================================
// 场馆与场地
// =========================================================

/// 场地类型
/// 后端字段名是 `type`，这里统一叫 kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Futsal,
    Basket,
    Badminton,
}

impl FieldKind {
    pub const ALL: [FieldKind; 3] = [FieldKind::Futsal, FieldKind::Basket, FieldKind::Badminton];

    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Futsal => "五人制足球",
            FieldKind::Basket => "篮球",
            FieldKind::Badminton => "羽毛球",
        }
    }

    /// 后端枚举值原文，用于下拉框的 value
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Futsal => "futsal",
            FieldKind::Basket => "basket",
            FieldKind::Badminton => "badminton",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "futsal" => Some(FieldKind::Futsal),
            "basket" => Some(FieldKind::Basket),
            "badminton" => Some(FieldKind::Badminton),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Field {
    pub id: u64,
    pub venue_id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub price_per_hour: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Venue {
    pub id: u64,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
    /// "HH:mm"
    pub open_time: String,
    pub close_time: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// 管理端创建/更新场馆的请求体
#[derive(Debug, Serialize, Clone, Default)]
pub struct VenuePayload {
    pub name: String,
    pub address: String,
    pub description: String,
    pub open_time: String,
    pub close_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// 管理端创建/更新场地的请求体
#[derive(Debug, Serialize, Clone)]
pub struct FieldPayload {
    pub venue_id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub price_per_hour: i64,
    pub is_active: bool,
}

// =========================================================
// 时段 (Schedule / Slot)
// =========================================================

/// 时段状态由后端给出，客户端不得自行推断
/// 未来新增状态时按 Unknown 容错处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Booked,
    #[serde(other)]
    Unknown,
}

impl SlotStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, SlotStatus::Available)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlotStatus::Available => "可预订",
            SlotStatus::Booked => "已预订",
            SlotStatus::Unknown => "未知",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            SlotStatus::Available => "badge badge-success",
            SlotStatus::Booked => "badge badge-warning",
            SlotStatus::Unknown => "badge badge-ghost",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Slot {
    pub id: u64,
    pub field_id: u64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// "HH:mm"
    pub start_time: String,
    pub end_time: String,
    pub status: SlotStatus,
    pub price: i64,
}

impl Slot {
    /// 解析 "HH:mm" 里的小时部分，格式异常返回 None
    pub fn start_hour(&self) -> Option<u32> {
        parse_hour(&self.start_time)
    }
}

/// 管理端创建/更新时段的请求体
#[derive(Debug, Serialize, Clone)]
pub struct SchedulePayload {
    pub field_id: u64,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub price: i64,
}

// =========================================================
// 订单 (Booking)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    /// 部分接口用 "success" 表示已支付，两种拼写都接受
    #[serde(alias = "success")]
    Paid,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// 筛选下拉框里可选的状态
    pub const FILTERABLE: [PaymentStatus; 5] = [
        PaymentStatus::Unpaid,
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Cancelled,
        PaymentStatus::Expired,
    ];

    /// 未完结（待支付/待确认），用于角标计数
    pub fn is_outstanding(&self) -> bool {
        matches!(self, PaymentStatus::Unpaid | PaymentStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Unknown => "unknown",
        }
    }

    /// 下拉框选中值转回枚举，认不出来的值当没选
    pub fn from_str(value: &str) -> Option<Self> {
        Self::FILTERABLE.into_iter().find(|s| s.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "待支付",
            PaymentStatus::Pending => "待确认",
            PaymentStatus::Paid => "已支付",
            PaymentStatus::Cancelled => "已取消",
            PaymentStatus::Expired => "已过期",
            PaymentStatus::Unknown => "未知",
        }
    }

    /// 状态角标的 daisyUI 配色
    pub fn badge_class(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "badge badge-warning",
            PaymentStatus::Pending => "badge badge-info",
            PaymentStatus::Paid => "badge badge-success",
            PaymentStatus::Cancelled => "badge badge-ghost",
            PaymentStatus::Expired => "badge badge-error",
            PaymentStatus::Unknown => "badge badge-ghost",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BookingItem {
    pub id: u64,
    pub schedule_id: u64,
    pub price: i64,
    #[serde(default)]
    pub schedule: Option<Slot>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Booking {
    pub id: u64,
    pub booking_code: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub items: Vec<BookingItem>,
    pub total_amount: i64,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_proof: Option<String>,
    #[serde(default)]
    pub expired_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Booking {
    /// 下单日期，用于管理端按日筛选
    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created_at
            .as_deref()
            .and_then(parse_datetime)
            .map(|dt| dt.date())
    }
}

/// 结算请求：一个场地 + 勾选的时段
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreateBookingRequest {
    pub field_id: u64,
    pub slots: Vec<SlotRef>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SlotRef {
    pub id: u64,
    pub start_time: String,
    pub end_time: String,
}

// =========================================================
// 业主报表
// =========================================================

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ReportSummary {
    #[serde(default)]
    pub total_revenue: i64,
    #[serde(default)]
    pub total_bookings: u32,
    #[serde(default)]
    pub paid_bookings: u32,
    #[serde(default)]
    pub pending_bookings: u32,
}

// =========================================================
// 工具函数
// =========================================================

fn default_true() -> bool {
    true
}

/// 解析 "HH:mm" 的小时部分
pub fn parse_hour(time: &str) -> Option<u32> {
    let hour: u32 = time.split(':').next()?.parse().ok()?;
    if hour < 24 { Some(hour) } else { None }
}

/// 把营业时间展开成逐小时的 (start, end) 区间
///
/// 管理端按天批量生成排期时用。格式异常或区间颠倒返回空。
pub fn hour_range(open: &str, close: &str) -> Vec<(String, String)> {
    let (Some(start), Some(end)) = (parse_hour(open), parse_hour(close)) else {
        return Vec::new();
    };
    (start..end)
        .map(|h| (format!("{:02}:00", h), format!("{:02}:00", h + 1)))
        .collect()
}

/// 后端时间戳两种常见格式都接受：
/// ISO8601 ("2026-01-05T09:00:00.000000Z") 或 "2026-01-05 09:00:00"
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()
}

/// 金额格式化为印尼盾："Rp 1.250.000"
pub fn format_rupiah(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if negative {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// 时间戳展示为 "YYYY-MM-DD HH:mm"，解析失败原样返回
pub fn format_datetime(raw: &str) -> String {
    match parse_datetime(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah_grouping() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(950), "Rp 950");
        assert_eq!(format_rupiah(1000), "Rp 1.000");
        assert_eq!(format_rupiah(200_000), "Rp 200.000");
        assert_eq!(format_rupiah(1_250_000), "Rp 1.250.000");
        assert_eq!(format_rupiah(-75_000), "-Rp 75.000");
    }

    #[test]
    fn test_parse_hour() {
        assert_eq!(parse_hour("09:00"), Some(9));
        assert_eq!(parse_hour("21:30"), Some(21));
        assert_eq!(parse_hour("7:00"), Some(7));
        assert_eq!(parse_hour("25:00"), None);
        assert_eq!(parse_hour("morning"), None);
    }

    #[test]
    fn test_hour_range_expands_open_hours() {
        let rows = hour_range("08:00", "11:00");
        assert_eq!(
            rows,
            vec![
                ("08:00".to_string(), "09:00".to_string()),
                ("09:00".to_string(), "10:00".to_string()),
                ("10:00".to_string(), "11:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_hour_range_rejects_bad_input() {
        assert!(hour_range("abc", "11:00").is_empty());
        assert!(hour_range("08:00", "26:00").is_empty());
        // 关门早于开门按空处理
        assert!(hour_range("22:00", "08:00").is_empty());
    }

    #[test]
    fn test_payment_status_accepts_success_alias() {
        let paid: PaymentStatus = serde_json::from_str(r#""paid""#).unwrap();
        let success: PaymentStatus = serde_json::from_str(r#""success""#).unwrap();
        assert_eq!(paid, PaymentStatus::Paid);
        assert_eq!(success, PaymentStatus::Paid);
        // 序列化固定输出 "paid"
        assert_eq!(serde_json::to_string(&PaymentStatus::Paid).unwrap(), r#""paid""#);
    }

    #[test]
    fn test_unknown_statuses_are_tolerated() {
        let slot: SlotStatus = serde_json::from_str(r#""maintenance""#).unwrap();
        assert_eq!(slot, SlotStatus::Unknown);
        let pay: PaymentStatus = serde_json::from_str(r#""refunded""#).unwrap();
        assert_eq!(pay, PaymentStatus::Unknown);
    }

    #[test]
    fn test_field_kind_wire_name_is_type() {
        let raw = r#"{"id":1,"venue_id":2,"name":"Lapangan A","type":"futsal","price_per_hour":100000,"is_active":true}"#;
        let field: Field = serde_json::from_str(raw).unwrap();
        assert_eq!(field.kind, FieldKind::Futsal);

        let out = serde_json::to_string(&field).unwrap();
        assert!(out.contains(r#""type":"futsal""#));
    }

    #[test]
    fn test_parse_datetime_both_formats() {
        let iso = parse_datetime("2026-01-05T09:30:00.000000Z").unwrap();
        let plain = parse_datetime("2026-01-05 09:30:00").unwrap();
        assert_eq!(iso, plain);
        assert_eq!(parse_datetime("gibberish"), None);
    }

    #[test]
    fn test_booking_created_date() {
        let booking = Booking {
            id: 1,
            booking_code: "BK-001".to_string(),
            user: None,
            items: vec![],
            total_amount: 100_000,
            payment_status: PaymentStatus::Unpaid,
            payment_proof: None,
            expired_at: None,
            created_at: Some("2026-01-05 09:30:00".to_string()),
        };
        assert_eq!(
            booking.created_date(),
            NaiveDate::from_ymd_opt(2026, 1, 5)
        );
    }
}
