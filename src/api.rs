//! 后端 API 客户端
//!
//! 所有出站请求的唯一入口：统一挂 Bearer Token、统一解 `{message, data}`
//! 信封、统一错误映射。任何带 token 的请求收到 401 都会触发注入的
//! 全局登出回调，页面层不需要各自处理会话失效。

use std::rc::Rc;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AuthPayload, Booking, CreateBookingRequest, Field, FieldPayload, LoginRequest,
    RegisterRequest, ReportSummary, SchedulePayload, Slot, UpdateProfileRequest, User, Venue,
    VenuePayload,
};
use crate::web::{HttpClient, HttpMethod, HttpRequest, UploadFile};

/// 支付凭证在 multipart 表单里的字段名，由后端契约固定
pub const PAYMENT_PROOF_FIELD: &str = "payment_proof";

/// 成功响应的信封 `{"message": "...", "data": ...}`，只关心 data
#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Clone)]
pub struct ApiClient<C> {
    http: C,
    base_url: String,
    token: Option<String>,
    /// 带 token 的请求收到 401 时的全局回调（清空会话）
    on_unauthorized: Option<Rc<dyn Fn()>>,
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(http: C, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            on_unauthorized: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_unauthorized_hook(mut self, hook: Rc<dyn Fn()>) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, path: &str, method: HttpMethod) -> HttpRequest {
        let mut req =
            HttpRequest::new(&self.url(path), method).with_header("Accept", "application/json");
        if let Some(token) = &self.token {
            req = req.with_header("Authorization", &format!("Bearer {}", token));
        }
        req
    }

    /// 发送请求并检查状态
    ///
    /// 401 只有在请求带着 token 时才算会话失效；
    /// 匿名请求（如密码错误的登录）的 401 留给调用方本地展示。
    async fn dispatch(&self, req: HttpRequest, op: &str) -> ApiResult<String> {
        let authed = self.token.is_some();
        let resp = self.http.send(req).await.map_err(|e| e.in_op(op))?;

        if !resp.ok() {
            let err = ApiError::from_response(resp.status, &resp.body).in_op(op);
            if err.is_auth() && authed {
                if let Some(hook) = &self.on_unauthorized {
                    hook();
                }
            }
            return Err(err);
        }
        Ok(resp.body)
    }

    /// 发送并解出信封里的 data
    async fn send<T: DeserializeOwned>(&self, req: HttpRequest, op: &str) -> ApiResult<T> {
        let body = self.dispatch(req, op).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::unknown(format!("响应解析失败: {}", e)).in_op(op))?;
        Ok(envelope.data)
    }

    /// 发送但不关心响应体（确认/驳回/删除这类动作）
    async fn send_unit(&self, req: HttpRequest, op: &str) -> ApiResult<()> {
        self.dispatch(req, op).await?;
        Ok(())
    }

    // =========================================================
    // 认证
    // =========================================================

    /// 登录，成功返回 token + 用户
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthPayload> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let req = self
            .request("/login", HttpMethod::Post)
            .with_json(to_body(&payload)?);
        self.send(req, "api.login").await
    }

    /// 注册，不建立会话，调用方之后引导去登录
    pub async fn register(&self, payload: &RegisterRequest) -> ApiResult<User> {
        let req = self
            .request("/register", HttpMethod::Post)
            .with_json(to_body(payload)?);
        self.send(req, "api.register").await
    }

    /// 当前登录用户
    pub async fn me(&self) -> ApiResult<User> {
        let req = self.request("/me", HttpMethod::Get);
        self.send(req, "api.me").await
    }

    /// 更新个人资料，返回合并后的用户
    pub async fn update_profile(&self, payload: &UpdateProfileRequest) -> ApiResult<User> {
        let req = self
            .request("/me", HttpMethod::Put)
            .with_json(to_body(payload)?);
        self.send(req, "api.update_profile").await
    }

    // =========================================================
    // 公开浏览
    // =========================================================

    /// 场馆列表
    pub async fn venues(&self) -> ApiResult<Vec<Venue>> {
        let req = self.request("/explore/venues", HttpMethod::Get);
        self.send(req, "api.venues").await
    }

    /// 场馆详情（含场地）
    pub async fn venue(&self, id: u64) -> ApiResult<Venue> {
        let req = self.request(&format!("/explore/venues/{}", id), HttpMethod::Get);
        self.send(req, "api.venue").await
    }

    /// 某场地某天的全部时段
    pub async fn field_schedules(&self, field_id: u64, date: NaiveDate) -> ApiResult<Vec<Slot>> {
        let path = format!(
            "/explore/fields/{}/schedules?date={}",
            field_id,
            date.format("%Y-%m-%d")
        );
        let req = self.request(&path, HttpMethod::Get);
        self.send(req, "api.field_schedules").await
    }

    // =========================================================
    // 用户订单
    // =========================================================

    /// 结算：提交勾选的时段，成功返回新订单
    pub async fn create_booking(&self, payload: &CreateBookingRequest) -> ApiResult<Booking> {
        let req = self
            .request("/user/bookings", HttpMethod::Post)
            .with_json(to_body(payload)?);
        self.send(req, "api.create_booking").await
    }

    /// 我的订单列表
    pub async fn my_bookings(&self) -> ApiResult<Vec<Booking>> {
        let req = self.request("/user/bookings/my", HttpMethod::Get);
        self.send(req, "api.my_bookings").await
    }

    /// 上传支付凭证（multipart）
    pub async fn upload_payment_proof(&self, code: &str, file: UploadFile) -> ApiResult<()> {
        let path = format!("/user/bookings/{}/payment-proof", code);
        let req = self
            .request(&path, HttpMethod::Post)
            .with_file(PAYMENT_PROOF_FIELD, file);
        self.send_unit(req, "api.upload_payment_proof").await
    }

    // =========================================================
    // 管理端
    // =========================================================

    /// 全部订单（管理员视角）
    pub async fn admin_bookings(&self) -> ApiResult<Vec<Booking>> {
        let req = self.request("/admin/bookings", HttpMethod::Get);
        self.send(req, "api.admin_bookings").await
    }

    /// 确认收款
    pub async fn confirm_booking(&self, code: &str) -> ApiResult<()> {
        let path = format!("/admin/bookings/{}/confirm", code);
        let req = self.request(&path, HttpMethod::Post);
        self.send_unit(req, "api.confirm_booking").await
    }

    /// 驳回支付
    pub async fn reject_booking(&self, code: &str) -> ApiResult<()> {
        let path = format!("/admin/bookings/{}/reject", code);
        let req = self.request(&path, HttpMethod::Post);
        self.send_unit(req, "api.reject_booking").await
    }

    pub async fn admin_venues(&self) -> ApiResult<Vec<Venue>> {
        let req = self.request("/admin/venues", HttpMethod::Get);
        self.send(req, "api.admin_venues").await
    }

    pub async fn create_venue(&self, payload: &VenuePayload) -> ApiResult<Venue> {
        let req = self
            .request("/admin/venues", HttpMethod::Post)
            .with_json(to_body(payload)?);
        self.send(req, "api.create_venue").await
    }

    pub async fn update_venue(&self, id: u64, payload: &VenuePayload) -> ApiResult<Venue> {
        let req = self
            .request(&format!("/admin/venues/{}", id), HttpMethod::Put)
            .with_json(to_body(payload)?);
        self.send(req, "api.update_venue").await
    }

    pub async fn delete_venue(&self, id: u64) -> ApiResult<()> {
        let req = self.request(&format!("/admin/venues/{}", id), HttpMethod::Delete);
        self.send_unit(req, "api.delete_venue").await
    }

    pub async fn admin_fields(&self) -> ApiResult<Vec<Field>> {
        let req = self.request("/admin/fields", HttpMethod::Get);
        self.send(req, "api.admin_fields").await
    }

    pub async fn create_field(&self, payload: &FieldPayload) -> ApiResult<Field> {
        let req = self
            .request("/admin/fields", HttpMethod::Post)
            .with_json(to_body(payload)?);
        self.send(req, "api.create_field").await
    }

    pub async fn update_field(&self, id: u64, payload: &FieldPayload) -> ApiResult<Field> {
        let req = self
            .request(&format!("/admin/fields/{}", id), HttpMethod::Put)
            .with_json(to_body(payload)?);
        self.send(req, "api.update_field").await
    }

    pub async fn delete_field(&self, id: u64) -> ApiResult<()> {
        let req = self.request(&format!("/admin/fields/{}", id), HttpMethod::Delete);
        self.send_unit(req, "api.delete_field").await
    }

    /// 时段列表，可按日期过滤
    pub async fn admin_schedules(&self, date: Option<NaiveDate>) -> ApiResult<Vec<Slot>> {
        let path = match date {
            Some(d) => format!("/admin/schedules?date={}", d.format("%Y-%m-%d")),
            None => "/admin/schedules".to_string(),
        };
        let req = self.request(&path, HttpMethod::Get);
        self.send(req, "api.admin_schedules").await
    }

    pub async fn create_schedule(&self, payload: &SchedulePayload) -> ApiResult<Slot> {
        let req = self
            .request("/admin/schedules", HttpMethod::Post)
            .with_json(to_body(payload)?);
        self.send(req, "api.create_schedule").await
    }

    pub async fn update_schedule(&self, id: u64, payload: &SchedulePayload) -> ApiResult<Slot> {
        let req = self
            .request(&format!("/admin/schedules/{}", id), HttpMethod::Put)
            .with_json(to_body(payload)?);
        self.send(req, "api.update_schedule").await
    }

    pub async fn delete_schedule(&self, id: u64) -> ApiResult<()> {
        let req = self.request(&format!("/admin/schedules/{}", id), HttpMethod::Delete);
        self.send_unit(req, "api.delete_schedule").await
    }

    // =========================================================
    // 业主端
    // =========================================================

    /// 营收汇总（后端口径，权威数据）
    pub async fn owner_report(&self) -> ApiResult<ReportSummary> {
        let req = self.request("/owner/reports", HttpMethod::Get);
        self.send(req, "api.owner_report").await
    }

    /// 交易流水
    pub async fn owner_transactions(&self) -> ApiResult<Vec<Booking>> {
        let req = self.request("/owner/transactions", HttpMethod::Get);
        self.send(req, "api.owner_transactions").await
    }
}

fn to_body<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ApiError::unknown(format!("请求序列化失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::models::{PaymentStatus, SlotRef};
    use crate::web::http::tests::MockHttpClient;
    use serde_json::json;
    use std::cell::Cell;

    fn client(mock: Rc<MockHttpClient>) -> ApiClient<Rc<MockHttpClient>> {
        ApiClient::new(mock, "http://api.test")
    }

    #[tokio::test]
    async fn test_envelope_is_unwrapped() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            "http://api.test/explore/venues",
            200,
            json!({"message": "ok", "data": [
                {"id": 1, "name": "GOR Candra", "address": "Jl. Melati 1",
                 "open_time": "08:00", "close_time": "22:00"}
            ]}),
        );

        let venues = client(mock).venues().await.unwrap();
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].name, "GOR Candra");
        // 未给出的字段取默认
        assert!(venues[0].fields.is_empty());
    }

    #[tokio::test]
    async fn test_bearer_token_is_attached() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response("http://api.test/me", 200, json!({"data":
            {"id": 1, "name": "Budi", "email": "budi@mail.com", "role": "user"}}));

        let api = client(mock.clone()).with_token(Some("tok-123".to_string()));
        let user = api.me().await.unwrap();
        assert_eq!(user.name, "Budi");

        let requests = mock.requests.borrow();
        assert_eq!(
            requests[0].2.get("Authorization").map(String::as_str),
            Some("Bearer tok-123")
        );
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_auth_header() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response("http://api.test/explore/venues", 200, json!({"data": []}));

        client(mock.clone()).venues().await.unwrap();

        let requests = mock.requests.borrow();
        assert!(!requests[0].2.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn test_401_with_token_fires_global_hook() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response("http://api.test/me", 401, json!({"message": "Unauthenticated."}));

        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let api = client(mock)
            .with_token(Some("expired".to_string()))
            .with_unauthorized_hook(Rc::new(move || flag.set(true)));

        let err = api.me().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Auth);
        assert!(fired.get());
    }

    #[tokio::test]
    async fn test_401_without_token_stays_local() {
        // 密码错误的登录不应触发全局登出
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            "http://api.test/login",
            401,
            json!({"message": "Invalid credentials"}),
        );

        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let api = client(mock).with_unauthorized_hook(Rc::new(move || flag.set(true)));

        let err = api.login("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Auth);
        assert_eq!(err.message, "Invalid credentials");
        assert!(!fired.get());
    }

    #[tokio::test]
    async fn test_422_surfaces_field_errors() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            "http://api.test/register",
            422,
            json!({"message": "The given data was invalid.",
                   "errors": {"email": ["Email sudah terdaftar."]}}),
        );

        let payload = RegisterRequest {
            name: "Budi".to_string(),
            email: "budi@mail.com".to_string(),
            password: "rahasia1".to_string(),
            password_confirmation: "rahasia1".to_string(),
        };
        let err = client(mock).register(&payload).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.field_message("email"), Some("Email sudah terdaftar."));
    }

    #[tokio::test]
    async fn test_create_booking_posts_selected_slots() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            "http://api.test/user/bookings",
            201,
            json!({"message": "created", "data": {
                "id": 5, "booking_code": "BK-20260201-005",
                "total_amount": 200000, "payment_status": "unpaid"
            }}),
        );

        let api = client(mock.clone()).with_token(Some("tok".to_string()));
        let payload = CreateBookingRequest {
            field_id: 3,
            slots: vec![
                SlotRef {
                    id: 10,
                    start_time: "09:00".to_string(),
                    end_time: "10:00".to_string(),
                },
                SlotRef {
                    id: 11,
                    start_time: "10:00".to_string(),
                    end_time: "11:00".to_string(),
                },
            ],
        };
        let booking = api.create_booking(&payload).await.unwrap();
        assert_eq!(booking.booking_code, "BK-20260201-005");
        assert_eq!(booking.total_amount, 200_000);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);

        let requests = mock.requests.borrow();
        assert_eq!(requests[0].0, "http://api.test/user/bookings");
        assert_eq!(requests[0].1, "POST");
        let body: serde_json::Value =
            serde_json::from_str(requests[0].3.as_deref().unwrap()).unwrap();
        assert_eq!(body["field_id"], 3);
        assert_eq!(body["slots"][1]["id"], 11);
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_to_booking_url() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            "http://api.test/user/bookings/BK-7/payment-proof",
            200,
            json!({"message": "uploaded"}),
        );

        let api = client(mock.clone()).with_token(Some("tok".to_string()));
        let file = UploadFile::Bytes {
            name: "bukti.jpg".to_string(),
            mime: "image/jpeg".to_string(),
            bytes: vec![0u8; 128],
        };
        api.upload_payment_proof("BK-7", file).await.unwrap();

        let requests = mock.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].0,
            "http://api.test/user/bookings/BK-7/payment-proof"
        );
        assert_eq!(requests[0].1, "POST");
        assert_eq!(
            requests[0].3.as_deref(),
            Some("multipart:payment_proof:bukti.jpg")
        );
    }

    #[tokio::test]
    async fn test_schedule_query_includes_date() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_response(
            "http://api.test/explore/fields/3/schedules?date=2026-02-01",
            200,
            json!({"data": [
                {"id": 10, "field_id": 3, "date": "2026-02-01", "start_time": "09:00",
                 "end_time": "10:00", "status": "available", "price": 100000}
            ]}),
        );

        let date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let slots = client(mock).field_schedules(3, date).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert!(slots[0].status.is_available());
    }

    #[tokio::test]
    async fn test_network_failure_maps_to_network_kind() {
        let mock = Rc::new(MockHttpClient::new());
        mock.mock_network_failure("http://api.test/explore/venues");

        let err = client(mock).venues().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
    }
}
