use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

// =========================================================
// 错误种类枚举
// =========================================================

/// 客户端视角的 API 错误分类
/// 按后端响应的语义（HTTP 状态码）划分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 401: 未登录 / 凭证失效（触发全局登出）
    Auth,
    /// 422: 表单字段校验失败
    Validation,
    /// 404: 资源不存在（如订单号无效）
    NotFound,
    /// 409: 资源冲突（如时段在提交前被抢订）
    Conflict,
    /// 请求未到达服务器（断网、超时、fetch 抛错）
    Network,
    /// 5xx: 服务器内部错误
    Server,
    /// 其余情况
    Unknown,
}

impl ApiErrorKind {
    /// 按 HTTP 状态码归类
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiErrorKind::Auth,
            404 => ApiErrorKind::NotFound,
            409 => ApiErrorKind::Conflict,
            422 => ApiErrorKind::Validation,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Unknown,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Auth => "UNAUTHENTICATED",
            ApiErrorKind::Validation => "VALIDATION_FAILED",
            ApiErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ApiErrorKind::Conflict => "RESOURCE_CONFLICT",
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Server => "SERVER_ERROR",
            ApiErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }
}

// =========================================================
// 字段级校验错误
// =========================================================

/// 单个表单字段的校验失败信息
/// 后端 422 响应里每个字段可能带多条消息，只保留第一条展示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 所有出站请求统一返回的错误
///
/// - kind: 错误分类（决定全局/局部处理策略）
/// - message: 展示给用户的消息，后端给出的原样透传
/// - field_errors: 422 时的字段级错误，供表单逐字段标红
/// - op: 出错的操作名，仅用于控制台日志定位
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    field_errors: Vec<FieldError>,
    op: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: Vec::new(),
            op: None,
        }
    }

    // --- Convenience constructors ---

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Auth, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Conflict, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unknown, message)
    }

    /// 从响应状态码和原始 body 构建错误
    ///
    /// body 按 Laravel 风格信封解析：
    /// `{"message": "...", "errors": {"email": ["msg1", ...]}}`
    /// 解析不出来时退回通用消息，不让解析失败掩盖原始错误
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = ApiErrorKind::from_status(status);
        let parsed: Option<ErrorEnvelope> = serde_json::from_str(body).ok();

        let message = parsed
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| default_message(kind));

        let mut err = Self::new(kind, message);
        if let Some(envelope) = parsed {
            if let Some(errors) = envelope.errors {
                // 每个字段取第一条消息
                for (field, messages) in errors {
                    if let Some(first) = messages.into_iter().next() {
                        err.field_errors.push(FieldError::new(field, first));
                    }
                }
            }
        }
        err
    }

    // --- Context builders ---

    /// 标记出错的操作，如 "api.create_booking"
    pub fn in_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    /// 是否应触发全局登出
    pub fn is_auth(&self) -> bool {
        self.kind == ApiErrorKind::Auth
    }

    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    /// 查某个表单字段的校验消息
    pub fn field_message(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;
        if let Some(op) = &self.op {
            write!(f, " | at: {}", op)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 后端错误信封
// =========================================================

/// 后端错误响应的 body 结构
/// errors 用 BTreeMap 保证字段顺序稳定
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    errors: Option<BTreeMap<String, Vec<String>>>,
}

/// body 不可解析时的兜底消息
fn default_message(kind: ApiErrorKind) -> String {
    match kind {
        ApiErrorKind::Auth => "登录已失效，请重新登录".to_string(),
        ApiErrorKind::Validation => "提交的数据未通过校验".to_string(),
        ApiErrorKind::NotFound => "请求的资源不存在".to_string(),
        ApiErrorKind::Conflict => "资源状态已变化，请刷新后重试".to_string(),
        ApiErrorKind::Network => "网络连接失败，请检查网络".to_string(),
        ApiErrorKind::Server => "服务器开小差了，请稍后重试".to_string(),
        ApiErrorKind::Unknown => "发生未知错误，请重试".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert_eq!(ApiErrorKind::from_status(401), ApiErrorKind::Auth);
        assert_eq!(ApiErrorKind::from_status(404), ApiErrorKind::NotFound);
        assert_eq!(ApiErrorKind::from_status(409), ApiErrorKind::Conflict);
        assert_eq!(ApiErrorKind::from_status(422), ApiErrorKind::Validation);
        assert_eq!(ApiErrorKind::from_status(500), ApiErrorKind::Server);
        assert_eq!(ApiErrorKind::from_status(503), ApiErrorKind::Server);
        assert_eq!(ApiErrorKind::from_status(418), ApiErrorKind::Unknown);
    }

    #[test]
    fn test_from_response_parses_laravel_envelope() {
        let body = r#"{"message":"The given data was invalid.","errors":{"email":["The email field is required.","The email must be valid."],"password":["The password field is required."]}}"#;
        let err = ApiError::from_response(422, body);

        assert_eq!(err.kind, ApiErrorKind::Validation);
        assert_eq!(err.message, "The given data was invalid.");
        assert_eq!(err.field_errors().len(), 2);
        // 每个字段只留第一条
        assert_eq!(
            err.field_message("email"),
            Some("The email field is required.")
        );
        assert_eq!(
            err.field_message("password"),
            Some("The password field is required.")
        );
        assert_eq!(err.field_message("name"), None);
    }

    #[test]
    fn test_from_response_passes_server_message_verbatim() {
        let body = r#"{"message":"Slot 09:00 is no longer available"}"#;
        let err = ApiError::from_response(409, body);

        assert_eq!(err.kind, ApiErrorKind::Conflict);
        assert_eq!(err.message, "Slot 09:00 is no longer available");
        assert!(err.field_errors().is_empty());
    }

    #[test]
    fn test_from_response_unparseable_body_falls_back() {
        let err = ApiError::from_response(500, "<html>Internal Server Error</html>");
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_display_includes_code_and_op() {
        let err = ApiError::not_found("无此订单").in_op("api.fetch_booking");
        let shown = err.to_string();
        assert!(shown.contains("RESOURCE_NOT_FOUND"));
        assert!(shown.contains("api.fetch_booking"));
    }
}
