//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、各自的角色门槛，以及守卫判定。

use std::fmt::Display;

use crate::models::Role;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 场馆列表 (首页，默认路由)
    #[default]
    Home,
    /// 登录页面
    Login,
    /// 注册页面
    Register,
    /// 场馆详情
    VenueDetail(u64),
    /// 场地时段选择与结算 (核心流程)
    FieldSchedule(u64),
    /// 我的订单列表
    MyBookings,
    /// 上传支付凭证，参数是订单号
    PaymentUpload(String),
    /// 个人资料
    Profile,
    /// 管理端：订单审核
    AdminBookings,
    /// 管理端：场馆管理
    AdminVenues,
    /// 管理端：场地管理
    AdminFields,
    /// 管理端：时段管理
    AdminSchedules,
    /// 业主端：营收报表
    OwnerReports,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举（query 部分由调用方先去掉）
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["venues", id] => id
                .parse()
                .map(Self::VenueDetail)
                .unwrap_or(Self::NotFound),
            ["fields", id, "schedule"] => id
                .parse()
                .map(Self::FieldSchedule)
                .unwrap_or(Self::NotFound),
            ["bookings"] => Self::MyBookings,
            ["bookings", code, "pay"] => Self::PaymentUpload((*code).to_string()),
            ["profile"] => Self::Profile,
            ["admin", "bookings"] => Self::AdminBookings,
            ["admin", "venues"] => Self::AdminVenues,
            ["admin", "fields"] => Self::AdminFields,
            ["admin", "schedules"] => Self::AdminSchedules,
            ["owner", "reports"] => Self::OwnerReports,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::VenueDetail(id) => format!("/venues/{}", id),
            Self::FieldSchedule(id) => format!("/fields/{}/schedule", id),
            Self::MyBookings => "/bookings".to_string(),
            Self::PaymentUpload(code) => format!("/bookings/{}/pay", code),
            Self::Profile => "/profile".to_string(),
            Self::AdminBookings => "/admin/bookings".to_string(),
            Self::AdminVenues => "/admin/venues".to_string(),
            Self::AdminFields => "/admin/fields".to_string(),
            Self::AdminSchedules => "/admin/schedules".to_string(),
            Self::OwnerReports => "/owner/reports".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫逻辑：该路由允许的角色集合**
    ///
    /// `None` 表示公开路由，无需登录。
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Self::MyBookings | Self::PaymentUpload(_) | Self::Profile => {
                Some(&[Role::Admin, Role::Owner, Role::User])
            }
            Self::AdminBookings | Self::AdminVenues | Self::AdminFields | Self::AdminSchedules => {
                Some(&[Role::Admin])
            }
            Self::OwnerReports => Some(&[Role::Owner]),
            _ => None,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.allowed_roles().is_some()
    }

    /// 已认证用户是否应该离开此路由（登录/注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 登录成功后各角色的默认落点
    pub fn default_for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminBookings,
            Role::Owner => Self::OwnerReports,
            Role::User => Self::Home,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 守卫判定
// =========================================================

/// 守卫判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// 正常渲染
    Render,
    /// Session 还没恢复完，什么都不渲染
    Suspend,
    /// 有 token 没 user，渲染校验占位等待后台拉取用户信息返回
    Verify,
    /// 未登录，去登录页（记住来路）
    RedirectLogin,
    /// 角色不符，回安全默认页（首页）
    RedirectHome,
}

/// 路由守卫状态机
///
/// 输入是 Session 的三个事实：是否完成恢复、token 是否存在、用户角色。
/// 这四个输入中任何一个变化都必须重新判定，不是一次性检查。
pub fn evaluate_guard(
    route: &AppRoute,
    initialized: bool,
    has_token: bool,
    role: Option<Role>,
) -> GuardOutcome {
    // 公开路由不设门槛
    let Some(allowed) = route.allowed_roles() else {
        return GuardOutcome::Render;
    };

    if !initialized {
        return GuardOutcome::Suspend;
    }
    if !has_token {
        return GuardOutcome::RedirectLogin;
    }
    match role {
        None => GuardOutcome::Verify,
        Some(r) if allowed.contains(&r) => GuardOutcome::Render,
        Some(_) => GuardOutcome::RedirectHome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_static_routes() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/register"), AppRoute::Register);
        assert_eq!(AppRoute::from_path("/bookings"), AppRoute::MyBookings);
        assert_eq!(AppRoute::from_path("/admin/venues"), AppRoute::AdminVenues);
        assert_eq!(AppRoute::from_path("/owner/reports"), AppRoute::OwnerReports);
        assert_eq!(AppRoute::from_path("/whatever"), AppRoute::NotFound);
    }

    #[test]
    fn test_from_path_with_params() {
        assert_eq!(AppRoute::from_path("/venues/12"), AppRoute::VenueDetail(12));
        assert_eq!(
            AppRoute::from_path("/fields/3/schedule"),
            AppRoute::FieldSchedule(3)
        );
        assert_eq!(
            AppRoute::from_path("/bookings/BK-2026-001/pay"),
            AppRoute::PaymentUpload("BK-2026-001".to_string())
        );
        // 非数字 id 不匹配
        assert_eq!(AppRoute::from_path("/venues/abc"), AppRoute::NotFound);
    }

    #[test]
    fn test_path_roundtrip() {
        let routes = [
            AppRoute::Home,
            AppRoute::Login,
            AppRoute::VenueDetail(7),
            AppRoute::FieldSchedule(42),
            AppRoute::PaymentUpload("BK-1".to_string()),
            AppRoute::AdminSchedules,
            AppRoute::OwnerReports,
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn test_guard_public_route_always_renders() {
        let out = evaluate_guard(&AppRoute::Home, false, false, None);
        assert_eq!(out, GuardOutcome::Render);
    }

    #[test]
    fn test_guard_suspends_until_initialized() {
        let out = evaluate_guard(&AppRoute::MyBookings, false, false, None);
        assert_eq!(out, GuardOutcome::Suspend);
    }

    #[test]
    fn test_guard_redirects_without_token() {
        let out = evaluate_guard(&AppRoute::MyBookings, true, false, None);
        assert_eq!(out, GuardOutcome::RedirectLogin);
    }

    #[test]
    fn test_guard_verifies_with_token_but_no_user() {
        let out = evaluate_guard(&AppRoute::MyBookings, true, true, None);
        assert_eq!(out, GuardOutcome::Verify);
    }

    #[test]
    fn test_guard_role_membership() {
        // 普通用户进管理端 → 回首页
        let out = evaluate_guard(&AppRoute::AdminBookings, true, true, Some(Role::User));
        assert_eq!(out, GuardOutcome::RedirectHome);
        // 管理员正常进入
        let out = evaluate_guard(&AppRoute::AdminBookings, true, true, Some(Role::Admin));
        assert_eq!(out, GuardOutcome::Render);
        // 业主看报表
        let out = evaluate_guard(&AppRoute::OwnerReports, true, true, Some(Role::Owner));
        assert_eq!(out, GuardOutcome::Render);
        // 管理员不具备业主角色
        let out = evaluate_guard(&AppRoute::OwnerReports, true, true, Some(Role::Admin));
        assert_eq!(out, GuardOutcome::RedirectHome);
    }

    #[test]
    fn test_default_landing_by_role() {
        assert_eq!(
            AppRoute::default_for_role(Role::Admin),
            AppRoute::AdminBookings
        );
        assert_eq!(
            AppRoute::default_for_role(Role::Owner),
            AppRoute::OwnerReports
        );
        assert_eq!(AppRoute::default_for_role(Role::User), AppRoute::Home);
    }
}
