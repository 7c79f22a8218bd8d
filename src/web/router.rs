//! 路由服务模块 - 核心引擎
//!
//! 封装 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 守卫判定本身是纯函数（见 `route::evaluate_guard`），这里负责把判定结果
//! 落到信号与重定向副作用上，并在 Session 状态变化时重新判定。

use leptos::logging::log;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, GuardOutcome, evaluate_guard};
use crate::models::Role;

/// 获取当前浏览器路径（pathname 不含 query）
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（自动重定向用，不产生新的历史记录）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 守卫需要的 Session 事实，由外部注入实现解耦
///
/// 路由器不认识 Session 的具体类型，只看这三个信号。
#[derive(Clone, Copy)]
pub struct SessionSignals {
    /// 持久化恢复是否完成
    pub initialized: Signal<bool>,
    /// token 是否存在
    pub has_token: Signal<bool>,
    /// 当前用户角色（None = 有 token 但 user 还没拉回来，或未登录）
    pub role: Signal<Option<Role>>,
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    session: SessionSignals,
    /// 被守卫拦下的来路，登录成功后回去
    pending_redirect: RwSignal<Option<AppRoute>>,
}

impl RouterService {
    fn new(session: SessionSignals) -> Self {
        // 初始路由从当前 URL 解析
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            session,
            pending_redirect: RwSignal::new(None),
        }
    }

    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    pub fn session(&self) -> SessionSignals {
        self.session
    }

    /// **核心方法：主动导航**
    ///
    /// 组件内的跳转都走这里；守卫兜底在 Effect 里，这里只做
    /// 导航瞬间已知的两类拦截，避免无意义的中间渲染。
    pub fn navigate(&self, target: AppRoute) {
        let initialized = self.session.initialized.get_untracked();
        let has_token = self.session.has_token.get_untracked();
        let role = self.session.role.get_untracked();

        // 已登录还去登录/注册页 → 直接去角色默认页
        if target.should_redirect_when_authenticated() && initialized && has_token {
            if let Some(role) = role {
                let redirect = AppRoute::default_for_role(role);
                log!("[Router] Already authenticated, redirecting to {}", redirect);
                push_history_state(&redirect.to_path());
                self.set_route.set(redirect);
                return;
            }
        }

        // 明确未登录就要进受保护页 → 记住来路，去登录
        if target.requires_auth() && initialized && !has_token {
            log!("[Router] Access denied, remembering {} and redirecting to login", target);
            self.redirect_to_login(target);
            return;
        }

        push_history_state(&target.to_path());
        self.set_route.set(target);
    }

    /// 页面内需要登录才能继续的操作（比如游客点结算）走这里：
    /// 记住来路，登录成功后守卫会送回去。
    pub fn redirect_to_login(&self, return_to: AppRoute) {
        self.pending_redirect.set(Some(return_to));
        let redirect = AppRoute::auth_failure_redirect();
        push_history_state(&redirect.to_path());
        self.set_route.set(redirect);
    }

    /// 浏览器后退/前进
    ///
    /// 只同步路由信号，越权访问交给守卫 Effect 纠正，
    /// 出口组件在纠正前按守卫判定渲染空白，不会闪出受保护内容。
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;

        let closure = Closure::<dyn Fn()>::new(move || {
            set_route.set(AppRoute::from_path(&current_path()));
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 守卫 Effect：路由或 Session 任一变化都重新判定
    fn setup_guard_effects(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let session = self.session;
        let pending_redirect = self.pending_redirect;

        Effect::new(move |_| {
            let route = current_route.get();
            let initialized = session.initialized.get();
            let has_token = session.has_token.get();
            let role = session.role.get();

            // 登录/注册页上检测到已登录（刚登录成功或本来就登着）
            // → 回到被拦下的来路，否则去角色默认页
            if route.should_redirect_when_authenticated() {
                if initialized && has_token {
                    if let Some(role) = role {
                        let target = pending_redirect
                            .get_untracked()
                            .unwrap_or_else(|| AppRoute::default_for_role(role));
                        pending_redirect.set(None);
                        log!("[Router] Logged in, redirecting to {}", target);
                        replace_history_state(&target.to_path());
                        set_route.set(target);
                    }
                }
                return;
            }

            match evaluate_guard(&route, initialized, has_token, role) {
                GuardOutcome::RedirectLogin => {
                    log!("[Router] Session gone on {}, redirecting to login", route);
                    pending_redirect.set(Some(route));
                    let redirect = AppRoute::auth_failure_redirect();
                    replace_history_state(&redirect.to_path());
                    set_route.set(redirect);
                }
                GuardOutcome::RedirectHome => {
                    log!("[Router] Role not allowed on {}, redirecting home", route);
                    replace_history_state(&AppRoute::Home.to_path());
                    set_route.set(AppRoute::Home);
                }
                // Render / Suspend / Verify 由出口组件处理
                _ => {}
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: SessionSignals) -> RouterService {
    let router = RouterService::new(session);

    router.init_popstate_listener();
    router.setup_guard_effects();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(AppRoute) + Clone {
    let router = use_router();
    move |to: AppRoute| {
        router.navigate(to);
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 守卫需要的 Session 信号
    session: SessionSignals,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(session);

    children()
}

/// 路由出口组件
///
/// 按守卫判定渲染当前路由：
/// - Render: 正常渲染匹配的页面
/// - Suspend / 即将被重定向: 渲染空白
/// - Verify: 渲染校验占位（token 在手、用户信息在路上）
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();
    let session = router.session();

    move || {
        let current = router.current_route().get();
        let outcome = evaluate_guard(
            &current,
            session.initialized.get(),
            session.has_token.get(),
            session.role.get(),
        );

        match outcome {
            GuardOutcome::Render => matcher(current),
            GuardOutcome::Verify => view! {
                <div class="flex items-center justify-center min-h-screen bg-base-200">
                    <div class="text-center">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                        <p class="mt-4 text-base-content/60">"正在验证登录状态..."</p>
                    </div>
                </div>
            }
            .into_any(),
            GuardOutcome::Suspend
            | GuardOutcome::RedirectLogin
            | GuardOutcome::RedirectHome => ().into_any(),
        }
    }
}
