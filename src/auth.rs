//! 会话模块
//!
//! 管理"当前登录的是谁"这一个事实，与路由系统解耦：
//! 路由守卫只看 `session_signals()` 暴露的三个信号。
//!
//! 分两层：
//! - `SessionLogic`: 登录/注册/拉取用户/登出 + 持久化，泛型于存储和 HTTP
//!   适配器，原生测试直接跑；
//! - `AuthContext`: 信号层（浏览器绑定），把逻辑层的结果落到响应式状态上，
//!   并用代次号丢弃过期的异步结果。

use std::rc::Rc;

use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::ApiResult;
use crate::models::{AuthPayload, RegisterRequest, UpdateProfileRequest, User};
use crate::web::router::SessionSignals;
use crate::web::{BrowserHttpClient, HttpClient, KeyValueStore, LocalStorage};

/// Session 持久化使用的唯一 storage key
const SESSION_STORE_KEY: &str = "courtside_session";

// =========================================================
// 逻辑层 (SessionLogic)
// =========================================================

/// 持久化的会话载荷，只存 {token, user}，不存任何派生状态
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
    user: User,
}

pub struct SessionLogic<S, C> {
    storage: S,
    http: C,
    base_url: String,
}

impl<S, C> SessionLogic<S, C>
where
    S: KeyValueStore,
    C: HttpClient + Clone,
{
    pub fn new(storage: S, http: C, base_url: &str) -> Self {
        Self {
            storage,
            http,
            base_url: base_url.to_string(),
        }
    }

    fn api(&self, token: Option<&str>) -> ApiClient<C> {
        ApiClient::new(self.http.clone(), &self.base_url).with_token(token.map(String::from))
    }

    /// 启动时从持久化存储恢复会话
    ///
    /// 存的东西解析不出来就当没有，并顺手清掉脏数据。
    pub fn rehydrate(&self) -> (Option<String>, Option<User>) {
        let Some(raw) = self.storage.get(SESSION_STORE_KEY) else {
            return (None, None);
        };
        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(session) => (Some(session.token), Some(session.user)),
            Err(_) => {
                self.storage.remove(SESSION_STORE_KEY);
                (None, None)
            }
        }
    }

    fn persist(&self, token: &str, user: &User) {
        let session = PersistedSession {
            token: token.to_string(),
            user: user.clone(),
        };
        if let Ok(raw) = serde_json::to_string(&session) {
            self.storage.set(SESSION_STORE_KEY, &raw);
        }
    }

    /// 登录：凭证换 token，成功后持久化 {token, user}
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthPayload> {
        let payload = self.api(None).login(email, password).await?;
        self.persist(&payload.token, &payload.user);
        Ok(payload)
    }

    /// 注册：不建立会话，不写存储
    pub async fn register(&self, payload: &RegisterRequest) -> ApiResult<User> {
        self.api(None).register(payload).await
    }

    /// 校验 token 并刷新用户信息
    ///
    /// 凭证失效（401）时清掉持久化会话再向上抛，
    /// 网络一类的失败不动存储，留给调用方决定。
    pub async fn fetch_me(&self, token: &str) -> ApiResult<User> {
        match self.api(Some(token)).me().await {
            Ok(user) => {
                self.persist(token, &user);
                Ok(user)
            }
            Err(e) => {
                if e.is_auth() {
                    self.storage.remove(SESSION_STORE_KEY);
                }
                Err(e)
            }
        }
    }

    /// 更新资料，成功后把合并结果持久化
    pub async fn update_profile(
        &self,
        token: &str,
        payload: &UpdateProfileRequest,
    ) -> ApiResult<User> {
        let user = self.api(Some(token)).update_profile(payload).await?;
        self.persist(token, &user);
        Ok(user)
    }

    /// 无条件清空持久化会话，不发任何网络请求
    pub fn logout(&self) {
        self.storage.remove(SESSION_STORE_KEY);
    }
}

// =========================================================
// 信号层 (AuthContext)
// =========================================================

/// 会话状态
#[derive(Clone, Default)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<User>,
    /// 持久化恢复是否完成（恰好置位一次）
    pub initialized: bool,
}

/// 会话上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    state: ReadSignal<SessionState>,
    set_state: WriteSignal<SessionState>,
    /// 异步操作的代次号：写状态前比对，丢弃被后来者盖过的响应
    epoch: StoredValue<u64>,
    api_base: StoredValue<String>,
}

impl AuthContext {
    pub fn new(api_base: &str) -> Self {
        let (state, set_state) = signal(SessionState::default());
        Self {
            state,
            set_state,
            epoch: StoredValue::new(0),
            api_base: StoredValue::new(api_base.to_string()),
        }
    }

    fn bump_epoch(&self) -> u64 {
        self.epoch
            .try_update_value(|e| {
                *e += 1;
                *e
            })
            .expect("epoch should not be disposed")
    }

    fn epoch_is_current(&self, epoch: u64) -> bool {
        self.epoch.get_value() == epoch
    }

    pub fn state(&self) -> ReadSignal<SessionState> {
        self.state
    }

    /// 当前用户（响应式）
    pub fn user_signal(&self) -> Signal<Option<User>> {
        let state = self.state;
        Signal::derive(move || state.get().user)
    }

    /// 路由守卫需要的三个信号
    pub fn session_signals(&self) -> SessionSignals {
        let state = self.state;
        SessionSignals {
            initialized: Signal::derive(move || state.get().initialized),
            has_token: Signal::derive(move || state.get().token.is_some()),
            role: Signal::derive(move || state.get().user.map(|u| u.role)),
        }
    }

    /// 按当前 token 构造 API 客户端，并挂上全局登出回调
    pub fn api(&self) -> ApiClient<BrowserHttpClient> {
        let ctx = *self;
        self.api_base.with_value(|base| {
            ApiClient::new(BrowserHttpClient, base)
                .with_token(self.state.get_untracked().token)
                .with_unauthorized_hook(Rc::new(move || ctx.force_logout()))
        })
    }

    fn logic(&self) -> SessionLogic<LocalStorage, BrowserHttpClient> {
        self.api_base
            .with_value(|base| SessionLogic::new(LocalStorage, BrowserHttpClient, base))
    }

    fn apply(&self, token: Option<String>, user: Option<User>) {
        self.set_state.update(|s| {
            s.token = token;
            s.user = user;
        });
    }

    /// 任意请求 401 时的全局出口：清内存、清存储
    ///
    /// 不做导航，路由守卫监听到 token 消失会自己重定向。
    pub fn force_logout(&self) {
        warn!("[Session] Credentials rejected, clearing session");
        self.bump_epoch();
        self.logic().logout();
        self.apply(None, None);
    }
}

/// 从 Context 获取会话上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

// =========================================================
// 会话操作（浏览器绑定层）
// =========================================================

/// 初始化会话状态
///
/// 同步恢复持久化会话并置位 initialized；有 token 就在后台校验一次，
/// 校验结果回来时如果会话已经被后续操作改过（代次号不匹配）则丢弃。
pub fn init_session(ctx: &AuthContext) {
    let logic = ctx.logic();
    let (token, user) = logic.rehydrate();

    ctx.set_state.update(|s| {
        s.token = token.clone();
        s.user = user;
        s.initialized = true;
    });

    if let Some(token) = token {
        let ctx = *ctx;
        let epoch = ctx.epoch.get_value();
        spawn_local(async move {
            match ctx.logic().fetch_me(&token).await {
                Ok(user) => {
                    if ctx.epoch_is_current(epoch) {
                        ctx.apply(Some(token), Some(user));
                    } else {
                        warn!("[Session] Stale fetch_me result discarded");
                    }
                }
                Err(e) if e.is_auth() => {
                    // 存储已由逻辑层清掉，这里同步内存状态
                    if ctx.epoch_is_current(epoch) {
                        ctx.force_logout();
                    }
                }
                Err(e) => {
                    // 网络之类的暂时性失败：保留恢复出来的会话
                    warn!("[Session] fetch_me failed: {}", e);
                }
            }
        });
    }
}

/// 登录并建立会话
///
/// 成功返回用户，调用方据此按角色分流；失败原样抛出（401 凭证错误 /
/// 422 字段校验），由登录页本地展示。
pub async fn login(ctx: &AuthContext, email: &str, password: &str) -> ApiResult<User> {
    let epoch = ctx.bump_epoch();
    let payload: AuthPayload = ctx.logic().login(email, password).await?;

    if ctx.epoch_is_current(epoch) {
        ctx.apply(Some(payload.token), Some(payload.user.clone()));
    }
    Ok(payload.user)
}

/// 注册新账号，成功后由调用方引导去登录页
pub async fn register(ctx: &AuthContext, payload: &RegisterRequest) -> ApiResult<User> {
    ctx.logic().register(payload).await
}

/// 更新个人资料并合并进会话
pub async fn update_profile(ctx: &AuthContext, payload: &UpdateProfileRequest) -> ApiResult<User> {
    let Some(token) = ctx.state.get_untracked().token else {
        return Err(crate::error::ApiError::auth("尚未登录"));
    };

    let epoch = ctx.epoch.get_value();
    let user = ctx.logic().update_profile(&token, payload).await?;

    if ctx.epoch_is_current(epoch) {
        ctx.apply(Some(token), Some(user.clone()));
    }
    Ok(user)
}

/// 注销并清除状态
///
/// 不需要手动导航，路由守卫会监听会话变化并自动重定向。
pub fn logout(ctx: &AuthContext) {
    ctx.bump_epoch();
    ctx.logic().logout();
    ctx.apply(None, None);
}

#[cfg(test)]
mod tests;
