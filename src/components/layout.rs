//! 页面骨架与导航栏
//!
//! 导航按角色变化：普通用户看到订场入口和待支付角标，
//! 管理员看到后台管理入口，业主看到营收报表。
//! 角标在用户态做周期轮询，`Interval` 随导航栏卸载自动停止。

use leptos::prelude::*;

use crate::auth::{logout, use_auth};
use crate::booking::pending::use_pending;
use crate::components::icons::*;
use crate::config::PENDING_POLL_MILLIS;
use crate::models::Role;
use crate::web::Interval;
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

/// 页面级通知：(消息, 是否出错)
pub type Notice = Option<(String, bool)>;

/// 右上角的通知条，3 秒后自动消失
#[component]
pub fn Toast(notice: ReadSignal<Notice>, set_notice: WriteSignal<Notice>) -> impl IntoView {
    Effect::new(move |_| {
        if notice.get().is_some() {
            set_timeout(
                move || set_notice.set(None),
                std::time::Duration::from_secs(3),
            );
        }
    });

    let text = move || notice.get().map(|(msg, _)| msg).unwrap_or_default();
    let class = move || match notice.get() {
        Some((_, true)) => "alert alert-error shadow-lg",
        _ => "alert alert-success shadow-lg",
    };

    view! {
        <Show when=move || notice.get().is_some()>
            <div class="toast toast-top toast-end z-50">
                <div class=class>
                    <span>{text}</span>
                </div>
            </div>
        </Show>
    }
}

/// 导航链接
#[component]
fn NavLink(route: AppRoute, #[prop(into)] label: String) -> impl IntoView {
    let navigate = use_navigate();
    view! {
        <a class="btn btn-ghost btn-sm" on:click=move |_| navigate(route.clone())>
            {label}
        </a>
    }
}

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let pending = use_pending();
    let user = auth.user_signal();
    let pending_count = pending.count();

    // 普通用户：进场先刷一次角标，之后周期轮询；
    // 切换角色或登出时旧定时器随句柄一起 drop
    let poll = StoredValue::new_local(None::<Interval>);
    Effect::new(move |_| {
        let is_user = matches!(user.get().map(|u| u.role), Some(Role::User));
        poll.update_value(|h| *h = None);
        if is_user {
            pending.refresh(auth.api());
            let interval = Interval::new(PENDING_POLL_MILLIS, move || {
                pending.refresh(auth.api());
            });
            poll.update_value(|h| *h = Some(interval));
        } else {
            pending.reset();
        }
    });
    on_cleanup(move || poll.update_value(|h| *h = None));

    let nav_home = use_navigate();
    let nav_profile = use_navigate();
    let nav_logout = use_navigate();

    let on_logout = move |_| {
        logout(&auth);
        nav_logout(AppRoute::Home);
    };

    // 按角色渲染中部链接
    let links = move || match user.get().map(|u| u.role) {
        Some(Role::User) => view! {
            <NavLink route=AppRoute::Home label="场馆" />
            <a class="btn btn-ghost btn-sm gap-1" on:click={
                let navigate = use_navigate();
                move |_| navigate(AppRoute::MyBookings)
            }>
                "我的订单"
                <Show when=move || { pending_count.get() > 0 }>
                    <span class="badge badge-warning badge-sm">{move || pending_count.get()}</span>
                </Show>
            </a>
        }
        .into_any(),
        Some(Role::Admin) => view! {
            <NavLink route=AppRoute::AdminBookings label="订单管理" />
            <NavLink route=AppRoute::AdminVenues label="场馆管理" />
            <NavLink route=AppRoute::AdminFields label="场地管理" />
            <NavLink route=AppRoute::AdminSchedules label="时段管理" />
        }
        .into_any(),
        Some(Role::Owner) => view! {
            <NavLink route=AppRoute::OwnerReports label="营收报表" />
        }
        .into_any(),
        None => view! {
            <NavLink route=AppRoute::Home label="场馆" />
        }
        .into_any(),
    };

    // 右侧：已登录显示用户菜单，未登录显示登录/注册
    let account = move || match user.get() {
        Some(u) => {
            let name = u.name.clone();
            let role_label = u.role.label();
            view! {
                <div class="dropdown dropdown-end">
                    <div tabindex="0" role="button" class="btn btn-ghost gap-2">
                        <UserRound attr:class="h-5 w-5" />
                        <span class="hidden md:inline">{name}</span>
                        <span class="badge badge-outline badge-sm hidden md:inline-flex">
                            {role_label}
                        </span>
                    </div>
                    <ul tabindex="0" class="dropdown-content z-[1] menu p-2 shadow bg-base-100 rounded-box w-52">
                        <li>
                            <a on:click={
                                let navigate = nav_profile.clone();
                                move |_| navigate(AppRoute::Profile)
                            }>
                                "个人资料"
                            </a>
                        </li>
                        <li>
                            <a on:click=on_logout.clone() class="text-error">
                                <LogOut attr:class="h-4 w-4" />
                                "退出登录"
                            </a>
                        </li>
                    </ul>
                </div>
            }
            .into_any()
        }
        None => view! {
            <NavLink route=AppRoute::Login label="登录" />
            <a class="btn btn-primary btn-sm" on:click={
                let navigate = use_navigate();
                move |_| navigate(AppRoute::Register)
            }>
                "注册"
            </a>
        }
        .into_any(),
    };

    view! {
        <div class="navbar bg-base-100 shadow-md px-4">
            <div class="flex-1 gap-1">
                <a class="btn btn-ghost text-xl gap-2" on:click=move |_| nav_home(AppRoute::Home)>
                    <CalendarDays attr:class="h-6 w-6 text-primary" />
                    "CourtSide 订场"
                </a>
                {links}
            </div>
            <div class="flex-none gap-2">{account}</div>
        </div>
    }
}

/// 带导航栏的页面骨架
#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-base-200">
            <Navbar />
            <main class="max-w-7xl mx-auto p-4 md:p-8">{children()}</main>
        </div>
    }
}
