//! CourtSide 订场前端
//!
//! 纯浏览器端渲染（CSR）的单页应用：游客逛场馆、选时段下单，
//! 用户传支付凭证，管理员核对凭证与维护场馆/场地/排期，
//! 业主看营收报表。所有数据都来自后端 API，本端不落库。

use leptos::prelude::*;

mod api;
mod auth;
mod config;
mod error;
mod filters;
mod models;

mod booking {
    pub mod pending;
    pub mod proof;
    pub mod selection;
}

mod components {
    pub mod admin {
        pub mod bookings;
        pub mod fields;
        pub mod schedules;
        pub mod venues;
    }
    pub mod field_schedule;
    mod icons;
    pub mod layout;
    pub mod login;
    pub mod my_bookings;
    pub mod owner {
        pub mod reports;
    }
    pub mod payment_upload;
    pub mod profile;
    pub mod register;
    pub mod venue_detail;
    pub mod venues;
}

pub(crate) mod web {
    pub mod date;
    pub mod http;
    pub mod route;
    pub mod router;
    pub mod storage;
    mod timer;

    pub use http::{BrowserHttpClient, HttpClient, HttpMethod, HttpRequest, UploadFile};
    pub use storage::{KeyValueStore, LocalStorage};
    pub use timer::Interval;
}

use crate::auth::{AuthContext, init_session};
use crate::booking::pending::PendingContext;
use crate::components::admin::bookings::AdminBookingsPage;
use crate::components::admin::fields::AdminFieldsPage;
use crate::components::admin::schedules::AdminSchedulesPage;
use crate::components::admin::venues::AdminVenuesPage;
use crate::components::field_schedule::FieldSchedulePage;
use crate::components::login::LoginPage;
use crate::components::my_bookings::MyBookingsPage;
use crate::components::owner::reports::OwnerReportsPage;
use crate::components::payment_upload::PaymentUploadPage;
use crate::components::profile::ProfilePage;
use crate::components::register::RegisterPage;
use crate::components::venue_detail::VenueDetailPage;
use crate::components::venues::VenuesPage;
use crate::config::AppConfig;
use crate::web::route::AppRoute;
use crate::web::router::{Router, RouterOutlet};

// =========================================================
// 路由表
// =========================================================

/// 路由到页面的映射，守卫判定在路由层完成，这里只管渲染
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <VenuesPage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::VenueDetail(id) => view! { <VenueDetailPage id=id /> }.into_any(),
        AppRoute::FieldSchedule(id) => view! { <FieldSchedulePage field_id=id /> }.into_any(),
        AppRoute::MyBookings => view! { <MyBookingsPage /> }.into_any(),
        AppRoute::PaymentUpload(code) => view! { <PaymentUploadPage code=code /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::AdminBookings => view! { <AdminBookingsPage /> }.into_any(),
        AppRoute::AdminVenues => view! { <AdminVenuesPage /> }.into_any(),
        AppRoute::AdminFields => view! { <AdminFieldsPage /> }.into_any(),
        AppRoute::AdminSchedules => view! { <AdminSchedulesPage /> }.into_any(),
        AppRoute::OwnerReports => view! { <OwnerReportsPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-primary">"404"</h1>
                    <p class="py-4 text-base-content/60">"页面不存在"</p>
                    <a href="/" class="btn btn-primary btn-sm">"回到首页"</a>
                </div>
            </div>
        }
        .into_any(),
    }
}

// =========================================================
// 应用入口
// =========================================================

/// 根组件：装配配置、会话、角标与路由
#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::load();

    let auth = AuthContext::new(&config.api_base);
    provide_context(auth);
    provide_context(PendingContext::new());

    // 从 localStorage 恢复会话并后台校验 token
    init_session(&auth);

    view! {
        <Router session=auth.session_signals()>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
