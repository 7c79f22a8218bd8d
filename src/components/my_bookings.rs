use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::booking::pending::use_pending;
use crate::components::icons::{CalendarDays, RefreshCw, Upload};
use crate::components::layout::AppShell;
use crate::models::{Booking, PaymentStatus, format_datetime, format_rupiah};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

/// 我的订单：状态跟踪 + 待支付订单的付款入口
#[component]
pub fn MyBookingsPage() -> impl IntoView {
    let auth = use_auth();
    let pending = use_pending();

    let (bookings, set_bookings) = signal(Vec::<Booking>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);

    let load = move || {
        let api = auth.api();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match api.my_bookings().await {
                Ok(data) => {
                    // 正好是角标要的数据，顺手同步
                    pending.apply_snapshot(&data);
                    set_bookings.set(data);
                }
                Err(e) => set_error.set(Some(format!("加载订单失败: {}", e.message))),
            }
            set_loading.set(false);
        });
    };

    Effect::new(move |_| load());

    view! {
        <AppShell>
            <div class="space-y-6">
                <div class="flex items-center justify-between">
                    <h2 class="text-2xl font-bold">"我的订单"</h2>
                    <button class="btn btn-ghost btn-sm gap-1" on:click=move |_| load()>
                        <RefreshCw attr:class="h-4 w-4" />
                        "刷新"
                    </button>
                </div>

                <Show when=move || error.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || error.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <Show when=move || loading.get()>
                    <div class="flex justify-center py-16">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                </Show>

                <Show when=move || {
                    !loading.get() && error.get().is_none() && bookings.with(|b| b.is_empty())
                }>
                    <div class="text-center py-16 space-y-4">
                        <p class="text-base-content/50">"还没有订单"</p>
                        {
                            let navigate = use_navigate();
                            view! {
                                <button
                                    class="btn btn-primary btn-sm"
                                    on:click=move |_| navigate(AppRoute::Home)
                                >
                                    "去逛逛场馆"
                                </button>
                            }
                        }
                    </div>
                </Show>

                <div class="space-y-4">
                    <For
                        each=move || bookings.get()
                        key=|b| b.id
                        children=move |b: Booking| {
                            let navigate = use_navigate();
                            let code = b.booking_code.clone();
                            let pay_code = b.booking_code.clone();
                            let status = b.payment_status;
                            let created = b.created_at.as_deref().map(format_datetime);
                            let expires = b.expired_at.as_deref().map(format_datetime);
                            let date_label = b
                                .items
                                .first()
                                .and_then(|i| i.schedule.as_ref())
                                .and_then(|s| s.date)
                                .map(|d| d.format("%Y-%m-%d").to_string());
                            let slot_chips = b
                                .items
                                .iter()
                                .filter_map(|i| i.schedule.as_ref())
                                .map(|s| format!("{} - {}", s.start_time, s.end_time))
                                .collect::<Vec<_>>();
                            view! {
                                <div class="card bg-base-100 shadow">
                                    <div class="card-body gap-3">
                                        <div class="flex flex-wrap items-center justify-between gap-2">
                                            <span class="font-mono font-semibold">{code}</span>
                                            <span class=status.badge_class()>{status.label()}</span>
                                        </div>
                                        <div class="flex flex-wrap items-center gap-2 text-sm text-base-content/70">
                                            <CalendarDays attr:class="h-4 w-4 shrink-0" />
                                            {date_label.unwrap_or_else(|| "-".to_string())}
                                            {slot_chips
                                                .into_iter()
                                                .map(|t| view! {
                                                    <span class="badge badge-ghost">{t}</span>
                                                })
                                                .collect_view()}
                                        </div>
                                        <div class="flex flex-wrap items-center justify-between gap-2">
                                            <div class="text-sm text-base-content/60">
                                                {created.map(|c| format!("下单于 {}", c))}
                                                {expires
                                                    .filter(|_| status == PaymentStatus::Unpaid)
                                                    .map(|e| view! {
                                                        <span class="text-warning ml-2">
                                                            {format!("支付截止 {}", e)}
                                                        </span>
                                                    })}
                                            </div>
                                            <div class="flex items-center gap-3">
                                                <span class="text-lg font-bold text-primary">
                                                    {format_rupiah(b.total_amount)}
                                                </span>
                                                <Show when=move || status == PaymentStatus::Unpaid>
                                                    {
                                                        let navigate = navigate.clone();
                                                        let pay_code = pay_code.clone();
                                                        view! {
                                                            <button
                                                                class="btn btn-primary btn-sm gap-1"
                                                                on:click=move |_| {
                                                                    navigate(AppRoute::PaymentUpload(pay_code.clone()))
                                                                }
                                                            >
                                                                <Upload attr:class="h-4 w-4" />
                                                                "去支付"
                                                            </button>
                                                        }
                                                    }
                                                </Show>
                                            </div>
                                        </div>
                                    </div>
                                </div>
                            }
                        }
                    />
                </div>
            </div>
        </AppShell>
    }
}
