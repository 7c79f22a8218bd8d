use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::{ChartColumn, RefreshCw};
use crate::components::layout::AppShell;
use crate::models::{Booking, ReportSummary, format_datetime, format_rupiah};

/// 业主报表页：后端口径的营收汇总 + 交易流水
#[component]
pub fn OwnerReportsPage() -> impl IntoView {
    let auth = use_auth();

    let (report, set_report) = signal(Option::<ReportSummary>::None);
    let (transactions, set_transactions) = signal(Vec::<Booking>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);

    let load = move || {
        let api = auth.api();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match api.owner_report().await {
                Ok(summary) => set_report.set(Some(summary)),
                Err(e) => {
                    set_error.set(Some(format!("加载报表失败: {}", e.message)));
                    set_loading.set(false);
                    return;
                }
            }
            match api.owner_transactions().await {
                Ok(data) => set_transactions.set(data),
                Err(e) => set_error.set(Some(format!("加载流水失败: {}", e.message))),
            }
            set_loading.set(false);
        });
    };

    Effect::new(move |_| load());

    view! {
        <AppShell>
            <div class="space-y-6">
                <div class="flex items-center justify-between">
                    <h2 class="text-2xl font-bold flex items-center gap-2">
                        <ChartColumn attr:class="h-6 w-6" />
                        "营收报表"
                    </h2>
                    <button class="btn btn-ghost btn-sm gap-1" on:click=move |_| load()>
                        <RefreshCw attr:class="h-4 w-4" />
                        "刷新"
                    </button>
                </div>

                <Show when=move || error.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || error.get().unwrap_or_default()}</span>
                        <button class="btn btn-sm btn-ghost" on:click=move |_| load()>
                            "重试"
                        </button>
                    </div>
                </Show>

                <Show when=move || loading.get()>
                    <div class="flex justify-center py-16">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                </Show>

                {move || {
                    report.get().map(|r| view! {
                        <div class="stats stats-vertical md:stats-horizontal shadow w-full">
                            <div class="stat">
                                <div class="stat-figure text-primary">
                                    <ChartColumn attr:class="h-8 w-8" />
                                </div>
                                <div class="stat-title">"总营收"</div>
                                <div class="stat-value text-primary text-2xl">
                                    {format_rupiah(r.total_revenue)}
                                </div>
                                <div class="stat-desc">"只计入已确认支付的订单"</div>
                            </div>
                            <div class="stat">
                                <div class="stat-title">"订单总数"</div>
                                <div class="stat-value text-2xl">{r.total_bookings}</div>
                            </div>
                            <div class="stat">
                                <div class="stat-title">"已支付"</div>
                                <div class="stat-value text-success text-2xl">{r.paid_bookings}</div>
                            </div>
                            <div class="stat">
                                <div class="stat-title">"待处理"</div>
                                <div class="stat-value text-warning text-2xl">
                                    {r.pending_bookings}
                                </div>
                            </div>
                        </div>
                    })
                }}

                <h3 class="text-xl font-bold">"交易流水"</h3>

                <Show when=move || {
                    !loading.get() && error.get().is_none() && transactions.with(|t| t.is_empty())
                }>
                    <div class="text-center py-10 text-base-content/50">"暂无交易记录"</div>
                </Show>

                <Show when=move || transactions.with(|t| !t.is_empty())>
                    <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                        <table class="table table-zebra">
                            <thead>
                                <tr>
                                    <th>"订单号"</th>
                                    <th>"用户"</th>
                                    <th>"下单时间"</th>
                                    <th>"金额"</th>
                                    <th>"状态"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || transactions.get()
                                    key=|b| b.id
                                    children=move |b: Booking| {
                                        let user_name = b
                                            .user
                                            .as_ref()
                                            .map(|u| u.name.clone())
                                            .unwrap_or_else(|| "-".to_string());
                                        let created = b
                                            .created_at
                                            .as_deref()
                                            .map(format_datetime)
                                            .unwrap_or_else(|| "-".to_string());
                                        let status = b.payment_status;
                                        view! {
                                            <tr>
                                                <td class="font-mono">{b.booking_code.clone()}</td>
                                                <td>{user_name}</td>
                                                <td>{created}</td>
                                                <td>{format_rupiah(b.total_amount)}</td>
                                                <td>
                                                    <span class=status.badge_class()>{status.label()}</span>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </Show>
            </div>
        </AppShell>
    }
}
