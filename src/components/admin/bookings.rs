use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::{CircleCheck, CircleX, ImageFrame, RefreshCw, Search};
use crate::components::layout::{AppShell, Toast};
use crate::filters::{BookingFilter, revenue_of_paid};
use crate::models::{Booking, PaymentStatus, format_datetime, format_rupiah};
use crate::web::date::parse_input_date;

/// 管理端订单页：搜索/状态/日期过滤，核对凭证后确认或拒绝支付
#[component]
pub fn AdminBookingsPage() -> impl IntoView {
    let auth = use_auth();

    let (bookings, set_bookings) = signal(Vec::<Booking>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);
    let (acting, set_acting) = signal(false);

    let (search, set_search) = signal(String::new());
    let (status_filter, set_status) = signal(Option::<PaymentStatus>::None);
    let (date_from, set_date_from) = signal(Option::<chrono::NaiveDate>::None);
    let (date_to, set_date_to) = signal(Option::<chrono::NaiveDate>::None);

    let load = move || {
        let api = auth.api();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match api.admin_bookings().await {
                Ok(data) => set_bookings.set(data),
                Err(e) => set_error.set(Some(format!("加载订单失败: {}", e.message))),
            }
            set_loading.set(false);
        });
    };

    Effect::new(move |_| load());

    let current_filter = move || BookingFilter {
        search: search.get(),
        status: status_filter.get(),
        date_from: date_from.get(),
        date_to: date_to.get(),
    };

    let filtered = move || {
        let f = current_filter();
        bookings.with(|list| {
            f.apply(list)
                .into_iter()
                .cloned()
                .collect::<Vec<Booking>>()
        })
    };

    let revenue = move || {
        let f = current_filter();
        bookings.with(|list| revenue_of_paid(&f.apply(list)))
    };

    let reset_filter = move |_| {
        set_search.set(String::new());
        set_status.set(None);
        set_date_from.set(None);
        set_date_to.set(None);
    };

    // 拒绝要二次确认，误点的代价是订单被取消
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let (reject_target, set_reject_target) = signal(Option::<String>::None);

    Effect::new(move |_| {
        let Some(dialog) = dialog_ref.get() else {
            return;
        };
        if reject_target.get().is_some() {
            let _ = dialog.show_modal();
        } else {
            dialog.close();
        }
    });

    let do_reject = move |_| {
        let Some(code) = reject_target.get_untracked() else {
            return;
        };
        set_reject_target.set(None);
        set_acting.set(true);
        let api = auth.api();
        spawn_local(async move {
            match api.reject_booking(&code).await {
                Ok(()) => {
                    set_notice.set(Some((format!("已拒绝订单 {}", code), false)));
                    load();
                }
                Err(e) => set_notice.set(Some((format!("拒绝失败: {}", e.message), true))),
            }
            set_acting.set(false);
        });
    };

    view! {
        <AppShell>
            <Toast notice=notice set_notice=set_notice />
            <div class="space-y-6">
                <div class="flex items-center justify-between">
                    <h2 class="text-2xl font-bold">"订单管理"</h2>
                    <button class="btn btn-ghost btn-sm gap-1" on:click=move |_| load()>
                        <RefreshCw attr:class="h-4 w-4" />
                        "刷新"
                    </button>
                </div>

                <div class="card bg-base-100 shadow">
                    <div class="card-body py-4">
                        <div class="flex flex-wrap items-end gap-3">
                            <label class="input input-bordered input-sm flex items-center gap-2 w-64">
                                <Search attr:class="h-4 w-4 opacity-50" />
                                <input
                                    type="text"
                                    class="grow"
                                    placeholder="订单号或用户名"
                                    on:input=move |ev| set_search.set(event_target_value(&ev))
                                    prop:value=search
                                />
                            </label>
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| {
                                    set_status.set(PaymentStatus::from_str(&event_target_value(&ev)))
                                }
                            >
                                <option value="" selected=move || status_filter.get().is_none()>
                                    "全部状态"
                                </option>
                                {PaymentStatus::FILTERABLE
                                    .iter()
                                    .map(|s| {
                                        let s = *s;
                                        view! {
                                            <option
                                                value=s.as_str()
                                                selected=move || status_filter.get() == Some(s)
                                            >
                                                {s.label()}
                                            </option>
                                        }
                                    })
                                    .collect_view()}
                            </select>
                            <input
                                type="date"
                                class="input input-bordered input-sm"
                                on:change=move |ev| {
                                    set_date_from.set(parse_input_date(&event_target_value(&ev)))
                                }
                                prop:value=move || {
                                    date_from
                                        .get()
                                        .map(|d| d.format("%Y-%m-%d").to_string())
                                        .unwrap_or_default()
                                }
                            />
                            <span class="text-base-content/50">"至"</span>
                            <input
                                type="date"
                                class="input input-bordered input-sm"
                                on:change=move |ev| {
                                    set_date_to.set(parse_input_date(&event_target_value(&ev)))
                                }
                                prop:value=move || {
                                    date_to
                                        .get()
                                        .map(|d| d.format("%Y-%m-%d").to_string())
                                        .unwrap_or_default()
                                }
                            />
                            <button class="btn btn-ghost btn-sm" on:click=reset_filter>
                                "清空筛选"
                            </button>
                        </div>
                    </div>
                </div>

                <div class="stats shadow">
                    <div class="stat">
                        <div class="stat-title">"筛选结果"</div>
                        <div class="stat-value text-lg">
                            {move || format!("{} 笔", filtered().len())}
                        </div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"已支付营收（当前子集）"</div>
                        <div class="stat-value text-lg text-primary">
                            {move || format_rupiah(revenue())}
                        </div>
                        <div class="stat-desc">"权威口径以业主报表为准"</div>
                    </div>
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

                <Show when=move || !loading.get() && error.get().is_none()>
                    <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                        <table class="table table-zebra">
                            <thead>
                                <tr>
                                    <th>"订单号"</th>
                                    <th>"用户"</th>
                                    <th>"下单时间"</th>
                                    <th>"金额"</th>
                                    <th>"状态"</th>
                                    <th>"凭证"</th>
                                    <th class="text-right">"操作"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=filtered
                                    key=|b| b.id
                                    children=move |b: Booking| {
                                        let code = b.booking_code.clone();
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
                                        let proof = b.payment_proof.clone();
                                        let confirm_code = b.booking_code.clone();
                                        let reject_code = b.booking_code.clone();
                                        let on_confirm = move |_| {
                                            let code = confirm_code.clone();
                                            set_acting.set(true);
                                            let api = auth.api();
                                            spawn_local(async move {
                                                match api.confirm_booking(&code).await {
                                                    Ok(()) => {
                                                        set_notice.set(Some((
                                                            format!("已确认订单 {} 的支付", code),
                                                            false,
                                                        )));
                                                        load();
                                                    }
                                                    Err(e) => set_notice.set(Some((
                                                        format!("确认失败: {}", e.message),
                                                        true,
                                                    ))),
                                                }
                                                set_acting.set(false);
                                            });
                                        };
                                        view! {
                                            <tr>
                                                <td class="font-mono">{code}</td>
                                                <td>{user_name}</td>
                                                <td>{created}</td>
                                                <td>{format_rupiah(b.total_amount)}</td>
                                                <td>
                                                    <span class=status.badge_class()>{status.label()}</span>
                                                </td>
                                                <td>
                                                    {match proof {
                                                        Some(url) => view! {
                                                            <a
                                                                href=url
                                                                target="_blank"
                                                                class="btn btn-ghost btn-xs gap-1"
                                                            >
                                                                <ImageFrame attr:class="h-4 w-4" />
                                                                "查看"
                                                            </a>
                                                        }
                                                        .into_any(),
                                                        None => view! {
                                                            <span class="text-base-content/40">"-"</span>
                                                        }
                                                        .into_any(),
                                                    }}
                                                </td>
                                                <td class="text-right">
                                                    <Show when=move || status == PaymentStatus::Pending>
                                                        {
                                                            let on_confirm = on_confirm.clone();
                                                            let reject_code = reject_code.clone();
                                                            view! {
                                                                <div class="flex justify-end gap-1">
                                                                    <button
                                                                        class="btn btn-success btn-xs gap-1"
                                                                        disabled=move || acting.get()
                                                                        on:click=on_confirm
                                                                    >
                                                                        <CircleCheck attr:class="h-4 w-4" />
                                                                        "确认"
                                                                    </button>
                                                                    <button
                                                                        class="btn btn-error btn-xs gap-1"
                                                                        disabled=move || acting.get()
                                                                        on:click=move |_| {
                                                                            set_reject_target
                                                                                .set(Some(reject_code.clone()))
                                                                        }
                                                                    >
                                                                        <CircleX attr:class="h-4 w-4" />
                                                                        "拒绝"
                                                                    </button>
                                                                </div>
                                                            }
                                                        }
                                                    </Show>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                        <Show when=move || filtered().is_empty()>
                            <div class="text-center py-10 text-base-content/50">
                                "没有匹配的订单"
                            </div>
                        </Show>
                    </div>
                </Show>

                <dialog class="modal" node_ref=dialog_ref on:close=move |_| set_reject_target.set(None)>
                    <div class="modal-box">
                        <h3 class="font-bold text-lg">"拒绝支付凭证"</h3>
                        <p class="py-3">
                            {move || {
                                reject_target
                                    .get()
                                    .map(|c| format!("拒绝订单 {} 的凭证？订单将被取消。", c))
                                    .unwrap_or_default()
                            }}
                        </p>
                        <div class="modal-action">
                            <button class="btn" on:click=move |_| set_reject_target.set(None)>
                                "再想想"
                            </button>
                            <button class="btn btn-error" on:click=do_reject>
                                "拒绝"
                            </button>
                        </div>
                    </div>
                    <form method="dialog" class="modal-backdrop">
                        <button>"close"</button>
                    </form>
                </dialog>
            </div>
        </AppShell>
    }
}
