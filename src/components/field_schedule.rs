use chrono::NaiveDate;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::booking::pending::{SequenceGate, use_pending};
use crate::booking::selection::{DayContext, SlotSelection, TimeFilter, ToggleOutcome};
use crate::components::icons::{ArrowLeft, RefreshCw};
use crate::components::layout::{AppShell, Toast};
use crate::models::{Field, Slot, format_rupiah};
use crate::web::date::{parse_input_date, today};
use crate::web::route::AppRoute;
use crate::web::router::{use_navigate, use_router};

/// 订场页：按天看时段、勾选、结算
///
/// 页面状态全部委托给 `SlotSelection`，这里只做信号接线和视图。
#[component]
pub fn FieldSchedulePage(field_id: u64) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let pending = use_pending();
    let navigate = use_navigate();

    // 公开接口没有单独的场地详情，从场馆列表里定位场地和所属场馆
    let (field, set_field) = signal(Option::<(String, Field)>::None);
    let (field_error, set_field_error) = signal(Option::<String>::None);

    let (date, set_date) = signal(today());
    let (slots, set_slots) = signal(Vec::<Slot>::new());
    let (loading, set_loading) = signal(true);
    let (slots_error, set_slots_error) = signal(Option::<String>::None);
    // 快速切换日期时丢弃过期的时段响应
    let slots_gate = StoredValue::new(SequenceGate::default());

    let selection = RwSignal::new(SlotSelection::new(today()));
    let (filter, set_filter) = signal(TimeFilter::default());
    let (submitting, set_submitting) = signal(false);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let load_slots = move |day: NaiveDate| {
        let api = auth.api();
        let seq = slots_gate
            .try_update_value(|g| g.begin())
            .expect("slots gate should not be disposed");
        set_loading.set(true);
        set_slots_error.set(None);
        spawn_local(async move {
            let result = api.field_schedules(field_id, day).await;
            if !slots_gate.with_value(|g| g.is_current(seq)) {
                return;
            }
            match result {
                Ok(data) => {
                    // 刷新后对账：已被抢订的时段从勾选里剔除并提示
                    let dropped = selection
                        .try_update(|sel| sel.retain_available(&data))
                        .unwrap_or(0);
                    if dropped > 0 {
                        set_notice.set(Some((
                            format!("{} 个时段已被抢订，已从勾选中移除", dropped),
                            true,
                        )));
                    }
                    set_slots.set(data);
                }
                Err(e) => set_slots_error.set(Some(format!("加载时段失败: {}", e.message))),
            }
            set_loading.set(false);
        });
    };

    // 初始加载：场地信息 + 今天的时段
    Effect::new(move |_| {
        let api = auth.api();
        spawn_local(async move {
            match api.venues().await {
                Ok(venues) => {
                    let found = venues.into_iter().find_map(|v| {
                        let venue_name = v.name;
                        v.fields
                            .into_iter()
                            .find(|f| f.id == field_id)
                            .map(|f| (venue_name, f))
                    });
                    match found {
                        Some(pair) => set_field.set(Some(pair)),
                        None => set_field_error.set(Some("场地不存在或已下架".to_string())),
                    }
                }
                Err(e) => set_field_error.set(Some(format!("加载场地信息失败: {}", e.message))),
            }
        });
        load_slots(date.get_untracked());
    });

    let on_date_change = move |ev| {
        let Some(day) = parse_input_date(&event_target_value(&ev)) else {
            return;
        };
        // 换日期清空勾选
        selection.update(|s| s.set_date(day));
        set_date.set(day);
        load_slots(day);
    };

    let checkout = {
        let navigate = navigate.clone();
        move |_| {
            // 游客点结算：记住本页，登录后守卫会送回来
            if auth.state().with_untracked(|s| s.token.is_none()) {
                router.redirect_to_login(AppRoute::FieldSchedule(field_id));
                return;
            }
            let Some(payload) = selection.with_untracked(|s| s.to_request(field_id)) else {
                return;
            };
            let api = auth.api();
            let navigate = navigate.clone();
            set_submitting.set(true);
            spawn_local(async move {
                match api.create_booking(&payload).await {
                    Ok(_) => {
                        // 成功才清空勾选，然后去订单页付款
                        selection.update(|s| s.clear());
                        set_submitting.set(false);
                        pending.refresh(auth.api());
                        navigate(AppRoute::MyBookings);
                    }
                    Err(e) => {
                        // 失败保留勾选，把后端原话给用户
                        set_notice.set(Some((format!("下单失败: {}", e.message), true)));
                        set_submitting.set(false);
                    }
                }
            });
        }
    };

    let back = {
        let navigate = navigate.clone();
        move |_| {
            let target = field
                .get_untracked()
                .map(|(_, f)| AppRoute::VenueDetail(f.venue_id))
                .unwrap_or(AppRoute::Home);
            navigate(target);
        }
    };

    let visible_slots = move || {
        let bucket = filter.get();
        slots.with(|list| {
            list.iter()
                .filter(|s| bucket.matches(s))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <AppShell>
            <Toast notice=notice set_notice=set_notice />
            <div class="space-y-6">
                <button class="btn btn-ghost btn-sm gap-1" on:click=back>
                    <ArrowLeft attr:class="h-4 w-4" />
                    "返回场馆"
                </button>

                <Show when=move || field_error.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || field_error.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                {move || {
                    field.get().map(|(venue_name, f)| view! {
                        <div class="flex flex-col md:flex-row md:items-end justify-between gap-2">
                            <div>
                                <h2 class="text-2xl font-bold">{f.name.clone()}</h2>
                                <p class="text-base-content/70">
                                    {venue_name} " · " {f.kind.label()}
                                </p>
                            </div>
                            <p class="text-primary font-semibold">
                                {format_rupiah(f.price_per_hour)} " / 小时"
                            </p>
                        </div>
                    })
                }}

                <div class="flex flex-col md:flex-row md:items-center gap-4">
                    <input
                        type="date"
                        class="input input-bordered"
                        prop:value=move || date.get().format("%Y-%m-%d").to_string()
                        min=today().format("%Y-%m-%d").to_string()
                        on:change=on_date_change
                    />
                    <div class="join">
                        {TimeFilter::ALL
                            .iter()
                            .map(|bucket| {
                                let bucket = *bucket;
                                view! {
                                    <button
                                        class="btn btn-sm join-item"
                                        class:btn-active=move || filter.get() == bucket
                                        on:click=move |_| set_filter.set(bucket)
                                    >
                                        {bucket.label()}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                    <button
                        class="btn btn-ghost btn-sm gap-1"
                        on:click=move |_| load_slots(date.get_untracked())
                    >
                        <RefreshCw attr:class="h-4 w-4" />
                        "刷新"
                    </button>
                </div>

                <Show when=move || slots_error.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || slots_error.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <Show when=move || loading.get()>
                    <div class="flex justify-center py-10">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                </Show>

                <Show when=move || {
                    !loading.get() && slots_error.get().is_none() && visible_slots().is_empty()
                }>
                    <div class="text-center py-10 text-base-content/50">
                        "这一天没有排期"
                    </div>
                </Show>

                <div class="grid grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-3">
                    <For
                        each=visible_slots
                        key=|s| s.id
                        children=move |slot: Slot| {
                            let ctx = DayContext::now();
                            let slot_id = slot.id;
                            let label = format!("{} - {}", slot.start_time, slot.end_time);
                            let past_now = selection.with_untracked(|sel| sel.is_past(&slot, &ctx));
                            let sub = if !slot.status.is_available() {
                                "已被预订".to_string()
                            } else if past_now {
                                "已开始".to_string()
                            } else {
                                format_rupiah(slot.price)
                            };
                            let for_class = slot.clone();
                            let for_disabled = slot.clone();
                            let for_click = slot.clone();
                            let classes = move || {
                                selection.with(|sel| {
                                    if sel.is_selected(slot_id) {
                                        "btn btn-primary h-auto py-2"
                                    } else if sel.is_selectable(&for_class, &ctx) {
                                        "btn btn-outline h-auto py-2"
                                    } else {
                                        "btn h-auto py-2"
                                    }
                                })
                            };
                            let unavailable = move || {
                                selection.with(|sel| !sel.is_selectable(&for_disabled, &ctx))
                            };
                            view! {
                                <button
                                    class=classes
                                    disabled=unavailable
                                    on:click=move |_| {
                                        let now = DayContext::now();
                                        let outcome = selection
                                            .try_update(|sel| sel.toggle(&for_click, &now));
                                        match outcome {
                                            Some(ToggleOutcome::RejectedPast) => {
                                                set_notice.set(Some(("该时段已经开始".to_string(), true)));
                                            }
                                            Some(ToggleOutcome::RejectedUnavailable) => {
                                                set_notice.set(Some(("该时段已被预订".to_string(), true)));
                                            }
                                            _ => {}
                                        }
                                    }
                                >
                                    <span class="flex flex-col items-center gap-1">
                                        <span class="font-semibold">{label}</span>
                                        <span class="text-xs opacity-70">{sub}</span>
                                    </span>
                                </button>
                            }
                        }
                    />
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"已选时段"</h3>
                        <Show
                            when=move || selection.with(|s| !s.is_empty())
                            fallback=|| view! {
                                <p class="text-base-content/50">"点击上方时段进行勾选"</p>
                            }
                        >
                            <div class="flex flex-wrap gap-2">
                                <For
                                    each=move || selection.with(|s| s.selected().to_vec())
                                    key=|s| s.id
                                    children=move |s: Slot| {
                                        let label = format!("{} - {} ✕", s.start_time, s.end_time);
                                        view! {
                                            <span
                                                class="badge badge-primary badge-lg cursor-pointer"
                                                on:click=move |_| {
                                                    let now = DayContext::now();
                                                    selection.update(|sel| {
                                                        sel.toggle(&s, &now);
                                                    });
                                                }
                                            >
                                                {label}
                                            </span>
                                        }
                                    }
                                />
                            </div>
                        </Show>
                        <div class="flex items-center justify-between mt-2">
                            <div>
                                <p class="text-sm text-base-content/60">
                                    {move || format!("共 {} 个时段", selection.with(|s| s.count()))}
                                </p>
                                <p class="text-xl font-bold text-primary">
                                    {move || {
                                        let unit = field
                                            .get()
                                            .map(|(_, f)| f.price_per_hour)
                                            .unwrap_or(0);
                                        format_rupiah(selection.with(|s| s.total(unit)))
                                    }}
                                </p>
                            </div>
                            <button
                                class="btn btn-primary"
                                disabled=move || {
                                    selection.with(|s| s.is_empty()) || submitting.get()
                                }
                                on:click=checkout
                            >
                                <Show when=move || submitting.get() fallback=|| view! { "去结算" }>
                                    <span class="loading loading-spinner loading-sm"></span>
                                    "提交中..."
                                </Show>
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </AppShell>
    }
}
