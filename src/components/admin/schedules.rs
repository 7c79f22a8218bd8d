use chrono::{NaiveDate, NaiveTime};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::{CalendarDays, Pencil, Plus, RefreshCw, Trash2};
use crate::components::layout::{AppShell, Toast};
use crate::error::ApiErrorKind;
use crate::models::{Field, SchedulePayload, Slot, SlotStatus, Venue, format_rupiah, hour_range};
use crate::web::date::{parse_input_date, today};

/// 排期表单的信号集合
#[derive(Clone, Copy)]
struct ScheduleForm {
    field_id: RwSignal<Option<u64>>,
    date: RwSignal<String>,
    start_time: RwSignal<String>,
    end_time: RwSignal<String>,
    price: RwSignal<String>,
}

impl ScheduleForm {
    fn new() -> Self {
        Self {
            field_id: RwSignal::new(None),
            date: RwSignal::new(today().format("%Y-%m-%d").to_string()),
            start_time: RwSignal::new(String::new()),
            end_time: RwSignal::new(String::new()),
            price: RwSignal::new(String::new()),
        }
    }

    fn reset(&self) {
        self.field_id.set(None);
        self.date.set(today().format("%Y-%m-%d").to_string());
        self.start_time.set(String::new());
        self.end_time.set(String::new());
        self.price.set(String::new());
    }

    fn load(&self, slot: &Slot) {
        self.field_id.set(Some(slot.field_id));
        self.date.set(
            slot.date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        );
        self.start_time.set(slot.start_time.clone());
        self.end_time.set(slot.end_time.clone());
        self.price.set(slot.price.to_string());
    }

    fn to_payload(&self) -> Result<SchedulePayload, String> {
        let Some(field_id) = self.field_id.get_untracked() else {
            return Err("请选择场地".to_string());
        };
        let Some(date) = parse_input_date(&self.date.get_untracked()) else {
            return Err("日期格式应为 YYYY-MM-DD".to_string());
        };
        let start_time = self.start_time.get_untracked().trim().to_string();
        let end_time = self.end_time.get_untracked().trim().to_string();
        if NaiveTime::parse_from_str(&start_time, "%H:%M").is_err()
            || NaiveTime::parse_from_str(&end_time, "%H:%M").is_err()
        {
            return Err("时间格式应为 HH:mm".to_string());
        }
        if end_time <= start_time {
            return Err("结束时间要晚于开始时间".to_string());
        }
        let price: i64 = self
            .price
            .get_untracked()
            .trim()
            .parse()
            .map_err(|_| "价格要填整数".to_string())?;
        if price <= 0 {
            return Err("价格要大于 0".to_string());
        }
        Ok(SchedulePayload {
            field_id,
            date,
            start_time,
            end_time,
            price,
        })
    }
}

/// 批量生成表单：按场馆营业时间把一天铺满整点时段
#[derive(Clone, Copy)]
struct BulkForm {
    field_id: RwSignal<Option<u64>>,
    date: RwSignal<String>,
    price: RwSignal<String>,
}

impl BulkForm {
    fn new() -> Self {
        Self {
            field_id: RwSignal::new(None),
            date: RwSignal::new(today().format("%Y-%m-%d").to_string()),
            price: RwSignal::new(String::new()),
        }
    }

    fn reset(&self) {
        self.field_id.set(None);
        self.date.set(today().format("%Y-%m-%d").to_string());
        self.price.set(String::new());
    }
}

/// 管理端排期页：按日查看时段，单条增删改或按天批量生成
#[component]
pub fn AdminSchedulesPage() -> impl IntoView {
    let auth = use_auth();

    let (slots, set_slots) = signal(Vec::<Slot>::new());
    let (fields, set_fields) = signal(Vec::<Field>::new());
    // 批量生成要查场馆的营业时间
    let (venues, set_venues) = signal(Vec::<Venue>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);
    // None = 全部日期，由服务端过滤
    let (filter_date, set_filter_date) = signal(Option::<NaiveDate>::None);

    let load = move || {
        let api = auth.api();
        let date = filter_date.get_untracked();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match api.admin_schedules(date).await {
                Ok(data) => set_slots.set(data),
                Err(e) => set_error.set(Some(format!("加载排期失败: {}", e.message))),
            }
            match api.admin_fields().await {
                Ok(data) => set_fields.set(data),
                Err(e) => warn!("[Admin] Field list load failed: {}", e),
            }
            match api.admin_venues().await {
                Ok(data) => set_venues.set(data),
                Err(e) => warn!("[Admin] Venue list load failed: {}", e),
            }
            set_loading.set(false);
        });
    };

    Effect::new(move |_| load());

    let on_filter_date = move |ev| {
        set_filter_date.set(parse_input_date(&event_target_value(&ev)));
        load();
    };

    // ---- 新增/编辑对话框 ----
    let form = ScheduleForm::new();
    let form_dialog = NodeRef::<leptos::html::Dialog>::new();
    let (form_open, set_form_open) = signal(false);
    let (editing, set_editing) = signal(Option::<u64>::None);
    let (form_error, set_form_error) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    Effect::new(move |_| {
        let Some(dialog) = form_dialog.get() else {
            return;
        };
        if form_open.get() {
            let _ = dialog.show_modal();
        } else {
            dialog.close();
        }
    });

    let open_create = move |_| {
        form.reset();
        // 新增时默认带上当前过滤的日期
        if let Some(d) = filter_date.get_untracked() {
            form.date.set(d.format("%Y-%m-%d").to_string());
        }
        set_editing.set(None);
        set_form_error.set(None);
        set_form_open.set(true);
    };

    let submit = move |_| {
        let payload = match form.to_payload() {
            Ok(p) => p,
            Err(msg) => {
                set_form_error.set(Some(msg));
                return;
            }
        };
        let api = auth.api();
        let target = editing.get_untracked();
        set_saving.set(true);
        set_form_error.set(None);
        spawn_local(async move {
            let (result, done_msg) = match target {
                Some(id) => (
                    api.update_schedule(id, &payload).await.map(|_| ()),
                    "排期已更新",
                ),
                None => (api.create_schedule(&payload).await.map(|_| ()), "排期已创建"),
            };
            match result {
                Ok(()) => {
                    set_saving.set(false);
                    set_form_open.set(false);
                    set_notice.set(Some((done_msg.to_string(), false)));
                    load();
                }
                Err(e) => {
                    // 重叠时段等冲突由后端判定，原话展示
                    set_form_error.set(Some(e.message));
                    set_saving.set(false);
                }
            }
        });
    };

    // ---- 按天批量生成对话框 ----
    let bulk = BulkForm::new();
    let bulk_dialog = NodeRef::<leptos::html::Dialog>::new();
    let (bulk_open, set_bulk_open) = signal(false);
    let (bulk_error, set_bulk_error) = signal(Option::<String>::None);
    let (generating, set_generating) = signal(false);

    Effect::new(move |_| {
        let Some(dialog) = bulk_dialog.get() else {
            return;
        };
        if bulk_open.get() {
            let _ = dialog.show_modal();
        } else {
            dialog.close();
        }
    });

    let open_bulk = move |_| {
        bulk.reset();
        if let Some(d) = filter_date.get_untracked() {
            bulk.date.set(d.format("%Y-%m-%d").to_string());
        }
        set_bulk_error.set(None);
        set_bulk_open.set(true);
    };

    // 选中场地后预告会按哪段营业时间生成多少条
    let bulk_preview = move || -> Option<String> {
        let field_id = bulk.field_id.get()?;
        let venue_id =
            fields.with(|fs| fs.iter().find(|f| f.id == field_id).map(|f| f.venue_id))?;
        venues.with(|vs| {
            vs.iter().find(|v| v.id == venue_id).map(|v| {
                let count = hour_range(&v.open_time, &v.close_time).len();
                format!(
                    "营业时间 {} - {}，将生成 {} 个整点时段",
                    v.open_time, v.close_time, count
                )
            })
        })
    };

    let generate = move |_| {
        let Some(field_id) = bulk.field_id.get_untracked() else {
            set_bulk_error.set(Some("请选择场地".to_string()));
            return;
        };
        let Some(date) = parse_input_date(&bulk.date.get_untracked()) else {
            set_bulk_error.set(Some("日期格式应为 YYYY-MM-DD".to_string()));
            return;
        };
        let price: i64 = match bulk.price.get_untracked().trim().parse() {
            Ok(p) if p > 0 => p,
            _ => {
                set_bulk_error.set(Some("价格要填大于 0 的整数".to_string()));
                return;
            }
        };
        let rows = fields
            .with_untracked(|fs| fs.iter().find(|f| f.id == field_id).map(|f| f.venue_id))
            .and_then(|vid| {
                venues.with_untracked(|vs| {
                    vs.iter()
                        .find(|v| v.id == vid)
                        .map(|v| hour_range(&v.open_time, &v.close_time))
                })
            })
            .unwrap_or_default();
        if rows.is_empty() {
            set_bulk_error.set(Some("查不到所属场馆的营业时间".to_string()));
            return;
        }
        let api = auth.api();
        set_generating.set(true);
        set_bulk_error.set(None);
        spawn_local(async move {
            let mut created = 0usize;
            let mut skipped = 0usize;
            for (start_time, end_time) in rows {
                let payload = SchedulePayload {
                    field_id,
                    date,
                    start_time,
                    end_time,
                    price,
                };
                match api.create_schedule(&payload).await {
                    Ok(_) => created += 1,
                    // 与已有排期重叠的时段跳过继续铺
                    Err(e) if matches!(e.kind, ApiErrorKind::Conflict) => skipped += 1,
                    Err(e) => {
                        set_bulk_error.set(Some(format!(
                            "生成中断，已创建 {} 个: {}",
                            created, e.message
                        )));
                        set_generating.set(false);
                        load();
                        return;
                    }
                }
            }
            set_generating.set(false);
            set_bulk_open.set(false);
            set_notice.set(Some((
                format!("已生成 {} 个时段，跳过 {} 个冲突", created, skipped),
                false,
            )));
            load();
        });
    };

    // ---- 删除确认对话框 ----
    let delete_dialog = NodeRef::<leptos::html::Dialog>::new();
    let (delete_target, set_delete_target) = signal(Option::<(u64, String)>::None);

    Effect::new(move |_| {
        let Some(dialog) = delete_dialog.get() else {
            return;
        };
        if delete_target.get().is_some() {
            let _ = dialog.show_modal();
        } else {
            dialog.close();
        }
    });

    let do_delete = move |_| {
        let Some((id, label)) = delete_target.get_untracked() else {
            return;
        };
        set_delete_target.set(None);
        let api = auth.api();
        spawn_local(async move {
            match api.delete_schedule(id).await {
                Ok(()) => {
                    set_notice.set(Some((format!("已删除排期 {}", label), false)));
                    load();
                }
                Err(e) => set_notice.set(Some((format!("删除失败: {}", e.message), true))),
            }
        });
    };

    view! {
        <AppShell>
            <Toast notice=notice set_notice=set_notice />
            <div class="space-y-6">
                <div class="flex flex-wrap items-center justify-between gap-3">
                    <h2 class="text-2xl font-bold flex items-center gap-2">
                        <CalendarDays attr:class="h-6 w-6" />
                        "时段管理"
                    </h2>
                    <div class="flex items-center gap-2">
                        <input
                            type="date"
                            class="input input-bordered input-sm"
                            on:change=on_filter_date
                            prop:value=move || {
                                filter_date
                                    .get()
                                    .map(|d| d.format("%Y-%m-%d").to_string())
                                    .unwrap_or_default()
                            }
                        />
                        <button class="btn btn-ghost btn-sm gap-1" on:click=move |_| load()>
                            <RefreshCw attr:class="h-4 w-4" />
                            "刷新"
                        </button>
                        <button class="btn btn-secondary btn-sm gap-1" on:click=open_bulk>
                            <CalendarDays attr:class="h-4 w-4" />
                            "按天生成"
                        </button>
                        <button class="btn btn-primary btn-sm gap-1" on:click=open_create>
                            <Plus attr:class="h-4 w-4" />
                            "新增排期"
                        </button>
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
                                    <th>"场地"</th>
                                    <th>"日期"</th>
                                    <th>"时间"</th>
                                    <th>"价格"</th>
                                    <th>"状态"</th>
                                    <th class="text-right">"操作"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || slots.get()
                                    key=|s| s.id
                                    children=move |slot: Slot| {
                                        let id = slot.id;
                                        let fid = slot.field_id;
                                        let date_label = slot
                                            .date
                                            .map(|d| d.format("%Y-%m-%d").to_string())
                                            .unwrap_or_else(|| "-".to_string());
                                        let time_label =
                                            format!("{} - {}", slot.start_time, slot.end_time);
                                        let delete_label = time_label.clone();
                                        let status = slot.status;
                                        let booked = status == SlotStatus::Booked;
                                        let edit_slot = slot.clone();
                                        view! {
                                            <tr>
                                                <td>
                                                    {move || {
                                                        fields.with(|fs| {
                                                            fs.iter()
                                                                .find(|f| f.id == fid)
                                                                .map(|f| f.name.clone())
                                                                .unwrap_or_else(|| format!("#{}", fid))
                                                        })
                                                    }}
                                                </td>
                                                <td>{date_label}</td>
                                                <td class="font-mono">{time_label}</td>
                                                <td>{format_rupiah(slot.price)}</td>
                                                <td>
                                                    <span class=status.badge_class()>{status.label()}</span>
                                                </td>
                                                <td class="text-right">
                                                    // 已被订走的时段不允许改删
                                                    <div class="flex justify-end gap-1">
                                                        <button
                                                            class="btn btn-ghost btn-xs gap-1"
                                                            disabled=booked
                                                            on:click=move |_| {
                                                                form.load(&edit_slot);
                                                                set_editing.set(Some(id));
                                                                set_form_error.set(None);
                                                                set_form_open.set(true);
                                                            }
                                                        >
                                                            <Pencil attr:class="h-4 w-4" />
                                                            "编辑"
                                                        </button>
                                                        <button
                                                            class="btn btn-ghost btn-xs text-error gap-1"
                                                            disabled=booked
                                                            on:click=move |_| {
                                                                set_delete_target
                                                                    .set(Some((id, delete_label.clone())))
                                                            }
                                                        >
                                                            <Trash2 attr:class="h-4 w-4" />
                                                            "删除"
                                                        </button>
                                                    </div>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                        <Show when=move || slots.with(|s| s.is_empty())>
                            <div class="text-center py-10 text-base-content/50">
                                "没有排期，点右上角新增"
                            </div>
                        </Show>
                    </div>
                </Show>

                <dialog class="modal" node_ref=form_dialog on:close=move |_| set_form_open.set(false)>
                    <div class="modal-box">
                        <h3 class="font-bold text-lg">
                            {move || {
                                if editing.get().is_some() { "编辑排期" } else { "新增排期" }
                            }}
                        </h3>
                        <div class="space-y-3 mt-3">
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"场地"</span>
                                </label>
                                <select
                                    class="select select-bordered"
                                    on:change=move |ev| {
                                        form.field_id
                                            .set(event_target_value(&ev).parse::<u64>().ok())
                                    }
                                >
                                    <option value="" selected=move || form.field_id.get().is_none()>
                                        "选择场地"
                                    </option>
                                    {move || {
                                        fields
                                            .get()
                                            .into_iter()
                                            .map(|f| {
                                                let fid = f.id;
                                                view! {
                                                    <option
                                                        value=fid.to_string()
                                                        selected=move || {
                                                            form.field_id.get() == Some(fid)
                                                        }
                                                    >
                                                        {f.name.clone()}
                                                    </option>
                                                }
                                            })
                                            .collect_view()
                                    }}
                                </select>
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"日期"</span>
                                </label>
                                <input
                                    type="date"
                                    class="input input-bordered"
                                    on:input=move |ev| form.date.set(event_target_value(&ev))
                                    prop:value=form.date
                                />
                            </div>
                            <div class="grid grid-cols-2 gap-3">
                                <div class="form-control">
                                    <label class="label">
                                        <span class="label-text">"开始时间"</span>
                                    </label>
                                    <input
                                        type="time"
                                        class="input input-bordered"
                                        on:input=move |ev| form.start_time.set(event_target_value(&ev))
                                        prop:value=form.start_time
                                    />
                                </div>
                                <div class="form-control">
                                    <label class="label">
                                        <span class="label-text">"结束时间"</span>
                                    </label>
                                    <input
                                        type="time"
                                        class="input input-bordered"
                                        on:input=move |ev| form.end_time.set(event_target_value(&ev))
                                        prop:value=form.end_time
                                    />
                                </div>
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"价格"</span>
                                </label>
                                <input
                                    type="number"
                                    min="0"
                                    class="input input-bordered"
                                    on:input=move |ev| form.price.set(event_target_value(&ev))
                                    prop:value=form.price
                                />
                            </div>
                        </div>

                        <Show when=move || form_error.get().is_some()>
                            <div role="alert" class="alert alert-error mt-3">
                                <span>{move || form_error.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="modal-action">
                            <button class="btn" on:click=move |_| set_form_open.set(false)>
                                "取消"
                            </button>
                            <button
                                class="btn btn-primary"
                                disabled=move || saving.get()
                                on:click=submit
                            >
                                <Show when=move || saving.get() fallback=|| view! { "保存" }>
                                    <span class="loading loading-spinner loading-sm"></span>
                                    "保存中..."
                                </Show>
                            </button>
                        </div>
                    </div>
                    <form method="dialog" class="modal-backdrop">
                        <button>"close"</button>
                    </form>
                </dialog>

                <dialog class="modal" node_ref=bulk_dialog on:close=move |_| set_bulk_open.set(false)>
                    <div class="modal-box">
                        <h3 class="font-bold text-lg">"按天生成排期"</h3>
                        <p class="text-sm text-base-content/60 mt-1">
                            "按所属场馆的营业时间逐小时铺满选定日期"
                        </p>
                        <div class="space-y-3 mt-3">
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"场地"</span>
                                </label>
                                <select
                                    class="select select-bordered"
                                    on:change=move |ev| {
                                        let fid = event_target_value(&ev).parse::<u64>().ok();
                                        bulk.field_id.set(fid);
                                        // 价格空着时带出场地单价
                                        if bulk.price.get_untracked().trim().is_empty() {
                                            let unit = fid.and_then(|id| {
                                                fields.with_untracked(|fs| {
                                                    fs.iter()
                                                        .find(|f| f.id == id)
                                                        .map(|f| f.price_per_hour)
                                                })
                                            });
                                            if let Some(price) = unit {
                                                bulk.price.set(price.to_string());
                                            }
                                        }
                                    }
                                >
                                    <option value="" selected=move || bulk.field_id.get().is_none()>
                                        "选择场地"
                                    </option>
                                    {move || {
                                        fields
                                            .get()
                                            .into_iter()
                                            .map(|f| {
                                                let fid = f.id;
                                                view! {
                                                    <option
                                                        value=fid.to_string()
                                                        selected=move || {
                                                            bulk.field_id.get() == Some(fid)
                                                        }
                                                    >
                                                        {f.name.clone()}
                                                    </option>
                                                }
                                            })
                                            .collect_view()
                                    }}
                                </select>
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"日期"</span>
                                </label>
                                <input
                                    type="date"
                                    class="input input-bordered"
                                    on:input=move |ev| bulk.date.set(event_target_value(&ev))
                                    prop:value=bulk.date
                                />
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"每小时价格"</span>
                                </label>
                                <input
                                    type="number"
                                    min="0"
                                    class="input input-bordered"
                                    on:input=move |ev| bulk.price.set(event_target_value(&ev))
                                    prop:value=bulk.price
                                />
                            </div>
                            <p class="text-sm text-info">{bulk_preview}</p>
                        </div>

                        <Show when=move || bulk_error.get().is_some()>
                            <div role="alert" class="alert alert-error mt-3">
                                <span>{move || bulk_error.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="modal-action">
                            <button class="btn" on:click=move |_| set_bulk_open.set(false)>
                                "取消"
                            </button>
                            <button
                                class="btn btn-primary"
                                disabled=move || generating.get()
                                on:click=generate
                            >
                                <Show when=move || generating.get() fallback=|| view! { "生成" }>
                                    <span class="loading loading-spinner loading-sm"></span>
                                    "生成中..."
                                </Show>
                            </button>
                        </div>
                    </div>
                    <form method="dialog" class="modal-backdrop">
                        <button>"close"</button>
                    </form>
                </dialog>

                <dialog
                    class="modal"
                    node_ref=delete_dialog
                    on:close=move |_| set_delete_target.set(None)
                >
                    <div class="modal-box">
                        <h3 class="font-bold text-lg">"删除排期"</h3>
                        <p class="py-3">
                            {move || {
                                delete_target
                                    .get()
                                    .map(|(_, label)| format!("删除时段 {}？", label))
                                    .unwrap_or_default()
                            }}
                        </p>
                        <div class="modal-action">
                            <button class="btn" on:click=move |_| set_delete_target.set(None)>
                                "取消"
                            </button>
                            <button class="btn btn-error" on:click=do_delete>
                                "删除"
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
