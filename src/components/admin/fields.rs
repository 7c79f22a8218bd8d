use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::{Pencil, Plus, RefreshCw, Search, Trash2};
use crate::components::layout::{AppShell, Toast};
use crate::filters::filter_fields;
use crate::models::{Field, FieldKind, FieldPayload, Venue, format_rupiah};

/// 场地表单的信号集合
#[derive(Clone, Copy)]
struct FieldForm {
    venue_id: RwSignal<Option<u64>>,
    name: RwSignal<String>,
    kind: RwSignal<FieldKind>,
    price: RwSignal<String>,
    is_active: RwSignal<bool>,
}

impl FieldForm {
    fn new() -> Self {
        Self {
            venue_id: RwSignal::new(None),
            name: RwSignal::new(String::new()),
            kind: RwSignal::new(FieldKind::Futsal),
            price: RwSignal::new(String::new()),
            is_active: RwSignal::new(true),
        }
    }

    fn reset(&self) {
        self.venue_id.set(None);
        self.name.set(String::new());
        self.kind.set(FieldKind::Futsal);
        self.price.set(String::new());
        self.is_active.set(true);
    }

    fn load(&self, field: &Field) {
        self.venue_id.set(Some(field.venue_id));
        self.name.set(field.name.clone());
        self.kind.set(field.kind);
        self.price.set(field.price_per_hour.to_string());
        self.is_active.set(field.is_active);
    }

    fn to_payload(&self) -> Result<FieldPayload, String> {
        let Some(venue_id) = self.venue_id.get_untracked() else {
            return Err("请选择所属场馆".to_string());
        };
        let name = self.name.get_untracked().trim().to_string();
        if name.is_empty() {
            return Err("场地名称不能为空".to_string());
        }
        let price: i64 = self
            .price
            .get_untracked()
            .trim()
            .parse()
            .map_err(|_| "每小时单价要填整数".to_string())?;
        if price <= 0 {
            return Err("每小时单价要大于 0".to_string());
        }
        Ok(FieldPayload {
            venue_id,
            name,
            kind: self.kind.get_untracked(),
            price_per_hour: price,
            is_active: self.is_active.get_untracked(),
        })
    }
}

/// 管理端场地页：列表 + 类型筛选 + 新增/编辑/删除
#[component]
pub fn AdminFieldsPage() -> impl IntoView {
    let auth = use_auth();

    let (fields, set_fields) = signal(Vec::<Field>::new());
    let (venues, set_venues) = signal(Vec::<Venue>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let (kind_filter, set_kind_filter) = signal(Option::<FieldKind>::None);
    let (keyword, set_keyword) = signal(String::new());

    let load = move || {
        let api = auth.api();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match api.admin_fields().await {
                Ok(data) => set_fields.set(data),
                Err(e) => set_error.set(Some(format!("加载场地失败: {}", e.message))),
            }
            // 场馆列表给名称映射和表单下拉用，失败不拦页面
            match api.admin_venues().await {
                Ok(data) => set_venues.set(data),
                Err(e) => warn!("[Admin] Venue list load failed: {}", e),
            }
            set_loading.set(false);
        });
    };

    Effect::new(move |_| load());

    let filtered = move || {
        fields.with(|list| {
            filter_fields(list, kind_filter.get(), &keyword.get())
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    // ---- 新增/编辑对话框 ----
    let form = FieldForm::new();
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
                Some(id) => (api.update_field(id, &payload).await.map(|_| ()), "场地已更新"),
                None => (api.create_field(&payload).await.map(|_| ()), "场地已创建"),
            };
            match result {
                Ok(()) => {
                    set_saving.set(false);
                    set_form_open.set(false);
                    set_notice.set(Some((done_msg.to_string(), false)));
                    load();
                }
                Err(e) => {
                    set_form_error.set(Some(e.message));
                    set_saving.set(false);
                }
            }
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
        let Some((id, name)) = delete_target.get_untracked() else {
            return;
        };
        set_delete_target.set(None);
        let api = auth.api();
        spawn_local(async move {
            match api.delete_field(id).await {
                Ok(()) => {
                    set_notice.set(Some((format!("已删除场地 {}", name), false)));
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
                    <h2 class="text-2xl font-bold">"场地管理"</h2>
                    <div class="flex items-center gap-2">
                        <select
                            class="select select-bordered select-sm"
                            on:change=move |ev| {
                                set_kind_filter.set(FieldKind::from_str(&event_target_value(&ev)))
                            }
                        >
                            <option value="" selected=move || kind_filter.get().is_none()>
                                "全部类型"
                            </option>
                            {FieldKind::ALL
                                .iter()
                                .map(|k| {
                                    let k = *k;
                                    view! {
                                        <option
                                            value=k.as_str()
                                            selected=move || kind_filter.get() == Some(k)
                                        >
                                            {k.label()}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                        <label class="input input-bordered input-sm flex items-center gap-2 w-56">
                            <Search attr:class="h-4 w-4 opacity-50" />
                            <input
                                type="text"
                                class="grow"
                                placeholder="搜索场地名"
                                on:input=move |ev| set_keyword.set(event_target_value(&ev))
                                prop:value=keyword
                            />
                        </label>
                        <button class="btn btn-ghost btn-sm gap-1" on:click=move |_| load()>
                            <RefreshCw attr:class="h-4 w-4" />
                            "刷新"
                        </button>
                        <button class="btn btn-primary btn-sm gap-1" on:click=open_create>
                            <Plus attr:class="h-4 w-4" />
                            "新增场地"
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
                                    <th>"名称"</th>
                                    <th>"所属场馆"</th>
                                    <th>"类型"</th>
                                    <th>"每小时单价"</th>
                                    <th>"状态"</th>
                                    <th class="text-right">"操作"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=filtered
                                    key=|f| f.id
                                    children=move |field: Field| {
                                        let id = field.id;
                                        let vid = field.venue_id;
                                        let name = field.name.clone();
                                        let delete_name = field.name.clone();
                                        let kind = field.kind;
                                        let active = field.is_active;
                                        let edit_field = field.clone();
                                        view! {
                                            <tr>
                                                <td class="font-medium">{name}</td>
                                                <td>
                                                    {move || {
                                                        venues.with(|vs| {
                                                            vs.iter()
                                                                .find(|v| v.id == vid)
                                                                .map(|v| v.name.clone())
                                                                .unwrap_or_else(|| format!("#{}", vid))
                                                        })
                                                    }}
                                                </td>
                                                <td>
                                                    <span class="badge badge-outline">{kind.label()}</span>
                                                </td>
                                                <td>{format_rupiah(field.price_per_hour)}</td>
                                                <td>
                                                    {if active {
                                                        view! {
                                                            <span class="badge badge-success">"开放中"</span>
                                                        }
                                                        .into_any()
                                                    } else {
                                                        view! {
                                                            <span class="badge badge-ghost">"已停用"</span>
                                                        }
                                                        .into_any()
                                                    }}
                                                </td>
                                                <td class="text-right">
                                                    <div class="flex justify-end gap-1">
                                                        <button
                                                            class="btn btn-ghost btn-xs gap-1"
                                                            on:click=move |_| {
                                                                form.load(&edit_field);
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
                                                            on:click=move |_| {
                                                                set_delete_target
                                                                    .set(Some((id, delete_name.clone())))
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
                        <Show when=move || filtered().is_empty()>
                            <div class="text-center py-10 text-base-content/50">
                                "没有匹配的场地"
                            </div>
                        </Show>
                    </div>
                </Show>

                <dialog class="modal" node_ref=form_dialog on:close=move |_| set_form_open.set(false)>
                    <div class="modal-box">
                        <h3 class="font-bold text-lg">
                            {move || {
                                if editing.get().is_some() { "编辑场地" } else { "新增场地" }
                            }}
                        </h3>
                        <div class="space-y-3 mt-3">
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"所属场馆"</span>
                                </label>
                                <select
                                    class="select select-bordered"
                                    on:change=move |ev| {
                                        form.venue_id
                                            .set(event_target_value(&ev).parse::<u64>().ok())
                                    }
                                >
                                    <option value="" selected=move || form.venue_id.get().is_none()>
                                        "选择场馆"
                                    </option>
                                    {move || {
                                        venues
                                            .get()
                                            .into_iter()
                                            .map(|v| {
                                                let vid = v.id;
                                                view! {
                                                    <option
                                                        value=vid.to_string()
                                                        selected=move || {
                                                            form.venue_id.get() == Some(vid)
                                                        }
                                                    >
                                                        {v.name.clone()}
                                                    </option>
                                                }
                                            })
                                            .collect_view()
                                    }}
                                </select>
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"场地名称"</span>
                                </label>
                                <input
                                    type="text"
                                    class="input input-bordered"
                                    on:input=move |ev| form.name.set(event_target_value(&ev))
                                    prop:value=form.name
                                />
                            </div>
                            <div class="grid grid-cols-2 gap-3">
                                <div class="form-control">
                                    <label class="label">
                                        <span class="label-text">"类型"</span>
                                    </label>
                                    <select
                                        class="select select-bordered"
                                        on:change=move |ev| {
                                            if let Some(k) = FieldKind::from_str(
                                                &event_target_value(&ev),
                                            ) {
                                                form.kind.set(k);
                                            }
                                        }
                                    >
                                        {FieldKind::ALL
                                            .iter()
                                            .map(|k| {
                                                let k = *k;
                                                view! {
                                                    <option
                                                        value=k.as_str()
                                                        selected=move || form.kind.get() == k
                                                    >
                                                        {k.label()}
                                                    </option>
                                                }
                                            })
                                            .collect_view()}
                                    </select>
                                </div>
                                <div class="form-control">
                                    <label class="label">
                                        <span class="label-text">"每小时单价"</span>
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
                            <label class="label cursor-pointer justify-start gap-3">
                                <input
                                    type="checkbox"
                                    class="toggle toggle-primary"
                                    on:change=move |ev| {
                                        form.is_active.set(event_target_checked(&ev))
                                    }
                                    prop:checked=form.is_active
                                />
                                <span class="label-text">"对用户开放"</span>
                            </label>
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

                <dialog
                    class="modal"
                    node_ref=delete_dialog
                    on:close=move |_| set_delete_target.set(None)
                >
                    <div class="modal-box">
                        <h3 class="font-bold text-lg">"删除场地"</h3>
                        <p class="py-3">
                            {move || {
                                delete_target
                                    .get()
                                    .map(|(_, name)| {
                                        format!("删除场地 {}？已有订单不受影响，排期会失效。", name)
                                    })
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
