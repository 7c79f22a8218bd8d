use chrono::NaiveTime;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::{Building2, Pencil, Plus, RefreshCw, Search, Trash2};
use crate::components::layout::{AppShell, Toast};
use crate::filters::filter_venues;
use crate::models::{Venue, VenuePayload};

/// 场馆表单的信号集合，新增和编辑共用一个对话框
#[derive(Clone, Copy)]
struct VenueForm {
    name: RwSignal<String>,
    address: RwSignal<String>,
    description: RwSignal<String>,
    open_time: RwSignal<String>,
    close_time: RwSignal<String>,
    image: RwSignal<String>,
}

impl VenueForm {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            address: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            open_time: RwSignal::new("08:00".to_string()),
            close_time: RwSignal::new("22:00".to_string()),
            image: RwSignal::new(String::new()),
        }
    }

    fn reset(&self) {
        self.name.set(String::new());
        self.address.set(String::new());
        self.description.set(String::new());
        self.open_time.set("08:00".to_string());
        self.close_time.set("22:00".to_string());
        self.image.set(String::new());
    }

    fn load(&self, venue: &Venue) {
        self.name.set(venue.name.clone());
        self.address.set(venue.address.clone());
        self.description.set(venue.description.clone());
        self.open_time.set(venue.open_time.clone());
        self.close_time.set(venue.close_time.clone());
        self.image.set(venue.image.clone().unwrap_or_default());
    }

    /// 客户端校验后生成请求体
    fn to_payload(&self) -> Result<VenuePayload, String> {
        let name = self.name.get_untracked().trim().to_string();
        let address = self.address.get_untracked().trim().to_string();
        let description = self.description.get_untracked().trim().to_string();
        let open_time = self.open_time.get_untracked().trim().to_string();
        let close_time = self.close_time.get_untracked().trim().to_string();

        if name.is_empty() || address.is_empty() || description.is_empty() {
            return Err("名称、地址和描述都不能为空".to_string());
        }
        if NaiveTime::parse_from_str(&open_time, "%H:%M").is_err()
            || NaiveTime::parse_from_str(&close_time, "%H:%M").is_err()
        {
            return Err("营业时间格式应为 HH:mm".to_string());
        }
        if close_time <= open_time {
            return Err("结束时间要晚于开始时间".to_string());
        }

        let image = self.image.get_untracked().trim().to_string();
        Ok(VenuePayload {
            name,
            address,
            description,
            open_time,
            close_time,
            image: (!image.is_empty()).then_some(image),
        })
    }
}

/// 管理端场馆页：列表 + 新增/编辑/删除
#[component]
pub fn AdminVenuesPage() -> impl IntoView {
    let auth = use_auth();

    let (venues, set_venues) = signal(Vec::<Venue>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);
    let (keyword, set_keyword) = signal(String::new());

    let load = move || {
        let api = auth.api();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match api.admin_venues().await {
                Ok(data) => set_venues.set(data),
                Err(e) => set_error.set(Some(format!("加载场馆失败: {}", e.message))),
            }
            set_loading.set(false);
        });
    };

    Effect::new(move |_| load());

    let filtered = move || {
        venues.with(|list| {
            filter_venues(list, &keyword.get())
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    // ---- 新增/编辑对话框 ----
    let form = VenueForm::new();
    let form_dialog = NodeRef::<leptos::html::Dialog>::new();
    let (form_open, set_form_open) = signal(false);
    // None = 新增，Some(id) = 编辑
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
                Some(id) => (api.update_venue(id, &payload).await.map(|_| ()), "场馆已更新"),
                None => (api.create_venue(&payload).await.map(|_| ()), "场馆已创建"),
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
            match api.delete_venue(id).await {
                Ok(()) => {
                    set_notice.set(Some((format!("已删除场馆 {}", name), false)));
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
                        <Building2 attr:class="h-6 w-6" />
                        "场馆管理"
                    </h2>
                    <div class="flex items-center gap-2">
                        <label class="input input-bordered input-sm flex items-center gap-2 w-64">
                            <Search attr:class="h-4 w-4 opacity-50" />
                            <input
                                type="text"
                                class="grow"
                                placeholder="搜索名称或地址"
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
                            "新增场馆"
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
                                    <th>"地址"</th>
                                    <th>"营业时间"</th>
                                    <th>"场地数"</th>
                                    <th class="text-right">"操作"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=filtered
                                    key=|v| v.id
                                    children=move |venue: Venue| {
                                        let id = venue.id;
                                        let name = venue.name.clone();
                                        let delete_name = venue.name.clone();
                                        let address = venue.address.clone();
                                        let hours = format!("{} - {}", venue.open_time, venue.close_time);
                                        let field_count = venue.fields.len();
                                        let edit_venue = venue.clone();
                                        view! {
                                            <tr>
                                                <td class="font-medium">{name}</td>
                                                <td>{address}</td>
                                                <td>{hours}</td>
                                                <td>{field_count}</td>
                                                <td class="text-right">
                                                    <div class="flex justify-end gap-1">
                                                        <button
                                                            class="btn btn-ghost btn-xs gap-1"
                                                            on:click=move |_| {
                                                                form.load(&edit_venue);
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
                                "没有匹配的场馆"
                            </div>
                        </Show>
                    </div>
                </Show>

                <dialog class="modal" node_ref=form_dialog on:close=move |_| set_form_open.set(false)>
                    <div class="modal-box">
                        <h3 class="font-bold text-lg">
                            {move || {
                                if editing.get().is_some() { "编辑场馆" } else { "新增场馆" }
                            }}
                        </h3>
                        <div class="space-y-3 mt-3">
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"名称"</span>
                                </label>
                                <input
                                    type="text"
                                    class="input input-bordered"
                                    on:input=move |ev| form.name.set(event_target_value(&ev))
                                    prop:value=form.name
                                />
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"地址"</span>
                                </label>
                                <input
                                    type="text"
                                    class="input input-bordered"
                                    on:input=move |ev| form.address.set(event_target_value(&ev))
                                    prop:value=form.address
                                />
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"描述"</span>
                                </label>
                                <textarea
                                    class="textarea textarea-bordered"
                                    rows="3"
                                    on:input=move |ev| form.description.set(event_target_value(&ev))
                                    prop:value=form.description
                                ></textarea>
                            </div>
                            <div class="grid grid-cols-2 gap-3">
                                <div class="form-control">
                                    <label class="label">
                                        <span class="label-text">"开门时间"</span>
                                    </label>
                                    <input
                                        type="time"
                                        class="input input-bordered"
                                        on:input=move |ev| form.open_time.set(event_target_value(&ev))
                                        prop:value=form.open_time
                                    />
                                </div>
                                <div class="form-control">
                                    <label class="label">
                                        <span class="label-text">"关门时间"</span>
                                    </label>
                                    <input
                                        type="time"
                                        class="input input-bordered"
                                        on:input=move |ev| form.close_time.set(event_target_value(&ev))
                                        prop:value=form.close_time
                                    />
                                </div>
                            </div>
                            <div class="form-control">
                                <label class="label">
                                    <span class="label-text">"封面图 URL（可选）"</span>
                                </label>
                                <input
                                    type="text"
                                    class="input input-bordered"
                                    on:input=move |ev| form.image.set(event_target_value(&ev))
                                    prop:value=form.image
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

                <dialog
                    class="modal"
                    node_ref=delete_dialog
                    on:close=move |_| set_delete_target.set(None)
                >
                    <div class="modal-box">
                        <h3 class="font-bold text-lg">"删除场馆"</h3>
                        <p class="py-3">
                            {move || {
                                delete_target
                                    .get()
                                    .map(|(_, name)| {
                                        format!("删除场馆 {}？其下的场地和排期都会失效。", name)
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
