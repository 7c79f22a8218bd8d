use crate::auth::use_auth;
use crate::components::icons::{ArrowLeft, Clock, MapPin};
use crate::components::layout::AppShell;
use crate::error::ApiErrorKind;
use crate::models::{Venue, format_rupiah};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 场馆详情：展示场馆信息与场地列表，点击营业中的场地进入时段页
#[component]
pub fn VenueDetailPage(id: u64) -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    let (venue, set_venue) = signal(Option::<Venue>::None);
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);

    Effect::new(move |_| {
        let api = auth.api();
        spawn_local(async move {
            match api.venue(id).await {
                Ok(data) => set_venue.set(Some(data)),
                Err(e) if e.kind == ApiErrorKind::NotFound => {
                    set_error.set(Some("场馆不存在或已下架".to_string()));
                }
                Err(e) => set_error.set(Some(format!("加载场馆失败: {}", e.message))),
            }
            set_loading.set(false);
        });
    });

    let back = {
        let navigate = navigate.clone();
        move |_| navigate(AppRoute::Home)
    };

    view! {
        <AppShell>
            <div class="space-y-6">
                <button class="btn btn-ghost btn-sm gap-1" on:click=back>
                    <ArrowLeft attr:class="h-4 w-4" />
                    "返回场馆列表"
                </button>

                <Show when=move || loading.get()>
                    <div class="flex justify-center py-16">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                </Show>

                <Show when=move || error.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || error.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                {move || {
                    venue.get().map(|v| {
                        let fields = v.fields.clone();
                        view! {
                            <div class="card bg-base-100 shadow-xl">
                                <div class="card-body">
                                    <h2 class="card-title text-2xl">{v.name.clone()}</h2>
                                    <p class="flex items-center gap-2 text-base-content/70">
                                        <MapPin attr:class="h-4 w-4 shrink-0" />
                                        {v.address.clone()}
                                    </p>
                                    <p class="flex items-center gap-2 text-base-content/70">
                                        <Clock attr:class="h-4 w-4 shrink-0" />
                                        "营业时间 " {v.open_time.clone()} " - " {v.close_time.clone()}
                                    </p>
                                    <Show when={
                                        let desc = v.description.clone();
                                        move || !desc.is_empty()
                                    }>
                                        <p class="text-sm text-base-content/60 whitespace-pre-line">
                                            {v.description.clone()}
                                        </p>
                                    </Show>
                                </div>
                            </div>

                            <h3 class="text-xl font-bold mt-2">"场地"</h3>

                            <Show
                                when={
                                    let empty = fields.is_empty();
                                    move || !empty
                                }
                                fallback=|| view! {
                                    <div class="text-center py-10 text-base-content/50">
                                        "该场馆暂无开放的场地"
                                    </div>
                                }
                            >
                                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                                    <For
                                        each={
                                            let fields = fields.clone();
                                            move || fields.clone()
                                        }
                                        key=|f| f.id
                                        children=move |field| {
                                            let navigate = use_navigate();
                                            let field_id = field.id;
                                            let active = field.is_active;
                                            view! {
                                                <div class="card bg-base-100 shadow">
                                                    <div class="card-body">
                                                        <div class="flex items-center justify-between">
                                                            <h4 class="card-title text-lg">{field.name.clone()}</h4>
                                                            <span class="badge badge-outline">{field.kind.label()}</span>
                                                        </div>
                                                        <p class="text-primary font-semibold">
                                                            {format_rupiah(field.price_per_hour)} " / 小时"
                                                        </p>
                                                        <div class="card-actions justify-end">
                                                            {if active {
                                                                view! {
                                                                    <button
                                                                        class="btn btn-primary btn-sm"
                                                                        on:click=move |_| navigate(AppRoute::FieldSchedule(field_id))
                                                                    >
                                                                        "选择时段"
                                                                    </button>
                                                                }
                                                                .into_any()
                                                            } else {
                                                                view! {
                                                                    <span class="badge badge-ghost">"暂停开放"</span>
                                                                }
                                                                .into_any()
                                                            }}
                                                        </div>
                                                    </div>
                                                </div>
                                            }
                                        }
                                    />
                                </div>
                            </Show>
                        }
                    })
                }}
            </div>
        </AppShell>
    }
}
