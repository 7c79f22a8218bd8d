use crate::auth::use_auth;
use crate::components::icons::{Clock, MapPin, RefreshCw, Search};
use crate::components::layout::AppShell;
use crate::filters::filter_venues;
use crate::models::Venue;
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 首页：场馆列表，游客可浏览
#[component]
pub fn VenuesPage() -> impl IntoView {
    let auth = use_auth();

    let (venues, set_venues) = signal(Vec::<Venue>::new());
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);
    let (keyword, set_keyword) = signal(String::new());

    let load = move || {
        let api = auth.api();
        set_loading.set(true);
        set_error.set(None);
        spawn_local(async move {
            match api.venues().await {
                Ok(data) => set_venues.set(data),
                Err(e) => set_error.set(Some(format!("加载场馆失败: {}", e.message))),
            }
            set_loading.set(false);
        });
    };

    // 初始加载
    Effect::new(move |_| load());

    let filtered = move || {
        venues.with(|list| {
            filter_venues(list, &keyword.get())
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <AppShell>
            <div class="space-y-6">
                <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
                    <div>
                        <h2 class="text-2xl font-bold">"找个场地"</h2>
                        <p class="text-base-content/70">"挑选场馆，按天预订时段"</p>
                    </div>
                    <label class="input input-bordered flex items-center gap-2 md:w-80">
                        <Search attr:class="h-4 w-4 opacity-50" />
                        <input
                            type="text"
                            class="grow"
                            placeholder="搜索场馆名或地址"
                            on:input=move |ev| set_keyword.set(event_target_value(&ev))
                            prop:value=keyword
                        />
                    </label>
                </div>

                <Show when=move || error.get().is_some()>
                    <div role="alert" class="alert alert-error">
                        <span>{move || error.get().unwrap_or_default()}</span>
                        <button class="btn btn-sm btn-ghost gap-1" on:click=move |_| load()>
                            <RefreshCw attr:class="h-4 w-4" />
                            "重试"
                        </button>
                    </div>
                </Show>

                <Show when=move || loading.get()>
                    <div class="flex justify-center py-16">
                        <span class="loading loading-spinner loading-lg text-primary"></span>
                    </div>
                </Show>

                <Show when=move || !loading.get() && error.get().is_none() && filtered().is_empty()>
                    <div class="text-center py-16 text-base-content/50">
                        "没有匹配的场馆"
                    </div>
                </Show>

                <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6">
                    <For
                        each=filtered
                        key=|v| v.id
                        children=move |venue| {
                            let navigate = use_navigate();
                            let id = venue.id;
                            let field_count = venue.fields.len();
                            view! {
                                <div class="card bg-base-100 shadow-xl">
                                    <figure class="h-40 bg-base-300">
                                        {match venue.image.clone() {
                                            Some(url) => view! {
                                                <img src=url alt=venue.name.clone() class="object-cover w-full h-full" />
                                            }
                                            .into_any(),
                                            None => view! {
                                                <div class="flex items-center justify-center w-full h-full text-base-content/30">
                                                    <MapPin attr:class="h-10 w-10" />
                                                </div>
                                            }
                                            .into_any(),
                                        }}
                                    </figure>
                                    <div class="card-body">
                                        <h3 class="card-title">{venue.name.clone()}</h3>
                                        <p class="flex items-center gap-2 text-sm text-base-content/70">
                                            <MapPin attr:class="h-4 w-4 shrink-0" />
                                            {venue.address.clone()}
                                        </p>
                                        <p class="flex items-center gap-2 text-sm text-base-content/70">
                                            <Clock attr:class="h-4 w-4 shrink-0" />
                                            {venue.open_time.clone()} " - " {venue.close_time.clone()}
                                        </p>
                                        <div class="card-actions justify-between items-center mt-2">
                                            <span class="badge badge-ghost">
                                                {field_count} " 块场地"
                                            </span>
                                            <button
                                                class="btn btn-primary btn-sm"
                                                on:click=move |_| navigate(AppRoute::VenueDetail(id))
                                            >
                                                "查看场地"
                                            </button>
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
