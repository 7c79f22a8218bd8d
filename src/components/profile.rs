use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{update_profile, use_auth};
use crate::components::icons::UserRound;
use crate::components::layout::{AppShell, Toast};
use crate::error::ApiError;
use crate::models::UpdateProfileRequest;

/// 个人资料页：改名字和邮箱
#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let current = auth.user_signal();

    // 守卫保证进到这里时用户信息已就位
    let initial = current.get_untracked();
    let (name, set_name) = signal(
        initial
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_default(),
    );
    let (email, set_email) = signal(
        initial
            .as_ref()
            .map(|u| u.email.clone())
            .unwrap_or_default(),
    );
    let (saving, set_saving) = signal(false);
    let (error, set_error) = signal(Option::<ApiError>::None);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let field_error = move |field: &'static str| {
        error.with(|e| {
            e.as_ref()
                .and_then(|err| err.field_message(field))
                .map(str::to_string)
        })
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let payload = UpdateProfileRequest {
            name: name.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
        };
        if payload.name.is_empty() || payload.email.is_empty() {
            set_error.set(Some(ApiError::validation("姓名和邮箱不能为空")));
            return;
        }
        set_saving.set(true);
        set_error.set(None);
        spawn_local(async move {
            match update_profile(&auth, &payload).await {
                Ok(_) => set_notice.set(Some(("资料已更新".to_string(), false))),
                Err(e) => set_error.set(Some(e)),
            }
            set_saving.set(false);
        });
    };

    view! {
        <AppShell>
            <Toast notice=notice set_notice=set_notice />
            <div class="max-w-md mx-auto">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h2 class="card-title gap-2">
                            <UserRound attr:class="h-5 w-5" />
                            "个人资料"
                        </h2>
                        <p class="text-sm text-base-content/60">
                            {move || {
                                current
                                    .get()
                                    .map(|u| format!("当前角色：{}", u.role.label()))
                            }}
                        </p>

                        <form class="space-y-3 mt-2" on:submit=on_submit>
                            <div class="form-control">
                                <label class="label" for="name">
                                    <span class="label-text">"姓名"</span>
                                </label>
                                <input
                                    id="name"
                                    type="text"
                                    class="input input-bordered"
                                    on:input=move |ev| set_name.set(event_target_value(&ev))
                                    prop:value=name
                                />
                                <Show when=move || field_error("name").is_some()>
                                    <span class="label-text-alt text-error mt-1">
                                        {move || field_error("name").unwrap_or_default()}
                                    </span>
                                </Show>
                            </div>

                            <div class="form-control">
                                <label class="label" for="email">
                                    <span class="label-text">"邮箱"</span>
                                </label>
                                <input
                                    id="email"
                                    type="email"
                                    class="input input-bordered"
                                    on:input=move |ev| set_email.set(event_target_value(&ev))
                                    prop:value=email
                                />
                                <Show when=move || field_error("email").is_some()>
                                    <span class="label-text-alt text-error mt-1">
                                        {move || field_error("email").unwrap_or_default()}
                                    </span>
                                </Show>
                            </div>

                            <Show when=move || {
                                error.with(|e| {
                                    e.as_ref()
                                        .is_some_and(|err| err.field_errors().is_empty())
                                })
                            }>
                                <div role="alert" class="alert alert-error">
                                    <span>
                                        {move || {
                                            error
                                                .with(|e| e.as_ref().map(|err| err.message.clone()))
                                                .unwrap_or_default()
                                        }}
                                    </span>
                                </div>
                            </Show>

                            <div class="card-actions justify-end">
                                <button
                                    type="submit"
                                    class="btn btn-primary"
                                    disabled=move || saving.get()
                                >
                                    <Show
                                        when=move || saving.get()
                                        fallback=|| view! { "保存" }
                                    >
                                        <span class="loading loading-spinner loading-sm"></span>
                                        "保存中..."
                                    </Show>
                                </button>
                            </div>
                        </form>
                    </div>
                </div>
            </div>
        </AppShell>
    }
}
