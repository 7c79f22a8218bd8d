use crate::auth::{register, use_auth};
use crate::components::icons::CalendarDays;
use crate::error::ApiError;
use crate::models::RegisterRequest;
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    let (name, set_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error, set_error) = signal(Option::<ApiError>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if password.get() != confirm.get() {
            set_error.set(Some(ApiError::validation("两次输入的密码不一致")));
            return;
        }

        set_is_submitting.set(true);
        set_error.set(None);

        let navigate = navigate.clone();
        spawn_local(async move {
            let payload = RegisterRequest {
                name: name.get().trim().to_string(),
                email: email.get().trim().to_string(),
                password: password.get(),
                password_confirmation: confirm.get(),
            };
            let result = register(&auth, &payload).await;
            set_is_submitting.set(false);
            match result {
                // 注册不建立会话，引导去登录页
                Ok(_) => navigate(AppRoute::Login),
                Err(e) => set_error.set(Some(e)),
            }
        });
    };

    let field_error = move |field: &'static str| {
        error
            .get()
            .and_then(|e| e.field_message(field).map(String::from))
    };

    let text_input = move |id: &'static str,
                           label: &'static str,
                           kind: &'static str,
                           value: ReadSignal<String>,
                           setter: WriteSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    on:input=move |ev| setter.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                    required
                />
                <Show when=move || field_error(id).is_some()>
                    <label class="label">
                        <span class="label-text-alt text-error">
                            {move || field_error(id).unwrap_or_default()}
                        </span>
                    </label>
                </Show>
            </div>
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <CalendarDays attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"注册账号"</h1>
                        <p class="text-base-content/70">"注册完成后使用邮箱登录"</p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error.get().map(|e| e.message).unwrap_or_default()}</span>
                            </div>
                        </Show>

                        {text_input("name", "姓名", "text", name, set_name)}
                        {text_input("email", "邮箱", "email", email, set_email)}
                        {text_input("password", "密码", "password", password, set_password)}
                        {text_input("password_confirmation", "确认密码", "password", confirm, set_confirm)}

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "提交中..." }.into_any()
                                } else {
                                    "注册".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm text-base-content/70 mt-2">
                            "已有账号？"
                            <a class="link link-primary" on:click={
                                let navigate = use_navigate();
                                move |_| navigate(AppRoute::Login)
                            }>
                                "去登录"
                            </a>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
