use crate::auth::{login, use_auth};
use crate::components::icons::CalendarDays;
use crate::error::ApiError;
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error, set_error) = signal(Option::<ApiError>::None);

    // 登录成功后不在这里跳转：
    // 路由守卫监听到会话建立，会按角色（或记住的来路）自动重定向
    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if email.get().trim().is_empty() || password.get().is_empty() {
            set_error.set(Some(ApiError::validation("请填写邮箱和密码")));
            return;
        }

        set_is_submitting.set(true);
        set_error.set(None);

        spawn_local(async move {
            if let Err(e) = login(&auth, email.get().trim(), &password.get()).await {
                set_error.set(Some(e));
            }
            set_is_submitting.set(false);
        });
    };

    let field_error = move |field: &'static str| {
        error
            .get()
            .and_then(|e| e.field_message(field).map(String::from))
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <CalendarDays attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold">"CourtSide 订场"</h1>
                        <p class="text-base-content/70">"登录后即可预订场地"</p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error.get().map(|e| e.message).unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"邮箱"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                placeholder="budi@mail.com"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                            <Show when=move || field_error("email").is_some()>
                                <label class="label">
                                    <span class="label-text-alt text-error">
                                        {move || field_error("email").unwrap_or_default()}
                                    </span>
                                </label>
                            </Show>
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"密码"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                placeholder="••••••••"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                            <Show when=move || field_error("password").is_some()>
                                <label class="label">
                                    <span class="label-text-alt text-error">
                                        {move || field_error("password").unwrap_or_default()}
                                    </span>
                                </label>
                            </Show>
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "登录中..." }.into_any()
                                } else {
                                    "登录".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm text-base-content/70 mt-2">
                            "还没有账号？"
                            <a class="link link-primary" on:click={
                                let navigate = use_navigate();
                                move |_| navigate(AppRoute::Register)
                            }>
                                "去注册"
                            </a>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
