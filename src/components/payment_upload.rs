use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::booking::pending::use_pending;
use crate::booking::proof::{ProofTarget, ProofUploadLogic, validate_proof_size};
use crate::components::icons::{ArrowLeft, ImageFrame, Upload};
use crate::components::layout::AppShell;
use crate::models::{Booking, format_datetime, format_rupiah};
use crate::web::UploadFile;
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;

/// 支付凭证上传页
///
/// 只有待支付的订单会停留在这里，其余状态一律跳回订单列表。
#[component]
pub fn PaymentUploadPage(code: String) -> impl IntoView {
    let auth = use_auth();
    let pending = use_pending();
    let navigate = use_navigate();

    let (booking, set_booking) = signal(Option::<Booking>::None);
    let (loading, set_loading) = signal(true);
    let (error, set_error) = signal(Option::<String>::None);
    // File 句柄不是 Send，只能放 local 信号
    let (file, set_file) = signal_local(Option::<UploadFile>::None);
    let (file_error, set_file_error) = signal(Option::<String>::None);
    let (submitting, set_submitting) = signal(false);

    {
        let code = code.clone();
        let navigate = navigate.clone();
        Effect::new(move |_| {
            let code = code.clone();
            let navigate = navigate.clone();
            let logic = ProofUploadLogic::new(auth.api());
            spawn_local(async move {
                match logic.load_booking(&code).await {
                    Ok(ProofTarget::Ready(b)) => {
                        set_booking.set(Some(b));
                        set_loading.set(false);
                    }
                    Ok(ProofTarget::Redirect(_)) => {
                        // 已提交或已完结的订单不再收凭证
                        navigate(AppRoute::MyBookings);
                    }
                    Err(e) => {
                        set_error.set(Some(e.message));
                        set_loading.set(false);
                    }
                }
            });
        });
    }

    let on_file_change = move |ev| {
        let input = event_target::<web_sys::HtmlInputElement>(&ev);
        let Some(picked) = input.files().and_then(|list| list.get(0)) else {
            return;
        };
        let candidate = UploadFile::Handle(picked);
        match validate_proof_size(&candidate) {
            Ok(()) => {
                set_file.set(Some(candidate));
                set_file_error.set(None);
            }
            Err(e) => {
                // 超限：提示并保留之前选好的文件
                set_file_error.set(Some(e.message));
                input.set_value("");
            }
        }
    };

    let submit = {
        let code = code.clone();
        let navigate = navigate.clone();
        move |_| {
            let Some(picked) = file.get_untracked() else {
                return;
            };
            let code = code.clone();
            let navigate = navigate.clone();
            let logic = ProofUploadLogic::new(auth.api());
            set_submitting.set(true);
            set_file_error.set(None);
            spawn_local(async move {
                match logic.upload(&code, picked).await {
                    Ok(()) => {
                        set_submitting.set(false);
                        pending.refresh(auth.api());
                        navigate(AppRoute::MyBookings);
                    }
                    Err(e) => {
                        // 失败保留已选文件，用户可直接重试
                        set_file_error.set(Some(e.message));
                        set_submitting.set(false);
                    }
                }
            });
        }
    };

    let back = {
        let navigate = navigate.clone();
        move |_| navigate(AppRoute::MyBookings)
    };

    view! {
        <AppShell>
            <div class="max-w-xl mx-auto space-y-6">
                <button class="btn btn-ghost btn-sm gap-1" on:click=back>
                    <ArrowLeft attr:class="h-4 w-4" />
                    "返回我的订单"
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
                    booking.get().map(|b| {
                        let expires = b.expired_at.as_deref().map(format_datetime);
                        view! {
                            <div class="card bg-base-100 shadow-xl">
                                <div class="card-body space-y-2">
                                    <h2 class="card-title">"上传支付凭证"</h2>
                                    <div class="flex items-center justify-between">
                                        <span class="font-mono">{b.booking_code.clone()}</span>
                                        <span class="text-xl font-bold text-primary">
                                            {format_rupiah(b.total_amount)}
                                        </span>
                                    </div>
                                    {expires.map(|e| view! {
                                        <p class="text-sm text-warning">
                                            {format!("请在 {} 前完成支付，逾期订单自动取消", e)}
                                        </p>
                                    })}
                                    <p class="text-sm text-base-content/60">
                                        "线下转账后上传凭证截图，管理员确认后订单生效。"
                                    </p>

                                    <div class="form-control mt-2">
                                        <label class="label" for="payment-proof">
                                            <span class="label-text">"凭证图片（最大 2MB）"</span>
                                        </label>
                                        <input
                                            id="payment-proof"
                                            type="file"
                                            accept="image/*"
                                            class="file-input file-input-bordered w-full"
                                            on:change=on_file_change
                                        />
                                    </div>

                                    {move || {
                                        file.get().map(|f| view! {
                                            <p class="flex items-center gap-2 text-sm text-base-content/70">
                                                <ImageFrame attr:class="h-4 w-4 shrink-0" />
                                                {f.name()}
                                            </p>
                                        })
                                    }}

                                    <Show when=move || file_error.get().is_some()>
                                        <p class="text-sm text-error">
                                            {move || file_error.get().unwrap_or_default()}
                                        </p>
                                    </Show>

                                    <div class="card-actions justify-end mt-2">
                                        <button
                                            class="btn btn-primary gap-1"
                                            disabled=move || {
                                                file.with(|f| f.is_none()) || submitting.get()
                                            }
                                            on:click=submit.clone()
                                        >
                                            <Show
                                                when=move || submitting.get()
                                                fallback=|| view! {
                                                    <Upload attr:class="h-4 w-4" />
                                                    "提交凭证"
                                                }
                                            >
                                                <span class="loading loading-spinner loading-sm"></span>
                                                "上传中..."
                                            </Show>
                                        </button>
                                    </div>
                                </div>
                            </div>
                        }
                    })
                }}
            </div>
        </AppShell>
    }
}
