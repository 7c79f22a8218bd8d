//! 定时器封装模块
//!
//! `setInterval` 的 RAII 封装，给待支付角标这类轮询用。
//! 句柄随视图一起 drop，轮询自动停止，不会在页面切走后继续打接口。

use wasm_bindgen::prelude::*;

/// 周期性定时器
///
/// Drop 时自动 clearInterval。
pub struct Interval {
    handle: i32,
    #[allow(dead_code)]
    closure: Closure<dyn Fn()>,
}

impl Interval {
    /// # 参数
    /// - `millis`: 间隔时间（毫秒）
    /// - `callback`: 每次触发的回调
    ///
    /// # Panics
    /// 无法获取 window 对象或设置定时器失败时
    pub fn new<F>(millis: u32, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        let closure = Closure::new(callback);
        let window = web_sys::window().expect("无法获取 window 对象");

        let handle = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                millis as i32,
            )
            .expect("设置定时器失败");

        Self { handle, closure }
    }

    pub fn cancel(&self) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(self.handle);
        }
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.cancel();
    }
}
