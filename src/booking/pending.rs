//! 待办订单计数模块
//!
//! 导航栏角标显示当前用户还有几笔未完结（待支付/待确认）的订单。
//! 尽力而为的提示值：刷新失败直接归零，绝不弹错误打断用户。

use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiClient;
use crate::models::Booking;
use crate::web::BrowserHttpClient;

/// 未完结订单数
pub fn count_outstanding(bookings: &[Booking]) -> usize {
    bookings
        .iter()
        .filter(|b| b.payment_status.is_outstanding())
        .count()
}

/// 后台刷新的序号闸门
///
/// 角标会被轮询、登录、下单、传凭证多处触发刷新，
/// 响应乱序到达时只认最后发出的那一次。
#[derive(Debug, Default)]
pub struct SequenceGate {
    issued: u64,
}

impl SequenceGate {
    /// 登记一次新请求，返回它的序号
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// 该序号的响应是否还值得应用
    pub fn is_current(&self, seq: u64) -> bool {
        self.issued == seq
    }
}

// =========================================================
// 浏览器绑定层
// =========================================================

/// 角标上下文
///
/// 包含计数信号与刷新序号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct PendingContext {
    count: RwSignal<usize>,
    gate: StoredValue<SequenceGate>,
}

impl Default for PendingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingContext {
    pub fn new() -> Self {
        Self {
            count: RwSignal::new(0),
            gate: StoredValue::new(SequenceGate::default()),
        }
    }

    /// 角标计数（响应式）
    pub fn count(&self) -> RwSignal<usize> {
        self.count
    }

    /// 后台拉一次我的订单并更新计数
    ///
    /// 失败归零；过期响应被序号闸门丢弃。
    pub fn refresh(&self, api: ApiClient<BrowserHttpClient>) {
        let this = *self;
        let seq = self
            .gate
            .try_update_value(|g| g.begin())
            .expect("gate should not be disposed");
        spawn_local(async move {
            let count = match api.my_bookings().await {
                Ok(bookings) => count_outstanding(&bookings),
                Err(e) => {
                    warn!("[Pending] Badge refresh failed: {}", e);
                    0
                }
            };
            if this.gate.with_value(|g| g.is_current(seq)) {
                this.count.set(count);
            }
        });
    }

    /// 页面手头已有一份最新订单列表时直接套用，省一次请求
    pub fn apply_snapshot(&self, bookings: &[Booking]) {
        self.gate.update_value(|g| {
            g.begin();
        });
        self.count.set(count_outstanding(bookings));
    }

    /// 登出或会话失效时清零
    pub fn reset(&self) {
        self.gate.update_value(|g| {
            g.begin();
        });
        self.count.set(0);
    }
}

/// 从 Context 获取角标上下文
pub fn use_pending() -> PendingContext {
    use_context::<PendingContext>().expect("PendingContext should be provided")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentStatus, User};

    fn booking(code: &str, status: PaymentStatus) -> Booking {
        Booking {
            id: 0,
            booking_code: code.to_string(),
            user: Some(User {
                id: 1,
                name: "Budi".to_string(),
                email: "budi@mail.com".to_string(),
                role: Default::default(),
            }),
            items: vec![],
            total_amount: 100_000,
            payment_status: status,
            payment_proof: None,
            expired_at: None,
            created_at: None,
        }
    }

    #[test]
    fn test_count_outstanding_mixed_statuses() {
        let bookings = vec![
            booking("BK-1", PaymentStatus::Unpaid),
            booking("BK-2", PaymentStatus::Pending),
            booking("BK-3", PaymentStatus::Paid),
            booking("BK-4", PaymentStatus::Cancelled),
            booking("BK-5", PaymentStatus::Expired),
        ];
        assert_eq!(count_outstanding(&bookings), 2);
    }

    #[test]
    fn test_count_outstanding_empty() {
        assert_eq!(count_outstanding(&[]), 0);
    }

    #[test]
    fn test_sequence_gate_keeps_only_latest() {
        let mut gate = SequenceGate::default();
        let first = gate.begin();
        let second = gate.begin();

        // 先发的请求后返回，丢弃
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }
}
