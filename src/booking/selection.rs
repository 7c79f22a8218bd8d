//! 时段勾选与结算模块
//!
//! 订场页的核心状态机：按天加载时段列表，勾选/取消勾选，
//! 合计金额，最后生成结算请求体。全部是纯逻辑，信号和视图在组件层。
//!
//! 规则：
//! - 只有 `available` 状态的时段可以勾选；
//! - 选的是今天时，开始小时已过（含当前小时）的时段不可勾选；
//! - 已勾选的时段永远可以取消，即使它在等待期间变成了"过去"；
//! - 换日期清空勾选，结算成功也清空。

use chrono::NaiveDate;

use crate::models::{CreateBookingRequest, Slot, SlotRef};
use crate::web::date;

/// 勾选判定需要的"现在"：今天的日期 + 当前小时
///
/// 作为参数传入而不是内部取时钟，逻辑才可测。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayContext {
    pub today: NaiveDate,
    pub current_hour: u32,
}

impl DayContext {
    /// 用户本地时区的此刻
    pub fn now() -> Self {
        Self {
            today: date::today(),
            current_hour: date::current_hour(),
        }
    }
}

/// 一次 toggle 的结果，组件据此决定是否提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// 时段已开始或日期已过
    RejectedPast,
    /// 后端标记为不可订（已被订走等）
    RejectedUnavailable,
}

/// 按时段开始小时分桶的视图过滤器
///
/// 只影响列表显示，不碰已勾选集合：
/// 切到"上午"时，已勾选的晚间时段仍然保持勾选。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    #[default]
    All,
    /// < 12 点
    Morning,
    /// 12 - 17 点
    Afternoon,
    /// >= 18 点
    Night,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 4] = [
        TimeFilter::All,
        TimeFilter::Morning,
        TimeFilter::Afternoon,
        TimeFilter::Night,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::All => "全部",
            TimeFilter::Morning => "上午",
            TimeFilter::Afternoon => "下午",
            TimeFilter::Night => "晚间",
        }
    }

    /// 该时段是否落在当前分桶
    ///
    /// 开始时间解析不出来的时段只在"全部"里出现。
    pub fn matches(&self, slot: &Slot) -> bool {
        if matches!(self, TimeFilter::All) {
            return true;
        }
        let Some(h) = slot.start_hour() else {
            return false;
        };
        match self {
            TimeFilter::All => true,
            TimeFilter::Morning => h < 12,
            TimeFilter::Afternoon => (12..18).contains(&h),
            TimeFilter::Night => h >= 18,
        }
    }
}

/// 单日的勾选集合
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSelection {
    date: NaiveDate,
    selected: Vec<Slot>,
}

impl SlotSelection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            selected: Vec::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// 已勾选的时段，按开始时间排好序
    pub fn selected(&self) -> &[Slot] {
        &self.selected
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, slot_id: u64) -> bool {
        self.selected.iter().any(|s| s.id == slot_id)
    }

    /// 该时段对当前选择日期而言是否已成过去
    pub fn is_past(&self, slot: &Slot, ctx: &DayContext) -> bool {
        if self.date < ctx.today {
            return true;
        }
        if self.date > ctx.today {
            return false;
        }
        // 今天：按小时粒度判断，当前小时内的时段视为已开始
        slot.start_hour()
            .is_some_and(|h| h <= ctx.current_hour)
    }

    /// 该时段此刻能不能点（已勾选的永远能点，点了就是取消）
    pub fn is_selectable(&self, slot: &Slot, ctx: &DayContext) -> bool {
        self.is_selected(slot.id) || (slot.status.is_available() && !self.is_past(slot, ctx))
    }

    /// 勾选/取消勾选
    ///
    /// 同一时段连续 toggle 两次回到原状。
    pub fn toggle(&mut self, slot: &Slot, ctx: &DayContext) -> ToggleOutcome {
        if let Some(pos) = self.selected.iter().position(|s| s.id == slot.id) {
            self.selected.remove(pos);
            return ToggleOutcome::Removed;
        }
        if !slot.status.is_available() {
            return ToggleOutcome::RejectedUnavailable;
        }
        if self.is_past(slot, ctx) {
            return ToggleOutcome::RejectedPast;
        }
        self.selected.push(slot.clone());
        self.selected.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        ToggleOutcome::Added
    }

    /// 重新拉取时段后的对账：把最新列表里已不可订的时段从勾选中剔除
    ///
    /// 返回剔除数量，组件据此提示"有时段被抢订"。
    /// 列表里找不到的时段同样剔除（排期被管理员删掉）。
    pub fn retain_available(&mut self, slots: &[Slot]) -> usize {
        let before = self.selected.len();
        self.selected.retain(|picked| {
            slots
                .iter()
                .any(|s| s.id == picked.id && s.status.is_available())
        });
        before - self.selected.len()
    }

    /// 切换日期，不同的日期会清空勾选
    pub fn set_date(&mut self, date: NaiveDate) {
        if self.date != date {
            self.date = date;
            self.selected.clear();
        }
    }

    /// 结算成功后清空
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// 合计 = 勾选数量 x 场地每小时单价
    pub fn total(&self, price_per_hour: i64) -> i64 {
        self.selected.len() as i64 * price_per_hour
    }

    /// 生成结算请求体，空勾选返回 None
    pub fn to_request(&self, field_id: u64) -> Option<CreateBookingRequest> {
        if self.selected.is_empty() {
            return None;
        }
        Some(CreateBookingRequest {
            field_id,
            slots: self
                .selected
                .iter()
                .map(|s| SlotRef {
                    id: s.id,
                    start_time: s.start_time.clone(),
                    end_time: s.end_time.clone(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests;
