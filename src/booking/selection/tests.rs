use super::*;
use crate::models::SlotStatus;

// =========================================================
// 辅助函数
// =========================================================

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn slot(id: u64, start: &str, end: &str, status: SlotStatus) -> Slot {
    Slot {
        id,
        field_id: 1,
        date: None,
        start_time: start.to_string(),
        end_time: end.to_string(),
        status,
        price: 100_000,
    }
}

/// 固定在 2026-01-10 下午两点
fn ctx() -> DayContext {
    DayContext {
        today: d(2026, 1, 10),
        current_hour: 14,
    }
}

// =========================================================
// toggle 测试
// =========================================================

#[test]
fn test_toggle_adds_available_slot() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    let s = slot(1, "09:00", "10:00", SlotStatus::Available);

    assert_eq!(sel.toggle(&s, &ctx()), ToggleOutcome::Added);
    assert!(sel.is_selected(1));
    assert_eq!(sel.count(), 1);
}

#[test]
fn test_toggle_twice_restores_original_state() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    let s = slot(1, "09:00", "10:00", SlotStatus::Available);
    let before = sel.clone();

    sel.toggle(&s, &ctx());
    sel.toggle(&s, &ctx());
    assert_eq!(sel, before);

    // 被拒绝的时段 toggle 两次同样不留痕迹
    let booked = slot(2, "10:00", "11:00", SlotStatus::Booked);
    sel.toggle(&booked, &ctx());
    sel.toggle(&booked, &ctx());
    assert_eq!(sel, before);
}

#[test]
fn test_booked_slot_is_rejected() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    let s = slot(1, "09:00", "10:00", SlotStatus::Booked);

    assert_eq!(sel.toggle(&s, &ctx()), ToggleOutcome::RejectedUnavailable);
    assert!(sel.is_empty());
}

#[test]
fn test_past_hour_today_is_rejected() {
    let mut sel = SlotSelection::new(d(2026, 1, 10));

    // 当前小时(14点)内的时段视为已开始
    let started = slot(1, "14:00", "15:00", SlotStatus::Available);
    assert_eq!(sel.toggle(&started, &ctx()), ToggleOutcome::RejectedPast);

    let gone = slot(2, "08:00", "09:00", SlotStatus::Available);
    assert_eq!(sel.toggle(&gone, &ctx()), ToggleOutcome::RejectedPast);
    assert!(sel.is_empty());
}

#[test]
fn test_future_hour_today_is_allowed() {
    let mut sel = SlotSelection::new(d(2026, 1, 10));
    let s = slot(1, "15:00", "16:00", SlotStatus::Available);

    assert_eq!(sel.toggle(&s, &ctx()), ToggleOutcome::Added);
}

#[test]
fn test_earlier_date_is_entirely_past() {
    let mut sel = SlotSelection::new(d(2026, 1, 9));
    // 哪怕是深夜时段，昨天就是昨天
    let s = slot(1, "23:00", "24:00", SlotStatus::Available);

    assert_eq!(sel.toggle(&s, &ctx()), ToggleOutcome::RejectedPast);
}

#[test]
fn test_future_date_ignores_clock() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    let s = slot(1, "08:00", "09:00", SlotStatus::Available);

    assert_eq!(sel.toggle(&s, &ctx()), ToggleOutcome::Added);
}

#[test]
fn test_deselect_survives_becoming_past() {
    let mut sel = SlotSelection::new(d(2026, 1, 10));
    let s = slot(1, "15:00", "16:00", SlotStatus::Available);
    assert_eq!(sel.toggle(&s, &ctx()), ToggleOutcome::Added);

    // 页面开着没动，时钟走到 16 点
    let later = DayContext {
        today: d(2026, 1, 10),
        current_hour: 16,
    };
    assert!(sel.is_selectable(&s, &later));
    assert_eq!(sel.toggle(&s, &later), ToggleOutcome::Removed);
    assert!(sel.is_empty());
}

#[test]
fn test_is_selectable() {
    let mut sel = SlotSelection::new(d(2026, 1, 10));
    let booked = slot(1, "15:00", "16:00", SlotStatus::Booked);
    let past = slot(2, "09:00", "10:00", SlotStatus::Available);
    let open = slot(3, "16:00", "17:00", SlotStatus::Available);

    assert!(!sel.is_selectable(&booked, &ctx()));
    assert!(!sel.is_selectable(&past, &ctx()));
    assert!(sel.is_selectable(&open, &ctx()));

    sel.toggle(&open, &ctx());
    assert!(sel.is_selectable(&open, &ctx()));
}

// =========================================================
// 金额与请求体
// =========================================================

#[test]
fn test_total_is_count_times_price() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    assert_eq!(sel.total(100_000), 0);

    sel.toggle(&slot(1, "09:00", "10:00", SlotStatus::Available), &ctx());
    sel.toggle(&slot(2, "10:00", "11:00", SlotStatus::Available), &ctx());

    // 两个时段 x 每小时 10 万 = 20 万
    assert_eq!(sel.total(100_000), 200_000);
}

#[test]
fn test_to_request_payload() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    assert!(sel.to_request(7).is_none());

    sel.toggle(&slot(10, "09:00", "10:00", SlotStatus::Available), &ctx());
    sel.toggle(&slot(11, "10:00", "11:00", SlotStatus::Available), &ctx());

    let req = sel.to_request(7).unwrap();
    assert_eq!(req.field_id, 7);
    assert_eq!(req.slots.len(), 2);
    assert_eq!(req.slots[0].id, 10);
    assert_eq!(req.slots[0].start_time, "09:00");
    assert_eq!(req.slots[1].end_time, "11:00");
}

#[test]
fn test_selected_kept_sorted_by_start_time() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    sel.toggle(&slot(2, "10:00", "11:00", SlotStatus::Available), &ctx());
    sel.toggle(&slot(1, "08:00", "09:00", SlotStatus::Available), &ctx());

    let starts: Vec<&str> = sel.selected().iter().map(|s| s.start_time.as_str()).collect();
    assert_eq!(starts, vec!["08:00", "10:00"]);
}

#[test]
fn test_retain_available_drops_snatched_slots() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    sel.toggle(&slot(1, "09:00", "10:00", SlotStatus::Available), &ctx());
    sel.toggle(&slot(2, "10:00", "11:00", SlotStatus::Available), &ctx());

    // 刷新后 2 号被别人订走，1 号还在
    let fresh = [
        slot(1, "09:00", "10:00", SlotStatus::Available),
        slot(2, "10:00", "11:00", SlotStatus::Booked),
    ];
    assert_eq!(sel.retain_available(&fresh), 1);
    assert!(sel.is_selected(1));
    assert!(!sel.is_selected(2));
}

#[test]
fn test_retain_available_drops_vanished_slots() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    sel.toggle(&slot(7, "09:00", "10:00", SlotStatus::Available), &ctx());

    // 排期被删，新列表里根本没有 7 号
    assert_eq!(sel.retain_available(&[]), 1);
    assert!(sel.is_empty());
}

#[test]
fn test_retain_available_noop_when_all_still_open() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    let a = slot(1, "09:00", "10:00", SlotStatus::Available);
    sel.toggle(&a, &ctx());

    assert_eq!(sel.retain_available(std::slice::from_ref(&a)), 0);
    assert_eq!(sel.count(), 1);
}

// =========================================================
// 日期切换与清空
// =========================================================

#[test]
fn test_set_date_change_clears_selection() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    sel.toggle(&slot(1, "09:00", "10:00", SlotStatus::Available), &ctx());

    // 相同日期不动
    sel.set_date(d(2026, 1, 11));
    assert_eq!(sel.count(), 1);

    sel.set_date(d(2026, 1, 12));
    assert!(sel.is_empty());
    assert_eq!(sel.date(), d(2026, 1, 12));
}

#[test]
fn test_clear_empties_selection() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    sel.toggle(&slot(1, "09:00", "10:00", SlotStatus::Available), &ctx());
    sel.toggle(&slot(2, "10:00", "11:00", SlotStatus::Available), &ctx());

    sel.clear();
    assert!(sel.is_empty());
    assert_eq!(sel.total(100_000), 0);
}

// =========================================================
// 时间过滤器
// =========================================================

#[test]
fn test_time_filter_buckets() {
    let morning = slot(1, "08:00", "09:00", SlotStatus::Available);
    let noon = slot(2, "12:00", "13:00", SlotStatus::Available);
    let afternoon = slot(3, "17:00", "18:00", SlotStatus::Available);
    let night = slot(4, "18:00", "19:00", SlotStatus::Available);

    assert!(TimeFilter::Morning.matches(&morning));
    assert!(!TimeFilter::Morning.matches(&noon));

    assert!(TimeFilter::Afternoon.matches(&noon));
    assert!(TimeFilter::Afternoon.matches(&afternoon));
    assert!(!TimeFilter::Afternoon.matches(&night));

    assert!(TimeFilter::Night.matches(&night));
    assert!(!TimeFilter::Night.matches(&afternoon));

    for s in [&morning, &noon, &afternoon, &night] {
        assert!(TimeFilter::All.matches(s));
    }
}

#[test]
fn test_unparseable_start_only_shows_under_all() {
    let odd = slot(1, "soon", "later", SlotStatus::Available);
    assert!(TimeFilter::All.matches(&odd));
    assert!(!TimeFilter::Morning.matches(&odd));
    assert!(!TimeFilter::Afternoon.matches(&odd));
    assert!(!TimeFilter::Night.matches(&odd));
}

#[test]
fn test_filter_does_not_touch_selection() {
    let mut sel = SlotSelection::new(d(2026, 1, 11));
    let night = slot(4, "19:00", "20:00", SlotStatus::Available);
    sel.toggle(&night, &ctx());

    // 过滤只决定显示哪些，勾选集合原封不动
    let all = [
        slot(1, "08:00", "09:00", SlotStatus::Available),
        night.clone(),
    ];
    let visible: Vec<&Slot> = all
        .iter()
        .filter(|s| TimeFilter::Morning.matches(s))
        .collect();

    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, 1);
    assert!(sel.is_selected(4));
}
