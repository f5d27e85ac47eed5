use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

use crewcall::database::models::BreakType;
use crewcall::services::hours::{
    apply_minimum_hours, round_time, shape_clock_out, SheetBreak, TimeSheet,
};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 14, h, m, 0).unwrap()
}

fn sheet(start: (u32, u32), end: (u32, u32), breaks: Vec<SheetBreak>) -> TimeSheet {
    TimeSheet {
        start_time: Some(at(start.0, start.1)),
        end_time: Some(at(end.0, end.1)),
        breaks,
    }
}

fn taken(h: u32, m: u32, break_type: BreakType) -> SheetBreak {
    SheetBreak {
        break_time: at(h, m),
        break_type,
        duration_minutes: break_type.default_duration_minutes(),
    }
}

#[test]
fn eight_hour_call_with_paid_break() {
    let sheet = sheet((9, 0), (17, 0), vec![taken(13, 0, BreakType::Paid)]);
    let derived = sheet.derive(5.0);

    assert_eq!(derived.normal_hours, 5.5);
    assert_eq!(derived.meal_penalty_hours, 3.0);
    assert_eq!(derived.total_hours_worked, 8.0);
}

#[test]
fn eight_hour_call_with_unpaid_break() {
    let sheet = sheet((9, 0), (17, 0), vec![taken(13, 0, BreakType::Unpaid)]);
    let derived = sheet.derive(5.0);

    // 9-13 accrues four hours, 13-14 is still under the boundary, and the
    // unpaid break takes its flat hour back.
    assert_eq!(derived.normal_hours, 4.0);
    assert_eq!(derived.meal_penalty_hours, 3.0);
    assert_eq!(derived.total_hours_worked, 7.0);
}

#[test]
fn short_call_never_reaches_the_boundary() {
    let sheet = sheet((9, 0), (13, 0), vec![]);
    let derived = sheet.derive(5.0);

    assert_eq!(derived.normal_hours, 4.0);
    assert_eq!(derived.meal_penalty_hours, 0.0);
    assert_eq!(derived.total_hours_worked, 4.0);
}

#[test]
fn break_after_the_boundary_splits_the_penalty_span() {
    let sheet = sheet((8, 0), (18, 0), vec![taken(15, 0, BreakType::Paid)]);
    let derived = sheet.derive(5.0);

    // Normal: 8-13 is five hours, the paid break adds its half hour back.
    assert_eq!(derived.normal_hours, 5.5);
    // Penalty: 13-15 plus 15-18.
    assert_eq!(derived.meal_penalty_hours, 5.0);
    assert_eq!(derived.total_hours_worked, 10.0);
}

#[test]
fn open_entry_derives_zero_everywhere() {
    let open = TimeSheet {
        start_time: Some(at(9, 0)),
        end_time: None,
        breaks: vec![],
    };
    let derived = open.derive(5.0);

    assert_eq!(derived.normal_hours, 0.0);
    assert_eq!(derived.meal_penalty_hours, 0.0);
    assert_eq!(derived.total_hours_worked, 0.0);
}

#[test]
fn manual_edit_rounding_follows_the_target() {
    // Target 0: nearest hour, half past rounds forward.
    assert_eq!(round_time(at(9, 29), 0), at(9, 0));
    assert_eq!(round_time(at(9, 30), 0), at(10, 0));

    // Target 30: nearest half hour, 60 rolls into the next hour.
    assert_eq!(round_time(at(9, 44), 30), at(9, 30));
    assert_eq!(round_time(at(9, 46), 30), at(10, 0));
}

#[test]
fn captured_clock_out_uses_the_grace_window() {
    // Four-minute grace: 35 past rounds up to the hour, 20 past rounds to the
    // half hour, 3 past rounds down.
    assert_eq!(shape_clock_out(at(16, 35), 4), at(17, 0));
    assert_eq!(shape_clock_out(at(16, 20), 4), at(16, 30));
    assert_eq!(shape_clock_out(at(16, 3), 4), at(16, 0));
}

#[test]
fn early_sign_out_is_floored_to_the_minimum() {
    let start = at(9, 0);
    assert_eq!(apply_minimum_hours(start, at(11, 0), 4.0), at(13, 0));
    assert_eq!(apply_minimum_hours(start, at(15, 0), 4.0), at(15, 0));
}
