use chrono::{DateTime, Duration, Timelike, Utc};

use crate::database::models::{BreakType, MealBreak, TimeEntry};

/// Value snapshot of a time entry and its breaks; everything the accounting
/// engine derives is a pure function of this plus the policy values.
#[derive(Debug, Clone)]
pub struct TimeSheet {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub breaks: Vec<SheetBreak>,
}

#[derive(Debug, Clone, Copy)]
pub struct SheetBreak {
    pub break_time: DateTime<Utc>,
    pub break_type: BreakType,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedHours {
    pub normal_hours: f64,
    pub meal_penalty_hours: f64,
    pub total_hours_worked: f64,
}

impl TimeSheet {
    pub fn new(entry: &TimeEntry, mut breaks: Vec<MealBreak>) -> Self {
        breaks.sort_by_key(|b| (b.break_time, b.created_at));
        TimeSheet {
            start_time: entry.start_time,
            end_time: entry.end_time,
            breaks: breaks
                .into_iter()
                .map(|b| SheetBreak {
                    break_time: b.break_time,
                    break_type: b.break_type,
                    duration_minutes: b.duration_minutes,
                })
                .collect(),
        }
    }

    fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end > start => Some((start, end)),
            _ => None,
        }
    }

    fn unpaid_break_count(&self) -> usize {
        self.breaks
            .iter()
            .filter(|b| b.break_type == BreakType::Unpaid)
            .count()
    }

    /// Hours paid at the normal rate. Walks the shift from the start; accrual
    /// for each segment is capped at the trigger boundary (start + trigger
    /// hours), a paid break adds its own duration back, and each unpaid break
    /// subtracts one flat hour at the end regardless of its recorded duration.
    /// The walk cursor advances to each break's start, not past its duration;
    /// the two unpaid-break treatments in this module are intentionally not
    /// reconciled with each other.
    pub fn normal_hours(&self, meal_penalty_trigger_hours: f64) -> f64 {
        let Some((start, end)) = self.span() else {
            return 0.0;
        };
        let boundary = start + hours_duration(meal_penalty_trigger_hours);

        let mut current = start;
        let mut normal = 0.0;
        for b in &self.breaks {
            let segment_end = b.break_time.min(boundary);
            if segment_end > current {
                normal += duration_hours(segment_end - current);
            }
            if b.break_type == BreakType::Paid {
                normal += f64::from(b.duration_minutes) / 60.0;
            }
            current = current.max(b.break_time);
        }
        let cap = boundary.min(end);
        if cap > current {
            normal += duration_hours(cap - current);
        }

        normal -= self.unpaid_break_count() as f64;
        normal.max(0.0)
    }

    /// Hours owed at the penalty rate: the complementary walk, accumulating
    /// every gap between the trigger boundary and the next break start (or the
    /// end of the shift once no break remains).
    pub fn meal_penalty_hours(&self, meal_penalty_trigger_hours: f64) -> f64 {
        let Some((start, end)) = self.span() else {
            return 0.0;
        };
        let boundary = start + hours_duration(meal_penalty_trigger_hours);

        let mut cursor = boundary;
        let mut penalty = 0.0;
        for b in &self.breaks {
            if b.break_time > cursor {
                let gap_end = b.break_time.min(end);
                if gap_end > cursor {
                    penalty += duration_hours(gap_end - cursor);
                }
                cursor = b.break_time;
            }
        }
        if end > cursor {
            penalty += duration_hours(end - cursor);
        }
        penalty.max(0.0)
    }

    /// Gross span minus one flat hour per unpaid break. Independent of the
    /// trigger walk; may disagree with normal + penalty, and both are exposed.
    pub fn total_hours_worked(&self) -> f64 {
        let Some((start, end)) = self.span() else {
            return 0.0;
        };
        let total = duration_hours(end - start) - self.unpaid_break_count() as f64;
        total.max(0.0)
    }

    pub fn derive(&self, meal_penalty_trigger_hours: f64) -> DerivedHours {
        DerivedHours {
            normal_hours: self.normal_hours(meal_penalty_trigger_hours),
            meal_penalty_hours: self.meal_penalty_hours(meal_penalty_trigger_hours),
            total_hours_worked: self.total_hours_worked(),
        }
    }
}

/// Round a manually entered time to the policy target. Target 0 means nearest
/// hour (minute 30 and up rounds forward); otherwise the minute component is
/// rounded to the nearest multiple of the target, with 60 rolling into the
/// next hour. Never applied to captured clock-out times, which use
/// `shape_clock_out` instead.
pub fn round_time(t: DateTime<Utc>, target: i32) -> DateTime<Utc> {
    let floored = truncate_to_minute(t);
    if target <= 0 {
        let top = floored - Duration::minutes(i64::from(floored.minute()));
        if floored.minute() >= 30 {
            top + Duration::hours(1)
        } else {
            top
        }
    } else {
        let minute = f64::from(floored.minute());
        let rounded = (minute / f64::from(target)).round() as i64 * i64::from(target);
        let top = floored - Duration::minutes(i64::from(floored.minute()));
        top + Duration::minutes(rounded)
    }
}

/// Shape a captured "now" clock-out. Minutes past the half hour beyond the
/// grace window round up to the next hour; minutes beyond the grace window
/// round to the half hour; anything inside the window rounds down.
pub fn shape_clock_out(now: DateTime<Utc>, hour_round_up: i32) -> DateTime<Utc> {
    let floored = truncate_to_minute(now);
    let minutes = i64::from(floored.minute());
    let top = floored - Duration::minutes(minutes);
    if minutes > 30 + i64::from(hour_round_up) {
        top + Duration::hours(1)
    } else if minutes > i64::from(hour_round_up) {
        top + Duration::minutes(30)
    } else {
        top
    }
}

/// A worker signed out early still gets the guaranteed minimum.
pub fn apply_minimum_hours(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    minimum_hours: f64,
) -> DateTime<Utc> {
    let floor = start + hours_duration(minimum_hours);
    end.max(floor)
}

fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t - Duration::seconds(i64::from(t.second())) - Duration::nanoseconds(t.nanosecond() as i64)
}

fn duration_hours(d: Duration) -> f64 {
    d.num_seconds() as f64 / 3600.0
}

fn hours_duration(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}
