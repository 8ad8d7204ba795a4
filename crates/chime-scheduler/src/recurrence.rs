//! Recurrence calculator — next-occurrence computation for recurring
//! reminders.
//!
//! Every returned instant is strictly after the instant that just fired; a
//! recurring reminder never reuses or rewinds a `due_at`.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use chime_core::types::Recurrence;

/// Compute the next UTC occurrence after a fire.
///
/// `fired_at` is the `due_at` that just fired; `now` is the tick's capture
/// time. Returns `None` for [`Recurrence::None`] (the reminder is retired
/// instead) or when the calendar arithmetic has no representable result.
pub fn next_occurrence(
    recurrence: &Recurrence,
    fired_at: DateTime<Utc>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Option<DateTime<Utc>> {
    match recurrence {
        Recurrence::None => None,

        // Anchored to the fired instant, not to `now`, so the time-of-day
        // never drifts with tick latency.
        Recurrence::Daily => Some(fired_at + Duration::hours(24)),

        Recurrence::Weekly { day } => {
            let time_of_day = fired_at.with_timezone(&offset).time();
            // max() keeps the result strictly after the fired instant even
            // if the clock reads earlier than the stored due_at.
            weekly_after(*day, time_of_day, now.max(fired_at), offset)
        }

        Recurrence::Monthly => next_month(fired_at, offset),
    }
}

/// First occurrence of a weekly reminder at creation: the next local date
/// matching `day` at `time_of_day`, strictly after `now`. If today matches
/// and the time has not yet passed, that is today; otherwise 1–7 days out.
pub fn first_weekly(
    day: u8,
    time_of_day: NaiveTime,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Option<DateTime<Utc>> {
    weekly_after(day, time_of_day, now, offset)
}

/// Next instant on weekday `day` (0 = Monday … 6 = Sunday) at
/// `time_of_day` local, strictly after `after`.
fn weekly_after(
    day: u8,
    time_of_day: NaiveTime,
    after: DateTime<Utc>,
    offset: FixedOffset,
) -> Option<DateTime<Utc>> {
    let local_after = after.with_timezone(&offset);
    let target = i64::from(day.min(6));
    let today = i64::from(local_after.weekday().num_days_from_monday());
    let days_ahead = (target - today).rem_euclid(7);

    let date = local_after.date_naive() + Duration::days(days_ahead);
    let candidate = localize(date.and_time(time_of_day), offset)?;
    if candidate > after {
        Some(candidate)
    } else {
        // Same weekday but the time already passed — push a full week.
        localize((date + Duration::days(7)).and_time(time_of_day), offset)
    }
}

/// Advance the local month by one, clamping the day-of-month to the last
/// valid day of the target month (Jan 31 → Feb 28/29).
fn next_month(fired_at: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let local = fired_at.with_timezone(&offset);
    let (year, month) = if local.month() == 12 {
        (local.year() + 1, 1)
    } else {
        (local.year(), local.month() + 1)
    };
    let day = local.day().min(days_in_month(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    localize(date.and_time(local.time()), offset)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn localize(naive: chrono::NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    naive
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        jst()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn nine_am() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    // 2026-08-24 is a Monday.

    #[test]
    fn weekly_created_after_todays_slot_waits_a_week() {
        // Monday 09:05, asking for Monday 09:00 — first fire is next Monday.
        let now = local(2026, 8, 24, 9, 5);
        let first = first_weekly(0, nine_am(), now, jst()).unwrap();
        assert_eq!(first, local(2026, 8, 31, 9, 0));
    }

    #[test]
    fn weekly_created_before_todays_slot_fires_today() {
        let now = local(2026, 8, 24, 8, 0);
        let first = first_weekly(0, nine_am(), now, jst()).unwrap();
        assert_eq!(first, local(2026, 8, 24, 9, 0));
    }

    #[test]
    fn weekly_advances_to_target_weekday() {
        // Monday asking for Wednesday (2).
        let now = local(2026, 8, 24, 12, 0);
        let first = first_weekly(2, nine_am(), now, jst()).unwrap();
        assert_eq!(first, local(2026, 8, 26, 9, 0));
        assert_eq!(first.with_timezone(&jst()).weekday(), Weekday::Wed);
    }

    #[test]
    fn weekly_next_is_strictly_after_fired_instant() {
        let fired = local(2026, 8, 24, 9, 0);
        let rec = Recurrence::Weekly { day: 0 };
        // Tick clock exactly at the fired instant.
        let next = next_occurrence(&rec, fired, fired, jst()).unwrap();
        assert_eq!(next, local(2026, 8, 31, 9, 0));
        assert!(next > fired);
        assert_eq!(next.with_timezone(&jst()).weekday(), Weekday::Mon);
    }

    #[test]
    fn weekly_keeps_local_time_of_day_from_fired_instant() {
        let fired = local(2026, 8, 24, 21, 30);
        let now = local(2026, 8, 24, 21, 31);
        let next = next_occurrence(&Recurrence::Weekly { day: 0 }, fired, now, jst()).unwrap();
        let next_local = next.with_timezone(&jst());
        assert_eq!(next_local.time(), NaiveTime::from_hms_opt(21, 30, 0).unwrap());
    }

    #[test]
    fn daily_adds_exactly_24_hours_to_fired_instant() {
        let fired = local(2026, 8, 24, 9, 0);
        // Even if the tick runs late, the anchor is the fired instant.
        let late_now = local(2026, 8, 24, 9, 29);
        let next = next_occurrence(&Recurrence::Daily, fired, late_now, jst()).unwrap();
        assert_eq!(next, fired + Duration::hours(24));
    }

    #[test]
    fn monthly_advances_one_month() {
        let fired = local(2026, 4, 15, 10, 0);
        let next = next_occurrence(&Recurrence::Monthly, fired, fired, jst()).unwrap();
        assert_eq!(next, local(2026, 5, 15, 10, 0));
    }

    #[test]
    fn monthly_clamps_to_shorter_month() {
        let fired = local(2026, 1, 31, 10, 0);
        let next = next_occurrence(&Recurrence::Monthly, fired, fired, jst()).unwrap();
        assert_eq!(next, local(2026, 2, 28, 10, 0));

        let fired = local(2026, 3, 31, 10, 0);
        let next = next_occurrence(&Recurrence::Monthly, fired, fired, jst()).unwrap();
        assert_eq!(next, local(2026, 4, 30, 10, 0));
    }

    #[test]
    fn monthly_clamp_respects_leap_years() {
        let fired = local(2028, 1, 31, 10, 0);
        let next = next_occurrence(&Recurrence::Monthly, fired, fired, jst()).unwrap();
        assert_eq!(next, local(2028, 2, 29, 10, 0));
    }

    #[test]
    fn monthly_rolls_over_the_year() {
        let fired = local(2026, 12, 31, 23, 0);
        let next = next_occurrence(&Recurrence::Monthly, fired, fired, jst()).unwrap();
        assert_eq!(next, local(2027, 1, 31, 23, 0));
    }

    #[test]
    fn none_has_no_next_occurrence() {
        let fired = local(2026, 8, 24, 9, 0);
        assert!(next_occurrence(&Recurrence::None, fired, fired, jst()).is_none());
    }
}
