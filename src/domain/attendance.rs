use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Minutes late against a scheduled shift start, zero when the clock-in is
/// early or within the business's lateness threshold.
///
/// Shift times are naive (business-local); the clock-in instant is compared
/// against the shift start interpreted in UTC, matching how shift rows are
/// authored on-device.
pub fn minutes_late(
    shift_date: NaiveDate,
    shift_start: NaiveTime,
    clock_in: DateTime<Utc>,
    threshold_minutes: i64,
) -> i64 {
    let shift_start = Utc.from_utc_datetime(&shift_date.and_time(shift_start));
    let diff = (clock_in - shift_start).num_minutes();

    if diff > threshold_minutes {
        diff
    } else {
        0
    }
}

/// Total minutes worked in one clock-in/clock-out session, clamped at zero.
pub fn worked_minutes(clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> i64 {
    (clock_out - clock_in).num_minutes().max(0)
}

pub fn format_duration(minutes: i64) -> String {
    let h = minutes / 60;
    let m = minutes % 60;
    format!("{h}h {m}m")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn nine_am() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    fn clock_in_at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &date().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap()),
        )
    }

    #[test]
    fn on_time_and_within_threshold_is_not_late() {
        assert_eq!(minutes_late(date(), nine_am(), clock_in_at(8, 55), 10), 0);
        assert_eq!(minutes_late(date(), nine_am(), clock_in_at(9, 0), 10), 0);
        assert_eq!(minutes_late(date(), nine_am(), clock_in_at(9, 10), 10), 0);
    }

    #[test]
    fn past_the_threshold_reports_full_lateness() {
        assert_eq!(minutes_late(date(), nine_am(), clock_in_at(9, 25), 10), 25);
    }

    #[test]
    fn worked_minutes_clamps_inverted_sessions() {
        assert_eq!(worked_minutes(clock_in_at(9, 0), clock_in_at(17, 30)), 510);
        assert_eq!(worked_minutes(clock_in_at(17, 0), clock_in_at(9, 0)), 0);
    }

    #[test]
    fn duration_formats_hours_and_minutes() {
        assert_eq!(format_duration(510), "8h 30m");
        assert_eq!(format_duration(45), "0h 45m");
    }
}
