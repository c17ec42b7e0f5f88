use chrono::{Duration, NaiveDateTime};

use super::shifts::ShiftWindow;

/// Check-in opens this many minutes before shift start...
pub const WINDOW_BEFORE_MIN: i64 = 15;
/// ...and closes this many minutes after it.
pub const WINDOW_AFTER_MIN: i64 = 60;

/// Picks the shift whose check-in window `[start - before, start + after]`
/// contains `now`. Closed interval, both ends inclusive; windows are
/// anchored to `now`'s calendar date. Catalog order decides ties:
/// first match wins.
pub fn match_window<'a>(
    now: NaiveDateTime,
    shifts: &'a [ShiftWindow],
    before: Duration,
    after: Duration,
) -> Option<&'a ShiftWindow> {
    shifts.iter().find(|shift| {
        let start = now.date().and_time(shift.start);
        now >= start - before && now <= start + after
    })
}

/// [`match_window`] with the standard check-in window.
pub fn match_check_in_window(now: NaiveDateTime, shifts: &[ShiftWindow]) -> Option<&ShiftWindow> {
    match_window(
        now,
        shifts,
        Duration::minutes(WINDOW_BEFORE_MIN),
        Duration::minutes(WINDOW_AFTER_MIN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::shifts::ShiftWindow;
    use chrono::{NaiveDate, NaiveTime};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_time(t(h, m))
    }

    fn eight_to_four() -> Vec<ShiftWindow> {
        vec![ShiftWindow::new(t(8, 0), t(16, 0))]
    }

    #[test]
    fn window_is_closed_on_both_ends() {
        let shifts = eight_to_four();
        // window for an 08:00 shift is [07:45, 09:00]
        assert!(match_check_in_window(at(7, 44), &shifts).is_none());
        assert!(match_check_in_window(at(7, 45), &shifts).is_some());
        assert!(match_check_in_window(at(8, 10), &shifts).is_some());
        assert!(match_check_in_window(at(9, 0), &shifts).is_some());
        assert!(match_check_in_window(at(9, 1), &shifts).is_none());
    }

    #[test]
    fn rejects_outside_every_window() {
        let shifts = eight_to_four();
        assert!(match_check_in_window(at(7, 30), &shifts).is_none());
        assert!(match_check_in_window(at(9, 30), &shifts).is_none());
    }

    #[test]
    fn is_deterministic() {
        let shifts = eight_to_four();
        let first = match_check_in_window(at(8, 20), &shifts).cloned();
        let second = match_check_in_window(at(8, 20), &shifts).cloned();
        assert_eq!(first, second);
    }

    #[test]
    fn overlapping_windows_resolve_to_first_in_catalog_order() {
        let shifts = vec![
            ShiftWindow::new(t(8, 0), t(16, 0)),
            ShiftWindow::new(t(8, 30), t(16, 30)),
        ];
        // 08:20 sits in both windows
        let matched = match_check_in_window(at(8, 20), &shifts).unwrap();
        assert_eq!(matched.start, t(8, 0));
    }

    #[test]
    fn window_arithmetic_crosses_midnight() {
        let shifts = vec![ShiftWindow::new(t(0, 5), t(8, 5))];
        // 00:00 is inside [-1d 23:50, 01:05]
        assert!(match_check_in_window(at(0, 0), &shifts).is_some());
    }
}
