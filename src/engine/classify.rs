use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Grace period after shift start before a check-in counts as late.
pub const LATE_TOLERANCE_MIN: i64 = 15;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInStatus {
    OnTime,
    Late,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckOutStatus {
    OnTime,
    Early,
}

/// LATE iff `now` is strictly past `shift_start + tolerance`.
pub fn classify_check_in(
    now: NaiveDateTime,
    shift_start: NaiveDateTime,
    tolerance: Duration,
) -> CheckInStatus {
    if now > shift_start + tolerance {
        CheckInStatus::Late
    } else {
        CheckInStatus::OnTime
    }
}

/// EARLY iff `now` is strictly before `shift_end`.
///
/// The check-out gate (`TooEarly`) already rejects submissions before
/// the shift end, so this currently only ever observes ON_TIME; the
/// classifier stays a separate rule because the gate is a policy that
/// can change independently.
pub fn classify_check_out(now: NaiveDateTime, shift_end: NaiveDateTime) -> CheckOutStatus {
    if now < shift_end {
        CheckOutStatus::Early
    } else {
        CheckOutStatus::OnTime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn check_in_within_tolerance_is_on_time() {
        let start = at(8, 0);
        let tol = Duration::minutes(LATE_TOLERANCE_MIN);
        assert_eq!(classify_check_in(at(7, 50), start, tol), CheckInStatus::OnTime);
        assert_eq!(classify_check_in(at(8, 10), start, tol), CheckInStatus::OnTime);
        // boundary is inclusive: exactly start + tolerance is still on time
        assert_eq!(classify_check_in(at(8, 15), start, tol), CheckInStatus::OnTime);
    }

    #[test]
    fn check_in_past_tolerance_is_late() {
        let start = at(8, 0);
        let tol = Duration::minutes(LATE_TOLERANCE_MIN);
        assert_eq!(classify_check_in(at(8, 16), start, tol), CheckInStatus::Late);
        assert_eq!(classify_check_in(at(8, 20), start, tol), CheckInStatus::Late);
    }

    #[test]
    fn check_out_before_shift_end_is_early() {
        let end = at(16, 0);
        assert_eq!(classify_check_out(at(15, 59), end), CheckOutStatus::Early);
    }

    #[test]
    fn check_out_at_or_after_shift_end_is_on_time() {
        let end = at(16, 0);
        assert_eq!(classify_check_out(at(16, 0), end), CheckOutStatus::OnTime);
        assert_eq!(classify_check_out(at(18, 30), end), CheckOutStatus::OnTime);
    }
}
