use chrono::{Duration, NaiveDateTime, NaiveTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::classify::{
    CheckInStatus, CheckOutStatus, LATE_TOLERANCE_MIN, classify_check_in, classify_check_out,
};
use super::geo::{AreaConfig, GeoCheck, GeoFix, LocationClass, check_fix};
use super::shifts::ShiftWindow;
use super::window::{WINDOW_AFTER_MIN, WINDOW_BEFORE_MIN, match_check_in_window};

/// Which source-policy variant is in force. One coherent switch; the two
/// are never mixed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum AttendancePolicy {
    /// Location never blocks (it is recorded and classified only) and a
    /// sick check-in skips the window match, falling back to the day's
    /// first shift for record-keeping.
    Lenient,
    /// Invalid location hard-blocks both check-in and check-out, and a
    /// sick check-in still needs a matching window.
    Strict,
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
pub enum AttendanceKind {
    Present,
    Sick,
}

#[derive(Debug, Display, PartialEq)]
pub enum CheckInError {
    #[display(fmt = "No shifts are enabled for today; ask the admin to review the schedule")]
    NoShiftsConfigured,
    #[display(
        fmt = "Check-in is only accepted from {} minutes before to {} minutes after a shift start",
        "WINDOW_BEFORE_MIN",
        "WINDOW_AFTER_MIN"
    )]
    NoMatchingShift,
    #[display(
        fmt = "Location rejected (distance {:.0} m, accuracy {:.0} m out of bounds)",
        distance_m,
        accuracy_m
    )]
    InvalidLocation { distance_m: f64, accuracy_m: f64 },
}

#[derive(Debug, Display, PartialEq)]
pub enum CheckOutError {
    #[display(fmt = "A sick attendance record cannot check out")]
    SickCannotCheckOut,
    #[display(fmt = "Check-out is not open before the shift end at {}", shift_end)]
    TooEarly { shift_end: NaiveTime },
    #[display(
        fmt = "Location rejected (distance {:.0} m, accuracy {:.0} m out of bounds)",
        distance_m,
        accuracy_m
    )]
    InvalidLocation { distance_m: f64, accuracy_m: f64 },
}

/// Everything the persistence layer needs to write a check-in row.
#[derive(Debug, Clone)]
pub struct CheckInDecision {
    pub shift: ShiftWindow,
    pub status: CheckInStatus,
    pub kind: AttendanceKind,
    pub geo: GeoCheck,
    pub location: LocationClass,
}

#[derive(Debug, Clone)]
pub struct CheckOutDecision {
    pub status: CheckOutStatus,
    pub geo: GeoCheck,
    pub location: LocationClass,
}

/// Pure check-in evaluation: window match, lateness, geofence. The
/// caller supplies a settings snapshot taken once for the request and
/// persists the decision afterwards; nothing here has side effects.
pub fn evaluate_check_in(
    now: NaiveDateTime,
    shifts: &[ShiftWindow],
    area: &AreaConfig,
    fix: &GeoFix,
    sick: bool,
    policy: AttendancePolicy,
) -> Result<CheckInDecision, CheckInError> {
    if shifts.is_empty() {
        return Err(CheckInError::NoShiftsConfigured);
    }

    let geo = check_fix(area, fix);
    if policy == AttendancePolicy::Strict && !geo.valid {
        return Err(CheckInError::InvalidLocation {
            distance_m: geo.distance_m,
            accuracy_m: fix.accuracy_m,
        });
    }

    let matched = match match_check_in_window(now, shifts) {
        Some(shift) => shift,
        // a lenient sick report is booked against the first shift of the
        // day so the record still carries a schedule
        None if sick && policy == AttendancePolicy::Lenient => &shifts[0],
        None => return Err(CheckInError::NoMatchingShift),
    };

    let shift_start = now.date().and_time(matched.start);
    let status = classify_check_in(now, shift_start, Duration::minutes(LATE_TOLERANCE_MIN));

    Ok(CheckInDecision {
        shift: matched.clone(),
        status,
        kind: if sick {
            AttendanceKind::Sick
        } else {
            AttendanceKind::Present
        },
        geo,
        location: LocationClass::from_valid(geo.valid),
    })
}

/// Pure check-out evaluation against the shift frozen at check-in.
pub fn evaluate_check_out(
    now: NaiveDateTime,
    kind: AttendanceKind,
    shift_end: NaiveTime,
    area: &AreaConfig,
    fix: &GeoFix,
    policy: AttendancePolicy,
) -> Result<CheckOutDecision, CheckOutError> {
    if kind == AttendanceKind::Sick {
        return Err(CheckOutError::SickCannotCheckOut);
    }

    let shift_end_at = now.date().and_time(shift_end);
    if now < shift_end_at {
        return Err(CheckOutError::TooEarly { shift_end });
    }

    let geo = check_fix(area, fix);
    if policy == AttendancePolicy::Strict && !geo.valid {
        return Err(CheckOutError::InvalidLocation {
            distance_m: geo.distance_m,
            accuracy_m: fix.accuracy_m,
        });
    }

    Ok(CheckOutDecision {
        status: classify_check_out(now, shift_end_at),
        geo,
        location: LocationClass::from_valid(geo.valid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geo::{Coordinate, MAX_ACCURACY_M};
    use chrono::{NaiveDate, NaiveTime};

    const CENTER: Coordinate = Coordinate {
        lat: -7.7598,
        lng: 110.3953,
    };

    fn area() -> AreaConfig {
        AreaConfig {
            center: CENTER,
            radius_m: 100.0,
            max_accuracy_m: MAX_ACCURACY_M,
        }
    }

    fn near_fix() -> GeoFix {
        GeoFix {
            coord: CENTER,
            accuracy_m: 30.0,
        }
    }

    fn far_fix() -> GeoFix {
        GeoFix {
            coord: Coordinate {
                lat: CENTER.lat + 0.05, // ~5.5 km away
                lng: CENTER.lng,
            },
            accuracy_m: 30.0,
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .unwrap()
            .and_time(t(h, m))
    }

    fn weekday_shifts() -> Vec<ShiftWindow> {
        vec![
            ShiftWindow::new(t(8, 0), t(16, 0)),
            ShiftWindow::new(t(10, 0), t(18, 0)),
            ShiftWindow::new(t(13, 0), t(21, 0)),
        ]
    }

    #[test]
    fn on_time_check_in_inside_window() {
        let d = evaluate_check_in(
            at(8, 10),
            &weekday_shifts(),
            &area(),
            &near_fix(),
            false,
            AttendancePolicy::Lenient,
        )
        .unwrap();
        assert_eq!(d.status, CheckInStatus::OnTime);
        assert_eq!(d.kind, AttendanceKind::Present);
        assert_eq!(d.location, LocationClass::InOffice);
        assert_eq!(d.shift.start, t(8, 0));
    }

    #[test]
    fn late_check_in_still_matches_its_shift() {
        let d = evaluate_check_in(
            at(8, 20),
            &weekday_shifts(),
            &area(),
            &near_fix(),
            false,
            AttendancePolicy::Lenient,
        )
        .unwrap();
        assert_eq!(d.status, CheckInStatus::Late);
        assert_eq!(d.shift.start, t(8, 0));
    }

    #[test]
    fn outside_every_window_is_rejected() {
        let err = evaluate_check_in(
            at(12, 0), // between the 10:00 and 13:00 windows
            &weekday_shifts(),
            &area(),
            &near_fix(),
            false,
            AttendancePolicy::Lenient,
        )
        .unwrap_err();
        assert_eq!(err, CheckInError::NoMatchingShift);
    }

    #[test]
    fn lenient_sick_report_bypasses_the_window() {
        let d = evaluate_check_in(
            at(12, 0),
            &weekday_shifts(),
            &area(),
            &near_fix(),
            true,
            AttendancePolicy::Lenient,
        )
        .unwrap();
        assert_eq!(d.kind, AttendanceKind::Sick);
        // booked against the first catalog shift
        assert_eq!(d.shift.start, t(8, 0));
        assert_eq!(d.status, CheckInStatus::Late);
    }

    #[test]
    fn strict_sick_report_still_needs_a_window() {
        let err = evaluate_check_in(
            at(12, 0),
            &weekday_shifts(),
            &area(),
            &near_fix(),
            true,
            AttendancePolicy::Strict,
        )
        .unwrap_err();
        assert_eq!(err, CheckInError::NoMatchingShift);
    }

    #[test]
    fn empty_catalog_is_a_hard_failure_even_when_sick() {
        let err = evaluate_check_in(
            at(8, 0),
            &[],
            &area(),
            &near_fix(),
            true,
            AttendancePolicy::Lenient,
        )
        .unwrap_err();
        assert_eq!(err, CheckInError::NoShiftsConfigured);
    }

    #[test]
    fn lenient_policy_records_remote_location_instead_of_blocking() {
        let d = evaluate_check_in(
            at(8, 10),
            &weekday_shifts(),
            &area(),
            &far_fix(),
            false,
            AttendancePolicy::Lenient,
        )
        .unwrap();
        assert!(!d.geo.valid);
        assert_eq!(d.location, LocationClass::Remote);
    }

    #[test]
    fn strict_policy_blocks_invalid_location_on_check_in() {
        let err = evaluate_check_in(
            at(8, 10),
            &weekday_shifts(),
            &area(),
            &far_fix(),
            false,
            AttendancePolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, CheckInError::InvalidLocation { .. }));
    }

    #[test]
    fn check_out_before_shift_end_is_too_early() {
        let err = evaluate_check_out(
            at(15, 0),
            AttendanceKind::Present,
            t(16, 0),
            &area(),
            &near_fix(),
            AttendancePolicy::Lenient,
        )
        .unwrap_err();
        assert_eq!(err, CheckOutError::TooEarly { shift_end: t(16, 0) });
    }

    #[test]
    fn check_out_at_shift_end_is_on_time() {
        let d = evaluate_check_out(
            at(16, 0),
            AttendanceKind::Present,
            t(16, 0),
            &area(),
            &near_fix(),
            AttendancePolicy::Lenient,
        )
        .unwrap();
        assert_eq!(d.status, CheckOutStatus::OnTime);
        assert_eq!(d.location, LocationClass::InOffice);
    }

    #[test]
    fn sick_record_cannot_check_out() {
        let err = evaluate_check_out(
            at(16, 0),
            AttendanceKind::Sick,
            t(16, 0),
            &area(),
            &near_fix(),
            AttendancePolicy::Lenient,
        )
        .unwrap_err();
        assert_eq!(err, CheckOutError::SickCannotCheckOut);
    }

    #[test]
    fn strict_policy_blocks_remote_check_out() {
        let err = evaluate_check_out(
            at(16, 0),
            AttendanceKind::Present,
            t(16, 0),
            &area(),
            &far_fix(),
            AttendancePolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, CheckOutError::InvalidLocation { .. }));

        // the same submission passes lenient with a REMOTE mark
        let d = evaluate_check_out(
            at(16, 0),
            AttendanceKind::Present,
            t(16, 0),
            &area(),
            &far_fix(),
            AttendancePolicy::Lenient,
        )
        .unwrap();
        assert_eq!(d.location, LocationClass::Remote);
    }
}
