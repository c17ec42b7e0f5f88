use serde::Serialize;
use utoipa::ToSchema;

use super::classify::CheckInStatus;
use super::decision::AttendanceKind;
use crate::model::attendance::AttendanceRow;

/// Admin dashboard counters for one day. Sick reports are counted apart
/// from the presence columns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyStats {
    #[schema(example = 12)]
    pub checked_in: u32,
    #[schema(example = 2)]
    pub late: u32,
    #[schema(example = 9)]
    pub checked_out: u32,
    #[schema(example = 1)]
    pub sick: u32,
    #[schema(example = 10)]
    pub in_office: u32,
    #[schema(example = 2)]
    pub remote: u32,
}

/// Pure reduction over one day's attendance rows; holds no state.
pub fn daily_stats(rows: &[AttendanceRow]) -> DailyStats {
    let mut stats = DailyStats::default();
    for row in rows {
        if row.attendance_kind() == Some(AttendanceKind::Sick) {
            stats.sick += 1;
            continue;
        }
        stats.checked_in += 1;
        if row.in_status() == Some(CheckInStatus::Late) {
            stats.late += 1;
        }
        if row.check_out_at.is_some() {
            stats.checked_out += 1;
        }
        if row.check_in_location_valid {
            stats.in_office += 1;
        } else {
            stats.remote += 1;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn row(kind: &str, status: &str, checked_out: bool, valid: bool) -> AttendanceRow {
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let clock = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        AttendanceRow {
            id: 1,
            user_id: 1,
            date,
            check_in_at: date.and_time(clock(8, 10)),
            check_out_at: checked_out.then(|| date.and_time(clock(16, 5))),
            shift_start: clock(8, 0),
            shift_end: clock(16, 0),
            check_in_lat: -7.7598,
            check_in_lng: 110.3953,
            check_in_accuracy_m: 30.0,
            check_in_distance_m: 12.0,
            check_in_location_valid: valid,
            check_in_status: status.to_string(),
            check_in_photo_path: None,
            check_out_lat: None,
            check_out_lng: None,
            check_out_accuracy_m: None,
            check_out_distance_m: None,
            check_out_location_valid: None,
            check_out_status: checked_out.then(|| "ON_TIME".to_string()),
            check_out_photo_path: None,
            kind: kind.to_string(),
        }
    }

    #[test]
    fn counts_one_day_of_rows() {
        let rows = vec![
            row("PRESENT", "ON_TIME", true, true),
            row("PRESENT", "LATE", false, true),
            row("PRESENT", "ON_TIME", true, false),
            row("SICK", "LATE", false, false),
        ];
        let stats = daily_stats(&rows);
        assert_eq!(
            stats,
            DailyStats {
                checked_in: 3,
                late: 1,
                checked_out: 2,
                sick: 1,
                in_office: 2,
                remote: 1,
            }
        );
    }

    #[test]
    fn empty_day_is_all_zero() {
        assert_eq!(daily_stats(&[]), DailyStats::default());
    }
}
