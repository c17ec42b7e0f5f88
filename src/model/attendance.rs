use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::engine::classify::{CheckInStatus, CheckOutStatus};
use crate::engine::decision::AttendanceKind;

/// One attendance row per (user, date). The matched shift window is
/// frozen at check-in so check-out keeps judging against the same shift
/// even if the admin edits the catalog afterwards.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AttendanceRow {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2026-08-03", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-08-03T08:10:00", value_type = String)]
    pub check_in_at: NaiveDateTime,
    #[schema(example = "2026-08-03T16:02:00", value_type = String)]
    pub check_out_at: Option<NaiveDateTime>,
    #[schema(example = "08:00:00", value_type = String)]
    pub shift_start: NaiveTime,
    #[schema(example = "16:00:00", value_type = String)]
    pub shift_end: NaiveTime,
    pub check_in_lat: f64,
    pub check_in_lng: f64,
    pub check_in_accuracy_m: f64,
    pub check_in_distance_m: f64,
    pub check_in_location_valid: bool,
    #[schema(example = "ON_TIME")]
    pub check_in_status: String,
    pub check_in_photo_path: Option<String>,
    pub check_out_lat: Option<f64>,
    pub check_out_lng: Option<f64>,
    pub check_out_accuracy_m: Option<f64>,
    pub check_out_distance_m: Option<f64>,
    pub check_out_location_valid: Option<bool>,
    #[schema(example = "ON_TIME")]
    pub check_out_status: Option<String>,
    pub check_out_photo_path: Option<String>,
    #[schema(example = "PRESENT")]
    pub kind: String,
}

impl AttendanceRow {
    pub fn attendance_kind(&self) -> Option<AttendanceKind> {
        AttendanceKind::from_str(&self.kind).ok()
    }

    pub fn in_status(&self) -> Option<CheckInStatus> {
        CheckInStatus::from_str(&self.check_in_status).ok()
    }

    pub fn out_status(&self) -> Option<CheckOutStatus> {
        self.check_out_status
            .as_deref()
            .and_then(|s| CheckOutStatus::from_str(s).ok())
    }
}

/// Column list matching [`AttendanceRow`], for the runtime-checked
/// queries that load whole rows.
pub const ATTENDANCE_COLUMNS: &str = "id, user_id, date, check_in_at, check_out_at, \
     shift_start, shift_end, check_in_lat, check_in_lng, check_in_accuracy_m, \
     check_in_distance_m, check_in_location_valid, check_in_status, check_in_photo_path, \
     check_out_lat, check_out_lng, check_out_accuracy_m, check_out_distance_m, \
     check_out_location_valid, check_out_status, check_out_photo_path, kind";
