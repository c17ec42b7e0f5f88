use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One leave ("izin") request. The approval workflow lives entirely at
/// the API layer; the attendance core only ever reads APPROVED rows as a
/// pre-excused signal.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct LeaveRow {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "SICK")]
    pub kind: String,
    #[schema(example = "2026-08-04", format = "date", value_type = String)]
    pub leave_date: NaiveDate,
    #[schema(example = "2026-08-09", format = "date", value_type = String)]
    pub swap_date: Option<NaiveDate>,
    #[schema(example = "Demam sejak semalam")]
    pub reason: String,
    pub evidence_photo_path: Option<String>,
    #[schema(example = "PENDING")]
    pub status: Option<String>,
    #[schema(example = "2026-08-03T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
