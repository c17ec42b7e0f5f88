use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::engine::geo::{AreaConfig, Coordinate, MAX_ACCURACY_M};
use crate::engine::shifts::{EnabledShifts, parse_enabled_shifts};

/// Raw settings row. Singleton in practice; the newest row wins.
#[derive(Debug, FromRow)]
pub struct SettingsRow {
    pub id: u64,
    pub area_name: Option<String>,
    pub area_lat: Option<f64>,
    pub area_lng: Option<f64>,
    pub area_radius_m: Option<f64>,
    pub enabled_shifts: Option<String>,
    pub force_holiday_date: Option<NaiveDate>,
    pub updated_by: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Read-only view of the admin settings, taken once per request and
/// passed through the decision chain as a snapshot.
#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    pub area: AreaConfig,
    pub area_name: Option<String>,
    pub enabled: EnabledShifts,
    pub holiday_override: Option<NaiveDate>,
}

impl SettingsSnapshot {
    /// Collapses the raw row to the canonical shape. `None` when the
    /// work area has not been configured yet (attendance is impossible
    /// until the admin sets it).
    pub fn from_row(row: &SettingsRow) -> Option<Self> {
        let lat = row.area_lat?;
        let lng = row.area_lng?;
        let radius_m = row.area_radius_m?;
        Some(Self {
            area: AreaConfig {
                center: Coordinate { lat, lng },
                radius_m,
                max_accuracy_m: MAX_ACCURACY_M,
            },
            area_name: row.area_name.clone(),
            enabled: parse_enabled_shifts(row.enabled_shifts.as_deref()),
            holiday_override: row.force_holiday_date,
        })
    }
}

pub async fn load_latest(pool: &MySqlPool) -> Result<Option<SettingsRow>, sqlx::Error> {
    sqlx::query_as::<_, SettingsRow>(
        "SELECT id, area_name, area_lat, area_lng, area_radius_m, enabled_shifts, \
         force_holiday_date, updated_by, updated_at \
         FROM settings ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}
