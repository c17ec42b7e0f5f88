use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::shifts::{
    EnabledShifts, ShiftWindow, civil_now, classify_day, shifts_for,
};
use crate::model::settings::{self, SettingsSnapshot};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct EnabledShiftsPayload {
    /// Omitted day types keep the built-in catalog; an empty list
    /// disables the day type entirely.
    pub weekday: Option<Vec<ShiftWindow>>,
    pub saturday: Option<Vec<ShiftWindow>>,
    pub sunday: Option<Vec<ShiftWindow>>,
}

impl EnabledShiftsPayload {
    fn into_enabled(self) -> EnabledShifts {
        let normalize = |list: Vec<ShiftWindow>| {
            list.into_iter()
                .map(|s| ShiftWindow::new(s.start, s.end))
                .collect::<Vec<_>>()
        };
        EnabledShifts {
            weekday: self.weekday.map(normalize),
            saturday: self.saturday.map(normalize),
            sunday: self.sunday.map(normalize),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSettingsReq {
    #[schema(example = "Kantor Pusat")]
    pub area_name: Option<String>,
    #[schema(example = -7.7598)]
    pub area_lat: Option<f64>,
    #[schema(example = 110.3953)]
    pub area_lng: Option<f64>,
    #[schema(example = 100.0)]
    pub area_radius_m: Option<f64>,
    pub enabled_shifts: Option<EnabledShiftsPayload>,
    /// Forces today into the holiday schedule; expires automatically at
    /// the civil-date rollover.
    #[serde(default)]
    pub force_holiday: bool,
}

/// Current settings + today's resolved schedule
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Current settings (null until configured)", body = Object, example = json!({
            "settings": {
                "area_name": "Kantor Pusat",
                "area_lat": -7.7598,
                "area_lng": 110.3953,
                "area_radius_m": 100.0,
                "force_holiday_active": false,
                "updated_at": "2026-08-01T03:00:00Z"
            },
            "today": {
                "date": "2026-08-03",
                "classification": "WEEKDAY",
                "shifts": [{"start": "08:00", "end": "16:00", "label": "08:00 - 16:00"}]
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let row = settings::load_latest(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let today = civil_now(config.timezone).date();

    let Some(row) = row else {
        return Ok(HttpResponse::Ok().json(json!({ "settings": null, "today": null })));
    };

    let snapshot = SettingsSnapshot::from_row(&row);
    let today_block = snapshot.as_ref().map(|snap| {
        let classification = classify_day(today, snap.holiday_override);
        json!({
            "date": today,
            "classification": classification,
            "shifts": shifts_for(classification, &snap.enabled),
        })
    });

    Ok(HttpResponse::Ok().json(json!({
        "settings": {
            "area_name": row.area_name,
            "area_lat": row.area_lat,
            "area_lng": row.area_lng,
            "area_radius_m": row.area_radius_m,
            "force_holiday_active": row.force_holiday_date == Some(today),
            "updated_at": row.updated_at,
        },
        "today": today_block,
    })))
}

/// Replace the admin settings (area, shift curation, holiday override)
#[utoipa::path(
    put,
    path = "/api/v1/admin/settings",
    request_body = UpdateSettingsReq,
    responses(
        (status = 200, description = "Settings saved", body = Object, example = json!({
            "message": "Settings saved"
        })),
        (status = 400, description = "Invalid area values"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<UpdateSettingsReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let payload = payload.into_inner();

    if let (Some(lat), Some(lng)) = (payload.area_lat, payload.area_lng) {
        if !lat.is_finite() || !lng.is_finite() || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "area_lat/area_lng out of range"
            })));
        }
    }
    if let Some(radius) = payload.area_radius_m {
        if !radius.is_finite() || radius <= 0.0 {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "area_radius_m must be a positive number"
            })));
        }
    }

    let enabled_json = payload
        .enabled_shifts
        .map(|p| p.into_enabled())
        .and_then(|enabled| enabled.to_stored_json());

    // The override is stored as today's civil date so it expires on its
    // own at rollover; switching it off clears the column.
    let holiday_date = if payload.force_holiday {
        Some(civil_now(config.timezone).date())
    } else {
        None
    };

    let existing = sqlx::query_scalar::<_, u64>("SELECT id FROM settings ORDER BY id DESC LIMIT 1")
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load settings row id");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let write = if let Some(id) = existing {
        sqlx::query(
            r#"
            UPDATE settings
            SET area_name = ?, area_lat = ?, area_lng = ?, area_radius_m = ?,
                enabled_shifts = ?, force_holiday_date = ?, updated_by = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&payload.area_name)
        .bind(payload.area_lat)
        .bind(payload.area_lng)
        .bind(payload.area_radius_m)
        .bind(&enabled_json)
        .bind(holiday_date)
        .bind(auth.user_id)
        .bind(id)
        .execute(pool.get_ref())
        .await
    } else {
        sqlx::query(
            r#"
            INSERT INTO settings
                (area_name, area_lat, area_lng, area_radius_m, enabled_shifts,
                 force_holiday_date, updated_by, updated_at)
            VALUES (?,?,?,?,?,?,?,NOW())
            "#,
        )
        .bind(&payload.area_name)
        .bind(payload.area_lat)
        .bind(payload.area_lng)
        .bind(payload.area_radius_m)
        .bind(&enabled_json)
        .bind(holiday_date)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await
    };

    write.map_err(|e| {
        tracing::error!(error = %e, "Failed to save settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Settings saved"
    })))
}
