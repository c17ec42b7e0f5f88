use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::decision::{evaluate_check_in, evaluate_check_out};
use crate::engine::geo::{Coordinate, GeoFix};
use crate::engine::shifts::{civil_now, classify_day, shifts_for};
use crate::model::attendance::{ATTENDANCE_COLUMNS, AttendanceRow};
use crate::model::settings::{self, SettingsSnapshot};
use crate::utils::photo::save_photo;

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    /// Required unless `sick` is set.
    pub photo_base64: Option<String>,
    #[schema(example = -7.7598)]
    pub lat: f64,
    #[schema(example = 110.3953)]
    pub lng: f64,
    /// GPS accuracy radius in meters as reported by the device.
    #[schema(example = 25.0)]
    pub accuracy: f64,
    #[serde(default)]
    pub sick: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutReq {
    pub photo_base64: String,
    #[schema(example = -7.7598)]
    pub lat: f64,
    #[schema(example = 110.3953)]
    pub lng: f64,
    #[schema(example = 25.0)]
    pub accuracy: f64,
}

fn fix_is_sane(lat: f64, lng: f64, accuracy: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && accuracy.is_finite()
        && accuracy >= 0.0
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// Loads the latest settings row, collapsed to a per-request snapshot.
/// `Ok(None)` means the admin has not configured the work area yet.
async fn load_snapshot(pool: &MySqlPool) -> actix_web::Result<Option<SettingsSnapshot>> {
    let row = settings::load_latest(pool).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to load settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    Ok(row.as_ref().and_then(SettingsSnapshot::from_row))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/presence/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Checked in", body = Object, example = json!({
            "status": "ON_TIME",
            "location_class": "IN_OFFICE",
            "kind": "PRESENT"
        })),
        (status = 400, description = "Rejected (window, location, config or duplicate)", body = Object, example = json!({
            "error": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presence"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckInReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_pkl()?;

    if !fix_is_sane(payload.lat, payload.lng, payload.accuracy) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "lat, lng and accuracy must be finite and in range"
        })));
    }
    let needs_photo = !payload.sick;
    if needs_photo && payload.photo_base64.as_deref().unwrap_or("").is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "photo_base64 is required unless reporting sick"
        })));
    }

    let Some(snapshot) = load_snapshot(pool.get_ref()).await? else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Work area has not been configured by the admin"
        })));
    };

    let now = civil_now(config.timezone);
    let today = now.date();

    let classification = classify_day(today, snapshot.holiday_override);
    let shifts = shifts_for(classification, &snapshot.enabled);

    let fix = GeoFix {
        coord: Coordinate {
            lat: payload.lat,
            lng: payload.lng,
        },
        accuracy_m: payload.accuracy,
    };

    let decision = match evaluate_check_in(
        now,
        &shifts,
        &snapshot.area,
        &fix,
        payload.sick,
        config.attendance_policy,
    ) {
        Ok(d) => d,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() })));
        }
    };

    // Friendly duplicate answer before the photo is written; the unique
    // key below still guards the race.
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE user_id = ? AND date = ?",
    )
    .bind(auth.user_id)
    .bind(today)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-in lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;
    if existing > 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Already checked in today"
        })));
    }

    let photo_path = if needs_photo {
        let raw = payload.photo_base64.as_deref().unwrap_or("");
        match save_photo(&config.photo_dir, raw, auth.user_id, "in") {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::error!(error = %e, user_id = auth.user_id, "Failed to store check-in photo");
                return Err(actix_web::error::ErrorInternalServerError(
                    "Internal Server Error",
                ));
            }
        }
    } else {
        None
    };

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (
            user_id, date, check_in_at, shift_start, shift_end,
            check_in_lat, check_in_lng, check_in_accuracy_m, check_in_distance_m,
            check_in_location_valid, check_in_status, check_in_photo_path, kind
        ) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?)
        "#,
    )
    .bind(auth.user_id)
    .bind(today)
    .bind(now)
    .bind(decision.shift.start)
    .bind(decision.shift.end)
    .bind(payload.lat)
    .bind(payload.lng)
    .bind(payload.accuracy)
    .bind(decision.geo.distance_m)
    .bind(decision.geo.valid)
    .bind(decision.status.to_string())
    .bind(&photo_path)
    .bind(decision.kind.to_string())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "status": decision.status,
            "location_class": decision.location,
            "kind": decision.kind,
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "error": "Already checked in today"
                    })));
                }
            }

            tracing::error!(error = %e, user_id = auth.user_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/presence/check-out",
    request_body = CheckOutReq,
    responses(
        (status = 200, description = "Checked out", body = Object, example = json!({
            "status": "ON_TIME",
            "location_class": "IN_OFFICE"
        })),
        (status = 400, description = "Rejected (not checked in, duplicate, too early, sick or location)", body = Object, example = json!({
            "error": "Not checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presence"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CheckOutReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_pkl()?;

    if !fix_is_sane(payload.lat, payload.lng, payload.accuracy) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "lat, lng and accuracy must be finite and in range"
        })));
    }
    if payload.photo_base64.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "photo_base64 is required"
        })));
    }

    let Some(snapshot) = load_snapshot(pool.get_ref()).await? else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Work area has not been configured by the admin"
        })));
    };

    let now = civil_now(config.timezone);
    let today = now.date();

    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE user_id = ? AND date = ?");
    let row = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(auth.user_id)
        .bind(today)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Check-out lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(row) = row else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Not checked in today"
        })));
    };
    if row.check_out_at.is_some() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Already checked out today"
        })));
    }

    let kind = row
        .attendance_kind()
        .unwrap_or(crate::engine::decision::AttendanceKind::Present);

    let fix = GeoFix {
        coord: Coordinate {
            lat: payload.lat,
            lng: payload.lng,
        },
        accuracy_m: payload.accuracy,
    };

    // judged against the shift frozen at check-in, not today's catalog
    let decision = match evaluate_check_out(
        now,
        kind,
        row.shift_end,
        &snapshot.area,
        &fix,
        config.attendance_policy,
    ) {
        Ok(d) => d,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "error": e.to_string() })));
        }
    };

    let photo_path = match save_photo(&config.photo_dir, &payload.photo_base64, auth.user_id, "out")
    {
        Ok(name) => name,
        Err(e) => {
            tracing::error!(error = %e, user_id = auth.user_id, "Failed to store check-out photo");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out_at = ?, check_out_lat = ?, check_out_lng = ?,
            check_out_accuracy_m = ?, check_out_distance_m = ?,
            check_out_location_valid = ?, check_out_status = ?, check_out_photo_path = ?
        WHERE user_id = ?
        AND date = ?
        AND check_out_at IS NULL
        "#,
    )
    .bind(now)
    .bind(payload.lat)
    .bind(payload.lng)
    .bind(payload.accuracy)
    .bind(decision.geo.distance_m)
    .bind(decision.geo.valid)
    .bind(decision.status.to_string())
    .bind(&photo_path)
    .bind(auth.user_id)
    .bind(today)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Already checked out today"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": decision.status,
        "location_class": decision.location,
    })))
}

/// Today's attendance for the signed-in PKL
#[utoipa::path(
    get,
    path = "/api/v1/presence/today",
    responses(
        (status = 200, description = "Today's record, or null if none", body = Object, example = json!({
            "date": "2026-08-03",
            "record": null
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presence"
)]
pub async fn today(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    auth.require_pkl()?;

    let today = civil_now(config.timezone).date();

    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE user_id = ? AND date = ?");
    let row = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(auth.user_id)
        .bind(today)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.user_id, "Today lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "date": today,
        "record": row,
    })))
}
