use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::report::daily_stats;
use crate::engine::shifts::civil_now;
use crate::model::attendance::{ATTENDANCE_COLUMNS, AttendanceRow};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DateQuery {
    /// Defaults to today in the civil timezone.
    #[schema(example = "2026-08-03", value_type = String)]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    /// Month in YYYY-MM form.
    #[schema(example = "2026-08")]
    pub month: String,
}

/// One admin-list row: attendance joined with the account.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceListRow {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "Budi Santoso")]
    pub name: String,
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "2026-08-03", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-08-03T08:10:00", value_type = String)]
    pub check_in_at: NaiveDateTime,
    #[schema(example = "2026-08-03T16:02:00", value_type = String)]
    pub check_out_at: Option<NaiveDateTime>,
    #[schema(example = "ON_TIME")]
    pub check_in_status: String,
    #[schema(example = "ON_TIME")]
    pub check_out_status: Option<String>,
    #[schema(example = "PRESENT")]
    pub kind: String,
    pub check_in_location_valid: bool,
    pub check_in_photo_path: Option<String>,
    pub check_out_photo_path: Option<String>,
}

fn month_bounds(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()?;
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)?
    };
    Some((start, next.pred_opt()?))
}

/// Attendance list for one day
#[utoipa::path(
    get,
    path = "/api/v1/admin/presence",
    params(DateQuery),
    responses(
        (status = 200, description = "Attendance rows for the day", body = Object, example = json!({
            "date": "2026-08-03",
            "list": []
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn list_by_date(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<DateQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let date = query
        .date
        .unwrap_or_else(|| civil_now(config.timezone).date());

    let rows = sqlx::query_as::<_, AttendanceListRow>(
        r#"
        SELECT a.id, a.user_id, u.name, u.username, a.date, a.check_in_at, a.check_out_at,
               a.check_in_status, a.check_out_status, a.kind, a.check_in_location_valid,
               a.check_in_photo_path, a.check_out_photo_path
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        WHERE a.date = ?
        ORDER BY a.check_in_at ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, %date, "Failed to list attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "date": date,
        "list": rows,
    })))
}

/// Dashboard counters for one day
#[utoipa::path(
    get,
    path = "/api/v1/admin/presence/stats",
    params(DateQuery),
    responses(
        (status = 200, description = "Daily counters", body = Object, example = json!({
            "date": "2026-08-03",
            "stats": {
                "checked_in": 12, "late": 2, "checked_out": 9,
                "sick": 1, "in_office": 10, "remote": 2
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn stats_by_date(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<DateQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let date = query
        .date
        .unwrap_or_else(|| civil_now(config.timezone).date());

    let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance WHERE date = ?");
    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(date)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %date, "Failed to load attendance for stats");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "date": date,
        "stats": daily_stats(&rows),
    })))
}

/// CSV export for one month
#[utoipa::path(
    get,
    path = "/api/v1/admin/presence/export",
    params(MonthQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 400, description = "Bad month parameter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn export_month(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let Some((start, end)) = month_bounds(&query.month) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "month must be YYYY-MM (e.g. 2026-01)"
        })));
    };

    let rows = sqlx::query_as::<_, AttendanceListRow>(
        r#"
        SELECT a.id, a.user_id, u.name, u.username, a.date, a.check_in_at, a.check_out_at,
               a.check_in_status, a.check_out_status, a.kind, a.check_in_location_valid,
               a.check_in_photo_path, a.check_out_photo_path
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        WHERE a.date >= ? AND a.date <= ?
        ORDER BY a.date ASC, a.check_in_at ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, month = %query.month, "Failed to load attendance for export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let csv_err = |e: csv::Error| {
        tracing::error!(error = %e, "Failed to build CSV");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "date",
            "name",
            "username",
            "check_in",
            "check_out",
            "check_in_status",
            "check_out_status",
            "kind",
        ])
        .map_err(csv_err)?;
    for row in &rows {
        writer
            .write_record([
                row.date.to_string(),
                row.name.clone(),
                row.username.clone(),
                row.check_in_at.format("%H:%M:%S").to_string(),
                row.check_out_at
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
                row.check_in_status.clone(),
                row.check_out_status.clone().unwrap_or_default(),
                row.kind.clone(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        tracing::error!(error = %e, "Failed to flush CSV");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"presensi-{}.csv\"", query.month),
        ))
        .body(bytes))
}

/// Bulk delete one month of attendance
#[utoipa::path(
    delete,
    path = "/api/v1/admin/presence",
    params(MonthQuery),
    responses(
        (status = 200, description = "Rows deleted", body = Object, example = json!({
            "deleted": 120,
            "message": "120 attendance rows for 2026-07 deleted"
        })),
        (status = 400, description = "Bad month parameter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn purge_month(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let Some((start, end)) = month_bounds(&query.month) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "month must be YYYY-MM (e.g. 2026-01)"
        })));
    };

    let result = sqlx::query("DELETE FROM attendance WHERE date >= ? AND date <= ?")
        .bind(start)
        .bind(end)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, month = %query.month, "Failed to purge attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let deleted = result.rows_affected();

    tracing::info!(month = %query.month, deleted, "Attendance purged");

    Ok(HttpResponse::Ok().json(json!({
        "deleted": deleted,
        "message": format!("{} attendance rows for {} deleted", deleted, query.month),
    })))
}
