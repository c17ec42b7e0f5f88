use crate::api::leave::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::api::presence::{CheckInReq, CheckOutReq};
use crate::api::report::{AttendanceListRow, DateQuery, MonthQuery};
use crate::api::settings::{EnabledShiftsPayload, UpdateSettingsReq};
use crate::api::users::{CreateUser, UserQuery};
use crate::engine::classify::{CheckInStatus, CheckOutStatus};
use crate::engine::decision::AttendanceKind;
use crate::engine::geo::{Coordinate, LocationClass};
use crate::engine::report::DailyStats;
use crate::engine::shifts::{DayClassification, ShiftWindow};
use crate::model::attendance::AttendanceRow;
use crate::model::leave::LeaveRow;
use crate::model::user::UserRow;
use crate::models::LoginReqDto;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presensi PKL API",
        version = "1.0.0",
        description = r#"
## Presensi PKL

Attendance tracking for internship (PKL) workers: photo + geolocation
check-in/check-out against admin-configured shift schedules and a
geofenced work area.

### 🔹 Key Features
- **Presence**
  - Check-in/check-out with shift-window matching, lateness
    classification and geofence validation
  - Sick reporting and a today-view for the signed-in worker
- **Admin Settings**
  - Work area (center + radius), curated shift subsets per day type,
    holiday override with automatic expiry
- **Leave Management**
  - Sick / shift-swap requests with approval workflow
- **Reporting**
  - Daily lists and counters, monthly CSV export and purge

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Attendance submission is restricted to the **PKL** role; configuration
and reporting to **ADMIN**.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::presence::check_in,
        crate::api::presence::check_out,
        crate::api::presence::today,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,

        crate::api::leave::create_leave,
        crate::api::leave::my_leaves,
        crate::api::leave::leave_list,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::report::list_by_date,
        crate::api::report::stats_by_date,
        crate::api::report::export_month,
        crate::api::report::purge_month,

        crate::api::users::create_user,
        crate::api::users::list_users,
        crate::api::users::update_user,
        crate::api::users::delete_user
    ),
    components(
        schemas(
            LoginReqDto,
            CheckInReq,
            CheckOutReq,
            UpdateSettingsReq,
            EnabledShiftsPayload,
            ShiftWindow,
            DayClassification,
            Coordinate,
            LocationClass,
            CheckInStatus,
            CheckOutStatus,
            AttendanceKind,
            AttendanceRow,
            AttendanceListRow,
            DailyStats,
            DateQuery,
            MonthQuery,
            CreateLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveRow,
            CreateUser,
            UserQuery,
            UserRow
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Presence", description = "Check-in/check-out APIs"),
        (name = "Settings", description = "Work area and schedule configuration"),
        (name = "Leave", description = "Leave request APIs"),
        (name = "Report", description = "Admin reporting APIs"),
        (name = "Users", description = "Account management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
