use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::model::role::Role;
use crate::model::user::UserRow;
use crate::utils::db_utils::{build_update_sql, execute_update};

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "Budi Santoso")]
    pub name: String,
    #[schema(example = "budi")]
    pub username: String,
    #[schema(example = "rahasia")]
    pub password: String,
    #[schema(example = "PKL")]
    pub role: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Substring match on name or username
    pub search: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 20)]
    pub per_page: Option<u64>,
}

/// Columns the admin may touch through the dynamic update.
const UPDATABLE_COLUMNS: &[&str] = &["name", "username", "password", "role", "is_active"];

/// Create account (admin)
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = Object, example = json!({
            "message": "User created"
        })),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username already exists"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn create_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let name = payload.name.trim();
    let username = payload.username.trim().to_lowercase();

    if name.is_empty() || username.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "name, username and password must not be empty"
        })));
    }
    if Role::from_str(&payload.role).is_err() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "role must be ADMIN or PKL"
        })));
    }

    let hashed = hash_password(&payload.password).map_err(|e| {
        tracing::error!(error = %e, "Failed to hash password");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let result = sqlx::query(
        r#"INSERT INTO users (name, username, password, role) VALUES (?, ?, ?, ?)"#,
    )
    .bind(name)
    .bind(&username)
    .bind(&hashed)
    .bind(&payload.role)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "User created"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "error": "Username already exists"
                    })));
                }
            }

            tracing::error!(error = %e, "Failed to create user");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// List accounts (admin)
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Paginated account list", body = Object, example = json!({
            "data": [], "page": 1, "per_page": 20, "total": 0
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<UserQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let search = query.search.as_deref().map(|s| format!("%{}%", s.trim()));
    if search.is_some() {
        where_sql.push_str(" AND (name LIKE ? OR username LIKE ?)");
    }

    let count_sql = format!("SELECT COUNT(*) FROM users{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(pattern) = &search {
        count_q = count_q.bind(pattern).bind(pattern);
    }
    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT id, name, username, role, is_active, created_at FROM users{} \
         ORDER BY name ASC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, UserRow>(&data_sql);
    if let Some(pattern) = &search {
        data_q = data_q.bind(pattern).bind(pattern);
    }
    let users = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list users");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "data": users,
        "page": page,
        "per_page": per_page,
        "total": total,
    })))
}

/// Update account fields (admin)
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Account to update")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Account updated", body = Object, example = json!({
            "message": "User updated"
        })),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Account not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();
    let mut payload = payload.into_inner();

    if let Some(obj) = payload.as_object_mut() {
        // role sanity before it hits SQL
        if let Some(role) = obj.get("role").and_then(Value::as_str) {
            if Role::from_str(role).is_err() {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "error": "role must be ADMIN or PKL"
                })));
            }
        }
        // passwords are stored hashed, never verbatim
        if let Some(raw) = obj.get("password").and_then(Value::as_str) {
            if raw.is_empty() {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "error": "password must not be empty"
                })));
            }
            let hashed = hash_password(raw).map_err(|e| {
                tracing::error!(error = %e, "Failed to hash password");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
            obj.insert("password".into(), Value::String(hashed));
        }
    }

    let update = build_update_sql("users", &payload, UPDATABLE_COLUMNS, "id", user_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, user_id, "Failed to update user");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "error": "User not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "User updated"
    })))
}

/// Delete account (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{user_id}",
    params(
        ("user_id" = u64, Path, description = "Account to delete")
    ),
    responses(
        (status = 200, description = "Account deleted", body = Object, example = json!({
            "message": "User deleted"
        })),
        (status = 404, description = "Account not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn delete_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();

    if user_id == auth.user_id {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Cannot delete the signed-in account"
        })));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id, "Failed to delete user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "error": "User not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "User deleted"
    })))
}
