use std::env;
use std::str::FromStr;

use chrono_tz::Tz;
use dotenvy::dotenv;

use crate::engine::decision::AttendancePolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Civil timezone for every day/shift comparison. The host zone
    /// never participates.
    pub timezone: Tz,
    pub attendance_policy: AttendancePolicy,
    pub photo_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .expect("ACCESS_TOKEN_TTL must be a number of seconds"),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .expect("REFRESH_TOKEN_TTL must be a number of seconds"),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("RATE_LOGIN_PER_MIN must be a number"),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("RATE_REFRESH_PER_MIN must be a number"),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("RATE_PROTECTED_PER_MIN must be a number"),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            timezone: Tz::from_str(
                &env::var("TIMEZONE").unwrap_or_else(|_| "Asia/Jakarta".to_string()),
            )
            .expect("TIMEZONE must be a valid IANA zone name"),
            attendance_policy: AttendancePolicy::from_str(
                &env::var("ATTENDANCE_POLICY").unwrap_or_else(|_| "lenient".to_string()),
            )
            .expect("ATTENDANCE_POLICY must be 'lenient' or 'strict'"),
            photo_dir: env::var("PHOTO_DIR").unwrap_or_else(|_| "uploads/presensi".to_string()),
        }
    }
}
