use crate::{
    api::{leave, presence, report, settings, users},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/presence")
                    // /presence/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(presence::check_in)),
                    )
                    // /presence/check-out
                    .service(
                        web::resource("/check-out").route(web::post().to(presence::check_out)),
                    )
                    // /presence/today
                    .service(web::resource("/today").route(web::get().to(presence::today))),
            )
            .service(web::resource("/settings").route(web::get().to(settings::get_settings)))
            .service(
                web::scope("/leave")
                    // /leave
                    .service(web::resource("").route(web::post().to(leave::create_leave)))
                    // /leave/mine
                    .service(web::resource("/mine").route(web::get().to(leave::my_leaves))),
            )
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/settings").route(web::put().to(settings::update_settings)),
                    )
                    .service(
                        web::scope("/presence")
                            // /admin/presence
                            .service(
                                web::resource("")
                                    .route(web::get().to(report::list_by_date))
                                    .route(web::delete().to(report::purge_month)),
                            )
                            // /admin/presence/stats
                            .service(
                                web::resource("/stats")
                                    .route(web::get().to(report::stats_by_date)),
                            )
                            // /admin/presence/export
                            .service(
                                web::resource("/export")
                                    .route(web::get().to(report::export_month)),
                            ),
                    )
                    .service(
                        web::scope("/leave")
                            // /admin/leave
                            .service(web::resource("").route(web::get().to(leave::leave_list)))
                            // /admin/leave/{id}/approve
                            .service(
                                web::resource("/{id}/approve")
                                    .route(web::put().to(leave::approve_leave)),
                            )
                            // /admin/leave/{id}/reject
                            .service(
                                web::resource("/{id}/reject")
                                    .route(web::put().to(leave::reject_leave)),
                            ),
                    )
                    .service(
                        web::scope("/users")
                            // /admin/users
                            .service(
                                web::resource("")
                                    .route(web::post().to(users::create_user))
                                    .route(web::get().to(users::list_users)),
                            )
                            // /admin/users/{id}
                            .service(
                                web::resource("/{id}")
                                    .route(web::put().to(users::update_user))
                                    .route(web::delete().to(users::delete_user)),
                            ),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
