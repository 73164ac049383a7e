use crate::{
    api::{
        attendance, overview,
        response::{json_error_handler, method_not_allowed, preflight, query_error_handler},
        student,
    },
    auth::handlers,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{Resource, http::Method, middleware::DefaultHeaders, web};
use std::sync::Arc;

/// Permissive CORS, sent on every response.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", "Content-Type, Authorization"))
        .add(("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"))
}

/// A resource that answers preflight and turns unknown methods into the
/// 405 envelope.
fn endpoint(path: &str) -> Resource {
    web::resource(path)
        .route(web::method(Method::OPTIONS).to(preflight))
        .default_service(web::to(method_not_allowed))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let burst = requests_per_min.max(1);
        let per_ms = (60_000 / u64::from(burst)).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(burst)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("period and burst size are non-zero");
        Governor::new(&cfg)
    }

    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));
    let write_limiter = Arc::new(build_limiter(config.rate_write_per_min));
    let auth_limiter = Arc::new(build_limiter(config.rate_auth_per_min));

    // Malformed bodies and query strings get the same envelope as our own 400s
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler));

    // Instructor card lock
    cfg.service(
        web::scope(&config.auth_prefix)
            .service(
                endpoint("/card-swipe")
                    .wrap(auth_limiter.clone())
                    .route(web::post().to(handlers::card_swipe)),
            )
            .service(
                endpoint("/status")
                    .wrap(read_limiter.clone())
                    .route(web::get().to(handlers::status)),
            )
            .service(
                endpoint("/logout")
                    .wrap(auth_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Attendance API
    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                endpoint("/register-student")
                    .wrap(write_limiter.clone())
                    .route(web::post().to(student::register_student)),
            )
            .service(
                endpoint("/get-students")
                    .wrap(read_limiter.clone())
                    .route(web::get().to(student::list_students)),
            )
            .service(
                endpoint("/delete-student")
                    .wrap(write_limiter.clone())
                    .route(web::delete().to(student::delete_student)),
            )
            .service(
                // POST marks present, DELETE marks absent
                endpoint("/mark-attendance")
                    .wrap(write_limiter)
                    .route(web::post().to(attendance::mark_present))
                    .route(web::delete().to(attendance::mark_absent)),
            )
            .service(
                endpoint("/get-attendance")
                    .wrap(read_limiter.clone())
                    .route(web::get().to(attendance::get_attendance)),
            )
            .service(
                endpoint("/get-attendance-overview")
                    .wrap(read_limiter.clone())
                    .route(web::get().to(overview::attendance_overview)),
            )
            .service(
                endpoint("/get-attendance-history")
                    .wrap(read_limiter)
                    .route(web::get().to(attendance::attendance_history)),
            ),
    );
}
