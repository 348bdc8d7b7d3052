pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use self::middleware::auth as auth_middleware;
use self::routes::{admin, auth, counsellor, directory, events, health, students};
pub use self::state::AppState;

/// Full application router. Public and protected routes use disjoint paths.
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/events",
            get(events::list_events_handler).post(events::create_event_handler),
        )
        .route("/events/:event_id", get(events::event_detail_handler))
        .route(
            "/events/:event_id/approve",
            post(events::approve_event_handler),
        )
        .route("/events/:event_id/status", post(events::event_status_handler))
        .route("/events/:event_id/register", post(events::register_handler))
        .route(
            "/events/:event_id/registrations",
            get(events::registrations_handler),
        )
        .route(
            "/counsellor/events/:event_id/verify",
            post(counsellor::verify_participation_handler),
        )
        .route("/students", get(students::list_students_handler))
        .route("/students/:student_id", get(students::student_detail_handler))
        .route(
            "/students/:student_id/points",
            get(students::student_points_handler),
        )
        .route(
            "/students/:student_id/certificates",
            get(students::list_certificates_handler).post(students::add_certificate_handler),
        )
        .route(
            "/students/:student_id/certificates/:certificate_id/verify",
            post(students::verify_certificate_handler),
        )
        .route("/clubs/:club_id", get(directory::club_detail_handler))
        .route("/admin/counsellors", post(admin::create_counsellor_handler))
        .route("/admin/branches", post(admin::create_branch_handler))
        .route("/admin/reconcile", post(admin::reconcile_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    Router::new()
        // Public routes
        .route("/health", get(health::health_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/clubs", get(directory::clubs_handler))
        .route("/counsellors", get(directory::counsellors_handler))
        .route("/teachers", get(directory::teachers_handler))
        .route("/branches", get(directory::branches_handler))
        // Protected routes
        .merge(protected_routes)
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
