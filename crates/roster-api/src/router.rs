//! Axum router construction for the Roster API.
//!
//! Assembles all REST routes and the dashboard into a single [`Router`]
//! with CORS middleware enabled so a separately hosted frontend can call
//! the API.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- health check with database time
/// - `GET|POST /students`, `GET /students/{id}` and its `courses` and
///   `stats` sub-resources
/// - `GET|POST /courses`, `GET /courses/{id}` and its `grades`, `students`
///   and `stats` sub-resources
/// - `GET|POST|PUT /enrollments`
/// - `GET /stats` -- dashboard statistics as JSON
/// - `GET /dashboard` -- HTML dashboard
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/", get(handlers::index))
        // Students
        .route(
            "/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route("/students/{id}", get(handlers::get_student))
        .route("/students/{id}/courses", get(handlers::student_courses))
        .route("/students/{id}/stats", get(handlers::student_stats))
        // Courses
        .route(
            "/courses",
            get(handlers::list_courses).post(handlers::create_course),
        )
        .route("/courses/{id}", get(handlers::get_course))
        .route("/courses/{id}/grades", get(handlers::course_grades))
        .route("/courses/{id}/students", get(handlers::course_students))
        .route("/courses/{id}/stats", get(handlers::course_stats))
        // Enrollments
        .route(
            "/enrollments",
            get(handlers::list_enrollments)
                .post(handlers::enroll)
                .put(handlers::record_grade),
        )
        // Statistics
        .route("/stats", get(handlers::get_stats))
        .route("/dashboard", get(handlers::get_dashboard))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
