use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/schedule/generate", post(handlers::generate))
        .route("/select/year/:year", post(handlers::select_year))
        .route("/select/semester/:semester", post(handlers::select_semester))
        .route("/report", get(handlers::report))
        .route("/export", get(handlers::export))
        .route("/api/timetable", get(handlers::api_timetable))
        .route("/api/selection", get(handlers::api_selection))
        .route("/tracker", get(handlers::tracker_page))
        .route("/tracker/role/:role", post(handlers::choose_role))
        .route("/tracker/tasks", post(handlers::add_task))
        .route("/tracker/tasks/:id/complete", post(handlers::complete_task))
        .route("/tracker/tasks/:id/check", post(handlers::rate_task))
        .route("/tracker/wishes", post(handlers::add_wish))
        .route("/tracker/wishes/check", post(handlers::check_wish))
        .with_state(state)
}
