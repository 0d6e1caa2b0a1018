pub mod alerts;
pub mod app;
pub mod client;
pub mod config;
pub mod conflicts;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod semesters;
pub mod state;
pub mod timetable;
pub mod tracker;
pub mod tracker_ui;
pub mod ui;

pub use app::router;
pub use client::{ScheduleApi, TrackerApi, build_http_client};
pub use config::Config;
pub use state::AppState;
