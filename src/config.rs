use std::{env, net::SocketAddr, time::Duration};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SCHEDULE_API: &str = "http://localhost:5000/api";
const DEFAULT_TRACKER_API: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the timetable backend, e.g. `http://host:5000/api`.
    pub schedule_api: String,
    /// Base URL of the task/wish backend.
    pub tracker_api: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self {
            port,
            schedule_api: base_url("SCHEDULE_API_URL", DEFAULT_SCHEDULE_API),
            tracker_api: base_url("TRACKER_API_URL", DEFAULT_TRACKER_API),
            request_timeout,
            user_agent: format!("dashboards/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn base_url(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
