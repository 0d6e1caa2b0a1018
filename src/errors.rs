use axum::http::StatusCode;
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure of a call to one of the backends.
#[derive(Debug)]
pub enum ApiError {
    /// The backend rejected the uploaded data with a list of reasons.
    Validation { title: String, errors: Vec<String> },
    /// The backend answered, but with an error or an unusable payload.
    Backend(String),
    Transport(reqwest::Error),
    NoSchedule,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation { title, errors } => {
                write!(f, "{title} ({} problems)", errors.len())
            }
            ApiError::Backend(message) => f.write_str(message),
            ApiError::Transport(err) => write!(f, "Error: {err}"),
            ApiError::NoSchedule => f.write_str("No schedule available"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation { .. } => AppError::bad_request(err.to_string()),
            ApiError::NoSchedule => AppError::not_found(err.to_string()),
            ApiError::Backend(_) | ApiError::Transport(_) => AppError::bad_gateway(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_map_to_http_statuses() {
        let missing = AppError::from(ApiError::NoSchedule);
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, "No schedule available");

        let down = AppError::from(ApiError::Backend("backend answered 500".to_string()));
        assert_eq!(down.status, StatusCode::BAD_GATEWAY);
        assert_eq!(down.message, "backend answered 500");

        let invalid = AppError::from(ApiError::Validation {
            title: "Data validation failed".to_string(),
            errors: vec!["bad year".to_string()],
        });
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    }
}
