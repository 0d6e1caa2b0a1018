use crate::errors::ApiError;
use std::time::Duration;

const VALIDATION_VISIBLE_FOR: Duration = Duration::from_secs(10);
const ALERT_VISIBLE_FOR: Duration = Duration::from_millis(3200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub items: Vec<String>,
}

impl Alert {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
            items: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.into(),
            items: Vec::new(),
        }
    }

    pub fn validation(title: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            kind: AlertKind::Validation,
            message: title.into(),
            items: errors,
        }
    }

    pub fn report_failed(err: &ApiError) -> Self {
        Alert::error(format!("Error loading report: {err}"))
    }

    pub fn visible_for(&self) -> Duration {
        match self.kind {
            AlertKind::Validation => VALIDATION_VISIBLE_FOR,
            AlertKind::Success | AlertKind::Error => ALERT_VISIBLE_FOR,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            AlertKind::Success => "alert alert-success",
            AlertKind::Error => "alert alert-error",
            AlertKind::Validation => "alert alert-error validation-alert",
        }
    }

    /// Plain-text body: validation banners list every problem, numbered.
    pub fn text(&self) -> String {
        if self.kind != AlertKind::Validation {
            return self.message.clone();
        }
        let mut text = format!("{}:\n\n", self.message);
        for (idx, item) in self.items.iter().enumerate() {
            text.push_str(&format!("{}. {item}\n", idx + 1));
        }
        text.push_str("\nPlease fix these errors and try again.");
        text
    }
}

impl From<&ApiError> for Alert {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Validation { title, errors } => Alert::validation(title, errors.clone()),
            other => Alert::error(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_banner_numbers_each_error() {
        let alert = Alert::from(&ApiError::Validation {
            title: "Data validation failed".to_string(),
            errors: vec!["missing code".to_string(), "bad year".to_string()],
        });

        assert_eq!(alert.kind, AlertKind::Validation);
        assert_eq!(alert.visible_for(), Duration::from_secs(10));
        assert_eq!(
            alert.text(),
            "Data validation failed:\n\n1. missing code\n2. bad year\n\nPlease fix these errors and try again."
        );
    }

    #[test]
    fn other_failures_are_short_lived() {
        let alert = Alert::from(&ApiError::Backend("Failed to generate schedule".to_string()));
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.visible_for(), Duration::from_millis(3200));
        assert_eq!(alert.text(), "Failed to generate schedule");
    }

    #[test]
    fn report_failures_say_what_failed() {
        let alert = Alert::report_failed(&ApiError::Backend("backend answered 503".to_string()));
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.text(), "Error loading report: backend answered 503");
    }
}
