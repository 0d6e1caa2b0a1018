use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{ExportFormat, Report, Schedule, ScheduleResponse};
use crate::tracker::{NewTask, NewWish, Task, TaskFilter, Wish, WishStatus};
use reqwest::{
    Client, Response, Url,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

const GENERATE_FAILED: &str = "Failed to generate schedule";
const VALIDATION_FAILED: &str = "Data validation failed";

pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .build()
}

#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Budget {
    budget: i64,
}

#[derive(Debug, Deserialize)]
struct Level {
    level: u32,
}

#[derive(Debug, Serialize)]
struct Rating {
    rating: i64,
}

#[derive(Debug, Serialize)]
struct WishDecision {
    status: WishStatus,
    level: Option<u32>,
}

/// One backend rooted at a base URL such as `http://host:5000/api`.
#[derive(Clone, Debug)]
struct Backend {
    http: Client,
    base: String,
}

impl Backend {
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let invalid = || ApiError::Backend(format!("invalid backend url: {}", self.base));
        let mut url = Url::parse(&self.base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Posts an optional JSON body and returns the backend's `message`.
    async fn post_json<B: Serialize>(
        &self,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("POST {url}");
        let request = self.http.post(url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        let response = ensure_success(request.send().await?).await?;
        let body: ErrorBody = response.json().await.unwrap_or_default();
        Ok(body.message)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = body
        .error
        .or(body.message)
        .unwrap_or_else(|| format!("backend answered {status}"));
    Err(ApiError::Backend(message))
}

/// Client of the timetable backend.
#[derive(Clone, Debug)]
pub struct ScheduleApi {
    backend: Backend,
}

impl ScheduleApi {
    pub fn new(http: Client, base: impl Into<String>) -> Self {
        Self {
            backend: Backend {
                http,
                base: base.into(),
            },
        }
    }

    /// Uploads a data file and returns the freshly generated schedule.
    pub async fn generate(&self, file_name: String, bytes: Vec<u8>) -> Result<Schedule, ApiError> {
        let url = self.backend.endpoint(&["schedule", "generate"])?;
        let form = Form::new().part("data", Part::bytes(bytes).file_name(file_name));
        let response = self.backend.http.post(url).multipart(form).send().await?;
        let status = response.status();

        let body = match response.json::<ScheduleResponse>().await {
            Ok(body) => body,
            Err(err) if !status.is_success() => {
                warn!("unreadable error body from schedule generation: {err}");
                ScheduleResponse::default()
            }
            Err(err) => return Err(err.into()),
        };

        if !status.is_success() {
            return Err(match body.validation_errors {
                Some(errors) => ApiError::Validation {
                    title: body.error.unwrap_or_else(|| VALIDATION_FAILED.to_string()),
                    errors,
                },
                None => ApiError::Backend(body.error.unwrap_or_else(|| GENERATE_FAILED.to_string())),
            });
        }

        match (body.success, body.schedule) {
            (Some(true), Some(schedule)) => Ok(schedule),
            _ => Err(ApiError::Backend(
                body.error.unwrap_or_else(|| GENERATE_FAILED.to_string()),
            )),
        }
    }

    /// The schedule the backend currently holds, if any.
    pub async fn current(&self) -> Result<Option<Schedule>, ApiError> {
        let body: ScheduleResponse = self.backend.get_json(&["schedule", "get"]).await?;
        Ok(match (body.success, body.schedule) {
            (Some(true), Some(schedule)) => Some(schedule),
            _ => None,
        })
    }

    pub async fn report(&self) -> Result<Report, ApiError> {
        self.backend.get_json(&["report"]).await
    }

    pub fn export_url(&self, format: ExportFormat) -> Result<Url, ApiError> {
        let mut url = self.backend.endpoint(&["schedule", "export"])?;
        url.query_pairs_mut().append_pair("format", format.as_str());
        Ok(url)
    }
}

/// Client of the task/wish backend.
#[derive(Clone, Debug)]
pub struct TrackerApi {
    backend: Backend,
}

impl TrackerApi {
    pub fn new(http: Client, base: impl Into<String>) -> Self {
        Self {
            backend: Backend {
                http,
                base: base.into(),
            },
        }
    }

    pub async fn budget(&self) -> Result<i64, ApiError> {
        let body: Budget = self.backend.get_json(&["status", "budget"]).await?;
        Ok(body.budget)
    }

    pub async fn level(&self) -> Result<u32, ApiError> {
        let body: Level = self.backend.get_json(&["status", "level"]).await?;
        Ok(body.level)
    }

    pub async fn tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, ApiError> {
        self.backend.get_json(&["tasks", filter.as_str()]).await
    }

    pub async fn wishes(&self) -> Result<Vec<Wish>, ApiError> {
        self.backend.get_json(&["wishes", "all"]).await
    }

    pub async fn add_task(&self, task: &NewTask) -> Result<Option<String>, ApiError> {
        self.backend.post_json(&["tasks", "add"], Some(task)).await
    }

    pub async fn complete_task(&self, task_id: i64) -> Result<Option<String>, ApiError> {
        let id = task_id.to_string();
        self.backend
            .post_json::<()>(&["tasks", id.as_str(), "complete"], None)
            .await
    }

    pub async fn rate_task(&self, task_id: i64, rating: i64) -> Result<Option<String>, ApiError> {
        let id = task_id.to_string();
        self.backend
            .post_json(&["tasks", id.as_str(), "check"], Some(&Rating { rating }))
            .await
    }

    pub async fn add_wish(&self, wish: &NewWish) -> Result<Option<String>, ApiError> {
        self.backend.post_json(&["wishes", "add"], Some(wish)).await
    }

    pub async fn check_wish(
        &self,
        wish_id: &str,
        status: WishStatus,
        level: Option<u32>,
    ) -> Result<Option<String>, ApiError> {
        self.backend
            .post_json(
                &["wishes", wish_id, "check"],
                Some(&WishDecision { status, level }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_extend_the_base_path() {
        let api = ScheduleApi::new(Client::new(), "http://localhost:5000/api");
        let url = api.export_url(ExportFormat::Csv).expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/schedule/export?format=csv"
        );
    }

    #[test]
    fn path_segments_are_escaped() {
        let backend = Backend {
            http: Client::new(),
            base: "http://localhost:8080/api".to_string(),
        };
        let url = backend.endpoint(&["wishes", "a/b?c", "check"]).expect("url");
        assert_eq!(url.as_str(), "http://localhost:8080/api/wishes/a%2Fb%3Fc/check");
    }
}
