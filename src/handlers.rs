use crate::alerts::Alert;
use crate::dashboard::TimetableView;
use crate::errors::{ApiError, AppError};
use crate::models::{ExportFormat, Selection, SelectionStatus};
use crate::state::AppState;
use crate::timetable::TimetableGrid;
use crate::tracker::{
    AUTO_APPROVE_LEVELS, MAX_RATING, MIN_RATING, NewTask, NewWish, Role, TaskFilter, TrackerMetrics,
    WishStatus, build_metrics,
};
use crate::tracker_ui::{TrackerPage, render_tracker};
use crate::ui::{TimetablePage, render_index};
use axum::{
    Form, Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    response::{Html, Redirect},
};
use chrono::Local;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

const DEFAULT_LEVEL: u32 = 1;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    refresh_if_empty(&state).await;
    let mut view = state.timetable.lock().await;
    let alert = view.take_alert();
    Html(render_timetable_page(&view, alert.as_ref(), state.is_loading()))
}

/// Pulls the backend's current schedule when nothing is cached yet.
async fn refresh_if_empty(state: &AppState) {
    if state.timetable.lock().await.has_schedule() {
        return;
    }
    match state.schedule_api.current().await {
        Ok(Some(schedule)) => {
            let mut view = state.timetable.lock().await;
            if !view.has_schedule() {
                info!(
                    "loaded schedule with {} courses",
                    schedule.scheduled_courses.len()
                );
                view.load(schedule);
            }
        }
        Ok(None) => debug!("backend has no schedule yet"),
        Err(err) => warn!("failed to load existing schedule: {err}"),
    }
}

fn render_timetable_page(view: &TimetableView, alert: Option<&Alert>, loading: bool) -> String {
    let grid = view.grid();
    if let Some(grid) = &grid {
        debug!(
            year = grid.selection.year,
            semester = grid.selection.semester,
            courses = grid.summary.len(),
            "rendering timetable"
        );
    }
    render_index(&TimetablePage {
        selection: view.selection(),
        semesters: view.semesters(),
        grid: grid.as_ref(),
        report: view.report(),
        alert,
        has_schedule: view.has_schedule(),
        loading,
    })
}

pub async fn generate(State(state): State<AppState>, multipart: Multipart) -> Redirect {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(err) => {
            warn!("unreadable upload: {err}");
            None
        }
    };
    let Some((file_name, bytes)) = upload else {
        state
            .timetable
            .lock()
            .await
            .set_alert(Alert::error("Please select a data file first"));
        return Redirect::to("/");
    };

    info!("generating schedule from {file_name} ({} bytes)", bytes.len());
    let result = {
        let _loading = state.begin_loading();
        state.schedule_api.generate(file_name, bytes).await
    };

    let mut view = state.timetable.lock().await;
    match result {
        Ok(schedule) => {
            let count = schedule.scheduled_courses.len();
            view.load(schedule);
            view.set_alert(Alert::success(format!(
                "Schedule generated successfully! {count} courses scheduled."
            )));
        }
        Err(err) => {
            error!("schedule generation failed: {err}");
            view.set_alert(Alert::from(&err));
        }
    }
    Redirect::to("/")
}

/// The `data` part of the upload form; browsers send an empty part when no file is picked.
async fn read_upload(mut multipart: Multipart) -> Result<Option<(String, Vec<u8>)>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("data") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        if file_name.is_empty() && bytes.is_empty() {
            return Ok(None);
        }
        let file_name = if file_name.is_empty() {
            "data".to_string()
        } else {
            file_name
        };
        return Ok(Some((file_name, bytes.to_vec())));
    }
    Ok(None)
}

pub async fn select_year(State(state): State<AppState>, Path(year): Path<u32>) -> Redirect {
    if !state.timetable.lock().await.select_year(year) {
        debug!("ignoring unknown year {year}");
    }
    Redirect::to("/")
}

pub async fn select_semester(State(state): State<AppState>, Path(semester): Path<u32>) -> Redirect {
    if !state.timetable.lock().await.select_semester(semester) {
        debug!("ignoring hidden semester {semester}");
    }
    Redirect::to("/")
}

pub async fn report(State(state): State<AppState>) -> Html<String> {
    let has_schedule = state.timetable.lock().await.has_schedule();
    let fetched = if has_schedule {
        Some(state.schedule_api.report().await)
    } else {
        None
    };

    let mut view = state.timetable.lock().await;
    let alert = match fetched {
        None => Some(Alert::from(&ApiError::NoSchedule)),
        Some(Ok(report)) => {
            view.set_report(report);
            view.take_alert()
        }
        Some(Err(err)) => {
            error!("failed to load report: {err}");
            Some(Alert::report_failed(&err))
        }
    };
    Html(render_timetable_page(&view, alert.as_ref(), state.is_loading()))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    format: Option<String>,
}

pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Redirect, AppError> {
    let format = ExportFormat::from_query(query.format.as_deref());
    let url = state.schedule_api.export_url(format)?;
    Ok(Redirect::to(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct TimetableQuery {
    year: Option<u32>,
    semester: Option<u32>,
}

pub async fn api_timetable(
    State(state): State<AppState>,
    Query(query): Query<TimetableQuery>,
) -> Result<Json<TimetableGrid>, AppError> {
    refresh_if_empty(&state).await;
    let view = state.timetable.lock().await;
    let current = view.selection();
    let selection = Selection {
        year: query.year.unwrap_or(current.year),
        semester: query.semester.unwrap_or(current.semester),
    };
    let grid = view.grid_for(selection).ok_or(ApiError::NoSchedule)?;
    Ok(Json(grid))
}

pub async fn api_selection(State(state): State<AppState>) -> Json<SelectionStatus> {
    let view = state.timetable.lock().await;
    Json(SelectionStatus {
        selection: view.selection(),
        semesters: view.semesters().clone(),
        has_schedule: view.has_schedule(),
        loading: state.is_loading(),
    })
}

pub async fn choose_role(State(state): State<AppState>, Path(slug): Path<String>) -> Redirect {
    let mut view = state.tracker.lock().await;
    if slug == "clear" {
        view.clear_role();
    } else if let Some(role) = Role::from_slug(&slug) {
        info!("tracker role set to {}", role.slug());
        view.set_role(role);
    } else {
        view.set_alert(Alert::error(format!("Unknown role: {slug}")));
    }
    Redirect::to("/tracker")
}

#[derive(Debug, Deserialize)]
pub struct TrackerQuery {
    filter: Option<String>,
}

pub async fn tracker_page(
    State(state): State<AppState>,
    Query(query): Query<TrackerQuery>,
) -> Html<String> {
    let (role, filter, alert) = {
        let mut view = state.tracker.lock().await;
        if let Some(filter) = query.filter.as_deref().and_then(TaskFilter::from_query) {
            view.filter = filter;
        }
        (view.role, view.filter, view.take_alert())
    };

    let Some(role) = role else {
        let metrics = TrackerMetrics::default();
        return Html(render_tracker(&TrackerPage {
            role: None,
            filter,
            budget: 0,
            level: DEFAULT_LEVEL,
            tasks: Some(&[]),
            wishes: Some(&[]),
            metrics: &metrics,
            alert: alert.as_ref(),
        }));
    };

    let api = &state.tracker_api;
    let (budget, level, tasks, wishes) =
        tokio::join!(api.budget(), api.level(), api.tasks(filter), api.wishes());

    let budget = budget.unwrap_or_else(|err| {
        warn!("failed to load budget: {err}");
        0
    });
    let level = level.unwrap_or_else(|err| {
        warn!("failed to load level: {err}");
        DEFAULT_LEVEL
    });
    let tasks = tasks
        .inspect_err(|err| error!("failed to load tasks: {err}"))
        .ok();
    let wishes = wishes
        .inspect_err(|err| error!("failed to load wishes: {err}"))
        .ok();

    let metrics = build_metrics(
        Local::now().date_naive(),
        tasks.as_deref().unwrap_or_default(),
        wishes.as_deref().unwrap_or_default(),
        level,
    );
    debug!(
        role = role.slug(),
        filter = filter.as_str(),
        tasks = metrics.total_tasks,
        wishes = metrics.active_wishes,
        "rendering tracker"
    );

    Html(render_tracker(&TrackerPage {
        role: Some(role),
        filter,
        budget,
        level,
        tasks: tasks.as_deref(),
        wishes: wishes.as_deref(),
        metrics: &metrics,
        alert: alert.as_ref(),
    }))
}

async fn tracker_redirect(state: &AppState, alert: Alert) -> Redirect {
    state.tracker.lock().await.set_alert(alert);
    Redirect::to("/tracker")
}

async fn current_role(state: &AppState) -> Option<Role> {
    state.tracker.lock().await.role
}

fn outcome_alert(result: Result<Option<String>, ApiError>, success: &str, failure: &str) -> Alert {
    match result {
        Ok(_) => Alert::success(success),
        Err(err) => {
            error!("tracker request failed: {err}");
            Alert::error(failure)
        }
    }
}

pub async fn complete_task(State(state): State<AppState>, Path(task_id): Path<i64>) -> Redirect {
    let allowed = current_role(&state)
        .await
        .is_some_and(|role| role.permissions().complete_task);
    if !allowed {
        return tracker_redirect(&state, Alert::error("Only children can complete tasks.")).await;
    }

    let result = state.tracker_api.complete_task(task_id).await;
    let alert = outcome_alert(
        result,
        "Task marked as completed.",
        "Unable to mark task as completed.",
    );
    tracker_redirect(&state, alert).await
}

#[derive(Debug, Deserialize)]
pub struct RatingForm {
    #[serde(default)]
    rating: String,
}

pub async fn rate_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    Form(form): Form<RatingForm>,
) -> Redirect {
    let allowed = current_role(&state)
        .await
        .is_some_and(|role| role.permissions().rate_task);
    if !allowed {
        return tracker_redirect(&state, Alert::error("This role cannot review tasks.")).await;
    }

    let rating = form
        .rating
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|rating| (MIN_RATING..=MAX_RATING).contains(rating));
    let Some(rating) = rating else {
        let message = format!("Please enter a rating between {MIN_RATING} and {MAX_RATING}.");
        return tracker_redirect(&state, Alert::error(message)).await;
    };

    let result = state.tracker_api.rate_task(task_id, rating).await;
    let alert = outcome_alert(result, "Task reviewed successfully.", "Unable to review task.");
    tracker_redirect(&state, alert).await
}

#[derive(Debug, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    task_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    end_date: String,
    #[serde(default)]
    end_time: String,
    #[serde(default)]
    coin: String,
}

pub async fn add_task(State(state): State<AppState>, Form(form): Form<TaskForm>) -> Redirect {
    let Some(role) = current_role(&state)
        .await
        .filter(|role| role.permissions().add_task)
    else {
        return tracker_redirect(
            &state,
            Alert::error("Only parents or teachers can add tasks."),
        )
        .await;
    };

    let task_id = form.task_id.trim().parse::<i64>();
    let coin = form.coin.trim().parse::<i64>();
    let title = form.title.trim();
    let (Ok(task_id), Ok(coin), false) = (task_id, coin, title.is_empty()) else {
        return tracker_redirect(
            &state,
            Alert::error("Please provide a numeric task ID, a title and a coin reward."),
        )
        .await;
    };

    let task = NewTask {
        assigner: role.assigner(),
        task_id,
        task_title: title.to_string(),
        task_description: form.description.trim().to_string(),
        start_date: non_empty(form.start_date),
        start_time: non_empty(form.start_time),
        end_date: non_empty(form.end_date),
        end_time: non_empty(form.end_time),
        coin,
    };
    let result = state.tracker_api.add_task(&task).await;
    let alert = outcome_alert(result, "Task added successfully.", "Unable to add task.");
    tracker_redirect(&state, alert).await
}

#[derive(Debug, Deserialize)]
pub struct WishForm {
    #[serde(default)]
    wish_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    end_date: String,
    #[serde(default)]
    end_time: String,
}

pub async fn add_wish(State(state): State<AppState>, Form(form): Form<WishForm>) -> Redirect {
    let allowed = current_role(&state)
        .await
        .is_some_and(|role| role.permissions().add_wish);
    if !allowed {
        return tracker_redirect(&state, Alert::error("This role cannot add wishes.")).await;
    }

    let wish_id = form.wish_id.trim();
    let title = form.title.trim();
    if wish_id.is_empty() || title.is_empty() {
        return tracker_redirect(&state, Alert::error("Please provide a wish ID and a title."))
            .await;
    }

    let wish = NewWish {
        wish_id: wish_id.to_string(),
        wish_title: title.to_string(),
        wish_description: form.description.trim().to_string(),
        start_date: non_empty(form.start_date),
        start_time: non_empty(form.start_time),
        end_date: non_empty(form.end_date),
        end_time: non_empty(form.end_time),
    };
    let result = state.tracker_api.add_wish(&wish).await;
    let alert = outcome_alert(result, "Wish submitted for review.", "Unable to add wish.");
    tracker_redirect(&state, alert).await
}

#[derive(Debug, Deserialize)]
pub struct WishDecisionForm {
    #[serde(default)]
    wish_id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    level: Option<String>,
}

pub async fn check_wish(
    State(state): State<AppState>,
    Form(form): Form<WishDecisionForm>,
) -> Redirect {
    let allowed = current_role(&state)
        .await
        .is_some_and(|role| role.permissions().approve_wish);
    if !allowed {
        return tracker_redirect(&state, Alert::error("Only parents can review wishes.")).await;
    }

    let status = WishStatus::from(form.status.trim().to_uppercase());
    if !matches!(status, WishStatus::Approved | WishStatus::Rejected) {
        return tracker_redirect(&state, Alert::error("Unknown wish decision.")).await;
    }

    let level = match form.level.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<u32>() {
            Ok(level) if AUTO_APPROVE_LEVELS.contains(&level) => Some(level),
            _ => {
                let message = format!(
                    "Please enter a level between {} and {}.",
                    AUTO_APPROVE_LEVELS.start(),
                    AUTO_APPROVE_LEVELS.end()
                );
                return tracker_redirect(&state, Alert::error(message)).await;
            }
        },
    };

    let fallback = match (status, level) {
        (WishStatus::Rejected, _) => "Wish rejected.",
        (_, Some(_)) => "Wish will be approved once the level is reached.",
        _ => "Wish updated.",
    };
    let alert = match state
        .tracker_api
        .check_wish(form.wish_id.trim(), status, level)
        .await
    {
        Ok(message) => Alert::success(message.unwrap_or_else(|| fallback.to_string())),
        Err(err) => {
            error!("wish review failed: {err}");
            Alert::error("Unable to update wish.")
        }
    };
    tracker_redirect(&state, alert).await
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
