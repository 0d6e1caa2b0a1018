use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Child,
    Parent,
    Teacher,
}

pub const ROLES: [Role; 3] = [Role::Child, Role::Parent, Role::Teacher];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub add_task: bool,
    pub add_wish: bool,
    pub complete_task: bool,
    pub rate_task: bool,
    pub approve_wish: bool,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Child => "Child",
            Role::Parent => "Parent",
            Role::Teacher => "Teacher",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Role> {
        ROLES.into_iter().find(|role| role.slug() == slug)
    }

    pub fn slug(self) -> &'static str {
        match self {
            Role::Child => "child",
            Role::Parent => "parent",
            Role::Teacher => "teacher",
        }
    }

    /// Code the task service stores as the task's assigner.
    pub fn assigner(self) -> Option<&'static str> {
        match self {
            Role::Child => None,
            Role::Parent => Some("P"),
            Role::Teacher => Some("T"),
        }
    }

    pub fn permissions(self) -> Permissions {
        match self {
            Role::Child => Permissions {
                add_task: false,
                add_wish: true,
                complete_task: true,
                rate_task: false,
                approve_wish: false,
            },
            Role::Parent => Permissions {
                add_task: true,
                add_wish: true,
                complete_task: false,
                rate_task: true,
                approve_wish: true,
            },
            Role::Teacher => Permissions {
                add_task: true,
                add_wish: false,
                complete_task: false,
                rate_task: true,
                approve_wish: false,
            },
        }
    }

    pub fn can_complete(self, task: &Task) -> bool {
        self.permissions().complete_task && !task.completed
    }

    pub fn can_rate(self, task: &Task) -> bool {
        self.permissions().rate_task && task.completed && task.status != "Approved"
    }

    pub fn can_review_wish(self, wish: &Wish) -> bool {
        self.permissions().approve_wish && wish.status != WishStatus::Approved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Daily,
    Weekly,
}

impl TaskFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Daily => "daily",
            TaskFilter::Weekly => "weekly",
        }
    }

    pub fn from_query(value: &str) -> Option<TaskFilter> {
        [TaskFilter::All, TaskFilter::Daily, TaskFilter::Weekly]
            .into_iter()
            .find(|filter| filter.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Task {
    #[serde(rename = "taskID", default)]
    pub id: i64,
    #[serde(rename = "taskTitle", default)]
    pub title: String,
    #[serde(rename = "taskDescription", default)]
    pub description: String,
    #[serde(default)]
    pub assigner: Option<String>,
    #[serde(rename = "startdate", default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "startTime", default, deserialize_with = "lenient_time")]
    pub start_time: Option<String>,
    #[serde(rename = "enddate", default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "endTime", default, deserialize_with = "lenient_time")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub coin: i64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub rating: i64,
}

impl Task {
    pub fn assigner_name(&self) -> &'static str {
        if self.assigner.as_deref() == Some("T") {
            "Teacher"
        } else {
            "Parent"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", rename_all = "UPPERCASE")]
pub enum WishStatus {
    Approved,
    Rejected,
    #[default]
    Pending,
    Waiting,
}

impl From<String> for WishStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "APPROVED" => WishStatus::Approved,
            "REJECTED" => WishStatus::Rejected,
            "WAITING" => WishStatus::Waiting,
            _ => WishStatus::Pending,
        }
    }
}

impl WishStatus {
    pub fn label(self) -> &'static str {
        match self {
            WishStatus::Approved => "Approved",
            WishStatus::Rejected => "Rejected",
            WishStatus::Pending => "Pending",
            WishStatus::Waiting => "Waiting for level",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            WishStatus::Approved => "approved",
            WishStatus::Rejected => "rejected",
            WishStatus::Pending => "pending",
            WishStatus::Waiting => "waiting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Wish {
    #[serde(rename = "wishID", default)]
    pub id: String,
    #[serde(rename = "wishName", default)]
    pub name: String,
    #[serde(rename = "wishDescription", default)]
    pub description: String,
    /// Required level; zero means none.
    #[serde(default)]
    pub level: u32,
    #[serde(rename = "startDate", alias = "startdate", default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "startTime", default, deserialize_with = "lenient_time")]
    pub start_time: Option<String>,
    #[serde(rename = "endDate", alias = "enddate", default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "endTime", default, deserialize_with = "lenient_time")]
    pub end_time: Option<String>,
    #[serde(rename = "isApproved", default)]
    pub status: WishStatus,
}

impl Wish {
    pub fn unlocked_at(&self, level: u32) -> bool {
        self.level == 0 || self.level <= level
    }
}

/// Body of `POST /tasks/add` on the task service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub assigner: Option<&'static str>,
    pub task_id: i64,
    pub task_title: String,
    pub task_description: String,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub coin: i64,
}

/// Body of `POST /wishes/add` on the task service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWish {
    pub wish_id: String,
    pub wish_title: String,
    pub wish_description: String,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
}

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
pub const AUTO_APPROVE_LEVELS: std::ops::RangeInclusive<u32> = 1..=4;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerMetrics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
    pub daily_tasks: usize,
    pub weekly_tasks: usize,
    pub awaiting_review: usize,
    pub active_wishes: usize,
    pub pending_wishes: usize,
    pub eligible_wishes: usize,
}

pub fn build_metrics(today: NaiveDate, tasks: &[Task], wishes: &[Wish], level: u32) -> TrackerMetrics {
    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|task| task.completed).count();
    let completion_rate = if total_tasks == 0 {
        0
    } else {
        (completed_tasks as f64 / total_tasks as f64 * 100.0).round() as u32
    };

    let week_start = week_start(today);
    let week_end = week_start + Duration::days(6);

    TrackerMetrics {
        total_tasks,
        completed_tasks,
        completion_rate,
        daily_tasks: tasks
            .iter()
            .filter(|task| task.end_date == Some(today))
            .count(),
        weekly_tasks: tasks
            .iter()
            .filter(|task| {
                task.end_date
                    .is_some_and(|date| date >= week_start && date <= week_end)
            })
            .count(),
        awaiting_review: tasks
            .iter()
            .filter(|task| task.completed && task.status != "Approved")
            .count(),
        active_wishes: wishes.len(),
        pending_wishes: wishes
            .iter()
            .filter(|wish| matches!(wish.status, WishStatus::Pending | WishStatus::Waiting))
            .count(),
        eligible_wishes: wishes.iter().filter(|wish| wish.unlocked_at(level)).count(),
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

const LEVEL_THRESHOLDS: [i64; 5] = [0, 40, 60, 80, 100];

/// Percentage of the way from the current level's coin threshold to the next.
pub fn level_progress(coins: i64, level: u32) -> u32 {
    let index = (level as usize).min(LEVEL_THRESHOLDS.len() - 1);
    let lower = index
        .checked_sub(1)
        .map(|i| LEVEL_THRESHOLDS[i])
        .unwrap_or(0);
    let upper = match LEVEL_THRESHOLDS[index] {
        0 => LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1],
        threshold => threshold,
    };
    let span = (upper - lower).max(1) as f64;
    let progress = ((coins - lower) as f64 / span).clamp(0.0, 1.0);
    (progress * 100.0).round() as u32
}

/// Wishes a role gets to see; children only see what their level unlocks.
pub fn visible_wishes(role: Role, wishes: &[Wish], level: u32) -> Vec<&Wish> {
    wishes
        .iter()
        .filter(|wish| role != Role::Child || wish.unlocked_at(level))
        .collect()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_date))
}

fn lenient_time<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_time))
}

/// Dates come back as `"2026-01-05"` or as `[2026, 1, 5]`.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(text) if !text.is_empty() => {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
        }
        Value::Array(parts) => {
            let year = parts.first()?.as_i64()?;
            let month = parts.get(1)?.as_u64()?;
            let day = parts.get(2)?.as_u64()?;
            NaiveDate::from_ymd_opt(
                i32::try_from(year).ok()?,
                u32::try_from(month).ok()?,
                u32::try_from(day).ok()?,
            )
        }
        _ => None,
    }
}

fn parse_time(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Array(parts) => {
            let hour = parts.first()?.as_u64()?;
            let minute = parts.get(1).and_then(Value::as_u64).unwrap_or(0);
            Some(format!("{hour:02}:{minute:02}"))
        }
        _ => None,
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
