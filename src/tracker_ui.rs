use crate::alerts::Alert;
use crate::tracker::{
    AUTO_APPROVE_LEVELS, MAX_RATING, MIN_RATING, ROLES, Role, Task, TaskFilter, TrackerMetrics,
    Wish, WishStatus, format_date, level_progress, visible_wishes,
};
use crate::ui::{DISMISS_SCRIPT, SHARED_CSS, fill, render_alert};
use maud::{Markup, html};

pub struct TrackerPage<'a> {
    pub role: Option<Role>,
    pub filter: TaskFilter,
    pub budget: i64,
    pub level: u32,
    /// `None` when the task list could not be fetched.
    pub tasks: Option<&'a [Task]>,
    pub wishes: Option<&'a [Wish]>,
    pub metrics: &'a TrackerMetrics,
    pub alert: Option<&'a Alert>,
}

pub fn render_tracker(page: &TrackerPage) -> String {
    let alert = render_alert(page.alert).into_string();
    let body = match page.role {
        None => render_role_chooser().into_string(),
        Some(role) => render_dashboard(role, page).into_string(),
    };

    fill(
        TRACKER_HTML,
        &[
            ("STYLE", SHARED_CSS),
            ("ALERT", alert.as_str()),
            ("BODY", body.as_str()),
            ("SCRIPT", DISMISS_SCRIPT),
        ],
    )
}

fn render_role_chooser() -> Markup {
    html! {
        section.visible id="role-overlay" {
            h2 { "Who is using the tracker?" }
            div.cards {
                @for role in ROLES {
                    form method="post" action=(format!("/tracker/role/{}", role.slug())) {
                        button.role-card type="submit" data-role=(role.slug()) { (role.label()) }
                    }
                }
            }
        }
    }
}

fn render_dashboard(role: Role, page: &TrackerPage) -> Markup {
    let permissions = role.permissions();
    let progress = level_progress(page.budget, page.level);
    let metrics = page.metrics;

    html! {
        section.toolbar {
            span id="role-pill" { (role.label()) " view" }
            form.inline method="post" action="/tracker/role/clear" {
                button id="change-role-btn" class="btn btn-secondary" type="submit" { "Change role" }
            }
        }
        section.panel {
            div.stat { span.label { "Coins" } span.value id="budget" { (page.budget) } }
            div.stat { span.label { "Level" } span.value id="level" { (page.level) } }
            div.stat {
                span.label { "Next level" }
                div.progress { span id="points-progress" style=(format!("width: {progress}%")) {} }
                span id="level-progress-label" { (progress) "%" }
            }
        }
        section.panel {
            div.stat { span.label { "Total tasks" } span.value id="metric-total-tasks" { (metrics.total_tasks) } }
            div.stat { span.label { "Completed" } span.value id="metric-completed-tasks" { (metrics.completed_tasks) } }
            div.stat { span.label { "Completion rate" } span.value id="metric-completion-rate" { (metrics.completion_rate) "%" } }
            div.stat { span.label { "Due today" } span.value id="metric-daily-tasks" { (metrics.daily_tasks) } }
            div.stat { span.label { "Due this week" } span.value id="metric-weekly-tasks" { (metrics.weekly_tasks) } }
            div.stat { span.label { "Awaiting review" } span.value id="metric-awaiting-review" { (metrics.awaiting_review) } }
            div.stat { span.label { "Wishes" } span.value id="metric-active-wishes" { (metrics.active_wishes) } }
            div.stat { span.label { "Pending wishes" } span.value id="metric-pending-wishes" { (metrics.pending_wishes) } }
            div.stat { span.label { "Eligible wishes" } span.value id="metric-eligible-wishes" { (metrics.eligible_wishes) } }
        }
        section id="tasks-tab" {
            h2 { "Tasks" }
            div.selector {
                @for filter in [TaskFilter::All, TaskFilter::Daily, TaskFilter::Weekly] {
                    a.btn.active[filter == page.filter] href=(format!("/tracker?filter={}", filter.as_str()))
                        data-filter=(filter.as_str()) { (filter_label(filter)) }
                }
            }
            div id="tasks-list" {
                (render_tasks(role, page.tasks))
            }
            @if permissions.add_task {
                (render_add_task())
            }
        }
        section id="wishes-tab" {
            h2 { "Wishes" }
            div id="wishes-list" {
                (render_wishes(role, page.wishes, page.level))
            }
            @if permissions.add_wish {
                (render_add_wish())
            }
        }
    }
}

fn filter_label(filter: TaskFilter) -> &'static str {
    match filter {
        TaskFilter::All => "All",
        TaskFilter::Daily => "Today",
        TaskFilter::Weekly => "This week",
    }
}

fn empty_state(title: &str, hint: &str) -> Markup {
    html! {
        div.empty-state {
            h3 { (title) }
            p { (hint) }
        }
    }
}

fn render_tasks(role: Role, tasks: Option<&[Task]>) -> Markup {
    match tasks {
        None => empty_state("Unable to load tasks", "Please try again in a moment."),
        Some([]) => empty_state("No tasks found", "Add a new task or adjust your filters."),
        Some(tasks) => html! {
            div.cards {
                @for task in tasks {
                    (render_task_card(role, task))
                }
            }
        },
    }
}

fn render_task_card(role: Role, task: &Task) -> Markup {
    html! {
        div.item-card.completed[task.completed] {
            h3 { (task.title) }
            p { (task.description) }
            div.meta {
                span { "ID: " (task.id) }
                span { "Reward: " (task.coin) " coins" }
                span { "Assigner: " (task.assigner_name()) }
                @if let Some(date) = task.start_date {
                    span { "Starts: " (format_date(date)) " " (task.start_time.as_deref().unwrap_or_default()) }
                }
                @if let Some(date) = task.end_date {
                    span { "Due: " (format_date(date)) " " (task.end_time.as_deref().unwrap_or_default()) }
                }
                span { "Status: " @if task.completed { "Completed" } @else { "Pending" } }
            }
            div.actions {
                @if role.can_complete(task) {
                    form.inline method="post" action=(format!("/tracker/tasks/{}/complete", task.id)) {
                        button.btn.btn-success.complete-btn type="submit" data-task-id=(task.id) { "Mark complete" }
                    }
                }
                @if role.can_rate(task) {
                    form.inline method="post" action=(format!("/tracker/tasks/{}/check", task.id)) {
                        input type="number" name="rating" min=(MIN_RATING) max=(MAX_RATING) required;
                        button.btn.btn-warning.check-btn type="submit" data-task-id=(task.id) { "Review & rate" }
                    }
                }
            }
        }
    }
}

fn render_wishes(role: Role, wishes: Option<&[Wish]>, level: u32) -> Markup {
    let Some(wishes) = wishes else {
        return empty_state("Unable to load wishes", "Please try again.");
    };
    if wishes.is_empty() {
        return empty_state("No wishes yet", "Motivate progress by logging a new wish.");
    }
    let visible = visible_wishes(role, wishes, level);
    if visible.is_empty() {
        return empty_state(
            "Keep leveling up!",
            "Wishes unlock once you reach the required level.",
        );
    }

    html! {
        div.cards {
            @for wish in visible {
                (render_wish_card(role, wish))
            }
        }
    }
}

fn render_wish_card(role: Role, wish: &Wish) -> Markup {
    html! {
        div class=(format!("item-card {}", wish.status.css_class())) {
            h3 { (wish.name) }
            p { (wish.description) }
            div.meta {
                span { "ID: " (wish.id) }
                span { "Status: " (wish.status.label()) }
                @if wish.level > 0 {
                    span { "Required level: " (wish.level) }
                }
                @if let Some(date) = wish.start_date {
                    span { "Available from: " (format_date(date)) " " (wish.start_time.as_deref().unwrap_or_default()) }
                }
                @if let Some(date) = wish.end_date {
                    span { "Available until: " (format_date(date)) " " (wish.end_time.as_deref().unwrap_or_default()) }
                }
            }
            @if role.can_review_wish(wish) {
                div.actions {
                    form.inline method="post" action="/tracker/wishes/check" {
                        input type="hidden" name="wish_id" value=(wish.id);
                        input type="hidden" name="status" value="APPROVED";
                        button.btn.btn-success.approve-btn type="submit" data-wish-id=(wish.id) { "Approve now" }
                    }
                    @if wish.status == WishStatus::Pending {
                        form.inline method="post" action="/tracker/wishes/check" {
                            input type="hidden" name="wish_id" value=(wish.id);
                            input type="hidden" name="status" value="REJECTED";
                            button.btn.btn-danger.reject-btn type="submit" data-wish-id=(wish.id) { "Reject" }
                        }
                    }
                    form.inline method="post" action="/tracker/wishes/check" {
                        input type="hidden" name="wish_id" value=(wish.id);
                        input type="hidden" name="status" value="APPROVED";
                        input type="number" name="level" min=(AUTO_APPROVE_LEVELS.start())
                            max=(AUTO_APPROVE_LEVELS.end()) required;
                        button.btn.btn-secondary.auto-approve-btn type="submit" data-wish-id=(wish.id) {
                            "Auto approve at level"
                        }
                    }
                }
            }
        }
    }
}

fn render_add_task() -> Markup {
    html! {
        form.stacked id="add-task-form" method="post" action="/tracker/tasks" {
            h3 { "Add task" }
            input id="task-id" type="number" name="task_id" placeholder="Task ID" required;
            input id="task-title" type="text" name="title" placeholder="Title" required;
            textarea id="task-description" name="description" placeholder="Description" {}
            input id="task-start-date" type="date" name="start_date";
            input id="task-start-time" type="time" name="start_time";
            input id="task-end-date" type="date" name="end_date";
            input id="task-end-time" type="time" name="end_time";
            input id="task-coin" type="number" name="coin" placeholder="Coins" required;
            button.btn.btn-primary type="submit" { "Add task" }
        }
    }
}

fn render_add_wish() -> Markup {
    html! {
        form.stacked id="add-wish-form" method="post" action="/tracker/wishes" {
            h3 { "Add wish" }
            input id="wish-id" type="text" name="wish_id" placeholder="Wish ID" required;
            input id="wish-title" type="text" name="title" placeholder="Title" required;
            textarea id="wish-description" name="description" placeholder="Description" {}
            input id="wish-start-date" type="date" name="start_date";
            input id="wish-start-time" type="time" name="start_time";
            input id="wish-end-date" type="date" name="end_date";
            input id="wish-end-time" type="time" name="end_time";
            button.btn.btn-primary type="submit" { "Submit wish" }
        }
    }
}

const TRACKER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Task Tracker</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app app-shell">
    <header>
      <h1>Task &amp; Wish Tracker</h1>
      <nav><a href="/">Timetable</a><a href="/tracker">Task tracker</a></nav>
    </header>
    <div class="alert-slot">{{ALERT}}</div>
    {{BODY}}
  </main>
  <script>{{SCRIPT}}</script>
</body>
</html>
"#;
