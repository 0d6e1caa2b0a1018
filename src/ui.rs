use crate::alerts::Alert;
use crate::models::{Report, Selection};
use crate::semesters::{SemesterButtons, YEAR_CONTROLS};
use crate::timetable::{Cell, EXAM_BLOCK_HOURS, TimetableGrid};
use maud::{Markup, html};

pub struct TimetablePage<'a> {
    pub selection: Selection,
    pub semesters: &'a SemesterButtons,
    pub grid: Option<&'a TimetableGrid>,
    pub report: Option<&'a Report>,
    pub alert: Option<&'a Alert>,
    pub has_schedule: bool,
    pub loading: bool,
}

pub fn render_index(page: &TimetablePage) -> String {
    let alert = render_alert(page.alert).into_string();
    let controls = render_controls(page).into_string();
    let timetable = page
        .grid
        .map(|grid| render_timetable(grid).into_string())
        .unwrap_or_default();
    let report = page
        .report
        .map(|report| render_report(report).into_string())
        .unwrap_or_default();

    fill(
        TIMETABLE_HTML,
        &[
            ("STYLE", SHARED_CSS),
            ("ALERT", alert.as_str()),
            ("CONTROLS", controls.as_str()),
            ("TIMETABLE", timetable.as_str()),
            ("REPORT", report.as_str()),
            ("SCRIPT", DISMISS_SCRIPT),
        ],
    )
}

/// Substitutes `{{KEY}}` placeholders in one pass, so values are never rescanned.
pub(crate) fn fill(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open..].find("}}").map(|offset| open + offset) else {
            break;
        };
        out.push_str(&rest[..open]);
        let key = &rest[open + 2..close];
        match slots.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..close + 2]),
        }
        rest = &rest[close + 2..];
    }
    out.push_str(rest);
    out
}

pub fn render_alert(alert: Option<&Alert>) -> Markup {
    html! {
        @if let Some(alert) = alert {
            div class=(alert.css_class()) role="alert"
                data-dismiss-after=(alert.visible_for().as_millis() as u64) {
                (alert.text())
            }
        }
    }
}

fn render_controls(page: &TimetablePage) -> Markup {
    html! {
        section.controls {
            form.upload method="post" action="/schedule/generate" enctype="multipart/form-data" {
                input id="dataFile" type="file" name="data" accept=".json,application/json" required;
                button id="generateBtn" class="btn btn-primary" type="submit" disabled[page.loading] {
                    @if page.loading { "Generating..." } @else { "Generate schedule" }
                }
            }
            div.actions {
                @if page.has_schedule {
                    a id="reportBtn" class="btn" href="/report" { "View report" }
                    a id="exportJsonBtn" class="btn" href="/export?format=json" { "Export JSON" }
                    a id="exportCsvBtn" class="btn" href="/export?format=csv" { "Export CSV" }
                } @else {
                    button id="reportBtn" class="btn" type="button" disabled { "View report" }
                    button id="exportJsonBtn" class="btn" type="button" disabled { "Export JSON" }
                    button id="exportCsvBtn" class="btn" type="button" disabled { "Export CSV" }
                }
            }
            div.selector {
                @for year in YEAR_CONTROLS {
                    form method="post" action=(format!("/select/year/{year}")) {
                        button.year-btn.active[year == page.selection.year] type="submit" data-year=(year) {
                            "Year " (year)
                        }
                    }
                }
            }
            div.selector {
                @for semester in &page.semesters.visible {
                    form method="post" action=(format!("/select/semester/{semester}")) {
                        button.semester-btn.active[*semester == page.semesters.active] type="submit" data-semester=(semester) {
                            "Semester " (semester)
                        }
                    }
                }
            }
        }
    }
}

fn cell_class(cell: &Cell) -> String {
    match cell {
        Cell::Courses {
            course_type,
            conflict,
            ..
        } => {
            let mut class = format!("course-cell {}", course_type.css_class());
            if *conflict {
                class.push_str(" course-conflict");
            }
            class
        }
        Cell::ExamBlock { .. } => "course-cell course-exam".to_string(),
        Cell::Empty => String::new(),
    }
}

pub fn render_timetable(grid: &TimetableGrid) -> Markup {
    html! {
        section id="timetableSection" {
            table.timetable {
                thead {
                    tr {
                        th.time-header { "Time" }
                        @for day in &grid.days {
                            th { (day.as_str()) }
                        }
                    }
                }
                tbody {
                    @for row in &grid.rows {
                        tr {
                            td.time-header { (row.slot.start) "-" (row.slot.end) }
                            @for cell in &row.cells {
                                @match cell {
                                    Cell::Empty => { td {} },
                                    Cell::ExamBlock { labelled } => {
                                        td class=(cell_class(cell)) {
                                            @if *labelled { "EXAM BLOCK" br; (EXAM_BLOCK_HOURS) }
                                        }
                                    },
                                    Cell::Courses { entries, .. } => {
                                        td class=(cell_class(cell)) {
                                            @for (idx, course) in entries.iter().enumerate() {
                                                @if idx > 0 { br; hr style="margin: 2px 0;"; }
                                                strong { (course.course_code) } br;
                                                (course.classroom) br;
                                                small { (course.instructor) }
                                            }
                                        }
                                    },
                                }
                            }
                        }
                    }
                }
            }
            (render_summary(grid))
        }
    }
}

fn render_summary(grid: &TimetableGrid) -> Markup {
    html! {
        div.schedule-summary {
            h4 {
                "Schedule Summary (Year " (grid.selection.year)
                ", Semester " (grid.selection.semester) ")"
            }
            table {
                thead {
                    tr {
                        th.left { "Course" }
                        th.left { "Name" }
                        th.center { "Scheduled Hours" }
                        th.center { "Type" }
                    }
                }
                tbody {
                    @for row in &grid.summary {
                        tr {
                            td { strong { (row.course_code) } }
                            td { (row.course_name) }
                            td.center { strong { (row.count) } }
                            td.center { (row.course_type.label()) }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_report(report: &Report) -> Markup {
    html! {
        section.report-content id="reportSection" {
            h4 { "Schedule Summary" }
            p { strong { "Total Courses Scheduled:" } " " (report.total_courses) }
            h4 { "Courses by Year" }
            ul {
                @for (year, count) in &report.year_counts {
                    li { "Year " (year) ": " (count) " courses" }
                }
            }
            @if report.semester_counts.is_some() {
                h4 { "Courses by Semester" }
                ul {
                    @for semester in [1, 2] {
                        li {
                            "Semester " (semester) ": "
                            (report.semester_count(semester).unwrap_or(0)) " courses"
                        }
                    }
                }
            }
            h4 { "Schedule Status" }
            p.success { "Schedule generated successfully! All conflicts have been automatically resolved." }
        }
    }
}

pub(crate) const DISMISS_SCRIPT: &str = r#"
    document.querySelectorAll('[data-dismiss-after]').forEach((el) => {
      const delay = Number(el.dataset.dismissAfter) || 3200;
      setTimeout(() => el.remove(), delay);
    });
"#;

pub(crate) const SHARED_CSS: &str = r#"
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      margin: 0;
    }

    nav a {
      margin-right: 14px;
      color: var(--accent-2);
    }

    .btn, button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      text-decoration: none;
      display: inline-block;
    }

    .btn-primary { background: var(--accent); }
    .btn-success { background: #2d7a4b; }
    .btn-warning { background: #c9892b; }
    .btn-danger { background: #c63b2b; }
    .btn-secondary { background: #6b645d; }

    button:disabled {
      opacity: 0.5;
      cursor: not-allowed;
    }

    .active {
      outline: 3px solid var(--accent);
    }

    .controls, .actions, .selector {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .alert {
      border-radius: 14px;
      padding: 14px 18px;
      white-space: pre-wrap;
      max-width: 600px;
    }

    .alert-success { background: #dff3e6; color: #2d7a4b; }
    .alert-error { background: #fbe3df; color: #c63b2b; }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
    }

    th, td {
      border: 1px solid rgba(47, 72, 88, 0.12);
      padding: 8px;
      vertical-align: top;
    }

    .time-header { white-space: nowrap; font-weight: 600; }
    .course-theory { background: #e8f0fb; }
    .course-lab { background: #eaf7e9; }
    .course-exam { background: #f1e9f8; text-align: center; font-weight: 600; }
    .course-conflict { outline: 3px solid #c63b2b; outline-offset: -3px; }

    .schedule-summary {
      margin-top: 20px;
      padding: 15px;
      background: #f8f9fa;
      border-radius: 5px;
    }

    .left { text-align: left; }
    .center { text-align: center; }
    .success { color: #2d7a4b; }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
      gap: 16px;
    }

    .item-card, .stat, .empty-state {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .item-card.completed, .item-card.approved { opacity: 0.75; }
    .item-card .meta { display: flex; flex-wrap: wrap; gap: 8px; font-size: 0.85rem; color: #6b645d; }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      display: block;
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .progress {
      height: 10px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.12);
      overflow: hidden;
    }

    .progress span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    form.inline { display: inline-flex; gap: 6px; align-items: center; }
    form.stacked { display: grid; gap: 8px; }
"#;

const TIMETABLE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Course Timetable</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Course Timetable</h1>
      <nav><a href="/">Timetable</a><a href="/tracker">Task tracker</a></nav>
    </header>
    <div id="alertContainer">{{ALERT}}</div>
    {{CONTROLS}}
    <div id="timetable">{{TIMETABLE}}</div>
    <div id="reportContent">{{REPORT}}</div>
  </main>
  <script>{{SCRIPT}}</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Schedule, ScheduledCourseEntry};
    use crate::timetable::build_grid;

    fn page<'a>(grid: Option<&'a TimetableGrid>, semesters: &'a SemesterButtons) -> TimetablePage<'a> {
        TimetablePage {
            selection: Selection::default(),
            semesters,
            grid,
            report: None,
            alert: None,
            has_schedule: grid.is_some(),
            loading: false,
        }
    }

    #[test]
    fn fill_leaves_unknown_placeholders_and_does_not_rescan() {
        let out = fill("a {{X}} b {{Y}} c", &[("X", "{{Y}}")]);
        assert_eq!(out, "a {{Y}} b {{Y}} c");
    }

    #[test]
    fn grid_markup_escapes_entry_text() {
        let schedule = Schedule {
            scheduled_courses: vec![ScheduledCourseEntry {
                course_code: "<b>CS</b>".to_string(),
                year: Some(1),
                semester: Some(1),
                day: "Monday".to_string(),
                start_time: "08:00".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let grid = build_grid(&schedule, Selection::default());
        let html = render_timetable(&grid).into_string();

        assert!(html.contains("&lt;b&gt;CS&lt;/b&gt;"));
        assert!(html.contains("course-cell course-theory"));
        assert!(html.contains("EXAM BLOCK<br>13:20-15:10"));
    }

    #[test]
    fn controls_are_disabled_without_schedule() {
        let semesters = SemesterButtons::default();
        let html = render_index(&page(None, &semesters));

        assert!(html.contains(r#"id="reportBtn" class="btn" type="button" disabled"#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn validation_alert_renders_numbered_lines() {
        let semesters = SemesterButtons::default();
        let alert = Alert::validation("Data validation failed", vec!["no rooms".to_string()]);
        let mut page = page(None, &semesters);
        page.alert = Some(&alert);
        let html = render_index(&page);

        assert!(html.contains("data-dismiss-after=\"10000\""));
        assert!(html.contains("1. no rooms"));
    }
}
