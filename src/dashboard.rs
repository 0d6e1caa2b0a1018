use crate::alerts::Alert;
use crate::models::{Report, Schedule, Selection};
use crate::semesters::{SemesterButtons, YEAR_CONTROLS, resolve_semester_buttons};
use crate::timetable::{TimetableGrid, build_grid};
use crate::tracker::{Role, TaskFilter};

/// Timetable page state: the last fetched schedule and what the user has selected.
#[derive(Debug, Default)]
pub struct TimetableView {
    schedule: Option<Schedule>,
    selection: Selection,
    semesters: SemesterButtons,
    report: Option<Report>,
    alert: Option<Alert>,
}

impl TimetableView {
    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    pub fn has_schedule(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn semesters(&self) -> &SemesterButtons {
        &self.semesters
    }

    /// Replaces the snapshot wholesale and re-derives the semester controls.
    pub fn load(&mut self, schedule: Schedule) {
        self.semesters = resolve_semester_buttons(&schedule, self.selection.semester);
        self.selection.semester = self.semesters.active;
        self.report = None;
        self.schedule = Some(schedule);
    }

    pub fn select_year(&mut self, year: u32) -> bool {
        if !YEAR_CONTROLS.contains(&year) {
            return false;
        }
        self.selection.year = year;
        true
    }

    /// Hidden semester controls cannot be activated.
    pub fn select_semester(&mut self, semester: u32) -> bool {
        if !self.semesters.is_visible(semester) {
            return false;
        }
        self.semesters.active = semester;
        self.selection.semester = semester;
        true
    }

    pub fn grid(&self) -> Option<TimetableGrid> {
        self.schedule
            .as_ref()
            .map(|schedule| build_grid(schedule, self.selection))
    }

    pub fn grid_for(&self, selection: Selection) -> Option<TimetableGrid> {
        self.schedule
            .as_ref()
            .map(|schedule| build_grid(schedule, selection))
    }

    pub fn set_report(&mut self, report: Report) {
        self.report = Some(report);
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn set_alert(&mut self, alert: Alert) {
        self.alert = Some(alert);
    }

    /// Alerts are shown once.
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }
}

/// Tracker page state: who is looking and which task list they picked.
#[derive(Debug, Default)]
pub struct TrackerView {
    pub role: Option<Role>,
    pub filter: TaskFilter,
    alert: Option<Alert>,
}

impl TrackerView {
    pub fn set_role(&mut self, role: Role) {
        self.role = Some(role);
        self.filter = TaskFilter::All;
    }

    pub fn clear_role(&mut self) {
        self.role = None;
    }

    pub fn set_alert(&mut self, alert: Alert) {
        self.alert = Some(alert);
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduledCourseEntry;

    fn schedule_in_semester(semester: u32) -> Schedule {
        Schedule {
            scheduled_courses: vec![ScheduledCourseEntry {
                course_code: "CS101".to_string(),
                year: Some(1),
                semester: Some(semester),
                day: "Monday".to_string(),
                start_time: "08:00".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn loading_switches_to_an_available_semester() {
        let mut view = TimetableView::default();
        assert_eq!(view.selection(), Selection { year: 1, semester: 1 });

        view.load(schedule_in_semester(2));
        assert_eq!(view.selection().semester, 2);
        assert_eq!(view.semesters().active, 2);

        let grid = view.grid().expect("grid");
        assert_eq!(grid.summary.len(), 1);
    }

    #[test]
    fn hidden_semesters_and_unknown_years_are_ignored() {
        let mut view = TimetableView::default();
        view.load(schedule_in_semester(2));

        assert!(!view.select_semester(1));
        assert_eq!(view.selection().semester, 2);
        assert!(!view.select_year(9));
        assert!(view.select_year(3));
        assert_eq!(view.selection(), Selection { year: 3, semester: 2 });
    }

    #[test]
    fn no_grid_without_schedule() {
        let view = TimetableView::default();
        assert!(view.grid().is_none());
        assert!(!view.has_schedule());
    }

    #[test]
    fn choosing_a_role_resets_the_task_filter() {
        let mut view = TrackerView {
            filter: TaskFilter::Weekly,
            ..Default::default()
        };
        view.set_role(Role::Parent);
        assert_eq!(view.role, Some(Role::Parent));
        assert_eq!(view.filter, TaskFilter::All);

        view.clear_role();
        assert_eq!(view.role, None);
    }

    #[test]
    fn alert_is_taken_once() {
        let mut view = TimetableView::default();
        view.set_alert(Alert::error("boom"));
        assert!(view.take_alert().is_some());
        assert!(view.take_alert().is_none());
    }
}
