use crate::conflicts::has_conflict;
use crate::models::{CourseType, Schedule, ScheduledCourseEntry, Selection};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub start: &'static str,
    pub end: &'static str,
}

pub const TIME_SLOTS: [TimeSlot; 9] = [
    TimeSlot { start: "08:00", end: "08:50" },
    TimeSlot { start: "09:00", end: "09:50" },
    TimeSlot { start: "10:00", end: "10:50" },
    TimeSlot { start: "11:00", end: "11:50" },
    TimeSlot { start: "12:00", end: "12:50" },
    TimeSlot { start: "13:00", end: "13:50" },
    TimeSlot { start: "14:00", end: "14:50" },
    TimeSlot { start: "15:00", end: "15:50" },
    TimeSlot { start: "16:00", end: "16:50" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
];

impl Weekday {
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

/// Time range printed on the Friday exam block.
pub const EXAM_BLOCK_HOURS: &str = "13:20-15:10";

/// Friday rows reserved for the exam block; the first one carries the label.
const EXAM_BLOCK_STARTS: [&str; 2] = ["13:00", "14:00"];

/// The exam block pushes the last Friday afternoon class to 15:10.
const FRIDAY_SHIFTED_SLOT: &str = "15:00";
const FRIDAY_SHIFTED_START: &str = "15:10";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    Empty,
    ExamBlock {
        labelled: bool,
    },
    Courses {
        course_type: CourseType,
        conflict: bool,
        entries: Vec<ScheduledCourseEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub slot: TimeSlot,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub course_code: String,
    pub course_name: String,
    pub course_type: CourseType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableGrid {
    pub selection: Selection,
    pub days: Vec<Weekday>,
    pub rows: Vec<GridRow>,
    pub summary: Vec<SummaryRow>,
}

impl TimetableGrid {
    pub fn cell(&self, slot_start: &str, day: Weekday) -> Option<&Cell> {
        let column = self.days.iter().position(|d| *d == day)?;
        self.rows
            .iter()
            .find(|row| row.slot.start == slot_start)
            .and_then(|row| row.cells.get(column))
    }
}

pub fn matches_selection(entry: &ScheduledCourseEntry, selection: Selection) -> bool {
    entry.year == Some(selection.year) && entry.semester == Some(selection.semester)
}

pub fn filter_entries(schedule: &Schedule, selection: Selection) -> Vec<&ScheduledCourseEntry> {
    schedule
        .scheduled_courses
        .iter()
        .filter(|entry| matches_selection(entry, selection))
        .collect()
}

fn is_exam_block(day: Weekday, slot: &TimeSlot) -> bool {
    day == Weekday::Friday && EXAM_BLOCK_STARTS.contains(&slot.start)
}

/// Start time an entry must have to land in `slot` on `day`.
pub fn effective_start(day: Weekday, slot: &TimeSlot) -> &'static str {
    if day == Weekday::Friday && slot.start == FRIDAY_SHIFTED_SLOT {
        FRIDAY_SHIFTED_START
    } else {
        slot.start
    }
}

fn build_cell(
    day: Weekday,
    slot: &TimeSlot,
    filtered: &[&ScheduledCourseEntry],
    schedule: &Schedule,
) -> Cell {
    if is_exam_block(day, slot) {
        return Cell::ExamBlock {
            labelled: slot.start == EXAM_BLOCK_STARTS[0],
        };
    }

    let start = effective_start(day, slot);
    let occupants: Vec<ScheduledCourseEntry> = filtered
        .iter()
        .filter(|entry| entry.day == day.as_str() && entry.start_time == start)
        .map(|entry| (*entry).clone())
        .collect();

    let Some(first) = occupants.first() else {
        return Cell::Empty;
    };

    let conflict = occupants
        .iter()
        .any(|entry| has_conflict(entry, &schedule.scheduled_courses));

    Cell::Courses {
        course_type: first.course_type,
        conflict,
        entries: occupants,
    }
}

pub fn summarize(filtered: &[&ScheduledCourseEntry]) -> Vec<SummaryRow> {
    let mut rows: BTreeMap<&str, SummaryRow> = BTreeMap::new();
    for entry in filtered {
        rows.entry(entry.course_code.as_str())
            .or_insert_with(|| SummaryRow {
                course_code: entry.course_code.clone(),
                course_name: entry.course_name.clone(),
                course_type: entry.course_type,
                count: 0,
            })
            .count += 1;
    }
    rows.into_values().collect()
}

/// Lays the selected year/semester of `schedule` out on the weekly grid.
///
/// Conflicts are checked against the whole schedule, so a clash with a
/// course from another year still flags the cell.
pub fn build_grid(schedule: &Schedule, selection: Selection) -> TimetableGrid {
    let filtered = filter_entries(schedule, selection);

    let rows = TIME_SLOTS
        .iter()
        .map(|slot| GridRow {
            slot: *slot,
            cells: WEEKDAYS
                .iter()
                .map(|day| build_cell(*day, slot, &filtered, schedule))
                .collect(),
        })
        .collect();

    TimetableGrid {
        selection,
        days: WEEKDAYS.to_vec(),
        rows,
        summary: summarize(&filtered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, day: &str, start: &str) -> ScheduledCourseEntry {
        ScheduledCourseEntry {
            course_code: code.to_string(),
            course_name: format!("{code} name"),
            course_type: CourseType::Theory,
            year: Some(1),
            semester: Some(1),
            day: day.to_string(),
            start_time: start.to_string(),
            end_time: String::new(),
            classroom: format!("{code}-room"),
            instructor: format!("{code}-prof"),
            enrollment: None,
        }
    }

    fn schedule(entries: Vec<ScheduledCourseEntry>) -> Schedule {
        Schedule {
            scheduled_courses: entries,
            ..Default::default()
        }
    }

    fn codes(cell: &Cell) -> Vec<&str> {
        match cell {
            Cell::Courses { entries, .. } => {
                entries.iter().map(|e| e.course_code.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    #[test]
    fn filter_keeps_exactly_the_selected_year_and_semester() {
        let mut other_year = entry("CS201", "Monday", "08:00");
        other_year.year = Some(2);
        let mut other_semester = entry("CS102", "Monday", "08:00");
        other_semester.semester = Some(2);
        let mut unparsed = entry("CS999", "Monday", "08:00");
        unparsed.year = None;
        let schedule = schedule(vec![
            entry("CS101", "Monday", "08:00"),
            other_year,
            other_semester,
            unparsed,
        ]);

        let filtered = filter_entries(&schedule, Selection::default());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].course_code, "CS101");

        let second_year = filter_entries(&schedule, Selection { year: 2, semester: 1 });
        assert_eq!(second_year.len(), 1);
        assert_eq!(second_year[0].course_code, "CS201");
    }

    #[test]
    fn friday_late_slot_matches_shifted_start() {
        let schedule = schedule(vec![
            entry("SHIFTED", "Friday", "15:10"),
            entry("NOMINAL", "Friday", "15:00"),
        ]);
        let grid = build_grid(&schedule, Selection::default());

        let cell = grid.cell("15:00", Weekday::Friday).expect("cell");
        assert_eq!(codes(cell), vec!["SHIFTED"]);

        let placed: Vec<&str> = grid
            .rows
            .iter()
            .flat_map(|row| row.cells.iter().flat_map(codes))
            .collect();
        assert!(!placed.contains(&"NOMINAL"));
    }

    #[test]
    fn other_days_keep_exact_matching_at_fifteen() {
        let schedule = schedule(vec![
            entry("MON", "Monday", "15:00"),
            entry("MONLATE", "Monday", "15:10"),
        ]);
        let grid = build_grid(&schedule, Selection::default());

        let cell = grid.cell("15:00", Weekday::Monday).expect("cell");
        assert_eq!(codes(cell), vec!["MON"]);
    }

    #[test]
    fn exam_block_never_shows_data() {
        let schedule = schedule(vec![
            entry("EXAM1", "Friday", "13:00"),
            entry("EXAM2", "Friday", "14:00"),
        ]);
        let grid = build_grid(&schedule, Selection::default());

        assert_eq!(
            grid.cell("13:00", Weekday::Friday),
            Some(&Cell::ExamBlock { labelled: true })
        );
        assert_eq!(
            grid.cell("14:00", Weekday::Friday),
            Some(&Cell::ExamBlock { labelled: false })
        );
        // Summary still counts them; only the grid hides them.
        assert_eq!(grid.summary.len(), 2);
    }

    #[test]
    fn stacked_cell_uses_first_type_and_ors_conflicts() {
        let mut lab = entry("LAB1", "Tuesday", "10:00");
        lab.course_type = CourseType::Lab;
        let theory = entry("TH1", "Tuesday", "10:00");
        let mut clash = entry("OTHER", "Tuesday", "10:00");
        clash.year = Some(4);
        clash.instructor = theory.instructor.clone();

        let schedule = schedule(vec![lab, theory, clash]);
        let grid = build_grid(&schedule, Selection::default());

        match grid.cell("10:00", Weekday::Tuesday) {
            Some(Cell::Courses {
                course_type,
                conflict,
                entries,
            }) => {
                assert_eq!(*course_type, CourseType::Lab);
                assert!(*conflict);
                assert_eq!(entries.len(), 2);
            }
            other => panic!("unexpected cell {other:?}"),
        }
    }

    #[test]
    fn lone_entry_without_clash_is_not_conflicting() {
        let schedule = schedule(vec![entry("CS101", "Wednesday", "11:00")]);
        let grid = build_grid(&schedule, Selection::default());

        match grid.cell("11:00", Weekday::Wednesday) {
            Some(Cell::Courses { conflict, .. }) => assert!(!conflict),
            other => panic!("unexpected cell {other:?}"),
        }
    }

    #[test]
    fn summary_counts_and_sorts_by_code() {
        let schedule = schedule(vec![
            entry("CS102", "Monday", "08:00"),
            entry("CS101", "Monday", "09:00"),
            entry("CS101", "Tuesday", "09:00"),
        ]);
        let grid = build_grid(&schedule, Selection::default());

        let summary: Vec<(&str, usize)> = grid
            .summary
            .iter()
            .map(|row| (row.course_code.as_str(), row.count))
            .collect();
        assert_eq!(summary, vec![("CS101", 2), ("CS102", 1)]);
        assert_eq!(grid.summary[0].course_name, "CS101 name");
    }

    #[test]
    fn empty_schedule_renders_only_the_exam_block() {
        let grid = build_grid(&Schedule::default(), Selection::default());

        assert_eq!(grid.rows.len(), TIME_SLOTS.len());
        assert!(grid.summary.is_empty());
        for row in &grid.rows {
            for (day, cell) in grid.days.iter().zip(&row.cells) {
                if is_exam_block(*day, &row.slot) {
                    assert!(matches!(cell, Cell::ExamBlock { .. }));
                } else {
                    assert_eq!(cell, &Cell::Empty);
                }
            }
        }
    }

    #[test]
    fn building_twice_gives_the_same_grid() {
        let schedule = schedule(vec![
            entry("CS101", "Monday", "08:00"),
            entry("CS102", "Friday", "15:10"),
        ]);
        let first = build_grid(&schedule, Selection::default());
        let second = build_grid(&schedule, Selection::default());
        assert_eq!(first, second);
    }
}
