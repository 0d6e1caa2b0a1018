use crate::models::Schedule;
use serde::Serialize;
use std::collections::BTreeSet;

/// Semesters that have a selector control on the page.
pub const SEMESTER_CONTROLS: std::ops::RangeInclusive<u32> = 1..=8;

pub const YEAR_CONTROLS: std::ops::RangeInclusive<u32> = 1..=4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemesterButtons {
    pub visible: Vec<u32>,
    pub active: u32,
}

impl Default for SemesterButtons {
    fn default() -> Self {
        Self {
            visible: vec![1],
            active: 1,
        }
    }
}

impl SemesterButtons {
    pub fn is_visible(&self, semester: u32) -> bool {
        self.visible.contains(&semester)
    }
}

/// Sorted, de-duplicated semesters present in the schedule.
pub fn available_semesters(schedule: &Schedule) -> Vec<u32> {
    schedule
        .scheduled_courses
        .iter()
        .filter_map(|entry| entry.semester)
        .filter(|semester| *semester != 0 && SEMESTER_CONTROLS.contains(semester))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Picks the visible controls and the active one for a freshly loaded schedule.
pub fn resolve_semester_buttons(schedule: &Schedule, current: u32) -> SemesterButtons {
    let visible = available_semesters(schedule);
    let Some(first) = visible.first().copied() else {
        return SemesterButtons::default();
    };

    let active = if visible.contains(&current) {
        current
    } else {
        first
    };

    SemesterButtons { visible, active }
}
