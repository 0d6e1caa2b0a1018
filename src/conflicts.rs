use crate::models::ScheduledCourseEntry;

/// Whether `entry` clashes with an entry of a different course anywhere in
/// the schedule: same day and start time, and the same instructor or room.
///
/// Sections of one course sharing a slot are not a clash.
pub fn has_conflict(entry: &ScheduledCourseEntry, schedule: &[ScheduledCourseEntry]) -> bool {
    schedule.iter().any(|other| clashes(entry, other))
}

fn clashes(a: &ScheduledCourseEntry, b: &ScheduledCourseEntry) -> bool {
    if a.course_code == b.course_code {
        return false;
    }
    if a.day != b.day || a.start_time != b.start_time {
        return false;
    }
    a.instructor == b.instructor || a.classroom == b.classroom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, instructor: &str, classroom: &str, start: &str) -> ScheduledCourseEntry {
        ScheduledCourseEntry {
            course_code: code.to_string(),
            day: "Monday".to_string(),
            start_time: start.to_string(),
            instructor: instructor.to_string(),
            classroom: classroom.to_string(),
            year: Some(1),
            semester: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn shared_instructor_is_a_conflict_both_ways() {
        let a = entry("CS101", "Dr. A", "R1", "09:00");
        let b = entry("CS102", "Dr. A", "R2", "09:00");
        let schedule = vec![a.clone(), b.clone()];

        assert!(has_conflict(&a, &schedule));
        assert!(has_conflict(&b, &schedule));
    }

    #[test]
    fn shared_classroom_is_a_conflict() {
        let a = entry("CS101", "Dr. A", "R1", "09:00");
        let b = entry("MATH1", "Dr. B", "R1", "09:00");
        let schedule = vec![a.clone(), b];

        assert!(has_conflict(&a, &schedule));
    }

    #[test]
    fn same_course_sections_are_not_a_conflict() {
        let a = entry("CS101", "Dr. A", "R1", "09:00");
        let b = entry("CS101", "Dr. A", "R1", "09:00");
        let schedule = vec![a.clone(), b];

        assert!(!has_conflict(&a, &schedule));
    }

    #[test]
    fn different_start_times_do_not_clash() {
        let a = entry("CS101", "Dr. A", "R1", "09:00");
        let b = entry("CS102", "Dr. A", "R1", "10:00");
        let schedule = vec![a.clone(), b];

        assert!(!has_conflict(&a, &schedule));
    }

    #[test]
    fn conflicts_span_years_and_semesters() {
        let a = entry("CS101", "Dr. A", "R1", "09:00");
        let mut b = entry("CS301", "Dr. A", "R9", "09:00");
        b.year = Some(3);
        b.semester = Some(2);
        let schedule = vec![a.clone(), b];

        assert!(has_conflict(&a, &schedule));
    }
}
