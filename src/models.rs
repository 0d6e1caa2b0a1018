use crate::semesters::SemesterButtons;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "Option<String>", rename_all = "lowercase")]
pub enum CourseType {
    #[default]
    Theory,
    Lab,
}

impl From<Option<String>> for CourseType {
    fn from(value: Option<String>) -> Self {
        if value.as_deref() == Some("lab") {
            CourseType::Lab
        } else {
            CourseType::Theory
        }
    }
}

impl CourseType {
    pub fn label(self) -> &'static str {
        match self {
            CourseType::Theory => "Theory",
            CourseType::Lab => "Lab",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            CourseType::Theory => "course-theory",
            CourseType::Lab => "course-lab",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScheduledCourseEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub course_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub course_name: String,
    #[serde(default)]
    pub course_type: CourseType,
    #[serde(default, deserialize_with = "lenient_int")]
    pub year: Option<u32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub semester: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub day: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub classroom: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub instructor: String,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schedule {
    #[serde(default)]
    pub scheduled_courses: Vec<ScheduledCourseEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub year: u32,
    pub semester: u32,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            year: 1,
            semester: 1,
        }
    }
}

/// Envelope of `POST /schedule/generate` and `GET /schedule/get`.
#[derive(Debug, Deserialize, Default)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub validation_errors: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Report {
    #[serde(default)]
    pub total_courses: u64,
    #[serde(default)]
    pub year_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub semester_counts: Option<BTreeMap<String, u64>>,
}

impl Report {
    pub fn semester_count(&self, semester: u32) -> Option<u64> {
        self.semester_counts
            .as_ref()
            .map(|counts| counts.get(&semester.to_string()).copied().unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Anything other than `csv` exports JSON.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(format) if format.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// Body of `GET /api/selection`.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionStatus {
    pub selection: Selection,
    pub semesters: SemesterButtons,
    pub has_schedule: bool,
    pub loading: bool,
}

/// Integer coercion with `parseInt` leniency: numbers are truncated, strings
/// contribute their leading digits, everything else is absent.
pub fn coerce_int(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite() && *float >= 0.0)
                    .map(|float| float.trunc() as u64)
            })
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => {
            let digits: String = text
                .trim_start()
                .trim_start_matches('+')
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_int))
}

/// Missing, `null` and non-text values read as empty; numbers keep their digits.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_tolerates_stringly_typed_numbers() {
        let entry: ScheduledCourseEntry = serde_json::from_value(json!({
            "course_code": "CS101",
            "course_name": "Intro",
            "course_type": "lab",
            "year": "2",
            "semester": 1,
            "day": "Monday",
            "start_time": "08:00",
            "end_time": "08:50",
            "classroom": "A1",
            "instructor": "Dr. X"
        }))
        .expect("entry");

        assert_eq!(entry.year, Some(2));
        assert_eq!(entry.semester, Some(1));
        assert_eq!(entry.course_type, CourseType::Lab);
        assert_eq!(entry.enrollment, None);
    }

    #[test]
    fn unknown_course_type_is_theory() {
        let entry: ScheduledCourseEntry =
            serde_json::from_value(json!({ "course_type": "seminar" })).expect("entry");
        assert_eq!(entry.course_type, CourseType::Theory);
        assert_eq!(entry.year, None);
    }

    #[test]
    fn null_fields_keep_the_rest_of_the_schedule() {
        let response: ScheduleResponse = serde_json::from_value(json!({
            "success": true,
            "schedule": {
                "scheduled_courses": [
                    {
                        "course_code": "CS101", "course_name": null, "course_type": null,
                        "instructor": null, "classroom": "A1",
                        "day": "Monday", "start_time": "08:00", "end_time": null,
                        "year": 1, "semester": 1
                    },
                    {
                        "course_code": 202, "course_type": "lab", "instructor": "Dr. Y",
                        "day": "Tuesday", "start_time": "09:00", "year": 1, "semester": 1
                    }
                ]
            }
        }))
        .expect("response");

        let courses = response.schedule.expect("schedule").scheduled_courses;
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].course_type, CourseType::Theory);
        assert_eq!(courses[0].instructor, "");
        assert_eq!(courses[0].course_name, "");
        assert_eq!(courses[0].end_time, "");
        assert_eq!(courses[0].classroom, "A1");
        assert_eq!(courses[1].course_code, "202");
        assert_eq!(courses[1].course_type, CourseType::Lab);
    }

    #[test]
    fn coerce_int_follows_parse_int() {
        assert_eq!(coerce_int(&json!(3)), Some(3));
        assert_eq!(coerce_int(&json!(2.9)), Some(2));
        assert_eq!(coerce_int(&json!(" 4th")), Some(4));
        assert_eq!(coerce_int(&json!("abc")), None);
        assert_eq!(coerce_int(&json!(-1)), None);
        assert_eq!(coerce_int(&json!(null)), None);
    }

    #[test]
    fn report_defaults_missing_semesters_to_zero() {
        let report: Report = serde_json::from_value(json!({
            "total_courses": 3,
            "year_counts": { "1": 3 },
            "semester_counts": { "2": 3 }
        }))
        .expect("report");

        assert_eq!(report.semester_count(1), Some(0));
        assert_eq!(report.semester_count(2), Some(3));

        let bare: Report = serde_json::from_value(json!({ "total_courses": 0, "year_counts": {} }))
            .expect("report");
        assert_eq!(bare.semester_count(1), None);
    }

    #[test]
    fn unknown_export_format_falls_back_to_json() {
        assert_eq!(ExportFormat::from_query(Some("CSV")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_query(Some("xml")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_query(None), ExportFormat::Json);
    }
}
