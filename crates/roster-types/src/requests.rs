//! Payloads for the write endpoints.
//!
//! Each payload derives [`Validate`] so the API layer can reject malformed
//! input with a 400 before anything reaches the database.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::grade::Grade;
use crate::ids::{CourseId, StudentId};

/// Body of `POST /students`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewStudent {
    /// Given name (non-empty).
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    /// Family name (non-empty).
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// Contact email address.
    #[validate(email)]
    pub email: String,
}

/// Body of `POST /courses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewCourse {
    /// Full course name (non-empty).
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Short course code.
    #[serde(default)]
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Instructor name.
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub instructor: Option<String>,
}

/// Body of `POST /enrollments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewEnrollment {
    /// Student to enroll.
    pub student_id: StudentId,
    /// Course to enroll in.
    pub course_id: CourseId,
}

/// Body of `PUT /enrollments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GradeUpdate {
    /// Enrolled student.
    pub student_id: StudentId,
    /// Course the grade is for.
    pub course_id: CourseId,
    /// Grade to record.
    pub grade: Grade,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_student_requires_names_and_valid_email() {
        let ok = NewStudent {
            first_name: String::from("Ada"),
            last_name: String::from("Lovelace"),
            email: String::from("ada@example.com"),
        };
        assert!(ok.validate().is_ok());

        let bad = NewStudent {
            first_name: String::new(),
            last_name: String::from("Lovelace"),
            email: String::from("not-an-email"),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn new_course_optional_fields_default_to_none() {
        let course: NewCourse = serde_json::from_str(r#"{"name":"Algebra"}"#).unwrap();
        assert_eq!(course.code, None);
        assert_eq!(course.instructor, None);
        assert!(course.validate().is_ok());
    }

    #[test]
    fn grade_update_rejects_off_scale_grade() {
        let id = uuid::Uuid::now_v7();
        let body = format!(r#"{{"student_id":"{id}","course_id":"{id}","grade":"E"}}"#);
        assert!(serde_json::from_str::<GradeUpdate>(&body).is_err());
    }
}
