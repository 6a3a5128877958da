//! Entity records and join rows exchanged between the data layer, the
//! statistics engine and the dashboard.
//!
//! Enrollment counts on [`Student`] and [`Course`] are always derived from
//! enrollment rows at read time; they are never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::grade::Grade;
use crate::ids::{CourseId, EnrollmentId, StudentId};

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

/// A student together with the enrollments they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Student {
    /// Student identifier.
    pub id: StudentId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email address.
    pub email: String,
    /// When the student record was created.
    pub created_at: DateTime<Utc>,
    /// Number of enrollments referencing this student.
    #[serde(rename = "enrollmentCount")]
    pub enrollment_count: u32,
    /// Enrollments in creation order.
    pub enrollments: Vec<StudentEnrollment>,
}

impl Student {
    /// `"First Last"`, trimmed when either part is blank.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// One enrollment as seen from the student's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StudentEnrollment {
    /// Enrollment identifier.
    pub id: EnrollmentId,
    /// Recorded grade, if any.
    pub grade: Option<Grade>,
    /// The course this enrollment is for.
    pub course: CourseSummary,
}

/// Minimal course projection embedded in a [`StudentEnrollment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CourseSummary {
    /// Course identifier.
    pub id: CourseId,
    /// Course name.
    pub name: String,
    /// Short course code (e.g. `CS101`).
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// Course
// ---------------------------------------------------------------------------

/// A course offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Course {
    /// Course identifier.
    pub id: CourseId,
    /// Full course name.
    pub name: String,
    /// Short course code.
    pub code: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Instructor name.
    pub instructor: Option<String>,
    /// When the course record was created.
    pub created_at: DateTime<Utc>,
    /// Number of enrollments referencing this course.
    ///
    /// `None` when the snapshot was built without counting; the statistics
    /// engine then asks its trend fallback for a value.
    #[serde(rename = "enrollmentCount")]
    pub enrollment_count: Option<u32>,
}

// ---------------------------------------------------------------------------
// Enrollment
// ---------------------------------------------------------------------------

/// Association of one student with one course, optionally graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Enrollment {
    /// Enrollment identifier (absent for projections built from join rows).
    pub id: Option<EnrollmentId>,
    /// The enrolled student.
    pub student_id: StudentId,
    /// The course enrolled in.
    pub course_id: CourseId,
    /// Recorded grade, if any.
    pub grade: Option<Grade>,
    /// When the enrollment was created.
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Join rows
// ---------------------------------------------------------------------------

/// A course a given student is enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StudentCourse {
    /// Course identifier.
    pub course_id: CourseId,
    /// Course name.
    pub course_name: String,
    /// The student's grade in this course.
    pub grade: Option<Grade>,
}

/// A student's grade within a given course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CourseGrade {
    /// Student identifier.
    pub student_id: StudentId,
    /// `"First Last"`.
    pub student_name: String,
    /// Recorded grade, if any.
    pub grade: Option<Grade>,
}

/// A student enrolled in a given course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CourseStudent {
    /// Student identifier.
    pub id: StudentId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email address.
    pub email: String,
    /// Recorded grade, if any.
    pub grade: Option<Grade>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ada() -> Student {
        Student {
            id: StudentId::new(),
            first_name: String::from("Ada"),
            last_name: String::from("Lovelace"),
            email: String::from("ada@example.com"),
            created_at: Utc::now(),
            enrollment_count: 3,
            enrollments: Vec::new(),
        }
    }

    #[test]
    fn student_count_is_sent_as_enrollment_count_camel_case() {
        let json = serde_json::to_value(ada()).unwrap();
        assert_eq!(json["enrollmentCount"], 3);
        assert!(json.get("enrollment_count").is_none());
        assert_eq!(json["first_name"], "Ada");
    }

    #[test]
    fn course_count_is_sent_as_enrollment_count_camel_case() {
        let course = Course {
            id: CourseId::new(),
            name: String::from("Math"),
            code: Some(String::from("M101")),
            description: None,
            instructor: None,
            created_at: Utc::now(),
            enrollment_count: Some(7),
        };
        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["enrollmentCount"], 7);
        assert!(json.get("enrollment_count").is_none());

        let back: Course = serde_json::from_value(json).unwrap();
        assert_eq!(back.enrollment_count, Some(7));
    }

    #[test]
    fn full_name_skips_blank_parts() {
        assert_eq!(ada().full_name(), "Ada Lovelace");
        let mononym = Student {
            last_name: String::new(),
            ..ada()
        };
        assert_eq!(mononym.full_name(), "Ada");
    }
}
