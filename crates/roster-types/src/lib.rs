//! Shared type definitions for the Roster student/course tracker.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for dashboard clients.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`grade`] -- The 12-symbol letter-grade scale and grade points
//! - [`structs`] -- Students, courses, enrollments and join rows
//! - [`requests`] -- Validated payloads for the write endpoints

pub mod grade;
pub mod ids;
pub mod requests;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use grade::{Grade, GradeFamily, ParseGradeError};
pub use ids::{CourseId, EnrollmentId, StudentId};
pub use requests::{GradeUpdate, NewCourse, NewEnrollment, NewStudent};
pub use structs::{
    Course, CourseGrade, CourseStudent, CourseSummary, Enrollment, Student, StudentCourse,
    StudentEnrollment,
};
