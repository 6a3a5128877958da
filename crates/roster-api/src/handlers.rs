//! REST API endpoint handlers.
//!
//! Every handler issues its reads or write through the shared
//! [`Repository`](roster_db::Repository) in [`AppState`]. Nothing is cached
//! between requests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Health check with database time |
//! | `GET` | `/students` | List students (`?search=`) |
//! | `GET` | `/students/{id}` | Single student with enrollments |
//! | `POST` | `/students` | Create a student |
//! | `GET` | `/students/{id}/courses` | Courses a student is enrolled in |
//! | `GET` | `/students/{id}/stats` | GPA summary for one student |
//! | `GET` | `/courses` | List courses (`?search=`) |
//! | `GET` | `/courses/{id}` | Single course |
//! | `POST` | `/courses` | Create a course |
//! | `GET` | `/courses/{id}/grades` | Grades for a course |
//! | `GET` | `/courses/{id}/students` | Students in a course |
//! | `GET` | `/courses/{id}/stats` | Statistics for one course |
//! | `GET` | `/enrollments` | List enrollments |
//! | `POST` | `/enrollments` | Enroll a student |
//! | `PUT` | `/enrollments` | Record a grade |
//! | `GET` | `/stats` | Dashboard statistics |
//! | `GET` | `/dashboard` | HTML dashboard |

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use validator::Validate;

use roster_stats::{Stats, StudentStats};
use roster_types::{
    Course, CourseId, GradeUpdate, NewCourse, NewEnrollment, NewStudent, Student, StudentId,
};

use crate::dashboard;
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the list endpoints.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring filter. Empty or absent matches everything.
    pub search: Option<String>,
}

impl SearchQuery {
    fn term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

// ---------------------------------------------------------------------------
// GET / -- health check
// ---------------------------------------------------------------------------

/// Report that the API is up, with the database's current time.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let db_time = state.repo.ping().await?;
    Ok(Json(serde_json::json!({
        "message": "API running",
        "dbTime": db_time,
    })))
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// List all students with embedded enrollments.
///
/// # Query Parameters
///
/// - `search`: matched against first name, last name and email
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let mut students = state.repo.list_students().await?;
    if let Some(term) = query.term() {
        students.retain(|s| student_matches(s, &term));
    }
    Ok(Json(students))
}

/// Get a single student by ID.
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let id: StudentId = parse_id(&id)?;
    Ok(Json(state.repo.get_student(id).await?))
}

/// Create a student.
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewStudent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new) = payload?;
    new.validate()?;
    let student = state.repo.create_student(&new).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// List the courses a student is enrolled in.
pub async fn student_courses(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: StudentId = parse_id(&id)?;
    Ok(Json(state.repo.student_courses(id).await?))
}

/// GPA summary for one student, from their embedded enrollments.
pub async fn student_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StudentStats>, ApiError> {
    let id: StudentId = parse_id(&id)?;
    let student = state.repo.get_student(id).await?;
    Ok(Json(roster_stats::student_stats(&student)))
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// List all courses with enrollment counts.
///
/// # Query Parameters
///
/// - `search`: matched against name, code and instructor
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let mut courses = state.repo.list_courses().await?;
    if let Some(term) = query.term() {
        courses.retain(|c| course_matches(c, &term));
    }
    Ok(Json(courses))
}

/// Get a single course by ID.
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    let id: CourseId = parse_id(&id)?;
    Ok(Json(state.repo.get_course(id).await?))
}

/// Create a course.
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewCourse>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new) = payload?;
    new.validate()?;
    let course = state.repo.create_course(&new).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Grades recorded for a course.
pub async fn course_grades(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CourseId = parse_id(&id)?;
    Ok(Json(state.repo.course_grades(id).await?))
}

/// Students enrolled in a course.
pub async fn course_students(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CourseId = parse_id(&id)?;
    Ok(Json(state.repo.course_students(id).await?))
}

/// Statistics for one course, computed from its roster.
pub async fn course_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Stats>, ApiError> {
    let id: CourseId = parse_id(&id)?;
    let (course, roster) = tokio::try_join!(
        state.repo.get_course(id),
        state.repo.course_students(id)
    )?;
    Ok(Json(roster_stats::course_stats(&course, &roster, &state.stats)))
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

/// List all enrollments.
pub async fn list_enrollments(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.repo.list_enrollments().await?))
}

/// Enroll a student in a course.
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewEnrollment>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new) = payload?;
    let enrollment = state.repo.enroll(new).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Record the grade of an existing enrollment.
pub async fn record_grade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GradeUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(update) = payload?;
    state.repo.record_grade(update).await?;
    Ok(Json(serde_json::json!({
        "message": "Grade recorded",
        "student_id": update.student_id,
        "course_id": update.course_id,
        "grade": update.grade,
    })))
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Dashboard statistics over fresh snapshots of all three collections.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(load_stats(&state).await?))
}

/// Render the HTML dashboard.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    let stats = load_stats(&state).await?;
    Ok(Html(dashboard::render(&stats)?))
}

async fn load_stats(state: &AppState) -> Result<Stats, ApiError> {
    let (students, courses, enrollments) = tokio::try_join!(
        state.repo.list_students(),
        state.repo.list_courses(),
        state.repo.list_enrollments()
    )?;
    Ok(roster_stats::compute_stats(
        &students,
        &courses,
        &enrollments,
        &state.stats,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a typed ID from a path segment, returning an [`ApiError`] on failure.
fn parse_id<T>(s: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| ApiError::InvalidId(format!("{s}: {e}")))
}

fn student_matches(student: &Student, term: &str) -> bool {
    [&student.first_name, &student.last_name, &student.email]
        .into_iter()
        .any(|field| field.to_lowercase().contains(term))
}

fn course_matches(course: &Course, term: &str) -> bool {
    std::iter::once(Some(course.name.as_str()))
        .chain([course.code.as_deref(), course.instructor.as_deref()])
        .flatten()
        .any(|field| field.to_lowercase().contains(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_no_filter() {
        let query = SearchQuery {
            search: Some(String::from("   ")),
        };
        assert_eq!(query.term(), None);
        assert_eq!(SearchQuery::default().term(), None);
    }

    #[test]
    fn search_term_is_trimmed_and_lowercased() {
        let query = SearchQuery {
            search: Some(String::from(" MaTh ")),
        };
        assert_eq!(query.term().as_deref(), Some("math"));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(matches!(
            parse_id::<StudentId>("not-a-uuid"),
            Err(ApiError::InvalidId(_))
        ));
    }
}
