//! Student reads and writes.
//!
//! Students are read through a left join against enrollments and courses,
//! then folded into one [`Student`] per student with their enrollments
//! embedded. The enrollment count is the number of joined enrollment rows,
//! so it can never drift from the data.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use roster_types::{
    CourseId, CourseSummary, EnrollmentId, NewStudent, Student, StudentCourse, StudentEnrollment,
    StudentId,
};

use crate::decode;
use crate::error::DbError;

/// Shared `SELECT` for the student projection.
const STUDENT_JOIN: &str = r"
    SELECT
        s.id          AS student_id,
        s.first_name  AS first_name,
        s.last_name   AS last_name,
        s.email       AS email,
        s.created_at  AS student_created_at,
        e.id          AS enrollment_id,
        e.grade       AS grade,
        c.id          AS course_id,
        c.name        AS course_name,
        c.code        AS course_code
    FROM students s
    LEFT JOIN enrollments e ON e.student_id = s.id
    LEFT JOIN courses c ON c.id = e.course_id
";

/// Operations on the `students` table.
pub struct StudentStore<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentStore<'a> {
    /// Create a new student store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every student with embedded enrollments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a stored grade is invalid.
    pub async fn list(&self) -> Result<Vec<Student>, DbError> {
        let sql = format!("{STUDENT_JOIN} ORDER BY s.created_at, s.id, e.created_at, e.id");
        let rows = sqlx::query_as::<_, StudentJoinRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        tracing::debug!(rows = rows.len(), "Loaded student join rows");
        group_students(rows)
    }

    /// Fetch one student by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no such student exists.
    pub async fn get(&self, id: StudentId) -> Result<Student, DbError> {
        let sql = format!("{STUDENT_JOIN} WHERE s.id = $1 ORDER BY e.created_at, e.id");
        let rows = sqlx::query_as::<_, StudentJoinRow>(&sql)
            .bind(id.into_inner())
            .fetch_all(self.pool)
            .await?;

        group_students(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound(format!("student {id}")))
    }

    /// Insert a new student.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConstraintViolation`] if the email is taken.
    pub async fn create(&self, new: &NewStudent) -> Result<Student, DbError> {
        let id = StudentId::new();
        let row: (DateTime<Utc>,) = sqlx::query_as(
            r"INSERT INTO students (id, first_name, last_name, email)
              VALUES ($1, $2, $3, $4)
              RETURNING created_at",
        )
        .bind(id.into_inner())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(student_id = %id, "Created student");

        Ok(Student {
            id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            created_at: row.0,
            enrollment_count: 0,
            enrollments: Vec::new(),
        })
    }

    /// Courses the given student is enrolled in.
    ///
    /// An unknown student yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn courses(&self, id: StudentId) -> Result<Vec<StudentCourse>, DbError> {
        let rows = sqlx::query_as::<_, StudentCourseRow>(
            r"SELECT c.id AS course_id, c.name AS course_name, e.grade AS grade
              FROM enrollments e
              JOIN courses c ON e.course_id = c.id
              WHERE e.student_id = $1
              ORDER BY e.created_at, e.id",
        )
        .bind(id.into_inner())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(StudentCourse {
                    course_id: CourseId::from(row.course_id),
                    course_name: row.course_name,
                    grade: decode::grade(row.grade.as_deref())?,
                })
            })
            .collect()
    }
}

/// One row of the student/enrollment/course left join.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentJoinRow {
    /// Student UUID.
    pub student_id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Student creation time.
    pub student_created_at: DateTime<Utc>,
    /// Enrollment UUID (null when the student has no enrollments).
    pub enrollment_id: Option<Uuid>,
    /// Stored grade symbol.
    pub grade: Option<String>,
    /// Course UUID.
    pub course_id: Option<Uuid>,
    /// Course name.
    pub course_name: Option<String>,
    /// Course code.
    pub course_code: Option<String>,
}

/// A row of the student-courses join.
#[derive(Debug, Clone, sqlx::FromRow)]
struct StudentCourseRow {
    course_id: Uuid,
    course_name: String,
    grade: Option<String>,
}

/// Fold ordered join rows into students, keeping first-seen order.
///
/// Rows without an enrollment contribute the student only. The enrollment
/// count is the number of enrollment rows folded in.
///
/// # Errors
///
/// Returns [`DbError::Decode`] if a grade is off the scale.
pub fn group_students(rows: Vec<StudentJoinRow>) -> Result<Vec<Student>, DbError> {
    let mut students: Vec<Student> = Vec::new();

    for row in rows {
        let id = StudentId::from(row.student_id);
        if students.last().is_none_or(|s| s.id != id) {
            students.push(Student {
                id,
                first_name: row.first_name.clone(),
                last_name: row.last_name.clone(),
                email: row.email.clone(),
                created_at: row.student_created_at,
                enrollment_count: 0,
                enrollments: Vec::new(),
            });
        }

        let (Some(enrollment_id), Some(course_id)) = (row.enrollment_id, row.course_id) else {
            continue;
        };
        let enrollment = StudentEnrollment {
            id: EnrollmentId::from(enrollment_id),
            grade: decode::grade(row.grade.as_deref())?,
            course: CourseSummary {
                id: CourseId::from(course_id),
                name: row.course_name.unwrap_or_default(),
                code: row.course_code,
            },
        };

        if let Some(student) = students.last_mut() {
            student.enrollments.push(enrollment);
            student.enrollment_count = student.enrollment_count.saturating_add(1);
        }
    }

    Ok(students)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use roster_types::Grade;

    fn row(student: Uuid, enrollment: Option<(Uuid, Option<&str>)>) -> StudentJoinRow {
        StudentJoinRow {
            student_id: student,
            first_name: String::from("Grace"),
            last_name: String::from("Hopper"),
            email: format!("{student}@example.com"),
            student_created_at: Utc::now(),
            enrollment_id: enrollment.map(|(id, _)| id),
            grade: enrollment.and_then(|(_, g)| g.map(str::to_owned)),
            course_id: enrollment.map(|_| Uuid::now_v7()),
            course_name: enrollment.map(|_| String::from("Compilers")),
            course_code: None,
        }
    }

    #[test]
    fn student_without_enrollments_has_zero_count() {
        let students = group_students(vec![row(Uuid::now_v7(), None)]).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students.first().map(|s| s.enrollment_count), Some(0));
        assert!(students.first().is_some_and(|s| s.enrollments.is_empty()));
    }

    #[test]
    fn rows_fold_into_students_in_order() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let rows = vec![
            row(a, Some((Uuid::now_v7(), Some("A")))),
            row(a, Some((Uuid::now_v7(), None))),
            row(b, None),
        ];
        let students = group_students(rows).unwrap();
        assert_eq!(students.len(), 2);

        let first = students.first().unwrap();
        assert_eq!(first.id, StudentId::from(a));
        assert_eq!(first.enrollment_count, 2);
        assert_eq!(first.enrollments.first().and_then(|e| e.grade), Some(Grade::A));

        let second = students.get(1).unwrap();
        assert_eq!(second.enrollment_count, 0);
    }

    #[test]
    fn invalid_grade_fails_the_fold() {
        let rows = vec![row(Uuid::now_v7(), Some((Uuid::now_v7(), Some("Q"))))];
        assert!(matches!(group_students(rows), Err(DbError::Decode(_))));
    }
}
