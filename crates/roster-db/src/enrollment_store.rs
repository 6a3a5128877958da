//! Enrollment reads and writes.
//!
//! Each write is a single statement. A student can be enrolled in a given
//! course at most once (`UNIQUE (student_id, course_id)`), and grades are
//! restricted to the scale by a `CHECK` constraint as well as by
//! [`Grade`](roster_types::Grade).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use roster_types::{CourseId, Enrollment, EnrollmentId, GradeUpdate, NewEnrollment, StudentId};

use crate::decode;
use crate::error::DbError;

/// Operations on the `enrollments` table.
pub struct EnrollmentStore<'a> {
    pool: &'a PgPool,
}

impl<'a> EnrollmentStore<'a> {
    /// Create a new enrollment store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every enrollment, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a stored grade is invalid.
    pub async fn list(&self) -> Result<Vec<Enrollment>, DbError> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r"SELECT id, student_id, course_id, grade, created_at
              FROM enrollments
              ORDER BY created_at, id",
        )
        .fetch_all(self.pool)
        .await?;

        tracing::debug!(count = rows.len(), "Loaded enrollments");
        rows.into_iter().map(Enrollment::try_from).collect()
    }

    /// Enroll a student in a course.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConstraintViolation`] if the student or course
    /// does not exist, or the pair is already enrolled.
    pub async fn enroll(&self, new: NewEnrollment) -> Result<Enrollment, DbError> {
        let id = EnrollmentId::new();
        let row: (DateTime<Utc>,) = sqlx::query_as(
            r"INSERT INTO enrollments (id, student_id, course_id)
              VALUES ($1, $2, $3)
              RETURNING created_at",
        )
        .bind(id.into_inner())
        .bind(new.student_id.into_inner())
        .bind(new.course_id.into_inner())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(
            enrollment_id = %id,
            student_id = %new.student_id,
            course_id = %new.course_id,
            "Student enrolled"
        );

        Ok(Enrollment {
            id: Some(id),
            student_id: new.student_id,
            course_id: new.course_id,
            grade: None,
            created_at: Some(row.0),
        })
    }

    /// Record (or overwrite) the grade of an existing enrollment.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the student is not enrolled in the
    /// course.
    pub async fn record_grade(&self, update: GradeUpdate) -> Result<(), DbError> {
        let result = sqlx::query(
            r"UPDATE enrollments SET grade = $1
              WHERE student_id = $2 AND course_id = $3",
        )
        .bind(update.grade.as_str())
        .bind(update.student_id.into_inner())
        .bind(update.course_id.into_inner())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!(
                "enrollment of student {} in course {}",
                update.student_id, update.course_id
            )));
        }

        tracing::info!(
            student_id = %update.student_id,
            course_id = %update.course_id,
            grade = %update.grade,
            "Grade recorded"
        );

        Ok(())
    }
}

/// A row from the `enrollments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EnrollmentRow {
    /// Enrollment UUID.
    pub id: Uuid,
    /// Student UUID.
    pub student_id: Uuid,
    /// Course UUID.
    pub course_id: Uuid,
    /// Stored grade symbol.
    pub grade: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = DbError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Some(EnrollmentId::from(row.id)),
            student_id: StudentId::from(row.student_id),
            course_id: CourseId::from(row.course_id),
            grade: decode::grade(row.grade.as_deref())?,
            created_at: Some(row.created_at),
        })
    }
}
