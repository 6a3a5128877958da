//! Course reads and writes, plus the per-course join views.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use roster_types::{Course, CourseGrade, CourseId, CourseStudent, NewCourse, StudentId};

use crate::decode;
use crate::error::DbError;

/// Shared `SELECT` for courses with their enrollment count.
const COURSE_WITH_COUNT: &str = r"
    SELECT
        c.id, c.name, c.code, c.description, c.instructor, c.created_at,
        COUNT(e.id) AS enrollment_count
    FROM courses c
    LEFT JOIN enrollments e ON e.course_id = c.id
";

/// Operations on the `courses` table.
pub struct CourseStore<'a> {
    pool: &'a PgPool,
}

impl<'a> CourseStore<'a> {
    /// Create a new course store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every course with its enrollment count, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn list(&self) -> Result<Vec<Course>, DbError> {
        let sql = format!("{COURSE_WITH_COUNT} GROUP BY c.id ORDER BY c.created_at, c.id");
        let rows = sqlx::query_as::<_, CourseRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Loaded courses");
        Ok(rows.into_iter().map(Course::from).collect())
    }

    /// Fetch one course by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no such course exists.
    pub async fn get(&self, id: CourseId) -> Result<Course, DbError> {
        let sql = format!("{COURSE_WITH_COUNT} WHERE c.id = $1 GROUP BY c.id");
        let row = sqlx::query_as::<_, CourseRow>(&sql)
            .bind(id.into_inner())
            .fetch_optional(self.pool)
            .await?;

        row.map(Course::from)
            .ok_or_else(|| DbError::NotFound(format!("course {id}")))
    }

    /// Insert a new course.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ConstraintViolation`] if the code is taken.
    pub async fn create(&self, new: &NewCourse) -> Result<Course, DbError> {
        let id = CourseId::new();
        let row: (DateTime<Utc>,) = sqlx::query_as(
            r"INSERT INTO courses (id, name, code, description, instructor)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING created_at",
        )
        .bind(id.into_inner())
        .bind(&new.name)
        .bind(new.code.as_deref())
        .bind(new.description.as_deref())
        .bind(new.instructor.as_deref())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(course_id = %id, name = %new.name, "Created course");

        Ok(Course {
            id,
            name: new.name.clone(),
            code: new.code.clone(),
            description: new.description.clone(),
            instructor: new.instructor.clone(),
            created_at: row.0,
            enrollment_count: Some(0),
        })
    }

    /// Grades recorded for the given course, one row per enrolled student.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a stored grade is invalid.
    pub async fn grades(&self, id: CourseId) -> Result<Vec<CourseGrade>, DbError> {
        let rows = sqlx::query_as::<_, CourseGradeRow>(
            r"SELECT s.id AS student_id,
                     s.first_name || ' ' || s.last_name AS student_name,
                     e.grade AS grade
              FROM enrollments e
              JOIN students s ON e.student_id = s.id
              WHERE e.course_id = $1
              ORDER BY e.created_at, e.id",
        )
        .bind(id.into_inner())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CourseGrade {
                    student_id: StudentId::from(row.student_id),
                    student_name: row.student_name,
                    grade: decode::grade(row.grade.as_deref())?,
                })
            })
            .collect()
    }

    /// Students enrolled in the given course with their grades.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails or a stored grade is invalid.
    pub async fn students(&self, id: CourseId) -> Result<Vec<CourseStudent>, DbError> {
        let rows = sqlx::query_as::<_, CourseStudentRow>(
            r"SELECT s.id, s.first_name, s.last_name, s.email, e.grade
              FROM enrollments e
              JOIN students s ON e.student_id = s.id
              WHERE e.course_id = $1
              ORDER BY e.created_at, e.id",
        )
        .bind(id.into_inner())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CourseStudent {
                    id: StudentId::from(row.id),
                    first_name: row.first_name,
                    last_name: row.last_name,
                    email: row.email,
                    grade: decode::grade(row.grade.as_deref())?,
                })
            })
            .collect()
    }
}

/// A row from the courses-with-count query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseRow {
    /// Course UUID.
    pub id: Uuid,
    /// Course name.
    pub name: String,
    /// Course code.
    pub code: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Instructor.
    pub instructor: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// `COUNT` of joined enrollment rows.
    pub enrollment_count: i64,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: CourseId::from(row.id),
            name: row.name,
            code: row.code,
            description: row.description,
            instructor: row.instructor,
            created_at: row.created_at,
            enrollment_count: Some(decode::count(row.enrollment_count)),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CourseGradeRow {
    student_id: Uuid,
    student_name: String,
    grade: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CourseStudentRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    grade: Option<String>,
}
