//! The data-access port the API layer depends on.
//!
//! Handlers hold an `Arc<dyn Repository>`, so production wiring passes a
//! [`PgRepository`] and tests pass a
//! [`MemoryRepository`](crate::memory::MemoryRepository).

use chrono::{DateTime, Utc};

use roster_types::{
    Course, CourseGrade, CourseId, CourseStudent, Enrollment, GradeUpdate, NewCourse,
    NewEnrollment, NewStudent, Student, StudentCourse, StudentId,
};

use crate::course_store::CourseStore;
use crate::enrollment_store::EnrollmentStore;
use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::student_store::StudentStore;

/// Every read and write the tracker performs.
///
/// Reads return full, fresh collections. Each write is a single insert or
/// update.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// Check the store is reachable and return its current time.
    async fn ping(&self) -> Result<DateTime<Utc>, DbError>;

    /// All students with embedded enrollments.
    async fn list_students(&self) -> Result<Vec<Student>, DbError>;

    /// One student by ID.
    async fn get_student(&self, id: StudentId) -> Result<Student, DbError>;

    /// Create a student.
    async fn create_student(&self, new: &NewStudent) -> Result<Student, DbError>;

    /// Courses a student is enrolled in.
    async fn student_courses(&self, id: StudentId) -> Result<Vec<StudentCourse>, DbError>;

    /// All courses with enrollment counts.
    async fn list_courses(&self) -> Result<Vec<Course>, DbError>;

    /// One course by ID.
    async fn get_course(&self, id: CourseId) -> Result<Course, DbError>;

    /// Create a course.
    async fn create_course(&self, new: &NewCourse) -> Result<Course, DbError>;

    /// Grades recorded for a course.
    async fn course_grades(&self, id: CourseId) -> Result<Vec<CourseGrade>, DbError>;

    /// Students enrolled in a course.
    async fn course_students(&self, id: CourseId) -> Result<Vec<CourseStudent>, DbError>;

    /// All enrollments.
    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, DbError>;

    /// Enroll a student in a course.
    async fn enroll(&self, new: NewEnrollment) -> Result<Enrollment, DbError>;

    /// Record the grade of an existing enrollment.
    async fn record_grade(&self, update: GradeUpdate) -> Result<(), DbError>;
}

/// [`Repository`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PostgresPool,
}

impl PgRepository {
    /// Wrap an already connected pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    /// The pool this repository issues queries on.
    pub const fn pool(&self) -> &PostgresPool {
        &self.pool
    }

    fn students(&self) -> StudentStore<'_> {
        StudentStore::new(self.pool.pool())
    }

    fn courses(&self) -> CourseStore<'_> {
        CourseStore::new(self.pool.pool())
    }

    fn enrollments(&self) -> EnrollmentStore<'_> {
        EnrollmentStore::new(self.pool.pool())
    }
}

#[async_trait::async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<DateTime<Utc>, DbError> {
        self.pool.ping().await
    }

    async fn list_students(&self) -> Result<Vec<Student>, DbError> {
        self.students().list().await
    }

    async fn get_student(&self, id: StudentId) -> Result<Student, DbError> {
        self.students().get(id).await
    }

    async fn create_student(&self, new: &NewStudent) -> Result<Student, DbError> {
        self.students().create(new).await
    }

    async fn student_courses(&self, id: StudentId) -> Result<Vec<StudentCourse>, DbError> {
        self.students().courses(id).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, DbError> {
        self.courses().list().await
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, DbError> {
        self.courses().get(id).await
    }

    async fn create_course(&self, new: &NewCourse) -> Result<Course, DbError> {
        self.courses().create(new).await
    }

    async fn course_grades(&self, id: CourseId) -> Result<Vec<CourseGrade>, DbError> {
        self.courses().grades(id).await
    }

    async fn course_students(&self, id: CourseId) -> Result<Vec<CourseStudent>, DbError> {
        self.courses().students(id).await
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, DbError> {
        self.enrollments().list().await
    }

    async fn enroll(&self, new: NewEnrollment) -> Result<Enrollment, DbError> {
        self.enrollments().enroll(new).await
    }

    async fn record_grade(&self, update: GradeUpdate) -> Result<(), DbError> {
        self.enrollments().record_grade(update).await
    }
}
