//! In-process [`Repository`] with the same semantics as the `PostgreSQL`
//! one: unique emails, unique course codes, one enrollment per
//! student/course pair, foreign keys checked, counts derived from rows.
//!
//! Used by API tests and for running the server without a database.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use roster_types::{
    Course, CourseGrade, CourseId, CourseStudent, CourseSummary, Enrollment, EnrollmentId, Grade,
    GradeUpdate, NewCourse, NewEnrollment, NewStudent, Student, StudentCourse, StudentEnrollment,
    StudentId,
};

use crate::error::DbError;
use crate::repository::Repository;

#[derive(Debug, Clone)]
struct StudentRecord {
    id: StudentId,
    first_name: String,
    last_name: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CourseRecord {
    id: CourseId,
    name: String,
    code: Option<String>,
    description: Option<String>,
    instructor: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct EnrollmentRecord {
    id: EnrollmentId,
    student_id: StudentId,
    course_id: CourseId,
    grade: Option<Grade>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    students: Vec<StudentRecord>,
    courses: Vec<CourseRecord>,
    enrollments: Vec<EnrollmentRecord>,
}

impl Tables {
    fn student(&self, id: StudentId) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.id == id)
    }

    fn course(&self, id: CourseId) -> Option<&CourseRecord> {
        self.courses.iter().find(|c| c.id == id)
    }

    fn enrollments_of_student(&self, id: StudentId) -> impl Iterator<Item = &EnrollmentRecord> {
        self.enrollments.iter().filter(move |e| e.student_id == id)
    }

    fn enrollments_in_course(&self, id: CourseId) -> impl Iterator<Item = &EnrollmentRecord> {
        self.enrollments.iter().filter(move |e| e.course_id == id)
    }

    fn build_student(&self, record: &StudentRecord) -> Student {
        let enrollments: Vec<StudentEnrollment> = self
            .enrollments_of_student(record.id)
            .filter_map(|e| {
                self.course(e.course_id).map(|c| StudentEnrollment {
                    id: e.id,
                    grade: e.grade,
                    course: CourseSummary {
                        id: c.id,
                        name: c.name.clone(),
                        code: c.code.clone(),
                    },
                })
            })
            .collect();

        Student {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            created_at: record.created_at,
            enrollment_count: u32::try_from(enrollments.len()).unwrap_or(u32::MAX),
            enrollments,
        }
    }

    fn build_course(&self, record: &CourseRecord) -> Course {
        let count = self.enrollments_in_course(record.id).count();
        Course {
            id: record.id,
            name: record.name.clone(),
            code: record.code.clone(),
            description: record.description.clone(),
            instructor: record.instructor.clone(),
            created_at: record.created_at,
            enrollment_count: Some(u32::try_from(count).unwrap_or(u32::MAX)),
        }
    }
}

/// [`Repository`] holding everything in memory behind a [`RwLock`].
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing the database: while offline every call fails with
    /// [`DbError::Connectivity`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), DbError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DbError::Connectivity(String::from(
                "in-memory store is offline",
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<DateTime<Utc>, DbError> {
        self.check_online()?;
        Ok(Utc::now())
    }

    async fn list_students(&self) -> Result<Vec<Student>, DbError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .students
            .iter()
            .map(|s| tables.build_student(s))
            .collect())
    }

    async fn get_student(&self, id: StudentId) -> Result<Student, DbError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        tables
            .student(id)
            .map(|s| tables.build_student(s))
            .ok_or_else(|| DbError::NotFound(format!("student {id}")))
    }

    async fn create_student(&self, new: &NewStudent) -> Result<Student, DbError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if tables.students.iter().any(|s| s.email == new.email) {
            return Err(DbError::ConstraintViolation(format!(
                "email {} is already registered",
                new.email
            )));
        }

        let record = StudentRecord {
            id: StudentId::new(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            created_at: Utc::now(),
        };
        let student = tables.build_student(&record);
        tables.students.push(record);
        Ok(student)
    }

    async fn student_courses(&self, id: StudentId) -> Result<Vec<StudentCourse>, DbError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments_of_student(id)
            .filter_map(|e| {
                tables.course(e.course_id).map(|c| StudentCourse {
                    course_id: c.id,
                    course_name: c.name.clone(),
                    grade: e.grade,
                })
            })
            .collect())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, DbError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .iter()
            .map(|c| tables.build_course(c))
            .collect())
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, DbError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        tables
            .course(id)
            .map(|c| tables.build_course(c))
            .ok_or_else(|| DbError::NotFound(format!("course {id}")))
    }

    async fn create_course(&self, new: &NewCourse) -> Result<Course, DbError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if let Some(code) = new.code.as_deref()
            && tables
                .courses
                .iter()
                .any(|c| c.code.as_deref() == Some(code))
        {
            return Err(DbError::ConstraintViolation(format!(
                "course code {code} is already in use"
            )));
        }

        let record = CourseRecord {
            id: CourseId::new(),
            name: new.name.clone(),
            code: new.code.clone(),
            description: new.description.clone(),
            instructor: new.instructor.clone(),
            created_at: Utc::now(),
        };
        let course = tables.build_course(&record);
        tables.courses.push(record);
        Ok(course)
    }

    async fn course_grades(&self, id: CourseId) -> Result<Vec<CourseGrade>, DbError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments_in_course(id)
            .filter_map(|e| {
                tables.student(e.student_id).map(|s| CourseGrade {
                    student_id: s.id,
                    student_name: format!("{} {}", s.first_name, s.last_name),
                    grade: e.grade,
                })
            })
            .collect())
    }

    async fn course_students(&self, id: CourseId) -> Result<Vec<CourseStudent>, DbError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments_in_course(id)
            .filter_map(|e| {
                tables.student(e.student_id).map(|s| CourseStudent {
                    id: s.id,
                    first_name: s.first_name.clone(),
                    last_name: s.last_name.clone(),
                    email: s.email.clone(),
                    grade: e.grade,
                })
            })
            .collect())
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>, DbError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .map(|e| Enrollment {
                id: Some(e.id),
                student_id: e.student_id,
                course_id: e.course_id,
                grade: e.grade,
                created_at: Some(e.created_at),
            })
            .collect())
    }

    async fn enroll(&self, new: NewEnrollment) -> Result<Enrollment, DbError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if tables.student(new.student_id).is_none() {
            return Err(DbError::ConstraintViolation(format!(
                "student {} does not exist",
                new.student_id
            )));
        }
        if tables.course(new.course_id).is_none() {
            return Err(DbError::ConstraintViolation(format!(
                "course {} does not exist",
                new.course_id
            )));
        }
        if tables
            .enrollments
            .iter()
            .any(|e| e.student_id == new.student_id && e.course_id == new.course_id)
        {
            return Err(DbError::ConstraintViolation(format!(
                "student {} is already enrolled in course {}",
                new.student_id, new.course_id
            )));
        }

        let record = EnrollmentRecord {
            id: EnrollmentId::new(),
            student_id: new.student_id,
            course_id: new.course_id,
            grade: None,
            created_at: Utc::now(),
        };
        let enrollment = Enrollment {
            id: Some(record.id),
            student_id: record.student_id,
            course_id: record.course_id,
            grade: None,
            created_at: Some(record.created_at),
        };
        tables.enrollments.push(record);
        Ok(enrollment)
    }

    async fn record_grade(&self, update: GradeUpdate) -> Result<(), DbError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let record = tables
            .enrollments
            .iter_mut()
            .find(|e| e.student_id == update.student_id && e.course_id == update.course_id)
            .ok_or_else(|| {
                DbError::NotFound(format!(
                    "enrollment of student {} in course {}",
                    update.student_id, update.course_id
                ))
            })?;
        record.grade = Some(update.grade);
        Ok(())
    }
}
