//! Data layer for the Roster tracker (`PostgreSQL`).
//!
//! Every HTTP route maps onto one parameterized statement issued by one of
//! the stores below. Enrollment counts are never stored: they are derived
//! from enrollment rows whenever students or courses are read.
//!
//! # Architecture
//!
//! ```text
//! roster-api handlers
//!     |
//!     +-- Arc<dyn Repository>
//!         |-- PgRepository ----> PostgresPool
//!         |   |-- StudentStore     (students + embedded enrollments)
//!         |   |-- CourseStore      (courses + counts, per-course joins)
//!         |   +-- EnrollmentStore  (enroll, record grade)
//!         +-- MemoryRepository   (in-process, same semantics)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`student_store`] -- Student reads, creation, student-course join
//! - [`course_store`] -- Course reads, creation, grade and roster joins
//! - [`enrollment_store`] -- Enrollment listing, enrollment, grading
//! - [`repository`] -- The [`Repository`] port and its `PostgreSQL` adapter
//! - [`memory`] -- In-memory [`Repository`]
//! - [`error`] -- Shared error types

pub mod course_store;
mod decode;
pub mod enrollment_store;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod student_store;

// Re-export primary types for convenience.
pub use course_store::{CourseRow, CourseStore};
pub use enrollment_store::{EnrollmentRow, EnrollmentStore};
pub use error::DbError;
pub use memory::MemoryRepository;
pub use postgres::{PostgresConfig, PostgresPool};
pub use repository::{PgRepository, Repository};
pub use student_store::{StudentJoinRow, StudentStore, group_students};
