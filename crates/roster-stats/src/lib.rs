//! Statistics derivation for the Roster dashboard.
//!
//! Given flat snapshots of students, courses and enrollments, this crate
//! computes the fixed-shape [`Stats`] summary the dashboard renders:
//! totals, average GPA and its letter bucket, the grade distribution, the
//! top-courses chart and a monthly trend series.
//!
//! Everything here is synchronous and side-effect free. The only input
//! that is not part of the snapshots is the [`TrendFallback`], which the
//! caller injects explicitly through [`StatsOptions`].
//!
//! # Modules
//!
//! - [`engine`] -- [`compute_stats`] and the chart/trend builders
//! - [`gpa`] -- grade points, averaging, rounding and bucketing
//! - [`fallback`] -- placeholder sources and the count policy

pub mod engine;
pub mod fallback;
pub mod gpa;

pub use engine::{
    compute, compute_stats, course_stats, student_stats, ChartEntry, PieSlice, Stats,
    StatsOptions, StudentStats, TrendPoint, CHART_LIMIT, MONTHS,
};
pub use fallback::{
    CountPolicy, FixedFallback, RandomFallback, TrendFallback, ZeroFallback,
    RANDOM_FALLBACK_RANGE,
};
pub use gpa::{average_gpa, grade_bucket, grade_counts, round_gpa, student_gpa};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard contract.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::engine::Stats::export_all();
        let _ = crate::engine::ChartEntry::export_all();
        let _ = crate::engine::PieSlice::export_all();
        let _ = crate::engine::TrendPoint::export_all();
        let _ = crate::engine::StudentStats::export_all();
    }
}
