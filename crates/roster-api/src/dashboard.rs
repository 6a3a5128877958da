//! Server-rendered HTML dashboard.
//!
//! Renders a [`Stats`] summary through a `minijinja` template: four stat
//! cards, the top-courses table, the grade distribution coloured by letter
//! family, and the monthly trend table.

use minijinja::Environment;
use serde::Serialize;

use roster_stats::{ChartEntry, Stats, TrendPoint};
use roster_types::{Grade, GradeFamily};

const TEMPLATE_NAME: &str = "dashboard.html";
const TEMPLATE: &str = include_str!("../templates/dashboard.html");

/// Display colour of a grade family.
pub const fn family_color(family: GradeFamily) -> &'static str {
    match family {
        GradeFamily::A => "#10b981",
        GradeFamily::B => "#3b82f6",
        GradeFamily::C => "#8b5cf6",
        GradeFamily::D => "#f59e0b",
        GradeFamily::F => "#ef4444",
    }
}

#[derive(Debug, Serialize)]
struct DashboardView<'a> {
    total_students: usize,
    total_courses: usize,
    total_enrollments: usize,
    average_gpa: String,
    average_grade: Grade,
    average_color: &'static str,
    top_courses: &'a [ChartEntry],
    grades: Vec<GradeBar>,
    trends: &'a [TrendPoint],
}

#[derive(Debug, Serialize)]
struct GradeBar {
    grade: Grade,
    count: usize,
    percent: usize,
    color: &'static str,
}

fn grade_bars(stats: &Stats) -> Vec<GradeBar> {
    let graded: usize = stats.pie_data.iter().map(|s| s.value).sum();
    stats
        .pie_data
        .iter()
        .map(|slice| GradeBar {
            grade: slice.name,
            count: slice.value,
            percent: slice
                .value
                .saturating_mul(100)
                .checked_div(graded)
                .unwrap_or(0),
            color: family_color(slice.name.family()),
        })
        .collect()
}

/// Render the dashboard page for `stats`.
///
/// # Errors
///
/// Returns a [`minijinja::Error`] if the template fails to compile or
/// render.
pub fn render(stats: &Stats) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;

    let view = DashboardView {
        total_students: stats.total_students,
        total_courses: stats.total_courses,
        total_enrollments: stats.total_enrollments,
        average_gpa: format!("{:.2}", stats.average_gpa),
        average_grade: stats.average_grade,
        average_color: family_color(stats.average_grade.family()),
        top_courses: &stats.chart_data,
        grades: grade_bars(stats),
        trends: &stats.enrollment_trends,
    };

    env.get_template(TEMPLATE_NAME)?.render(&view)
}
