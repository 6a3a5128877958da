//! Dashboard statistics derived from student, course and enrollment
//! snapshots.
//!
//! [`compute_stats`] is a pure function of its inputs: it never performs
//! I/O, never mutates the snapshots and never fails. Missing data (an
//! ungraded enrollment, a course without a count) degrades to zero or to
//! the caller-supplied [`TrendFallback`].

use std::collections::{BTreeMap, HashMap};
use std::slice;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use roster_types::{Course, CourseId, CourseStudent, Enrollment, Grade, Student, StudentId};

use crate::fallback::{CountPolicy, TrendFallback, ZeroFallback};
use crate::gpa::{average_gpa, grade_bucket, grade_counts, mean_points, round_gpa, student_gpa};

/// Month labels assigned cyclically to the trend series.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Maximum number of courses in the bar chart.
pub const CHART_LIMIT: usize = 7;

/// Characters of the course name used as a chart label when there is no code.
pub const CHART_LABEL_CHARS: usize = 10;

// ---------------------------------------------------------------------------
// Output shape
// ---------------------------------------------------------------------------

/// Fixed-shape statistics summary rendered by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of students in the snapshot.
    pub total_students: usize,
    /// Number of courses in the snapshot.
    pub total_courses: usize,
    /// Number of enrollments in the snapshot.
    pub total_enrollments: usize,
    /// Letter bucket of the unrounded average.
    pub average_grade: Grade,
    /// Mean grade points over graded enrollments, rounded to 2 places.
    #[serde(rename = "averageGPA", with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub average_gpa: Decimal,
    /// Enrollments per grade symbol, in scale order.
    pub grade_counts: BTreeMap<Grade, usize>,
    /// One point per course, in course order.
    pub enrollment_trends: Vec<TrendPoint>,
    /// Top courses by enrollment.
    pub chart_data: Vec<ChartEntry>,
    /// Grade distribution, largest slice first.
    pub pie_data: Vec<PieSlice>,
}

/// One bar of the top-courses chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    /// Short label: the course code, or the first characters of the name.
    pub name: String,
    /// Enrollment count.
    pub students: u32,
    /// Full course name.
    pub full_name: String,
}

/// One slice of the grade distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PieSlice {
    /// The grade.
    pub name: Grade,
    /// Number of enrollments with that grade.
    pub value: usize,
}

/// One point of the enrollment trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrendPoint {
    /// Month label.
    pub month: String,
    /// Enrollment figure for the course (real count or fallback).
    pub enrollments: u32,
    /// Total courses in the snapshot.
    pub courses: usize,
    /// Total students in the snapshot.
    pub students: usize,
}

/// Grade summary of one student, shown on the student detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    /// The student.
    pub student_id: StudentId,
    /// `"First Last"`.
    pub name: String,
    /// Courses the student is enrolled in.
    pub enrollments: usize,
    /// Enrollments carrying a grade.
    pub graded: usize,
    /// Mean grade points over graded enrollments, rounded to 2 places.
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub gpa: Decimal,
    /// Letter bucket of the unrounded mean; `None` until something is graded.
    pub average_grade: Option<Grade>,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Knobs for [`compute_stats`].
#[derive(Debug, Clone)]
pub struct StatsOptions {
    /// Which enrollment count to use per course.
    pub count_policy: CountPolicy,
    /// Placeholder source for courses without a count.
    pub fallback: Arc<dyn TrendFallback>,
}

impl StatsOptions {
    /// Set the count policy.
    #[must_use]
    pub const fn with_count_policy(mut self, policy: CountPolicy) -> Self {
        self.count_policy = policy;
        self
    }

    /// Set the trend fallback source.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn TrendFallback>) -> Self {
        self.fallback = fallback;
        self
    }
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            count_policy: CountPolicy::Stored,
            fallback: Arc::new(ZeroFallback),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Compute dashboard statistics with default options.
pub fn compute(students: &[Student], courses: &[Course], enrollments: &[Enrollment]) -> Stats {
    compute_stats(students, courses, enrollments, &StatsOptions::default())
}

/// Compute dashboard statistics from the three snapshots.
pub fn compute_stats(
    students: &[Student],
    courses: &[Course],
    enrollments: &[Enrollment],
    options: &StatsOptions,
) -> Stats {
    summarize(students.len(), courses, enrollments, options)
}

/// Statistics for a single course built from its roster join rows.
///
/// The student total is the roster size and every roster row counts as
/// one enrollment.
pub fn course_stats(course: &Course, roster: &[CourseStudent], options: &StatsOptions) -> Stats {
    let enrollments: Vec<Enrollment> = roster
        .iter()
        .map(|row| Enrollment {
            id: None,
            student_id: row.id,
            course_id: course.id,
            grade: row.grade,
            created_at: None,
        })
        .collect();

    summarize(
        roster.len(),
        slice::from_ref(course),
        &enrollments,
        options,
    )
}

/// Grade summary of a single student from their embedded enrollments.
pub fn student_stats(student: &Student) -> StudentStats {
    let grades: Vec<Grade> = student.enrollments.iter().filter_map(|e| e.grade).collect();
    let average_grade =
        (!grades.is_empty()).then(|| grade_bucket(mean_points(grades.iter().copied())));

    StudentStats {
        student_id: student.id,
        name: student.full_name(),
        enrollments: student.enrollments.len(),
        graded: grades.len(),
        gpa: student_gpa(student),
        average_grade,
    }
}

fn summarize(
    student_total: usize,
    courses: &[Course],
    enrollments: &[Enrollment],
    options: &StatsOptions,
) -> Stats {
    let counts = course_enrollment_counts(courses, enrollments, options.count_policy);
    let average = average_gpa(enrollments);
    let grade_counts = grade_counts(enrollments);

    let stats = Stats {
        total_students: student_total,
        total_courses: courses.len(),
        total_enrollments: enrollments.len(),
        average_grade: grade_bucket(average),
        average_gpa: round_gpa(average),
        enrollment_trends: enrollment_trends(
            courses,
            &counts,
            student_total,
            options.fallback.as_ref(),
        ),
        chart_data: chart_data(courses, &counts),
        pie_data: pie_data(&grade_counts),
        grade_counts,
    };

    tracing::debug!(
        students = stats.total_students,
        courses = stats.total_courses,
        enrollments = stats.total_enrollments,
        average_gpa = %stats.average_gpa,
        "Computed statistics"
    );

    stats
}

// ---------------------------------------------------------------------------
// Pieces
// ---------------------------------------------------------------------------

/// Resolve the enrollment count of every course under `policy`.
///
/// The result is parallel to `courses`. Under [`CountPolicy::Derived`]
/// every entry is `Some`.
pub fn course_enrollment_counts(
    courses: &[Course],
    enrollments: &[Enrollment],
    policy: CountPolicy,
) -> Vec<Option<u32>> {
    match policy {
        CountPolicy::Stored => courses.iter().map(|c| c.enrollment_count).collect(),
        CountPolicy::Derived => {
            let mut tally: HashMap<CourseId, u32> = HashMap::new();
            for enrollment in enrollments {
                let slot = tally.entry(enrollment.course_id).or_insert(0);
                *slot = slot.saturating_add(1);
            }
            courses
                .iter()
                .map(|c| Some(tally.get(&c.id).copied().unwrap_or(0)))
                .collect()
        }
    }
}

/// Top [`CHART_LIMIT`] courses by enrollment count, descending.
///
/// A missing count sorts as zero. The sort is stable, so courses with equal
/// counts keep their input order.
pub fn chart_data(courses: &[Course], counts: &[Option<u32>]) -> Vec<ChartEntry> {
    let mut ranked: Vec<(&Course, u32)> = courses
        .iter()
        .zip(counts.iter().map(|c| c.unwrap_or(0)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(CHART_LIMIT)
        .map(|(course, students)| ChartEntry {
            name: chart_label(course),
            students,
            full_name: course.name.clone(),
        })
        .collect()
}

fn chart_label(course: &Course) -> String {
    match course.code.as_deref() {
        Some(code) if !code.is_empty() => code.to_owned(),
        _ => course.name.chars().take(CHART_LABEL_CHARS).collect(),
    }
}

/// Grade tallies as chart slices, largest first; ties keep scale order.
pub fn pie_data(grade_counts: &BTreeMap<Grade, usize>) -> Vec<PieSlice> {
    let mut slices: Vec<PieSlice> = grade_counts
        .iter()
        .map(|(&name, &value)| PieSlice { name, value })
        .collect();
    slices.sort_by(|a, b| b.value.cmp(&a.value));
    slices
}

/// One trend point per course with a cyclic month label.
pub fn enrollment_trends(
    courses: &[Course],
    counts: &[Option<u32>],
    student_total: usize,
    fallback: &dyn TrendFallback,
) -> Vec<TrendPoint> {
    courses
        .iter()
        .zip(MONTHS.iter().cycle())
        .enumerate()
        .map(|(index, (_course, month))| {
            let real = counts.get(index).copied().flatten();
            TrendPoint {
                month: (*month).to_owned(),
                enrollments: real.unwrap_or_else(|| fallback.enrollments_for(index)),
                courses: courses.len(),
                students: student_total,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use roster_types::{CourseSummary, EnrollmentId, StudentEnrollment};

    use super::*;
    use crate::fallback::{FixedFallback, RandomFallback};

    fn course(name: &str, code: Option<&str>, count: Option<u32>) -> Course {
        Course {
            id: CourseId::new(),
            name: name.to_owned(),
            code: code.map(str::to_owned),
            description: None,
            instructor: None,
            created_at: Utc::now(),
            enrollment_count: count,
        }
    }

    fn student(first: &str) -> Student {
        Student {
            id: StudentId::new(),
            first_name: first.to_owned(),
            last_name: String::from("Test"),
            email: format!("{first}@example.com"),
            created_at: Utc::now(),
            enrollment_count: 0,
            enrollments: Vec::new(),
        }
    }

    fn enrollment(course_id: CourseId, grade: Option<Grade>) -> Enrollment {
        Enrollment {
            id: Some(EnrollmentId::new()),
            student_id: StudentId::new(),
            course_id,
            grade,
            created_at: Some(Utc::now()),
        }
    }

    fn counted_courses(counts: &[u32]) -> Vec<Course> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &n)| course(&format!("Course {i}"), Some(&format!("C{i}")), Some(n)))
            .collect()
    }

    #[test]
    fn empty_snapshot_yields_zeroed_stats() {
        let stats = compute(&[], &[], &[]);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.total_courses, 0);
        assert_eq!(stats.total_enrollments, 0);
        assert_eq!(stats.average_gpa, Decimal::ZERO);
        assert_eq!(stats.average_grade, Grade::F);
        assert!(stats.grade_counts.is_empty());
        assert!(stats.chart_data.is_empty());
        assert!(stats.pie_data.is_empty());
        assert!(stats.enrollment_trends.is_empty());
    }

    #[test]
    fn average_gpa_rounds_mixed_grades() {
        let c = course("Algebra", None, Some(3));
        let rows = [
            enrollment(c.id, Some(Grade::A)),
            enrollment(c.id, Some(Grade::B)),
            enrollment(c.id, Some(Grade::AMinus)),
        ];
        let stats = compute(&[], &[c], &rows);
        assert_eq!(stats.average_gpa, Decimal::new(357, 2));
        assert_eq!(stats.average_grade, Grade::BPlus);
    }

    #[test]
    fn bucket_uses_the_unrounded_average() {
        // 17 x A, 2 x A+, 1 x B+ averages exactly 3.995: reported as 4.00,
        // bucketed from 3.995.
        let c = course("Logic", None, Some(20));
        let mut rows: Vec<Enrollment> = (0..17).map(|_| enrollment(c.id, Some(Grade::A))).collect();
        rows.push(enrollment(c.id, Some(Grade::APlus)));
        rows.push(enrollment(c.id, Some(Grade::APlus)));
        rows.push(enrollment(c.id, Some(Grade::BPlus)));
        let stats = compute(&[], &[c], &rows);
        assert_eq!(stats.average_gpa, Decimal::from(4));
        assert_eq!(stats.average_grade, Grade::BPlus);
    }

    #[test]
    fn grade_counts_sum_to_graded_enrollments() {
        let c = course("History", None, None);
        let rows = [
            enrollment(c.id, Some(Grade::C)),
            enrollment(c.id, None),
            enrollment(c.id, Some(Grade::C)),
            enrollment(c.id, Some(Grade::F)),
            enrollment(c.id, None),
        ];
        let stats = compute(&[], &[c], &rows);
        assert_eq!(stats.grade_counts.values().sum::<usize>(), 3);
        assert_eq!(stats.total_enrollments, 5);
    }

    #[test]
    fn chart_keeps_top_seven_descending() {
        let courses = counted_courses(&[5, 50, 3, 40, 1, 30, 2, 20, 0, 10]);
        let stats = compute(&[], &courses, &[]);
        assert_eq!(stats.chart_data.len(), CHART_LIMIT);
        let students: Vec<u32> = stats.chart_data.iter().map(|e| e.students).collect();
        assert_eq!(students, vec![50, 40, 30, 20, 10, 5, 3]);
        assert_eq!(stats.chart_data.first().map(|e| e.name.as_str()), Some("C1"));
    }

    #[test]
    fn chart_ties_keep_input_order() {
        let courses = vec![
            course("First", Some("F1"), Some(4)),
            course("Second", Some("S2"), Some(9)),
            course("Third", Some("T3"), Some(4)),
        ];
        let stats = compute(&[], &courses, &[]);
        let names: Vec<&str> = stats.chart_data.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["S2", "F1", "T3"]);
    }

    #[test]
    fn chart_label_falls_back_to_truncated_name() {
        let courses = vec![
            course("Introduction to Databases", None, Some(2)),
            course("Übersetzerbau und Sprachen", Some(""), Some(1)),
            course("", None, Some(0)),
        ];
        let stats = compute(&[], &courses, &[]);
        let labels: Vec<&str> = stats.chart_data.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(labels, vec!["Introducti", "Übersetzer", ""]);
        assert_eq!(
            stats.chart_data.first().map(|e| e.full_name.as_str()),
            Some("Introduction to Databases")
        );
    }

    #[test]
    fn zero_enrollment_course_is_charted() {
        let stats = compute(&[], &[course("Empty", Some("E0"), Some(0))], &[]);
        assert_eq!(stats.chart_data.len(), 1);
        assert_eq!(stats.chart_data.first().map(|e| e.students), Some(0));
    }

    #[test]
    fn pie_sorted_by_value_with_scale_order_ties() {
        let c = course("Chem", None, None);
        let rows = [
            enrollment(c.id, Some(Grade::C)),
            enrollment(c.id, Some(Grade::B)),
            enrollment(c.id, Some(Grade::C)),
            enrollment(c.id, Some(Grade::A)),
            enrollment(c.id, Some(Grade::C)),
            enrollment(c.id, Some(Grade::B)),
            enrollment(c.id, Some(Grade::F)),
        ];
        let stats = compute(&[], &[c], &rows);
        let slices: Vec<(Grade, usize)> =
            stats.pie_data.iter().map(|s| (s.name, s.value)).collect();
        assert_eq!(
            slices,
            vec![(Grade::C, 3), (Grade::B, 2), (Grade::A, 1), (Grade::F, 1)]
        );
    }

    #[test]
    fn trend_months_cycle_through_the_year() {
        let courses = counted_courses(&[1; 14]);
        let students = [student("a"), student("b")];
        let stats = compute(&students, &courses, &[]);
        assert_eq!(stats.enrollment_trends.len(), 14);
        for (i, point) in stats.enrollment_trends.iter().enumerate() {
            assert_eq!(Some(&point.month.as_str()), MONTHS.get(i % 12));
            assert_eq!(point.courses, 14);
            assert_eq!(point.students, 2);
        }
    }

    #[test]
    fn missing_counts_use_injected_fallback() {
        let courses = vec![course("A", None, Some(5)), course("B", None, None)];
        let options = StatsOptions::default().with_fallback(Arc::new(FixedFallback(17)));
        let stats = compute_stats(&[], &courses, &[], &options);
        let figures: Vec<u32> = stats.enrollment_trends.iter().map(|p| p.enrollments).collect();
        assert_eq!(figures, vec![5, 17]);
        // The chart still treats the missing count as zero.
        assert_eq!(stats.chart_data.get(1).map(|e| e.students), Some(0));
    }

    #[test]
    fn random_fallback_values_stay_in_range() {
        let courses: Vec<Course> = (0..30).map(|i| course(&format!("{i}"), None, None)).collect();
        let options = StatsOptions::default().with_fallback(Arc::new(RandomFallback::new()));
        let stats = compute_stats(&[], &courses, &[], &options);
        assert!(
            stats
                .enrollment_trends
                .iter()
                .all(|p| (10..40).contains(&p.enrollments))
        );
    }

    #[test]
    fn derived_policy_recounts_from_enrollments() {
        let busy = course("Busy", Some("B1"), Some(99));
        let quiet = course("Quiet", Some("Q1"), None);
        let rows = [
            enrollment(busy.id, None),
            enrollment(busy.id, Some(Grade::A)),
            enrollment(quiet.id, None),
        ];
        let options = StatsOptions::default()
            .with_count_policy(CountPolicy::Derived)
            .with_fallback(Arc::new(FixedFallback(1000)));
        let stats = compute_stats(&[], &[busy, quiet], &rows, &options);
        let students: Vec<u32> = stats.chart_data.iter().map(|e| e.students).collect();
        assert_eq!(students, vec![2, 1]);
        let figures: Vec<u32> = stats.enrollment_trends.iter().map(|p| p.enrollments).collect();
        assert_eq!(figures, vec![2, 1]);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let courses = counted_courses(&[3, 1, 4, 1, 5]);
        let first = courses.first().map(|c| c.id).unwrap_or_default();
        let rows = [
            enrollment(first, Some(Grade::B)),
            enrollment(first, Some(Grade::DPlus)),
        ];
        let students = [student("x")];
        assert_eq!(
            compute(&students, &courses, &rows),
            compute(&students, &courses, &rows)
        );
    }

    #[test]
    fn course_stats_counts_roster_rows() {
        let c = course("Physics", Some("PHY"), Some(2));
        let roster = [
            CourseStudent {
                id: StudentId::new(),
                first_name: String::from("Ada"),
                last_name: String::from("L"),
                email: String::from("ada@example.com"),
                grade: Some(Grade::A),
            },
            CourseStudent {
                id: StudentId::new(),
                first_name: String::from("Alan"),
                last_name: String::from("T"),
                email: String::from("alan@example.com"),
                grade: Some(Grade::C),
            },
        ];
        let stats = course_stats(&c, &roster, &StatsOptions::default());
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_enrollments, 2);
        assert_eq!(stats.average_gpa, Decimal::from(3));
    }

    fn enrolled(grades: &[Option<Grade>]) -> Student {
        let enrollments = grades
            .iter()
            .map(|&grade| StudentEnrollment {
                id: EnrollmentId::new(),
                grade,
                course: CourseSummary {
                    id: CourseId::new(),
                    name: String::from("Course"),
                    code: None,
                },
            })
            .collect();
        Student {
            enrollments,
            ..student("Ada")
        }
    }

    #[test]
    fn student_stats_average_graded_enrollments() {
        let s = enrolled(&[Some(Grade::A), Some(Grade::BPlus), None]);
        let stats = student_stats(&s);
        assert_eq!(stats.student_id, s.id);
        assert_eq!(stats.name, "Ada Test");
        assert_eq!(stats.enrollments, 3);
        assert_eq!(stats.graded, 2);
        assert_eq!(stats.gpa, Decimal::new(365, 2));
        assert_eq!(stats.average_grade, Some(Grade::BPlus));
    }

    #[test]
    fn ungraded_student_has_no_bucket() {
        let stats = student_stats(&enrolled(&[None, None]));
        assert_eq!(stats.graded, 0);
        assert_eq!(stats.gpa, Decimal::ZERO);
        assert_eq!(stats.average_grade, None);
    }

    #[test]
    fn student_stats_serialize_camel_case() {
        let stats = student_stats(&enrolled(&[Some(Grade::BMinus)]));
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["gpa"], 2.7);
        assert_eq!(json["averageGrade"], "C+");
        assert_eq!(json["graded"], 1);
        assert!(json.get("studentId").is_some());
    }

    #[test]
    fn serializes_with_dashboard_keys() {
        let c = course("Art", Some("ART"), Some(1));
        let rows = [enrollment(c.id, Some(Grade::BMinus))];
        let json = serde_json::to_value(compute(&[], &[c], &rows)).unwrap();
        assert_eq!(json["totalCourses"], 1);
        assert_eq!(json["averageGPA"], 2.7);
        assert_eq!(json["averageGrade"], "C+");
        assert_eq!(json["gradeCounts"]["B-"], 1);
        assert_eq!(json["chartData"][0]["fullName"], "Art");
        assert_eq!(json["pieData"][0]["name"], "B-");
        assert_eq!(json["enrollmentTrends"][0]["month"], "Jan");
    }
}
