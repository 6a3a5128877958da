//! Grade-point averaging and grade tallies.
//!
//! All arithmetic is done in [`Decimal`] so the 2-decimal rounding of the
//! reported average is exact (3.5666... rounds to 3.57, never 3.5699999).

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use roster_types::{Enrollment, Grade, Student};

/// Number of decimal places the reported average is rounded to.
pub const GPA_DECIMAL_PLACES: u32 = 2;

/// Unrounded mean grade points over the given grades.
///
/// Returns zero for an empty input.
pub fn mean_points<I>(grades: I) -> Decimal
where
    I: IntoIterator<Item = Grade>,
{
    let (sum, count) = grades
        .into_iter()
        .fold((Decimal::ZERO, 0_u64), |(sum, count), grade| {
            (sum.saturating_add(grade.points()), count.saturating_add(1))
        });

    if count == 0 {
        return Decimal::ZERO;
    }
    sum.checked_div(Decimal::from(count)).unwrap_or(Decimal::ZERO)
}

/// Unrounded average GPA over every graded enrollment.
///
/// Ungraded enrollments are left out of both the sum and the count.
pub fn average_gpa(enrollments: &[Enrollment]) -> Decimal {
    mean_points(enrollments.iter().filter_map(|e| e.grade))
}

/// Round an average to [`GPA_DECIMAL_PLACES`], halves rounding up.
pub fn round_gpa(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(GPA_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Coarse letter bucket for an average.
///
/// Thresholds: `>= 4.0` is `A`, `>= 3.0` is `B+`, `>= 2.0` is `C+`,
/// `>= 1.0` is `D`, anything lower is `F`. Callers pass the unrounded
/// average.
pub fn grade_bucket(average: Decimal) -> Grade {
    if average >= Decimal::from(4) {
        Grade::A
    } else if average >= Decimal::from(3) {
        Grade::BPlus
    } else if average >= Decimal::from(2) {
        Grade::CPlus
    } else if average >= Decimal::ONE {
        Grade::D
    } else {
        Grade::F
    }
}

/// Count enrollments per grade symbol, skipping ungraded ones.
///
/// Only grades that actually occur get an entry. Iteration order is the
/// scale order (A+ first).
pub fn grade_counts(enrollments: &[Enrollment]) -> BTreeMap<Grade, usize> {
    let mut counts: BTreeMap<Grade, usize> = BTreeMap::new();
    for grade in enrollments.iter().filter_map(|e| e.grade) {
        let slot = counts.entry(grade).or_insert(0);
        *slot = slot.saturating_add(1);
    }
    counts
}

/// Rounded GPA of a single student from their embedded enrollments.
pub fn student_gpa(student: &Student) -> Decimal {
    round_gpa(mean_points(
        student.enrollments.iter().filter_map(|e| e.grade),
    ))
}
