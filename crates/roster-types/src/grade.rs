//! The letter-grade scale and its grade-point mapping.
//!
//! Grades are a closed 12-symbol scale. Anything outside the scale fails to
//! parse, so an ungraded enrollment is always `Option::None` and never a
//! stray string.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A letter grade on the 12-symbol scale.
///
/// Variants are declared best-first, so the derived [`Ord`] sorts `A+`
/// before `A` before `A-` and so on down to `F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Grade {
    /// A+ (4.3 points).
    #[serde(rename = "A+")]
    APlus,
    /// A (4.0 points).
    #[serde(rename = "A")]
    A,
    /// A- (3.7 points).
    #[serde(rename = "A-")]
    AMinus,
    /// B+ (3.3 points).
    #[serde(rename = "B+")]
    BPlus,
    /// B (3.0 points).
    #[serde(rename = "B")]
    B,
    /// B- (2.7 points).
    #[serde(rename = "B-")]
    BMinus,
    /// C+ (2.3 points).
    #[serde(rename = "C+")]
    CPlus,
    /// C (2.0 points).
    #[serde(rename = "C")]
    C,
    /// C- (1.7 points).
    #[serde(rename = "C-")]
    CMinus,
    /// D+ (1.3 points).
    #[serde(rename = "D+")]
    DPlus,
    /// D (1.0 points).
    #[serde(rename = "D")]
    D,
    /// F (0 points).
    #[serde(rename = "F")]
    F,
}

/// Coarse letter family of a grade, ignoring the `+`/`-` modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GradeFamily {
    /// A+, A, A-.
    A,
    /// B+, B, B-.
    B,
    /// C+, C, C-.
    C,
    /// D+, D.
    D,
    /// F.
    F,
}

/// Error returned when a string is not one of the 12 grade symbols.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid grade {0:?}: expected one of A+, A, A-, B+, B, B-, C+, C, C-, D+, D, F")]
pub struct ParseGradeError(pub String);

impl Grade {
    /// Every grade on the scale, best first.
    pub const ALL: [Self; 12] = [
        Self::APlus,
        Self::A,
        Self::AMinus,
        Self::BPlus,
        Self::B,
        Self::BMinus,
        Self::CPlus,
        Self::C,
        Self::CMinus,
        Self::DPlus,
        Self::D,
        Self::F,
    ];

    /// The literal symbol used on the wire and in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Grade-point value, exact to one decimal place.
    pub fn points(self) -> Decimal {
        let tenths = match self {
            Self::APlus => 43,
            Self::A => 40,
            Self::AMinus => 37,
            Self::BPlus => 33,
            Self::B => 30,
            Self::BMinus => 27,
            Self::CPlus => 23,
            Self::C => 20,
            Self::CMinus => 17,
            Self::DPlus => 13,
            Self::D => 10,
            Self::F => 0,
        };
        Decimal::new(tenths, 1)
    }

    /// The letter family this grade belongs to.
    pub const fn family(self) -> GradeFamily {
        match self {
            Self::APlus | Self::A | Self::AMinus => GradeFamily::A,
            Self::BPlus | Self::B | Self::BMinus => GradeFamily::B,
            Self::CPlus | Self::C | Self::CMinus => GradeFamily::C,
            Self::DPlus | Self::D => GradeFamily::D,
            Self::F => GradeFamily::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ParseGradeError(s.to_owned()))
    }
}
