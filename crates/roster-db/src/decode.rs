//! Conversions from raw column values to domain values.

use roster_types::Grade;

use crate::error::DbError;

/// Parse a nullable `grade` column.
pub(crate) fn grade(raw: Option<&str>) -> Result<Option<Grade>, DbError> {
    raw.map(|s| s.parse::<Grade>().map_err(|e| DbError::Decode(e.to_string())))
        .transpose()
}

/// Narrow a `COUNT(*)` result to the `u32` the domain types carry.
pub(crate) fn count(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}
