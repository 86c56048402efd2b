//! Cursor pagination parameters
//!
//! Timelines page by status id: a page holds statuses with
//! `since_id < id <= max_id`, newest first, at most `limit` of them.
//! Validation happens here, before any storage access.

use serde::Deserialize;
use thiserror::Error;

use crate::data::StatusId;

/// Page size used when the request does not specify one
pub const DEFAULT_LIMIT: i64 = 40;

/// Largest accepted page size
pub const MAX_LIMIT: i64 = 80;

/// Rejected pagination input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("limit must be between 1 and {MAX_LIMIT}, got {0}")]
    LimitOutOfRange(i64),
}

/// Raw pagination query string values
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub max_id: Option<StatusId>,
    pub since_id: Option<StatusId>,
    pub limit: Option<i64>,
}

/// Validated timeline bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    /// Inclusive upper bound on status id
    pub max_id: StatusId,
    /// Exclusive lower bound on status id
    pub since_id: StatusId,
    /// Maximum number of rows, within `1..=MAX_LIMIT`
    pub limit: i64,
}

impl Parameters {
    /// Build parameters from raw inputs, applying defaults for absent values
    ///
    /// # Errors
    /// `ParameterError::LimitOutOfRange` when `limit` is outside `1..=80`.
    /// Out-of-range limits are rejected, never clamped.
    pub fn new(
        max_id: Option<StatusId>,
        since_id: Option<StatusId>,
        limit: Option<i64>,
    ) -> Result<Self, ParameterError> {
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(limit) if (1..=MAX_LIMIT).contains(&limit) => limit,
            Some(limit) => return Err(ParameterError::LimitOutOfRange(limit)),
        };

        Ok(Self {
            max_id: max_id.unwrap_or(StatusId::MAX),
            since_id: since_id.unwrap_or(0),
            limit,
        })
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            max_id: StatusId::MAX,
            since_id: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TryFrom<PaginationQuery> for Parameters {
    type Error = ParameterError;

    fn try_from(query: PaginationQuery) -> Result<Self, Self::Error> {
        Self::new(query.max_id, query.since_id, query.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_take_defaults() {
        let params = Parameters::new(None, None, None).unwrap();
        assert_eq!(params, Parameters::default());
        assert_eq!(params.max_id, i64::MAX);
        assert_eq!(params.since_id, 0);
        assert_eq!(params.limit, 40);
    }

    #[test]
    fn limit_bounds_are_inclusive() {
        assert_eq!(Parameters::new(None, None, Some(1)).unwrap().limit, 1);
        assert_eq!(Parameters::new(None, None, Some(80)).unwrap().limit, 80);
    }

    #[test]
    fn out_of_range_limits_are_rejected() {
        for limit in [0, -1, 81, i64::MAX] {
            assert_eq!(
                Parameters::new(None, None, Some(limit)),
                Err(ParameterError::LimitOutOfRange(limit))
            );
        }
    }

    #[test]
    fn cursor_values_pass_through() {
        let params = Parameters::new(Some(13), Some(11), Some(80)).unwrap();
        assert_eq!(params.max_id, 13);
        assert_eq!(params.since_id, 11);
    }

    #[test]
    fn query_conversion_validates() {
        let query = PaginationQuery {
            max_id: None,
            since_id: Some(5),
            limit: Some(81),
        };
        assert!(Parameters::try_from(query).is_err());
    }
}
