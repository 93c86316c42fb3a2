use super::*;
use thiserror::Error;

// ── Reducer ───────────────────────────────────────────────────────────────────

/// Reduction operator applied to a group's metric values.
///
/// The pipeline stages only use [`Reducer::Sum`]; the other operators exist
/// so the engine is not tied to one reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Sum,
    Min,
    Max,
    Count,
}

impl Reducer {
    /// Accumulator before any metric value has been folded in.
    ///
    /// `None` marks reducers with no identity (min/max); they stay `None`
    /// until the group sees its first numeric value.
    pub(crate) fn identity(self) -> Option<i64> {
        match self {
            Reducer::Sum | Reducer::Count => Some(0),
            Reducer::Min | Reducer::Max => None,
        }
    }

    /// Fold one numeric metric observation into the accumulator.
    pub(crate) fn fold(self, acc: Option<i64>, value: i64) -> Option<i64> {
        match self {
            Reducer::Sum => Some(acc.unwrap_or(0) + value),
            Reducer::Count => Some(acc.unwrap_or(0) + 1),
            Reducer::Min => Some(acc.map_or(value, |a| a.min(value))),
            Reducer::Max => Some(acc.map_or(value, |a| a.max(value))),
        }
    }
}

// ── AggregateSpec ─────────────────────────────────────────────────────────────

/// Parameters of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    /// Fields whose value tuple identifies a group, in key order.
    pub group_by: Vec<String>,
    /// Field reduced within each group.
    pub metric: String,
    /// Reduction operator.
    pub reducer: Reducer,
    /// When set, rank groups separately per distinct value of this field
    /// (must be one of `group_by`) instead of globally.
    pub rank_within: Option<String>,
    /// Keep only the first N groups per ranking scope.
    pub top_n: Option<usize>,
}

impl AggregateSpec {
    /// Build a spec that groups by `group_by` and reduces `metric`.
    pub fn new(
        group_by: impl IntoIterator<Item = impl Into<String>>,
        metric: impl Into<String>,
        reducer: Reducer,
    ) -> Self {
        Self {
            group_by: group_by.into_iter().map(Into::into).collect(),
            metric: metric.into(),
            reducer,
            rank_within: None,
            top_n: None,
        }
    }

    /// Rank the top groups separately per distinct value of `field`.
    pub fn ranked_within(mut self, field: impl Into<String>) -> Self {
        self.rank_within = Some(field.into());
        self
    }

    /// Keep only the first `n` groups per ranking scope.
    pub fn top(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Reject parameter combinations the engine cannot honor.
    pub fn validate(&self) -> Result<(), AggregateError> {
        if self.group_by.is_empty() {
            return Err(AggregateError::EmptyGroupBy);
        }
        if self.metric.is_empty() {
            return Err(AggregateError::EmptyMetric);
        }
        if let Some(field) = &self.rank_within {
            if !self.group_by.contains(field) {
                return Err(AggregateError::RankKeyNotGrouped(field.clone()));
            }
        }
        if self.top_n == Some(0) {
            return Err(AggregateError::ZeroLimit);
        }
        Ok(())
    }
}

// ── Output & errors ───────────────────────────────────────────────────────────

/// One reduced output row: the group key values in `group_by` order plus the
/// reduced metric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub key: Vec<Value>,
    pub total: i64,
}

/// Invalid aggregation parameters, or a record that cannot be grouped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("group_by must name at least one field")]
    EmptyGroupBy,
    #[error("metric field name must not be empty")]
    EmptyMetric,
    #[error("rank_within field `{0}` is not part of group_by")]
    RankKeyNotGrouped(String),
    #[error("top_n must be at least 1")]
    ZeroLimit,
    #[error("record has no field `{0}` to group by")]
    MissingGroupField(String),
}
