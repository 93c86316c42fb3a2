//! Pipeline stages: fetch → decode → aggregate → encode → store.
//!
//! A [`Stage`] is one unit of work over one input object. It holds no state
//! between invocations; every run reads its whole input, computes the
//! reduction locally, and performs exactly one store write on success. Any
//! failure aborts the invocation before that write, so a failed run leaves
//! no partial output behind. Retries, if any, belong to whatever invokes
//! the stage.

use std::sync::Arc;

use thiserror::Error;

use crate::aggregate::{aggregate, AggregateError, AggregateSpec, Reducer};
use crate::codec::{self, FormatError};
use crate::config::StageConfig;
use crate::store::{ObjectRef, ObjectStore, StoreError};
use crate::trigger::ObjectArrival;

#[cfg(test)]
#[path = "tests/stage_tests.rs"]
mod tests;

/// How many products the rollup keeps.
pub const PRODUCT_ROLLUP_LIMIT: usize = 50;
/// How many products the ranking keeps per customer.
pub const CUSTOMER_RANKING_LIMIT: usize = 10;

// ── Errors & reporting ────────────────────────────────────────────────────────

/// The phase of a stage invocation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    Retrieval,
    Parse,
    Aggregate,
    Storage,
}

impl std::fmt::Display for StagePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match self {
            StagePhase::Retrieval => "retrieval",
            StagePhase::Parse => "parse",
            StagePhase::Aggregate => "aggregate",
            StagePhase::Storage => "storage",
        };
        write!(f, "{}", phase)
    }
}

/// A failed stage invocation, tagged with the phase that failed.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("input retrieval failed: {0}")]
    Retrieval(#[source] StoreError),
    #[error("input decode failed: {0}")]
    Format(#[from] FormatError),
    #[error("aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("output storage failed: {0}")]
    Storage(#[source] StoreError),
}

impl StageError {
    pub fn phase(&self) -> StagePhase {
        match self {
            StageError::Retrieval(_) => StagePhase::Retrieval,
            StageError::Format(_) => StagePhase::Parse,
            StageError::Aggregate(_) => StagePhase::Aggregate,
            StageError::Storage(_) => StagePhase::Storage,
        }
    }
}

/// Outcome of a successful stage invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: &'static str,
    pub input: ObjectRef,
    pub output: ObjectRef,
    pub records_in: usize,
    pub groups_out: usize,
    pub bytes_written: usize,
}

impl std::fmt::Display for StageReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} -> {} ({} records in, {} groups out, {} bytes)",
            self.stage, self.input, self.output, self.records_in, self.groups_out,
            self.bytes_written
        )
    }
}

// ── Stage ─────────────────────────────────────────────────────────────────────

/// One transformation step: an aggregation spec plus the output column names
/// its result is serialized under.
#[derive(Debug, Clone)]
pub struct Stage {
    name: &'static str,
    spec: AggregateSpec,
    output_columns: Vec<&'static str>,
}

impl Stage {
    pub fn new(name: &'static str, spec: AggregateSpec, output_columns: Vec<&'static str>) -> Self {
        Self {
            name,
            spec,
            output_columns,
        }
    }

    /// Top abandoned products across the whole batch, by summed amount.
    pub fn product_rollup() -> Self {
        Self::new(
            "product-rollup",
            AggregateSpec::new(["product_id"], "product_amount", Reducer::Sum)
                .top(PRODUCT_ROLLUP_LIMIT),
            vec!["product_id", "abandoned_amount"],
        )
    }

    /// Top products per customer, by summed amount.
    pub fn customer_ranking() -> Self {
        Self::new(
            "customer-ranking",
            AggregateSpec::new(["customer_id", "product_id"], "product_amount", Reducer::Sum)
                .ranked_within("customer_id")
                .top(CUSTOMER_RANKING_LIMIT),
            vec!["customer_id", "product_id", "total_amount"],
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run one invocation: read `input`, reduce it, write `output`.
    pub fn run(
        &self,
        store: &dyn ObjectStore,
        input: &ObjectRef,
        output: &ObjectRef,
    ) -> Result<StageReport, StageError> {
        let bytes = store.get(input).map_err(StageError::Retrieval)?;
        let events = codec::parse_cart_events(&bytes)?;
        let rows = aggregate(&events, &self.spec)?;
        let encoded = codec::write_group_rows(&self.output_columns, &rows)?;
        let bytes_written = encoded.len();
        store.put(output, encoded).map_err(StageError::Storage)?;

        let report = StageReport {
            stage: self.name,
            input: input.clone(),
            output: output.clone(),
            records_in: events.len(),
            groups_out: rows.len(),
            bytes_written,
        };
        tracing::info!("{report}");
        Ok(report)
    }
}

// ── BoundStage ────────────────────────────────────────────────────────────────

/// A stage bound to its store and configured locations, ready to be invoked
/// once per arrival notification.
///
/// The notification only identifies *which* batch arrived; the stage always
/// resolves its input from its own configured input location plus the batch
/// name. That lets a downstream stage be triggered by an upstream output
/// landing while still decoding the original batch.
pub struct BoundStage {
    stage: Stage,
    store: Arc<dyn ObjectStore>,
    config: StageConfig,
}

impl BoundStage {
    pub fn new(stage: Stage, store: Arc<dyn ObjectStore>, config: StageConfig) -> Self {
        Self {
            stage,
            store,
            config,
        }
    }

    pub fn name(&self) -> &'static str {
        self.stage.name()
    }

    /// Handle one arrival. Re-running with the same batch deterministically
    /// reproduces the same output bytes at the same output ref.
    pub fn handle(&self, arrival: &ObjectArrival) -> Result<StageReport, StageError> {
        let name = arrival.location.name();
        let input = self.config.input.resolve(name);
        let output = self.config.output.resolve(name);
        self.stage.run(self.store.as_ref(), &input, &output)
    }
}
