//! Pipeline configuration.
//!
//! Stages never read ambient process state; everything they need is
//! resolved here once at startup and handed in explicitly. The pipeline
//! spans three storage areas:
//!
//! - `raw` — where generated cart-event batches arrive;
//! - `curated` — where the product rollup lands;
//! - `promoted` — where the per-customer ranking lands.
//!
//! Both stages decode the original cart-event batch from `raw`; the curated
//! object's arrival is what signals a batch is ready for the ranking stage.

use std::env;

use thiserror::Error;

use crate::store::StoreLocation;

/// Environment variables understood by [`PipelineConfig::from_env`].
pub const RAW_BUCKET_VAR: &str = "CARTFLOW_RAW_BUCKET";
pub const RAW_PREFIX_VAR: &str = "CARTFLOW_RAW_PREFIX";
pub const CURATED_BUCKET_VAR: &str = "CARTFLOW_CURATED_BUCKET";
pub const CURATED_PREFIX_VAR: &str = "CARTFLOW_CURATED_PREFIX";
pub const PROMOTED_BUCKET_VAR: &str = "CARTFLOW_PROMOTED_BUCKET";
pub const PROMOTED_PREFIX_VAR: &str = "CARTFLOW_PROMOTED_PREFIX";

/// Where one stage reads from and writes to, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct StageConfig {
    pub input: StoreLocation,
    pub output: StoreLocation,
}

/// The three storage areas the pipeline runs across.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub raw: StoreLocation,
    pub curated: StoreLocation,
    pub promoted: StoreLocation,
}

impl PipelineConfig {
    /// Build a validated configuration from explicit locations.
    pub fn new(
        raw: StoreLocation,
        curated: StoreLocation,
        promoted: StoreLocation,
    ) -> Result<Self, ConfigError> {
        for location in [&raw, &curated, &promoted] {
            if location.bucket.is_empty() {
                return Err(ConfigError::EmptyBucket);
            }
        }
        if raw == curated || raw == promoted || curated == promoted {
            return Err(ConfigError::OverlappingAreas);
        }
        Ok(Self {
            raw,
            curated,
            promoted,
        })
    }

    /// Resolve the configuration from `CARTFLOW_*` environment variables.
    ///
    /// Bucket variables are required; prefix variables default to empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(
            location_from_env(RAW_BUCKET_VAR, RAW_PREFIX_VAR)?,
            location_from_env(CURATED_BUCKET_VAR, CURATED_PREFIX_VAR)?,
            location_from_env(PROMOTED_BUCKET_VAR, PROMOTED_PREFIX_VAR)?,
        )
    }

    /// Stage configuration for the product rollup: raw in, curated out.
    pub fn product_rollup(&self) -> StageConfig {
        StageConfig {
            input: self.raw.clone(),
            output: self.curated.clone(),
        }
    }

    /// Stage configuration for the customer ranking: raw in, promoted out.
    ///
    /// The ranking needs the per-customer detail of the original batch, so
    /// its input is the raw area even though it runs after the rollup.
    pub fn customer_ranking(&self) -> StageConfig {
        StageConfig {
            input: self.raw.clone(),
            output: self.promoted.clone(),
        }
    }
}

fn location_from_env(
    bucket_var: &'static str,
    prefix_var: &'static str,
) -> Result<StoreLocation, ConfigError> {
    let bucket = env::var(bucket_var).map_err(|_| ConfigError::MissingVar(bucket_var))?;
    let prefix = env::var(prefix_var).unwrap_or_default();
    Ok(StoreLocation::new(bucket, prefix))
}

/// Rejected at startup, before any stage runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingVar(&'static str),
    #[error("bucket name must not be empty")]
    EmptyBucket,
    #[error("raw, curated, and promoted areas must be distinct")]
    OverlappingAreas,
}

// ============================================================================
// Tests
// ============================================================================
