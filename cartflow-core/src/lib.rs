//! # Cartflow Core
//!
//! Building blocks for the abandoned-cart analytics pipeline.
//!
//! Synthetic cart events land as CSV batches in a raw storage area; each
//! arrival triggers a processing stage that reads the batch, reduces it, and
//! writes a derived dataset to the next storage area. This crate provides:
//!
//! - [`types`] — wire records ([`CartEvent`](types::CartEvent)) and the
//!   scalar [`Value`](types::Value) used for group keys.
//! - [`codec`] — CSV parse/serialize for event batches and aggregated outputs.
//! - [`aggregate`] — grouping/reduction engine with global and per-partition
//!   top-N ranking.
//! - [`store`] — byte-addressed object store seam with in-memory and
//!   filesystem backends.
//! - [`stage`] — fetch → decode → aggregate → encode → store pipeline stages.
//! - [`config`] — explicit pipeline configuration resolved at startup.
//! - [`producer`] — seeded synthetic cart-event batches.
//! - [`trigger`] — local polling stand-in for the arrival-notification fabric.

pub mod aggregate;
pub mod codec;
pub mod config;
pub mod producer;
pub mod stage;
pub mod store;
pub mod trigger;
pub mod types;
