//! Synthetic cart-event batches.
//!
//! Stands in for the upstream transactional system during local runs and
//! tests. Generation is seeded, so a fixed configuration always produces
//! the same batch.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::CartEvent;

/// Shape of one generated batch.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Number of events in the batch.
    pub events: usize,
    /// Customer ids are drawn from `1..=customers`.
    pub customers: i64,
    /// Product ids are drawn from `1..=products`.
    pub products: i64,
    /// Amounts are drawn from `1..=max_amount`.
    pub max_amount: i64,
    /// RNG seed; same seed, same batch.
    pub seed: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            events: 2000,
            customers: 200,
            products: 100,
            max_amount: 9,
            seed: 0,
        }
    }
}

impl ProducerConfig {
    /// Generate the batch. Cart ids are sequential; everything else is
    /// drawn from the seeded RNG.
    pub fn generate(&self) -> Vec<CartEvent> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.events)
            .map(|i| CartEvent {
                cart_id: i as i64 + 1,
                customer_id: rng.gen_range(1..=self.customers),
                product_id: rng.gen_range(1..=self.products),
                product_amount: rng.gen_range(1..=self.max_amount),
                product_price: format!(
                    "{}.{:02}",
                    rng.gen_range(1..200),
                    rng.gen_range(0..100)
                ),
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
