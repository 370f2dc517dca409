//! Engine configuration and environment loaders.
use std::env;

/// Configuration for building a [`crate::SimulationEngine`].
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    /// Seed for the dice; a fresh random seed is drawn when unset.
    pub seed: Option<u64>,
    /// Initial batch-size exponent `k` (batches of `10^k` rounds).
    pub batch_exponent: u32,
}

impl EngineConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `CRAPS_SEED` - Seed for reproducible sessions (default: random)
    /// - `CRAPS_BATCH_EXPONENT` - Rounds per snapshot as a power of ten (default: 0)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.seed = read_env::<u64>("CRAPS_SEED");

        if let Some(exponent) = read_env::<u32>("CRAPS_BATCH_EXPONENT") {
            config.batch_exponent = exponent;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
