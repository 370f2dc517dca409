//! Builder that assembles a [`SimulationEngine`].
//!
//! The builder owns the choice of random source; once built, the source is
//! sealed inside the engine and only the worker touches it.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::info;

use craps_core::{PcgSource, RandomSource, Round};

use crate::api::{EngineError, Result, SimulationEngine};
use crate::config::EngineConfig;
use crate::control::Shared;

/// Builder for [`SimulationEngine`].
pub struct EngineBuilder {
    config: EngineConfig,
    source: Option<Box<dyn RandomSource>>,
    runtime: Option<Handle>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            source: None,
            runtime: None,
        }
    }

    /// Override engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific random source instead of a seeded PCG.
    pub fn source(mut self, source: impl RandomSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Host the worker on `runtime` rather than the ambient one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the engine.
    ///
    /// Fails with [`EngineError::NoRuntime`] when no runtime was supplied and
    /// the caller is not inside one.
    pub fn build(self) -> Result<SimulationEngine> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| EngineError::NoRuntime)?,
        };

        let source = match self.source {
            Some(source) => source,
            None => {
                let seed = self.config.seed.unwrap_or_else(rand::random);
                info!(target: "runtime::engine", seed, "seeding dice");
                Box::new(PcgSource::new(seed))
            }
        };

        let shared = Arc::new(Shared::new(Round::new(source)));
        Ok(SimulationEngine::new(shared, runtime))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine {
    /// Create a new engine builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }
}
