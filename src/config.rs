//! Application configuration
//!
//! Settings the demo binary and embedders need beyond [`EngineConfig`],
//! loaded from `TUTOR_*` environment variables on top of built-in
//! defaults. A `.env` file is honored when present.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::engine::EngineConfig;
use crate::graph::DEFAULT_RETRY_LIMIT;

/// Runtime settings for the tutoring agents.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Engine settings shared by every agent graph.
    pub engine: EngineConfig,
    /// Cap on sample redraws in the question agent.
    pub retry_limit: u32,
    /// Problem bank to load, as JSON Lines. `None` uses the built-in
    /// demo bank.
    pub bank_path: Option<PathBuf>,
    /// Section catalog to load, as JSON. `None` uses the built-in demo
    /// catalog.
    pub catalog_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            retry_limit: DEFAULT_RETRY_LIMIT,
            bank_path: None,
            catalog_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = AppConfig::default();
        let mut engine = config.engine;

        if let Ok(val) = env::var("TUTOR_MAX_STEPS") {
            let steps = val
                .parse()
                .context("TUTOR_MAX_STEPS must be a positive integer")?;
            engine = engine.with_max_steps(steps);
        }
        if let Ok(val) = env::var("TUTOR_PARALLELISM") {
            let parallelism = val
                .parse()
                .context("TUTOR_PARALLELISM must be a positive integer")?;
            engine = engine.with_parallelism(parallelism);
        }
        if let Ok(val) = env::var("TUTOR_NODE_TIMEOUT_SECS") {
            let secs: u64 = val
                .parse()
                .context("TUTOR_NODE_TIMEOUT_SECS must be a number of seconds")?;
            engine = engine.with_node_timeout(Duration::from_secs(secs));
        }
        if let Ok(val) = env::var("TUTOR_GRAPH_TIMEOUT_SECS") {
            let secs: u64 = val
                .parse()
                .context("TUTOR_GRAPH_TIMEOUT_SECS must be a number of seconds")?;
            engine = engine.with_graph_timeout(Duration::from_secs(secs));
        }
        config.engine = engine;

        if let Ok(val) = env::var("TUTOR_RETRY_LIMIT") {
            config.retry_limit = val
                .parse()
                .context("TUTOR_RETRY_LIMIT must be a non-negative integer")?;
        }
        if let Ok(val) = env::var("TUTOR_BANK_PATH") {
            config.bank_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = env::var("TUTOR_CATALOG_PATH") {
            config.catalog_path = Some(PathBuf::from(val));
        }

        Ok(config)
    }

    /// Check the settings are usable before any graph is built.
    pub fn validate(&self) -> Result<()> {
        if self.engine.max_steps == 0 {
            anyhow::bail!("TUTOR_MAX_STEPS must be at least 1");
        }
        if self.engine.node_timeout.is_zero() {
            anyhow::bail!("TUTOR_NODE_TIMEOUT_SECS must be at least 1");
        }
        if self.engine.graph_timeout < self.engine.node_timeout {
            anyhow::bail!("TUTOR_GRAPH_TIMEOUT_SECS must not be shorter than the node timeout");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.retry_limit, DEFAULT_RETRY_LIMIT);
        assert!(config.bank_path.is_none());
        assert!(config.catalog_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_steps() {
        let mut config = AppConfig::default();
        config.engine.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_graph_timeout_below_node_timeout() {
        let mut config = AppConfig::default();
        config.engine = config
            .engine
            .clone()
            .with_node_timeout(Duration::from_secs(60))
            .with_graph_timeout(Duration::from_secs(30));
        assert!(config.validate().is_err());
    }
}
