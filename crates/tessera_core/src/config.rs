//! # Configuration
//!
//! Sizing knobs for pools and worlds, loaded once at startup.
//!
//! ```toml
//! entity_capacity = 1024
//! component_capacity = 256
//! deferred_warn_threshold = 64
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Configuration for a single [`LinearPool`](crate::LinearPool).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Slots reserved before the first growth. Must be non-zero.
    pub initial_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::compact()
    }
}

impl PoolConfig {
    /// One slot up front; the pool doubles as items arrive.
    #[must_use]
    pub const fn compact() -> Self {
        Self { initial_capacity: 1 }
    }

    /// Reserves `initial_capacity` slots up front.
    #[must_use]
    pub const fn with_capacity(initial_capacity: usize) -> Self {
        Self { initial_capacity }
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the capacity is zero.
    pub fn validate(&self) -> EcsResult<()> {
        if self.initial_capacity == 0 {
            return Err(EcsError::InvalidConfig(
                "initial_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Initial capacity of the entity pool.
    pub entity_capacity: usize,
    /// Initial capacity of every component pool built by `World::register`.
    pub component_capacity: usize,
    /// A dispose pass that leaves more than this many items deferred logs a warning.
    pub deferred_warn_threshold: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 16,
            component_capacity: 16,
            deferred_warn_threshold: 1024,
        }
    }
}

impl WorldConfig {
    /// Preset for worlds expected to hold tens of thousands of entities.
    #[must_use]
    pub const fn large() -> Self {
        Self {
            entity_capacity: 65_536,
            component_capacity: 16_384,
            deferred_warn_threshold: 8192,
        }
    }

    /// Pool configuration for the entity pool.
    #[must_use]
    pub const fn entity_pool(&self) -> PoolConfig {
        PoolConfig::with_capacity(self.entity_capacity)
    }

    /// Pool configuration for component pools.
    #[must_use]
    pub const fn component_pool(&self) -> PoolConfig {
        PoolConfig::with_capacity(self.component_capacity)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] on syntax errors, unknown keys or
    /// zero capacities.
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EcsError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks both pool capacities.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if either capacity is zero.
    pub fn validate(&self) -> EcsResult<()> {
        self.entity_pool().validate()?;
        self.component_pool().validate()
    }
}
