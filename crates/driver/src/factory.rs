//! Driver factory
//!
//! Holds two registries: base adapters keyed by engine identifier, and
//! wrappers keyed by name. [`DriverFactory::build`] assembles the chain for
//! one command invocation.

use std::collections::BTreeMap;
use std::sync::Arc;

use dbforge_core::{ForgeError, ForgeResult, Validatable};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::io::{InputInterface, OutputInterface};
use crate::mysql::MysqlDriver;
use crate::traits::Driver;
use crate::wrappers::{PrefixDriver, TimedDriver};

/// Builds a base driver from connection settings
pub type AdapterConstructor = Arc<dyn Fn(ConnectionConfig) -> Box<dyn Driver> + Send + Sync>;

/// Wraps a driver in another layer
pub type WrapperConstructor = Arc<dyn Fn(Box<dyn Driver>) -> Box<dyn Driver> + Send + Sync>;

#[derive(Clone, Default)]
pub struct DriverFactory {
    adapters: BTreeMap<String, AdapterConstructor>,
    wrappers: BTreeMap<String, WrapperConstructor>,
}

impl DriverFactory {
    /// Empty factory with nothing registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with the MySQL adapter (also under `mariadb`) and the
    /// `timed` and `prefix` wrappers
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        for name in [MysqlDriver::NAME, "mariadb"] {
            factory.register_adapter(name, |config| Box::new(MysqlDriver::new(config)));
        }
        factory.register_wrapper(TimedDriver::NAME, |inner| Box::new(TimedDriver::new(inner)));
        factory.register_wrapper(PrefixDriver::NAME, |inner| Box::new(PrefixDriver::new(inner)));
        factory
    }

    /// Register a base adapter, replacing any adapter with the same name
    pub fn register_adapter<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(ConnectionConfig) -> Box<dyn Driver> + Send + Sync + 'static,
    {
        self.adapters
            .insert(name.to_lowercase(), Arc::new(constructor));
    }

    /// Register a wrapper, replacing any wrapper with the same name
    pub fn register_wrapper<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(Box<dyn Driver>) -> Box<dyn Driver> + Send + Sync + 'static,
    {
        self.wrappers
            .insert(name.to_lowercase(), Arc::new(constructor));
    }

    pub fn has_adapter(&self, name: &str) -> bool {
        self.adapters.contains_key(&name.to_lowercase())
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    /// Build a base adapter by engine identifier
    pub fn adapter(&self, config: ConnectionConfig) -> ForgeResult<Box<dyn Driver>> {
        let name = config.adapter.to_lowercase();
        let constructor = self
            .adapters
            .get(&name)
            .ok_or_else(|| ForgeError::UnsupportedDriver(config.adapter.clone()))?;
        Ok(constructor(config))
    }

    /// Wrap a driver with a registered wrapper
    pub fn wrap(&self, name: &str, driver: Box<dyn Driver>) -> ForgeResult<Box<dyn Driver>> {
        let constructor = self
            .wrappers
            .get(&name.to_lowercase())
            .ok_or_else(|| ForgeError::internal(format!("wrapper \"{}\" is not registered", name)))?;
        Ok(constructor(driver))
    }

    /// Assemble the driver chain for one invocation:
    /// base adapter, `timed`, console injection, then `prefix` when the
    /// connection rewrites table names.
    pub fn build(
        &self,
        config: ConnectionConfig,
        input: Arc<dyn InputInterface>,
        output: Arc<dyn OutputInterface>,
    ) -> ForgeResult<Box<dyn Driver>> {
        config.validate()?;
        let rewrites = config.rewrites_table_names();

        let mut driver = self.adapter(config)?;
        driver = self.wrap(TimedDriver::NAME, driver)?;
        driver.set_input(input);
        driver.set_output(output);

        if rewrites {
            driver = self.wrap(PrefixDriver::NAME, driver)?;
        }

        debug!(chain = %driver.describe(), "Built driver");
        Ok(driver)
    }
}

impl std::fmt::Debug for DriverFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverFactory")
            .field("adapters", &self.adapters.keys().collect::<Vec<_>>())
            .field("wrappers", &self.wrappers.keys().collect::<Vec<_>>())
            .finish()
    }
}
