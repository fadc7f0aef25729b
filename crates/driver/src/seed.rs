//! Seed contract and registry
//!
//! Seeds are user types implementing [`Seed`]. They are found either
//! through link-time registration:
//!
//! ```ignore
//! use dbforge_driver::{register_seed, SeedRegistration};
//!
//! register_seed! {
//!     SeedRegistration::new("UserSeeder", || Box::new(UserSeeder))
//! }
//! ```
//!
//! or by explicit [`SeedRegistry::register`] calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dbforge_core::{ForgeError, ForgeResult};
use tracing::debug;

use crate::traits::Driver;

/// A unit of data population
#[async_trait]
pub trait Seed: Send + Sync {
    /// Class-style name, e.g. `UserSeeder`
    fn name(&self) -> &str;

    /// Whether [`run`](Seed::run) does anything. Seeds that keep the
    /// default `run` should return `false`.
    fn has_run_hook(&self) -> bool {
        true
    }

    /// Populate data through the driver
    async fn run(&self, driver: &mut dyn Driver) -> ForgeResult<()> {
        let _ = driver;
        Ok(())
    }
}

/// Link-time registration entry collected by [`SeedRegistry::discover`]
pub struct SeedRegistration {
    pub name: &'static str,
    pub constructor: fn() -> Box<dyn Seed>,
}

impl SeedRegistration {
    pub const fn new(name: &'static str, constructor: fn() -> Box<dyn Seed>) -> Self {
        Self { name, constructor }
    }
}

inventory::collect!(SeedRegistration);

/// Seeds available to a run, ordered by name
#[derive(Clone, Default)]
pub struct SeedRegistry {
    seeds: BTreeMap<String, Arc<dyn Seed>>,
}

impl SeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every registered [`SeedRegistration`] linked into the binary
    pub fn discover() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<SeedRegistration> {
            debug!(seed = registration.name, "Discovered seed");
            registry
                .seeds
                .insert(registration.name.to_string(), Arc::from((registration.constructor)()));
        }
        registry
    }

    /// Register a seed under its own name, replacing any seed with that name
    pub fn register(&mut self, seed: impl Seed + 'static) -> &mut Self {
        self.seeds.insert(seed.name().to_string(), Arc::new(seed));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Seed>> {
        self.seeds.get(name).cloned()
    }

    /// Look up a seed, failing with `UnknownSeed`
    pub fn require(&self, name: &str) -> ForgeResult<Arc<dyn Seed>> {
        self.get(name)
            .ok_or_else(|| ForgeError::UnknownSeed(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seeds.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.seeds.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Seed>)> {
        self.seeds.iter().map(|(name, seed)| (name.as_str(), seed))
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}

impl std::fmt::Debug for SeedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.seeds.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::testing::MemoryDriver;
    use crate::value::Row;
    use pretty_assertions::assert_eq;

    struct UserSeeder;

    #[async_trait]
    impl Seed for UserSeeder {
        fn name(&self) -> &str {
            "UserSeeder"
        }

        async fn run(&self, driver: &mut dyn Driver) -> ForgeResult<()> {
            driver
                .insert("users", &[Row::new().set("name", "admin")])
                .await
                .map(|_| ())
        }
    }

    struct EmptySeeder;

    impl Seed for EmptySeeder {
        fn name(&self) -> &str {
            "EmptySeeder"
        }

        fn has_run_hook(&self) -> bool {
            false
        }
    }

    struct LinkedSeeder;

    impl Seed for LinkedSeeder {
        fn name(&self) -> &str {
            "LinkedSeeder"
        }
    }

    crate::register_seed! {
        SeedRegistration::new("LinkedSeeder", || Box::new(LinkedSeeder))
    }

    #[test]
    fn test_registry_orders_by_name() {
        let mut registry = SeedRegistry::new();
        registry.register(UserSeeder).register(EmptySeeder);
        assert_eq!(registry.names(), vec!["EmptySeeder", "UserSeeder"]);
        assert!(registry.contains("UserSeeder"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_seed() {
        let registry = SeedRegistry::new();
        let err = registry.require("Missing").err().unwrap();
        assert_eq!(err.to_string(), "The seed class \"Missing\" does not exist");
    }

    #[test]
    fn test_discover_finds_linked_seeds() {
        let registry = SeedRegistry::discover();
        assert!(registry.contains("LinkedSeeder"));
    }

    #[tokio::test]
    async fn test_seed_runs_against_driver() {
        let mut driver = MemoryDriver::new(ConnectionConfig::default());
        let handle = driver.handle();
        UserSeeder.run(&mut driver).await.unwrap();
        EmptySeeder.run(&mut driver).await.unwrap();
        assert_eq!(handle.log(), vec!["insert(users, 1)"]);
        assert!(!EmptySeeder.has_run_hook());
    }
}
