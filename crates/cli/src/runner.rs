//! # Seed runner
//!
//! Runs seeds one at a time, each inside its own transaction when the
//! driver supports them. Requested names are all checked before the first
//! seed runs. A failing seed has its transaction rolled back and the error
//! is returned as is.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dbforge_core::ForgeResult;
use dbforge_driver::{Driver, Seed, SeedRegistry};
use tracing::{debug, info, warn};

use crate::console::Output;

/// Seeds to run: every registered seed when `names` is empty, otherwise the
/// named ones in the order given. Names are trimmed.
pub fn select(registry: &SeedRegistry, names: &[String]) -> ForgeResult<Vec<Arc<dyn Seed>>> {
    if names.is_empty() {
        return Ok(registry.iter().map(|(_, seed)| seed.clone()).collect());
    }
    names
        .iter()
        .map(|name| registry.require(name.trim()))
        .collect()
}

pub struct SeedRunner<'a> {
    driver: &'a mut dyn Driver,
    output: &'a Output,
}

impl<'a> SeedRunner<'a> {
    pub fn new(driver: &'a mut dyn Driver, output: &'a Output) -> Self {
        Self { driver, output }
    }

    /// Run every seed in the registry, ordered by name
    pub async fn run_all(&mut self, registry: &SeedRegistry) -> ForgeResult<Vec<(String, Duration)>> {
        let seeds = select(registry, &[])?;
        self.run(&seeds).await
    }

    /// Run the named seeds in the order given
    pub async fn run_named(
        &mut self,
        registry: &SeedRegistry,
        names: &[String],
    ) -> ForgeResult<Vec<(String, Duration)>> {
        let seeds = select(registry, names)?;
        self.run(&seeds).await
    }

    pub async fn run(&mut self, seeds: &[Arc<dyn Seed>]) -> ForgeResult<Vec<(String, Duration)>> {
        let mut timings = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let elapsed = self.execute(seed.as_ref()).await?;
            timings.push((seed.name().to_string(), elapsed));
        }
        Ok(timings)
    }

    async fn execute(&mut self, seed: &dyn Seed) -> ForgeResult<Duration> {
        let name = seed.name();
        self.output.writeln("");
        self.output
            .writeln(&format!(" == <info>{}:</info> <comment>seeding</comment>", name));

        let start = Instant::now();
        let transactional = self.driver.has_transactions();
        if transactional {
            self.driver.begin_transaction().await?;
        }

        if seed.has_run_hook() {
            if let Err(err) = seed.run(&mut *self.driver).await {
                if transactional {
                    if let Err(rollback) = self.driver.rollback_transaction().await {
                        warn!(seed = name, error = %rollback, "Rollback failed");
                    }
                }
                return Err(err);
            }
        } else {
            debug!(seed = name, "Seed has no run hook");
        }

        if transactional {
            self.driver.commit_transaction().await?;
        }

        let elapsed = start.elapsed();
        info!(seed = name, elapsed_ms = elapsed.as_millis() as u64, "Seeded");
        self.output.writeln(&format!(
            " == <info>{}:</info> <comment>seeded {:.4}s</comment>",
            name,
            elapsed.as_secs_f64()
        ));
        Ok(elapsed)
    }
}
