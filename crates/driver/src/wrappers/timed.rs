//! Timing wrapper
//!
//! Announces each schema or data operation at verbose level and reports how
//! long it took:
//!
//! ```text
//!  -- createTable(`users`)
//!     -> 0.0123s
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dbforge_core::ForgeResult;
use dbforge_schema::TableDefinition;

use crate::config::ConnectionConfig;
use crate::io::{InputInterface, OutputInterface, VERBOSITY_VERBOSE};
use crate::traits::Driver;
use crate::value::Row;

pub struct TimedDriver {
    inner: Box<dyn Driver>,
    timings: Vec<(String, Duration)>,
}

impl TimedDriver {
    pub const NAME: &'static str = "timed";

    pub fn new(inner: Box<dyn Driver>) -> Self {
        Self {
            inner,
            timings: Vec::new(),
        }
    }

    /// Recorded commands with their durations, in call order
    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    fn write_command(&self, command: &str, args: &[&str]) -> String {
        let args = args
            .iter()
            .map(|a| format!("`{}`", a))
            .collect::<Vec<_>>()
            .join(", ");
        let line = format!("{}({})", command, args);
        if let Some(output) = self.inner.output() {
            output.writeln(&[format!(" -- {}", line).as_str()], VERBOSITY_VERBOSE);
        }
        line
    }

    fn finish(&mut self, command: String, started: Instant) {
        let elapsed = started.elapsed();
        if let Some(output) = self.inner.output() {
            let message = format!("    -> {:.4}s", elapsed.as_secs_f64());
            output.writeln(&[message.as_str()], VERBOSITY_VERBOSE);
        }
        self.timings.push((command, elapsed));
    }
}

#[async_trait]
impl Driver for TimedDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn describe(&self) -> String {
        format!("{}({})", Self::NAME, self.inner.describe())
    }

    fn config(&self) -> &ConnectionConfig {
        self.inner.config()
    }

    fn has_option(&self, key: &str) -> bool {
        self.inner.has_option(key)
    }

    fn set_input(&mut self, input: Arc<dyn InputInterface>) {
        self.inner.set_input(input);
    }

    fn input(&self) -> Option<Arc<dyn InputInterface>> {
        self.inner.input()
    }

    fn set_output(&mut self, output: Arc<dyn OutputInterface>) {
        self.inner.set_output(output);
    }

    fn output(&self) -> Option<Arc<dyn OutputInterface>> {
        self.inner.output()
    }

    fn has_transactions(&self) -> bool {
        self.inner.has_transactions()
    }

    async fn begin_transaction(&mut self) -> ForgeResult<()> {
        self.inner.begin_transaction().await
    }

    async fn commit_transaction(&mut self) -> ForgeResult<()> {
        self.inner.commit_transaction().await
    }

    async fn rollback_transaction(&mut self) -> ForgeResult<()> {
        self.inner.rollback_transaction().await
    }

    async fn execute(&mut self, sql: &str) -> ForgeResult<u64> {
        self.inner.execute(sql).await
    }

    async fn create_table(&mut self, table: &TableDefinition) -> ForgeResult<()> {
        let command = self.write_command("createTable", &[table.name.as_str()]);
        let started = Instant::now();
        self.inner.create_table(table).await?;
        self.finish(command, started);
        Ok(())
    }

    async fn has_table(&mut self, name: &str) -> ForgeResult<bool> {
        self.inner.has_table(name).await
    }

    async fn drop_table(&mut self, name: &str) -> ForgeResult<()> {
        let command = self.write_command("dropTable", &[name]);
        let started = Instant::now();
        self.inner.drop_table(name).await?;
        self.finish(command, started);
        Ok(())
    }

    async fn rename_table(&mut self, from: &str, to: &str) -> ForgeResult<()> {
        let command = self.write_command("renameTable", &[from, to]);
        let started = Instant::now();
        self.inner.rename_table(from, to).await?;
        self.finish(command, started);
        Ok(())
    }

    async fn truncate_table(&mut self, name: &str) -> ForgeResult<()> {
        let command = self.write_command("truncateTable", &[name]);
        let started = Instant::now();
        self.inner.truncate_table(name).await?;
        self.finish(command, started);
        Ok(())
    }

    async fn insert(&mut self, table: &str, rows: &[Row]) -> ForgeResult<u64> {
        let command = self.write_command("insert", &[table]);
        let started = Instant::now();
        let written = self.inner.insert(table, rows).await?;
        self.finish(command, started);
        Ok(written)
    }
}
