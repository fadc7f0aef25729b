//! Test doubles for code that drives a [`Driver`]
//!
//! Enabled inside this crate's tests and, for dependent crates, through the
//! `test-utils` feature.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use dbforge_core::{ForgeError, ForgeResult, Validatable};
use dbforge_schema::TableDefinition;

use crate::config::ConnectionConfig;
use crate::io::{
    message_verbosity, verbosity_from_bits, InputInterface, OutputInterface, VERBOSITY_NORMAL,
};
use crate::traits::Driver;
use crate::value::Row;

// ============================================================================
// BufferedOutput
// ============================================================================

/// Output that keeps everything written to it in memory
#[derive(Debug)]
pub struct BufferedOutput {
    buffer: Mutex<String>,
    verbosity: AtomicU32,
    decorated: AtomicBool,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::with_verbosity(VERBOSITY_NORMAL)
    }

    pub fn with_verbosity(verbosity: u32) -> Self {
        Self {
            buffer: Mutex::new(String::new()),
            verbosity: AtomicU32::new(verbosity),
            decorated: AtomicBool::new(false),
        }
    }

    pub fn contents(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Default for BufferedOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputInterface for BufferedOutput {
    fn write(&self, messages: &[&str], newline: bool, options: u32) {
        let current = verbosity_from_bits(self.verbosity());
        if message_verbosity(options) > current {
            return;
        }
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        for message in messages {
            buffer.push_str(message);
            if newline {
                buffer.push('\n');
            }
        }
    }

    fn set_verbosity(&self, level: u32) {
        self.verbosity.store(level, Ordering::SeqCst);
    }

    fn verbosity(&self) -> u32 {
        self.verbosity.load(Ordering::SeqCst)
    }

    fn set_decorated(&self, decorated: bool) {
        self.decorated.store(decorated, Ordering::SeqCst);
    }

    fn is_decorated(&self) -> bool {
        self.decorated.load(Ordering::SeqCst)
    }
}

// ============================================================================
// MemoryDriver
// ============================================================================

/// Everything a [`MemoryDriver`] was asked to do
#[derive(Debug, Default, Clone)]
pub struct MemoryState {
    /// Operations in call order, e.g. `begin`, `create_table(users)`
    pub log: Vec<String>,
    /// Raw statements passed to `execute`
    pub statements: Vec<String>,
    /// Inserted rows per call
    pub inserts: Vec<(String, Vec<Row>)>,
    /// Tables that currently exist
    pub tables: BTreeSet<String>,
    /// Operations whose log entry contains this text fail
    pub fail_on: Option<String>,
}

/// Shared view of a [`MemoryDriver`]'s state, usable after the driver moved
#[derive(Debug, Clone, Default)]
pub struct MemoryHandle(Arc<Mutex<MemoryState>>);

impl MemoryHandle {
    pub fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn log(&self) -> Vec<String> {
        self.state().log.clone()
    }

    pub fn fail_on(&self, needle: impl Into<String>) {
        self.state().fail_on = Some(needle.into());
    }
}

/// Driver that records calls instead of talking to a server
pub struct MemoryDriver {
    config: ConnectionConfig,
    handle: MemoryHandle,
    input: Option<Arc<dyn InputInterface>>,
    output: Option<Arc<dyn OutputInterface>>,
    transactions: bool,
}

impl MemoryDriver {
    pub const NAME: &'static str = "memory";

    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            handle: MemoryHandle::default(),
            input: None,
            output: None,
            transactions: true,
        }
    }

    /// Share state with an existing handle
    pub fn with_handle(config: ConnectionConfig, handle: MemoryHandle) -> Self {
        Self {
            handle,
            ..Self::new(config)
        }
    }

    /// Pretend the backend has no transaction support
    pub fn without_transactions(mut self) -> Self {
        self.transactions = false;
        self
    }

    pub fn handle(&self) -> MemoryHandle {
        self.handle.clone()
    }

    fn record(&self, entry: String) -> ForgeResult<()> {
        let mut state = self.handle.state();
        if let Some(needle) = &state.fail_on {
            if entry.contains(needle.as_str()) {
                return Err(ForgeError::statement(
                    entry,
                    std::io::Error::other("injected failure"),
                ));
            }
        }
        state.log.push(entry);
        Ok(())
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn set_input(&mut self, input: Arc<dyn InputInterface>) {
        self.input = Some(input);
    }

    fn input(&self) -> Option<Arc<dyn InputInterface>> {
        self.input.clone()
    }

    fn set_output(&mut self, output: Arc<dyn OutputInterface>) {
        self.output = Some(output);
    }

    fn output(&self) -> Option<Arc<dyn OutputInterface>> {
        self.output.clone()
    }

    fn has_transactions(&self) -> bool {
        self.transactions
    }

    async fn begin_transaction(&mut self) -> ForgeResult<()> {
        self.record("begin".to_string())
    }

    async fn commit_transaction(&mut self) -> ForgeResult<()> {
        self.record("commit".to_string())
    }

    async fn rollback_transaction(&mut self) -> ForgeResult<()> {
        self.record("rollback".to_string())
    }

    async fn execute(&mut self, sql: &str) -> ForgeResult<u64> {
        self.record(format!("execute({})", sql))?;
        self.handle.state().statements.push(sql.to_string());
        Ok(0)
    }

    async fn create_table(&mut self, table: &TableDefinition) -> ForgeResult<()> {
        table.validate()?;
        self.record(format!("create_table({})", table.name))?;
        self.handle.state().tables.insert(table.name.clone());
        Ok(())
    }

    async fn has_table(&mut self, name: &str) -> ForgeResult<bool> {
        Ok(self.handle.state().tables.contains(name))
    }

    async fn drop_table(&mut self, name: &str) -> ForgeResult<()> {
        self.record(format!("drop_table({})", name))?;
        self.handle.state().tables.remove(name);
        Ok(())
    }

    async fn rename_table(&mut self, from: &str, to: &str) -> ForgeResult<()> {
        self.record(format!("rename_table({}, {})", from, to))?;
        let mut state = self.handle.state();
        if state.tables.remove(from) {
            state.tables.insert(to.to_string());
        }
        Ok(())
    }

    async fn truncate_table(&mut self, name: &str) -> ForgeResult<()> {
        self.record(format!("truncate_table({})", name))
    }

    async fn insert(&mut self, table: &str, rows: &[Row]) -> ForgeResult<u64> {
        self.record(format!("insert({}, {})", table, rows.len()))?;
        self.handle
            .state()
            .inserts
            .push((table.to_string(), rows.to_vec()));
        Ok(rows.len() as u64)
    }
}
