//! The driver capability trait

use std::sync::Arc;

use async_trait::async_trait;
use dbforge_core::ForgeResult;
use dbforge_schema::TableDefinition;

use crate::config::ConnectionConfig;
use crate::io::{InputInterface, OutputInterface};
use crate::value::Row;

/// A database driver, or a wrapper around one.
///
/// Wrappers hold the inner driver as `Box<dyn Driver>` and must forward
/// every capability they do not augment, so callers see one driver no
/// matter how deep the chain is.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Identifier of this layer (`mysql`, `timed`, `prefix`, ...)
    fn name(&self) -> &str;

    /// The whole chain, outermost first, e.g. `prefix(timed(mysql))`
    fn describe(&self) -> String {
        self.name().to_string()
    }

    fn config(&self) -> &ConnectionConfig;

    fn has_option(&self, key: &str) -> bool {
        self.config().has_option(key)
    }

    // ========================================================================
    // Console
    // ========================================================================

    fn set_input(&mut self, input: Arc<dyn InputInterface>);

    fn input(&self) -> Option<Arc<dyn InputInterface>>;

    fn set_output(&mut self, output: Arc<dyn OutputInterface>);

    fn output(&self) -> Option<Arc<dyn OutputInterface>>;

    // ========================================================================
    // Transactions
    // ========================================================================

    fn has_transactions(&self) -> bool;

    async fn begin_transaction(&mut self) -> ForgeResult<()>;

    async fn commit_transaction(&mut self) -> ForgeResult<()>;

    async fn rollback_transaction(&mut self) -> ForgeResult<()>;

    // ========================================================================
    // Statements
    // ========================================================================

    /// Run a raw statement and return the number of affected rows
    async fn execute(&mut self, sql: &str) -> ForgeResult<u64>;

    async fn create_table(&mut self, table: &TableDefinition) -> ForgeResult<()>;

    async fn has_table(&mut self, name: &str) -> ForgeResult<bool>;

    async fn drop_table(&mut self, name: &str) -> ForgeResult<()>;

    async fn rename_table(&mut self, from: &str, to: &str) -> ForgeResult<()>;

    async fn truncate_table(&mut self, name: &str) -> ForgeResult<()>;

    /// Insert rows into a table and return the number of rows written
    async fn insert(&mut self, table: &str, rows: &[Row]) -> ForgeResult<u64>;
}
