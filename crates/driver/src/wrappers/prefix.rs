//! Table name prefix/suffix wrapper

use std::sync::Arc;

use async_trait::async_trait;
use dbforge_core::ForgeResult;
use dbforge_schema::TableDefinition;

use crate::config::ConnectionConfig;
use crate::io::{InputInterface, OutputInterface};
use crate::traits::Driver;
use crate::value::Row;

/// Rewrites every table name to `prefix + name + suffix`.
///
/// Raw statements passed to `execute` are not touched.
pub struct PrefixDriver {
    inner: Box<dyn Driver>,
}

impl PrefixDriver {
    pub const NAME: &'static str = "prefix";

    pub fn new(inner: Box<dyn Driver>) -> Self {
        Self { inner }
    }

    pub fn table_name(&self, name: &str) -> String {
        self.inner.config().table_name(name)
    }

    fn rewrite(&self, table: &TableDefinition) -> TableDefinition {
        let mut table = table.clone();
        table.name = self.table_name(&table.name);
        for fk in &mut table.foreign_keys {
            fk.referenced_table = self.table_name(&fk.referenced_table);
        }
        table
    }
}

#[async_trait]
impl Driver for PrefixDriver {
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
        let table = self.rewrite(table);
        self.inner.create_table(&table).await
    }

    async fn has_table(&mut self, name: &str) -> ForgeResult<bool> {
        let name = self.table_name(name);
        self.inner.has_table(&name).await
    }

    async fn drop_table(&mut self, name: &str) -> ForgeResult<()> {
        let name = self.table_name(name);
        self.inner.drop_table(&name).await
    }

    async fn rename_table(&mut self, from: &str, to: &str) -> ForgeResult<()> {
        let (from, to) = (self.table_name(from), self.table_name(to));
        self.inner.rename_table(&from, &to).await
    }

    async fn truncate_table(&mut self, name: &str) -> ForgeResult<()> {
        let name = self.table_name(name);
        self.inner.truncate_table(&name).await
    }

    async fn insert(&mut self, table: &str, rows: &[Row]) -> ForgeResult<u64> {
        let table = self.table_name(table);
        self.inner.insert(&table, rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryDriver, MemoryHandle};
    use dbforge_schema::{Column, ForeignKey};
    use pretty_assertions::assert_eq;

    fn prefixed() -> (PrefixDriver, MemoryHandle) {
        let config = ConnectionConfig {
            table_prefix: "app_".to_string(),
            table_suffix: "_t".to_string(),
            ..ConnectionConfig::default()
        };
        let memory = MemoryDriver::new(config);
        let handle = memory.handle();
        (PrefixDriver::new(Box::new(memory)), handle)
    }

    #[tokio::test]
    async fn test_table_operations_are_renamed() {
        let (mut driver, handle) = prefixed();
        driver.create_table(&TableDefinition::new("users")).await.unwrap();
        assert!(driver.has_table("users").await.unwrap());
        driver.rename_table("users", "people").await.unwrap();
        driver.truncate_table("people").await.unwrap();
        driver.insert("people", &[Row::new().set("a", 1)]).await.unwrap();
        driver.drop_table("people").await.unwrap();

        assert_eq!(
            handle.log(),
            vec![
                "create_table(app_users_t)",
                "rename_table(app_users_t, app_people_t)",
                "truncate_table(app_people_t)",
                "insert(app_people_t, 1)",
                "drop_table(app_people_t)",
            ]
        );
    }

    #[tokio::test]
    async fn test_foreign_key_targets_are_renamed() {
        let (driver, _handle) = prefixed();
        let table = TableDefinition::new("posts")
            .add_column(Column::integer("user_id"))
            .add_foreign_key(ForeignKey::new("user_id", "users"));
        let rewritten = driver.rewrite(&table);
        assert_eq!(rewritten.name, "app_posts_t");
        assert_eq!(rewritten.foreign_keys[0].referenced_table, "app_users_t");
    }

    #[tokio::test]
    async fn test_raw_statements_pass_through() {
        let (mut driver, handle) = prefixed();
        driver.execute("SELECT 1 FROM users").await.unwrap();
        assert_eq!(handle.state().statements, vec!["SELECT 1 FROM users"]);
        assert_eq!(driver.describe(), "prefix(memory)");
    }
}
