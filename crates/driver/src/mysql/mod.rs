//! MySQL driver
//!
//! Connects lazily with a single `sqlx` MySQL connection on the first
//! statement. In dry-run mode it never connects and writes every statement
//! to the output instead.

pub mod ddl;

use std::sync::Arc;

use async_trait::async_trait;
use dbforge_core::{ForgeError, ForgeResult, Validatable};
use dbforge_schema::TableDefinition;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::io::{InputInterface, OutputInterface, OUTPUT_RAW};
use crate::traits::Driver;
use crate::value::Row;

/// MySQL driver with the `CREATE TABLE` defaults override
pub struct MysqlDriver {
    config: ConnectionConfig,
    connection: Option<MySqlConnection>,
    input: Option<Arc<dyn InputInterface>>,
    output: Option<Arc<dyn OutputInterface>>,
}

impl MysqlDriver {
    pub const NAME: &'static str = "mysql";

    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            connection: None,
            input: None,
            output: None,
        }
    }

    /// Whether a server connection has been opened
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .database(&self.config.name)
            .charset(&self.config.charset);
        if !self.config.pass.is_empty() {
            options = options.password(&self.config.pass);
        }
        options
    }

    async fn connection(&mut self) -> ForgeResult<&mut MySqlConnection> {
        if self.connection.is_none() {
            self.config.validate()?;
            debug!(
                host = %self.config.host,
                port = self.config.port,
                database = %self.config.name,
                "Connecting to MySQL"
            );
            let connection = self.connect_options().connect().await.map_err(|e| {
                ForgeError::with_context(
                    format!(
                        "Connecting to {}:{}/{}",
                        self.config.host, self.config.port, self.config.name
                    ),
                    e.to_string(),
                )
            })?;
            self.connection = Some(connection);
        }
        self.connection
            .as_mut()
            .ok_or_else(|| ForgeError::internal("MySQL connection missing after connect"))
    }

    fn print_statement(&self, sql: &str) {
        if let Some(output) = &self.output {
            output.writeln(&[sql], OUTPUT_RAW);
        }
    }
}

#[async_trait]
impl Driver for MysqlDriver {
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
        true
    }

    async fn begin_transaction(&mut self) -> ForgeResult<()> {
        self.execute("START TRANSACTION").await.map(|_| ())
    }

    async fn commit_transaction(&mut self) -> ForgeResult<()> {
        self.execute("COMMIT").await.map(|_| ())
    }

    async fn rollback_transaction(&mut self) -> ForgeResult<()> {
        self.execute("ROLLBACK").await.map(|_| ())
    }

    async fn execute(&mut self, sql: &str) -> ForgeResult<u64> {
        if self.config.dry_run {
            self.print_statement(sql);
            return Ok(0);
        }

        debug!(sql, "Executing statement");
        let connection = self.connection().await?;
        let result = sqlx::Executor::execute(&mut *connection, sqlx::raw_sql(sql))
            .await
            .map_err(|e| ForgeError::statement(sql, e))?;
        Ok(result.rows_affected())
    }

    async fn create_table(&mut self, table: &TableDefinition) -> ForgeResult<()> {
        table.validate()?;
        let sql = ddl::create_table_sql(table, &self.config);
        self.execute(&sql).await.map(|_| ())
    }

    async fn has_table(&mut self, name: &str) -> ForgeResult<bool> {
        if self.config.dry_run {
            debug!(table = name, "Dry run, assuming table is absent");
            return Ok(false);
        }

        let database = self.config.name.clone();
        let connection = self.connection().await?;
        let count: i64 = sqlx::query_scalar(ddl::HAS_TABLE_SQL)
            .bind(database)
            .bind(name)
            .fetch_one(&mut *connection)
            .await
            .map_err(|e| ForgeError::statement(ddl::HAS_TABLE_SQL, e))?;
        Ok(count > 0)
    }

    async fn drop_table(&mut self, name: &str) -> ForgeResult<()> {
        self.execute(&ddl::drop_table_sql(name)).await.map(|_| ())
    }

    async fn rename_table(&mut self, from: &str, to: &str) -> ForgeResult<()> {
        self.execute(&ddl::rename_table_sql(from, to))
            .await
            .map(|_| ())
    }

    async fn truncate_table(&mut self, name: &str) -> ForgeResult<()> {
        self.execute(&ddl::truncate_table_sql(name)).await.map(|_| ())
    }

    async fn insert(&mut self, table: &str, rows: &[Row]) -> ForgeResult<u64> {
        for sql in ddl::insert_sql(table, rows) {
            self.execute(&sql).await?;
        }
        Ok(rows.len() as u64)
    }
}

impl Drop for MysqlDriver {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            // Close in the background when a runtime is still around
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(e) = connection.close().await {
                            warn!(error = %e, "Failed to close MySQL connection");
                        }
                    });
                }
                Err(_) => debug!("No runtime left, dropping MySQL connection without closing it"),
            }
        }
    }
}
