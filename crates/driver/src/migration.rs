//! Migration contract
//!
//! Generated migration files implement [`Migration`]. Ordering, history
//! bookkeeping and rollback belong to the engine that runs them.

use async_trait::async_trait;
use dbforge_core::ForgeResult;

use crate::traits::Driver;

#[async_trait]
pub trait Migration: Send + Sync {
    /// Class-style name, e.g. `CreateUsersTable`
    fn name(&self) -> &str;

    /// `YYYYMMDDHHMMSS` stamp taken from the file name
    fn version(&self) -> u64;

    async fn up(&self, driver: &mut dyn Driver) -> ForgeResult<()>;

    async fn down(&self, driver: &mut dyn Driver) -> ForgeResult<()> {
        let _ = driver;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::testing::MemoryDriver;
    use dbforge_schema::{Column, TableDefinition};
    use pretty_assertions::assert_eq;

    struct CreateUsersTable;

    #[async_trait]
    impl Migration for CreateUsersTable {
        fn name(&self) -> &str {
            "CreateUsersTable"
        }

        fn version(&self) -> u64 {
            20240101120000
        }

        async fn up(&self, driver: &mut dyn Driver) -> ForgeResult<()> {
            let table = TableDefinition::new("users").add_column(Column::string("email"));
            driver.create_table(&table).await
        }

        async fn down(&self, driver: &mut dyn Driver) -> ForgeResult<()> {
            driver.drop_table("users").await
        }
    }

    #[tokio::test]
    async fn test_up_then_down() {
        let mut driver = MemoryDriver::new(ConnectionConfig::default());
        let handle = driver.handle();
        let migration = CreateUsersTable;

        migration.up(&mut driver).await.unwrap();
        assert!(driver.has_table("users").await.unwrap());
        migration.down(&mut driver).await.unwrap();
        assert!(!driver.has_table("users").await.unwrap());

        assert_eq!(handle.log(), vec!["create_table(users)", "drop_table(users)"]);
        assert_eq!(migration.version(), 20240101120000);
    }
}
