//! Connection configuration consumed by the driver factory

use dbforge_core::{ForgeError, ForgeResult, Validatable};

/// Ordering strategy for migration versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionOrder {
    /// Order by the version stamp embedded in the file name
    #[default]
    Creation,
    /// Order by the time the migration was applied
    Execution,
}

impl VersionOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOrder::Creation => "creation",
            VersionOrder::Execution => "execution",
        }
    }
}

/// Resolved connection settings for one command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Engine identifier used to pick the driver (`mysql`)
    pub adapter: String,
    pub host: String,
    /// Database name
    pub name: String,
    pub user: String,
    pub pass: String,
    pub port: u16,
    pub charset: String,
    pub table_prefix: String,
    pub table_suffix: String,
    /// Name of the migrations bookkeeping table
    pub default_migration_table: String,
    pub version_order: VersionOrder,
    /// Driver-level storage engine default
    pub engine: Option<String>,
    /// Driver-level collation default
    pub collation: Option<String>,
    /// Print statements instead of executing them
    pub dry_run: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            adapter: "mysql".to_string(),
            host: "127.0.0.1".to_string(),
            name: String::new(),
            user: "root".to_string(),
            pass: String::new(),
            port: 3306,
            charset: "utf8".to_string(),
            table_prefix: String::new(),
            table_suffix: String::new(),
            default_migration_table: "migrations".to_string(),
            version_order: VersionOrder::Creation,
            engine: None,
            collation: None,
            dry_run: false,
        }
    }
}

impl ConnectionConfig {
    /// Whether an option is configured with a non-empty value
    pub fn has_option(&self, key: &str) -> bool {
        match key {
            "adapter" => !self.adapter.is_empty(),
            "host" => !self.host.is_empty(),
            "name" => !self.name.is_empty(),
            "user" => !self.user.is_empty(),
            "pass" => !self.pass.is_empty(),
            "port" => self.port != 0,
            "charset" => !self.charset.is_empty(),
            "table_prefix" => !self.table_prefix.is_empty(),
            "table_suffix" => !self.table_suffix.is_empty(),
            "default_migration_table" => !self.default_migration_table.is_empty(),
            "version_order" => true,
            "engine" => self.engine.as_deref().is_some_and(|e| !e.is_empty()),
            "collation" => self.collation.as_deref().is_some_and(|c| !c.is_empty()),
            "dry_run" => self.dry_run,
            _ => false,
        }
    }

    /// Whether table names are rewritten with a prefix or suffix
    pub fn rewrites_table_names(&self) -> bool {
        self.has_option("table_prefix") || self.has_option("table_suffix")
    }

    /// Apply the configured prefix and suffix to a table name
    pub fn table_name(&self, name: &str) -> String {
        format!("{}{}{}", self.table_prefix, name, self.table_suffix)
    }
}

impl Validatable for ConnectionConfig {
    fn validate(&self) -> ForgeResult<()> {
        for key in ["adapter", "host", "name"] {
            if !self.has_option(key) {
                return Err(ForgeError::missing_config(key));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ConnectionConfig {
        ConnectionConfig {
            name: "app".to_string(),
            ..ConnectionConfig::default()
        }
    }

    #[test]
    fn test_defaults_validate_once_database_is_named() {
        assert!(!ConnectionConfig::default().is_valid());
        assert!(config().is_valid());
    }

    #[test]
    fn test_missing_host_names_the_key() {
        let config = ConnectionConfig {
            host: String::new(),
            ..config()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: missing required setting \"host\""
        );
    }

    #[test]
    fn test_prefix_and_suffix_options() {
        let mut config = config();
        assert!(!config.rewrites_table_names());

        config.table_prefix = "app_".to_string();
        assert!(config.has_option("table_prefix"));
        assert!(config.rewrites_table_names());
        assert_eq!(config.table_name("users"), "app_users");

        config.table_suffix = "_v2".to_string();
        assert_eq!(config.table_name("users"), "app_users_v2");
    }

    #[test]
    fn test_unknown_option_is_not_set() {
        assert!(!config().has_option("socket"));
        assert_eq!(config().version_order.as_str(), "creation");
    }
}
