//! # Settings
//!
//! Project settings from `dbforge.toml`:
//!
//! ```toml
//! [database]
//! type = "mysql"
//! hostname = "127.0.0.1"
//! database = "app"
//! username = "root"
//! password = ""
//! hostport = 3306
//! charset = "utf8"
//! prefix = "app_"
//! deploy = 0          # 1: every value is a comma-separated server list
//!
//! [migration]
//! table = "app_migrations"
//! path = "database/migrations"
//! seed_path = "database/seeds"
//! template = "stubs/migration.stub"
//! template_class = "create_table"
//! namespace = "app::migrations"
//! ```

use std::path::{Path, PathBuf};

use dbforge_core::{ForgeError, ForgeResult};
use dbforge_driver::{ConnectionConfig, VersionOrder};
use serde::Deserialize;
use tracing::debug;

/// Settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dbforge.toml";

// ============================================================================
// Scalar
// ============================================================================

/// A setting written either as a number or as text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(i64),
    Text(String),
}

impl Scalar {
    fn to_text(&self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Text(String::new())
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    #[serde(rename = "type")]
    pub kind: String,
    pub hostname: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub hostport: Scalar,
    pub charset: String,
    pub prefix: String,
    pub suffix: String,
    pub deploy: u8,
    pub engine: Option<String>,
    pub collation: Option<String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            kind: "mysql".to_string(),
            hostname: "127.0.0.1".to_string(),
            database: String::new(),
            username: "root".to_string(),
            password: String::new(),
            hostport: Scalar::Number(3306),
            charset: "utf8".to_string(),
            prefix: String::new(),
            suffix: String::new(),
            deploy: 0,
            engine: None,
            collation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
    /// Migrations table; defaults to `<prefix>migrations`
    pub table: Option<String>,
    pub path: PathBuf,
    pub seed_path: PathBuf,
    /// Default alternate migration template
    pub template: Option<PathBuf>,
    /// Default template generator
    pub template_class: Option<String>,
    /// Module path written into generated files
    pub namespace: Option<String>,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            table: None,
            path: PathBuf::from("database/migrations"),
            seed_path: PathBuf::from("database/seeds"),
            template: None,
            template_class: None,
            namespace: None,
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub migration: MigrationSettings,
}

impl Settings {
    /// Load settings. An explicit file must exist; without one,
    /// `dbforge.toml` in `working_dir` is used when present.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> ForgeResult<Self> {
        let path = match explicit {
            Some(path) => {
                let path = working_dir.join(path);
                if !path.is_file() {
                    return Err(ForgeError::configuration(format!(
                        "config file \"{}\" does not exist",
                        path.display()
                    )));
                }
                path
            }
            None => {
                let path = working_dir.join(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    debug!("No settings file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        debug!(path = %path.display(), "Loading settings");
        let text = std::fs::read_to_string(&path).map_err(|e| ForgeError::FileRead {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&text).map_err(|e| {
            ForgeError::configuration(format!("invalid config file \"{}\": {}", path.display(), e))
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Connection settings for the driver. With `deploy` set, the first
    /// entry of each comma-separated value is used.
    pub fn connection_config(&self, dry_run: bool, password: Option<&str>) -> ForgeResult<ConnectionConfig> {
        let db = &self.database;
        let pick = |value: &str| -> String {
            if db.deploy == 0 {
                value.to_string()
            } else {
                value.split(',').next().unwrap_or_default().trim().to_string()
            }
        };

        let port_text = pick(&db.hostport.to_text());
        let port = if port_text.is_empty() {
            ConnectionConfig::default().port
        } else {
            port_text.parse::<u16>().map_err(|_| {
                ForgeError::configuration(format!("invalid hostport \"{}\"", port_text))
            })?
        };

        let table_prefix = pick(&db.prefix);
        let default_migration_table = self
            .migration
            .table
            .clone()
            .filter(|table| !table.is_empty())
            .unwrap_or_else(|| format!("{}migrations", table_prefix));

        Ok(ConnectionConfig {
            adapter: pick(&db.kind),
            host: pick(&db.hostname),
            name: pick(&db.database),
            user: pick(&db.username),
            pass: password.map(str::to_string).unwrap_or_else(|| pick(&db.password)),
            port,
            charset: pick(&db.charset),
            table_prefix,
            table_suffix: pick(&db.suffix),
            default_migration_table,
            version_order: VersionOrder::Creation,
            engine: db.engine.clone().filter(|e| !e.is_empty()),
            collation: db.collation.clone().filter(|c| !c.is_empty()),
            dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.migration.path, PathBuf::from("database/migrations"));
        assert_eq!(settings.migration.seed_path, PathBuf::from("database/seeds"));

        let config = settings.connection_config(false, None).unwrap();
        assert_eq!(config.adapter, "mysql");
        assert_eq!(config.port, 3306);
        assert_eq!(config.default_migration_table, "migrations");
        assert_eq!(config.version_order, VersionOrder::Creation);
    }

    #[test]
    fn test_single_server() {
        let settings = Settings::parse(
            r#"
            [database]
            hostname = "db.local"
            database = "app"
            hostport = "3307"
            prefix = "app_"
            collation = "utf8mb4_unicode_ci"
            "#,
        )
        .unwrap();
        let config = settings.connection_config(true, None).unwrap();

        assert_eq!(config.host, "db.local");
        assert_eq!(config.port, 3307);
        assert_eq!(config.table_prefix, "app_");
        assert_eq!(config.default_migration_table, "app_migrations");
        assert_eq!(config.collation.as_deref(), Some("utf8mb4_unicode_ci"));
        assert!(config.dry_run);
    }

    #[test]
    fn test_distributed_deploy_uses_primary() {
        let settings = Settings::parse(
            r#"
            [database]
            type = "mysql,mysql"
            hostname = "primary, replica"
            database = "app,app"
            username = "writer,reader"
            password = "secret,other"
            hostport = "3306,3307"
            prefix = "p_,r_"
            deploy = 1

            [migration]
            table = "schema_versions"
            "#,
        )
        .unwrap();
        let config = settings.connection_config(false, None).unwrap();

        assert_eq!(config.adapter, "mysql");
        assert_eq!(config.host, "primary");
        assert_eq!(config.user, "writer");
        assert_eq!(config.pass, "secret");
        assert_eq!(config.port, 3306);
        assert_eq!(config.table_prefix, "p_");
        assert_eq!(config.default_migration_table, "schema_versions");
    }

    #[test]
    fn test_password_override_and_bad_port() {
        let mut settings = Settings::default();
        settings.database.password = "file".into();
        let config = settings.connection_config(false, Some("env")).unwrap();
        assert_eq!(config.pass, "env");

        settings.database.hostport = Scalar::Text("abc".into());
        let err = settings.connection_config(false, None).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: invalid hostport \"abc\"");
    }

    #[test]
    fn test_load() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Settings::load(None, dir.path()).unwrap(), Settings::default());

        let err = Settings::load(Some(Path::new("missing.toml")), dir.path()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[migration]\npath = \"db/m\"\n").unwrap();
        let settings = Settings::load(None, dir.path()).unwrap();
        assert_eq!(settings.migration.path, PathBuf::from("db/m"));

        std::fs::write(dir.path().join("bad.toml"), "[database\n").unwrap();
        let err = Settings::load(Some(Path::new("bad.toml")), dir.path()).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }
}
