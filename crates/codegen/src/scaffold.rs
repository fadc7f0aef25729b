//! # Scaffolder
//!
//! The file creation flow shared by `make:migration` and `make:seeder`.
//!
//! ## Steps
//!
//! 1. Prepare the target directory, offering to create it when missing
//! 2. Check it exists and is writable
//! 3. Validate the CamelCase class name
//! 4. Migrations only: reject a class name already used in the directory
//! 5. Compute the file name and refuse to overwrite an existing file
//! 6. Load the template, substitute tokens, write the file
//! 7. Migrations only: run the generator's post-creation hook
//!
//! The result carries the report lines for the console.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dbforge_core::{ForgeError, ForgeResult, ScaffoldKind};
use tracing::{debug, info};

use crate::generator::{GeneratorRegistry, TemplateGenerator};
use crate::naming;
use crate::template::{TokenMap, render};

/// Trait every generated migration implements
pub const MIGRATION_BASE_CLASS: &str = "dbforge_driver::Migration";

/// Trait every generated seed implements
pub const SEED_BASE_CLASS: &str = "dbforge_driver::Seed";

const MIGRATION_STUB: &str = include_str!("../stubs/migration.stub");
const SEED_STUB: &str = include_str!("../stubs/seed.stub");

// ============================================================================
// TemplateSource
// ============================================================================

/// Where the migration template comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateSource {
    /// Built-in stub
    #[default]
    Default,
    /// Alternate template file
    File(PathBuf),
    /// Registered template generator
    Generator(String),
}

impl TemplateSource {
    /// Pick the template source from command line and configured options.
    ///
    /// Each pair is mutually exclusive. Command line options replace the
    /// configured ones.
    pub fn resolve(
        cli_template: Option<PathBuf>,
        cli_class: Option<String>,
        config_template: Option<PathBuf>,
        config_class: Option<String>,
    ) -> ForgeResult<Self> {
        if config_template.is_some() && config_class.is_some() {
            return Err(ForgeError::template(
                "Cannot define template_class and template at the same time",
            ));
        }
        if cli_template.is_some() && cli_class.is_some() {
            return Err(ForgeError::template(
                "Cannot use --template and --class at the same time",
            ));
        }

        let (template, class) = if cli_template.is_none() && cli_class.is_none() {
            (config_template, config_class)
        } else {
            (cli_template, cli_class)
        };

        Ok(match (template, class) {
            (Some(path), _) => TemplateSource::File(path),
            (None, Some(name)) => TemplateSource::Generator(name),
            (None, None) => TemplateSource::Default,
        })
    }
}

// ============================================================================
// ScaffoldOutcome
// ============================================================================

/// A file the scaffolder created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldOutcome {
    /// Absolute path of the new file
    pub path: PathBuf,
    /// Version stamp (migrations only)
    pub version: Option<u64>,
    /// Console report, with style tags
    pub messages: Vec<String>,
}

// ============================================================================
// Scaffolder
// ============================================================================

pub struct Scaffolder<'a> {
    generators: &'a GeneratorRegistry,
    namespace: Option<String>,
    now: Option<DateTime<Utc>>,
    base_dir: Option<PathBuf>,
}

impl<'a> Scaffolder<'a> {
    pub fn new(generators: &'a GeneratorRegistry) -> Self {
        Self {
            generators,
            namespace: None,
            now: None,
            base_dir: None,
        }
    }

    /// Module path substituted into templates
    pub fn namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    /// Pin the clock used for version stamps. Stamps are always UTC.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Directory reported paths are made relative to (defaults to the
    /// working directory)
    pub fn relative_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    // ====================================================================
    // Directory handling
    // ====================================================================

    /// Create the directory when missing and `confirm` agrees, then check it
    /// is usable. Returns the canonical path.
    pub fn prepare_directory(
        &self,
        kind: ScaffoldKind,
        dir: &Path,
        confirm: &mut dyn FnMut(&str) -> bool,
    ) -> ForgeResult<PathBuf> {
        if !dir.exists() {
            let question = format!("Create {} directory? [y]/n", kind.directory_label());
            if confirm(&question) {
                debug!(path = %dir.display(), "Creating directory");
                std::fs::create_dir_all(dir)?;
            }
        }
        verify_directory(kind, dir)?;
        Ok(std::fs::canonicalize(dir)?)
    }

    // ====================================================================
    // Migrations
    // ====================================================================

    pub fn create_migration(
        &self,
        class_name: &str,
        dir: &Path,
        source: &TemplateSource,
        confirm: &mut dyn FnMut(&str) -> bool,
    ) -> ForgeResult<ScaffoldOutcome> {
        let kind = ScaffoldKind::Migration;
        let dir = self.prepare_directory(kind, dir, confirm)?;

        if !naming::is_valid_class_name(class_name) {
            return Err(ForgeError::InvalidName {
                kind,
                name: class_name.to_string(),
            });
        }
        if !naming::is_unique_migration_class_name(&dir, class_name)? {
            return Err(ForgeError::DuplicateName {
                kind,
                name: class_name.to_string(),
            });
        }

        let now = self.now.unwrap_or_else(Utc::now);
        let version = naming::next_version(&dir, &now)?;
        let path = dir.join(naming::class_name_to_file_name(class_name, version));
        if path.is_file() {
            return Err(ForgeError::FileExists(path));
        }

        let generator = match source {
            TemplateSource::Generator(name) => Some(self.generators.get(name)?),
            _ => None,
        };
        let template = match (source, &generator) {
            (_, Some(generator)) => generator.migration_template()?,
            (TemplateSource::File(template), None) => read_template(template)?,
            _ => MIGRATION_STUB.to_string(),
        };

        let tokens = TokenMap::scaffold(
            self.namespace.as_deref(),
            MIGRATION_BASE_CLASS,
            class_name,
            Some(version),
        );
        write_file(&path, &render(&template, &tokens))?;

        if let Some(generator) = &generator {
            let base = tokens
                .get(crate::template::BASE_CLASS_NAME)
                .unwrap_or_default();
            generator.post_migration_creation(&path, class_name, base)?;
        }
        info!(path = %path.display(), version, "Created migration");

        let mut messages = vec![format!(
            "<info>using migration base class</info> {}",
            MIGRATION_BASE_CLASS
        )];
        messages.push(match source {
            TemplateSource::File(template) => format!(
                "<info>using alternative template</info> {}",
                template.display()
            ),
            TemplateSource::Generator(name) => {
                format!("<info>using template creation class</info> {}", name)
            }
            TemplateSource::Default => "<info>using default template</info>".to_string(),
        });
        messages.push(format!("<info>created</info> {}", self.display_path(&path)));

        Ok(ScaffoldOutcome {
            path,
            version: Some(version),
            messages,
        })
    }

    // ====================================================================
    // Seeds
    // ====================================================================

    pub fn create_seed(
        &self,
        class_name: &str,
        dir: &Path,
        confirm: &mut dyn FnMut(&str) -> bool,
    ) -> ForgeResult<ScaffoldOutcome> {
        let kind = ScaffoldKind::Seed;
        let dir = self.prepare_directory(kind, dir, confirm)?;

        if !naming::is_valid_class_name(class_name) {
            return Err(ForgeError::InvalidName {
                kind,
                name: class_name.to_string(),
            });
        }

        let file_name = naming::seed_file_name(class_name);
        let path = dir.join(&file_name);
        if path.is_file() {
            return Err(ForgeError::FileExists(PathBuf::from(file_name)));
        }

        let tokens = TokenMap::scaffold(self.namespace.as_deref(), SEED_BASE_CLASS, class_name, None);
        write_file(&path, &render(SEED_STUB, &tokens))?;
        info!(path = %path.display(), "Created seed");

        let messages = vec![
            format!("<info>using seed base class</info> {}", SEED_BASE_CLASS),
            format!("<info>created</info> {}", self.display_path(&path)),
        ];

        Ok(ScaffoldOutcome {
            path,
            version: None,
            messages,
        })
    }

    /// Path relative to the base directory when it lies below it
    fn display_path(&self, path: &Path) -> String {
        let base = self
            .base_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .and_then(|dir| std::fs::canonicalize(dir).ok());
        match base.as_deref().and_then(|base| path.strip_prefix(base).ok()) {
            Some(relative) => relative.display().to_string(),
            None => path.display().to_string(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Check a scaffold directory exists and is writable
pub fn verify_directory(kind: ScaffoldKind, dir: &Path) -> ForgeResult<()> {
    if !dir.is_dir() {
        return Err(ForgeError::directory(kind, dir, "does not exist"));
    }
    // Writable means a file can be created here, whatever the mode bits say
    tempfile::Builder::new()
        .prefix(".dbforge-")
        .tempfile_in(dir)
        .map(drop)
        .map_err(|e| {
            debug!(path = %dir.display(), error = %e, "Directory write check failed");
            ForgeError::directory(kind, dir, "is not writable")
        })
}

fn read_template(path: &Path) -> ForgeResult<String> {
    if !path.is_file() {
        return Err(ForgeError::template(format!(
            "The alternative template file \"{}\" does not exist",
            path.display()
        )));
    }
    debug!(path = %path.display(), "Loading alternative template");
    std::fs::read_to_string(path).map_err(|e| ForgeError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_file(path: &Path, contents: &str) -> ForgeResult<()> {
    std::fs::write(path, contents).map_err(|e| ForgeError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn yes() -> impl FnMut(&str) -> bool {
        |_| true
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn scaffolder<'a>(registry: &'a GeneratorRegistry, base: &Path) -> Scaffolder<'a> {
        Scaffolder::new(registry).at(fixed_time()).relative_to(base)
    }

    #[test]
    fn test_resolve_template_source() {
        assert_eq!(
            TemplateSource::resolve(None, None, None, None).unwrap(),
            TemplateSource::Default
        );
        assert_eq!(
            TemplateSource::resolve(None, None, Some("a.stub".into()), None).unwrap(),
            TemplateSource::File("a.stub".into())
        );
        assert_eq!(
            TemplateSource::resolve(None, Some("create_table".into()), Some("a.stub".into()), None)
                .unwrap(),
            TemplateSource::Generator("create_table".into())
        );
    }

    #[test]
    fn test_template_options_are_exclusive() {
        let err = TemplateSource::resolve(Some("a".into()), Some("b".into()), None, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot use --template and --class at the same time");

        let err = TemplateSource::resolve(None, None, Some("a".into()), Some("b".into()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot define template_class and template at the same time"
        );
    }

    #[test]
    fn test_create_migration_with_default_template() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("database/migrations");
        let registry = GeneratorRegistry::new();
        let mut questions = Vec::new();

        let outcome = scaffolder(&registry, tmp.path())
            .create_migration("CreateUsersTable", &dir, &TemplateSource::Default, &mut |q| {
                questions.push(q.to_string());
                true
            })
            .unwrap();

        assert_eq!(questions, vec!["Create migrations directory? [y]/n"]);
        assert_eq!(outcome.version, Some(20240101120000));
        assert!(outcome.path.ends_with("20240101120000_create_users_table.rs"));
        assert_eq!(
            outcome.messages,
            vec![
                "<info>using migration base class</info> dbforge_driver::Migration".to_string(),
                "<info>using default template</info>".to_string(),
                "<info>created</info> database/migrations/20240101120000_create_users_table.rs"
                    .to_string(),
            ]
        );

        let contents = std::fs::read_to_string(&outcome.path).unwrap();
        assert!(contents.contains("pub struct CreateUsersTable;"));
        assert!(contents.contains("impl Migration for CreateUsersTable"));
        assert!(contents.contains("use dbforge_driver::Migration;"));
        assert!(contents.contains("20240101120000"));
        assert!(!contents.contains('$'));
    }

    #[test]
    fn test_duplicate_migration_name_fails() {
        let tmp = TempDir::new().unwrap();
        let registry = GeneratorRegistry::new();
        let scaffolder = scaffolder(&registry, tmp.path());

        let first = scaffolder
            .create_migration("CreateUsersTable", tmp.path(), &TemplateSource::Default, &mut yes())
            .unwrap();
        let err = scaffolder
            .create_migration("CreateUsersTable", tmp.path(), &TemplateSource::Default, &mut yes())
            .unwrap_err();
        assert!(matches!(err, ForgeError::DuplicateName { .. }));

        let second = scaffolder
            .create_migration("CreatePostsTable", tmp.path(), &TemplateSource::Default, &mut yes())
            .unwrap();
        assert!(second.version > first.version);
    }

    #[test]
    fn test_invalid_class_name() {
        let tmp = TempDir::new().unwrap();
        let registry = GeneratorRegistry::new();
        let err = scaffolder(&registry, tmp.path())
            .create_migration("create_users", tmp.path(), &TemplateSource::Default, &mut yes())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The migration class name \"create_users\" is invalid. Please use CamelCase format."
        );
    }

    #[test]
    fn test_declined_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("missing");
        let registry = GeneratorRegistry::new();
        let err = scaffolder(&registry, tmp.path())
            .create_seed("UserSeeder", &dir, &mut |_| false)
            .unwrap_err();
        assert!(matches!(err, ForgeError::Directory { kind: ScaffoldKind::Seed, .. }));
        assert!(err.to_string().ends_with("does not exist"));
        assert!(!dir.exists());
    }

    #[test]
    fn test_directory_check_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        verify_directory(ScaffoldKind::Migration, tmp.path()).unwrap();
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_without_write_access_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("locked");
        std::fs::create_dir(&dir).unwrap();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users write through the mode bits; nothing to check then
        let privileged = std::fs::write(dir.join("check"), "").is_ok();
        if !privileged {
            let err = verify_directory(ScaffoldKind::Migration, &dir).unwrap_err();
            assert!(matches!(err, ForgeError::Directory { kind: ScaffoldKind::Migration, .. }));
            assert!(err.to_string().ends_with("is not writable"));

            let registry = GeneratorRegistry::new();
            let err = scaffolder(&registry, tmp.path())
                .create_migration("CreateUsersTable", &dir, &TemplateSource::Default, &mut yes())
                .unwrap_err();
            assert!(err.to_string().ends_with("is not writable"));
        }

        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_unpinned_version_uses_utc() {
        let tmp = TempDir::new().unwrap();
        let registry = GeneratorRegistry::new();

        let before = naming::version_at(&Utc::now());
        let outcome = Scaffolder::new(&registry)
            .relative_to(tmp.path())
            .create_migration("CreateUsersTable", tmp.path(), &TemplateSource::Default, &mut yes())
            .unwrap();
        let after = naming::version_at(&Utc::now());

        let version = outcome.version.unwrap();
        assert!(before <= version && version <= after, "{} not in {}..={}", version, before, after);
    }

    #[test]
    fn test_alternative_template() {
        let tmp = TempDir::new().unwrap();
        let template = tmp.path().join("custom.stub");
        std::fs::write(&template, "// $className v$version via $baseClassName").unwrap();
        let registry = GeneratorRegistry::new();

        let outcome = scaffolder(&registry, tmp.path())
            .create_migration(
                "AddIndexes",
                tmp.path(),
                &TemplateSource::File(template.clone()),
                &mut yes(),
            )
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&outcome.path).unwrap(),
            "// AddIndexes v20240101120000 via Migration"
        );
        assert!(outcome.messages[1].starts_with("<info>using alternative template</info> "));
    }

    #[test]
    fn test_missing_alternative_template() {
        let tmp = TempDir::new().unwrap();
        let registry = GeneratorRegistry::new();
        let err = scaffolder(&registry, tmp.path())
            .create_migration(
                "AddIndexes",
                tmp.path(),
                &TemplateSource::File(tmp.path().join("nope.stub")),
                &mut yes(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_generator_template_and_hook() {
        let tmp = TempDir::new().unwrap();
        let registry = GeneratorRegistry::with_builtins();
        let outcome = scaffolder(&registry, tmp.path())
            .create_migration(
                "CreateUsersTable",
                tmp.path(),
                &TemplateSource::Generator("create_table".into()),
                &mut yes(),
            )
            .unwrap();

        let contents = std::fs::read_to_string(&outcome.path).unwrap();
        assert!(contents.contains("TableDefinition::new(\"users\")"));
        assert_eq!(
            outcome.messages[1],
            "<info>using template creation class</info> create_table"
        );
    }

    #[test]
    fn test_unknown_generator_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let registry = GeneratorRegistry::new();
        let err = scaffolder(&registry, tmp.path())
            .create_migration(
                "CreateUsersTable",
                tmp.path(),
                &TemplateSource::Generator("Nope".into()),
                &mut yes(),
            )
            .unwrap_err();
        assert!(matches!(err, ForgeError::GeneratorNotFound(_)));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_seed() {
        let tmp = TempDir::new().unwrap();
        let registry = GeneratorRegistry::new();
        let scaffolder = scaffolder(&registry, tmp.path()).namespace(Some("app::seeds".into()));

        let outcome = scaffolder.create_seed("UserSeeder", tmp.path(), &mut yes()).unwrap();
        assert!(outcome.path.ends_with("user_seeder.rs"));
        assert_eq!(outcome.version, None);
        assert_eq!(outcome.messages[1], "<info>created</info> user_seeder.rs");

        let contents = std::fs::read_to_string(&outcome.path).unwrap();
        assert!(contents.starts_with("//! Module `app::seeds`"));
        assert!(contents.contains("impl Seed for UserSeeder"));
        assert!(contents.contains("SeedRegistration::new(\"UserSeeder\""));

        let err = scaffolder.create_seed("UserSeeder", tmp.path(), &mut yes()).unwrap_err();
        assert_eq!(err.to_string(), "The file \"user_seeder.rs\" already exists");
    }

    #[test]
    fn test_migration_and_seed_with_same_name_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        let registry = GeneratorRegistry::new();
        let scaffolder = scaffolder(&registry, tmp.path());

        let migration = scaffolder
            .create_migration(
                "Users",
                &tmp.path().join("migrations"),
                &TemplateSource::Default,
                &mut yes(),
            )
            .unwrap();
        let seed = scaffolder
            .create_seed("Users", &tmp.path().join("seeds"), &mut yes())
            .unwrap();
        assert_ne!(migration.path, seed.path);
        assert!(migration.path.is_file() && seed.path.is_file());
    }
}
