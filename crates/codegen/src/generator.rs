//! # Template Generators
//!
//! A template generator supplies migration template text and gets a
//! callback once the file has been written. Generators are selected by
//! name with `make:migration --class <name>` or the `template_class`
//! setting.
//!
//! ## Built-in generators
//!
//! - `create_table`: a migration that creates and drops one table. The
//!   table name is derived from the class name in the post-creation hook
//!   (`CreateUsersTable` creates `users`).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use dbforge_core::{ForgeError, ForgeResult};
use heck::ToSnakeCase;
use tracing::debug;

/// Produces migration template text
pub trait TemplateGenerator: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Template text, before token substitution
    fn migration_template(&self) -> ForgeResult<String>;

    /// Called after the migration file was written
    fn post_migration_creation(
        &self,
        path: &Path,
        class_name: &str,
        base_class_name: &str,
    ) -> ForgeResult<()> {
        let _ = (path, class_name, base_class_name);
        Ok(())
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<String, Arc<dyn TemplateGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in generators
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(CreateTableGenerator);
        registry
    }

    pub fn register(&mut self, generator: impl TemplateGenerator + 'static) -> &mut Self {
        self.generators
            .insert(generator.name().to_string(), Arc::new(generator));
        self
    }

    pub fn get(&self, name: &str) -> ForgeResult<Arc<dyn TemplateGenerator>> {
        self.generators
            .get(name)
            .cloned()
            .ok_or_else(|| ForgeError::GeneratorNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.generators.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.generators.keys()).finish()
    }
}

// ============================================================================
// CreateTableGenerator
// ============================================================================

/// Placeholder the `create_table` template leaves for its hook
pub const TABLE_NAME_PLACEHOLDER: &str = "$tableName";

const CREATE_TABLE_STUB: &str = include_str!("../stubs/create_table.stub");

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateTableGenerator;

impl CreateTableGenerator {
    pub const NAME: &'static str = "create_table";

    /// `CreateUsersTable` -> `users`, `AddPosts` -> `add_posts`
    pub fn table_name(class_name: &str) -> String {
        let snake = class_name.to_snake_case();
        let trimmed = snake
            .strip_prefix("create_")
            .map(|rest| rest.strip_suffix("_table").unwrap_or(rest))
            .filter(|rest| !rest.is_empty());
        trimmed.unwrap_or(&snake).to_string()
    }
}

impl TemplateGenerator for CreateTableGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn migration_template(&self) -> ForgeResult<String> {
        Ok(CREATE_TABLE_STUB.to_string())
    }

    fn post_migration_creation(
        &self,
        path: &Path,
        class_name: &str,
        _base_class_name: &str,
    ) -> ForgeResult<()> {
        let table = Self::table_name(class_name);
        debug!(path = %path.display(), table = %table, "Filling in table name");

        let contents = std::fs::read_to_string(path).map_err(|e| ForgeError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, contents.replace(TABLE_NAME_PLACEHOLDER, &table)).map_err(|e| {
            ForgeError::FileWrite {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })
    }
}
