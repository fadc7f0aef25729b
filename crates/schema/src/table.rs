//! Table definitions
//!
//! A `TableDefinition` collects the pending columns, indexes and foreign
//! keys of a table together with its options. Migration code builds one,
//! hands it to `Driver::create_table`, and drops it.

use std::collections::HashSet;

use dbforge_core::{ForgeError, ForgeResult, Named, Validatable};
use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::foreign_key::ForeignKey;
use crate::index::{Index, IndexKind};

// ============================================================================
// Options
// ============================================================================

/// The `id` table option: controls the synthesized auto-increment key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdOption {
    /// Option not given; behaves like `Enabled`
    #[default]
    Default,
    /// `id = true`: synthesize a column named `id`
    Enabled,
    /// `id = false`: synthesize nothing
    Disabled,
    /// `id = "name"`: synthesize a column with this name
    Named(String),
}

impl IdOption {
    /// Name of the column to synthesize, if any
    pub fn column_name(&self) -> Option<&str> {
        match self {
            IdOption::Default | IdOption::Enabled => Some("id"),
            IdOption::Disabled => None,
            IdOption::Named(name) => Some(name),
        }
    }
}

impl From<bool> for IdOption {
    fn from(value: bool) -> Self {
        if value {
            IdOption::Enabled
        } else {
            IdOption::Disabled
        }
    }
}

impl From<&str> for IdOption {
    fn from(value: &str) -> Self {
        IdOption::Named(value.to_string())
    }
}

/// Explicit primary key specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryKey {
    /// Single column key
    Column(String),
    /// Composite key, in key order
    Columns(Vec<String>),
}

impl PrimaryKey {
    /// Key columns in order
    pub fn columns(&self) -> Vec<&str> {
        match self {
            PrimaryKey::Column(column) => vec![column.as_str()],
            PrimaryKey::Columns(columns) => columns.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        PrimaryKey::Column(value.to_string())
    }
}

impl<S: Into<String>> From<Vec<S>> for PrimaryKey {
    fn from(value: Vec<S>) -> Self {
        PrimaryKey::Columns(value.into_iter().map(Into::into).collect())
    }
}

/// Table-level options
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableOptions {
    /// Storage engine
    pub engine: Option<String>,

    /// Table collation, of the form `<charset>_<variant>`
    pub collation: Option<String>,

    /// Table comment
    pub comment: Option<String>,

    /// Synthesized id column
    pub id: IdOption,

    /// Explicit primary key
    pub primary_key: Option<PrimaryKey>,

    /// Sign of the synthesized id column (signed unless set to false)
    pub signed: Option<bool>,
}

// ============================================================================
// TableDefinition
// ============================================================================

/// A table about to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name, before any prefix/suffix rewriting
    pub name: String,

    /// Pending columns in declaration order
    pub columns: Vec<Column>,

    /// Indexes in declaration order
    pub indexes: Vec<Index>,

    /// Foreign keys in declaration order
    pub foreign_keys: Vec<ForeignKey>,

    /// Table options
    pub options: TableOptions,
}

impl TableDefinition {
    /// Create an empty table definition with default options
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            options: TableOptions::default(),
        }
    }

    /// Create a table definition with the given options
    pub fn with_options(name: impl Into<String>, options: TableOptions) -> Self {
        Self {
            options,
            ..Self::new(name)
        }
    }

    // ====================================================================
    // Builders
    // ====================================================================

    /// Add a column. Columns flagged unique also get a single-column
    /// unique index.
    pub fn add_column(mut self, column: Column) -> Self {
        if column.unique {
            self.indexes.push(Index::unique([column.name.clone()]));
        }
        self.columns.push(column);
        self
    }

    pub fn add_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn add_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.options.engine = Some(engine.into());
        self
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.options.collation = Some(collation.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.options.comment = Some(comment.into());
        self
    }

    pub fn id(mut self, id: impl Into<IdOption>) -> Self {
        self.options.id = id.into();
        self
    }

    pub fn primary_key(mut self, key: impl Into<PrimaryKey>) -> Self {
        self.options.primary_key = Some(key.into());
        self
    }

    pub fn signed(mut self, signed: bool) -> Self {
        self.options.signed = Some(signed);
        self
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    /// Find a column by name, ignoring case as MySQL does
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name_matches(name))
    }

    /// Whether a column with this name is declared
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Unique indexes only
    pub fn unique_indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.iter().filter(|i| i.kind == IndexKind::Unique)
    }

    /// Name of the column the SQL builder will synthesize, if any.
    ///
    /// An explicit primary key disables synthesis.
    pub fn synthesized_id(&self) -> Option<&str> {
        if self.options.primary_key.is_some() {
            return None;
        }
        self.options.id.column_name()
    }
}

impl Named for TableDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validatable for TableDefinition {
    fn validate(&self) -> ForgeResult<()> {
        if self.name.trim().is_empty() {
            return Err(ForgeError::with_context(
                "Table definition",
                "table name cannot be empty",
            ));
        }

        let context = || format!("Table '{}'", self.name);
        // MySQL column names are case-insensitive
        let key = |name: &str| name.to_ascii_lowercase();
        let mut seen = HashSet::new();
        if let Some(id) = self.synthesized_id() {
            seen.insert(key(id));
        }

        for column in &self.columns {
            column.validate()?;
            if !seen.insert(key(&column.name)) {
                return Err(ForgeError::with_context(
                    context(),
                    format!("duplicate column '{}'", column.name),
                ));
            }
        }

        for index in &self.indexes {
            if index.columns.is_empty() {
                return Err(ForgeError::with_context(context(), "index without columns"));
            }
            if let Some(missing) = index.columns.iter().find(|c| !seen.contains(&key(c))) {
                return Err(ForgeError::with_context(
                    context(),
                    format!("index references unknown column '{}'", missing),
                ));
            }
        }

        if let Some(primary) = &self.options.primary_key {
            if let Some(missing) = primary.columns().into_iter().find(|c| !seen.contains(&key(c))) {
                return Err(ForgeError::with_context(
                    context(),
                    format!("primary key references unknown column '{}'", missing),
                ));
            }
        }

        for fk in &self.foreign_keys {
            if fk.columns.len() != fk.referenced_columns.len() {
                return Err(ForgeError::with_context(
                    context(),
                    format!(
                        "foreign key to '{}' has {} local and {} referenced columns",
                        fk.referenced_table,
                        fk.columns.len(),
                        fk.referenced_columns.len()
                    ),
                ));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
