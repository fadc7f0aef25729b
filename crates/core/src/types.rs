//! Core types used throughout dbforge
//!
//! This module contains the shared enumerations used by the schema
//! definitions, the SQL builder, the console layer and the scaffolder.

use serde::{Deserialize, Serialize};

// ============================================================================
// Column Types
// ============================================================================

/// Semantic column types supported by table definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Integer; the column limit selects tiny/small/medium/regular widths
    Integer,
    /// 64-bit integer
    BigInteger,
    /// Single precision floating point
    Float,
    /// Fixed-point decimal (precision, scale)
    Decimal,
    /// Variable-length string
    String,
    /// Fixed-length string
    Char,
    /// Long-form text; the column limit selects tiny/medium/long text
    Text,
    /// Boolean true/false
    Boolean,
    /// Date without time
    Date,
    /// Date and time
    DateTime,
    /// Time without date
    Time,
    /// Timestamp
    Timestamp,
    /// Binary data
    Binary,
    /// Enumeration of string values
    Enum,
    /// JSON document
    Json,
    /// Binary JSON document (stored as JSON on MySQL)
    Jsonb,
    /// UUID
    Uuid,
}

impl ColumnType {
    /// Identifier used in definitions and log output
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::BigInteger => "biginteger",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::String => "string",
            ColumnType::Char => "char",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Binary => "binary",
            ColumnType::Enum => "enum",
            ColumnType::Json => "json",
            ColumnType::Jsonb => "jsonb",
            ColumnType::Uuid => "uuid",
        }
    }

    /// Whether the type is numeric and accepts the `signed` attribute
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::BigInteger | ColumnType::Float | ColumnType::Decimal
        )
    }

    /// Whether the type stores character data and accepts charset/collation
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ColumnType::String | ColumnType::Char | ColumnType::Text | ColumnType::Enum
        )
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Referential Actions
// ============================================================================

/// Foreign key referential action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
}

impl ReferentialAction {
    /// SQL keyword(s) for this action
    pub fn to_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
        }
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

// ============================================================================
// Console Types
// ============================================================================

/// Output verbosity, ordered from least to most chatty
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

impl Verbosity {
    /// Map a `-v` occurrence count to a verbosity level
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            2 => Verbosity::VeryVerbose,
            _ => Verbosity::Debug,
        }
    }
}

/// How tagged console messages are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Style tags are rendered (colored when decorated, stripped otherwise)
    #[default]
    Normal,
    /// Message is written verbatim, tags included
    Raw,
    /// Style tags are stripped
    Plain,
}

// ============================================================================
// Scaffolding
// ============================================================================

/// Kind of file produced by the scaffolder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaffoldKind {
    Migration,
    Seed,
}

impl ScaffoldKind {
    /// Lowercase noun used inside messages
    pub fn noun(&self) -> &'static str {
        match self {
            ScaffoldKind::Migration => "migration",
            ScaffoldKind::Seed => "seed",
        }
    }

    /// Plural directory label used in prompts
    pub fn directory_label(&self) -> &'static str {
        match self {
            ScaffoldKind::Migration => "migrations",
            ScaffoldKind::Seed => "seeds",
        }
    }
}

impl std::fmt::Display for ScaffoldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaffoldKind::Migration => write!(f, "Migration"),
            ScaffoldKind::Seed => write!(f, "Seed"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_type_classification() {
        assert!(ColumnType::Decimal.is_numeric());
        assert!(!ColumnType::Text.is_numeric());
        assert!(ColumnType::Enum.is_textual());
        assert!(!ColumnType::Json.is_textual());
        assert_eq!(ColumnType::BigInteger.to_string(), "biginteger");
    }

    #[test]
    fn test_referential_action_sql() {
        assert_eq!(ReferentialAction::SetNull.to_sql(), "SET NULL");
        assert_eq!(ReferentialAction::NoAction.to_string(), "NO ACTION");
    }

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Verbose < Verbosity::Debug);
        assert_eq!(Verbosity::from_occurrences(0), Verbosity::Normal);
        assert_eq!(Verbosity::from_occurrences(2), Verbosity::VeryVerbose);
        assert_eq!(Verbosity::from_occurrences(7), Verbosity::Debug);
    }

    #[test]
    fn test_scaffold_kind_labels() {
        assert_eq!(ScaffoldKind::Migration.to_string(), "Migration");
        assert_eq!(ScaffoldKind::Seed.noun(), "seed");
        assert_eq!(ScaffoldKind::Seed.directory_label(), "seeds");
    }
}
