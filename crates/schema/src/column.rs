//! Column definitions
//!
//! This module contains the `Column` struct and its named constructors.
//! A column owns its semantic type plus every attribute the SQL builder
//! needs (nullability, sign, length/precision/scale, defaults).

use dbforge_core::{ColumnType, ForgeError, ForgeResult, Named, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// Size limits
// ============================================================================

pub const TEXT_TINY: u64 = 255;
pub const TEXT_REGULAR: u64 = 65_535;
pub const TEXT_MEDIUM: u64 = 16_777_215;
pub const TEXT_LONG: u64 = 4_294_967_295;

pub const INT_TINY: u64 = 255;
pub const INT_SMALL: u64 = 65_535;
pub const INT_MEDIUM: u64 = 16_777_215;
pub const INT_REGULAR: u64 = 4_294_967_295;
pub const INT_BIG: u64 = u64::MAX;

// ============================================================================
// ColumnDefault
// ============================================================================

/// Default value of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnDefault {
    /// `DEFAULT NULL`
    Null,
    /// Quoted string literal
    Text(String),
    /// Unquoted numeric literal
    Number(String),
    /// Boolean, rendered as 0/1
    Bool(bool),
    /// `DEFAULT CURRENT_TIMESTAMP`
    CurrentTimestamp,
    /// Raw SQL expression, rendered verbatim
    Expression(String),
}

impl From<&str> for ColumnDefault {
    fn from(value: &str) -> Self {
        ColumnDefault::Text(value.to_string())
    }
}

impl From<String> for ColumnDefault {
    fn from(value: String) -> Self {
        ColumnDefault::Text(value)
    }
}

impl From<i64> for ColumnDefault {
    fn from(value: i64) -> Self {
        ColumnDefault::Number(value.to_string())
    }
}

impl From<bool> for ColumnDefault {
    fn from(value: bool) -> Self {
        ColumnDefault::Bool(value)
    }
}

// ============================================================================
// Column
// ============================================================================

/// Represents a table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Semantic type
    pub column_type: ColumnType,

    /// Whether NULL is allowed
    pub nullable: bool,

    /// Whether a numeric column is signed
    pub signed: bool,

    /// Whether a single-column unique index should be created
    pub unique: bool,

    /// Whether the column auto-increments
    pub identity: bool,

    /// Length limit (string/char length, text or integer size)
    pub limit: Option<u64>,

    /// Decimal precision
    pub precision: Option<u32>,

    /// Decimal scale
    pub scale: Option<u32>,

    /// Allowed values of an enum column
    pub values: Vec<String>,

    /// Default value
    pub default: Option<ColumnDefault>,

    /// `ON UPDATE` expression (e.g. `CURRENT_TIMESTAMP`)
    pub update: Option<String>,

    /// Column comment
    pub comment: Option<String>,

    /// Place the column after another one
    pub after: Option<String>,

    /// Column collation
    pub collation: Option<String>,

    /// Column character set
    pub encoding: Option<String>,
}

impl Column {
    /// Create a column with the given name and type and default attributes
    pub fn make(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            signed: true,
            unique: false,
            identity: false,
            limit: None,
            precision: None,
            scale: None,
            values: Vec::new(),
            default: None,
            update: None,
            comment: None,
            after: None,
            collation: None,
            encoding: None,
        }
    }

    // ====================================================================
    // Named constructors
    // ====================================================================

    pub fn big_integer(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::BigInteger)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Binary)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Boolean)
    }

    /// Fixed-length string, 255 characters unless changed with [`limit`](Self::limit)
    pub fn char(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Char).limit(255)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Date)
    }

    pub fn date_time(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::DateTime)
    }

    /// Decimal with precision 8 and scale 2 unless changed with [`with_precision`](Self::with_precision)
    pub fn decimal(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Decimal).with_precision(8, 2)
    }

    /// Enum column restricted to the given values
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut column = Self::make(name, ColumnType::Enum);
        column.values = values.into_iter().map(Into::into).collect();
        column
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Float)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Integer)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Json)
    }

    pub fn jsonb(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Jsonb)
    }

    pub fn long_text(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Text).limit(TEXT_LONG)
    }

    pub fn medium_integer(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Integer).limit(INT_MEDIUM)
    }

    pub fn medium_text(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Text).limit(TEXT_MEDIUM)
    }

    pub fn small_integer(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Integer).limit(INT_SMALL)
    }

    /// Variable-length string, 255 characters unless changed with [`limit`](Self::limit)
    pub fn string(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::String).limit(255)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Text)
    }

    pub fn time(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Time)
    }

    pub fn tiny_integer(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Integer).limit(INT_TINY)
    }

    pub fn unsigned_integer(name: impl Into<String>) -> Self {
        Self::integer(name).unsigned()
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Timestamp)
    }

    pub fn uuid(name: impl Into<String>) -> Self {
        Self::make(name, ColumnType::Uuid)
    }

    // ====================================================================
    // Attribute setters
    // ====================================================================

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.signed = false;
        self
    }

    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn default_value(mut self, default: impl Into<ColumnDefault>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn on_update(mut self, expression: impl Into<String>) -> Self {
        self.update = Some(expression.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn after(mut self, column: impl Into<String>) -> Self {
        self.after = Some(column.into());
        self
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

impl Named for Column {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Validatable for Column {
    fn validate(&self) -> ForgeResult<()> {
        if self.name.trim().is_empty() {
            return Err(ForgeError::with_context(
                "Column definition",
                "column name cannot be empty",
            ));
        }

        if self.column_type == ColumnType::Enum && self.values.is_empty() {
            return Err(ForgeError::with_context(
                format!("Column '{}'", self.name),
                "enum columns need at least one value",
            ));
        }

        if let (Some(precision), Some(scale)) = (self.precision, self.scale) {
            if scale > precision {
                return Err(ForgeError::with_context(
                    format!("Column '{}'", self.name),
                    format!("scale {} exceeds precision {}", scale, precision),
                ));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
