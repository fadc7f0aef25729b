//! Index definitions

use serde::{Deserialize, Serialize};

/// Kind of index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexKind {
    #[default]
    Index,
    Unique,
    Fulltext,
}

/// An index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Indexed columns, in key order
    pub columns: Vec<String>,

    /// Index kind
    pub kind: IndexKind,

    /// Explicit index name
    pub name: Option<String>,

    /// Prefix length applied to every indexed column
    pub limit: Option<u32>,
}

impl Index {
    /// Create a plain index over the given columns
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            kind: IndexKind::Index,
            name: None,
            limit: None,
        }
    }

    /// Create a unique index over the given columns
    pub fn unique<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns).kind(IndexKind::Unique)
    }

    /// Create a fulltext index over the given columns
    pub fn fulltext<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns).kind(IndexKind::Fulltext)
    }

    pub fn kind(mut self, kind: IndexKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether this index covers exactly the given single column
    pub fn covers_only(&self, column: &str) -> bool {
        self.columns.len() == 1 && self.columns[0] == column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_builders() {
        let index = Index::unique(["email"]).named("users_email_unique");
        assert_eq!(index.kind, IndexKind::Unique);
        assert_eq!(index.name.as_deref(), Some("users_email_unique"));
        assert!(index.covers_only("email"));

        let index = Index::fulltext(["title", "body"]);
        assert_eq!(index.kind, IndexKind::Fulltext);
        assert!(!index.covers_only("title"));
    }
}
