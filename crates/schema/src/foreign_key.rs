//! Foreign key definitions

use dbforge_core::ReferentialAction;
use serde::{Deserialize, Serialize};

/// A foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Local columns
    pub columns: Vec<String>,

    /// Referenced table
    pub referenced_table: String,

    /// Referenced columns, matched positionally with `columns`
    pub referenced_columns: Vec<String>,

    /// Action on delete of the referenced row
    pub on_delete: Option<ReferentialAction>,

    /// Action on update of the referenced key
    pub on_update: Option<ReferentialAction>,

    /// Constraint name
    pub constraint: Option<String>,
}

impl ForeignKey {
    /// Reference `table(id)` from the given local column
    pub fn new(column: impl Into<String>, referenced_table: impl Into<String>) -> Self {
        Self {
            columns: vec![column.into()],
            referenced_table: referenced_table.into(),
            referenced_columns: vec!["id".to_string()],
            on_delete: None,
            on_update: None,
            constraint: None,
        }
    }

    /// Reference explicit column lists
    pub fn with_columns<I, S, J, T>(columns: I, referenced_table: impl Into<String>, referenced: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            referenced_table: referenced_table.into(),
            referenced_columns: referenced.into_iter().map(Into::into).collect(),
            on_delete: None,
            on_update: None,
            constraint: None,
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn constraint(mut self, name: impl Into<String>) -> Self {
        self.constraint = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_defaults_to_id() {
        let fk = ForeignKey::new("user_id", "users").on_delete(ReferentialAction::Cascade);
        assert_eq!(fk.columns, vec!["user_id"]);
        assert_eq!(fk.referenced_columns, vec!["id"]);
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(fk.on_update, None);
    }

    #[test]
    fn test_composite_foreign_key() {
        let fk = ForeignKey::with_columns(["tag_id", "post_id"], "tag_posts", ["tag", "post"]);
        assert_eq!(fk.columns.len(), 2);
        assert_eq!(fk.referenced_columns, vec!["tag", "post"]);
    }
}
