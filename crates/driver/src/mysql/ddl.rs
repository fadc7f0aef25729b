//! MySQL statement builders
//!
//! Pure functions from schema definitions to SQL text. Nothing here talks
//! to a server, which keeps the `CREATE TABLE` rules testable without one.
//!
//! ## `CREATE TABLE` rules
//!
//! 1. Options merge: built-in defaults (`InnoDB`, `utf8_general_ci`), then the
//!    connection's `engine`/`collation`, then the table's own options.
//! 2. Primary key: an explicit key wins. Otherwise an auto-increment
//!    integer column is synthesized (named `id` unless renamed, skipped when
//!    `id = false`), prepended, and made the key.
//! 3. The character set is the collation up to its first underscore.

use dbforge_schema::{
    Column, ColumnDefault, ColumnType, ForeignKey, Index, IndexKind, TableDefinition,
};
use dbforge_schema::column::{
    INT_BIG, INT_MEDIUM, INT_REGULAR, INT_SMALL, INT_TINY, TEXT_LONG, TEXT_MEDIUM, TEXT_REGULAR,
    TEXT_TINY,
};

use crate::config::ConnectionConfig;
use crate::value::Row;

pub const DEFAULT_ENGINE: &str = "InnoDB";
pub const DEFAULT_COLLATION: &str = "utf8_general_ci";

// ============================================================================
// Quoting
// ============================================================================

/// Quote an identifier with backticks, doubling embedded backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a string literal the way the client library escapes it
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '"' => quoted.push_str("\\\""),
            '\0' => quoted.push_str("\\0"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\x1a' => quoted.push_str("\\Z"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| quote_identifier(n))
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Table options
// ============================================================================

/// Table options after merging defaults, connection and table settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub engine: String,
    pub collation: String,
    pub comment: Option<String>,
}

impl ResolvedOptions {
    pub fn resolve(table: &TableDefinition, config: &ConnectionConfig) -> Self {
        let pick = |table: &Option<String>, connection: &Option<String>, default: &str| {
            fn set(value: &Option<String>) -> Option<&str> {
                value.as_deref().filter(|v| !v.is_empty())
            }
            set(table).or(set(connection)).unwrap_or(default).to_string()
        };

        Self {
            engine: pick(&table.options.engine, &config.engine, DEFAULT_ENGINE),
            collation: pick(&table.options.collation, &config.collation, DEFAULT_COLLATION),
            comment: table.options.comment.clone(),
        }
    }

    /// Character set implied by the collation
    pub fn charset(&self) -> &str {
        self.collation
            .split('_')
            .next()
            .unwrap_or(self.collation.as_str())
    }

    /// Trailing table option clause
    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "ENGINE = {} CHARACTER SET {} COLLATE {}",
            self.engine,
            self.charset(),
            self.collation
        );
        if let Some(comment) = &self.comment {
            sql.push_str(&format!(" COMMENT={}", quote_string(comment)));
        }
        sql
    }
}

// ============================================================================
// CREATE TABLE
// ============================================================================

/// The synthesized auto-increment key column, if the table gets one
pub fn synthesized_id_column(table: &TableDefinition) -> Option<Column> {
    table.synthesized_id().map(|name| {
        Column::integer(name)
            .signed(table.options.signed.unwrap_or(true))
            .identity()
    })
}

/// Build the full `CREATE TABLE` statement for a table definition
pub fn create_table_sql(table: &TableDefinition, config: &ConnectionConfig) -> String {
    let options = ResolvedOptions::resolve(table, config);

    let id_column = synthesized_id_column(table);
    let primary_key: Option<Vec<String>> = match (&table.options.primary_key, &id_column) {
        (Some(key), _) => Some(key.columns().into_iter().map(str::to_string).collect()),
        (None, Some(id)) => Some(vec![id.name.clone()]),
        (None, None) => None,
    };

    let mut definitions: Vec<String> = id_column
        .iter()
        .chain(table.columns.iter())
        .map(|column| {
            format!(
                "{} {}",
                quote_identifier(&column.name),
                column_sql_definition(column)
            )
        })
        .collect();

    if let Some(key) = primary_key {
        definitions.push(format!("PRIMARY KEY ({})", quote_list(&key)));
    }
    definitions.extend(table.indexes.iter().map(index_sql_definition));
    definitions.extend(table.foreign_keys.iter().map(foreign_key_sql_definition));

    format!(
        "CREATE TABLE {} ({}) {};",
        quote_identifier(&table.name),
        definitions.join(", "),
        options.to_sql()
    )
}

// ============================================================================
// Columns
// ============================================================================

/// MySQL type of a column, e.g. `VARCHAR(255)` or `INT(11)`
pub fn column_type_sql(column: &Column) -> String {
    match column.column_type {
        ColumnType::String => format!("VARCHAR({})", column.limit.unwrap_or(255)),
        ColumnType::Char => format!("CHAR({})", column.limit.unwrap_or(255)),
        ColumnType::Text => text_type(column.limit).to_string(),
        ColumnType::Integer => integer_type(column.limit),
        ColumnType::BigInteger => "BIGINT(20)".to_string(),
        ColumnType::Float => "FLOAT".to_string(),
        ColumnType::Decimal => match (column.precision, column.scale) {
            (Some(precision), Some(scale)) => format!("DECIMAL({},{})", precision, scale),
            (Some(precision), None) => format!("DECIMAL({})", precision),
            _ => "DECIMAL".to_string(),
        },
        ColumnType::Boolean => "TINYINT(1)".to_string(),
        ColumnType::Date => "DATE".to_string(),
        ColumnType::DateTime => "DATETIME".to_string(),
        ColumnType::Time => "TIME".to_string(),
        ColumnType::Timestamp => "TIMESTAMP".to_string(),
        ColumnType::Binary => "BLOB".to_string(),
        ColumnType::Uuid => "CHAR(36)".to_string(),
        ColumnType::Json | ColumnType::Jsonb => "JSON".to_string(),
        ColumnType::Enum => format!(
            "ENUM({})",
            column
                .values
                .iter()
                .map(|v| quote_string(v))
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

fn text_type(limit: Option<u64>) -> &'static str {
    match limit {
        Some(limit) if limit >= TEXT_LONG => "LONGTEXT",
        Some(limit) if limit >= TEXT_MEDIUM => "MEDIUMTEXT",
        Some(limit) if limit >= TEXT_REGULAR => "TEXT",
        Some(limit) if limit >= TEXT_TINY => "TINYTEXT",
        _ => "TEXT",
    }
}

fn integer_type(limit: Option<u64>) -> String {
    match limit {
        Some(limit) if limit >= INT_BIG => "BIGINT(20)".to_string(),
        Some(limit) if limit >= INT_REGULAR => "INT(11)".to_string(),
        Some(limit) if limit >= INT_MEDIUM => "MEDIUMINT(9)".to_string(),
        Some(limit) if limit >= INT_SMALL => "SMALLINT(6)".to_string(),
        Some(limit) if limit >= INT_TINY => "TINYINT(4)".to_string(),
        // Below the size thresholds the limit is a display width
        Some(limit) => format!("INT({})", limit),
        None => "INT(11)".to_string(),
    }
}

/// Column definition after the quoted name
pub fn column_sql_definition(column: &Column) -> String {
    let mut def = column_type_sql(column);

    if !column.signed && column.column_type.is_numeric() {
        def.push_str(" unsigned");
    }
    if column.column_type.is_textual() {
        if let Some(encoding) = &column.encoding {
            def.push_str(&format!(" CHARACTER SET {}", encoding));
        }
        if let Some(collation) = &column.collation {
            def.push_str(&format!(" COLLATE {}", collation));
        }
    }
    def.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
    if column.identity {
        def.push_str(" AUTO_INCREMENT");
    }
    if let Some(default) = &column.default {
        def.push_str(&format!(" DEFAULT {}", default_sql(default)));
    }
    if let Some(update) = &column.update {
        def.push_str(&format!(" ON UPDATE {}", update));
    }
    if let Some(comment) = &column.comment {
        def.push_str(&format!(" COMMENT {}", quote_string(comment)));
    }
    def
}

fn default_sql(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::Null => "NULL".to_string(),
        ColumnDefault::Text(text) => quote_string(text),
        ColumnDefault::Number(number) => number.clone(),
        ColumnDefault::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        ColumnDefault::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
        ColumnDefault::Expression(expr) => expr.clone(),
    }
}

/// `ALTER TABLE ... ADD` statement, the only place `AFTER` applies
pub fn add_column_sql(table: &str, column: &Column) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD {} {}",
        quote_identifier(table),
        quote_identifier(&column.name),
        column_sql_definition(column)
    );
    if let Some(after) = &column.after {
        sql.push_str(&format!(" AFTER {}", quote_identifier(after)));
    }
    sql.push(';');
    sql
}

// ============================================================================
// Indexes and foreign keys
// ============================================================================

pub fn index_sql_definition(index: &Index) -> String {
    let mut def = match index.kind {
        IndexKind::Index => String::from("KEY"),
        IndexKind::Unique => String::from("UNIQUE KEY"),
        IndexKind::Fulltext => String::from("FULLTEXT KEY"),
    };
    if let Some(name) = &index.name {
        def.push(' ');
        def.push_str(&quote_identifier(name));
    }

    let columns = index
        .columns
        .iter()
        .map(|column| match index.limit {
            Some(limit) => format!("{}({})", quote_identifier(column), limit),
            None => quote_identifier(column),
        })
        .collect::<Vec<_>>()
        .join(",");
    def.push_str(&format!(" ({})", columns));
    def
}

pub fn foreign_key_sql_definition(foreign_key: &ForeignKey) -> String {
    let mut def = String::new();
    if let Some(constraint) = &foreign_key.constraint {
        def.push_str(&format!("CONSTRAINT {} ", quote_identifier(constraint)));
    }
    def.push_str(&format!(
        "FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_list(&foreign_key.columns),
        quote_identifier(&foreign_key.referenced_table),
        quote_list(&foreign_key.referenced_columns)
    ));
    if let Some(action) = foreign_key.on_delete {
        def.push_str(&format!(" ON DELETE {}", action.to_sql()));
    }
    if let Some(action) = foreign_key.on_update {
        def.push_str(&format!(" ON UPDATE {}", action.to_sql()));
    }
    def
}

// ============================================================================
// Other statements
// ============================================================================

pub fn drop_table_sql(name: &str) -> String {
    format!("DROP TABLE {};", quote_identifier(name))
}

pub fn rename_table_sql(from: &str, to: &str) -> String {
    format!(
        "RENAME TABLE {} TO {};",
        quote_identifier(from),
        quote_identifier(to)
    )
}

pub fn truncate_table_sql(name: &str) -> String {
    format!("TRUNCATE TABLE {};", quote_identifier(name))
}

/// Query used by `has_table`; binds schema name then table name
pub const HAS_TABLE_SQL: &str = "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?";

/// `INSERT` statements for a batch of rows.
///
/// Consecutive rows with the same columns share one multi-row statement.
pub fn insert_sql(table: &str, rows: &[Row]) -> Vec<String> {
    let mut statements = Vec::new();
    let mut start = 0;

    while start < rows.len() {
        let columns: Vec<&str> = rows[start].columns().collect();
        let end = rows[start..]
            .iter()
            .position(|row| row.columns().ne(columns.iter().copied()))
            .map_or(rows.len(), |offset| start + offset);

        let values = rows[start..end]
            .iter()
            .map(|row| {
                let literals = row
                    .values()
                    .map(|v| v.to_sql_literal())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({})", literals)
            })
            .collect::<Vec<_>>()
            .join(", ");

        let column_list = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        statements.push(format!(
            "INSERT INTO {} ({}) VALUES {};",
            quote_identifier(table),
            column_list,
            values
        ));
        start = end;
    }

    statements
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dbforge_schema::ReferentialAction;
    use pretty_assertions::assert_eq;

    fn config() -> ConnectionConfig {
        ConnectionConfig {
            name: "app".to_string(),
            ..ConnectionConfig::default()
        }
    }

    #[test]
    fn test_create_table_with_defaults() {
        let table = TableDefinition::new("users").add_column(Column::string("email"));
        assert_eq!(
            create_table_sql(&table, &config()),
            "CREATE TABLE `users` (`id` INT(11) NOT NULL AUTO_INCREMENT, \
             `email` VARCHAR(255) NOT NULL, PRIMARY KEY (`id`)) \
             ENGINE = InnoDB CHARACTER SET utf8 COLLATE utf8_general_ci;"
        );
    }

    #[test]
    fn test_table_collation_sets_charset() {
        let table = TableDefinition::new("posts")
            .collation("utf8mb4_unicode_ci")
            .add_column(Column::text("body"));
        let sql = create_table_sql(&table, &config());
        assert!(sql.ends_with("ENGINE = InnoDB CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;"));
    }

    #[test]
    fn test_connection_options_sit_between_defaults_and_table() {
        let config = ConnectionConfig {
            engine: Some("MyISAM".to_string()),
            collation: Some("latin1_swedish_ci".to_string()),
            ..config()
        };
        let table = TableDefinition::new("logs").id(false).add_column(Column::text("line"));
        assert!(create_table_sql(&table, &config)
            .ends_with("ENGINE = MyISAM CHARACTER SET latin1 COLLATE latin1_swedish_ci;"));

        let table = table.engine("InnoDB");
        assert!(create_table_sql(&table, &config).contains("ENGINE = InnoDB CHARACTER SET latin1"));
    }

    #[test]
    fn test_empty_table_option_falls_back_to_connection() {
        let config = ConnectionConfig {
            engine: Some("MyISAM".to_string()),
            collation: Some(String::new()),
            ..config()
        };
        let table = TableDefinition::new("logs").engine("").collation("");
        let resolved = ResolvedOptions::resolve(&table, &config);

        assert_eq!(resolved.engine, "MyISAM");
        assert_eq!(resolved.collation, DEFAULT_COLLATION);
    }

    #[test]
    fn test_named_unsigned_id() {
        let table = TableDefinition::new("users").id("user_id").signed(false);
        assert_eq!(
            create_table_sql(&table, &config()),
            "CREATE TABLE `users` (`user_id` INT(11) unsigned NOT NULL AUTO_INCREMENT, \
             PRIMARY KEY (`user_id`)) \
             ENGINE = InnoDB CHARACTER SET utf8 COLLATE utf8_general_ci;"
        );
    }

    #[test]
    fn test_id_disabled_has_no_primary_key() {
        let table = TableDefinition::new("events")
            .id(false)
            .add_column(Column::string("name"));
        let sql = create_table_sql(&table, &config());
        assert!(sql.starts_with("CREATE TABLE `events` (`name` VARCHAR(255) NOT NULL) ENGINE"));
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_composite_primary_key_disables_id() {
        let table = TableDefinition::new("taggings")
            .primary_key(vec!["tag_id", "post_id"])
            .add_column(Column::integer("tag_id"))
            .add_column(Column::integer("post_id"));
        let sql = create_table_sql(&table, &config());
        assert!(!sql.contains("`id`"));
        assert!(sql.contains("`post_id` INT(11) NOT NULL, PRIMARY KEY (`tag_id`,`post_id`))"));
    }

    #[test]
    fn test_comment_is_quoted_and_statement_is_terminated() {
        let table = TableDefinition::new("users").comment("It's users");
        let sql = create_table_sql(&table, &config());
        assert!(sql.ends_with("COLLATE utf8_general_ci COMMENT='It\\'s users';"));
    }

    #[test]
    fn test_indexes_and_foreign_keys_follow_primary_key() {
        let table = TableDefinition::new("posts")
            .add_column(Column::string("slug").unique())
            .add_column(Column::integer("user_id"))
            .add_index(Index::new(["user_id"]).named("idx_user"))
            .add_foreign_key(
                ForeignKey::new("user_id", "users")
                    .on_delete(ReferentialAction::Cascade)
                    .constraint("fk_posts_user"),
            );
        let sql = create_table_sql(&table, &config());
        assert!(sql.contains(
            "PRIMARY KEY (`id`), UNIQUE KEY (`slug`), KEY `idx_user` (`user_id`), \
             CONSTRAINT `fk_posts_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE)"
        ));
    }

    #[test]
    fn test_column_types() {
        assert_eq!(column_type_sql(&Column::tiny_integer("a")), "TINYINT(4)");
        assert_eq!(column_type_sql(&Column::small_integer("a")), "SMALLINT(6)");
        assert_eq!(column_type_sql(&Column::medium_integer("a")), "MEDIUMINT(9)");
        assert_eq!(column_type_sql(&Column::big_integer("a")), "BIGINT(20)");
        assert_eq!(column_type_sql(&Column::text("a")), "TEXT");
        assert_eq!(column_type_sql(&Column::medium_text("a")), "MEDIUMTEXT");
        assert_eq!(column_type_sql(&Column::long_text("a")), "LONGTEXT");
        assert_eq!(column_type_sql(&Column::decimal("a")), "DECIMAL(8,2)");
        assert_eq!(column_type_sql(&Column::boolean("a")), "TINYINT(1)");
        assert_eq!(column_type_sql(&Column::uuid("a")), "CHAR(36)");
        assert_eq!(column_type_sql(&Column::jsonb("a")), "JSON");
        assert_eq!(
            column_type_sql(&Column::enumeration("a", ["x", "y"])),
            "ENUM('x','y')"
        );
    }

    #[test]
    fn test_column_attributes_order() {
        let column = Column::timestamp("updated_at")
            .nullable()
            .default_value(ColumnDefault::CurrentTimestamp)
            .on_update("CURRENT_TIMESTAMP")
            .comment("touched");
        assert_eq!(
            column_sql_definition(&column),
            "TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP COMMENT 'touched'"
        );

        let column = Column::string("name").encoding("utf8mb4").collation("utf8mb4_bin");
        assert_eq!(
            column_sql_definition(&column),
            "VARCHAR(255) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL"
        );

        let column = Column::integer("n").collation("utf8mb4_bin");
        assert_eq!(column_sql_definition(&column), "INT(11) NOT NULL");
    }

    #[test]
    fn test_unsigned_only_applies_to_numbers() {
        assert_eq!(
            column_sql_definition(&Column::unsigned_integer("n")),
            "INT(11) unsigned NOT NULL"
        );
        assert_eq!(
            column_sql_definition(&Column::string("s").unsigned()),
            "VARCHAR(255) NOT NULL"
        );
    }

    #[test]
    fn test_add_column_after() {
        let column = Column::string("nickname").nullable().after("email");
        assert_eq!(
            add_column_sql("users", &column),
            "ALTER TABLE `users` ADD `nickname` VARCHAR(255) NULL AFTER `email`;"
        );
    }

    #[test]
    fn test_index_prefix_limit() {
        let index = Index::fulltext(["title", "body"]).limit(10);
        assert_eq!(index_sql_definition(&index), "FULLTEXT KEY (`title`(10),`body`(10))");
    }

    #[test]
    fn test_identifier_quoting() {
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(quote_string("a\\b\n"), "'a\\\\b\\n'");
    }

    #[test]
    fn test_insert_groups_rows_by_columns() {
        let rows = vec![
            Row::new().set("name", "a").set("rank", 1),
            Row::new().set("name", "b").set("rank", 2),
            Row::new().set("name", "c"),
        ];
        assert_eq!(
            insert_sql("users", &rows),
            vec![
                "INSERT INTO `users` (`name`, `rank`) VALUES ('a', 1), ('b', 2);".to_string(),
                "INSERT INTO `users` (`name`) VALUES ('c');".to_string(),
            ]
        );
        assert!(insert_sql("users", &[]).is_empty());
    }

    #[test]
    fn test_simple_statements() {
        assert_eq!(drop_table_sql("users"), "DROP TABLE `users`;");
        assert_eq!(rename_table_sql("a", "b"), "RENAME TABLE `a` TO `b`;");
        assert_eq!(truncate_table_sql("users"), "TRUNCATE TABLE `users`;");
    }
}
