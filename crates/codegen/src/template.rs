//! # Template Rendering
//!
//! Templates are plain text with `$token` placeholders. Rendering is a
//! single left-to-right pass: at each position the longest matching token
//! is replaced, and the replacement text is never scanned again. A value
//! containing `$className` therefore stays literal.
//!
//! ## Tokens
//!
//! | Token | Value |
//! |---|---|
//! | `$namespaceDefinition` | module header line, empty without a namespace |
//! | `$namespace` | configured module path, empty without one |
//! | `$useClassName` | full path of the implemented trait |
//! | `$className` | generated type name |
//! | `$version` | version stamp (migrations only) |
//! | `$baseClassName` | bare trait name |

use std::collections::BTreeMap;

// ============================================================================
// Token names
// ============================================================================

pub const NAMESPACE_DEFINITION: &str = "$namespaceDefinition";
pub const NAMESPACE: &str = "$namespace";
pub const USE_CLASS_NAME: &str = "$useClassName";
pub const CLASS_NAME: &str = "$className";
pub const VERSION: &str = "$version";
pub const BASE_CLASS_NAME: &str = "$baseClassName";

// ============================================================================
// TokenMap
// ============================================================================

/// Token to replacement text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap {
    tokens: BTreeMap<String, String>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a token
    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), value.into());
        self
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Standard scaffold tokens. `version` is only set for migrations.
    pub fn scaffold(
        namespace: Option<&str>,
        use_class_name: &str,
        class_name: &str,
        version: Option<u64>,
    ) -> Self {
        let base_class_name = use_class_name
            .rsplit("::")
            .next()
            .unwrap_or(use_class_name);

        let mut map = Self::new()
            .with(
                NAMESPACE_DEFINITION,
                namespace
                    .map(|ns| format!("//! Module `{}`", ns))
                    .unwrap_or_default(),
            )
            .with(NAMESPACE, namespace.unwrap_or_default())
            .with(USE_CLASS_NAME, use_class_name)
            .with(CLASS_NAME, class_name)
            .with(BASE_CLASS_NAME, base_class_name);
        if let Some(version) = version {
            map = map.with(VERSION, version.to_string());
        }
        map
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Substitute every token in a single pass, longest token first
pub fn render(template: &str, tokens: &TokenMap) -> String {
    let mut ordered: Vec<(&str, &str)> = tokens
        .tokens
        .iter()
        .filter(|(token, _)| !token.is_empty())
        .map(|(token, value)| (token.as_str(), value.as_str()))
        .collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    'scan: while let Some(c) = rest.chars().next() {
        for (token, value) in &ordered {
            if rest.starts_with(token) {
                out.push_str(value);
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_longest_token_wins() {
        let tokens = TokenMap::new()
            .with("$namespace", "app")
            .with("$namespaceDefinition", "//! Module `app`");
        assert_eq!(
            render("$namespaceDefinition\n$namespace", &tokens),
            "//! Module `app`\napp"
        );
    }

    #[test]
    fn test_replacement_is_not_rescanned() {
        let tokens = TokenMap::new()
            .with("$className", "$version")
            .with("$version", "42");
        assert_eq!(render("$className $version", &tokens), "$version 42");
    }

    #[test]
    fn test_unknown_tokens_and_unicode_pass_through() {
        let tokens = TokenMap::new().with("$className", "Users");
        assert_eq!(render("é $other $className", &tokens), "é $other Users");
    }

    #[test]
    fn test_scaffold_tokens() {
        let tokens = TokenMap::scaffold(None, "dbforge_driver::Migration", "CreateUsers", Some(20240101000000));
        assert_eq!(tokens.get(BASE_CLASS_NAME), Some("Migration"));
        assert_eq!(tokens.get(NAMESPACE_DEFINITION), Some(""));
        assert_eq!(tokens.get(VERSION), Some("20240101000000"));

        let tokens = TokenMap::scaffold(Some("app::seeds"), "dbforge_driver::Seed", "UserSeeder", None);
        assert_eq!(tokens.get(NAMESPACE_DEFINITION), Some("//! Module `app::seeds`"));
        assert_eq!(tokens.get(VERSION), None);
        assert_eq!(tokens.len(), 5);
    }
}
