//! Style tags: `<info>`, `<comment>`, `<error>`, `<question>`
//!
//! Tags nest; `</>` closes the innermost open tag. Anything that is not one
//! of the four tags is left alone.

use std::sync::OnceLock;

use colored::Colorize;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Info,
    Comment,
    Error,
    Question,
}

impl Style {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "info" => Some(Style::Info),
            "comment" => Some(Style::Comment),
            "error" => Some(Style::Error),
            "question" => Some(Style::Question),
            _ => None,
        }
    }

    fn apply(self, text: &str) -> String {
        match self {
            Style::Info => text.green().to_string(),
            Style::Comment => text.yellow().to_string(),
            Style::Error => text.white().on_red().to_string(),
            Style::Question => text.black().on_cyan().to_string(),
        }
    }
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"</?(info|comment|error|question)>|</>").expect("tag pattern is valid")
    })
}

/// Render tags as colors when `decorated`, otherwise strip them
pub fn format(message: &str, decorated: bool) -> String {
    let mut out = String::with_capacity(message.len());
    let mut stack: Vec<Style> = Vec::new();
    let mut last = 0;

    for found in tag_pattern().find_iter(message) {
        push_text(&mut out, &message[last..found.start()], stack.last().copied(), decorated);
        last = found.end();

        let tag = found.as_str();
        if tag.starts_with("</") {
            stack.pop();
        } else if let Some(style) = Style::from_tag(&tag[1..tag.len() - 1]) {
            stack.push(style);
        }
    }
    push_text(&mut out, &message[last..], stack.last().copied(), decorated);
    out
}

/// Remove every style tag
pub fn strip(message: &str) -> String {
    format(message, false)
}

fn push_text(out: &mut String, text: &str, style: Option<Style>, decorated: bool) {
    if text.is_empty() {
        return;
    }
    match style {
        Some(style) if decorated => out.push_str(&style.apply(text)),
        _ => out.push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip(" == <info>UserSeeder:</info> <comment>seeding</comment>"),
            " == UserSeeder: seeding"
        );
        assert_eq!(strip("<error>nested <info>x</></error>"), "nested x");
    }

    #[test]
    fn test_unknown_tags_are_kept() {
        assert_eq!(strip("<bold>a</bold> <b>"), "<bold>a</bold> <b>");
        assert_eq!(strip("Vec<String>"), "Vec<String>");
    }

    #[test]
    fn test_decorated_keeps_text() {
        let rendered = format("<info>created</info> file.rs", true);
        assert!(rendered.contains("created"));
        assert!(rendered.ends_with(" file.rs"));
        assert!(!rendered.contains("<info>"));
    }
}
