//! Class and file naming
//!
//! Migration files are named `<YYYYMMDDHHMMSS>_<snake_case>.rs`; the stamp
//! doubles as the migration version. Seed files are `<snake_case>.rs`.

use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone};
use dbforge_core::ForgeResult;
use heck::{ToSnakeCase, ToUpperCamelCase};
use regex::Regex;
use walkdir::WalkDir;

/// Length of the version stamp prefix
pub const VERSION_LENGTH: usize = 14;

const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

fn class_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Z][a-z0-9]+)+$").expect("class name pattern is valid")
    })
}

fn migration_file_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]{14})_([a-z0-9_]+)\.rs$").expect("migration file pattern is valid")
    })
}

/// Whether a name is CamelCase: capitalised words of lowercase letters and digits
pub fn is_valid_class_name(name: &str) -> bool {
    class_name_pattern().is_match(name)
}

/// `CreateUsersTable` + version -> `20240101120000_create_users_table.rs`
pub fn class_name_to_file_name(class_name: &str, version: u64) -> String {
    format!("{:014}_{}.rs", version, class_name.to_snake_case())
}

/// `UserSeeder` -> `user_seeder.rs`
pub fn seed_file_name(class_name: &str) -> String {
    format!("{}.rs", class_name.to_snake_case())
}

/// Class name encoded in a migration file name
pub fn file_name_to_class_name(file_name: &str) -> Option<String> {
    migration_file_pattern()
        .captures(file_name)
        .map(|caps| caps[2].to_upper_camel_case())
}

/// Version stamp encoded in a migration file name
pub fn version_from_file_name(file_name: &str) -> Option<u64> {
    migration_file_pattern()
        .captures(file_name)
        .and_then(|caps| caps[1].parse().ok())
}

/// Whether a file name looks like a migration file
pub fn is_migration_file_name(file_name: &str) -> bool {
    migration_file_pattern().is_match(file_name)
}

/// Format a timestamp as a version stamp
pub fn version_at<Tz: TimeZone>(now: &DateTime<Tz>) -> u64
where
    Tz::Offset: std::fmt::Display,
{
    // The format only yields digits
    now.format(VERSION_FORMAT).to_string().parse().unwrap_or(0)
}

/// Migration file names directly inside a directory, sorted
pub fn migration_file_names(dir: &Path) -> ForgeResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            std::io::Error::other(format!("reading {}: {}", dir.display(), e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_migration_file_name(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Whether no migration in the directory normalises to the same class name
pub fn is_unique_migration_class_name(dir: &Path, class_name: &str) -> ForgeResult<bool> {
    let wanted = class_name.to_snake_case();
    Ok(migration_file_names(dir)?
        .iter()
        .filter_map(|name| file_name_to_class_name(name))
        .all(|existing| existing.to_snake_case() != wanted))
}

/// Version for a new migration: the current stamp, bumped past the largest
/// existing version so prefixes strictly increase
pub fn next_version<Tz: TimeZone>(dir: &Path, now: &DateTime<Tz>) -> ForgeResult<u64>
where
    Tz::Offset: std::fmt::Display,
{
    let current = version_at(now);
    let latest = migration_file_names(dir)?
        .iter()
        .filter_map(|name| version_from_file_name(name))
        .max();
    Ok(match latest {
        Some(latest) if latest >= current => latest + 1,
        _ => current,
    })
}
