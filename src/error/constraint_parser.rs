use std::sync::OnceLock;

use regex::Regex;

/// Pulls entity/field/value triples out of PostgreSQL constraint messages.
pub struct ConstraintParser;

struct Patterns {
    key_value: Regex,
    column_name: Regex,
    table_name: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Tables owned by this service, longest first so `experiences_user_id_fkey`
/// does not match a shorter prefix.
const KNOWN_TABLES: &[&str] = &["experiences", "users"];

impl ConstraintParser {
    fn patterns() -> &'static Patterns {
        PATTERNS.get_or_init(|| Patterns {
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("valid regex"),
            column_name: Regex::new(r#"column "([^"]+)""#).expect("valid regex"),
            table_name: Regex::new(r#"(?:table|relation) "([^"]+)""#).expect("valid regex"),
        })
    }

    /// Parses a unique violation into `(entity, field, value)`.
    ///
    /// # Examples
    /// ```
    /// use resume_rs::error::ConstraintParser;
    ///
    /// let message = "duplicate key value violates unique constraint \"users_username_key\"\nDETAIL: Key (username)=(alice) already exists.";
    /// let parsed = ConstraintParser::parse_unique_violation(message, Some("users_username_key"));
    /// assert_eq!(parsed, Some(("users".into(), "username".into(), "alice".into())));
    /// ```
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::extract_key_value(message);

        if let Some((entity, field)) = constraint_name.and_then(Self::split_constraint_name) {
            let value = key_value
                .map(|(_, v)| v)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        let (field, value) = key_value?;
        let entity = Self::extract_table(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Parses a not-null violation into `(entity, field)`.
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column(message)?;
        let entity = Self::extract_table(message)
            .or_else(|| constraint_name.and_then(Self::split_constraint_name).map(|(e, _)| e))
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, field))
    }

    /// Parses a foreign key violation into `(entity, field, referenced_value)`.
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let (entity, field) = constraint_name.and_then(Self::split_constraint_name)?;
        let value = Self::extract_key_value(message)
            .map(|(_, v)| v)
            .unwrap_or_else(|| "unknown".to_string());
        Some((entity, format!("{}_id", field), value))
    }

    /// Parses a check violation into `(entity, constraint)`.
    pub fn parse_check_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let constraint = constraint_name?;
        let entity = Self::extract_table(message)
            .or_else(|| Self::split_constraint_name(constraint).map(|(e, _)| e))
            .unwrap_or_else(|| "resource".to_string());
        Some((entity, constraint.to_string()))
    }

    /// Splits names like `users_username_key` or `experiences_user_id_fkey`
    /// into `(table, column)`, dropping the `_id` suffix of FK columns.
    pub fn split_constraint_name(constraint: &str) -> Option<(String, String)> {
        let table = KNOWN_TABLES
            .iter()
            .find(|t| constraint.starts_with(&format!("{}_", t)))?;
        let rest = &constraint[table.len() + 1..];
        let column = ["_key", "_fkey", "_check", "_idx"]
            .iter()
            .find_map(|suffix| rest.strip_suffix(suffix))
            .unwrap_or(rest);
        let column = column.strip_suffix("_id").unwrap_or(column);
        if column.is_empty() {
            return None;
        }
        Some((table.to_string(), column.to_string()))
    }

    fn extract_key_value(message: &str) -> Option<(String, String)> {
        let caps = Self::patterns().key_value.captures(message)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }

    fn extract_column(message: &str) -> Option<String> {
        let caps = Self::patterns().column_name.captures(message)?;
        Some(caps[1].to_string())
    }

    fn extract_table(message: &str) -> Option<String> {
        let caps = Self::patterns().table_name.captures(message)?;
        Some(caps[1].to_string())
    }
}
