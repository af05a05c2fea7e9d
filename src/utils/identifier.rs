//! Human readable record identifiers.
//!
//! Identifiers look like `USER-PROFILE-0f8fad5b-d9cb-469f-a165-70867728950e`:
//! the owning type name in upper kebab case, then a random uuid v4.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

static CASE_BOUNDARY: OnceLock<Regex> = OnceLock::new();

fn case_boundary() -> &'static Regex {
    CASE_BOUNDARY.get_or_init(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"))
}

/// Converts `UserProfile` into `USER-PROFILE`.
///
/// Only a lowercase letter directly followed by an uppercase letter gets a
/// hyphen, so acronyms such as `HTTPServer` stay glued together.
pub fn kebab_prefix(class_name: &str) -> String {
    case_boundary()
        .replace_all(class_name, "$1-$2")
        .to_uppercase()
}

/// Generates a fresh identifier for a record of type `class_name`.
///
/// # Examples
/// ```
/// use resume_rs::utils::identifier::generate_uuid;
///
/// let id = generate_uuid("UserProfile");
/// assert!(id.starts_with("USER-PROFILE-"));
/// ```
pub fn generate_uuid(class_name: &str) -> String {
    format!("{}-{}", kebab_prefix(class_name), Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn split_suffix(id: &str) -> (&str, Uuid) {
        // a hyphenated uuid is always 36 characters
        let (prefix, suffix) = id.split_at(id.len() - 36);
        let uuid = Uuid::parse_str(suffix).expect("suffix should be a uuid");
        (prefix.trim_end_matches('-'), uuid)
    }

    #[test]
    fn test_kebab_prefix() {
        assert_eq!(kebab_prefix("UserProfile"), "USER-PROFILE");
        assert_eq!(kebab_prefix("Experience"), "EXPERIENCE");
        assert_eq!(kebab_prefix("HTTPServer"), "HTTPSERVER");
        assert_eq!(kebab_prefix("aB"), "A-B");
    }

    #[test]
    fn test_generate_uuid_has_v4_suffix() {
        let id = generate_uuid("Experience");
        let (prefix, uuid) = split_suffix(&id);
        assert_eq!(prefix, "EXPERIENCE");
        assert_eq!(uuid.get_version_num(), 4);
    }

    #[test]
    fn test_generate_uuid_unique_over_ten_thousand_samples() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_uuid("UserProfile")).collect();
        assert_eq!(ids.len(), 10_000);
    }

    proptest! {
        #[test]
        fn prop_generated_id_keeps_kebab_prefix(name in "[A-Z][a-z]{1,8}([A-Z][a-z]{1,8}){0,3}") {
            let id = generate_uuid(&name);
            let (prefix, uuid) = split_suffix(&id);
            prop_assert_eq!(prefix, kebab_prefix(&name));
            prop_assert!(prefix.chars().all(|c| c.is_ascii_uppercase() || c == '-'));
            prop_assert_eq!(uuid.get_version_num(), 4);
        }
    }
}
