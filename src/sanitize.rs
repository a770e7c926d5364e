//! Utilities for deriving stable group names from repository attribute
//! values.
//!
//! Sanitized values contain only lowercase ASCII alphanumeric characters and
//! underscores, making them usable as Ansible group names regardless of the
//! punctuation, casing, or whitespace present in the upstream metadata store.

/// Sanitizes an attribute value into a stable group-name-safe string.
///
/// Uppercase ASCII letters are folded to lowercase, every maximal run of
/// characters outside `[0-9a-z_]` collapses to a single underscore, and a
/// leading digit is prefixed with an underscore. Empty input passes through
/// unchanged. The transform is idempotent: applying it twice yields the same
/// result as applying it once.
///
/// # Examples
///
/// ```
/// use emdi::sanitize;
///
/// assert_eq!(sanitize("3-Tier App!"), "_3_tier_app_");
/// assert_eq!(sanitize("rhel 8 (x86_64)"), "rhel_8_x86_64_");
/// assert_eq!(sanitize(""), "");
/// ```
pub fn sanitize(input: &str) -> String {
    let mut value = String::with_capacity(input.len() + 1);
    let mut previous_replacement = false;

    for candidate in input.chars() {
        match candidate {
            'a'..='z' | '0'..='9' | '_' => {
                value.push(candidate);
                previous_replacement = false;
            }
            'A'..='Z' => {
                value.push(candidate.to_ascii_lowercase());
                previous_replacement = false;
            }
            _ => {
                if !previous_replacement {
                    value.push('_');
                    previous_replacement = true;
                }
            }
        }
    }

    if value.starts_with(|ch: char| ch.is_ascii_digit()) {
        value.insert(0, '_');
    }

    value
}
