use std::sync::OnceLock;

use regex::Regex;

use crate::error::{BackendError, Result};

/// Appwrite custom ids: at most 36 chars of `a-zA-Z0-9._-`, no leading special char.
const MAX_ID_LEN: usize = 36;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("id pattern is valid")
    })
}

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid"))
}

/// Checks that `id` can be used as a document or file id.
pub fn validate_id(id: &str) -> Result<()> {
    let reason = if id.is_empty() {
        Some("must not be empty")
    } else if id.len() > MAX_ID_LEN {
        Some("must be at most 36 characters")
    } else if !id_pattern().is_match(id) {
        Some("may only contain a-z, A-Z, 0-9, '.', '-' and '_' and must not start with a special character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(BackendError::InvalidId {
            id: id.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Turns a post title into a slug usable as its document id.
///
/// Lowercases, collapses every run of non-alphanumerics into a single `-`,
/// and truncates to the id length limit.
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let dashed = separator_pattern().replace_all(&lowered, "-");
    let mut slug: String = dashed.trim_matches('-').chars().take(MAX_ID_LEN).collect();

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// A fresh id for accounts and uploaded files.
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Prefixes a bare host with `https://` and strips trailing slashes.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", trimmed.trim_end_matches('/'))
    }
}
