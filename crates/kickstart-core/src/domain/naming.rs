//! Naming rules for packages, domains and derived identifiers.

use crate::domain::error::TaskError;

const MAX_PACKAGE_NAME_LEN: usize = 214;
const RESERVED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Validate a name against package-registry naming rules.
///
/// Accepts an optional `@scope/` prefix. Both the scope and the bare name must
/// be lowercase, URL-safe and must not start with `.` or `_`.
pub fn validate_package_name(name: &str) -> Result<(), TaskError> {
    let invalid = |reason: &str| Err(TaskError::validation(format!("invalid package name '{name}': {reason}")));

    if name.is_empty() {
        return invalid("name cannot be empty");
    }
    if name.len() > MAX_PACKAGE_NAME_LEN {
        return invalid("name cannot be longer than 214 characters");
    }
    if name.trim() != name {
        return invalid("name cannot have leading or trailing whitespace");
    }
    if RESERVED_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
        return invalid("name is reserved");
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return invalid("name cannot contain capital letters");
    }

    let bare = match name.strip_prefix('@') {
        Some(scoped) => {
            let Some((scope, bare)) = scoped.split_once('/') else {
                return invalid("scoped names must look like @scope/name");
            };
            check_segment(scope).or_else(|reason| invalid(&format!("scope {reason}")))?;
            bare
        }
        None => name,
    };

    check_segment(bare).or_else(|reason| invalid(&reason))
}

fn check_segment(segment: &str) -> Result<(), String> {
    if segment.is_empty() {
        return Err("cannot be empty".into());
    }
    if segment.starts_with('.') {
        return Err("cannot start with a period".into());
    }
    if segment.starts_with('_') {
        return Err("cannot start with an underscore".into());
    }
    if let Some(c) = segment.chars().find(|c| !is_url_safe(*c)) {
        return Err(format!("cannot contain '{c}'"));
    }
    Ok(())
}

fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// A name that contains a dot is treated as a DNS domain.
pub fn is_domain_name(name: &str) -> bool {
    !name.starts_with('@') && name.contains('.')
}

/// Database identifier derived from a project or domain name.
pub fn database_name(name: &str) -> String {
    let mut out: String = name
        .trim_start_matches('@')
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Remote repository name: scoped packages lose the `@` and their slash.
pub fn repository_name(name: &str) -> String {
    name.trim_start_matches('@').replace('/', "-")
}

/// `owner/name` from a clone URL, either `git@host:owner/name.git` or
/// `https://host/owner/name.git`.
pub fn repository_slug(url: &str) -> Option<String> {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/')?.1,
        None => url.split_once(':')?.1,
    };
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut segments = path.rsplit('/');
    let name = segments.next().filter(|s| !s.is_empty())?;
    let owner = segments.next().filter(|s| !s.is_empty())?;
    Some(format!("{owner}/{name}"))
}
