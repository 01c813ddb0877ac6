//! Input normalisation shared by the write endpoints.

use crate::error::AppError;

/// Trims; blank becomes `None`.
pub fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// For fields that may be omitted from a patch but never cleared.
pub fn non_blank(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(AppError::validation(format!("{field} cannot be empty"))),
        other => Ok(other),
    }
}

/// Trims entries, drops blanks and case-insensitive duplicates. Order is kept.
pub fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|s| s.eq_ignore_ascii_case(item)) {
            out.push(item.to_string());
        }
    }
    out
}
