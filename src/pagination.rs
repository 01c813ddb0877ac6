use serde::Serialize;

use crate::config::AppConfig;

/// Paging bounds taken from config.
#[derive(Debug, Clone, Copy)]
pub struct ListLimits {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl ListLimits {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            default_limit: cfg.default_page_limit,
            max_limit: cfg.max_page_limit,
        }
    }
}

/// A clamped page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Missing or zero limit falls back to the default; anything else is
    /// clamped into `1..=max_limit`. Pages below 1 become 1.
    pub fn new(page: Option<i64>, limit: Option<i64>, limits: ListLimits) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .filter(|l| *l != 0)
            .unwrap_or(limits.default_limit)
            .clamp(1, limits.max_limit.max(1));
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(req: PageRequest, total: i64, items: Vec<T>) -> Self {
        Self {
            total,
            page: req.page,
            limit: req.limit,
            items,
        }
    }
}

/// `ILIKE` pattern matching `needle` as a literal substring.
pub fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// Trims a free-text search term; blank means no filter.
pub fn search_term(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
}
