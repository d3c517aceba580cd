//! Query-language clause construction.
//!
//! Small helpers for composing tracker search queries: time-range clauses
//! over a [`TimeWindow`], AND-composition, and sanitising saved filters
//! before extra clauses are appended.

use crate::models::TimeWindow;

/// Render a time-range clause: `field during ("from", "to")`.
///
/// The tracker expects `yyyy/MM/dd HH:mm` timestamps.
pub fn time_range_clause(field: &str, window: &TimeWindow) -> String {
    const FORMAT: &str = "%Y/%m/%d %H:%M";
    format!(
        "{} during (\"{}\", \"{}\")",
        field,
        window.start.format(FORMAT),
        window.end.format(FORMAT)
    )
}

/// Join non-empty clauses with ` AND `, each parenthesised.
pub fn and_clauses<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(|p| format!("({})", p))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Remove a trailing `ORDER BY` clause (case-insensitive, word-boundary
/// aware) from a saved-filter query.
pub fn strip_order_by(query: &str) -> String {
    let lowered = query.to_lowercase();
    let bytes = lowered.as_bytes();

    let mut search_from = 0;
    while let Some(relative) = lowered[search_from..].find("order") {
        let start = search_from + relative;
        search_from = start + 1;

        // Word boundary before "order".
        if start > 0 && !bytes[start - 1].is_ascii_whitespace() {
            continue;
        }

        // "order" then whitespace then "by" then a boundary.
        let rest = &lowered[start + 5..];
        let trimmed = rest.trim_start();
        if !trimmed.starts_with("by") {
            continue;
        }
        if rest.len() == trimmed.len() {
            // No whitespace between the words.
            continue;
        }
        let after_by = &trimmed[2..];
        if !after_by.is_empty() && !after_by.starts_with(char::is_whitespace) {
            continue;
        }

        return query[..start].trim().to_string();
    }

    query.trim().to_string()
}

/// AND a saved base filter (sanitised) with an extra clause. An empty base
/// passes the extra clause through unchanged.
pub fn wrap_filter(base_filter: &str, extra: &str) -> String {
    if base_filter.trim().is_empty() {
        return extra.to_string();
    }
    let sanitized = strip_order_by(base_filter);
    and_clauses(&[sanitized.as_str(), extra])
}
