use std::collections::HashSet;

use sea_orm::{Condition, ExprTrait};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, IntoColumnRef, LikeExpr};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Highest page a list endpoint will serve; keeps `(page - 1) * per_page` a valid offset.
pub const MAX_PAGE: u64 = 1_000_000;

/// Normalize `page` / `per_page` query values: 1 <= page <= MAX_PAGE, 1 <= per_page <= 100.
pub fn page_params(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    (
        page.unwrap_or(1).clamp(1, MAX_PAGE),
        per_page.unwrap_or(20).clamp(1, 100),
    )
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Lower-cased `%term%` pattern for case-insensitive contains, or `None` for blank input.
pub fn contains_pattern(raw: &str) -> Option<String> {
    let term = escape_like(raw.trim());
    if term.is_empty() {
        None
    } else {
        Some(format!("%{}%", term.to_lowercase()))
    }
}

/// `lower(col) LIKE %term%`, or `None` when the search term is blank.
pub fn icontains(col: impl IntoColumnRef, raw: &str) -> Option<Condition> {
    contains_pattern(raw).map(|pattern| {
        Condition::all().add(
            Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\')),
        )
    })
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Trimmed value must be `min..=max` characters long.
pub fn validate_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(AppError::field(
            field,
            format!("{field} must be {min}-{max} characters"),
        ));
    }
    Ok(())
}

/// Absolute http(s) URL of at most 200 characters.
pub fn validate_url(field: &'static str, value: &str) -> Result<(), AppError> {
    let value = value.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    let host = rest.map(|r| r.split(['/', '?', '#']).next().unwrap_or(""));
    let valid = matches!(host, Some(h) if !h.is_empty() && !h.starts_with('.'))
        && value.chars().count() <= 200
        && !value.chars().any(char::is_whitespace);
    if !valid {
        return Err(AppError::field(field, format!("{field} must be a valid URL")));
    }
    Ok(())
}

/// Validate an optional nullable URL from a PATCH body.
pub fn validate_optional_url(
    field: &'static str,
    value: &Option<Option<String>>,
) -> Result<(), AppError> {
    if let Some(Some(url)) = value {
        validate_url(field, url)?;
    }
    Ok(())
}

/// Bound the size of an ID list for set-association.
pub fn validate_id_set(ids: &[Uuid], field: &'static str, max: usize) -> Result<(), AppError> {
    if ids.len() > max {
        return Err(AppError::field(field, format!("Too many {field}: max {max}")));
    }
    Ok(())
}

/// Collapse duplicate ids, keeping first-seen order.
pub fn unique_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Trim a nullable text value; blank strings are stored as NULL.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
