use serde::{Deserialize, Serialize};

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

/// Normalize `page` / `per_page` query values: page >= 1, per_page in 1..=100.
pub fn page_window(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    (
        Ord::max(page.unwrap_or(1), 1),
        per_page.unwrap_or(20).clamp(1, 100),
    )
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Body of every `PATCH …/status` endpoint.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct StatusUpdateRequest {
    /// Target status; the allowed values depend on the entity.
    #[schema(example = "approved")]
    pub status: String,
}

/// Validate a trimmed name or title of 1 to `max` Unicode characters.
pub fn validate_text(value: &str, field: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Validate a free-text list such as skills or tags.
pub fn validate_tags(tags: &[String], field: &str, max: usize) -> Result<(), AppError> {
    if tags.len() > max {
        return Err(AppError::Validation(format!(
            "Too many {field}: max {max}"
        )));
    }
    if tags.iter().any(|t| t.trim().is_empty() || t.chars().count() > 64) {
        return Err(AppError::Validation(format!(
            "Each of {field} must be 1-64 characters"
        )));
    }
    Ok(())
}
