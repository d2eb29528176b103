use crate::error::AppError;

pub mod auth_service;
pub mod catalog_service;
pub mod feedback_service;
pub mod order_service;

/// Presence check shared by the create paths: required free-text fields must
/// be non-blank, not merely present in the JSON body.
pub(crate) fn require_text(value: &str, field: &'static str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
