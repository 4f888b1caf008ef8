//! Input validation for untrusted request data.
//!
//! Layout names go through `seating_core::normalize_layout_name`; this
//! module covers the rest of what a request may carry.

use seating_core::ElementId;
use thiserror::Error;

/// Maximum elements per stored layout.
pub const MAX_ELEMENTS_PER_LAYOUT: usize = 10_000;
/// Maximum guest name length, in characters.
pub const MAX_GUEST_NAME_LEN: usize = 256;

/// Validation error types.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Too many elements in a layout.
    #[error("too many elements (max {MAX_ELEMENTS_PER_LAYOUT})")]
    TooManyElements,
    /// Guest name exceeds maximum length.
    #[error("guest name too long (max {MAX_GUEST_NAME_LEN} chars)")]
    GuestNameTooLong,
    /// Guest name contains control characters.
    #[error("guest name contains invalid characters")]
    GuestNameInvalidChars,
    /// Seat id is not a valid element id.
    #[error("invalid seat id: {0:?}")]
    InvalidSeatId(String),
}

/// Validate the element count of a layout.
///
/// # Errors
///
/// Returns [`ValidationError::TooManyElements`] if the count exceeds the limit.
pub fn validate_element_count(count: usize) -> Result<(), ValidationError> {
    if count > MAX_ELEMENTS_PER_LAYOUT {
        return Err(ValidationError::TooManyElements);
    }
    Ok(())
}

/// Validate a guest name. Empty names are allowed and mean "unassign".
///
/// # Errors
///
/// Returns [`ValidationError::GuestNameTooLong`] or
/// [`ValidationError::GuestNameInvalidChars`].
pub fn validate_guest_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_GUEST_NAME_LEN {
        return Err(ValidationError::GuestNameTooLong);
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::GuestNameInvalidChars);
    }
    Ok(())
}

/// Parse a seat id.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidSeatId`] if `id` is blank.
pub fn parse_seat_id(id: &str) -> Result<ElementId, ValidationError> {
    ElementId::from_stored(id).ok_or_else(|| ValidationError::InvalidSeatId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        assert!(validate_element_count(0).is_ok());
        assert!(validate_element_count(MAX_ELEMENTS_PER_LAYOUT).is_ok());
        assert!(validate_element_count(MAX_ELEMENTS_PER_LAYOUT + 1).is_err());
    }

    #[test]
    fn test_guest_names() {
        assert!(validate_guest_name("").is_ok());
        assert!(validate_guest_name("Zoë Ångström").is_ok());
        assert!(validate_guest_name(&"x".repeat(MAX_GUEST_NAME_LEN)).is_ok());
        assert!(validate_guest_name(&"x".repeat(MAX_GUEST_NAME_LEN + 1)).is_err());
        assert!(validate_guest_name("tab\there").is_err());
    }

    #[test]
    fn test_seat_ids() {
        let id = ElementId::new();
        assert_eq!(parse_seat_id(&id.to_string()).expect("valid"), id);
        assert_eq!(parse_seat_id("42").ok(), ElementId::from_stored("42"));
        assert!(parse_seat_id("").is_err());
        assert!(parse_seat_id("   ").is_err());
    }

    #[test]
    fn test_error_messages() {
        assert!(ValidationError::TooManyElements.to_string().contains("10000"));
        assert!(ValidationError::GuestNameTooLong.to_string().contains("256"));
    }
}
