//! Validation helpers for inbound frames.

use validator::ValidationError;

/// Validates a display name: non-blank and at most `max_len` characters.
///
/// # Examples
///
/// ```ignore
/// validate_display_name("Ada", 24)   // Ok
/// validate_display_name("   ", 24)   // Err - blank
/// validate_display_name("Adelheid", 4) // Err - too long
/// ```
pub fn validate_display_name(name: &str, max_len: usize) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("display_name_blank");
        err.message = Some("Display name must not be blank".into());
        return Err(err);
    }

    let len = name.chars().count();
    if len > max_len {
        let mut err = ValidationError::new("display_name_length");
        err.message =
            Some(format!("Display name must be at most {max_len} characters (got {len})").into());
        return Err(err);
    }

    if name.chars().any(char::is_control) {
        let mut err = ValidationError::new("display_name_format");
        err.message = Some("Display name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a room identifier: any non-empty string.
pub fn validate_room_id(room_id: &str) -> Result<(), ValidationError> {
    if room_id.is_empty() {
        let mut err = ValidationError::new("room_id_empty");
        err.message = Some("Room ID must not be empty".into());
        return Err(err);
    }
    Ok(())
}
