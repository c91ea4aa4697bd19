// ============================
// coderoom-backend-lib/src/validation.rs
// ============================
//! Message validation module.

use coderoom_common::ClientMessage;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MAX_ROOM_ID_LENGTH: usize = 64;
const MAX_DISPLAY_NAME_LENGTH: usize = 64;

// Regex patterns for validation
static ROOM_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static DISPLAY_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>/\\{}()\[\];]*$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid room ID: {0}")]
    InvalidRoomId(String),

    #[error("Invalid display name: {0}")]
    InvalidDisplayName(String),

    #[error("Content too large: {got} bytes (limit {limit})")]
    ContentTooLarge { got: usize, limit: usize },
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a room ID
pub fn validate_room_id(room_id: &str) -> ValidationResult<&str> {
    if room_id.is_empty() {
        return Err(ValidationError::InvalidRoomId(
            "Room ID must not be empty".to_string(),
        ));
    }

    if room_id.len() > MAX_ROOM_ID_LENGTH {
        return Err(ValidationError::InvalidRoomId(format!(
            "Room ID must be at most {MAX_ROOM_ID_LENGTH} characters"
        )));
    }

    if !ROOM_ID_REGEX.is_match(room_id) {
        return Err(ValidationError::InvalidRoomId(
            "Room ID must contain only alphanumeric characters, hyphens and underscores"
                .to_string(),
        ));
    }

    Ok(room_id)
}

/// Validate a display name
pub fn validate_display_name(display_name: &str) -> ValidationResult<&str> {
    if display_name.trim().is_empty() {
        return Err(ValidationError::InvalidDisplayName(
            "Display name must not be empty".to_string(),
        ));
    }

    if display_name.len() > MAX_DISPLAY_NAME_LENGTH {
        return Err(ValidationError::InvalidDisplayName(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }

    if !DISPLAY_NAME_REGEX.is_match(display_name) {
        return Err(ValidationError::InvalidDisplayName(
            "Display name contains forbidden characters".to_string(),
        ));
    }

    Ok(display_name)
}

/// Validate a shared-content value against the configured size limit
pub fn validate_content(value: &str, limit: usize) -> ValidationResult<&str> {
    if value.len() > limit {
        return Err(ValidationError::ContentTooLarge {
            got: value.len(),
            limit,
        });
    }

    Ok(value)
}

/// Validate an inbound client message before it reaches the coordinator
pub fn validate_client_message(
    msg: &ClientMessage,
    max_content_bytes: usize,
) -> ValidationResult<()> {
    match msg {
        ClientMessage::Join {
            room_id,
            display_name,
        } => {
            validate_room_id(room_id)?;
            validate_display_name(display_name)?;
        },
        ClientMessage::Leave { room_id } | ClientMessage::GetContent { room_id } => {
            validate_room_id(room_id)?;
        },
        ClientMessage::ContentChange { room_id, value } => {
            validate_room_id(room_id)?;
            validate_content(value, max_content_bytes)?;
        },
    }

    Ok(())
}
