//! Structural checks: required keys per message type.

use crate::error::{ValidationError, ValidationResult};
use crate::message::{Field, Message, MessageType};

/// Check required keys and resolve the message type.
///
/// Fails with `StructureInvalid` when `Type` is missing or unknown, or when
/// any field required for that type is absent.
pub fn check(message: &Message) -> ValidationResult<MessageType> {
    let raw_type = message
        .get(Field::Type)
        .ok_or_else(|| ValidationError::structure("message missing required keys: Type"))?;
    let message_type: MessageType = raw_type.parse()?;

    let missing: Vec<&'static str> = message_type
        .required_fields()
        .iter()
        .filter(|field| !message.contains(**field))
        .map(|field| field.name())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::structure(format!(
            "message missing required keys: {}",
            missing.join(", ")
        )));
    }

    Ok(message_type)
}

/// Whether the message carries every key its type requires.
pub fn has_required_fields(message: &Message) -> bool {
    check(message).is_ok()
}
