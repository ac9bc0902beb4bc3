//! Validation functions for OSC addresses and node names.

use thiserror::Error;

/// Maximum allowed address string length.
pub const MAX_ADDRESS_LENGTH: usize = 1024;

/// Maximum allowed address depth.
pub const MAX_DEPTH: usize = 256;

/// Characters OSC reserves for address patterns and separators.
const RESERVED: &[char] = &[' ', '#', '*', ',', '/', '?', '[', ']', '{', '}'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty node name")]
    EmptyName,
    #[error("reserved character {0:?} in node name")]
    ReservedCharacter(char),
    #[error("address too long")]
    AddressTooLong,
    #[error("address too deep")]
    AddressTooDeep,
}

/// Check if `c` may not appear in a node name.
pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// Validate a single node name.
///
/// # Errors
///
/// Returns an error if the name is empty or contains a reserved character.
///
/// # Example
///
/// ```
/// use ossia_address::validate_name;
///
/// validate_name("volume").unwrap();
/// validate_name("foo.1").unwrap();
/// validate_name("a b").unwrap_err();
/// validate_name("").unwrap_err();
/// ```
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    match name.chars().find(|c| is_reserved(*c)) {
        Some(c) => Err(ValidationError::ReservedCharacter(c)),
        None => Ok(()),
    }
}

/// Validate the overall shape of an address string.
///
/// Individual names are not checked here; pattern addresses legitimately
/// contain reserved characters.
///
/// # Errors
///
/// Returns an error if the address exceeds [`MAX_ADDRESS_LENGTH`] bytes or
/// [`MAX_DEPTH`] names.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.len() > MAX_ADDRESS_LENGTH {
        return Err(ValidationError::AddressTooLong);
    }
    if address.split('/').filter(|s| !s.is_empty()).count() > MAX_DEPTH {
        return Err(ValidationError::AddressTooDeep);
    }
    Ok(())
}

/// Replace every reserved character of a name with `_`.
///
/// # Example
///
/// ```
/// use ossia_address::sanitize_name;
///
/// assert_eq!(sanitize_name("left gain{1}"), "left_gain_1_");
/// assert_eq!(sanitize_name("ok"), "ok");
/// ```
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if is_reserved(c) { '_' } else { c })
        .collect()
}
