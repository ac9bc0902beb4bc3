//! OSC address utilities.
//!
//! Helpers for the slash-separated addresses used to name nodes in an
//! OSC-style namespace, plus compilation of address patterns.
//!
//! # Example
//!
//! ```
//! use ossia_address::{parse_address, format_address, Pattern};
//!
//! // Split an address into node names
//! let path = parse_address("/foo/bar");
//! assert_eq!(path, vec!["foo".to_string(), "bar".to_string()]);
//!
//! // Format names back into an address
//! assert_eq!(format_address(&path), "/foo/bar");
//!
//! // Compile a pattern and test a name against one of its segments
//! let pattern = Pattern::parse("/g/.*").unwrap();
//! assert!(pattern.segments()[1].matches("42"));
//! ```

use thiserror::Error;

pub mod pattern;
pub use pattern::{is_pattern, Pattern, PatternError, Segment};

pub mod validate;
pub use validate::{
    is_reserved, sanitize_name, validate_address, validate_name, ValidationError,
    MAX_ADDRESS_LENGTH, MAX_DEPTH,
};

/// The separator between node names.
pub const SEPARATOR: char = '/';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("root address has no parent")]
    NoParent,
    #[error("invalid address: {0}")]
    Invalid(#[from] ValidationError),
}

/// Split an address into node names.
///
/// Empty segments are dropped, so a leading, trailing or doubled `/` does not
/// produce empty names and `""` and `"/"` both denote the starting node.
///
/// # Example
///
/// ```
/// use ossia_address::parse_address;
///
/// assert_eq!(parse_address(""), Vec::<String>::new());
/// assert_eq!(parse_address("/"), Vec::<String>::new());
/// assert_eq!(parse_address("a/b"), vec!["a", "b"]);
/// assert_eq!(parse_address("//a//b/"), vec!["a", "b"]);
/// ```
pub fn parse_address(address: &str) -> Vec<String> {
    address
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Format node names into an absolute address.
///
/// The root is formatted as `/`.
///
/// # Example
///
/// ```
/// use ossia_address::format_address;
///
/// assert_eq!(format_address(&[]), "/");
/// assert_eq!(format_address(&["foo".to_string(), "bar".to_string()]), "/foo/bar");
/// ```
pub fn format_address(path: &[String]) -> String {
    if path.is_empty() {
        return SEPARATOR.to_string();
    }
    let mut out = String::with_capacity(path.iter().map(|s| s.len() + 1).sum());
    for name in path {
        out.push(SEPARATOR);
        out.push_str(name);
    }
    out
}

/// Append a node name to an address.
///
/// # Example
///
/// ```
/// use ossia_address::join;
///
/// assert_eq!(join("/", "a"), "/a");
/// assert_eq!(join("/a/", "b"), "/a/b");
/// ```
pub fn join(address: &str, name: &str) -> String {
    let mut path = parse_address(address);
    path.push(name.to_owned());
    format_address(&path)
}

/// Check if an address starts at the root of a device.
pub fn is_absolute(address: &str) -> bool {
    address.starts_with(SEPARATOR)
}

/// Check if a path denotes the starting node itself.
pub fn is_root(path: &[String]) -> bool {
    path.is_empty()
}

/// Check if `parent` is a strict ancestor of `child`.
///
/// # Example
///
/// ```
/// use ossia_address::is_child;
///
/// let parent = vec!["foo".to_string()];
/// let child = vec!["foo".to_string(), "bar".to_string()];
/// assert!(is_child(&parent, &child));
/// assert!(!is_child(&child, &parent));
/// ```
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child.starts_with(parent)
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns [`AddressError::NoParent`] for the root path.
///
/// # Example
///
/// ```
/// use ossia_address::parent;
///
/// assert_eq!(parent(&["foo".to_string(), "bar".to_string()]).unwrap(), vec!["foo"]);
/// assert!(parent(&[]).is_err());
/// ```
pub fn parent(path: &[String]) -> Result<Vec<String>, AddressError> {
    match path.split_last() {
        Some((_, rest)) => Ok(rest.to_vec()),
        None => Err(AddressError::NoParent),
    }
}

/// Name of the node an address points at, if it is not the root.
pub fn last_name(address: &str) -> Option<&str> {
    address.split(SEPARATOR).filter(|s| !s.is_empty()).last()
}

/// Parse and validate an address in one step.
///
/// # Errors
///
/// Fails if the address is too long, too deep, or contains an invalid name.
pub fn parse_validated(address: &str) -> Result<Vec<String>, AddressError> {
    validate_address(address)?;
    let path = parse_address(address);
    for name in &path {
        validate_name(name)?;
    }
    Ok(path)
}
