use std::ffi::{c_int, CString, NulError};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FfiError {
    #[error("string contains an interior NUL byte: {0}")]
    InteriorNul(#[from] NulError),
    #[error("child index {0} does not fit a C int")]
    IndexOutOfRange(usize),
}

/// Copy `text` into a NUL-terminated string for a C call.
pub fn c_string(text: &str) -> Result<CString, FfiError> {
    Ok(CString::new(text)?)
}

pub fn c_index(index: usize) -> Result<c_int, FfiError> {
    c_int::try_from(index).map_err(|_| FfiError::IndexOutOfRange(index))
}
