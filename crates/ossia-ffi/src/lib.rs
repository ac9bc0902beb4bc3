//! libossia C API binding.
//!
//! The deletion-callback trampoline and its dispatch table are always built.
//! The raw declarations and [`OssiaBoundary`] need libossia at link time and
//! sit behind the `link` feature.

pub mod dispatch;
mod error;

#[cfg(feature = "link")]
mod native;
#[cfg(feature = "link")]
pub mod sys;

pub use error::{c_index, c_string, FfiError};
#[cfg(feature = "link")]
pub use native::{OssiaBoundary, OssiaNodeArray, OssiaString, RawAddress, RawNode, Registration};
