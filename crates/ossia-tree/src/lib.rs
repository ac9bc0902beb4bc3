//! In-memory native address-space tree.
//!
//! [`LocalDevice`] implements [`ossia_core::Boundary`] without any native
//! library. It backs the test suites and serves as a reference for what the
//! proxy layer expects from a native device.
//!
//! ```
//! use ossia_core::{create_node, find_node, Session};
//! use ossia_tree::LocalDevice;
//!
//! let session = Session::new(LocalDevice::new("demo"));
//! let root = session.wrap(Some(session.boundary().root()));
//! let created = create_node(&root, "/a/b").unwrap();
//! let found = find_node(&root, "/a/b").unwrap();
//! assert_eq!(created.identity(), found.identity());
//! ```

mod arena;
mod device;
mod error;
mod seed;
mod types;

pub use device::{DeviceStats, LocalDevice};
pub use error::TreeError;
pub use seed::TYPE_KEY;
pub use types::{EndpointId, LocalArray, LocalString, NodeId, WatchToken};
