use ossia_address::{PatternError, ValidationError};
use thiserror::Error;

use crate::types::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {parent:?} already has a child named {name:?}")]
    DuplicateName { parent: NodeId, name: String },
    #[error("invalid node name: {0}")]
    InvalidName(#[from] ValidationError),
    #[error("{0:?} is reserved for endpoint types")]
    ReservedName(String),
    #[error("invalid pattern: {0}")]
    Pattern(#[from] PatternError),
    #[error("no node at {0:?}")]
    NotFound(String),
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("the root node cannot be removed")]
    RootNotRemovable,
    #[error("node {0:?} has no such endpoint")]
    NoSuchEndpoint(NodeId),
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}
