//! Error types for tree operations
//!
//! Simple, flat error hierarchy. Internal errors mean the adapter and the
//! host engine disagree about the tree's shape; nothing recovers from them.

use crate::arena::FiberId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

/// Application error thrown from (simulated) render code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SimulatedError {
    pub message: String,
}

impl SimulatedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised while reading or querying a render tree
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Fiber not found: {0}")]
    FiberNotFound(FiberId),

    #[error("Internal error: unknown node with tag {0}")]
    UnknownTag(u32),

    #[error("Internal error: fiber {0} has no component type")]
    MissingType(FiberId),

    #[error("Internal error: sibling chain starting at fiber {0} does not terminate")]
    SiblingCycle(FiberId),

    #[error("Internal error: can't figure out how to get Provider from Consumer")]
    UnresolvedProvider,

    #[error("Invalid tag table: tag {0} is assigned to more than one kind")]
    DuplicateTag(u32),

    #[error("Can only set one of `children` or `props.dangerouslySetInnerHTML`.")]
    ConflictingChildren,

    #[error("`{option}` is not supported by the `{mode}` renderer")]
    UnsupportedOption {
        option: &'static str,
        mode: &'static str,
    },

    #[error("Uncaught error: {0}")]
    Uncaught(SimulatedError),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}
