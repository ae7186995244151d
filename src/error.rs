//! Error types for Flowgraph.
//!
//! All errors in Flowgraph are represented by the `FlowError` enum. Graph
//! construction reports `Validation`, `Cycle` and `Structural` failures,
//! execution reports `Execution`, and the workflow registry reports `Lookup`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::node::NodeId;

/// Unified error type for all Flowgraph operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// An edge references a node that was never registered with the workflow.
    #[error("{0}")]
    Validation(String),

    /// An edge would close a cycle.
    #[error("circular detection from '{from}' to '{to}'")]
    Cycle {
        from: NodeId,
        to: NodeId,
    },

    /// An edge does not fit the shape of the graph built so far.
    #[error("{0}")]
    Structural(String),

    /// A node action failed while the workflow was executing.
    #[error("node '{node}' failed: {message}")]
    Execution {
        node: NodeId,
        message: String,
    },

    /// A workflow name is not present in the registry.
    #[error("{0}")]
    Lookup(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Request server errors.
    #[error("{0}")]
    Server(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl FlowError {
    /// Whether the error means "the thing asked for does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlowError::Lookup(_))
    }
}

impl From<std::io::Error> for FlowError {
    fn from(error: std::io::Error) -> Self {
        FlowError::IoError(error.to_string())
    }
}

impl From<toml::de::Error> for FlowError {
    fn from(error: toml::de::Error) -> Self {
        FlowError::Config(error.to_string())
    }
}
