//! # Flowgraph
//!
//! Flowgraph is an embeddable DAG workflow engine written in Rust.
//! A workflow is a graph of named nodes, each wrapping a function from keyed
//! byte inputs to a byte output, and one payload is threaded through the
//! graph from the root to completion.
//!
//! ## Core Features
//!
//! - **Sequential edges**: chain a node's output into the next node
//! - **Conditional edges**: route on the boolean output of a condition node
//! - **Parallel edges**: fan out to concurrent branches and join them at an
//!   aggregate node, keyed by branch name
//! - **Registry and server**: deploy workflows by name and expose `execute`
//!   and `export` over HTTP
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowgraph::{EngineBuilder, Node, Workflow, DATA_KEY};
//!
//! let engine = EngineBuilder::new().build()?;
//!
//! let workflow = Workflow::new("greet");
//! workflow.add_nodes([
//!     Node::new("hello", |p| Ok([b"hello ", &p[DATA_KEY][..]].concat())),
//!     Node::new("shout", |p| Ok(p[DATA_KEY].to_ascii_uppercase())),
//! ]);
//! workflow.add_edge("hello", "shout")?;
//!
//! engine.deploy(workflow)?;
//! let result = engine.execute("greet", b"world")?;
//! ```

mod builder;
mod config;
mod engine;
mod error;
mod server;
mod store;
mod utils;
mod workflow;

use std::sync::{Arc, RwLock};

pub use builder::EngineBuilder;
pub use config::{Config, ServerConfig};
pub use engine::Engine;
pub use error::FlowError;
pub use server::{ExecuteRequest, ExecuteResponse, ExportResponse, Server};
pub use store::{MemStore, Storage};
pub use workflow::{
    Workflow,
    edge::{Edge, EdgeLabel},
    node::{Action, ActionError, ActionResult, DATA_KEY, Node, NodeId, NodeKind, NodeRole, Params, data_params},
};

/// Result type alias for Flowgraph operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
