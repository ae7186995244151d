//! Workflow registry.
//!
//! Built workflows are saved under their name and looked up again by the
//! engine and the request server. `MemStore` keeps them in process memory.

mod mem;

use std::sync::Arc;

use crate::{Result, workflow::Workflow};

pub use mem::MemStore;

/// Trait for workflow registries.
pub trait Storage: Send + Sync {
    /// Saves a workflow under its name, replacing any previous entry.
    fn save(
        &self,
        workflow: Arc<Workflow>,
    ) -> Result<()>;

    /// Finds a workflow by name. Fails with `FlowError::Lookup` when absent.
    fn get(
        &self,
        name: &str,
    ) -> Result<Arc<Workflow>>;

    /// Names of every saved workflow, sorted.
    fn names(&self) -> Vec<String>;
}
