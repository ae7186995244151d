//! Workflow engine - the main entry point for Flowgraph.
//!
//! The engine pairs a workflow registry with the tokio runtime that
//! executions run on:
//! - Deploying built workflows into the registry
//! - Executing a deployed workflow by name
//! - Exporting a deployed workflow as a DOT document

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tracing::info;

use crate::{
    Config, Result,
    store::{MemStore, Storage},
    workflow::Workflow,
};

/// The main workflow engine.
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new().build()?;
///
/// let workflow = Workflow::new("add-user");
/// // register nodes and wire edges ...
/// engine.deploy(workflow)?;
///
/// let result = engine.execute("add-user", b"hallo")?;
/// ```
pub struct Engine {
    /// Registry of deployed workflows.
    store: Arc<dyn Storage>,
    /// Tokio runtime that executions run on.
    runtime: Arc<Runtime>,
}

impl Engine {
    pub fn new(
        runtime: Arc<Runtime>,
        store: Arc<dyn Storage>,
    ) -> Self {
        Self {
            store,
            runtime,
        }
    }

    /// Creates a new engine with the given configuration and an in-memory registry.
    pub fn new_with_config(config: Config) -> Result<Self> {
        let runtime = Arc::new(Builder::new_multi_thread().worker_threads(config.async_worker_thread_number.into()).enable_all().build()?);

        Ok(Self::new(runtime, Arc::new(MemStore::new())))
    }

    /// Saves a built workflow into the registry under its name.
    pub fn deploy(
        &self,
        workflow: Workflow,
    ) -> Result<Arc<Workflow>> {
        info!(workflow = workflow.name(), root = ?workflow.root(), "deploy workflow");
        let workflow = Arc::new(workflow);
        self.store.save(workflow.clone())?;
        Ok(workflow)
    }

    /// Looks a deployed workflow up by name.
    pub fn workflow(
        &self,
        name: &str,
    ) -> Result<Arc<Workflow>> {
        self.store.get(name)
    }

    /// Executes a deployed workflow, blocking until it completes.
    ///
    /// Must not be called from inside an async context; use
    /// [`Workflow::execute`] there instead.
    pub fn execute(
        &self,
        name: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let workflow = self.workflow(name)?;
        self.runtime.block_on(workflow.execute(payload.to_vec()))
    }

    /// Renders a deployed workflow as a DOT document.
    pub fn export(
        &self,
        name: &str,
    ) -> Result<Vec<u8>> {
        self.workflow(name)?.export()
    }

    /// Returns the workflow registry.
    pub fn store(&self) -> Arc<dyn Storage> {
        self.store.clone()
    }

    /// Returns the runtime executions run on.
    pub fn runtime(&self) -> Arc<Runtime> {
        self.runtime.clone()
    }
}
