use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::trace;

use crate::{
    FlowError, Result, ShareLock,
    store::Storage,
    workflow::Workflow,
};

/// In-memory workflow registry. No eviction, no versioning.
#[derive(Clone, Default)]
pub struct MemStore {
    workflows: ShareLock<HashMap<String, Arc<Workflow>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            workflows: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Storage for MemStore {
    fn save(
        &self,
        workflow: Arc<Workflow>,
    ) -> Result<()> {
        trace!("store::save({})", workflow.name());
        let mut workflows = self.workflows.write().unwrap_or_else(|e| e.into_inner());
        workflows.insert(workflow.name().to_string(), workflow);
        Ok(())
    }

    fn get(
        &self,
        name: &str,
    ) -> Result<Arc<Workflow>> {
        trace!("store::get({})", name);
        let workflows = self.workflows.read().unwrap_or_else(|e| e.into_inner());
        workflows.get(name).cloned().ok_or_else(|| FlowError::Lookup(format!("workflow '{}' not found", name)))
    }

    fn names(&self) -> Vec<String> {
        let workflows = self.workflows.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<_> = workflows.keys().cloned().collect();
        names.sort();
        names
    }
}
