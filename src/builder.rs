use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::{Engine, Result, store::{MemStore, Storage}};

pub struct EngineBuilder {
    async_worker_thread_number: u16,
    rt: Option<Arc<Runtime>>,
    store: Option<Arc<dyn Storage>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            async_worker_thread_number: 16,
            rt: None,
            store: None,
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn async_worker_thread_number(
        mut self,
        n: u16,
    ) -> Self {
        self.async_worker_thread_number = n;
        self
    }

    pub fn runtime(
        mut self,
        runtime: Arc<Runtime>,
    ) -> Self {
        self.rt = Some(runtime);
        self
    }

    /// Uses `store` as the workflow registry instead of a fresh [`MemStore`].
    pub fn store(
        mut self,
        store: Arc<dyn Storage>,
    ) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(&self) -> Result<Engine> {
        let runtime = match &self.rt {
            Some(rt) => rt.clone(),
            None => Arc::new(Builder::new_multi_thread().worker_threads(self.async_worker_thread_number.max(1).into()).enable_all().build()?),
        };
        let store = self.store.clone().unwrap_or_else(|| Arc::new(MemStore::new()));

        Ok(Engine::new(runtime, store))
    }
}
