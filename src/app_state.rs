use crate::config::Config;
use crate::graph::DependencyGraph;
use crate::store::EntityStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }

    pub fn graph(&self) -> DependencyGraph<'_> {
        DependencyGraph::new(self.store.as_ref())
    }
}
