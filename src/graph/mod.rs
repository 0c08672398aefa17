//! Task dependency graph.
//!
//! A `TaskDependency` row is an edge `task_id -> dependent_task_id`: the
//! dependent task cannot complete until the prerequisite has. Nothing is
//! cached; each call reads the rows it needs from the store, one lookup at
//! a time.
//!
//! Enrichment is fail-soft. When a referenced task or status cannot be
//! loaded the row is still returned with the display fields left empty,
//! and the failure is kept so eligibility can report it as unknown.

mod eligibility;

use std::collections::HashSet;

use log::{debug, warn};
use thiserror::Error;

use crate::models::{Status, Task, TaskDependency, TaskDependencyDto};
use crate::store::{self, EntityStore, Filter, StoreError, StoreResult};

pub use eligibility::{BlockedTask, CompletionReport, Eligibility};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("A task cannot depend on itself (task {0})")]
    SelfReference(i64),

    #[error("Task with ID {0} not found")]
    MissingTask(i64),

    #[error("Dependency {prerequisite} -> {dependent} would create a cycle")]
    Cycle { prerequisite: i64, dependent: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What enrichment learned about a row's prerequisite task.
#[derive(Debug, Clone, PartialEq)]
enum Prerequisite {
    /// The task loaded; carries its status name, if it has a status.
    Resolved(Option<String>),
    /// A lookup failed; carries the reason.
    Unresolved(String),
}

#[derive(Debug, Clone)]
struct Enriched {
    dto: TaskDependencyDto,
    prerequisite: Prerequisite,
}

pub struct DependencyGraph<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> DependencyGraph<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    pub async fn all_dependencies(&self) -> StoreResult<Vec<TaskDependencyDto>> {
        let rows = store::find::<TaskDependency>(self.store, &Filter::all()).await?;
        debug!("Fetched {} task dependencies", rows.len());
        Ok(self.enrich_all(rows).await.into_iter().map(|e| e.dto).collect())
    }

    pub async fn dependency(&self, dependency_id: i64) -> StoreResult<TaskDependencyDto> {
        let row = store::get::<TaskDependency>(self.store, dependency_id).await?;
        Ok(self.enrich(row).await.dto)
    }

    /// Prerequisites of `task_id`: rows whose `dependent_task_id == task_id`.
    pub async fn dependencies_for(&self, task_id: i64) -> StoreResult<Vec<TaskDependencyDto>> {
        Ok(self
            .prerequisites(task_id)
            .await?
            .into_iter()
            .map(|e| e.dto)
            .collect())
    }

    /// Tasks blocked on `task_id`: rows whose `task_id == task_id`.
    pub async fn dependents_for(&self, task_id: i64) -> StoreResult<Vec<TaskDependencyDto>> {
        let rows =
            store::find::<TaskDependency>(self.store, &Filter::where_equals("task_id", task_id))
                .await?;
        debug!("Fetched {} dependents for task {}", rows.len(), task_id);
        Ok(self.enrich_all(rows).await.into_iter().map(|e| e.dto).collect())
    }

    async fn prerequisites(&self, task_id: i64) -> StoreResult<Vec<Enriched>> {
        let rows = store::find::<TaskDependency>(
            self.store,
            &Filter::where_equals("dependent_task_id", task_id),
        )
        .await?;
        debug!("Fetched {} dependencies for task {}", rows.len(), task_id);
        Ok(self.enrich_all(rows).await)
    }

    async fn enrich_all(&self, rows: Vec<TaskDependency>) -> Vec<Enriched> {
        let mut enriched = Vec::with_capacity(rows.len());
        for row in rows {
            enriched.push(self.enrich(row).await);
        }
        enriched
    }

    async fn enrich(&self, row: TaskDependency) -> Enriched {
        let mut dto = TaskDependencyDto::from(&row);

        let prerequisite = match store::get::<Task>(self.store, row.task_id).await {
            Ok(task) => {
                dto.task_title = Some(task.title);
                dto.task_status_id = task.status_id;
                match task.status_id {
                    None => Prerequisite::Resolved(None),
                    Some(status_id) => match store::get::<Status>(self.store, status_id).await {
                        Ok(status) => {
                            dto.task_status_name = Some(status.name.clone());
                            Prerequisite::Resolved(Some(status.name))
                        }
                        Err(e) => {
                            warn!(
                                "Could not load status {} for dependency {}: {}",
                                status_id, row.dependency_id, e
                            );
                            Prerequisite::Unresolved(format!(
                                "status {} of task {} could not be loaded: {}",
                                status_id, row.task_id, e
                            ))
                        }
                    },
                }
            }
            Err(e) => {
                warn!(
                    "Could not load task {} for dependency {}: {}",
                    row.task_id, row.dependency_id, e
                );
                Prerequisite::Unresolved(format!(
                    "prerequisite task {} could not be loaded: {}",
                    row.task_id, e
                ))
            }
        };

        match store::get::<Task>(self.store, row.dependent_task_id).await {
            Ok(task) => dto.dependent_task_title = Some(task.title),
            Err(e) => warn!(
                "Could not load dependent task {} for dependency {}: {}",
                row.dependent_task_id, row.dependency_id, e
            ),
        }

        Enriched { dto, prerequisite }
    }

    /// Checks that the edge `prerequisite -> dependent` keeps the graph acyclic.
    ///
    /// Both tasks must exist. Walks "blocks" edges depth-first from
    /// `dependent`; reaching `prerequisite` means the new edge would close a
    /// cycle. `ignore` leaves one existing row out of the walk, so an update
    /// is checked against the graph without its old edge.
    pub async fn validate_edge(
        &self,
        prerequisite: i64,
        dependent: i64,
        ignore: Option<i64>,
    ) -> Result<(), GraphError> {
        if prerequisite == dependent {
            return Err(GraphError::SelfReference(prerequisite));
        }
        for task_id in [prerequisite, dependent] {
            match store::get::<Task>(self.store, task_id).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => return Err(GraphError::MissingTask(task_id)),
                Err(e) => return Err(e.into()),
            }
        }

        let mut stack = vec![dependent];
        let mut visited = HashSet::new();
        while let Some(node) = stack.pop() {
            if node == prerequisite {
                return Err(GraphError::Cycle {
                    prerequisite,
                    dependent,
                });
            }
            if !visited.insert(node) {
                continue;
            }
            let edges =
                store::find::<TaskDependency>(self.store, &Filter::where_equals("task_id", node))
                    .await?;
            stack.extend(
                edges
                    .into_iter()
                    .filter(|edge| Some(edge.dependency_id) != ignore)
                    .map(|edge| edge.dependent_task_id)
                    .filter(|next| !visited.contains(next)),
            );
        }
        Ok(())
    }
}
