use log::{info, warn};
use serde::Serialize;

use super::{DependencyGraph, Prerequisite};
use crate::models::{LifecycleState, Task};
use crate::store::{self, Filter, StoreResult};

/// Whether a task may be marked complete.
///
/// `Blocked` is certain: at least one prerequisite is known not to be
/// completed. `Unknown` means every prerequisite that could be loaded is
/// completed but at least one could not be loaded. Callers that need a
/// yes/no answer use [`Eligibility::is_eligible`], which treats `Unknown`
/// as not eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Eligibility {
    Eligible,
    Blocked { blocking: Vec<i64> },
    Unknown { reason: String },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub task_id: i64,
    pub can_complete: bool,
    pub eligibility: Eligibility,
}

impl CompletionReport {
    pub fn new(task_id: i64, eligibility: Eligibility) -> Self {
        Self {
            task_id,
            can_complete: eligibility.is_eligible(),
            eligibility,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTask {
    pub task_id: i64,
    pub title: String,
    pub project_id: i64,
    pub status_id: Option<i64>,
    pub eligibility: Eligibility,
}

/// Stored names are compared as-is apart from surrounding whitespace and
/// case; the looser [`LifecycleState::parse`] only applies on write.
fn is_completed(status_name: Option<&str>) -> bool {
    status_name.is_some_and(|name| {
        name.trim()
            .eq_ignore_ascii_case(LifecycleState::Completed.as_str())
    })
}

impl DependencyGraph<'_> {
    /// Evaluates whether every prerequisite of `task_id` is completed.
    ///
    /// Never fails: lookup errors become [`Eligibility::Unknown`].
    pub async fn can_complete(&self, task_id: i64) -> Eligibility {
        let prerequisites = match self.prerequisites(task_id).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not load dependencies of task {}: {}", task_id, e);
                return Eligibility::Unknown {
                    reason: format!("dependencies of task {} could not be loaded: {}", task_id, e),
                };
            }
        };

        let mut blocking = Vec::new();
        let mut unresolved = Vec::new();
        for p in prerequisites {
            match p.prerequisite {
                Prerequisite::Resolved(name) => {
                    if !is_completed(name.as_deref()) && !blocking.contains(&p.dto.task_id) {
                        blocking.push(p.dto.task_id);
                    }
                }
                Prerequisite::Unresolved(reason) => unresolved.push(reason),
            }
        }

        if !blocking.is_empty() {
            Eligibility::Blocked { blocking }
        } else if !unresolved.is_empty() {
            Eligibility::Unknown {
                reason: unresolved.join("; "),
            }
        } else {
            Eligibility::Eligible
        }
    }

    /// Every task that cannot currently be completed, in task id order.
    ///
    /// Tasks are evaluated one after another. A failing evaluation shows up
    /// as an `Unknown` entry; only a failure to list the tasks aborts the scan.
    pub async fn list_blocked_tasks(&self) -> StoreResult<Vec<BlockedTask>> {
        let tasks = store::find::<Task>(self.store, &Filter::all()).await?;
        let total = tasks.len();

        let mut blocked = Vec::new();
        for task in tasks {
            let eligibility = self.can_complete(task.task_id).await;
            if !eligibility.is_eligible() {
                blocked.push(BlockedTask {
                    task_id: task.task_id,
                    title: task.title,
                    project_id: task.project_id,
                    status_id: task.status_id,
                    eligibility,
                });
            }
        }

        info!("Blocked-task scan: {} of {} tasks blocked", blocked.len(), total);
        Ok(blocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::{EntityStore, Table};
    use crate::test_support::*;

    #[tokio::test]
    async fn completion_walkthrough() {
        let store = MemoryStore::new();
        let completed = seed_status(&store, "Completed").await;
        let in_progress = seed_status(&store, "In Progress").await;

        let a = seed_task(&store, "A", Some(completed)).await;
        let b = seed_task(&store, "B", None).await;
        let c = seed_task(&store, "C", None).await;
        let d = seed_task(&store, "D", Some(in_progress)).await;
        seed_dependency(&store, a, b).await;
        seed_dependency(&store, a, c).await;
        let c_on_d = seed_dependency(&store, d, c).await;

        let graph = DependencyGraph::new(&store);
        assert_eq!(graph.can_complete(a).await, Eligibility::Eligible);
        assert_eq!(graph.can_complete(b).await, Eligibility::Eligible);
        assert_eq!(
            graph.can_complete(c).await,
            Eligibility::Blocked { blocking: vec![d] }
        );

        store.delete(Table::TaskDependencies, c_on_d).await.unwrap();
        assert_eq!(graph.can_complete(c).await, Eligibility::Eligible);
    }

    #[tokio::test]
    async fn status_names_compare_case_insensitively() {
        let store = MemoryStore::new();
        // Legacy rows may predate name normalisation.
        let shouting = seed_status(&store, "COMPLETED").await;
        let a = seed_task(&store, "A", Some(shouting)).await;
        let b = seed_task(&store, "B", None).await;
        seed_dependency(&store, a, b).await;

        let graph = DependencyGraph::new(&store);
        assert!(graph.can_complete(b).await.is_eligible());
    }

    #[tokio::test]
    async fn only_the_literal_completed_name_counts() {
        let store = MemoryStore::new();
        let padded = seed_status(&store, " completed ").await;
        let mangled = seed_status(&store, "com_pleted").await;
        let a = seed_task(&store, "A", Some(padded)).await;
        let b = seed_task(&store, "B", Some(mangled)).await;
        let c = seed_task(&store, "C", None).await;
        let d = seed_task(&store, "D", None).await;
        seed_dependency(&store, a, c).await;
        seed_dependency(&store, b, d).await;

        let graph = DependencyGraph::new(&store);
        assert!(graph.can_complete(c).await.is_eligible());
        assert_eq!(
            graph.can_complete(d).await,
            Eligibility::Blocked { blocking: vec![b] }
        );
    }

    #[tokio::test]
    async fn unset_or_free_text_status_blocks() {
        let store = MemoryStore::new();
        let odd = seed_status(&store, "Mostly done").await;
        let a = seed_task(&store, "A", None).await;
        let b = seed_task(&store, "B", Some(odd)).await;
        let c = seed_task(&store, "C", None).await;
        seed_dependency(&store, a, c).await;
        seed_dependency(&store, b, c).await;

        let graph = DependencyGraph::new(&store);
        assert_eq!(
            graph.can_complete(c).await,
            Eligibility::Blocked { blocking: vec![a, b] }
        );
    }

    #[tokio::test]
    async fn lookup_failure_is_unknown_not_blocked() {
        let store = FlakyStore::new();
        let completed = seed_status(&store, "Completed").await;
        let a = seed_task(&store, "A", Some(completed)).await;
        let b = seed_task(&store, "B", None).await;
        seed_dependency(&store, a, b).await;
        store.break_row(Table::Statuses, completed);

        let graph = DependencyGraph::new(&store);
        let eligibility = graph.can_complete(b).await;
        assert!(matches!(eligibility, Eligibility::Unknown { .. }));
        assert!(!eligibility.is_eligible());
    }

    #[tokio::test]
    async fn known_block_wins_over_unknown() {
        let store = FlakyStore::new();
        let a = seed_task(&store, "A", None).await;
        let b = seed_task(&store, "B", None).await;
        let c = seed_task(&store, "C", None).await;
        seed_dependency(&store, a, c).await;
        seed_dependency(&store, b, c).await;
        store.break_row(Table::Tasks, a);

        let graph = DependencyGraph::new(&store);
        assert_eq!(
            graph.can_complete(c).await,
            Eligibility::Blocked { blocking: vec![b] }
        );
    }

    #[tokio::test]
    async fn dependency_listing_failure_is_unknown() {
        let store = FlakyStore::new();
        let a = seed_task(&store, "A", None).await;
        store.break_table(Table::TaskDependencies);

        let graph = DependencyGraph::new(&store);
        assert!(matches!(
            graph.can_complete(a).await,
            Eligibility::Unknown { .. }
        ));
    }

    #[tokio::test]
    async fn scan_returns_exactly_the_ineligible_tasks() {
        let store = FlakyStore::new();
        let completed = seed_status(&store, "Completed").await;
        let a = seed_task(&store, "A", Some(completed)).await;
        let b = seed_task(&store, "B", None).await;
        let c = seed_task(&store, "C", None).await;
        let d = seed_task(&store, "D", None).await;
        seed_dependency(&store, a, b).await;
        seed_dependency(&store, b, c).await;
        seed_dependency(&store, 77, d).await;

        let graph = DependencyGraph::new(&store);
        let blocked = graph.list_blocked_tasks().await.unwrap();
        let ids: Vec<i64> = blocked.iter().map(|t| t.task_id).collect();
        assert_eq!(ids, vec![c, d]);

        for task_id in [a, b, c, d] {
            let eligible = graph.can_complete(task_id).await.is_eligible();
            assert_eq!(!eligible, ids.contains(&task_id));
        }
        assert!(matches!(blocked[1].eligibility, Eligibility::Unknown { .. }));
    }

    #[tokio::test]
    async fn scan_aborts_when_tasks_cannot_be_listed() {
        let store = FlakyStore::new();
        store.break_table(Table::Tasks);
        let graph = DependencyGraph::new(&store);
        assert!(graph.list_blocked_tasks().await.is_err());
    }

    #[tokio::test]
    async fn status_change_releases_dependents() {
        let store = MemoryStore::new();
        let completed = seed_status(&store, "Completed").await;
        let a = seed_task(&store, "A", None).await;
        let b = seed_task(&store, "B", None).await;
        seed_dependency(&store, a, b).await;

        let graph = DependencyGraph::new(&store);
        assert!(!graph.can_complete(b).await.is_eligible());
        set_task_status(&store, a, Some(completed)).await;
        assert!(graph.can_complete(b).await.is_eligible());
    }

    #[test]
    fn report_serialises_state_tag() {
        let report = CompletionReport::new(3, Eligibility::Blocked { blocking: vec![1] });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["taskId"], 3);
        assert_eq!(json["canComplete"], false);
        assert_eq!(json["eligibility"]["state"], "blocked");
        assert_eq!(json["eligibility"]["blocking"][0], 1);
    }
}
