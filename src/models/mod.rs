mod comment;
mod project;
mod status;
mod task;
mod task_dependency;

pub use comment::{Comment, CommentDto, CommentPayload, MAX_CONTENT_LEN};
pub use project::{Project, ProjectDto, ProjectPayload};
pub use status::{LifecycleState, Status, StatusDto, StatusPayload};
pub use task::{Task, TaskDto, TaskPayload, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
pub use task_dependency::{TaskDependency, TaskDependencyDto, TaskDependencyPayload};
