//! Dispatch-time consumption of a task's host annotation.

use thiserror::Error;
use tracing::{info, warn};

use crate::cloud::Host;
use crate::resolve::ResolveError;

use super::{HOSTS_ATTRIBUTE, Task, TaskError};

/// Result of running a task on one host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostOutcome {
    /// Host the task ran against.
    pub host: Host,
    /// Outcome reported by the task body.
    pub result: Result<(), TaskError>,
}

/// Per-host outcomes of one dispatch, in host order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DispatchReport {
    /// Name of the dispatched task.
    pub task: String,
    /// One entry per resolved host.
    pub outcomes: Vec<HostOutcome>,
}

impl DispatchReport {
    /// Returns `true` when the task succeeded on every host.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    /// Outcomes whose task body failed.
    pub fn failures(&self) -> impl Iterator<Item = &HostOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }
}

/// Errors that prevent a task from being dispatched at all.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DispatchError {
    /// Raised when the task carries no host annotation.
    #[error("task {task} has no hosts annotation")]
    NoHosts {
        /// Task name.
        task: String,
    },
    /// Raised when the host list cannot be resolved.
    #[error("failed to resolve hosts for task {task}: {source}")]
    Resolve {
        /// Task name.
        task: String,
        /// Resolution failure.
        #[source]
        source: ResolveError,
    },
}

/// Resolves the task's hosts once, then runs the task on each in order.
///
/// The host sequence is materialised before the first run, so a resolution
/// failure means the task runs nowhere. Task failures on individual hosts
/// are recorded in the report and do not stop the remaining hosts.
///
/// # Errors
///
/// Returns [`DispatchError`] when the task has no host annotation or the
/// host sequence fails.
pub fn execute<T: Task + ?Sized>(task: &T) -> Result<DispatchReport, DispatchError> {
    let Some(source) = task.annotation(HOSTS_ATTRIBUTE) else {
        return Err(DispatchError::NoHosts {
            task: task.name().to_owned(),
        });
    };
    let hosts = source
        .hosts()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| DispatchError::Resolve {
            task: task.name().to_owned(),
            source: err,
        })?;
    info!(task = task.name(), count = hosts.len(), "dispatching task");

    let outcomes = hosts
        .into_iter()
        .map(|host| {
            let result = task.run(&host);
            match &result {
                Ok(()) => info!(task = task.name(), %host, "task finished"),
                Err(err) => warn!(task = task.name(), %host, error = %err, "task failed"),
            }
            HostOutcome { host, result }
        })
        .collect();

    Ok(DispatchReport {
        task: task.name().to_owned(),
        outcomes,
    })
}
