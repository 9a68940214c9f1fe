//! Task descriptors that carry a deferred host list.
//!
//! A task is annotated by wrapping it in [`Annotated`], which keeps the task
//! itself untouched and stores named [`HostSource`]s next to it. The host
//! list lives under [`HOSTS_ATTRIBUTE`]; [`execute`] reads it at dispatch
//! time. Annotating never pulls from the source.

mod dispatch;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::cloud::{
    Connector, Host, HostnameAttribute, LogicalResourceId, Region, ScalingGroupName, StackName,
};
use crate::resolve::{GroupHosts, HostSource, Hosts, StackHosts};

pub use dispatch::{DispatchError, DispatchReport, HostOutcome, execute};

/// Attribute name under which a task's target hosts are stored.
pub const HOSTS_ATTRIBUTE: &str = "hosts";

/// Raised by a task body that failed on one host.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{message}")]
pub struct TaskError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl TaskError {
    /// Creates an error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A unit of work the dispatcher runs once per target host.
pub trait Task {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Runs the task against `host`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] when the work failed on this host.
    fn run(&self, host: &Host) -> Result<(), TaskError>;

    /// Returns the host source stored under `attribute`, if any.
    fn annotation(&self, _attribute: &str) -> Option<Rc<dyn HostSource>> {
        None
    }
}

/// Plain closure task.
#[derive(Clone)]
pub struct FnTask<F> {
    name: String,
    body: F,
}

impl<F> FnTask<F>
where
    F: Fn(&Host) -> Result<(), TaskError>,
{
    /// Wraps `body` under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> fmt::Debug for FnTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<F> Task for FnTask<F>
where
    F: Fn(&Host) -> Result<(), TaskError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, host: &Host) -> Result<(), TaskError> {
        (self.body)(host)
    }
}

/// A task plus its named host sources.
#[derive(Clone)]
pub struct Annotated<T> {
    task: T,
    annotations: BTreeMap<String, Rc<dyn HostSource>>,
}

impl<T: Task> Annotated<T> {
    /// Wraps `task` with no annotations.
    #[must_use]
    pub fn new(task: T) -> Self {
        Self {
            task,
            annotations: BTreeMap::new(),
        }
    }

    /// Borrows the wrapped task.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.task
    }

    /// Unwraps the task, discarding annotations.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.task
    }

    /// Starts a fresh host sequence from the [`HOSTS_ATTRIBUTE`] source.
    #[must_use]
    pub fn hosts(&self) -> Option<Hosts> {
        self.annotations
            .get(HOSTS_ATTRIBUTE)
            .map(|source| source.hosts())
    }

    /// Names of the attached annotations, sorted.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.annotations.keys().map(String::as_str)
    }
}

impl<T: fmt::Debug> fmt::Debug for Annotated<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotated")
            .field("task", &self.task)
            .field("attributes", &self.annotations.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Task> Task for Annotated<T> {
    fn name(&self) -> &str {
        self.task.name()
    }

    fn run(&self, host: &Host) -> Result<(), TaskError> {
        self.task.run(host)
    }

    fn annotation(&self, attribute: &str) -> Option<Rc<dyn HostSource>> {
        self.annotations
            .get(attribute)
            .cloned()
            .or_else(|| self.task.annotation(attribute))
    }
}

/// Attaches a named host source to a task.
///
/// Bare tasks become [`Annotated`]; an already annotated task stays the same
/// kind and the named entry is replaced.
pub trait Annotate {
    /// Resulting task type.
    type Output: Task;

    /// Stores `source` under `attribute`.
    fn annotate(self, attribute: &str, source: Rc<dyn HostSource>) -> Self::Output;
}

impl<F> Annotate for FnTask<F>
where
    F: Fn(&Host) -> Result<(), TaskError>,
{
    type Output = Annotated<Self>;

    fn annotate(self, attribute: &str, source: Rc<dyn HostSource>) -> Self::Output {
        Annotated::new(self).annotate(attribute, source)
    }
}

impl<T: Task> Annotate for Annotated<T> {
    type Output = Self;

    fn annotate(mut self, attribute: &str, source: Rc<dyn HostSource>) -> Self::Output {
        self.annotations.insert(attribute.to_owned(), source);
        self
    }
}

/// Attaches `source` to `task` under `attribute` without pulling from it.
#[must_use]
pub fn annotate<T, S>(task: T, attribute: &str, source: S) -> T::Output
where
    T: Annotate,
    S: HostSource + 'static,
{
    task.annotate(attribute, Rc::new(source))
}

/// Returns a wrapper that targets every member of a scaling group.
pub fn autoscaling_group<C, T>(
    connector: C,
    region: impl Into<Region>,
    name: impl Into<ScalingGroupName>,
    attribute: HostnameAttribute,
) -> impl FnOnce(T) -> T::Output
where
    C: Connector + Clone + 'static,
    T: Annotate,
{
    let source = GroupHosts::new(connector, region, name).attribute(attribute);
    move |task| annotate(task, HOSTS_ATTRIBUTE, source)
}

/// Returns a wrapper that targets every member of the scaling group declared
/// as `logical_id` in `stack`.
pub fn cloudformation_autoscaling_group<C, T>(
    connector: C,
    region: impl Into<Region>,
    stack: impl Into<StackName>,
    logical_id: impl Into<LogicalResourceId>,
    attribute: HostnameAttribute,
) -> impl FnOnce(T) -> T::Output
where
    C: Connector + Clone + 'static,
    T: Annotate,
{
    let source = StackHosts::new(connector, region, stack, logical_id).attribute(attribute);
    move |task| annotate(task, HOSTS_ATTRIBUTE, source)
}
