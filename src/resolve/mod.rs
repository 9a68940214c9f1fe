//! Lazy host resolution.
//!
//! Three resolvers produce host sequences, each composing the previous one:
//!
//! - [`InstanceQueryHosts`]: instance filter → hosts.
//! - [`GroupHosts`]: scaling group → member ids → [`InstanceQueryHosts`].
//! - [`StackHosts`]: stack + logical name → physical group → [`GroupHosts`].
//!
//! Constructing a resolver or a [`Hosts`] iterator performs no service call.
//! The calls happen, strictly in the order above, when the first host is
//! pulled. Nothing is cached: every call to [`HostSource::hosts`] starts a
//! fresh sequence that queries the provider again.

mod error;
mod group;
mod lazy;
mod query;
mod stack;

pub use error::ResolveError;
pub use group::{GroupHosts, group_instances, group_members, hosts_by_group};
pub use query::{InstanceQueryHosts, hosts_by_query};
pub use stack::{StackHosts, hosts_by_stack};

use crate::cloud::Host;

/// Lazy, single-pass sequence of hosts. Ends after the first error.
pub type Hosts = Box<dyn Iterator<Item = Result<Host, ResolveError>>>;

/// Something that can start a fresh host sequence on demand.
pub trait HostSource {
    /// Starts a new sequence. No service call happens until it is pulled.
    fn hosts(&self) -> Hosts;
}

/// Fixed host list, for tasks that target known machines.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StaticHosts(Vec<Host>);

impl StaticHosts {
    /// Wraps the given hosts.
    #[must_use]
    pub fn new<I, H>(hosts: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<Host>,
    {
        Self(hosts.into_iter().map(Into::into).collect())
    }
}

impl HostSource for StaticHosts {
    fn hosts(&self) -> Hosts {
        Box::new(self.0.clone().into_iter().map(Ok))
    }
}

#[cfg(test)]
mod tests;
