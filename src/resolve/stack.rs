//! Stack-indirected scaling group resolver.

use tracing::debug;

use crate::cloud::{
    Connector, HostnameAttribute, LogicalResourceId, Region, ScalingGroupName, StackName,
};
use crate::translate::resolve_physical_id;

use super::group::GroupHosts;
use super::lazy::Deferred;
use super::{HostSource, Hosts, ResolveError};

/// Resolves hosts from a scaling group declared as a stack resource.
#[derive(Clone, Debug)]
pub struct StackHosts<C> {
    connector: C,
    region: Region,
    stack: StackName,
    logical_id: LogicalResourceId,
    attribute: HostnameAttribute,
}

impl<C> StackHosts<C>
where
    C: Connector + Clone + 'static,
{
    /// Creates a resolver projecting the default public DNS name.
    #[must_use]
    pub fn new(
        connector: C,
        region: impl Into<Region>,
        stack: impl Into<StackName>,
        logical_id: impl Into<LogicalResourceId>,
    ) -> Self {
        Self {
            connector,
            region: region.into(),
            stack: stack.into(),
            logical_id: logical_id.into(),
            attribute: HostnameAttribute::default(),
        }
    }

    /// Selects the instance attribute used as the host.
    #[must_use]
    pub const fn attribute(mut self, attribute: HostnameAttribute) -> Self {
        self.attribute = attribute;
        self
    }

    /// Converts the resolver into its lazy host sequence.
    ///
    /// The first pull translates the logical name, then continues with the
    /// group membership and instance queries of [`GroupHosts`]. An absent
    /// physical id ends the sequence with
    /// [`ResolveError::MissingPhysicalId`] before the group is queried.
    #[must_use]
    pub fn into_hosts(self) -> Hosts {
        let Self {
            connector,
            region,
            stack,
            logical_id,
            attribute,
        } = self;
        Box::new(Deferred::new(move || {
            let physical = resolve_physical_id(&connector, &region, &stack, &logical_id)?
                .ok_or_else(|| ResolveError::MissingPhysicalId {
                    stack: stack.clone(),
                    logical_id: logical_id.clone(),
                })?;
            debug!(%stack, %logical_id, group = %physical, "following stack resource");
            Ok(
                GroupHosts::new(connector, region, ScalingGroupName::from(physical))
                    .attribute(attribute)
                    .into_hosts(),
            )
        }))
    }
}

impl<C> HostSource for StackHosts<C>
where
    C: Connector + Clone + 'static,
{
    fn hosts(&self) -> Hosts {
        self.clone().into_hosts()
    }
}

/// Lazy hosts for the scaling group declared as `logical_id` in `stack`.
#[must_use]
pub fn hosts_by_stack<C>(
    connector: C,
    region: impl Into<Region>,
    stack: impl Into<StackName>,
    logical_id: impl Into<LogicalResourceId>,
    attribute: HostnameAttribute,
) -> Hosts
where
    C: Connector + Clone + 'static,
{
    StackHosts::new(connector, region, stack, logical_id)
        .attribute(attribute)
        .into_hosts()
}
