//! Direct instance-query resolver.

use tracing::debug;

use crate::cloud::{Connector, HostnameAttribute, InstanceQuery, InstanceService, Region};

use super::lazy::{Deferred, Projection};
use super::{HostSource, Hosts};

/// Resolves hosts from an arbitrary instance query.
#[derive(Clone, Debug)]
pub struct InstanceQueryHosts<C> {
    connector: C,
    region: Region,
    query: InstanceQuery,
    attribute: HostnameAttribute,
}

impl<C> InstanceQueryHosts<C>
where
    C: Connector + Clone + 'static,
{
    /// Creates a resolver projecting the default public DNS name.
    #[must_use]
    pub fn new(connector: C, region: impl Into<Region>, query: InstanceQuery) -> Self {
        Self {
            connector,
            region: region.into(),
            query,
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
    /// On the first pull one instance-description query is issued; the
    /// reservations are flattened and yielded in service order.
    #[must_use]
    pub fn into_hosts(self) -> Hosts {
        let Self {
            connector,
            region,
            query,
            attribute,
        } = self;
        Box::new(Deferred::new(move || {
            if query.matches_nothing() {
                debug!(%region, "empty instance id list, skipping instance query");
                return Ok(Projection::new(Vec::new(), attribute));
            }
            let connection = connector.instances(&region)?;
            let reservations = connection.get_all_instances(&query)?;
            let instances: Vec<_> = reservations
                .into_iter()
                .flat_map(|reservation| reservation.instances)
                .collect();
            debug!(%region, count = instances.len(), %attribute, "described instances");
            Ok(Projection::new(instances, attribute))
        }))
    }
}

impl<C> HostSource for InstanceQueryHosts<C>
where
    C: Connector + Clone + 'static,
{
    fn hosts(&self) -> Hosts {
        self.clone().into_hosts()
    }
}

/// Lazy hosts for the instances matching `query` in `region`.
#[must_use]
pub fn hosts_by_query<C>(
    connector: C,
    region: impl Into<Region>,
    attribute: HostnameAttribute,
    query: InstanceQuery,
) -> Hosts
where
    C: Connector + Clone + 'static,
{
    InstanceQueryHosts::new(connector, region, query)
        .attribute(attribute)
        .into_hosts()
}
