//! Auto-scaling group resolver.

use std::slice;

use tracing::debug;

use crate::cloud::{
    Connector, HostnameAttribute, InstanceId, InstanceQuery, InstanceRecord, InstanceService,
    Region, ScalingGroup, ScalingGroupName, ScalingGroupService,
};

use super::lazy::Deferred;
use super::query::InstanceQueryHosts;
use super::{HostSource, Hosts, ResolveError};

/// Looks up exactly one group named `name` and returns its member ids.
///
/// # Errors
///
/// Returns [`ResolveError::GroupNotFound`] when nothing matches,
/// [`ResolveError::AmbiguousGroup`] when several groups come back, and
/// [`ResolveError::Cloud`] when the query fails.
pub fn group_members<G: ScalingGroupService>(
    connection: &G,
    name: &ScalingGroupName,
) -> Result<Vec<InstanceId>, ResolveError> {
    let groups = connection.get_all_groups(slice::from_ref(name))?;
    match <[ScalingGroup; 1]>::try_from(groups) {
        Ok([group]) => Ok(group.instance_ids()),
        Err(groups) if groups.is_empty() => Err(ResolveError::GroupNotFound { name: name.clone() }),
        Err(groups) => Err(ResolveError::AmbiguousGroup {
            name: name.clone(),
            count: groups.len(),
        }),
    }
}

/// Eagerly describes every instance in the group named `name`.
///
/// # Errors
///
/// Returns the errors of [`group_members`], or [`ResolveError::Cloud`] when
/// the instance query fails.
pub fn group_instances<G, I>(
    groups: &G,
    instances: &I,
    name: &ScalingGroupName,
) -> Result<Vec<InstanceRecord>, ResolveError>
where
    G: ScalingGroupService,
    I: InstanceService,
{
    let query = InstanceQuery::by_ids(group_members(groups, name)?);
    if query.matches_nothing() {
        return Ok(Vec::new());
    }
    let reservations = instances.get_all_instances(&query)?;
    Ok(reservations
        .into_iter()
        .flat_map(|reservation| reservation.instances)
        .collect())
}

/// Resolves hosts from the members of a named scaling group.
#[derive(Clone, Debug)]
pub struct GroupHosts<C> {
    connector: C,
    region: Region,
    name: ScalingGroupName,
    attribute: HostnameAttribute,
}

impl<C> GroupHosts<C>
where
    C: Connector + Clone + 'static,
{
    /// Creates a resolver projecting the default public DNS name.
    #[must_use]
    pub fn new(
        connector: C,
        region: impl Into<Region>,
        name: impl Into<ScalingGroupName>,
    ) -> Self {
        Self {
            connector,
            region: region.into(),
            name: name.into(),
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
    /// The first pull queries the group membership and then hands the
    /// member ids to an [`InstanceQueryHosts`] sequence.
    #[must_use]
    pub fn into_hosts(self) -> Hosts {
        let Self {
            connector,
            region,
            name,
            attribute,
        } = self;
        Box::new(Deferred::new(move || {
            let connection = connector.scaling_groups(&region)?;
            let members = group_members(&connection, &name)?;
            debug!(%region, group = %name, count = members.len(), "listed group members");
            Ok(
                InstanceQueryHosts::new(connector, region, InstanceQuery::by_ids(members))
                    .attribute(attribute)
                    .into_hosts(),
            )
        }))
    }
}

impl<C> HostSource for GroupHosts<C>
where
    C: Connector + Clone + 'static,
{
    fn hosts(&self) -> Hosts {
        self.clone().into_hosts()
    }
}

/// Lazy hosts for the members of the scaling group `name` in `region`.
#[must_use]
pub fn hosts_by_group<C>(
    connector: C,
    region: impl Into<Region>,
    name: impl Into<ScalingGroupName>,
    attribute: HostnameAttribute,
) -> Hosts
where
    C: Connector + Clone + 'static,
{
    GroupHosts::new(connector, region, name)
        .attribute(attribute)
        .into_hosts()
}
