//! Cloud metadata model and the service seams the resolvers query through.
//!
//! Three provider services are consumed, one operation each: stack resource
//! description, scaling group listing, and instance description. A
//! [`Connector`] opens a fresh per-region connection to each of them; the
//! resolvers never hold a connection between pulls.

mod error;
mod types;

pub use error::CloudError;
pub use types::{
    GroupMember, Host, HostnameAttribute, InstanceFilter, InstanceId, InstanceQuery,
    InstanceRecord, InvalidFilter, LogicalResourceId, PhysicalResourceId, Region, Reservation,
    ScalingGroup, ScalingGroupName, StackName, StackResourceDescription, StackResourceDetail,
    UnknownAttribute,
};

/// Connection to the stack-management service of one region.
pub trait StackService {
    /// Describes `logical_id` inside `stack`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the service call fails.
    fn describe_stack_resource(
        &self,
        stack: &StackName,
        logical_id: &LogicalResourceId,
    ) -> Result<StackResourceDescription, CloudError>;
}

/// Connection to the scaling-group service of one region.
pub trait ScalingGroupService {
    /// Lists the groups whose names appear in `names`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the service call fails.
    fn get_all_groups(&self, names: &[ScalingGroupName]) -> Result<Vec<ScalingGroup>, CloudError>;
}

/// Connection to the instance-query service of one region.
pub trait InstanceService {
    /// Describes the instances matching `query`, grouped by reservation.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the service call fails.
    fn get_all_instances(&self, query: &InstanceQuery) -> Result<Vec<Reservation>, CloudError>;
}

/// Opens per-region connections to the provider services.
pub trait Connector {
    /// Stack-management connection type.
    type Stacks: StackService;
    /// Scaling-group connection type.
    type Groups: ScalingGroupService;
    /// Instance-query connection type.
    type Instances: InstanceService;

    /// Opens a stack-management connection in `region`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the connection cannot be established.
    fn stacks(&self, region: &Region) -> Result<Self::Stacks, CloudError>;

    /// Opens a scaling-group connection in `region`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the connection cannot be established.
    fn scaling_groups(&self, region: &Region) -> Result<Self::Groups, CloudError>;

    /// Opens an instance-query connection in `region`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError`] when the connection cannot be established.
    fn instances(&self, region: &Region) -> Result<Self::Instances, CloudError>;
}
