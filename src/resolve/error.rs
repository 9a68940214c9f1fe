//! Errors raised while producing hosts.

use thiserror::Error;

use crate::cloud::{
    CloudError, HostnameAttribute, InstanceId, LogicalResourceId, ScalingGroupName, StackName,
};

/// Errors yielded by a host sequence. Any error ends the sequence.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ResolveError {
    /// Raised when a provider service call fails.
    #[error(transparent)]
    Cloud(#[from] CloudError),
    /// Raised when the stack description carries no physical resource id.
    #[error("stack {stack} has no physical resource for {logical_id}")]
    MissingPhysicalId {
        /// Stack that was queried.
        stack: StackName,
        /// Logical resource that could not be translated.
        logical_id: LogicalResourceId,
    },
    /// Raised when no scaling group matches the requested name.
    #[error("auto-scaling group {name} not found")]
    GroupNotFound {
        /// Requested group name.
        name: ScalingGroupName,
    },
    /// Raised when the service returns more than one group for a name.
    #[error("auto-scaling group {name} matched {count} groups")]
    AmbiguousGroup {
        /// Requested group name.
        name: ScalingGroupName,
        /// Number of groups returned.
        count: usize,
    },
    /// Raised when an instance lacks the selected hostname attribute.
    #[error("instance {instance_id} has no {attribute}")]
    MissingAttribute {
        /// Instance whose host could not be produced.
        instance_id: InstanceId,
        /// Attribute that was selected.
        attribute: HostnameAttribute,
    },
}
