//! Core library for the Hostfleet host resolution tool.
//!
//! The crate turns AWS auto-scaling groups, CloudFormation stack resources,
//! and instance filters into lazy host sequences, and lets remote-execution
//! tasks carry such a sequence as an annotation that is only pulled when the
//! task is dispatched.

pub mod aws;
pub mod cloud;
pub mod command;
pub mod config;
pub mod resolve;
pub mod task;
pub mod test_support;
pub mod translate;

pub use aws::{AwsCli, AwsConnection};
pub use cloud::{CloudError, Connector, Host, HostnameAttribute, InstanceQuery, Region};
pub use command::{CommandError, CommandOutput, CommandRunner, ProcessCommandRunner};
pub use config::{ConfigError, HostfleetConfig};
pub use resolve::{
    GroupHosts, HostSource, Hosts, InstanceQueryHosts, ResolveError, StackHosts, StaticHosts,
    hosts_by_group, hosts_by_query, hosts_by_stack,
};
pub use task::{
    Annotate, Annotated, DispatchError, DispatchReport, FnTask, HOSTS_ATTRIBUTE, Task, TaskError,
    annotate, autoscaling_group, cloudformation_autoscaling_group, execute,
};
pub use translate::logical_to_physical;
