//! Command-line interface definitions for the `hostfleet` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `hostfleet` binary.
#[derive(Debug, Parser)]
#[command(
    name = "hostfleet",
    about = "Resolve hosts from AWS auto-scaling groups and run commands on them over SSH",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// AWS region to query. Falls back to `default_region` from configuration.
    #[arg(long, global = true, value_name = "REGION")]
    pub(crate) region: Option<String>,
    /// Instance attribute used as the host name (for example
    /// `private-ip-address`). Falls back to `hostname_attribute` from
    /// configuration.
    #[arg(long, global = true, value_name = "ATTRIBUTE")]
    pub(crate) attribute: Option<String>,
    /// Where the target hosts come from.
    #[command(subcommand)]
    pub(crate) target: Target,
}

/// Host selection strategies.
#[derive(Debug, Subcommand)]
pub(crate) enum Target {
    /// Every instance in a named auto-scaling group.
    #[command(name = "group")]
    Group(GroupArgs),
    /// Every instance in the auto-scaling group declared by a stack resource.
    #[command(name = "stack")]
    Stack(StackArgs),
    /// Instances matching explicit ids or filters.
    #[command(name = "query")]
    Query(QueryArgs),
}

impl Target {
    /// Remote command given after `--`, empty when hosts should be listed.
    pub(crate) fn command(&self) -> &[String] {
        match self {
            Self::Group(args) => &args.remote.command,
            Self::Stack(args) => &args.remote.command,
            Self::Query(args) => &args.remote.command,
        }
    }
}

/// Arguments for `hostfleet group`.
#[derive(Debug, Args)]
pub(crate) struct GroupArgs {
    /// Auto-scaling group name.
    #[arg(value_name = "NAME")]
    pub(crate) name: String,
    #[command(flatten)]
    pub(crate) remote: RemoteCommand,
}

/// Arguments for `hostfleet stack`.
#[derive(Debug, Args)]
pub(crate) struct StackArgs {
    /// CloudFormation stack name.
    #[arg(value_name = "STACK")]
    pub(crate) stack: String,
    /// Logical id of the auto-scaling group resource in the stack template.
    #[arg(value_name = "LOGICAL_ID")]
    pub(crate) logical_id: String,
    #[command(flatten)]
    pub(crate) remote: RemoteCommand,
}

/// Arguments for `hostfleet query`.
#[derive(Debug, Args)]
pub(crate) struct QueryArgs {
    /// Instance id to include. Repeat for several instances.
    #[arg(long = "instance-id", value_name = "ID")]
    pub(crate) instance_ids: Vec<String>,
    /// Describe-instances filter as `NAME=VALUE[,VALUE...]`. Repeatable.
    #[arg(long = "filter", value_name = "NAME=VALUES")]
    pub(crate) filters: Vec<String>,
    #[command(flatten)]
    pub(crate) remote: RemoteCommand,
}

/// Optional command executed on every resolved host.
#[derive(Debug, Args)]
pub(crate) struct RemoteCommand {
    /// Command to execute on each host (after `--`). When omitted the hosts
    /// are printed one per line.
    #[arg(last = true, value_name = "COMMAND")]
    pub(crate) command: Vec<String>,
}
