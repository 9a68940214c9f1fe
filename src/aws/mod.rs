//! [`Connector`] backed by the `aws` command line client.
//!
//! Each service call is one `aws` invocation with `--output json`; the
//! printed document is decoded with serde. Credentials, profiles and
//! endpoints are whatever the client itself resolves.

mod responses;

use std::ffi::OsString;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cloud::{
    CloudError, Connector, InstanceQuery, InstanceService, LogicalResourceId, Region,
    Reservation, ScalingGroup, ScalingGroupName, ScalingGroupService, StackName,
    StackResourceDescription, StackService,
};
use crate::command::{CommandOutput, CommandRunner, ProcessCommandRunner};
use responses::{DescribeAutoScalingGroups, DescribeInstances};

/// Default AWS CLI binary name.
pub const DEFAULT_AWS_BIN: &str = "aws";

/// Shells out to the AWS CLI for every service call.
#[derive(Clone, Debug)]
pub struct AwsCli<R: CommandRunner> {
    runner: R,
    aws_bin: String,
    profile: Option<String>,
}

impl AwsCli<ProcessCommandRunner> {
    /// Creates a connector wired to the real process runner.
    #[must_use]
    pub fn with_process_runner(aws_bin: impl Into<String>, profile: Option<String>) -> Self {
        Self::new(ProcessCommandRunner, aws_bin, profile)
    }
}

impl<R: CommandRunner> AwsCli<R> {
    /// Creates a connector using the provided runner.
    #[must_use]
    pub fn new(runner: R, aws_bin: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            runner,
            aws_bin: aws_bin.into(),
            profile,
        }
    }

    /// Builds the argument vector for one service operation.
    fn build_args(
        &self,
        region: &Region,
        operation: &[&str],
        params: Vec<OsString>,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = operation.iter().map(OsString::from).collect();
        args.extend(params);
        args.push(OsString::from("--region"));
        args.push(OsString::from(region.as_str()));
        if let Some(profile) = &self.profile {
            args.push(OsString::from("--profile"));
            args.push(OsString::from(profile));
        }
        args.push(OsString::from("--output"));
        args.push(OsString::from("json"));
        args
    }

    fn check_output(&self, output: CommandOutput, operation: &str) -> Result<String, CloudError> {
        if output.is_success() {
            return Ok(output.stdout);
        }
        Err(CloudError::CommandFailure {
            program: self.aws_bin.clone(),
            status: output.code,
            status_text: output.status_text(),
            stderr: format!("{operation}: {}", output.stderr.trim_end()),
        })
    }

    /// Runs one operation and decodes its JSON output.
    fn call<T: DeserializeOwned>(
        &self,
        region: &Region,
        operation: &[&str],
        params: Vec<OsString>,
    ) -> Result<T, CloudError> {
        let name = operation.join(" ");
        let args = self.build_args(region, operation, params);
        debug!(operation = %name, %region, ?args, "calling aws");
        let output = self.runner.run(&self.aws_bin, &args)?;
        let stdout = self.check_output(output, &name)?;
        serde_json::from_str(&stdout).map_err(|err| CloudError::Parse {
            operation: name,
            message: err.to_string(),
        })
    }
}

/// Region-bound connection to one AWS service through [`AwsCli`].
#[derive(Clone, Debug)]
pub struct AwsConnection<R: CommandRunner> {
    cli: AwsCli<R>,
    region: Region,
}

impl<R: CommandRunner> StackService for AwsConnection<R> {
    fn describe_stack_resource(
        &self,
        stack: &StackName,
        logical_id: &LogicalResourceId,
    ) -> Result<StackResourceDescription, CloudError> {
        let params = vec![
            OsString::from("--stack-name"),
            OsString::from(stack.as_str()),
            OsString::from("--logical-resource-id"),
            OsString::from(logical_id.as_str()),
        ];
        self.cli.call(
            &self.region,
            &["cloudformation", "describe-stack-resource"],
            params,
        )
    }
}

impl<R: CommandRunner> ScalingGroupService for AwsConnection<R> {
    fn get_all_groups(&self, names: &[ScalingGroupName]) -> Result<Vec<ScalingGroup>, CloudError> {
        let mut params = vec![OsString::from("--auto-scaling-group-names")];
        params.extend(names.iter().map(|name| OsString::from(name.as_str())));
        let response: DescribeAutoScalingGroups = self.cli.call(
            &self.region,
            &["autoscaling", "describe-auto-scaling-groups"],
            params,
        )?;
        Ok(response.auto_scaling_groups)
    }
}

impl<R: CommandRunner> InstanceService for AwsConnection<R> {
    fn get_all_instances(&self, query: &InstanceQuery) -> Result<Vec<Reservation>, CloudError> {
        let mut params = Vec::new();
        if let Some(ids) = &query.instance_ids {
            params.push(OsString::from("--instance-ids"));
            params.extend(ids.iter().map(|id| OsString::from(id.as_str())));
        }
        if !query.filters.is_empty() {
            params.push(OsString::from("--filters"));
            params.extend(query.filters.iter().map(|filter| {
                OsString::from(format!("Name={},Values={}", filter.name, filter.values.join(",")))
            }));
        }
        let response: DescribeInstances =
            self.cli
                .call(&self.region, &["ec2", "describe-instances"], params)?;
        Ok(response.reservations)
    }
}

impl<R: CommandRunner + Clone> Connector for AwsCli<R> {
    type Stacks = AwsConnection<R>;
    type Groups = AwsConnection<R>;
    type Instances = AwsConnection<R>;

    fn stacks(&self, region: &Region) -> Result<Self::Stacks, CloudError> {
        Ok(self.connect(region))
    }

    fn scaling_groups(&self, region: &Region) -> Result<Self::Groups, CloudError> {
        Ok(self.connect(region))
    }

    fn instances(&self, region: &Region) -> Result<Self::Instances, CloudError> {
        Ok(self.connect(region))
    }
}

impl<R: CommandRunner + Clone> AwsCli<R> {
    fn connect(&self, region: &Region) -> AwsConnection<R> {
        AwsConnection {
            cli: self.clone(),
            region: region.clone(),
        }
    }
}
