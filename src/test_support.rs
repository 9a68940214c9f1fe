//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::command::{CommandError, CommandOutput, CommandRunner};

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// Used to drive deterministic command outcomes without spawning processes.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Rc<RefCell<VecDeque<CommandOutput>>>,
    invocations: Rc<RefCell<Vec<CommandInvocation>>>,
}

/// Records a single invocation made through [`ScriptedRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandInvocation {
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    /// Returns a shell-like command string for assertions.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(
            self.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }

    /// Returns the service operation of an `aws` call, for example
    /// `autoscaling describe-auto-scaling-groups`.
    #[must_use]
    pub fn aws_operation(&self) -> String {
        self.args
            .iter()
            .take(2)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.borrow().clone()
    }

    /// Returns the `aws` operations invoked so far, in call order.
    #[must_use]
    pub fn aws_operations(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(CommandInvocation::aws_operation)
            .collect()
    }

    /// Pushes a successful exit status.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32) {
        self.push_output(Some(code), "", "simulated failure");
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.borrow_mut().push_back(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        self.invocations.borrow_mut().push(CommandInvocation {
            program: program.to_owned(),
            args: args.to_vec(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| CommandError::Spawn {
                program: program.to_owned(),
                message: String::from("no scripted response available"),
            })
    }
}

/// Instance fixture: `(instance id, public DNS name, private IP address)`.
pub type InstanceFixture<'a> = (&'a str, &'a str, &'a str);

/// Produces a payload matching `aws cloudformation describe-stack-resource`.
/// `None` omits the physical id, as the service does for resources that are
/// still being created.
#[must_use]
pub fn json_stack_resource(physical_id: Option<&str>) -> String {
    let mut detail = json!({
        "StackName": "stack-name",
        "LogicalResourceId": "logical-autoscaling-group-name",
        "ResourceType": "AWS::AutoScaling::AutoScalingGroup",
        "ResourceStatus": "CREATE_COMPLETE",
    });
    if let (Some(id), Value::Object(fields)) = (physical_id, &mut detail) {
        fields.insert(String::from("PhysicalResourceId"), Value::from(id));
    }
    json!({ "StackResourceDetail": detail }).to_string()
}

/// Produces a payload matching `aws autoscaling describe-auto-scaling-groups`.
#[must_use]
pub fn json_groups(groups: &[(&str, &[&str])]) -> String {
    let entries: Vec<Value> = groups
        .iter()
        .map(|(name, members)| {
            let instances: Vec<Value> = members
                .iter()
                .map(|id| json!({ "InstanceId": id, "LifecycleState": "InService" }))
                .collect();
            json!({ "AutoScalingGroupName": name, "Instances": instances })
        })
        .collect();
    json!({ "AutoScalingGroups": entries }).to_string()
}

/// Produces a payload matching `aws ec2 describe-instances`, one inner slice
/// per reservation.
#[must_use]
pub fn json_reservations(reservations: &[&[InstanceFixture<'_>]]) -> String {
    let entries: Vec<Value> = reservations
        .iter()
        .map(|fixtures| {
            let instances: Vec<Value> = fixtures
                .iter()
                .map(|(id, public_dns, private_ip)| {
                    json!({
                        "InstanceId": id,
                        "PublicDnsName": public_dns,
                        "PrivateIpAddress": private_ip,
                        "State": { "Name": "running" },
                    })
                })
                .collect();
            json!({ "Instances": instances })
        })
        .collect();
    json!({ "Reservations": entries }).to_string()
}

/// The four instances used across the group and stack scenarios, split over
/// two reservations.
pub const FOUR_INSTANCES: [&[InstanceFixture<'static>]; 2] = [
    &[("i-1", "a.a.a", "10.0.0.1"), ("i-2", "b.b.b", "10.0.0.2")],
    &[("i-3", "c.c.c", "10.0.0.3"), ("i-4", "d.d.d", "10.0.0.4")],
];
