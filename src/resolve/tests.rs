//! Unit tests for the resolver chain.

use super::*;
use crate::aws::AwsCli;
use crate::cloud::{
    CloudError, HostnameAttribute, InstanceFilter, InstanceId, InstanceQuery, ScalingGroupName,
};
use crate::test_support::{
    FOUR_INSTANCES, ScriptedRunner, json_groups, json_reservations, json_stack_resource,
};
use rstest::{fixture, rstest};

const STACK_OP: &str = "cloudformation describe-stack-resource";
const GROUP_OP: &str = "autoscaling describe-auto-scaling-groups";
const INSTANCE_OP: &str = "ec2 describe-instances";

#[fixture]
fn runner() -> ScriptedRunner {
    ScriptedRunner::new()
}

fn connector(runner: &ScriptedRunner) -> AwsCli<ScriptedRunner> {
    AwsCli::new(runner.clone(), "aws", None)
}

fn hosts(values: &[&str]) -> Vec<Host> {
    values.iter().copied().map(Host::from).collect()
}

fn script_group(runner: &ScriptedRunner, name: &str) {
    runner.push_output(
        Some(0),
        json_groups(&[(name, &["i-1", "i-2", "i-3", "i-4"])]),
        "",
    );
    runner.push_output(Some(0), json_reservations(&FOUR_INSTANCES), "");
}

#[rstest]
fn group_resolver_yields_public_names_in_service_order(runner: ScriptedRunner) {
    script_group(&runner, "dummy-asg-name");

    let resolved: Result<Vec<_>, _> = hosts_by_group(
        connector(&runner),
        "us-east-1",
        "dummy-asg-name",
        HostnameAttribute::default(),
    )
    .collect();

    assert_eq!(resolved, Ok(hosts(&["a.a.a", "b.b.b", "c.c.c", "d.d.d"])));
    let invocations = runner.invocations();
    let [group_call, instance_call] = invocations.as_slice() else {
        panic!("expected two invocations, got {invocations:?}");
    };
    assert!(
        group_call
            .command_string()
            .contains("--auto-scaling-group-names dummy-asg-name"),
        "unexpected group call: {}",
        group_call.command_string()
    );
    assert!(
        instance_call
            .command_string()
            .contains("--instance-ids i-1 i-2 i-3 i-4"),
        "unexpected instance call: {}",
        instance_call.command_string()
    );
}

#[rstest]
fn stack_resolver_queries_in_strict_order(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_stack_resource(Some("asg-physical")), "");
    script_group(&runner, "asg-physical");

    let resolved: Result<Vec<_>, _> = hosts_by_stack(
        connector(&runner),
        "us-east-1",
        "stack-name",
        "logical-autoscaling-group-name",
        HostnameAttribute::PrivateIpAddress,
    )
    .collect();

    assert_eq!(
        resolved,
        Ok(hosts(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]))
    );
    assert_eq!(runner.aws_operations(), vec![STACK_OP, GROUP_OP, INSTANCE_OP]);
    let invocations = runner.invocations();
    assert!(
        invocations
            .get(1)
            .is_some_and(|call| call.command_string().contains("asg-physical")),
        "group lookup should use the physical name: {invocations:?}"
    );
}

#[rstest]
fn query_resolver_uses_explicit_ids(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_reservations(&FOUR_INSTANCES), "");
    let ids = ["i-1", "i-2", "i-3", "i-4"].map(InstanceId::from);

    let resolved: Result<Vec<_>, _> = hosts_by_query(
        connector(&runner),
        "us-east-1",
        HostnameAttribute::default(),
        InstanceQuery::by_ids(ids),
    )
    .collect();

    assert_eq!(resolved, Ok(hosts(&["a.a.a", "b.b.b", "c.c.c", "d.d.d"])));
    assert_eq!(runner.aws_operations(), vec![INSTANCE_OP]);
}

#[rstest]
fn query_resolver_passes_filters(runner: ScriptedRunner) {
    runner.push_output(
        Some(0),
        json_reservations(&[&[("i-9", "z.z.z", "10.0.0.9")]]),
        "",
    );
    let query = InstanceQuery::default().filter(InstanceFilter::new("tag:Role", ["web"]));

    let resolved: Result<Vec<_>, _> = hosts_by_query(
        connector(&runner),
        "us-east-1",
        HostnameAttribute::InstanceId,
        query,
    )
    .collect();

    assert_eq!(resolved, Ok(hosts(&["i-9"])));
    let invocations = runner.invocations();
    assert!(
        invocations.first().is_some_and(|call| {
            let command = call.command_string();
            command.contains("--filters Name=tag:Role,Values=web") && !command.contains("--instance-ids")
        }),
        "unexpected invocations: {invocations:?}"
    );
}

#[rstest]
fn construction_performs_no_calls(runner: ScriptedRunner) {
    let stack = StackHosts::new(connector(&runner), "us-east-1", "stack-name", "Web");
    let group = GroupHosts::new(connector(&runner), "us-east-1", "web");
    let query = InstanceQueryHosts::new(connector(&runner), "us-east-1", InstanceQuery::default());

    let sequences = [stack.hosts(), group.hosts(), query.hosts()];

    assert!(runner.invocations().is_empty());
    drop(sequences);
    assert!(runner.invocations().is_empty());
}

#[rstest]
fn calls_happen_on_first_pull(runner: ScriptedRunner) {
    script_group(&runner, "web");
    let mut sequence = GroupHosts::new(connector(&runner), "us-east-1", "web").into_hosts();
    assert!(runner.invocations().is_empty());

    assert_eq!(sequence.next(), Some(Ok(Host::from("a.a.a"))));
    assert_eq!(runner.aws_operations(), vec![GROUP_OP, INSTANCE_OP]);

    assert_eq!(sequence.count(), 3);
    assert_eq!(runner.invocations().len(), 2);
}

#[rstest]
fn every_iteration_queries_again(runner: ScriptedRunner) {
    script_group(&runner, "web");
    script_group(&runner, "web");
    let resolver = GroupHosts::new(connector(&runner), "us-east-1", "web");

    let first: Vec<_> = resolver.hosts().collect();
    let second: Vec<_> = resolver.hosts().collect();

    assert_eq!(first, second);
    assert_eq!(
        runner.aws_operations(),
        vec![GROUP_OP, INSTANCE_OP, GROUP_OP, INSTANCE_OP]
    );
}

#[rstest]
fn missing_attribute_fails_lazily_per_host(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_groups(&[("web", &["i-1", "i-2", "i-3"])]), "");
    runner.push_output(
        Some(0),
        json_reservations(&[&[
            ("i-1", "a.a.a", "10.0.0.1"),
            ("i-2", "", "10.0.0.2"),
            ("i-3", "c.c.c", "10.0.0.3"),
        ]]),
        "",
    );

    let mut sequence = hosts_by_group(
        connector(&runner),
        "us-east-1",
        "web",
        HostnameAttribute::PublicDnsName,
    );

    assert_eq!(sequence.next(), Some(Ok(Host::from("a.a.a"))));
    assert_eq!(
        sequence.next(),
        Some(Err(ResolveError::MissingAttribute {
            instance_id: InstanceId::from("i-2"),
            attribute: HostnameAttribute::PublicDnsName,
        }))
    );
    assert_eq!(sequence.next(), None);
}

#[rstest]
fn unknown_group_is_reported(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_groups(&[]), "");

    let resolved: Result<Vec<_>, _> =
        hosts_by_group(connector(&runner), "us-east-1", "ghost", HostnameAttribute::default())
            .collect();

    assert_eq!(
        resolved,
        Err(ResolveError::GroupNotFound {
            name: ScalingGroupName::from("ghost")
        })
    );
    assert_eq!(runner.aws_operations(), vec![GROUP_OP]);
}

#[rstest]
fn several_groups_for_one_name_are_rejected(runner: ScriptedRunner) {
    runner.push_output(
        Some(0),
        json_groups(&[("web", &["i-1"]), ("web", &["i-2"])]),
        "",
    );

    let resolved: Result<Vec<_>, _> =
        hosts_by_group(connector(&runner), "us-east-1", "web", HostnameAttribute::default())
            .collect();

    assert_eq!(
        resolved,
        Err(ResolveError::AmbiguousGroup {
            name: ScalingGroupName::from("web"),
            count: 2
        })
    );
}

#[rstest]
fn empty_group_skips_instance_query(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_groups(&[("web", &[])]), "");

    let resolved: Vec<_> =
        hosts_by_group(connector(&runner), "us-east-1", "web", HostnameAttribute::default())
            .collect();

    assert!(resolved.is_empty());
    assert_eq!(runner.aws_operations(), vec![GROUP_OP]);
}

#[rstest]
fn missing_physical_id_stops_before_group_lookup(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_stack_resource(None), "");

    let resolved: Result<Vec<_>, _> = hosts_by_stack(
        connector(&runner),
        "us-east-1",
        "stack-name",
        "Web",
        HostnameAttribute::default(),
    )
    .collect();

    assert_eq!(
        resolved,
        Err(ResolveError::MissingPhysicalId {
            stack: "stack-name".into(),
            logical_id: "Web".into(),
        })
    );
    assert_eq!(runner.aws_operations(), vec![STACK_OP]);
}

#[rstest]
fn service_failure_ends_the_sequence(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_groups(&[("web", &["i-1"])]), "");
    runner.push_failure(255);

    let mut sequence =
        hosts_by_group(connector(&runner), "us-east-1", "web", HostnameAttribute::default());

    assert!(matches!(
        sequence.next(),
        Some(Err(ResolveError::Cloud(CloudError::CommandFailure { .. })))
    ));
    assert_eq!(sequence.next(), None);
    assert_eq!(runner.invocations().len(), 2);
}

#[rstest]
fn group_instances_flattens_reservations(runner: ScriptedRunner) {
    script_group(&runner, "dummy-asg-name");
    let aws = connector(&runner);
    let region = "us-east-1".into();
    let groups = crate::cloud::Connector::scaling_groups(&aws, &region).expect("connect");
    let instances = crate::cloud::Connector::instances(&aws, &region).expect("connect");

    let records = group_instances(&groups, &instances, &"dummy-asg-name".into())
        .expect("group should resolve");

    let ids: Vec<_> = records.iter().map(|record| record.instance_id.as_str()).collect();
    assert_eq!(ids, vec!["i-1", "i-2", "i-3", "i-4"]);
}

#[rstest]
fn static_hosts_replay_without_calls() {
    let source = StaticHosts::new(["a", "b"]);
    let first: Vec<_> = source.hosts().collect();
    assert_eq!(first, vec![Ok(Host::from("a")), Ok(Host::from("b"))]);
    assert_eq!(source.hosts().count(), 2);
}
