//! Translation of stack logical resource names into provider resource names.

use tracing::debug;

use crate::cloud::{
    CloudError, Connector, LogicalResourceId, PhysicalResourceId, Region, StackName, StackService,
};

/// Looks up the physical name of `logical_id` in `stack` over an open
/// connection.
///
/// A response missing any nesting level yields `Ok(None)`; the caller
/// decides when an absent id becomes a failure.
///
/// # Errors
///
/// Returns [`CloudError`] when the description query fails.
pub fn logical_to_physical<S: StackService>(
    connection: &S,
    stack: &StackName,
    logical_id: &LogicalResourceId,
) -> Result<Option<PhysicalResourceId>, CloudError> {
    let description = connection.describe_stack_resource(stack, logical_id)?;
    Ok(description.physical_resource_id().cloned())
}

/// Opens a stack connection in `region` and resolves `logical_id`.
///
/// This performs one round trip immediately; it is not deferred.
///
/// # Errors
///
/// Returns [`CloudError`] when the connection or the query fails.
pub fn resolve_physical_id<C: Connector>(
    connector: &C,
    region: &Region,
    stack: &StackName,
    logical_id: &LogicalResourceId,
) -> Result<Option<PhysicalResourceId>, CloudError> {
    let connection = connector.stacks(region)?;
    let physical = logical_to_physical(&connection, stack, logical_id)?;
    debug!(%region, %stack, %logical_id, ?physical, "resolved stack resource");
    Ok(physical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::AwsCli;
    use crate::test_support::{ScriptedRunner, json_stack_resource};
    use rstest::rstest;

    fn resolve(runner: &ScriptedRunner) -> Result<Option<PhysicalResourceId>, CloudError> {
        let connector = AwsCli::new(runner.clone(), "aws", None);
        resolve_physical_id(
            &connector,
            &Region::from("us-east-1"),
            &StackName::from("stack-name"),
            &LogicalResourceId::from("resource-name"),
        )
    }

    #[rstest]
    fn resolves_physical_id_with_one_query() {
        let runner = ScriptedRunner::new();
        runner.push_output(
            Some(0),
            json_stack_resource(Some("my-awesome-physical-resource")),
            "",
        );

        assert_eq!(
            resolve(&runner),
            Ok(Some(PhysicalResourceId::from("my-awesome-physical-resource")))
        );
        assert_eq!(
            runner.aws_operations(),
            vec![String::from("cloudformation describe-stack-resource")]
        );
    }

    #[rstest]
    #[case::no_physical_id(json_stack_resource(None))]
    #[case::no_detail(String::from("{}"))]
    fn absent_levels_resolve_to_none(#[case] payload: String) {
        let runner = ScriptedRunner::new();
        runner.push_output(Some(0), payload, "");
        assert_eq!(resolve(&runner), Ok(None));
    }

    #[rstest]
    fn service_errors_propagate_unchanged() {
        let runner = ScriptedRunner::new();
        runner.push_output(Some(254), "", "Stack with id stack-name does not exist");
        let err = resolve(&runner).expect_err("failure should propagate");
        assert!(matches!(err, CloudError::CommandFailure { status: Some(254), .. }));
    }
}
