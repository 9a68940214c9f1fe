//! Newtypes and records describing the cloud metadata the resolvers consume.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::Deserialize;

macro_rules! newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps the given value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrows the underlying string.
            #[must_use]
            pub const fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// Returns the owned underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

newtype!(
    /// Provider region such as `us-east-1`. Passed through unvalidated.
    Region
);
newtype!(
    /// Name of an infrastructure stack.
    StackName
);
newtype!(
    /// Logical resource name inside a stack template.
    LogicalResourceId
);
newtype!(
    /// Provider-side name of a stack resource.
    PhysicalResourceId
);
newtype!(
    /// Name of an auto-scaling group.
    ScalingGroupName
);
newtype!(
    /// Compute instance identifier, unique within a region.
    InstanceId
);
newtype!(
    /// Address handed to the task-execution layer.
    Host
);

impl From<PhysicalResourceId> for ScalingGroupName {
    fn from(value: PhysicalResourceId) -> Self {
        Self(value.0)
    }
}

/// Selects which field of an instance description becomes the [`Host`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum HostnameAttribute {
    /// Public DNS name assigned by the provider. Instances in a VPC without
    /// public addressing have none and fail with a missing-attribute error;
    /// select `private-ip-address` for such groups.
    #[default]
    PublicDnsName,
    /// Public IPv4 address.
    PublicIpAddress,
    /// Private IPv4 address inside the VPC.
    PrivateIpAddress,
    /// Private DNS name inside the VPC.
    PrivateDnsName,
    /// The instance identifier itself.
    InstanceId,
}

impl HostnameAttribute {
    /// Every selectable attribute, in display order.
    pub const ALL: [Self; 5] = [
        Self::PublicDnsName,
        Self::PublicIpAddress,
        Self::PrivateIpAddress,
        Self::PrivateDnsName,
        Self::InstanceId,
    ];

    /// Canonical kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PublicDnsName => "public-dns-name",
            Self::PublicIpAddress => "public-ip-address",
            Self::PrivateIpAddress => "private-ip-address",
            Self::PrivateDnsName => "private-dns-name",
            Self::InstanceId => "instance-id",
        }
    }
}

impl fmt::Display for HostnameAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a hostname attribute name is not recognised.
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
#[error("unknown hostname attribute '{0}'")]
pub struct UnknownAttribute(pub String);

impl FromStr for HostnameAttribute {
    type Err = UnknownAttribute;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalised.as_str() {
            "ip-address" => return Ok(Self::PublicIpAddress),
            "id" => return Ok(Self::InstanceId),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.as_str() == normalised)
            .ok_or_else(|| UnknownAttribute(value.to_owned()))
    }
}

/// One instance as returned by the instance-query service.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceRecord {
    /// Provider identifier.
    pub instance_id: InstanceId,
    /// Public DNS name; empty or absent for instances without one.
    #[serde(default)]
    pub public_dns_name: Option<String>,
    /// Public IPv4 address, if assigned.
    #[serde(default)]
    pub public_ip_address: Option<String>,
    /// Private IPv4 address.
    #[serde(default)]
    pub private_ip_address: Option<String>,
    /// Private DNS name.
    #[serde(default)]
    pub private_dns_name: Option<String>,
}

impl InstanceRecord {
    /// Returns the selected attribute, treating empty strings as absent.
    #[must_use]
    pub fn attribute(&self, attribute: HostnameAttribute) -> Option<&str> {
        let value = match attribute {
            HostnameAttribute::PublicDnsName => self.public_dns_name.as_deref(),
            HostnameAttribute::PublicIpAddress => self.public_ip_address.as_deref(),
            HostnameAttribute::PrivateIpAddress => self.private_ip_address.as_deref(),
            HostnameAttribute::PrivateDnsName => self.private_dns_name.as_deref(),
            HostnameAttribute::InstanceId => Some(self.instance_id.as_str()),
        };
        value.filter(|text| !text.is_empty())
    }
}

/// Grouping of instances launched together.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Reservation {
    /// Instances belonging to the reservation, in service order.
    #[serde(default)]
    pub instances: Vec<InstanceRecord>,
}

/// Member reference inside a scaling group.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GroupMember {
    /// Identifier of the member instance.
    pub instance_id: InstanceId,
}

/// Auto-scaling group description.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ScalingGroup {
    /// Group name.
    #[serde(rename = "AutoScalingGroupName")]
    pub name: ScalingGroupName,
    /// Member instances.
    #[serde(rename = "Instances", default)]
    pub instances: Vec<GroupMember>,
}

impl ScalingGroup {
    /// Member instance identifiers in group order.
    #[must_use]
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances
            .iter()
            .map(|member| member.instance_id.clone())
            .collect()
    }
}

/// Response to a stack resource description. Every level is optional so a
/// partial response navigates to an absent physical id instead of failing.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StackResourceDescription {
    /// Resource detail block.
    #[serde(default)]
    pub stack_resource_detail: Option<StackResourceDetail>,
}

/// Detail block of a stack resource description.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StackResourceDetail {
    /// Logical name echoed back by the service.
    #[serde(default)]
    pub logical_resource_id: Option<LogicalResourceId>,
    /// Physical name of the resource, once created.
    #[serde(default)]
    pub physical_resource_id: Option<PhysicalResourceId>,
    /// Resource type such as `AWS::AutoScaling::AutoScalingGroup`.
    #[serde(default)]
    pub resource_type: Option<String>,
}

impl StackResourceDescription {
    /// Navigates to the physical identifier, if every level is present.
    #[must_use]
    pub fn physical_resource_id(&self) -> Option<&PhysicalResourceId> {
        self.stack_resource_detail
            .as_ref()
            .and_then(|detail| detail.physical_resource_id.as_ref())
    }
}

/// A single `Name=Values` filter understood by the instance-query service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstanceFilter {
    /// Filter name, for example `tag:Role` or `instance-state-name`.
    pub name: String,
    /// Accepted values.
    pub values: Vec<String>,
}

impl InstanceFilter {
    /// Builds a filter from a name and its accepted values.
    #[must_use]
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Raised when a `NAME=V1,V2` filter expression is malformed.
#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
#[error("invalid filter '{0}': expected NAME=VALUE[,VALUE...]")]
pub struct InvalidFilter(pub String);

impl FromStr for InstanceFilter {
    type Err = InvalidFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((name, values)) = value.split_once('=') else {
            return Err(InvalidFilter(value.to_owned()));
        };
        let accepted: Vec<&str> = values.split(',').filter(|item| !item.is_empty()).collect();
        if name.trim().is_empty() || accepted.is_empty() {
            return Err(InvalidFilter(value.to_owned()));
        }
        Ok(Self::new(name.trim(), accepted))
    }
}

/// Open-ended filter for the instance-query service.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstanceQuery {
    /// Explicit instance ids. `Some(vec![])` matches nothing.
    pub instance_ids: Option<Vec<InstanceId>>,
    /// Additional attribute filters.
    pub filters: Vec<InstanceFilter>,
}

impl InstanceQuery {
    /// Query matching exactly the given instance ids.
    #[must_use]
    pub fn by_ids(ids: impl IntoIterator<Item = InstanceId>) -> Self {
        Self {
            instance_ids: Some(ids.into_iter().collect()),
            filters: Vec::new(),
        }
    }

    /// Adds an attribute filter.
    #[must_use]
    pub fn filter(mut self, filter: InstanceFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Returns `true` when the query is an explicit, empty id list.
    #[must_use]
    pub fn matches_nothing(&self) -> bool {
        self.instance_ids.as_ref().is_some_and(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("public-dns-name", HostnameAttribute::PublicDnsName)]
    #[case("public_dns_name", HostnameAttribute::PublicDnsName)]
    #[case("private_ip_address", HostnameAttribute::PrivateIpAddress)]
    #[case(" Private-DNS-Name ", HostnameAttribute::PrivateDnsName)]
    #[case("instance-id", HostnameAttribute::InstanceId)]
    #[case("ip_address", HostnameAttribute::PublicIpAddress)]
    #[case("id", HostnameAttribute::InstanceId)]
    fn hostname_attribute_parses_known_names(
        #[case] input: &str,
        #[case] expected: HostnameAttribute,
    ) {
        assert_eq!(input.parse::<HostnameAttribute>(), Ok(expected));
    }

    #[rstest]
    fn hostname_attribute_rejects_unknown_names() {
        assert_eq!(
            "ip".parse::<HostnameAttribute>(),
            Err(UnknownAttribute(String::from("ip")))
        );
    }

    #[rstest]
    fn instance_record_treats_empty_attribute_as_absent() {
        let record = InstanceRecord {
            instance_id: InstanceId::from("i-1"),
            public_dns_name: Some(String::new()),
            private_ip_address: Some(String::from("10.0.0.1")),
            ..InstanceRecord::default()
        };
        assert_eq!(record.attribute(HostnameAttribute::PublicDnsName), None);
        assert_eq!(record.attribute(HostnameAttribute::PublicIpAddress), None);
        assert_eq!(
            record.attribute(HostnameAttribute::PrivateIpAddress),
            Some("10.0.0.1")
        );
        assert_eq!(record.attribute(HostnameAttribute::InstanceId), Some("i-1"));
    }

    #[rstest]
    fn default_instance_record_has_no_attributes() {
        let record = InstanceRecord::default();
        for attribute in HostnameAttribute::ALL {
            assert_eq!(record.attribute(attribute), None, "{attribute:?}");
        }
    }

    #[rstest]
    fn vpc_only_instance_needs_a_private_attribute() {
        let record = InstanceRecord {
            instance_id: InstanceId::from("i-1"),
            private_ip_address: Some(String::from("10.0.0.1")),
            ..InstanceRecord::default()
        };
        assert_eq!(record.attribute(HostnameAttribute::default()), None);
        assert_eq!(
            record.attribute("private-ip-address".parse().expect("known attribute")),
            Some("10.0.0.1")
        );
    }

    #[rstest]
    fn stack_description_navigates_partial_responses() {
        let empty: StackResourceDescription =
            serde_json::from_str("{}").expect("empty object should parse");
        assert_eq!(empty.physical_resource_id(), None);

        let no_id: StackResourceDescription =
            serde_json::from_str(r#"{"StackResourceDetail":{"LogicalResourceId":"Web"}}"#)
                .expect("detail without id should parse");
        assert_eq!(no_id.physical_resource_id(), None);
    }

    #[rstest]
    #[case("tag:Role=web", "tag:Role", &["web"])]
    #[case("instance-state-name=running,pending", "instance-state-name", &["running", "pending"])]
    fn instance_filter_parses_expressions(
        #[case] input: &str,
        #[case] name: &str,
        #[case] values: &[&str],
    ) {
        let filter: InstanceFilter = input.parse().expect("filter should parse");
        assert_eq!(filter, InstanceFilter::new(name, values.iter().copied()));
    }

    #[rstest]
    #[case("tag:Role")]
    #[case("=web")]
    #[case("tag:Role=")]
    fn instance_filter_rejects_malformed_expressions(#[case] input: &str) {
        assert_eq!(
            input.parse::<InstanceFilter>(),
            Err(InvalidFilter(input.to_owned()))
        );
    }

    #[rstest]
    fn empty_id_query_matches_nothing() {
        assert!(InstanceQuery::by_ids(Vec::new()).matches_nothing());
        assert!(!InstanceQuery::default().matches_nothing());
        assert!(!InstanceQuery::by_ids([InstanceId::from("i-1")]).matches_nothing());
    }
}
