//! JSON envelopes printed by `aws ... --output json`.

use serde::Deserialize;

use crate::cloud::{Reservation, ScalingGroup};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DescribeAutoScalingGroups {
    #[serde(default)]
    pub(super) auto_scaling_groups: Vec<ScalingGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DescribeInstances {
    #[serde(default)]
    pub(super) reservations: Vec<Reservation>,
}
