// Copyright 2025 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Portable subnet error aggregation.
//!
//! Load balancer creation can fail because the cluster's portable subnets
//! are misconfigured. This module condenses the per-VLAN subnet errors into
//! a single sentence suitable for appending to a failure event message.

use std::collections::BTreeMap;

const LB_PORTABLE_SUBNET_MESSAGE: &str =
    "The configuration of the cluster's portable subnets has the following issues:";
const LB_DOC_TROUBLESHOOT_MESSAGE: &str =
    "For more information read the load balancer troubleshooting documentation.";
const LB_NO_IPS_MESSAGE: &str =
    "No cloud provider IPs are available to fulfill the load balancer service request.";
const LB_DOC_REFERENCE_MESSAGE: &str =
    "For more information read the load balancer documentation.";

/// A configuration problem reported for one portable subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetConfigError {
    /// Short code classifying the problem.
    pub reason_code: String,
    /// Human-readable description of the problem.
    pub message: String,
}

/// Condenses per-VLAN subnet errors into a single event message fragment.
///
/// Occurrences of each reason code are counted across all VLANs and rendered
/// once, sorted by reason code. With no errors at all the generic "no IPs
/// available" sentence is returned instead.
pub fn subnet_issues_message(errors_by_vlan: &BTreeMap<String, Vec<SubnetConfigError>>) -> String {
    struct Aggregated<'a> {
        error: &'a SubnetConfigError,
        occurrences: usize,
    }

    let mut aggregated: BTreeMap<&str, Aggregated<'_>> = BTreeMap::new();
    for vlan_errors in errors_by_vlan.values() {
        for error in vlan_errors {
            aggregated
                .entry(error.reason_code.as_str())
                .and_modify(|entry| entry.occurrences += 1)
                .or_insert(Aggregated {
                    error,
                    occurrences: 1,
                });
        }
    }

    if aggregated.is_empty() {
        return format!("{} {}", LB_NO_IPS_MESSAGE, LB_DOC_REFERENCE_MESSAGE);
    }

    let issues = aggregated
        .values()
        .map(|entry| {
            format!(
                "[{}: {} - Number of Occurrences: {}.]",
                entry.error.reason_code, entry.error.message, entry.occurrences
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{} {} {}",
        LB_PORTABLE_SUBNET_MESSAGE, issues, LB_DOC_TROUBLESHOOT_MESSAGE
    )
}
