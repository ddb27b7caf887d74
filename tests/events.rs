//! Behavior tests for the public event recording surface.
//!
//! These tests pin down the observable contract: reason codes keep their
//! canonical wire strings, message-bearing errors carry the exact recorded
//! text, and load balancer names derive deterministically from Service UIDs.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use cloud_event_recorder::{
    load_balancer_name, subnet_issues_message, CloudEventError, CloudEventReason,
    SubnetConfigError, CLOUD_PROVIDER_COMPONENT_SUFFIX,
};

fn service_with_uid(uid: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            namespace: Some("default".to_string()),
            name: Some("frontend".to_string()),
            uid: Some(uid.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Test 1: every reason code round-trips through its canonical string
#[test]
fn test_reason_codes_round_trip() {
    let canonical = vec![
        "CloudLoadBalancerNormalEvent",
        "CreatingCloudLoadBalancerFailed",
        "UpdatingCloudLoadBalancerFailed",
        "DeletingCloudLoadBalancerFailed",
        "DeletingLoadBalancerPodFailed",
        "GettingCloudLoadBalancerFailed",
        "VerifyingCloudLoadBalancerFailed",
        "MovingCloudLoadBalancerFailedLocalOnlyTraffic",
        "CloudVPCLoadBalancerNormalEvent",
        "CloudVPCLoadBalancerMaintenance",
        "CloudVPCLoadBalancerFailed",
        "CloudVPCLoadBalancerNotFound",
    ];

    for s in canonical {
        let reason: CloudEventReason = s.parse().unwrap_or_else(|_| panic!("unknown: {}", s));
        assert_eq!(reason.to_string(), s);
    }
}

/// Test 2: the reason set is closed
#[test]
fn test_reason_set_is_closed() {
    assert_eq!(CloudEventReason::ALL.len(), 12);
    assert!("CloudLoadBalancerMaintenance"
        .parse::<CloudEventReason>()
        .is_err());
}

/// Test 3: load balancer names derive from the Service UID
#[test]
fn test_load_balancer_name_derivation() {
    let service = service_with_uid("8d916b2f-6177-4d0f-9f55-36a87ee64bd9");
    assert_eq!(
        load_balancer_name(&service),
        "a8d916b2f61774d0f9f5536a87ee64bd"
    );
    assert!(load_balancer_name(&service).len() <= 32);
}

/// Test 4: the same Service always yields the same name
#[test]
fn test_load_balancer_name_deterministic() {
    let service = service_with_uid("8d916b2f-6177-4d0f-9f55-36a87ee64bd9");
    assert_eq!(load_balancer_name(&service), load_balancer_name(&service));
}

/// Test 5: a cloud event error displays exactly its event message
#[test]
fn test_error_text_is_event_message() {
    let message = "Error on cloud load balancer a123 for service default/frontend \
                   with UID 123: creation failed";
    let err = CloudEventError::new(message);
    assert_eq!(err.to_string(), message);
    assert_eq!(err.message(), message);
}

/// Test 6: the recording component name suffix is stable
#[test]
fn test_component_suffix() {
    assert_eq!(CLOUD_PROVIDER_COMPONENT_SUFFIX, "-cloud-provider");
}

/// Test 7: subnet issues condense into one deterministic fragment
#[test]
fn test_subnet_issues_message() {
    let mut by_vlan = BTreeMap::new();
    by_vlan.insert(
        "1502".to_string(),
        vec![SubnetConfigError {
            reason_code: "E0001".to_string(),
            message: "subnet not bound to the cluster".to_string(),
        }],
    );

    let message = subnet_issues_message(&by_vlan);
    assert!(message.contains("E0001"));
    assert!(message.contains("Number of Occurrences: 1."));

    let empty = subnet_issues_message(&BTreeMap::new());
    assert!(empty.contains("No cloud provider IPs are available"));
}
