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

//! Cloud event recorder.
//!
//! Emits human-readable Normal/Warning Events against the Service and
//! Deployment objects backing a cloud load balancer.

use std::fmt;
use std::str::FromStr;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ObjectReference, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::{Client, Resource, ResourceExt};
use thiserror::Error;

/// Maximum length of a cloud provider load balancer name.
const LB_NAME_MAX_LEN: usize = 32;

/// The reason for a cloud event.
///
/// The canonical string form of each reason is what appears in the Event's
/// `reason` field and is what [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudEventReason {
    /// A load balancer operation completed normally.
    CloudLoadBalancerNormalEvent,
    /// Creating the load balancer failed.
    CreatingCloudLoadBalancerFailed,
    /// Updating the load balancer failed.
    UpdatingCloudLoadBalancerFailed,
    /// Deleting the load balancer failed.
    DeletingCloudLoadBalancerFailed,
    /// Deleting a load balancer pod failed.
    DeletingLoadBalancerPodFailed,
    /// Retrieving the load balancer failed.
    GettingCloudLoadBalancerFailed,
    /// Verifying the load balancer configuration failed.
    VerifyingCloudLoadBalancerFailed,
    /// Moving the load balancer failed because traffic is local-only.
    MovingCloudLoadBalancerFailedLocalOnlyTraffic,
    /// A VPC load balancer operation completed normally.
    CloudVpcLoadBalancerNormalEvent,
    /// The VPC load balancer is under maintenance.
    CloudVpcLoadBalancerMaintenance,
    /// The VPC load balancer is in a failed state.
    CloudVpcLoadBalancerFailed,
    /// The VPC load balancer was not found.
    CloudVpcLoadBalancerNotFound,
}

impl CloudEventReason {
    /// All known reasons, in declaration order.
    pub const ALL: [CloudEventReason; 12] = [
        CloudEventReason::CloudLoadBalancerNormalEvent,
        CloudEventReason::CreatingCloudLoadBalancerFailed,
        CloudEventReason::UpdatingCloudLoadBalancerFailed,
        CloudEventReason::DeletingCloudLoadBalancerFailed,
        CloudEventReason::DeletingLoadBalancerPodFailed,
        CloudEventReason::GettingCloudLoadBalancerFailed,
        CloudEventReason::VerifyingCloudLoadBalancerFailed,
        CloudEventReason::MovingCloudLoadBalancerFailedLocalOnlyTraffic,
        CloudEventReason::CloudVpcLoadBalancerNormalEvent,
        CloudEventReason::CloudVpcLoadBalancerMaintenance,
        CloudEventReason::CloudVpcLoadBalancerFailed,
        CloudEventReason::CloudVpcLoadBalancerNotFound,
    ];

    /// Returns the canonical string form of this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudEventReason::CloudLoadBalancerNormalEvent => "CloudLoadBalancerNormalEvent",
            CloudEventReason::CreatingCloudLoadBalancerFailed => "CreatingCloudLoadBalancerFailed",
            CloudEventReason::UpdatingCloudLoadBalancerFailed => "UpdatingCloudLoadBalancerFailed",
            CloudEventReason::DeletingCloudLoadBalancerFailed => "DeletingCloudLoadBalancerFailed",
            CloudEventReason::DeletingLoadBalancerPodFailed => "DeletingLoadBalancerPodFailed",
            CloudEventReason::GettingCloudLoadBalancerFailed => "GettingCloudLoadBalancerFailed",
            CloudEventReason::VerifyingCloudLoadBalancerFailed => {
                "VerifyingCloudLoadBalancerFailed"
            }
            CloudEventReason::MovingCloudLoadBalancerFailedLocalOnlyTraffic => {
                "MovingCloudLoadBalancerFailedLocalOnlyTraffic"
            }
            CloudEventReason::CloudVpcLoadBalancerNormalEvent => "CloudVPCLoadBalancerNormalEvent",
            CloudEventReason::CloudVpcLoadBalancerMaintenance => "CloudVPCLoadBalancerMaintenance",
            CloudEventReason::CloudVpcLoadBalancerFailed => "CloudVPCLoadBalancerFailed",
            CloudEventReason::CloudVpcLoadBalancerNotFound => "CloudVPCLoadBalancerNotFound",
        }
    }

    /// Returns the action verb recorded alongside this reason.
    fn action(&self) -> &'static str {
        match self {
            CloudEventReason::CloudLoadBalancerNormalEvent
            | CloudEventReason::CloudVpcLoadBalancerNormalEvent
            | CloudEventReason::CloudVpcLoadBalancerFailed => "EnsureLoadBalancer",
            CloudEventReason::CreatingCloudLoadBalancerFailed => "CreateLoadBalancer",
            CloudEventReason::UpdatingCloudLoadBalancerFailed => "UpdateLoadBalancer",
            CloudEventReason::DeletingCloudLoadBalancerFailed => "DeleteLoadBalancer",
            CloudEventReason::DeletingLoadBalancerPodFailed => "DeleteLoadBalancerPod",
            CloudEventReason::GettingCloudLoadBalancerFailed
            | CloudEventReason::CloudVpcLoadBalancerNotFound => "GetLoadBalancer",
            CloudEventReason::VerifyingCloudLoadBalancerFailed => "VerifyLoadBalancer",
            CloudEventReason::MovingCloudLoadBalancerFailedLocalOnlyTraffic => "MoveLoadBalancer",
            CloudEventReason::CloudVpcLoadBalancerMaintenance => "MaintainLoadBalancer",
        }
    }
}

impl fmt::Display for CloudEventReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`CloudEventReason`] from a string fails.
#[derive(Debug, Clone, Error)]
#[error("unknown cloud event reason: {0}")]
pub struct ParseReasonError(String);

impl FromStr for CloudEventReason {
    type Err = ParseReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CloudEventReason::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| ParseReasonError(s.to_string()))
    }
}

/// An error representing a recorded warning event.
///
/// Its display text is byte-identical to the message of the Event that was
/// published to the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CloudEventError(String);

impl CloudEventError {
    /// Creates an error carrying the given event message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Returns the event message this error represents.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Returns the cloud provider's name for the load balancer of a Service.
///
/// This is the upstream default derivation: `"a"` followed by the Service
/// UID with dashes removed, truncated to 32 characters.
pub fn load_balancer_name(service: &Service) -> String {
    let uid = service.uid().unwrap_or_default();
    let mut name = format!("a{}", uid.replace('-', ""));
    name.truncate(LB_NAME_MAX_LEN);
    name
}

/// Records cloud load balancer events against cluster objects.
///
/// Publishing is best-effort: a failed publish is logged and never surfaces
/// to the caller, matching the fire-and-forget semantics of the Kubernetes
/// event pipeline.
pub struct CloudEventRecorder {
    name: String,
    recorder: Recorder,
}

impl CloudEventRecorder {
    /// Creates a cloud event recorder for the given provider.
    ///
    /// The recording component is named `<provider-name>-cloud-provider`.
    pub fn new(provider_name: &str, client: Client) -> Self {
        let name = format!("{}{}", provider_name, crate::CLOUD_PROVIDER_COMPONENT_SUFFIX);
        let reporter = Reporter {
            controller: name.clone(),
            instance: None,
        };
        Self {
            name,
            recorder: Recorder::new(client, reporter),
        }
    }

    /// Returns the recording component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records a load balancer event against both the Deployment and the
    /// Service.
    pub async fn load_balancer_normal_event(
        &self,
        lb_deployment: &Deployment,
        lb_service: &Service,
        reason: CloudEventReason,
        event_message: &str,
    ) {
        let message = pair_message("Event", lb_deployment, lb_service, event_message);
        self.publish(
            lb_deployment.object_ref(&()),
            EventType::Normal,
            reason,
            &message,
        )
        .await;
        self.publish(
            lb_service.object_ref(&()),
            EventType::Normal,
            reason,
            &message,
        )
        .await;
    }

    /// Records load balancer Deployment and Service warning events and
    /// returns an error representing them.
    pub async fn load_balancer_warning_event(
        &self,
        lb_deployment: &Deployment,
        lb_service: &Service,
        reason: CloudEventReason,
        error_message: &str,
    ) -> CloudEventError {
        let message = pair_message("Error", lb_deployment, lb_service, error_message);
        self.publish(
            lb_deployment.object_ref(&()),
            EventType::Warning,
            reason,
            &message,
        )
        .await;
        self.publish(
            lb_service.object_ref(&()),
            EventType::Warning,
            reason,
            &message,
        )
        .await;
        CloudEventError::new(message)
    }

    /// Records a load balancer Service warning event and returns an error
    /// representing it.
    pub async fn load_balancer_service_warning_event(
        &self,
        lb_service: &Service,
        reason: CloudEventReason,
        error_message: &str,
    ) -> CloudEventError {
        let message = service_message(
            "Error",
            &load_balancer_name(lb_service),
            lb_service,
            error_message,
        );
        self.publish(
            lb_service.object_ref(&()),
            EventType::Warning,
            reason,
            &message,
        )
        .await;
        CloudEventError::new(message)
    }

    /// Records a VPC load balancer Service warning event and returns an
    /// error representing it.
    pub async fn vpc_load_balancer_service_warning_event(
        &self,
        lb_service: &Service,
        reason: CloudEventReason,
        lb_name: &str,
        error_message: &str,
    ) -> CloudEventError {
        let message = service_message("Error", lb_name, lb_service, error_message);
        self.publish(
            lb_service.object_ref(&()),
            EventType::Warning,
            reason,
            &message,
        )
        .await;
        CloudEventError::new(message)
    }

    /// Records a VPC load balancer Service event.
    pub async fn vpc_load_balancer_service_normal_event(
        &self,
        lb_service: &Service,
        reason: CloudEventReason,
        lb_name: &str,
        event_message: &str,
    ) {
        let message = service_message("Event", lb_name, lb_service, event_message);
        self.publish(
            lb_service.object_ref(&()),
            EventType::Normal,
            reason,
            &message,
        )
        .await;
    }

    /// Publishes a single event, logging on failure.
    async fn publish(
        &self,
        reference: ObjectReference,
        type_: EventType,
        reason: CloudEventReason,
        message: &str,
    ) {
        let event = Event {
            type_,
            reason: reason.to_string(),
            note: Some(message.to_string()),
            action: reason.action().to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, &reference).await {
            tracing::warn!(error = %e, reason = %reason, "failed to publish cloud event");
        }
    }
}

impl fmt::Debug for CloudEventRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudEventRecorder")
            .field("name", &self.name)
            .finish()
    }
}

/// Namespace/name rendering, `{namespace}/{name}`.
struct NamespacedName<'a> {
    namespace: &'a str,
    name: &'a str,
}

impl fmt::Display for NamespacedName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

fn namespaced(meta: &ObjectMeta) -> NamespacedName<'_> {
    NamespacedName {
        namespace: meta.namespace.as_deref().unwrap_or_default(),
        name: meta.name.as_deref().unwrap_or_default(),
    }
}

fn pair_message(
    prefix: &str,
    lb_deployment: &Deployment,
    lb_service: &Service,
    detail: &str,
) -> String {
    format!(
        "{} on cloud load balancer {} with associated deployment {} for service {} with UID {}: {}",
        prefix,
        load_balancer_name(lb_service),
        namespaced(&lb_deployment.metadata),
        namespaced(&lb_service.metadata),
        lb_service.uid().unwrap_or_default(),
        detail,
    )
}

fn service_message(prefix: &str, lb_name: &str, lb_service: &Service, detail: &str) -> String {
    format!(
        "{} on cloud load balancer {} for service {} with UID {}: {}",
        prefix,
        lb_name,
        namespaced(&lb_service.metadata),
        lb_service.uid().unwrap_or_default(),
        detail,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_service() -> Service {
        Service {
            metadata: ObjectMeta {
                namespace: Some("default".to_string()),
                name: Some("my-lb-service".to_string()),
                uid: Some("1234-abcd-5678-ef90".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn make_deployment() -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                namespace: Some("kube-system".to_string()),
                name: Some("my-lb-deployment".to_string()),
                uid: Some("aaaa-bbbb".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_load_balancer_name_strips_dashes() {
        let service = make_service();
        assert_eq!(load_balancer_name(&service), "a1234abcd5678ef90");
    }

    #[test]
    fn test_load_balancer_name_truncates() {
        let mut service = make_service();
        service.metadata.uid = Some("0123456789-0123456789-0123456789-0123456789".to_string());
        let name = load_balancer_name(&service);
        assert_eq!(name.len(), 32);
        assert!(name.starts_with("a0123456789"));
    }

    #[test]
    fn test_load_balancer_name_without_uid() {
        let mut service = make_service();
        service.metadata.uid = None;
        assert_eq!(load_balancer_name(&service), "a");
    }

    #[test]
    fn test_pair_message_format() {
        let message = pair_message("Event", &make_deployment(), &make_service(), "all good");
        assert_eq!(
            message,
            "Event on cloud load balancer a1234abcd5678ef90 with associated deployment \
             kube-system/my-lb-deployment for service default/my-lb-service with UID \
             1234-abcd-5678-ef90: all good"
        );
    }

    #[test]
    fn test_pair_message_is_deterministic() {
        let deployment = make_deployment();
        let service = make_service();
        let first = pair_message("Error", &deployment, &service, "boom");
        let second = pair_message("Error", &deployment, &service, "boom");
        assert_eq!(first, second);
    }

    #[test]
    fn test_service_message_format() {
        let message = service_message("Error", "my-vpc-lb", &make_service(), "not found");
        assert_eq!(
            message,
            "Error on cloud load balancer my-vpc-lb for service default/my-lb-service \
             with UID 1234-abcd-5678-ef90: not found"
        );
    }

    #[test]
    fn test_reason_round_trip() {
        for reason in CloudEventReason::ALL {
            let parsed: CloudEventReason = reason.as_str().parse().unwrap();
            assert_eq!(parsed, reason);
        }
    }

    #[test]
    fn test_reason_canonical_strings() {
        assert_eq!(
            CloudEventReason::CreatingCloudLoadBalancerFailed.as_str(),
            "CreatingCloudLoadBalancerFailed"
        );
        assert_eq!(
            CloudEventReason::CloudVpcLoadBalancerMaintenance.as_str(),
            "CloudVPCLoadBalancerMaintenance"
        );
        assert_eq!(
            CloudEventReason::MovingCloudLoadBalancerFailedLocalOnlyTraffic.as_str(),
            "MovingCloudLoadBalancerFailedLocalOnlyTraffic"
        );
    }

    #[test]
    fn test_reason_parse_rejects_unknown() {
        let err = "NotAReason".parse::<CloudEventReason>().unwrap_err();
        assert!(err.to_string().contains("NotAReason"));
    }

    #[test]
    fn test_cloud_event_error_text_matches_message() {
        let message = pair_message("Error", &make_deployment(), &make_service(), "boom");
        let err = CloudEventError::new(message.clone());
        assert_eq!(err.to_string(), message);
        assert_eq!(err.message(), message);
    }

    #[test]
    fn test_every_reason_has_an_action() {
        for reason in CloudEventReason::ALL {
            assert!(!reason.action().is_empty());
        }
    }
}
