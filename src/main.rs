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

//! cloud-event-recorder - record cloud load balancer events
//!
//! A one-shot command that records a Normal or Warning event for a cloud
//! load balancer against the Service (and optionally the Deployment) that
//! backs it.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cloud_event_recorder::config::CloudConfig;
use cloud_event_recorder::recorder::{load_balancer_name, CloudEventReason, CloudEventRecorder};
use cloud_event_recorder::ClientSet;

/// Cloud load balancer event recorder
///
/// Records a human-readable event against the Service backing a cloud load
/// balancer, and against its associated Deployment when one is given.
/// Warning events also become the process error, so the exit status reflects
/// the recorded failure.
#[derive(Parser, Debug)]
#[command(name = "cloud-event-recorder")]
#[command(version)]
#[command(about = "Cloud load balancer event recorder", long_about = None)]
struct Args {
    /// Path to the kubeconfig file
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Master URL to build a client from
    #[arg(long, global = true)]
    master: Option<String>,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    log_json: bool,

    /// Namespace of the load balancer Service
    #[arg(long)]
    namespace: Option<String>,

    /// Cloud provider name; events are recorded by `<name>-cloud-provider`
    #[arg(long)]
    provider: Option<String>,

    /// Timeout for apiserver requests
    #[arg(long, value_parser = parse_duration)]
    request_timeout: Option<Duration>,

    /// Name of the load balancer Service
    #[arg(long)]
    service: String,

    /// Name of the associated load balancer Deployment
    #[arg(long)]
    deployment: Option<String>,

    /// Cloud provider name of the load balancer; derived from the Service
    /// UID when omitted
    #[arg(long)]
    load_balancer: Option<String>,

    /// Reason code for the event, e.g. CreatingCloudLoadBalancerFailed
    #[arg(long, value_parser = parse_reason)]
    reason: CloudEventReason,

    /// Message to record with the event
    #[arg(long)]
    message: String,

    /// Record a Warning event instead of a Normal one
    #[arg(long)]
    warning: bool,
}

fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    humantime::parse_duration(s).map_err(|e| anyhow::anyhow!("invalid duration: {}", e))
}

fn parse_reason(s: &str) -> anyhow::Result<CloudEventReason> {
    s.parse().map_err(|e| anyhow::anyhow!("{}", e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.log_json);

    let (config, args) = load_config(args).await?;

    info!(
        provider = %config.provider.name,
        namespace = %config.generic.namespace,
        "connecting to cluster"
    );

    let clients = ClientSet::connect(&config).await?;
    let namespace = &config.generic.namespace;

    let service = clients
        .services(namespace)
        .get(&args.service)
        .await
        .with_context(|| format!("failed to get service {}/{}", namespace, args.service))?;

    let deployment = match &args.deployment {
        Some(name) => Some(
            clients
                .deployments(namespace)
                .get(name)
                .await
                .with_context(|| format!("failed to get deployment {}/{}", namespace, name))?,
        ),
        None => None,
    };

    let recorder = CloudEventRecorder::new(&config.provider.name, clients.client().clone());

    match (deployment, args.warning) {
        (Some(deployment), false) => {
            recorder
                .load_balancer_normal_event(&deployment, &service, args.reason, &args.message)
                .await;
        }
        (Some(deployment), true) => {
            let err = recorder
                .load_balancer_warning_event(&deployment, &service, args.reason, &args.message)
                .await;
            return Err(err.into());
        }
        (None, true) => {
            let err = match &args.load_balancer {
                Some(lb_name) => {
                    recorder
                        .vpc_load_balancer_service_warning_event(
                            &service,
                            args.reason,
                            lb_name,
                            &args.message,
                        )
                        .await
                }
                None => {
                    recorder
                        .load_balancer_service_warning_event(&service, args.reason, &args.message)
                        .await
                }
            };
            return Err(err.into());
        }
        (None, false) => {
            let lb_name = args
                .load_balancer
                .clone()
                .unwrap_or_else(|| load_balancer_name(&service));
            recorder
                .vpc_load_balancer_service_normal_event(
                    &service,
                    args.reason,
                    &lb_name,
                    &args.message,
                )
                .await;
        }
    }

    info!(reason = %args.reason, service = %args.service, "event recorded");
    Ok(())
}

/// Initializes logging based on the provided level and format.
fn init_logging(level: &str, json: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.parse().unwrap())
        .from_env_lossy();

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

/// Loads the configuration from file and applies command-line overrides.
async fn load_config(mut args: Args) -> anyhow::Result<(CloudConfig, Args)> {
    let mut config = if let Some(config_path) = args.config.take() {
        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("failed to read config file: {:?}", config_path))?;

        serde_yaml::from_str::<CloudConfig>(&content)
            .with_context(|| format!("failed to parse config file: {:?}", config_path))?
    } else {
        CloudConfig::default()
    };

    if let Some(kubeconfig) = args.kubeconfig.take() {
        config.generic.kubeconfig = Some(kubeconfig);
    }
    if let Some(master) = args.master.take() {
        config.generic.master = Some(master);
    }
    if let Some(namespace) = args.namespace.take() {
        config.generic.namespace = namespace;
    }
    if let Some(provider) = args.provider.take() {
        config.provider.name = provider;
    }
    if let Some(timeout) = args.request_timeout.take() {
        config.generic.request_timeout = timeout;
    }

    Ok((config, args))
}
