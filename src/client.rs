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

//! Typed API clients for the resources the recorder touches.

use anyhow::Context;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Event as CoreEvent, Service};
use kube::{Api, Client};

use crate::config::CloudConfig;

/// A bundle of typed API clients sharing one connection.
#[derive(Clone)]
pub struct ClientSet {
    client: Client,
}

impl ClientSet {
    /// Connects to the apiserver described by the configuration.
    ///
    /// An explicit kubeconfig path wins over a master URL; with neither set
    /// the client is inferred from the environment.
    pub async fn connect(config: &CloudConfig) -> anyhow::Result<Self> {
        use kube::config::{KubeConfigOptions, Kubeconfig};
        use kube::Config;

        let mut kube_config = if let Some(kubeconfig_path) = &config.generic.kubeconfig {
            let kubeconfig = Kubeconfig::read_from(kubeconfig_path)
                .with_context(|| format!("failed to read kubeconfig from: {:?}", kubeconfig_path))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .with_context(|| format!("failed to load kubeconfig from: {:?}", kubeconfig_path))?
        } else if let Some(master_url) = &config.generic.master {
            let uri = master_url
                .parse::<http::Uri>()
                .with_context(|| format!("invalid master URL: {}", master_url))?;
            Config::new(uri)
        } else {
            Config::infer().await.context("failed to load kubeconfig")?
        };

        kube_config.connect_timeout = Some(config.generic.request_timeout);
        kube_config.read_timeout = Some(config.generic.request_timeout);

        let client = Client::try_from(kube_config).context("failed to build client")?;
        Ok(Self { client })
    }

    /// Wraps an already-built client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns a Service API scoped to the given namespace.
    pub fn services(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Returns a Service API spanning all namespaces.
    pub fn all_services(&self) -> Api<Service> {
        Api::all(self.client.clone())
    }

    /// Returns a Deployment API scoped to the given namespace.
    pub fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Returns an Event API scoped to the given namespace.
    pub fn events(&self, namespace: &str) -> Api<CoreEvent> {
        Api::namespaced(self.client.clone(), namespace)
    }
}
