use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config, ResourceExt};
use std::path::Path;
use tracing::debug;

use crate::error::ClusterQueryError;
use crate::model::SelectableItem;

/// Read access to the three listing levels the navigator walks through.
///
/// Every call goes to the API server; nothing is cached between calls.
pub trait ClusterGateway {
    async fn list_namespaces(&self) -> Result<Vec<SelectableItem>, ClusterQueryError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<SelectableItem>, ClusterQueryError>;

    async fn list_containers(
        &self,
        namespace: &str,
        pod: &str,
    ) -> Result<Vec<SelectableItem>, ClusterQueryError>;
}

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    context: String,
}

impl KubeGateway {
    pub async fn new(kubeconfig_path: Option<&Path>, context: Option<String>) -> Result<Self> {
        let kubeconfig = match kubeconfig_path {
            Some(path) => Some(
                Kubeconfig::read_from(path)
                    .with_context(|| format!("failed to read kubeconfig {}", path.display()))?,
            ),
            None => Kubeconfig::read().ok(),
        };

        let config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .context("failed to infer Kubernetes configuration")?
        } else {
            if context.is_some() {
                anyhow::bail!("kubeconfig not found; --context cannot be applied");
            }
            Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?
        };

        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;
        let active_context = context
            .or_else(|| {
                kubeconfig
                    .as_ref()
                    .and_then(|cfg| cfg.current_context.clone())
            })
            .unwrap_or_else(|| "in-cluster".to_string());

        Ok(Self {
            client,
            context: active_context,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }
}

impl ClusterGateway for KubeGateway {
    async fn list_namespaces(&self) -> Result<Vec<SelectableItem>, ClusterQueryError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .map_err(|error| ClusterQueryError::new("list namespaces", error))?;
        debug!(count = list.items.len(), "listed namespaces");

        Ok(list
            .into_iter()
            .map(|namespace| SelectableItem::new(namespace.name_any()))
            .collect())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<SelectableItem>, ClusterQueryError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods
            .list(&ListParams::default())
            .await
            .map_err(|error| ClusterQueryError::new(format!("list pods in {namespace}"), error))?;
        debug!(namespace, count = list.items.len(), "listed pods");

        Ok(list.into_iter().map(|pod| pod_item(&pod)).collect())
    }

    async fn list_containers(
        &self,
        namespace: &str,
        pod: &str,
    ) -> Result<Vec<SelectableItem>, ClusterQueryError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pod = pods.get(pod).await.map_err(|error| {
            ClusterQueryError::new(format!("list containers of {namespace}/{pod}"), error)
        })?;

        let items = container_items(&pod);
        debug!(namespace, pod = %pod.name_any(), count = items.len(), "listed containers");
        Ok(items)
    }
}

fn pod_item(pod: &Pod) -> SelectableItem {
    SelectableItem::with_metadata(pod.name_any(), pod.labels().clone())
}

/// Containers of the pod spec, each carrying the owning pod's labels.
fn container_items(pod: &Pod) -> Vec<SelectableItem> {
    let labels = pod.labels().clone();
    pod.spec
        .as_ref()
        .map(|spec| {
            spec.containers
                .iter()
                .map(|container| SelectableItem::with_metadata(&container.name, labels.clone()))
                .collect()
        })
        .unwrap_or_default()
}
