use chrono::Local;
use futures::future::join_all;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIGroup, APIResourceList};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::fmt::Display;
use std::path::Path;
use tracing::{info, warn};

use crate::error::FatalStartupError;
use crate::model::{
    Catalog, DiscoveryWarning, GroupVersionResource, ResourceDescriptor, parse_group_version,
};

const CORE_GROUP_LABEL: &str = "core";

pub struct KubeGateway {
    client: Client,
    context: String,
    cluster: String,
}

impl KubeGateway {
    /// Builds a client from the kubeconfig at `kubeconfig` (or kube's default
    /// lookup) using `context` or the file's current context.
    pub async fn connect(
        kubeconfig: Option<&Path>,
        context: Option<String>,
    ) -> Result<Self, FatalStartupError> {
        let kubeconfig = match kubeconfig {
            Some(path) => Kubeconfig::read_from(path),
            None => Kubeconfig::read(),
        }
        .map_err(FatalStartupError::Kubeconfig)?;

        let active_context = context
            .clone()
            .or_else(|| kubeconfig.current_context.clone())
            .unwrap_or_else(|| "-".to_string());
        let options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(FatalStartupError::ClusterConfig)?;

        let cluster_url = config.cluster_url.to_string();
        let client = Client::try_from(config).map_err(FatalStartupError::Client)?;

        Ok(Self {
            client,
            context: active_context,
            cluster: cluster_url,
        })
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Enumerates listable, top-level resource kinds at each group's
    /// preferred version.
    ///
    /// A group version that fails to enumerate becomes a [`DiscoveryWarning`]
    /// instead of an error. The call only fails when the group list itself is
    /// unavailable or nothing at all could be enumerated.
    pub async fn list_resources(&self) -> Result<Catalog, FatalStartupError> {
        let mut group_versions = Vec::new();
        match self.client.list_core_api_versions().await {
            Ok(core) => group_versions.extend(core.versions.into_iter().take(1)),
            Err(error) => {
                warn!("core API version discovery failed: {error}");
                group_versions.push("v1".to_string());
            }
        }

        let groups = self
            .client
            .list_api_groups()
            .await
            .map_err(FatalStartupError::GroupListing)?;
        group_versions.extend(groups.groups.iter().filter_map(preferred_group_version));

        let lists = join_all(
            group_versions
                .iter()
                .map(|group_version| self.list_group_version(group_version)),
        )
        .await;

        let (resources, warnings) = collect_discovery(group_versions.iter().zip(lists))?;
        Ok(Catalog::new(resources, warnings, Local::now()))
    }

    async fn list_group_version(&self, group_version: &str) -> kube::Result<APIResourceList> {
        if group_version.contains('/') {
            self.client.list_api_group_resources(group_version).await
        } else {
            self.client.list_core_api_resources(group_version).await
        }
    }
}

fn preferred_group_version(group: &APIGroup) -> Option<String> {
    group
        .preferred_version
        .as_ref()
        .or_else(|| group.versions.first())
        .map(|version| version.group_version.clone())
}

fn group_version_label(group_version: &str) -> String {
    if group_version.contains('/') {
        group_version.to_string()
    } else {
        format!("{CORE_GROUP_LABEL}/{group_version}")
    }
}

/// Folds per-group-version listing results, in request order, into the
/// listable descriptors and one warning per failed group version. Fails only
/// when no group version could be listed.
fn collect_discovery<'a, E: Display>(
    results: impl IntoIterator<Item = (&'a String, Result<APIResourceList, E>)>,
) -> Result<(Vec<ResourceDescriptor>, Vec<DiscoveryWarning>), FatalStartupError> {
    let mut resources = Vec::new();
    let mut warnings = Vec::new();
    let mut succeeded = 0usize;
    for (group_version, result) in results {
        match result {
            Ok(list) => {
                succeeded += 1;
                resources.extend(listable_descriptors(&list));
            }
            Err(error) => warnings.push(DiscoveryWarning {
                group_version: group_version_label(group_version),
                reason: error.to_string(),
            }),
        }
    }

    if succeeded == 0 {
        return Err(FatalStartupError::NothingDiscovered {
            failed: warnings.len(),
        });
    }

    info!(
        resources = resources.len(),
        group_versions = succeeded,
        failed = warnings.len(),
        "resource discovery finished"
    );
    Ok((resources, warnings))
}

/// Keeps resources that support `list` and are not sub-resources, in the
/// order the server returned them.
pub fn listable_descriptors(list: &APIResourceList) -> Vec<ResourceDescriptor> {
    let Some((group, version)) = parse_group_version(&list.group_version) else {
        warn!("skipping malformed group version '{}'", list.group_version);
        return Vec::new();
    };

    list.resources
        .iter()
        .filter(|resource| {
            resource.verbs.iter().any(|verb| verb == "list") && !resource.name.contains('/')
        })
        .map(|resource| ResourceDescriptor {
            name: resource.name.clone(),
            kind: resource.kind.clone(),
            namespaced: resource.namespaced,
            gvr: GroupVersionResource {
                group: group.clone(),
                version: version.clone(),
                resource: resource.name.clone(),
            },
        })
        .collect()
}
