use chrono::{DateTime, Local};
use std::fmt::{Display, Formatter};

/// Identifies a resource within the cluster's API surface. The core group is
/// the empty string.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl Display for GroupVersionResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.resource)
    }
}

/// Splits an `apiVersion` string such as `apps/v1` or `v1` into group and
/// version. Returns `None` for malformed input.
pub fn parse_group_version(group_version: &str) -> Option<(String, String)> {
    let group_version = group_version.trim();
    if group_version.is_empty() {
        return None;
    }

    match group_version.split_once('/') {
        None => Some((String::new(), group_version.to_string())),
        Some((group, version))
            if !group.is_empty() && !version.is_empty() && !version.contains('/') =>
        {
            Some((group.to_string(), version.to_string()))
        }
        Some(_) => None,
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceDescriptor {
    pub name: String,
    pub kind: String,
    pub namespaced: bool,
    pub gvr: GroupVersionResource,
}

impl ResourceDescriptor {
    pub fn scope_label(&self) -> &'static str {
        if self.namespaced {
            "namespaced"
        } else {
            "cluster"
        }
    }
}

/// A group version whose resources could not be enumerated.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiscoveryWarning {
    pub group_version: String,
    pub reason: String,
}

/// Snapshot of the discoverable resource kinds, in discovery response order.
#[derive(Debug, Clone)]
pub struct Catalog {
    resources: Vec<ResourceDescriptor>,
    warnings: Vec<DiscoveryWarning>,
    fetched_at: DateTime<Local>,
}

impl Catalog {
    pub fn new(
        resources: Vec<ResourceDescriptor>,
        warnings: Vec<DiscoveryWarning>,
        fetched_at: DateTime<Local>,
    ) -> Self {
        Self {
            resources,
            warnings,
            fetched_at,
        }
    }

    pub fn warnings(&self) -> &[DiscoveryWarning] {
        &self.warnings
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.resources
            .iter()
            .map(|resource| resource.name.clone())
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&ResourceDescriptor> {
        self.resources.get(index)
    }
}
