use kube::config::KubeconfigError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures that stop the process before the interactive session starts.
#[derive(Debug, Error)]
pub enum FatalStartupError {
    #[error("failed to read runtime config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse runtime config {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to load kubeconfig")]
    Kubeconfig(#[source] KubeconfigError),

    #[error("failed to build cluster configuration from kubeconfig")]
    ClusterConfig(#[source] KubeconfigError),

    #[error("failed to initialize Kubernetes client")]
    Client(#[source] kube::Error),

    #[error("failed to list API groups")]
    GroupListing(#[source] kube::Error),

    #[error("resource discovery timed out after {0:?}")]
    DiscoveryTimedOut(Duration),

    #[error("resource discovery failed for all {failed} API group versions")]
    NothingDiscovered { failed: usize },
}
