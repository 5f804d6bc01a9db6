use clap::Parser;

/// Runtime settings come from the config file; the command line only carries
/// `--help` and `--version`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kestrel",
    version,
    about = "Browse and fuzzy-search the resource kinds exposed by a Kubernetes cluster."
)]
pub struct CliArgs {}
