use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "kshell",
    version,
    about = "Pick a namespace, pod and container, then drop into a shell inside it."
)]
pub struct CliArgs {
    /// Path to the kubeconfig file (defaults to $KUBECONFIG or ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kube context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,

    /// Path to a kshell config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Write logs to this file; logs are discarded otherwise
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Hide the label panel
    #[arg(long = "no-labels")]
    pub hide_labels: bool,
}
