//! CLI argument definitions

use burrow_namespace::{DEFAULT_HOSTNAME, NamespaceConfig};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(about = "Run a command in new Linux namespaces", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Hostname inside the new UTS namespace
    #[arg(long, default_value = DEFAULT_HOSTNAME)]
    pub hostname: String,

    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl Cli {
    /// Namespace configuration for this invocation
    pub fn namespace_config(&self) -> NamespaceConfig {
        NamespaceConfig::default().with_hostname(&self.hostname)
    }
}
