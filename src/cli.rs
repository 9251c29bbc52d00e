use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "neutron-plugin-ovs")]
#[command(version)]
#[command(about = "Declarative settings for the Open vSwitch neutron plugin file", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Plugin INI file to manage (overrides the manifest's `path`)
    #[arg(long, global = true, env = "NEUTRON_PLUGIN_OVS_FILE")]
    pub file: Option<String>,

    /// Create the file if it does not exist
    #[arg(long, global = true)]
    pub create: bool,

    /// Drop section headers left without settings after a removal
    #[arg(long, global = true)]
    pub prune_empty_sections: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge the file to the manifest
    Apply(ApplyArgs),

    /// Preview what apply would change
    Diff(ManifestArgs),

    /// Show which settings are in sync, drifted, or failing
    Status(ManifestArgs),

    /// Print the current value of a setting
    Get {
        /// Setting identity (<section>/<setting>)
        identity: String,
    },

    /// Set a single setting
    Set {
        /// Setting identity (<section>/<setting>)
        identity: String,
        /// Desired value (surrounding whitespace is ignored)
        value: String,
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove a single setting
    Unset {
        /// Setting identity (<section>/<setting>)
        identity: String,
        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Manifest declaring the settings
    #[arg(short, long, env = "NEUTRON_PLUGIN_OVS_MANIFEST")]
    pub manifest: Option<String>,

    /// Only settings matching this target (`neutron_plugin_ovs.<identity>` or a substring)
    pub target: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub source: ManifestArgs,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Number of settings applied in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}
