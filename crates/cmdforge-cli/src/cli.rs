//! Command-line surface. One root command (`cmdforge`), global
//! flags that apply regardless of subcommand, and a single positional
//! request that is equivalent to `generate <text>` when no subcommand is
//! given.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(name = "cmdforge", author, version, about = "Turns a natural-language request into a shell command.")]
pub struct Cli {
    /// Analyze the generated command without running it.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print the error wrap chain and the context keys attached to a failure.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Provider name (empty = the configured default).
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model name (empty = the provider's own default).
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Bypass the confirmation gate up to the provider's bypass ceiling.
    #[arg(long, global = true)]
    pub skip_confirmation: bool,

    /// Skip asking the Result Validator to judge the execution (it runs by
    /// default, unless the persisted configuration already disables it).
    #[arg(long, global = true)]
    pub no_validate_results: bool,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Natural-language request. Equivalent to `generate <TEXT>` when no
    /// subcommand is given.
    pub text: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate a natural-language request into a shell command.
    Generate { text: String },

    /// Manage persisted configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Interactive session (not implemented in this build).
    Session,

    /// Self-update.
    Update {
        #[command(subcommand)]
        action: UpdateAction,

        /// Consider prerelease versions when checking/installing.
        #[arg(long)]
        prerelease: bool,

        /// Skip creating a backup of the current binary before installing.
        #[arg(long)]
        no_backup: bool,
    },

    /// Print the version and exit.
    Version,

    /// Generate a shell completion script.
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Interactive first-run setup (not implemented in this build).
    Setup,
    /// Print the persisted configuration document.
    Show,
    /// Overwrite the persisted configuration with defaults.
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum UpdateAction {
    /// Check whether a newer release is available.
    Check,
    /// Download and install the latest release.
    Install,
}
