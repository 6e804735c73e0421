//! # CLI Argument Definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use stride_domain::ErrorCategory;

#[derive(Debug, Parser)]
#[command(name = "stride-errlog")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect the persisted enrollment error journal")]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Args)]
pub(crate) struct GlobalArgs {
    /// Config file (TOML/JSON/YAML). Defaults to an optional `stride.*` in the working dir.
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Journal file to operate on, overriding `journal.dir` from the config.
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) log_file: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub(crate) json: bool,

    /// Emit debug logs on stderr.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List journal entries, newest first
    List {
        /// Show at most N entries
        #[arg(short = 'n', long, value_name = "N")]
        limit: Option<usize>,
        /// Only entries of this category (network, payment, auth, validation, system)
        #[arg(short, long)]
        category: Option<ErrorCategory>,
        /// Only entries produced by this wizard step
        #[arg(short, long)]
        step: Option<String>,
    },
    /// Show one entry in full
    Show {
        /// Entry id as printed by `list`
        id: String,
    },
    /// Summarize the journal
    Stats {},
    /// Remove every entry from the journal
    Clear {},
    /// Classify a raw failure object, e.g. '{"code":"auth/code-expired"}'
    Classify {
        /// Failure as JSON text
        #[arg(id = "payload", value_name = "JSON")]
        json: String,
        /// Also record the classified error under this step
        #[arg(long, value_name = "STEP")]
        record: Option<String>,
    },
    /// Print the backoff schedule of the configured retry policy
    Schedule {},
}
