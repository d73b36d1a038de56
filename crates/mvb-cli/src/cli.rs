use clap::{Args, Parser, Subcommand};

use mvb_core::DEFAULT_WORKERS;

#[derive(Parser)]
#[command(
    name = "mvb",
    about = "Minimal versioned backup: content-addressed snapshots of a single tree",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store root holding ref, index, and objects/
    #[arg(long, global = true, default_value = ".")]
    pub store: String,

    /// Worker cap for hashing, copying, and verification
    #[arg(long, global = true, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a store that backs up the given tree
    Init(InitArgs),
    /// Record a new version of the reference tree
    Backup(BackupArgs),
    /// Show the manifest and id a backup would record, without writing
    Preview(PreviewArgs),
    /// List versions, newest first
    List(ListArgs),
    /// Print a version's manifest, a directory listing, or file content
    Get(GetArgs),
    /// Show changes between versions or against the reference tree
    Diff(DiffArgs),
    /// Rewrite a tree to match a version
    Restore(RestoreArgs),
    /// Build a read-only symlink view of a version
    Link(LinkArgs),
    /// Remove versions from the index
    Delete(DeleteArgs),
    /// Re-hash every stored object against its address
    Check(CheckArgs),
    /// Remove objects no version references
    Gc(GcArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Path of the tree to back up
    pub path: String,
}

#[derive(Args)]
pub struct BackupArgs {}

#[derive(Args)]
pub struct PreviewArgs {}

#[derive(Args)]
pub struct ListArgs {
    /// `v<k>`, digest prefix, or timestamp prefix
    pub pattern: Option<String>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Version to read (`v<k>` or prefix); omit to list all versions
    pub version: Option<String>,
    /// File to print, or directory (trailing `/`) to list
    pub path: Option<String>,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Older side; defaults to the newest version
    pub from: Option<String>,
    /// Newer side; defaults to the reference tree as it is now
    pub to: Option<String>,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Version to restore; defaults to the newest
    pub version: Option<String>,
    /// Target directory; defaults to the reference tree
    pub path: Option<String>,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Version to link (`v<k>` or prefix)
    pub version: String,
    /// Existing empty directory to fill with symlinks
    pub path: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// `v<k>` removes one version, a prefix removes every match
    pub pattern: String,
}

#[derive(Args)]
pub struct CheckArgs {}

#[derive(Args)]
pub struct GcArgs {}
