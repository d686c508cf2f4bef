use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Probe the service once and show connection and login state
    Status(StatusArgs),

    /// Poll the service in the background and print state changes
    Watch(WatchArgs),

    /// Enable version control for the file's directory
    Init(FileArgs),

    /// Save a new version of the file
    Commit(CommitArgs),

    /// List versions of the file
    Versions(VersionsArgs),

    /// Rename a version's label
    Rename(RenameArgs),

    /// Overwrite the file with a previous version
    Restore(VersionArgs),

    /// Write a previous version next to the file without touching it
    Retrieve(VersionArgs),
}

#[derive(Args)]
pub(crate) struct FileArgs {
    /// The file to operate on (the "open document")
    #[arg(long, short = 'f')]
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct StatusArgs {
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct WatchArgs {
    /// Stop after this many distinct states
    #[arg(long)]
    pub(crate) cycles: Option<usize>,
}

#[derive(Args)]
pub(crate) struct CommitArgs {
    #[command(flatten)]
    pub(crate) target: FileArgs,
    /// Version label
    #[arg(short = 'm', long, default_value = "New Version")]
    pub(crate) message: String,
    /// Version the file as it is on disk without saving first
    #[arg(long)]
    pub(crate) last_saved: bool,
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct VersionsArgs {
    #[command(flatten)]
    pub(crate) target: FileArgs,
    /// Show at most this many versions
    #[arg(long, default_value_t = 10)]
    pub(crate) limit: usize,
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct RenameArgs {
    #[command(flatten)]
    pub(crate) target: FileArgs,
    pub(crate) version_id: String,
    pub(crate) label: String,
}

#[derive(Args)]
pub(crate) struct VersionArgs {
    #[command(flatten)]
    pub(crate) target: FileArgs,
    pub(crate) version_id: String,
}
