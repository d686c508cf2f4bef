use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::{Context, Result, anyhow};

use draftlink::host::FileHost;
use draftlink::model::ClientConfig;
use draftlink::session::Session;

use crate::cli_commands::Commands;

mod status_ops;
mod version_ops;

pub(super) fn handle_command(config: ClientConfig, command: Commands) -> Result<()> {
    // Last line of defence: report an unexpected panic as an error.
    match catch_unwind(AssertUnwindSafe(|| dispatch(config, command))) {
        Ok(result) => result,
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(anyhow!("internal error: {msg}"))
        }
    }
}

fn dispatch(config: ClientConfig, command: Commands) -> Result<()> {
    let session = Session::connect(config).context("set up service client")?;
    match command {
        Commands::Status(args) => status_ops::handle_status_command(&session, args.json),
        Commands::Watch(args) => status_ops::handle_watch_command(&session, args.cycles),
        Commands::Init(args) => version_ops::handle_init_command(&session, &args.file),
        Commands::Commit(args) => version_ops::handle_commit_command(
            &session,
            &args.target.file,
            &args.message,
            args.last_saved,
            args.json,
        ),
        Commands::Versions(args) => {
            version_ops::handle_versions_command(&session, &args.target.file, args.limit, args.json)
        }
        Commands::Rename(args) => version_ops::handle_rename_command(
            &session,
            &args.target.file,
            &args.version_id,
            &args.label,
        ),
        Commands::Restore(args) => {
            version_ops::handle_restore_command(&session, &args.target.file, &args.version_id)
        }
        Commands::Retrieve(args) => {
            version_ops::handle_retrieve_command(&session, &args.target.file, &args.version_id)
        }
    }
}

fn open_document(file: &std::path::Path) -> Result<FileHost> {
    FileHost::open_file(file).with_context(|| format!("open {}", file.display()))
}
