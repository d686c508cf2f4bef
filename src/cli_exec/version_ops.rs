use std::path::Path;

use anyhow::{Context, Result, anyhow};

use draftlink::restore::RestoreError;
use draftlink::session::{CommitMode, Session};

use super::open_document;

pub(super) fn handle_init_command(session: &Session, file: &Path) -> Result<()> {
    let host = open_document(file)?;
    let root = session.init_project(&host)?;
    println!("Version control enabled for {}", root.display());
    Ok(())
}

pub(super) fn handle_commit_command(
    session: &Session,
    file: &Path,
    label: &str,
    last_saved: bool,
    json: bool,
) -> Result<()> {
    let mut host = open_document(file)?;
    let mode = if last_saved {
        CommitMode::LastSaved
    } else {
        CommitMode::SaveFirst
    };
    let report = session.commit(&mut host, label, mode)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report.receipt).context("serialize commit json")?
        );
    } else {
        println!(
            "Version saved (v{}, id {})",
            report.receipt.version_number, report.receipt.version_id
        );
    }
    Ok(())
}

pub(super) fn handle_versions_command(
    session: &Session,
    file: &Path,
    limit: usize,
    json: bool,
) -> Result<()> {
    let host = open_document(file)?;
    let versions = session.versions(&host)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&versions).context("serialize versions json")?
        );
        return Ok(());
    }

    if versions.is_empty() {
        println!("No versions found for {}", file.display());
        return Ok(());
    }
    for v in versions.iter().take(limit) {
        println!("{}  {}", v.id, v.display_line());
    }
    if versions.len() > limit {
        println!("+ {} more versions", versions.len() - limit);
    }
    Ok(())
}

pub(super) fn handle_rename_command(
    session: &Session,
    file: &Path,
    version_id: &str,
    label: &str,
) -> Result<()> {
    let host = open_document(file)?;
    session
        .rename_version(&host, version_id, label)
        .context("rename failed")?;
    println!("Version renamed");
    Ok(())
}

pub(super) fn handle_restore_command(session: &Session, file: &Path, version_id: &str) -> Result<()> {
    let mut host = open_document(file)?;
    match session.restore_version(&mut host, version_id) {
        Ok(outcome) => {
            println!(
                "Restored version {} into {}",
                outcome.version_id,
                outcome.target.display()
            );
            if outcome.discarded_changes {
                eprintln!("warning: unsaved changes were discarded");
            }
            Ok(())
        }
        Err(RestoreError::RemoteRestore {
            source,
            reopen_error: Some(reopen),
            ..
        }) => Err(anyhow!(
            "restore failed: {source}; reopening the file also failed: {reopen}"
        )),
        Err(err) => Err(err.into()),
    }
}

pub(super) fn handle_retrieve_command(session: &Session, file: &Path, version_id: &str) -> Result<()> {
    let host = open_document(file)?;
    let dest = session.retrieve_copy(&host, version_id)?;
    println!("Retrieved version {} to {}", version_id, dest.display());
    Ok(())
}
