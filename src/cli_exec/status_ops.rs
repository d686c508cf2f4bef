use std::sync::Arc;

use anyhow::{Context, Result};

use draftlink::model::StatusSnapshot;
use draftlink::session::Session;
use draftlink::status::StatusBoard;

pub(super) fn describe(snap: &StatusSnapshot) -> String {
    match (snap.service_reachable, snap.logged_in, snap.username.as_deref()) {
        (false, _, _) => "service not running".to_string(),
        (true, true, Some(user)) => format!("connected, logged in as {}", user),
        (true, true, None) => "connected, logged in".to_string(),
        (true, false, _) => "connected, not logged in".to_string(),
    }
}

pub(super) fn handle_status_command(session: &Session, json: bool) -> Result<()> {
    let poller = session.status_poller(Arc::new(StatusBoard::new()));
    let snap = poller.poll_once();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snap).context("serialize status json")?
        );
    } else {
        println!("{}", describe(&snap));
    }
    Ok(())
}

pub(super) fn handle_watch_command(session: &Session, cycles: Option<usize>) -> Result<()> {
    let board = Arc::new(StatusBoard::new());
    let mut handle = session
        .status_poller(Arc::clone(&board))
        .spawn()
        .context("start status poller")?;
    let tick = session.config().poll_tick();

    let mut last: Option<Arc<StatusSnapshot>> = None;
    let mut shown = 0usize;
    loop {
        let snap = handle.snapshot();
        if last.as_deref() != Some(&*snap) {
            println!("{}", describe(&snap));
            shown += 1;
            last = Some(snap);
            if cycles.is_some_and(|n| shown >= n) {
                break;
            }
        }
        std::thread::sleep(tick);
    }
    handle.shutdown();
    Ok(())
}
