use std::sync::mpsc;
use std::thread;

use crate::error::Result;
use crate::model::RevisionToken;
use crate::remote::FetchedFile;
use crate::sync::{LoadTicket, SaveTicket};

use super::SharedStore;

/// A finished request, handed back to the UI thread with its ticket.
pub(in crate::tui_shell) enum Reply {
    Loaded(LoadTicket, Result<FetchedFile>),
    Saved(SaveTicket, Result<RevisionToken>),
}

pub(super) fn spawn_load(store: SharedStore, ticket: LoadTicket) -> mpsc::Receiver<Reply> {
    spawn(move || {
        let result = ticket.execute(store.as_ref());
        Reply::Loaded(ticket, result)
    })
}

pub(super) fn spawn_save(store: SharedStore, ticket: SaveTicket) -> mpsc::Receiver<Reply> {
    spawn(move || {
        let result = ticket.execute(store.as_ref());
        Reply::Saved(ticket, result)
    })
}

fn spawn<F>(job: F) -> mpsc::Receiver<Reply>
where
    F: FnOnce() -> Reply + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The UI may have gone away; nothing to do then.
        let _ = tx.send(job());
    });
    rx
}
