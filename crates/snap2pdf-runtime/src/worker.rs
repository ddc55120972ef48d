use crate::session::Session;
use crate::{SessionCommand, SessionUpdate};
use snap2pdf_core::CancelFlag;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Channels to a running session worker
pub struct SessionHandle {
    pub commands: mpsc::UnboundedSender<SessionCommand>,
    pub updates: mpsc::UnboundedReceiver<SessionUpdate>,
    /// Requests cancellation of the conversion in progress
    pub cancel: CancelFlag,
    pub task: JoinHandle<()>,
}

/// Start a session worker on the current tokio runtime
pub fn spawn_session() -> SessionHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let cancel = CancelFlag::new();

    let task = tokio::spawn(session_task(command_rx, update_tx, cancel.clone()));

    SessionHandle {
        commands: command_tx,
        updates: update_rx,
        cancel,
        task,
    }
}

/// Async worker task that processes session commands one at a time
pub async fn session_task(
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    update_tx: mpsc::UnboundedSender<SessionUpdate>,
    cancel: CancelFlag,
) {
    let mut session = Session::new(cancel);
    // A command taken off the queue while merging statistics requests
    let mut pending: Option<SessionCommand> = None;

    loop {
        let cmd = match pending.take() {
            Some(cmd) => cmd,
            None => match command_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            },
        };

        match cmd {
            SessionCommand::CalculateStats { mut mode } => {
                // Merge statistics requests queued directly behind this one;
                // anything else waits until the statistics are sent
                while let Ok(next_cmd) = command_rx.try_recv() {
                    if let SessionCommand::CalculateStats { mode: newer } = next_cmd {
                        log::debug!("Discarding queued statistics request, using newer request");
                        mode = newer;
                    } else {
                        pending = Some(next_cmd);
                        break;
                    }
                }

                session
                    .handle(SessionCommand::CalculateStats { mode }, &update_tx)
                    .await;
            }
            other => session.handle(other, &update_tx).await,
        }
    }

    log::debug!("Session command channel closed");
}
