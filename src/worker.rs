use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::ask_client::AskTransport;
use crate::state::{AskCommand, Delta, RequestId};

/// Dispatcher thread: every submit gets its own request thread, so a slow answer never
/// holds up the next question. Exits once the command channel closes.
pub fn spawn_ask_worker(
    tx: Sender<Delta>,
    cmd_rx: Receiver<AskCommand>,
    transport: Arc<dyn AskTransport>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AskCommand::Submit { id, question } => {
                    let tx = tx.clone();
                    let transport = Arc::clone(&transport);
                    thread::spawn(move || run_request(&tx, transport.as_ref(), id, &question));
                }
            }
        }
        tracing::debug!("ask worker shutting down");
    })
}

/// Perform one question round-trip and report it. Always sends exactly one outcome delta,
/// including when the transport panics.
pub fn run_request(tx: &Sender<Delta>, transport: &dyn AskTransport, id: RequestId, question: &str) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| transport.ask(question)));
    let delta = match result {
        Ok(Ok(answer)) => Delta::AnswerReady { id, answer },
        Ok(Err(err)) => {
            tracing::warn!(id, error = ?err, "ask request failed");
            Delta::AskFailed {
                id,
                message: err.to_string(),
            }
        }
        Err(payload) => {
            let reason = panic_reason(payload.as_ref());
            tracing::error!(id, reason = %reason, "ask request panicked");
            Delta::AskFailed {
                id,
                message: format!("request aborted: {reason}"),
            }
        }
    };
    let _ = tx.send(delta);
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
