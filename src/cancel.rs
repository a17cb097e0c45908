use std::{io, sync::Arc};

use tokio::{
    signal::unix::{signal, SignalKind},
    sync::watch,
    task::JoinHandle,
};

/// A one-shot cancellation signal. Clones share the same state; once
/// cancelled a token stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                // unreachable while `self` keeps the sender alive
                std::future::pending::<()>().await;
            }
        }
    }

    /// Cancels this token on the next SIGINT. Listening stops when the
    /// returned guard is dropped, so an interrupt can never reach a later run.
    pub fn cancel_on_interrupt(&self) -> io::Result<InterruptGuard> {
        let mut interrupts = signal(SignalKind::interrupt())?;
        let token = self.clone();

        let task = tokio::task::spawn(async move {
            if interrupts.recv().await.is_some() {
                debug!("interrupt received, cancelling pipeline");
                token.cancel();
            }
        });

        Ok(InterruptGuard { task })
    }
}

#[must_use = "the interrupt listener stops when the guard is dropped"]
pub struct InterruptGuard {
    task: JoinHandle<()>,
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
