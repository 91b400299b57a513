use std::sync::Arc;
use tokio::sync::watch;

/// Caller-side handle that cancels an in-flight run
///
/// A run checks for cancellation before its first broadcast and at every
/// maturity wait; transactions already broadcast stay broadcast.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Token observing this handle
    pub fn token(&self) -> CancelToken {
        CancelToken {
            receiver: self.sender.subscribe(),
            _sender: Arc::clone(&self.sender),
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Run-side view of a [`CancelHandle`]
#[derive(Debug)]
pub struct CancelToken {
    receiver: watch::Receiver<bool>,
    // Keeps the channel open so `changed()` never reports closure
    _sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Token with no external handle; never cancelled
    pub fn never() -> Self {
        CancelHandle::new().token()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&mut self) {
        loop {
            if *self.receiver.borrow_and_update() {
                return;
            }
            if self.receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
