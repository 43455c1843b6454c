//! In-process delivery of OAuth redirect results.
//!
//! The loopback callback page posts what it received here; a login attempt
//! listens for it. A listener unregisters itself when dropped, so an attempt
//! that ends for any reason leaves no listener behind.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

/// What the provider redirected back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackMessage {
    AuthCode { code: String, state: Option<String> },
    /// The user declined consent or the provider refused the request.
    AuthError { error: String, description: Option<String>, state: Option<String> },
}

impl CallbackMessage {
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::AuthCode { state, .. } | Self::AuthError { state, .. } => state.as_deref(),
        }
    }
}

#[derive(Default)]
struct MailboxInner {
    next_id: u64,
    listeners: Vec<(u64, mpsc::UnboundedSender<CallbackMessage>)>,
}

/// Fan-out point between the callback server and pending login attempts.
#[derive(Clone, Default)]
pub struct CallbackMailbox {
    inner: Arc<Mutex<MailboxInner>>,
}

impl CallbackMailbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `message` to every registered listener; returns how many
    /// received it.
    pub fn post(&self, message: CallbackMessage) -> usize {
        let inner = self.inner.lock();
        let delivered =
            inner.listeners.iter().filter(|(_, tx)| tx.send(message.clone()).is_ok()).count();
        debug!(delivered, "Callback message posted");
        delivered
    }

    #[must_use]
    pub fn listen(&self) -> CallbackListener {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut inner = self.inner.lock();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.listeners.push((id, tx));
            id
        };
        CallbackListener { id, mailbox: self.clone(), receiver: rx }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    fn unregister(&self, id: u64) {
        self.inner.lock().listeners.retain(|(listener_id, _)| *listener_id != id);
    }
}

impl std::fmt::Debug for CallbackMailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackMailbox").field("listeners", &self.listener_count()).finish()
    }
}

/// Registration on a [`CallbackMailbox`]; removed on drop.
pub struct CallbackListener {
    id: u64,
    mailbox: CallbackMailbox,
    receiver: mpsc::UnboundedReceiver<CallbackMessage>,
}

impl CallbackListener {
    pub async fn recv(&mut self) -> Option<CallbackMessage> {
        self.receiver.recv().await
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        self.mailbox.unregister(self.id);
    }
}
