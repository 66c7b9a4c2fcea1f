//! Fan-out of published states to every live subscriber.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use super::types::AuthState;

/// Each subscriber gets its own unbounded queue, so a slow reader never
/// loses a state. Closed receivers are pruned on the next publish.
#[derive(Clone, Default)]
pub(crate) struct Subscribers {
    senders: Arc<Mutex<Vec<mpsc::UnboundedSender<AuthState>>>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthState> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Deliver `state` to everyone still listening; returns how many got it
    pub(crate) fn publish(&self, state: &AuthState) -> usize {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        senders.retain(|tx| tx.send(state.clone()).is_ok());
        senders.len()
    }
}
