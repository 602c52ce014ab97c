//! Cancellable delayed tasks
//!
//! A `TaskSlot` holds at most one pending timer. Scheduling a new one cancels
//! the previous, and every timer carries a ticket so a completion that raced
//! its own cancellation can still be recognised as stale.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct Pending {
    ticket: u64,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub struct TaskSlot {
    pending: Option<Pending>,
    last_ticket: u64,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fire(ticket)` after `delay` unless cancelled first. Any task
    /// already pending in this slot is cancelled.
    pub fn schedule<F, Fut>(&mut self, delay: Duration, fire: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.cancel() {
            tracing::debug!("Replaced pending delayed task");
        }

        self.last_ticket += 1;
        let ticket = self.last_ticket;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = token.cancelled() => {
                    tracing::trace!(ticket, "Delayed task cancelled");
                }

                () = tokio::time::sleep(delay) => {
                    fire(ticket).await;
                }
            }
        });

        self.pending = Some(Pending { ticket, cancel });
        ticket
    }

    /// Cancel the pending task. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accept a completion. Only the current ticket is accepted, once;
    /// anything else was superseded.
    pub fn complete(&mut self, ticket: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
