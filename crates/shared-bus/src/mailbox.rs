//! # Mailboxes
//!
//! A mailbox is a bounded FIFO channel owned by exactly one execution unit.
//! Any unit may hold a `MailboxSender`; only the owner holds the
//! `MailboxReceiver`.

use crate::errors::{BusError, SendError};
use crate::{DEFAULT_SEND_TIMEOUT, MAX_MAILBOX_CAPACITY};
use access_telemetry::{MAILBOX_DROPS, MAILBOX_SENT};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Open a mailbox with a fixed capacity.
///
/// Capacity must be between 1 and [`MAX_MAILBOX_CAPACITY`].
pub fn open<T>(
    name: &'static str,
    capacity: usize,
    send_timeout: Duration,
) -> Result<(MailboxSender<T>, MailboxReceiver<T>), BusError> {
    if capacity == 0 || capacity > MAX_MAILBOX_CAPACITY {
        return Err(BusError::InvalidCapacity {
            mailbox: name,
            capacity,
            max: MAX_MAILBOX_CAPACITY,
        });
    }

    let (tx, rx) = mpsc::channel(capacity);
    debug!(mailbox = name, capacity, "Mailbox opened");

    Ok((
        MailboxSender {
            name,
            inner: tx,
            send_timeout,
        },
        MailboxReceiver { name, inner: rx },
    ))
}

/// Open a mailbox, degrading to a single slot if the capacity is invalid.
///
/// The owning unit cannot run without a mailbox, so a bad capacity is
/// logged at error severity and the unit keeps running with depth 1.
pub fn open_or_degraded<T>(
    name: &'static str,
    capacity: usize,
    send_timeout: Duration,
) -> (MailboxSender<T>, MailboxReceiver<T>) {
    match open(name, capacity, send_timeout) {
        Ok(pair) => pair,
        Err(e) => {
            error!(mailbox = name, error = %e, "Mailbox creation failed, running degraded");
            let (tx, rx) = mpsc::channel(1);
            (
                MailboxSender {
                    name,
                    inner: tx,
                    send_timeout,
                },
                MailboxReceiver { name, inner: rx },
            )
        }
    }
}

/// Sending half of a mailbox. Cheap to clone.
#[derive(Debug)]
pub struct MailboxSender<T> {
    name: &'static str,
    inner: mpsc::Sender<T>,
    send_timeout: Duration,
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: self.inner.clone(),
            send_timeout: self.send_timeout,
        }
    }
}

impl<T> MailboxSender<T> {
    /// Enqueue a message, waiting up to `timeout` for a free slot.
    ///
    /// On failure the message is handed back inside the error. The drop is
    /// logged and counted here; callers only decide whether to retry.
    pub async fn send(&self, message: T, timeout: Duration) -> Result<(), SendError<T>> {
        match self.inner.send_timeout(message, timeout).await {
            Ok(()) => {
                MAILBOX_SENT.with_label_values(&[self.name]).inc();
                Ok(())
            }
            Err(mpsc::error::SendTimeoutError::Timeout(message)) => {
                MAILBOX_DROPS.with_label_values(&[self.name]).inc();
                warn!(
                    mailbox = self.name,
                    timeout_ms = timeout.as_millis() as u64,
                    "Mailbox full, message dropped"
                );
                Err(SendError::Full {
                    mailbox: self.name,
                    message,
                })
            }
            Err(mpsc::error::SendTimeoutError::Closed(message)) => {
                MAILBOX_DROPS.with_label_values(&[self.name]).inc();
                warn!(mailbox = self.name, "Mailbox closed, message dropped");
                Err(SendError::Closed {
                    mailbox: self.name,
                    message,
                })
            }
        }
    }

    /// Enqueue a message with the mailbox's configured timeout.
    ///
    /// Returns whether the message was delivered. Failures are already
    /// logged by [`send`](Self::send) and the message is dropped.
    pub async fn post(&self, message: T) -> bool {
        self.send(message, self.send_timeout).await.is_ok()
    }

    /// Enqueue without waiting.
    pub fn try_send(&self, message: T) -> Result<(), SendError<T>> {
        match self.inner.try_send(message) {
            Ok(()) => {
                MAILBOX_SENT.with_label_values(&[self.name]).inc();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(message)) => {
                MAILBOX_DROPS.with_label_values(&[self.name]).inc();
                warn!(mailbox = self.name, "Mailbox full, message dropped");
                Err(SendError::Full {
                    mailbox: self.name,
                    message,
                })
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                MAILBOX_DROPS.with_label_values(&[self.name]).inc();
                Err(SendError::Closed {
                    mailbox: self.name,
                    message,
                })
            }
        }
    }

    /// Name of the mailbox.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Timeout used by [`post`](Self::post).
    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.max_capacity()
    }
}

/// Receiving half of a mailbox, owned by one execution unit.
#[derive(Debug)]
pub struct MailboxReceiver<T> {
    name: &'static str,
    inner: mpsc::Receiver<T>,
}

impl<T> MailboxReceiver<T> {
    /// Wait up to `timeout` for the next message.
    ///
    /// Returns `None` if nothing arrived in time or every sender is gone.
    /// Used as the unit's polling point, not as a hard block.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<T> {
        tokio::time::timeout(timeout, self.inner.recv())
            .await
            .ok()
            .flatten()
    }

    /// Take the next message if one is queued.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was queued
    /// - `Ok(None)` - The mailbox is empty
    /// - `Err(BusError::Closed)` - Every sender was dropped
    pub fn try_recv(&mut self) -> Result<Option<T>, BusError> {
        match self.inner.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(BusError::Closed { mailbox: self.name })
            }
        }
    }

    /// Name of the mailbox.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}
