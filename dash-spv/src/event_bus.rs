//! Finality notifications.
//!
//! The InstantSend pipeline broadcasts a `FinalityEvent` through an `EventBus`
//! exactly once per transaction, when it first becomes instantly final.
//! Subscribers only see events emitted after they subscribed.

use std::fmt;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::types::Txid;

const DEFAULT_EVENT_LIMIT: usize = 10000;

/// Event-related errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Bus receiver failed: {0}")]
    ReceiveFailure(String),
}

type Result<T> = std::result::Result<T, Error>;

/// How a transaction reached instant finality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinalityPath {
    /// Every input collected enough legacy masternode lock votes.
    LockVotes,
    /// A deterministic quorum signed an ISLock for the transaction.
    InstantLock,
}

impl fmt::Display for FinalityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalityPath::LockVotes => write!(f, "lock votes"),
            FinalityPath::InstantLock => write!(f, "instant lock"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalityEvent {
    pub txid: Txid,
    pub path: FinalityPath,
}

impl FinalityEvent {
    pub fn description(&self) -> String {
        format!("TransactionFinalized {{ txid: {}, path: {} }}", self.txid, self.path)
    }
}

/// Broadcast channel for events.
///
/// All subscribers receive all events. Late subscribers do not receive past events.
#[derive(Debug, Clone)]
pub struct EventBus<T: Clone> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> EventBus<T> {
    /// Capacity determines how many events can be buffered before
    /// slow receivers start missing events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
        }
    }

    pub fn subscribe(&self) -> EventReceiver<T> {
        EventReceiver::new(self.sender.subscribe())
    }

    /// Emit events to all subscribers. Having no subscribers is not an error.
    pub fn emit(&self, events: &[T]) {
        for event in events {
            let _ = self.sender.send(event.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LIMIT)
    }
}

#[derive(Debug)]
pub struct EventReceiver<T: Clone> {
    receiver: broadcast::Receiver<T>,
}

impl<T: Clone> EventReceiver<T> {
    pub fn new(receiver: broadcast::Receiver<T>) -> Self {
        Self {
            receiver,
        }
    }

    /// Wait for the next event. Events lost to lagging are skipped; only a
    /// closed bus ends the stream.
    pub async fn recv(&mut self) -> Result<T> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event receiver lagged {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(Error::ReceiveFailure("event bus closed".to_string()));
                }
            }
        }
    }

    /// The next buffered event, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event receiver lagged {} events", n);
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashes::Hash;

    fn event(byte: u8) -> FinalityEvent {
        FinalityEvent {
            txid: Txid::from_byte_array([byte; 32]),
            path: FinalityPath::InstantLock,
        }
    }

    #[test]
    fn test_event_description() {
        let description = event(1).description();
        assert!(description.contains("TransactionFinalized"));
        assert!(description.contains("instant lock"));
    }

    #[tokio::test]
    async fn test_event_bus_emit_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(&[event(1)]);

        assert_eq!(rx.recv().await.unwrap(), event(1));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_event_bus_no_receivers() {
        let bus = EventBus::new(16);
        bus.emit(&[event(1)]);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_late_subscriber_misses_past_events() {
        let bus = EventBus::new(16);
        let mut early = bus.subscribe();
        bus.emit(&[event(1)]);
        let mut late = bus.subscribe();
        bus.emit(&[event(2)]);

        assert_eq!(early.try_recv(), Some(event(1)));
        assert_eq!(early.try_recv(), Some(event(2)));
        assert_eq!(late.try_recv(), Some(event(2)));
        assert_eq!(late.try_recv(), None);
    }

    #[test]
    fn test_lagged_receiver_skips_to_oldest_buffered() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        bus.emit(&[event(1), event(2), event(3)]);

        assert_eq!(rx.try_recv(), Some(event(2)));
        assert_eq!(rx.try_recv(), Some(event(3)));
    }

    #[tokio::test]
    async fn test_recv_survives_lag_and_ends_on_close() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        bus.emit(&[event(1), event(2), event(3)]);

        assert_eq!(rx.recv().await.unwrap(), event(2));
        assert_eq!(rx.recv().await.unwrap(), event(3));

        bus.emit(&[event(4)]);
        drop(bus);
        assert_eq!(rx.recv().await.unwrap(), event(4));
        assert!(matches!(rx.recv().await, Err(Error::ReceiveFailure(_))));
    }
}
