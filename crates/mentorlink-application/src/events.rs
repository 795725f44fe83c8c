//! Lifecycle event fan-out.

use mentorlink_core::session::LifecycleEvent;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Broadcasts [`LifecycleEvent`]s to any number of subscribers.
///
/// Publishing never fails: with no subscriber the event is dropped, and a
/// lagging subscriber skips ahead.
#[derive(Debug, Clone)]
pub struct LifecycleEvents {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl LifecycleEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: LifecycleEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No lifecycle subscribers");
        }
    }
}

impl Default for LifecycleEvents {
    fn default() -> Self {
        Self::new()
    }
}
