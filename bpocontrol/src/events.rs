use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::model::ChannelEvent;

/// Fan-out bus for channel notifications. Delivery is synchronous at the
/// point of dispatch; dead subscribers are pruned on send failure.
#[derive(Clone, Default)]
pub struct ChannelEventBus {
    subscribers: Arc<Mutex<Vec<Sender<ChannelEvent>>>>,
}

impl ChannelEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> Receiver<ChannelEvent> {
        let (tx, rx) = unbounded::<ChannelEvent>();
        {
            let mut subscribers = self.subscribers.lock().unwrap();
            subscribers.push(tx);
        }
        rx
    }

    pub(crate) fn broadcast(&self, event: ChannelEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VideoLayer;

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let bus = ChannelEventBus::new();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();
        bus.broadcast(ChannelEvent::VolumeChanged {
            layer: VideoLayer::Program,
            volume: 0.5,
        });
        assert_eq!(rx1.len(), 1);
        assert_eq!(rx2.len(), 1);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let bus = ChannelEventBus::new();
        let rx = bus.subscribe();
        drop(bus.subscribe());
        bus.broadcast(ChannelEvent::VolumeChanged {
            layer: VideoLayer::Program,
            volume: 1.0,
        });
        assert_eq!(rx.len(), 1);
        assert_eq!(bus.subscribers.lock().unwrap().len(), 1);
    }
}
