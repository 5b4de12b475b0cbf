use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::model::{Event, VideoLayer};

/// Per-layer bookkeeping of what is on air and what is cued next.
///
/// Shared between the scheduling thread and operator-triggered recovery.
/// Both maps are mutex-guarded per call; no lock is ever held across a
/// backend dispatch. `take_loaded_next` removes and returns under a single
/// lock acquisition, so a cued event can be consumed at most once even when
/// two recoveries race on the same layer.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    visible: Mutex<HashMap<VideoLayer, Arc<Event>>>,
    loaded_next: Mutex<HashMap<VideoLayer, Arc<Event>>>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_visible(&self, layer: VideoLayer, event: Arc<Event>) {
        self.visible.lock().unwrap().insert(layer, event);
    }

    pub fn visible(&self, layer: VideoLayer) -> Option<Arc<Event>> {
        self.visible.lock().unwrap().get(&layer).cloned()
    }

    /// Removed only on an explicit stop or clear of the layer.
    pub fn clear_visible(&self, layer: VideoLayer) {
        self.visible.lock().unwrap().remove(&layer);
    }

    pub fn set_loaded_next(&self, layer: VideoLayer, event: Arc<Event>) {
        self.loaded_next.lock().unwrap().insert(layer, event);
    }

    pub fn loaded_next(&self, layer: VideoLayer) -> Option<Arc<Event>> {
        self.loaded_next.lock().unwrap().get(&layer).cloned()
    }

    /// Atomically removes and returns the cued event for a layer.
    pub fn take_loaded_next(&self, layer: VideoLayer) -> Option<Arc<Event>> {
        self.loaded_next.lock().unwrap().remove(&layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventKind, TransitionType};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn event(id: u64, layer: VideoLayer) -> Arc<Event> {
        Arc::new(Event {
            id,
            kind: EventKind::Movie,
            layer,
            scheduled_tc: 0,
            position: 0,
            seek: 0,
            transition_ticks: 0,
            transition: TransitionType::Cut,
            media: None,
            template: None,
        })
    }

    #[test]
    fn test_layers_are_independent() {
        let registry = LayerRegistry::new();
        registry.set_visible(VideoLayer::Program, event(1, VideoLayer::Program));
        registry.set_visible(VideoLayer::Preview, event(2, VideoLayer::Preview));
        assert_eq!(registry.visible(VideoLayer::Program).unwrap().id, 1);
        assert_eq!(registry.visible(VideoLayer::Preview).unwrap().id, 2);
        registry.clear_visible(VideoLayer::Program);
        assert!(registry.visible(VideoLayer::Program).is_none());
        assert!(registry.visible(VideoLayer::Preview).is_some());
    }

    #[test]
    fn test_take_loaded_next_consumes_once() {
        let registry = LayerRegistry::new();
        registry.set_loaded_next(VideoLayer::Program, event(7, VideoLayer::Program));
        assert_eq!(
            registry.take_loaded_next(VideoLayer::Program).unwrap().id,
            7
        );
        assert!(registry.take_loaded_next(VideoLayer::Program).is_none());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let registry = LayerRegistry::new();
        registry.set_loaded_next(VideoLayer::Program, event(7, VideoLayer::Program));
        assert!(registry.loaded_next(VideoLayer::Program).is_some());
        assert!(registry.loaded_next(VideoLayer::Program).is_some());
    }

    #[test]
    fn test_concurrent_take_yields_single_winner() {
        let registry = Arc::new(LayerRegistry::new());
        let taken = Arc::new(AtomicUsize::new(0));
        for _ in 0..50 {
            registry.set_loaded_next(VideoLayer::Program, event(9, VideoLayer::Program));
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    let taken = Arc::clone(&taken);
                    thread::spawn(move || {
                        if registry.take_loaded_next(VideoLayer::Program).is_some() {
                            taken.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        }
        assert_eq!(taken.load(Ordering::SeqCst), 50);
    }
}
