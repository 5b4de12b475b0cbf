//! Device backend contract.
//!
//! The channel controller only talks to a playout device through this trait,
//! so the real AMCP implementation and the deterministic test double are
//! interchangeable. Every mutating call is a short, non-blocking dispatch;
//! any network latency is bounded inside the implementation and failures
//! come back as `Err`, never as a blocking wait.

use crate::errors::PlayoutError;
use crate::model::{CgData, PlayoutItem, VideoMode};

pub trait PlayoutBackend: Send + Sync {
    /// Probes the device and records the connection outcome.
    fn connect(&self) -> Result<(), PlayoutError>;

    /// Current connectivity. Re-checked by the controller at the start of
    /// every command, never cached across calls.
    fn is_connected(&self) -> bool;

    /// Cues an item in the background without taking the layer on air.
    fn load_bg(&self, item: &PlayoutItem) -> Result<(), PlayoutError>;

    /// Loads an item live-ready on its layer.
    fn load(&self, item: &PlayoutItem) -> Result<(), PlayoutError>;

    fn play(&self, layer: i32) -> Result<(), PlayoutError>;

    fn stop(&self, layer: i32) -> Result<(), PlayoutError>;

    fn clear(&self, layer: i32) -> Result<(), PlayoutError>;

    fn clear_all(&self) -> Result<(), PlayoutError>;

    /// Raw protocol command, fully formatted by the caller (mixer, pause,
    /// seek and aspect all go through here).
    fn custom_command(&self, command: &str) -> Result<(), PlayoutError>;

    /// Adds a graphics template with its field data on a layer.
    fn cg_add(
        &self,
        layer: i32,
        template_layer: i32,
        template: &str,
        data: &CgData,
    ) -> Result<(), PlayoutError>;

    /// Triggers the play action of the graphics layer.
    fn cg_play(&self, layer: i32) -> Result<(), PlayoutError>;

    /// Video mode as last reported by the device.
    fn video_mode(&self) -> VideoMode;
}
