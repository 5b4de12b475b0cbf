//! Real-time playout execution core.
//!
//! Translates scheduled events into device commands and keeps a channel in
//! sync with its running order across interruptions. The device itself sits
//! behind the [`PlayoutBackend`] trait; [`AmcpBackend`] is the shipped
//! implementation, tests drive the controller with a recording double.

mod amcp_client;
mod events;

pub mod amcp;
pub mod backend;
pub mod channel;
pub mod clock;
pub mod errors;
pub mod item;
pub mod model;
pub mod registry;

pub use amcp::AmcpBackend;
pub use amcp_client::{AMCP_PORT, DEFAULT_TIMEOUT_MS};
pub use backend::PlayoutBackend;
pub use channel::Channel;
pub use clock::{Clock, SystemClock};
pub use errors::PlayoutError;
pub use item::{item_for_event, item_for_media, BLACK_SOURCE};
pub use model::{
    CgData, ChannelEvent, Event, EventKind, MediaMetadata, MediaType, PlayoutItem, Template,
    Transition, TransitionType, VideoFormat, VideoLayer, VideoMode,
};
pub use registry::LayerRegistry;
