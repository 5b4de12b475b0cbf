use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bpoconfig::Config;
use bpocontrol::{AmcpBackend, Channel, ChannelEvent, PlayoutBackend};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &Config) {
    if !config.logging.console {
        return;
    }
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

fn main() -> Result<()> {
    // ========== Phase 1: configuration and logging ==========
    let config = Config::load()?;
    init_logging(&config);
    info!(
        "BPOPlay starting: channel {} at {:?}",
        config.channel.number, config.channel.frame_rate
    );

    // ========== Phase 2: device backend ==========
    let backend = Arc::new(AmcpBackend::new(
        config.backend.host.clone(),
        config.backend.port,
        config.channel.number,
        Duration::from_millis(config.backend.timeout_ms),
    ));
    match backend.connect() {
        Ok(()) => info!(
            "Connected to playout server at {}:{}",
            config.backend.host, config.backend.port
        ),
        // The controller re-checks connectivity on every command, so a cold
        // start without the server is survivable.
        Err(err) => warn!("Playout server not reachable yet: {}", err),
    }

    // ========== Phase 3: channel controller ==========
    let channel = Channel::new(
        config.channel.number,
        config.channel.frame_rate,
        config.channel.live_input.clone(),
        config.channel.master_volume,
        Arc::clone(&backend) as Arc<dyn PlayoutBackend>,
    );
    channel.initialize();
    if config.channel.narrow_aspect {
        channel.set_aspect(true);
    }
    info!("Channel {} reports format {:?}", channel.number(), channel.format());

    // The scheduler drives the channel from here; this process just traces
    // the channel notifications.
    let notifications = channel.subscribe();
    for event in notifications {
        match event {
            ChannelEvent::VolumeChanged { layer, volume } => {
                info!("Volume changed on {:?}: {:.3}", layer, volume);
            }
        }
    }
    Ok(())
}
