//! AMCP device backend.
//!
//! Implements [`PlayoutBackend`] against a CasparCG-compatible server. Each
//! call formats one AMCP command and ships it over the transport in
//! `amcp_client`; the connection flag tracks the outcome of the last
//! exchange and a failed probe or dispatch marks the backend disconnected
//! until the next successful `connect`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::amcp_client::{send_command, AmcpResponse, AMCP_PORT, DEFAULT_TIMEOUT_MS};
use crate::backend::PlayoutBackend;
use crate::errors::PlayoutError;
use crate::model::{CgData, PlayoutItem, TransitionType, VideoMode};

pub struct AmcpBackend {
    host: String,
    port: u16,
    /// Device channel number, used as the address prefix of every command.
    channel: u8,
    timeout: Duration,
    connected: AtomicBool,
}

impl AmcpBackend {
    pub fn new(host: impl Into<String>, port: u16, channel: u8, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            channel,
            timeout,
            connected: AtomicBool::new(false),
        }
    }

    pub fn with_defaults(host: impl Into<String>, channel: u8) -> Self {
        Self::new(host, AMCP_PORT, channel, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    fn send(&self, command: &str) -> Result<AmcpResponse, PlayoutError> {
        match send_command(&self.host, self.port, self.timeout, command) {
            Ok(response) => {
                self.connected.store(true, Ordering::SeqCst);
                if response.is_success() {
                    Ok(response)
                } else {
                    Err(PlayoutError::AmcpRejected(command.to_string(), response.code))
                }
            }
            Err(err) => {
                self.connected.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    fn send_ok(&self, command: &str) -> Result<(), PlayoutError> {
        self.send(command).map(|_| ())
    }

    fn format_load(&self, verb: &str, item: &PlayoutItem) -> String {
        let mut command = format!(
            "{} {}-{} {}",
            verb, self.channel, item.video_layer, item.clip_name
        );
        if item.loop_media {
            command.push_str(" LOOP");
        }
        if item.transition.duration > 0 {
            command.push_str(&format!(
                " {} {}",
                transition_token(item.transition.kind),
                item.transition.duration
            ));
        }
        if item.seek > 0 {
            command.push_str(&format!(" SEEK {}", item.seek));
        }
        if let Some(length) = item.length {
            command.push_str(&format!(" LENGTH {}", length));
        }
        command
    }
}

fn transition_token(kind: TransitionType) -> &'static str {
    match kind {
        TransitionType::Cut => "CUT",
        TransitionType::Mix => "MIX",
        TransitionType::Push => "PUSH",
        TransitionType::Slide => "SLIDE",
        TransitionType::Wipe => "WIPE",
    }
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Serializes CG field data to the templateData XML the server expects,
/// one text component per field, order preserved.
fn cg_data_xml(data: &CgData) -> String {
    let mut xml = String::from("<templateData>");
    for (name, value) in &data.pairs {
        xml.push_str(&format!(
            "<componentData id=\"{}\"><data id=\"text\" value=\"{}\"/></componentData>",
            escape_xml(name),
            escape_xml(value)
        ));
    }
    xml.push_str("</templateData>");
    xml
}

fn parse_video_mode(token: &str) -> VideoMode {
    match token {
        "PAL" => VideoMode::Pal,
        "NTSC" => VideoMode::Ntsc,
        "720p5000" => VideoMode::Hd720p5000,
        "1080i5000" => VideoMode::Hd1080i5000,
        _ => VideoMode::Unknown,
    }
}

impl PlayoutBackend for AmcpBackend {
    fn connect(&self) -> Result<(), PlayoutError> {
        let response = self.send("VERSION")?;
        debug!(
            "AMCP server at {}:{} answered VERSION: {:?}",
            self.host, self.port, response.lines
        );
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn load_bg(&self, item: &PlayoutItem) -> Result<(), PlayoutError> {
        self.send_ok(&self.format_load("LOADBG", item))
    }

    fn load(&self, item: &PlayoutItem) -> Result<(), PlayoutError> {
        self.send_ok(&self.format_load("LOAD", item))
    }

    fn play(&self, layer: i32) -> Result<(), PlayoutError> {
        self.send_ok(&format!("PLAY {}-{}", self.channel, layer))
    }

    fn stop(&self, layer: i32) -> Result<(), PlayoutError> {
        self.send_ok(&format!("STOP {}-{}", self.channel, layer))
    }

    fn clear(&self, layer: i32) -> Result<(), PlayoutError> {
        self.send_ok(&format!("CLEAR {}-{}", self.channel, layer))
    }

    fn clear_all(&self) -> Result<(), PlayoutError> {
        self.send_ok(&format!("CLEAR {}", self.channel))
    }

    fn custom_command(&self, command: &str) -> Result<(), PlayoutError> {
        self.send_ok(command)
    }

    fn cg_add(
        &self,
        layer: i32,
        template_layer: i32,
        template: &str,
        data: &CgData,
    ) -> Result<(), PlayoutError> {
        let xml = cg_data_xml(data).replace('"', "\\\"");
        self.send_ok(&format!(
            "CG {}-{} ADD {} \"{}\" 0 \"{}\"",
            self.channel, layer, template_layer, template, xml
        ))
    }

    fn cg_play(&self, layer: i32) -> Result<(), PlayoutError> {
        self.send_ok(&format!("CG {}-{} PLAY", self.channel, layer))
    }

    /// Queries the channel listing and maps this channel's reported mode.
    /// Any transport failure or unlisted channel reads as `Unknown`.
    fn video_mode(&self) -> VideoMode {
        let response = match self.send("INFO") {
            Ok(response) => response,
            Err(err) => {
                warn!("AMCP INFO failed on {}:{}: {}", self.host, self.port, err);
                return VideoMode::Unknown;
            }
        };
        let prefix = self.channel.to_string();
        for line in &response.lines {
            let mut tokens = line.split_whitespace();
            if tokens.next() == Some(prefix.as_str()) {
                return tokens.next().map(parse_video_mode).unwrap_or(VideoMode::Unknown);
            }
        }
        VideoMode::Unknown
    }
}
