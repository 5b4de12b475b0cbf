//! Line-oriented TCP transport for the AMCP protocol.
//!
//! One connection per command: the server closes idle control connections
//! anyway, and a short-lived socket keeps every dispatch bounded by the
//! configured timeout with no shared stream to poison.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::errors::PlayoutError;

pub const AMCP_PORT: u16 = 5250;
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

#[derive(Debug)]
pub(crate) struct AmcpResponse {
    pub code: u16,
    pub lines: Vec<String>,
}

impl AmcpResponse {
    pub fn is_success(&self) -> bool {
        self.code < 400
    }
}

fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, PlayoutError> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|err| PlayoutError::amcp(format!("cannot resolve {}:{}: {}", host, port, err)))?
        .next()
        .ok_or_else(|| PlayoutError::amcp(format!("no address for {}:{}", host, port)))?;
    let stream = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|err| PlayoutError::amcp(format!("cannot connect to {}: {}", addr, err)))?;
    stream
        .set_read_timeout(Some(timeout))
        .and_then(|_| stream.set_write_timeout(Some(timeout)))
        .map_err(|err| PlayoutError::amcp(format!("cannot set socket timeout: {}", err)))?;
    Ok(stream)
}

fn read_line(reader: &mut BufReader<TcpStream>, host: &str) -> Result<String, PlayoutError> {
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .map_err(|err| PlayoutError::amcp(format!("read from {} failed: {}", host, err)))?;
    if n == 0 {
        return Err(PlayoutError::amcp(format!("{} closed the connection", host)));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Sends one command and collects the full response. The status code decides
/// how many data lines follow: `200` streams lines until an empty one,
/// `201` and `400` carry a single data line, anything else is bare.
pub(crate) fn send_command(
    host: &str,
    port: u16,
    timeout: Duration,
    command: &str,
) -> Result<AmcpResponse, PlayoutError> {
    let stream = connect(host, port, timeout)?;
    let mut writer = stream
        .try_clone()
        .map_err(|err| PlayoutError::amcp(format!("cannot clone stream: {}", err)))?;
    writer
        .write_all(command.as_bytes())
        .and_then(|_| writer.write_all(b"\r\n"))
        .and_then(|_| writer.flush())
        .map_err(|err| PlayoutError::amcp(format!("write to {} failed: {}", host, err)))?;

    let mut reader = BufReader::new(stream);
    let status = read_line(&mut reader, host)?;
    let code: u16 = status
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| PlayoutError::AmcpBadResponse(status.clone()))?;

    let mut lines = Vec::new();
    match code {
        200 => loop {
            let line = read_line(&mut reader, host)?;
            if line.is_empty() {
                break;
            }
            lines.push(line);
        },
        201 | 400 => lines.push(read_line(&mut reader, host)?),
        _ => {}
    }
    debug!("AMCP {} -> {} ({})", command, code, host);
    Ok(AmcpResponse { code, lines })
}
