//! Network time, used to seed the assignment RNG.

use crate::error::{BugwatchError, Result};
use std::net::{ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01.
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// Length of one NTP era (the 32-bit seconds counter wraps on 2036-02-07).
const NTP_ERA_SECONDS: u64 = 1 << 32;

const PACKET_LEN: usize = 48;

pub trait TimeSource {
    /// Current Unix time in seconds, as reported by the service.
    fn now_seconds(&self) -> Result<f64>;
}

/// Minimal SNTP client (RFC 4330, client mode, version 3).
#[derive(Debug, Clone)]
pub struct SntpClock {
    server: String,
    timeout: Duration,
}

impl SntpClock {
    pub fn new(server: impl Into<String>, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            timeout,
        }
    }
}

impl TimeSource for SntpClock {
    fn now_seconds(&self) -> Result<f64> {
        let addr = self
            .server
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| BugwatchError::Time(format!("{} did not resolve", self.server)))?;

        let bind = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind)?;
        socket.set_read_timeout(Some(self.timeout))?;
        socket.set_write_timeout(Some(self.timeout))?;
        socket.connect(addr)?;

        let mut request = [0u8; PACKET_LEN];
        // LI = 0, VN = 3, Mode = 3 (client)
        request[0] = 0x1b;
        socket.send(&request)?;

        let mut response = [0u8; PACKET_LEN];
        let n = socket.recv(&mut response)?;
        let secs = parse_response(&response[..n])?;
        tracing::debug!(server = %self.server, secs, "Got network time");
        Ok(secs)
    }
}

/// Extract the transmit timestamp of an SNTP server reply as Unix seconds.
pub fn parse_response(packet: &[u8]) -> Result<f64> {
    if packet.len() < PACKET_LEN {
        return Err(BugwatchError::Time(format!(
            "short SNTP reply ({} bytes)",
            packet.len()
        )));
    }

    let mode = packet[0] & 0x07;
    if mode != 4 {
        return Err(BugwatchError::Time(format!("unexpected SNTP mode {}", mode)));
    }
    // Stratum 0 is a kiss-o'-death packet.
    if packet[1] == 0 {
        return Err(BugwatchError::Time("SNTP server sent kiss-o'-death".to_string()));
    }

    let mut secs = u32::from_be_bytes([packet[40], packet[41], packet[42], packet[43]]) as u64;
    let frac = u32::from_be_bytes([packet[44], packet[45], packet[46], packet[47]]) as f64;
    // Era 0 ends before any time we can run at, so small values are era 1.
    if secs < NTP_UNIX_OFFSET {
        secs += NTP_ERA_SECONDS;
    }

    Ok((secs - NTP_UNIX_OFFSET) as f64 + frac / 4_294_967_296.0)
}
