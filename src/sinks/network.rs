use super::{join_values, parse_values, FrameSink};
use crate::{hand::FrameResult, Error, Result};
use log::{debug, info};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Flatten every hand of a frame into `x, windowHeight - y, z` triplets, in detection order
#[must_use]
pub fn frame_values(frame: &FrameResult, window_height: i32) -> Vec<i32> {
    frame
        .hands
        .iter()
        .flat_map(|hand| hand.bottom_up_values(window_height))
        .collect()
}

/// Render values as a bracketed list: `[312, 195, -10, ...]`
#[must_use]
pub fn encode_datagram(values: &[i32]) -> String {
    format!("[{}]", join_values(values.iter().copied(), ", "))
}

/// Parse a datagram payload back into its integers
///
/// # Errors
///
/// Returns an error if the payload is not a bracketed integer list
pub fn decode_datagram(payload: &str) -> Result<Vec<i32>> {
    let inner = payload
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::Sink(format!("Datagram is not a bracketed list: {payload}")))?;
    parse_values(inner)
}

/// Sends one datagram per frame that contains at least one hand
///
/// Delivery is fire-and-forget: no framing beyond the list syntax, no sequence
/// numbers, no acknowledgement.
pub struct UdpSender {
    socket: UdpSocket,
    destination: SocketAddr,
    window_height: i32,
    datagrams_sent: u64,
}

impl UdpSender {
    /// Open an unbound local socket aimed at `host:port`
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be resolved or no local socket can be bound
    pub fn new(host: &str, port: u16, window_height: i32) -> Result<Self> {
        let destination = (host, port)
            .to_socket_addrs()
            .map_err(|e| Error::Network(format!("Cannot resolve {host}:{port}: {e}")))?
            .next()
            .ok_or_else(|| Error::Network(format!("No address for {host}:{port}")))?;

        let local = if destination.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)
            .map_err(|e| Error::Network(format!("Failed to bind {local}: {e}")))?;

        info!("Streaming hand landmarks to udp://{}", destination);

        Ok(Self {
            socket,
            destination,
            window_height,
            datagrams_sent: 0,
        })
    }

    #[must_use]
    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Datagrams sent since creation
    #[must_use]
    pub fn datagrams_sent(&self) -> u64 {
        self.datagrams_sent
    }
}

impl FrameSink for UdpSender {
    fn accept(&mut self, frame: &FrameResult) -> Result<()> {
        if frame.is_empty() {
            return Ok(());
        }

        let payload = encode_datagram(&frame_values(frame, self.window_height));
        self.socket
            .send_to(payload.as_bytes(), self.destination)
            .map_err(|e| Error::Network(format!("Failed to send to {}: {e}", self.destination)))?;
        self.datagrams_sent += 1;

        debug!(
            "Sent {} hands ({} bytes) to {}",
            frame.hands.len(),
            payload.len(),
            self.destination
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "udp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_list_syntax() {
        assert_eq!(encode_datagram(&[312, 405, -10]), "[312, 405, -10]");
        assert_eq!(encode_datagram(&[]), "[]");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_datagram("[1, 2, -3]").unwrap(), vec![1, 2, -3]);
        assert!(decode_datagram("[]").unwrap().is_empty());
        assert!(decode_datagram("1, 2").is_err());
        assert!(decode_datagram("[1, a]").is_err());
    }
}
