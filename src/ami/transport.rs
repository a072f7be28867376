//! TCP transport with predicate-driven read framing.

use crate::error::{AmiError, Result};
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info};

/// Size of a single socket read.
const READ_CHUNK: usize = 4096;

/// Build a predicate matching buffers that contain `needle`.
///
/// The predicate expects a buffer that only grows between calls and resumes
/// scanning where the previous call stopped.
pub fn contains(needle: &'static str) -> impl FnMut(&[u8]) -> bool {
    let needle = needle.as_bytes();
    let mut scanned = 0usize;
    move |buf: &[u8]| {
        // Back up so a needle split across two reads is still found.
        let start = scanned.saturating_sub(needle.len().saturating_sub(1)).min(buf.len());
        scanned = buf.len();
        find_subslice(&buf[start..], needle).is_some()
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Owns the TCP socket. Knows nothing about AMI.
#[derive(Debug)]
pub struct Transport {
    stream: Option<TcpStream>,
    peer: String,
}

impl Transport {
    /// Open a TCP connection and apply the read timeout.
    ///
    /// Every resolved address is tried in turn; the last error is returned
    /// if none accepts.
    pub fn connect(
        host: &str,
        port: u16,
        read_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let peer = format!("{}:{}", host, port);
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| AmiError::connect_error(&peer, e))?;

        let mut last_err =
            io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses");
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(read_timeout))
                        .map_err(|e| AmiError::connect_error(&peer, e))?;
                    info!("Connected to AMI at {}", addr);
                    return Ok(Self {
                        stream: Some(stream),
                        peer,
                    });
                }
                Err(e) => {
                    debug!("Connect to {} failed: {}", addr, e);
                    last_err = e;
                }
            }
        }

        Err(AmiError::connect_error(peer, last_err))
    }

    /// Address this transport was opened against.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        let peer = &self.peer;
        self.stream
            .as_mut()
            .ok_or_else(|| AmiError::connection_closed(format!("socket to {}", peer)))
    }

    /// Read whatever is pending in a single read.
    ///
    /// A read timeout is "no data available now" and yields an empty string.
    pub fn read_available(&mut self) -> Result<String> {
        let mut chunk = [0u8; READ_CHUNK];
        match self.stream()?.read(&mut chunk) {
            Ok(n) => Ok(String::from_utf8_lossy(&chunk[..n]).into_owned()),
            Err(e) if is_timeout(&e) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Accumulate reads until `predicate` matches the buffer.
    ///
    /// `waiting_for` names the expected terminator in errors. A read timeout
    /// before the predicate matches returns [`AmiError::Timeout`]; a zero-byte
    /// read returns [`AmiError::ConnectionClosed`].
    pub fn read_until<P>(&mut self, waiting_for: &str, mut predicate: P) -> Result<String>
    where
        P: FnMut(&[u8]) -> bool,
    {
        let mut buffer = Vec::with_capacity(READ_CHUNK);
        let mut chunk = [0u8; READ_CHUNK];

        while !predicate(&buffer) {
            let n = match self.stream()?.read(&mut chunk) {
                Ok(0) => return Err(AmiError::connection_closed(waiting_for)),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => return Err(AmiError::timeout(waiting_for)),
                Err(e) => return Err(e.into()),
            };
            buffer.extend_from_slice(&chunk[..n]);
            debug!("Read {} bytes ({} buffered)", n, buffer.len());
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Send a fully formed request.
    pub fn write(&mut self, payload: &[u8]) -> Result<()> {
        let stream = self.stream()?;
        stream.write_all(payload)?;
        stream.flush()?;
        Ok(())
    }

    /// Shut the socket down. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // The peer may already have gone away.
            let _ = stream.shutdown(Shutdown::Both);
            debug!("Closed AMI connection to {}", self.peer);
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

fn is_timeout(e: &io::Error) -> bool {
    // Unix reports WouldBlock for SO_RCVTIMEO expiry, Windows reports TimedOut.
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_contains_predicate() {
        assert!(contains("--END COMMAND--")(b"output\n--END COMMAND--\r\n"));
        assert!(!contains("--END COMMAND--")(b"output\n--END COMM"));
        assert!(!contains("--END COMMAND--")(b""));
    }

    #[test]
    fn test_contains_finds_needle_split_across_reads() {
        let mut pred = contains("PeerlistComplete");
        let mut buffer = b"Event: PeerEntry\r\n\r\nEvent: Peerlist".to_vec();
        assert!(!pred(&buffer));
        buffer.extend_from_slice(b"Comp");
        assert!(!pred(&buffer));
        buffer.extend_from_slice(b"lete\r\n\r\n");
        assert!(pred(&buffer));
    }

    #[test]
    fn test_read_available_returns_empty_on_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (sock, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(300));
            drop(sock);
        });

        let mut transport = Transport::connect(
            "127.0.0.1",
            port,
            Duration::from_millis(100),
            Duration::from_secs(2),
        )
        .unwrap();
        assert_eq!(transport.read_available().unwrap(), "");
        assert!(transport.is_open());

        server.join().unwrap();
    }

    #[test]
    fn test_read_until_accumulates_across_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            sock.write_all(b"Response: Success\r\n").unwrap();
            sock.flush().unwrap();
            thread::sleep(Duration::from_millis(50));
            sock.write_all(b"Message: ok\r\n\r\n").unwrap();
        });

        let mut transport = Transport::connect(
            "127.0.0.1",
            port,
            Duration::from_secs(2),
            Duration::from_secs(2),
        )
        .unwrap();
        let text = transport.read_until("blank line", contains("\r\n\r\n")).unwrap();
        assert_eq!(text, "Response: Success\r\nMessage: ok\r\n\r\n");

        server.join().unwrap();
    }

    #[test]
    fn test_read_until_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            sock.write_all(b"partial").unwrap();
            thread::sleep(Duration::from_millis(300));
        });

        let mut transport = Transport::connect(
            "127.0.0.1",
            port,
            Duration::from_millis(100),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = transport.read_until("sentinel", contains("never")).unwrap_err();
        assert!(err.is_timeout());

        server.join().unwrap();
    }

    #[test]
    fn test_read_until_reports_closed_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (sock, _) = listener.accept().unwrap();
            drop(sock);
        });

        let mut transport = Transport::connect(
            "127.0.0.1",
            port,
            Duration::from_secs(2),
            Duration::from_secs(2),
        )
        .unwrap();
        server.join().unwrap();

        let err = transport.read_until("sentinel", contains("never")).unwrap_err();
        assert!(matches!(err, AmiError::ConnectionClosed(_)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut transport = Transport::connect(
            "127.0.0.1",
            port,
            Duration::from_secs(2),
            Duration::from_secs(2),
        )
        .unwrap();
        transport.close();
        transport.close();
        assert!(!transport.is_open());
        assert!(transport.write(b"Action: Ping\r\n\r\n").is_err());
    }
}
