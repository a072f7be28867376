//! Authenticated request/response session over a [`Transport`].

use crate::ami::action::{Action, PeerKind};
use crate::ami::channels::{ChannelStats, CHANNELS_COMMAND};
use crate::ami::response::{self, PeerRecord};
use crate::ami::transport::{self, Transport};
use crate::config::AmiConfig;
use crate::error::Result;
use tracing::{debug, info, warn};

/// One manager connection, owned by a single caller.
///
/// Queries issued before a successful [`AmiSession::login`] return empty
/// results without touching the socket.
#[derive(Debug)]
pub struct AmiSession {
    config: AmiConfig,
    transport: Transport,
    authenticated: bool,
}

impl AmiSession {
    /// Connect to the manager. Does not log in.
    pub fn connect(config: AmiConfig) -> Result<Self> {
        config.validate()?;
        let transport = Transport::connect(
            &config.host,
            config.port,
            config.read_timeout(),
            config.connect_timeout(),
        )?;

        Ok(Self {
            config,
            transport,
            authenticated: false,
        })
    }

    /// Whether the last login was accepted.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Consume the banner and authenticate with events disabled.
    ///
    /// A timeout while waiting for the reply leaves the session
    /// unauthenticated instead of failing.
    pub fn login(&mut self) -> Result<bool> {
        let banner = self.transport.read_available()?;
        debug!("AMI banner: {:?}", banner.trim_end());

        let action = Action::Login {
            username: self.config.username.clone(),
            secret: self.config.secret.clone(),
        };
        self.send(&action)?;

        self.authenticated = match self.read_reply(&action) {
            Ok(reply) => response::login_succeeded(&reply),
            Err(e) if e.is_timeout() => {
                warn!("Timed out waiting for login response from {}", self.transport.peer());
                false
            }
            Err(e) => return Err(e),
        };

        if self.authenticated {
            info!("Logged in to {} as {}", self.transport.peer(), self.config.username);
        } else {
            warn!("Login to {} as {} was rejected", self.transport.peer(), self.config.username);
        }
        Ok(self.authenticated)
    }

    /// Enumerate configured peers of `kind`.
    pub fn list_peers(&mut self, kind: PeerKind) -> Result<Vec<PeerRecord>> {
        if !self.authenticated {
            debug!("Skipping {} peer list: not authenticated", kind);
            return Ok(Vec::new());
        }

        let action = Action::PeerList(kind);
        self.send(&action)?;
        let reply = self.read_reply(&action)?;
        let peers = response::decode_peer_list(&reply);
        debug!("Decoded {} {} peers", peers.len(), kind);
        Ok(peers)
    }

    /// Shorthand for `list_peers(PeerKind::Iax)`.
    pub fn iax_peers(&mut self) -> Result<Vec<PeerRecord>> {
        self.list_peers(PeerKind::Iax)
    }

    /// Shorthand for `list_peers(PeerKind::Sip)`.
    pub fn sip_peers(&mut self) -> Result<Vec<PeerRecord>> {
        self.list_peers(PeerKind::Sip)
    }

    /// Run a CLI command and return its raw output.
    ///
    /// Returns `None` when the session is not authenticated.
    pub fn run_command(&mut self, command: &str) -> Result<Option<String>> {
        if !self.authenticated {
            debug!("Skipping command {:?}: not authenticated", command);
            return Ok(None);
        }

        let action = Action::Command(command.to_string());
        self.send(&action)?;
        let reply = self.read_reply(&action)?;
        Ok(Some(response::command_payload(&reply)))
    }

    /// Channel and call counters from `core show channels`.
    pub fn channel_stats(&mut self) -> Result<ChannelStats> {
        Ok(self
            .run_command(CHANNELS_COMMAND)?
            .map(|output| ChannelStats::from_command_output(&output))
            .unwrap_or_default())
    }

    /// Close the connection and release the session.
    pub fn disconnect(mut self) {
        self.transport.close();
        info!("Disconnected from {}", self.config.socket_address());
    }

    fn send(&mut self, action: &Action) -> Result<()> {
        debug!("Sending action {}", action.name());
        self.transport.write(action.encode().as_bytes())
    }

    fn read_reply(&mut self, action: &Action) -> Result<String> {
        let terminator = action.terminator();
        self.transport
            .read_until(terminator, transport::contains(terminator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    fn read_request(sock: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut byte = [0u8; 1];
        while !buf.ends_with(b"\r\n\r\n") {
            if sock.read(&mut byte).unwrap() == 0 {
                break;
            }
            buf.push(byte[0]);
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_login_then_command() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            sock.write_all(b"Asterisk Call Manager/5.0.1\r\n").unwrap();

            let login = read_request(&mut sock);
            assert!(login.contains("Events: off"));
            sock.write_all(b"Response: Success\r\nMessage: Authentication accepted\r\n\r\n")
                .unwrap();

            let command = read_request(&mut sock);
            assert_eq!(command, "Action: Command\r\ncommand: core show channels\r\n\r\n");
            sock.write_all(
                b"Response: Follows\r\nPrivilege: Command\r\n\
                  SIP/alice-0001  Up\n1 active channels\n1 active calls\n7 calls processed\n\
                  --END COMMAND--\r\n\r\n",
            )
            .unwrap();
        });

        let config = AmiConfig::new("127.0.0.1", port).with_credentials("admin", "x");
        let mut session = AmiSession::connect(config).unwrap();
        assert!(session.login().unwrap());

        let stats = session.channel_stats().unwrap();
        assert_eq!(stats.sip_channels, 1);
        assert_eq!(stats.active_channels, 1);
        assert_eq!(stats.calls_processed, 7);

        session.disconnect();
        server.join().unwrap();
    }

    #[test]
    fn test_unauthenticated_command_is_none() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut session = AmiSession::connect(AmiConfig::new("127.0.0.1", port)).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.run_command("core show channels").unwrap(), None);
        assert_eq!(session.channel_stats().unwrap(), ChannelStats::default());
        drop(listener);
    }
}
