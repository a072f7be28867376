//! AMI actions and their wire encoding.

use crate::error::{AmiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Terminator of a login response block.
pub const BLOCK_TERMINATOR: &str = "\r\n\r\n";
/// Sentinel ending a peer enumeration.
pub const PEERLIST_COMPLETE: &str = "PeerlistComplete";
/// Sentinel ending `Action: Command` output.
pub const END_COMMAND: &str = "--END COMMAND--";

/// Which channel driver's peers to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerKind {
    Iax,
    Sip,
}

impl PeerKind {
    /// The AMI action that lists peers of this kind.
    pub fn action_name(self) -> &'static str {
        match self {
            PeerKind::Iax => "IAXpeerlist",
            PeerKind::Sip => "SIPPeers",
        }
    }
}

impl fmt::Display for PeerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerKind::Iax => f.write_str("iax"),
            PeerKind::Sip => f.write_str("sip"),
        }
    }
}

impl FromStr for PeerKind {
    type Err = AmiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "iax" | "iax2" => Ok(PeerKind::Iax),
            "sip" => Ok(PeerKind::Sip),
            other => Err(AmiError::parse_error(format!("unknown peer kind: {}", other))),
        }
    }
}

/// A request sent to the manager.
///
/// Each variant implies the shape of its reply: a flat block for
/// [`Action::Login`], a sentinel-terminated block list for
/// [`Action::PeerList`] and raw text for [`Action::Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Login { username: String, secret: String },
    PeerList(PeerKind),
    Command(String),
}

impl Action {
    /// Encode the request. Always ends with a blank line.
    pub fn encode(&self) -> String {
        match self {
            Action::Login { username, secret } => format!(
                "Action: login\r\nUsername: {}\r\nSecret: {}\r\nEvents: off\r\n\r\n",
                username, secret
            ),
            Action::PeerList(kind) => format!("Action: {}\r\n\r\n", kind.action_name()),
            Action::Command(command) => {
                format!("Action: Command\r\ncommand: {}\r\n\r\n", command)
            }
        }
    }

    /// Name of the action, for logging. Never includes credentials.
    pub fn name(&self) -> &str {
        match self {
            Action::Login { .. } => "login",
            Action::PeerList(kind) => kind.action_name(),
            Action::Command(_) => "Command",
        }
    }

    /// Literal marker that ends the reply to this action.
    pub fn terminator(&self) -> &'static str {
        match self {
            Action::Login { .. } => BLOCK_TERMINATOR,
            Action::PeerList(_) => PEERLIST_COMPLETE,
            Action::Command(_) => END_COMMAND,
        }
    }
}
