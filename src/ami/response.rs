//! Decoders for the three AMI reply shapes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Separator between a key and its value on a block line.
const KEY_VALUE_SEPARATOR: &str = ": ";

/// Number of acknowledgement lines preceding `Action: Command` output.
const COMMAND_HEADER_LINES: usize = 2;

/// One `Event: PeerEntry` block from a peer enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerRecord {
    fields: HashMap<String, String>,
}

impl PeerRecord {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Value for `key`, compared case-sensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Peer name as reported by the server (`ObjectName`).
    pub fn object_name(&self) -> Option<&str> {
        self.get("ObjectName")
    }

    /// Whether an IAX peer currently has an address.
    pub fn has_address(&self) -> bool {
        matches!(self.get("IPaddress"), Some(addr) if addr != "(null)")
    }

    /// Whether a SIP peer's qualify status reports OK.
    pub fn status_ok(&self) -> bool {
        self.get("Status").is_some_and(|status| status.contains("OK"))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split a `Key: Value` line on the first separator.
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    line.split_once(KEY_VALUE_SEPARATOR)
}

/// Split reply text into blank-line separated blocks, ignoring `\r`.
pub fn split_blocks(text: &str) -> Vec<String> {
    let normalized = text.replace('\r', "");
    normalized
        .split("\n\n")
        .map(|block| block.trim().to_string())
        .filter(|block| !block.is_empty())
        .collect()
}

/// Decode the login reply; true only for `Response: Success`.
///
/// Both key and value are compared case-insensitively since server casing
/// varies.
pub fn login_succeeded(text: &str) -> bool {
    let mut authenticated = false;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        match split_key_value(line) {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("response") => {
                authenticated = value.trim().eq_ignore_ascii_case("success");
            }
            Some(_) => {}
            None => warn!("Skipping malformed login response line: {:?}", line),
        }
    }
    authenticated
}

/// Decode a peer enumeration into its `PeerEntry` records, in arrival order.
pub fn decode_peer_list(text: &str) -> Vec<PeerRecord> {
    let mut peers = Vec::new();

    for block in split_blocks(text) {
        let mut fields = HashMap::new();
        for line in block.lines().filter(|line| !line.trim().is_empty()) {
            match split_key_value(line) {
                Some((key, value)) => {
                    fields.insert(key.to_string(), value.trim().to_string());
                }
                None => warn!("Skipping malformed peer list line: {:?}", line),
            }
        }

        if fields.get("Event").map(String::as_str) == Some("PeerEntry") {
            peers.push(PeerRecord::new(fields));
        }
    }

    peers
}

/// Extract the raw output of an `Action: Command` reply.
///
/// The first two CRLF lines are the acknowledgement header; everything
/// after them is returned, re-joined with `\n`.
pub fn command_payload(text: &str) -> String {
    text.split("\r\n")
        .skip(COMMAND_HEADER_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER_STREAM: &str = "Response: Success\r\n\
        EventList: start\r\n\
        Message: Peer status list will follow\r\n\
        \r\n\
        Event: PeerEntry\r\n\
        Channeltype: SIP\r\n\
        ObjectName: alice\r\n\
        IPaddress: 10.0.0.5\r\n\
        Status: OK (12 ms)\r\n\
        \r\n\
        Event: PeerEntry\r\n\
        Channeltype: SIP\r\n\
        ObjectName: bob\r\n\
        IPaddress: (null)\r\n\
        Status: UNKNOWN\r\n\
        \r\n\
        Event: PeerlistComplete\r\n\
        EventList: Complete\r\n\
        ListItems: 2\r\n\
        \r\n";

    #[test]
    fn test_login_success_any_case() {
        assert!(login_succeeded("Response: Success\r\nMessage: Authentication accepted\r\n\r\n"));
        assert!(login_succeeded("response: SUCCESS\r\n\r\n"));
        assert!(login_succeeded("RESPONSE:  success  \r\n\r\n"));
    }

    #[test]
    fn test_login_failure() {
        assert!(!login_succeeded("Response: Error\r\nMessage: Authentication failed\r\n\r\n"));
        assert!(!login_succeeded("Message: no response key\r\n\r\n"));
        assert!(!login_succeeded(""));
    }

    #[test]
    fn test_login_skips_malformed_lines() {
        assert!(login_succeeded("garbage line\r\nResponse: Success\r\n\r\n"));
    }

    #[test]
    fn test_decode_peer_list_keeps_peer_entries_in_order() {
        let peers = decode_peer_list(PEER_STREAM);
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].object_name(), Some("alice"));
        assert_eq!(peers[1].object_name(), Some("bob"));
        assert!(peers.iter().all(|p| p.get("Event") == Some("PeerEntry")));
    }

    #[test]
    fn test_decode_peer_list_skips_malformed_line() {
        let text = "Event: PeerEntry\r\nObjectName: carol\r\nnot a pair\r\nStatus: OK\r\n\r\n\
                    Event: PeerlistComplete\r\n\r\n";
        let peers = decode_peer_list(text);
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].object_name(), Some("carol"));
        assert_eq!(peers[0].get("Status"), Some("OK"));
        assert_eq!(peers[0].len(), 3);
        assert!(!peers[0].is_empty());
    }

    #[test]
    fn test_value_keeps_text_after_first_separator() {
        let peers = decode_peer_list("Event: PeerEntry\r\nDescription: a: b\r\n\r\n");
        assert_eq!(peers[0].get("Description"), Some("a: b"));
    }

    #[test]
    fn test_peer_connectivity_helpers() {
        let peers = decode_peer_list(PEER_STREAM);
        assert!(peers[0].has_address());
        assert!(peers[0].status_ok());
        assert!(!peers[1].has_address());
        assert!(!peers[1].status_ok());
        assert!(!PeerRecord::default().has_address());
        assert!(PeerRecord::default().is_empty());
    }

    #[test]
    fn test_command_payload_skips_header() {
        let reply = "Response: Follows\r\nPrivilege: Command\r\n\
                     Channel Location State Application(Data)\n\
                     0 active channels\n\
                     --END COMMAND--\r\n\r\n";
        let payload = command_payload(reply);
        assert!(payload.starts_with("Channel Location"));
        assert!(payload.contains("0 active channels"));
        assert!(!payload.contains("Privilege"));
    }

    #[test]
    fn test_command_payload_short_reply() {
        assert_eq!(command_payload("Response: Follows\r\n"), "");
    }
}
