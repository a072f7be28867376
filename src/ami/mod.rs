//! Asterisk Manager Interface protocol client.
//!
//! [`Transport`] owns the socket and frames reads by predicate.
//! [`AmiSession`] performs the login handshake and the peer-list and
//! command queries on top of it, decoding each reply shape separately.

pub mod action;
pub mod channels;
pub mod response;
pub mod session;
pub mod transport;

// Re-export commonly used items
pub use action::{Action, PeerKind};
pub use channels::ChannelStats;
pub use response::PeerRecord;
pub use session::AmiSession;
pub use transport::Transport;
