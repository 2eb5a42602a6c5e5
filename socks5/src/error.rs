//! Error types for the SOCKS5 handshake and the relay.

use thiserror::Error;

/// Result type alias for handshake and relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while negotiating, parsing or relaying a connection.
#[derive(Error, Debug)]
pub enum Error {
    /// The stream ended early or failed while reading a field
    #[error("framing error: {0}")]
    Framing(#[source] std::io::Error),

    /// The stream ended or failed inside the CONNECT request
    #[error("truncated request: {0}")]
    ShortRequest(#[source] std::io::Error),

    /// Greeting or request carried a version other than 0x05
    #[error("unsupported SOCKS version: {0:#04x}")]
    Version(u8),

    /// Request command was not CONNECT
    #[error("unsupported command: {0:#04x}")]
    Command(u8),

    /// Request reserved byte was non-zero
    #[error("reserved field must be zero, got {0:#04x}")]
    Reserved(u8),

    /// Request address type was not IPv4, domain name or IPv6
    #[error("unsupported address type: {0:#04x}")]
    AddressType(u8),

    /// Domain name bytes were not valid UTF-8
    #[error("invalid domain name in request")]
    Domain,

    /// Parameter block announced a zero length
    #[error("PT 2.0 authentication data with 0 length")]
    EmptyPayload,

    /// Parameter block did not parse under the transport grammar
    #[error("invalid PT 2.0 client parameters: {0}")]
    Parameters(String),

    /// No credential decoder exists for the selected method
    #[error("unsupported authentication method: {0:#04x}")]
    UnsupportedMethod(u8),

    /// The client offered nothing we accept
    #[error("no acceptable authentication methods")]
    NoAcceptableMethods,

    /// A relay direction failed
    #[error("relay error: {0}")]
    Relay(#[source] std::io::Error),

    /// The relay was started without one of its connections
    #[error("copy loop has a nil connection ({0})")]
    MissingConnection(&'static str),

    /// Writing to the peer failed
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures of the authentication payload.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::EmptyPayload | Error::Parameters(_) | Error::UnsupportedMethod(_)
        )
    }

    /// True when a SOCKS5 failure reply was written before this error was returned.
    ///
    /// `Version` is not included: in the greeting nothing is written back.
    pub fn reply_sent(&self) -> bool {
        matches!(
            self,
            Error::ShortRequest(_)
                | Error::Command(_)
                | Error::Reserved(_)
                | Error::AddressType(_)
                | Error::Domain
        )
    }
}
