//! SOCKS5 front end for pluggable transports.
//!
//! The local application talks SOCKS5 to us. Besides "no authentication"
//! we accept method `0x09`, whose payload is a length-prefixed PT 2.x
//! parameter block that configures the outbound transport. After the
//! CONNECT request is parsed the caller dials, replies, and hands both
//! connections to [`copy_loop`].
//!
//! ```text
//! negotiate_auth -> authenticate -> read_request -> (dial) -> send_reply -> copy_loop
//! ```

pub mod args;
pub mod auth;
pub mod codec;
pub mod copy;
pub mod error;
pub mod handshake;
pub mod reply;
pub mod request;

#[cfg(test)]
mod test_utils;

pub use args::{AuthParameters, BoxError, JsonParameters, ParameterParser};
pub use auth::{authenticate, negotiate_auth, select_method};
pub use copy::copy_loop;
pub use error::{Error, Result};
pub use handshake::{server_handshake, Handshake};
pub use reply::{encode_reply, send_reply, ReplyCode};
pub use request::{read_request, Request};

pub const SOCKS_VERSION: u8 = 0x05;

// 认证方法
pub const NO_AUTHENTICATION: u8 = 0x00;
pub const JSON_PARAMETER_BLOCK: u8 = 0x09;
pub const NO_ACCEPTABLE_METHODS: u8 = 0xFF;

pub const CONNECT_COMMAND: u8 = 0x01;

// 地址类型
pub const IPV4_ADDRESS: u8 = 0x01;
pub const DOMAIN_NAME: u8 = 0x03;
pub const IPV6_ADDRESS: u8 = 0x04;
