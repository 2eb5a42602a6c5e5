//! SOCKS5 reply encoding.

use bytes::{BufMut, BytesMut};
use std::io::ErrorKind;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::{IPV4_ADDRESS, SOCKS_VERSION};

/// Length of every reply we send: the bound address is always the null IPv4 one.
pub const REPLY_LEN: usize = 10;

/// SOCKS5 reply status (REP field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    Succeeded = 0x00,
    GeneralFailure = 0x01,
    ConnectionNotAllowed = 0x02,
    NetworkUnreachable = 0x03,
    HostUnreachable = 0x04,
    ConnectionRefused = 0x05,
    TtlExpired = 0x06,
    CommandNotSupported = 0x07,
    AddressTypeNotSupported = 0x08,
}

impl ReplyCode {
    /// Picks the reply to send when dialing the target failed.
    pub fn from_io_error(err: &std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::ConnectionRefused => ReplyCode::ConnectionRefused,
            ErrorKind::HostUnreachable | ErrorKind::NotFound => ReplyCode::HostUnreachable,
            ErrorKind::NetworkUnreachable | ErrorKind::AddrNotAvailable => {
                ReplyCode::NetworkUnreachable
            }
            ErrorKind::PermissionDenied => ReplyCode::ConnectionNotAllowed,
            ErrorKind::TimedOut => ReplyCode::TtlExpired,
            _ => ReplyCode::GeneralFailure,
        }
    }
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> u8 {
        code as u8
    }
}

/// Serializes a reply.
///
/// ```text
/// +-----+-----+-------+------+----------+----------+
/// | VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +-----+-----+-------+------+----------+----------+
/// |  1  |  1  | X'00' |  1   |    4     |    2     |
/// +-----+-----+-------+------+----------+----------+
/// ```
///
/// BND.ADDR and BND.PORT are always zero.
pub fn encode_reply(code: ReplyCode) -> BytesMut {
    let mut buf = BytesMut::with_capacity(REPLY_LEN);
    buf.put_u8(SOCKS_VERSION);
    buf.put_u8(code.into());
    buf.put_u8(0x00);
    buf.put_u8(IPV4_ADDRESS);
    buf.put_u32(0);
    buf.put_u16(0);
    buf
}

/// Writes a reply to the client and flushes it.
pub async fn send_reply<W>(writer: &mut W, code: ReplyCode) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_reply(code)).await?;
    writer.flush().await?;
    Ok(())
}
