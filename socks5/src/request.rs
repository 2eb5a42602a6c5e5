//! CONNECT request parsing.

use log::{debug, warn};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::{read_bytes, read_u16, read_u8};
use crate::error::{Error, Result};
use crate::reply::{send_reply, ReplyCode};
use crate::{CONNECT_COMMAND, DOMAIN_NAME, IPV4_ADDRESS, IPV6_ADDRESS, SOCKS_VERSION};

/// A decoded CONNECT request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: u8,
    pub address_type: u8,
    /// Destination as `host:port`; IPv6 hosts are bracketed.
    pub target: String,
    /// DST.ADDR exactly as sent, without the domain length byte.
    pub raw_addr: Vec<u8>,
    pub port: u16,
}

/// Reads a CONNECT request header.
///
/// Any failure, including a stream that ends mid-header, writes the
/// matching failure reply before the error is returned. Nothing is written
/// on success; the caller replies once the outbound dial has finished.
pub async fn read_request<S>(stream: &mut S) -> Result<Request>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match parse_request(stream).await {
        Ok(request) => {
            debug!("目标地址: {}", request.target);
            Ok(request)
        }
        Err(err) => {
            let code = match err {
                Error::Command(_) => ReplyCode::CommandNotSupported,
                Error::AddressType(_) => ReplyCode::AddressTypeNotSupported,
                _ => ReplyCode::GeneralFailure,
            };
            warn!("拒绝请求: {}", err);
            // 对端可能已经断开
            if let Err(e) = send_reply(stream, code).await {
                debug!("发送失败响应出错: {}", e);
            }
            Err(err)
        }
    }
}

async fn parse_request<R>(stream: &mut R) -> Result<Request>
where
    R: AsyncRead + Unpin,
{
    let version = read_field(read_u8(stream)).await?;
    if version != SOCKS_VERSION {
        return Err(Error::Version(version));
    }

    let command = read_field(read_u8(stream)).await?;
    if command != CONNECT_COMMAND {
        return Err(Error::Command(command));
    }

    let reserved = read_field(read_u8(stream)).await?;
    if reserved != 0x00 {
        return Err(Error::Reserved(reserved));
    }

    let address_type = read_field(read_u8(stream)).await?;
    let (host, raw_addr) = match address_type {
        IPV4_ADDRESS => {
            let raw = read_field(read_bytes(stream, 4)).await?;
            let ip = Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3]);
            (Host::Ip(ip.into()), raw)
        }
        DOMAIN_NAME => {
            let len = read_field(read_u8(stream)).await?;
            let raw = read_field(read_bytes(stream, len as usize)).await?;
            if raw.is_empty() || !raw.is_ascii() {
                return Err(Error::Domain);
            }
            let domain = raw.iter().map(|&b| b as char).collect();
            (Host::Domain(domain), raw)
        }
        IPV6_ADDRESS => {
            let raw = read_field(read_bytes(stream, 16)).await?;
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&raw);
            (Host::Ip(Ipv6Addr::from(octets).into()), raw)
        }
        _ => return Err(Error::AddressType(address_type)),
    };

    let port = read_field(read_u16(stream)).await?;
    let target = match host {
        Host::Ip(ip) => SocketAddr::new(ip, port).to_string(),
        Host::Domain(domain) => format!("{}:{}", domain, port),
    };

    Ok(Request {
        command,
        address_type,
        target,
        raw_addr,
        port,
    })
}

/// Marks a framing failure as belonging to the request header.
async fn read_field<T>(read: impl Future<Output = Result<T>>) -> Result<T> {
    read.await.map_err(|e| match e {
        Error::Framing(io) => Error::ShortRequest(io),
        other => other,
    })
}

enum Host {
    Ip(std::net::IpAddr),
    Domain(String),
}
