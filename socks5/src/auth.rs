//! Method negotiation and the method-specific credential payload.

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::args::{AuthParameters, ParameterParser};
use crate::codec::{read_bytes, read_u32, read_u8};
use crate::error::{Error, Result};
use crate::{JSON_PARAMETER_BLOCK, NO_ACCEPTABLE_METHODS, NO_AUTHENTICATION, SOCKS_VERSION};

/// Methods we accept, best first.
const METHOD_PRIORITY: [u8; 2] = [JSON_PARAMETER_BLOCK, NO_AUTHENTICATION];

/// Picks the best method the client offered, or `NO_ACCEPTABLE_METHODS`.
pub fn select_method(offered: &[u8]) -> u8 {
    METHOD_PRIORITY
        .iter()
        .copied()
        .find(|method| offered.contains(method))
        .unwrap_or(NO_ACCEPTABLE_METHODS)
}

/// Runs the greeting / method selection exchange.
///
/// ```text
/// +-----+----------+----------+        +-----+--------+
/// | VER | NMETHODS | METHODS  |  --->  | VER | METHOD |
/// +-----+----------+----------+        +-----+--------+
/// ```
///
/// A bad version fails before anything is written. Otherwise the selected
/// method is always echoed back, and a client with nothing acceptable gets
/// `0xFF` with an `Ok` result: callers have to check the returned method.
///
/// `need_options` is carried through for the transport layer; selection
/// is the same with or without it.
pub async fn negotiate_auth<S>(stream: &mut S, need_options: bool) -> Result<u8>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let version = read_u8(stream).await?;
    if version != SOCKS_VERSION {
        return Err(Error::Version(version));
    }

    let nmethods = read_u8(stream).await?;
    let methods = read_bytes(stream, nmethods as usize).await?;

    let method = select_method(&methods);
    debug!(
        "客户端提供的认证方法: {:02x?}, need_options={}, 选择: {:#04x}",
        methods, need_options, method
    );

    stream.write_all(&[SOCKS_VERSION, method]).await?;
    stream.flush().await?;

    if method == NO_ACCEPTABLE_METHODS {
        warn!("没有可接受的认证方法");
    }
    Ok(method)
}

/// Reads the payload of the selected method.
///
/// For the parameter block this is `LEN(4) | DATA(LEN)`, decoded by
/// `parser`. Nothing is written back on success.
pub async fn authenticate<S, P>(
    stream: &mut S,
    method: u8,
    parser: &P,
) -> Result<Option<AuthParameters>>
where
    S: AsyncRead + Unpin,
    P: ParameterParser + ?Sized,
{
    match method {
        NO_AUTHENTICATION => Ok(None),
        JSON_PARAMETER_BLOCK => read_parameter_block(stream, parser).await.map(Some),
        other => Err(Error::UnsupportedMethod(other)),
    }
}

async fn read_parameter_block<S, P>(stream: &mut S, parser: &P) -> Result<AuthParameters>
where
    S: AsyncRead + Unpin,
    P: ParameterParser + ?Sized,
{
    let len = read_u32(stream).await?;
    if len == 0 {
        return Err(Error::EmptyPayload);
    }
    let data = read_bytes(stream, len as usize).await?;
    let raw = String::from_utf8_lossy(&data);

    let args = parser.parse(&raw).map_err(|e| {
        warn!("解析 PT 2.0 客户端参数失败: {}", e);
        Error::Parameters(e.to_string())
    })?;

    info!("PT 2.0 参数块认证成功, {} 个参数", args.len());
    Ok(args)
}
