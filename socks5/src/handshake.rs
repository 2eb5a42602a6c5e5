//! Whole server-side handshake, up to the final reply.

use log::info;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::args::{AuthParameters, ParameterParser};
use crate::auth::{authenticate, negotiate_auth};
use crate::error::{Error, Result};
use crate::request::{read_request, Request};
use crate::NO_ACCEPTABLE_METHODS;

/// Everything learned from a client before the outbound dial.
#[derive(Debug, Clone)]
pub struct Handshake {
    pub method: u8,
    pub args: Option<AuthParameters>,
    pub request: Request,
}

/// Negotiates, authenticates and reads the CONNECT request.
///
/// Stops short of the final reply: send [`ReplyCode::Succeeded`] once the
/// target is connected, or a failure code if the dial fails.
///
/// [`ReplyCode::Succeeded`]: crate::ReplyCode::Succeeded
pub async fn server_handshake<S, P>(
    stream: &mut S,
    need_options: bool,
    parser: &P,
) -> Result<Handshake>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: ParameterParser + ?Sized,
{
    let method = negotiate_auth(stream, need_options).await?;
    if method == NO_ACCEPTABLE_METHODS {
        return Err(Error::NoAcceptableMethods);
    }

    let args = authenticate(stream, method, parser).await?;
    let request = read_request(stream).await?;

    info!("SOCKS5 握手成功, 目标: {}", request.target);
    Ok(Handshake {
        method,
        args,
        request,
    })
}
