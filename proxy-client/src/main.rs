use anyhow::{anyhow, Result};
use clap::Parser;
use log::{debug, error, info};
use pt_socks5::{copy_loop, send_reply, server_handshake, AuthParameters, JsonParameters, ReplyCode};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpListener, TcpStream},
};

#[derive(Parser)]
#[command(name = "pt-proxy-client")]
#[command(about = "SOCKS5 front end for pluggable transports")]
struct Args {
    /// SOCKS5 listen address
    #[arg(short = 'l', long, default_value = "127.0.0.1:1080")]
    socks_addr: String,

    /// Fixed upstream address, overrides the CONNECT target
    #[arg(short, long)]
    target: Option<String>,

    /// Forwarded to the auth negotiator as its policy flag
    #[arg(long)]
    need_options: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let listener = TcpListener::bind(&args.socks_addr).await?;
    info!("SOCKS5 监听器已注册: {}", listener.local_addr()?);
    if let Some(target) = &args.target {
        info!("固定上游地址: {}", target);
    }

    accept_loop(listener, args.target, args.need_options).await
}

async fn accept_loop(
    listener: TcpListener,
    target: Option<String>,
    need_options: bool,
) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                let session = uuid::Uuid::new_v4();
                info!("[{}] 新 SOCKS5 连接来自: {}", session, addr);
                let target = target.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_socks_connection(socket, target, need_options).await {
                        error!("[{}] 处理 SOCKS5 连接时出错: {}", session, e);
                    }
                });
            }
            Err(e) if is_fatal_accept_error(&e) => {
                error!("监听器出现致命错误: {}", e);
                return Err(e.into());
            }
            Err(e) => {
                error!("接受 SOCKS5 连接时出错: {}", e);
            }
        }
    }
}

fn is_fatal_accept_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::InvalidInput | std::io::ErrorKind::NotConnected
    )
}

async fn handle_socks_connection<S>(
    mut client: S,
    target: Option<String>,
    need_options: bool,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let handshake = server_handshake(&mut client, need_options, &JsonParameters).await?;
    let target = target.unwrap_or(handshake.request.target);

    let server = match dial(&target, handshake.args.as_ref()).await {
        Ok(conn) => {
            info!("成功连接到目标: {}", target);
            conn
        }
        Err(e) => {
            send_reply(&mut client, ReplyCode::from_io_error(&e)).await?;
            return Err(anyhow!("连接目标失败: {} - {}", target, e));
        }
    };

    send_reply(&mut client, ReplyCode::Succeeded).await?;

    copy_loop(Some(client), Some(server)).await?;
    Ok(())
}

/// Opens the outbound connection.
///
/// Transports that wrap the stream pick up their settings from `args`;
/// the plain TCP dialer only reports which keys it was given.
async fn dial(target: &str, args: Option<&AuthParameters>) -> std::io::Result<TcpStream> {
    if let Some(args) = args {
        let mut keys: Vec<&str> = args.keys().map(String::as_str).collect();
        keys.sort_unstable();
        debug!("传输参数: {:?}", keys);
    }
    TcpStream::connect(target).await
}
