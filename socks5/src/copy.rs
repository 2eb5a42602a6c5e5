//! Bidirectional relay between the SOCKS client and the transport connection.

use log::{debug, error, info};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};

/// Relays bytes both ways until each direction has hit EOF or an error.
///
/// `client` is the SOCKS side, `server` the transport side. A failure in
/// one direction does not stop the other; both are drained before the
/// connections are shut down, once, here. The last error seen is returned.
pub async fn copy_loop<A, B>(client: Option<A>, server: Option<B>) -> Result<()>
where
    A: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    B: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    debug!("--> 进入转发循环");

    let Some(server) = server else {
        error!("--> 转发循环缺少连接 (b)");
        return Err(Error::MissingConnection("b"));
    };
    let Some(client) = client else {
        error!("--> 转发循环缺少连接 (a)");
        return Err(Error::MissingConnection("a"));
    };

    let (client_read, client_write) = tokio::io::split(client);
    let (server_read, server_write) = tokio::io::split(server);

    let (client_done_tx, mut client_done) = oneshot::channel();
    let (server_done_tx, mut server_done) = oneshot::channel();
    // 每个方向最多一个错误
    let (error_tx, mut error_rx) = mpsc::channel(2);

    let upstream = tokio::spawn(pump(
        "客户端 -> 服务器",
        client_read,
        server_write,
        client_done_tx,
        error_tx.clone(),
    ));
    let downstream = tokio::spawn(pump(
        "服务器 -> 客户端",
        server_read,
        client_write,
        server_done_tx,
        error_tx,
    ));

    let mut client_running = true;
    let mut server_running = true;
    let mut copy_error = None;

    while client_running || server_running {
        tokio::select! {
            _ = &mut client_done, if client_running => client_running = false,
            _ = &mut server_done, if server_running => server_running = false,
            Some(e) = error_rx.recv() => {
                error!("转发数据时出错: {}", e);
                copy_error = Some(e);
            }
        }
    }

    // errors are queued before their direction reports done
    while let Ok(e) = error_rx.try_recv() {
        error!("转发数据时出错: {}", e);
        copy_error = Some(e);
    }

    match (upstream.await, downstream.await) {
        (Ok((client_read, server_write)), Ok((server_read, client_write))) => {
            close(client_read.unsplit(client_write)).await;
            close(server_read.unsplit(server_write)).await;
        }
        _ => error!("转发任务异常退出"),
    }

    info!("转发结束");
    match copy_error {
        Some(e) => Err(Error::Relay(e)),
        None => Ok(()),
    }
}

async fn pump<R, W>(
    direction: &'static str,
    mut reader: ReadHalf<R>,
    mut writer: WriteHalf<W>,
    done: oneshot::Sender<()>,
    errors: mpsc::Sender<std::io::Error>,
) -> (ReadHalf<R>, WriteHalf<W>)
where
    R: AsyncRead + AsyncWrite,
    W: AsyncRead + AsyncWrite,
{
    let result = tokio::io::copy(&mut reader, &mut writer).await;
    // 传递 EOF, 不影响另一个方向
    let _ = writer.shutdown().await;

    match result {
        Ok(n) => debug!("{} 传输完成, {} 字节", direction, n),
        Err(e) => {
            let _ = errors.send(e).await;
        }
    }
    let _ = done.send(());

    (reader, writer)
}

async fn close<S>(mut stream: S)
where
    S: AsyncWrite + Unpin,
{
    let _ = stream.shutdown().await;
}
