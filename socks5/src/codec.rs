//! Fixed-width big-endian reads off the client stream.
//!
//! Every read either yields the whole field or fails with [`Error::Framing`];
//! nothing partial is handed back.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

pub async fn read_u8<R>(reader: &mut R) -> Result<u8>
where
    R: AsyncRead + Unpin,
{
    reader.read_u8().await.map_err(Error::Framing)
}

pub async fn read_u16<R>(reader: &mut R) -> Result<u16>
where
    R: AsyncRead + Unpin,
{
    reader.read_u16().await.map_err(Error::Framing)
}

pub async fn read_u32<R>(reader: &mut R) -> Result<u32>
where
    R: AsyncRead + Unpin,
{
    reader.read_u32().await.map_err(Error::Framing)
}

/// Upper bound on what is reserved before any payload has arrived.
const MAX_PREALLOC: usize = 64 * 1024;

/// Reads exactly `len` bytes.
///
/// The buffer grows with the data actually received, so a peer announcing
/// a huge length cannot force a matching allocation up front.
pub async fn read_bytes<R>(reader: &mut R, len: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
    (&mut *reader)
        .take(len as u64)
        .read_to_end(&mut buf)
        .await
        .map_err(Error::Framing)?;

    if buf.len() != len {
        return Err(Error::Framing(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, got {}", len, buf.len()),
        )));
    }
    Ok(buf)
}
