use pt_socks5::{
    copy_loop, send_reply, server_handshake, Error, JsonParameters, ReplyCode,
    JSON_PARAMETER_BLOCK,
};
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[tokio::test]
async fn test_full_session() {
    init_logger();
    let (mut app, socks_side) = duplex(4096);
    let (transport_side, mut remote) = duplex(4096);

    let server = tokio::spawn(async move {
        let mut socks_side = socks_side;
        let hs = server_handshake(&mut socks_side, true, &JsonParameters).await?;
        send_reply(&mut socks_side, ReplyCode::Succeeded).await?;
        copy_loop(Some(socks_side), Some(transport_side)).await?;
        Ok::<_, Error>(hs)
    });

    // VER = 05, NMETHODS = 02, METHODS = [00, 09]
    app.write_all(&[0x05, 0x02, 0x00, 0x09]).await.unwrap();
    let mut selected = [0u8; 2];
    app.read_exact(&mut selected).await.unwrap();
    assert_eq!(selected, [0x05, JSON_PARAMETER_BLOCK]);

    let params = br#"{"transport":"shadow","password":"secret"}"#;
    app.write_all(&(params.len() as u32).to_be_bytes()).await.unwrap();
    app.write_all(params).await.unwrap();

    // CONNECT example.com:443
    let mut request = vec![0x05, 0x01, 0x00, 0x03, 11];
    request.extend_from_slice(b"example.com");
    request.extend_from_slice(&443u16.to_be_bytes());
    app.write_all(&request).await.unwrap();

    let mut reply = [0u8; 10];
    app.read_exact(&mut reply).await.unwrap();
    assert_eq!(reply, [0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);

    app.write_all(b"GET / HTTP/1.0\r\n\r\n").await.unwrap();
    let mut upstream = [0u8; 18];
    remote.read_exact(&mut upstream).await.unwrap();
    assert_eq!(&upstream, b"GET / HTTP/1.0\r\n\r\n");

    remote.write_all(b"HTTP/1.0 200 OK\r\n\r\n").await.unwrap();
    drop(remote);
    app.shutdown().await.unwrap();

    let mut response = Vec::new();
    app.read_to_end(&mut response).await.unwrap();
    assert_eq!(response, b"HTTP/1.0 200 OK\r\n\r\n");

    let hs = server.await.unwrap().unwrap();
    assert_eq!(hs.request.target, "example.com:443");
    let args = hs.args.unwrap();
    assert_eq!(args["transport"], "shadow");
    assert_eq!(args["password"], "secret");
}

#[tokio::test]
async fn test_unsupported_command_is_rejected() {
    init_logger();
    let (mut app, mut socks_side) = duplex(1024);

    let server = tokio::spawn(async move {
        server_handshake(&mut socks_side, false, &JsonParameters).await
    });

    app.write_all(&[0x05, 0x01, 0x00]).await.unwrap();
    // BIND is not supported
    app.write_all(&[0x05, 0x02, 0x00, 0x01, 10, 0, 0, 1, 0x00, 0x50])
        .await
        .unwrap();

    let mut written = [0u8; 12];
    app.read_exact(&mut written).await.unwrap();
    assert_eq!(
        written,
        [0x05, 0x00, 0x05, 0x07, 0x00, 0x01, 0, 0, 0, 0, 0, 0]
    );

    let err = server.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Command(0x02)));
    assert!(err.reply_sent());
}
