// MIT License - Copyright (c) 2026 Peter Wright
//
// End-to-end tests against a fake KSHELL device on a local TCP listener.

use std::time::Duration;

use netio_kshell::crypto::login_token;
use netio_kshell::{ErrorKind, NetioClient, NetioError, Session, SessionConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const NONCE: &str = "5F3A09C1";

/// Serve one connection the way a NETIO 230A does. Returns every request
/// line received once the client hangs up.
async fn fake_device(listener: TcpListener) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write
        .write_all(format!("100 HELLO {NONCE} - KSHELL V1.2\r\n").as_bytes())
        .await
        .unwrap();

    let names = ["Living Room", "server", "NAS box", "router"];
    let mut power = [true, false, false, true];
    let mut alias = "netio230a".to_string();
    let mut logged_in = false;
    let mut received = Vec::new();

    while let Ok(Some(line)) = lines.next_line().await {
        received.push(line.clone());
        let words: Vec<&str> = line.split(' ').collect();

        let reply = match words.as_slice() {
            ["login", "admin", "admin"] => {
                logged_in = true;
                "250 OK".to_string()
            }
            ["clogin", "admin", token] if *token == login_token("admin", "admin", NONCE) => {
                logged_in = true;
                "250 OK".to_string()
            }
            ["login" | "clogin", ..] => "503 INVALID LOGIN".to_string(),
            _ if !logged_in => "505 FORBIDDEN".to_string(),
            ["version"] => "250 2.34".to_string(),
            ["alias"] => format!("250 {alias}"),
            ["alias", name] => {
                alias = name.to_string();
                "250 OK".to_string()
            }
            ["port", "list"] => {
                let list: String = power.iter().map(|on| if *on { '1' } else { '0' }).collect();
                format!("250 {list}")
            }
            ["port", "setup", n] => match n.parse::<usize>() {
                Ok(n @ 1..=4) => format!("250 \"{}\" manual 2 0", names[n - 1]),
                _ => "501 INVALID PARAMETR".to_string(),
            },
            ["port", n, state @ ("0" | "1")] => match n.parse::<usize>() {
                Ok(n @ 1..=4) => {
                    power[n - 1] = *state == "1";
                    "250 OK".to_string()
                }
                _ => "500 INVALID VALUE".to_string(),
            },
            _ => "502 UNKNOWN COMMAND".to_string(),
        };
        write
            .write_all(format!("{reply}\r\n").as_bytes())
            .await
            .unwrap();
    }
    received
}

async fn start() -> (SessionConfig, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = SessionConfig::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .timeout(Duration::from_secs(2))
        .build();
    (config, tokio::spawn(fake_device(listener)))
}

#[tokio::test]
async fn test_cleartext_session() {
    let (config, device) = start().await;

    let mut session = Session::connect(&config).await.unwrap();
    assert_eq!(session.greeting().unwrap().nonce, NONCE);
    assert_eq!(session.send_command("version", true).await.unwrap(), "2.34");

    let reply = session.send_command("bogus", false).await.unwrap();
    assert_eq!(reply, "502 UNKNOWN COMMAND");

    session.disconnect().await.unwrap();
    assert!(!session.is_connected());

    let received = device.await.unwrap();
    assert_eq!(received, ["login admin admin", "version", "bogus"]);
}

#[tokio::test]
async fn test_hashed_login_and_outlets() {
    let (mut config, device) = start().await;
    config.login_mode = netio_kshell::LoginMode::Hashed;

    let mut netio = NetioClient::connect(&config).await.unwrap();

    let outlets = netio.outlets().await.unwrap();
    assert_eq!(outlets[0].name, "Living Room");
    assert!(outlets[0].power_on);
    assert!(!outlets[1].power_on);

    netio.set_power(2, true).await.unwrap();
    assert!(netio.outlet(1).await.unwrap().power_on);

    netio.set_device_alias("rack-a").await.unwrap();
    assert_eq!(netio.device_alias().await.unwrap(), "rack-a");

    netio.disconnect().await.unwrap();
    let received = device.await.unwrap();
    assert!(received[0].starts_with("clogin admin "));
    assert!(!received[0].contains("admin admin"));
}

#[tokio::test]
async fn test_wrong_password() {
    let (mut config, device) = start().await;
    config.password = "nope".to_string();

    let err = Session::connect(&config).await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Handshake);
    match err {
        NetioError::LoginRejected { response } => assert_eq!(response, "503 INVALID LOGIN"),
        other => panic!("unexpected error: {other}"),
    }

    // The handshake failure closed the connection.
    let received = device.await.unwrap();
    assert_eq!(received, ["login admin nope"]);
}

#[tokio::test]
async fn test_device_rejects_command() {
    let (config, device) = start().await;
    let mut netio = NetioClient::connect(&config).await.unwrap();

    let err = netio.set_power(9, true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Command);
    assert_eq!(err.status_code().map(|s| s.code()), Some(500));

    // The session stays usable after a rejected command.
    assert_eq!(netio.firmware_version().await.unwrap(), "2.34");

    netio.disconnect().await.unwrap();
    device.await.unwrap();
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = SessionConfig::builder().host("127.0.0.1").port(port).build();
    let err = NetioClient::connect(&config).await.err().unwrap();
    assert!(err.is_retryable());
    assert_eq!(err.kind(), ErrorKind::Connect);
}
