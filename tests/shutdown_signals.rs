#![cfg(unix)]
#![allow(clippy::unwrap_used)]
//! A chat that is stopped from outside still tells the server it is leaving.
//!
//! Runs the `polychat` binary against a scripted server, waits until it is paired,
//! then signals the process the way a closing terminal or `kill` would.

use std::process::Stdio;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::process::Command;
use tokio_tungstenite::tungstenite::Message;

const TEST_TIMEOUT: Duration = Duration::from_secs(15);

fn write_config(home: &TempDir, server: &str) {
    let dir = home.path().join("polychat");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        format!(
            "[polychat]\n\
             server = \"{server}\"\n\
             language = \"en\"\n\
             \n\
             [translation]\n\
             api = \"http://127.0.0.1:9\"\n\
             \n\
             [auth]\n\
             user_id = \"u1\"\n\
             first_name = \"Sam\"\n\
             token = \"tok\"\n"
        ),
    )
    .unwrap();
}

/// Pairs the client with a partner, then records every action until the close frame.
async fn serve_one_chat(listener: TcpListener) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

    let mut received = Vec::new();
    while let Some(Ok(message)) = ws.next().await {
        match message {
            Message::Text(body) => {
                let value: Value = serde_json::from_str(body.as_str()).unwrap();
                let action = value["action"].as_str().unwrap().to_string();
                if action == "connect" {
                    let initiate = json!({
                        "action": "initiate",
                        "user": {"name": "Alex", "id": "u2", "language": "en"}
                    });
                    ws.send(Message::Text(initiate.to_string().into()))
                        .await
                        .unwrap();
                }
                received.push(action);
            }
            Message::Close(frame) => {
                received.push(format!("close:{}", frame.unwrap().reason.as_str()));
                break;
            }
            _ => {}
        }
    }
    received
}

async fn signal_while_paired(signal: &str) -> Vec<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_url = format!("ws://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(serve_one_chat(listener));

    let home = TempDir::new().unwrap();
    write_config(&home, &server_url);

    #[allow(deprecated)]
    let binary = assert_cmd::cargo::cargo_bin("polychat");
    let mut child = Command::new(binary)
        .args(["chat", "--to", "en"])
        .env("XDG_CONFIG_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    // Keep stdin open so the session only ends through the signal.
    let _stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap()).lines();
    tokio::time::timeout(TEST_TIMEOUT, async {
        while let Some(line) = stdout.next_line().await.unwrap() {
            if line.contains("Connected with Alex") {
                break;
            }
        }
    })
    .await
    .unwrap();

    let pid = child.id().unwrap().to_string();
    let status = Command::new("kill")
        .args([signal, &pid])
        .status()
        .await
        .unwrap();
    assert!(status.success());

    let exit = tokio::time::timeout(TEST_TIMEOUT, child.wait())
        .await
        .unwrap()
        .unwrap();
    assert!(exit.success());

    tokio::time::timeout(TEST_TIMEOUT, server)
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_terminate_sends_close_chat() {
    let received = signal_while_paired("-TERM").await;
    assert_eq!(received, vec!["connect", "close_chat", "close:close_chat"]);
}

#[tokio::test]
async fn test_hangup_sends_close_chat() {
    let received = signal_while_paired("-HUP").await;
    assert_eq!(received, vec!["connect", "close_chat", "close:close_chat"]);
}
