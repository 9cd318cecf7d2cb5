//! Wire-level session behavior against a loopback query server.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use wardend::link::{ControlLink, Event, QuerySession};

/// Minimal scripted query server: greeting banner, canned replies per
/// command, and an unsolicited event pushed after the first clientinfo.
async fn spawn_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        write
            .write_all(b"TS3\nWelcome to the ServerQuery interface.\n")
            .await
            .unwrap();
        let mut lines = BufReader::new(read).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let reply: &[u8] = if line.starts_with("login")
                || line.starts_with("use")
                || line.starts_with("clientupdate")
                || line.starts_with("servernotifyregister")
            {
                b"error id=0 msg=ok\n"
            } else if line.starts_with("whoami") {
                b"client_id=42 client_channel_id=1\nerror id=0 msg=ok\n"
            } else if line.starts_with("clientinfo") {
                b"client_nickname=Slacker cid=4 client_idle_time=651000 \
                  client_type=0 client_servergroups=6,7\n\
                  error id=0 msg=ok\n\
                  notifyclientmoved clid=9 ctid=3\n"
            } else if line.starts_with("channelinfo") {
                b"channel_name=Main\\sLobby pid=0\nerror id=0 msg=ok\n"
            } else if line.starts_with("channeldelete") {
                b"error id=768 msg=invalid\\schannelID\n"
            } else {
                b"error id=256 msg=command\\snot\\sfound\n"
            };
            write.write_all(reply).await.unwrap();
        }
    });
    addr
}

#[tokio::test]
async fn handshake_queries_and_events_flow() {
    let addr = spawn_server().await;
    let (session, mut events) = QuerySession::connect("127.0.0.1", addr.port())
        .await
        .unwrap();

    session.login("u", "p").await.unwrap();
    session.select_server(9987, "Warden").await.unwrap();
    session.register_events().await.unwrap();
    assert_eq!(session.whoami().await.unwrap(), (42, 1));

    let client = session.client_info(7).await.unwrap();
    assert_eq!(client.nickname, "Slacker");
    assert_eq!(client.channel, 4);
    assert_eq!(client.idle, Duration::from_secs(651));
    assert_eq!(client.groups, vec![6, 7]);

    // The event frame interleaved with the reply ends up on the event
    // stream, not in the reply.
    assert_eq!(
        events.recv().await,
        Some(Event::ClientMoved { id: 9, target: 3 })
    );

    // Escaped values decode.
    let channel = session.channel_info(4).await.unwrap();
    assert_eq!(channel.name, "Main Lobby");
}

#[tokio::test]
async fn rejection_is_distinguished_from_transport_failure() {
    let addr = spawn_server().await;
    let (session, _events) = QuerySession::connect("127.0.0.1", addr.port())
        .await
        .unwrap();

    let error = session.delete_channel(99).await.unwrap_err();
    assert!(error.is_rejected());
}

#[tokio::test]
async fn pipelined_requests_resolve_in_order() {
    let addr = spawn_server().await;
    let (session, _events) = QuerySession::connect("127.0.0.1", addr.port())
        .await
        .unwrap();

    let (client, channel) = tokio::join!(session.client_info(7), session.channel_info(4));
    assert_eq!(client.unwrap().nickname, "Slacker");
    assert_eq!(channel.unwrap().name, "Main Lobby");
}

#[tokio::test]
async fn lost_connection_fails_pending_requests() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        // Greet, then hang up without answering anything.
        let (_read, mut write) = stream.into_split();
        write.write_all(b"TS3\n").await.unwrap();
        drop(write);
    });

    let (session, mut events) = QuerySession::connect("127.0.0.1", addr.port())
        .await
        .unwrap();
    let error = session.client_info(7).await.unwrap_err();
    assert!(!error.is_rejected());
    // The event stream ends with the connection.
    assert_eq!(events.recv().await, None);
}
