// tests/transport_memory.rs

use tokio::time::{timeout, Duration};

use orthoplay::protocol::{SetVolume, SpeakerPong};
use orthoplay::{
    // ---
    create_memory_transport,
    AnyAction,
    OrthoError,
    TransportConfig,
};

const WAIT: Duration = Duration::from_millis(100);

#[tokio::test]
async fn memory_subscribe_then_push_delivers() {
    // ---
    // Arrange
    // ---
    let (transport, peer) = create_memory_transport(TransportConfig::new("mstpd"))
        .expect("failed to create memory transport");

    let mut inbox = transport.subscribe().await.expect("subscribe failed");

    // ---
    // Act
    // ---
    peer.push("hello").await.expect("push failed");
    peer.push_response(SpeakerPong { value: 5 })
        .await
        .expect("push failed");

    // ---
    // Assert
    // ---
    let first = timeout(WAIT, inbox.frames.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("inbox closed unexpectedly");
    assert_eq!(first, "hello");

    let second = timeout(WAIT, inbox.frames.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("inbox closed unexpectedly");
    assert_eq!(second, r#"{"response":"speaker_pong","value":5}"#);
}

#[tokio::test]
async fn memory_send_reaches_peer_in_order() {
    // ---
    // Arrange
    // ---
    let (transport, mut peer) =
        create_memory_transport(TransportConfig::new("order")).expect("create failed");

    // ---
    // Act
    // ---
    transport
        .send(r#"{"action":"group_set_volume","vol":1}"#.into())
        .await
        .expect("send failed");
    transport
        .send(r#"{"action":"group_set_volume","vol":2}"#.into())
        .await
        .expect("send failed");

    // ---
    // Assert
    // ---
    for expected in [1, 2] {
        let action = timeout(WAIT, peer.next_action())
            .await
            .expect("timed out waiting for action")
            .expect("decode failed");
        assert_eq!(action, AnyAction::SetVolume(SetVolume::new(expected)));
    }
}

#[tokio::test]
async fn memory_peer_rejects_unknown_action() {
    // ---
    let (transport, mut peer) =
        create_memory_transport(TransportConfig::new("unknown")).expect("create failed");

    transport
        .send(r#"{"action":"speaker_self_destruct"}"#.into())
        .await
        .expect("send failed");

    let res = timeout(WAIT, peer.next_action())
        .await
        .expect("timed out waiting for action");
    assert!(matches!(res, Err(OrthoError::Decoding(_))));
}

#[tokio::test]
async fn memory_close_ends_inbox_and_rejects_sends() {
    // ---
    // Arrange
    // ---
    let (transport, mut peer) =
        create_memory_transport(TransportConfig::new("close")).expect("create failed");
    let mut inbox = transport.subscribe().await.expect("subscribe failed");

    // ---
    // Act
    // ---
    transport.close().await.expect("close failed");

    // ---
    // Assert
    // ---
    let end = timeout(WAIT, inbox.frames.recv())
        .await
        .expect("timed out waiting for end of stream");
    assert!(end.is_none());

    assert!(peer.is_closed());
    assert!(matches!(
        transport.send("{}".into()).await,
        Err(OrthoError::Transport(_))
    ));
    assert!(matches!(peer.push("{}").await, Err(OrthoError::Transport(_))));

    let end = timeout(WAIT, peer.recv_raw())
        .await
        .expect("timed out waiting for end of stream");
    assert!(end.is_none());
}

#[tokio::test]
async fn memory_peer_close_ends_inbox() {
    // ---
    let (transport, peer) =
        create_memory_transport(TransportConfig::new("peer-close")).expect("create failed");
    let mut inbox = transport.subscribe().await.expect("subscribe failed");

    peer.close().await;

    let end = timeout(WAIT, inbox.frames.recv())
        .await
        .expect("timed out waiting for end of stream");
    assert!(end.is_none());
    assert!(transport.subscribe().await.is_err());
}
