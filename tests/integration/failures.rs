use crate::*;
use std::time::Instant;

#[tokio::test]
async fn test_dead_peer_does_not_block_others() -> Result<()> {
    let hub = spawn_hub(PUSH_TIMEOUT).await?;
    let bob = spawn_peer().await?;
    let carol = spawn_peer().await?;
    register(&hub, "bob", &bob).await?;
    register(&hub, "carol", &carol).await?;

    bob.kill().await;

    let ack = hub.client()?.broadcast_message("anyone?", "alice").await?;
    assert!(ack.request_received, "per-recipient failures must not reach the sender");
    assert_eq!(carol.sink.delivered(), vec![ChatMessage::new("anyone?", "alice")]);

    // The stale record stays until bob registers again.
    assert!(hub.registry.get("bob").is_some());
    Ok(())
}

/// Accepts connections and never answers on them.
async fn stalled_endpoint() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    Ok(addr)
}

#[tokio::test]
async fn test_unresponsive_peer_is_bounded_by_push_timeout() -> Result<()> {
    let push_timeout = Duration::from_millis(300);
    let hub = spawn_hub(push_timeout).await?;
    let carol = spawn_peer().await?;
    register(&hub, "carol", &carol).await?;

    let stalled = stalled_endpoint().await?;
    let resp = hub.client()?.register_client("mallory", &stalled).await?;
    assert!(resp.registered);

    let started = Instant::now();
    let ack = tokio::time::timeout(
        WAIT,
        hub.client()?.broadcast_message("still there?", "alice"),
    )
    .await
    .context("broadcast hung past the push timeout")??;
    let elapsed = started.elapsed();

    assert!(ack.request_received);
    assert!(elapsed >= push_timeout, "returned before the stalled push timed out");
    assert!(elapsed < push_timeout * 5, "took {:?}", elapsed);
    assert_eq!(
        carol.sink.delivered(),
        vec![ChatMessage::new("still there?", "alice")]
    );
    Ok(())
}
