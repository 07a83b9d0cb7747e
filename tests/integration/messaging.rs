use crate::*;

async fn join(hub: &Hub, peer: &Peer, username: &str) -> Result<Chat> {
    let mut chat = Chat::start(hub, peer)?;
    chat.type_line(username).await?;
    wait_until(&format!("{} to register", username), || {
        hub.registry.get(username).is_some()
    })
    .await?;
    Ok(chat)
}

fn prompt_count(peer: &Peer, username: &str) -> usize {
    let prompt = format!("{}: ", username);
    peer.sink.prompts().iter().filter(|p| **p == prompt).count()
}

/// alice says hello, bob hears it, alice hears nothing back.
#[tokio::test]
async fn test_alice_and_bob_chat_end_to_end() -> Result<()> {
    let hub = spawn_hub(PUSH_TIMEOUT).await?;
    let alice = spawn_peer().await?;
    let bob = spawn_peer().await?;

    let mut alice_chat = join(&hub, &alice, "alice").await?;
    let _bob_chat = join(&hub, &bob, "bob").await?;

    alice_chat.type_line("hello").await?;
    wait_until("bob to receive hello", || !bob.sink.delivered().is_empty()).await?;

    // The hub answers a broadcast only after fan-out, and alice re-prompts
    // only after that answer.
    wait_until("alice to prompt again", || prompt_count(&alice, "alice") == 2).await?;

    assert_eq!(bob.sink.delivered(), vec![ChatMessage::new("hello", "alice")]);
    assert!(alice.sink.delivered().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_broadcast_reaches_every_other_peer() -> Result<()> {
    let hub = spawn_hub(PUSH_TIMEOUT).await?;
    let names = ["alice", "bob", "carol", "dave"];
    let mut peers = Vec::new();
    for name in names {
        let peer = spawn_peer().await?;
        register(&hub, name, &peer).await?;
        peers.push(peer);
    }

    let ack = hub.client()?.broadcast_message("hi all", "carol").await?;
    assert!(ack.request_received);

    for (name, peer) in names.iter().zip(&peers) {
        let delivered = peer.sink.delivered();
        if *name == "carol" {
            assert!(delivered.is_empty(), "sender got its own message");
        } else {
            assert_eq!(delivered, vec![ChatMessage::new("hi all", "carol")], "{}", name);
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_blank_lines_are_not_broadcast() -> Result<()> {
    let hub = spawn_hub(PUSH_TIMEOUT).await?;
    let alice = spawn_peer().await?;
    let bob = spawn_peer().await?;
    register(&hub, "bob", &bob).await?;

    let mut chat = join(&hub, &alice, "alice").await?;
    chat.type_line("").await?;
    chat.type_line("   ").await?;
    chat.type_line("after the gap").await?;

    wait_until("bob to receive", || !bob.sink.delivered().is_empty()).await?;
    assert_eq!(
        bob.sink.delivered(),
        vec![ChatMessage::new("after the gap", "alice")]
    );
    Ok(())
}
