use crate::*;
use relay_services::ShutdownReason;

#[tokio::test]
async fn test_end_of_input_shuts_the_peer_down() -> Result<()> {
    let hub = spawn_hub(PUSH_TIMEOUT).await?;
    let alice = spawn_peer().await?;

    let mut chat = Chat::start(&hub, &alice)?;
    let shutdown = chat.shutdown.clone();
    chat.type_line("alice").await?;
    wait_until("alice to register", || hub.registry.get("alice").is_some()).await?;
    assert_eq!(alice.identity.username(), Some("alice"));

    let task = chat.close().await?;
    tokio::time::timeout(WAIT, task).await??;
    assert_eq!(shutdown.reason(), Some(ShutdownReason::InputClosed));
    Ok(())
}

#[tokio::test]
async fn test_registration_failure_is_fatal() -> Result<()> {
    let hub = spawn_hub(PUSH_TIMEOUT).await?;
    let alice = spawn_peer().await?;
    let mut chat = Chat::start(&hub, &alice)?;
    let shutdown = chat.shutdown.clone();

    // The hub can no longer reach alice's endpoint.
    alice.kill().await;
    chat.type_line("alice").await?;

    let reason = tokio::time::timeout(WAIT, shutdown.triggered()).await?;
    assert!(matches!(reason, ShutdownReason::Fatal(_)), "{}", reason);
    tokio::time::timeout(WAIT, chat.task).await??;
    assert!(hub.registry.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_signal_cancels_a_waiting_chat_loop() -> Result<()> {
    let hub = spawn_hub(PUSH_TIMEOUT).await?;
    let alice = spawn_peer().await?;
    let mut chat = Chat::start(&hub, &alice)?;
    chat.type_line("alice").await?;
    wait_until("alice to register", || hub.registry.get("alice").is_some()).await?;

    // Blocked on input; nothing more is typed.
    assert!(chat.shutdown.trigger(ShutdownReason::Signal("SIGTERM")));
    assert!(!chat.shutdown.trigger(ShutdownReason::InputClosed));

    tokio::time::timeout(WAIT, chat.task).await??;
    assert_eq!(chat.shutdown.reason(), Some(ShutdownReason::Signal("SIGTERM")));
    Ok(())
}
