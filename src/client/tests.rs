use super::pubsub_client::Client;
use tokio::sync::mpsc;

#[test]
fn test_client_new() {
    let (tx, _) = mpsc::channel::<String>(4);
    let client = Client::new(tx);
    assert!(!client.id.is_empty());
}

#[test]
fn test_client_ids_are_unique() {
    let (tx, _) = mpsc::channel::<String>(4);
    let a = Client::new(tx.clone());
    let b = Client::new(tx);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_send_text_after_close() {
    let (tx, mut rx) = mpsc::channel::<String>(4);
    let client = Client::new(tx);

    assert!(client.send_text("hi"));
    assert_eq!(rx.try_recv().unwrap(), "hi");

    drop(rx);
    assert!(!client.send_text("gone"));
}

#[test]
fn test_send_text_when_queue_full() {
    let (tx, mut rx) = mpsc::channel::<String>(1);
    let client = Client::new(tx);

    assert!(client.send_text("first"));
    assert!(!client.send_text("second"));

    assert_eq!(rx.try_recv().unwrap(), "first");
    assert!(client.send_text("third"));
}
