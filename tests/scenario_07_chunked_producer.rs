//! A WSGI-adapter-shaped smoke test. A full adapter is out of scope here,
//! but the pattern it needs from this crate -- a TD callable streaming
//! chunks out-of-band while the ED side keeps servicing other tasks -- is a
//! testable property of `call_blocking_from_event` by itself.

use discipline_bridge::{call_blocking_from_event, BridgeError};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn chunks_arrive_in_order_without_blocking_other_tasks() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Option<Vec<u8>>>();
    let progress = Arc::new(AtomicU32::new(0));
    let progress_task = progress.clone();

    let producer = call_blocking_from_event(
        move || {
            std::thread::sleep(Duration::from_millis(50));
            tx.send(Some(b"chunk-one".to_vec())).ok();
            std::thread::sleep(Duration::from_millis(50));
            tx.send(Some(b"chunk-two".to_vec())).ok();
            tx.send(None).ok();
            Ok::<_, BridgeError>(())
        },
        false,
        None,
    );

    let other_task = async move {
        // Proves the event loop isn't stalled by the blocking producer.
        for _ in 0..20 {
            progress_task.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };

    let collector = async {
        let mut chunks = Vec::new();
        while let Some(Some(chunk)) = rx.recv().await {
            chunks.push(chunk);
        }
        chunks
    };

    let (producer_res, _, chunks) = tokio::join!(producer, other_task, collector);

    producer_res.expect("producer should finish without error");
    assert_eq!(chunks, vec![b"chunk-one".to_vec(), b"chunk-two".to_vec()]);
    assert!(
        progress.load(Ordering::SeqCst) > 0,
        "the unrelated task should have made progress while the producer was blocking its own thread"
    );
}
