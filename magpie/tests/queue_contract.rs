//! Cross-thread contract tests for the bounded queue: FIFO delivery,
//! capacity bound, the closing protocol and the blocking/wakeup semantics.

use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use magpie::BoundedQueue;

const UNBLOCK_TIMEOUT: Duration = Duration::from_secs(5);
const STILL_BLOCKED: Duration = Duration::from_millis(100);

#[test]
fn fifo_order_across_threads() {
    let queue = Arc::new(BoundedQueue::new(4).unwrap());

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..50 {
                queue.push(i).unwrap();
            }
            queue.close();
        })
    };

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut popped = Vec::new();
            while let Some(item) = queue.pop() {
                popped.push(item);
            }
            popped
        })
    };

    producer.join().unwrap();
    let popped = consumer.join().unwrap();
    assert_eq!(popped, (0..50).collect::<Vec<_>>());
}

#[test]
fn capacity_bound_holds_under_contention() {
    let queue = Arc::new(BoundedQueue::new(4).unwrap());
    let collected = Arc::new(Mutex::new(Vec::new()));

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..25 {
                    queue.push(p * 1000 + i).unwrap();
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let collected = Arc::clone(&collected);
            thread::spawn(move || {
                while let Some(item) = queue.pop() {
                    collected.lock().unwrap().push(item);
                    // Slow consumers keep the queue near its bound.
                    thread::sleep(Duration::from_micros(200));
                }
            })
        })
        .collect();

    // Sample the buffered count while producers are pushing hard.
    while producers.iter().any(|p| !p.is_finished()) {
        assert!(queue.len() <= queue.capacity());
        thread::sleep(Duration::from_micros(100));
    }
    for producer in producers {
        producer.join().unwrap();
    }

    queue.close();
    for consumer in consumers {
        consumer.join().unwrap();
    }

    let collected = collected.lock().unwrap();
    assert_eq!(collected.len(), 100);
    let unique: HashSet<_> = collected.iter().copied().collect();
    assert_eq!(unique.len(), 100);
}

#[test]
fn no_item_accepted_before_close_is_lost() {
    let queue = BoundedQueue::new(8).unwrap();
    for i in 0..6 {
        queue.push(i).unwrap();
    }
    assert_eq!(queue.pop(), Some(0));
    assert_eq!(queue.pop(), Some(1));

    queue.close();

    // Exactly the remaining four items, in order, then the terminal signal.
    for i in 2..6 {
        assert_eq!(queue.pop(), Some(i));
    }
    assert_eq!(queue.pop(), None);
}

#[test]
fn close_terminates_every_blocked_popper_in_bounded_time() {
    let queue = Arc::new(BoundedQueue::<u32>::new(4).unwrap());
    let (done_tx, done_rx) = mpsc::channel();

    let poppers: Vec<_> = (0..3)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let done_tx = done_tx.clone();
            thread::spawn(move || {
                done_tx.send(queue.pop()).unwrap();
            })
        })
        .collect();

    assert!(done_rx.recv_timeout(STILL_BLOCKED).is_err());
    queue.close();

    for _ in 0..3 {
        assert_eq!(done_rx.recv_timeout(UNBLOCK_TIMEOUT).unwrap(), None);
    }
    for popper in poppers {
        popper.join().unwrap();
    }
    // Late arrivals see the same terminal state immediately.
    assert_eq!(queue.pop(), None);
}

/// The three-thread scenario on a capacity-1 queue: a second producer
/// blocks behind a buffered item, a consumer frees the slot, the blocked
/// push lands, and a final consumer blocks on the empty-but-open queue
/// until the close.
#[test]
fn capacity_one_handoff_scenario() {
    let queue = Arc::new(BoundedQueue::new(1).unwrap());
    queue.push("x").unwrap();

    let (pushed_tx, pushed_rx) = mpsc::channel();
    let blocked_producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            pushed_tx.send(queue.push("y").is_ok()).unwrap();
        })
    };
    assert!(pushed_rx.recv_timeout(STILL_BLOCKED).is_err());

    let (popped_tx, popped_rx) = mpsc::channel();
    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            popped_tx.send(queue.pop()).unwrap();
        })
    };
    assert_eq!(popped_rx.recv_timeout(UNBLOCK_TIMEOUT).unwrap(), Some("x"));
    assert!(pushed_rx.recv_timeout(UNBLOCK_TIMEOUT).unwrap());
    assert_eq!(queue.pop(), Some("y"));

    let (final_tx, final_rx) = mpsc::channel();
    let final_consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            final_tx.send(queue.pop()).unwrap();
        })
    };
    assert!(final_rx.recv_timeout(STILL_BLOCKED).is_err());
    queue.close();
    assert_eq!(final_rx.recv_timeout(UNBLOCK_TIMEOUT).unwrap(), None);

    blocked_producer.join().unwrap();
    consumer.join().unwrap();
    final_consumer.join().unwrap();
}
