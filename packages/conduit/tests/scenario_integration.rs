//! End-to-end scenarios spanning the bus and task subsystems together.
//!
//! Covers:
//! 1. Pub/sub with wildcard and priority-filtered subscriptions.
//! 3. Priority ordering across a single-worker pool.
//! 4. An extract/transform/load task chain.
//! 5. Periodic scheduling via the background scheduler.
//!
//! Timings below are scaled down from the scenarios' real-world seconds to
//! keep the suite fast; the semantics (ordering, counts) are unchanged.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use conduit::{
    BusConfig, Container, InMemoryResultBackend, Message, MessageBus, MessageType, Priority,
    ResultBackend, Scheduler, Task, TaskClient, TaskQueue, WorkerPool, WorkerPoolConfig,
};

#[test]
fn pubsub_wildcard_and_priority_filter() {
    let bus = Arc::new(MessageBus::new(BusConfig::default()));
    bus.start().unwrap();

    let count_a = Arc::new(AtomicUsize::new(0));
    let count_a2 = Arc::clone(&count_a);
    bus.subscribe(
        "events.user.*",
        Arc::new(move |_msg: &Message| {
            count_a2.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        None,
        0,
    )
    .unwrap();

    let count_b = Arc::new(AtomicUsize::new(0));
    let count_b2 = Arc::clone(&count_b);
    bus.subscribe(
        "events.#",
        Arc::new(move |_msg: &Message| {
            count_b2.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        Some(Arc::new(|msg: &Message| msg.priority() == Priority::High)),
        0,
    )
    .unwrap();

    bus.publish_async(Message::new("events.user.created", MessageType::Event, Container::new()))
        .unwrap();
    bus.publish_async(
        Message::new("events.user.created", MessageType::Event, Container::new())
            .with_priority(Priority::High),
    )
    .unwrap();
    bus.publish_async(Message::new("events.user.created", MessageType::Event, Container::new()))
        .unwrap();
    bus.publish_async(
        Message::new("events.order.placed", MessageType::Event, Container::new())
            .with_priority(Priority::High),
    )
    .unwrap();
    bus.publish_async(Message::new("events.order.placed", MessageType::Event, Container::new()))
        .unwrap();

    std::thread::sleep(Duration::from_millis(200));

    assert_eq!(count_a.load(Ordering::SeqCst), 3);
    assert_eq!(count_b.load(Ordering::SeqCst), 2);
    assert!(bus.statistics().processed >= 5);
    bus.stop().unwrap();
}

#[test]
fn single_worker_drains_strictly_by_priority_then_fifo() {
    let backend: Arc<dyn ResultBackend> = Arc::new(InMemoryResultBackend::new());
    let queue = Arc::new(TaskQueue::new(Arc::clone(&backend)));

    // Tasks are enqueued before the pool starts, so the first dequeue can't
    // race ahead of the rest of the batch.
    let order = Arc::new(Mutex::new(Vec::new()));
    let submitted = vec![
        ("low-1", Priority::Low),
        ("low-2", Priority::Low),
        ("normal-1", Priority::Normal),
        ("normal-2", Priority::Normal),
        ("low-3", Priority::Low),
        ("high-1", Priority::High),
    ];
    for (name, priority) in &submitted {
        queue
            .schedule(Task::builder(*name, Container::new()).with_priority(*priority).build())
            .unwrap();
    }

    let pool = WorkerPool::new(Arc::clone(&queue), Arc::clone(&backend), WorkerPoolConfig {
        worker_count: 1,
        ..Default::default()
    });
    for (name, _) in &submitted {
        let order_handle = Arc::clone(&order);
        pool.register_fn(*name, move |task, _ctx| {
            order_handle.lock().unwrap().push(task.name.clone());
            std::thread::sleep(Duration::from_millis(20));
            Ok(Container::new())
        });
    }
    pool.start();

    std::thread::sleep(Duration::from_millis(400));
    pool.shutdown(true);

    let recorded = order.lock().unwrap().clone();
    assert_eq!(recorded[0], "high-1");
    assert_eq!(&recorded[1..3], &["normal-1", "normal-2"]);
    assert_eq!(&recorded[3..6], &["low-1", "low-2", "low-3"]);
}

#[test]
fn etl_chain_produces_a_single_resolved_handle() {
    let backend: Arc<dyn ResultBackend> = Arc::new(InMemoryResultBackend::new());
    let queue = Arc::new(TaskQueue::new(Arc::clone(&backend)));
    let client = TaskClient::new(Arc::clone(&queue), Arc::clone(&backend));

    let pool = WorkerPool::new(Arc::clone(&queue), Arc::clone(&backend), WorkerPoolConfig::default());
    pool.register_fn("extract", |_task, _ctx| Ok(Container::new().with("record_count", 5i64)));
    pool.register_fn("transform", |task, _ctx| {
        let count = task.payload.get_i64("record_count")?;
        Ok(Container::new().with("record_count", count * 2))
    });
    pool.register_fn("load", |task, _ctx| {
        let count = task.payload.get_i64("record_count")?;
        Ok(Container::new().with("loaded_count", count).with("success", true))
    });
    pool.start();

    let chain = vec![
        Task::builder("extract", Container::new()).build(),
        Task::builder("transform", Container::new()).build(),
        Task::builder("load", Container::new()).build(),
    ];
    let handle = client.chain(chain).unwrap();

    let result = handle.get(Duration::from_secs(2)).unwrap();
    assert_eq!(result.get_i64("loaded_count").unwrap(), 10);
    assert!(result.get_bool("success").unwrap());

    pool.shutdown(true);
}

#[test]
fn periodic_scheduling_fires_roughly_on_interval() {
    let backend: Arc<dyn ResultBackend> = Arc::new(InMemoryResultBackend::new());
    let queue = Arc::new(TaskQueue::new(Arc::clone(&backend)));
    let client = Arc::new(TaskClient::new(Arc::clone(&queue), Arc::clone(&backend)));

    let pool = WorkerPool::new(Arc::clone(&queue), Arc::clone(&backend), WorkerPoolConfig::default());
    let hits = Arc::new(AtomicUsize::new(0));
    let hits2 = Arc::clone(&hits);
    pool.register_fn("heartbeat", move |_task, _ctx| {
        hits2.fetch_add(1, Ordering::SeqCst);
        Ok(Container::new())
    });
    pool.start();

    let scheduler = Scheduler::new(Arc::clone(&client));
    let template = Task::builder("heartbeat", Container::new()).build();
    scheduler.add_interval("hb", template, Duration::from_millis(100)).unwrap();

    std::thread::sleep(Duration::from_millis(420));
    scheduler.stop();
    pool.shutdown(true);

    let fired = hits.load(Ordering::SeqCst);
    assert!((3..=5).contains(&fired), "expected 3-5 executions, got {fired}");
}
