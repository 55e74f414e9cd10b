//! Cross-thread stress tests for the SPSC ring and MPSC queue.
//!
//! These drive many fill/drain cycles through small queues so the cursor
//! wrap and the head-exchange/link-stitch paths are exercised under real
//! contention, and check the delivery contracts exactly: no loss, no
//! duplication, FIFO per role.
//!
//! # Running with tracing
//!
//! ```bash
//! RUST_LOG=spindle=trace cargo test --features tracing -- --nocapture
//! ```

use std::hint;
use std::sync::Once;
use std::thread;

use spindle::sync::{mpsc, spsc, PushError};
use spindle::types::{OrderRecord, SeqNum, Side};

static INIT_TRACING: Once = Once::new();

fn init_test_tracing() {
    INIT_TRACING.call_once(|| {
        spindle::init_tracing();
    });
}

#[test]
fn spsc_delivers_every_value_in_order_across_wraps() {
    init_test_tracing();

    // Capacity far below the message count forces many fill/drain cycles.
    const COUNT: u64 = 1_000_000;
    let (producer, consumer) = spsc::channel::<u64, 64>();

    let producer_thread = thread::spawn(move || {
        for i in 0..COUNT {
            let mut item = i;
            loop {
                match producer.try_push(item) {
                    Ok(()) => break,
                    Err(PushError::Full(returned)) => item = returned,
                    Err(other) => panic!("unexpected push error: {other:?}"),
                }
                hint::spin_loop();
            }
        }
    });

    let consumer_thread = thread::spawn(move || {
        let mut expected = 0u64;
        while expected < COUNT {
            match consumer.try_pop() {
                Some(value) => {
                    assert_eq!(value, expected, "lost or duplicated value");
                    expected += 1;
                }
                None => hint::spin_loop(),
            }
        }
        // Nothing extra may trail the stream.
        assert_eq!(consumer.try_pop(), None);
    });

    producer_thread.join().unwrap();
    consumer_thread.join().unwrap();
}

#[test]
fn spsc_bulk_producer_against_live_consumer() {
    init_test_tracing();

    const COUNT: u64 = 500_000;
    const BATCH: usize = 37; // Deliberately not a divisor of the capacity.
    let (producer, consumer) = spsc::channel::<u64, 256>();

    let producer_thread = thread::spawn(move || {
        let mut next = 0u64;
        let mut batch = [0u64; BATCH];
        while next < COUNT {
            let want = ((COUNT - next) as usize).min(BATCH);
            for (offset, slot) in batch[..want].iter_mut().enumerate() {
                *slot = next + offset as u64;
            }
            let mut wrote = 0;
            while wrote < want {
                let n = producer.try_push_bulk(&batch[wrote..want]);
                if n == 0 {
                    hint::spin_loop();
                }
                wrote += n;
            }
            next += want as u64;
        }
    });

    let mut expected = 0u64;
    while expected < COUNT {
        match consumer.try_pop() {
            Some(value) => {
                assert_eq!(value, expected);
                expected += 1;
            }
            None => hint::spin_loop(),
        }
    }

    producer_thread.join().unwrap();
}

#[test]
fn mpsc_producers_race_while_consumer_drains() {
    init_test_tracing();

    const PRODUCERS: u64 = 8;
    const PER_PRODUCER: u64 = 20_000;
    const POOL: usize = (PRODUCERS * PER_PRODUCER + 1) as usize;

    let (producer, consumer) = mpsc::channel::<(u64, u64), POOL>();

    let mut handles = vec![];
    for id in 0..PRODUCERS {
        let producer = producer.clone();
        handles.push(thread::spawn(move || {
            for seq in 0..PER_PRODUCER {
                producer.try_push((id, seq)).unwrap();
            }
        }));
    }

    let mut last_seq = vec![None::<u64>; PRODUCERS as usize];
    let mut total = 0u64;
    while total < PRODUCERS * PER_PRODUCER {
        match consumer.try_pop() {
            Some((id, seq)) => {
                let last = &mut last_seq[id as usize];
                assert!(
                    last.map_or(seq == 0, |prev| seq == prev + 1),
                    "producer {id}: saw {seq} after {last:?}"
                );
                *last = Some(seq);
                total += 1;
            }
            None => hint::spin_loop(),
        }
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(consumer.try_pop(), None);
}

#[test]
fn order_records_flow_producer_to_consumer() {
    init_test_tracing();

    // The pipeline as bring-up wires it: a feed context stamps order
    // records and hands them to the book context over the ring.
    const COUNT: u64 = 10_000;
    let (producer, consumer) = spsc::channel::<OrderRecord, 1024>();

    let feed = thread::spawn(move || {
        let mut seq = SeqNum::ZERO;
        for i in 0..COUNT {
            let record = OrderRecord {
                seq,
                price_ticks: 100_000 + (i % 32),
                quantity: 100,
                side: if i % 2 == 0 { Side::Bid } else { Side::Ask },
            };
            let mut pending = record;
            loop {
                match producer.try_push(pending) {
                    Ok(()) => break,
                    Err(err) => pending = err.into_inner(),
                }
                hint::spin_loop();
            }
            seq = seq.next();
        }
    });

    let mut expected = SeqNum::ZERO;
    let mut received = 0u64;
    while received < COUNT {
        match consumer.try_pop() {
            Some(record) => {
                assert_eq!(record.seq, expected);
                expected = expected.next();
                received += 1;
            }
            None => hint::spin_loop(),
        }
    }

    feed.join().unwrap();
}
