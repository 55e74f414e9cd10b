//! Queue throughput benchmark.
//!
//! Usage:
//!     cargo run --release --bin queue_bench
//!
//! Environment variables:
//!     PRODUCER_CPU=0  Pin the producer to CPU 0 (default: 0)
//!     CONSUMER_CPU=2  Pin the consumer to CPU 2 (default: 2)

use std::env;
use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use spindle::sync::{mpsc, spsc};

const SPSC_CAPACITY: usize = 1 << 16;
const ITERATIONS: u64 = 1 << 24;

const MPSC_PRODUCERS: u64 = 3;
const MPSC_PER_PRODUCER: u64 = 1 << 20;
const MPSC_POOL: usize = (MPSC_PRODUCERS * MPSC_PER_PRODUCER + 1) as usize;

fn get_cpu_affinity() -> (Option<usize>, Option<usize>) {
    let producer_cpu = env::var("PRODUCER_CPU")
        .ok()
        .and_then(|s| s.parse().ok())
        .or(Some(0));
    let consumer_cpu = env::var("CONSUMER_CPU")
        .ok()
        .and_then(|s| s.parse().ok())
        .or(Some(2));
    (producer_cpu, consumer_cpu)
}

fn pin_to_cpu(cpu: Option<usize>) {
    if let Some(id) = cpu {
        core_affinity::set_for_current(core_affinity::CoreId { id });
    }
}

fn bench_spsc_throughput(producer_cpu: Option<usize>, consumer_cpu: Option<usize>) {
    let (producer, consumer) = spsc::channel::<u64, SPSC_CAPACITY>();

    let ready = Arc::new(AtomicBool::new(false));
    let ready_clone = ready.clone();

    let consumer_thread = std::thread::spawn(move || {
        pin_to_cpu(consumer_cpu);
        ready_clone.store(true, Ordering::Release);

        for expected in 0..ITERATIONS {
            loop {
                if let Some(value) = consumer.try_pop() {
                    if value != expected {
                        panic!("data corruption: expected {expected}, got {value}");
                    }
                    break;
                }
                hint::spin_loop();
            }
        }
    });

    while !ready.load(Ordering::Acquire) {
        hint::spin_loop();
    }
    pin_to_cpu(producer_cpu);

    let start = Instant::now();
    for i in 0..ITERATIONS {
        let mut item = i;
        loop {
            match producer.try_push(item) {
                Ok(()) => break,
                Err(err) => item = err.into_inner(),
            }
            hint::spin_loop();
        }
    }
    consumer_thread.join().unwrap();
    let elapsed = start.elapsed();

    let ops_per_ms = u128::from(ITERATIONS) * 1_000_000 / elapsed.as_nanos();
    println!("spsc: {ops_per_ms} ops/ms");
}

fn bench_spsc_bulk_throughput(producer_cpu: Option<usize>, consumer_cpu: Option<usize>) {
    const BATCH: usize = 256;

    let (producer, consumer) = spsc::channel::<u64, SPSC_CAPACITY>();

    let consumer_thread = std::thread::spawn(move || {
        pin_to_cpu(consumer_cpu);
        let mut received = 0u64;
        while received < ITERATIONS {
            if consumer.try_pop().is_some() {
                received += 1;
            } else {
                hint::spin_loop();
            }
        }
    });

    pin_to_cpu(producer_cpu);
    let batch: Vec<u64> = (0..BATCH as u64).collect();

    let start = Instant::now();
    let mut pushed = 0u64;
    while pushed < ITERATIONS {
        let want = (ITERATIONS - pushed).min(BATCH as u64) as usize;
        let wrote = producer.try_push_bulk(&batch[..want]);
        if wrote == 0 {
            hint::spin_loop();
        }
        pushed += wrote as u64;
    }
    consumer_thread.join().unwrap();
    let elapsed = start.elapsed();

    let ops_per_ms = u128::from(ITERATIONS) * 1_000_000 / elapsed.as_nanos();
    println!("spsc bulk({BATCH}): {ops_per_ms} ops/ms");
}

fn bench_mpsc_throughput(consumer_cpu: Option<usize>) {
    let (producer, consumer) = mpsc::channel::<u64, MPSC_POOL>();

    let start = Instant::now();

    let mut handles = vec![];
    for id in 0..MPSC_PRODUCERS {
        let producer = producer.clone();
        handles.push(std::thread::spawn(move || {
            for seq in 0..MPSC_PER_PRODUCER {
                producer.try_push(id << 32 | seq).unwrap();
            }
        }));
    }

    pin_to_cpu(consumer_cpu);
    let total = MPSC_PRODUCERS * MPSC_PER_PRODUCER;
    let mut received = 0u64;
    while received < total {
        if consumer.try_pop().is_some() {
            received += 1;
        } else {
            hint::spin_loop();
        }
    }

    for handle in handles {
        handle.join().unwrap();
    }
    let elapsed = start.elapsed();

    let ops_per_ms = u128::from(total) * 1_000_000 / elapsed.as_nanos();
    println!("mpsc ({MPSC_PRODUCERS} producers): {ops_per_ms} ops/ms");
}

fn main() {
    spindle::init_tracing();
    let (producer_cpu, consumer_cpu) = get_cpu_affinity();

    bench_spsc_throughput(producer_cpu, consumer_cpu);
    bench_spsc_bulk_throughput(producer_cpu, consumer_cpu);
    bench_mpsc_throughput(consumer_cpu);
}
