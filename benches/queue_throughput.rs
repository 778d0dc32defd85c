//! Dispatch queue benchmarks.
//!
//! Measures heap push/pop cost and contended producer/consumer throughput.

use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use dispatch_core::scheduler::{BoundedPriorityQueue, WorkItem};

fn create_item(id: u64) -> WorkItem {
    // Spread priorities so sifts do real work.
    WorkItem::new(id, "/bench", (id.wrapping_mul(2_654_435_761) % 1_000) as i64)
}

fn bench_enqueue_dequeue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue_dequeue");

    for (name, prefill) in [("empty", 0u64), ("half_full", 512), ("near_full", 1000)] {
        let queue = BoundedPriorityQueue::new(1024).unwrap();
        for i in 0..prefill {
            queue.enqueue(create_item(i)).unwrap();
        }

        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::new("pair", name), |b| {
            let mut id = prefill;
            b.iter(|| {
                queue.enqueue(black_box(create_item(id))).unwrap();
                id += 1;
                black_box(queue.try_dequeue());
            })
        });
    }

    group.finish();
}

fn bench_fill_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_and_drain");

    for count in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_function(BenchmarkId::new("items", count), |b| {
            b.iter(|| {
                let queue = BoundedPriorityQueue::new(count as usize).unwrap();
                for i in 0..count {
                    queue.enqueue(create_item(i)).unwrap();
                }
                while let Some(item) = queue.try_dequeue() {
                    black_box(item);
                }
            })
        });
    }

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    const ITEMS_PER_PRODUCER: u64 = 2_000;
    let mut group = c.benchmark_group("contended");
    group.sample_size(20);

    for threads in [1usize, 2, 4] {
        group.throughput(Throughput::Elements(ITEMS_PER_PRODUCER * threads as u64));
        group.bench_function(BenchmarkId::new("producers_consumers", threads), |b| {
            b.iter(|| {
                let queue: Arc<BoundedPriorityQueue> =
                    Arc::new(BoundedPriorityQueue::new(256).unwrap());

                let consumers: Vec<_> = (0..threads)
                    .map(|_| {
                        let q = Arc::clone(&queue);
                        thread::spawn(move || {
                            let mut n = 0u64;
                            while q.dequeue_blocking().is_some() {
                                n += 1;
                            }
                            n
                        })
                    })
                    .collect();

                let producers: Vec<_> = (0..threads)
                    .map(|p| {
                        let q = Arc::clone(&queue);
                        thread::spawn(move || {
                            for i in 0..ITEMS_PER_PRODUCER {
                                let mut pending = create_item(p as u64 * ITEMS_PER_PRODUCER + i);
                                while let Err(e) = q.enqueue(pending) {
                                    pending = e.into_inner();
                                    thread::yield_now();
                                }
                            }
                        })
                    })
                    .collect();

                for p in producers {
                    p.join().unwrap();
                }
                queue.close();
                let total: u64 = consumers.into_iter().map(|c| c.join().unwrap()).sum();
                black_box(total);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_enqueue_dequeue, bench_fill_and_drain, bench_contended);
criterion_main!(benches);
