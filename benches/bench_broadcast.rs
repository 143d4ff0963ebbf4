use criterion::{black_box, criterion_group, criterion_main, Criterion};
use event_fanout::{Context, EventDispatcher, Handler, LocalEventDispatcher};

fn swallow(event: &u64, _context: Option<&Context>) {
    black_box(*event);
}

fn bench_broadcast_empty(c: &mut Criterion) {
    let dispatcher: LocalEventDispatcher<u64> = LocalEventDispatcher::new();
    c.bench_function("broadcast_empty", |b| {
        b.iter(|| dispatcher.broadcast(black_box(&1)).unwrap())
    });
}

fn bench_broadcast_16_handlers_single_thread(c: &mut Criterion) {
    let dispatcher: LocalEventDispatcher<u64> = LocalEventDispatcher::with_capacity(16);
    for _ in 0..16 {
        dispatcher.add_handler(Handler::new(swallow));
    }
    c.bench_function("broadcast_16_handlers_single_thread", |b| {
        b.iter(|| dispatcher.broadcast(black_box(&1)).unwrap())
    });
}

fn bench_broadcast_16_handlers_thread_safe(c: &mut Criterion) {
    let dispatcher: EventDispatcher<u64> = EventDispatcher::with_capacity(16);
    for _ in 0..16 {
        dispatcher.add_handler(Handler::new(swallow));
    }
    c.bench_function("broadcast_16_handlers_thread_safe", |b| {
        b.iter(|| dispatcher.broadcast(black_box(&1)).unwrap())
    });
}

fn bench_add_remove_churn(c: &mut Criterion) {
    let dispatcher: LocalEventDispatcher<u64> = LocalEventDispatcher::new();
    c.bench_function("add_remove_churn", |b| {
        b.iter(|| {
            let handler = Handler::new(swallow);
            dispatcher.add_handler(handler.clone());
            dispatcher.remove_handler(&handler).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_broadcast_empty,
    bench_broadcast_16_handlers_single_thread,
    bench_broadcast_16_handlers_thread_safe,
    bench_add_remove_churn
);
criterion_main!(benches);
