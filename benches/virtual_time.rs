use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use bencher::{benchmark_group, benchmark_main, black_box, Bencher};
use rxcore::{prelude::*, testing::*};

fn drain_virtual_queue(b: &mut Bencher) {
  b.iter(|| {
    let scheduler = VirtualTimeScheduler::new();
    let ran = Arc::new(AtomicUsize::new(0));
    for t in (0..1000u64).rev() {
      let c_ran = ran.clone();
      scheduler.schedule_absolute(t, move || {
        c_ran.fetch_add(1, Ordering::Relaxed);
      });
    }
    scheduler.advance_to(1000).unwrap();
    black_box(ran.load(Ordering::Relaxed))
  });
}

fn hot_source_through_operators(b: &mut Bencher) {
  b.iter(|| {
    let scheduler = TestScheduler::new();
    let messages = (0..500).map(|i| on_next(201 + i as u64, i)).collect::<Vec<_>>();
    let xs = scheduler.create_hot_observable::<i32, ()>(messages);
    let observer = scheduler.start(move || xs.map(|v| v + 1).filter(|v| v % 3 == 0).take(100));
    black_box(observer.messages().len())
  });
}

fn subject_broadcast(b: &mut Bencher) {
  let mut subject = Subject::<usize, ()>::new();
  let sum = Arc::new(AtomicUsize::new(0));
  for _ in 0..16 {
    let c_sum = sum.clone();
    subject.clone().subscribe(move |v| {
      c_sum.fetch_add(v, Ordering::Relaxed);
    });
  }
  b.iter(|| {
    for v in 0..100 {
      subject.next(v);
    }
  });
  black_box(sum.load(Ordering::Relaxed));
}

benchmark_group!(benches, drain_virtual_queue, hot_source_through_operators, subject_broadcast);
benchmark_main!(benches);
