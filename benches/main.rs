use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

use gcpin::{no_check, EscapeSlot, Pinner, PtrGuard};

fn bench_ptr_guard(c: &mut Criterion) {
    let value = Box::new([0u64; 8]);
    let mut cell: *mut u64 = std::ptr::null_mut();
    let slot = unsafe { EscapeSlot::from_ptr(&mut cell) };

    c.bench_function("ptr_guard_pin_release", |b| {
        b.iter(|| {
            let mut guard = PtrGuard::pin(&*value);
            guard.release();
        })
    });
    c.bench_function("ptr_guard_pin_poke_release", |b| {
        b.iter(|| {
            let mut guard = PtrGuard::pin(&*value);
            guard.poke(slot);
            guard.release();
        })
    });
}

fn bench_pinner(c: &mut Criterion) {
    let objects: Vec<Box<u64>> = (0..256).map(Box::new).collect();
    let pinner = Pinner::new();
    c.bench_function("pinner_256_pins_one_unpin", |b| {
        b.iter(|| {
            for object in objects.iter() {
                pinner.pin(&**object);
            }
            pinner.unpin();
        })
    });
}

fn bench_no_check(c: &mut Criterion) {
    c.bench_function("no_check", |b| b.iter(|| no_check(|| black_box(1))));
}

pub fn bench_main(c: &mut Criterion) {
    bench_ptr_guard(c);
    bench_pinner(c);
    bench_no_check(c);
}

criterion_group!(benches, bench_main);
criterion_main!(benches);
