use criterion::{criterion_group, criterion_main, Criterion};
use rand::thread_rng;

use chameleon_auth::{Authenticator, ChameleonHash, Param, Randomness, SecretKey};

fn chameleon_benchmarks(c: &mut Criterion) {
    let mut g = c.benchmark_group("chameleon");
    let ch = ChameleonHash::with_trapdoor(
        SecretKey::random(thread_rng()),
        Param::random(thread_rng()),
        0,
    );
    let r1 = Randomness::random(thread_rng());
    let message = b"this is a short message";

    g.bench_function("ch", |b| b.iter(|| ch.ch(message, &r1, 0)));

    g.bench_function("collision", |b| {
        b.iter(|| ch.collision(message, &r1, 0, b"another message", 1))
    });

    g.bench_function("extract", |b| {
        let r2 = ch
            .collision(message, &r1, 0, b"another message", 1)
            .expect("short messages");
        let public = ch.to_public();
        b.iter(|| public.extract(message, &r1, 0, b"another message", &r2, 1))
    });

    g.finish();
}

fn authenticator_benchmarks(c: &mut Criterion) {
    let mut g = c.benchmark_group("authenticator");
    let acca = Authenticator::new(
        SecretKey::random(thread_rng()),
        Param::random(thread_rng()),
        0,
    )
    .expect("valid key");
    let ct = *b"context!";
    let message = b"this is a short message";

    g.bench_function("authenticate", |b| {
        b.iter(|| acca.authenticate(&ct, message, 0))
    });

    g.bench_function("verify", |b| {
        let t = acca.authenticate(&ct, message, 0).expect("short message");
        b.iter(|| acca.verify(&t, &ct, message, 0))
    });

    g.finish();
}

criterion_group!(benches, chameleon_benchmarks, authenticator_benchmarks);
criterion_main!(benches);
