//! `near` cost as the radius grows, for both index backends.
//! Run with: cargo run --release --bin bench_near

use std::time::Instant;

use memory_2d::{IndexBackend, Memory2D, Memory2DConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLES: usize = 50_000;
const AXIS: i64 = 1000;
const ITERS: usize = 20;

fn populate(backend: IndexBackend) -> Memory2D<u32> {
    let config = Memory2DConfig::default().index(backend);
    let mut mem = Memory2D::with_config(config);
    let mut rng = StdRng::seed_from_u64(0x5EED_1234_ABCD_EF01);
    for i in 0..SAMPLES as u32 {
        let x = rng.gen_range(-AXIS..=AXIS);
        let y = rng.gen_range(-AXIS..=AXIS);
        mem.set(x, y, i).expect("slot ids available");
    }
    mem
}

fn main() {
    println!(
        "{:<8} {:>8} {:>10} {:>12}",
        "Index", "Radius", "Found", "Avg(ms)"
    );
    println!("{}", "-".repeat(42));

    for backend in [IndexBackend::Dense, IndexBackend::Sparse] {
        let mem = populate(backend);
        for &radius in &[0u64, 10, 50, 200, 1000, 5000] {
            let start = Instant::now();
            let mut found = 0;
            for _ in 0..ITERS {
                found = std::hint::black_box(mem.near(0, 0, radius)).len();
            }
            let avg_ms = start.elapsed().as_secs_f64() * 1000.0 / ITERS as f64;
            println!(
                "{:<8} {:>8} {:>10} {:>12.4}",
                backend.as_str(),
                radius,
                found,
                avg_ms
            );
        }
    }
}
