#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::collections::HashSet;
use std::time::Instant;

use memory_2d::{IndexBackend, Memory2D, Memory2DConfig, StoreError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

const SAMPLES_COUNT: usize = 50_000;
const MIN_AXIS: i64 = -1000;
const MAX_AXIS: i64 = 1000;
const DEFAULT_SEED: u64 = 0x5EED_1234_ABCD_EF01;

struct MainArgs {
    samples: usize,
    min_axis: i64,
    max_axis: i64,
    prealloc: (u64, u64),
    index: Option<IndexBackend>,
    seed: u64,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut out = MainArgs {
        samples: SAMPLES_COUNT,
        min_axis: MIN_AXIS,
        max_axis: MAX_AXIS,
        prealloc: (0, 0),
        index: None,
        seed: DEFAULT_SEED,
    };
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                out.samples = next_arg(i, "--samples")
                    .parse()
                    .expect("--samples requires a non-negative integer");
            }
            "--min-axis" => {
                i += 1;
                out.min_axis = next_arg(i, "--min-axis")
                    .parse()
                    .expect("--min-axis requires an integer");
            }
            "--max-axis" => {
                i += 1;
                out.max_axis = next_arg(i, "--max-axis")
                    .parse()
                    .expect("--max-axis requires an integer");
            }
            "--prealloc" => {
                i += 1;
                let raw = next_arg(i, "--prealloc");
                let (x, y) = raw
                    .split_once(',')
                    .unwrap_or_else(|| panic!("--prealloc expects X,Y, got {raw}"));
                out.prealloc = (
                    x.trim().parse().expect("--prealloc X must be a non-negative integer"),
                    y.trim().parse().expect("--prealloc Y must be a non-negative integer"),
                );
            }
            "--index" => {
                i += 1;
                out.index = Some(
                    next_arg(i, "--index")
                        .parse()
                        .unwrap_or_else(|err: String| panic!("{err}")),
                );
            }
            "--seed" => {
                i += 1;
                out.seed = next_arg(i, "--seed")
                    .parse()
                    .expect("--seed requires a non-negative integer");
            }
            other => panic!(
                "unknown argument: {other}\nusage: memory-2d [--samples N] [--min-axis N] [--max-axis N] [--prealloc X,Y] [--index dense|sparse] [--seed N]"
            ),
        }
        i += 1;
    }
    assert!(
        out.min_axis <= out.max_axis,
        "--min-axis must not exceed --max-axis"
    );
    out
}

/// Payload shapes mixed into the benchmark, including an explicit null.
#[derive(Clone, Debug, PartialEq)]
enum Datum {
    Pair { some_int: i64, some_other_int: i64 },
    List([i64; 2]),
    Product(i64),
    Text(String),
    Null,
}

struct Sample {
    x: i64,
    y: i64,
    d: Datum,
}

fn random_datum(rng: &mut StdRng, min: i64, max: i64) -> Datum {
    let shape = rng.gen_range(0..5u8);
    let mut axis = || rng.gen_range(min..=max);
    match shape {
        0 => Datum::Pair {
            some_int: axis(),
            some_other_int: axis(),
        },
        1 => Datum::List([axis(), axis()]),
        2 => Datum::Product(axis().saturating_mul(axis())),
        3 => Datum::Text(format!("{}as_a_string", axis())),
        _ => Datum::Null,
    }
}

/// Random samples with duplicate coordinates filtered out, first one wins.
fn generate_samples(args: &MainArgs) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut seen = HashSet::with_capacity(args.samples);
    let mut samples = Vec::with_capacity(args.samples);
    for _ in 0..args.samples {
        let x = rng.gen_range(args.min_axis..=args.max_axis);
        let y = rng.gen_range(args.min_axis..=args.max_axis);
        let d = random_datum(&mut rng, args.min_axis, args.max_axis);
        if seen.insert((x, y)) {
            samples.push(Sample { x, y, d });
        }
    }
    samples
}

fn timed<R>(label: &str, f: impl FnOnce() -> R) -> R {
    let start = Instant::now();
    let out = f();
    println!("{label}: {:.3} ms", start.elapsed().as_secs_f64() * 1000.0);
    out
}

fn set_all(mem: &mut Memory2D<Datum>, samples: &[Sample]) -> Result<(), StoreError> {
    for s in samples {
        mem.set(s.x, s.y, s.d.clone())?;
    }
    Ok(())
}

fn main() -> Result<(), StoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args();
    let samples = generate_samples(&args);
    println!("Benchmark ready. {} items", samples.len());
    println!(
        "Coordinates will range between {} and {}",
        args.min_axis, args.max_axis
    );
    let (px, py) = args.prealloc;
    if px != 0 || py != 0 {
        println!("Preallocated {px} in x-axis and {py} in y-axis");
    } else {
        println!("No memory was preallocated.");
    }

    let mut config = Memory2DConfig::default().prealloc(px, py);
    if let Some(backend) = args.index {
        config = config.index(backend);
    }
    let mut mem = Memory2D::with_config(config);
    println!("Index backend: {}", mem.backend().as_str());

    timed("Memory2D.set", || set_all(&mut mem, &samples))?;

    timed("Memory2D.get", || {
        for s in &samples {
            assert_eq!(mem.get(s.x, s.y), Some(&s.d), "get mismatch at ({}, {})", s.x, s.y);
        }
    });

    timed("Memory2D.unset", || {
        for s in &samples {
            let removed = mem.unset(s.x, s.y);
            assert_eq!(removed.as_ref(), Some(&s.d), "unset mismatch at ({}, {})", s.x, s.y);
        }
    });

    for s in &samples {
        assert!(mem.get(s.x, s.y).is_none(), "({}, {}) still set after unset", s.x, s.y);
    }

    println!("Will re-set items that were released.");
    println!("Now that memory is preallocated, it should be faster than 1st run.");
    timed("Memory2D.set 2", || set_all(&mut mem, &samples))?;

    println!("Will now test Memory2D.near.");
    println!("Since coords are random, results will vary.");
    let queries: [(i64, i64, u64); 4] = [
        (50, 50, 50),
        (-50, -50, 50),
        (50, 50, 200),
        (0, 0, 1000),
    ];
    for (n, &(ox, oy, r)) in queries.iter().enumerate() {
        let found = timed(&format!("near {}", n + 1), || mem.near(ox, oy, r).len());
        println!("#{} near({ox}, {oy}, {r}) found: {found} items", n + 1);
    }

    let span = args.min_axis.unsigned_abs().max(args.max_axis.unsigned_abs());
    let found = timed("near MAX_AXIS", || mem.near(0, 0, span).len());
    println!("#5 near(0, 0, {span}) found: {found} items");
    assert_eq!(found, samples.len(), "near over the full range missed samples");

    Ok(())
}
