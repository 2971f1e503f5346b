//! Property-based tests for the store contract.

use std::collections::HashMap;

use memory_2d::{IndexBackend, Memory2D, Memory2DConfig};
use proptest::prelude::*;

fn store(backend: IndexBackend) -> Memory2D<u32> {
    Memory2D::with_config(Memory2DConfig::default().index(backend))
}

fn any_backend() -> impl Strategy<Value = IndexBackend> {
    prop_oneof![Just(IndexBackend::Dense), Just(IndexBackend::Sparse)]
}

/// Operations against a small coordinate window so that sets, overwrites
/// and unsets collide often.
#[derive(Clone, Debug)]
enum Op {
    Set(i64, i64, u32),
    Unset(i64, i64),
    Reserve(i64, i64),
}

fn coord() -> impl Strategy<Value = i64> {
    -150i64..=150
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (coord(), coord(), any::<u32>()).prop_map(|(x, y, v)| Op::Set(x, y, v)),
        2 => (coord(), coord()).prop_map(|(x, y)| Op::Unset(x, y)),
        1 => (0i64..10, 0i64..10).prop_map(|(x, y)| Op::Reserve(x, y)),
    ]
}

proptest! {
    #[test]
    fn round_trip_any_coordinate(x in any::<i64>(), y in any::<i64>(), v in any::<u32>()) {
        let mut mem = Memory2D::new();
        mem.set(x, y, v).unwrap();
        prop_assert_eq!(mem.get(x, y), Some(&v));
        prop_assert!(mem.extents().contains(x, y));
        prop_assert_eq!(mem.unset(x, y), Some(v));
        prop_assert_eq!(mem.get(x, y), None);
    }

    #[test]
    fn round_trip_survives_dense_cap(
        near in prop::collection::vec((-50i64..=50, -50i64..=50), 1..20),
        x in any::<i64>(),
        y in any::<i64>(),
    ) {
        let config = Memory2DConfig::default()
            .index(IndexBackend::Dense)
            .max_dense_cells(1 << 16);
        let mut mem = Memory2D::with_config(config);
        let mut model = HashMap::new();
        for (i, &(nx, ny)) in near.iter().enumerate() {
            mem.set(nx, ny, i as u32).unwrap();
            model.insert((nx, ny), i as u32);
        }
        mem.set(x, y, u32::MAX).unwrap();
        model.insert((x, y), u32::MAX);
        for (&(mx, my), v) in &model {
            prop_assert_eq!(mem.get(mx, my), Some(v));
        }
        prop_assert_eq!(mem.len(), model.len());
    }

    #[test]
    fn matches_hashmap_model(backend in any_backend(), ops in prop::collection::vec(op(), 1..200)) {
        let mut mem = store(backend);
        let mut model: HashMap<(i64, i64), u32> = HashMap::new();
        let mut last = mem.extents();

        for op in ops {
            match op {
                Op::Set(x, y, v) => {
                    let before = mem.storage().len();
                    let free_top = mem.free_slots().last().copied();
                    let existed = model.insert((x, y), v).is_some();
                    let id = mem.set(x, y, v).unwrap();
                    if existed {
                        prop_assert_eq!(mem.storage().len(), before);
                    } else if let Some(top) = free_top {
                        prop_assert_eq!(id, top);
                    } else {
                        prop_assert_eq!(id.index(), before);
                    }
                }
                Op::Unset(x, y) => {
                    prop_assert_eq!(mem.unset(x, y), model.remove(&(x, y)));
                }
                Op::Reserve(x, y) => mem.reserve(x, y).unwrap(),
            }
            let now = mem.extents();
            prop_assert!(now.x_limit >= last.x_limit && now.y_limit >= last.y_limit);
            last = now;
        }

        prop_assert_eq!(mem.len(), model.len());
        prop_assert_eq!(mem.storage().len(), 1 + mem.len() + mem.free_slots().len());
        for (&(x, y), v) in &model {
            prop_assert_eq!(mem.get(x, y), Some(v));
        }
    }

    #[test]
    fn near_is_exact_bounding_box(
        backend in any_backend(),
        points in prop::collection::hash_set((coord(), coord()), 0..120),
        ox in -200i64..=200,
        oy in -200i64..=200,
        r in 0u64..=160,
    ) {
        let mut mem = store(backend);
        for (i, &(x, y)) in points.iter().enumerate() {
            mem.set(x, y, i as u32).unwrap();
        }
        let mut found: Vec<_> = mem.near_entries(ox, oy, r).into_iter().map(|(c, _)| c).collect();
        found.sort();
        let mut expected: Vec<_> = points
            .iter()
            .copied()
            .filter(|&(x, y)| x.abs_diff(ox) <= r && y.abs_diff(oy) <= r)
            .collect();
        expected.sort();
        prop_assert_eq!(found, expected);
    }
}
