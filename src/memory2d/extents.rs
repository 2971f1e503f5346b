//! Reserved extents and the growth-on-miss policy.

/// Growth amount used when a write lands outside the reserved extents and
/// no policy is configured.
pub const MINIMUM_ALLOC: u64 = 100;

/// Largest useful limit: `|i64::MIN| + 1`, which covers every `i64`.
pub const MAX_LIMIT: u64 = (1u64 << 63) + 1;

/// Symmetric per-axis bounds. `(x, y)` is covered iff
/// `|x| < x_limit && |y| < y_limit`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extents {
    pub x_limit: u64,
    pub y_limit: u64,
}

impl Extents {
    pub const ZERO: Extents = Extents {
        x_limit: 0,
        y_limit: 0,
    };

    #[inline]
    pub fn new(x_limit: u64, y_limit: u64) -> Self {
        Self {
            x_limit: x_limit.min(MAX_LIMIT),
            y_limit: y_limit.min(MAX_LIMIT),
        }
    }

    #[inline(always)]
    pub fn contains(self, x: i64, y: i64) -> bool {
        x.unsigned_abs() < self.x_limit && y.unsigned_abs() < self.y_limit
    }

    /// Extents after growing each axis by the given amount. Saturates at
    /// `MAX_LIMIT`, so the result never shrinks.
    #[inline]
    pub fn grown(self, extra_x: u64, extra_y: u64) -> Self {
        Self::new(
            self.x_limit.saturating_add(extra_x),
            self.y_limit.saturating_add(extra_y),
        )
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.x_limit == 0 || self.y_limit == 0
    }

    /// Number of covered coordinates, `(2·x_limit - 1) × (2·y_limit - 1)`.
    #[inline]
    pub fn cells(self) -> u128 {
        if self.is_empty() {
            return 0;
        }
        (2 * self.x_limit as u128 - 1).saturating_mul(2 * self.y_limit as u128 - 1)
    }

    /// Covered range on the x axis, clipped to `[lo, hi]`. `None` if empty.
    #[inline]
    pub(crate) fn clip_x(self, lo: i64, hi: i64) -> Option<(i64, i64)> {
        clip_axis(self.x_limit, lo, hi)
    }

    #[inline]
    pub(crate) fn clip_y(self, lo: i64, hi: i64) -> Option<(i64, i64)> {
        clip_axis(self.y_limit, lo, hi)
    }
}

fn clip_axis(limit: u64, lo: i64, hi: i64) -> Option<(i64, i64)> {
    if limit == 0 {
        return None;
    }
    // Covered axis range is [-(limit - 1), limit - 1]; i128 keeps i64::MIN.
    let reach = (limit - 1) as i128;
    let start = (lo as i128).max(-reach);
    let end = (hi as i128).min(reach);
    (start <= end).then_some((start as i64, end as i64))
}

/// How much to grow both axes when a write misses the reserved extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Grow by the deficit, but at least by this many cells.
    Quantum(u64),
    /// Grow by the deficit, at least `min`, and at least the current largest
    /// limit (so the covered side length roughly doubles).
    Doubling { min: u64 },
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy::Quantum(MINIMUM_ALLOC)
    }
}

impl GrowthPolicy {
    /// Amount to grow both axes by so that `(x, y)` becomes covered.
    /// Returns 0 when it already is.
    pub fn grow_amount(self, extents: Extents, x: i64, y: i64) -> u64 {
        let deficit_x = (x.unsigned_abs() + 1).saturating_sub(extents.x_limit);
        let deficit_y = (y.unsigned_abs() + 1).saturating_sub(extents.y_limit);
        let deficit = deficit_x.max(deficit_y);
        if deficit == 0 {
            return 0;
        }
        match self {
            GrowthPolicy::Quantum(quantum) => deficit.max(quantum),
            GrowthPolicy::Doubling { min } => deficit
                .max(min)
                .max(extents.x_limit.max(extents.y_limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_symmetric_and_exclusive() {
        let e = Extents::new(3, 2);
        assert!(e.contains(2, 1));
        assert!(e.contains(-2, -1));
        assert!(!e.contains(3, 0));
        assert!(!e.contains(-3, 0));
        assert!(!e.contains(0, 2));
        assert!(!Extents::ZERO.contains(0, 0));
    }

    #[test]
    fn cells_counts_covered_coordinates() {
        assert_eq!(Extents::ZERO.cells(), 0);
        assert_eq!(Extents::new(1, 1).cells(), 1);
        assert_eq!(Extents::new(3, 2).cells(), 15);
        assert_eq!(Extents::new(7, 0).cells(), 0);
    }

    #[test]
    fn grown_saturates_and_covers_extremes() {
        let e = Extents::ZERO.grown(u64::MAX, u64::MAX);
        assert_eq!(e.x_limit, MAX_LIMIT);
        assert!(e.contains(i64::MIN, i64::MAX));
        assert_eq!(e.grown(5, 5), e);
    }

    #[test]
    fn quantum_floors_small_deficits() {
        let policy = GrowthPolicy::default();
        assert_eq!(policy.grow_amount(Extents::ZERO, 0, 0), MINIMUM_ALLOC);
        assert_eq!(policy.grow_amount(Extents::new(10, 10), 5, 5), 0);
        assert_eq!(policy.grow_amount(Extents::ZERO, -1000, 3), 1001);
    }

    #[test]
    fn one_growth_step_always_covers_target() {
        for policy in [
            GrowthPolicy::Quantum(0),
            GrowthPolicy::Quantum(100),
            GrowthPolicy::Doubling { min: 16 },
        ] {
            for &(x, y) in &[(0, 0), (99, -100), (-1000, 1000), (i64::MIN, i64::MAX)] {
                let start = Extents::new(100, 100);
                let amount = policy.grow_amount(start, x, y);
                assert!(start.grown(amount, amount).contains(x, y), "{policy:?} ({x},{y})");
            }
        }
    }

    #[test]
    fn doubling_grows_by_current_limit() {
        let policy = GrowthPolicy::Doubling { min: 8 };
        assert_eq!(policy.grow_amount(Extents::new(64, 32), 64, 0), 64);
        assert_eq!(policy.grow_amount(Extents::ZERO, 1, 1), 8);
    }

    #[test]
    fn clip_respects_extents() {
        let e = Extents::new(5, 1);
        assert_eq!(e.clip_x(-10, 2), Some((-4, 2)));
        assert_eq!(e.clip_y(-3, 3), Some((0, 0)));
        assert_eq!(e.clip_x(5, 9), None);
        assert_eq!(Extents::ZERO.clip_x(0, 0), None);
        let full = Extents::new(MAX_LIMIT, MAX_LIMIT);
        assert_eq!(full.clip_x(i64::MIN, i64::MAX), Some((i64::MIN, i64::MAX)));
    }
}
