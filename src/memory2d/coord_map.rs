//! `CoordMap`: open-addressing hash map for `(i64, i64) → SlotId`, the
//! sparse coordinate index.
//!
//! - Robin Hood probing with backward-shift deletion (no tombstones).
//! - Each bucket carries a 12-bit key fingerprint and its probe distance in
//!   one control word, so misses rarely compare full keys.
//! - Capacity is a power of two; load factor is kept at or below 1/2.

use super::slot::SlotId;

// ── Hash ────────────────────────────────────────────────────────────────

/// Independent odd multipliers per axis so that grid-aligned keys such as
/// `(k, 0)` and `(0, k)` do not land in the same buckets.
const MX: u64 = 0x9e37_79b9_7f4a_7c15;
const MY: u64 = 0xc2b2_ae3d_27d4_eb4f;

#[inline(always)]
pub(crate) fn coord_hash(x: i64, y: i64) -> u64 {
    let h = (x as u64).wrapping_mul(MX) ^ (y as u64).wrapping_mul(MY).rotate_right(29);
    // Fold high bits down: bucket selection reads the low bits.
    h ^ (h >> 32)
}

// ── Bucket layout ───────────────────────────────────────────────────────

const VACANT: u32 = 0;
const LIVE_BIT: u32 = 0x8000_0000;
const DIST_SHIFT: u32 = 12;
const DIST_MASK: u32 = 0x7fff_f000;
const FP_MASK: u32 = 0x0000_0fff;
const MAX_DIST: u32 = DIST_MASK >> DIST_SHIFT;

const MIN_BUCKETS: usize = 16;

#[derive(Clone, Copy)]
struct Bucket {
    x: i64,
    y: i64,
    slot: u32,
    /// bit 31: live, bits 12..30: probe distance, bits 0..11: fingerprint.
    ctrl: u32,
}

impl Bucket {
    const VACANT: Self = Self {
        x: 0,
        y: 0,
        slot: 0,
        ctrl: VACANT,
    };

    #[inline(always)]
    fn is_vacant(self) -> bool {
        self.ctrl == VACANT
    }

    #[inline(always)]
    fn dist(self) -> u32 {
        (self.ctrl & DIST_MASK) >> DIST_SHIFT
    }

    #[inline(always)]
    fn with_dist(mut self, dist: u32) -> Self {
        assert!(
            dist <= MAX_DIST,
            "CoordMap probe distance overflow (distance={dist}, max={MAX_DIST})"
        );
        self.ctrl = (self.ctrl & !DIST_MASK) | (dist << DIST_SHIFT);
        self
    }

    #[inline(always)]
    fn matches(self, tag: u32, x: i64, y: i64) -> bool {
        self.ctrl & (LIVE_BIT | FP_MASK) == tag && self.x == x && self.y == y
    }
}

/// Live bit plus fingerprint taken from the high hash bits. The fingerprint
/// is forced odd so a live control word is never `VACANT`.
#[inline(always)]
fn tag_of(hash: u64) -> u32 {
    LIVE_BIT | ((hash >> 52) as u32 & FP_MASK) | 1
}

// ── Map ─────────────────────────────────────────────────────────────────

pub(crate) struct CoordMap {
    buckets: Vec<Bucket>,
    len: usize,
    /// `buckets.len() - 1`.
    mask: usize,
}

impl CoordMap {
    pub fn with_capacity(cap: usize) -> Self {
        let n = buckets_for(cap);
        Self {
            buckets: vec![Bucket::VACANT; n],
            len: 0,
            mask: n - 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn get(&self, x: i64, y: i64) -> Option<SlotId> {
        let hash = coord_hash(x, y);
        let tag = tag_of(hash);
        let mut pos = hash as usize & self.mask;
        let mut dist = 0u32;
        loop {
            let b = self.buckets[pos];
            // A bucket closer to its home than we are to ours ends the chain.
            if b.is_vacant() || dist > b.dist() {
                return None;
            }
            if b.matches(tag, x, y) {
                return Some(SlotId(b.slot));
            }
            pos = (pos + 1) & self.mask;
            dist += 1;
        }
    }

    /// Bind `(x, y)` to `slot`, returning the previous binding.
    pub fn insert(&mut self, x: i64, y: i64, slot: SlotId) -> Option<SlotId> {
        if (self.len + 1) * 2 > self.buckets.len() {
            self.rehash(self.buckets.len() * 2);
        }
        let hash = coord_hash(x, y);
        let tag = tag_of(hash);
        let mut pos = hash as usize & self.mask;
        let mut carry = Bucket {
            x,
            y,
            slot: slot.0,
            ctrl: tag,
        };
        let mut swapped = false;
        loop {
            let b = &mut self.buckets[pos];
            if b.is_vacant() {
                *b = carry;
                self.len += 1;
                return None;
            }
            // Once we have displaced someone the carried key is not ours, and
            // it cannot already be present further along.
            if !swapped && b.matches(tag, x, y) {
                let old = SlotId(b.slot);
                b.slot = slot.0;
                return Some(old);
            }
            if carry.dist() > b.dist() {
                std::mem::swap(b, &mut carry);
                swapped = true;
            }
            carry = carry.with_dist(carry.dist() + 1);
            pos = (pos + 1) & self.mask;
        }
    }

    /// Drop the binding for `(x, y)`, returning it.
    pub fn remove(&mut self, x: i64, y: i64) -> Option<SlotId> {
        let hash = coord_hash(x, y);
        let tag = tag_of(hash);
        let mut pos = hash as usize & self.mask;
        let mut dist = 0u32;
        loop {
            let b = self.buckets[pos];
            if b.is_vacant() || dist > b.dist() {
                return None;
            }
            if b.matches(tag, x, y) {
                self.shift_back(pos);
                self.len -= 1;
                return Some(SlotId(b.slot));
            }
            pos = (pos + 1) & self.mask;
            dist += 1;
        }
    }

    /// Close the gap at `hole` by pulling displaced successors one step back.
    fn shift_back(&mut self, mut hole: usize) {
        loop {
            let next = (hole + 1) & self.mask;
            let b = self.buckets[next];
            if b.is_vacant() || b.dist() == 0 {
                self.buckets[hole] = Bucket::VACANT;
                return;
            }
            self.buckets[hole] = b.with_dist(b.dist() - 1);
            hole = next;
        }
    }

    fn rehash(&mut self, n: usize) {
        debug_assert!(n.is_power_of_two());
        let old = std::mem::replace(&mut self.buckets, vec![Bucket::VACANT; n]);
        self.mask = n - 1;
        self.len = 0;
        for b in old.into_iter().filter(|b| !b.is_vacant()) {
            self.insert(b.x, b.y, SlotId(b.slot));
        }
    }

    /// All bindings, in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = ((i64, i64), SlotId)> + '_ {
        self.buckets
            .iter()
            .filter(|b| !b.is_vacant())
            .map(|b| ((b.x, b.y), SlotId(b.slot)))
    }
}

#[inline]
fn buckets_for(keys: usize) -> usize {
    keys.saturating_mul(2).next_power_of_two().max(MIN_BUCKETS)
}
