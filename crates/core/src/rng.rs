//! Deterministic randomness for variant partitioning.
//!
//! The same seed always produces the same sequence on every platform, so
//! partitions rebuilt after a restart match the ones the user already
//! completed. Not suitable for anything security related.

/// Mulberry32 generator: 32-bit state, one wrapping add and two
/// multiply-xorshift rounds per output.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let s = self.state;
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Index in `[0, bound)` scaled from [`Mulberry32::next_f64`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn next_index(&mut self, bound: usize) -> usize {
        let scaled = (self.next_f64() * bound as f64) as usize;
        scaled.min(bound.saturating_sub(1))
    }

    /// Fisher–Yates, walking from the back of the slice.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

/// 32-bit polynomial rolling hash (`h = h * 31 + c`) over UTF-16 code units,
/// returned as its absolute value.
#[must_use]
pub fn string_to_seed(s: &str) -> u32 {
    let hash = s.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    hash.unsigned_abs()
}

/// Shuffle a copy of `items` with a generator seeded by `seed`.
#[must_use]
pub fn seeded_shuffle<T: Clone>(items: &[T], seed: u32) -> Vec<T> {
    let mut shuffled = items.to_vec();
    Mulberry32::new(seed).shuffle(&mut shuffled);
    shuffled
}
