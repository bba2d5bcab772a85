//! Linear-congruential draw sequence behind the synthetic dataset.
//!
//! The constants are part of the dataset contract: changing them changes
//! every generated record.

const MULTIPLIER: u64 = 9_301;
const INCREMENT: u64 = 49_297;
const MODULUS: u64 = 233_280;

/// Deterministic draw sequence in `[0, 1)`.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self {
            state: u64::from(seed),
        }
    }

    /// Advance and return the next draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Uniform draw in `[low, high)`.
    pub fn between(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }

    /// Pick one element. Consumes one draw even for a single-element slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let draw = self.next_f64();
        if items.is_empty() {
            return None;
        }
        let index = ((draw * items.len() as f64) as usize).min(items.len() - 1);
        items.get(index)
    }
}
