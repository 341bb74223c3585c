//! Seedable pseudo-random number generator (xorshift64).
//!
//! Scoring draws inside score brackets and scenario selection both pull from a
//! session-owned [`Rng`], so a fixed seed replays a whole round exactly.

#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    /// Seeded from browser / OS entropy when the `rng` feature is on, otherwise
    /// (or if entropy is unavailable) from the clock.
    pub fn from_entropy() -> Self {
        Self::new(entropy_seed())
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a random number in [0, upper_bound).
    pub fn next_int(&mut self, upper_bound: u32) -> u32 {
        if upper_bound == 0 {
            return 0;
        }
        (self.next_u64() % upper_bound as u64) as u32
    }

    /// Uniform integer in `[lo, hi]` (bounds may come in either order).
    pub fn range_inclusive(&mut self, lo: u8, hi: u8) -> u8 {
        let (lo, hi) = (lo.min(hi), lo.max(hi));
        lo + self.next_int(hi as u32 - lo as u32 + 1) as u8
    }

    /// Random index into a collection of `len` items (0 when empty).
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

pub fn entropy_seed() -> u64 {
    #[cfg(feature = "rng")]
    {
        let mut buf = [0u8; 8];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => return u64::from_le_bytes(buf),
            Err(e) => log::warn!("entropy unavailable ({}), seeding from clock", e),
        }
    }
    clock_seed()
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    let now = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    (now * 1000.0) as u64 ^ 0x9E37_79B9_7F4A_7C15
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        ^ 0x9E37_79B9_7F4A_7C15
}
