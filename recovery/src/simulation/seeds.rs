//! Per-agent seed derivation: SplitMix64 mixing of (base seed, agent index).
//!
//! Each agent owns its own `SmallRng`, seeded from `derive_seed(base, agent)`,
//! so results do not depend on which worker simulates which agent.

/// SplitMix64 PRNG, single u64 state.
#[derive(Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    #[inline(always)]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }
}

/// Seed for the `stream`-th independent generator under `base`.
#[inline]
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    let mut sm = SplitMix64::new(base ^ stream.wrapping_mul(0xd1b54a32d192ed03));
    sm.next_u64();
    sm.next_u64()
}
