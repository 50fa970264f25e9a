//! Seeded randomness for status-effect chance rolls.
//!
//! Rolls are a pure function of a seed derived from the session, so
//! replaying an intent against the same state yields the same outcome.

/// Deterministic roll source: equal seeds give equal values.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// 1 to 100 inclusive.
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Returns true with `chance` percent probability.
    fn chance(&self, seed: u64, chance: u32) -> bool {
        chance > 0 && self.roll_d100(seed) <= chance
    }
}

/// Stateless PCG-XSH-RR: one LCG step on the seed, then a xorshift and a
/// seed-dependent rotate down to 32 bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn permute(seed: u64) -> u32 {
        let state = seed
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        xorshifted.rotate_right((state >> 59) as u32)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::permute(seed)
    }
}

/// Mixes the session seed, the action nonce, the acting unit and a
/// per-roll `context` (one per target) into a roll seed.
pub fn compute_seed(session_seed: u64, nonce: u64, actor: &str, context: u32) -> u64 {
    // Constants are SplitMix64 and FxHash multipliers.
    let mut hash = session_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);

    // FNV-1a over the actor id.
    let actor_hash = actor
        .bytes()
        .fold(0xcbf29ce484222325u64, |acc, b| (acc ^ b as u64).wrapping_mul(0x100000001b3));
    hash ^= actor_hash.wrapping_mul(0x517cc1b727220a95);

    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step.
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
