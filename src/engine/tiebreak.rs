//! Second-chance grant strategy for the victim scan.
//!
//! The scan consults this strategy every time it inspects a queue head
//! holding access credit. The deterministic variant always honors the
//! credit; the probabilistic variant honors it with a configured
//! probability, reproducing the sampled-promotion behavior some deployments
//! prefer while staying fully reproducible under a fixed seed.

const SEED_MIX: u64 = 0x9e3779b97f4a7c15;

/// Decides whether a queue head with outstanding access credit keeps its
/// second chance or is handed over as the victim.
#[derive(Debug, Clone)]
pub enum Tiebreak {
    /// Credit always earns the second chance. The default.
    Deterministic,
    /// Credit earns the second chance with probability `permille / 1000`,
    /// drawn from a seeded xorshift stream.
    Probabilistic {
        /// Grant probability in thousandths (0..=1000).
        permille: u16,
        /// Construction-time seed, kept for [`reset`](Tiebreak::reset).
        seed: u64,
        /// Current generator state.
        state: u64,
    },
}

impl Tiebreak {
    /// Creates the probabilistic variant with the given grant probability
    /// (in thousandths) and seed.
    pub fn probabilistic(permille: u16, seed: u64) -> Self {
        Tiebreak::Probabilistic {
            permille,
            seed,
            state: mix_seed(seed),
        }
    }

    /// Returns `true` if a head at `level` keeps its second chance.
    ///
    /// Level 0 never does; cold heads are always eligible victims.
    pub(crate) fn grants_second_chance(&mut self, level: u8) -> bool {
        if level == 0 {
            return false;
        }
        match self {
            Tiebreak::Deterministic => true,
            Tiebreak::Probabilistic {
                permille, state, ..
            } => (next_u64(state) % 1000) < u64::from(*permille),
        }
    }

    /// Rewinds the generator to its construction-time state.
    pub(crate) fn reset(&mut self) {
        if let Tiebreak::Probabilistic { seed, state, .. } = self {
            *state = mix_seed(*seed);
        }
    }
}

impl Default for Tiebreak {
    fn default() -> Self {
        Tiebreak::Deterministic
    }
}

fn mix_seed(seed: u64) -> u64 {
    // xorshift needs a nonzero state
    let mixed = seed ^ SEED_MIX;
    if mixed == 0 { SEED_MIX } else { mixed }
}

fn next_u64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *state = x;
    x
}
