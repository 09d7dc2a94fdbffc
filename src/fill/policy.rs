use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides checkbox states and group picks when the resolved value does
/// not name a concrete option. Stateful so randomized picks advance the
/// generator between calls.
pub trait SelectionPolicy {
    fn checkbox_state(&mut self) -> bool;

    /// Pick an index in `0..len`. Callers guarantee `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Always checks boxes and picks the first option. The default when no
/// seed is configured, so repeated fills of the same page are identical.
#[derive(Debug, Default)]
pub struct DeterministicPolicy;

impl SelectionPolicy for DeterministicPolicy {
    fn checkbox_state(&mut self) -> bool {
        true
    }

    fn pick_index(&mut self, _len: usize) -> usize {
        0
    }
}

/// Seeded random picks. The checkbox bias leans toward checked so filled
/// forms look plausibly complete.
#[derive(Debug)]
pub struct RandomizedPolicy {
    rng: StdRng,
    checkbox_probability: f64,
}

impl RandomizedPolicy {
    pub fn new(seed: u64) -> RandomizedPolicy {
        RandomizedPolicy {
            rng: StdRng::seed_from_u64(seed),
            checkbox_probability: 0.7,
        }
    }
}

impl SelectionPolicy for RandomizedPolicy {
    fn checkbox_state(&mut self) -> bool {
        self.rng.gen_bool(self.checkbox_probability)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

pub fn policy_from_seed(seed: Option<u64>) -> Box<dyn SelectionPolicy> {
    match seed {
        Some(seed) => Box::new(RandomizedPolicy::new(seed)),
        None => Box::new(DeterministicPolicy),
    }
}
