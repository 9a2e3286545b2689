//! Randomness for assignee selection.
//!
//! The preferred source is a PRNG seeded from network time, so that runs on
//! different machines do not draw the same sequence. When the time service
//! cannot be reached the run degrades to the operating system's CSPRNG.

use crate::clock::TimeSource;
use crate::retry::{RetryPolicy, Sleeper};
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

pub enum Entropy {
    Seeded { seed: u64, rng: StdRng },
    Secure(OsRng),
}

impl Entropy {
    pub fn seeded(seed: u64) -> Self {
        Entropy::Seeded {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn secure() -> Self {
        Entropy::Secure(OsRng)
    }

    /// Seed from the time service, retrying per `policy`. Never fails: if the
    /// service stays unreachable the secure source is returned instead.
    pub fn from_time_service(
        clock: &dyn TimeSource,
        policy: &RetryPolicy,
        sleeper: &dyn Sleeper,
    ) -> Self {
        match policy.run("time service", sleeper, |_| clock.now_seconds()) {
            Ok(secs) => {
                let seed = seed_from_seconds(secs);
                tracing::debug!(seed, "Seeded assignment RNG from network time");
                Entropy::seeded(seed)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Time service unreachable, using the OS random source (degraded mode)"
                );
                Entropy::secure()
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Entropy::Secure(_))
    }

    pub fn describe(&self) -> String {
        match self {
            Entropy::Seeded { seed, .. } => format!("seeded ({})", seed),
            Entropy::Secure(_) => "os".to_string(),
        }
    }
}

/// Microsecond resolution keeps two runs a second apart on different seeds.
fn seed_from_seconds(secs: f64) -> u64 {
    (secs.max(0.0) * 1_000_000.0) as u64
}

impl RngCore for Entropy {
    fn next_u32(&mut self) -> u32 {
        match self {
            Entropy::Seeded { rng, .. } => rng.next_u32(),
            Entropy::Secure(rng) => rng.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            Entropy::Seeded { rng, .. } => rng.next_u64(),
            Entropy::Secure(rng) => rng.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            Entropy::Seeded { rng, .. } => rng.fill_bytes(dest),
            Entropy::Secure(rng) => rng.fill_bytes(dest),
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        match self {
            Entropy::Seeded { rng, .. } => rng.try_fill_bytes(dest),
            Entropy::Secure(rng) => rng.try_fill_bytes(dest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BugwatchError, Result};
    use rand::Rng;
    use std::cell::Cell;
    use std::time::Duration;

    struct FixedClock(f64);

    impl TimeSource for FixedClock {
        fn now_seconds(&self) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct DeadClock {
        calls: Cell<u32>,
    }

    impl TimeSource for DeadClock {
        fn now_seconds(&self) -> Result<f64> {
            self.calls.set(self.calls.get() + 1);
            Err(BugwatchError::Time("timed out".into()))
        }
    }

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _: Duration) {}
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Entropy::seeded(1234);
        let mut b = Entropy::seeded(1234);
        let xs: Vec<u32> = (0..16).map(|_| a.gen_range(0..100)).collect();
        let ys: Vec<u32> = (0..16).map(|_| b.gen_range(0..100)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_time_service_seeds_rng() {
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        let entropy = Entropy::from_time_service(&FixedClock(1_700_000_000.25), &policy, &NoSleep);
        assert!(!entropy.is_degraded());
        match entropy {
            Entropy::Seeded { seed, .. } => assert_eq!(seed, 1_700_000_000_250_000),
            Entropy::Secure(_) => panic!("expected a seeded source"),
        }
    }

    #[test]
    fn test_unreachable_time_service_degrades_to_secure() {
        let clock = DeadClock { calls: Cell::new(0) };
        let policy = RetryPolicy::new(3, Duration::from_secs(5));
        let mut entropy = Entropy::from_time_service(&clock, &policy, &NoSleep);
        assert!(entropy.is_degraded());
        assert_eq!(clock.calls.get(), 3);
        // Still usable through the same interface.
        let n: usize = entropy.gen_range(0..10);
        assert!(n < 10);
    }
}
