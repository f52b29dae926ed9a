//! Seedable slow-call fault injection
//!
//! Exists to exercise the policy stack: on roughly one call in N the guarded
//! fetch stalls long enough to blow its timeout budget. Probability, delay
//! and the RNG seed all come from configuration, so tests can force each
//! branch instead of relying on chance.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::warn;

use crate::config::FaultSettings;

pub struct SlowCallInjector {
    enabled: bool,
    one_in: u32,
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl SlowCallInjector {
    pub fn new(settings: &FaultSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            enabled: settings.enabled,
            one_in: settings.one_in.max(1),
            delay: Duration::from_millis(settings.delay_ms),
            rng: Mutex::new(rng),
        }
    }

    /// An injector that never fires
    pub fn disabled() -> Self {
        Self::new(&FaultSettings {
            enabled: false,
            one_in: 3,
            delay_ms: 0,
            seed: None,
        })
    }

    /// Stall the caller for the configured delay on one call in N.
    /// The stall itself never errors; the surrounding timeout budget is what
    /// turns it into a failure.
    pub async fn maybe_stall(&self) {
        if !self.enabled {
            return;
        }

        let draw = self.rng.lock().gen_range(1..=self.one_in);
        if draw == 1 {
            warn!("Injected slow call: stalling for {:?}", self.delay);
            tokio::time::sleep(self.delay).await;
        }
    }
}
