// ── Resubscription backoff ──
//
// Stores never reconnect a dead subscription themselves. Consumers that
// opt into automatic resubscription use this schedule.

use std::time::Duration;

/// Exponential backoff configuration for resubscribing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first resubscription attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum attempts before giving up. `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

impl ReconnectConfig {
    /// Whether `attempt` (zero-based) is still within the retry budget.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_retries.is_none_or(|max| attempt < max)
    }
}

/// Delay before resubscription attempt `attempt` (zero-based).
///
/// Doubles from `initial_delay` until it reaches `max_delay`, then scales
/// by a factor in [0.8, 1.25] that depends only on `attempt`.
pub fn backoff_delay(attempt: u32, config: &ReconnectConfig) -> Duration {
    let doubled = 2_u32
        .checked_pow(attempt)
        .and_then(|factor| config.initial_delay.checked_mul(factor))
        .unwrap_or(config.max_delay);
    doubled.min(config.max_delay).mul_f64(spread(attempt))
}

/// Per-attempt scale applied to the capped delay.
fn spread(attempt: u32) -> f64 {
    match attempt % 4 {
        0 => 1.0,
        1 => 1.25,
        2 => 0.8,
        _ => 1.1,
    }
}
