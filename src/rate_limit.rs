use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Window used for the public contact/franchise forms.
pub const FORM_WINDOW: Duration = Duration::from_secs(10 * 60);
pub const FORM_MAX_ATTEMPTS: u64 = 5;

/// In-memory sliding-window limiter keyed by `<bucket>:<ip_hash>`
/// (buckets: `login`, `contact`, `franchise`).
#[derive(Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    fn map(&self) -> MutexGuard<'_, HashMap<String, Vec<Instant>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an attempt; true while the key is still under `max_attempts` in `window`.
    pub fn check_and_record(&self, key: &str, max_attempts: u64, window: Duration) -> bool {
        let mut map = self.map();
        let now = Instant::now();
        let attempts = map.entry(key.to_string()).or_default();
        attempts.retain(|t| now.duration_since(*t) < window);

        if (attempts.len() as u64) < max_attempts {
            attempts.push(now);
            true
        } else {
            false
        }
    }

    /// Forget a key, e.g. after a successful login.
    pub fn reset(&self, key: &str) {
        self.map().remove(key);
    }

    /// Drop keys whose attempts are all older than `max_age`.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let mut map = self.map();
        let now = Instant::now();
        let before = map.len();
        map.retain(|_, attempts| {
            attempts.retain(|t| now.duration_since(*t) < max_age);
            !attempts.is_empty()
        });
        before - map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_attempts() {
        let rl = RateLimiter::default();
        let w = Duration::from_secs(60);
        for _ in 0..3 {
            assert!(rl.check_and_record("login:abc", 3, w));
        }
        assert!(!rl.check_and_record("login:abc", 3, w));
        // other keys are independent
        assert!(rl.check_and_record("contact:abc", 3, w));
    }

    #[test]
    fn reset_and_cleanup() {
        let rl = RateLimiter::default();
        let w = Duration::from_secs(60);
        rl.check_and_record("login:x", 1, w);
        assert!(!rl.check_and_record("login:x", 1, w));
        rl.reset("login:x");
        assert!(rl.check_and_record("login:x", 1, w));
        assert_eq!(rl.cleanup(Duration::from_secs(0)), 1);
        assert!(rl.check_and_record("login:x", 1, w));
    }
}
