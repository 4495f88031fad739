use std::{error::Error, thread, time::Duration};

/// How long to keep re-listing while waiting for a real-time file to be published.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// `None` polls until the file shows up.
    pub max_attempts: Option<u32>,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            max_attempts: Some(60),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    /// Re-list with no delay and no limit. This blocks forever if nothing is ever
    /// published for the hour.
    pub fn spin_forever() -> Self {
        PollPolicy {
            max_attempts: None,
            initial_delay: Duration::from_secs(0),
            max_delay: Duration::from_secs(0),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none()
    }

    /// Delay before the `attempt`th retry (1 based), doubling up to `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Call `list` until it returns a non-empty listing or the attempts run out, in which
    /// case an empty listing is returned. Listing errors are logged and count as empty.
    pub fn poll<F>(&self, what: &str, mut list: F) -> Vec<String>
    where
        F: FnMut() -> Result<Vec<String>, Box<dyn Error>>,
    {
        if self.is_unbounded() {
            log::warn!("Polling for {} without a limit", what);
        }

        let mut attempt: u32 = 0;
        loop {
            match list() {
                Ok(keys) if !keys.is_empty() => return keys,
                Ok(_) => {}
                Err(err) => log::error!("Error listing {}: {}", what, err),
            }

            attempt = attempt.saturating_add(1);
            if let Some(max) = self.max_attempts {
                if attempt >= max {
                    log::warn!("Gave up waiting for {} after {} attempts", what, attempt);
                    return vec![];
                }
            }

            let delay = self.delay(attempt);
            if !delay.is_zero() {
                log::debug!("Waiting {:?} for {} to be available online", delay, what);
                thread::sleep(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            max_attempts: Some(max_attempts),
            initial_delay: Duration::from_secs(0),
            max_delay: Duration::from_secs(0),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(5), Duration::from_secs(16));
        assert_eq!(policy.delay(6), Duration::from_secs(30));
        assert_eq!(policy.delay(40), Duration::from_secs(30));
    }

    #[test]
    fn test_poll_returns_first_non_empty_listing() {
        let mut calls = 0;
        let keys = instant(10).poll("IR files", || {
            calls += 1;
            if calls < 4 {
                Ok(vec![])
            } else {
                Ok(vec!["a.nc".to_owned()])
            }
        });

        assert_eq!(keys, vec!["a.nc".to_owned()]);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_poll_gives_up_after_max_attempts() {
        let mut calls = 0;
        let keys = instant(3).poll("IR files", || {
            calls += 1;
            Err("listing failed".into())
        });

        assert!(keys.is_empty());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_spin_forever_never_sleeps() {
        let policy = PollPolicy::spin_forever();
        assert!(policy.is_unbounded());
        assert_eq!(policy.delay(1000), Duration::from_secs(0));

        let mut calls = 0;
        let keys = policy.poll("GLM files", || {
            calls += 1;
            Ok(if calls == 50 { vec!["x".to_owned()] } else { vec![] })
        });
        assert_eq!(keys.len(), 1);
    }
}
