// Fixed-backoff retry for network calls.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

pub const DEFAULT_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// How often a transport operation is attempted and how long to sleep
/// between attempts. `attempts` counts the first try, so `1` disables
/// retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Run `op` until it succeeds or the attempts are used up. Errors for
    /// which `retryable` is false are returned immediately; otherwise the
    /// error of the last attempt is returned as is.
    pub fn run_while<T, E, F, P>(&self, what: &str, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts && retryable(&e) => {
                    log::warn!(
                        "{} attempt {}/{} failed, retrying in {:?}: {}",
                        what,
                        attempt,
                        attempts,
                        self.backoff,
                        e
                    );
                    if !self.backoff.is_zero() {
                        thread::sleep(self.backoff);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_first_success_runs_once() {
        let calls = Cell::new(0);
        let result: Result<u32, String> = quick(5).run_while(
            "op",
            || {
                calls.set(calls.get() + 1);
                Ok(7)
            },
            |_| true,
        );
        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_recovers_after_transient_failures() {
        let calls = Cell::new(0);
        let result: Result<&str, String> = quick(5).run_while(
            "op",
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(format!("connection reset #{}", calls.get()))
                } else {
                    Ok("done")
                }
            },
            |_| true,
        );
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_last_error_propagates() {
        let calls = Cell::new(0);
        let result: Result<(), String> = quick(5).run_while(
            "op",
            || {
                calls.set(calls.get() + 1);
                Err(format!("failure {}", calls.get()))
            },
            |_| true,
        );
        assert_eq!(result, Err("failure 5".to_string()));
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn test_permanent_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), String> = quick(5).run_while(
            "op",
            || {
                calls.set(calls.get() + 1);
                Err("bad request".to_string())
            },
            |e| !e.starts_with("bad"),
        );
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let calls = Cell::new(0);
        let policy = RetryPolicy {
            attempts: 0,
            backoff: Duration::ZERO,
        };
        let _: Result<(), String> = policy.run_while(
            "op",
            || {
                calls.set(calls.get() + 1);
                Err("boom".into())
            },
            |_| true,
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(RetryPolicy::no_retry().attempts, 1);
    }
}
