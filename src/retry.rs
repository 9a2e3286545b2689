//! Bounded retry with a fixed backoff.
//!
//! Every remote call goes through [`RetryPolicy::run`]. Each call site owns its
//! own policy: the bug-list fetch, per-bug mutations, notifications and the
//! time service are tuned independently in the settings file.

use crate::error::{BugwatchError, Result};
use std::time::Duration;

/// Blocks between attempts. Injected so that tests can count the pauses.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    /// Return the last error as is once attempts run out. When false the
    /// caller gets [`BugwatchError::RetriesExhausted`] instead.
    pub reraise_on_exhaustion: bool,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            reraise_on_exhaustion: true,
        }
    }

    pub fn with_reraise(mut self, reraise: bool) -> Self {
        self.reraise_on_exhaustion = reraise;
        self
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt number.
    ///
    /// Sleeps exactly once between two consecutive attempts and never after
    /// the last one.
    pub fn run<T, F>(&self, operation: &str, sleeper: &dyn Sleeper, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if attempt >= max_attempts {
                tracing::error!(
                    operation,
                    attempts = attempt,
                    error = %err,
                    "Giving up"
                );
                return Err(if self.reraise_on_exhaustion {
                    err
                } else {
                    BugwatchError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: attempt,
                        last: err.to_string(),
                    }
                });
            }

            tracing::warn!(
                operation,
                attempt,
                max_attempts,
                backoff_secs = self.backoff.as_secs_f64(),
                error = %err,
                "Attempt failed, retrying"
            );
            sleeper.sleep(self.backoff);
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingSleeper {
        pauses: RefCell<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.pauses.borrow_mut().push(duration);
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(5))
    }

    #[test]
    fn test_success_on_first_attempt_never_sleeps() {
        let sleeper = RecordingSleeper::default();
        let value = policy(3).run("fetch", &sleeper, |_| Ok(7)).unwrap();
        assert_eq!(value, 7);
        assert!(sleeper.pauses.borrow().is_empty());
    }

    #[test]
    fn test_success_on_attempt_n_sleeps_n_minus_one_times() {
        for n in 1..=5u32 {
            let sleeper = RecordingSleeper::default();
            let calls = Cell::new(0);
            let value = policy(5)
                .run("fetch", &sleeper, |attempt| {
                    calls.set(calls.get() + 1);
                    if attempt < n {
                        Err(BugwatchError::remote("fetch", "503"))
                    } else {
                        Ok(attempt)
                    }
                })
                .unwrap();
            assert_eq!(value, n);
            assert_eq!(calls.get(), n);
            assert_eq!(sleeper.pauses.borrow().len(), (n - 1) as usize);
            assert!(
                sleeper
                    .pauses
                    .borrow()
                    .iter()
                    .all(|d| *d == Duration::from_secs(5))
            );
        }
    }

    #[test]
    fn test_exhaustion_reraises_original_error() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let err = policy(4)
            .run("update", &sleeper, |_| -> Result<()> {
                calls.set(calls.get() + 1);
                Err(BugwatchError::remote("update", "connection reset"))
            })
            .unwrap_err();
        assert!(matches!(err, BugwatchError::Remote { ref message, .. } if message == "connection reset"));
        assert_eq!(calls.get(), 4);
        assert_eq!(sleeper.pauses.borrow().len(), 3);
    }

    #[test]
    fn test_exhaustion_without_reraise_wraps() {
        let sleeper = RecordingSleeper::default();
        let err = policy(2)
            .with_reraise(false)
            .run("notify", &sleeper, |_| -> Result<()> {
                Err(BugwatchError::Notification("invalid_payload".into()))
            })
            .unwrap_err();
        match err {
            BugwatchError::RetriesExhausted {
                operation,
                attempts,
                last,
            } => {
                assert_eq!(operation, "notify");
                assert_eq!(attempts, 2);
                assert!(last.contains("invalid_payload"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_auth_failure_is_not_retried() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let err = policy(10)
            .run("authenticate", &sleeper, |_| -> Result<()> {
                calls.set(calls.get() + 1);
                Err(BugwatchError::Auth("401".into()))
            })
            .unwrap_err();
        assert!(matches!(err, BugwatchError::Auth(_)));
        assert_eq!(calls.get(), 1);
        assert!(sleeper.pauses.borrow().is_empty());
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let _ = policy(0).run("fetch", &sleeper, |_| -> Result<()> {
            calls.set(calls.get() + 1);
            Err(BugwatchError::remote("fetch", "down"))
        });
        assert_eq!(calls.get(), 1);
    }
}
