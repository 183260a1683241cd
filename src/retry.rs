//! Bounded fixed-interval retry, decoupled from wall-clock sleeping.

use crate::{Result, config::PollConfig};
use async_trait::async_trait;
use std::{future::Future, time::Duration};
use tracing::trace;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately. Used where the interval must not cost real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSleeper;

#[async_trait]
impl Sleeper for NoopSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

/// What a single attempt decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Done(T),
    Retry,
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Completed { value: T, attempts: u32 },
    Aborted { attempts: u32 },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Runs `attempt` until it returns `Done` or `Abort`, or the budget runs out.
    ///
    /// `attempt` receives the 1-based attempt number. The sleeper is called
    /// between attempts, never after the last one. Errors end the loop at once.
    pub async fn run<T, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        mut attempt: F,
    ) -> Result<RetryOutcome<T>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        for n in 1..=self.max_attempts {
            match attempt(n).await? {
                Attempt::Done(value) => {
                    return Ok(RetryOutcome::Completed { value, attempts: n });
                }
                Attempt::Abort => return Ok(RetryOutcome::Aborted { attempts: n }),
                Attempt::Retry => {
                    trace!("Attempt {}/{} not finished", n, self.max_attempts);
                    if n < self.max_attempts {
                        sleeper.sleep(self.interval).await;
                    }
                }
            }
        }

        Ok(RetryOutcome::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

impl From<&PollConfig> for RetryPolicy {
    fn from(config: &PollConfig) -> Self {
        Self::new(config.max_attempts, config.interval())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}
