//! Global sliding-window request limiter. Off unless configured.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

pub struct RateLimiter {
    max_requests: usize,
    period: Duration,
    hits: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, period: Duration) -> Self {
        Self {
            max_requests,
            period,
            hits: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.period_secs))
    }

    /// Record a request if the window has room.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    fn allow_at(&self, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(&oldest) = hits.front() {
            if now.duration_since(oldest) <= self.period {
                break;
            }
            hits.pop_front();
        }
        if hits.len() < self.max_requests {
            hits.push_back(now);
            true
        } else {
            false
        }
    }
}
