//! Local token-bucket countdown simulator.
//!
//! Approximates the engine's bucket so the console can show a live refill
//! countdown. It enforces nothing and may drift from the authoritative
//! state under network latency or concurrent clients.
//!
//! ```text
//!            consume / observe (tokens < capacity)
//!   ┌──────┐ ─────────────────────────────────────▶ ┌────────────┐
//!   │ Full │                                        │ Depleting  │◀─┐ refill, still
//!   └──────┘ ◀───────────────────────────────────── └────────────┘ ─┘ below capacity
//!            refill reaches capacity                     (re-arm)
//! ```

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::console::clock::{Clock, SystemClock};

/// Shape of the bucket being mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketParams {
    pub capacity: u32,
    /// Tokens added per interval.
    pub refill_amount: u32,
    pub interval: Duration,
    /// Tokens each request consumes.
    pub cost: u32,
}

impl Default for BucketParams {
    fn default() -> Self {
        Self {
            capacity: 10,
            refill_amount: 5,
            interval: Duration::from_secs(10),
            cost: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketState {
    /// Tokens equal capacity, no timer.
    Full,
    /// Countdown active until the next refill.
    Depleting { next_refill: Instant },
}

/// What the display needs after each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketSnapshot {
    pub tokens: u32,
    pub capacity: u32,
    pub refill_amount: u32,
    pub full: bool,
    /// Whole seconds until the next refill, rounded up. `None` when full.
    pub seconds_until_refill: Option<u64>,
}

pub struct CountdownSimulator<C: Clock = SystemClock> {
    params: BucketParams,
    tokens: u32,
    state: BucketState,
    clock: C,
}

impl CountdownSimulator<SystemClock> {
    pub fn new(params: BucketParams) -> Self {
        Self::with_clock(params, SystemClock)
    }
}

impl<C: Clock> CountdownSimulator<C> {
    pub fn with_clock(params: BucketParams, clock: C) -> Self {
        Self {
            params,
            tokens: params.capacity,
            state: BucketState::Full,
            clock,
        }
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    pub fn state(&self) -> BucketState {
        self.state
    }

    /// Simulate one request. Returns whether it would have been allowed.
    pub fn consume(&mut self) -> bool {
        self.tick();
        let allowed = self.tokens >= self.params.cost;
        if allowed {
            self.tokens -= self.params.cost;
        }
        self.arm_if_depleted();
        allowed
    }

    /// Align with a real response's remaining-token count.
    pub fn observe(&mut self, remaining: u32) {
        self.tick();
        self.tokens = remaining.min(self.params.capacity);
        if self.tokens == self.params.capacity {
            self.state = BucketState::Full;
        } else {
            self.arm_if_depleted();
        }
    }

    /// Apply every refill whose time has come. A no-op when full.
    pub fn tick(&mut self) -> BucketSnapshot {
        if let BucketState::Depleting { mut next_refill } = self.state {
            // A zero interval refills continuously.
            if self.params.interval.is_zero() {
                self.tokens = self.params.capacity;
                self.state = BucketState::Full;
                return self.snapshot();
            }
            let now = self.clock.now();
            while now >= next_refill {
                self.tokens = (self.tokens + self.params.refill_amount).min(self.params.capacity);
                if self.tokens >= self.params.capacity {
                    self.state = BucketState::Full;
                    break;
                }
                next_refill += self.params.interval;
                self.state = BucketState::Depleting { next_refill };
            }
        }
        self.snapshot()
    }

    /// Time left before the next refill; zero once due, `None` when full.
    pub fn time_until_refill(&self) -> Option<Duration> {
        match self.state {
            BucketState::Full => None,
            BucketState::Depleting { next_refill } => {
                Some(next_refill.saturating_duration_since(self.clock.now()))
            }
        }
    }

    pub fn snapshot(&self) -> BucketSnapshot {
        let seconds_until_refill = self.time_until_refill().map(|left| {
            let secs = left.as_secs();
            if left.subsec_nanos() > 0 {
                secs + 1
            } else {
                secs
            }
        });
        BucketSnapshot {
            tokens: self.tokens,
            capacity: self.params.capacity,
            refill_amount: self.params.refill_amount,
            full: matches!(self.state, BucketState::Full),
            seconds_until_refill,
        }
    }

    fn arm_if_depleted(&mut self) {
        if self.tokens < self.params.capacity && self.state == BucketState::Full {
            self.state = BucketState::Depleting {
                next_refill: self.clock.now() + self.params.interval,
            };
        }
    }
}
