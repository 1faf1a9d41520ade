// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Every wall-clock read and every wait in the scheduler goes through a
//! [`Clock`], so tests can drive virtual time with [`FakeClock`].

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, TimeZone};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

/// A clock that provides the current wall-clock time and can wait for a deadline
#[async_trait]
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Resolve once `now() >= deadline`
    async fn sleep_until(&self, deadline: DateTime<FixedOffset>);
}

/// Real system clock, reporting local time
#[derive(Clone, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    async fn sleep_until(&self, deadline: DateTime<FixedOffset>) {
        let wait = (deadline - self.now()).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;
    }
}

struct Sleeper {
    deadline: DateTime<FixedOffset>,
    wake: oneshot::Sender<()>,
}

struct FakeState {
    current: DateTime<FixedOffset>,
    sleepers: Vec<Sleeper>,
}

/// Fake clock for testing with controllable time
///
/// Sleepers only wake when [`FakeClock::advance`] or [`FakeClock::set`]
/// moves time past their deadline.
#[derive(Clone)]
pub struct FakeClock {
    state: Arc<Mutex<FakeState>>,
    parked: Arc<Notify>,
}

impl FakeClock {
    /// Create a fake clock frozen at the given instant
    pub fn at<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                current: instant.fixed_offset(),
                sleepers: Vec::new(),
            })),
            parked: Arc::new(Notify::new()),
        }
    }

    pub fn new() -> Self {
        Self::at(Local::now())
    }

    /// Advance the clock by the given duration, waking due sleepers
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Ok(delta) = chrono::TimeDelta::from_std(duration) {
            state.current += delta;
        }
        Self::wake_due(&mut state);
    }

    /// Set the clock to a specific instant, waking due sleepers
    pub fn set<Tz: TimeZone>(&self, instant: DateTime<Tz>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.current = instant.fixed_offset();
        Self::wake_due(&mut state);
    }

    /// Number of callers currently parked in `sleep_until`
    pub fn sleepers(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.sleepers.iter().filter(|s| !s.wake.is_closed()).count()
    }

    /// Wait until at least `count` callers are parked in `sleep_until`
    pub async fn block_until(&self, count: usize) {
        loop {
            let parked = self.parked.notified();
            if self.sleepers() >= count {
                return;
            }
            parked.await;
        }
    }

    fn wake_due(state: &mut FakeState) {
        let now = state.current;
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.sleepers)
            .into_iter()
            .partition(|s| s.deadline <= now);
        state.sleepers = pending;
        for sleeper in due {
            let _ = sleeper.wake.send(());
        }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).current
    }

    async fn sleep_until(&self, deadline: DateTime<FixedOffset>) {
        let rx = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if deadline <= state.current {
                return;
            }
            let (wake, rx) = oneshot::channel();
            state.sleepers.push(Sleeper { deadline, wake });
            rx
        };
        self.parked.notify_waiters();
        let _ = rx.await;
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
