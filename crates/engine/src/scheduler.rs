// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tick scheduler
//!
//! The loop aligns on the next boundary of [`CronSchedule::every_tick`],
//! runs once there, then ticks every `tick * tick_unit` on the grid started
//! at the aligned instant. It stops on SIGINT, SIGTERM or cancellation of
//! its token.

use crate::error::SchedulerError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeDelta};
use gtask_core::{current_time, Clock, CronSchedule, ScheduleError};
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Work performed on every tick
#[async_trait]
pub trait TickHandler: Send + Sync + 'static {
    /// Called with the minute-truncated reference time of the tick
    async fn on_tick(&self, reference: DateTime<FixedOffset>);
}

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between ticks, in `tick_unit`s
    pub tick: u32,
    /// Length of one tick unit
    pub tick_unit: Duration,
    /// Zone for reference times; empty keeps the clock's offset
    pub timezone: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: 1,
            tick_unit: Duration::from_secs(60),
            timezone: String::new(),
        }
    }
}

pub struct TickScheduler<C: Clock, H: TickHandler> {
    clock: C,
    handler: H,
    config: SchedulerConfig,
}

impl<C: Clock, H: TickHandler> TickScheduler<C, H> {
    pub fn new(clock: C, handler: H, config: SchedulerConfig) -> Self {
        Self {
            clock,
            handler,
            config,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Run until a termination signal or `cancel` fires
    ///
    /// Setup failures (bad tick, unknown time zone on the first run) are
    /// returned before the steady loop starts.
    pub async fn start(&self, cancel: CancellationToken) -> Result<(), SchedulerError> {
        let schedule = CronSchedule::every_tick(self.config.tick)?;
        let period = self
            .config
            .tick_unit
            .checked_mul(self.config.tick)
            .and_then(|d| TimeDelta::from_std(d).ok())
            .filter(|d| *d > TimeDelta::zero())
            .ok_or(ScheduleError::InvalidTick)?;

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        let aligned = schedule
            .next_after(&self.clock.now())
            .ok_or(ScheduleError::InvalidTick)?;
        tracing::info!(first_tick = %aligned, tick = self.config.tick, "scheduler started");

        tokio::select! {
            _ = self.clock.sleep_until(aligned) => {}
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, stopping scheduler");
                return Ok(());
            }
            _ = sigint.recv() => {
                tracing::info!("received SIGINT, stopping scheduler");
                return Ok(());
            }
            _ = cancel.cancelled() => {
                tracing::info!("scheduler cancelled");
                return Ok(());
            }
        }

        // First run: the zone is validated here, once
        let reference = current_time(self.clock.now(), &self.config.timezone)?;
        tracing::debug!(reference = %reference, "first tick");
        self.handler.on_tick(reference).await;

        let mut next = next_tick(aligned, period, self.clock.now());
        loop {
            tokio::select! {
                _ = self.clock.sleep_until(next) => {
                    let now = self.clock.now();
                    let reference = current_time(now, &self.config.timezone).unwrap_or(now);
                    tracing::debug!(reference = %reference, "tick");
                    self.handler.on_tick(reference).await;
                    next = next_tick(next, period, self.clock.now());
                }
                _ = sigterm.recv() => {
                    tracing::info!("received SIGTERM, stopping scheduler");
                    return Ok(());
                }
                _ = sigint.recv() => {
                    tracing::info!("received SIGINT, stopping scheduler");
                    return Ok(());
                }
                _ = cancel.cancelled() => {
                    tracing::info!("scheduler cancelled");
                    return Ok(());
                }
            }
        }
    }
}

/// Grid point following `previous`
///
/// When the run overran, the result is the last grid point not after `now`,
/// so exactly one late tick fires and the other missed points are dropped.
pub(crate) fn next_tick(
    previous: DateTime<FixedOffset>,
    period: TimeDelta,
    now: DateTime<FixedOffset>,
) -> DateTime<FixedOffset> {
    let next = previous + period;
    if next > now {
        return next;
    }
    let missed = (now - next).num_milliseconds() / period.num_milliseconds().max(1);
    tracing::warn!(late_by = %(now - next), dropped = missed, "tick overran");
    i32::try_from(missed)
        .ok()
        .and_then(|n| period.checked_mul(n))
        .map_or(now, |skip| next + skip)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
