//! Trend classification over the future's mid price and hedge decisions
//!
//! The engine watches a short moving average of the future mid. While an
//! exposure episode is open, consecutive adverse moves of the average are
//! tolerated up to a limit that grows with the age of the current trend;
//! hitting the limit sheds a slice of the exposure. An episode that has run
//! too long is force-hedged in full regardless of trend.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::StrategyConfig;
use crate::oms::position::PositionBook;
use crate::types::Price;

/// What the trader should do with the unhedged quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeAction {
    /// Cover the whole unhedged quantity at a guaranteed-fill price
    Full,
    /// Shed a fraction of it; the trend may still come back
    Partial,
}

pub struct HedgingEngine {
    window: VecDeque<Price>,
    window_size: usize,
    /// Average at the previous observation
    baseline: Price,
    /// Consecutive observations where the average moved against us
    fail_count: u32,
    timeout_ms: u64,
    tier_fast_ms: u64,
    tier_slow_ms: u64,
}

impl HedgingEngine {
    pub fn new(config: &StrategyConfig) -> Self {
        HedgingEngine {
            window: VecDeque::with_capacity(config.hedge_window),
            window_size: config.hedge_window,
            baseline: 0,
            fail_count: 0,
            timeout_ms: config.hedge_timeout_ms,
            tier_fast_ms: config.trend_tier_fast_ms,
            tier_slow_ms: config.trend_tier_slow_ms,
        }
    }

    /// Feed one future mid price observation.
    ///
    /// Returns the hedge action the exposure state calls for, if any. The
    /// caller executes it and applies the result to `position`.
    pub fn on_future_mid(
        &mut self,
        mid: Price,
        now_ms: u64,
        position: &PositionBook,
    ) -> Option<HedgeAction> {
        if self.window.len() >= self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(mid);
        let average = self.window.iter().sum::<u64>() / self.window.len() as u64;

        let Some(episode_start) = position.exposure_since else {
            self.baseline = average;
            return None;
        };

        if now_ms.saturating_sub(episode_start) > self.timeout_ms {
            // Episode ran out of patience; baseline deliberately not
            // refreshed on this path.
            return Some(HedgeAction::Full);
        }

        let trend_age = now_ms.saturating_sub(position.trend_start);
        let fail_limit = if trend_age < self.tier_fast_ms {
            1
        } else if trend_age < self.tier_slow_ms {
            2
        } else {
            3
        };

        let adverse = (position.unhedged > 0 && average < self.baseline)
            || (position.unhedged < 0 && average > self.baseline);

        let mut action = None;
        if adverse {
            self.fail_count += 1;
            debug!(
                average,
                baseline = self.baseline,
                fail_count = self.fail_count,
                fail_limit,
                "average moved against held exposure"
            );
            if self.fail_count == fail_limit {
                action = Some(HedgeAction::Partial);
            }
        } else if position.unhedged != 0 {
            self.fail_count = 0;
        }

        self.baseline = average;
        action
    }
}
