//! Net position and unhedged exposure bookkeeping
//!
//! Mutated only by fill callbacks and the hedging engine. All the exposure
//! episode timing the hedging engine keys off lives here.

use crate::types::{Price, Side, Volume};

/// What a fill did to the exposure state
#[derive(Debug, Clone, Copy)]
pub struct FillEffect {
    /// Unhedged exposure crossed through (or landed on) zero: the position
    /// flattened or flipped and must be fully hedged right away
    pub flattened_or_flipped: bool,
}

/// Signed net position plus the exposure episode state
#[derive(Debug)]
pub struct PositionBook {
    /// Net position in lots, positive when long
    pub position: i64,
    /// Volume-weighted average entry price of the open position
    pub entry_price: Price,
    /// Filled quantity not yet covered on the future
    pub unhedged: i64,
    /// When exposure last left the neutral band; starts the force-hedge clock
    pub exposure_since: Option<u64>,
    /// When the current directional trend began, ms
    pub trend_start: u64,
    neutral_band: i64,
}

impl PositionBook {
    pub fn new(neutral_band: i64) -> Self {
        PositionBook {
            position: 0,
            entry_price: 0,
            unhedged: 0,
            exposure_since: None,
            trend_start: 0,
            neutral_band,
        }
    }

    /// Apply one fill: position, entry price, unhedged exposure and the
    /// episode transitions.
    ///
    /// Entry price follows a single symmetric rule: a fill extending the
    /// position blends into the weighted average, a fill reducing it leaves
    /// the average alone, and a fill crossing through zero resets it to the
    /// fill price (zero when the position is exactly flat afterwards).
    pub fn apply_fill(&mut self, side: Side, price: Price, volume: Volume, now_ms: u64) -> FillEffect {
        let signed = match side {
            Side::Buy => volume as i64,
            Side::Sell => -(volume as i64),
        };
        let new_position = self.position + signed;

        if new_position == 0 {
            self.entry_price = 0;
        } else if self.position == 0 || (self.position > 0) != (new_position > 0) {
            self.entry_price = price;
        } else if (self.position > 0) == (signed > 0) {
            let held = self.entry_price as u128 * self.position.unsigned_abs() as u128;
            let added = price as u128 * volume as u128;
            self.entry_price = ((held + added) / new_position.unsigned_abs() as u128) as Price;
        }
        self.position = new_position;

        let prev_unhedged = self.unhedged;
        self.unhedged += signed;

        let flattened_or_flipped = match side {
            Side::Buy => prev_unhedged <= 0 && self.unhedged >= 0,
            Side::Sell => prev_unhedged >= 0 && self.unhedged <= 0,
        };
        if flattened_or_flipped {
            self.trend_start = now_ms;
        } else if prev_unhedged.abs() <= self.neutral_band && self.unhedged.abs() > self.neutral_band {
            // Exposure just escaped the neutral band; the caller hedges the
            // flattened case away immediately, so the clock only starts here.
            self.exposure_since = Some(now_ms);
        }

        FillEffect {
            flattened_or_flipped,
        }
    }

    /// Side and volume covering the whole unhedged quantity, None when flat
    pub fn plan_full_hedge(&self) -> Option<(Side, Volume)> {
        match self.unhedged {
            0 => None,
            n if n > 0 => Some((Side::Sell, n as Volume)),
            n => Some((Side::Buy, n.unsigned_abs())),
        }
    }

    /// Side and volume for a partial hedge of ceil(|unhedged| / ratio) lots,
    /// never overshooting past flat
    pub fn plan_partial_hedge(&self, ratio: i64) -> Option<(Side, Volume)> {
        if self.unhedged == 0 {
            return None;
        }
        let magnitude = self.unhedged.unsigned_abs();
        let slice = magnitude.div_ceil(ratio as u64).min(magnitude);
        let side = if self.unhedged > 0 {
            Side::Sell
        } else {
            Side::Buy
        };
        Some((side, slice))
    }

    /// Account for a sent hedge order
    pub fn apply_hedge(&mut self, side: Side, volume: Volume) {
        match side {
            Side::Sell => self.unhedged -= volume as i64,
            Side::Buy => self.unhedged += volume as i64,
        }
    }
}
