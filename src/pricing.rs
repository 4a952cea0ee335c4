//! Volume-weighted pricing and arbitrage edge detection

use crate::book::BookSummary;
use crate::config::StrategyConfig;
use crate::types::{Ladder, Lifespan, Price, Volume};

/// Volume-weighted average over a book side's levels, best price first.
///
/// Accumulation stops once `volume_cap` lots have been absorbed so a single
/// deep level dominates distant quotes. Returns 0 when the side is empty.
pub fn weighted_average(ladder: &Ladder, volume_cap: Volume) -> Price {
    let mut sum: u64 = 0;
    let mut count: u64 = 0;
    for (&price, &volume) in ladder.prices.iter().zip(ladder.volumes.iter()) {
        sum += volume * price;
        count += volume;
        if count >= volume_cap {
            break;
        }
    }
    if count == 0 {
        0
    } else {
        sum / count
    }
}

/// Mid price of a snapshot: mean of the two weighted side averages
pub fn weighted_mid(bids: &Ladder, asks: &Ladder, volume_cap: Volume) -> Price {
    (weighted_average(bids, volume_cap) + weighted_average(asks, volume_cap)) / 2
}

/// Target prices, direction flags and sizing for one paired snapshot
#[derive(Debug, Clone, Copy)]
pub struct QuotePlan {
    pub buy_price: Price,
    pub sell_price: Price,
    pub should_buy: bool,
    pub should_sell: bool,
    /// Theoretical profit per lot of hedging the quoted side, in cents
    pub edge: i64,
    /// Edge-scaled order size before position-room clipping
    pub size: Volume,
    /// One-tick spread but enough volume at the touch to cross for the fee
    pub take_fee: bool,
    pub spread: Price,
    pub lifespan: Lifespan,
    /// Both ETF touches present; quoting against an empty side is meaningless
    pub valid_book: bool,
}

impl QuotePlan {
    /// Whether the spread condition admits quoting at all
    pub fn tradable(&self, tick_size: u64) -> bool {
        self.valid_book && (self.spread > tick_size || self.take_fee)
    }
}

/// Derive the quoting plan from a completed ETF/future pair.
///
/// When the quoted spread is wide the targets step a fixed adjustment in
/// from the far touch; when it is tight they pin one tick inside the touch.
/// The edge is what the future's touch pays for hedging the prospective
/// fill; quoting requires it to clear `min_edge`.
pub fn plan_quotes(etf: &BookSummary, future: &BookSummary, config: &StrategyConfig) -> QuotePlan {
    let tick = config.tick_size;
    let spread = etf.best_ask.saturating_sub(etf.best_bid);

    let buy_price = if spread > config.price_adjust {
        etf.best_ask - config.price_adjust
    } else {
        // ask - spread + tick == bid + tick
        etf.best_bid + tick
    };
    let sell_price = if spread > config.price_adjust {
        etf.best_bid + config.price_adjust
    } else {
        // bid + spread - tick == ask - tick
        etf.best_ask.saturating_sub(tick)
    };

    let should_buy = buy_price <= future.best_bid.saturating_sub(config.min_edge);
    let should_sell = sell_price >= future.best_ask + config.min_edge;

    let mut edge = future.best_bid as i64 - buy_price as i64;
    if sell_price > future.best_ask {
        edge = sell_price as i64 - future.best_ask as i64;
    }
    let size = if edge <= 0 {
        0
    } else {
        config.lot_size * edge as u64 / 50
    };

    let touch_volume = if should_buy {
        etf.best_ask_volume
    } else {
        etf.best_bid_volume
    };
    let take_fee = spread == tick && touch_volume > config.fee_take_min_volume;

    QuotePlan {
        buy_price,
        sell_price,
        should_buy,
        should_sell,
        edge,
        size,
        take_fee,
        spread,
        lifespan: if spread > tick {
            Lifespan::GoodForDay
        } else {
            Lifespan::FillAndKill
        },
        valid_book: etf.best_bid != 0 && etf.best_ask != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn etf(best_bid: Price, best_ask: Price) -> BookSummary {
        BookSummary {
            mid: (best_bid + best_ask) / 2,
            best_bid,
            best_bid_volume: 20,
            best_ask,
            best_ask_volume: 20,
        }
    }

    fn future(best_bid: Price, best_ask: Price) -> BookSummary {
        etf(best_bid, best_ask)
    }

    #[test]
    fn test_weighted_average_two_levels() {
        let ladder = Ladder::new([100, 200, 0, 0, 0], [5, 5, 0, 0, 0]);
        assert_eq!(weighted_average(&ladder, 300), 150);
    }

    #[test]
    fn test_weighted_average_empty_side() {
        let ladder = Ladder::new([0, 0, 0, 0, 0], [0, 0, 0, 0, 0]);
        assert_eq!(weighted_average(&ladder, 300), 0);
    }

    #[test]
    fn test_weighted_average_stops_at_volume_cap() {
        // First level already carries the cap; deeper levels must not count
        let ladder = Ladder::new([100, 900, 0, 0, 0], [300, 300, 0, 0, 0]);
        assert_eq!(weighted_average(&ladder, 300), 100);
    }

    #[test]
    fn test_wide_spread_uses_price_adjust() {
        let config = StrategyConfig::default();
        let plan = plan_quotes(&etf(9_000, 10_000), &future(9_600, 9_700), &config);
        assert_eq!(plan.spread, 1_000);
        assert_eq!(plan.buy_price, 9_400); // ask - 600
        assert_eq!(plan.sell_price, 9_600); // bid + 600
        assert_eq!(plan.lifespan, Lifespan::GoodForDay);
    }

    #[test]
    fn test_tight_spread_pins_inside_touch() {
        let config = StrategyConfig::default();
        let plan = plan_quotes(&etf(9_800, 10_000), &future(9_900, 9_950), &config);
        assert_eq!(plan.spread, 200);
        assert_eq!(plan.buy_price, 9_900); // bid + tick
        assert_eq!(plan.sell_price, 9_900); // ask - tick
    }

    #[test]
    fn test_edge_and_direction() {
        let config = StrategyConfig::default();
        let plan = plan_quotes(&etf(9_000, 10_000), &future(9_600, 9_700), &config);
        // buy at 9400, hedge at the future bid 9600
        assert!(plan.should_buy);
        assert!(!plan.should_sell);
        assert_eq!(plan.edge, 200);
        assert_eq!(plan.size, 8 * 200 / 50);
    }

    #[test]
    fn test_insufficient_edge_blocks_both_sides() {
        let config = StrategyConfig::default();
        // Future straddles the targets too closely: edge below min_edge
        let plan = plan_quotes(&etf(9_000, 10_000), &future(9_450, 9_550), &config);
        assert!(!plan.should_buy);
        assert!(!plan.should_sell);
        assert_eq!(plan.edge, 50);
    }

    #[test]
    fn test_one_tick_spread_fee_exception() {
        let config = StrategyConfig::default();
        let mut quoted = etf(9_900, 10_000);
        quoted.best_ask_volume = 50;
        let plan = plan_quotes(&quoted, &future(10_100, 10_200), &config);
        assert_eq!(plan.spread, 100);
        assert!(plan.take_fee);
        assert!(plan.tradable(config.tick_size));
        assert_eq!(plan.lifespan, Lifespan::FillAndKill);

        quoted.best_ask_volume = 3; // thin touch: adverse selection outweighs fee
        let plan = plan_quotes(&quoted, &future(10_100, 10_200), &config);
        assert!(!plan.take_fee);
        assert!(!plan.tradable(config.tick_size));
    }

    #[test]
    fn test_empty_book_not_tradable() {
        let config = StrategyConfig::default();
        let plan = plan_quotes(&etf(0, 10_000), &future(10_100, 10_200), &config);
        assert!(!plan.valid_book);
        assert!(!plan.tradable(config.tick_size));
    }
}
