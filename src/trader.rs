//! The autotrader: market data in, rate-limited commands out
//!
//! All callbacks are delivered one at a time by the connector, so the whole
//! strategy state lives here without locking. Each order-book pass runs:
//! prune the message window, expire stale orders, pair the snapshot, update
//! the hedge trend, then quote whichever sides clear the edge and the
//! position/outstanding/quota checks.

use std::time::Instant;

use tracing::{debug, info, trace};

use crate::book::{BookSummary, BookSynchronizer, PairedBooks, SyncOutcome};
use crate::common::RateLimiter;
use crate::config::StrategyConfig;
use crate::connector::ExecutionConnector;
use crate::hedging::{HedgeAction, HedgingEngine};
use crate::oms::manager::OrderManager;
use crate::oms::position::PositionBook;
use crate::oms::types::Order;
use crate::pricing::{self, QuotePlan};
use crate::types::{BookUpdate, Lifespan, OrderId, Price, Side, Volume};

pub struct ArbTrader<C: ExecutionConnector> {
    config: StrategyConfig,
    connector: C,
    limiter: RateLimiter,
    synchronizer: BookSynchronizer,
    hedging: HedgingEngine,
    orders: OrderManager,
    position: PositionBook,
    next_order_id: OrderId,
    epoch: Instant,
    stopped: bool,
}

impl<C: ExecutionConnector> ArbTrader<C> {
    pub fn new(config: StrategyConfig, connector: C) -> Self {
        ArbTrader {
            limiter: RateLimiter::new(
                config.window_ms,
                config.message_limit,
                config.reserved_messages,
            ),
            synchronizer: BookSynchronizer::new(),
            hedging: HedgingEngine::new(&config),
            orders: OrderManager::new(&config),
            position: PositionBook::new(config.neutral_band),
            next_order_id: 1,
            epoch: Instant::now(),
            stopped: false,
            config,
            connector,
        }
    }

    /// Net position in lots
    pub fn position(&self) -> i64 {
        self.position.position
    }

    /// Unhedged signed quantity
    pub fn unhedged(&self) -> i64 {
        self.position.unhedged
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn next_id(&mut self) -> OrderId {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    /// Periodic order-book snapshot for one instrument
    pub fn on_order_book(&mut self, update: &BookUpdate) {
        if self.stopped {
            return;
        }
        self.limiter.prune();

        let expiry_sequence = update.sequence.max(self.synchronizer.watermark());
        self.orders.expire_stale(
            expiry_sequence,
            self.config.order_lifespan_seqs,
            &mut self.limiter,
            &mut self.connector,
        );

        let summary = self.summarize(update);
        let paired = match self
            .synchronizer
            .on_snapshot(update.instrument, update.sequence, summary)
        {
            SyncOutcome::Stored => return,
            SyncOutcome::Stale => {
                info!(
                    instrument = %update.instrument,
                    sequence = update.sequence,
                    watermark = self.synchronizer.watermark(),
                    "discarding stale order book snapshot"
                );
                return;
            }
            SyncOutcome::Ready(paired) => paired,
        };

        let now = self.now_ms();
        match self.hedging.on_future_mid(paired.future.mid, now, &self.position) {
            Some(HedgeAction::Full) => self.hedge_all(),
            Some(HedgeAction::Partial) => self.hedge_partial(),
            None => {}
        }

        self.quote(&paired);
    }

    /// Trade-tick snapshot: informational only
    pub fn on_trade_ticks(&mut self, update: &BookUpdate) {
        trace!(
            instrument = %update.instrument,
            sequence = update.sequence,
            best_ask = update.asks.best_price(),
            best_bid = update.bids.best_price(),
            "trade ticks"
        );
    }

    /// One of our ETF orders traded
    pub fn on_order_filled(&mut self, id: OrderId, price: Price, volume: Volume) {
        info!(order_id = id, price, volume, "order filled");
        let Some(side) = self.orders.on_fill(id, volume) else {
            return;
        };

        let now = self.now_ms();
        let effect = self.position.apply_fill(side, price, volume, now);
        if effect.flattened_or_flipped {
            self.hedge_all();
        }

        info!(
            position = self.position.position,
            unhedged = self.position.unhedged,
            to_buy = self.orders.working_volume(Side::Buy),
            to_sell = self.orders.working_volume(Side::Sell),
            "position updated"
        );
    }

    /// A hedge order traded; the exposure was already accounted at send time
    pub fn on_hedge_filled(&mut self, id: OrderId, price: Price, volume: Volume) {
        info!(order_id = id, price, volume, "hedge order filled");
    }

    /// Order status change; zero remaining volume releases the order
    pub fn on_order_status(&mut self, id: OrderId, fill_volume: Volume, remaining: Volume, fees: i64) {
        self.orders.on_status(id, fill_volume, remaining, fees);
    }

    /// Matching engine reported an error, possibly naming one of our orders
    pub fn on_error(&mut self, id: Option<OrderId>, message: &str) {
        info!(order_id = ?id, message, "exchange reported an error");
        if let Some(id) = id {
            self.orders
                .on_error(id, &mut self.limiter, &mut self.connector);
        }
    }

    /// Execution connection lost: stop issuing decisions. Reconnection is
    /// the connector's problem, not ours.
    pub fn on_disconnect(&mut self) {
        self.stopped = true;
        info!("execution connection lost; halting trading decisions");
    }

    fn summarize(&self, update: &BookUpdate) -> BookSummary {
        let cap = self.config.weight_volume_cap;
        BookSummary {
            mid: pricing::weighted_mid(&update.bids, &update.asks, cap),
            best_bid: update.bids.best_price(),
            best_bid_volume: update.bids.best_volume(),
            best_ask: update.asks.best_price(),
            best_ask_volume: update.asks.best_volume(),
        }
    }

    /// Evaluate both quoting directions for a completed pair
    fn quote(&mut self, paired: &PairedBooks) {
        let plan = pricing::plan_quotes(&paired.etf, &paired.future, &self.config);
        debug!(
            sequence = paired.sequence,
            buy_price = plan.buy_price,
            sell_price = plan.sell_price,
            edge = plan.edge,
            size = plan.size,
            "quote plan"
        );
        if !plan.tradable(self.config.tick_size) {
            return;
        }

        if plan.should_buy {
            let room = (self.config.position_limit
                - self.position.position
                - self.orders.working_volume(Side::Buy) as i64)
                .max(0) as Volume;
            let size = plan.size.min(room);
            if self.orders.can_buy(
                size,
                plan.buy_price,
                self.position.position,
                &mut self.limiter,
                &mut self.connector,
            ) {
                self.submit(Side::Buy, &plan, size, paired.sequence);
            }
        }

        if plan.should_sell {
            let room = (self.config.position_limit + self.position.position
                - self.orders.working_volume(Side::Sell) as i64)
                .max(0) as Volume;
            let size = plan.size.min(room);
            if self.orders.can_sell(
                size,
                plan.sell_price,
                self.position.position,
                &mut self.limiter,
                &mut self.connector,
            ) {
                self.submit(Side::Sell, &plan, size, paired.sequence);
            }
        }
    }

    fn submit(&mut self, side: Side, plan: &QuotePlan, volume: Volume, sequence: u64) {
        let price = match side {
            Side::Buy => plan.buy_price,
            Side::Sell => plan.sell_price,
        };
        let id = self.next_id();
        self.limiter.await_capacity();
        self.connector
            .insert_order(id, side, price, volume, plan.lifespan);
        self.limiter.record_event();
        self.orders
            .record_order(Order::new(id, side, price, volume, sequence));

        info!(
            order_id = id,
            ?side,
            price,
            volume,
            edge = plan.edge,
            events = self.limiter.len(),
            position = self.position.position,
            "inserted arbitrage order"
        );
        if plan.lifespan == Lifespan::FillAndKill {
            info!(order_id = id, "crossing a one-tick spread, paying the fee");
        }
    }

    /// Cover the entire unhedged quantity at a guaranteed-fill price
    fn hedge_all(&mut self) {
        let Some((side, volume)) = self.position.plan_full_hedge() else {
            return;
        };
        self.send_hedge(side, volume);
    }

    /// Shed a slice of the unhedged quantity
    fn hedge_partial(&mut self) {
        let Some((side, volume)) = self
            .position
            .plan_partial_hedge(self.config.partial_hedge_ratio)
        else {
            return;
        };
        self.send_hedge(side, volume);
    }

    fn send_hedge(&mut self, side: Side, volume: Volume) {
        let price = match side {
            Side::Sell => self.config.min_bid_nearest_tick(),
            Side::Buy => self.config.max_ask_nearest_tick(),
        };
        let id = self.next_id();
        self.limiter.await_capacity();
        self.connector.insert_hedge_order(id, side, price, volume);
        self.limiter.record_event();
        self.position.apply_hedge(side, volume);
        info!(
            order_id = id,
            ?side,
            volume,
            unhedged = self.position.unhedged,
            "hedge order sent"
        );
    }
}
