//! Market-data replay harness
//!
//! Drives the trader from a CSV of recorded snapshots so a tuning session
//! can be rerun offline. Outbound commands are logged, not executed; no
//! fills come back, so this exercises the decision path only.
//!
//! Expected columns: `kind` (order_book | trade_ticks), `instrument`
//! (future | etf), `sequence`, then `ask_prices`, `ask_volumes`,
//! `bid_prices`, `bid_volumes` as `;`-separated five-level lists.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::StrategyConfig;
use crate::connector::ExecutionConnector;
use crate::trader::ArbTrader;
use crate::types::{
    BookUpdate, Instrument, Ladder, Lifespan, OrderId, Price, Side, Volume, TOP_LEVEL_COUNT,
};

#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    kind: String,
    instrument: Instrument,
    sequence: u64,
    ask_prices: String,
    ask_volumes: String,
    bid_prices: String,
    bid_volumes: String,
}

impl SnapshotRecord {
    fn into_update(self) -> Result<(String, BookUpdate)> {
        let update = BookUpdate {
            instrument: self.instrument,
            sequence: self.sequence,
            asks: Ladder::new(parse_levels(&self.ask_prices)?, parse_levels(&self.ask_volumes)?),
            bids: Ladder::new(parse_levels(&self.bid_prices)?, parse_levels(&self.bid_volumes)?),
        };
        Ok((self.kind, update))
    }
}

fn parse_levels(field: &str) -> Result<[u64; TOP_LEVEL_COUNT]> {
    let mut levels = [0u64; TOP_LEVEL_COUNT];
    let mut count = 0;
    for (slot, part) in levels.iter_mut().zip(field.split(';')) {
        *slot = part
            .trim()
            .parse()
            .with_context(|| format!("bad level value {part:?}"))?;
        count += 1;
    }
    if count != TOP_LEVEL_COUNT {
        bail!("expected {TOP_LEVEL_COUNT} levels, got {count} in {field:?}");
    }
    Ok(levels)
}

/// Connector that logs every command instead of sending it
pub struct LoggingConnector;

impl ExecutionConnector for LoggingConnector {
    fn insert_order(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    ) {
        info!(order_id = id, ?side, price, volume, ?lifespan, "[replay] insert order");
    }

    fn cancel_order(&mut self, id: OrderId) {
        info!(order_id = id, "[replay] cancel order");
    }

    fn insert_hedge_order(&mut self, id: OrderId, side: Side, price: Price, volume: Volume) {
        info!(order_id = id, ?side, price, volume, "[replay] insert hedge order");
    }
}

/// Replay a snapshot file through a fresh trader
pub fn run(path: &Path, config: StrategyConfig) -> Result<()> {
    let mut trader = ArbTrader::new(config, LoggingConnector);
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open snapshot file {}", path.display()))?;

    let mut processed = 0usize;
    for result in reader.deserialize() {
        let record: SnapshotRecord = result.context("Malformed snapshot record")?;
        let (kind, update) = record.into_update()?;
        match kind.as_str() {
            "order_book" => trader.on_order_book(&update),
            "trade_ticks" => trader.on_trade_ticks(&update),
            other => warn!(kind = other, "skipping unknown snapshot kind"),
        }
        processed += 1;
    }

    info!(
        processed,
        position = trader.position(),
        unhedged = trader.unhedged(),
        "replay complete"
    );
    Ok(())
}
