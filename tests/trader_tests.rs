//! End-to-end tests for the trading decision path
//!
//! A recording connector captures every outbound command so the tests can
//! assert on exactly what the strategy would have sent to the exchange.

use etf_arb::{
    ArbTrader, BookUpdate, ExecutionConnector, Instrument, Ladder, Lifespan, Side, StrategyConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Insert {
        id: u64,
        side: Side,
        price: u64,
        volume: u64,
        lifespan: Lifespan,
    },
    Cancel {
        id: u64,
    },
    Hedge {
        id: u64,
        side: Side,
        price: u64,
        volume: u64,
    },
}

#[derive(Default)]
struct RecordingConnector {
    commands: Vec<Command>,
}

impl ExecutionConnector for RecordingConnector {
    fn insert_order(&mut self, id: u64, side: Side, price: u64, volume: u64, lifespan: Lifespan) {
        self.commands.push(Command::Insert {
            id,
            side,
            price,
            volume,
            lifespan,
        });
    }

    fn cancel_order(&mut self, id: u64) {
        self.commands.push(Command::Cancel { id });
    }

    fn insert_hedge_order(&mut self, id: u64, side: Side, price: u64, volume: u64) {
        self.commands.push(Command::Hedge {
            id,
            side,
            price,
            volume,
        });
    }
}

fn trader() -> ArbTrader<RecordingConnector> {
    ArbTrader::new(StrategyConfig::default(), RecordingConnector::default())
}

fn book(instrument: Instrument, sequence: u64, best_bid: u64, best_ask: u64) -> BookUpdate {
    BookUpdate {
        instrument,
        sequence,
        asks: Ladder::new([best_ask, 0, 0, 0, 0], [20, 0, 0, 0, 0]),
        bids: Ladder::new([best_bid, 0, 0, 0, 0], [20, 0, 0, 0, 0]),
    }
}

/// ETF wide at 9000/10000 against a future at 9600/9700: buying the ETF at
/// the 9400 target and hedging at the future bid earns 200 per lot.
fn profitable_buy_pair(sequence: u64) -> (BookUpdate, BookUpdate) {
    (
        book(Instrument::Etf, sequence, 9_000, 10_000),
        book(Instrument::Future, sequence, 9_600, 9_700),
    )
}

#[test]
fn test_one_decision_per_pair_future_first() {
    let mut trader = trader();
    let (etf, future) = profitable_buy_pair(1);

    trader.on_order_book(&future);
    assert!(trader.connector().commands.is_empty());

    trader.on_order_book(&etf);
    assert_eq!(
        trader.connector().commands,
        vec![Command::Insert {
            id: 1,
            side: Side::Buy,
            price: 9_400,
            volume: 32, // lot_size 8 * edge 200 / 50
            lifespan: Lifespan::GoodForDay,
        }]
    );
}

#[test]
fn test_one_decision_per_pair_etf_first() {
    let mut trader = trader();
    let (etf, future) = profitable_buy_pair(1);

    trader.on_order_book(&etf);
    trader.on_order_book(&future);

    // Same single decision regardless of arrival order
    assert_eq!(trader.connector().commands.len(), 1);
    assert!(matches!(
        trader.connector().commands[0],
        Command::Insert {
            side: Side::Buy,
            price: 9_400,
            volume: 32,
            ..
        }
    ));
}

#[test]
fn test_stale_pair_yields_no_decision() {
    let mut trader = trader();

    // Sequence 2 completes first and advances the watermark
    let (etf2, future2) = profitable_buy_pair(2);
    trader.on_order_book(&future2);
    trader.on_order_book(&etf2);
    let after_seq2 = trader.connector().commands.len();

    // A late pair for sequence 1 must be dropped entirely
    let (etf1, future1) = profitable_buy_pair(1);
    trader.on_order_book(&future1);
    trader.on_order_book(&etf1);
    assert_eq!(trader.connector().commands.len(), after_seq2);
}

#[test]
fn test_wash_trade_guard_cancels_resting_buy() {
    let mut trader = trader();
    let (etf, future) = profitable_buy_pair(1);
    trader.on_order_book(&future);
    trader.on_order_book(&etf);
    // Resting buy order 1 at 9400 from the first pair

    // Now a pair where the sell target lands exactly on 9400:
    // ETF 8800/9600 -> sell target 9400; future 9000/9200 clears the edge
    trader.on_order_book(&book(Instrument::Etf, 2, 8_800, 9_600));
    trader.on_order_book(&book(Instrument::Future, 2, 9_000, 9_200));

    let commands = &trader.connector().commands;
    let cancel_at = commands
        .iter()
        .position(|c| *c == Command::Cancel { id: 1 })
        .expect("resting buy must be cancelled");
    let sell_at = commands
        .iter()
        .position(|c| matches!(c, Command::Insert { side: Side::Sell, .. }))
        .expect("sell must be submitted");
    assert!(cancel_at < sell_at, "wash cancel must precede the new sell");

    let Command::Insert { price, volume, .. } = &commands[sell_at] else {
        unreachable!()
    };
    assert_eq!(*price, 9_400);
    assert_eq!(*volume, 32);
}

#[test]
fn test_fill_from_flat_is_hedged_immediately() {
    let mut trader = trader();
    let (etf, future) = profitable_buy_pair(1);
    trader.on_order_book(&future);
    trader.on_order_book(&etf);

    trader.on_order_filled(1, 9_400, 32);

    assert_eq!(trader.position(), 32);
    assert_eq!(trader.unhedged(), 0);
    assert_eq!(
        trader.connector().commands.last(),
        Some(&Command::Hedge {
            id: 2,
            side: Side::Sell,
            price: 100, // minimum bid rounded to a tick: guaranteed fill
            volume: 32,
        })
    );
}

#[test]
fn test_order_size_clipped_to_position_room() {
    let mut trader = trader();
    let (etf, future) = profitable_buy_pair(1);
    trader.on_order_book(&future);
    trader.on_order_book(&etf);
    trader.on_order_filled(1, 9_400, 32); // position 32, hedged

    // Huge edge: raw size 8 * 1600 / 50 = 256, but only 68 lots of room
    trader.on_order_book(&book(Instrument::Etf, 2, 8_000, 10_000));
    trader.on_order_book(&book(Instrument::Future, 2, 11_000, 11_100));

    let Some(Command::Insert { side, volume, .. }) = trader.connector().commands.last() else {
        panic!("expected an insert");
    };
    assert_eq!(*side, Side::Buy);
    assert_eq!(*volume, 68);
    assert!(trader.position() + *volume as i64 <= 100);
}

#[test]
fn test_unprofitable_pair_sends_nothing() {
    let mut trader = trader();
    // Future sits right on the ETF targets: no edge either way
    trader.on_order_book(&book(Instrument::Etf, 1, 9_000, 10_000));
    trader.on_order_book(&book(Instrument::Future, 1, 9_450, 9_550));
    assert!(trader.connector().commands.is_empty());
}

#[test]
fn test_fill_for_unknown_order_is_ignored() {
    let mut trader = trader();
    trader.on_order_filled(99, 9_400, 10);
    assert_eq!(trader.position(), 0);
    assert!(trader.connector().commands.is_empty());
}

#[test]
fn test_error_for_tracked_order_cancels_once() {
    let mut trader = trader();
    let (etf, future) = profitable_buy_pair(1);
    trader.on_order_book(&future);
    trader.on_order_book(&etf);

    trader.on_error(Some(1), "order rejected by risk check");
    trader.on_error(Some(1), "order rejected by risk check");
    trader.on_error(None, "venue-level warning");

    let cancels: Vec<_> = trader
        .connector()
        .commands
        .iter()
        .filter(|c| matches!(c, Command::Cancel { id: 1 }))
        .collect();
    assert_eq!(cancels.len(), 1);
}

#[test]
fn test_stale_resting_order_expires_after_lifespan() {
    let mut trader = trader();
    let (etf, future) = profitable_buy_pair(1);
    trader.on_order_book(&future);
    trader.on_order_book(&etf);

    // Jump seven generations ahead; the pass at sequence 8 expires order 1
    // before any new decision
    let (etf8, future8) = profitable_buy_pair(8);
    trader.on_order_book(&future8);
    trader.on_order_book(&etf8);

    assert!(trader
        .connector()
        .commands
        .contains(&Command::Cancel { id: 1 }));
}

#[test]
fn test_disconnect_halts_decisions() {
    let mut trader = trader();
    trader.on_disconnect();

    let (etf, future) = profitable_buy_pair(1);
    trader.on_order_book(&future);
    trader.on_order_book(&etf);
    assert!(trader.connector().commands.is_empty());
}

#[test]
fn test_completed_order_frees_outstanding_slot() {
    let mut trader = trader();
    let (etf, future) = profitable_buy_pair(1);
    trader.on_order_book(&future);
    trader.on_order_book(&etf);

    trader.on_order_filled(1, 9_400, 32);
    trader.on_order_status(1, 32, 0, -64);

    // The freed slot and the hedged position leave room for the next pair
    let (etf2, future2) = profitable_buy_pair(2);
    trader.on_order_book(&future2);
    trader.on_order_book(&etf2);
    assert!(matches!(
        trader.connector().commands.last(),
        Some(Command::Insert { side: Side::Buy, .. })
    ));
}
