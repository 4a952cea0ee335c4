//! Cross-instrument book pairing by sequence number
//!
//! The exchange publishes one snapshot per instrument per sequence number,
//! in no guaranteed order. A trading decision needs both sides of the pair,
//! so the first arrival is parked until its partner shows up. Anything older
//! than the last fully processed sequence number is stale and discarded.

use std::collections::HashMap;

use crate::types::{Instrument, Price, SequenceNumber, Volume};

/// Condensed view of one instrument's book at one sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookSummary {
    /// Volume-weighted mid price
    pub mid: Price,
    pub best_bid: Price,
    pub best_bid_volume: Volume,
    pub best_ask: Price,
    pub best_ask_volume: Volume,
}

/// Both instruments' summaries for a fully received sequence number
#[derive(Debug, Clone, Copy)]
pub struct PairedBooks {
    pub sequence: SequenceNumber,
    pub etf: BookSummary,
    pub future: BookSummary,
}

/// Result of feeding one snapshot into the synchronizer
#[derive(Debug)]
pub enum SyncOutcome {
    /// First arrival for this sequence number, parked; no decision yet
    Stored,
    /// Older than the watermark; partial record evicted, data discarded
    Stale,
    /// Pair complete; trade on it. The slot is consumed and the watermark
    /// advances to this sequence number.
    Ready(PairedBooks),
}

/// Pairs per-sequence snapshots of the two instruments and enforces
/// monotonic processing.
#[derive(Debug, Default)]
pub struct BookSynchronizer {
    pending: HashMap<SequenceNumber, (Instrument, BookSummary)>,
    watermark: SequenceNumber,
}

impl BookSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last fully processed sequence number
    pub fn watermark(&self) -> SequenceNumber {
        self.watermark
    }

    /// Number of sequence numbers currently holding one side only
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn on_snapshot(
        &mut self,
        instrument: Instrument,
        sequence: SequenceNumber,
        summary: BookSummary,
    ) -> SyncOutcome {
        let Some(&(held_instrument, held)) = self.pending.get(&sequence) else {
            self.pending.insert(sequence, (instrument, summary));
            return SyncOutcome::Stored;
        };

        if sequence < self.watermark {
            // Out-of-order delivery; the decision for this generation has
            // already been taken at a newer sequence number.
            self.pending.remove(&sequence);
            return SyncOutcome::Stale;
        }

        if held_instrument == instrument {
            // Duplicate delivery for the same instrument: keep the freshest
            // data and stay parked for the partner.
            self.pending.insert(sequence, (instrument, summary));
            return SyncOutcome::Stored;
        }

        self.pending.remove(&sequence);
        self.watermark = sequence;
        let (etf, future) = match instrument {
            Instrument::Future => (held, summary),
            Instrument::Etf => (summary, held),
        };
        SyncOutcome::Ready(PairedBooks {
            sequence,
            etf,
            future,
        })
    }
}
