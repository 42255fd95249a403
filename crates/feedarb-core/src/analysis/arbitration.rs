use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::ArbitrationSummary;
use crate::protocols::feed::Side;

/// Lifecycle of one sequence number: first arrival parks it as pending
/// with the side and timestamp recorded; the other side's first arrival
/// completes it. Completion is the only way out of pending.
#[derive(Debug, Clone, Copy)]
enum SeqSlot {
    Pending(Side, u64),
    Completed,
}

/// Streaming matcher for per-sequence arrivals from the two feeds.
///
/// `process` never fails: any `(side, sequence, timestamp)` triple is valid
/// input, including repeats and sequence numbers that never match.
/// Advantage sums are kept as exact integer nanoseconds so the averages are
/// computed from a rounding-free total at summary time.
#[derive(Debug, Default)]
pub struct ArbitrationStats {
    slots: HashMap<u64, SeqSlot>,
    total_a: u64,
    total_b: u64,
    faster_a: u64,
    faster_b: u64,
    advantage_a_ns: u128,
    advantage_b_ns: u128,
}

impl ArbitrationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one arrival.
    ///
    /// The raw per-side total counts every call. Beyond that, only the
    /// first arrival per side per sequence number has any effect: repeats
    /// before or after the match are ignored.
    pub fn process(&mut self, side: Side, sequence: u64, timestamp_ns: u64) {
        match side {
            Side::A => self.total_a += 1,
            Side::B => self.total_b += 1,
        }

        let completed = match self.slots.entry(sequence) {
            Entry::Vacant(slot) => {
                slot.insert(SeqSlot::Pending(side, timestamp_ns));
                None
            }
            Entry::Occupied(mut slot) => match *slot.get() {
                SeqSlot::Completed => None,
                SeqSlot::Pending(stored_side, _) if stored_side == side => None,
                SeqSlot::Pending(stored_side, stored_ts) => {
                    let (ts_a, ts_b) = match stored_side {
                        Side::A => (stored_ts, timestamp_ns),
                        Side::B => (timestamp_ns, stored_ts),
                    };
                    slot.insert(SeqSlot::Completed);
                    Some((ts_a, ts_b))
                }
            },
        };

        if let Some((ts_a, ts_b)) = completed {
            self.record_match(ts_a, ts_b);
        }
    }

    fn record_match(&mut self, ts_a: u64, ts_b: u64) {
        // Only the sign and magnitude of the difference matter; equal
        // timestamps complete the match without crediting either side.
        if ts_a < ts_b {
            self.faster_a += 1;
            self.advantage_a_ns += u128::from(ts_b - ts_a);
        } else if ts_b < ts_a {
            self.faster_b += 1;
            self.advantage_b_ns += u128::from(ts_a - ts_b);
        }
    }

    /// Snapshot the current state. Unmatched counts reflect sequence
    /// numbers still pending with exactly one side at this instant; they
    /// may complete if more input arrives later.
    pub fn build_summary(&self) -> ArbitrationSummary {
        let mut unmatched_a = 0;
        let mut unmatched_b = 0;
        for slot in self.slots.values() {
            match slot {
                SeqSlot::Pending(Side::A, _) => unmatched_a += 1,
                SeqSlot::Pending(Side::B, _) => unmatched_b += 1,
                SeqSlot::Completed => {}
            }
        }

        ArbitrationSummary {
            total_packets_a: self.total_a,
            total_packets_b: self.total_b,
            unmatched_a,
            unmatched_b,
            faster_count_a: self.faster_a,
            faster_count_b: self.faster_b,
            avg_advantage_a_ns: average_ns(self.advantage_a_ns, self.faster_a),
            avg_advantage_b_ns: average_ns(self.advantage_b_ns, self.faster_b),
            avg_fastest_advantage_ns: average_ns(
                self.advantage_a_ns + self.advantage_b_ns,
                self.faster_a + self.faster_b,
            ),
        }
    }
}

fn average_ns(sum_ns: u128, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum_ns as f64 / count as f64
    }
}
