//! # Reconciliation Store
//!
//! Converts a sequence of possibly-repeated, possibly-absent opportunity
//! sightings across polling cycles into a stable, ordered snapshot. An
//! opportunity that briefly drops out of a scan does not flicker off the
//! view: its last known record is retained until it has been missing for
//! `max_misses` consecutive cycles, at which point the slot is evicted.

/// Ordered result snapshot
pub mod snapshot;
/// Test constructors
#[cfg(test)]
pub mod test_helpers;

use std::collections::HashMap;

use chrono::Utc;
use eyre::{bail, Result};

use crate::models::batch::ScanBatch;
use crate::models::opportunity::{Opportunity, PathKey};
use snapshot::Snapshot;

/// Consecutive misses an identity may accumulate before eviction
pub const DEFAULT_MAX_MISSES: u32 = 2;

/// What one polling cycle produced. A failed or bodiless fetch is an
/// explicit absence signal, distinct from a valid batch that happens to be
/// empty: absence preserves every record untouched, while an empty batch
/// counts a miss against each of them through the normal path.
#[derive(Debug, Clone)]
pub enum ScanCycle {
    /// The cycle fetched a usable batch (possibly with zero records)
    Batch(ScanBatch),
    /// The cycle produced no usable data (transport failure, absent body)
    Unavailable,
}

/// One tracked identity: the latest merged record plus how many consecutive
/// cycles it has been absent.
#[derive(Debug, Clone)]
struct Slot {
    /// Last known record for this identity, field-merged across sightings
    record: Opportunity,
    /// Consecutive cycles this identity was absent; always `< max_misses`
    misses: u32,
    /// First-seen order, used as the deterministic tie-breaker when sorting
    seq: u64,
}

/// The store itself. Exclusively owns its slot map; callers only ever see
/// the snapshots it returns.
#[derive(Debug)]
pub struct Tracker {
    /// Eviction threshold, validated positive at construction
    max_misses: u32,
    /// Monotonic counter assigned to new slots
    next_seq: u64,
    /// Live slots keyed by opportunity identity, at most one per identity
    slots: HashMap<PathKey, Slot>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self {
            max_misses: DEFAULT_MAX_MISSES,
            next_seq: 0,
            slots: HashMap::new(),
        }
    }
}

impl Tracker {
    /// A tracker that evicts identities after `max_misses` consecutive
    /// absent cycles.
    ///
    /// # Errors
    /// * If `max_misses` is zero, which would evict everything instantly
    pub fn new(max_misses: u32) -> Result<Self> {
        if max_misses == 0 {
            bail!("max_misses must be positive");
        }
        Ok(Self {
            max_misses,
            ..Self::default()
        })
    }

    /// Number of live tracked identities
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no identity is currently tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Apply one polling cycle and return the resulting snapshot. Cycles
    /// must be applied serially; the store is not meant to be shared across
    /// concurrently running cycles.
    pub fn apply_cycle(&mut self, cycle: ScanCycle) -> Snapshot {
        match cycle {
            ScanCycle::Unavailable => {
                self.miss_all();
                self.snapshot(Utc::now())
            }
            ScanCycle::Batch(batch) => {
                let timestamp = batch.fetch_timestamp.unwrap_or_else(Utc::now);
                self.reconcile(batch.opportunities);
                self.snapshot(timestamp)
            }
        }
    }

    /// Merge a batch of sightings into the slot map and count misses for
    /// every identity the batch did not mention.
    fn reconcile(&mut self, incoming: Vec<Opportunity>) {
        // Collapse duplicates within the batch first so one cycle counts as
        // one sighting, with later duplicates merged over earlier ones
        let mut seen: HashMap<PathKey, Opportunity> = HashMap::new();
        let mut order: Vec<PathKey> = Vec::new();
        for opp in incoming {
            let key = opp.key();
            match seen.entry(key.clone()) {
                std::collections::hash_map::Entry::Occupied(mut e) => {
                    e.get_mut().merge_from(opp);
                }
                std::collections::hash_map::Entry::Vacant(e) => {
                    e.insert(opp);
                    order.push(key);
                }
            }
        }

        for key in &order {
            let Some(opp) = seen.remove(key) else { continue };
            if let Some(slot) = self.slots.get_mut(key) {
                slot.record.merge_from(opp);
                slot.misses = 0;
            } else {
                self.slots.insert(
                    key.clone(),
                    Slot {
                        record: opp,
                        misses: 0,
                        seq: self.next_seq,
                    },
                );
                self.next_seq += 1;
            }
        }

        let present: std::collections::HashSet<&PathKey> = order.iter().collect();
        let max_misses = self.max_misses;
        self.slots.retain(|key, slot| {
            if present.contains(key) {
                return true;
            }
            slot.misses += 1;
            if slot.misses >= max_misses {
                log::debug!("track: evicting {key} after {} misses", slot.misses);
                false
            } else {
                true
            }
        });
    }

    /// Count a miss against every slot, evicting those at threshold
    fn miss_all(&mut self) {
        let max_misses = self.max_misses;
        self.slots.retain(|key, slot| {
            slot.misses += 1;
            if slot.misses >= max_misses {
                log::debug!("track: evicting {key} after {} misses", slot.misses);
                false
            } else {
                true
            }
        });
    }

    /// Build the ordered view of all live slots
    fn snapshot(&self, timestamp: chrono::DateTime<Utc>) -> Snapshot {
        let mut live: Vec<&Slot> = self.slots.values().collect();
        live.sort_by(|a, b| {
            b.record
                .profit()
                .total_cmp(&a.record.profit())
                .then_with(|| a.seq.cmp(&b.seq))
        });

        let opportunities: Vec<Opportunity> =
            live.into_iter().map(|slot| slot.record.clone()).collect();
        Snapshot {
            total_count: opportunities.len(),
            opportunities,
            fetch_timestamp: timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;
    use crate::models::opportunity::Risk;

    #[test]
    fn test_zero_max_misses_rejected() {
        assert_eq!(
            Tracker::new(0).err().unwrap().to_string(),
            "max_misses must be positive"
        );
    }

    #[test]
    fn test_idempotent_rescan() {
        let mut tracker = Tracker::default();
        let records = vec![opp(&["A", "B", "A"], 1.0), opp(&["B", "C", "B"], 2.0)];

        let first = tracker.apply_cycle(ScanCycle::Batch(batch(records.clone())));
        let second = tracker.apply_cycle(ScanCycle::Batch(batch(records)));

        assert_eq!(first.opportunities, second.opportunities);
        assert_eq!(second.total_count, 2);
    }

    #[test]
    fn test_anti_flicker() {
        let mut tracker = Tracker::new(2).unwrap();
        let record = opp(&["BTC", "ETH", "BTC"], 1.2);

        let s1 = tracker.apply_cycle(ScanCycle::Batch(batch(vec![record.clone()])));
        let s2 = tracker.apply_cycle(ScanCycle::Batch(batch(vec![])));
        let s3 = tracker.apply_cycle(ScanCycle::Batch(batch(vec![record])));

        for snap in [&s1, &s2, &s3] {
            assert_eq!(snap.total_count, 1);
            assert_eq!(snap.opportunities[0].key(), "BTC-ETH-BTC");
        }
    }

    #[test]
    fn test_eviction_boundary() {
        let mut tracker = Tracker::new(2).unwrap();
        tracker.apply_cycle(ScanCycle::Batch(batch(vec![opp(&["A", "B", "A"], 1.0)])));

        let after_one_miss = tracker.apply_cycle(ScanCycle::Batch(batch(vec![])));
        assert_eq!(after_one_miss.total_count, 1);

        let after_two_misses = tracker.apply_cycle(ScanCycle::Batch(batch(vec![])));
        assert_eq!(after_two_misses.total_count, 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_reappearance_resets_misses() {
        let mut tracker = Tracker::new(2).unwrap();
        let record = opp(&["A", "B", "A"], 1.0);

        tracker.apply_cycle(ScanCycle::Batch(batch(vec![record.clone()])));
        tracker.apply_cycle(ScanCycle::Batch(batch(vec![])));
        tracker.apply_cycle(ScanCycle::Batch(batch(vec![record])));

        // Misses were reset, so one further absent cycle must not evict
        let snap = tracker.apply_cycle(ScanCycle::Batch(batch(vec![])));
        assert_eq!(snap.total_count, 1);
    }

    #[test]
    fn test_merge_wins_on_reappearance() {
        let mut tracker = Tracker::default();
        let mut old = opp(&["A", "B", "A"], 0.5);
        old.end_amount = Some(1005.0);
        old.risk = Some(Risk::Safe);
        tracker.apply_cycle(ScanCycle::Batch(batch(vec![old])));

        let mut newer = opp(&["A", "B", "A"], 1.8);
        newer.end_amount = None; // partial update
        let snap = tracker.apply_cycle(ScanCycle::Batch(batch(vec![newer])));

        assert_eq!(snap.total_count, 1);
        let shown = &snap.opportunities[0];
        assert_eq!(shown.profit_percent, Some(1.8));
        assert_eq!(shown.end_amount, Some(1005.0));
        assert_eq!(shown.risk, Some(Risk::Safe));
    }

    #[test]
    fn test_duplicate_records_within_batch_collapse() {
        let mut tracker = Tracker::default();
        let snap = tracker.apply_cycle(ScanCycle::Batch(batch(vec![
            opp(&["A", "B", "A"], 0.5),
            opp(&["A", "B", "A"], 0.9),
        ])));
        assert_eq!(snap.total_count, 1);
        assert_eq!(snap.opportunities[0].profit_percent, Some(0.9));
    }

    #[test]
    fn test_snapshot_sorted_by_profit_descending() {
        let mut tracker = Tracker::default();
        let snap = tracker.apply_cycle(ScanCycle::Batch(batch(vec![
            opp(&["A", "B", "A"], 0.1),
            opp(&["B", "C", "B"], 3.4),
            opp(&["C", "D", "C"], -0.2),
            opp(&["D", "E", "D"], 1.1),
        ])));

        let profits: Vec<f64> = snap.opportunities.iter().map(Opportunity::profit).collect();
        for pair in profits.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert_eq!(snap.opportunities[0].key(), "B-C-B");
    }

    #[test]
    fn test_equal_profit_ties_keep_first_seen_order() {
        let mut tracker = Tracker::default();
        let snap = tracker.apply_cycle(ScanCycle::Batch(batch(vec![
            opp(&["A", "B", "A"], 1.0),
            opp(&["B", "C", "B"], 1.0),
            opp(&["C", "D", "C"], 1.0),
        ])));
        let keys: Vec<_> = snap.opportunities.iter().map(Opportunity::key).collect();
        assert_eq!(keys, vec!["A-B-A", "B-C-B", "C-D-C"]);
    }

    #[test]
    fn test_absence_signal_preserves_records() {
        let mut tracker = Tracker::new(2).unwrap();
        tracker.apply_cycle(ScanCycle::Batch(batch(vec![opp(&["A", "B", "A"], 1.0)])));

        // Transport failure one cycle before threshold: nothing disappears
        let snap = tracker.apply_cycle(ScanCycle::Unavailable);
        assert_eq!(snap.total_count, 1);
        assert_eq!(snap.opportunities[0].profit_percent, Some(1.0));
    }

    #[test]
    fn test_persistent_failure_drains_the_store() {
        let mut tracker = Tracker::new(2).unwrap();
        tracker.apply_cycle(ScanCycle::Batch(batch(vec![
            opp(&["A", "B", "A"], 1.0),
            opp(&["B", "C", "B"], 2.0),
        ])));

        tracker.apply_cycle(ScanCycle::Unavailable);
        let snap = tracker.apply_cycle(ScanCycle::Unavailable);
        assert_eq!(snap.total_count, 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_batch_timestamp_is_used() {
        let mut tracker = Tracker::default();
        let ts = "2024-05-01T12:00:00Z".parse().unwrap();
        let mut b = batch(vec![opp(&["A", "B", "A"], 1.0)]);
        b.fetch_timestamp = Some(ts);

        let snap = tracker.apply_cycle(ScanCycle::Batch(b));
        assert_eq!(snap.fetch_timestamp, ts);
    }

    #[test]
    fn test_eviction_is_terminal_but_fresh_slot_allowed() {
        let mut tracker = Tracker::new(1).unwrap();
        let record = opp(&["A", "B", "A"], 1.0);
        tracker.apply_cycle(ScanCycle::Batch(batch(vec![record.clone()])));
        tracker.apply_cycle(ScanCycle::Batch(batch(vec![])));
        assert!(tracker.is_empty());

        // Reappearance after eviction starts from a clean slate
        let snap = tracker.apply_cycle(ScanCycle::Batch(batch(vec![record])));
        assert_eq!(snap.total_count, 1);
    }

    #[test]
    fn test_snapshot_length_matches_live_slots() {
        let mut tracker = Tracker::default();
        let snap = tracker.apply_cycle(ScanCycle::Batch(batch(vec![
            opp(&["A", "B", "A"], 1.0),
            opp(&["B", "C", "B"], 2.0),
        ])));
        assert_eq!(snap.total_count, tracker.len());
        assert_eq!(snap.opportunities.len(), tracker.len());
    }
}
