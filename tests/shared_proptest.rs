// Shared/Weak property tests (consolidated).
//
// Property 1: counts match a per-object model.
//  - Model: per-object vectors of live Shared and Weak handles, plus a
//    teardown counter ticked by the value's own Drop.
//  - Invariant after each op: use_count()/strong_count() equal the
//    number of live Shared handles; expired() iff none remain; an
//    upgrade succeeds iff some remain; the teardown counter reads 1
//    exactly from the moment the last Shared handle went away.
//  - Operations: clone-shared, drop-shared, downgrade, clone-weak,
//    drop-weak, upgrade, take, reset.
//
// Property 2: exclusive-handle teardown parity.
//  - Model: a running count of teardowns that must have happened.
//  - Invariant after each op: the observed counter equals the model.
//  - Operations: replace, take, reset, release-and-reclaim, promote to
//    Shared and drop.
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::Relaxed;

use proptest::prelude::*;
use splitrc::{Shared, Unique, Weak};

struct DropTally(&'static AtomicUsize);

impl Drop for DropTally {
    fn drop(&mut self) {
        self.0.fetch_add(1, Relaxed);
    }
}

fn tally() -> &'static AtomicUsize {
    Box::leak(Box::new(AtomicUsize::new(0)))
}

// Property 1: counts match the model after every operation.
proptest! {
    #[test]
    fn prop_counts_match_model(
        objects in 1usize..=4,
        ops in proptest::collection::vec((0u8..=7u8, 0usize..64usize), 1..200)
    ) {
        let mut shareds: Vec<Vec<Shared<DropTally>>> = Vec::new();
        let mut weaks: Vec<Vec<Weak<DropTally>>> = Vec::new();
        let mut hits: Vec<&'static AtomicUsize> = Vec::new();
        for _ in 0..objects {
            let h = tally();
            hits.push(h);
            shareds.push(vec![Shared::new(DropTally(h))]);
            weaks.push(Vec::new());
        }

        for (op, raw_k) in ops {
            let k = raw_k % objects;
            match op {
                // Clone one live Shared handle.
                0 => {
                    if let Some(c) = shareds[k].last().cloned() {
                        shareds[k].push(c);
                    }
                }
                // Drop one Shared handle.
                1 => {
                    if let Some(s) = shareds[k].pop() {
                        drop(s);
                    }
                }
                // Downgrade from a live Shared handle.
                2 => {
                    let w = shareds[k].last().map(|s| s.downgrade());
                    if let Some(w) = w {
                        weaks[k].push(w);
                    }
                }
                // Clone one Weak handle (allowed even after death).
                3 => {
                    if let Some(c) = weaks[k].last().cloned() {
                        weaks[k].push(c);
                    }
                }
                // Drop one Weak handle.
                4 => {
                    if let Some(w) = weaks[k].pop() {
                        drop(w);
                    }
                }
                // Upgrade: success mirrors liveness, and never resurrects.
                5 => {
                    if let Some(w) = weaks[k].last() {
                        match w.upgrade() {
                            Some(s) => {
                                prop_assert!(!shareds[k].is_empty(), "upgrade resurrected a dead object");
                                shareds[k].push(s);
                            }
                            None => prop_assert!(shareds[k].is_empty()),
                        }
                    }
                }
                // Take: ownership moves whole, source left empty.
                6 => {
                    if let Some(mut s) = shareds[k].pop() {
                        let t = s.take();
                        prop_assert!(s.is_empty());
                        prop_assert_eq!(s.use_count(), 0);
                        prop_assert!(!t.is_empty());
                        shareds[k].push(t);
                    }
                }
                // Reset: same as a drop, observable on the handle.
                7 => {
                    if let Some(mut s) = shareds[k].pop() {
                        s.reset();
                        prop_assert!(s.is_empty());
                    }
                }
                _ => unreachable!(),
            }

            // Invariant sweep after each step.
            for i in 0..objects {
                let live = shareds[i].len();
                if let Some(first) = shareds[i].first() {
                    prop_assert_eq!(first.use_count(), live);
                }
                for w in &weaks[i] {
                    prop_assert_eq!(w.strong_count(), live);
                    prop_assert_eq!(w.expired(), live == 0);
                }
                prop_assert_eq!(hits[i].load(Relaxed), (live == 0) as usize);
            }
        }

        // Final sweep: every object torn down exactly once.
        shareds.clear();
        weaks.clear();
        for h in &hits {
            prop_assert_eq!(h.load(Relaxed), 1);
        }
    }
}

// Property 2: exclusive-handle teardown parity.
proptest! {
    #[test]
    fn prop_unique_teardown_parity(ops in proptest::collection::vec(0u8..=4u8, 1..100)) {
        let hits = tally();
        let mut torn_down = 0usize;
        let mut slot: Unique<DropTally> = Unique::empty();

        for op in ops {
            match op {
                // Replace: the old object (if any) is torn down by the
                // assignment.
                0 => {
                    let occupied = !slot.is_empty();
                    slot = Unique::new(DropTally(hits));
                    if occupied {
                        torn_down += 1;
                    }
                }
                // Move through a temporary and back.
                1 => {
                    let t = slot.take();
                    prop_assert!(slot.is_empty());
                    slot = t;
                }
                // Explicit teardown.
                2 => {
                    let occupied = !slot.is_empty();
                    slot.reset();
                    prop_assert!(slot.is_empty());
                    if occupied {
                        torn_down += 1;
                    }
                }
                // Relinquish, then reclaim the allocation by hand.
                3 => {
                    let raw = slot.release();
                    if !raw.is_null() {
                        drop(unsafe { Box::from_raw(raw) });
                        torn_down += 1;
                    }
                }
                // Promote to shared ownership and drop the result.
                4 => {
                    let occupied = !slot.is_empty();
                    let shared = Shared::from(slot.take());
                    prop_assert_eq!(shared.is_empty(), !occupied);
                    drop(shared);
                    if occupied {
                        torn_down += 1;
                    }
                }
                _ => unreachable!(),
            }
            prop_assert_eq!(hits.load(Relaxed), torn_down);
        }

        let occupied = !slot.is_empty();
        drop(slot);
        prop_assert_eq!(hits.load(Relaxed), torn_down + occupied as usize);
    }
}
