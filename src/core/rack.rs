//! Pigment rack: a fixed set of independently lockable pigment wells with a
//! shared availability table used to test feasibility before committing.
//!
//! The test-then-commit step runs entirely under one coarse table guard: an
//! acquisition either takes its whole pigment set or blocks without holding
//! any of it. Availability flags flip only under that guard, and only for
//! wells the flipping thread is about to lock, so taking the individual well
//! locks after the commit decision can never block.
//!
//! Lock ordering: table guard first, individual well locks second, never the
//! reverse.

use std::sync::Arc;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Condvar, Mutex, RawMutex};
use tracing::trace;

use crate::core::order::{PigmentId, TintRequest};

/// One pigment well. The well lock is the exclusive-access token a staff
/// thread holds while mixing from this pigment.
#[derive(Debug)]
pub struct PigmentWell {
    id: PigmentId,
    dispensed: u64,
}

impl PigmentWell {
    /// Pigment this well holds.
    #[must_use]
    pub fn id(&self) -> PigmentId {
        self.id
    }

    /// Number of times this well has been dispensed from.
    #[must_use]
    pub fn dispensed(&self) -> u64 {
        self.dispensed
    }
}

type WellGuard = ArcMutexGuard<RawMutex, PigmentWell>;

/// Exclusive hold over the distinct pigments of one request.
///
/// Release is RAII: dropping the hold releases every well lock exactly once,
/// restores the availability flags under the table guard, and broadcasts to
/// all blocked acquirers. This runs on every exit path, including mixing
/// failures and unwinding.
pub struct PigmentHold<'a> {
    rack: &'a PigmentRack,
    guards: Vec<WellGuard>,
}

impl PigmentHold<'_> {
    /// Distinct pigments this hold owns, in ascending id order.
    #[must_use]
    pub fn pigments(&self) -> Vec<PigmentId> {
        self.guards.iter().map(|g| g.id).collect()
    }

    /// Dispense one unit from every held well, returning the pigment ids in
    /// ascending order. This is the mutation the well locks protect.
    pub fn draw(&mut self) -> Vec<PigmentId> {
        self.guards
            .iter_mut()
            .map(|well| {
                well.dispensed += 1;
                well.id
            })
            .collect()
    }
}

impl Drop for PigmentHold<'_> {
    fn drop(&mut self) {
        let mut table = self.rack.table.lock();
        for guard in self.guards.drain(..) {
            let id = guard.id;
            drop(guard);
            table.available[id] = true;
        }
        // A targeted wake cannot know which waiter's whole-set predicate
        // just became true, so every waiter retests.
        self.rack.changed.notify_all();
    }
}

struct RackTable {
    available: Vec<bool>,
}

/// The shared pigment rack for one shop session.
pub struct PigmentRack {
    wells: Vec<Arc<Mutex<PigmentWell>>>,
    table: Mutex<RackTable>,
    changed: Condvar,
}

impl PigmentRack {
    /// Create a rack of `pigments` wells, all initially available.
    #[must_use]
    pub fn new(pigments: usize) -> Self {
        let wells = (0..pigments)
            .map(|id| Arc::new(Mutex::new(PigmentWell { id, dispensed: 0 })))
            .collect();
        Self {
            wells,
            table: Mutex::new(RackTable {
                available: vec![true; pigments],
            }),
            changed: Condvar::new(),
        }
    }

    /// Number of wells on the rack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.wells.len()
    }

    /// True for a rack with no wells. Never the case in a valid session.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    fn feasible_locked(table: &RackTable, request: &TintRequest) -> bool {
        request.distinct().iter().all(|&id| table.available[id])
    }

    /// True iff every distinct pigment the request names is currently
    /// available. Never mutates state.
    #[must_use]
    pub fn is_feasible(&self, request: &TintRequest) -> bool {
        Self::feasible_locked(&self.table.lock(), request)
    }

    /// True iff the given pigment is currently unheld.
    #[must_use]
    pub fn is_available(&self, id: PigmentId) -> bool {
        self.table.lock().available[id]
    }

    /// Snapshot of the availability table.
    #[must_use]
    pub fn availability(&self) -> Vec<bool> {
        self.table.lock().available.clone()
    }

    /// Block until every distinct pigment of `request` is simultaneously
    /// available, then take them all and return the hold.
    ///
    /// The wait retests feasibility under the table guard on every wake.
    /// Duplicate pigment ids in the original request acquire once; the
    /// request was normalized at construction. There is no ordering
    /// guarantee across competing acquisitions: whichever waiter finds its
    /// whole set available after a wake proceeds.
    pub fn acquire(&self, request: &TintRequest) -> PigmentHold<'_> {
        let mut table = self.table.lock();
        while !Self::feasible_locked(&table, request) {
            self.changed.wait(&mut table);
        }
        let mut guards = Vec::with_capacity(request.distinct().len());
        for &id in request.distinct() {
            table.available[id] = false;
            // The flag was true, so no hold owns this well; this cannot block.
            guards.push(self.wells[id].lock_arc());
        }
        trace!(pigments = ?request.distinct(), "pigments acquired");
        PigmentHold { rack: self, guards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopConfig;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn request(slots: Vec<Option<PigmentId>>) -> TintRequest {
        let config = ShopConfig::new(4, 4, 4);
        TintRequest::new(slots, &config).unwrap()
    }

    #[test]
    fn test_feasibility_reflects_holds() {
        let rack = PigmentRack::new(3);
        let req = request(vec![Some(0), Some(2)]);
        assert!(rack.is_feasible(&req));

        let hold = rack.acquire(&req);
        assert!(!rack.is_available(0));
        assert!(rack.is_available(1));
        assert!(!rack.is_available(2));
        assert!(!rack.is_feasible(&req));

        drop(hold);
        assert_eq!(rack.availability(), vec![true, true, true]);
    }

    #[test]
    fn test_duplicate_ids_acquire_once() {
        let rack = PigmentRack::new(2);
        let req = request(vec![Some(1), Some(1), Some(1)]);
        let mut hold = rack.acquire(&req);
        assert_eq!(hold.pigments(), vec![1]);
        assert_eq!(hold.draw(), vec![1]);
        drop(hold);
        assert!(rack.is_available(1));
    }

    #[test]
    fn test_blank_request_acquires_nothing() {
        let rack = PigmentRack::new(2);
        let req = request(vec![None, None]);
        let hold = rack.acquire(&req);
        assert!(hold.pigments().is_empty());
        drop(hold);
        assert_eq!(rack.availability(), vec![true, true]);
    }

    #[test]
    fn test_acquire_blocks_until_released() {
        let rack = Arc::new(PigmentRack::new(2));
        let shared = request(vec![Some(0)]);

        let hold = rack.acquire(&shared);

        let rack2 = Arc::clone(&rack);
        let waiter = thread::spawn(move || {
            let req = request(vec![Some(0), Some(1)]);
            let mut hold = rack2.acquire(&req);
            hold.draw()
        });

        // The waiter must still be blocked while pigment 0 is held.
        thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished());

        drop(hold);
        assert_eq!(waiter.join().unwrap(), vec![0, 1]);
        assert_eq!(rack.availability(), vec![true, true]);
    }

    #[test]
    fn test_all_or_nothing_acquisition() {
        let rack = Arc::new(PigmentRack::new(3));
        let first = rack.acquire(&request(vec![Some(1)]));

        let rack2 = Arc::clone(&rack);
        let waiter = thread::spawn(move || {
            // Needs 0 and 1; 1 is held, so nothing may be taken yet.
            let hold = rack2.acquire(&request(vec![Some(0), Some(1)]));
            hold.pigments()
        });

        thread::sleep(Duration::from_millis(50));
        // Blocked acquirer holds nothing: pigment 0 is still available.
        assert!(rack.is_available(0));
        assert!(!waiter.is_finished());

        drop(first);
        assert_eq!(waiter.join().unwrap(), vec![0, 1]);
    }
}
