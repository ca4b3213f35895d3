use std::collections::VecDeque;

use tracing::{debug, info};

use crate::engine::ledger::Ledger;
use crate::engine::store::InventoryStore;
use crate::model::Timestamp;

/// Pending reservation slots in creation order.
///
/// The hold duration is the same for every reservation, so creation order
/// is also expiration order and the front is always the next to expire.
#[derive(Debug, Default)]
pub struct ExpiryQueue {
    slots: VecDeque<usize>,
}

impl ExpiryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, slot: usize) {
        self.slots.push_back(slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every expired slot from the front, mark uncompleted ones released
    /// and return their tickets to their events. Returns the number released.
    pub fn reap(&mut self, now: Timestamp, ledger: &mut Ledger, store: &mut InventoryStore) -> usize {
        let mut released = 0;
        while let Some(&slot) = self.slots.front() {
            let reservation = ledger
                .get_mut(slot)
                .expect("expiry queue only holds ledger slots");
            if !reservation.is_expired(now) {
                break;
            }
            self.slots.pop_front();
            if reservation.completed {
                continue;
            }
            reservation.released = true;
            store.credit(reservation.event_id, reservation.ticket_count);
            released += 1;
            debug!(
                slot,
                event_id = reservation.event_id,
                tickets = reservation.ticket_count,
                "released expired hold"
            );
        }
        if released > 0 {
            info!("reaped {released} expired reservations");
            metrics::counter!(crate::observability::RESERVATIONS_REAPED_TOTAL)
                .increment(released as u64);
        }
        released
    }
}
