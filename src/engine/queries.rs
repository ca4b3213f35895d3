use tracing::debug;

use crate::limits::MAX_RESPONSE_BODY_LEN;
use crate::model::*;
use crate::wire;

use super::Engine;

impl Engine {
    /// Events in catalog order, as many as fit in one `EVENTS` datagram.
    /// Packing stops at the first event that would overflow it.
    pub fn list_events(&self) -> Vec<EventListing> {
        let mut budget = MAX_RESPONSE_BODY_LEN;
        let mut listings = Vec::new();
        for (event_id, event) in self.store.list().iter().enumerate() {
            let block = wire::event_block_len(event.description.len());
            if block > budget {
                debug!(
                    "events listing truncated at {event_id} of {}",
                    self.store.len()
                );
                break;
            }
            budget -= block;
            listings.push(EventListing {
                event_id: event_id as EventId,
                available: event.available,
                description: event.description.clone(),
            });
        }
        listings
    }

    pub fn event(&self, event_id: EventId) -> Option<&Event> {
        self.store.get(event_id)
    }

    pub fn event_count(&self) -> usize {
        self.store.len()
    }

    pub fn reservation(&self, reservation_id: ReservationId) -> Option<&Reservation> {
        self.ledger
            .slot_of(reservation_id)
            .and_then(|slot| self.ledger.get(slot))
    }

    pub fn reservation_count(&self) -> usize {
        self.ledger.len()
    }

    /// Holds still waiting in the expiry queue.
    pub fn pending_expirations(&self) -> usize {
        self.expiry.len()
    }

    /// Tickets of `event_id` not in inventory: completed reservations plus
    /// holds the reaper has not released yet.
    ///
    /// Diagnostic only: scans the whole ledger.
    pub fn held_tickets(&self, event_id: EventId) -> u32 {
        self.ledger
            .iter()
            .filter(|r| r.event_id == event_id && r.holds_tickets())
            .map(|r| u32::from(r.ticket_count))
            .sum()
    }
}
