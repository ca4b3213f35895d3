use rand::Rng;
use tracing::debug;

use crate::limits::*;
use crate::model::*;
use crate::tickets::TicketCode;
use crate::wire;

use super::{Engine, EngineError};

impl Engine {
    /// Hold `ticket_count` tickets of an event for the configured duration.
    /// Expired holds are reclaimed first so their tickets count as available.
    pub fn reserve(
        &mut self,
        event_id: EventId,
        ticket_count: u16,
        now: Timestamp,
    ) -> Result<ReservationGrant, EngineError> {
        self.expiry.reap(now, &mut self.ledger, &mut self.store);

        let event = self
            .store
            .get(event_id)
            .ok_or(EngineError::NoSuchEvent(event_id))?;
        if ticket_count == 0 {
            return Err(EngineError::InvalidTicketCount(event_id));
        }
        if wire::tickets_response_len(ticket_count) > MAX_DATAGRAM_LEN {
            return Err(EngineError::ResponseTooLarge {
                event_id,
                requested: ticket_count,
            });
        }
        if ticket_count > event.available {
            return Err(EngineError::InsufficientTickets {
                event_id,
                requested: ticket_count,
                available: event.available,
            });
        }
        if self.ledger.is_full() {
            return Err(EngineError::LimitExceeded(event_id, "reservation ids exhausted"));
        }

        let cookie = self.new_cookie();
        let expires_at = now + Timestamp::from(self.hold_secs());
        self.store.debit(event_id, ticket_count);
        let slot = self
            .ledger
            .append(Reservation::new(event_id, ticket_count, cookie, expires_at));
        self.expiry.push(slot);

        let reservation_id = reservation_id_for_slot(slot);
        debug!(reservation_id, event_id, ticket_count, expires_at, "reserved");
        metrics::counter!(crate::observability::RESERVATIONS_TOTAL).increment(1);
        Ok(ReservationGrant {
            reservation_id,
            event_id,
            ticket_count,
            cookie,
            expires_at,
        })
    }

    /// Hand out the tickets of a reservation. The first successful call
    /// issues the codes and completes the reservation; later calls with the
    /// same cookie get the same codes back, even after the hold expired.
    pub fn collect_tickets(
        &mut self,
        reservation_id: ReservationId,
        cookie: &Cookie,
        now: Timestamp,
    ) -> Result<Vec<TicketCode>, EngineError> {
        let reservation = self
            .ledger
            .slot_of(reservation_id)
            .and_then(|slot| self.ledger.get_mut(slot))
            .ok_or(EngineError::NoSuchReservation(reservation_id))?;
        if !reservation.is_redeemable(now) {
            return Err(EngineError::ReservationExpired(reservation_id));
        }
        if reservation.cookie != *cookie {
            return Err(EngineError::CookieMismatch(reservation_id));
        }

        if reservation.tickets.is_none() {
            let issued = self.issuer.issue(reservation.ticket_count);
            debug!(reservation_id, count = issued.len(), "issued tickets");
            reservation.tickets = Some(issued);
        }
        reservation.completed = true;
        Ok(reservation.tickets.clone().unwrap_or_default())
    }

    fn new_cookie(&mut self) -> Cookie {
        let mut cookie = [0u8; COOKIE_LEN];
        for byte in cookie.iter_mut() {
            *byte = self.rng.gen_range(COOKIE_MIN_BYTE..=COOKIE_MAX_BYTE);
        }
        cookie
    }
}
