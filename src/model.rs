use bytes::Bytes;

use crate::limits::{COOKIE_LEN, RESERVATION_ID_BIAS};
use crate::tickets::TicketCode;

/// Unix seconds, the only time type.
pub type Timestamp = i64;

/// Position of an event in the catalog.
pub type EventId = u32;

/// Ledger slot plus [`RESERVATION_ID_BIAS`].
pub type ReservationId = u32;

/// Possession token handed out with a reservation.
pub type Cookie = [u8; COOKIE_LEN];

pub fn unix_now() -> Timestamp {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as Timestamp)
        .unwrap_or(0)
}

/// One entry of the startup catalog, before any tickets are sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub description: String,
    pub tickets: u16,
}

impl CatalogEntry {
    pub fn new(description: impl Into<String>, tickets: u16) -> Self {
        Self {
            description: description.into(),
            tickets,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub description: Bytes,
    /// Tickets in the catalog; `available` never exceeds it.
    pub capacity: u16,
    pub available: u16,
}

impl Event {
    pub fn from_entry(entry: CatalogEntry) -> Self {
        Self {
            description: Bytes::from(entry.description.into_bytes()),
            capacity: entry.tickets,
            available: entry.tickets,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reservation {
    pub event_id: EventId,
    pub ticket_count: u16,
    pub cookie: Cookie,
    pub expires_at: Timestamp,
    /// Set the first time tickets are handed out; shields the hold from the reaper.
    pub completed: bool,
    /// Set by the reaper once the tickets went back to the event.
    pub released: bool,
    pub tickets: Option<Vec<TicketCode>>,
}

impl Reservation {
    pub fn new(event_id: EventId, ticket_count: u16, cookie: Cookie, expires_at: Timestamp) -> Self {
        Self {
            event_id,
            ticket_count,
            cookie,
            expires_at,
            completed: false,
            released: false,
            tickets: None,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// Still counted against its event's inventory.
    pub fn holds_tickets(&self) -> bool {
        self.completed || !self.released
    }

    /// Tickets may be collected. A released hold stays dead even if the
    /// clock steps back before its deadline.
    pub fn is_redeemable(&self, now: Timestamp) -> bool {
        self.completed || (!self.released && !self.is_expired(now))
    }
}

/// What a successful reservation hands back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationGrant {
    pub reservation_id: ReservationId,
    pub event_id: EventId,
    pub ticket_count: u16,
    pub cookie: Cookie,
    pub expires_at: Timestamp,
}

/// Row of an `Events` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListing {
    pub event_id: EventId,
    pub available: u16,
    pub description: Bytes,
}

pub fn reservation_id_for_slot(slot: usize) -> ReservationId {
    RESERVATION_ID_BIAS + slot as ReservationId
}

/// Inverse of [`reservation_id_for_slot`]; `None` for ids below the bias.
pub fn slot_for_reservation_id(id: ReservationId) -> Option<usize> {
    id.checked_sub(RESERVATION_ID_BIAS).map(|s| s as usize)
}
