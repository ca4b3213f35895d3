mod error;
pub mod ledger;
mod mutations;
mod queries;
pub mod store;

pub use error::EngineError;

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::model::*;
use crate::reaper::ExpiryQueue;
use crate::tickets::TicketIssuer;
use crate::wire::{self, Request, Response};

use ledger::Ledger;
use store::InventoryStore;

/// Protocol state machine. Owns every piece of mutable server state and is
/// driven one datagram at a time.
pub struct Engine {
    pub(super) store: InventoryStore,
    pub(super) ledger: Ledger,
    pub(super) expiry: ExpiryQueue,
    pub(super) issuer: TicketIssuer,
    hold_secs: u32,
    rng: StdRng,
}

impl Engine {
    pub fn new(catalog: Vec<CatalogEntry>, hold_secs: u32) -> Self {
        Self::with_rng(catalog, hold_secs, StdRng::from_entropy())
    }

    /// Deterministic cookies, for tests and benches.
    pub fn with_rng(catalog: Vec<CatalogEntry>, hold_secs: u32, rng: StdRng) -> Self {
        Self {
            store: InventoryStore::new(catalog),
            ledger: Ledger::new(),
            expiry: ExpiryQueue::new(),
            issuer: TicketIssuer::new(),
            hold_secs,
            rng,
        }
    }

    pub fn hold_secs(&self) -> u32 {
        self.hold_secs
    }

    /// Decode, execute and build the reply for one datagram.
    /// `None` means the datagram was malformed and must be ignored.
    pub fn handle_datagram(&mut self, datagram: &[u8], now: Timestamp) -> Option<Response> {
        let request = match wire::decode_request(datagram) {
            Ok(request) => request,
            Err(e) => {
                debug!("dropping datagram of {} bytes: {e}", datagram.len());
                metrics::counter!(crate::observability::DATAGRAMS_DROPPED_TOTAL).increment(1);
                return None;
            }
        };

        let kind = request.kind();
        let start = Instant::now();
        let (response, status) = match self.execute(request, now) {
            Ok(response) => (response, "ok"),
            Err(e) => {
                debug!("{kind} rejected: {e}");
                (Response::BadRequest { subject: e.subject() }, "bad_request")
            }
        };
        metrics::counter!(crate::observability::REQUESTS_TOTAL, "kind" => kind, "status" => status)
            .increment(1);
        metrics::histogram!(crate::observability::REQUEST_DURATION_SECONDS, "kind" => kind)
            .record(start.elapsed().as_secs_f64());
        Some(response)
    }

    pub fn execute(&mut self, request: Request, now: Timestamp) -> Result<Response, EngineError> {
        match request {
            Request::GetEvents => Ok(Response::Events(self.list_events())),
            Request::GetReservation {
                event_id,
                ticket_count,
            } => {
                let grant = self.reserve(event_id, ticket_count, now)?;
                Ok(Response::Reservation {
                    reservation_id: grant.reservation_id,
                    event_id: grant.event_id,
                    ticket_count: grant.ticket_count,
                    cookie: grant.cookie,
                    expires_at: grant.expires_at,
                })
            }
            Request::GetTickets {
                reservation_id,
                cookie,
            } => {
                let tickets = self.collect_tickets(reservation_id, &cookie, now)?;
                Ok(Response::Tickets {
                    reservation_id,
                    tickets,
                })
            }
        }
    }
}
