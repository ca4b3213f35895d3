use crate::model::{EventId, ReservationId};

/// Well-formed requests the engine refuses. Each one becomes a
/// `BAD_REQUEST` carrying [`EngineError::subject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    NoSuchEvent(EventId),
    InvalidTicketCount(EventId),
    InsufficientTickets {
        event_id: EventId,
        requested: u16,
        available: u16,
    },
    ResponseTooLarge {
        event_id: EventId,
        requested: u16,
    },
    LimitExceeded(EventId, &'static str),
    NoSuchReservation(ReservationId),
    ReservationExpired(ReservationId),
    CookieMismatch(ReservationId),
}

impl EngineError {
    /// The event or reservation id the client got wrong.
    pub fn subject(&self) -> u32 {
        match self {
            EngineError::NoSuchEvent(id)
            | EngineError::InvalidTicketCount(id)
            | EngineError::InsufficientTickets { event_id: id, .. }
            | EngineError::ResponseTooLarge { event_id: id, .. }
            | EngineError::LimitExceeded(id, _)
            | EngineError::NoSuchReservation(id)
            | EngineError::ReservationExpired(id)
            | EngineError::CookieMismatch(id) => *id,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NoSuchEvent(id) => write!(f, "no such event: {id}"),
            EngineError::InvalidTicketCount(id) => {
                write!(f, "event {id}: ticket count must be positive")
            }
            EngineError::InsufficientTickets {
                event_id,
                requested,
                available,
            } => write!(
                f,
                "event {event_id}: requested {requested} tickets, {available} available"
            ),
            EngineError::ResponseTooLarge {
                event_id,
                requested,
            } => write!(
                f,
                "event {event_id}: {requested} tickets do not fit in one datagram"
            ),
            EngineError::LimitExceeded(id, msg) => write!(f, "event {id}: limit exceeded: {msg}"),
            EngineError::NoSuchReservation(id) => write!(f, "no such reservation: {id}"),
            EngineError::ReservationExpired(id) => write!(f, "reservation {id} expired"),
            EngineError::CookieMismatch(id) => write!(f, "reservation {id}: cookie mismatch"),
        }
    }
}

impl std::error::Error for EngineError {}
