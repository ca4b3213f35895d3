//! Datagram codec. Every integer is big-endian.
//!
//! Requests:
//!
//! | id | message          | body                                  |
//! |----|------------------|---------------------------------------|
//! | 1  | `GET_EVENTS`     | empty                                 |
//! | 3  | `GET_RESERVATION`| event_id u32, ticket_count u16        |
//! | 5  | `GET_TICKETS`    | reservation_id u32, cookie [u8; 48]   |
//!
//! Responses:
//!
//! | id  | message       | body                                                        |
//! |-----|---------------|-------------------------------------------------------------|
//! | 2   | `EVENTS`      | repeated { event_id u32, available u16, len u8, bytes }     |
//! | 4   | `RESERVATION` | reservation_id u32, event_id u32, count u16, cookie, i64    |
//! | 6   | `TICKETS`     | reservation_id u32, count u16, count × 7-byte codes         |
//! | 255 | `BAD_REQUEST` | subject u32                                                 |

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::limits::*;
use crate::model::{Cookie, EventId, EventListing, ReservationId, Timestamp};
use crate::tickets::TicketCode;

pub const GET_EVENTS: u8 = 1;
pub const EVENTS: u8 = 2;
pub const GET_RESERVATION: u8 = 3;
pub const RESERVATION: u8 = 4;
pub const GET_TICKETS: u8 = 5;
pub const TICKETS: u8 = 6;
pub const BAD_REQUEST: u8 = 255;

const GET_RESERVATION_BODY_LEN: usize = EVENT_ID_LEN + TICKET_COUNT_LEN;
const GET_TICKETS_BODY_LEN: usize = RESERVATION_ID_LEN + COOKIE_LEN;
const RESERVATION_BODY_LEN: usize =
    RESERVATION_ID_LEN + EVENT_ID_LEN + TICKET_COUNT_LEN + COOKIE_LEN + EXPIRATION_LEN;
const BAD_REQUEST_BODY_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    GetEvents,
    GetReservation {
        event_id: EventId,
        ticket_count: u16,
    },
    GetTickets {
        reservation_id: ReservationId,
        cookie: Cookie,
    },
}

impl Request {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::GetEvents => "get_events",
            Request::GetReservation { .. } => "get_reservation",
            Request::GetTickets { .. } => "get_tickets",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Events(Vec<EventListing>),
    Reservation {
        reservation_id: ReservationId,
        event_id: EventId,
        ticket_count: u16,
        cookie: Cookie,
        expires_at: Timestamp,
    },
    Tickets {
        reservation_id: ReservationId,
        tickets: Vec<TicketCode>,
    },
    BadRequest {
        subject: u32,
    },
}

/// Framing problems. Datagrams that fail to decode get no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Empty,
    UnknownMessage(u8),
    BadLength {
        message_id: u8,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "empty datagram"),
            DecodeError::UnknownMessage(id) => write!(f, "unknown message id {id}"),
            DecodeError::BadLength {
                message_id,
                expected,
                actual,
            } => write!(
                f,
                "message {message_id}: body is {actual} bytes, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Split off the message id and check the body is exactly `expected` bytes.
fn body_of(datagram: &[u8], expected: impl Fn(u8) -> Option<usize>) -> Result<(u8, &[u8]), DecodeError> {
    let (&message_id, body) = datagram.split_first().ok_or(DecodeError::Empty)?;
    let expected = expected(message_id).ok_or(DecodeError::UnknownMessage(message_id))?;
    if body.len() != expected {
        return Err(DecodeError::BadLength {
            message_id,
            expected,
            actual: body.len(),
        });
    }
    Ok((message_id, body))
}

fn get_cookie(body: &mut &[u8]) -> Cookie {
    let mut cookie = [0u8; COOKIE_LEN];
    body.copy_to_slice(&mut cookie);
    cookie
}

pub fn decode_request(datagram: &[u8]) -> Result<Request, DecodeError> {
    let (message_id, mut body) = body_of(datagram, |id| match id {
        GET_EVENTS => Some(0),
        GET_RESERVATION => Some(GET_RESERVATION_BODY_LEN),
        GET_TICKETS => Some(GET_TICKETS_BODY_LEN),
        _ => None,
    })?;
    let request = match message_id {
        GET_EVENTS => Request::GetEvents,
        GET_RESERVATION => Request::GetReservation {
            event_id: body.get_u32(),
            ticket_count: body.get_u16(),
        },
        GET_TICKETS => Request::GetTickets {
            reservation_id: body.get_u32(),
            cookie: get_cookie(&mut body),
        },
        _ => unreachable!("body_of rejects unknown ids"),
    };
    Ok(request)
}

pub fn encode_request(request: &Request, dst: &mut BytesMut) {
    match request {
        Request::GetEvents => dst.put_u8(GET_EVENTS),
        Request::GetReservation {
            event_id,
            ticket_count,
        } => {
            dst.put_u8(GET_RESERVATION);
            dst.put_u32(*event_id);
            dst.put_u16(*ticket_count);
        }
        Request::GetTickets {
            reservation_id,
            cookie,
        } => {
            dst.put_u8(GET_TICKETS);
            dst.put_u32(*reservation_id);
            dst.put_slice(cookie);
        }
    }
}

// ── Sizes ─────────────────────────────────────────────────────

/// Bytes one event occupies inside an `EVENTS` body.
pub fn event_block_len(description_len: usize) -> usize {
    EVENT_ID_LEN + TICKET_COUNT_LEN + DESCRIPTION_LEN_LEN + description_len
}

/// Full datagram size of a `TICKETS` response carrying `count` codes.
pub fn tickets_response_len(count: u16) -> usize {
    MESSAGE_ID_LEN + RESERVATION_ID_LEN + TICKET_COUNT_LEN + count as usize * TICKET_CODE_LEN
}

/// Largest ticket count whose `TICKETS` response still fits one datagram.
pub fn max_tickets_per_response() -> u16 {
    ((MAX_DATAGRAM_LEN - tickets_response_len(0)) / TICKET_CODE_LEN) as u16
}

// ── Responses ─────────────────────────────────────────────────

pub fn encode_response(response: &Response, dst: &mut BytesMut) {
    match response {
        Response::Events(listings) => {
            dst.put_u8(EVENTS);
            for listing in listings {
                dst.put_u32(listing.event_id);
                dst.put_u16(listing.available);
                dst.put_u8(listing.description.len() as u8);
                dst.put_slice(&listing.description);
            }
        }
        Response::Reservation {
            reservation_id,
            event_id,
            ticket_count,
            cookie,
            expires_at,
        } => {
            dst.put_u8(RESERVATION);
            dst.put_u32(*reservation_id);
            dst.put_u32(*event_id);
            dst.put_u16(*ticket_count);
            dst.put_slice(cookie);
            dst.put_i64(*expires_at);
        }
        Response::Tickets {
            reservation_id,
            tickets,
        } => {
            dst.put_u8(TICKETS);
            dst.put_u32(*reservation_id);
            dst.put_u16(tickets.len() as u16);
            for ticket in tickets {
                dst.put_slice(ticket.as_bytes());
            }
        }
        Response::BadRequest { subject } => {
            dst.put_u8(BAD_REQUEST);
            dst.put_u32(*subject);
        }
    }
    debug_assert!(dst.len() <= MAX_DATAGRAM_LEN, "response exceeds one datagram");
}

/// Client-side decoding, used by the integration tests and the stress bench.
pub fn decode_response(datagram: &[u8]) -> Result<Response, DecodeError> {
    let (&message_id, rest) = datagram.split_first().ok_or(DecodeError::Empty)?;
    match message_id {
        EVENTS => decode_events(rest),
        TICKETS => decode_tickets(rest),
        _ => {
            let (message_id, mut body) = body_of(datagram, |id| match id {
                RESERVATION => Some(RESERVATION_BODY_LEN),
                BAD_REQUEST => Some(BAD_REQUEST_BODY_LEN),
                _ => None,
            })?;
            let response = match message_id {
                RESERVATION => Response::Reservation {
                    reservation_id: body.get_u32(),
                    event_id: body.get_u32(),
                    ticket_count: body.get_u16(),
                    cookie: get_cookie(&mut body),
                    expires_at: body.get_i64(),
                },
                BAD_REQUEST => Response::BadRequest {
                    subject: body.get_u32(),
                },
                _ => unreachable!("body_of rejects unknown ids"),
            };
            Ok(response)
        }
    }
}

fn decode_events(mut body: &[u8]) -> Result<Response, DecodeError> {
    let truncated = |actual: usize, expected: usize| DecodeError::BadLength {
        message_id: EVENTS,
        expected,
        actual,
    };
    let mut listings = Vec::new();
    while body.has_remaining() {
        let header = event_block_len(0);
        if body.remaining() < header {
            return Err(truncated(body.remaining(), header));
        }
        let event_id = body.get_u32();
        let available = body.get_u16();
        let len = body.get_u8() as usize;
        if body.remaining() < len {
            return Err(truncated(body.remaining(), len));
        }
        listings.push(EventListing {
            event_id,
            available,
            description: Bytes::copy_from_slice(&body[..len]),
        });
        body.advance(len);
    }
    Ok(Response::Events(listings))
}

fn decode_tickets(mut body: &[u8]) -> Result<Response, DecodeError> {
    let header = RESERVATION_ID_LEN + TICKET_COUNT_LEN;
    if body.remaining() < header {
        return Err(DecodeError::BadLength {
            message_id: TICKETS,
            expected: header,
            actual: body.remaining(),
        });
    }
    let reservation_id = body.get_u32();
    let count = body.get_u16();
    let expected = count as usize * TICKET_CODE_LEN;
    if body.remaining() != expected {
        return Err(DecodeError::BadLength {
            message_id: TICKETS,
            expected: header + expected,
            actual: header + body.remaining(),
        });
    }
    let tickets = body
        .chunks_exact(TICKET_CODE_LEN)
        .map(|chunk| {
            let mut code = [0u8; TICKET_CODE_LEN];
            code.copy_from_slice(chunk);
            TicketCode::from_bytes(code)
        })
        .collect();
    Ok(Response::Tickets {
        reservation_id,
        tickets,
    })
}
