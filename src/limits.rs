/// Largest UDP payload over IPv4.
pub const MAX_DATAGRAM_LEN: usize = 65_507;

/// Every response starts with a one-byte message id.
pub const MAX_RESPONSE_BODY_LEN: usize = MAX_DATAGRAM_LEN - MESSAGE_ID_LEN;

/// Receive buffer; one byte larger than any legal datagram so oversized
/// reads are never mistaken for well-formed ones.
pub const RECV_BUFFER_LEN: usize = MAX_DATAGRAM_LEN + 1;

/// Reservation ids are ledger slots shifted by this amount.
pub const RESERVATION_ID_BIAS: u32 = 1_000_000;

/// Event ids must stay below the bias.
pub const MAX_EVENTS: usize = RESERVATION_ID_BIAS as usize;

pub const MAX_DESCRIPTION_LEN: usize = 80;

pub const MIN_HOLD_SECS: u32 = 1;
pub const MAX_HOLD_SECS: u32 = 86_400;

pub const DEFAULT_PORT: u16 = 2022;
pub const DEFAULT_HOLD_SECS: u32 = 5;

// ── Field widths ─────────────────────────────────────────────────

pub const MESSAGE_ID_LEN: usize = 1;
pub const EVENT_ID_LEN: usize = 4;
pub const TICKET_COUNT_LEN: usize = 2;
pub const RESERVATION_ID_LEN: usize = 4;
pub const COOKIE_LEN: usize = 48;
pub const EXPIRATION_LEN: usize = 8;
pub const TICKET_CODE_LEN: usize = 7;
pub const DESCRIPTION_LEN_LEN: usize = 1;

/// Cookie bytes are drawn from the printable ASCII range.
pub const COOKIE_MIN_BYTE: u8 = 33;
pub const COOKIE_MAX_BYTE: u8 = 126;
