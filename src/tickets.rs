use std::fmt;

use crate::limits::TICKET_CODE_LEN;

const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 36^7, the first serial that no longer fits in a ticket code.
pub const MAX_TICKET_SERIAL: u64 = 78_364_164_096;

/// Ticket id rendered as seven base-36 digits, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketCode([u8; TICKET_CODE_LEN]);

impl TicketCode {
    pub fn from_serial(serial: u64) -> Self {
        assert!(
            serial < MAX_TICKET_SERIAL,
            "ticket serial {serial} does not fit in {TICKET_CODE_LEN} base-36 digits"
        );
        let mut code = [b'0'; TICKET_CODE_LEN];
        let mut rest = serial;
        for slot in code.iter_mut().rev() {
            *slot = DIGITS[(rest % 36) as usize];
            rest /= 36;
        }
        Self(code)
    }

    /// Wraps raw bytes received from the wire; no alphabet check.
    pub fn from_bytes(bytes: [u8; TICKET_CODE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TICKET_CODE_LEN] {
        &self.0
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Codes built by from_serial are always ASCII.
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Process-wide ticket counter. Serials are never reused.
#[derive(Debug, Default)]
pub struct TicketIssuer {
    next: u64,
}

impl TicketIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, count: u16) -> Vec<TicketCode> {
        let first = self.next;
        self.next += u64::from(count);
        metrics::counter!(crate::observability::TICKETS_ISSUED_TOTAL).increment(u64::from(count));
        (first..self.next).map(TicketCode::from_serial).collect()
    }

    pub fn issued(&self) -> u64 {
        self.next
    }
}
