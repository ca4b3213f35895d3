use crate::limits::RESERVATION_ID_BIAS;
use crate::model::*;

/// Slots available before biased ids would overflow a `u32`.
pub const MAX_RESERVATIONS: usize = (u32::MAX - RESERVATION_ID_BIAS) as usize + 1;

/// Append-only reservation table. Slots are never removed or reused.
pub struct Ledger {
    reservations: Vec<Reservation>,
    limit: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_limit(MAX_RESERVATIONS)
    }

    /// Ledger that refuses to grow past `limit` slots (capped at [`MAX_RESERVATIONS`]).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            reservations: Vec::new(),
            limit: limit.min(MAX_RESERVATIONS),
        }
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.reservations.len() >= self.limit
    }

    pub fn append(&mut self, reservation: Reservation) -> usize {
        debug_assert!(!self.is_full());
        self.reservations.push(reservation);
        self.reservations.len() - 1
    }

    pub fn get(&self, slot: usize) -> Option<&Reservation> {
        self.reservations.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Reservation> {
        self.reservations.get_mut(slot)
    }

    /// Resolve a client-supplied id to its slot, if one exists.
    pub fn slot_of(&self, id: ReservationId) -> Option<usize> {
        slot_for_reservation_id(id).filter(|slot| *slot < self.reservations.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.iter()
    }
}
