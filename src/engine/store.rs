use crate::model::*;

/// Catalog plus remaining-ticket counters, indexed by event id.
pub struct InventoryStore {
    events: Vec<Event>,
}

impl InventoryStore {
    pub fn new(catalog: Vec<CatalogEntry>) -> Self {
        Self {
            events: catalog.into_iter().map(Event::from_entry).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.events.get(id as usize)
    }

    /// Events in catalog order; the position is the event id.
    pub fn list(&self) -> &[Event] {
        &self.events
    }

    /// Callers check `available` first; going below zero is a bug.
    pub fn debit(&mut self, id: EventId, tickets: u16) {
        let event = &mut self.events[id as usize];
        event.available = event
            .available
            .checked_sub(tickets)
            .unwrap_or_else(|| panic!("debit of {tickets} leaves event {id} below zero"));
    }

    pub fn credit(&mut self, id: EventId, tickets: u16) {
        let event = &mut self.events[id as usize];
        let restored = u32::from(event.available) + u32::from(tickets);
        assert!(
            restored <= u32::from(event.capacity),
            "credit of {tickets} pushes event {id} above capacity {}",
            event.capacity
        );
        event.available = restored as u16;
    }
}
