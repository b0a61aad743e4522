use std::collections::HashMap;

use crate::actors::core::{ActorId, Addr};

use super::guest::GuestMsg;

// ============================================================================
// Guest Book
// ============================================================================
//
// The house's record of seated guests and how many coffees each has been
// granted. An entry exists from guest creation until the guest terminates.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct GuestEntry {
    pub guest: Addr<GuestMsg>,
    pub drinks: u32,
}

/// Outcome of asking the guest book for one more drink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Granted; carries the guest's new drink count
    Granted(u32),
    /// Refused; carries the count the guest already reached
    Denied(u32),
    /// The guest is not (or no longer) in the book
    Unknown,
}

#[derive(Debug, Default)]
pub struct GuestBook {
    entries: HashMap<ActorId, GuestEntry>,
}

impl GuestBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, guest: Addr<GuestMsg>) {
        self.entries.insert(guest.id(), GuestEntry { guest, drinks: 0 });
    }

    /// Check the limit and count the drink in one step
    pub fn admit(&mut self, guest: ActorId, limit: u32) -> Admission {
        match self.entries.get_mut(&guest) {
            Some(entry) if entry.drinks < limit => {
                entry.drinks += 1;
                Admission::Granted(entry.drinks)
            }
            Some(entry) => Admission::Denied(entry.drinks),
            None => Admission::Unknown,
        }
    }

    pub fn remove(&mut self, guest: ActorId) -> Option<GuestEntry> {
        self.entries.remove(&guest)
    }

    pub fn guests(&self) -> impl Iterator<Item = &Addr<GuestMsg>> {
        self.entries.values().map(|entry| &entry.guest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
