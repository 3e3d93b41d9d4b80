//! Detail Panel
//!
//! Secondary panel showing one snapshot's text. Selecting a snapshot
//! supersedes the previous selection without cancelling its fetch; a
//! response is applied only while its ticket is still the current one.

/// Identifies one load or selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic ticket source; only the newest ticket is current.
///
/// Not synchronized on its own: it lives inside the page and is only
/// touched under the page lock.
#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding every earlier one
    pub fn advance(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}

/// The snapshot shown in the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub date: String,
    pub file: String,
    pub href: String,
}

/// Content of the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    /// Opaque snapshot text
    Loaded(String),
    /// User-facing failure message
    Failed(String),
}

/// Detail panel state
#[derive(Debug, Default)]
pub struct DetailPanel {
    generation: Generation,
    selection: Option<(Ticket, Selection, DetailState)>,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a snapshot and mark it loading.
    ///
    /// The returned ticket must accompany the response.
    pub fn select(&mut self, selection: Selection) -> Ticket {
        let ticket = self.generation.advance();
        self.selection = Some((ticket, selection, DetailState::Loading));
        ticket
    }

    /// Apply a fetch result if `ticket` is still current.
    ///
    /// Returns `false` when the response was stale and discarded.
    pub fn resolve(&mut self, ticket: Ticket, state: DetailState) -> bool {
        if !self.generation.is_current(ticket) {
            return false;
        }
        match &mut self.selection {
            Some((selected, _, current)) if *selected == ticket => {
                *current = state;
                true
            }
            _ => false,
        }
    }

    /// Drop the selection; pending responses become stale
    pub fn clear(&mut self) {
        self.generation.advance();
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref().map(|(_, selection, _)| selection)
    }

    pub fn state(&self) -> Option<&DetailState> {
        self.selection.as_ref().map(|(_, _, state)| state)
    }
}
