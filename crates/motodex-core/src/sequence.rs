//! Latest-wins ordering for overlapping fetches.

/// Ticket handed out when a fetch is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Issues monotonically increasing tickets for one collection.
///
/// A response is applied only if its ticket is still the latest issued, so
/// a slow response to a superseded request can never overwrite a newer one.
#[derive(Debug, Clone, Default)]
pub struct FetchSequence {
    issued: u64,
}

impl FetchSequence {
    /// Creates a sequence with no tickets issued.
    #[must_use]
    pub const fn new() -> Self {
        Self { issued: 0 }
    }

    /// Issues the next ticket, superseding every earlier one.
    pub const fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Supersedes every outstanding ticket without issuing a new one.
    pub const fn supersede(&mut self) {
        self.issued += 1;
    }

    /// Whether `ticket` is the latest issued.
    #[must_use]
    pub const fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }
}
