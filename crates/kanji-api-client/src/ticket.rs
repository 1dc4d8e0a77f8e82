//! Request tickets issued by the client state machines

use std::fmt;

/// Identifies one request issued by a state machine.
///
/// Tickets from one issuer increase monotonically; a completion is applied only
/// when its ticket is the one the machine is still waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out increasing tickets.
#[derive(Debug, Default, Clone)]
pub(crate) struct TicketIssuer {
    last: u64,
}

impl TicketIssuer {
    pub(crate) fn issue(&mut self) -> Ticket {
        self.last += 1;
        Ticket(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_increase() {
        let mut issuer = TicketIssuer::default();
        let first = issuer.issue();
        let second = issuer.issue();
        assert!(second > first);
        assert_ne!(first, second);
        assert_eq!(second.to_string(), "#2");
    }
}
