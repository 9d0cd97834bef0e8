//! Ticket counter — which number is printed next and which one is at the
//! counter.
//!
//! Plain state, no locking; the HTTP layer wraps it in a mutex.

use thiserror::Error;

use crate::queue::QueueIdentifier;
use crate::types::{CounterStatus, TicketConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CounterError {
    #[error("ticket letter must be A-Z, got {0:?}")]
    InvalidLetter(char),
    #[error("all tickets up to {max} have been printed")]
    Exhausted { max: u32 },
}

#[derive(Debug, Clone)]
pub struct TicketCounter {
    config: TicketConfig,
    next: u32,
    current: Option<u32>,
}

impl TicketCounter {
    /// Lower-case letters are upper-cased; anything outside `A`-`Z` is
    /// rejected so every ticket parses back as printed.
    pub fn new(mut config: TicketConfig) -> Result<Self, CounterError> {
        config.letter = config.letter.map(check_letter).transpose()?;
        Ok(Self {
            config,
            next: 1,
            current: None,
        })
    }

    pub fn config(&self) -> &TicketConfig {
        &self.config
    }

    /// Issue a ticket for the next number. Fails without changing state once
    /// `max_number` has been printed.
    pub fn print(&mut self) -> Result<QueueIdentifier, CounterError> {
        if let Some(max) = self.config.max_number.filter(|&max| self.next > max) {
            return Err(CounterError::Exhausted { max });
        }
        let ticket = self.ticket(self.next);
        self.next = self.next.saturating_add(1);
        Ok(ticket)
    }

    /// The ticket [`call`](Self::call) would select, without selecting it.
    pub fn next_call(&self) -> QueueIdentifier {
        self.ticket(self.next.saturating_sub(1).max(1))
    }

    /// Call the most recently printed number. With nothing printed yet,
    /// number 1 is called and counted as printed.
    pub fn call(&mut self) -> QueueIdentifier {
        let ticket = self.next_call();
        self.next = self.next.max(ticket.number + 1);
        self.current = Some(ticket.number);
        ticket
    }

    /// The ticket currently at the counter, if any has been called.
    pub fn recall(&self) -> Option<QueueIdentifier> {
        self.current.map(|n| self.ticket(n))
    }

    pub fn reset(&mut self) {
        self.next = 1;
        self.current = None;
    }

    pub fn status(&self) -> CounterStatus {
        let exhausted = self.config.max_number.is_some_and(|max| self.next > max);
        CounterStatus {
            next_ticket: (!exhausted).then(|| self.format(&self.ticket(self.next))),
            current_ticket: self.recall().map(|t| self.format(&t)),
        }
    }

    /// Render a ticket as printed, e.g. `A001`.
    pub fn format(&self, ticket: &QueueIdentifier) -> String {
        format_ticket(ticket, self.config.width)
    }

    fn ticket(&self, number: u32) -> QueueIdentifier {
        QueueIdentifier {
            letter: self.config.letter,
            number,
        }
    }
}

impl Default for TicketCounter {
    fn default() -> Self {
        Self {
            config: TicketConfig::default(),
            next: 1,
            current: None,
        }
    }
}

fn check_letter(letter: char) -> Result<char, CounterError> {
    let upper = letter.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Ok(upper)
    } else {
        Err(CounterError::InvalidLetter(letter))
    }
}

/// Letter followed by the number zero-padded to `width` digits.
pub fn format_ticket(ticket: &QueueIdentifier, width: usize) -> String {
    match ticket.letter {
        Some(letter) => format!("{letter}{:0width$}", ticket.number),
        None => format!("{:0width$}", ticket.number),
    }
}
