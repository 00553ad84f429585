use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::ThingsError;
use crate::keys::{generate_key, is_valid_key};

#[derive(Debug, Clone, Copy)]
pub(crate) struct UploadTicket {
    pub(crate) user_id: i32,
    issued_at: Instant,
}

/// Single-use, short-lived upload URLs.
pub(crate) struct UploadTickets {
    ttl: Duration,
    tickets: Mutex<HashMap<String, UploadTicket>>,
}

impl UploadTickets {
    pub(crate) fn new(ttl: Duration) -> UploadTickets {
        UploadTickets {
            ttl,
            tickets: Mutex::new(HashMap::new()),
        }
    }

    fn is_live(&self, ticket: &UploadTicket) -> bool {
        ticket.issued_at.elapsed() < self.ttl
    }

    pub(crate) fn issue(&self, user_id: i32) -> Result<String, ThingsError> {
        let mut tickets = self
            .tickets
            .lock()
            .map_err(|_| ThingsError::Internal("Couldn't lock upload tickets"))?;

        tickets.retain(|_, ticket| self.is_live(ticket));

        let token = generate_key();
        tickets.insert(
            token.clone(),
            UploadTicket {
                user_id,
                issued_at: Instant::now(),
            },
        );

        Ok(token)
    }

    /// Hands back a redeemed ticket whose upload was rejected, keeping its
    /// original expiry.
    pub(crate) fn restore(&self, token: &str, ticket: UploadTicket) -> Result<(), ThingsError> {
        if !self.is_live(&ticket) {
            return Ok(());
        }

        self.tickets
            .lock()
            .map_err(|_| ThingsError::Internal("Couldn't lock upload tickets"))?
            .insert(token.to_string(), ticket);

        Ok(())
    }

    /// Consumes the ticket. Expired and unknown tokens both yield `None`.
    pub(crate) fn redeem(&self, token: &str) -> Result<Option<UploadTicket>, ThingsError> {
        if !is_valid_key(token) {
            return Ok(None);
        }

        let ticket = self
            .tickets
            .lock()
            .map_err(|_| ThingsError::Internal("Couldn't lock upload tickets"))?
            .remove(token);

        Ok(ticket.filter(|ticket| self.is_live(ticket)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_can_be_redeemed_once() {
        let tickets = UploadTickets::new(Duration::from_secs(60));
        let token = tickets.issue(4).unwrap();

        let ticket = tickets.redeem(&token).unwrap().unwrap();
        assert_eq!(ticket.user_id, 4);
        assert!(tickets.redeem(&token).unwrap().is_none());
    }

    #[test]
    fn restored_tickets_can_be_redeemed_again() {
        let tickets = UploadTickets::new(Duration::from_secs(60));
        let token = tickets.issue(4).unwrap();

        let ticket = tickets.redeem(&token).unwrap().unwrap();
        tickets.restore(&token, ticket).unwrap();

        assert_eq!(tickets.redeem(&token).unwrap().unwrap().user_id, 4);
    }

    #[test]
    fn expired_tickets_are_rejected() {
        let tickets = UploadTickets::new(Duration::ZERO);
        let token = tickets.issue(4).unwrap();

        assert!(tickets.redeem(&token).unwrap().is_none());
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        let tickets = UploadTickets::new(Duration::from_secs(60));

        assert!(tickets.redeem("nope").unwrap().is_none());
        assert!(tickets.redeem(&generate_key()).unwrap().is_none());
    }
}
