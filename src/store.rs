//! Mail-store boundary.
//!
//! The scanner drives a remote mailbox only through [`MailStore`], so the
//! IMAP client stays swappable and scan behavior is testable against a
//! scripted store.

use crate::error::StoreError;

/// An opaque fetched message: headers plus body parts, exactly as the
/// store returned them. Parsing happens downstream.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub bytes: Vec<u8>,
}

impl RawMessage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

/// Operations the scanner needs from a mail store.
///
/// The protocol is sequential on a single connection; callers hold the
/// store exclusively for the duration of a scan and must release it
/// (`logout`) on every exit path.
pub trait MailStore {
    /// Establish and authenticate the connection.
    fn connect(&mut self) -> Result<(), StoreError>;

    /// Select the folder subsequent commands operate on.
    fn select(&mut self, folder: &str) -> Result<(), StoreError>;

    /// Server-side search for messages on or after the given day,
    /// `%d-%b-%Y` formatted. Day granularity in the server's own timezone
    /// assumptions; results still need the local date re-check.
    fn search_since(&mut self, date: &str) -> Result<Vec<String>, StoreError>;

    /// Fetch one message in full.
    fn fetch(&mut self, id: &str) -> Result<RawMessage, StoreError>;

    /// Release the connection. Best effort; never fails.
    fn logout(&mut self);
}
