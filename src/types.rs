//! Core records: the normalized email and the scan's target window.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// A fetched message reduced to its readable fields.
///
/// Built once per matched message during a scan and never mutated after
/// that. The body is always plain text; markup never survives extraction.
#[derive(Debug, Clone)]
pub struct NormalizedEmail {
    /// Server-side message identifier, as enumerated by the search.
    pub id: String,
    /// Decoded subject line.
    pub subject: String,
    /// Decoded sender, `Name <addr>` when a display name exists.
    pub from: String,
    /// Decoded primary recipient.
    pub to: String,
    /// Origination timestamp as transmitted, with the sender's offset.
    pub received: DateTime<FixedOffset>,
    /// The same instant in this machine's timezone.
    pub local: DateTime<Local>,
    /// Calendar date of `local`; what the target window matched against.
    pub local_date: NaiveDate,
    /// Extracted plain-text body. May be empty, never markup.
    pub body: String,
}

impl NormalizedEmail {
    /// Local receive time rendered for reports and prompts.
    pub fn local_time_display(&self) -> String {
        self.local.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// The calendar day a scan is after, in this machine's timezone, plus the
/// coarse day-granularity criterion handed to the server-side search.
///
/// The server resolves `SINCE` with its own timezone assumptions, so the
/// criterion is only guaranteed to be at least as inclusive as the real
/// window; `contains` is the precise local check applied per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetWindow {
    local_date: NaiveDate,
}

impl TargetWindow {
    /// Window for today, read from the local clock. Call once at scan
    /// start so a run crossing midnight keeps one consistent target.
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn for_date(local_date: NaiveDate) -> Self {
        Self { local_date }
    }

    pub fn local_date(&self) -> NaiveDate {
        self.local_date
    }

    /// IMAP search criterion date, e.g. `05-Jan-2025`.
    pub fn since_criterion(&self) -> String {
        self.local_date.format("%d-%b-%Y").to_string()
    }

    /// Whether a message originated on this window's day, judged in the
    /// local timezone regardless of the sender's offset.
    pub fn contains(&self, received: &DateTime<FixedOffset>) -> bool {
        received.with_timezone(&Local).date_naive() == self.local_date
    }
}
