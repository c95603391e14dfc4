//! Mailbox scan: coarse server-side search, precise local-date filter,
//! body extraction.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use mail_parser::MessageParser;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::extract::extract_body;
use crate::store::MailStore;
use crate::types::{NormalizedEmail, TargetWindow};

/// What a scan produced. `skipped` counts candidates lost to individual
/// fetch or parse failures; the caller can tell a failed connection (an
/// `Err` upstream) apart from a genuinely empty day.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Matched emails, in server enumeration order.
    pub emails: Vec<NormalizedEmail>,
    /// Candidate ids the server-side search returned.
    pub candidates: usize,
    /// Candidates dropped to per-message failures.
    pub skipped: usize,
}

/// Connect, scan, and log out again: the connection is released on
/// every exit path, including a failed select or search.
pub fn fetch_day(
    store: &mut dyn MailStore,
    folder: &str,
    window: &TargetWindow,
) -> Result<ScanOutcome, StoreError> {
    store.connect()?;
    let result = scan(store, folder, window);
    store.logout();
    result
}

/// Scan a connected store for messages on the window's day.
///
/// The server-side `SINCE` search is day-granular in the server's own
/// timezone assumptions, so every candidate is re-checked against the
/// local calendar date before it is kept. Individual fetch and parse
/// failures skip that message; select and search failures abort the
/// scan. The caller owns connect and logout.
pub fn scan(
    store: &mut dyn MailStore,
    folder: &str,
    window: &TargetWindow,
) -> Result<ScanOutcome, StoreError> {
    store.select(folder)?;

    let criterion = window.since_criterion();
    let ids = store.search_since(&criterion)?;
    info!(
        candidates = ids.len(),
        %criterion,
        "server search returned candidates, filtering by local date"
    );

    let mut outcome = ScanOutcome {
        candidates: ids.len(),
        ..Default::default()
    };

    for id in ids {
        let raw = match store.fetch(&id) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%id, error = %e, "fetch failed, skipping message");
                outcome.skipped += 1;
                continue;
            }
        };

        let Some(parsed) = MessageParser::default().parse(&raw.bytes) else {
            warn!(%id, "message did not parse, skipping");
            outcome.skipped += 1;
            continue;
        };

        let Some(received) = parsed.date().and_then(received_timestamp) else {
            debug!(%id, "no parsable Date header, excluding");
            outcome.skipped += 1;
            continue;
        };

        if !window.contains(&received) {
            debug!(
                %id,
                local_date = %received.with_timezone(&Local).date_naive(),
                target = %window.local_date(),
                "outside target day"
            );
            continue;
        }

        let local = received.with_timezone(&Local);
        let email = NormalizedEmail {
            id,
            subject: parsed.subject().unwrap_or_default().to_string(),
            from: format_address(parsed.from()),
            to: format_address(parsed.to()),
            received,
            local,
            local_date: local.date_naive(),
            body: extract_body(&parsed),
        };
        debug!(id = %email.id, subject = %email.subject, "matched");
        outcome.emails.push(email);
    }

    info!(
        matched = outcome.emails.len(),
        skipped = outcome.skipped,
        "scan complete"
    );
    Ok(outcome)
}

/// Convert a parsed `Date` header into an offset-aware timestamp.
fn received_timestamp(date: &mail_parser::DateTime) -> Option<DateTime<FixedOffset>> {
    let utc = DateTime::from_timestamp(date.to_timestamp(), 0)?;
    let offset_secs = (i32::from(date.tz_hour) * 3600 + i32::from(date.tz_minute) * 60)
        * if date.tz_before_gmt { -1 } else { 1 };
    let offset = FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix());
    Some(utc.with_timezone(&offset))
}

/// Render a decoded address header as `Name <addr>`, falling back to
/// whichever of the two exists.
fn format_address(addr: Option<&mail_parser::Address<'_>>) -> String {
    let Some(first) = addr.and_then(|a| a.first()) else {
        return String::new();
    };
    match (first.name(), first.address()) {
        (Some(name), Some(address)) => format!("{name} <{address}>"),
        (None, Some(address)) => address.to_string(),
        (Some(name), None) => name.to_string(),
        (None, None) => String::new(),
    }
}
