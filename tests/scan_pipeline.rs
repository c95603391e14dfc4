//! Scan pipeline integration: a scripted mail store drives the scanner
//! end to end, covering skip-on-failure and the classification of what
//! comes out.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Local, TimeZone};

use mail_digest::classify::{Bucket, KeywordLists, bucket_for, classify};
use mail_digest::error::StoreError;
use mail_digest::scanner::{fetch_day, scan};
use mail_digest::store::{MailStore, RawMessage};
use mail_digest::types::TargetWindow;

/// In-memory store scripted per test. Records the operations it sees so
/// tests can assert on protocol behavior (criterion used, logout on
/// every path).
#[derive(Default)]
struct ScriptedStore {
    fail_connect: bool,
    fail_select: bool,
    ids: Vec<String>,
    messages: HashMap<String, Vec<u8>>,
    failing_fetches: HashSet<String>,
    ops: Vec<String>,
}

impl ScriptedStore {
    fn with_message(mut self, id: &str, raw: Vec<u8>) -> Self {
        self.ids.push(id.to_string());
        self.messages.insert(id.to_string(), raw);
        self
    }

    fn with_failing_fetch(mut self, id: &str) -> Self {
        self.ids.push(id.to_string());
        self.failing_fetches.insert(id.to_string());
        self
    }
}

impl MailStore for ScriptedStore {
    fn connect(&mut self) -> Result<(), StoreError> {
        self.ops.push("connect".to_string());
        if self.fail_connect {
            return Err(StoreError::ConnectFailed {
                host: "scripted:993".to_string(),
                reason: "refused".to_string(),
            });
        }
        Ok(())
    }

    fn select(&mut self, folder: &str) -> Result<(), StoreError> {
        self.ops.push(format!("select {folder}"));
        if self.fail_select {
            return Err(StoreError::CommandFailed {
                command: "SELECT".to_string(),
                reason: "no such folder".to_string(),
            });
        }
        Ok(())
    }

    fn search_since(&mut self, date: &str) -> Result<Vec<String>, StoreError> {
        self.ops.push(format!("search {date}"));
        Ok(self.ids.clone())
    }

    fn fetch(&mut self, id: &str) -> Result<RawMessage, StoreError> {
        self.ops.push(format!("fetch {id}"));
        if self.failing_fetches.contains(id) {
            return Err(StoreError::CommandFailed {
                command: "FETCH".to_string(),
                reason: format!("no such message {id}"),
            });
        }
        Ok(RawMessage::new(self.messages[id].clone()))
    }

    fn logout(&mut self) {
        self.ops.push("logout".to_string());
    }
}

fn raw_email(from: &str, subject: &str, date: &DateTime<Local>, content_type: &str, body: &str) -> Vec<u8> {
    format!(
        "From: {from}\r\n\
         To: me@qq.com\r\n\
         Subject: {subject}\r\n\
         Date: {date}\r\n\
         Content-Type: {content_type}\r\n\
         \r\n\
         {body}\r\n",
        date = date.to_rfc2822(),
    )
    .into_bytes()
}

fn day(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

#[test]
fn end_to_end_scenario() {
    let today = day(2025, 6, 15, 10);
    let yesterday = day(2025, 6, 14, 22);
    let window = TargetWindow::for_date(today.date_naive());

    let mut store = ScriptedStore::default()
        .with_message(
            "1",
            raw_email(
                "billing@carrier.com",
                "Account notice",
                &today,
                "text/plain",
                "Pay your bill",
            ),
        )
        .with_message(
            "2",
            raw_email(
                "old@example.com",
                "stale",
                &yesterday,
                "text/plain",
                "from yesterday",
            ),
        )
        .with_message(
            "3",
            raw_email(
                "shop@mall.com",
                "weekend",
                &today,
                "text/html",
                "<p>50% off!</p>",
            ),
        );

    let outcome = fetch_day(&mut store, "INBOX", &window).unwrap();

    assert_eq!(outcome.candidates, 3);
    assert_eq!(outcome.emails.len(), 2);
    assert_eq!(outcome.skipped, 0);

    let ids: Vec<&str> = outcome.emails.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"], "server order preserved, yesterday excluded");
    assert_eq!(outcome.emails[0].body, "Pay your bill");
    assert_eq!(outcome.emails[1].body, "50% off!", "HTML reduced to text");

    let classified = classify(&outcome.emails, &KeywordLists::default_lists());
    assert_eq!(classified.system.len(), 1);
    assert_eq!(classified.system[0].id, "1");
    assert_eq!(classified.marketing.len(), 1);
    assert_eq!(classified.marketing[0].id, "3");
    assert!(classified.other.is_empty());

    assert_eq!(store.ops.first().map(String::as_str), Some("connect"));
    assert_eq!(store.ops.last().map(String::as_str), Some("logout"));
    assert!(store.ops.contains(&"select INBOX".to_string()));
}

#[test]
fn one_failing_fetch_does_not_sink_the_batch() {
    let today = day(2025, 6, 15, 9);
    let window = TargetWindow::for_date(today.date_naive());

    let mut store = ScriptedStore::default();
    for id in ["1", "2", "4", "5"] {
        store = store.with_message(
            id,
            raw_email("a@b.com", &format!("msg {id}"), &today, "text/plain", "hello"),
        );
    }
    let mut store = store.with_failing_fetch("3");

    let outcome = scan(&mut store, "INBOX", &window).unwrap();
    assert_eq!(outcome.emails.len(), 4);
    assert_eq!(outcome.skipped, 1);
}

#[test]
fn unparsable_date_is_skipped_not_fatal() {
    let today = day(2025, 6, 15, 9);
    let window = TargetWindow::for_date(today.date_naive());

    let good = raw_email("a@b.com", "ok", &today, "text/plain", "hello");
    let no_date = b"From: a@b.com\r\nSubject: dateless\r\n\r\nhello\r\n".to_vec();

    let mut store = ScriptedStore::default()
        .with_message("1", no_date)
        .with_message("2", good);

    let outcome = scan(&mut store, "INBOX", &window).unwrap();
    assert_eq!(outcome.emails.len(), 1);
    assert_eq!(outcome.emails[0].id, "2");
    assert_eq!(outcome.skipped, 1);
}

#[test]
fn connect_failure_aborts_before_any_command() {
    let window = TargetWindow::for_date(day(2025, 6, 15, 9).date_naive());
    let mut store = ScriptedStore {
        fail_connect: true,
        ..Default::default()
    };

    let result = fetch_day(&mut store, "INBOX", &window);
    assert!(matches!(result, Err(StoreError::ConnectFailed { .. })));
    assert_eq!(store.ops, ["connect"]);
}

#[test]
fn select_failure_aborts_but_still_releases_the_connection() {
    let window = TargetWindow::for_date(day(2025, 6, 15, 9).date_naive());
    let mut store = ScriptedStore {
        fail_select: true,
        ..Default::default()
    };

    let result = fetch_day(&mut store, "INBOX", &window);
    assert!(matches!(result, Err(StoreError::CommandFailed { .. })));
    assert_eq!(store.ops.last().map(String::as_str), Some("logout"));
}

#[test]
fn search_uses_the_window_criterion() {
    let today = day(2025, 1, 5, 9);
    let window = TargetWindow::for_date(today.date_naive());

    let mut store = ScriptedStore::default();
    scan(&mut store, "INBOX", &window).unwrap();
    assert!(store.ops.contains(&"search 05-Jan-2025".to_string()));
}

#[test]
fn extracted_emails_classify_like_their_surfaces() {
    let today = day(2025, 6, 15, 9);
    let window = TargetWindow::for_date(today.date_naive());

    let mut store = ScriptedStore::default().with_message(
        "1",
        raw_email(
            "svc@cloud.com",
            "Renew now: 30% discount",
            &today,
            "text/plain",
            "both keyword sets match this one",
        ),
    );

    let outcome = scan(&mut store, "INBOX", &window).unwrap();
    assert_eq!(
        bucket_for(&outcome.emails[0], &KeywordLists::default_lists()),
        Bucket::SystemBilling,
        "system bucket wins over marketing"
    );
}
