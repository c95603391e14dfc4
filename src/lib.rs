//! Mail Digest: daily inbox digest core.
//!
//! Fetches today's mail over IMAP, normalizes each message to plain
//! text, summarizes the batch with Gemini, and falls back to a
//! deterministic keyword classifier report when the AI path fails.

pub mod classify;
pub mod config;
pub mod deliver;
pub mod error;
pub mod extract;
pub mod html;
pub mod imap;
pub mod report;
pub mod scanner;
pub mod store;
pub mod summarize;
pub mod types;
