use anyhow::Context;
use tracing::{info, warn};

use mail_digest::classify::{KeywordLists, classify};
use mail_digest::config::DigestConfig;
use mail_digest::deliver::ReportSender;
use mail_digest::imap::ImapTlsStore;
use mail_digest::report;
use mail_digest::scanner;
use mail_digest::summarize::{GeminiSummarizer, Summarizer};
use mail_digest::types::TargetWindow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DigestConfig::from_env().context("configuration incomplete")?;
    info!(
        account = %config.account,
        recipient = %config.recipient,
        "mail-digest v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    // Read the clock once; a run crossing midnight keeps one target day.
    let window = TargetWindow::today();
    info!(day = %window.local_date(), "scanning for today's mail");

    let scan_config = config.clone();
    let scan_window = window.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut store = ImapTlsStore::from_config(&scan_config);
        scanner::fetch_day(&mut store, &scan_config.folder, &scan_window)
    })
    .await?
    .context("mailbox scan failed, no emails available")?;

    let report_html = if outcome.emails.is_empty() {
        info!("no emails today");
        report::render_no_emails()
    } else {
        let summarizer = GeminiSummarizer::from_config(&config);
        match summarizer.summarize(&outcome.emails).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "AI summary failed, falling back to keyword report");
                let classified = classify(&outcome.emails, &KeywordLists::default_lists());
                report::render_fallback(&classified)
            }
        }
    };

    let subject = format!("Daily mail digest - {}", window.local_date());
    let sender = ReportSender::from_config(&config);
    tokio::task::spawn_blocking(move || sender.send(&subject, &report_html))
        .await?
        .context("report delivery failed")?;

    info!(
        analyzed = outcome.emails.len(),
        skipped = outcome.skipped,
        "digest complete"
    );
    Ok(())
}
