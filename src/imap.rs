//! Blocking IMAP-over-TLS mail store.
//!
//! Speaks just enough IMAP for the scan: LOGIN, SELECT, `SEARCH SINCE`,
//! full-message FETCH and LOGOUT, as tagged commands over a rustls
//! stream. Run it inside `spawn_blocking` from async code.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::DigestConfig;
use crate::error::StoreError;
use crate::store::{MailStore, RawMessage};

type TlsStream = rustls::StreamOwned<rustls::ClientConnection, TcpStream>;

pub struct ImapTlsStore {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
    read_timeout: Duration,
    tls: Option<TlsStream>,
    tag_counter: u32,
}

impl ImapTlsStore {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: SecretString,
        read_timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password,
            read_timeout,
            tls: None,
            tag_counter: 0,
        }
    }

    pub fn from_config(config: &DigestConfig) -> Self {
        Self::new(
            config.imap_host.clone(),
            config.imap_port,
            config.account.clone(),
            config.auth_code.clone(),
            config.read_timeout,
        )
    }

    fn next_tag(&mut self) -> String {
        self.tag_counter += 1;
        format!("A{}", self.tag_counter)
    }

    fn stream(&mut self) -> Result<&mut TlsStream, StoreError> {
        self.tls.as_mut().ok_or(StoreError::ConnectionClosed)
    }

    fn read_line(&mut self) -> Result<String, StoreError> {
        let tls = self.stream()?;
        let mut buf = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match tls.read(&mut byte) {
                Ok(0) => return Err(StoreError::ConnectionClosed),
                Ok(_) => {
                    buf.push(byte[0]);
                    if buf.ends_with(b"\r\n") {
                        return Ok(String::from_utf8_lossy(&buf).into_owned());
                    }
                }
                Err(e) => return Err(StoreError::Io(e)),
            }
        }
    }

    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, StoreError> {
        let tls = self.stream()?;
        let mut buf = vec![0u8; len];
        tls.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn write_command(&mut self, tag: &str, cmd: &str) -> Result<(), StoreError> {
        let tls = self.stream()?;
        tls.write_all(format!("{tag} {cmd}\r\n").as_bytes())?;
        tls.flush()?;
        Ok(())
    }

    /// Send a command and collect response lines up to and including the
    /// tagged completion line. An untagged-only helper; FETCH handles its
    /// literal separately.
    fn command(&mut self, name: &str, cmd: &str) -> Result<Vec<String>, StoreError> {
        let tag = self.next_tag();
        self.write_command(&tag, cmd)?;
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(&tag);
            lines.push(line);
            if done {
                break;
            }
        }
        let completion = lines.last().map(String::as_str).unwrap_or("");
        if tagged_ok(&tag, completion) {
            Ok(lines)
        } else {
            Err(StoreError::CommandFailed {
                command: name.to_string(),
                reason: completion.trim_end().to_string(),
            })
        }
    }
}

impl MailStore for ImapTlsStore {
    fn connect(&mut self) -> Result<(), StoreError> {
        let tcp = TcpStream::connect((self.host.as_str(), self.port)).map_err(|e| {
            StoreError::ConnectFailed {
                host: format!("{}:{}", self.host, self.port),
                reason: e.to_string(),
            }
        })?;
        tcp.set_read_timeout(Some(self.read_timeout))?;

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = Arc::new(
            rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth(),
        );
        let server_name = rustls_pki_types::ServerName::try_from(self.host.clone())
            .map_err(|e| StoreError::Tls(e.to_string()))?;
        let conn = rustls::ClientConnection::new(tls_config, server_name)
            .map_err(|e| StoreError::Tls(e.to_string()))?;
        self.tls = Some(rustls::StreamOwned::new(conn, tcp));

        let greeting = self.read_line()?;
        debug!(greeting = greeting.trim_end(), "connected");

        let login = format!(
            "LOGIN \"{}\" \"{}\"",
            self.username,
            self.password.expose_secret()
        );
        self.command("LOGIN", &login).map_err(|e| match e {
            StoreError::CommandFailed { reason, .. } => StoreError::LoginFailed(reason),
            other => other,
        })?;
        debug!(host = %self.host, "logged in");
        Ok(())
    }

    fn select(&mut self, folder: &str) -> Result<(), StoreError> {
        self.command("SELECT", &format!("SELECT \"{folder}\""))?;
        Ok(())
    }

    fn search_since(&mut self, date: &str) -> Result<Vec<String>, StoreError> {
        let lines = self.command("SEARCH", &format!("SEARCH SINCE {date}"))?;
        Ok(parse_search_ids(&lines))
    }

    fn fetch(&mut self, id: &str) -> Result<RawMessage, StoreError> {
        let tag = self.next_tag();
        self.write_command(&tag, &format!("FETCH {id} (RFC822)"))?;

        let mut body: Option<Vec<u8>> = None;
        loop {
            let line = self.read_line()?;
            if line.starts_with(&tag) {
                return match (tagged_ok(&tag, &line), body) {
                    (true, Some(bytes)) => Ok(RawMessage::new(bytes)),
                    (ok, _) => Err(StoreError::CommandFailed {
                        command: "FETCH".to_string(),
                        reason: if ok {
                            format!("no message data for {id}")
                        } else {
                            line.trim_end().to_string()
                        },
                    }),
                };
            }
            if body.is_none()
                && line.starts_with('*')
                && let Some(len) = parse_literal_len(&line)
            {
                body = Some(self.read_exact(len)?);
            }
        }
    }

    fn logout(&mut self) {
        if self.tls.is_none() {
            return;
        }
        if let Err(e) = self.command("LOGOUT", "LOGOUT") {
            warn!(error = %e, "logout failed");
        }
        self.tls = None;
    }
}

impl Drop for ImapTlsStore {
    fn drop(&mut self) {
        self.logout();
    }
}

fn tagged_ok(tag: &str, line: &str) -> bool {
    line.strip_prefix(tag)
        .map(str::trim_start)
        .is_some_and(|rest| rest.starts_with("OK"))
}

/// Pull message ids out of `* SEARCH 1 2 3` response lines.
fn parse_search_ids(lines: &[String]) -> Vec<String> {
    let mut ids = Vec::new();
    for line in lines {
        if let Some(rest) = line.strip_prefix("* SEARCH") {
            ids.extend(rest.split_whitespace().map(str::to_string));
        }
    }
    ids
}

/// Size of the literal announced at the end of a FETCH response line,
/// e.g. `* 1 FETCH (RFC822 {2048}`.
fn parse_literal_len(line: &str) -> Option<usize> {
    let trimmed = line.trim_end();
    let open = trimmed.rfind('{')?;
    let close = trimmed.rfind('}')?;
    if close < open {
        return None;
    }
    trimmed[open + 1..close].parse().ok()
}
