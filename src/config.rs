//! Configuration, loaded from environment variables.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Digest run configuration.
///
/// Credentials come in as opaque strings; the auth code doubles as the
/// IMAP and SMTP password (QQ-style app passwords work this way).
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub imap_host: String,
    pub imap_port: u16,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Account address, used both as login name and From address.
    pub account: String,
    pub auth_code: SecretString,
    /// Where the finished report is delivered.
    pub recipient: String,
    pub gemini_api_key: SecretString,
    pub gemini_model: String,
    /// Mailbox folder to scan.
    pub folder: String,
    /// Read timeout on the IMAP connection.
    pub read_timeout: Duration,
}

impl DigestConfig {
    /// Build config from environment variables.
    ///
    /// Required: `DIGEST_ACCOUNT`, `DIGEST_AUTH_CODE`, `DIGEST_RECIPIENT`,
    /// `GEMINI_API_KEY`. Everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (env vars in production,
    /// a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };
        let port = |key: &str, default: u16| -> Result<u16, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("not a valid port: {raw}"),
                }),
            }
        };

        let account = required("DIGEST_ACCOUNT")?;
        let auth_code = SecretString::from(required("DIGEST_AUTH_CODE")?);
        let recipient = required("DIGEST_RECIPIENT")?;
        let gemini_api_key = SecretString::from(required("GEMINI_API_KEY")?);

        let imap_host = lookup("DIGEST_IMAP_HOST").unwrap_or_else(|| "imap.qq.com".to_string());
        let imap_port = port("DIGEST_IMAP_PORT", 993)?;
        let smtp_host = lookup("DIGEST_SMTP_HOST").unwrap_or_else(|| "smtp.qq.com".to_string());
        let smtp_port = port("DIGEST_SMTP_PORT", 465)?;
        let gemini_model =
            lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash-exp".to_string());
        let folder = lookup("DIGEST_FOLDER").unwrap_or_else(|| "INBOX".to_string());

        let read_timeout_secs: u64 = match lookup("DIGEST_READ_TIMEOUT_SECS") {
            None => 30,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "DIGEST_READ_TIMEOUT_SECS".to_string(),
                message: format!("not a number of seconds: {raw}"),
            })?,
        };

        Ok(Self {
            imap_host,
            imap_port,
            smtp_host,
            smtp_port,
            account,
            auth_code,
            recipient,
            gemini_api_key,
            gemini_model,
            folder,
            read_timeout: Duration::from_secs(read_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DIGEST_ACCOUNT", "me@qq.com"),
            ("DIGEST_AUTH_CODE", "abcd1234"),
            ("DIGEST_RECIPIENT", "inbox@example.com"),
            ("GEMINI_API_KEY", "key-123"),
        ])
    }

    fn from_map(vars: &HashMap<&str, &str>) -> Result<DigestConfig, ConfigError> {
        DigestConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_applied_when_only_required_set() {
        let config = from_map(&base_vars()).unwrap();
        assert_eq!(config.imap_host, "imap.qq.com");
        assert_eq!(config.imap_port, 993);
        assert_eq!(config.smtp_host, "smtp.qq.com");
        assert_eq!(config.smtp_port, 465);
        assert_eq!(config.folder, "INBOX");
        assert_eq!(config.gemini_model, "gemini-2.0-flash-exp");
        assert_eq!(config.read_timeout, Duration::from_secs(30));
    }

    #[test]
    fn missing_required_value_is_an_error() {
        let mut vars = base_vars();
        vars.remove("DIGEST_RECIPIENT");
        match from_map(&vars) {
            Err(ConfigError::MissingEnvVar(key)) => assert_eq!(key, "DIGEST_RECIPIENT"),
            other => panic!("expected MissingEnvVar, got {other:?}"),
        }
    }

    #[test]
    fn blank_required_value_is_an_error() {
        let mut vars = base_vars();
        vars.insert("DIGEST_ACCOUNT", "  ");
        assert!(matches!(
            from_map(&vars),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut vars = base_vars();
        vars.insert("DIGEST_IMAP_PORT", "not-a-port");
        assert!(matches!(
            from_map(&vars),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn overrides_respected() {
        let mut vars = base_vars();
        vars.insert("DIGEST_IMAP_HOST", "imap.example.org");
        vars.insert("DIGEST_FOLDER", "Archive");
        let config = from_map(&vars).unwrap();
        assert_eq!(config.imap_host, "imap.example.org");
        assert_eq!(config.folder, "Archive");
    }
}
